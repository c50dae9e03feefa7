pub mod auth;
pub mod cache;
pub mod clock;
pub mod content;
pub mod error;
pub mod events;
pub mod mutation;
pub mod prompt;
pub mod storage;
pub mod sync;
