pub mod types;

pub use types::{ContentMutation, MutationReceipt};
