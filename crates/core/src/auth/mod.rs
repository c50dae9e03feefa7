pub mod credentials;

pub use credentials::{AdminCredentials, DEFAULT_ADMIN_PASSWORD, MIN_PASSWORD_LEN};
