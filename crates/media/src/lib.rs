//! Gallery image ingestion: downsize uploads to a maximum width and
//! re-encode them as JPEG, optionally as inline data URLs.

pub mod calculations;
pub mod compress;
pub mod error;

pub use calculations::fit_within_width;
pub use compress::{compress_image, CompressParams, CompressedImage};
pub use error::MediaError;
