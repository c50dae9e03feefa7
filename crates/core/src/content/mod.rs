pub mod model;
pub mod validate;
pub mod version;

pub use model::{CustomSection, HomeContent, HomeField, SiteContent, IMAGE_SLOTS, PAGES};
pub use version::{snapshot_path, PointerRecord, LEGACY_PATH, POINTER_PATH};
