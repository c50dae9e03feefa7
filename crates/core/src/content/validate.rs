/// Checks applied to edits before they reach the document.
use thiserror::Error;

use super::model::{CustomSection, SiteContent, PAGES};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("section id cannot be empty")]
    EmptySectionId,
    #[error("section title cannot be empty")]
    EmptySectionTitle,
    #[error("section id already exists: {0}")]
    DuplicateSectionId(String),
    #[error("unknown page: {0}")]
    UnknownPage(String),
    #[error("image slot name cannot be empty")]
    EmptySlot,
    #[error("gallery image url cannot be empty")]
    EmptyGalleryUrl,
}

/// Validate a section about to be added to `content`.
pub fn validate_new_section(
    content: &SiteContent,
    section: &CustomSection,
) -> Result<(), ValidationError> {
    if section.id.trim().is_empty() {
        return Err(ValidationError::EmptySectionId);
    }
    if section.title.trim().is_empty() {
        return Err(ValidationError::EmptySectionTitle);
    }
    if !PAGES.contains(&section.page.as_str()) {
        return Err(ValidationError::UnknownPage(section.page.clone()));
    }
    if content.section(&section.id).is_some() {
        return Err(ValidationError::DuplicateSectionId(section.id.clone()));
    }
    Ok(())
}

pub fn validate_slot(slot: &str) -> Result<(), ValidationError> {
    match slot.trim() {
        "" => Err(ValidationError::EmptySlot),
        _ => Ok(()),
    }
}

pub fn validate_gallery_url(url: &str) -> Result<(), ValidationError> {
    match url.trim() {
        "" => Err(ValidationError::EmptyGalleryUrl),
        _ => Ok(()),
    }
}
