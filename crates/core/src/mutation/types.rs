/// Edits an admin can make to the site document.
///
/// Each mutation produces a structural copy of the current document with the
/// targeted fields replaced and `updatedAt` set to the supplied timestamp.
use serde::{Deserialize, Serialize};

use crate::content::model::{CustomSection, HomeField, SiteContent};
use crate::content::validate::{
    validate_gallery_url, validate_new_section, validate_slot, ValidationError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentMutation {
    UpdateHomeField { field: HomeField, value: String },
    AddCustomSection { section: CustomSection },
    RemoveCustomSection { id: String },
    UpdateImage { slot: String, url: String },
    AddGalleryImage { url: String },
    RemoveGalleryImage { url: String },
}

impl ContentMutation {
    /// Short name used in logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentMutation::UpdateHomeField { .. } => "updateHomeField",
            ContentMutation::AddCustomSection { .. } => "addCustomSection",
            ContentMutation::RemoveCustomSection { .. } => "removeCustomSection",
            ContentMutation::UpdateImage { .. } => "updateImage",
            ContentMutation::AddGalleryImage { .. } => "addGalleryImage",
            ContentMutation::RemoveGalleryImage { .. } => "removeGalleryImage",
        }
    }

    pub fn validate(&self, current: &SiteContent) -> Result<(), ValidationError> {
        match self {
            ContentMutation::AddCustomSection { section } => validate_new_section(current, section),
            ContentMutation::UpdateImage { slot, .. } => validate_slot(slot),
            ContentMutation::AddGalleryImage { url } => validate_gallery_url(url),
            ContentMutation::UpdateHomeField { .. }
            | ContentMutation::RemoveCustomSection { .. }
            | ContentMutation::RemoveGalleryImage { .. } => Ok(()),
        }
    }

    /// Compute the next document. Removing something that is not present
    /// leaves the collection untouched but still stamps the new version.
    pub fn apply(&self, current: &SiteContent, updated_at: i64) -> SiteContent {
        let mut next = current.clone();
        match self {
            ContentMutation::UpdateHomeField { field, value } => {
                next.home.set(*field, value.clone());
            }
            ContentMutation::AddCustomSection { section } => {
                next.custom_sections.push(section.clone());
            }
            ContentMutation::RemoveCustomSection { id } => {
                next.custom_sections.retain(|s| &s.id != id);
            }
            ContentMutation::UpdateImage { slot, url } => {
                next.images.insert(slot.clone(), url.clone());
            }
            ContentMutation::AddGalleryImage { url } => {
                next.gallery.retain(|existing| existing != url);
                next.gallery.insert(0, url.clone());
            }
            ContentMutation::RemoveGalleryImage { url } => {
                next.gallery.retain(|existing| existing != url);
            }
        }
        next.updated_at = updated_at;
        next
    }
}

/// Result of applying a mutation through the synchronizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationReceipt {
    pub kind: String,
    pub updated_at: i64,
    pub has_unsaved_changes: bool,
}
