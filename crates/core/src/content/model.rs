use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Image slots the site renders. Every document carries all of them.
pub const IMAGE_SLOTS: &[&str] = &[
    "logo", "hero", "about", "feature1", "feature2", "feature3", "team", "contact",
];

/// Pages a custom section can be attached to.
pub const PAGES: &[&str] = &["home", "features", "pricing", "about", "blog", "contact"];

/// The full editable site document.
///
/// `updated_at` is the document's logical version: it is bumped by every
/// mutation and is the only ordering key used when reconciling a local
/// draft against a published snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteContent {
    pub home: HomeContent,
    #[serde(deserialize_with = "null_as_default")]
    pub custom_sections: Vec<CustomSection>,
    #[serde(deserialize_with = "image_slots")]
    pub images: BTreeMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub gallery: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: i64,
}

impl Default for SiteContent {
    fn default() -> Self {
        Self {
            home: HomeContent::default(),
            custom_sections: Vec::new(),
            images: IMAGE_SLOTS
                .iter()
                .map(|slot| (slot.to_string(), String::new()))
                .collect(),
            gallery: Vec::new(),
            updated_at: 0,
        }
    }
}

impl SiteContent {
    /// Parse a cached draft or a published snapshot.
    ///
    /// Missing fields fall back to the defaults and missing image slots are
    /// backfilled, so the result is always a complete document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let content: SiteContent = serde_json::from_slice(bytes)?;
        Ok(content.merged_over_defaults())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Overlay this document on the defaults. Idempotent.
    pub fn merged_over_defaults(mut self) -> Self {
        for slot in IMAGE_SLOTS {
            self.images.entry(slot.to_string()).or_default();
        }
        self
    }

    pub fn with_updated_at(mut self, updated_at: i64) -> Self {
        self.updated_at = updated_at;
        self
    }

    pub fn section(&self, id: &str) -> Option<&CustomSection> {
        self.custom_sections.iter().find(|s| s.id == id)
    }

    /// Custom sections attached to `page`, in document order.
    pub fn sections_for_page<'a>(&'a self, page: &'a str) -> impl Iterator<Item = &'a CustomSection> {
        self.custom_sections.iter().filter(move |s| s.page == page)
    }
}

/// Flat text fields on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HomeContent {
    pub hero_title: String,
    pub hero_subtitle: String,
    pub about_title: String,
    pub about_text: String,
}

impl Default for HomeContent {
    fn default() -> Self {
        Self {
            hero_title: "Never Miss Another Appointment".to_string(),
            hero_subtitle: "An AI voice agent that answers every call, qualifies leads, and books meetings straight into your calendar, around the clock.".to_string(),
            about_title: "Built for Teams That Live on the Phone".to_string(),
            about_text: "We help service businesses turn missed calls into booked appointments with natural-sounding voice AI that follows your scripts and your schedule.".to_string(),
        }
    }
}

/// Addressable fields of [`HomeContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HomeField {
    HeroTitle,
    HeroSubtitle,
    AboutTitle,
    AboutText,
}

impl HomeContent {
    pub fn set(&mut self, field: HomeField, value: String) {
        let slot = match field {
            HomeField::HeroTitle => &mut self.hero_title,
            HomeField::HeroSubtitle => &mut self.hero_subtitle,
            HomeField::AboutTitle => &mut self.about_title,
            HomeField::AboutText => &mut self.about_text,
        };
        *slot = value;
    }
}

/// A free-form content block attached to one of the site's pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default = "default_page", deserialize_with = "page_or_home")]
    pub page: String,
}

fn default_page() -> String {
    "home".to_string()
}

fn page_or_home<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_page))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Slots stored as null by older editors read back as empty.
fn image_slots<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Option<String>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(slot, url)| (slot, url.unwrap_or_default()))
        .collect())
}
