use serde::{Deserialize, Serialize};
use validator::Validate;

use super::de::{nullable, u32_flexible};
use super::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    #[default]
    Practice,
    Reading,
}

impl ActivityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Practice => "practice",
            Self::Reading => "reading",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialMediaType {
    #[default]
    Link,
    Pdf,
    Doc,
    Image,
    Video,
    Embed,
}

impl MaterialMediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Pdf => "pdf",
            Self::Doc => "doc",
            Self::Image => "image",
            Self::Video => "video",
            Self::Embed => "embed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "link" => Some(Self::Link),
            "pdf" => Some(Self::Pdf),
            "doc" => Some(Self::Doc),
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            "embed" => Some(Self::Embed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(min = 1, message = "material url must not be empty"))]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub media_type: MaterialMediaType,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingData {
    #[serde(default, deserialize_with = "nullable")]
    pub tip_text: String,
    #[serde(default, deserialize_with = "nullable")]
    pub materials: Vec<Material>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeData {
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub questions: Vec<Question>,
}

/// One activity document. Both payloads are kept; `kind` selects the live one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: ActivityType,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(default, deserialize_with = "u32_flexible")]
    pub order: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub allow_calculator: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub show_agent: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub is_hidden: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub reading_data: ReadingData,
    #[serde(default, deserialize_with = "nullable")]
    pub practice_data: PracticeData,
}

/// Borrowed view of whichever payload `Activity::kind` selects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActivityContent<'a> {
    Practice(&'a PracticeData),
    Reading(&'a ReadingData),
}

impl Activity {
    /// Blank document for "new activity" inside `section_id`.
    pub fn new_in_section(section_id: impl Into<String>, kind: ActivityType) -> Self {
        Self { section_id: Some(section_id.into()), kind, ..Self::default() }
    }

    pub fn content(&self) -> ActivityContent<'_> {
        match self.kind {
            ActivityType::Practice => ActivityContent::Practice(&self.practice_data),
            ActivityType::Reading => ActivityContent::Reading(&self.reading_data),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.practice_data.questions
    }
}
