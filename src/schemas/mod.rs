use serde::{Deserialize, Serialize};

pub mod activity;
pub(crate) mod de;
pub mod question;

use activity::Activity;
use de::{nullable, u32_flexible};

/// Wrapper every backend response is sent in.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    #[serde(default)]
    pub(crate) success: bool,
    pub(crate) data: Option<T>,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionActivities {
    #[serde(default, deserialize_with = "nullable")]
    pub activities: Vec<Activity>,
    #[serde(default, deserialize_with = "nullable")]
    pub section_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub session_title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub batch_or_template_name: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSections {
    #[serde(default, deserialize_with = "nullable")]
    pub sections: Vec<SectionSummary>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "u32_flexible")]
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    pub url: String,
    #[serde(default)]
    pub media_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReorderRequest<'a> {
    pub(crate) ordered_ids: &'a [String],
}
