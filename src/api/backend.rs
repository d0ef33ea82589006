use async_trait::async_trait;

use crate::api::errors::ApiError;
use crate::schemas::activity::Activity;
use crate::schemas::{SectionActivities, SessionSections, UploadedMedia};
use crate::services::reorder::ReorderTarget;

/// A file picked by the user, read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Remote operations the editor needs from the platform backend.
#[async_trait]
pub trait ActivityBackend: Send + Sync + 'static {
    async fn list_section_activities(&self, section_id: &str)
        -> Result<SectionActivities, ApiError>;

    async fn list_session_sections(&self, session_id: &str) -> Result<SessionSections, ApiError>;

    async fn get_activity(&self, activity_id: &str) -> Result<Activity, ApiError>;

    async fn create_activity(&self, activity: &Activity) -> Result<Activity, ApiError>;

    async fn update_activity(
        &self,
        activity_id: &str,
        activity: &Activity,
    ) -> Result<Activity, ApiError>;

    async fn delete_activity(&self, activity_id: &str) -> Result<(), ApiError>;

    /// Stores the full new order of a sibling list.
    async fn reorder(&self, target: ReorderTarget, ordered_ids: &[String]) -> Result<(), ApiError>;

    /// `media_type` is sent as-is, e.g. `image`, `video` or `pdf`.
    async fn upload_media(&self, file: MediaFile, media_type: &str)
        -> Result<UploadedMedia, ApiError>;
}
