use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use async_trait::async_trait;

use crate::api::backend::{ActivityBackend, MediaFile};
use crate::api::errors::ApiError;
use crate::schemas::activity::Activity;
use crate::schemas::{SectionActivities, SectionSummary, SessionSections, UploadedMedia};
use crate::services::reorder::ReorderTarget;

const EDITOR_ENV_VARS: &[&str] = &[
    "ACTIVITY_EDITOR_ENV",
    "ENVIRONMENT",
    "ACTIVITY_EDITOR_STRICT_CONFIG",
    "ACTIVITY_EDITOR_API_BASE_URL",
    "ACTIVITY_EDITOR_SESSION_COOKIE",
    "ACTIVITY_EDITOR_CONNECT_TIMEOUT_SECONDS",
    "ACTIVITY_EDITOR_REQUEST_TIMEOUT_SECONDS",
    "ACTIVITY_EDITOR_MAX_UPLOAD_SIZE_MB",
    "ACTIVITY_EDITOR_PREFERENCES_PATH",
    "ACTIVITY_EDITOR_LOG_LEVEL",
    "ACTIVITY_EDITOR_LOG_JSON",
];

pub(crate) const TEST_SESSION_ID: &str = "session-1";

pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn clear_editor_env() {
    for name in EDITOR_ENV_VARS {
        std::env::remove_var(name);
    }
}

pub(crate) fn activity(id: &str, section_id: &str, title: &str, order: u32) -> Activity {
    Activity {
        id: Some(id.to_string()),
        section_id: Some(section_id.to_string()),
        title: title.to_string(),
        order,
        ..Activity::default()
    }
}

/// Backend call as the in-memory fake saw it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ListActivities(String),
    ListSections(String),
    Get(String),
    Create(String),
    Update(String),
    Delete(String),
    Reorder(ReorderTarget, Vec<String>),
    Upload { file_name: String, media_type: String },
}

#[derive(Default)]
struct BackendState {
    activities: Vec<Activity>,
    sections: Vec<SectionSummary>,
    calls: Vec<Call>,
    created: u32,
    fail_uploads: bool,
}

/// Backend fake that stores documents in memory and records every call.
#[derive(Default)]
pub(crate) struct InMemoryBackend {
    state: Mutex<BackendState>,
}

impl InMemoryBackend {
    pub(crate) fn with_activities(activities: Vec<Activity>) -> Self {
        let backend = Self::default();
        backend.state().activities = activities;
        backend
    }

    pub(crate) fn set_sections(&self, sections: Vec<SectionSummary>) {
        self.state().sections = sections;
    }

    pub(crate) fn set_fail_uploads(&self, fail: bool) {
        self.state().fail_uploads = fail;
    }

    /// Reorders the stored activities without going through `reorder`.
    pub(crate) fn set_server_order(&self, ordered_ids: &[&str]) {
        let mut state = self.state();
        for activity in &mut state.activities {
            if let Some(position) =
                ordered_ids.iter().position(|id| Some(*id) == activity.id.as_deref())
            {
                activity.order = position as u32;
            }
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub(crate) fn stored(&self, activity_id: &str) -> Option<Activity> {
        self.state()
            .activities
            .iter()
            .find(|activity| activity.id.as_deref() == Some(activity_id))
            .cloned()
    }

    fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: Call) {
        self.state().calls.push(call);
    }
}

fn not_found() -> ApiError {
    ApiError::Application { message: "Activity not found".to_string() }
}

#[async_trait]
impl ActivityBackend for InMemoryBackend {
    async fn list_section_activities(
        &self,
        section_id: &str,
    ) -> Result<SectionActivities, ApiError> {
        self.record(Call::ListActivities(section_id.to_string()));
        let mut activities: Vec<Activity> = self
            .state()
            .activities
            .iter()
            .filter(|activity| activity.section_id.as_deref() == Some(section_id))
            .cloned()
            .collect();
        activities.sort_by_key(|activity| activity.order);

        Ok(SectionActivities {
            activities,
            section_name: "Week 1".to_string(),
            session_title: "Fractions".to_string(),
            batch_or_template_name: "Spring cohort".to_string(),
            session_id: Some(TEST_SESSION_ID.to_string()),
        })
    }

    async fn list_session_sections(&self, session_id: &str) -> Result<SessionSections, ApiError> {
        self.record(Call::ListSections(session_id.to_string()));
        Ok(SessionSections { sections: self.state().sections.clone() })
    }

    async fn get_activity(&self, activity_id: &str) -> Result<Activity, ApiError> {
        self.record(Call::Get(activity_id.to_string()));
        self.stored(activity_id).ok_or_else(not_found)
    }

    async fn create_activity(&self, activity: &Activity) -> Result<Activity, ApiError> {
        self.record(Call::Create(activity.title.clone()));
        let mut state = self.state();
        state.created += 1;
        let mut stored = activity.clone();
        stored.id = Some(format!("new-{}", state.created));
        state.activities.push(stored.clone());
        Ok(stored)
    }

    async fn update_activity(
        &self,
        activity_id: &str,
        activity: &Activity,
    ) -> Result<Activity, ApiError> {
        self.record(Call::Update(activity_id.to_string()));
        let mut state = self.state();
        let slot = state
            .activities
            .iter_mut()
            .find(|stored| stored.id.as_deref() == Some(activity_id))
            .ok_or_else(not_found)?;
        *slot = activity.clone();
        Ok(slot.clone())
    }

    async fn delete_activity(&self, activity_id: &str) -> Result<(), ApiError> {
        self.record(Call::Delete(activity_id.to_string()));
        let mut state = self.state();
        let before = state.activities.len();
        state.activities.retain(|activity| activity.id.as_deref() != Some(activity_id));
        if state.activities.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn reorder(&self, target: ReorderTarget, ordered_ids: &[String]) -> Result<(), ApiError> {
        self.record(Call::Reorder(target, ordered_ids.to_vec()));
        if target == ReorderTarget::Activities {
            let ids: Vec<&str> = ordered_ids.iter().map(String::as_str).collect();
            self.set_server_order(&ids);
        }
        Ok(())
    }

    async fn upload_media(
        &self,
        file: MediaFile,
        media_type: &str,
    ) -> Result<UploadedMedia, ApiError> {
        self.record(Call::Upload {
            file_name: file.file_name.clone(),
            media_type: media_type.to_string(),
        });
        if self.state().fail_uploads {
            return Err(ApiError::Application { message: "Upload failed".to_string() });
        }
        Ok(UploadedMedia {
            url: format!("https://cdn.test/{}", file.file_name),
            media_type: Some(media_type.to_string()),
        })
    }
}
