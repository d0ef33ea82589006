//! Editor session: the open activity form, the sidebar lists beside it, and
//! the sequencing of backend calls around them.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::api::backend::{ActivityBackend, MediaFile};
use crate::api::errors::ApiError;
use crate::errors::EditorError;
use crate::schemas::activity::{Activity, ActivityType, Material, MaterialMediaType};
use crate::schemas::question::{LocalId, MediaRef, Question, QuestionMediaType};
use crate::schemas::{SectionActivities, UploadedMedia};
use crate::services::media::{self, uploaded_material};
use crate::services::question_editor::{self, FieldEdit, QuestionEdit};
use crate::services::reorder::{reconcile, Reconciliation, ReorderDirection, ReorderTarget};
use crate::services::uploads::{UploadSlot, UploadTicket, UploadTracker};
use crate::services::validation::validate_activity;

pub mod sidebar;

pub use sidebar::{SidebarEntry, SidebarList};

/// Names shown in the editor header for the open section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionContext {
    pub section_id: String,
    pub section_name: String,
    pub session_title: String,
    pub batch_or_template_name: String,
    pub session_id: Option<String>,
}

impl SectionContext {
    fn from_listing(section_id: &str, listing: &SectionActivities) -> Self {
        Self {
            section_id: section_id.to_string(),
            section_name: listing.section_name.clone(),
            session_title: listing.session_title.clone(),
            batch_or_template_name: listing.batch_or_template_name.clone(),
            session_id: listing.session_id.clone(),
        }
    }
}

/// Top-level field assignment on the open activity.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityEdit {
    Title(String),
    /// Switches which payload is live. The other payload is kept.
    Kind(ActivityType),
    AllowCalculator(bool),
    ShowAgent(bool),
    IsHidden(bool),
    Description(String),
    TipText(String),
}

/// Stamp of one detail load. Only the newest stamp may fill the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    activity_id: String,
}

impl LoadTicket {
    pub fn activity_id(&self) -> &str {
        &self.activity_id
    }
}

pub struct ActivityEditor<B: ActivityBackend> {
    backend: Arc<B>,
    section: Option<SectionContext>,
    activities: SidebarList,
    sections: SidebarList,
    form: Option<Activity>,
    load_generation: u64,
    is_saving: bool,
    uploads: UploadTracker,
}

impl<B: ActivityBackend> ActivityEditor<B> {
    pub fn new(backend: B) -> Self {
        Self::with_backend(Arc::new(backend))
    }

    pub fn with_backend(backend: Arc<B>) -> Self {
        Self {
            backend,
            section: None,
            activities: SidebarList::default(),
            sections: SidebarList::default(),
            form: None,
            load_generation: 0,
            is_saving: false,
            uploads: UploadTracker::new(),
        }
    }

    /// Shared handle for driving calls from other tasks.
    pub fn backend(&self) -> Arc<B> {
        Arc::clone(&self.backend)
    }

    pub fn section(&self) -> Option<&SectionContext> {
        self.section.as_ref()
    }

    pub fn activities(&self) -> &SidebarList {
        &self.activities
    }

    pub fn sections(&self) -> &SidebarList {
        &self.sections
    }

    pub fn form(&self) -> Option<&Activity> {
        self.form.as_ref()
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    pub fn uploads(&self) -> &UploadTracker {
        &self.uploads
    }

    /// Fetches the sidebar of `section_id`, then the routed activity if any.
    pub async fn open_section(
        &mut self,
        section_id: &str,
        activity_id: Option<&str>,
    ) -> Result<(), EditorError> {
        let listing = self.backend.list_section_activities(section_id).await?;
        self.section = Some(SectionContext::from_listing(section_id, &listing));
        self.activities = SidebarList::from_activities(&listing.activities);
        tracing::debug!(
            section_id,
            activities = self.activities.entries().len(),
            "Section opened"
        );

        match activity_id {
            Some(activity_id) => {
                self.load_activity(activity_id).await?;
            }
            None => self.discard(),
        }
        Ok(())
    }

    pub async fn refresh_activities(&mut self) -> Result<(), EditorError> {
        let section_id = self.section_id()?.to_string();
        let listing = self.backend.list_section_activities(&section_id).await?;
        self.section = Some(SectionContext::from_listing(&section_id, &listing));
        self.activities = SidebarList::from_activities(&listing.activities);
        Ok(())
    }

    /// Fetches the sibling sections of the open section's session.
    pub async fn load_sections(&mut self) -> Result<(), EditorError> {
        let session_id = self.session_id()?.to_string();
        let listing = self.backend.list_session_sections(&session_id).await?;
        self.sections = SidebarList::new(listing.sections.into_iter().map(Into::into).collect());
        Ok(())
    }

    /// Starts an empty document in the open section.
    pub fn new_activity(&mut self, kind: ActivityType) -> Result<&Activity, EditorError> {
        let section_id = self.section_id()?.to_string();
        self.invalidate_loads();
        self.uploads.clear();
        let mut activity = Activity::new_in_section(section_id, kind);
        activity.order = u32::try_from(self.activities.entries().len()).unwrap_or(u32::MAX);
        Ok(self.form.insert(activity))
    }

    /// Claims the form for a detail load. Any older load is now stale.
    pub fn begin_load(&mut self, activity_id: &str) -> LoadTicket {
        self.load_generation += 1;
        LoadTicket { generation: self.load_generation, activity_id: activity_id.to_string() }
    }

    /// Hydrates the form from a finished load. Returns `Ok(false)` when a
    /// newer load or navigation superseded this one and the result was dropped.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Activity, ApiError>,
    ) -> Result<bool, EditorError> {
        if ticket.generation != self.load_generation {
            tracing::debug!(activity_id = %ticket.activity_id, "Discarding stale activity load");
            return Ok(false);
        }

        let mut activity = result?;
        if activity.section_id.is_none() {
            activity.section_id = self.section.as_ref().map(|section| section.section_id.clone());
        }
        self.uploads.clear();
        self.form = Some(activity);
        Ok(true)
    }

    pub async fn load_activity(&mut self, activity_id: &str) -> Result<bool, EditorError> {
        let ticket = self.begin_load(activity_id);
        let result = self.backend.get_activity(activity_id).await;
        self.finish_load(ticket, result)
    }

    /// Navigates away from the form without saving.
    pub fn discard(&mut self) {
        self.invalidate_loads();
        self.uploads.clear();
        self.form = None;
    }

    pub fn apply(&mut self, edit: ActivityEdit) -> Result<(), EditorError> {
        let form = self.form_mut()?;
        match edit {
            ActivityEdit::Title(title) => form.title = title,
            ActivityEdit::Kind(kind) => form.kind = kind,
            ActivityEdit::AllowCalculator(value) => form.allow_calculator = value,
            ActivityEdit::ShowAgent(value) => form.show_agent = value,
            ActivityEdit::IsHidden(value) => form.is_hidden = value,
            ActivityEdit::Description(text) => form.practice_data.description = text,
            ActivityEdit::TipText(text) => form.reading_data.tip_text = text,
        }
        Ok(())
    }

    pub fn add_question(&mut self) -> Result<(), EditorError> {
        self.edit_questions(|questions| Ok(question_editor::add_question(questions)))
    }

    pub fn remove_question(&mut self, index: usize) -> Result<(), EditorError> {
        self.edit_questions(|questions| question_editor::remove_question(questions, index))
    }

    pub fn update_question(&mut self, index: usize, edit: QuestionEdit) -> Result<(), EditorError> {
        self.edit_questions(|questions| question_editor::update_question(questions, index, edit))
    }

    pub fn add_option(&mut self, index: usize) -> Result<(), EditorError> {
        self.edit_questions(|questions| question_editor::add_option(questions, index))
    }

    pub fn remove_option(&mut self, index: usize, option: usize) -> Result<(), EditorError> {
        self.edit_questions(|questions| question_editor::remove_option(questions, index, option))
    }

    pub fn toggle_correct_answer(&mut self, index: usize, option: &str) -> Result<(), EditorError> {
        self.edit_questions(|questions| {
            question_editor::toggle_correct_answer(questions, index, option)
        })
    }

    pub fn add_field(&mut self, index: usize) -> Result<(), EditorError> {
        self.edit_questions(|questions| question_editor::add_field(questions, index))
    }

    pub fn remove_field(&mut self, index: usize, field: usize) -> Result<(), EditorError> {
        self.edit_questions(|questions| question_editor::remove_field(questions, index, field))
    }

    pub fn update_field(
        &mut self,
        index: usize,
        field: usize,
        edit: FieldEdit,
    ) -> Result<(), EditorError> {
        self.edit_questions(|questions| {
            question_editor::update_field(questions, index, field, edit)
        })
    }

    pub fn add_media(
        &mut self,
        index: usize,
        media_type: QuestionMediaType,
    ) -> Result<(), EditorError> {
        self.edit_questions(|questions| media::add_media_to_question(questions, index, media_type))
    }

    pub fn update_media(
        &mut self,
        index: usize,
        media_index: usize,
        url: impl Into<String>,
    ) -> Result<(), EditorError> {
        let url = url.into();
        self.edit_questions(|questions| {
            media::update_question_media(questions, index, media_index, url)
        })
    }

    pub fn remove_media(&mut self, index: usize, media_index: usize) -> Result<(), EditorError> {
        self.edit_questions(|questions| media::remove_question_media(questions, index, media_index))
    }

    pub fn add_material(&mut self) -> Result<(), EditorError> {
        self.edit_materials(|materials| Ok(media::add_material(materials)))
    }

    pub fn update_material_url(
        &mut self,
        index: usize,
        url: impl Into<String>,
    ) -> Result<(), EditorError> {
        let url = url.into();
        self.edit_materials(|materials| media::update_material_url(materials, index, url))
    }

    pub fn update_material_title(
        &mut self,
        index: usize,
        title: impl Into<String>,
    ) -> Result<(), EditorError> {
        let title = title.into();
        self.edit_materials(|materials| media::update_material_title(materials, index, title))
    }

    pub fn update_material_description(
        &mut self,
        index: usize,
        description: Option<String>,
    ) -> Result<(), EditorError> {
        self.edit_materials(|materials| {
            media::update_material_description(materials, index, description)
        })
    }

    pub fn update_material_media_type(
        &mut self,
        index: usize,
        media_type: MaterialMediaType,
    ) -> Result<(), EditorError> {
        self.edit_materials(|materials| {
            media::update_material_media_type(materials, index, media_type)
        })
    }

    pub fn remove_material(&mut self, index: usize) -> Result<(), EditorError> {
        self.edit_materials(|materials| media::remove_material(materials, index))
    }

    /// Moves `id` one step locally and persists the new order in the
    /// background. Returns `None`, and sends nothing, when the move is a no-op.
    /// The spawned call is never rolled back; failures are only logged.
    ///
    /// Must be called from within a tokio runtime.
    pub fn handle_reorder(
        &mut self,
        target: ReorderTarget,
        id: &str,
        direction: ReorderDirection,
    ) -> Option<JoinHandle<()>> {
        let list = match target {
            ReorderTarget::Activities => &mut self.activities,
            ReorderTarget::Sections => &mut self.sections,
        };
        let ordered = list.move_entry(id, direction)?;

        tracing::debug!(
            list = %target,
            id,
            direction = direction.as_str(),
            "Reordered locally"
        );

        let backend = Arc::clone(&self.backend);
        Some(tokio::spawn(async move {
            if let Err(err) = backend.reorder(target, &ordered).await {
                tracing::warn!(list = %target, error = %err, "Failed to persist new order");
            }
        }))
    }

    /// Refetches `target`, adopts the server order and reports whether it
    /// differed from what was shown.
    pub async fn reconcile_sidebar(
        &mut self,
        target: ReorderTarget,
    ) -> Result<Reconciliation, EditorError> {
        let local = match target {
            ReorderTarget::Activities => self.activities.ids(),
            ReorderTarget::Sections => self.sections.ids(),
        };

        match target {
            ReorderTarget::Activities => self.refresh_activities().await?,
            ReorderTarget::Sections => self.load_sections().await?,
        }

        let server = match target {
            ReorderTarget::Activities => self.activities.ids(),
            ReorderTarget::Sections => self.sections.ids(),
        };

        let report = reconcile(&local, &server);
        if report.diverged {
            tracing::warn!(list = %target, "Sidebar order diverged from server");
        }
        Ok(report)
    }

    /// Validates and stores the form, then discards it and refetches the
    /// sidebar. On failure the form stays open.
    /// Validates the form and marks a save as running. The returned snapshot
    /// is what gets sent; `is_saving` stays set until `finish_save`.
    pub fn begin_save(&mut self) -> Result<Activity, EditorError> {
        if self.is_saving {
            return Err(EditorError::SaveInFlight);
        }
        let form = self.form.as_ref().ok_or(EditorError::NoActivityLoaded)?;
        validate_activity(form)?;
        let snapshot = form.clone();
        self.is_saving = true;
        Ok(snapshot)
    }

    /// Clears the saving flag. On success the sidebar title is updated and the
    /// form closed; on failure the form is left as it was.
    pub fn finish_save(
        &mut self,
        result: Result<Activity, ApiError>,
    ) -> Result<Activity, EditorError> {
        self.is_saving = false;
        let saved = result?;
        if let Some(activity_id) = saved.id.as_deref() {
            self.activities.rename(activity_id, &saved.title);
        }
        self.discard();
        Ok(saved)
    }

    pub async fn save(&mut self) -> Result<Activity, EditorError> {
        let form = self.begin_save()?;
        let result = match form.id.as_deref() {
            Some(activity_id) => self.backend.update_activity(activity_id, &form).await,
            None => self.backend.create_activity(&form).await,
        };
        let saved = self.finish_save(result)?;

        if let Err(err) = self.refresh_activities().await {
            tracing::warn!(error = %err, "Failed to refresh sidebar after save");
        }
        Ok(saved)
    }

    pub async fn delete_activity(&mut self, activity_id: &str) -> Result<(), EditorError> {
        if !self.activities.contains(activity_id) {
            return Err(EditorError::UnknownEntry(activity_id.to_string()));
        }

        self.backend.delete_activity(activity_id).await?;

        let open = self.form.as_ref().and_then(|form| form.id.as_deref()) == Some(activity_id);
        if open {
            self.discard();
        }
        self.refresh_activities().await
    }

    /// Claims the upload slot for `media_type` on question `index`.
    pub fn begin_question_upload(
        &mut self,
        index: usize,
        media_type: QuestionMediaType,
        file_name: &str,
    ) -> Result<UploadTicket, EditorError> {
        let questions = self.questions()?;
        let question = questions
            .get(index)
            .ok_or(EditorError::QuestionIndexOutOfRange { index, len: questions.len() })?
            .local_id;

        let slot = UploadSlot::QuestionMedia { question, media_type };
        self.uploads.begin(slot, file_name).ok_or(EditorError::UploadInFlight(slot))
    }

    /// Releases the slot and, on success, appends the stored file to the
    /// question the ticket was issued for. Returns `Ok(false)` when that
    /// question or the whole form is gone.
    pub fn complete_question_upload(
        &mut self,
        ticket: UploadTicket,
        result: Result<UploadedMedia, ApiError>,
    ) -> Result<bool, EditorError> {
        let slot = ticket.slot();
        self.uploads.finish(ticket);
        let uploaded = result?;

        let UploadSlot::QuestionMedia { question, media_type } = slot else {
            return Ok(false);
        };

        let Some(form) = self.form.as_mut() else {
            tracing::warn!(question = %question, "Upload finished after the form was closed");
            return Ok(false);
        };

        let entry = MediaRef::new(uploaded.url, media_type);
        match media::attach_media(&form.practice_data.questions, question, entry) {
            Ok(questions) => {
                form.practice_data.questions = questions;
                Ok(true)
            }
            Err(EditorError::UnknownQuestion(_)) => {
                tracing::warn!(question = %question, "Upload finished for a removed question");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn upload_question_media(
        &mut self,
        index: usize,
        media_type: QuestionMediaType,
        file: MediaFile,
    ) -> Result<bool, EditorError> {
        let ticket = self.begin_question_upload(index, media_type, &file.file_name)?;
        let result = self.backend.upload_media(file, media_type.as_str()).await;
        self.complete_question_upload(ticket, result)
    }

    /// Claims the material upload slot. Only one material upload runs at a time.
    pub fn begin_material_upload(&mut self, file_name: &str) -> Result<UploadTicket, EditorError> {
        if self.form.is_none() {
            return Err(EditorError::NoActivityLoaded);
        }
        let slot = UploadSlot::Material { pending: LocalId::new() };
        if self.uploads.is_uploading_material() {
            return Err(EditorError::UploadInFlight(slot));
        }
        self.uploads.begin(slot, file_name).ok_or(EditorError::UploadInFlight(slot))
    }

    /// Releases the slot and, on success, appends a material titled after
    /// the file. A failed upload leaves the material list untouched.
    pub fn complete_material_upload(
        &mut self,
        ticket: UploadTicket,
        result: Result<UploadedMedia, ApiError>,
    ) -> Result<bool, EditorError> {
        let file_name = ticket.file_name().to_string();
        self.uploads.finish(ticket);
        let uploaded = result?;

        let Some(form) = self.form.as_mut() else {
            tracing::warn!(file_name = %file_name, "Upload finished after the form was closed");
            return Ok(false);
        };

        let material =
            uploaded_material(&file_name, uploaded.url, uploaded.media_type.as_deref());
        form.reading_data.materials.push(material);
        Ok(true)
    }

    pub async fn upload_material(&mut self, file: MediaFile) -> Result<bool, EditorError> {
        let ticket = self.begin_material_upload(&file.file_name)?;
        let media_type = media::infer_material_media_type(&file.file_name);
        let result = self.backend.upload_media(file, media_type.as_str()).await;
        self.complete_material_upload(ticket, result)
    }

    fn section_id(&self) -> Result<&str, EditorError> {
        self.section
            .as_ref()
            .map(|section| section.section_id.as_str())
            .ok_or(EditorError::NoSectionLoaded)
    }

    fn session_id(&self) -> Result<&str, EditorError> {
        self.section
            .as_ref()
            .and_then(|section| section.session_id.as_deref())
            .ok_or(EditorError::NoSectionLoaded)
    }

    fn form_mut(&mut self) -> Result<&mut Activity, EditorError> {
        self.form.as_mut().ok_or(EditorError::NoActivityLoaded)
    }

    fn questions(&self) -> Result<&[Question], EditorError> {
        self.form.as_ref().map(Activity::questions).ok_or(EditorError::NoActivityLoaded)
    }

    fn invalidate_loads(&mut self) {
        self.load_generation += 1;
    }

    fn edit_questions<F>(&mut self, change: F) -> Result<(), EditorError>
    where
        F: FnOnce(&[Question]) -> Result<Vec<Question>, EditorError>,
    {
        let form = self.form_mut()?;
        form.practice_data.questions = change(&form.practice_data.questions)?;
        Ok(())
    }

    fn edit_materials<F>(&mut self, change: F) -> Result<(), EditorError>
    where
        F: FnOnce(&[Material]) -> Result<Vec<Material>, EditorError>,
    {
        let form = self.form_mut()?;
        form.reading_data.materials = change(&form.reading_data.materials)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
