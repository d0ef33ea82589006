use std::collections::HashMap;
use std::fmt;

use crate::schemas::question::{LocalId, QuestionMediaType};

/// What an upload is for. Questions are addressed by their stable client id,
/// so a running upload survives reordering or deleting other questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadSlot {
    QuestionMedia { question: LocalId, media_type: QuestionMediaType },
    /// A material that will be appended once its file is stored.
    Material { pending: LocalId },
}

impl fmt::Display for UploadSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuestionMedia { question, media_type } => {
                write!(f, "{} media of question {}", media_type.as_str(), question)
            }
            Self::Material { pending } => write!(f, "material {pending}"),
        }
    }
}

/// Proof that a slot was claimed. Hand it back to `UploadTracker::finish`.
#[derive(Debug, PartialEq, Eq)]
pub struct UploadTicket {
    slot: UploadSlot,
    file_name: String,
}

impl UploadTicket {
    pub fn slot(&self) -> UploadSlot {
        self.slot
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Per-target upload flags. At most one upload runs per slot.
#[derive(Debug, Default)]
pub struct UploadTracker {
    running: HashMap<UploadSlot, String>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `slot`, or returns `None` while another upload holds it.
    pub fn begin(
        &mut self,
        slot: UploadSlot,
        file_name: impl Into<String>,
    ) -> Option<UploadTicket> {
        if self.running.contains_key(&slot) {
            return None;
        }
        let file_name = file_name.into();
        self.running.insert(slot, file_name.clone());
        Some(UploadTicket { slot, file_name })
    }

    pub fn finish(&mut self, ticket: UploadTicket) {
        self.running.remove(&ticket.slot);
    }

    pub fn is_uploading(&self, slot: &UploadSlot) -> bool {
        self.running.contains_key(slot)
    }

    /// True while any media upload for `question` is running.
    pub fn is_uploading_question(&self, question: LocalId) -> bool {
        self.running.keys().any(|slot| {
            matches!(slot, UploadSlot::QuestionMedia { question: id, .. } if *id == question)
        })
    }

    pub fn is_uploading_material(&self) -> bool {
        self.running.keys().any(|slot| matches!(slot, UploadSlot::Material { .. }))
    }

    /// File names of running uploads, for progress display.
    pub fn in_flight(&self) -> impl Iterator<Item = (&UploadSlot, &str)> {
        self.running.iter().map(|(slot, name)| (slot, name.as_str()))
    }

    pub fn clear(&mut self) {
        self.running.clear();
    }
}
