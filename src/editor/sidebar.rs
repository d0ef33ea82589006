use crate::schemas::activity::{Activity, ActivityType};
use crate::schemas::SectionSummary;
use crate::services::reorder::{plan_reorder, ReorderDirection};

/// One row of the sidebar next to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub id: String,
    pub title: String,
    pub order: u32,
    pub kind: Option<ActivityType>,
    pub is_hidden: bool,
}

impl SidebarEntry {
    /// `None` for documents the server has not stored yet.
    pub fn from_activity(activity: &Activity) -> Option<Self> {
        Some(Self {
            id: activity.id.clone()?,
            title: activity.title.clone(),
            order: activity.order,
            kind: Some(activity.kind),
            is_hidden: activity.is_hidden,
        })
    }
}

impl From<SectionSummary> for SidebarEntry {
    fn from(section: SectionSummary) -> Self {
        Self {
            id: section.id,
            title: section.title,
            order: section.order,
            kind: None,
            is_hidden: false,
        }
    }
}

/// Sibling entries in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidebarList {
    entries: Vec<SidebarEntry>,
}

impl SidebarList {
    pub fn new(mut entries: Vec<SidebarEntry>) -> Self {
        entries.sort_by_key(|entry| entry.order);
        Self { entries }
    }

    pub fn from_activities(activities: &[Activity]) -> Self {
        Self::new(activities.iter().filter_map(SidebarEntry::from_activity).collect())
    }

    pub fn entries(&self) -> &[SidebarEntry] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.id.clone()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Moves `id` one step and renumbers `order`. Returns the new id order,
    /// or `None` if nothing moved.
    pub fn move_entry(&mut self, id: &str, direction: ReorderDirection) -> Option<Vec<String>> {
        let ordered = plan_reorder(&self.ids(), id, direction)?;
        let mut remaining = std::mem::take(&mut self.entries);
        for wanted in &ordered {
            if let Some(position) = remaining.iter().position(|entry| &entry.id == wanted) {
                self.entries.push(remaining.swap_remove(position));
            }
        }
        self.renumber();
        Some(ordered)
    }

    /// Updates the title shown for `id` after a save.
    pub fn rename(&mut self, id: &str, title: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) {
            entry.title = title.to_string();
        }
    }

    fn renumber(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.order = u32::try_from(index).unwrap_or(u32::MAX);
        }
    }
}
