use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderDirection {
    Up,
    Down,
}

impl ReorderDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Which sibling list a reorder applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderTarget {
    Activities,
    Sections,
}

impl ReorderTarget {
    /// Path of the "set absolute order" endpoint.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Activities => "/reorder-activities",
            Self::Sections => "/reorder-sections",
        }
    }
}

impl fmt::Display for ReorderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Activities => "activities",
            Self::Sections => "sections",
        })
    }
}

/// New order after moving `id` one step in `direction`, or `None` when the
/// move is impossible (unknown id, already first, already last).
pub fn plan_reorder(ids: &[String], id: &str, direction: ReorderDirection) -> Option<Vec<String>> {
    let index = ids.iter().position(|candidate| candidate == id)?;
    let neighbour = match direction {
        ReorderDirection::Up => index.checked_sub(1)?,
        ReorderDirection::Down => {
            let next = index + 1;
            if next >= ids.len() {
                return None;
            }
            next
        }
    };

    let mut ordered = ids.to_vec();
    ordered.swap(index, neighbour);
    Some(ordered)
}

/// Outcome of comparing the local sidebar order with a fresh server listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub diverged: bool,
    pub local: Vec<String>,
    pub server: Vec<String>,
}

pub fn reconcile(local: &[String], server: &[String]) -> Reconciliation {
    Reconciliation { diverged: local != server, local: local.to_vec(), server: server.to_vec() }
}
