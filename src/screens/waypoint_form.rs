use crate::plan::{Waypoint, WaypointId};

/// Values held by the waypoint sub-form while it is open
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaypointDraft {
    pub ident: String,
    pub name: String,
    pub altitude: f64,
}

impl From<&Waypoint> for WaypointDraft {
    fn from(waypoint: &Waypoint) -> Self {
        Self {
            ident: waypoint.ident.clone(),
            name: waypoint.name.clone().unwrap_or_default(),
            altitude: waypoint.altitude,
        }
    }
}

/// One open sub-form: the waypoint being edited (if any) plus the draft.
/// Dropping the session discards the draft.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointSession {
    original: Option<Waypoint>,
    pub draft: WaypointDraft,
}

impl WaypointSession {
    pub fn new(original: Option<Waypoint>) -> Self {
        let draft = original.as_ref().map(WaypointDraft::from).unwrap_or_default();
        Self { original, draft }
    }

    pub fn original(&self) -> Option<&Waypoint> {
        self.original.as_ref()
    }

    pub fn is_new(&self) -> bool {
        self.original.is_none()
    }

    /// Build the edited waypoint, keeping the original id when there is one.
    /// Returns `None` when the ident is blank or the altitude is not finite.
    pub fn build(&self) -> Option<Waypoint> {
        let ident = self.draft.ident.trim();
        if ident.is_empty() || !self.draft.altitude.is_finite() {
            return None;
        }

        let name = match self.draft.name.trim() {
            "" => None,
            n => Some(n.to_string()),
        };

        let id = self
            .original
            .as_ref()
            .map(|o| o.id.clone())
            .unwrap_or_else(WaypointId::generate);

        Some(Waypoint::with_id(id, ident.to_string(), name, self.draft.altitude))
    }
}
