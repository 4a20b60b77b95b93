use serde::{Deserialize, Serialize};
use tracing::debug;

/// Waypoint identifier, unique within one flight plan
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaypointId(String);

impl WaypointId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WaypointId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WaypointId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for WaypointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single route point (a "node" or steerpoint)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub ident: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Feet
    pub altitude: f64,
}

impl Waypoint {
    pub fn new(ident: String, name: Option<String>, altitude: f64) -> Self {
        Self::with_id(WaypointId::generate(), ident, name, altitude)
    }

    pub fn with_id(id: WaypointId, ident: String, name: Option<String>, altitude: f64) -> Self {
        Self {
            id,
            ident,
            name,
            altitude,
        }
    }
}

impl std::fmt::Display for Waypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) if !name.is_empty() => {
                write!(f, "{} - {} @ {} ft", self.ident, name, self.altitude)
            }
            _ => write!(f, "{} @ {} ft", self.ident, self.altitude),
        }
    }
}

/// Outcome of [`upsert_waypoint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Replaced(usize),
    Appended(usize),
}

/// Replace `original` in place when it is present, otherwise append `edited`.
///
/// Lookup is by the original's id only. A `None` original, or one that is
/// no longer in `nodes`, always appends.
pub fn upsert_waypoint(
    nodes: &mut Vec<Waypoint>,
    original: Option<&Waypoint>,
    edited: Waypoint,
) -> Upsert {
    let index = original.and_then(|o| nodes.iter().position(|w| w.id == o.id));

    match index {
        Some(index) => {
            debug!("Replacing waypoint {} at index {}", edited.ident, index);
            nodes[index] = edited;
            Upsert::Replaced(index)
        }
        None => {
            debug!("Appending waypoint {}", edited.ident);
            nodes.push(edited);
            Upsert::Appended(nodes.len() - 1)
        }
    }
}

/// Remove the waypoint with `id`, keeping the others in order.
pub fn remove_waypoint(nodes: &mut Vec<Waypoint>, id: &WaypointId) -> bool {
    match nodes.iter().position(|w| &w.id == id) {
        Some(index) => {
            let removed = nodes.remove(index);
            debug!("Removed waypoint {} from index {}", removed.ident, index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(id: &str, ident: &str, altitude: f64) -> Waypoint {
        Waypoint::with_id(id.into(), ident.to_string(), None, altitude)
    }

    fn sample() -> Vec<Waypoint> {
        vec![
            wp("n1", "ALPHA", 5000.0),
            wp("n2", "BRAVO", 6000.0),
            wp("n3", "CHARLIE", 7000.0),
        ]
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut nodes = sample();
        let original = nodes[1].clone();
        let edited = wp("n2", "BRAVO", 9000.0);

        let outcome = upsert_waypoint(&mut nodes, Some(&original), edited);

        assert_eq!(outcome, Upsert::Replaced(1));
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[1].altitude, 9000.0);
        assert_eq!(nodes[0].ident, "ALPHA");
        assert_eq!(nodes[2].ident, "CHARLIE");
    }

    #[test]
    fn test_upsert_without_original_appends() {
        let mut nodes = sample();

        let outcome = upsert_waypoint(&mut nodes, None, wp("n4", "DELTA", 8000.0));

        assert_eq!(outcome, Upsert::Appended(3));
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[3].ident, "DELTA");
    }

    #[test]
    fn test_upsert_missing_original_appends() {
        let mut nodes = sample();
        let stale = wp("gone", "ECHO", 1000.0);

        let outcome = upsert_waypoint(&mut nodes, Some(&stale), wp("gone", "ECHO", 2000.0));

        assert_eq!(outcome, Upsert::Appended(3));
        assert_eq!(nodes.len(), 4);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut nodes = sample();

        assert!(remove_waypoint(&mut nodes, &"n2".into()));

        let idents: Vec<&str> = nodes.iter().map(|w| w.ident.as_str()).collect();
        assert_eq!(idents, vec!["ALPHA", "CHARLIE"]);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut nodes = sample();
        assert!(!remove_waypoint(&mut nodes, &"n9".into()));
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn test_display() {
        let named = Waypoint::with_id("n1".into(), "ALPHA".to_string(), Some("Alpha VOR".to_string()), 5000.0);
        assert_eq!(named.to_string(), "ALPHA - Alpha VOR @ 5000 ft");
        assert_eq!(wp("n2", "BRAVO", 6500.0).to_string(), "BRAVO @ 6500 ft");
    }
}
