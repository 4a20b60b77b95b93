use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::waypoint::Waypoint;

/// Opaque flight plan identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(String);

impl PlanId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlanId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlanId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, dated route made of ordered waypoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPlan {
    pub id: PlanId,
    pub name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<Waypoint>,
}

impl FlightPlan {
    /// Create a plan with a freshly generated id
    pub fn new(name: String, date: DateTime<Utc>, description: String, nodes: Vec<Waypoint>) -> Self {
        Self::with_id(PlanId::generate(), name, date, description, nodes)
    }

    pub fn with_id(
        id: PlanId,
        name: String,
        date: DateTime<Utc>,
        description: String,
        nodes: Vec<Waypoint>,
    ) -> Self {
        Self {
            id,
            name,
            date,
            description,
            nodes,
        }
    }

    /// Copy of this plan with every mutable field replaced; the id is kept.
    pub fn revised(
        &self,
        name: String,
        date: DateTime<Utc>,
        description: String,
        nodes: Vec<Waypoint>,
    ) -> Self {
        Self::with_id(self.id.clone(), name, date, description, nodes)
    }
}

impl std::fmt::Display for FlightPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) {}",
            self.name,
            self.id,
            self.date.format("%Y-%m-%d %H:%M")
        )
    }
}
