pub mod flight_plan;
pub mod waypoint;

pub use flight_plan::{FlightPlan, PlanId};
pub use waypoint::{remove_waypoint, upsert_waypoint, Upsert, Waypoint, WaypointId};
