//! Durable flight plan storage.

mod json_file;
mod memory;

pub use json_file::JsonFilePlanStore;
pub use memory::MemoryPlanStore;

use thiserror::Error;

use crate::plan::{FlightPlan, PlanId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("flight plan not found: {0}")]
    NotFound(PlanId),

    #[error("flight plan already exists: {0}")]
    AlreadyExists(PlanId),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// CRUD access to flight plan records, keyed by plan id.
///
/// Every call is a suspension point. There is no locking across calls, so
/// two writers racing on the same id resolve as last-write-wins.
#[allow(async_fn_in_trait)]
pub trait PlanStore {
    /// All stored plans in insertion order
    async fn list_all(&self) -> Result<Vec<FlightPlan>, StoreError>;

    /// Store a new plan under its own id
    async fn add(&self, plan: FlightPlan) -> Result<FlightPlan, StoreError>;

    /// Replace the stored plan with the same id
    async fn update(&self, plan: FlightPlan) -> Result<(), StoreError>;

    async fn get(&self, id: &PlanId) -> Result<FlightPlan, StoreError> {
        self.list_all()
            .await?
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

/// Insert into an ordered record list, rejecting duplicate ids
fn insert_record(records: &mut Vec<FlightPlan>, plan: FlightPlan) -> Result<FlightPlan, StoreError> {
    if records.iter().any(|p| p.id == plan.id) {
        return Err(StoreError::AlreadyExists(plan.id));
    }
    records.push(plan.clone());
    Ok(plan)
}

/// Replace a record in place by id
fn replace_record(records: &mut [FlightPlan], plan: FlightPlan) -> Result<(), StoreError> {
    match records.iter_mut().find(|p| p.id == plan.id) {
        Some(slot) => {
            *slot = plan;
            Ok(())
        }
        None => Err(StoreError::NotFound(plan.id)),
    }
}
