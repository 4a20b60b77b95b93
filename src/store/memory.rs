use tokio::sync::RwLock;
use tracing::info;

use super::{insert_record, replace_record, PlanStore, StoreError};
use crate::plan::FlightPlan;

/// In-process store, mostly for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryPlanStore {
    plans: RwLock<Vec<FlightPlan>>,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(plans: Vec<FlightPlan>) -> Self {
        Self {
            plans: RwLock::new(plans),
        }
    }

    pub async fn len(&self) -> usize {
        self.plans.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.plans.read().await.is_empty()
    }
}

impl PlanStore for MemoryPlanStore {
    async fn list_all(&self) -> Result<Vec<FlightPlan>, StoreError> {
        Ok(self.plans.read().await.clone())
    }

    async fn add(&self, plan: FlightPlan) -> Result<FlightPlan, StoreError> {
        let mut plans = self.plans.write().await;
        let plan = insert_record(&mut plans, plan)?;
        info!("[STORE] Added flight plan {} ({})", plan.name, plan.id);
        Ok(plan)
    }

    async fn update(&self, plan: FlightPlan) -> Result<(), StoreError> {
        let mut plans = self.plans.write().await;
        let id = plan.id.clone();
        replace_record(&mut plans, plan)?;
        info!("[STORE] Updated flight plan {}", id);
        Ok(())
    }
}
