use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{insert_record, replace_record, PlanStore, StoreError};
use crate::plan::FlightPlan;

/// Store backed by a single JSON array on disk.
///
/// The whole file is rewritten after each successful write.
#[derive(Debug)]
pub struct JsonFilePlanStore {
    path: PathBuf,
    plans: RwLock<Vec<FlightPlan>>,
}

impl JsonFilePlanStore {
    /// Open the store at `path`; a missing file is an empty store
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let plans: Vec<FlightPlan> = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => Vec::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No store file at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!("[STORE] Loaded {} flight plans from {}", plans.len(), path.display());

        Ok(Self {
            path,
            plans: RwLock::new(plans),
        })
    }

    async fn persist(&self, plans: &[FlightPlan]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(plans)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            warn!("[STORE] Failed to replace {}: {}", self.path.display(), e);
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

impl PlanStore for JsonFilePlanStore {
    async fn list_all(&self) -> Result<Vec<FlightPlan>, StoreError> {
        Ok(self.plans.read().await.clone())
    }

    async fn add(&self, plan: FlightPlan) -> Result<FlightPlan, StoreError> {
        let mut plans = self.plans.write().await;
        let mut next = plans.clone();
        let plan = insert_record(&mut next, plan)?;

        self.persist(&next).await?;
        *plans = next;

        info!("[STORE] Added flight plan {} ({})", plan.name, plan.id);
        Ok(plan)
    }

    async fn update(&self, plan: FlightPlan) -> Result<(), StoreError> {
        let mut plans = self.plans.write().await;
        let mut next = plans.clone();
        let id = plan.id.clone();
        replace_record(&mut next, plan)?;

        self.persist(&next).await?;
        *plans = next;

        info!("[STORE] Updated flight plan {}", id);
        Ok(())
    }
}
