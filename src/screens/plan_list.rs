use tracing::{error, info, warn};

use crate::navigation::{Navigator, Screen};
use crate::plan::{FlightPlan, PlanId};
use crate::store::{PlanStore, StoreError};

pub const HEADER: &str = "Saved flight plans:";
pub const CREATE_LABEL: &str = "+ Create new flight plan";

/// Issued when a fetch starts; only the newest ticket may apply its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// One selectable list row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRow {
    pub id: PlanId,
    pub label: String,
}

/// List of every stored flight plan
#[derive(Debug)]
pub struct PlanListScreen {
    loading: bool,
    plans: Option<Vec<FlightPlan>>,
    error: Option<String>,
    generation: u64,
}

impl PlanListScreen {
    pub fn new() -> Self {
        Self {
            loading: true,
            plans: None,
            error: None,
            generation: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn plans(&self) -> Option<&[FlightPlan]> {
        self.plans.as_deref()
    }

    /// Message from the last failed fetch, cleared by the next success
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a fetch. Any ticket issued earlier becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket(self.generation)
    }

    /// Apply a fetch result. Returns `false` when the ticket is stale and
    /// the result was dropped.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<FlightPlan>, StoreError>,
    ) -> bool {
        if ticket.0 != self.generation {
            warn!(
                "[LIST] Dropping stale fetch {} (current {})",
                ticket.0, self.generation
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(plans) => {
                info!("[LIST] Loaded {} flight plans", plans.len());
                self.plans = Some(plans);
                self.error = None;
            }
            Err(e) => {
                // Keep whatever was shown before.
                error!("[LIST] Failed to load flight plans: {}", e);
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Fetch every plan and replace local state
    pub async fn refresh<S: PlanStore>(&mut self, store: &S) -> bool {
        let ticket = self.begin_fetch();
        let result = store.list_all().await;
        self.finish_fetch(ticket, result)
    }

    pub async fn mount<S: PlanStore>(&mut self, store: &S) -> bool {
        self.refresh(store).await
    }

    pub async fn on_focus<S: PlanStore>(&mut self, store: &S) -> bool {
        self.refresh(store).await
    }

    pub fn rows(&self) -> Vec<PlanRow> {
        self.plans
            .iter()
            .flatten()
            .map(|p| PlanRow {
                id: p.id.clone(),
                label: p.name.clone(),
            })
            .collect()
    }

    /// Open the editor for an existing plan
    pub fn select<N: Navigator>(&self, id: &PlanId, nav: &mut N) {
        nav.navigate(Screen::PlanEditor {
            plan_id: Some(id.clone()),
        });
    }

    /// Open the editor with an empty plan
    pub fn create<N: Navigator>(&self, nav: &mut N) {
        nav.navigate(Screen::PlanEditor { plan_id: None });
    }

    /// Plain text rendering of the screen
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(CREATE_LABEL);
        out.push('\n');
        out.push_str(HEADER);
        out.push('\n');

        if let Some(err) = &self.error {
            out.push_str(&format!("  ! {}\n", err));
        }

        if self.loading && self.plans.is_none() {
            out.push_str("  Loading...\n");
            return out;
        }

        for row in self.rows() {
            out.push_str(&format!("  {}  [{}]\n", row.label, row.id));
        }
        out
    }
}

impl Default for PlanListScreen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavigationStack;
    use chrono::Utc;

    fn plan(id: &str, name: &str) -> FlightPlan {
        FlightPlan::with_id(id.into(), name.to_string(), Utc::now(), String::new(), vec![])
    }

    #[test]
    fn test_initial_state() {
        let screen = PlanListScreen::new();
        assert!(screen.is_loading());
        assert!(screen.plans().is_none());
        assert!(screen.rows().is_empty());
    }

    #[test]
    fn test_stale_fetch_is_dropped() {
        let mut screen = PlanListScreen::new();
        let first = screen.begin_fetch();
        let second = screen.begin_fetch();

        assert!(screen.finish_fetch(second, Ok(vec![plan("p2", "Newer")])));
        assert!(!screen.finish_fetch(first, Ok(vec![plan("p1", "Older")])));

        assert_eq!(screen.rows()[0].label, "Newer");
        assert!(!screen.is_loading());
    }

    #[test]
    fn test_older_fetch_finishing_first_keeps_loading() {
        let mut screen = PlanListScreen::new();
        let first = screen.begin_fetch();
        let second = screen.begin_fetch();

        assert!(!screen.finish_fetch(first, Ok(vec![])));
        assert!(screen.is_loading());

        assert!(screen.finish_fetch(second, Ok(vec![plan("p1", "Only")])));
        assert_eq!(screen.rows().len(), 1);
    }

    #[test]
    fn test_failed_fetch_keeps_previous_plans() {
        let mut screen = PlanListScreen::new();
        let t = screen.begin_fetch();
        screen.finish_fetch(t, Ok(vec![plan("p1", "Kept")]));

        let t = screen.begin_fetch();
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        screen.finish_fetch(t, Err(err.into()));

        assert_eq!(screen.rows()[0].label, "Kept");
        assert!(screen.error().unwrap().contains("disk gone"));
        assert!(screen.render().contains("disk gone"));
    }

    #[test]
    fn test_select_and_create_navigate() {
        let screen = PlanListScreen::new();
        let mut nav = NavigationStack::new();

        screen.select(&"p1".into(), &mut nav);
        assert_eq!(nav.current(), &Screen::PlanEditor { plan_id: Some("p1".into()) });

        nav.pop(1);
        screen.create(&mut nav);
        assert_eq!(nav.current(), &Screen::PlanEditor { plan_id: None });
    }
}
