use tracing::info;

use crate::plan::PlanId;

/// Screens reachable in the app
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    PlanList,
    /// `None` creates a new plan, `Some` edits an existing one
    PlanEditor { plan_id: Option<PlanId> },
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::PlanList => "FlightPlans",
            Screen::PlanEditor { plan_id: None } => "FlightPlanCustomForm",
            Screen::PlanEditor { plan_id: Some(_) } => "FlightPlanDetails",
        }
    }
}

pub trait Navigator {
    fn navigate(&mut self, screen: Screen);

    fn pop(&mut self, count: usize);

    fn current(&self) -> &Screen;
}

/// Stack navigator rooted at the plan list. The root is never popped.
#[derive(Debug, Clone)]
pub struct NavigationStack {
    stack: Vec<Screen>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self {
            stack: vec![Screen::PlanList],
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for NavigationStack {
    fn navigate(&mut self, screen: Screen) {
        info!("[NAV] -> {}", screen.name());
        self.stack.push(screen);
    }

    fn pop(&mut self, count: usize) {
        let keep = self.stack.len().saturating_sub(count).max(1);
        self.stack.truncate(keep);
        info!("[NAV] <- {}", self.current().name());
    }

    fn current(&self) -> &Screen {
        // The root entry is never removed.
        &self.stack[self.stack.len() - 1]
    }
}
