use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::validation::{parse_date, validate, Field, FieldErrors, FormValues};
use super::waypoint_form::WaypointSession;
use crate::navigation::Navigator;
use crate::plan::{remove_waypoint, upsert_waypoint, FlightPlan, PlanId, Upsert, Waypoint, WaypointId};
use crate::store::{PlanStore, StoreError};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("cannot {action} while the editor is {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error("waypoint not found: {0}")]
    WaypointNotFound(WaypointId),

    #[error("waypoint id already used: {0}")]
    DuplicateWaypoint(WaypointId),

    #[error("waypoint needs an ident and a finite altitude")]
    InvalidWaypoint,
}

/// Lifecycle of one editor session
#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    Editing,
    WaypointModalOpen(WaypointSession),
    Submitting,
    /// Terminal
    Closed,
}

impl EditorState {
    fn label(&self) -> &'static str {
        match self {
            EditorState::Editing => "editing",
            EditorState::WaypointModalOpen(_) => "editing a waypoint",
            EditorState::Submitting => "submitting",
            EditorState::Closed => "closed",
        }
    }
}

/// Create/edit form for one flight plan.
///
/// The form owns a copy of the plan it was opened with; the working
/// waypoint list is seeded once, at construction.
#[derive(Debug)]
pub struct PlanEditorForm {
    source: Option<FlightPlan>,
    initial: FormValues,
    values: FormValues,
    initial_nodes: Vec<Waypoint>,
    nodes: Vec<Waypoint>,
    touched: BTreeSet<Field>,
    state: EditorState,
    submit_error: Option<String>,
}

impl PlanEditorForm {
    /// `None` starts a new plan dated now
    pub fn new(plan: Option<FlightPlan>) -> Self {
        let (initial, nodes) = match &plan {
            Some(p) => (
                FormValues {
                    name: p.name.clone(),
                    description: p.description.clone(),
                    date: Some(p.date),
                },
                p.nodes.clone(),
            ),
            None => (
                FormValues {
                    name: String::new(),
                    description: String::new(),
                    date: Some(Utc::now()),
                },
                Vec::new(),
            ),
        };

        debug!(
            "Editor opened ({}) with {} waypoints",
            if plan.is_some() { "edit" } else { "create" },
            nodes.len()
        );

        Self {
            source: plan,
            values: initial.clone(),
            initial,
            initial_nodes: nodes.clone(),
            nodes,
            touched: BTreeSet::new(),
            state: EditorState::Editing,
            submit_error: None,
        }
    }

    /// Resolve the plan (if any) from the store and open the form on it
    pub async fn open<S: PlanStore>(store: &S, plan_id: Option<&PlanId>) -> Result<Self, StoreError> {
        let plan = match plan_id {
            Some(id) => Some(store.get(id).await?),
            None => None,
        };
        Ok(Self::new(plan))
    }

    pub fn is_edit_mode(&self) -> bool {
        self.source.is_some()
    }

    pub fn plan_id(&self) -> Option<&PlanId> {
        self.source.as_ref().map(|p| &p.id)
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn nodes(&self) -> &[Waypoint] {
        &self.nodes
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_edit_mode() {
            "Update flight plan"
        } else {
            "Create flight plan"
        }
    }

    // Field editing

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), EditorError> {
        self.require_open("edit the name")?;
        self.values.name = name.into();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), EditorError> {
        self.require_open("edit the description")?;
        self.values.description = description.into();
        Ok(())
    }

    pub fn set_date(&mut self, date: DateTime<Utc>) -> Result<(), EditorError> {
        self.require_open("edit the date")?;
        self.values.date = Some(date);
        self.touched.insert(Field::Date);
        Ok(())
    }

    /// Unparsable text clears the date so validation flags it
    pub fn set_date_text(&mut self, text: &str) -> Result<(), EditorError> {
        self.require_open("edit the date")?;
        self.values.date = parse_date(text);
        self.touched.insert(Field::Date);
        Ok(())
    }

    pub fn blur(&mut self, field: Field) -> Result<(), EditorError> {
        self.require_open("touch a field")?;
        self.touched.insert(field);
        Ok(())
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    pub fn errors(&self) -> FieldErrors {
        validate(&self.values)
    }

    /// Error to display under `field`; hidden until the field is touched
    pub fn visible_error(&self, field: Field) -> Option<String> {
        if !self.is_touched(field) {
            return None;
        }
        self.errors().get(field).map(|s| s.to_string())
    }

    pub fn dirty_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| match f {
                Field::Name => self.values.name != self.initial.name,
                Field::Description => self.values.description != self.initial.description,
                Field::Date => self.values.date != self.initial.date,
            })
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty_fields().is_empty() || self.nodes != self.initial_nodes
    }

    // Waypoint sub-form

    /// Open the waypoint sub-form, pre-filled when `id` names a waypoint
    pub fn open_waypoint(&mut self, id: Option<&WaypointId>) -> Result<(), EditorError> {
        self.require_editing("open a waypoint")?;

        let original = match id {
            Some(id) => Some(
                self.nodes
                    .iter()
                    .find(|w| &w.id == id)
                    .cloned()
                    .ok_or_else(|| EditorError::WaypointNotFound(id.clone()))?,
            ),
            None => None,
        };

        self.state = EditorState::WaypointModalOpen(WaypointSession::new(original));
        Ok(())
    }

    pub fn waypoint_session(&self) -> Option<&WaypointSession> {
        match &self.state {
            EditorState::WaypointModalOpen(session) => Some(session),
            _ => None,
        }
    }

    pub fn waypoint_session_mut(&mut self) -> Option<&mut WaypointSession> {
        match &mut self.state {
            EditorState::WaypointModalOpen(session) => Some(session),
            _ => None,
        }
    }

    /// Confirm the open sub-form and merge its waypoint into the list
    pub fn confirm_waypoint(&mut self) -> Result<Upsert, EditorError> {
        let session = match &self.state {
            EditorState::WaypointModalOpen(session) => session.clone(),
            other => {
                return Err(EditorError::InvalidState {
                    action: "confirm a waypoint",
                    state: other.label(),
                })
            }
        };

        let edited = session.build().ok_or(EditorError::InvalidWaypoint)?;
        let outcome = self.merge_waypoint(session.original(), edited)?;
        self.state = EditorState::Editing;
        Ok(outcome)
    }

    /// Discard the open sub-form
    pub fn cancel_waypoint(&mut self) {
        if let EditorState::WaypointModalOpen(_) = self.state {
            self.state = EditorState::Editing;
        }
    }

    /// Confirm callback of an external waypoint editor
    pub fn apply_waypoint(
        &mut self,
        original: Option<&Waypoint>,
        edited: Waypoint,
    ) -> Result<Upsert, EditorError> {
        if !matches!(
            self.state,
            EditorState::Editing | EditorState::WaypointModalOpen(_)
        ) {
            return Err(EditorError::InvalidState {
                action: "apply a waypoint",
                state: self.state.label(),
            });
        }

        let outcome = self.merge_waypoint(original, edited)?;
        self.state = EditorState::Editing;
        Ok(outcome)
    }

    fn merge_waypoint(
        &mut self,
        original: Option<&Waypoint>,
        edited: Waypoint,
    ) -> Result<Upsert, EditorError> {
        // serde_json writes NaN and infinity as null.
        if edited.ident.trim().is_empty() || !edited.altitude.is_finite() {
            return Err(EditorError::InvalidWaypoint);
        }

        let replacing = original.and_then(|o| self.nodes.iter().position(|w| w.id == o.id));
        let clash = self
            .nodes
            .iter()
            .enumerate()
            .any(|(i, w)| w.id == edited.id && Some(i) != replacing);
        if clash {
            return Err(EditorError::DuplicateWaypoint(edited.id));
        }

        Ok(upsert_waypoint(&mut self.nodes, original, edited))
    }

    pub fn delete_waypoint(&mut self, id: &WaypointId) -> Result<(), EditorError> {
        self.require_editing("delete a waypoint")?;

        if remove_waypoint(&mut self.nodes, id) {
            Ok(())
        } else {
            Err(EditorError::WaypointNotFound(id.clone()))
        }
    }

    // Submission

    /// Validate, write through the store, then pop the editor.
    ///
    /// On a store failure the form goes back to editing with the error
    /// recorded; nothing is retried.
    pub async fn submit<S: PlanStore, N: Navigator>(
        &mut self,
        store: &S,
        nav: &mut N,
    ) -> Result<FlightPlan, EditorError> {
        self.require_editing("submit")?;

        self.touched.extend(Field::ALL);
        let errors = validate(&self.values);
        let date = match (errors.is_empty(), self.values.date) {
            (true, Some(date)) => date,
            _ => {
                warn!("[EDITOR] Submit blocked: {}", errors);
                return Err(EditorError::Validation(errors));
            }
        };

        self.state = EditorState::Submitting;

        let name = self.values.name.clone();
        let description = self.values.description.clone();
        let nodes = self.nodes.clone();

        let result = match &self.source {
            Some(source) => {
                let plan = source.revised(name, date, description, nodes);
                store.update(plan.clone()).await.map(|_| plan)
            }
            None => store.add(FlightPlan::new(name, date, description, nodes)).await,
        };

        match result {
            Ok(plan) => {
                info!("[EDITOR] Saved flight plan {} ({})", plan.name, plan.id);
                self.state = EditorState::Closed;
                self.submit_error = None;
                nav.pop(1);
                Ok(plan)
            }
            Err(e) => {
                error!("[EDITOR] Failed to save flight plan: {}", e);
                self.state = EditorState::Editing;
                self.submit_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Plain text rendering of the form
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("Name: {}\n", self.values.name));
        if let Some(err) = self.visible_error(Field::Name) {
            out.push_str(&format!("  ! {}\n", err));
        }

        out.push_str(&format!("Description: {}\n", self.values.description));
        if let Some(err) = self.visible_error(Field::Description) {
            out.push_str(&format!("  ! {}\n", err));
        }

        match self.values.date {
            Some(date) => out.push_str(&format!("Date: {}\n", date.format("%Y-%m-%d %H:%M"))),
            None => out.push_str("Date: -\n"),
        }
        if let Some(err) = self.visible_error(Field::Date) {
            out.push_str(&format!("  ! {}\n", err));
        }

        out.push_str("Waypoints:\n");
        for w in &self.nodes {
            out.push_str(&format!("  {}  [{}]\n", w, w.id));
        }

        if let Some(err) = &self.submit_error {
            out.push_str(&format!("! {}\n", err));
        }
        out.push_str(&format!("[{}]\n", self.submit_label()));
        out
    }

    fn require_open(&self, action: &'static str) -> Result<(), EditorError> {
        match self.state {
            EditorState::Editing | EditorState::WaypointModalOpen(_) => Ok(()),
            _ => Err(EditorError::InvalidState {
                action,
                state: self.state.label(),
            }),
        }
    }

    fn require_editing(&self, action: &'static str) -> Result<(), EditorError> {
        match self.state {
            EditorState::Editing => Ok(()),
            _ => Err(EditorError::InvalidState {
                action,
                state: self.state.label(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_with_nodes() -> FlightPlan {
        FlightPlan::with_id(
            "p1".into(),
            "Cross country".to_string(),
            Utc::now(),
            "VFR".to_string(),
            vec![
                Waypoint::with_id("n1".into(), "ALPHA".to_string(), None, 5000.0),
                Waypoint::with_id("n2".into(), "BRAVO".to_string(), Some("Bravo NDB".to_string()), 6000.0),
            ],
        )
    }

    #[test]
    fn test_create_mode_defaults() {
        let form = PlanEditorForm::new(None);
        assert!(!form.is_edit_mode());
        assert!(form.values().name.is_empty());
        assert!(form.values().date.is_some());
        assert!(form.nodes().is_empty());
        assert_eq!(form.submit_label(), "Create flight plan");
    }

    #[test]
    fn test_edit_mode_seeds_once() {
        let mut plan = plan_with_nodes();
        let form = PlanEditorForm::new(Some(plan.clone()));

        plan.nodes.clear();
        plan.name = "Changed elsewhere".to_string();

        assert_eq!(form.nodes().len(), 2);
        assert_eq!(form.values().name, "Cross country");
        assert_eq!(form.submit_label(), "Update flight plan");
        assert!(!form.is_dirty());
    }

    #[test]
    fn test_errors_hidden_until_touched() {
        let mut form = PlanEditorForm::new(None);
        assert!(form.errors().get(Field::Name).is_some());
        assert!(form.visible_error(Field::Name).is_none());

        form.blur(Field::Name).unwrap();
        assert_eq!(form.visible_error(Field::Name).as_deref(), Some("Name is required"));
    }

    #[test]
    fn test_confirm_edit_replaces_in_place() {
        let mut form = PlanEditorForm::new(Some(plan_with_nodes()));
        form.open_waypoint(Some(&"n1".into())).unwrap();
        form.waypoint_session_mut().unwrap().draft.altitude = 7500.0;

        let outcome = form.confirm_waypoint().unwrap();

        assert_eq!(outcome, Upsert::Replaced(0));
        assert_eq!(form.nodes().len(), 2);
        assert_eq!(form.nodes()[0].altitude, 7500.0);
        assert_eq!(form.nodes()[0].id.as_str(), "n1");
        assert_eq!(form.state(), &EditorState::Editing);
        assert!(form.is_dirty());
    }

    #[test]
    fn test_confirm_new_appends() {
        let mut form = PlanEditorForm::new(Some(plan_with_nodes()));
        form.open_waypoint(None).unwrap();
        form.waypoint_session_mut().unwrap().draft.ident = "CHARLIE".to_string();

        assert_eq!(form.confirm_waypoint().unwrap(), Upsert::Appended(2));
        assert_eq!(form.nodes()[2].ident, "CHARLIE");
    }

    #[test]
    fn test_confirm_blank_ident_keeps_modal_open() {
        let mut form = PlanEditorForm::new(None);
        form.open_waypoint(None).unwrap();

        assert!(matches!(form.confirm_waypoint(), Err(EditorError::InvalidWaypoint)));
        assert!(form.waypoint_session().is_some());
    }

    #[test]
    fn test_non_finite_altitude_is_refused() {
        let mut form = PlanEditorForm::new(Some(plan_with_nodes()));
        form.open_waypoint(None).unwrap();
        {
            let session = form.waypoint_session_mut().unwrap();
            session.draft.ident = "ALPHA".to_string();
            session.draft.altitude = f64::NAN;
        }

        assert!(matches!(form.confirm_waypoint(), Err(EditorError::InvalidWaypoint)));
        assert_eq!(form.nodes().len(), 2);

        let edited = Waypoint::with_id("n1".into(), "ALPHA".to_string(), None, f64::INFINITY);
        let original = form.nodes()[0].clone();
        form.cancel_waypoint();
        assert!(matches!(
            form.apply_waypoint(Some(&original), edited),
            Err(EditorError::InvalidWaypoint)
        ));
        assert_eq!(form.nodes()[0].altitude, 5000.0);
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut form = PlanEditorForm::new(Some(plan_with_nodes()));
        form.open_waypoint(Some(&"n2".into())).unwrap();
        form.waypoint_session_mut().unwrap().draft.ident = "ZULU".to_string();

        form.cancel_waypoint();

        assert_eq!(form.state(), &EditorState::Editing);
        assert_eq!(form.nodes()[1].ident, "BRAVO");
    }

    #[test]
    fn test_apply_rejects_duplicate_id() {
        let mut form = PlanEditorForm::new(Some(plan_with_nodes()));
        let clash = Waypoint::with_id("n2".into(), "XRAY".to_string(), None, 1000.0);

        let err = form.apply_waypoint(None, clash).unwrap_err();

        assert!(matches!(err, EditorError::DuplicateWaypoint(_)));
        assert_eq!(form.nodes().len(), 2);
    }

    #[test]
    fn test_delete_waypoint() {
        let mut form = PlanEditorForm::new(Some(plan_with_nodes()));
        form.delete_waypoint(&"n1".into()).unwrap();

        assert_eq!(form.nodes().len(), 1);
        assert_eq!(form.nodes()[0].id.as_str(), "n2");
        assert!(matches!(
            form.delete_waypoint(&"n1".into()),
            Err(EditorError::WaypointNotFound(_))
        ));
    }

    #[test]
    fn test_open_unknown_waypoint() {
        let mut form = PlanEditorForm::new(None);
        assert!(matches!(
            form.open_waypoint(Some(&"nope".into())),
            Err(EditorError::WaypointNotFound(_))
        ));
        assert_eq!(form.state(), &EditorState::Editing);
    }

    #[test]
    fn test_no_delete_while_modal_open() {
        let mut form = PlanEditorForm::new(Some(plan_with_nodes()));
        form.open_waypoint(None).unwrap();
        assert!(matches!(
            form.delete_waypoint(&"n1".into()),
            Err(EditorError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_bad_date_text() {
        let mut form = PlanEditorForm::new(None);
        form.set_date_text("not a date").unwrap();
        assert!(form.values().date.is_none());
        assert!(form.visible_error(Field::Date).is_some());
        assert!(form.dirty_fields().contains(&Field::Date));
    }

    #[test]
    fn test_render_lists_waypoints() {
        let form = PlanEditorForm::new(Some(plan_with_nodes()));
        let text = form.render();
        assert!(text.contains("ALPHA @ 5000 ft"));
        assert!(text.contains("BRAVO - Bravo NDB @ 6000 ft"));
        assert!(text.contains("[Update flight plan]"));
    }
}
