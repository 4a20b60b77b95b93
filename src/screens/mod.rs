pub mod plan_editor;
pub mod plan_list;
pub mod validation;
pub mod waypoint_form;

pub use plan_editor::{EditorError, EditorState, PlanEditorForm};
pub use plan_list::{FetchTicket, PlanListScreen, PlanRow};
pub use validation::{validate, Field, FieldErrors, FormValues};
pub use waypoint_form::{WaypointDraft, WaypointSession};
