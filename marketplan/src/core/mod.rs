//! Deterministic, pure plan logic.
//!
//! Core modules are free of I/O side effects. They take a plan by reference
//! and return new values; persisting them is the caller's job.

pub mod field_update;
pub mod merge;
pub mod plan;
pub mod progress;
pub mod section;
pub mod steps;
pub mod summary;
pub mod types;

pub use field_update::{append_item, read_field, remove_item, update_field};
pub use merge::merge_suggestions;
pub use plan::MarketingPlan;
pub use progress::{Progress, SectionProgress, is_section_complete, progress};
pub use section::{PlanSection, get_section};
pub use steps::{FieldKind, FieldSpec, StepView, step_view, steps};
pub use summary::generate_summary_text;
pub use types::{PlanError, SectionKey};
