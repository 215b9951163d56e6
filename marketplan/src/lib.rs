//! Marketing plan builder.
//!
//! Helps a business owner draft a six-section marketing plan and generate
//! marketing copy with a hosted language model. The crate is layered:
//!
//! - **[`core`]**: the plan model and pure, deterministic operations over it
//!   (field edits, suggestion merge, completeness, summary export).
//!   No I/O, fully testable in isolation.
//! - **[`schema`]**: request/response types for each generation use case,
//!   request validation and the JSON Schemas constraining model output.
//! - **[`gateway`]**: turns a request into a prompt, calls the model through
//!   the [`gateway::ModelClient`] trait and checks the reply.
//! - **[`io`]**: config, session state, identity and plan storage.
//!
//! [`builder::PlanBuilder`] ties these together; [`project::Project`] loads
//! one from `.marketplan/` for the CLI and the server.

pub mod builder;
pub mod core;
pub mod exit_codes;
pub mod gateway;
pub mod io;
pub mod logging;
pub mod project;
pub mod schema;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
