//! Service Kit - Consult Tools
//!
//! Each module exposes the operation as a plain async function plus a
//! `Tool` wrapper that parses protocol arguments and delegates to it.

mod compare;
mod consult;
mod list_models;
mod remember;

pub use compare::{compare_models, run_comparison, CompareModelsTool, CompareRequest};
pub use consult::{consult, ConsultTool};
pub use list_models::{list_models, ListModelsTool};
pub use remember::{remember, RememberRequest, RememberTool};
