//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such
//! as tracing and the per-request database context.

pub mod db_context;
pub mod trace;

pub use db_context::RequestContext;
pub use trace::Trace;
