//! Social backend library: domain, adapters and the request-scoped
//! transactional context that ties them together.

pub mod bootstrap;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::{RequestContext, Trace};
