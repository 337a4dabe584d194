//! API Module
//!
//! HTTP handlers and routing for the cache maintenance API, used by the
//! scheduled maintenance job and by data-mutation paths.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Storage and activity statistics
//! - `POST /sweep` - Remove expired entries
//! - `POST /invalidate` - Targeted invalidation
//! - `DELETE /namespace/:namespace` - Bulk namespace deletion
//! - `DELETE /cache` - Clear everything

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
