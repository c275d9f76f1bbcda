//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span)
//! 4. CORS
//! 5. Error detail (development only)
//!
//! The API token check is an extractor on the customer handlers.

pub mod auth;
pub mod request_id;

pub use auth::{RequireApiToken, TokenRejection};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
