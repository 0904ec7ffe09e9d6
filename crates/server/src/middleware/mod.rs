//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS
//! 5. Rate limiting (governor, helpful votes only)
//!
//! `RequireUser` / `OptionalUser` are extractors rather than layers.

pub mod rate_limit;
pub mod request_id;
pub mod user;

pub use rate_limit::{ClientIpKeyExtractor, RateLimiterLayer, helpful_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use user::{OptionalUser, RequireUser, USER_ID_HEADER};
