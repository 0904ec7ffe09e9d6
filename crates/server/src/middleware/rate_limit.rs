//! Rate limiting using governor and `tower_governor`.
//!
//! Only the helpful-vote endpoint is limited: anonymous votes cannot be
//! undone, so the limiter bounds how fast one client can inflate a count.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::error::AppError;

/// Replenish one helpful vote every 2 seconds.
const HELPFUL_REPLENISH_SECS: u64 = 2;
/// Burst of helpful votes allowed per client.
const HELPFUL_BURST: u32 = 10;

/// Key extractor that prefers proxy headers and falls back to the peer address.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        ["cf-connecting-ip", "x-forwarded-for", "x-real-ip"]
            .into_iter()
            .find_map(|name| header_ip(req, name))
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Rate limiter for helpful votes: ~30 per minute per IP, burst of 10.
///
/// Returns `None` if governor rejects the quota.
#[must_use]
pub fn helpful_rate_limiter() -> Option<RateLimiterLayer> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(HELPFUL_REPLENISH_SECS)
        .burst_size(HELPFUL_BURST)
        .finish()?;
    Some(GovernorLayer::new(Arc::new(config)).error_handler(limit_response))
}

/// Render limiter rejections as `AppError` JSON bodies.
fn limit_response(error: GovernorError) -> Response<Body> {
    match error {
        GovernorError::TooManyRequests { .. } => AppError::RateLimited.into_response(),
        GovernorError::UnableToExtractKey => {
            AppError::BadRequest("unable to determine client address".to_string()).into_response()
        }
        other => AppError::Internal(other.to_string()).into_response(),
    }
}
