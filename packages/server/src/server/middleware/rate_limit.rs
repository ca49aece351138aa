// Rate limiting for the auth endpoints using tower-governor
//
// Configuration:
// - Bursts of 20 requests per client IP, one more allowed every 10 seconds
// - Client IP comes from X-Forwarded-For / X-Real-IP / Forwarded, then the peer address
//   (SmartIpKeyExtractor)
//
// Applied in app.rs as a layer on the /api/auth routes when AUTH_RATE_LIMIT_ENABLED is set

use axum::Router;
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};

const REPLENISH_SECONDS: u64 = 10;
const BURST_SIZE: u32 = 20;

/// Wrap a router in the per-IP limiter
pub fn rate_limited<S>(router: Router<S>) -> anyhow::Result<Router<S>>
where
    S: Clone + Send + Sync + 'static,
{
    let config = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_second(REPLENISH_SECONDS)
        .burst_size(BURST_SIZE)
        .use_headers()
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?;

    Ok(router.layer(GovernorLayer {
        config: Arc::new(config),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::post,
    };
    use tower::ServiceExt;

    async fn login_from(router: &Router, ip: &str) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap();
        router.clone().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_limits_each_forwarded_client_separately() {
        let router = rate_limited(Router::new().route("/api/auth/login", post(|| async { "ok" })))
            .unwrap();

        for _ in 0..BURST_SIZE {
            assert_eq!(login_from(&router, "203.0.113.7").await, StatusCode::OK);
        }
        assert_eq!(
            login_from(&router, "203.0.113.7").await,
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(login_from(&router, "198.51.100.2").await, StatusCode::OK);
    }
}
