//! Request middleware: request IDs, bearer auth, caller identity, and a
//! per-user rate limit.
//!
//! Identity is central here: every user-scoped route runs behind
//! [`require_user_identity`], which resolves the `x-user-id` header into a
//! [`UserId`] extension, and the rate limiter buckets requests by that same
//! identity so one noisy caller cannot starve the rest.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// The caller's resolved identity, stored as a request extension by
/// [`require_user_identity`]. Handlers on user-scoped routes can rely on it
/// being present.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

/// API key auth settings used by middleware.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<HashSet<String>>,
}

impl AuthState {
    /// Builds auth config from `GENIE_API_KEYS` (comma-separated bearer tokens).
    ///
    /// In development, empty/missing keys disable auth for local iteration.
    /// In non-development envs, empty/missing keys fail startup.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("GENIE_API_KEYS").unwrap_or_default();
        let api_keys: HashSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if api_keys.is_empty() {
            if is_development {
                tracing::warn!(
                    "GENIE_API_KEYS not set; bearer auth disabled in development environment"
                );
            } else {
                anyhow::bail!(
                    "GENIE_API_KEYS is required outside development; provide comma-separated bearer tokens"
                );
            }
        }

        Ok(Self {
            api_keys: Arc::new(api_keys),
        })
    }

    /// Auth is disabled when no keys are configured (development only;
    /// [`AuthState::from_env`] refuses that state elsewhere).
    #[must_use]
    pub fn enabled(&self) -> bool {
        !self.api_keys.is_empty()
    }

    fn allows(&self, token: &str) -> bool {
        self.api_keys.contains(token)
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window request limiter bucketed by caller identity.
///
/// Each user identity gets an independent window; requests without a
/// parseable `x-user-id` share the anonymous (nil UUID) bucket. Expired
/// windows are pruned on every acquire, so the map only holds identities
/// seen within the current window.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    windows: Arc<Mutex<HashMap<Uuid, RateLimitWindow>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Records one request for `key`, returning `false` once the key's
    /// window is full.
    async fn try_acquire(&self, key: Uuid) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        windows.retain(|_, w| now.duration_since(w.started_at) < self.window);

        let entry = windows.entry(key).or_insert(RateLimitWindow {
            started_at: now,
            count: 0,
        });
        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }
}

#[derive(Debug, Serialize)]
struct ErrorShell {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: &'static str,
}

fn error_response(status: StatusCode, code: &'static str, message: &'static str) -> Response {
    (
        status,
        Json(ErrorShell {
            error: ErrorDetail { code, message },
        }),
    )
        .into_response()
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware requiring a well-formed `x-user-id` header.
///
/// Identity is established upstream; here the header is only required to be
/// present and a valid UUID. On success the parsed identity is stored as a
/// [`UserId`] extension for handlers; otherwise the request is rejected with
/// `unauthorized`.
pub async fn require_user_identity(mut req: Request, next: Next) -> Response {
    let Some(user_id) = parse_user_id(req.headers()) else {
        return error_response(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid x-user-id header",
        );
    };

    req.extensions_mut().insert(UserId(user_id));
    next.run(req).await
}

/// Middleware enforcing Bearer token auth when enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled() {
        return next.run(req).await;
    }

    match extract_bearer_token(req.headers().get(AUTHORIZATION)) {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => error_response(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid bearer token",
        ),
    }
}

/// Middleware enforcing the per-user request limit.
///
/// Runs outside [`require_user_identity`], so it parses the identity header
/// itself; anonymous or malformed identities all land in the nil bucket and
/// are rejected later by the identity check where one is required.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let key = parse_user_id(req.headers()).unwrap_or_else(Uuid::nil);

    if rate_limit.try_acquire(key).await {
        next.run(req).await
    } else {
        error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "rate limit exceeded",
        )
    }
}

fn parse_user_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_extraction_requires_the_bearer_scheme() {
        let bearer = HeaderValue::from_static("Bearer test-token");
        assert_eq!(extract_bearer_token(Some(&bearer)), Some("test-token"));

        let basic = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&basic)), None);

        let empty = HeaderValue::from_static("Bearer ");
        assert_eq!(extract_bearer_token(Some(&empty)), None);
    }

    #[test]
    fn auth_state_disables_when_no_keys_in_dev() {
        std::env::remove_var("GENIE_API_KEYS");
        let state = AuthState::from_env(true).expect("dev should allow missing keys");
        assert!(!state.enabled());
    }

    #[test]
    fn parse_user_id_requires_a_well_formed_uuid() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_user_id(&headers), None);

        headers.insert("x-user-id", HeaderValue::from_static("not-a-uuid"));
        assert_eq!(parse_user_id(&headers), None);

        let uuid = Uuid::new_v4();
        headers.insert(
            "x-user-id",
            HeaderValue::from_str(&uuid.to_string()).expect("header"),
        );
        assert_eq!(parse_user_id(&headers), Some(uuid));
    }

    #[tokio::test]
    async fn rate_limit_windows_are_independent_per_user() {
        let state = RateLimitState::new(2, Duration::from_secs(60));
        let chatty = Uuid::new_v4();
        let quiet = Uuid::new_v4();

        assert!(state.try_acquire(chatty).await);
        assert!(state.try_acquire(chatty).await);
        assert!(!state.try_acquire(chatty).await);

        // Another identity is unaffected by the exhausted window.
        assert!(state.try_acquire(quiet).await);
    }

    #[tokio::test]
    async fn rate_limit_window_resets_after_expiry() {
        let state = RateLimitState::new(1, Duration::from_millis(20));
        let user = Uuid::new_v4();

        assert!(state.try_acquire(user).await);
        assert!(!state.try_acquire(user).await);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(state.try_acquire(user).await);
    }
}
