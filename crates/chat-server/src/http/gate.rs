//! Protected-route gate.
//!
//! Anonymous requests under a protected prefix are redirected (307) to
//! `/auth/signin?callbackUrl=<path>`. Everything else passes through.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use reqwest::Url;

use crate::state::AppState;

pub const SIGN_IN_PATH: &str = "/auth/signin";

pub async fn protected_route_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if !is_protected(&state.protected_routes, &path) {
        return next.run(request).await;
    }
    if state.identity.identify(request.headers()).await.is_some() {
        return next.run(request).await;
    }
    log::info!("Redirecting anonymous request for {} to sign-in", path);
    Redirect::temporary(&sign_in_location(&path)).into_response()
}

pub fn is_protected(prefixes: &[String], path: &str) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

/// Relative sign-in location carrying `path` as the callback.
pub fn sign_in_location(path: &str) -> String {
    // The host is a placeholder; only path and query are kept.
    match Url::parse(&format!("http://localhost{}", SIGN_IN_PATH)) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("callbackUrl", path);
            format!("{}?{}", url.path(), url.query().unwrap_or_default())
        }
        Err(_) => SIGN_IN_PATH.to_string(),
    }
}
