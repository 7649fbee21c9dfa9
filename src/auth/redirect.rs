//! Where to send a user after they log in.
//!
//! Protected pages redirect to the log-in page with the page they asked for
//! in the `redirect_url` query parameter. Only same-site paths are accepted so
//! that the parameter cannot be used to bounce users to another site.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// Pages that should never be used as a post log-in destination.
const UNSAFE_TARGETS: [&str; 3] = [
    endpoints::LOG_IN_VIEW,
    endpoints::SIGN_UP_VIEW,
    endpoints::LOG_OUT,
];

fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map_or(redirect_url, |(path, _)| path);

    !UNSAFE_TARGETS.contains(&path)
}

/// Reduce `raw_url` to a same-site path and query.
///
/// Absolute URLs are rejected unless `allow_absolute` is set, in which case
/// only their path and query are kept. HTMX sends the current page as an
/// absolute URL, while a `redirect_url` query parameter must always be a path.
fn to_safe_path(raw_url: &str, allow_absolute: bool) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if !allow_absolute && (uri.scheme().is_some() || uri.authority().is_some()) {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();
    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// Validate a `redirect_url` submitted by the client.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    to_safe_path(raw_url, false)
}

/// The log-in URL that will send the user back to what `request` was trying to reach.
///
/// For API requests made by HTMX, the target is the page the user was on,
/// taken from the `HX-Current-URL` header.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request)?
    } else {
        to_safe_path(request.uri().path_and_query()?.as_str(), false)?
    };

    build_log_in_redirect_url_from_target(&target)
}

pub(super) fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    serde_urlencoded::to_string([("redirect_url", redirect_target)])
        .map(|param| format!("{}?{param}", endpoints::LOG_IN_VIEW))
        .inspect_err(|error| {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}")
        })
        .ok()
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        tracing::warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let Some(current_url) = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    else {
        tracing::warn!("Missing HX-Current-URL header for /api request.");
        return None;
    };

    let redirect_url = to_safe_path(current_url, true);
    if redirect_url.is_none() {
        tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}
