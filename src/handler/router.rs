//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: preflight, body size limits,
//! health checks, uploaded files, then the API.

use crate::api::{self, body::BoxError, ApiError};
use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, CONTENT_LENGTH, IF_NONE_MATCH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Prefix under which stored uploads are served
const UPLOADS_PREFIX: &str = "/uploads/";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let entry = state.config.logging.access_log.then(|| access_entry(&req, peer_addr));

    let mut response = route_request(req, &state).await;
    http::apply_common_headers(&mut response, &state.config.http);

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    // 1. CORS preflight
    if req.method() == Method::OPTIONS {
        return http::build_options_response(state.config.http.enable_cors);
    }

    // 2. Check declared body size
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(&req, max_body_size) {
        return resp;
    }

    // 3. Read the body, enforcing the limit for chunked uploads too
    let (parts, body) = req.into_parts();
    let body = match api::body::read_body(body, max_body_size).await {
        Ok(bytes) => bytes,
        Err(ApiError::PayloadTooLarge(_)) => {
            logger::log_error(&format!(
                "Request body too large (max: {max_body_size}) for {}",
                parts.uri.path()
            ));
            return http::build_413_response();
        }
        Err(e) => {
            logger::log_warning(&format!("{} {}: {e}", parts.method, parts.uri.path()));
            return http::build_text_response(StatusCode::BAD_REQUEST, "400 Bad Request");
        }
    };
    let req = Request::from_parts(parts, body);
    let path = req.uri().path();
    let is_head = req.method() == Method::HEAD;

    // 4. Health check endpoints
    let health = &state.config.health;
    if health.enabled {
        if path == health.liveness_path {
            return http::build_text_response(StatusCode::OK, "ok");
        }
        if path == health.readiness_path {
            return readiness(state);
        }
    }

    // 5. Uploaded files
    if let Some(raw_name) = path.strip_prefix(UPLOADS_PREFIX) {
        if req.method() != Method::GET && !is_head {
            return http::build_405_response("GET, HEAD, OPTIONS");
        }
        // Decoded before the containment check, so `%2F` is still rejected
        let Ok(name) = urlencoding::decode(raw_name) else {
            return http::build_404_response();
        };
        let if_none_match = req
            .headers()
            .get(IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok());
        return static_files::serve_upload(state.uploads.path(), &name, if_none_match, is_head)
            .await;
    }

    // 6. API and admin routes
    if let Some(resp) = api::dispatch(req, state).await {
        return resp;
    }

    http::build_404_response()
}

/// `readyz`: ready once the database answers
fn readiness(state: &AppState) -> Response<Full<Bytes>> {
    match state.store.ping() {
        Ok(()) => http::build_text_response(StatusCode::OK, "ok"),
        Err(e) => {
            logger::log_warning(&format!("Readiness check failed: {e}"));
            http::build_text_response(StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
