// API module entry
// Gallery/events REST endpoints and the admin surface

mod admin;
pub mod body;
mod error;
mod events;
mod gallery;
mod response;
mod types;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};

use crate::config::AppState;
use crate::logger;

pub use error::ApiError;
pub use response::{error_response, json_response};

/// Every path the API answers on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Gallery,
    GalleryFeatured,
    GalleryItem(i64),
    Events,
    EventsUpcoming,
    EventItem(i64),
    Admin,
    AdminUpload,
    AdminGallery,
    AdminEvents,
}

impl Route {
    /// Match an exact request path; ids must be plain decimal digits
    pub fn parse(path: &str) -> Option<Self> {
        let route = match path {
            "/api/gallery" => Self::Gallery,
            "/api/gallery/featured" => Self::GalleryFeatured,
            "/api/events" => Self::Events,
            "/api/events/upcoming" => Self::EventsUpcoming,
            "/admin" => Self::Admin,
            "/admin/upload" => Self::AdminUpload,
            "/admin/gallery" => Self::AdminGallery,
            "/admin/events" => Self::AdminEvents,
            _ => {
                if let Some(id) = path.strip_prefix("/api/gallery/") {
                    Self::GalleryItem(parse_id(id)?)
                } else if let Some(id) = path.strip_prefix("/api/events/") {
                    Self::EventItem(parse_id(id)?)
                } else {
                    return None;
                }
            }
        };
        Some(route)
    }

    /// `Allow` header value for a 405 on this path
    pub const fn allowed_methods(self) -> &'static str {
        match self {
            Self::Gallery | Self::Events => "GET, HEAD, POST, OPTIONS",
            Self::GalleryItem(_) | Self::EventItem(_) => "PUT, DELETE, OPTIONS",
            Self::AdminUpload => "POST, OPTIONS",
            Self::GalleryFeatured
            | Self::EventsUpcoming
            | Self::Admin
            | Self::AdminGallery
            | Self::AdminEvents => "GET, HEAD, OPTIONS",
        }
    }
}

fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Dispatch a fully read request to its API handler.
///
/// Returns `None` when the path is not an API path. Handler errors are turned
/// into `{"error": ...}` responses here.
pub async fn dispatch(req: Request<Bytes>, state: &AppState) -> Option<Response<Full<Bytes>>> {
    let route = Route::parse(req.uri().path())?;

    let (parts, body) = req.into_parts();
    let is_head = parts.method == Method::HEAD;
    let method = if is_head { Method::GET } else { parts.method.clone() };

    let result = match (route, method) {
        (Route::Gallery | Route::AdminGallery, Method::GET) => gallery::list(state, false),
        (Route::Gallery, Method::POST) => gallery::create(state, &body),
        (Route::GalleryFeatured, Method::GET) => gallery::list(state, true),
        (Route::GalleryItem(id), Method::PUT) => gallery::update(state, id, &body),
        (Route::GalleryItem(id), Method::DELETE) => gallery::delete(state, id),
        (Route::Events | Route::AdminEvents, Method::GET) => events::list(state),
        (Route::Events, Method::POST) => events::create(state, &parts.headers, body).await,
        (Route::EventsUpcoming, Method::GET) => events::upcoming(state),
        (Route::EventItem(id), Method::PUT) => events::update(state, id, &body),
        (Route::EventItem(id), Method::DELETE) => events::delete(state, id),
        (Route::Admin, Method::GET) => Ok(admin::serve_dashboard(is_head)),
        (Route::AdminUpload, Method::POST) => admin::upload(state, &parts.headers, body).await,
        (route, method) => {
            logger::log_warning(&format!(
                "Method not allowed: {method} {}",
                parts.uri.path()
            ));
            return Some(crate::http::build_405_response(route.allowed_methods()));
        }
    };

    Some(result.unwrap_or_else(|e| {
        logger::log_request_failure(
            parts.method.as_str(),
            parts.uri.path(),
            e.status().as_u16(),
            &e.to_string(),
        );
        error_response(&e)
    }))
}

#[cfg(test)]
mod tests {
    use super::body::tests::{multipart_body, multipart_content_type};
    use super::*;
    use crate::store::timestamp;
    use http_body_util::BodyExt;
    use hyper::header::CONTENT_TYPE;
    use hyper::StatusCode;
    use serde_json::Value;

    async fn call(
        state: &AppState,
        method: Method,
        path: &str,
        body: &str,
    ) -> Response<Full<Bytes>> {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Bytes::from(body.to_string()))
            .expect("request");
        dispatch(req, state).await.expect("api route")
    }

    async fn call_form(
        state: &AppState,
        path: &str,
        fields: &[(&str, &str)],
        files: &[(&str, &str, &[u8])],
    ) -> Response<Full<Bytes>> {
        let req = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(CONTENT_TYPE, multipart_content_type())
            .body(Bytes::from(multipart_body(fields, files)))
            .expect("request");
        dispatch(req, state).await.expect("api route")
    }

    async fn json_of(resp: Response<Full<Bytes>>) -> Value {
        let bytes = resp.into_body().collect().await.expect("body").to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[test]
    fn test_route_parse() {
        assert_eq!(Route::parse("/api/gallery"), Some(Route::Gallery));
        assert_eq!(Route::parse("/api/gallery/featured"), Some(Route::GalleryFeatured));
        assert_eq!(Route::parse("/api/gallery/42"), Some(Route::GalleryItem(42)));
        assert_eq!(Route::parse("/api/events/upcoming"), Some(Route::EventsUpcoming));
        assert_eq!(Route::parse("/api/events/7"), Some(Route::EventItem(7)));
        assert_eq!(Route::parse("/admin/upload"), Some(Route::AdminUpload));
        assert_eq!(Route::parse("/api/gallery/"), None);
        assert_eq!(Route::parse("/api/gallery/-1"), None);
        assert_eq!(Route::parse("/api/events/abc"), None);
        assert_eq!(Route::parse("/api/events/upcoming/"), None);
        assert_eq!(Route::parse("/api/gallery/99999999999999999999"), None);
        assert_eq!(Route::parse("/uploads/a.png"), None);
    }

    #[tokio::test]
    async fn test_not_an_api_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());
        let req = Request::get("/nowhere").body(Bytes::new()).expect("request");
        assert!(dispatch(req, &state).await.is_none());
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());
        let resp = call(&state, Method::GET, "/api/gallery/1", "").await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["Allow"], "PUT, DELETE, OPTIONS");
    }

    #[tokio::test]
    async fn test_gallery_create_with_title_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());

        let resp = call(&state, Method::POST, "/api/gallery", r#"{"title": "Sunset"}"#).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = json_of(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["image"]["title"], "Sunset");
        assert_eq!(body["image"]["description"], "");
        assert_eq!(body["image"]["image_url"], "");
        assert_eq!(body["image"]["is_featured"], false);
        assert_eq!(body["image"]["tags"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_gallery_create_requires_body() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());

        let resp = call(&state, Method::POST, "/api/gallery", "").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_of(resp).await["error"], "expected a JSON body");
        assert!(state.store.list_gallery(false).expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_gallery_update_with_empty_body_keeps_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());

        let pier = r#"{"title": "Pier", "description": "dusk",
            "is_featured": true, "tags": "sea,night"}"#;
        let created = json_of(call(&state, Method::POST, "/api/gallery", pier).await).await;
        let id = created["image"]["id"].as_i64().expect("id");

        let resp = call(&state, Method::PUT, &format!("/api/gallery/{id}"), "{}").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated = json_of(resp).await;
        assert_eq!(updated["image"], created["image"]);
    }

    #[tokio::test]
    async fn test_featured_listing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());
        call(&state, Method::POST, "/api/gallery", r#"{"title": "a"}"#).await;
        call(&state, Method::POST, "/api/gallery", r#"{"title": "b", "is_featured": true}"#).await;

        let all = json_of(call(&state, Method::GET, "/api/gallery", "").await).await;
        assert_eq!(all["gallery"].as_array().expect("array").len(), 2);

        let featured = json_of(call(&state, Method::GET, "/api/gallery/featured", "").await).await;
        let featured = featured["gallery"].as_array().expect("array");
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0]["title"], "b");
    }

    #[tokio::test]
    async fn test_missing_records_are_404() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());

        let resp = call(&state, Method::DELETE, "/api/gallery/99999", "").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(json_of(resp).await["error"].is_string());

        let resp = call(&state, Method::PUT, "/api/events/99999", "{}").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_event_without_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());

        let resp = call_form(
            &state,
            "/api/events",
            &[
                ("title", "Launch"),
                ("event_date", "2030-01-01T10:00:00"),
                ("is_featured", "true"),
            ],
            &[],
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = json_of(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["event"]["image_filename"], "");
        assert_eq!(body["event"]["tags"], serde_json::json!([]));
        assert_eq!(body["event"]["is_featured"], true);
        assert_eq!(body["event"]["event_date"], "2030-01-01T10:00:00");
        assert_eq!(body["event"]["is_past"], false);
    }

    #[tokio::test]
    async fn test_create_event_with_utc_date() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());

        let resp = call_form(
            &state,
            "/api/events",
            &[("title", "Launch"), ("event_date", "2030-01-01T10:00:00.000Z")],
            &[],
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let expected = chrono::DateTime::parse_from_rfc3339("2030-01-01T10:00:00Z")
            .expect("instant")
            .with_timezone(&chrono::Local)
            .naive_local();
        let body = json_of(resp).await;
        assert_eq!(body["event"]["event_date"], timestamp::to_iso(&expected));
    }

    #[tokio::test]
    async fn test_create_event_ignores_bad_image() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());

        let resp = call_form(
            &state,
            "/api/events",
            &[("title", "Gig"), ("event_date", "2031-05-05")],
            &[("image_file", "poster.exe", b"MZ")],
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(json_of(resp).await["event"]["image_filename"], "");
    }

    #[tokio::test]
    async fn test_create_event_with_image() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());

        let resp = call_form(
            &state,
            "/api/events",
            &[("title", "Gig"), ("event_date", "2031-05-05"), ("tags", "live, music")],
            &[("image_file", "poster.PNG", b"\x89PNG")],
        )
        .await;
        let body = json_of(resp).await;
        let stored = body["event"]["image_filename"].as_str().expect("name");
        assert!(stored.ends_with("_poster.PNG"));
        assert!(state.uploads.path().join(stored).is_file());
        assert_eq!(body["event"]["tags"], serde_json::json!(["live", "music"]));
    }

    #[tokio::test]
    async fn test_create_event_requires_title_and_date() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());

        let resp = call_form(&state, "/api/events", &[("title", "Launch")], &[]).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_of(resp).await["error"], "event_date is required");

        let resp = call_form(
            &state,
            "/api/events",
            &[("title", "Launch"), ("event_date", "tomorrow")],
            &[("image_file", "poster.png", b"png")],
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let leftover = std::fs::read_dir(state.uploads.path()).expect("dir").count();
        assert_eq!(leftover, 0);
    }

    #[tokio::test]
    async fn test_event_update_and_delete() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());
        let created = json_of(
            call_form(
                &state,
                "/api/events",
                &[("title", "Launch"), ("event_date", "2030-01-01T10:00:00")],
                &[],
            )
            .await,
        )
        .await;
        let id = created["event"]["id"].as_i64().expect("id");
        let path = format!("/api/events/{id}");

        let changes = r#"{"is_past": true, "event_date": "2030-02-01"}"#;
        let resp = call(&state, Method::PUT, &path, changes).await;
        let updated = json_of(resp).await;
        assert_eq!(updated["event"]["is_past"], true);
        assert_eq!(updated["event"]["event_date"], "2030-02-01T00:00:00");
        assert_eq!(updated["event"]["title"], "Launch");

        let resp = call(&state, Method::DELETE, &path, "").await;
        assert_eq!(json_of(resp).await["message"], "Event deleted successfully");
        let resp = call(&state, Method::DELETE, &path, "").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upcoming_excludes_past_dates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());
        let dates = [
            ("old", "2001-01-01"),
            ("late", "2099-06-01"),
            ("soon", "2098-01-01"),
        ];
        for (title, date) in dates {
            call_form(&state, "/api/events", &[("title", title), ("event_date", date)], &[]).await;
        }

        let body = json_of(call(&state, Method::GET, "/api/events/upcoming", "").await).await;
        let titles: Vec<_> = body["events"]
            .as_array()
            .expect("array")
            .iter()
            .map(|e| e["title"].as_str().expect("title").to_string())
            .collect();
        assert_eq!(titles, ["soon", "late"]);

        let body = json_of(call(&state, Method::GET, "/admin/events", "").await).await;
        assert_eq!(body["events"][0]["title"], "late");
    }

    #[tokio::test]
    async fn test_admin_upload_validation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());

        let resp = call_form(&state, "/admin/upload", &[("title", "x")], &[]).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(resp).await["error"], "No file provided");

        let resp = call_form(&state, "/admin/upload", &[], &[("file", "", b"")]).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(resp).await["error"], "No file selected");

        let resp = call_form(&state, "/admin/upload", &[], &[("file", "photo.EXE", b"MZ")]).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(resp).await["error"], "Invalid file type");
    }

    #[tokio::test]
    async fn test_admin_upload_creates_gallery_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());

        let resp = call_form(
            &state,
            "/admin/upload",
            &[("is_featured", "true"), ("tags", "a,b")],
            &[("file", "photo.PNG", b"\x89PNG")],
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = json_of(resp).await;
        assert_eq!(body["image"]["title"], "Untitled");
        assert_eq!(body["image"]["is_featured"], true);
        assert_eq!(body["image"]["tags"], serde_json::json!(["a", "b"]));

        let listed = json_of(call(&state, Method::GET, "/admin/gallery", "").await).await;
        assert_eq!(listed["gallery"][0]["id"], body["image"]["id"]);
    }

    #[tokio::test]
    async fn test_admin_dashboard_is_html() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());
        let resp = call(&state, Method::GET, "/admin", "").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers()[CONTENT_TYPE]
            .to_str()
            .expect("header")
            .starts_with("text/html"));
    }

    #[tokio::test]
    async fn test_closed_store_is_500() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::for_tests(dir.path());
        state.close();

        let resp = call(&state, Method::GET, "/api/gallery", "").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_of(resp).await["error"], "database is closed");
    }
}
