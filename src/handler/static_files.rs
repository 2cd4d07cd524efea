//! Uploaded file serving module
//!
//! Serves `/uploads/{name}` straight from the upload directory with MIME
//! detection and `ETag` revalidation.

use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use tokio::fs;

/// Serve a single uploaded file by its stored name
pub async fn serve_upload(
    upload_dir: &Path,
    name: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    match load_upload(upload_dir, name).await {
        Some((data, content_type)) => {
            build_upload_response(data, content_type, if_none_match, is_head)
        }
        None => http::build_404_response(),
    }
}

/// Read `name` from `upload_dir`, refusing anything that resolves outside it
pub async fn load_upload(upload_dir: &Path, name: &str) -> Option<(Bytes, &'static str)> {
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return None;
    }

    let dir_canonical = match upload_dir.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Upload directory not found or inaccessible '{}': {e}",
                upload_dir.display()
            ));
            return None;
        }
    };

    // Missing files are an ordinary 404, not worth a warning
    let file_canonical = upload_dir.join(name).canonicalize().ok()?;
    if !file_canonical.starts_with(&dir_canonical) || !file_canonical.is_file() {
        logger::log_warning(&format!(
            "Refusing to serve '{name}' -> {}",
            file_canonical.display()
        ));
        return None;
    }

    let content = match fs::read(&file_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read upload '{}': {e}",
                file_canonical.display()
            ));
            return None;
        }
    };

    let content_type = mime::get_content_type(Path::new(name).extension().and_then(|e| e.to_str()));
    Some((Bytes::from(content), content_type))
}

fn build_upload_response(
    data: Bytes,
    content_type: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }
    http::response::build_cached_response(data, content_type, &etag, is_head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    #[tokio::test]
    async fn test_serves_existing_upload() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("20240101_000000_cat.png"), b"png").expect("write");

        let resp = serve_upload(dir.path(), "20240101_000000_cat.png", None, false).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "image/png");
        let body = resp.into_body().collect().await.expect("body").to_bytes();
        assert_eq!(body.as_ref(), b"png");
    }

    #[tokio::test]
    async fn test_missing_upload_is_404() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resp = serve_upload(dir.path(), "nope.png", None, false).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_traversal_is_refused() {
        let root = tempfile::tempdir().expect("tempdir");
        let uploads = root.path().join("uploads");
        std::fs::create_dir(&uploads).expect("mkdir");
        std::fs::write(root.path().join("site.db"), b"secret").expect("write");

        assert!(load_upload(&uploads, "../site.db").await.is_none());
        assert!(load_upload(&uploads, "..").await.is_none());
        assert!(load_upload(&uploads, "").await.is_none());
    }

    #[tokio::test]
    async fn test_etag_revalidation() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.gif"), b"gif").expect("write");

        let first = serve_upload(dir.path(), "a.gif", None, false).await;
        let etag = first.headers()["ETag"].to_str().expect("etag").to_string();

        let again = serve_upload(dir.path(), "a.gif", Some(&etag), false).await;
        assert_eq!(again.status(), StatusCode::NOT_MODIFIED);
    }
}
