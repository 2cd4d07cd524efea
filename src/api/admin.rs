// Admin dashboard and direct image upload

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{HeaderMap, Response};

use super::body;
use super::error::ApiError;
use super::gallery;
use crate::config::AppState;
use crate::http;
use crate::store::{NewGalleryImage, Tags};

/// Serve the dashboard HTML page
pub fn serve_dashboard(is_head: bool) -> Response<Full<Bytes>> {
    http::build_html_response(include_str!("admin.html"), is_head)
}

/// `POST /admin/upload`: store the `file` part and create a gallery record for it
pub async fn upload(
    state: &AppState,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let form = body::parse_form(headers, body).await?;
    let file = form
        .file("file")
        .ok_or_else(|| ApiError::InvalidUpload("No file provided".to_string()))?;

    let image_filename = state.uploads.save(&file.file_name, &file.data).await?;

    let new = NewGalleryImage {
        title: form.text("title").unwrap_or("Untitled").to_string(),
        description: form.text("description").unwrap_or_default().to_string(),
        image_filename,
        is_featured: form.text("is_featured") == Some("true"),
        tags: Tags::parse(form.text("tags").unwrap_or_default()),
        ..NewGalleryImage::default()
    };
    let image = state.store.insert_gallery_image(&new)?;
    Ok(gallery::created(&image))
}
