// Gallery endpoint handlers

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde_json::json;

use super::body;
use super::error::ApiError;
use super::response::{deleted, json_response};
use super::types::{CreateGalleryImage, GalleryImageChanges};
use crate::config::AppState;
use crate::store::GalleryImage;

type ApiResult = Result<Response<Full<Bytes>>, ApiError>;

fn listing(images: &[GalleryImage]) -> Response<Full<Bytes>> {
    let gallery: Vec<_> = images.iter().map(GalleryImage::to_json).collect();
    json_response(StatusCode::OK, &json!({ "gallery": gallery }))
}

pub fn created(image: &GalleryImage) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::CREATED,
        &json!({ "success": true, "image": image.to_json() }),
    )
}

/// `GET /api/gallery`, `GET /api/gallery/featured`, `GET /admin/gallery`
pub fn list(state: &AppState, featured_only: bool) -> ApiResult {
    let images = state.store.list_gallery(featured_only)?;
    Ok(listing(&images))
}

/// `POST /api/gallery`
pub fn create(state: &AppState, body: &Bytes) -> ApiResult {
    let request: CreateGalleryImage = body::parse_json(body)?;
    let image = state.store.insert_gallery_image(&request.into_new())?;
    Ok(created(&image))
}

/// `PUT /api/gallery/{id}`
pub fn update(state: &AppState, id: i64, body: &Bytes) -> ApiResult {
    let mut image = find(state, id)?;
    let changes: GalleryImageChanges = body::parse_changes(body)?;
    changes.apply_to(&mut image);
    state.store.update_gallery_image(&image)?;

    Ok(json_response(
        StatusCode::OK,
        &json!({ "success": true, "image": image.to_json() }),
    ))
}

/// `DELETE /api/gallery/{id}`
pub fn delete(state: &AppState, id: i64) -> ApiResult {
    if !state.store.delete_gallery_image(id)? {
        return Err(not_found(id));
    }
    Ok(deleted("Image deleted successfully"))
}

fn find(state: &AppState, id: i64) -> Result<GalleryImage, ApiError> {
    state
        .store
        .get_gallery_image(id)?
        .ok_or_else(|| not_found(id))
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("gallery image {id}"))
}
