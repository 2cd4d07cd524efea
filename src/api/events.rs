// Event endpoint handlers

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{HeaderMap, Response, StatusCode};
use serde_json::json;

use super::body::{self, FormData};
use super::error::ApiError;
use super::response::{deleted, json_response};
use super::types::{parse_event_date, EventChanges};
use crate::config::AppState;
use crate::logger;
use crate::store::{timestamp, Event, NewEvent, Tags};
use crate::upload::UploadError;

type ApiResult = Result<Response<Full<Bytes>>, ApiError>;

/// Form part carrying the optional event image
const IMAGE_FIELD: &str = "image_file";

fn listing(events: &[Event]) -> Response<Full<Bytes>> {
    let events: Vec<_> = events.iter().map(Event::to_json).collect();
    json_response(StatusCode::OK, &json!({ "events": events }))
}

/// `GET /api/events`, `GET /admin/events`
pub fn list(state: &AppState) -> ApiResult {
    Ok(listing(&state.store.list_events()?))
}

/// `GET /api/events/upcoming`
pub fn upcoming(state: &AppState) -> ApiResult {
    Ok(listing(&state.store.list_upcoming_events(timestamp::now())?))
}

/// `POST /api/events` (multipart form)
pub async fn create(state: &AppState, headers: &HeaderMap, body: Bytes) -> ApiResult {
    let form = body::parse_form(headers, body).await?;
    let mut new = new_event_from_form(&form)?;

    // Validate the text fields first so a rejected request leaves no file behind
    if let Some(file) = form.file(IMAGE_FIELD) {
        match state.uploads.save(&file.file_name, &file.data).await {
            Ok(name) => new.image_filename = name,
            Err(UploadError::EmptyFilename | UploadError::InvalidType) => {
                logger::log_debug(&format!(
                    "Ignoring event image '{}': not an accepted upload",
                    file.file_name
                ));
            }
            Err(e) => return Err(e.into()),
        }
    }

    let event = state.store.insert_event(&new)?;
    Ok(json_response(
        StatusCode::CREATED,
        &json!({ "success": true, "event": event.to_json() }),
    ))
}

/// Map form fields onto a new event; `title` and `event_date` are required
pub fn new_event_from_form(form: &FormData) -> Result<NewEvent, ApiError> {
    let title = form
        .text("title")
        .ok_or_else(|| ApiError::bad_input("title is required"))?;
    let raw_date = form
        .text("event_date")
        .ok_or_else(|| ApiError::bad_input("event_date is required"))?;

    let mut new = NewEvent::new(title, parse_event_date(raw_date)?);
    new.description = form.text("description").unwrap_or_default().to_string();
    new.location = form.text("location").unwrap_or_default().to_string();
    new.is_featured = form.text("is_featured") == Some("true");
    new.ticket_url = form.text("ticket_url").unwrap_or_default().to_string();
    new.tags = Tags::parse(form.text("tags").unwrap_or_default());
    Ok(new)
}

/// `PUT /api/events/{id}`
pub fn update(state: &AppState, id: i64, body: &Bytes) -> ApiResult {
    let mut event = state
        .store
        .get_event(id)?
        .ok_or_else(|| not_found(id))?;
    let changes: EventChanges = body::parse_changes(body)?;
    changes.apply_to(&mut event)?;
    state.store.update_event(&event)?;

    Ok(json_response(
        StatusCode::OK,
        &json!({ "success": true, "event": event.to_json() }),
    ))
}

/// `DELETE /api/events/{id}`
pub fn delete(state: &AppState, id: i64) -> ApiResult {
    if !state.store.delete_event(id)? {
        return Err(not_found(id));
    }
    Ok(deleted("Event deleted successfully"))
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("event {id}"))
}
