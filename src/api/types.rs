// Request body types for the JSON endpoints
//
// Every field is optional: an absent (or null) field keeps its default on
// create and its prior value on update.

use serde::Deserialize;

use super::error::ApiError;
use crate::store::{timestamp, Event, GalleryImage, NewGalleryImage, Tags};

/// `POST /api/gallery`
#[derive(Debug, Default, Deserialize)]
pub struct CreateGalleryImage {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_filename: Option<String>,
    pub image_url: Option<String>,
    pub is_featured: Option<bool>,
    pub tags: Option<Tags>,
}

impl CreateGalleryImage {
    pub fn into_new(self) -> NewGalleryImage {
        let defaults = NewGalleryImage::default();
        NewGalleryImage {
            title: self.title.unwrap_or(defaults.title),
            description: self.description.unwrap_or(defaults.description),
            image_filename: self.image_filename.unwrap_or(defaults.image_filename),
            image_url: self.image_url.unwrap_or(defaults.image_url),
            is_featured: self.is_featured.unwrap_or(defaults.is_featured),
            tags: self.tags.unwrap_or(defaults.tags),
        }
    }
}

/// `PUT /api/gallery/{id}`; the stored filename cannot be changed
#[derive(Debug, Default, Deserialize)]
pub struct GalleryImageChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_featured: Option<bool>,
    pub tags: Option<Tags>,
}

impl GalleryImageChanges {
    pub fn apply_to(self, image: &mut GalleryImage) {
        if let Some(title) = self.title {
            image.title = title;
        }
        if let Some(description) = self.description {
            image.description = Some(description);
        }
        if let Some(image_url) = self.image_url {
            image.image_url = Some(image_url);
        }
        if let Some(is_featured) = self.is_featured {
            image.is_featured = is_featured;
        }
        if let Some(tags) = self.tags {
            image.tags = tags;
        }
    }
}

/// `PUT /api/events/{id}`
#[derive(Debug, Default, Deserialize)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Only applied when non-empty
    pub event_date: Option<String>,
    pub location: Option<String>,
    pub image_filename: Option<String>,
    pub image_url: Option<String>,
    pub is_featured: Option<bool>,
    pub is_past: Option<bool>,
    pub ticket_url: Option<String>,
    pub tags: Option<Tags>,
}

impl EventChanges {
    /// Apply onto `event`; a malformed `event_date` leaves `event` untouched
    pub fn apply_to(self, event: &mut Event) -> Result<(), ApiError> {
        let event_date = match self.event_date.as_deref() {
            Some(raw) if !raw.is_empty() => Some(parse_event_date(raw)?),
            _ => None,
        };

        if let Some(date) = event_date {
            event.event_date = date;
        }
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if self.location.is_some() {
            event.location = self.location;
        }
        if self.image_filename.is_some() {
            event.image_filename = self.image_filename;
        }
        if self.image_url.is_some() {
            event.image_url = self.image_url;
        }
        if let Some(is_featured) = self.is_featured {
            event.is_featured = is_featured;
        }
        if let Some(is_past) = self.is_past {
            event.is_past = is_past;
        }
        if self.ticket_url.is_some() {
            event.ticket_url = self.ticket_url;
        }
        if let Some(tags) = self.tags {
            event.tags = tags;
        }
        Ok(())
    }
}

pub fn parse_event_date(raw: &str) -> Result<chrono::NaiveDateTime, ApiError> {
    timestamp::parse(raw)
        .ok_or_else(|| ApiError::bad_input(format!("Invalid isoformat string: '{raw}'")))
}
