// Events table operations

use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension, Row};
use serde_json::{json, Value};

use super::tags::Tags;
use super::timestamp;
use super::{Store, StoreError};

const COLUMNS: &str = "id, title, description, event_date, location, image_filename, image_url, \
                       is_featured, is_past, created_date, ticket_url, tags";

/// A scheduled happening
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub event_date: NaiveDateTime,
    pub location: Option<String>,
    pub image_filename: Option<String>,
    pub image_url: Option<String>,
    pub is_featured: bool,
    /// Manual flag, independent of `event_date`
    pub is_past: bool,
    pub created_date: NaiveDateTime,
    pub ticket_url: Option<String>,
    pub tags: Tags,
}

impl Event {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            event_date: row.get(3)?,
            location: row.get(4)?,
            image_filename: row.get(5)?,
            image_url: row.get(6)?,
            is_featured: row.get(7)?,
            is_past: row.get(8)?,
            created_date: row.get(9)?,
            ticket_url: row.get(10)?,
            tags: row.get(11)?,
        })
    }

    /// JSON representation returned by the API
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "description": self.description,
            "event_date": timestamp::to_iso(&self.event_date),
            "location": self.location,
            "image_filename": self.image_filename,
            "image_url": self.image_url,
            "is_featured": self.is_featured,
            "is_past": self.is_past,
            "created_date": timestamp::to_iso(&self.created_date),
            "ticket_url": self.ticket_url,
            "tags": self.tags,
        })
    }
}

/// Field values for an event row that does not exist yet
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub event_date: NaiveDateTime,
    pub location: String,
    pub image_filename: String,
    pub image_url: String,
    pub is_featured: bool,
    pub ticket_url: String,
    pub tags: Tags,
}

impl NewEvent {
    pub fn new(title: impl Into<String>, event_date: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            event_date,
            location: String::new(),
            image_filename: String::new(),
            image_url: String::new(),
            is_featured: false,
            ticket_url: String::new(),
            tags: Tags::default(),
        }
    }
}

impl Store {
    /// All events, latest date first
    pub fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM events ORDER BY event_date DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], Event::from_row)?;
            rows.collect()
        })
    }

    /// Events dated at or after `now`, soonest first
    pub fn list_upcoming_events(&self, now: NaiveDateTime) -> Result<Vec<Event>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM events WHERE event_date >= ?1 \
                 ORDER BY event_date ASC, id ASC"
            ))?;
            let rows = stmt.query_map([now], Event::from_row)?;
            rows.collect()
        })
    }

    pub fn get_event(&self, id: i64) -> Result<Option<Event>, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM events WHERE id = ?1"),
                [id],
                Event::from_row,
            )
            .optional()
        })
    }

    /// Insert a row stamped with the current time and return it as stored
    pub fn insert_event(&self, new: &NewEvent) -> Result<Event, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events
                    (title, description, event_date, location, image_filename, image_url,
                     is_featured, is_past, created_date, ticket_url, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9, ?10)",
                params![
                    new.title,
                    new.description,
                    new.event_date,
                    new.location,
                    new.image_filename,
                    new.image_url,
                    new.is_featured,
                    timestamp::now(),
                    new.ticket_url,
                    new.tags,
                ],
            )?;
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM events WHERE id = ?1"),
                [conn.last_insert_rowid()],
                Event::from_row,
            )
        })
    }

    /// Persist every mutable field; `created_date` never changes
    pub fn update_event(&self, event: &Event) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE events
                 SET title = ?1, description = ?2, event_date = ?3, location = ?4,
                     image_filename = ?5, image_url = ?6, is_featured = ?7, is_past = ?8,
                     ticket_url = ?9, tags = ?10
                 WHERE id = ?11",
                params![
                    event.title,
                    event.description,
                    event.event_date,
                    event.location,
                    event.image_filename,
                    event.image_url,
                    event.is_featured,
                    event.is_past,
                    event.ticket_url,
                    event.tags,
                    event.id,
                ],
            )
            .map(|_| ())
        })
    }

    /// Returns false when no row had that id
    pub fn delete_event(&self, id: i64) -> Result<bool, StoreError> {
        self.with_conn(|conn| conn.execute("DELETE FROM events WHERE id = ?1", [id]))
            .map(|changed| changed > 0)
    }
}
