// Gallery table operations

use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension, Row};
use serde_json::{json, Value};

use super::tags::Tags;
use super::timestamp;
use super::{Store, StoreError};

const COLUMNS: &str =
    "id, title, description, image_filename, image_url, upload_date, is_featured, tags";

/// A stored picture with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryImage {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Fixed at creation
    pub image_filename: String,
    pub image_url: Option<String>,
    /// Fixed at creation
    pub upload_date: NaiveDateTime,
    pub is_featured: bool,
    pub tags: Tags,
}

impl GalleryImage {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            image_filename: row.get(3)?,
            image_url: row.get(4)?,
            upload_date: row.get(5)?,
            is_featured: row.get(6)?,
            tags: row.get(7)?,
        })
    }

    /// JSON representation returned by the API
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "description": self.description,
            "image_filename": self.image_filename,
            "image_url": self.image_url,
            "upload_date": timestamp::to_iso(&self.upload_date),
            "is_featured": self.is_featured,
            "tags": self.tags,
        })
    }
}

/// Field values for a gallery row that does not exist yet
#[derive(Debug, Clone)]
pub struct NewGalleryImage {
    pub title: String,
    pub description: String,
    pub image_filename: String,
    pub image_url: String,
    pub is_featured: bool,
    pub tags: Tags,
}

impl Default for NewGalleryImage {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            description: String::new(),
            image_filename: String::new(),
            image_url: String::new(),
            is_featured: false,
            tags: Tags::default(),
        }
    }
}

impl Store {
    /// All images, newest upload first
    pub fn list_gallery(&self, featured_only: bool) -> Result<Vec<GalleryImage>, StoreError> {
        let sql = if featured_only {
            format!(
                "SELECT {COLUMNS} FROM gallery WHERE is_featured = 1 \
                 ORDER BY upload_date DESC, id DESC"
            )
        } else {
            format!("SELECT {COLUMNS} FROM gallery ORDER BY upload_date DESC, id DESC")
        };

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], GalleryImage::from_row)?;
            rows.collect()
        })
    }

    pub fn get_gallery_image(&self, id: i64) -> Result<Option<GalleryImage>, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM gallery WHERE id = ?1"),
                [id],
                GalleryImage::from_row,
            )
            .optional()
        })
    }

    /// Insert a row stamped with the current time and return it as stored
    pub fn insert_gallery_image(&self, new: &NewGalleryImage) -> Result<GalleryImage, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO gallery
                    (title, description, image_filename, image_url, upload_date, is_featured, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    new.title,
                    new.description,
                    new.image_filename,
                    new.image_url,
                    timestamp::now(),
                    new.is_featured,
                    new.tags,
                ],
            )?;
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM gallery WHERE id = ?1"),
                [conn.last_insert_rowid()],
                GalleryImage::from_row,
            )
        })
    }

    /// Persist the mutable fields; `image_filename` and `upload_date` never change
    pub fn update_gallery_image(&self, image: &GalleryImage) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE gallery
                 SET title = ?1, description = ?2, image_url = ?3, is_featured = ?4, tags = ?5
                 WHERE id = ?6",
                params![
                    image.title,
                    image.description,
                    image.image_url,
                    image.is_featured,
                    image.tags,
                    image.id,
                ],
            )
            .map(|_| ())
        })
    }

    /// Returns false when no row had that id
    pub fn delete_gallery_image(&self, id: i64) -> Result<bool, StoreError> {
        self.with_conn(|conn| conn.execute("DELETE FROM gallery WHERE id = ?1", [id]))
            .map(|changed| changed > 0)
    }
}
