// Request body decoding: size-limited collection, JSON and multipart forms

use std::collections::HashMap;
use std::convert::Infallible;

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::HeaderMap;
use serde::de::DeserializeOwned;

use super::error::ApiError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Collect a whole body, failing with [`ApiError::PayloadTooLarge`] past `limit` bytes
pub async fn read_body<B>(body: B, limit: u64) -> Result<Bytes, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let max = usize::try_from(limit).unwrap_or(usize::MAX);
    match Limited::new(body, max).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(ApiError::PayloadTooLarge(limit)),
        Err(e) => Err(ApiError::bad_input(format!(
            "failed to read request body: {e}"
        ))),
    }
}

/// Decode a JSON body; an empty body is an error
pub fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    if is_blank(body) {
        return Err(ApiError::bad_input("expected a JSON body"));
    }
    Ok(serde_json::from_slice(body)?)
}

/// Decode a partial-update body; an empty body means "no changes"
pub fn parse_changes<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if is_blank(body) {
        return Ok(T::default());
    }
    parse_json(body)
}

fn is_blank(body: &Bytes) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

/// A file part of a multipart form
#[derive(Debug, Clone)]
pub struct FormFile {
    /// Client-supplied filename, possibly empty
    pub file_name: String,
    pub data: Bytes,
}

/// Decoded `multipart/form-data` body. The first occurrence of a name wins.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, FormFile>,
}

impl FormData {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn file(&self, name: &str) -> Option<&FormFile> {
        self.files.get(name)
    }
}

/// Decode a `multipart/form-data` body using the boundary from `headers`
pub async fn parse_form(headers: &HeaderMap, body: Bytes) -> Result<FormData, ApiError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_input("expected a multipart/form-data body"))?;
    let boundary = multer::parse_boundary(content_type)?;

    let stream = futures_util::stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = FormData::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        if let Some(file_name) = field.file_name().map(ToString::to_string) {
            let data = field.bytes().await?;
            form.files
                .entry(name)
                .or_insert(FormFile { file_name, data });
        } else {
            let value = field.text().await?;
            form.fields.entry(name).or_insert(value);
        }
    }

    Ok(form)
}
