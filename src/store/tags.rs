// Tag list stored as a single TEXT column

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize};

/// Ordered list of tags.
///
/// SQLite has no list type, so the column holds the tags joined with commas.
/// Entries are trimmed and empty ones dropped, which keeps the column
/// representation round-trippable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    /// Parse the comma-joined form
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(ToString::to_string)
                .collect(),
        )
    }

    pub fn join(&self) -> String {
        self.0.join(",")
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for Tags {
    fn from(list: Vec<String>) -> Self {
        // An entry containing a comma would split on the next read
        Self::parse(&list.join(","))
    }
}

/// Accepts both `"a,b"` and `["a", "b"]` in request bodies
#[derive(Deserialize)]
#[serde(untagged)]
enum TagsInput {
    Joined(String),
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match TagsInput::deserialize(deserializer)? {
            TagsInput::Joined(raw) => Self::parse(&raw),
            TagsInput::List(list) => Self::from(list),
        })
    }
}

impl ToSql for Tags {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.join()))
    }
}

impl FromSql for Tags {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(Self::default()),
            _ => value.as_str().map(Self::parse),
        }
    }
}
