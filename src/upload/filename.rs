//! Upload filename rules
//!
//! Extension allow-list, filename sanitizing and the timestamp prefix that
//! keeps repeated uploads of the same file apart.

use chrono::NaiveDateTime;
use unicode_normalization::UnicodeNormalization;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Lowercased text after the last '.', if any
pub fn extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Whether the client-supplied name carries an allowed image extension
///
/// ```
/// use gallery_events::upload::filename::allowed_file;
/// assert!(allowed_file("photo.PNG"));
/// assert!(!allowed_file("photo.EXE"));
/// assert!(!allowed_file("photo"));
/// ```
pub fn allowed_file(file_name: &str) -> bool {
    extension(file_name).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Reduce a client filename to a safe, flat name.
///
/// Accented letters are decomposed (NFKD) and reduced to their ASCII base.
/// Path separators become spaces, whitespace runs become a single `_`, any
/// character outside `[A-Za-z0-9_.-]` is dropped, and leading or trailing
/// `.`/`_` are stripped so nothing like `..` survives.
///
/// ```
/// use gallery_events::upload::filename::secure_filename;
/// assert_eq!(secure_filename("été.png"), "ete.png");
/// ```
pub fn secure_filename(file_name: &str) -> String {
    let ascii: String = file_name.nfkd().filter(char::is_ascii).collect();
    let flattened = ascii.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Prefix a sanitized name with `YYYYMMDD_HHMMSS_`
pub fn timestamped(safe_name: &str, at: NaiveDateTime) -> String {
    format!("{}{safe_name}", at.format("%Y%m%d_%H%M%S_"))
}
