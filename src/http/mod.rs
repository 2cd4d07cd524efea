//! HTTP protocol layer module
//!
//! Response builders, MIME detection and cache validation shared by the API
//! and the upload file server.

pub mod cache;
pub mod mime;
pub mod response;

pub use response::{
    apply_common_headers, build_304_response, build_404_response, build_405_response,
    build_413_response, build_html_response, build_options_response, build_text_response,
};
