//! Gallery and events web service
//!
//! A small REST API over two SQLite tables (gallery images and events),
//! multipart image uploads, static serving of the stored uploads and an
//! admin page.

pub mod api;
pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod store;
pub mod upload;
