//! Tabledit - review and correction client for OCR table extraction results.
//!
//! Talks to the table-extraction backend over its REST interface: uploads
//! images for processing, renders the detected cells and text, persists
//! user corrections, and manages saved documents.

pub mod client;
pub mod config;
pub mod models;
pub mod resolver;
