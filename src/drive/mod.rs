//! Google Drive API module
//!
//! Contains types, authentication, and the upload client for the Drive API.

pub mod auth;
pub mod client;
pub mod types;
