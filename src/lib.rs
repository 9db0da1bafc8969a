//! Google Drive MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing a single tool that uploads
//! a local file to Google Drive and returns a link to it.

pub mod config;
pub mod drive;
pub mod error;
pub mod mcp;

pub use config::Config;
pub use error::{DriveMcpError, Result};
