//! # HTTP Registrar Directory Library
mod config;
mod directory;
mod error;

pub use crate::config::DirectoryConfig;
pub use crate::directory::HttpDirectory;
pub use error::Error;
