//! Core of the generator: document loading, template assembly and rendering.

pub mod config;
pub mod error;
pub mod generate;
pub mod openapi;
pub mod templates;

pub use error::Error;
