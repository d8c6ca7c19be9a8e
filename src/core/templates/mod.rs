//! Template system for code generation.
//!
//! This module turns a template selector into something that can be rendered:
//! - template sources: the embedded bundle or explicit files on disk
//! - assembly of ordered fragments into one namespace with last-wins overrides
//! - the helper functions available inside templates
//! - the render context exposed to template authors

pub mod assembler;
pub mod context;
pub mod embedded;
pub mod filesystem;
pub mod helpers;
pub mod namespace;
pub mod source;

pub use assembler::*;
pub use context::*;
pub use embedded::*;
pub use filesystem::*;
pub use helpers::HelperLibrary;
pub use namespace::*;
pub use source::*;
