//! Error handling for openapi-gen.
//!
//! Every failure site gets its own variant. The `Display` of a variant is a
//! short static label ("open specification", "parse template x.tmpl"); the
//! underlying cause is kept as the error source. `main` walks the chain
//! through `anyhow`, passes each part through [`single_line`] and joins them,
//! giving one line like
//! `open specification: No such file or directory (os error 2)`.
//!
//! # Examples
//!
//! ```
//! use openapi_gen::core::error::{Error, ErrorKind, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::usage("template is required"))
//! }
//!
//! assert_eq!(might_fail().unwrap_err().kind(), ErrorKind::Usage);
//! ```

use std::io;

use thiserror::Error;

/// Result type for openapi-gen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], independent of where it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The specification or output path could not be opened, read or written.
    InputAccess,
    /// The document is not a well-formed OpenAPI specification.
    SpecParse,
    /// A template set or fragment could not be located or listed.
    TemplateSource,
    /// A fragment's syntax is invalid.
    TemplateParse,
    /// Rendering failed, including helper misuse.
    TemplateExecute,
    /// The command line contract was violated.
    Usage,
}

/// Main error type for openapi-gen
#[derive(Debug, Error)]
pub enum Error {
    /// I/O failure on the specification or the output sink
    #[error("{context}")]
    Io {
        context: &'static str,
        #[source]
        source: io::Error,
    },

    /// JSON specification could not be parsed
    #[error("load specification")]
    Json(#[source] serde_json::Error),

    /// YAML specification could not be parsed
    #[error("load specification")]
    Yaml(#[source] serde_yaml::Error),

    /// Parsed specification could not be serialized back to JSON
    #[error("dump to json")]
    Dump(#[source] serde_json::Error),

    /// No fragment with this exact name exists in the source
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// A fragment exists but could not be read
    #[error("read template {name}")]
    TemplateRead {
        name: String,
        #[source]
        source: io::Error,
    },

    /// A fragment is not valid UTF-8
    #[error("template {0} is not valid UTF-8")]
    TemplateEncoding(String),

    /// Malformed `define` block structure in a fragment
    #[error("parse template {fragment}: {message}")]
    TemplateSyntax { fragment: String, message: String },

    /// The template engine rejected a definition from a fragment
    #[error("parse template {fragment}")]
    TemplateParse {
        fragment: String,
        #[source]
        source: tera::Error,
    },

    /// Rendering failed
    #[error("execute")]
    Render(#[source] tera::Error),

    /// Rendering context could not be built
    #[error("build render context")]
    Context(#[source] tera::Error),

    /// Command line contract violated
    #[error("{0}")]
    Usage(String),
}

impl Error {
    /// Wrap an I/O error with a static context label
    pub fn io(context: &'static str, source: io::Error) -> Self {
        Self::Io { context, source }
    }

    /// Create a new usage error
    pub fn usage<S: Into<String>>(msg: S) -> Self {
        Self::Usage(msg.into())
    }

    /// Create a new syntax error for the named fragment
    pub fn syntax<F: Into<String>, M: Into<String>>(fragment: F, message: M) -> Self {
        Self::TemplateSyntax {
            fragment: fragment.into(),
            message: message.into(),
        }
    }

    /// Which part of the taxonomy this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::InputAccess,
            Self::Json(_) | Self::Yaml(_) | Self::Dump(_) => ErrorKind::SpecParse,
            Self::TemplateNotFound(_) | Self::TemplateRead { .. } | Self::TemplateEncoding(_) => {
                ErrorKind::TemplateSource
            }
            Self::TemplateSyntax { .. } | Self::TemplateParse { .. } => ErrorKind::TemplateParse,
            Self::Render(_) | Self::Context(_) => ErrorKind::TemplateExecute,
            Self::Usage(_) => ErrorKind::Usage,
        }
    }
}

/// Collapse a message onto one line.
///
/// Template engine errors embed a multi-line source excerpt with a caret
/// marker; every run of whitespace, newlines included, becomes one space.
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_flattens_source_excerpt() {
        let message = "Failed to parse 'bad.tmpl'\n --> 2:1\n  |\n2 | \n  | ^---\n  |\n  = expected an identifier";
        let flat = single_line(message);
        assert!(!flat.contains('\n'));
        assert!(flat.starts_with("Failed to parse 'bad.tmpl' --> 2:1"));
        assert!(flat.ends_with("= expected an identifier"));
        assert_eq!(single_line("  \n "), "");
    }

    #[test]
    fn test_io_error_keeps_label_and_source() {
        let error = Error::io(
            "open specification",
            io::Error::new(io::ErrorKind::NotFound, "File not found"),
        );
        assert_eq!(error.kind(), ErrorKind::InputAccess);
        assert_eq!(error.to_string(), "open specification");

        let source = std::error::Error::source(&error).unwrap();
        assert_eq!(source.to_string(), "File not found");
    }

    #[test]
    fn test_error_from_serde_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = Error::Json(json_error);
        assert_eq!(error.kind(), ErrorKind::SpecParse);
        assert_eq!(error.to_string(), "load specification");
    }

    #[test]
    fn test_template_errors_name_the_fragment() {
        let error = Error::syntax("go/common.tmpl", "unterminated define \"header\"");
        assert_eq!(error.kind(), ErrorKind::TemplateParse);
        assert_eq!(
            error.to_string(),
            "parse template go/common.tmpl: unterminated define \"header\""
        );

        let error = Error::TemplateNotFound("server.rb.tmpl".to_string());
        assert_eq!(error.kind(), ErrorKind::TemplateSource);
        assert!(error.to_string().contains("server.rb.tmpl"));
    }

    #[test]
    fn test_usage_error() {
        let error = Error::usage("one argument expected");
        assert_eq!(error.kind(), ErrorKind::Usage);
        assert_eq!(error.to_string(), "one argument expected");
    }

    #[test]
    fn test_render_error_kind() {
        let error = Error::Render(tera::Error::msg("Variable `x` not found"));
        assert_eq!(error.kind(), ErrorKind::TemplateExecute);
        assert_eq!(error.to_string(), "execute");
    }
}
