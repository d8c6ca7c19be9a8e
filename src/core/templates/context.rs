//! Data made visible to templates.
//!
//! A render sees exactly four top-level names:
//!
//! | name      | value                                                        |
//! |-----------|--------------------------------------------------------------|
//! | `help`    | `true` when `--template-help` was given                      |
//! | `args`    | map of `--arg key=value` pairs, or nil when none were given  |
//! | `spec`    | the parsed OpenAPI document                                  |
//! | `command` | the command line that produced the output                    |

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tera::Context;

use crate::core::error::{Error, Result};

/// The render payload.
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext {
    pub help: bool,
    pub args: Option<BTreeMap<String, String>>,
    pub spec: JsonValue,
    pub command: String,
}

impl RenderContext {
    pub fn new(spec: JsonValue) -> Self {
        Self {
            help: false,
            args: None,
            spec,
            command: String::new(),
        }
    }

    pub fn with_help(mut self, help: bool) -> Self {
        self.help = help;
        self
    }

    pub fn with_args(mut self, args: Option<BTreeMap<String, String>>) -> Self {
        self.args = args;
        self
    }

    pub fn with_command<S: Into<String>>(mut self, command: S) -> Self {
        self.command = command.into();
        self
    }

    /// Convert into the template engine's context type.
    pub fn to_tera(&self) -> Result<Context> {
        Context::from_serialize(self).map_err(Error::Context)
    }
}

/// Parse `key=value` and bare `key` tokens.
///
/// Bare keys map to the empty string, the last duplicate wins, and no tokens
/// at all yields `None` so templates can tell "no args" from "empty args".
pub fn parse_args<I, S>(tokens: I) -> Option<BTreeMap<String, String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tokens = tokens.into_iter().peekable();
    tokens.peek()?;

    let args = tokens
        .map(|token| match token.as_ref().split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (token.as_ref().to_string(), String::new()),
        })
        .collect();
    Some(args)
}

/// The current process invocation, joined by single spaces.
pub fn command_line() -> String {
    std::env::args().collect::<Vec<_>>().join(" ")
}
