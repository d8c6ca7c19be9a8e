//! OpenAPI document loading.
//!
//! Parsing and validation are delegated to `openapiv3`; this module only gets
//! the bytes in (file or stdin), picks JSON or YAML, and exposes the result to
//! templates as a JSON value.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use openapiv3::{OpenAPI, ReferenceOr, StatusCode};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::core::error::{Error, Result};

/// Where the specification is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecInput {
    Stdin,
    File(PathBuf),
}

impl SpecInput {
    /// `-` means stdin, anything else is a path.
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    /// Read the whole document into memory.
    pub fn read(&self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        match self {
            Self::Stdin => {
                io::stdin()
                    .lock()
                    .read_to_end(&mut data)
                    .map_err(|e| Error::io("read specification", e))?;
            }
            Self::File(path) => {
                let mut file =
                    File::open(path).map_err(|e| Error::io("open specification", e))?;
                file.read_to_end(&mut data)
                    .map_err(|e| Error::io("read specification", e))?;
            }
        }
        Ok(data)
    }

    fn is_json_path(&self) -> bool {
        matches!(self, Self::File(path) if path.extension().is_some_and(|ext| ext == "json"))
    }
}

/// A parsed OpenAPI document.
#[derive(Debug, Clone)]
pub struct SpecDocument {
    spec: OpenAPI,
}

impl SpecDocument {
    /// Read and parse the document from `input`.
    pub fn load(input: &SpecInput) -> Result<Self> {
        let data = input.read()?;
        let json = input.is_json_path() || looks_like_json(&data);
        debug!(?input, bytes = data.len(), json, "Read specification");
        Self::from_slice(&data, json)
    }

    /// Parse raw bytes as JSON or YAML.
    pub fn from_slice(data: &[u8], json: bool) -> Result<Self> {
        let spec = if json {
            serde_json::from_slice(data).map_err(Error::Json)?
        } else {
            serde_yaml::from_slice(data).map_err(Error::Yaml)?
        };
        Ok(Self { spec })
    }

    /// The document as templates see it under `spec`.
    pub fn to_value(&self) -> Result<JsonValue> {
        serde_json::to_value(&self.spec).map_err(Error::Dump)
    }

    /// Write the document as compact JSON followed by a newline.
    pub fn write_json<W: Write>(&self, mut out: W) -> Result<()> {
        serde_json::to_writer(&mut out, &self.spec).map_err(Error::Dump)?;
        writeln!(out).map_err(|e| Error::io("write output", e))
    }

    /// Type and value of the `200` response of `GET /templates`, or `nil`.
    pub fn debug_probe(&self) -> String {
        let response = self
            .spec
            .paths
            .paths
            .get("/templates")
            .and_then(ReferenceOr::as_item)
            .and_then(|item| item.get.as_ref())
            .and_then(|op| op.responses.responses.get(&StatusCode::Code(200)));

        match response {
            Some(value) => format!("{}: {:?}", std::any::type_name_of_val(value), value),
            None => "nil".to_string(),
        }
    }
}

fn looks_like_json(data: &[u8]) -> bool {
    data.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{')
}
