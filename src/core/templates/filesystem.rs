//! Filesystem template source for `--template ./a.tmpl,./b.tmpl` selectors.

use std::fs;
use std::io;
use std::path::PathBuf;

use super::source::{Fragment, TemplateSource};
use crate::core::error::{Error, Result};

/// An explicit, ordered list of template files on disk.
///
/// `list` ignores its prefix and returns the files in the order they were
/// given; that order is the load order.
#[derive(Debug, Clone)]
pub struct FilesystemSource {
    paths: Vec<PathBuf>,
}

impl FilesystemSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl TemplateSource for FilesystemSource {
    fn list(&self, _prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect())
    }

    fn read(&self, name: &str) -> Result<Fragment> {
        let text = fs::read_to_string(name).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::TemplateNotFound(name.to_string()),
            io::ErrorKind::InvalidData => Error::TemplateEncoding(name.to_string()),
            _ => Error::TemplateRead {
                name: name.to_string(),
                source: e,
            },
        })?;
        Ok(Fragment::new(name, text))
    }
}
