//! Turns a template selector into an ordered load plan and a namespace.
//!
//! Bundled set `server.go`:
//! 1. root name is `root`
//! 2. `server.go.tmpl` is loaded first, its body becomes `root`
//! 3. every fragment directly under `go/` follows, in the order the source
//!    lists them (sorted by name for the embedded bundle)
//!
//! Explicit files `./a.tmpl,./b.tmpl`: every file is loaded in the given
//! order with its body stored under its file name, and the first file name
//! is the root.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::helpers::HelperLibrary;
use super::namespace::TemplateNamespace;
use super::source::{FRAGMENT_SUFFIX, Selector, TemplateSource};
use crate::core::error::{Error, Result};

/// Root definition name for bundled sets.
pub const BUNDLED_ROOT: &str = "root";

/// One fragment to load and the name its top-level body is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub fragment: String,
    pub body: String,
}

/// Ordered list of fragments making up a template set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    pub root: String,
    pub entries: Vec<PlanEntry>,
}

impl LoadPlan {
    /// Plan for a bundled set: the primary fragment, then its kind's fragments.
    pub fn bundled(set: &str, source: &dyn TemplateSource) -> Result<Self> {
        let mut entries = vec![PlanEntry {
            fragment: format!("{set}{FRAGMENT_SUFFIX}"),
            body: BUNDLED_ROOT.to_string(),
        }];

        if let Some(kind) = Selector::kind(set) {
            entries.extend(source.list(kind)?.into_iter().map(|fragment| PlanEntry {
                fragment,
                body: BUNDLED_ROOT.to_string(),
            }));
        }

        Ok(Self {
            root: BUNDLED_ROOT.to_string(),
            entries,
        })
    }

    /// Plan for explicit files; the first file's name is the root.
    pub fn files(paths: &[PathBuf]) -> Result<Self> {
        let entries = paths
            .iter()
            .map(|path| {
                Ok(PlanEntry {
                    fragment: path.to_string_lossy().into_owned(),
                    body: file_name(path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let root = entries
            .first()
            .map(|entry| entry.body.clone())
            .ok_or_else(|| Error::usage("no template files given"))?;

        Ok(Self { root, entries })
    }

    /// Fragment names in load order.
    pub fn fragments(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.fragment.as_str())
    }

    /// Read and parse every fragment of the plan into a fresh namespace.
    ///
    /// Stops at the first fragment that cannot be read or parsed.
    pub fn assemble(
        &self,
        source: &dyn TemplateSource,
        helpers: &HelperLibrary,
    ) -> Result<TemplateNamespace> {
        let mut namespace = TemplateNamespace::new(&self.root, helpers);
        for entry in &self.entries {
            let fragment = source.read(&entry.fragment)?;
            namespace.load(&fragment, &entry.body)?;
        }

        debug!(
            root = %self.root,
            fragments = self.entries.len(),
            "Assembled template namespace"
        );
        Ok(namespace)
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::usage(format!("not a template file: {}", path.display())))
}
