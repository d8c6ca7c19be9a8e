//! Template source abstraction for embedded and filesystem templates.
//!
//! A [`TemplateSource`] answers two questions: which fragments live under a
//! prefix, and what is the text of a fragment. The assembler only talks to
//! this trait, so it does not care whether fragments come from the bundle
//! compiled into the binary or from paths given on the command line.
//!
//! Which backend is used is decided by the [`Selector`] syntax:
//!
//! - `list` enumerates the bundled sets
//! - an absolute path, or a path starting with `./`, selects files; several
//!   can be given separated by commas
//! - anything else names a bundled set such as `server.go`

use std::fmt;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::str::FromStr;

use crate::core::error::{Error, Result};

/// Extension every bundled fragment carries.
pub const FRAGMENT_SUFFIX: &str = ".tmpl";

/// A named piece of raw template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub name: String,
    pub text: String,
}

impl Fragment {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, text: T) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Where template fragments are read from.
pub trait TemplateSource {
    /// Names of the fragments stored under `prefix`, in load order.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Read one fragment by its exact, case-sensitive name.
    fn read(&self, name: &str) -> Result<Fragment>;

    /// Top-level template set names, without the `.tmpl` suffix.
    fn list_sets(&self) -> Result<Vec<String>> {
        let mut sets: Vec<String> = self
            .list("")?
            .into_iter()
            .filter_map(|name| name.strip_suffix(FRAGMENT_SUFFIX).map(str::to_string))
            .collect();
        sets.sort();
        sets.dedup();
        Ok(sets)
    }
}

/// What the `--template` option asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Enumerate the bundled template sets.
    List,
    /// A template set from the embedded bundle, e.g. `server.go`.
    Bundled(String),
    /// Explicit template files, loaded in the given order.
    Files(Vec<PathBuf>),
}

impl Selector {
    /// Extension of a bundled set name, which picks its shared fragments.
    ///
    /// `server.go` has kind `go`; a name without a dot has no kind.
    pub fn kind(name: &str) -> Option<&str> {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
    }

    fn is_path(selector: &str) -> bool {
        Path::new(selector).is_absolute()
            || selector.starts_with("./")
            || selector.starts_with(&format!(".{MAIN_SEPARATOR}"))
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::usage("template is required"));
        }
        if s == "list" {
            return Ok(Self::List);
        }
        if Self::is_path(s) {
            let files: Vec<PathBuf> = s
                .split(',')
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .collect();
            return Ok(Self::Files(files));
        }
        Ok(Self::Bundled(s.to_string()))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("list"),
            Self::Bundled(name) => f.write_str(name),
            Self::Files(files) => {
                let joined: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
                f.write_str(&joined.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_list() {
        assert_eq!("list".parse::<Selector>().unwrap(), Selector::List);
    }

    #[test]
    fn test_selector_bundled() {
        assert_eq!(
            "server.go".parse::<Selector>().unwrap(),
            Selector::Bundled("server.go".to_string())
        );
        // relative without the `./` marker is still a set name
        assert_eq!(
            "templates/a.tmpl".parse::<Selector>().unwrap(),
            Selector::Bundled("templates/a.tmpl".to_string())
        );
    }

    #[test]
    fn test_selector_files() {
        let selector: Selector = "./a.tmpl,./b.tmpl".parse().unwrap();
        assert_eq!(
            selector,
            Selector::Files(vec![PathBuf::from("./a.tmpl"), PathBuf::from("./b.tmpl")])
        );
        assert_eq!(selector.to_string(), "./a.tmpl,./b.tmpl");

        #[cfg(unix)]
        assert_eq!(
            "/tmp/x.tmpl".parse::<Selector>().unwrap(),
            Selector::Files(vec![PathBuf::from("/tmp/x.tmpl")])
        );
    }

    #[test]
    fn test_selector_empty_is_usage_error() {
        let err = "".parse::<Selector>().unwrap_err();
        assert_eq!(err.kind(), crate::core::error::ErrorKind::Usage);
    }

    #[test]
    fn test_kind() {
        assert_eq!(Selector::kind("server.go"), Some("go"));
        assert_eq!(Selector::kind("api.client.ts"), Some("ts"));
        assert_eq!(Selector::kind("plain"), None);
    }
}
