//! Embedded template bundle for binary distribution.
//!
//! The `templates/` directory is compiled into the binary with `rust-embed`,
//! so the bundled sets work right after `cargo install` without any files on
//! disk. Layout:
//!
//! ```text
//! templates/
//!   server.go.tmpl      primary fragment of the `server.go` set
//!   client.ts.tmpl      primary fragment of the `client.ts` set
//!   go/common.tmpl      shared by every `*.go` set
//!   ts/common.tmpl      shared by every `*.ts` set
//! ```

use std::borrow::Cow;
use std::marker::PhantomData;

use rust_embed::RustEmbed;
use tracing::debug;

use super::source::{Fragment, TemplateSource};
use crate::core::error::{Error, Result};

/// Container for all templates embedded at compile time.
#[derive(RustEmbed)]
#[folder = "templates/"]
pub struct BundledTemplates;

/// [`TemplateSource`] reading from a `rust-embed` bundle.
///
/// Listing is sorted by name so the load order of shared fragments never
/// depends on how the bundle was walked at build time.
pub struct EmbeddedSource<E = BundledTemplates> {
    bundle: PhantomData<E>,
}

impl<E: RustEmbed> EmbeddedSource<E> {
    pub fn new() -> Self {
        Self {
            bundle: PhantomData,
        }
    }
}

impl<E: RustEmbed> Default for EmbeddedSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RustEmbed> TemplateSource for EmbeddedSource<E> {
    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let dir = prefix.trim_matches('/');
        let mut names: Vec<String> = E::iter()
            .map(Cow::into_owned)
            .filter(|path| {
                let rest = if dir.is_empty() {
                    Some(path.as_str())
                } else {
                    path.strip_prefix(dir).and_then(|r| r.strip_prefix('/'))
                };
                rest.is_some_and(|r| !r.is_empty() && !r.contains('/'))
            })
            .collect();
        names.sort();
        names.dedup();

        debug!(prefix = %dir, count = names.len(), "Listed embedded fragments");
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<Fragment> {
        let file = E::get(name).ok_or_else(|| Error::TemplateNotFound(name.to_string()))?;
        let text = String::from_utf8(file.data.into_owned())
            .map_err(|_| Error::TemplateEncoding(name.to_string()))?;
        Ok(Fragment::new(name, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    #[derive(RustEmbed)]
    #[folder = "tests/fixtures/bundle/"]
    struct FixtureBundle;

    fn fixture() -> EmbeddedSource<FixtureBundle> {
        EmbeddedSource::new()
    }

    #[test]
    fn test_list_sets_strips_suffix_and_sorts() {
        let sets = fixture().list_sets().unwrap();
        assert_eq!(sets, vec!["alpha.x", "beta.x", "plain"]);
    }

    #[test]
    fn test_listing_is_idempotent() {
        let source = fixture();
        assert_eq!(source.list_sets().unwrap(), source.list_sets().unwrap());
        assert_eq!(source.list("x").unwrap(), source.list("x").unwrap());
    }

    #[test]
    fn test_list_kind_is_flat_and_sorted() {
        let names = fixture().list("x").unwrap();
        assert_eq!(names, vec!["x/a_header.tmpl", "x/b_common.tmpl"]);
    }

    #[test]
    fn test_list_missing_prefix_is_empty() {
        assert!(fixture().list("nope").unwrap().is_empty());
    }

    #[test]
    fn test_read_exact_name() {
        let fragment = fixture().read("alpha.x.tmpl").unwrap();
        assert_eq!(fragment.name, "alpha.x.tmpl");
        assert!(fragment.text.contains("alpha"));
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let err = fixture().read("Alpha.x.tmpl").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateSource);
        assert!(err.to_string().contains("Alpha.x.tmpl"));
    }

    #[test]
    fn test_bundled_templates_present() {
        let sets = EmbeddedSource::<BundledTemplates>::new().list_sets().unwrap();
        assert!(sets.contains(&"server.go".to_string()));
        assert!(sets.contains(&"client.ts".to_string()));
    }
}
