//! One addressable template tree built from many fragments.
//!
//! Fragments declare named sub-templates with
//! `{% define "name" %}...{% enddefine %}` and call them with
//! `{% include "name" %}`. Everything outside a `define` block is the
//! fragment's body, stored under the name the [`LoadPlan`](super::LoadPlan)
//! assigns to it.
//!
//! Definitions are merged by name in load order: a later definition replaces
//! an earlier one, except that a body made only of whitespace and comments
//! never replaces anything. This is how a kind-wide `common` fragment gets
//! specialized by a set, so load order matters and is recorded.

use std::collections::BTreeMap;
use std::io::Write;

use once_cell::sync::Lazy;
use regex::Regex;
use tera::Tera;
use tracing::debug;

use super::context::RenderContext;
use super::helpers::HelperLibrary;
use super::source::Fragment;
use crate::core::error::{Error, Result};

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{%(-?)\s*(?:define\s+"([^"]*)"|(enddefine))\s*(-?)%\}"#)
        .expect("define directive pattern")
});

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{#.*?#\}").expect("comment pattern"));

/// Comments and raw blocks; directives inside them are plain text.
static OPAQUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\{#.*?#\}|\{%-?\s*raw\s*-?%\}.*?\{%-?\s*endraw\s*-?%\}")
        .expect("opaque span pattern")
});

/// A fragment split into its top-level body and its `define` blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitFragment {
    pub body: String,
    pub defines: Vec<(String, String)>,
}

/// Separate `define` blocks from the rest of a fragment.
///
/// Honors tera's `{%-` / `-%}` whitespace trimming on the directives.
/// Directives inside `{# #}` comments and `{% raw %}` blocks are ignored.
pub fn split_fragment(fragment: &Fragment) -> Result<SplitFragment> {
    let text = fragment.text.as_str();
    let mut body = String::new();
    let mut defines = Vec::new();
    let mut open: Option<(String, usize)> = None;
    let mut cursor = 0;
    let mut trim_next = false;
    let opaque: Vec<(usize, usize)> = OPAQUE
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();

    let segment = |start: usize, end: usize, trim_start: bool, trim_end: bool| {
        let mut s = &text[start..end];
        if trim_start {
            s = s.trim_start();
        }
        if trim_end {
            s = s.trim_end();
        }
        s.to_string()
    };

    for caps in DIRECTIVE.captures_iter(text) {
        let Some(tag) = caps.get(0) else { continue };
        if opaque
            .iter()
            .any(|&(start, end)| tag.start() >= start && tag.start() < end)
        {
            continue;
        }
        let trim_before = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let trim_after = caps.get(4).is_some_and(|m| !m.as_str().is_empty());

        match (caps.get(2), open.take()) {
            (Some(name), None) => {
                if name.as_str().is_empty() {
                    return Err(Error::syntax(&fragment.name, "define without a name"));
                }
                body.push_str(&segment(cursor, tag.start(), trim_next, trim_before));
                open = Some((name.as_str().to_string(), tag.end()));
            }
            (Some(name), Some((outer, _))) => {
                return Err(Error::syntax(
                    &fragment.name,
                    format!("define \"{}\" nested inside \"{outer}\"", name.as_str()),
                ));
            }
            (None, Some((name, start))) => {
                defines.push((name, segment(start, tag.start(), trim_next, trim_before)));
            }
            (None, None) => {
                return Err(Error::syntax(&fragment.name, "enddefine without define"));
            }
        }

        cursor = tag.end();
        trim_next = trim_after;
    }

    if let Some((name, _)) = open {
        return Err(Error::syntax(
            &fragment.name,
            format!("unterminated define \"{name}\""),
        ));
    }
    body.push_str(&segment(cursor, text.len(), trim_next, false));

    Ok(SplitFragment { body, defines })
}

fn is_blank(body: &str) -> bool {
    COMMENT.replace_all(body, "").trim().is_empty()
}

/// Parsed definitions sharing one helper table, addressed by a root name.
pub struct TemplateNamespace {
    tera: Tera,
    root: String,
    origins: BTreeMap<String, String>,
    load_order: Vec<String>,
}

impl TemplateNamespace {
    /// Create an empty namespace whose entry point will be `root`.
    pub fn new<S: Into<String>>(root: S, helpers: &HelperLibrary) -> Self {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        helpers.install(&mut tera);

        Self {
            tera,
            root: root.into(),
            origins: BTreeMap::new(),
            load_order: Vec::new(),
        }
    }

    /// Parse one fragment into the namespace, storing its body as `body_name`.
    pub fn load(&mut self, fragment: &Fragment, body_name: &str) -> Result<()> {
        let split = split_fragment(fragment)?;

        self.define(body_name, &split.body, &fragment.name)?;
        for (name, text) in &split.defines {
            self.define(name, text, &fragment.name)?;
        }

        self.load_order.push(fragment.name.clone());
        debug!(
            fragment = %fragment.name,
            defines = split.defines.len(),
            "Loaded template fragment"
        );
        Ok(())
    }

    fn define(&mut self, name: &str, text: &str, fragment: &str) -> Result<()> {
        let previous = self.origins.get(name);
        if previous.is_some() && is_blank(text) {
            return Ok(());
        }
        if let Some(previous) = previous {
            debug!(name, previous = %previous, fragment, "Template definition overridden");
        }

        self.tera
            .add_raw_template(name, text)
            .map_err(|source| Error::TemplateParse {
                fragment: fragment.to_string(),
                source,
            })?;
        self.origins.insert(name.to_string(), fragment.to_string());
        Ok(())
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Fragment names in the order they were loaded.
    pub fn load_order(&self) -> &[String] {
        &self.load_order
    }

    /// Fragment the current definition of `name` came from.
    pub fn origin(&self, name: &str) -> Option<&str> {
        self.origins.get(name).map(String::as_str)
    }

    /// All definition names, sorted.
    #[cfg(test)]
    pub(crate) fn definitions(&self) -> impl Iterator<Item = &str> {
        self.origins.keys().map(String::as_str)
    }

    /// Render the root definition into `sink`.
    ///
    /// Output is written as the engine produces it; on failure whatever was
    /// already written stays in the sink.
    pub fn execute<W: Write>(self, context: &RenderContext, sink: W) -> Result<()> {
        if !self.origins.contains_key(&self.root) {
            return Err(Error::TemplateNotFound(self.root));
        }
        let context = context.to_tera()?;
        self.tera
            .render_to(&self.root, &context, sink)
            .map_err(Error::Render)
    }
}
