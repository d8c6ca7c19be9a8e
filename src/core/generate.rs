//! Code generation entry point.
//!
//! [`run`] carries out one invocation:
//!
//! 1. `list` mode prints the bundled set names and never reads the document
//! 2. otherwise the specification is loaded; a missing or malformed document
//!    fails here, before any template is touched or the output is created
//! 3. `--debug` / `--dump-spec` print from the document and stop
//! 4. the templates are assembled; unknown sets and syntax errors fail here,
//!    still before the output is created
//! 5. the output is opened and the root template is rendered into it
//!
//! A failure during step 5 leaves whatever was already written in place.

use std::io::Write;

use tracing::info;

use crate::core::config::{Config, Mode};
use crate::core::error::{Error, Result};
use crate::core::openapi::SpecDocument;
use crate::core::templates::{
    BundledTemplates, EmbeddedSource, FilesystemSource, HelperLibrary, LoadPlan, RenderContext, Selector,
    TemplateNamespace, TemplateSource, parse_args,
};

/// Resolves selectors against a bundle and renders them.
pub struct Generator<'a> {
    bundle: &'a dyn TemplateSource,
    helpers: HelperLibrary,
}

impl<'a> Generator<'a> {
    pub fn new(bundle: &'a dyn TemplateSource) -> Self {
        Self {
            bundle,
            helpers: HelperLibrary::standard(),
        }
    }

    /// Write the bundled set names, one per line.
    pub fn list_sets<W: Write>(&self, mut out: W) -> Result<()> {
        for name in self.bundle.list_sets()? {
            writeln!(out, "{name}").map_err(|e| Error::io("write output", e))?;
        }
        Ok(())
    }

    /// Build the namespace a selector refers to.
    pub fn assemble(&self, selector: &Selector) -> Result<TemplateNamespace> {
        match selector {
            Selector::Bundled(set) => {
                LoadPlan::bundled(set, self.bundle)?.assemble(self.bundle, &self.helpers)
            }
            Selector::Files(paths) => {
                let source = FilesystemSource::new(paths.clone());
                LoadPlan::files(paths)?.assemble(&source, &self.helpers)
            }
            Selector::List => Err(Error::usage("`list` does not name a template set")),
        }
    }

    /// Assemble, then open the sink, then render into it.
    ///
    /// `open_sink` is only called once assembly succeeded. The sink is
    /// flushed even when rendering fails.
    pub fn generate<W, F>(
        &self,
        selector: &Selector,
        context: &RenderContext,
        open_sink: F,
    ) -> Result<()>
    where
        W: Write,
        F: FnOnce() -> Result<W>,
    {
        let namespace = self.assemble(selector)?;
        info!(
            template = %selector,
            root = %namespace.root(),
            fragments = namespace.load_order().len(),
            "Rendering templates"
        );

        let mut sink = open_sink()?;
        let rendered = namespace.execute(context, &mut sink);
        let flushed = sink.flush().map_err(|e| Error::io("write output", e));
        rendered.and(flushed)
    }
}

/// Run one invocation as described by `config`.
pub fn run(config: &Config) -> Result<()> {
    let bundle = EmbeddedSource::<BundledTemplates>::default();
    let generator = Generator::new(&bundle);

    let mode = config.mode();
    if mode == Mode::ListSets {
        let mut out = config.output.open()?;
        generator.list_sets(&mut out)?;
        return out.flush().map_err(|e| Error::io("write output", e));
    }

    let input = config
        .spec
        .as_ref()
        .ok_or_else(|| Error::usage("one argument expected"))?;
    let document = SpecDocument::load(input)?;

    match mode {
        Mode::Debug => {
            let mut out = config.output.open()?;
            writeln!(out, "{}", document.debug_probe())
                .and_then(|()| out.flush())
                .map_err(|e| Error::io("write output", e))
        }
        Mode::DumpSpec => {
            let mut out = config.output.open()?;
            document.write_json(&mut out)?;
            out.flush().map_err(|e| Error::io("write output", e))
        }
        Mode::ListSets | Mode::Render => {
            let context = RenderContext::new(document.to_value()?)
                .with_help(config.template_help)
                .with_args(parse_args(&config.args))
                .with_command(config.command.as_str());
            generator.generate(&config.selector, &context, || config.output.open())
        }
    }
}
