//! Resolved run configuration.
//!
//! `main` parses the command line with clap and hands the raw values to
//! [`Config::new`], which enforces the usage rules that clap cannot express:
//! a template selector is always required, and the specification argument is
//! required unless the selector is `list`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::core::error::{Error, Result};
use crate::core::openapi::SpecInput;
use crate::core::templates::Selector;

/// What a run does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Print the bundled template set names.
    ListSets,
    /// Print the parsed specification as JSON.
    DumpSpec,
    /// Print a fixed diagnostic value from the specification.
    Debug,
    /// Render the selected templates.
    Render,
}

/// Where generated text goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Output {
    #[default]
    Stdout,
    File(PathBuf),
}

impl Output {
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }

    /// Open the sink. A file is created (or truncated) only at this point.
    pub fn open(&self) -> Result<Box<dyn Write>> {
        match self {
            Self::Stdout => Ok(Box::new(io::stdout().lock())),
            Self::File(path) => {
                let file = File::create(path).map_err(|e| Error::io("open output file", e))?;
                Ok(Box::new(BufWriter::new(file)))
            }
        }
    }
}

/// Everything a run needs, validated.
#[derive(Debug, Clone)]
pub struct Config {
    pub selector: Selector,
    pub spec: Option<SpecInput>,
    pub output: Output,
    pub template_help: bool,
    pub args: Vec<String>,
    pub dump_spec: bool,
    pub debug: bool,
    pub command: String,
}

impl Config {
    pub fn new(template: Option<&str>, spec: Option<&str>) -> Result<Self> {
        let selector: Selector = template
            .ok_or_else(|| Error::usage("template is required"))?
            .parse()?;

        let spec = match (&selector, spec) {
            (Selector::List, _) => None,
            (_, Some(arg)) => Some(SpecInput::parse(arg)),
            (_, None) => return Err(Error::usage("one argument expected")),
        };

        Ok(Self {
            selector,
            spec,
            output: Output::Stdout,
            template_help: false,
            args: Vec::new(),
            dump_spec: false,
            debug: false,
            command: String::new(),
        })
    }

    pub fn mode(&self) -> Mode {
        if self.selector == Selector::List {
            Mode::ListSets
        } else if self.debug {
            Mode::Debug
        } else if self.dump_spec {
            Mode::DumpSpec
        } else {
            Mode::Render
        }
    }
}
