//! openapi-gen CLI entrypoint
//! Parses command-line arguments and dispatches to the generator.
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;

// External imports (alphabetized)
use clap::{CommandFactory, Parser, error::ErrorKind as ClapErrorKind};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use openapi_gen::core::{
    config::{Config, Output},
    error::{Error, ErrorKind, single_line},
    generate,
    templates::command_line,
};

#[derive(Parser, Debug)]
#[command(name = "openapi-gen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Template set name, `list`, or comma-separated template files (`./a.tmpl,/abs/b.tmpl`)
    #[arg(short = 't', long, env = "OPENAPI_GEN_TEMPLATE")]
    template: Option<String>,
    /// Output file (default: stdout)
    #[arg(short = 'o', long, env = "OPENAPI_GEN_OUTPUT")]
    output: Option<PathBuf>,
    /// Render the template's own help text instead of code
    #[arg(short = 'H', long)]
    template_help: bool,
    /// Template argument as key=value; may be repeated
    #[arg(short = 'a', long = "arg", value_name = "KEY=VALUE")]
    args: Vec<String>,
    /// Print the parsed specification as JSON and exit
    #[arg(long)]
    dump_spec: bool,
    /// Print a diagnostic value from the specification and exit
    #[arg(long)]
    debug: bool,
    /// OpenAPI document (YAML or JSON), or `-` for stdin
    spec: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<Config, Error> {
        let mut config = Config::new(self.template.as_deref(), self.spec.as_deref())?;
        config.output = Output::from_option(self.output);
        config.template_help = self.template_help;
        config.args = self.args;
        config.dump_spec = self.dump_spec;
        config.debug = self.debug;
        config.command = command_line();
        Ok(config)
    }
}

fn main() -> ExitCode {
    // Logs go to stderr so they never mix with generated output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!(?cli, "Parsed command line");

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) if e.kind() == ErrorKind::Usage => Cli::command()
            .error(ClapErrorKind::MissingRequiredArgument, e.to_string())
            .exit(),
        Err(e) => return report(e),
    };

    info!(template = %config.selector, mode = ?config.mode(), "Starting openapi-gen");
    match generate::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(e),
    }
}

/// Print the whole cause chain as a single `error:` line.
fn report(e: Error) -> ExitCode {
    let err = anyhow::Error::from(e);
    let message = err
        .chain()
        .map(|cause| single_line(&cause.to_string()))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(": ");
    eprintln!("error: {message}");
    ExitCode::FAILURE
}
