//! CLI entry point for db-model-generator

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use db_model_generator::config::{languages, ArgumentOverrides, ConfigResolver, EnvironmentDefaults};
use db_model_generator::GeneratorError;

const DEFAULT_FILTER: &str = "warn,db_model_generator=info";
const VERBOSE_FILTER: &str = "debug";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

#[derive(Parser)]
#[command(name = "db-model-generator")]
#[command(about = "Generate SQLAlchemy models and WTForms forms from a database table")]
#[command(version)]
struct Cli {
    /// Database URL or SQLite file path
    database: Option<String>,

    /// Table to generate from
    table_name: Option<String>,

    /// Output file (stdout when omitted)
    output: Option<PathBuf>,

    /// Path to configuration file (JSON, or TOML with a .toml extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name the classes Model and Form
    #[arg(short = 'r', long)]
    default_rename: bool,

    /// Generate only the model
    #[arg(short = 'm', long)]
    only_model: bool,

    /// Generate only the form
    #[arg(short = 'f', long)]
    only_form: bool,

    /// Use plain SQLAlchemy instead of Flask-SQLAlchemy
    #[arg(short = 's', long)]
    classic_sqlalchemy: bool,

    /// Indent with tabs instead of spaces
    #[arg(short, long)]
    tab: bool,

    /// Translate form labels into this language
    #[arg(short = 'l', long, value_parser = language_code)]
    translate_labels: Option<String>,

    /// Language the labels are written in
    #[arg(short = 'L', long, value_parser = language_code)]
    label_original_language: Option<String>,

    /// Verbose logging
    #[arg(short = 'v', long)]
    log_mode: bool,

    /// Environment file with default arguments (defaults to ./.env)
    #[arg(short, long)]
    env: Option<PathBuf>,

    /// Add a submit button, optionally with a custom label
    #[arg(long, num_args = 0..=1, default_missing_value = "Submit")]
    submit: Option<String>,
}

impl Cli {
    /// Flags only override lower layers when given
    fn overrides(&self) -> ArgumentOverrides {
        let flag = |set: bool| set.then_some(true);
        ArgumentOverrides {
            database_url: self.database.clone(),
            table_name: self.table_name.clone(),
            output_path: self.output.clone(),
            default_rename: flag(self.default_rename),
            only_model: flag(self.only_model),
            only_form: flag(self.only_form),
            classic_sqlalchemy: flag(self.classic_sqlalchemy),
            tab: flag(self.tab),
            translate_labels: self.translate_labels.clone(),
            label_original_language: self.label_original_language.clone(),
            log_mode: flag(self.log_mode),
            submit: self.submit.clone(),
        }
    }
}

fn language_code(code: &str) -> std::result::Result<String, String> {
    if languages::is_supported(code) {
        Ok(code.to_string())
    } else {
        Err(format!("unsupported language code '{}'", code))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = init_logging(cli.log_mode);

    match run(&cli, &filter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<GeneratorError>() {
                Some(generator_err) => eprintln!("{}: {}", generator_err.kind(), generator_err),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, filter: &FilterHandle) -> Result<()> {
    let environment = EnvironmentDefaults::load(cli.env.as_deref())?;
    let config = ConfigResolver::new(environment)
        .config_path(cli.config.clone())
        .resolve(&cli.overrides())?;

    // log_mode may come from the environment or config file
    if config.arguments.log_mode && !cli.log_mode {
        raise_verbosity(filter);
    }
    debug!("Effective configuration: {:?}", config);

    let report = db_model_generator::generate(&config)?;
    info!(
        "Read {} columns, generated {}",
        report.column_count,
        report.parts.join(" and ")
    );
    Ok(())
}

/// Install the stderr subscriber
///
/// Priority: RUST_LOG env var > --log-mode > default
fn init_logging(verbose: bool) -> FilterHandle {
    let default_filter = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    handle
}

fn raise_verbosity(handle: &FilterHandle) {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }
    if let Err(err) = handle.modify(|filter| *filter = EnvFilter::new(VERBOSE_FILTER)) {
        eprintln!("Could not raise log level: {}", err);
    }
}
