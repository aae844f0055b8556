use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt, reload};

use netconf_eventsource::config::LOG_FILTER_ENV;
use netconf_eventsource::{Config, FilesystemSchemaRepository, SchemaSourceResolver, YangLibService};

/// nc-eventsource - YANG schema sources for NETCONF event-source mounts
#[derive(Parser)]
#[command(name = "nc-eventsource", version, about)]
struct Cli {
    /// Directory of `.yang` sources
    #[arg(long, env = "EVENTSOURCE_SCHEMA_DIR")]
    schema_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the text of a schema source
    Schema {
        /// Module name
        name: String,
        /// Revision (YYYY-MM-DD); empty selects the newest
        #[arg(short, long, default_value = "")]
        revision: String,
    },
    /// List schema sources in the schema directory
    Sources {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging before config so config-file warnings are visible
    let env_filter = std::env::var(LOG_FILTER_ENV).ok();
    let (filter, reload) = reload::Layer::new(EnvFilter::new(log_filter(
        cli.verbose,
        env_filter.as_deref(),
    )));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("fatal: {e}");
            return ExitCode::FAILURE;
        }
    };

    // A filter from the config file only applies when nothing overrode it
    if env_filter.is_none()
        && cli.verbose == 0
        && let Some(configured) = config.log_filter.as_deref()
        && let Err(e) = reload.reload(EnvFilter::new(configured))
    {
        tracing::warn!(error = %e, "failed to apply configured log filter");
    }

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Filter directive from `-v` count, or the environment when not verbose
fn log_filter(verbose: u8, env: Option<&str>) -> String {
    match (verbose, env) {
        (0, Some(configured)) => configured.to_string(),
        (0, None) => "warn,netconf_eventsource=info".to_string(),
        (1, _) => "info,netconf_eventsource=debug".to_string(),
        (2, _) => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let schema_dir = cli.schema_dir.unwrap_or(config.schema_dir);
    let repository = FilesystemSchemaRepository::new(schema_dir);
    tracing::debug!(dir = %repository.dir().display(), "using schema directory");

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Schema { name, revision } => {
            let resolver = SchemaSourceResolver::new(Arc::new(repository));
            let text = resolver.get_schema(&name, &revision)?;
            stdout.write_all(text.as_bytes())?;
        }
        Command::Sources { json } => {
            let sources = repository.list()?;
            if json {
                serde_json::to_writer_pretty(&mut stdout, &sources)?;
                writeln!(stdout)?;
            } else {
                for id in &sources {
                    writeln!(stdout, "{id}")?;
                }
            }
        }
    }
    Ok(())
}
