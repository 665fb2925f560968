//! pg-dbinfo CLI - dump a PostgreSQL schema with derived relationships.

use clap::Parser;
use pg_dbinfo::output::write_to_file;
use pg_dbinfo::{introspect, render, CatalogReader, Config, DbInfoError, OutputFormat, PostgresReader};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status after Ctrl-C, following the shell's 128 + SIGINT convention.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "pg-dbinfo")]
#[command(about = "Dump a PostgreSQL schema with its foreign key relationships")]
#[command(version)]
struct Cli {
    /// Connection string (postgresql:// URL or key=value DSN)
    #[arg(env = "DATABASE_URL", hide_env_values = true)]
    connection: Option<String>,

    /// Path to YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Schema to introspect (repeatable; default: all non-system schemas)
    #[arg(short, long = "schema", value_name = "SCHEMA")]
    schemas: Vec<String>,

    /// Qualified table to skip, as schema.table (repeatable)
    #[arg(long = "exclude-table", value_name = "SCHEMA.TABLE")]
    exclude_tables: Vec<String>,

    /// Output format: yaml or json
    #[arg(short, long)]
    format: Option<String>,

    /// Number of tables fetched concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Write the document to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, DbInfoError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let config = build_config(&cli)?;
    let reader = PostgresReader::connect(&config.database).await?;

    let schema = tokio::select! {
        result = introspect(&reader, config.introspection.clone()) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, closing connections");
            reader.close().await;
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
    };
    reader.close().await;
    let schema = schema?;

    match &cli.output {
        Some(path) => write_to_file(&schema, config.output.format, path)?,
        None => {
            let doc = render(&schema, config.output.format)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(doc.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Merge the config file, connection string and flag overrides.
fn build_config(cli: &Cli) -> Result<Config, DbInfoError> {
    let mut config = match (&cli.config, &cli.connection) {
        (Some(path), connection) => {
            let mut config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            if let Some(url) = connection {
                config.database.url = Some(url.clone());
            }
            config
        }
        (None, Some(url)) => Config::from_url(url.clone()),
        (None, None) => {
            return Err(DbInfoError::Config(
                "no connection string given: pass one as the first argument, set DATABASE_URL, \
                 or use --config"
                    .to_string(),
            ))
        }
    };

    if !cli.schemas.is_empty() {
        config.introspection.schemas = cli.schemas.clone();
    }
    if !cli.exclude_tables.is_empty() {
        config.introspection.exclude_tables = cli.exclude_tables.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        config.introspection.concurrency = concurrency;
    }
    if let Some(format) = &cli.format {
        config.output.format = OutputFormat::parse(format).ok_or_else(|| {
            DbInfoError::Config(format!("unknown output format '{}': use yaml or json", format))
        })?;
    }

    config.validate()?;
    Ok(config)
}

/// Log to stderr; stdout is reserved for the rendered document.
fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
