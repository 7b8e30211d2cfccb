use clap::Parser;
use mysql_sync::{Config, SyncRunner};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "mysql-sync")]
#[command(about = "Copies new rows between MySQL tables and emails a report", long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.yml")]
    config: PathBuf,

    #[arg(short, long, value_name = "FILE", help = "Log file, overrides sync.log_file")]
    log_file: Option<PathBuf>,

    #[arg(short, long, help = "Enable JSON output for console logs")]
    json_logs: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // The log file location may live in the config, so read it before logging is up.
    let config = Config::from_file(&args.config);
    let log_file = args.log_file.clone().unwrap_or_else(|| match &config {
        Ok(cfg) => cfg.sync.log_file.clone(),
        Err(_) => PathBuf::from("mysqlsync.log"),
    });

    let file_error = init_logging(&log_file, args.json_logs, args.verbose).err();
    if let Some(e) = file_error {
        warn!(
            path = %log_file.display(),
            error = %e,
            "Unable to open log file, logging to console only"
        );
    }

    info!("Loading configuration from {:?}", args.config);
    let config = match config {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("FATAL: Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        source = %config.source.location(),
        destination = %config.destination.location(),
        mail_relay = %format!("{}:{}", config.mail.host, config.mail.port),
        mail_to = ?config.mail.to,
        "Configuration summary"
    );

    let runner = SyncRunner::new(config, &args.config).with_log_file(&log_file);
    match runner.run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("FATAL: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Installs a console layer and, when the file can be opened, an
/// append-only file layer. Returns the file error if it could not.
fn init_logging(log_file: &Path, json: bool, verbose: bool) -> std::io::Result<()> {
    let env_filter = || {
        if verbose {
            EnvFilter::new("mysql_sync=debug,info")
        } else {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mysql_sync=info,warn"))
        }
    };

    let console_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed()
    };

    let file = OpenOptions::new().create(true).append(true).open(log_file);
    let (file_layer, file_error) = match file {
        Ok(file) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(env_filter()),
            ),
            None,
        ),
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(console_layer.with_filter(env_filter()))
        .with(file_layer)
        .init();

    match file_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
