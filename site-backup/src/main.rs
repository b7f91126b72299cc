//! Site Backup - operator CLI
//!
//! Export, validate, and import site backup archives from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use site_backup::executor::{BackupPipeline, ExportRequest};
use site_backup::progress::TransferProgress;
use site_backup::{validate_backup, Config};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a customer's site to a backup archive
    Export {
        /// Customer to export
        customer_id: String,

        /// Free-form description stored in the manifest
        #[arg(short, long)]
        description: Option<String>,

        /// Output file (defaults to the generated backup filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a backup archive without importing it
    Validate {
        /// Archive file to check
        file: PathBuf,

        /// Customer the archive is expected to belong to
        customer_id: String,
    },

    /// Import a backup archive into a customer's site
    Import {
        /// Archive file to restore
        file: PathBuf,

        /// Customer to restore into
        customer_id: String,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Progress sink that logs each event.
fn log_progress(progress: TransferProgress) {
    match (&progress.current_item, progress.total_items) {
        (Some(item), Some(total)) => tracing::info!(
            "[{:>3}%] {} ({}/{}: {})",
            progress.percent,
            progress.message,
            progress.processed_items.unwrap_or(0) + 1,
            total,
            item,
        ),
        _ => tracing::info!("[{:>3}%] {}", progress.percent, progress.message),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = if let Some(config_path) = &args.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };

    let log_level = args.log_level.as_deref().unwrap_or(&config.log.level);
    init_logging(log_level);

    tracing::info!("site-backup v{}", env!("CARGO_PKG_VERSION"));

    let pipeline = BackupPipeline::from_config(&config);

    match args.command {
        Command::Export {
            customer_id,
            description,
            output,
        } => {
            let request = ExportRequest {
                customer_id,
                description,
            };
            let export = pipeline.export(request, &log_progress).await?;

            let path = output.unwrap_or_else(|| PathBuf::from(&export.filename));
            std::fs::write(&path, &export.archive)?;
            tracing::info!(
                "Wrote {} ({} bytes, {} media files)",
                path.display(),
                export.archive.len(),
                export.manifest.stats.media_file_count,
            );
        }

        Command::Validate { file, customer_id } => {
            let bytes = std::fs::read(&file)?;
            let result = tokio::task::spawn_blocking(move || {
                validate_backup(&bytes, &customer_id)
            })
            .await?;

            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.is_valid {
                std::process::exit(1);
            }
        }

        Command::Import { file, customer_id } => {
            let bytes = std::fs::read(&file)?;
            let import = pipeline
                .import(&bytes, &customer_id, &log_progress)
                .await?;

            for warning in &import.warnings {
                tracing::warn!("{}", warning);
            }
            tracing::info!(
                "Restored backup {} ({} media files)",
                import.manifest.backup_id,
                import.media_files_restored,
            );
        }
    }

    Ok(())
}
