//! `concall` binary entry point.
//!
//! One invocation performs one sync pass: discover earnings-call transcripts
//! for every watched entity on the source portal and upload the ones the
//! Drive archive does not already hold.

mod report;
mod sync;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "concall", about = "Sync earnings-call transcripts into the Drive archive")]
struct Cli {
    /// Plan the run without uploading anything to the archive.
    #[arg(long)]
    dry_run: bool,

    /// Restrict the run to a single watchlist entity, by slug.
    #[arg(long, value_name = "SLUG")]
    entity: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = concall_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let result = tokio::select! {
        result = sync::run_sync(&config, cli.dry_run, cli.entity.as_deref()) => result,
        () = shutdown_signal() => {
            tracing::warn!("shutdown signal received, aborting the run");
            return Ok(());
        }
    };

    match result {
        Ok(summary) => {
            let text = report::render_summary(&summary, &config.store_root_folder_id, cli.dry_run);
            println!("{text}");
            if !cli.dry_run {
                report::notify_best_effort(&config, "transcript sync finished", &text).await;
            }
            Ok(())
        }
        Err(err) => {
            let text = format!("run aborted: {err:#}");
            report::notify_best_effort(&config, "transcript sync aborted", &text).await;
            Err(err)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
