//! Berth CLI - Tear down multi-service container projects

#![cfg_attr(test, allow(clippy::expect_used))]

use berth_cli::cli::Cli;
use berth_cli::domain::TeardownError;
use berth_cli::output::json;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let as_json = cli.json;
    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    if let Err(e) = cli.run(&cancel).await {
        report_error(&e, as_json);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Cancel in-flight runtime commands on Ctrl+C or SIGTERM.
async fn cancel_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("cannot listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::warn!("interrupted, cancelling runtime commands");
    cancel.cancel();
}

fn report_error(e: &anyhow::Error, as_json: bool) {
    if as_json {
        let code = e
            .downcast_ref::<TeardownError>()
            .map_or("error", TeardownError::code);
        match json::format_error(&format!("{e:#}"), code) {
            Ok(doc) => println!("{doc}"),
            Err(_) => eprintln!("Error: {e:#}"),
        }
    } else {
        eprintln!("Error: {e:#}");
    }
}
