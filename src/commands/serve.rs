//! `shapemock serve` command.

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::cli::SourceArgs;
use crate::config::Options;
use crate::context::ServiceContext;
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::server::watch::{run_updates, watch_changes, ChangeFilter};
use crate::server::{self, ServerState};

/// Execute the `serve` command.
///
/// Generates mocks once, then serves them until Ctrl-C. Unless watching
/// is disabled, source and mock-file changes are applied while serving.
///
/// # Errors
///
/// Returns an error string if options are invalid, the first pass fails,
/// or the server cannot bind.
pub fn run(
    ctx: ServiceContext,
    source: &SourceArgs,
    host: Option<&str>,
    port: Option<u16>,
    no_watch: bool,
) -> std::result::Result<(), String> {
    let mut options = super::load_options(ctx.fs.as_ref(), source)?;
    if let Some(host) = host {
        options.host = host.to_string();
    }
    if let Some(port) = port {
        options.port = port;
    }
    if no_watch {
        options.watch_file = false;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {e}"))?;
    runtime.block_on(serve(ctx, options)).map_err(|e| e.to_string())
}

async fn serve(ctx: ServiceContext, options: Options) -> Result<()> {
    let mut pipeline = Pipeline::new(ctx, options.clone())?;
    pipeline.refresh()?;
    let state = ServerState::new(pipeline.mocks().clone());

    let watcher = if options.watch_file {
        let (watcher, changes) = watch_changes(ChangeFilter::new(&options.base_path, &options.mock_dir))?;
        tokio::spawn(run_updates(pipeline, changes, state.clone()));
        Some(watcher)
    } else {
        None
    };

    let listener = TcpListener::bind((options.host.as_str(), options.port))
        .await
        .map_err(|e| Error::Server(format!("cannot bind {}:{}: {e}", options.host, options.port)))?;
    let addr = listener.local_addr().map_err(|e| Error::Server(e.to_string()))?;
    info!(%addr, records = state.snapshot().len(), watching = watcher.is_some(), "serving mocks");

    server::serve(listener, state, shutdown_signal()).await?;
    drop(watcher);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
