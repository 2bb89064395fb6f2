//! One harvester run: configuration, input, batch, report.

use std::io::{self, IsTerminal};
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use harvester_core::DownloadEngine;
use tracing::{debug, info, warn};

use crate::ProcessExit;
use crate::app::{
    config_runtime, exit_handler, input_processor, output, progress_manager, terminal,
};
use crate::app_config::load_default_file_config;

pub(crate) async fn run_downloader() -> Result<ProcessExit> {
    let (args, cli_sources) = config_runtime::parse_cli_with_sources();

    let no_color = terminal::no_color_env_requested();
    terminal::init_tracing(
        terminal::default_log_level(args.verbose, args.quiet),
        no_color,
    );
    debug!(?args, "CLI arguments parsed");

    let loaded_config = load_default_file_config()?;
    if loaded_config.config.is_some()
        && let Some(path) = &loaded_config.path
    {
        debug!(path = %path.display(), "loaded config file");
    }
    let config = config_runtime::resolve_download_config(
        &args,
        &cli_sources,
        loaded_config.config.as_ref(),
    );

    let urls = input_processor::collect_urls(&args)?;
    if urls.is_empty() {
        info!("{}", output::NO_INPUT_GUIDANCE);
        info!("{}", output::INPUT_PIPE_EXAMPLE);
        return Ok(ProcessExit::Success);
    }

    let engine = DownloadEngine::with_http_client(config)
        .context("Invalid download settings")?;
    info!(
        urls = urls.len(),
        output_dir = %engine.config().output_dir.display(),
        "harvester starting"
    );

    let deadline = engine.deadline_for(urls.len());
    let interrupt = {
        let deadline = deadline.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling remaining downloads");
                deadline.cancel();
            }
        })
    };

    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        args.quiet,
        args.json,
        terminal::is_dumb_terminal(),
    );
    let (spinner, stop) =
        progress_manager::spawn_progress_ui(use_spinner, engine.stats(), urls.len());

    let outcomes = engine.run_batch_until(&urls, &deadline).await;

    stop.store(true, Ordering::SeqCst);
    if let Some(handle) = spinner {
        let _ = handle.await;
    }
    interrupt.abort();

    if args.json {
        println!("{}", output::render_json(&outcomes)?);
    } else if !args.quiet {
        println!("{}", output::render_summary(&outcomes));
    }

    let stats = engine.stats();
    Ok(exit_handler::determine_exit_outcome(
        stats.succeeded(),
        stats.failed(),
    ))
}
