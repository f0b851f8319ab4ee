//! bandblur: run the smoothing pipeline as a local process group.
//!
//! One thread per rank plays the part of the fixed process group: the
//! coordinator on the main thread, one worker thread per worker rank.
//! Roles and transport never assume shared memory; every pixel crosses
//! between ranks by value through the group transport.

mod config;
mod input_gen;
mod logger;

use bandblur_core::bmp;
use bandblur_core::pipeline::{CoordinatorRole, Role, WorkerRole};
use bandblur_core::transport::form_group;
use config::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("run with --help for usage");
            return ExitCode::FAILURE;
        }
    };

    logger::init();

    if config.print_config {
        config.print();
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> bandblur_core::Result<()> {
    let source = materialize_input(config)?;

    // Form the group: rank 0 plus one rank per worker.
    let group_size = config.workers + 1;
    let mut endpoints = form_group(group_size);
    let mut coordinator_end = endpoints.remove(0);

    info!(group_size, workers = config.workers, "group formed");

    // Each worker thread owns its endpoint outright.
    let mut workers = Vec::with_capacity(config.workers);
    for (i, mut endpoint) in endpoints.into_iter().enumerate() {
        let rank = i + 1;
        let handle = std::thread::Builder::new()
            .name(format!("worker-{}", rank))
            .spawn(move || WorkerRole::new().run(&mut endpoint))?;
        workers.push(handle);
    }

    let mut coordinator = CoordinatorRole::new(&source, &config.output_file);
    let coordinator_result = coordinator.run(&mut coordinator_end);

    // Dropping the coordinator's endpoint unblocks any worker still
    // waiting on a receive, so an aborted run cannot hang the group.
    drop(coordinator_end);

    for handle in workers {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("worker failed: {}", e),
            Err(_) => warn!("worker panicked"),
        }
    }

    coordinator_result?;

    if config.print_metrics {
        coordinator.metrics().print_summary();
    }

    Ok(())
}

/// Resolve the source image path, generating a sample if none was given.
fn materialize_input(config: &Config) -> bandblur_core::Result<PathBuf> {
    match &config.input_file {
        Some(path) => Ok(path.clone()),
        None => {
            let sample = input_gen::generate_sample_image(
                config.seed,
                config.sample_width,
                config.sample_height,
            )?;
            let path = std::env::temp_dir().join(format!("bandblur-sample-{}.bmp", config.seed));
            bmp::write_file(&path, &sample)?;
            info!(
                path = %path.display(),
                seed = config.seed,
                "generated sample image"
            );
            Ok(path)
        }
    }
}
