use std::{num::NonZeroU32, path::PathBuf};

use clap::Parser;
use scenebench::{
    config::{self, Config},
    harness::{self, Harness},
    target,
};
use tokio::{runtime::Builder, signal};
use tracing::info;
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::Error),
    #[error("Harness error: {0}")]
    Harness(#[from] harness::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("--renderer-path is required when no config file is given")]
    MissingRendererPath,
    #[error("--report-path is required when no config file is given")]
    MissingReportPath,
    #[error("no scene files given")]
    NoScenes,
}

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Args {
    /// path on disk to the configuration file
    #[clap(long)]
    config_path: Option<PathBuf>,
    /// the per-frame counter to compare: 'frameCount', 'syncTime',
    /// 'renderTime', 'gpuRenderTime', 'cpuUsage', 'vszMemory', 'rssMemory'
    #[clap(long)]
    counter: Option<String>,
    /// the number of valid frames required from every scene
    #[clap(long)]
    frame_count: Option<NonZeroU32>,
    /// the path of the renderer executable
    #[clap(long)]
    renderer_path: Option<PathBuf>,
    /// the path to write renderer's stdout
    #[clap(long)]
    renderer_stdout_path: Option<target::Behavior>,
    /// the path to write renderer's stderr
    #[clap(long)]
    renderer_stderr_path: Option<target::Behavior>,
    /// path on disk to write the comparison report
    #[clap(long)]
    report_path: Option<PathBuf>,
    /// scene files to compare, one renderer run each
    scenes: Vec<PathBuf>,
}

fn default_frame_count() -> NonZeroU32 {
    NonZeroU32::new(config::DEFAULT_FRAME_COUNT).expect("default frame count is positive")
}

fn get_config(args: &Args, contents: Option<String>) -> Result<Config, Error> {
    let base = if let Some(contents) = contents {
        Some(Config::parse(&contents)?)
    } else if let Some(path) = &args.config_path {
        Some(Config::from_path(path)?)
    } else {
        None
    };

    if let Some(mut config) = base {
        // Command line flags override the config file field for field.
        if let Some(counter) = &args.counter {
            config.counter.clone_from(counter);
        }
        if let Some(frame_count) = args.frame_count {
            config.frame_count = frame_count;
        }
        if let Some(path) = &args.renderer_path {
            config.renderer.command.clone_from(path);
        }
        if let Some(behavior) = &args.renderer_stdout_path {
            config.renderer.output.stdout = behavior.clone();
        }
        if let Some(behavior) = &args.renderer_stderr_path {
            config.renderer.output.stderr = behavior.clone();
        }
        if let Some(path) = &args.report_path {
            config.report_path.clone_from(path);
        }
        if !args.scenes.is_empty() {
            config.scenes.clone_from(&args.scenes);
        }
        Ok(config)
    } else {
        let command = args
            .renderer_path
            .clone()
            .ok_or(Error::MissingRendererPath)?;
        let report_path = args.report_path.clone().ok_or(Error::MissingReportPath)?;
        if args.scenes.is_empty() {
            return Err(Error::NoScenes);
        }
        Ok(Config {
            renderer: target::Config {
                command,
                arguments: Vec::new(),
                output: target::Output {
                    stdout: args.renderer_stdout_path.clone().unwrap_or_default(),
                    stderr: args.renderer_stderr_path.clone().unwrap_or_default(),
                },
            },
            counter: args
                .counter
                .clone()
                .unwrap_or_else(|| config::DEFAULT_COUNTER.to_string()),
            frame_count: args.frame_count.unwrap_or_else(default_frame_count),
            scenes: args.scenes.clone(),
            report_path,
        })
    }
}

async fn inner_main(config: Config) -> Result<(), Error> {
    let (shutdown_watcher, shutdown_broadcast) = scenebench_signal::signal();

    let harness = Harness::new(config, shutdown_watcher);
    let mut handle = tokio::spawn(harness.run());

    tokio::select! {
        res = &mut handle => {
            match res {
                Ok(harness_result) => harness_result?,
                Err(err) => panic!("Could not join the spawned harness task: {err}"),
            }
        },
        _ = signal::ctrl_c() => {
            info!("received ctrl-c");
            shutdown_broadcast.signal();
            match handle.await {
                Ok(harness_result) => harness_result?,
                Err(err) => panic!("Could not join the spawned harness task: {err}"),
            }
        },
    }
    Ok(())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .finish()
        .init();

    let version = env!("CARGO_PKG_VERSION");
    info!("Starting scenebench {version} run.");

    let args = Args::parse();
    let config = get_config(&args, None)?;

    let runtime = Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()?;
    let res = runtime.block_on(inner_main(config));
    info!("Bye. :)");
    res
}
