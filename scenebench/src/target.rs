//! Manages the renderer sub-process
//!
//! The scenebench 'target' is the renderer binary measured by a run. For each
//! scene the renderer is launched with performance logging enabled, pointed
//! at a capture file of scenebench's choosing, and told to quit on its own
//! once it has rendered the target number of frames. The success path is
//! therefore the renderer exiting zero by itself; a shutdown signal mid-run
//! terminates the renderer with SIGTERM so it has a chance to clean up.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    str,
};

use nix::{
    errno::Errno,
    sys::signal::{SIGTERM, kill},
    unistd::Pid,
};
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

/// Errors produced by [`Server`]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Unable to spawn the renderer
    #[error("unable to spawn renderer: {0}")]
    Spawn(io::Error),
    /// Unable to await renderer exit
    #[error("unable to wait for renderer exit: {0}")]
    Wait(io::Error),
    /// SIGTERM error
    #[error("unable to terminate renderer process: {0}")]
    SigTerm(Errno),
    /// The renderer exited with a failure status
    #[error("renderer exited with failure: {0}")]
    Failed(ExitStatus),
    /// The run was interrupted by a shutdown signal
    #[error("renderer interrupted by shutdown")]
    Interrupted,
    /// Process already finished error
    #[error("child has already been polled to completion")]
    ProcessFinished,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
#[serde(untagged)]
/// Defines the [`Output`] behavior for stderr and stdout.
pub enum Behavior {
    /// Redirect the stream to /dev/null
    Quiet,
    /// Write the stream to a location on-disk.
    Log(PathBuf),
}

impl Default for Behavior {
    fn default() -> Self {
        Self::Quiet
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Behavior::Quiet => write!(f, "/dev/null")?,
            Behavior::Log(ref path) => write!(f, "{}", path.display())?,
        }
        Ok(())
    }
}

impl str::FromStr for Behavior {
    type Err = &'static str;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut path = PathBuf::new();
        path.push(input);
        Ok(Behavior::Log(path))
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
/// Defines how renderer stderr and stdout are handled.
pub struct Output {
    #[serde(default)]
    /// Determines how stderr is routed.
    pub stderr: Behavior,
    #[serde(default)]
    /// Determines how stdout is routed.
    pub stdout: Behavior,
}

fn stdio(behavior: &Behavior) -> Stdio {
    match behavior {
        Behavior::Quiet => Stdio::null(),
        Behavior::Log(path) => {
            let fp = fs::File::create(path).unwrap_or_else(|_| {
                panic!(
                    "Full directory path does not exist: {path}",
                    path = path.display()
                );
            });
            Stdio::from(fp)
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
/// Configuration for [`Server`]
pub struct Config {
    /// The path to the renderer executable.
    pub command: PathBuf,
    /// Arguments placed before the flags scenebench adds.
    #[serde(default)]
    pub arguments: Vec<String>,
    /// Manages stderr, stdout of the renderer sub-process.
    #[serde(default)]
    pub output: Output,
}

#[derive(Debug)]
/// The renderer server.
///
/// This struct launches the renderer under measurement, once per call to
/// [`Server::run`]. Runs are strictly sequential; each owns its child
/// process.
pub struct Server {
    config: Config,
    shutdown: scenebench_signal::Watcher,
}

impl Server {
    /// Create a new [`Server`] instance
    #[must_use]
    pub fn new(config: Config, shutdown: scenebench_signal::Watcher) -> Self {
        Self { config, shutdown }
    }

    /// Render `scene` to completion, logging per-frame counters to
    /// `capture_path`.
    ///
    /// The renderer is expected to quit on its own after `frame_count`
    /// frames. A renderer that exits early produces a short capture file;
    /// that is not an error here, the capture parser decides what a short
    /// file means.
    ///
    /// # Errors
    ///
    /// Function will return an error if the renderer cannot be spawned or
    /// waited on, if it exits non-zero, or if a shutdown signal interrupts
    /// the run.
    ///
    /// # Panics
    ///
    /// None are known.
    pub async fn run(
        &self,
        scene: &Path,
        capture_path: &Path,
        frame_count: u32,
    ) -> Result<(), Error> {
        let mut cmd = Command::new(&self.config.command);
        cmd.stdin(Stdio::null())
            .stdout(stdio(&self.config.output.stdout))
            .stderr(stdio(&self.config.output.stderr))
            .kill_on_drop(true)
            .args(&self.config.arguments)
            .arg("--performance-logging")
            .arg("--performance-log-file")
            .arg(capture_path)
            .arg("--continuous-update")
            .arg("--quit-after-frame-count")
            .arg(frame_count.to_string())
            .arg(scene);

        debug!(
            "spawning renderer {command} for scene {scene}",
            command = self.config.command.display(),
            scene = scene.display()
        );
        let mut child = cmd.spawn().map_err(Error::Spawn)?;
        let child_id = child.id().ok_or(Error::ProcessFinished)?;

        let shutdown_wait = self.shutdown.clone().recv();
        tokio::pin!(shutdown_wait);
        tokio::select! {
            res = child.wait() => {
                let status = res.map_err(Error::Wait)?;
                if status.success() {
                    Ok(())
                } else {
                    Err(Error::Failed(status))
                }
            },
            () = &mut shutdown_wait => {
                info!("shutdown signal received");
                // Note that `Child::kill` sends SIGKILL which is not what we
                // want. We instead send SIGTERM so that the renderer has a
                // chance to clean up.
                let pid = Pid::from_raw(
                    child_id.try_into().expect("Failed to convert into valid PID"),
                );
                kill(pid, SIGTERM).map_err(Error::SigTerm)?;
                child.wait().await.map_err(Error::Wait)?;
                Err(Error::Interrupted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn behavior_round_trips_through_strings() {
        let behavior = Behavior::from_str("/tmp/renderer.log").expect("any string is a log path");
        assert_eq!(behavior, Behavior::Log(PathBuf::from("/tmp/renderer.log")));
        assert_eq!(behavior.to_string(), "/tmp/renderer.log");
        assert_eq!(Behavior::default().to_string(), "/dev/null");
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: Config = serde_yaml::from_str("command: /usr/bin/scene-renderer")
            .expect("minimal config is valid");
        assert_eq!(config.command, PathBuf::from("/usr/bin/scene-renderer"));
        assert!(config.arguments.is_empty());
        assert_eq!(config.output, Output::default());
    }
}
