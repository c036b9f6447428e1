//! Drives a comparison run to completion
//!
//! One run launches the renderer once per scene, strictly in sequence. Each
//! launch logs per-frame counters to a scratch capture file which is parsed
//! as soon as the renderer exits. Scenes whose capture fell short of the
//! target frame count are omitted from the report rather than summarized
//! short; a counter name outside the table aborts the whole run before any
//! renderer is spawned.

use std::num::NonZeroUsize;
use std::path::Path;

use scenebench_capture::{counter, counter::CounterSet, json, series};
use tempfile::NamedTempFile;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{config::Config, probe, report, target};

/// Errors produced by [`Harness`]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The configured counter is not in the table. Fatal to the run.
    #[error(transparent)]
    Counter(#[from] counter::Error),
    /// See [`crate::target::Error`] for details.
    #[error("Renderer error: {0}")]
    Target(#[from] target::Error),
    /// See [`crate::report::Error`] for details.
    #[error("Report error: {0}")]
    Report(#[from] report::Error),
    /// Wrapper around [`std::io::Error`].
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
/// The comparison harness.
///
/// No action is taken until [`Harness::run`] is called. It is assumed that
/// only one instance of this struct will ever exist at a time, although there
/// are no protections for that.
pub struct Harness {
    config: Config,
    counters: CounterSet,
    shutdown: scenebench_signal::Watcher,
}

impl Harness {
    /// Create a new [`Harness`] instance measuring against the standard
    /// counter table.
    #[must_use]
    pub fn new(config: Config, shutdown: scenebench_signal::Watcher) -> Self {
        Self {
            config,
            counters: CounterSet::standard(),
            shutdown,
        }
    }

    /// Run this [`Harness`] to completion
    ///
    /// Renders every configured scene and writes the report. A shutdown
    /// signal stops the run between scenes, or terminates the renderer
    /// mid-scene; either way the report holds whatever completed before the
    /// signal.
    ///
    /// # Errors
    ///
    /// Function will return an error if the configured counter is unknown, if
    /// the renderer cannot be launched or fails, or if the report cannot be
    /// written.
    ///
    /// # Panics
    ///
    /// None are known.
    pub async fn run(self) -> Result<(), Error> {
        let Self {
            config,
            counters,
            mut shutdown,
        } = self;

        // An unknown counter is a configuration error, checked before any
        // renderer is spawned. Not retryable.
        let selection = counters.select(&config.counter)?;
        let target_frames = NonZeroUsize::try_from(config.frame_count)
            .expect("frame count fits in usize");

        let title = probe::renderer_title().await;
        let header = json::Header {
            run_id: Uuid::new_v4(),
            title,
            counter: selection.spec.name.to_string(),
            label: selection.spec.label.to_string(),
            frame_count: config.frame_count.get(),
        };
        let mut writer = report::Writer::create(&config.report_path, &header)?;
        let server = target::Server::new(config.renderer, shutdown.clone());

        for scene in &config.scenes {
            if shutdown.try_recv() {
                info!("shutdown signal received, leaving remaining scenes unrendered");
                break;
            }

            let capture = NamedTempFile::new()?;
            match server
                .run(scene, capture.path(), config.frame_count.get())
                .await
            {
                Ok(()) => {}
                Err(target::Error::Interrupted) => {
                    info!("run interrupted, leaving remaining scenes unrendered");
                    break;
                }
                Err(err) => return Err(err.into()),
            }

            let contents = tokio::fs::read_to_string(capture.path()).await?;
            let series = series::collect(contents.lines(), &counters, &selection, target_frames);
            match series.finalize() {
                Ok(stats) => {
                    let line = json::SceneLine {
                        scene: scene_label(scene),
                        stats,
                        samples: series.samples().to_vec(),
                    };
                    info!("{legend}", legend = line.legend());
                    writer.record_scene(&line)?;
                }
                Err(err) => {
                    // The renderer quit before filling the capture, most
                    // likely a scene that fails to load. Short statistics
                    // mislead, so the scene contributes nothing.
                    warn!(
                        "scene {scene} omitted from report: {err}",
                        scene = scene.display()
                    );
                }
            }
        }

        if writer.scenes_recorded() == 0 {
            warn!("no scene produced a complete series, report holds only the header");
        }
        Ok(())
    }
}

fn scene_label(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target;
    use std::num::NonZeroU32;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    // A stand-in renderer: parses the flags scenebench passes, then writes
    // `body` worth of capture lines.
    fn write_fake_renderer(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-renderer.sh");
        let script = format!(
            "#!/bin/sh\n\
             out=\n\
             n=0\n\
             while [ \"$#\" -gt 0 ]; do\n\
             \tcase \"$1\" in\n\
             \t\t--performance-log-file) out=\"$2\"; shift 2 ;;\n\
             \t\t--quit-after-frame-count) n=\"$2\"; shift 2 ;;\n\
             \t\t*) shift ;;\n\
             \tesac\n\
             done\n\
             {body}\n"
        );
        std::fs::write(&path, script).expect("script can be written");
        let mut perms = std::fs::metadata(&path)
            .expect("script exists")
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("script can be made executable");
        path
    }

    fn test_config(command: PathBuf, report_path: PathBuf, frame_count: u32) -> Config {
        Config {
            renderer: target::Config {
                command,
                arguments: Vec::new(),
                output: target::Output::default(),
            },
            counter: "renderTime".to_string(),
            frame_count: NonZeroU32::new(frame_count).expect("frame count is positive"),
            scenes: vec![PathBuf::from("a.qml"), PathBuf::from("b.qml")],
            report_path,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn complete_captures_fill_the_report() {
        let dir = tempfile::tempdir().expect("tempdir can be created");
        // Constant 2ms renderTime, full frame count.
        let renderer = write_fake_renderer(
            dir.path(),
            "i=1\n\
             while [ \"$i\" -le \"$n\" ]; do\n\
             \tprintf 'F %d 1000000 2000000 3000000 5 100 200\\n' \"$i\" >> \"$out\"\n\
             \ti=$((i+1))\n\
             done",
        );
        let report_path = dir.path().join("report.jsonl");
        let config = test_config(renderer, report_path.clone(), 3);

        let (watcher, broadcaster) = scenebench_signal::signal();
        Harness::new(config, watcher)
            .run()
            .await
            .expect("run completes");
        broadcaster.signal();

        let contents = std::fs::read_to_string(&report_path).expect("report exists");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3, "header plus two scenes");

        let scene: serde_json::Value =
            serde_json::from_str(lines[1]).expect("scene line is valid json");
        assert_eq!(scene["scene"], "a.qml");
        assert_eq!(scene["average"], 2.0);
        assert_eq!(scene["stddev"], 0.0);
        assert_eq!(scene["samples"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn short_captures_are_omitted() {
        let dir = tempfile::tempdir().expect("tempdir can be created");
        // Two valid frames regardless of the requested count.
        let renderer = write_fake_renderer(
            dir.path(),
            "printf 'F 1 1000000 2000000 3000000 5 100 200\\n' >> \"$out\"\n\
             printf 'F 2 1000000 2000000 3000000 5 100 200\\n' >> \"$out\"",
        );
        let report_path = dir.path().join("report.jsonl");
        let config = test_config(renderer, report_path.clone(), 5);

        let (watcher, _broadcaster) = scenebench_signal::signal();
        Harness::new(config, watcher)
            .run()
            .await
            .expect("run completes");

        let contents = std::fs::read_to_string(&report_path).expect("report exists");
        assert_eq!(contents.lines().count(), 1, "header only, no scene lines");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn malformed_lines_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().expect("tempdir can be created");
        // A log line, a truncated line, then enough valid frames.
        let renderer = write_fake_renderer(
            dir.path(),
            "printf 'renderer: vsync off\\n' >> \"$out\"\n\
             printf 'F 1 1000000 4000000 3000000 5 100 200\\n' >> \"$out\"\n\
             printf 'F 2 1000000 20000\\n' >> \"$out\"\n\
             printf 'F 3 1000000 6000000 3000000 5 100 200\\n' >> \"$out\"\n\
             printf 'F 4 1000000 5000000 3000000 5 100 200\\n' >> \"$out\"",
        );
        let report_path = dir.path().join("report.jsonl");
        let mut config = test_config(renderer, report_path.clone(), 3);
        config.scenes = vec![PathBuf::from("a.qml")];

        let (watcher, _broadcaster) = scenebench_signal::signal();
        Harness::new(config, watcher)
            .run()
            .await
            .expect("run completes");

        let contents = std::fs::read_to_string(&report_path).expect("report exists");
        let scene: serde_json::Value = serde_json::from_str(
            contents.lines().nth(1).expect("scene line present"),
        )
        .expect("scene line is valid json");
        assert_eq!(scene["average"], 5.0);
        assert_eq!(scene["min"], 4.0);
        assert_eq!(scene["max"], 6.0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unknown_counter_aborts_before_rendering() {
        let dir = tempfile::tempdir().expect("tempdir can be created");
        let report_path = dir.path().join("report.jsonl");
        // Deliberately not executable; the run must fail before reaching it.
        let mut config = test_config(
            dir.path().join("no-such-renderer"),
            report_path.clone(),
            3,
        );
        config.counter = "RenderTime".to_string();

        let (watcher, _broadcaster) = scenebench_signal::signal();
        let res = Harness::new(config, watcher).run().await;
        assert!(matches!(res, Err(Error::Counter(_))));
        assert!(!report_path.exists(), "no report for an aborted run");
    }
}
