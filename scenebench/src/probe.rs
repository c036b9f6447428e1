//! Best-effort lookup of the GL renderer string
//!
//! Comparing frame timings only makes sense against a known GPU and driver,
//! so the report header carries the OpenGL renderer string when one can be
//! found. The probe shells out to `glxinfo`; hosts without it simply produce
//! an untitled report.
//
// TODO(egl): query EGL-only hosts, glxinfo is X11-bound.

use std::process::Stdio;

use tokio::process::Command;
use tracing::warn;

const RENDERER_PREFIX: &str = "OpenGL renderer string:";

/// Look up the GL renderer string by running `glxinfo`.
///
/// Returns `None`, with a warning logged, if `glxinfo` is missing, fails or
/// emits nothing usable. This is never fatal to a run.
pub async fn renderer_title() -> Option<String> {
    let output = Command::new("glxinfo")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await;

    let output = match output {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            warn!(
                "glxinfo exited with {status}, report will carry no renderer title",
                status = output.status
            );
            return None;
        }
        Err(err) => {
            warn!("can't run glxinfo ({err}), report will carry no renderer title");
            return None;
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let title = parse_renderer_title(&stdout);
    if title.is_none() {
        warn!("glxinfo output held no renderer string");
    }
    title
}

fn parse_renderer_title(glxinfo_output: &str) -> Option<String> {
    glxinfo_output
        .lines()
        .find_map(|line| line.strip_prefix(RENDERER_PREFIX))
        .map(|rest| rest.trim().to_string())
}
