//! JSON form of a scenebench report, meant to be read line by line from a
//! file
//!
//! A report opens with a single [`Header`] object followed by one
//! [`SceneLine`] object per compared scene. External plotters and reporters
//! consume this file; scenebench itself never charts anything.

use serde::Serialize;
use uuid::Uuid;

use crate::series::Stats;

#[derive(Debug, Serialize, Clone)]
/// Run-level metadata, the first line of a report file.
pub struct Header {
    /// An id that is mostly unique to this run, allowing us to distinguish
    /// duplications of the same comparison setup.
    pub run_id: Uuid,
    /// GL renderer string, when the probe found one. Used as a chart title.
    pub title: Option<String>,
    /// Name of the compared counter.
    pub counter: String,
    /// Display label of the compared counter, axis-ready.
    pub label: String,
    /// Frames required from every scene appearing in this report.
    pub frame_count: u32,
}

#[derive(Debug, Serialize, Clone)]
/// One compared scene: summary statistics plus the full scaled series.
pub struct SceneLine {
    /// The scene file, reduced to its final path component.
    pub scene: String,
    #[serde(flatten)]
    /// Statistics over exactly `frame_count` scaled samples.
    pub stats: Stats,
    /// The scaled samples in frame order, one per rendered frame.
    pub samples: Vec<f64>,
}

impl SceneLine {
    /// Legend text for a plotted line, scene name annotated with average and
    /// standard deviation.
    #[must_use]
    pub fn legend(&self) -> String {
        format!(
            "{scene} (avg={avg:.2}, stdev={dev:.2})",
            scene = self.scene,
            avg = self.stats.average,
            dev = self.stats.stddev
        )
    }
}
