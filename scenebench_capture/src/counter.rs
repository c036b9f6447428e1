//! Descriptors for the per-frame counters a renderer reports
//!
//! The renderer and scenebench agree on a fixed, ordered counter table out of
//! band, the way a wire format agrees on a schema version. Each capture line
//! carries one raw numeric field per counter, in table order. No in-band
//! schema is transmitted.

use serde::Serialize;

/// Errors produced by [`CounterSet`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested counter name is not present in the table. This is a
    /// caller configuration error and is never retried.
    #[error("unknown counter: {0}")]
    UnknownCounter(String),
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// The raw unit of a counter field.
pub enum CounterKind {
    /// A small-magnitude count or percentage.
    Count,
    /// A 64-bit nanosecond timer delta. Wide enough that scaling must go
    /// through `f64`, never through a narrow integer.
    Nanos,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
/// Static description of one per-frame counter.
pub struct CounterSpec {
    /// Unique key for the counter, matched case-sensitively.
    pub name: &'static str,
    /// The raw unit of the field.
    pub kind: CounterKind,
    /// Multiplier converting raw units to display units, applied per-sample
    /// before any statistics are computed.
    pub scale: f64,
    /// Human-readable axis label, display units included.
    pub label: &'static str,
}

/// A counter chosen out of a [`CounterSet`], carrying its field position.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    /// The matched counter.
    pub spec: &'a CounterSpec,
    /// Position of the counter's field in each capture line.
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
/// An immutable, ordered table of [`CounterSpec`].
///
/// Constructed explicitly and passed by reference wherever parsing happens.
/// There is intentionally no global table.
pub struct CounterSet {
    specs: Vec<CounterSpec>,
}

impl CounterSet {
    /// Create a [`CounterSet`] from an explicit table.
    #[must_use]
    pub fn new(specs: Vec<CounterSpec>) -> Self {
        Self { specs }
    }

    /// The table the renderer's performance logging writes: a frame index,
    /// three nanosecond timers scaled to milliseconds, CPU percentage and two
    /// memory figures in kilobytes.
    #[must_use]
    pub fn standard() -> Self {
        use CounterKind::{Count, Nanos};
        Self::new(vec![
            CounterSpec {
                name: "frameCount",
                kind: Count,
                scale: 1.0,
                label: "Frame count",
            },
            CounterSpec {
                name: "syncTime",
                kind: Nanos,
                scale: 0.000_001,
                label: "Sync time (ms)",
            },
            CounterSpec {
                name: "renderTime",
                kind: Nanos,
                scale: 0.000_001,
                label: "Render time (ms)",
            },
            CounterSpec {
                name: "gpuRenderTime",
                kind: Nanos,
                scale: 0.000_001,
                label: "GPU render time (ms)",
            },
            CounterSpec {
                name: "cpuUsage",
                kind: Count,
                scale: 1.0,
                label: "CPU usage (%)",
            },
            CounterSpec {
                name: "vszMemory",
                kind: Count,
                scale: 1.0,
                label: "Virtual size memory (kB)",
            },
            CounterSpec {
                name: "rssMemory",
                kind: Count,
                scale: 1.0,
                label: "RSS memory (kB)",
            },
        ])
    }

    /// Number of counters, equivalently the required field count of a valid
    /// capture line.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// True if the table holds no counters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// The counters in field order.
    #[must_use]
    pub fn specs(&self) -> &[CounterSpec] {
        &self.specs
    }

    /// Look up a counter by name, case-sensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCounter`] if no counter carries `name`.
    pub fn select(&self, name: &str) -> Result<Selection<'_>, Error> {
        self.specs
            .iter()
            .position(|spec| spec.name == name)
            .map(|index| Selection {
                spec: &self.specs[index],
                index,
            })
            .ok_or_else(|| Error::UnknownCounter(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_returns_position_in_field_order() {
        let counters = CounterSet::standard();
        let selection = counters
            .select("renderTime")
            .expect("renderTime is in the standard table");
        assert_eq!(selection.index, 2);
        assert!((selection.spec.scale - 0.000_001).abs() < f64::EPSILON);
        assert_eq!(selection.spec.label, "Render time (ms)");
    }

    #[test]
    fn select_is_case_sensitive() {
        let counters = CounterSet::standard();
        let err = counters.select("RenderTime").unwrap_err();
        assert_eq!(err, Error::UnknownCounter("RenderTime".to_string()));
    }

    #[test]
    fn select_rejects_names_outside_the_table() {
        let counters = CounterSet::standard();
        assert!(counters.select("paintTime").is_err());
        assert!(counters.select("").is_err());
    }

    #[test]
    fn standard_table_has_seven_counters() {
        let counters = CounterSet::standard();
        assert_eq!(counters.len(), 7);
        let names: Vec<&str> = counters.specs().iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "frameCount",
                "syncTime",
                "renderTime",
                "gpuRenderTime",
                "cpuUsage",
                "vszMemory",
                "rssMemory"
            ]
        );
    }
}
