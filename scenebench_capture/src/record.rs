//! Parsing of raw telemetry lines into frame records
//!
//! A renderer may exit mid-write, leaving a truncated final line, or may
//! interleave unrelated log output with frame data. Parsing here is therefore
//! skip-and-continue: a line either yields a complete [`FrameRecord`] or it
//! yields nothing at all.

use crate::counter::CounterSet;

/// Marker token a renderer may prefix frame lines with to distinguish them
/// from other log output. A leading standalone `F` is stripped before fields
/// are read; lines without the marker are accepted as-is.
pub const FRAME_MARKER: &str = "F";

#[derive(Debug, Clone, PartialEq, Eq)]
/// One parsed telemetry line, raw field values positionally aligned with a
/// [`CounterSet`].
pub struct FrameRecord {
    fields: Vec<i64>,
}

impl FrameRecord {
    /// Parse one capture line against `counters`.
    ///
    /// Returns `Some` if and only if, after stripping an optional
    /// [`FRAME_MARKER`], the whitespace-split field count equals the counter
    /// count and every field parses as a 64-bit integer. Malformed lines
    /// return `None` and are expected to be skipped by the caller.
    #[must_use]
    pub fn parse(line: &str, counters: &CounterSet) -> Option<Self> {
        let mut tokens = line.split_ascii_whitespace().peekable();
        if tokens.peek() == Some(&FRAME_MARKER) {
            tokens.next();
        }

        let mut fields = Vec::with_capacity(counters.len());
        for token in tokens {
            fields.push(token.parse::<i64>().ok()?);
        }
        if fields.len() == counters.len() {
            Some(Self { fields })
        } else {
            None
        }
    }

    /// The raw field at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<i64> {
        self.fields.get(index).copied()
    }

    /// All raw fields in line order.
    #[must_use]
    pub fn fields(&self) -> &[i64] {
        &self.fields
    }
}
