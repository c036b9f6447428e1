//! Crate regarding scenebench's frame capture files
//!
//! A renderer run by scenebench writes one telemetry line per rendered frame.
//! This crate turns those lines into per-counter sample series and summary
//! statistics. It performs no I/O and spawns no processes; callers feed it
//! already-captured text.

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::perf)]
#![deny(clippy::suspicious)]
#![deny(clippy::complexity)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![allow(clippy::cast_precision_loss)]

pub mod counter;
pub mod json;
pub mod record;
pub mod series;
