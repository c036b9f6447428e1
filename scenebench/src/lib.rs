//! The scenebench frame-timing comparison tool.
//!
//! This library supports the scenebench binary found elsewhere in this
//! project. The bits and pieces here are not intended to be used outside of
//! supporting scenebench, although if they are helpful in other domains
//! that's a nice surprise.

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod harness;
pub mod probe;
pub mod report;
pub mod target;
