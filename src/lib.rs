#[macro_use]
extern crate lazy_static;

pub mod cli;
pub mod client;
pub mod cookies;
pub mod dispatcher;
pub mod driver;
pub mod error;
pub mod fetcher;
pub mod html;
pub mod models;
pub mod naming;
pub mod toc;

/// Result of handling a single chapter or lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Downloaded,
    /// Output already on disk from a previous run
    Skipped,
}
