//! Command-line watcher for enhancement jobs.
//!
//! Submits local files, follows the job history until nothing is left
//! running, and saves the enhanced output of jobs that finish meanwhile.

pub mod config;
pub mod runner;
pub mod submit;
