//! Match scoring between candidate documents and target postings, with realtime
//! broadcast of results and background batch jobs.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod jobs;
pub mod quota;
pub mod scoring;
pub mod store;
pub mod telemetry;
