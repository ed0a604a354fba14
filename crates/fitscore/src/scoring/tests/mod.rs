mod common;
mod deterministic;
mod service;
