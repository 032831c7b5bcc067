//! Shared fixtures for the workspace benchmarks and end-to-end suite.

pub mod bench_support;
