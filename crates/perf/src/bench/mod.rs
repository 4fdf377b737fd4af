//! Benchmark modules

pub mod index;
