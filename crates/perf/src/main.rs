//! Wall-clock benchmark harness for the tanoak index.
//!
//! Run with `RUST_LOG=debug` to surface the index crate's build and query
//! diagnostics alongside the timings.

mod bench;
mod report;
mod utils;

use report::Report;

fn main() {
    env_logger::init();

    println!("Tanoak performance benchmarks");
    println!("=============================\n");

    let mut report = Report::new();

    println!("Index:");
    bench::index::run(&mut report);
    println!();

    report.print_summary();
}
