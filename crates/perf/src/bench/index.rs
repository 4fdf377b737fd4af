//! Index performance benchmarks

use crate::report::Report;
use crate::utils::*;
use tanoak_index::{BTreeIndex, Key, RowId};

pub fn run(report: &mut Report) {
    bulk_load(report);
    point_queries(report);
    range_scans(report);
}

fn spaced_batch(size: usize) -> (Vec<Key>, Vec<RowId>) {
    let keys: Vec<Key> = (0..size).map(|i| (i * 5) as Key).collect();
    let values: Vec<RowId> = (0..size).map(|i| i as RowId).collect();
    (keys, values)
}

fn bulk_load(report: &mut Report) {
    println!("  BTree Bulk Load:");
    for &size in &SIZES {
        let (keys, values) = spaced_batch(size);

        let result = measure(LOAD_ITERATIONS, || {
            let mut tree = BTreeIndex::default();
            tree.load(&keys, &values).unwrap();
            tree
        });

        let throughput = result.throughput(size);
        println!(
            "    {:>7} rows: {:>10} ({:>12})",
            size,
            format_duration(result.mean),
            format_throughput(throughput)
        );
        report.add_result("Index/BTree", "load", Some(size), result, Some(throughput));
    }
}

fn point_queries(report: &mut Report) {
    println!("  BTree Point Query (strided order):");
    for &size in &SIZES {
        let (keys, values) = spaced_batch(size);
        let mut tree = BTreeIndex::default();
        tree.load(&keys, &values).unwrap();

        // Stride through the key space to avoid querying one hot leaf.
        let lookup_count = 1000.min(size);
        let lookup_keys: Vec<Key> = (0..lookup_count)
            .map(|i| (((i * 141) % size) * 5) as Key)
            .collect();

        let result = measure(ITERATIONS, || {
            let mut found = 0;
            for &key in &lookup_keys {
                if !tree.get_vals(key, key + 1).unwrap().is_empty() {
                    found += 1;
                }
            }
            found
        });

        let throughput = lookup_count as f64 / result.mean.as_secs_f64();
        println!(
            "    {:>7} rows ({} lookups): {:>10} ({:>12})",
            size,
            lookup_count,
            format_duration(result.mean),
            format_throughput(throughput)
        );
        report.add_result("Index/BTree", "point_query", Some(size), result, Some(throughput));
    }
}

fn range_scans(report: &mut Report) {
    println!("  BTree Range Scan:");
    let (keys, values) = spaced_batch(100_000);
    let mut tree = BTreeIndex::default();
    tree.load(&keys, &values).unwrap();

    for &range_size in &[100, 1000, 10000] {
        let lower = 1000 as Key;
        let upper = lower + (range_size * 5) as Key;

        let result = measure(ITERATIONS, || tree.get_vals(lower, upper).unwrap());

        let throughput = range_size as f64 / result.mean.as_secs_f64();
        println!(
            "    {:>7} rows: {:>10} ({:>12})",
            range_size,
            format_duration(result.mean),
            format_throughput(throughput)
        );
        report.add_result("Index/BTree", "range_scan", Some(range_size), result, Some(throughput));
    }
}
