//! Benchmarks for the tree reconciliation engine.
//!
//! Measures the cost of a full reconcile pass over source trees of
//! varying size, both the initial (link-creating) run and the idempotent
//! re-run, which is the common case in repeated deployments.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use legacy_link::conflict::OverwritePolicy;
use legacy_link::reconcile::{reconcile, Granularity, ReconcileOptions, ReconciliationTask};

/// Create a layered source tree with `num_files` files spread over
/// subdirectories.
fn create_source(root: &Path, num_files: usize) {
    for i in 0..num_files {
        let path = root.join(format!("common/group{}/file{}.ini", i / 50, i));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("[section{}]\n", i)).unwrap();
    }
}

fn task(dir: &TempDir) -> ReconciliationTask {
    ReconciliationTask::new(
        "bench",
        dir.path().join("deploy"),
        dir.path().join("runtime"),
        "dev",
        OverwritePolicy::Preserve,
        Granularity::File,
        &[],
    )
    .unwrap()
}

fn bench_initial_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_initial");
    group.sample_size(10);

    for size in [10, 100, 500] {
        group.bench_with_input(BenchmarkId::new("files", size), &size, |b, &size| {
            b.iter_with_setup(
                || {
                    let dir = TempDir::new().unwrap();
                    create_source(&dir.path().join("deploy"), size);
                    dir
                },
                |dir| {
                    let task = task(&dir);
                    reconcile(&task, &ReconcileOptions::default()).unwrap()
                },
            )
        });
    }

    group.finish();
}

fn bench_idempotent_rerun(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_rerun");
    group.sample_size(10);

    for size in [10, 100, 500] {
        let dir = TempDir::new().unwrap();
        create_source(&dir.path().join("deploy"), size);
        let task = task(&dir);
        // First run creates the links; the benchmark measures the re-run
        reconcile(&task, &ReconcileOptions::default()).unwrap();

        group.bench_with_input(BenchmarkId::new("files", size), &size, |b, _| {
            b.iter(|| reconcile(&task, &ReconcileOptions::default()).unwrap())
        });
    }

    group.finish();
}

fn bench_dry_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_dry_run");
    group.sample_size(10);

    let dir = TempDir::new().unwrap();
    create_source(&dir.path().join("deploy"), 200);
    let task = task(&dir);
    let options = ReconcileOptions {
        dry_run: true,
        strict: false,
    };

    group.bench_function("files_200", |b| {
        b.iter(|| reconcile(&task, &options).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_initial_run, bench_idempotent_rerun, bench_dry_run);
criterion_main!(benches);
