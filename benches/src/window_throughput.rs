use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use futures::io::Cursor;
use tokio::runtime::Runtime;
use windowed_batch::prelude::*;

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 4, 18, 0, 0, 0).unwrap()
}

/// Five-minute glucose reads, as a sensor produces them
fn generate_reads(count: usize) -> Vec<GlucoseRead> {
    (0..count)
        .map(|i| {
            GlucoseRead::new(
                epoch() + TimeDelta::minutes(5 * i as i64),
                80 + (i % 120) as u16,
            )
        })
        .collect()
}

fn generate_csv(count: usize) -> String {
    let mut csv = String::from("timestamp,value\n");
    for read in generate_reads(count) {
        csv.push_str(&format!(
            "{},{}\n",
            read.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
            read.value
        ));
    }
    csv
}

/// Benchmark record-at-a-time writes against one call per slice
fn bench_write_granularity(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_granularity");
    let runtime = Runtime::new().unwrap();

    for num_reads in [1_000, 10_000, 100_000] {
        let reads = generate_reads(num_reads);

        group.bench_with_input(BenchmarkId::new("write_one", num_reads), &reads, |b, reads| {
            b.to_async(&runtime).iter_batched(
                || StreamBuffer::new(MemoryBatchStore::new(), Duration::from_secs(3600)).unwrap(),
                |mut buffer| async move {
                    for read in reads {
                        black_box(buffer.write_one(read.clone()).await);
                    }
                    black_box(buffer.close().await);
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("write_many", num_reads), &reads, |b, reads| {
            b.to_async(&runtime).iter_batched(
                || StreamBuffer::new(MemoryBatchStore::new(), Duration::from_secs(3600)).unwrap(),
                |mut buffer| async move {
                    black_box(buffer.write_many(reads).await);
                    black_box(buffer.close().await);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Benchmark window spans and anchoring policies
fn bench_window_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_policies");
    let runtime = Runtime::new().unwrap();
    let reads = generate_reads(50_000);
    let reads = &reads;

    for policy in [WindowPolicy::GridAligned, WindowPolicy::FirstArrival] {
        for (span_name, span) in [
            ("15m", Duration::from_secs(900)),
            ("1h", Duration::from_secs(3600)),
            ("1d", Duration::from_secs(86_400)),
        ] {
            let config = StreamConfig::new(span).with_policy(policy);

            group.bench_with_input(
                BenchmarkId::new(policy.as_str(), span_name),
                &config,
                |b, config| {
                    b.to_async(&runtime).iter_batched(
                        || StreamBuffer::with_config(MemoryBatchStore::new(), config).unwrap(),
                        |mut buffer| async move {
                            black_box(buffer.write_many(reads).await);
                            black_box(buffer.close().await);
                        },
                        BatchSize::SmallInput,
                    );
                },
            );
        }
    }

    group.finish();
}

/// Benchmark the versioned representation against the in-place buffer
fn bench_versioned_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("versioned_stream");
    let runtime = Runtime::new().unwrap();
    let reads = generate_reads(10_000);
    let reads = &reads;

    group.bench_function("write_one_chain", |b| {
        b.to_async(&runtime).iter_batched(
            || VersionedStream::new(MemoryBatchStore::new(), Duration::from_secs(3600)).unwrap(),
            |mut stream| async move {
                for read in reads {
                    let (next, commit) = stream.write_one(read.clone()).await;
                    black_box(commit);
                    stream = next;
                }
                black_box(stream.close().await);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Benchmark a CSV import from parsing to CSV output
fn bench_csv_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv_pipeline");
    let runtime = Runtime::new().unwrap();

    for num_reads in [1_000, 10_000] {
        let csv = generate_csv(num_reads);

        group.bench_with_input(BenchmarkId::from_parameter(num_reads), &csv, |b, csv| {
            b.to_async(&runtime).iter_batched(
                || csv.clone(),
                |csv| async move {
                    let stream = CsvRecordStream::<GlucoseRead>::new(Cursor::new(csv.into_bytes()));
                    let sink = CsvBatchSink::new(tokio::io::sink());
                    let buffer = StreamBuffer::new(sink, Duration::from_secs(86_400)).unwrap();
                    let mut session = ImportSession::new(buffer, SilentSkip);
                    black_box(session.run(stream).await.unwrap());
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_write_granularity,
    bench_window_policies,
    bench_versioned_stream,
    bench_csv_pipeline
);
criterion_main!(benches);
