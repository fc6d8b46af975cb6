//! Concurrent Store Benchmarks
//!
//! Measures the concurrent store across access patterns and segment counts.
//! A single segment is the global-lock baseline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lru_store::config::{ConcurrentLruStoreConfig, ConcurrentStoreConfig, LruStoreConfig};
use lru_store::{ConcurrentLruStore, SyncStorage};
use std::sync::Arc;
use std::thread;

const ENTRIES: usize = 10_000;
const VALUE_LEN: usize = 16;
const THREADS: usize = 8;
const OPS_PER_THREAD: usize = 1_000;

fn key(i: usize) -> Vec<u8> {
    (i as u64).to_be_bytes().to_vec()
}

fn make_store(segments: usize) -> Arc<ConcurrentLruStore> {
    let config: ConcurrentLruStoreConfig = ConcurrentStoreConfig {
        // headroom for uneven hashing between segments
        base: LruStoreConfig {
            max_size: (ENTRIES * (8 + VALUE_LEN) * 2) as u64,
        },
        segments,
    };
    let store = Arc::new(ConcurrentLruStore::init(config, None));
    for i in 0..ENTRIES {
        store.put(key(i), vec![0u8; VALUE_LEN]);
    }
    store
}

/// Benchmark concurrent reads of resident keys
fn concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Reads");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    for segments in [1, 16] {
        let store = make_store(segments);
        group.bench_with_input(BenchmarkId::new("segments", segments), &store, |b, store| {
            b.iter(|| run_concurrent_reads(Arc::clone(store), THREADS, OPS_PER_THREAD));
        });
    }

    group.finish();
}

/// Benchmark concurrent writes of fresh keys, each forcing an eviction
fn concurrent_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Writes");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    for segments in [1, 16] {
        let store = make_store(segments);
        group.bench_with_input(BenchmarkId::new("segments", segments), &store, |b, store| {
            b.iter(|| run_concurrent_writes(Arc::clone(store), THREADS, OPS_PER_THREAD));
        });
    }

    group.finish();
}

/// Benchmark different segment counts under a mixed workload
fn segment_count_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("Segment Count Comparison");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    for segments in [1, 4, 8, 16, 32, 64] {
        group.bench_with_input(
            BenchmarkId::new("segments", segments),
            &segments,
            |b, &seg_count| {
                let store = make_store(seg_count);
                b.iter(|| run_concurrent_mixed(Arc::clone(&store), THREADS, OPS_PER_THREAD));
            },
        );
    }

    group.finish();
}

fn run_concurrent_reads<S>(store: Arc<S>, num_threads: usize, ops_per_thread: usize)
where
    S: SyncStorage<Vec<u8>, Vec<u8>> + 'static,
{
    let mut handles = Vec::with_capacity(num_threads);
    for t in 0..num_threads {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..ops_per_thread {
                let k = key((t * ops_per_thread + i) % ENTRIES);
                black_box(store.get(&k));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

fn run_concurrent_writes<S>(store: Arc<S>, num_threads: usize, ops_per_thread: usize)
where
    S: SyncStorage<Vec<u8>, Vec<u8>> + 'static,
{
    let mut handles = Vec::with_capacity(num_threads);
    for t in 0..num_threads {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..ops_per_thread {
                let k = key(ENTRIES + t * ops_per_thread + i);
                black_box(store.put(k, vec![0u8; VALUE_LEN]));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

// 80% reads, 20% writes
fn run_concurrent_mixed<S>(store: Arc<S>, num_threads: usize, ops_per_thread: usize)
where
    S: SyncStorage<Vec<u8>, Vec<u8>> + 'static,
{
    let mut handles = Vec::with_capacity(num_threads);
    for t in 0..num_threads {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..ops_per_thread {
                let k = key((t * ops_per_thread + i) % ENTRIES);
                if i % 5 == 0 {
                    black_box(store.put(k, vec![1u8; VALUE_LEN]));
                } else {
                    black_box(store.get(&k));
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

criterion_group!(
    benches,
    concurrent_reads,
    concurrent_writes,
    segment_count_comparison
);
criterion_main!(benches);
