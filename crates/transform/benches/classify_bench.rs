//! 소스 판별 벤치마크
//!
//! 스토리지 키 패턴 매칭과 스트림 메타데이터 판별의 스케일링을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::json;

use ocsforge_transform::{SourceDetector, SourcesRegistry};

/// N개 소스를 가진 레지스트리를 생성합니다. 마지막 소스만 매칭됩니다.
fn registry_with_sources(count: usize) -> SourcesRegistry {
    let sources: Vec<String> = (0..count)
        .map(|i| {
            let prefix = if i == count - 1 {
                "AWSLogs/*/elasticloadbalancing/*".to_owned()
            } else {
                format!("other-{i}/*")
            };
            format!(
                r#"{{
                    "name": "source-{i}",
                    "mapping_file": "source-{i}.json",
                    "inputs": {{
                        "storage": {{"enabled": true, "buckets": [
                            {{"bucket": "logs", "prefix": "{prefix}"}}
                        ]}},
                        "stream": {{"enabled": true}}
                    }}
                }}"#
            )
        })
        .collect();

    let json = format!(r#"{{"sources": [{}]}}"#, sources.join(","));
    SourcesRegistry::parse(&json, "bench.json").unwrap()
}

const KEY: &str = "AWSLogs/123456789012/elasticloadbalancing/eu-west-1/2024/01/15/log.gz";

fn bench_storage_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_storage");

    for source_count in [1usize, 8, 32] {
        let registry = registry_with_sources(source_count);
        let detector = SourceDetector::from_sources(&registry.sources).unwrap();

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(source_count),
            &detector,
            |b, detector| b.iter(|| detector.detect_storage(black_box("logs"), black_box(KEY))),
        );
    }

    group.finish();
}

fn bench_stream_detection(c: &mut Criterion) {
    let registry = registry_with_sources(8);
    let detector = SourceDetector::from_sources(&registry.sources).unwrap();
    let payload = json!({"source": "source-7", "EventId": 1});

    let mut group = c.benchmark_group("detect_stream");
    group.throughput(Throughput::Elements(1));
    group.bench_function("metadata_field", |b| {
        b.iter(|| detector.detect_stream(black_box(&payload)))
    });
    group.finish();
}

criterion_group!(benches, bench_storage_detection, bench_stream_detection);
criterion_main!(benches);
