use std::hint::black_box;
use bencher::{TestCase, TestFile};
use bytes::Bytes;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use local_http::protocol::Request;
use local_web::{MultipartDecoder, RequestAdapter};

static SMALL_FORM: TestFile = TestFile::new("form_small.txt", include_str!("../resources/multipart/form_small.txt"));
static LARGE_FORM: TestFile = TestFile::new("form_large.txt", include_str!("../resources/multipart/form_large.txt"));

const CONTENT_TYPE: &str = "multipart/form-data; boundary=WebKitFormBoundary7MA4YWxkTrZu0gW";

fn create_test_cases() -> Vec<TestCase> {
    vec![TestCase::small("small_form_decoder", SMALL_FORM), TestCase::large("large_form_decoder", LARGE_FORM)]
}

fn benchmark_multipart_decoder(criterion: &mut Criterion) {
    let test_cases = create_test_cases();
    let mut group = criterion.benchmark_group("multipart_decoder");

    for case in test_cases {
        group.throughput(Throughput::Bytes(case.len()));
        group.sample_size(case.group().sample_size());
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            let decoder = MultipartDecoder::new();
            b.iter(|| {
                let result = decoder.decode(black_box(&Bytes::from_static(case.file().content().as_bytes())));
                assert!(!result.fields.is_empty(), "input should be a valid multipart body");
                black_box(result);
            });
        });
    }

    group.finish();
}

fn benchmark_request_adapter(criterion: &mut Criterion) {
    let test_cases = create_test_cases();
    let mut group = criterion.benchmark_group("request_adapter");

    for case in test_cases {
        group.throughput(Throughput::Bytes(case.len()));
        group.sample_size(case.group().sample_size());
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter_batched(
                || {
                    Request::new("POST", "/api/upload?format=json&test=name")
                        .with_header("Content-Type", CONTENT_TYPE)
                        .with_header("Cookie", "ss-id=0SJVAVnpdJc2kWkz8DXS; API-SESSION-ID=17-4ab0")
                        .with_body(case.file().content())
                },
                |request| black_box(RequestAdapter::new(request)),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(decoder, benchmark_multipart_decoder, benchmark_request_adapter);
criterion_main!(decoder);
