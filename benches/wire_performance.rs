//! HTTP/1.1 wire benchmarks
//!
//! This benchmark suite measures:
//! - Request serialization with headers and query parameters
//! - Response parsing with `Content-Length` bodies
//! - Chunked body reassembly (small and large chunks)
//!
//! Run with: cargo bench --bench wire_performance

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use h1wire::http::chunked::decode_chunked_body;
use h1wire::http::{parse_response, HttpRequest, Method, RequestSerializer};

fn chunked_body(total: usize, chunk: usize) -> Vec<u8> {
    let data = vec![b'x'; total];
    let mut out = Vec::with_capacity(total + total / chunk * 8 + 5);
    for piece in data.chunks(chunk) {
        out.extend_from_slice(format!("{:x}\r\n", piece.len()).as_bytes());
        out.extend_from_slice(piece);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"0\r\n\r\n");
    out
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    let serializer = RequestSerializer::new("bench.example.com");

    let get = HttpRequest::builder()
        .method(Method::Get)
        .path("/search")
        .param("q", "rust")
        .param("page", "2")
        .header("Accept", "text/html")
        .header("User-Agent", "h1wire-bench")
        .build()
        .unwrap();

    group.bench_function("get_with_query", |b| {
        b.iter(|| black_box(serializer.serialize(black_box(&get))));
    });

    let post = HttpRequest::builder()
        .method(Method::Post)
        .path("/upload")
        .header("Content-Type", "application/octet-stream")
        .body(vec![0u8; 64 * 1024])
        .build()
        .unwrap();

    group.throughput(Throughput::Bytes(64 * 1024));
    group.bench_function("post_64k", |b| {
        b.iter(|| black_box(serializer.serialize(black_box(&post))));
    });

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_response");

    for size in [0usize, 1024, 64 * 1024] {
        let body = "y".repeat(size);
        let raw = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nServer: bench\r\nContent-Length: {}\r\n\r\n{}",
            size, body
        )
        .into_bytes();

        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_with_input(BenchmarkId::new("content_length", size), &raw, |b, raw| {
            b.iter(|| black_box(parse_response(black_box(raw)).unwrap()));
        });
    }

    group.finish();
}

fn bench_chunked(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunked_decode");

    for chunk in [16usize, 1024, 16 * 1024] {
        let input = chunked_body(256 * 1024, chunk);

        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::new("256k_body", chunk), &input, |b, input| {
            b.iter(|| black_box(decode_chunked_body(black_box(input)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_serialize, bench_parse, bench_chunked);
criterion_main!(benches);
