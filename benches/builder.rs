use bsonbuf::{Builder, RawDocument, RawDocumentBuf};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

fn construct_deep_doc(depth: usize) -> RawDocumentBuf {
    let mut builder = Builder::new();
    for _ in 0..depth {
        builder.open_document_with_key("value").unwrap();
    }
    builder.append("value", 23i64).unwrap();
    for _ in 0..depth {
        builder.close_document().unwrap();
    }
    builder.extract().unwrap()
}

fn construct_broad_doc(size: usize) -> RawDocumentBuf {
    let mut builder = Builder::with_capacity(size * 24);
    for i in 0..size {
        builder.append(format!("key {}", i), "lorem ipsum").unwrap();
    }
    builder.extract().unwrap()
}

fn build_deep(c: &mut Criterion) {
    let mut group = c.benchmark_group("build-deep");
    for depth in &[10, 100, 1000] {
        let depth = *depth;
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| construct_deep_doc(depth))
        });
    }
    group.finish();
}

fn build_broad(c: &mut Criterion) {
    let mut group = c.benchmark_group("build-broad");
    for size in &[10, 100, 1000] {
        let size = *size;
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| construct_broad_doc(size))
        });
    }
    group.finish();
}

fn build_array(c: &mut Criterion) {
    const SIZE: i32 = 1000;
    c.bench_function("build-array", |b| {
        let mut builder = Builder::new();
        b.iter(|| {
            builder.open_array_with_key("values").unwrap();
            for i in 0..SIZE {
                builder.append_value(i).unwrap();
            }
            builder.close_array().unwrap();
            builder.clear();
        })
    });
}

fn access_deep(c: &mut Criterion) {
    let mut group = c.benchmark_group("access-deep");
    for depth in &[10, 100, 1000] {
        let doc = construct_deep_doc(*depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &doc, |b, doc| {
            b.iter(|| {
                let mut current: &RawDocument = doc;
                while let Ok(next) = current.get_document("value") {
                    current = next;
                }
                current.get_i64("value").unwrap();
            })
        });
    }
    group.finish();
}

fn access_broad(c: &mut Criterion) {
    const SIZE: usize = 1000;
    let mut group = c.benchmark_group("access-broad");
    let doc = construct_broad_doc(SIZE);
    for count in &[1, 10, 50] {
        let count = *count;
        let keys_to_get: Vec<_> = ((SIZE - count)..SIZE).map(|i| format!("key {}", i)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &keys_to_get, |b, keys| {
            b.iter(|| {
                for key in keys {
                    doc.get_str(key).unwrap();
                }
            })
        });
    }
    group.finish();
}

fn iter_broad(c: &mut Criterion) {
    const SIZE: usize = 1000;
    let doc = construct_broad_doc(SIZE);
    c.bench_function("iter-broad", |b| {
        b.iter(|| {
            let mut i = 0;
            for result in &doc {
                if result.and_then(|e| e.value()).is_ok() {
                    i += 1;
                }
            }
            assert_eq!(i, SIZE);
        })
    });
}

criterion_group!(
    builder,
    build_deep,
    build_broad,
    build_array
);
criterion_group!(reader, access_deep, access_broad, iter_broad);
criterion_main!(builder, reader);
