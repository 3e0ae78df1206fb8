/*
** This file is a part of Markup (incremental XML subset parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Markup is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use markup::{MarkupParser, MarkupWriter, NullHandler};

const BLOCKS: usize = 5_000;

fn make_document(blocks: usize) -> String {
    let mut doc = String::with_capacity(blocks * 96);
    doc.push_str("<?xml version='1.0'?>\n<catalog>\n");
    for i in 0..blocks {
        doc.push_str(&format!(
            "  <book id='b{}' lang=\"en\"><title>Tom &amp; Jerry &#x263A; {}</title>\
             <!-- note --><empty/></book>\n",
            i, i
        ));
    }
    doc.push_str("</catalog>\n");
    doc
}

fn bench_feed_chunked(c: &mut Criterion) {
    let input = make_document(BLOCKS);
    let bytes = input.as_bytes();
    let mut group = c.benchmark_group("feed_chunked");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    for chunk_size in [1usize, 7, 64, 4096, bytes.len()] {
        group.bench_with_input(BenchmarkId::from_parameter(chunk_size), &chunk_size, |b, &size| {
            b.iter(|| {
                let mut parser = MarkupParser::new("bench");
                for chunk in bytes.chunks(size) {
                    parser
                        .feed(&mut NullHandler, black_box(chunk))
                        .expect("benchmark document should parse");
                }
                parser
                    .end_of_input(&mut NullHandler)
                    .expect("benchmark document should be complete");
            });
        });
    }
    group.finish();
}

fn bench_rewrite(c: &mut Criterion) {
    let input = make_document(BLOCKS);
    c.bench_function("bench_rewrite", |b| {
        b.iter(|| {
            let mut writer = MarkupWriter::new();
            let mut parser = MarkupParser::new("bench");
            parser
                .feed_finish(&mut writer, black_box(input.as_bytes()))
                .expect("benchmark document should parse");
            black_box(writer.into_string());
        });
    });
}

criterion_group!(benches, bench_feed_chunked, bench_rewrite);
criterion_main!(benches);
