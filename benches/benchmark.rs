use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::io::Cursor;
use std::sync::Arc;

use ednreader::convert::ValueConverter;
use ednreader::datatype::FieldType;
use ednreader::reader::EdnRecordReader;
use ednreader::record::{Field, Schema};
use ednreader::settings::FormatSettings;

fn schema() -> Arc<Schema> {
    Arc::new(
        Schema::new(vec![
            Field::new("id", FieldType::Long),
            Field::new("name", FieldType::String),
            Field::new("score", FieldType::Double),
            Field::new("active", FieldType::Boolean),
            Field::new("born", FieldType::Date),
            Field::new("tags", FieldType::Array(Box::new(FieldType::String))),
        ])
        .expect("unique field names"),
    )
}

fn lines(n: usize) -> Vec<u8> {
    let mut input = String::new();
    for i in 0..n {
        input.push_str(&format!(
            "{{:id {} :name \"person {}\" :score {}.5 :active {} :born \"1990-01-{:02}\" :tags [\"a\" \"b\"]}}\n",
            i,
            i,
            i % 100,
            i % 2 == 0,
            i % 28 + 1
        ));
    }
    input.into_bytes()
}

fn read_all(input: &[u8], schema: &Arc<Schema>, coerce_types: bool) -> usize {
    let mut reader = EdnRecordReader::open(Cursor::new(input), Arc::clone(schema), &FormatSettings::default());
    reader.records(coerce_types, true).filter(|r| r.is_ok()).count()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let converter = ValueConverter::new(&FormatSettings::default());
    c.bench_function("convert int", |b| {
        b.iter(|| converter.convert(black_box(Some("12345")), Some(&FieldType::Int), "n"))
    });
    c.bench_function("convert date", |b| {
        b.iter(|| converter.convert(black_box(Some("\"2024-01-15\"")), Some(&FieldType::Date), "d"))
    });
    c.bench_function("convert if compatible, incompatible", |b| {
        b.iter(|| converter.convert_if_compatible(black_box(Some("thirty")), Some(&FieldType::Int), "n"))
    });

    let schema = schema();
    for n in [1, 1_000, 100_000] {
        let input = lines(n);
        c.bench_function(&format!("read strict {}", n), |b| {
            b.iter(|| read_all(black_box(&input), &schema, true))
        });
        c.bench_function(&format!("read lenient {}", n), |b| {
            b.iter(|| read_all(black_box(&input), &schema, false))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
