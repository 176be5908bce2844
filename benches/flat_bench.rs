use criterion::{Criterion, criterion_group, criterion_main};
use spooky_flat::builder::FlatBuilder;
use spooky_flat::events::{ImageReceivedEvent, ImageReceivedEventArgs};
use spooky_flat::schema::SchemaRegistry;
use spooky_flat::table::root_table;
use spooky_flat::value::{decode_value, encode_value};
use spooky_flat::view::TableView;
use std::hint::black_box;

// ─── Test Data ──────────────────────────────────────────────────────────────

const SCHEMAS: &str = r#"[
  { "name": "User", "fields": [
      { "name": "id", "type": "string", "required": true },
      { "name": "name", "type": "string" },
      { "name": "age", "type": "ubyte" },
      { "name": "score", "type": "double" },
      { "name": "active", "type": "bool", "default": true },
      { "name": "tags", "type": { "vector": "int" } },
      { "name": "profile", "type": { "table": "Profile" } }
  ]},
  { "name": "Profile", "fields": [
      { "name": "bio", "type": "string" },
      { "name": "level", "type": "short" }
  ]}
]"#;

fn user_json() -> serde_json::Value {
    serde_json::json!({
        "id": "user:abc123",
        "name": "Alice",
        "age": 28,
        "score": 99.5,
        "active": false,
        "tags": [1, 2, 3, 5, 8, 13],
        "profile": { "bio": "Software engineer", "level": 3 }
    })
}

fn event_args() -> ImageReceivedEventArgs<'static> {
    ImageReceivedEventArgs {
        event_create_ts: Some("2024-01-01T00:00:00Z"),
        image_uuid: Some("0b7c5d7e-4f8a-4a52-9d3e-3f1b2c6a9e10"),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 1: Building
// ═══════════════════════════════════════════════════════════════════════════

fn bench_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("building");
    let args = event_args();

    group.bench_function("event (fresh builder)", |b| {
        b.iter(|| black_box(&args).to_bytes().unwrap())
    });

    group.bench_function("event (reused builder)", |b| {
        let mut builder = FlatBuilder::with_capacity(256);
        b.iter(|| {
            builder.reset();
            let root = ImageReceivedEvent::create(&mut builder, black_box(&args)).unwrap();
            builder.finish(root).unwrap();
            builder.finished_data().unwrap().len()
        })
    });

    // 100 same-shape tables share one vtable.
    group.bench_function("100 tables, shared vtable", |b| {
        let mut builder = FlatBuilder::with_capacity(8192);
        b.iter(|| {
            builder.reset();
            for i in 0..100u32 {
                builder.start_object(3).unwrap();
                builder.add_field(0, i, 0).unwrap();
                builder.add_field(1, i as u64 * 3, 0).unwrap();
                builder.add_field(2, true, false).unwrap();
                builder.end_object().unwrap();
            }
            builder.num_vtables()
        })
    });

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 2: Reading
// ═══════════════════════════════════════════════════════════════════════════

fn bench_reading(c: &mut Criterion) {
    let mut group = c.benchmark_group("reading");
    let buf = event_args().to_bytes().unwrap();

    group.bench_function("typed accessor", |b| {
        b.iter(|| {
            let event = ImageReceivedEvent::root(black_box(&buf)).unwrap();
            (event.event_create_ts().unwrap(), event.image_uuid().unwrap())
        })
    });

    group.bench_function("raw table get_str", |b| {
        b.iter(|| root_table(black_box(&buf)).unwrap().get_str(1).unwrap())
    });

    let reg = SchemaRegistry::from_json(SCHEMAS).unwrap();
    let mut builder = FlatBuilder::new();
    encode_value(&mut builder, &reg, "User", &user_json()).unwrap();
    let user = builder.into_bytes().unwrap();

    group.bench_function("TableView::get by name", |b| {
        b.iter(|| {
            let view = TableView::root(black_box(&user), &reg, "User").unwrap();
            view.get("score").unwrap()
        })
    });

    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Group 3: Dynamic values
// ═══════════════════════════════════════════════════════════════════════════

fn bench_dynamic(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic");
    let reg = SchemaRegistry::from_json(SCHEMAS).unwrap();
    let json = user_json();

    group.bench_function("encode json", |b| {
        let mut builder = FlatBuilder::with_capacity(512);
        b.iter(|| {
            builder.reset();
            encode_value(&mut builder, &reg, "User", black_box(&json)).unwrap();
            builder.finished_data().unwrap().len()
        })
    });

    let mut builder = FlatBuilder::new();
    encode_value(&mut builder, &reg, "User", &json).unwrap();
    let buf = builder.into_bytes().unwrap();

    group.bench_function("decode json", |b| {
        b.iter(|| {
            let v: serde_json::Value = decode_value(black_box(&buf), &reg, "User").unwrap();
            v
        })
    });

    group.bench_function("decode cbor", |b| {
        b.iter(|| {
            let v: cbor4ii::core::Value = decode_value(black_box(&buf), &reg, "User").unwrap();
            v
        })
    });

    group.finish();
}

// ─── Criterion Main ─────────────────────────────────────────────────────────

criterion_group!(benches, bench_building, bench_reading, bench_dynamic);
criterion_main!(benches);
