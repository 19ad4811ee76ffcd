use criterion::{black_box, criterion_group, criterion_main, Criterion};

use negocio_sql::{SQLStore, SqliteStore, Value};

fn doc_table(store: &SqliteStore) {
    store
        .exec(
            "CREATE TABLE docs (id TEXT PRIMARY KEY, data TEXT NOT NULL, status TEXT NOT NULL)",
            &[],
        )
        .unwrap();
    store
        .exec("CREATE INDEX idx_docs_status ON docs(status)", &[])
        .unwrap();
}

fn bench_insert_doc(c: &mut Criterion) {
    let store = SqliteStore::open_in_memory().unwrap();
    doc_table(&store);

    let mut i = 0u64;
    c.bench_function("sqlite_insert_doc", |b| {
        b.iter(|| {
            store
                .exec(
                    "INSERT INTO docs (id, data, status) VALUES (?1, ?2, ?3)",
                    &[
                        Value::Text(format!("doc-{}", i)),
                        Value::Text("{\"name\":\"bench\"}".to_string()),
                        Value::Text("activo".to_string()),
                    ],
                )
                .unwrap();
            i += 1;
        });
    });
}

fn bench_query_by_status(c: &mut Criterion) {
    let store = SqliteStore::open_in_memory().unwrap();
    doc_table(&store);

    for i in 0..10000 {
        let status = if i % 2 == 0 { "activo" } else { "inactivo" };
        store
            .exec(
                "INSERT INTO docs (id, data, status) VALUES (?1, ?2, ?3)",
                &[
                    Value::Text(format!("doc-{}", i)),
                    Value::Text("{\"name\":\"bench\"}".to_string()),
                    Value::Text(status.to_string()),
                ],
            )
            .unwrap();
    }

    c.bench_function("sqlite_query_by_status_100", |b| {
        b.iter(|| {
            let rows = store
                .query(
                    "SELECT id, data FROM docs WHERE status = ?1 LIMIT 100",
                    &[Value::Text(black_box("activo").to_string())],
                )
                .unwrap();
            assert_eq!(rows.len(), 100);
        });
    });
}

fn bench_exec_batch(c: &mut Criterion) {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .exec(
            "CREATE TABLE edges (left_id TEXT NOT NULL, right_id TEXT NOT NULL, PRIMARY KEY (left_id, right_id))",
            &[],
        )
        .unwrap();

    let mut round = 0u64;
    c.bench_function("sqlite_exec_batch_replace_10", |b| {
        b.iter(|| {
            let left = format!("left-{}", round);
            round += 1;
            let mut stmts: Vec<(&str, Vec<Value>)> = vec![(
                "DELETE FROM edges WHERE left_id = ?1",
                vec![Value::Text(left.clone())],
            )];
            for i in 0..10 {
                stmts.push((
                    "INSERT INTO edges (left_id, right_id) VALUES (?1, ?2)",
                    vec![Value::Text(left.clone()), Value::Text(format!("right-{}", i))],
                ));
            }
            store.exec_batch(&stmts).unwrap();
        });
    });
}

criterion_group!(benches, bench_insert_doc, bench_query_by_status, bench_exec_batch);
criterion_main!(benches);
