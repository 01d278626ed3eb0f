//! Benchmarks for tree walks, field encryption and fulltext indexing.
//!
//! Run with: cargo bench --bench tree_benchmarks

use chrono::Utc;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use grove::crypto::DataKey;
use grove::crypto::cipher::{FIELD_VERIFICATION_BYTES, decrypt, encrypt};
use grove::domain::{Note, NoteId, NoteType};
use grove::fulltext::{extract_text, reindex_all};
use grove::store::SqliteStore;
use grove::store::notes::{self, NoteRow};
use grove::tree::Tree;

// =============================================================================
// Test Data Generation
// =============================================================================

/// Sample words for generating note content
const WORDS: &[&str] = &[
    "branch", "clone", "parent", "subtree", "garden", "harvest", "protected", "session",
    "index", "search", "content", "revision", "label", "archive", "position", "prefix",
];

fn generate_html(index: usize, words: usize) -> String {
    let mut html = String::from("<div>");
    for i in 0..words {
        if i % 12 == 0 {
            html.push_str("<p>");
        }
        html.push_str(WORDS[(index + i * 7) % WORDS.len()]);
        html.push(' ');
        if i % 12 == 11 {
            html.push_str("</p>");
        }
    }
    html.push_str("</div>");
    html
}

fn insert_note(store: &SqliteStore, id: &str, content: String) -> NoteId {
    let id: NoteId = id.parse().unwrap();
    let note = Note::new(id.clone(), id.as_str(), content, NoteType::Text, Utc::now());
    notes::insert(store.conn(), &NoteRow::plain(&note)).unwrap();
    id
}

/// A store holding one chain root -> n0 -> n1 -> ... of `depth` notes.
fn setup_chain(depth: usize) -> (SqliteStore, NoteId) {
    let store = SqliteStore::open_in_memory().unwrap();
    let mut parent = NoteId::root();
    for i in 0..depth {
        let id = insert_note(&store, &format!("n{}", i), String::new());
        Tree::new(store.conn()).create_branch(&id, &parent, None).unwrap();
        parent = id;
    }
    (store, parent)
}

/// A store with `count` notes of generated HTML under the root.
fn setup_flat(count: usize) -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    for i in 0..count {
        let id = insert_note(&store, &format!("note{}", i), generate_html(i, 200));
        Tree::new(store.conn()).create_branch(&id, &NoteId::root(), None).unwrap();
    }
    store
}

// =============================================================================
// Tree Benchmarks
// =============================================================================

fn bench_cycle_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("cycle_check");

    for depth in [10, 100, 500] {
        let (store, leaf) = setup_chain(depth);
        let top: NoteId = "n0".parse().unwrap();

        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, _| {
            let tree = Tree::new(store.conn());
            b.iter(|| tree.is_ancestor_or_self(&top, &leaf).unwrap());
        });
    }

    group.finish();
}

fn bench_children(c: &mut Criterion) {
    let store = setup_flat(1000);
    c.bench_function("children/1000", |b| {
        let tree = Tree::new(store.conn());
        b.iter(|| tree.children(&NoteId::root()).unwrap());
    });
}

// =============================================================================
// Cipher Benchmarks
// =============================================================================

fn bench_cipher(c: &mut Criterion) {
    let key = DataKey::random();
    let mut group = c.benchmark_group("cipher");

    for size in [1024, 16 * 1024, 256 * 1024] {
        let plaintext = vec![b'x'; size];
        let ciphertext = encrypt(&key, &plaintext).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("encrypt", size), &size, |b, _| {
            b.iter(|| encrypt(&key, &plaintext).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("decrypt", size), &size, |b, _| {
            b.iter(|| decrypt(&key, &ciphertext, FIELD_VERIFICATION_BYTES).unwrap());
        });
    }

    group.finish();
}

// =============================================================================
// Fulltext Benchmarks
// =============================================================================

fn bench_extract(c: &mut Criterion) {
    let html = generate_html(0, 2000);
    c.bench_function("extract_text/2000_words", |b| {
        b.iter(|| extract_text(NoteType::Text, "text/html", html.as_bytes()));
    });
}

fn bench_reindex(c: &mut Criterion) {
    let mut group = c.benchmark_group("reindex_all");

    for size in [100, 500] {
        let store = setup_flat(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("notes", size), &size, |b, _| {
            b.iter(|| reindex_all(store.conn()).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cycle_check,
    bench_children,
    bench_cipher,
    bench_extract,
    bench_reindex
);
criterion_main!(benches);
