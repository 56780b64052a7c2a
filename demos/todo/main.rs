//! Shared Todo Demo
//!
//! This demo shows two connections bound to one collection:
//! - Seeding an empty collection with a welcome item
//! - Adds, updates, and removes propagating between connections
//! - A derived view tracking the open-item count
//! - Cleanup via destroy/close
//!
//! Run with: cargo run -p demo_todo

use tracing_subscriber::EnvFilter;
use unum_core::{CollectionConfig, CollectionProxy, Connection, DerivedView, TEXT_FIELD};
use unum_node::{MemoryGraph, Snapshot, Value};

fn print_items(label: &str, collection: &CollectionProxy) {
    let mut items = collection.list();
    items.sort_by_key(|item| {
        item.get(TEXT_FIELD)
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default()
    });

    println!("  {label}:");
    for item in items {
        let done = item
            .get("completed")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let marker = if done { "✓" } else { "○" };
        let text = item
            .get(TEXT_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        println!("    {marker} {text}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("info"))
        .init();

    println!("Shared Todo Demo");
    println!("================\n");

    // One in-memory store shared by two "devices".
    let graph = MemoryGraph::new();
    let device_a = Connection::open(graph.root());
    let device_b = Connection::open(graph.root());

    // Device A binds first and seeds the empty collection.
    let todos_a = device_a.collection(
        "todos",
        CollectionConfig::new().with_seed_items(vec![Snapshot::of([
            ("id", Value::from("welcome")),
            ("text", Value::from("Try out unum")),
            ("completed", Value::from(false)),
        ])]),
    );
    println!("[OK] Device A connected, collection seeded");

    // Device B binds second and picks the seed up through the store.
    let todos_b = device_b.collection("todos", CollectionConfig::default());
    println!("[OK] Device B connected, sees {} item(s)", todos_b.len());

    // A derived view over B's collection: how many items remain open.
    let open_count = DerivedView::new(&todos_b, |items| {
        items
            .iter()
            .filter(|item| {
                !item
                    .get("completed")
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
            })
            .count()
    });

    // Add from A; both sides converge.
    println!("\n[+] Device A adds two items");
    let milk = todos_a
        .add(Snapshot::of([("text", Value::from("Buy milk"))]))
        .expect("add should succeed");
    todos_a
        .add(Snapshot::of([("text", Value::from("Walk the dog"))]))
        .expect("add should succeed");
    print_items("Device B view", &todos_b);
    println!("  open items: {}", open_count.get());

    // Toggle from B; A observes the update.
    println!("\n[~] Device B completes 'Buy milk'");
    todos_b
        .update(&milk, |current| {
            let done = current
                .get("completed")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            Snapshot::of([("completed", Value::from(!done))])
        })
        .expect("item should exist");
    print_items("Device A view", &todos_a);
    println!("  open items: {}", open_count.get());

    // Remove from A; B observes the tombstone.
    println!("\n[-] Device A removes the completed item");
    todos_a.remove(&milk);
    print_items("Device B view", &todos_b);
    println!("  open items: {}", open_count.get());

    // Cleanup.
    open_count.destroy();
    todos_a.destroy();
    todos_b.destroy();
    device_a.close();
    device_b.close();
    println!("\n[*] Connections closed");
}
