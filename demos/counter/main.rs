//! Shared Counter Demo
//!
//! This demo shows the object-variant proxy:
//! - Default-data seeding of an empty node
//! - Two connections converging on one object
//! - A two-way field binding over the counter's label
//! - The split reader/writer handle pair
//!
//! Run with: cargo run -p demo_counter

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use unum_core::{Connection, FieldBinding, ProxyConfig};
use unum_node::{MemoryGraph, Snapshot, Value};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("info"))
        .init();

    println!("Shared Counter Demo");
    println!("===================\n");

    let graph = MemoryGraph::new();
    let device_a = Connection::open(graph.root());
    let device_b = Connection::open(graph.root());

    // Device A seeds the counter object.
    let counter_a = Arc::new(device_a.proxy(
        "counter",
        ProxyConfig::new().with_seed(Snapshot::of([
            ("count", Value::from(0i64)),
            ("label", Value::from("Shared counter")),
        ])),
    ));
    let counter_b = device_b.proxy("counter", ProxyConfig::default());
    println!(
        "[OK] Both devices connected, count = {}",
        counter_b.get("count").and_then(|v| v.as_int()).unwrap_or(0)
    );

    // Increment from A three times; B follows.
    println!("\n[+] Device A increments three times");
    for _ in 0..3 {
        counter_a.update(|current| {
            let next = current.get("count").and_then(Value::as_int).unwrap_or(0) + 1;
            let mut updated = current.clone();
            updated.insert("count", Value::from(next));
            updated
        });
    }
    println!(
        "  Device B sees count = {}",
        counter_b.get("count").and_then(|v| v.as_int()).unwrap_or(0)
    );

    // Two-way field binding over the label, driven from B.
    let label = FieldBinding::new(&counter_a, "label");
    let _watch = label.subscribe(|value| {
        println!("  label changed: {:?}", value.as_str().unwrap_or(""));
    });

    println!("\n[~] Device B renames the counter");
    counter_b.write_field("label", Value::from("Team counter"));
    println!(
        "  Device A reads label = {:?}",
        counter_a.get("label").and_then(|v| v.as_str().map(String::from))
    );

    // The minimal-ceremony form: a reader/writer pair over one proxy.
    let (reader, writer) = device_b.proxy("counter", ProxyConfig::default()).split();
    writer.write_field("count", Value::from(100i64));
    println!(
        "\n[=] Split writer set count = {}",
        reader.get("count").and_then(|v| v.as_int()).unwrap_or(0)
    );

    // Cleanup.
    label.destroy();
    writer.destroy();
    counter_a.destroy();
    counter_b.destroy();
    device_a.close();
    device_b.close();
    println!("\n[*] Connections closed");
}
