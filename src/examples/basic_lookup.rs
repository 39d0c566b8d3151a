//! Basic Lookup Example
//!
//! Looks up a concept, resolves a phrase to its URI and asks for related
//! concepts, once through the typed API and once through callbacks.
//!
//! Run with: cargo run --example basic_lookup

use conceptnet_rs::{callback, Arg, AssociationOptions, Client, LookupOptions, Operation};
use serde_json::json;
use tokio::sync::oneshot;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();
    println!("Using {}:{}\n", client.config().host(), client.config().port());

    // Typed API
    let edges = client
        .lookup("/c/en/toast", LookupOptions::default().limit(5).core())
        .await?;
    println!("📝 /c/en/toast edges: {}", edges["edges"].as_array().map_or(0, |e| e.len()));

    let uri = client.resolve_uri("ground beef", Default::default()).await?;
    println!("🔍 'ground beef' resolves to {}", uri["uri"]);

    // Callback API
    let (tx, rx) = oneshot::channel();
    client.invoke(
        Operation::Associate,
        vec![
            Arg::value("/c/en/cat"),
            Arg::value(json!({"limit": 3, "filter": "/c/en/dog"})),
            callback(move |completion| {
                let _ = tx.send(completion);
            }),
        ],
    )?;
    let similar = rx.await??;
    println!("🐱 Similar to /c/en/cat: {}", similar["similar"]);

    // Validation happens before anything is sent
    if let Err(e) = client.associate("hotdog", AssociationOptions::default()) {
        println!("❌ {}", e);
    }

    Ok(())
}
