// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Minimal demo: run one search and print the resulting documents.
//!
//! ```bash
//! cargo run --example basic_search
//! ```

use ddg_websearch::{WebSearchAdapter, WebSearchConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let websearch = WebSearchAdapter::new(WebSearchConfig::default())?;
    let outcome = websearch.run("What is frico").await?;

    for document in &outcome.documents {
        println!("{}", document.title);
        println!("  {}", document.link);
        println!("  {}", document.content);
        println!();
    }
    println!("{} links returned", outcome.links.len());

    Ok(())
}
