//! Server command implementation

use std::path::Path;

use anyhow::Result;
use pennywise_core::EngineConfig;
use pennywise_server::{parse_api_keys, ServerConfig, API_KEYS_ENV};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    engine: EngineConfig,
) -> Result<()> {
    println!("🚀 Starting Pennywise web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    let api_keys = parse_api_keys(&std::env::var(API_KEYS_ENV).unwrap_or_default());

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if api_keys.is_empty() {
        println!("   ❌ No API keys configured; set {} or use --no-auth", API_KEYS_ENV);
    } else {
        println!(
            "   🔑 API keys: {} configured ({})",
            api_keys.len(),
            API_KEYS_ENV
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    match engine.comparison_source {
        Some(source) => println!("   Comparison prices: {} transactions", source),
        None => println!("   Comparison prices: all transactions"),
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let config = ServerConfig {
        require_auth: !no_auth,
        allowed_origins: vec![],
        api_keys,
        engine,
    };

    pennywise_server::serve_with_config(db, host, port, config).await?;

    Ok(())
}
