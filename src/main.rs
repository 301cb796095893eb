use gfkcoach::config::CoachConfig;
use gfkcoach::llm::LlmClient;
use gfkcoach::quota::QuotaStore;
use gfkcoach::server::{start_server, AppState};
use gfkcoach::store::JsonlStore;
use gfkcoach::transform::Transformer;

use anyhow::Result;
use colored::*;
use std::sync::Arc;

pub const GFK_DIR: &str = ".gfkcoach";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::from_filename(".env").ok();

    let config = CoachConfig::load()?;
    println!("{}", "🕊️  GFKCoach Transform Service".green().bold());
    println!("   - Model: {}", config.model.bold());
    println!("   - Daily quota per source: {}", config.daily_quota);

    let port = config.port;
    let daily_quota = config.daily_quota;

    let llm = Arc::new(LlmClient::new(config));
    let state = Arc::new(AppState {
        transformer: Transformer::new(llm),
        quota: QuotaStore::new(daily_quota),
        store: Arc::new(JsonlStore::new(format!("{}/messages.jsonl", GFK_DIR))),
    });

    start_server(state, port).await
}
