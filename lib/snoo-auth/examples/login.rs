#![allow(dead_code)]

use anyhow::Context;
use serde::Deserialize;
use snoo_auth::{Credentials, TokenManager};

fn env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("missing environment variable {name}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let credentials = Credentials::script(
        env("REDDIT_USERNAME")?,
        env("REDDIT_PASSWORD")?,
        env("REDDIT_CLIENT_ID")?,
        env("REDDIT_CLIENT_SECRET")?,
    );

    let manager = TokenManager::builder()
        .with_user_agent(format!(
            "{}:snoo-auth-login:v{} (by /u/{})",
            std::env::consts::OS,
            env!("CARGO_PKG_VERSION"),
            credentials.username()
        ))
        .build_default()?;

    // Exchange the credentials for a token
    let token = manager.authenticate(&credentials).await?;
    println!(
        "granted scopes: {}, expires at {}",
        token.scopes(),
        token.expires_at()
    );

    // Then who are we?
    let me = manager.fetch_identity::<Account>().await?;
    println!("{me:#?}");

    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
struct Account {
    name: String,
    id: String,
    link_karma: i64,
    comment_karma: i64,
}
