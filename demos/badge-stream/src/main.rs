use anyhow::{Context, Result};
use carlink::client::{HttpNotificationApi, NotificationCenter, SessionState, SessionStore};
use carlink::config::{BackendConfig, ClientConfig};
use carlink::init_logging;
use std::sync::Arc;
use tokio_stream::StreamExt;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let owner = std::env::args()
        .nth(1)
        .context("usage: badge-stream <owner-id> <credential> [base-url]")?;
    let credential = std::env::args()
        .nth(2)
        .context("usage: badge-stream <owner-id> <credential> [base-url]")?;
    let base_url = std::env::args()
        .nth(3)
        .unwrap_or_else(|| "https://api.carlink.app".to_string());

    let mut config = ClientConfig::builder()
        .backend(BackendConfig {
            base_url,
            request_timeout_secs: 10,
        })
        .build();
    config.apply_env_overrides();
    config.validate().context("invalid configuration")?;

    let session = match carlink::config::default_cache_path() {
        Some(path) => {
            let store = SessionStore::new(path);
            let session = store
                .hydrate()
                .filter(|state| state.owner_id == owner)
                .unwrap_or_else(|| SessionState::new(owner.clone(), credential.clone()));
            if let Err(err) = store.persist(&session) {
                eprintln!("could not persist session snapshot: {err}");
            }
            session
        }
        None => SessionState::new(owner.clone(), credential.clone()),
    };

    let api = Arc::new(
        HttpNotificationApi::new(&config, session.credential.clone())
            .context("failed to build backend client")?,
    );
    let center = NotificationCenter::new(api, &config, session);

    center.start().await;
    println!("starting with {} unread", center.unread_count());

    // No automatic reconnection: one manual retry, then give up.
    let mut subscription = match center.connect().await {
        Ok(subscription) => subscription,
        Err(err) => {
            eprintln!("push channel failed ({err}); retrying once");
            center.connect().await.context("push channel unavailable")?
        }
    };

    let mut badge = center.badge_stream();
    loop {
        tokio::select! {
            value = badge.next() => {
                let Some(count) = value else { break };
                println!("unread: {count}");
            }
            _ = tokio::signal::ctrl_c() => {
                println!("closing subscription");
                subscription.close();
                break;
            }
        }
    }

    Ok(())
}
