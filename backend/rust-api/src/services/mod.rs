use std::sync::Arc;

use crate::config::Config;
use clock::{Clock, SystemClock};
use game_store::{GameStore, InMemoryGameStore, MongoGameStore};
use session_service::SessionService;

pub struct AppState {
    pub config: Config,
    pub games: Arc<dyn GameStore>,
    pub sessions: SessionService,
}

impl AppState {
    /// Connects the configured game store and builds the session core on the
    /// system clock.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let games: Arc<dyn GameStore> = match &config.mongo_uri {
            Some(uri) => {
                tracing::info!("Connecting to MongoDB game store...");
                let client = tokio::time::timeout(
                    std::time::Duration::from_secs(30),
                    mongodb::Client::with_uri_str(uri),
                )
                .await
                .map_err(|_| anyhow::anyhow!("MongoDB connection timeout after 30s"))??;

                let store = MongoGameStore::new(client.database(&config.mongo_database));
                store.ping().await?;
                tracing::info!("MongoDB game store ready");
                Arc::new(store)
            }
            None => {
                tracing::warn!("No MongoDB URI configured, games are kept in memory");
                Arc::new(InMemoryGameStore::new())
            }
        };

        Ok(Self::with_parts(config, games, Arc::new(SystemClock)))
    }

    pub fn with_parts(config: Config, games: Arc<dyn GameStore>, clock: Arc<dyn Clock>) -> Self {
        let sessions = SessionService::new(games.clone(), clock, config.leaderboard_size);
        Self {
            config,
            games,
            sessions,
        }
    }
}

pub mod clock;
pub mod game_store;
pub mod ledger;
pub mod reconciliation;
pub mod registry;
pub mod roster;
pub mod scoring;
pub mod session_machine;
pub mod session_service;
