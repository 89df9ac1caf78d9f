use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::ReplaceOptions;
use mongodb::{Collection, Database};
use parking_lot::RwLock;

use crate::metrics::track_store_operation;
use crate::models::Game;

/// Storage for authored games. Sessions snapshot the questions at start and
/// only write back the lifecycle fields.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn get_game(&self, game_id: &str) -> Result<Option<Game>>;
    async fn put_game(&self, game: &Game) -> Result<()>;
    async fn ping(&self) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryGameStore {
    games: RwLock<HashMap<String, Game>>,
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_games(games: impl IntoIterator<Item = Game>) -> Self {
        let store = Self::new();
        {
            let mut map = store.games.write();
            for game in games {
                map.insert(game.id.clone(), game);
            }
        }
        store
    }
}

#[async_trait]
impl GameStore for InMemoryGameStore {
    async fn get_game(&self, game_id: &str) -> Result<Option<Game>> {
        Ok(self.games.read().get(game_id).cloned())
    }

    async fn put_game(&self, game: &Game) -> Result<()> {
        self.games.write().insert(game.id.clone(), game.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

pub struct MongoGameStore {
    db: Database,
    games: Collection<Game>,
}

impl MongoGameStore {
    pub fn new(db: Database) -> Self {
        let games = db.collection::<Game>("games");
        Self { db, games }
    }
}

#[async_trait]
impl GameStore for MongoGameStore {
    async fn get_game(&self, game_id: &str) -> Result<Option<Game>> {
        track_store_operation("get_game", async {
            self.games
                .find_one(doc! { "_id": game_id })
                .await
                .context("Failed to query games collection")
        })
        .await
    }

    async fn put_game(&self, game: &Game) -> Result<()> {
        track_store_operation("put_game", async {
            self.games
                .replace_one(doc! { "_id": &game.id }, game)
                .with_options(ReplaceOptions::builder().upsert(true).build())
                .await
                .context("Failed to write game")?;
            Ok(())
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        tokio::time::timeout(
            std::time::Duration::from_secs(1),
            self.db.run_command(doc! { "ping": 1 }),
        )
        .await
        .context("MongoDB ping timed out after 1s")?
        .context("MongoDB ping failed")?;
        Ok(())
    }
}
