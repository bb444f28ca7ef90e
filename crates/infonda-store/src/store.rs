//! The local object store transport
//!
//! A content-addressed SQLite table keyed by `(alg, hash)`. The store is
//! just another transport: it implements the same three capabilities as
//! the network-facing ones and answers misses with `Failed` responses.
//! All operations are serialized behind a single mutex so publish, get
//! and search are linearizable. Publish replaces whole objects, it never
//! merges. The schema upgrade policy is destructive: `clear` drops the
//! table and recreates it.

use infonda_core::Ndo;
use infonda_services::{
    Get, GetResponse, Getter, Publish, PublishResponse, Publisher, Search, SearchResponse,
    Searcher,
};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tokio::sync::Mutex;

use crate::error::{Result, StoreError};

pub struct LocalStore {
    pool: SqlitePool,
    lock: Mutex<()>,
}

impl LocalStore {
    /// Open (or create) the store at the given database path.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

        log::info!("Opening object store: {}", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        Self::migrate(&pool).await?;

        Ok(Self {
            pool,
            lock: Mutex::new(()),
        })
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ndos (
                alg TEXT NOT NULL,
                hash TEXT NOT NULL,
                ndo BLOB NOT NULL,
                PRIMARY KEY (alg, hash)
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Drop all stored objects and recreate the table.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;

        log::info!("Clearing object store");

        sqlx::query("DROP TABLE IF EXISTS ndos")
            .execute(&self.pool)
            .await?;
        Self::migrate(&self.pool).await?;

        Ok(())
    }

    /// Number of stored objects.
    pub async fn count(&self) -> Result<u64> {
        let _guard = self.lock.lock().await;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ndos")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn insert(&self, ndo: &Ndo) -> Result<()> {
        let _guard = self.lock.lock().await;

        let blob = bincode::serialize(ndo).map_err(|e| StoreError::Codec(e.to_string()))?;

        // Replace, never merge: any previous object under this identity
        // is dropped wholesale.
        sqlx::query("DELETE FROM ndos WHERE alg = ? AND hash = ?")
            .bind(ndo.algorithm())
            .bind(ndo.hash())
            .execute(&self.pool)
            .await?;

        sqlx::query("INSERT INTO ndos (alg, hash, ndo) VALUES (?, ?, ?)")
            .bind(ndo.algorithm())
            .bind(ndo.hash())
            .bind(blob)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn lookup(&self, algorithm: &str, hash: &str) -> Result<Option<Ndo>> {
        let _guard = self.lock.lock().await;

        let row: Option<(Vec<u8>,)> =
            sqlx::query_as("SELECT ndo FROM ndos WHERE alg = ? AND hash = ?")
                .bind(algorithm)
                .bind(hash)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((blob,)) => {
                let ndo =
                    bincode::deserialize(&blob).map_err(|e| StoreError::Codec(e.to_string()))?;
                Ok(Some(ndo))
            }
            None => Ok(None),
        }
    }

    async fn scan(&self, tokens: &BTreeSet<String>) -> Result<HashSet<Ndo>> {
        let _guard = self.lock.lock().await;

        let rows: Vec<(Vec<u8>,)> = sqlx::query_as("SELECT ndo FROM ndos")
            .fetch_all(&self.pool)
            .await?;

        let mut results = HashSet::new();
        for (blob,) in rows {
            let ndo: Ndo = match bincode::deserialize(&blob) {
                Ok(ndo) => ndo,
                Err(e) => {
                    log::error!("Skipping corrupt object blob: {}", e);
                    continue;
                }
            };
            if ndo.matches(tokens) {
                results.insert(ndo);
            }
        }

        Ok(results)
    }
}

#[async_trait::async_trait]
impl Publisher for LocalStore {
    async fn publish(&self, request: &Publish) -> PublishResponse {
        match self.insert(request.ndo()).await {
            Ok(()) => PublishResponse::ok(request),
            Err(e) => {
                log::error!("Publish of {} failed: {}", request.ndo().uri(), e);
                PublishResponse::failed(request)
            }
        }
    }
}

#[async_trait::async_trait]
impl Getter for LocalStore {
    async fn get(&self, request: &Get) -> GetResponse {
        let ndo = request.ndo();
        match self.lookup(ndo.algorithm(), ndo.hash()).await {
            Ok(Some(stored)) => GetResponse::ok(request, stored),
            Ok(None) => GetResponse::failed(request),
            Err(e) => {
                log::error!("Get of {} failed: {}", ndo.uri(), e);
                GetResponse::failed(request)
            }
        }
    }

    async fn resolve_locators(&self, request: &Get) -> GetResponse {
        GetResponse::failed(request)
    }
}

#[async_trait::async_trait]
impl Searcher for LocalStore {
    async fn search(&self, request: &Search) -> SearchResponse {
        match self.scan(request.tokens()).await {
            Ok(results) => SearchResponse::ok(request, results),
            Err(e) => {
                log::error!("Search failed: {}", e);
                SearchResponse::failed(request)
            }
        }
    }
}
