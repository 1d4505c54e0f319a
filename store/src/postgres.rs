//! Postgres embedding store.
//!
//! Identities live in one `vectors` table with the embedding split across
//! two `cube` columns, low half and high half. The similarity predicate
//! combines the `<->` distance to each half and runs on stock Postgres
//! with the `cube` extension.
//!
//! All statements bind numeric arrays as parameters; embedding values are
//! never formatted into SQL text.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tracing::{debug, info};

use crate::SPLIT_POINT;
use crate::error::{Result, StoreError};
use crate::store::{EmbeddingStore, MatchCandidate, check_dimension, check_enrollment};

/// Maximum pooled connections: the original deployment ran a pool of 5
/// with an overflow of 2.
const MAX_CONNECTIONS: u32 = 7;

/// How long to wait for a pooled connection before giving up.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Connections older than this are re-established.
const MAX_CONNECTION_LIFETIME: Duration = Duration::from_secs(30 * 60);

const FIND_WITHIN_RADIUS_SQL: &str = "\
SELECT name, \
       sqrt(power(cube($1::float8[]) <-> vec_low, 2) + power(cube($2::float8[]) <-> vec_high, 2)) AS distance \
FROM vectors \
WHERE sqrt(power(cube($1::float8[]) <-> vec_low, 2) + power(cube($2::float8[]) <-> vec_high, 2)) <= $3 \
ORDER BY distance ASC";

const ENROLL_SQL: &str =
    "INSERT INTO vectors (name, vec_low, vec_high) VALUES ($1, cube($2::float8[]), cube($3::float8[]))";

/// SQLSTATE for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres-backed identity catalog.
pub struct PgEmbeddingStore {
    pool: PgPool,
}

impl PgEmbeddingStore {
    /// Connect to the database and build the connection pool.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .max_lifetime(MAX_CONNECTION_LIFETIME)
            .connect(url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        info!("Connected to embedding store");
        Ok(Self { pool })
    }

    /// Create the `cube` extension, the `vectors` table, and its index if
    /// they do not exist yet. Safe to run on every startup.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS cube")
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS vectors (\
             id serial, \
             name varchar(50), \
             vec_low cube, \
             vec_high cube, \
             UNIQUE(name))",
        )
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS vectors_vec_idx ON vectors (vec_low, vec_high)")
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;

        info!("Embedding store schema is up to date");
        Ok(())
    }
}

#[async_trait]
impl EmbeddingStore for PgEmbeddingStore {
    async fn enroll(&self, name: &str, embedding: &[f64]) -> Result<()> {
        check_enrollment(name, embedding)?;

        let low = &embedding[..SPLIT_POINT];
        let high = &embedding[SPLIT_POINT..];

        sqlx::query(ENROLL_SQL)
            .bind(name)
            .bind(low)
            .bind(high)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                    StoreError::DuplicateName(name.to_string())
                }
                _ => StoreError::Unavailable(e.to_string()),
            })?;

        debug!("Enrolled identity: {name}");
        Ok(())
    }

    async fn find_within_radius(
        &self,
        embedding: &[f64],
        radius: f64,
    ) -> Result<Vec<MatchCandidate>> {
        check_dimension(embedding)?;

        let low = &embedding[..SPLIT_POINT];
        let high = &embedding[SPLIT_POINT..];

        let rows = sqlx::query(FIND_WITHIN_RADIUS_SQL)
            .bind(low)
            .bind(high)
            .bind(radius)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        let candidates = rows
            .iter()
            .map(|row| {
                Ok(MatchCandidate {
                    name: row.try_get("name").map_err(unavailable)?,
                    distance: row.try_get("distance").map_err(unavailable)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Similarity query returned {} candidates", candidates.len());
        Ok(candidates)
    }

    async fn count(&self) -> Result<u64> {
        let row = sqlx::query("SELECT count(*) AS n FROM vectors")
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable)?;
        let n: i64 = row.try_get("n").map_err(unavailable)?;
        Ok(n as u64)
    }
}

fn unavailable(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}
