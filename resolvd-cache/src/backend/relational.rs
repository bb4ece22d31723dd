use super::{BackendError, CacheBackend};
use crate::{now_secs, CacheKey, CacheStats, CacheValue, DEFAULT_CAPACITY, DEFAULT_TTL};
use resolvd_proto::DnsPacket;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, SqlitePool};

/// A single `(key TEXT PRIMARY KEY, record BLOB, timestamp REAL)` table,
/// upserted on `key` (§4.5). `record` is the exact wire encoding of the
/// cached message, so a process restart can decode it with the same codec
/// used for network responses.
#[derive(Debug)]
pub struct RelationalBackend {
    pool: SqlitePool,
    capacity: usize,
    default_ttl: u32,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub url: String,
    pub capacity: usize,
    pub default_ttl: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            capacity: DEFAULT_CAPACITY,
            default_ttl: DEFAULT_TTL,
        }
    }
}

impl Config {
    pub async fn build(self) -> Result<RelationalBackend, BackendError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&self.url)
            .await
            .map_err(|err| BackendError::Unavailable(err.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS cache_entries (\
                key TEXT PRIMARY KEY, \
                record BLOB NOT NULL, \
                timestamp REAL NOT NULL\
            )",
        )
        .execute(&pool)
        .await
        .map_err(|err| BackendError::Unavailable(err.to_string()))?;

        Ok(RelationalBackend {
            pool,
            capacity: self.capacity,
            default_ttl: self.default_ttl,
        })
    }
}

#[derive(FromRow)]
struct Row {
    key: String,
    record: Vec<u8>,
    timestamp: f64,
}

impl RelationalBackend {
    fn io_error(err: sqlx::Error) -> BackendError {
        BackendError::Unavailable(err.to_string())
    }

    fn decode(row: Row) -> Option<(CacheKey, CacheValue)> {
        let key = CacheKey::from_storage_string(&row.key)?;
        let message = DnsPacket::decode(&row.record).ok()?;
        Some((
            key,
            CacheValue {
                message,
                inserted_at: row.timestamp as u64,
            },
        ))
    }
}

#[async_trait::async_trait]
impl CacheBackend for RelationalBackend {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>, BackendError> {
        let storage_key = key.to_storage_string();
        let row: Option<Row> = sqlx::query_as("SELECT key, record, timestamp FROM cache_entries WHERE key = ?")
            .bind(&storage_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::io_error)?;

        let Some(row) = row else { return Ok(None) };
        let Some((_, value)) = Self::decode(row) else {
            return Ok(None);
        };

        if value.is_expired(now_secs(), self.default_ttl) {
            tracing::debug!(key = %storage_key, "sqlite record past effective ttl, deleting");
            sqlx::query("DELETE FROM cache_entries WHERE key = ?")
                .bind(&storage_key)
                .execute(&self.pool)
                .await
                .map_err(Self::io_error)?;
            return Ok(None);
        }
        Ok(Some(value))
    }

    async fn put(&self, key: CacheKey, value: CacheValue) -> Result<(), BackendError> {
        let storage_key = key.to_storage_string();
        tracing::debug!(key = %storage_key, "persisting record to sqlite");
        let bytes = value
            .message
            .encode()
            .map_err(|err| BackendError::Unavailable(err.to_string()))?;

        sqlx::query(
            "INSERT INTO cache_entries (key, record, timestamp) VALUES (?, ?, ?) \
             ON CONFLICT (key) DO UPDATE SET record = excluded.record, timestamp = excluded.timestamp",
        )
        .bind(&storage_key)
        .bind(&bytes)
        .bind(value.inserted_at as f64)
        .execute(&self.pool)
        .await
        .map_err(Self::io_error)?;

        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM cache_entries")
            .fetch_one(&self.pool)
            .await
            .map_err(Self::io_error)?;
        if count as usize > self.capacity {
            tracing::debug!(capacity = self.capacity, "sqlite cache over capacity, evicting oldest row");
            sqlx::query(
                "DELETE FROM cache_entries WHERE key = (SELECT key FROM cache_entries ORDER BY timestamp ASC LIMIT 1)",
            )
            .execute(&self.pool)
            .await
            .map_err(Self::io_error)?;
        }

        Ok(())
    }

    async fn clear(&self) -> Result<(), BackendError> {
        sqlx::query("DELETE FROM cache_entries")
            .execute(&self.pool)
            .await
            .map_err(Self::io_error)?;
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats, BackendError> {
        let size: i64 = sqlx::query_scalar("SELECT count(*) FROM cache_entries")
            .fetch_one(&self.pool)
            .await
            .map_err(Self::io_error)?;
        Ok(CacheStats {
            hits: 0,
            misses: 0,
            size: size as usize,
            capacity: self.capacity,
        })
    }

    async fn entries(&self) -> Result<Vec<(CacheKey, CacheValue)>, BackendError> {
        let rows: Vec<Row> = sqlx::query_as("SELECT key, record, timestamp FROM cache_entries ORDER BY timestamp ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(Self::io_error)?;
        Ok(rows.into_iter().filter_map(Self::decode).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvd_proto::QueryType;

    #[tokio::test]
    async fn put_then_get_round_trips_through_sqlite() {
        let backend = Config::default().build().await.unwrap();
        let key = CacheKey::new("example.com", QueryType::A);
        backend
            .put(key.clone(), CacheValue::new(DnsPacket::default()))
            .await
            .unwrap();
        assert!(backend.get(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn capacity_overflow_evicts_oldest_row() {
        let backend = Config {
            capacity: 1,
            ..Config::default()
        }
        .build()
        .await
        .unwrap();

        backend
            .put(
                CacheKey::new("a.com", QueryType::A),
                CacheValue::new(DnsPacket::default()),
            )
            .await
            .unwrap();
        backend
            .put(
                CacheKey::new("b.com", QueryType::A),
                CacheValue::new(DnsPacket::default()),
            )
            .await
            .unwrap();

        assert!(backend.get(&CacheKey::new("a.com", QueryType::A)).await.unwrap().is_none());
        assert!(backend.get(&CacheKey::new("b.com", QueryType::A)).await.unwrap().is_some());
    }
}
