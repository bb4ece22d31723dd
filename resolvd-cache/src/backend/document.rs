use super::{BackendError, CacheBackend};
use crate::{now_secs, CacheKey, CacheStats, CacheValue, DEFAULT_CAPACITY, DEFAULT_TTL};
use mongodb::bson::{doc, Binary};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use resolvd_proto::DnsPacket;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Document {
    key: String,
    record: Binary,
    timestamp: f64,
}

/// One document per key, `{key: "name:type", record, timestamp}` with a
/// unique index on `key` (§4.5). The TTL index is a lazy best-effort cleanup;
/// `get` still performs the authoritative read-side TTL check so a record
/// can never outlive its effective TTL even if Mongo hasn't swept it yet.
#[derive(Debug)]
pub struct DocumentBackend {
    collection: Collection<Document>,
    capacity: usize,
    default_ttl: u32,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub capacity: usize,
    pub default_ttl: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "resolvd".to_string(),
            collection: "cache_entries".to_string(),
            capacity: DEFAULT_CAPACITY,
            default_ttl: DEFAULT_TTL,
        }
    }
}

impl Config {
    pub async fn build(self) -> Result<DocumentBackend, BackendError> {
        let options = ClientOptions::parse(&self.uri)
            .await
            .map_err(|err| BackendError::Unavailable(err.to_string()))?;
        let client =
            Client::with_options(options).map_err(|err| BackendError::Unavailable(err.to_string()))?;
        let collection: Collection<Document> = client
            .database(&self.database)
            .collection(&self.collection);

        let unique_key = IndexModel::builder()
            .keys(doc! { "key": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection
            .create_index(unique_key, None)
            .await
            .map_err(|err| BackendError::Unavailable(err.to_string()))?;

        Ok(DocumentBackend {
            collection,
            capacity: self.capacity,
            default_ttl: self.default_ttl,
        })
    }
}

impl DocumentBackend {
    fn io_error(err: mongodb::error::Error) -> BackendError {
        BackendError::Unavailable(err.to_string())
    }
}

#[async_trait::async_trait]
impl CacheBackend for DocumentBackend {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>, BackendError> {
        let storage_key = key.to_storage_string();
        let found = self
            .collection
            .find_one(doc! { "key": &storage_key }, None)
            .await
            .map_err(Self::io_error)?;

        let Some(document) = found else {
            return Ok(None);
        };
        let message = DnsPacket::decode(&document.record.bytes)
            .map_err(|err| BackendError::Unavailable(err.to_string()))?;
        let value = CacheValue {
            message,
            inserted_at: document.timestamp as u64,
        };

        if value.is_expired(now_secs(), self.default_ttl) {
            tracing::debug!(key = %storage_key, "document past effective ttl, deleting");
            let _ = self
                .collection
                .delete_one(doc! { "key": &storage_key }, None)
                .await;
            return Ok(None);
        }
        Ok(Some(value))
    }

    async fn put(&self, key: CacheKey, value: CacheValue) -> Result<(), BackendError> {
        let storage_key = key.to_storage_string();
        tracing::debug!(key = %storage_key, "persisting record to document store");
        let bytes = value
            .message
            .encode()
            .map_err(|err| BackendError::Unavailable(err.to_string()))?;
        let document = Document {
            key: storage_key.clone(),
            record: Binary {
                subtype: mongodb::bson::spec::BinarySubtype::Generic,
                bytes,
            },
            timestamp: value.inserted_at as f64,
        };

        self.collection
            .find_one_and_replace(
                doc! { "key": &storage_key },
                &document,
                mongodb::options::FindOneAndReplaceOptions::builder()
                    .upsert(true)
                    .build(),
            )
            .await
            .map_err(Self::io_error)?;

        let count = self
            .collection
            .count_documents(doc! {}, None)
            .await
            .map_err(Self::io_error)?;
        if count as usize > self.capacity {
            if let Some(oldest) = self
                .collection
                .find_one(
                    None,
                    mongodb::options::FindOneOptions::builder()
                        .sort(doc! { "timestamp": 1 })
                        .build(),
                )
                .await
                .map_err(Self::io_error)?
            {
                tracing::debug!(capacity = self.capacity, "document store over capacity, evicting oldest document");
                self.collection
                    .delete_one(doc! { "key": &oldest.key }, None)
                    .await
                    .map_err(Self::io_error)?;
            }
        }

        Ok(())
    }

    async fn clear(&self) -> Result<(), BackendError> {
        self.collection
            .delete_many(doc! {}, None)
            .await
            .map_err(Self::io_error)?;
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats, BackendError> {
        let size = self
            .collection
            .count_documents(doc! {}, None)
            .await
            .map_err(Self::io_error)? as usize;
        Ok(CacheStats {
            hits: 0,
            misses: 0,
            size,
            capacity: self.capacity,
        })
    }

    async fn entries(&self) -> Result<Vec<(CacheKey, CacheValue)>, BackendError> {
        use futures::stream::TryStreamExt;

        let mut cursor = self
            .collection
            .find(doc! {}, None)
            .await
            .map_err(Self::io_error)?;
        let mut out = Vec::new();
        while let Some(document) = cursor.try_next().await.map_err(Self::io_error)? {
            let Some(key) = CacheKey::from_storage_string(&document.key) else {
                continue;
            };
            let Ok(message) = DnsPacket::decode(&document.record.bytes) else {
                continue;
            };
            out.push((
                key,
                CacheValue {
                    message,
                    inserted_at: document.timestamp as u64,
                },
            ));
        }
        Ok(out)
    }
}
