use std::net::SocketAddr;
use std::path::Path;

use resolvd_resolver::config::CacheBackendKind;

/// Aggregates the resolver core's own config (§6) with a listen address for
/// the relay server and the settings for whichever durable cache backend is
/// selected, mirroring how the teacher's top-level `Config` stitches each
/// collaborator's config together.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_address: SocketAddr,
    pub resolver: resolvd_resolver::config::Config,
    pub document_cache: resolvd_cache::backend::document::Config,
    pub relational_cache: resolvd_cache::backend::relational::Config,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:5353".parse().expect("valid default listen address"),
            resolver: resolvd_resolver::config::Config::default(),
            document_cache: resolvd_cache::backend::document::Config::default(),
            relational_cache: resolvd_cache::backend::relational::Config::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Self {
        let conf = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(::config::Environment::default().separator("_"))
            .build()
            .expect("unable to build configuration");
        conf.try_deserialize()
            .expect("configuration format invalid")
    }

    pub fn cache_backend_kind(&self) -> CacheBackendKind {
        self.resolver.cache_backend
    }
}
