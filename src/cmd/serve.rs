use clap::Args;
use resolvd_resolver::{ForwardResolver, IterativeResolver, ResolveMode, ResolverFacade, UdpTransport};
use resolvd_server::relay::RelayHandler;
use resolvd_server::UdpServer;
use std::sync::Arc;

/// Starts the resolver's UDP listener, the core of the daemon.
#[derive(Args, Debug)]
pub struct Command {
    /// Resolution strategy applied to every incoming query.
    #[arg(long, default_value = "auto", env = "RESOLVD_MODE")]
    mode: ResolveMode,
}

impl Command {
    pub async fn run(&self, config: crate::config::Config) {
        let facade = Arc::new(build_facade(&config).await);
        tracing::info!(address = %config.listen_address, "starting resolver");

        let server = UdpServer::new(config.listen_address, RelayHandler::new(facade, self.mode));
        if let Err(error) = server.run().await {
            tracing::error!("udp server stopped: {error:?}");
        }
    }
}

/// Builds the cache backend selected by `resolver.cache_backend`, falling
/// back to an in-memory cache if the durable backend cannot be reached
/// (§7's `BackendUnavailable`) so a misconfigured store never stops the
/// resolver from starting.
pub(crate) async fn build_facade(config: &crate::config::Config) -> ResolverFacade {
    let resolver_config = &config.resolver;

    let cache: Arc<dyn resolvd_cache::CacheBackend> = match resolver_config.cache_backend {
        resolvd_resolver::config::CacheBackendKind::Memory => Arc::new(
            resolvd_cache::MemoryBackend::new(resolver_config.cache_size, resolver_config.default_ttl),
        ),
        resolvd_resolver::config::CacheBackendKind::Document => {
            match config.document_cache.clone().build().await {
                Ok(backend) => Arc::new(backend),
                Err(error) => {
                    tracing::error!("document cache unavailable, falling back to memory: {error}");
                    Arc::new(resolvd_cache::MemoryBackend::new(
                        resolver_config.cache_size,
                        resolver_config.default_ttl,
                    ))
                }
            }
        }
        resolvd_resolver::config::CacheBackendKind::Relational => {
            match config.relational_cache.clone().build().await {
                Ok(backend) => Arc::new(backend),
                Err(error) => {
                    tracing::error!("relational cache unavailable, falling back to memory: {error}");
                    Arc::new(resolvd_cache::MemoryBackend::new(
                        resolver_config.cache_size,
                        resolver_config.default_ttl,
                    ))
                }
            }
        }
    };

    let transport = UdpTransport::new(resolver_config.timeout());
    let iterative = IterativeResolver::new(transport, 16, 32);
    let forward = ForwardResolver::new(resolver_config.default_forwarder, transport);
    let doh_endpoint = resolver_config
        .doh_providers
        .values()
        .next()
        .cloned()
        .unwrap_or_else(|| "https://cloudflare-dns.com/dns-query".to_string());
    let doh = resolvd_resolver::DohTransport::new(doh_endpoint, resolver_config.timeout())
        .expect("unable to build doh transport");

    ResolverFacade::new(cache, iterative, forward, doh, resolver_config.default_ttl)
}
