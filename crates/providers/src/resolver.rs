//! Hostname resolution for provider endpoints.
//!
//! Provider hostnames are resolved through a preferred set of public
//! nameservers (Cloudflare, then Google) and cached for a TTL. When the
//! preferred set fails the system resolver is asked instead; when that fails
//! too, a stale cached answer is served if one exists. This only affects
//! latency, never correctness.

use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use tracing::{debug, warn};

/// Nameservers queried before the system resolver.
pub const PREFERRED_NAMESERVERS: [IpAddr; 4] = [
    IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
    IpAddr::V4(Ipv4Addr::new(1, 0, 0, 1)),
    IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
    IpAddr::V4(Ipv4Addr::new(8, 8, 4, 4)),
];

/// Per-query timeout against the preferred set.
const PREFERRED_TIMEOUT: Duration = Duration::from_secs(2);

/// How provider hostnames are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverMode {
    /// Preferred nameservers, cached, with system resolver fallback.
    Cached { ttl: Duration },
    /// The client's default resolver, uncached.
    SystemDefault,
}

impl ResolverMode {
    /// Mode from a TTL in seconds; zero disables caching.
    pub fn from_ttl_secs(secs: u64) -> Self {
        if secs == 0 {
            ResolverMode::SystemDefault
        } else {
            ResolverMode::Cached {
                ttl: Duration::from_secs(secs),
            }
        }
    }

    /// Human-readable description for health output.
    pub fn describe(&self) -> String {
        match self {
            ResolverMode::Cached { ttl } => {
                let servers: Vec<String> =
                    PREFERRED_NAMESERVERS.iter().map(|ip| ip.to_string()).collect();
                format!(
                    "Optimized ({}; {}s TTL, system fallback)",
                    servers.join(", "),
                    ttl.as_secs()
                )
            }
            ResolverMode::SystemDefault => "System Default".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    addrs: Vec<SocketAddr>,
    resolved_at: Instant,
}

/// TTL cache over the preferred nameservers and the system resolver.
#[derive(Clone)]
pub struct CachingResolver {
    ttl: Duration,
    preferred: Option<Arc<TokioAsyncResolver>>,
    cache: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl fmt::Debug for CachingResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingResolver")
            .field("ttl", &self.ttl)
            .field("preferred", &self.preferred.is_some())
            .finish()
    }
}

impl CachingResolver {
    /// Resolver querying [`PREFERRED_NAMESERVERS`] first.
    pub fn new(ttl: Duration) -> Self {
        let servers = NameServerConfigGroup::from_ips_clear(&PREFERRED_NAMESERVERS, 53, true);
        let config = ResolverConfig::from_parts(None, Vec::new(), servers);
        let mut opts = ResolverOpts::default();
        opts.timeout = PREFERRED_TIMEOUT;
        opts.attempts = 1;

        Self {
            preferred: Some(Arc::new(TokioAsyncResolver::tokio(config, opts))),
            ..Self::system_only(ttl)
        }
    }

    /// Resolver that only caches system lookups.
    pub fn system_only(ttl: Duration) -> Self {
        Self {
            ttl,
            preferred: None,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Resolve a host, consulting the cache first.
    pub async fn lookup(&self, host: &str) -> std::io::Result<Vec<SocketAddr>> {
        if let Some(addrs) = self.cached(host, false) {
            debug!(host, "DNS cache hit");
            return Ok(addrs);
        }

        if let Some(addrs) = self.lookup_preferred(host).await {
            self.store(host, addrs.clone());
            return Ok(addrs);
        }

        match tokio::net::lookup_host((host, 0)).await {
            Ok(found) => {
                let addrs: Vec<SocketAddr> = found.collect();
                self.store(host, addrs.clone());
                Ok(addrs)
            }
            Err(err) => match self.cached(host, true) {
                Some(stale) => {
                    warn!(host, error = %err, "DNS lookup failed, serving stale entry");
                    Ok(stale)
                }
                None => Err(err),
            },
        }
    }

    async fn lookup_preferred(&self, host: &str) -> Option<Vec<SocketAddr>> {
        let resolver = self.preferred.as_ref()?;
        match resolver.lookup_ip(host).await {
            Ok(found) => {
                let addrs: Vec<SocketAddr> = found.iter().map(|ip| SocketAddr::new(ip, 0)).collect();
                if addrs.is_empty() {
                    None
                } else {
                    Some(addrs)
                }
            }
            Err(err) => {
                debug!(host, error = %err, "Preferred nameservers failed, using system resolver");
                None
            }
        }
    }

    fn cached(&self, host: &str, allow_stale: bool) -> Option<Vec<SocketAddr>> {
        let cache = self.cache.lock().ok()?;
        let entry = cache.get(host)?;
        if allow_stale || entry.resolved_at.elapsed() < self.ttl {
            Some(entry.addrs.clone())
        } else {
            None
        }
    }

    fn store(&self, host: &str, addrs: Vec<SocketAddr>) {
        if addrs.is_empty() {
            return;
        }
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(
                host.to_string(),
                CacheEntry {
                    addrs,
                    resolved_at: Instant::now(),
                },
            );
        }
    }
}

impl Resolve for CachingResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = self.clone();
        Box::pin(async move {
            match resolver.lookup(name.as_str()).await {
                Ok(addrs) => {
                    let addrs: Addrs = Box::new(addrs.into_iter());
                    Ok(addrs)
                }
                Err(err) => Err(Box::new(err) as Box<dyn std::error::Error + Send + Sync>),
            }
        })
    }
}
