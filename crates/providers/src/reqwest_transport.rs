//! reqwest-backed [`HttpTransport`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::resolver::{CachingResolver, ResolverMode};

/// Connection settings shared by every provider call.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Requests allowed in flight to one host at a time.
    pub max_connections_per_host: usize,
    /// Hostname resolution strategy.
    pub resolver: ResolverMode,
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            max_connections_per_host: 30,
            resolver: ResolverMode::Cached {
                ttl: Duration::from_secs(300),
            },
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Caps concurrent requests per destination host.
#[derive(Debug)]
struct HostLimiter {
    per_host: usize,
    hosts: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl HostLimiter {
    fn new(per_host: usize) -> Self {
        Self {
            per_host: per_host.max(1),
            hosts: Mutex::new(HashMap::new()),
        }
    }

    async fn acquire(&self, host: &str) -> Result<OwnedSemaphorePermit, TransportError> {
        let semaphore = {
            let mut hosts = self
                .hosts
                .lock()
                .map_err(|_| TransportError::Other("host limiter poisoned".to_string()))?;
            hosts
                .entry(host.to_string())
                .or_insert_with(|| Arc::new(Semaphore::new(self.per_host)))
                .clone()
        };

        semaphore
            .acquire_owned()
            .await
            .map_err(|err| TransportError::Other(err.to_string()))
    }
}

/// Default transport used by the server and the key checker.
pub struct ReqwestTransport {
    client: Client,
    limiter: HostLimiter,
}

impl ReqwestTransport {
    /// Build a transport from settings.
    pub fn new(settings: &TransportSettings) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .pool_max_idle_per_host(settings.max_connections_per_host)
            .pool_idle_timeout(Duration::from_secs(90));

        if let ResolverMode::Cached { ttl } = settings.resolver {
            builder = builder.dns_resolver(Arc::new(CachingResolver::new(ttl)));
        }

        let client = builder
            .build()
            .map_err(|err| TransportError::Other(format!("failed to create HTTP client: {err}")))?;

        Ok(Self {
            client,
            limiter: HostLimiter::new(settings.max_connections_per_host),
        })
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }

    fn classify(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = Url::parse(&request.url)
            .map_err(|err| TransportError::Other(format!("invalid url {}: {err}", request.url)))?;
        let host = url.host_str().unwrap_or_default().to_string();
        let _permit = self.limiter.acquire(&host).await?;

        let mut builder = self.client.request(Self::method(request.method), url);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        debug!(%host, "Sending provider request");
        let response = builder.send().await.map_err(Self::classify)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(Self::classify)?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limiter_caps_per_host() {
        let limiter = HostLimiter::new(1);
        let first = limiter.acquire("api.example.com").await.unwrap();

        let blocked = tokio::time::timeout(
            Duration::from_millis(20),
            limiter.acquire("api.example.com"),
        )
        .await;
        assert!(blocked.is_err());

        let other = limiter.acquire("other.example.com").await;
        assert!(other.is_ok());

        drop(first);
        assert!(limiter.acquire("api.example.com").await.is_ok());
    }

    #[test]
    fn test_build_with_default_settings() {
        assert!(ReqwestTransport::new(&TransportSettings::default()).is_ok());
    }
}
