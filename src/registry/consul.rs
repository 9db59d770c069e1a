//! Consul-backed Registry Store
//!
//! Uses the Consul HTTP API:
//! - `GET /v1/kv/<root>/<key>?raw` and `PUT /v1/kv/<root>/<key>` for single keys
//! - `GET /v1/kv/<root>/<prefix>?recurse` for listing (values are base64)
//! - `GET /v1/health/service/<name>?passing=true[&tag=<tag>]` for discovery

use std::time::Duration;

use base64::Engine as _;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

use super::{RegistryStore, ServiceInstance};
use crate::error::{self, Result};

/// Default key namespace
pub const DEFAULT_ROOT: &str = "pkgplane";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct KvEntry {
    key: String,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthEntry {
    node: HealthNode,
    service: HealthService,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthNode {
    #[serde(default)]
    address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthService {
    #[serde(default)]
    address: String,
    #[serde(default)]
    port: u16,
}

/// Registry Store talking to a Consul agent
#[derive(Debug, Clone)]
pub struct ConsulRegistry {
    client: Client,
    base: Url,
    root: String,
}

impl ConsulRegistry {
    /// Create a client for the agent at `address` with keys under `root`
    pub fn new(address: &str, root: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(address)
            .map_err(|e| error::config::invalid(format!("Invalid Consul address '{address}': {e}")))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| error::registry::unavailable(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            root: root.trim_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| error::config::invalid(format!("Invalid Consul path '{path}': {e}")))
    }

    fn kv_url(&self, key: &str) -> Result<Url> {
        let key = key.trim_start_matches('/');
        if self.root.is_empty() {
            self.url(&format!("/v1/kv/{key}"))
        } else {
            self.url(&format!("/v1/kv/{}/{key}", self.root))
        }
    }

    fn strip_root<'a>(&self, key: &'a str) -> &'a str {
        if self.root.is_empty() {
            return key;
        }
        key.strip_prefix(self.root.as_str())
            .and_then(|k| k.strip_prefix('/'))
            .unwrap_or(key)
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> Result<Response> {
        request
            .send()
            .map_err(|e| error::registry::unavailable(e.to_string()))
    }

    /// Check that the agent answers. The only fatal startup failure.
    pub fn probe(&self) -> Result<()> {
        self.get("")?;
        debug!(consul = %self.base, root = %self.root, "Registry reachable");
        Ok(())
    }
}

fn failed(response: Response) -> crate::error::PkgError {
    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    error::registry::request_failed(status, body)
}

impl RegistryStore for ConsulRegistry {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut url = self.kv_url(key)?;
        url.set_query(Some("raw"));
        trace!(%url, "GET");

        let response = self.send(self.client.get(url))?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => response
                .bytes()
                .map(|b| Some(b.to_vec()))
                .map_err(|e| error::registry::unavailable(e.to_string())),
            _ => Err(failed(response)),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let url = self.kv_url(key)?;
        trace!(%url, bytes = value.len(), "PUT");

        let response = self.send(self.client.put(url).body(value.to_vec()))?;
        if !response.status().is_success() {
            return Err(failed(response));
        }

        let body = response
            .text()
            .map_err(|e| error::registry::unavailable(e.to_string()))?;
        if body.trim() == "false" {
            return Err(error::registry::request_failed(200, format!("write of '{key}' rejected")));
        }
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let mut url = self.kv_url(prefix)?;
        url.set_query(Some("recurse"));
        trace!(%url, "LIST");

        let response = self.send(self.client.get(url))?;
        match response.status() {
            StatusCode::NOT_FOUND => return Ok(Vec::new()),
            s if !s.is_success() => return Err(failed(response)),
            _ => {}
        }

        let entries: Vec<KvEntry> = response
            .json()
            .map_err(|e| error::registry::corrupt_entry(prefix, e.to_string()))?;

        let mut decoded = Vec::with_capacity(entries.len());
        for entry in entries {
            let value = match entry.value {
                Some(encoded) => base64::engine::general_purpose::STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|e| error::registry::corrupt_entry(&entry.key, e.to_string()))?,
                None => Vec::new(),
            };
            decoded.push((self.strip_root(&entry.key).to_string(), value));
        }
        decoded.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(decoded)
    }

    fn catalog_lookup(&self, service: &str, tag: Option<&str>) -> Result<Vec<ServiceInstance>> {
        let mut url = self.url(&format!("/v1/health/service/{service}"))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("passing", "true");
            if let Some(tag) = tag {
                query.append_pair("tag", tag);
            }
        }
        trace!(%url, "Catalog lookup");

        let response = self.send(self.client.get(url))?;
        if !response.status().is_success() {
            return Err(failed(response));
        }

        let entries: Vec<HealthEntry> = response
            .json()
            .map_err(|e| error::registry::unavailable(format!("Invalid health response: {e}")))?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let address = if entry.service.address.is_empty() {
                    entry.node.address
                } else {
                    entry.service.address
                };
                ServiceInstance::new(address, entry.service.port)
            })
            .filter(|instance| !instance.address.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::http::TestServer;
    use axum::Router;
    use axum::body::Bytes;
    use axum::extract::{Path, RawQuery, State};
    use axum::http::StatusCode as AxumStatus;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    type Kv = Arc<Mutex<BTreeMap<String, Vec<u8>>>>;

    async fn kv_get(
        State(kv): State<Kv>,
        Path(key): Path<String>,
        RawQuery(query): RawQuery,
    ) -> axum::response::Response {
        let kv = kv.lock().unwrap();
        if query.as_deref() == Some("recurse") {
            let entries: Vec<serde_json::Value> = kv
                .iter()
                .filter(|(k, _)| k.starts_with(&key))
                .map(|(k, v)| {
                    serde_json::json!({
                        "Key": k,
                        "Value": base64::engine::general_purpose::STANDARD.encode(v),
                    })
                })
                .collect();
            if entries.is_empty() {
                return AxumStatus::NOT_FOUND.into_response();
            }
            return axum::Json(entries).into_response();
        }
        match kv.get(&key) {
            Some(value) => value.clone().into_response(),
            None => AxumStatus::NOT_FOUND.into_response(),
        }
    }

    async fn kv_put(State(kv): State<Kv>, Path(key): Path<String>, body: Bytes) -> &'static str {
        kv.lock().unwrap().insert(key, body.to_vec());
        "true"
    }

    async fn health(Path(service): Path<String>, RawQuery(query): RawQuery) -> axum::response::Response {
        let query = query.unwrap_or_default();
        assert!(query.contains("passing=true"));
        match (service.as_str(), query.contains("tag=leader")) {
            ("mesos", true) => axum::Json(serde_json::json!([
                {"Node": {"Address": "10.0.0.5"}, "Service": {"Address": "", "Port": 5050}}
            ]))
            .into_response(),
            ("marathon", false) => axum::Json(serde_json::json!([
                {"Node": {"Address": "10.0.0.1"}, "Service": {"Address": "marathon.local", "Port": 8080}},
                {"Node": {"Address": "10.0.0.2"}, "Service": {"Address": "", "Port": 8080}}
            ]))
            .into_response(),
            _ => axum::Json(serde_json::json!([])).into_response(),
        }
    }

    fn fake_consul() -> (TestServer, Kv) {
        let kv: Kv = Arc::default();
        let router = Router::new()
            .route("/v1/kv/*key", get(kv_get).put(kv_put))
            .route("/v1/health/service/:service", get(health))
            .with_state(kv.clone());
        (TestServer::spawn(router), kv)
    }

    fn registry(server: &TestServer) -> ConsulRegistry {
        ConsulRegistry::new(&server.url(), DEFAULT_ROOT, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_put_then_get() {
        let (server, kv) = fake_consul();
        let registry = registry(&server);

        registry.put("catalog/0/redis/1.0", b"{\"a\":1}").unwrap();
        assert!(kv.lock().unwrap().contains_key("pkgplane/catalog/0/redis/1.0"));

        let value = registry.get("catalog/0/redis/1.0").unwrap();
        assert_eq!(value.as_deref(), Some(&b"{\"a\":1}"[..]));
        assert_eq!(registry.get("catalog/0/redis/9.9").unwrap(), None);
    }

    #[test]
    fn test_list_decodes_and_strips_root() {
        let (server, _kv) = fake_consul();
        let registry = registry(&server);

        registry.put("catalog/1/redis/1.0", b"one").unwrap();
        registry.put("catalog/0/redis/1.0", b"zero").unwrap();
        registry.put("other/key", b"x").unwrap();

        let listed = registry.list("catalog/").unwrap();
        assert_eq!(
            listed,
            vec![
                ("catalog/0/redis/1.0".to_string(), b"zero".to_vec()),
                ("catalog/1/redis/1.0".to_string(), b"one".to_vec()),
            ]
        );
        assert!(registry.list("nothing/").unwrap().is_empty());
    }

    #[test]
    fn test_catalog_lookup_prefers_service_address() {
        let (server, _kv) = fake_consul();
        let registry = registry(&server);

        let marathon = registry.catalog_lookup("marathon", None).unwrap();
        assert_eq!(
            marathon,
            vec![
                ServiceInstance::new("marathon.local", 8080),
                ServiceInstance::new("10.0.0.2", 8080),
            ]
        );

        let mesos = registry.catalog_lookup("mesos", Some("leader")).unwrap();
        assert_eq!(mesos, vec![ServiceInstance::new("10.0.0.5", 5050)]);

        assert!(registry.catalog_lookup("zookeeper", None).unwrap().is_empty());
    }

    #[test]
    fn test_probe() {
        let (server, _kv) = fake_consul();
        assert!(registry(&server).probe().is_ok());
    }

    #[test]
    fn test_unreachable_agent_is_upstream_error() {
        let registry = ConsulRegistry::new(
            &crate::testkit::http::unused_address(),
            DEFAULT_ROOT,
            Duration::from_secs(2),
        )
        .unwrap();
        let err = registry.probe().unwrap_err();
        assert!(matches!(err, crate::error::PkgError::RegistryUnavailable { .. }));
    }

    #[test]
    fn test_invalid_address() {
        let result = ConsulRegistry::new("not a url", DEFAULT_ROOT, Duration::from_secs(1));
        assert!(result.is_err());
    }
}
