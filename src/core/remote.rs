//! Asset-service records and endpoint derivation.
//!
//! The service keys everything on a numeric record id. A run starts with the
//! unresolved sentinel and only gains a real id after the resolve call, so
//! the upload endpoints cannot be formed before resolution succeeds.

use serde::{Deserialize, Serialize};

use crate::core::config::Config;
use crate::core::identity::DesignIdentity;

pub const UNRESOLVED_PK: i64 = -1;

/// Record returned by the resolve endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRecord {
    #[serde(rename = "id")]
    pub pk: i64,
    #[serde(default)]
    pub part_number: Option<i64>,
    #[serde(default)]
    pub revision: Option<String>,
}

impl RemoteRecord {
    pub fn unresolved() -> Self {
        Self {
            pk: UNRESOLVED_PK,
            part_number: None,
            revision: None,
        }
    }

    /// Real record keys are positive; -1 is the unresolved sentinel.
    pub fn is_resolved(&self) -> bool {
        self.pk > 0
    }
}

/// Body of the resolve call.
#[derive(Debug, Serialize)]
pub struct FetchRequest {
    pub part_number: i64,
    pub revision: String,
}

impl FetchRequest {
    pub fn for_identity(identity: &DesignIdentity) -> Self {
        Self {
            part_number: identity.numeric_part(),
            revision: identity.revision.clone(),
        }
    }
}

/// URL set for one configured service host.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(protocol: &str, host: &str) -> Self {
        Self {
            base: base_url(protocol, host),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.protocol, &config.host)
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn fetch_by_part_number_revision(&self) -> String {
        format!("{}/api/v1/pcbas/fetchByPartNumberRevision/", self.base)
    }

    pub fn upload_file(&self, pk: i64) -> String {
        format!("{}/api/v1/pcbas/upload/{}/", self.base, pk)
    }

    pub fn upload_bom(&self, pk: i64) -> String {
        format!("{}/api/v1/pcbas/bom/{}/", self.base, pk)
    }

    pub fn upload_thumbnail(&self, pk: i64) -> String {
        format!("{}/api/v1/pcbas/thumbnail/{}/", self.base, pk)
    }

    /// Endpoints the reachability check walks. Any HTTP answer, including
    /// auth rejections, proves the service is there.
    pub fn probes(&self) -> Vec<String> {
        ["pcbas", "parts", "assemblies", "documents", "customers"]
            .iter()
            .map(|name| format!("{}/api/v1/{}/", self.base, name))
            .collect()
    }
}

/// Local development hosts never go through TLS.
fn base_url(protocol: &str, host: &str) -> String {
    if host.contains("localhost") || host.contains("127.0.0.1") {
        format!("http://{}", host)
    } else {
        format!("{}://{}", protocol, host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_host_keeps_its_protocol() {
        let endpoints = Endpoints::new("https", "assets.example.com");
        assert_eq!(endpoints.base(), "https://assets.example.com");
    }

    #[test]
    fn localhost_is_always_plain_http() {
        assert_eq!(
            Endpoints::new("https", "localhost:8000").base(),
            "http://localhost:8000"
        );
        assert_eq!(
            Endpoints::new("https", "127.0.0.1:8000").base(),
            "http://127.0.0.1:8000"
        );
    }

    #[test]
    fn upload_endpoint_embeds_the_record_key() {
        let endpoints = Endpoints::new("https", "assets.example.com");
        assert_eq!(
            endpoints.upload_file(77),
            "https://assets.example.com/api/v1/pcbas/upload/77/"
        );
        assert_eq!(
            endpoints.upload_bom(77),
            "https://assets.example.com/api/v1/pcbas/bom/77/"
        );
        assert_eq!(
            endpoints.upload_thumbnail(77),
            "https://assets.example.com/api/v1/pcbas/thumbnail/77/"
        );
    }

    #[test]
    fn fetch_endpoint_is_not_keyed() {
        let endpoints = Endpoints::new("https", "assets.example.com");
        assert_eq!(
            endpoints.fetch_by_part_number_revision(),
            "https://assets.example.com/api/v1/pcbas/fetchByPartNumberRevision/"
        );
    }

    #[test]
    fn probe_list_covers_the_service_surface() {
        let endpoints = Endpoints::new("https", "assets.example.com");
        let probes = endpoints.probes();
        assert_eq!(probes.len(), 5);
        assert!(probes[0].ends_with("/api/v1/pcbas/"));
    }

    #[test]
    fn record_parses_service_payload() {
        let record: RemoteRecord =
            serde_json::from_str(r#"{"id": 42, "part_number": 1234, "revision": "A"}"#).unwrap();
        assert_eq!(record.pk, 42);
        assert!(record.is_resolved());
    }

    #[test]
    fn unresolved_sentinel_is_not_resolved() {
        assert!(!RemoteRecord::unresolved().is_resolved());
    }

    #[test]
    fn fetch_request_strips_the_prefix() {
        let identity = DesignIdentity::new("PCBA1234", "B").unwrap();
        let request = FetchRequest::for_identity(&identity);
        assert_eq!(request.part_number, 1234);
        assert_eq!(request.revision, "B");
    }
}
