//! Remote candidate lookups against the OpenChain signature database

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy_json_abi::Function;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::abi::{CandidateFragment, CandidateStore, InterfaceDescriptor, LookupError};

pub const DEFAULT_OPENCHAIN_URL: &str = "https://api.openchain.xyz/signature-database/v1";

#[derive(Debug, Deserialize)]
struct OpenChainResponse {
    ok: bool,
    #[serde(default)]
    result: OpenChainResult,
}

#[derive(Debug, Default, Deserialize)]
struct OpenChainResult {
    #[serde(default)]
    function: HashMap<String, Option<Vec<OpenChainSignature>>>,
}

#[derive(Debug, Deserialize)]
struct OpenChainSignature {
    name: String,
}

/// Candidate store backed by OpenChain function signatures
///
/// Signatures carry no parameter names, so decodes through this store show
/// `arg0`, `arg1`, ... Completed lookups are cached for the process lifetime.
pub struct OpenChainCandidateStore {
    http: reqwest::Client,
    base_url: String,
    /// Cache: selector -> fragments in response order
    cache: Arc<RwLock<HashMap<[u8; 4], Vec<CandidateFragment>>>>,
}

impl OpenChainCandidateStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// `Ok(None)` when the service answered but had nothing usable; those
    /// answers are not cached so a later lookup can retry.
    async fn fetch(
        &self,
        identifier: [u8; 4],
    ) -> Result<Option<Vec<CandidateFragment>>, LookupError> {
        let selector_hex = format!("0x{}", hex::encode(identifier));
        let url = format!(
            "{}/lookup?function={}&filter=true",
            self.base_url, selector_hex
        );
        tracing::debug!(%url, "querying openchain");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| LookupError::Remote(err.to_string()))?;
        if !response.status().is_success() {
            tracing::debug!(selector = %selector_hex, status = %response.status(), "openchain lookup failed");
            return Ok(None);
        }

        let data: OpenChainResponse = response
            .json()
            .await
            .map_err(|err| LookupError::Remote(err.to_string()))?;
        Ok(fragments_from_response(data, identifier))
    }
}

/// Turn a lookup response into fragments, dropping entries that don't parse or
/// whose selector doesn't actually match
fn fragments_from_response(
    data: OpenChainResponse,
    identifier: [u8; 4],
) -> Option<Vec<CandidateFragment>> {
    if !data.ok {
        tracing::debug!("openchain returned ok=false");
        return None;
    }
    let selector_hex = format!("0x{}", hex::encode(identifier));
    let signatures = data
        .result
        .function
        .into_iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(&selector_hex))
        .and_then(|(_, sigs)| sigs)
        .unwrap_or_default();

    let mut fragments = Vec::new();
    for sig in signatures {
        let function = match Function::parse(&sig.name) {
            Ok(function) => function,
            Err(err) => {
                tracing::debug!(signature = %sig.name, %err, "unparseable remote signature");
                continue;
            }
        };
        if function.selector().0 != identifier {
            tracing::debug!(signature = %sig.name, "remote signature has wrong selector");
            continue;
        }
        fragments.push(CandidateFragment::new(
            identifier,
            InterfaceDescriptor::from(&function).into(),
        ));
    }
    Some(fragments)
}

#[async_trait]
impl CandidateStore for OpenChainCandidateStore {
    async fn lookup_by_identifier(
        &self,
        identifier: [u8; 4],
        limit: usize,
    ) -> Result<Vec<CandidateFragment>, LookupError> {
        {
            let cache = self.cache.read().await;
            if let Some(fragments) = cache.get(&identifier) {
                return Ok(fragments.iter().take(limit).cloned().collect());
            }
        }

        let Some(fragments) = self.fetch(identifier).await? else {
            return Ok(Vec::new());
        };
        {
            let mut cache = self.cache.write().await;
            cache.insert(identifier, fragments.clone());
        }
        Ok(fragments.into_iter().take(limit).collect())
    }
}
