//! Cache Policy
//!
//! Decides which requests may be diverted through the response cache and
//! which responses may be stored.

use serde::Deserialize;

use crate::{CacheMode, Method, Request, Response};

/// URL and content-type rules for the response cache
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    /// URL fragments that make a request eligible
    pub whitelist: Vec<String>,
    /// URL fragments that exclude a request; checked before the whitelist
    pub blacklist: Vec<String>,
    /// Content types counted as structured payloads
    pub structured_types: Vec<String>,
}

impl CachePolicy {
    /// Whether the request is diverted through the cache
    pub fn allows_request(&self, request: &Request) -> bool {
        request.method == Method::Get && request.cache != CacheMode::NoStore && self.allows_url(&request.url)
    }

    /// Blacklist first, then whitelist
    pub fn allows_url(&self, url: &str) -> bool {
        if self.blacklist.iter().any(|pattern| url.contains(pattern.as_str())) {
            return false;
        }
        self.whitelist.iter().any(|pattern| url.contains(pattern.as_str()))
    }

    /// Whether a response to an eligible request may be stored
    pub fn allows_response(&self, response: &Response) -> bool {
        if !response.ok() {
            return false;
        }
        let Some(content_type) = response.content_type() else {
            return false;
        };
        let essence = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        self.structured_types.iter().any(|t| essence.contains(t.as_str())) && response.text().is_ok()
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            whitelist: vec!["/api/".into()],
            blacklist: ["/auth", "/login", "/logout", "/session", "/token", "/checkout"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            structured_types: vec!["application/json".into(), "+json".into()],
        }
    }
}
