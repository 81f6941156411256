//! Browser-like request shaping.
//!
//! Every attempt draws a fresh client identity and sends the header set a
//! desktop browser would send on a top-level navigation, plus a same-origin
//! referer. This is enough to get past the most trivial bot filters.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::seq::SliceRandom;

use crate::traits::IdentityProvider;
use crate::validate::host_of;

/// Desktop Chrome/Firefox/Safari identities across Windows, macOS and Linux.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
];

const ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";
const ACCEPT_ENCODING: &str = "gzip, deflate, br";

/// Uniform random pick from [`USER_AGENTS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdentity;

impl IdentityProvider for RandomIdentity {
    fn next_identity(&self) -> String {
        USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
            .to_string()
    }
}

/// Cycles through a fixed list of identities in order.
///
/// Used to pin the User-Agent (a one-element list) and in tests that need a
/// predictable rotation. Clones share the cursor.
#[derive(Debug, Clone)]
pub struct SequenceIdentity {
    identities: Arc<[String]>,
    cursor: Arc<AtomicUsize>,
}

impl SequenceIdentity {
    /// Falls back to the first built-in identity when `identities` is empty.
    pub fn new<I, S>(identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list: Vec<String> = identities.into_iter().map(Into::into).collect();
        if list.is_empty() {
            list.push(USER_AGENTS[0].to_string());
        }
        Self {
            identities: list.into(),
            cursor: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn fixed(identity: impl Into<String>) -> Self {
        Self::new([identity.into()])
    }
}

impl IdentityProvider for SequenceIdentity {
    fn next_identity(&self) -> String {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.identities[i % self.identities.len()].clone()
    }
}

/// Build the header set for one request to `url` under `identity`.
///
/// `Referer` is set to `https://<host>/` whenever the host parses.
pub fn build_headers(url: &str, identity: &str) -> BTreeMap<String, String> {
    let mut headers: BTreeMap<String, String> = [
        ("User-Agent", identity),
        ("Accept", ACCEPT),
        ("Accept-Language", ACCEPT_LANGUAGE),
        ("Accept-Encoding", ACCEPT_ENCODING),
        ("Cache-Control", "no-cache"),
        ("Pragma", "no-cache"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "none"),
        ("Sec-Fetch-User", "?1"),
        ("Upgrade-Insecure-Requests", "1"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    if let Some(host) = host_of(url) {
        headers.insert("Referer".to_string(), format!("https://{host}/"));
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_identity_comes_from_pool() {
        let provider = RandomIdentity;
        for _ in 0..50 {
            let ua = provider.next_identity();
            assert!(USER_AGENTS.contains(&ua.as_str()));
        }
    }

    #[test]
    fn test_sequence_identity_cycles() {
        let provider = SequenceIdentity::new(["a", "b"]);
        let clone = provider.clone();
        assert_eq!(provider.next_identity(), "a");
        assert_eq!(clone.next_identity(), "b");
        assert_eq!(provider.next_identity(), "a");
    }

    #[test]
    fn test_sequence_identity_empty_falls_back() {
        let provider = SequenceIdentity::new(Vec::<String>::new());
        assert_eq!(provider.next_identity(), USER_AGENTS[0]);
    }

    #[test]
    fn test_headers_include_browser_fields() {
        let headers = build_headers("https://blog.csdn.net/x/article/details/1", "UA/1.0");
        assert_eq!(headers["User-Agent"], "UA/1.0");
        assert_eq!(headers["Referer"], "https://blog.csdn.net/");
        assert_eq!(headers["Sec-Fetch-Mode"], "navigate");
        assert_eq!(headers["Cache-Control"], "no-cache");
        assert!(headers["Accept"].starts_with("text/html"));
        assert!(headers["Accept-Language"].starts_with("zh-CN"));
    }

    #[test]
    fn test_referer_uses_https_even_for_http_targets() {
        let headers = build_headers("http://example.com:8080/page", "UA");
        assert_eq!(headers["Referer"], "https://example.com/");
    }

    #[test]
    fn test_no_referer_without_host() {
        let headers = build_headers("not a url", "UA");
        assert!(!headers.contains_key("Referer"));
        assert_eq!(headers["User-Agent"], "UA");
    }
}
