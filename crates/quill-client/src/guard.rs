//! Server-side request forgery (SSRF) protection.
//!
//! A guarded client refuses private and reserved addresses at three points:
//! the initial target before the first attempt ([`check_target`]), every DNS
//! lookup the client makes ([`PublicResolver`]), and every redirect hop
//! ([`redirect_policy`]).

use std::net::{IpAddr, SocketAddr};

use quill_core::error::AppError;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::redirect::Policy;
use thiserror::Error;
use url::{Host, Url};

/// Why a guarded client refused to connect.
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("{host} resolves to private/reserved IP {ip}, which is not allowed")]
    PrivateAddress { host: String, ip: IpAddr },

    #[error("DNS resolution failed for {host}: {reason}")]
    Resolution { host: String, reason: String },

    #[error("redirect limit of {0} exceeded")]
    TooManyRedirects(usize),
}

pub(crate) fn parse(url: &str) -> Result<Url, AppError> {
    Url::parse(url).map_err(|e| AppError::InvalidUrl(format!("{url}: {e}")))
}

pub(crate) fn check_scheme(parsed: &Url) -> Result<(), AppError> {
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(AppError::InvalidUrl(format!(
            "URL scheme '{scheme}' is not allowed (only http/https)"
        ))),
    }
}

/// Literal IP of a URL's host, if it has one.
fn literal_ip(url: &Url) -> Option<IpAddr> {
    match url.host()? {
        Host::Ipv4(v4) => Some(IpAddr::V4(v4)),
        Host::Ipv6(v6) => Some(IpAddr::V6(v6)),
        Host::Domain(_) => None,
    }
}

/// Check the initial target of a fetch.
///
/// Bad schemes and private addresses are terminal. A failed DNS lookup is
/// not: the retried attempts resolve again through [`PublicResolver`].
pub(crate) async fn check_target(url: &str) -> Result<(), AppError> {
    let parsed = parse(url)?;
    check_scheme(&parsed)?;

    let host = parsed
        .host_str()
        .ok_or_else(|| AppError::InvalidUrl("URL has no host".to_string()))?;

    if let Some(ip) = literal_ip(&parsed) {
        if is_private_ip(ip) {
            return Err(AppError::ForbiddenAddress(format!(
                "{host} is a private/reserved IP"
            )));
        }
        return Ok(());
    }

    match resolve_public(host, parsed.port_or_known_default().unwrap_or(80)).await {
        Ok(_) => Ok(()),
        Err(GuardError::PrivateAddress { host, ip }) => Err(AppError::ForbiddenAddress(format!(
            "{host} resolves to private/reserved IP {ip}"
        ))),
        Err(e) => {
            tracing::debug!(%host, error = %e, "Pre-flight lookup failed, deferring to attempts");
            Ok(())
        }
    }
}

/// Resolve `host`, failing if it has no addresses or any of them is private.
async fn resolve_public(host: &str, port: u16) -> Result<Vec<SocketAddr>, GuardError> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| GuardError::Resolution {
            host: host.to_string(),
            reason: e.to_string(),
        })?
        .collect();

    if addrs.is_empty() {
        return Err(GuardError::Resolution {
            host: host.to_string(),
            reason: "no addresses returned".to_string(),
        });
    }

    if let Some(private) = addrs.iter().find(|addr| is_private_ip(addr.ip())) {
        return Err(GuardError::PrivateAddress {
            host: host.to_string(),
            ip: private.ip(),
        });
    }

    Ok(addrs)
}

/// DNS resolver that only hands public addresses to the connector.
///
/// Installed on guarded clients so every connection, including redirect
/// targets and reconnects, is checked against the address the socket
/// actually uses.
pub(crate) struct PublicResolver;

impl Resolve for PublicResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let host = name.as_str().to_string();
        Box::pin(async move {
            // Port 0 is replaced by the scheme's default port.
            let addrs = resolve_public(&host, 0).await?;
            let addrs: Addrs = Box::new(addrs.into_iter());
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(addrs)
        })
    }
}

/// Follow at most `max_redirects` hops. When `guarded`, refuse hops to
/// private literal IPs; hostnames are covered by [`PublicResolver`].
pub(crate) fn redirect_policy(max_redirects: usize, guarded: bool) -> Policy {
    Policy::custom(move |attempt| {
        // The first entry of `previous` is the original URL.
        if attempt.previous().len() > max_redirects {
            return attempt.error(GuardError::TooManyRedirects(max_redirects));
        }
        if guarded {
            if let Some(ip) = literal_ip(attempt.url()).filter(|ip| is_private_ip(*ip)) {
                let host = attempt.url().host_str().unwrap_or_default().to_string();
                return attempt.error(GuardError::PrivateAddress { host, ip });
            }
        }
        attempt.follow()
    })
}

/// Check if an IP address is in a private/reserved/link-local range.
pub(crate) fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()           // 127.0.0.0/8
                || v4.is_private()     // 10/8, 172.16/12, 192.168/16
                || v4.is_link_local()  // 169.254.0.0/16 (cloud metadata)
                || v4.is_unspecified() // 0.0.0.0
                || v4.is_broadcast()   // 255.255.255.255
                || v4.is_documentation()
                || v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64 // 100.64.0.0/10 (CGN)
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                // fe80::/10 (link-local)
                || (v6.segments()[0] & 0xFFC0) == 0xFE80
                // fc00::/7 (unique local)
                || (v6.segments()[0] & 0xFE00) == 0xFC00
                || match v6.to_ipv4_mapped() {
                    Some(v4) => is_private_ip(IpAddr::V4(v4)),
                    None => false,
                }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_ipv4() {
        assert!(is_private_ip("127.0.0.1".parse().unwrap()));
        assert!(is_private_ip("10.0.0.1".parse().unwrap()));
        assert!(is_private_ip("172.16.0.1".parse().unwrap()));
        assert!(is_private_ip("192.168.1.1".parse().unwrap()));
        assert!(is_private_ip("169.254.169.254".parse().unwrap()));
        assert!(is_private_ip("100.64.0.1".parse().unwrap()));
        assert!(!is_private_ip("8.8.8.8".parse().unwrap()));
        assert!(!is_private_ip("93.184.216.34".parse().unwrap()));
    }

    #[test]
    fn test_private_ipv6() {
        assert!(is_private_ip("::1".parse().unwrap()));
        assert!(is_private_ip("fe80::1".parse().unwrap()));
        assert!(is_private_ip("fd12::1".parse().unwrap()));
        assert!(is_private_ip("::ffff:169.254.169.254".parse().unwrap()));
        assert!(!is_private_ip("2001:4860:4860::8888".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_private_literals_are_forbidden() {
        for url in [
            "http://127.0.0.1/admin",
            "http://169.254.169.254/latest/meta-data/",
            "http://[::1]:8080/",
        ] {
            let err = check_target(url).await.unwrap_err();
            assert!(matches!(err, AppError::ForbiddenAddress(_)), "{url}");
        }
    }

    #[tokio::test]
    async fn test_hostname_resolving_to_loopback_is_forbidden() {
        let err = check_target("http://localhost:8080/").await.unwrap_err();
        assert!(matches!(err, AppError::ForbiddenAddress(_)));
    }

    #[tokio::test]
    async fn test_bad_scheme_is_invalid() {
        let err = check_target("file:///etc/passwd").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidUrl(_)));
        assert!(err.to_string().contains("not allowed"));
    }

    #[tokio::test]
    async fn test_lookup_failure_is_deferred() {
        // .invalid never resolves; the fetch attempts report the failure.
        assert!(check_target("http://quill-test.invalid/a").await.is_ok());
    }

    #[tokio::test]
    async fn test_resolver_refuses_loopback_names() {
        let err = resolve_public("localhost", 0).await.unwrap_err();
        assert!(matches!(err, GuardError::PrivateAddress { .. }));
    }
}
