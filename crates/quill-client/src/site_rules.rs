//! Known article containers for popular blogging and Q&A platforms.

/// Content selectors for one site, keyed by a hostname fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteRule {
    /// Matched as a substring of the request hostname.
    pub domain: &'static str,
    /// Tried in order before the generic selectors.
    pub selectors: &'static [&'static str],
}

/// Built-in site rules. The first rule whose domain fragment appears in the
/// hostname wins.
pub const SITE_RULES: &[SiteRule] = &[
    SiteRule {
        domain: "zhihu.com",
        selectors: &[".RichText", ".Post-RichText", ".ArticleItem-content", "article"],
    },
    SiteRule {
        domain: "csdn.net",
        selectors: &["#content_views", ".blog-content-box", "article"],
    },
    SiteRule {
        domain: "jianshu.com",
        selectors: &[".article", ".show-content"],
    },
    SiteRule {
        domain: "juejin.cn",
        selectors: &[".article-content", ".markdown-body"],
    },
    SiteRule {
        domain: "segmentfault.com",
        selectors: &[".article__content", ".article-content"],
    },
    SiteRule {
        domain: "cnblogs.com",
        selectors: &["#cnblogs_post_body", ".post-body"],
    },
];

/// Fallback selectors tried after any site-specific ones.
pub const GENERIC_SELECTORS: &[&str] = &[
    "article",
    "[role=\"main\"]",
    "main",
    ".article-content",
    ".post-content",
    ".entry-content",
    ".content",
    "#content",
    ".main-content",
];

/// Subtrees removed before any text is read.
pub const DENY_SELECTORS: &[&str] = &[
    "script",
    "style",
    "nav",
    "header",
    "footer",
    "aside",
    "iframe",
    "noscript",
    ".advertisement",
    ".ads",
    ".sidebar",
    ".menu",
    ".navigation",
];

/// Whether a rule for `domain` applies to `host`. Subdomains match.
pub fn host_matches(host: &str, domain: &str) -> bool {
    !domain.is_empty() && host.contains(domain)
}
