use thiserror::Error;

/// Failure of a single fetch, after HTTP status classification.
///
/// Every variant is retried by the fetcher up to the retry ceiling; the one
/// surfaced to callers is the last one observed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The attempt hit the hard request timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// HTTP 403, bot-detected or login-gated.
    #[error("HTTP 403 Forbidden")]
    Blocked,

    /// HTTP 429.
    #[error("HTTP 429 Too Many Requests")]
    RateLimited,

    /// HTTP 404.
    #[error("HTTP 404 Not Found")]
    NotFound,

    /// HTTP 5xx from the origin.
    #[error("HTTP {0} from origin server")]
    OriginServerError(u16),

    /// Any other non-success status or transport failure.
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Classify a non-success HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            403 => FetchError::Blocked,
            429 => FetchError::RateLimited,
            404 => FetchError::NotFound,
            500..=599 => FetchError::OriginServerError(status),
            _ => FetchError::Other(format!("HTTP {status}")),
        }
    }

    /// Blocking responses (403/429) are the ones identity rotation targets.
    pub fn is_blocking(&self) -> bool {
        matches!(self, FetchError::Blocked | FetchError::RateLimited)
    }
}

/// Application-wide error types for Quill.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or non-HTTP(S) URL. Never retried.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Well-formed URL whose target is a private or reserved address.
    /// Never retried.
    #[error("Address not allowed: {0}")]
    ForbiddenAddress(String),

    /// Network/HTTP failure after the retry budget was spent.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The page was fetched but no sufficiently long content block was found.
    #[error("Insufficient content: extracted {chars} characters, need at least {min}")]
    InsufficientContent { chars: usize, min: usize },

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

const BLOCKED_REMEDIATION: &[&str] = &[
    "Copy the article text and paste it directly",
    "Save the page or take a screenshot and upload it as a file",
];

const INSUFFICIENT_REMEDIATION: &[&str] = &[
    "Copy the article text and paste it directly",
    "Download the article as a file and upload it",
];

impl AppError {
    /// Returns true for failures caused by the request or the target page,
    /// as opposed to faults in this service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidUrl(_)
                | AppError::ForbiddenAddress(_)
                | AppError::Fetch(_)
                | AppError::InsufficientContent { .. }
        )
    }

    /// Short machine-readable label for API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidUrl(_) => "invalid_url",
            AppError::ForbiddenAddress(_) => "forbidden_address",
            AppError::Fetch(FetchError::Timeout(_)) => "timeout",
            AppError::Fetch(FetchError::Blocked) => "blocked",
            AppError::Fetch(FetchError::RateLimited) => "rate_limited",
            AppError::Fetch(FetchError::NotFound) => "not_found",
            AppError::Fetch(FetchError::OriginServerError(_)) => "origin_server_error",
            AppError::Fetch(FetchError::Other(_)) => "fetch_failed",
            AppError::InsufficientContent { .. } => "insufficient_content",
            AppError::ConfigError(_) => "config_error",
            AppError::Generic(_) => "internal_error",
        }
    }

    /// Human-readable, remediation-oriented message meant to be shown verbatim.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidUrl(_) => "Invalid URL format".to_string(),
            AppError::ForbiddenAddress(_) => "This address is not allowed".to_string(),
            AppError::Fetch(FetchError::Blocked) => "Access denied (HTTP 403). The site may:\n\
                 1. Have detected automated access\n\
                 2. Require a login to view this page\n\
                 3. Restrict crawler access\n\
                 Suggestion: copy the article text and paste it directly, or save the page and upload it as a file"
                .to_string(),
            AppError::Fetch(FetchError::RateLimited) => {
                "Too many requests (HTTP 429). Please retry in 1-2 minutes".to_string()
            }
            AppError::Fetch(FetchError::NotFound) => {
                "Page not found (HTTP 404). Please check that the URL is correct".to_string()
            }
            AppError::Fetch(FetchError::OriginServerError(status)) => format!(
                "The target site's server returned an error (HTTP {status}). Please retry later"
            ),
            AppError::Fetch(FetchError::Timeout(_)) => {
                "The request timed out. Please check your network connection or retry later"
                    .to_string()
            }
            AppError::Fetch(FetchError::Other(msg)) => format!("Failed to fetch content: {msg}"),
            AppError::InsufficientContent { .. } => {
                "Could not extract enough content from this page. Possible causes:\n\
                 1. The site requires a login\n\
                 2. The site has strict anti-bot protection\n\
                 3. The URL is not an article page\n\
                 Suggestion: copy the article text and paste it directly, or download it as a file and upload it"
                    .to_string()
            }
            other => other.to_string(),
        }
    }

    /// Structured remediation steps, when the failure has a manual workaround.
    pub fn remediation(&self) -> &'static [&'static str] {
        match self {
            AppError::Fetch(FetchError::Blocked) => BLOCKED_REMEDIATION,
            AppError::InsufficientContent { .. } => INSUFFICIENT_REMEDIATION,
            _ => &[],
        }
    }
}
