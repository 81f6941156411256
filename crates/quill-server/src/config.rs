use quill_core::config::FetchConfig;
use quill_core::error::AppError;

const DEFAULT_PORT: u16 = 3000;

/// Server settings, read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Disables the private-address guard. Only for local development.
    pub allow_private_urls: bool,
    pub fetch: FetchConfig,
}

impl ServerConfig {
    /// - `QUILL_SERVER_PORT` (optional, defaults to 3000)
    /// - `QUILL_ALLOW_PRIVATE_URLS` (optional, `true`/`false`, defaults to false)
    /// - plus the `QUILL_FETCH_*` variables read by [`FetchConfig`]
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<L>(lookup: L) -> Result<Self, AppError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let port = match lookup("QUILL_SERVER_PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw.trim().parse().map_err(|_| {
                AppError::ConfigError(format!("Invalid QUILL_SERVER_PORT '{raw}'"))
            })?,
        };

        let allow_private_urls = match lookup("QUILL_ALLOW_PRIVATE_URLS") {
            None => false,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(AppError::ConfigError(format!(
                        "Invalid QUILL_ALLOW_PRIVATE_URLS '{raw}': expected true or false"
                    )));
                }
            },
        };

        Ok(Self {
            port,
            allow_private_urls,
            fetch: FetchConfig::from_lookup(&lookup)?,
        })
    }
}
