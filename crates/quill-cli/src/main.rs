use std::io::Read;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quill_client::{HtmlContentSelector, ReqwestFetcher};
use quill_core::identity::SequenceIdentity;
use quill_core::traits::IdentityProvider;
use quill_core::{ArticleService, ExtractionResult, FetchConfig, count_words, normalize};

#[derive(Parser)]
#[command(name = "quill", version, about = "Fetch web articles as clean plain text")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct FetchOpts {
    /// Attempts per URL
    #[arg(long, env = "QUILL_FETCH_MAX_RETRIES")]
    max_retries: Option<u32>,

    /// Per-attempt timeout in seconds
    #[arg(long, env = "QUILL_FETCH_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Pin the User-Agent instead of rotating through built-in browser identities
    #[arg(long, env = "QUILL_USER_AGENT")]
    user_agent: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one article and print it
    Fetch {
        /// Article URL
        #[arg(short, long)]
        url: String,

        /// Print the full result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        #[command(flatten)]
        opts: FetchOpts,
    },

    /// Fetch a batch of URLs one by one and report which ones work
    Probe {
        /// URLs to try
        #[arg(required = true)]
        urls: Vec<String>,

        /// Pause between requests, in milliseconds
        #[arg(long, default_value_t = 2000)]
        delay_ms: u64,

        #[command(flatten)]
        opts: FetchOpts,
    },

    /// Normalize text and count its words
    Count {
        /// Read from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("quill=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch { url, json, opts } => {
            let config = fetch_config(&opts)?;
            match opts.user_agent {
                Some(ua) => {
                    let fetcher = build_fetcher(&config)?.with_identity(SequenceIdentity::fixed(ua));
                    cmd_fetch(fetcher, &url, json).await?;
                }
                None => cmd_fetch(build_fetcher(&config)?, &url, json).await?,
            }
        }
        Commands::Probe {
            urls,
            delay_ms,
            opts,
        } => {
            let config = fetch_config(&opts)?;
            let delay = Duration::from_millis(delay_ms);
            match opts.user_agent {
                Some(ua) => {
                    let fetcher = build_fetcher(&config)?.with_identity(SequenceIdentity::fixed(ua));
                    cmd_probe(fetcher, &urls, delay).await;
                }
                None => cmd_probe(build_fetcher(&config)?, &urls, delay).await,
            }
        }
        Commands::Count { file } => cmd_count(file.as_ref())?,
    }

    Ok(())
}

/// Environment configuration with command-line overrides applied.
fn fetch_config(opts: &FetchOpts) -> Result<FetchConfig> {
    let mut config = FetchConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    if let Some(n) = opts.max_retries {
        anyhow::ensure!(n >= 1, "--max-retries must be at least 1");
        config = config.with_max_retries(n);
    }
    if let Some(secs) = opts.timeout_secs {
        anyhow::ensure!(secs >= 1, "--timeout-secs must be at least 1");
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

/// The CLI runs on the user's own machine, so local addresses are allowed.
fn build_fetcher(config: &FetchConfig) -> Result<ReqwestFetcher> {
    ReqwestFetcher::from_config(config)
        .and_then(ReqwestFetcher::allow_private_urls)
        .context("Failed to create HTTP client")
}

async fn cmd_fetch<I: IdentityProvider>(
    fetcher: ReqwestFetcher<I>,
    url: &str,
    json: bool,
) -> Result<()> {
    let service = ArticleService::new(fetcher, HtmlContentSelector::new());
    let result = service
        .fetch_content(url)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}\n", result.title);
        println!("{}", result.content);
        eprintln!("\n{} words", result.word_count);
    }

    Ok(())
}

struct ProbeOutcome {
    url: String,
    result: Result<ExtractionResult, String>,
    elapsed: Duration,
}

async fn cmd_probe<I: IdentityProvider>(fetcher: ReqwestFetcher<I>, urls: &[String], delay: Duration) {
    let service = ArticleService::new(fetcher, HtmlContentSelector::new());
    let mut outcomes = Vec::with_capacity(urls.len());

    for (i, url) in urls.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        println!("\n[{}/{}] {url}", i + 1, urls.len());
        let start = Instant::now();
        let result = service
            .fetch_content(url)
            .await
            .map_err(|e| e.user_message());
        let elapsed = start.elapsed();

        match &result {
            Ok(article) => {
                println!("  OK in {}ms", elapsed.as_millis());
                println!("  title:   {}", article.title);
                println!("  words:   {}", article.word_count);
                println!("  chars:   {}", article.content.chars().count());
                println!("  preview: {}...", preview(&article.content, 100));
            }
            Err(message) => {
                println!("  FAILED in {}ms", elapsed.as_millis());
                for line in message.lines() {
                    println!("  {line}");
                }
            }
        }

        outcomes.push(ProbeOutcome {
            url: url.clone(),
            result,
            elapsed,
        });
    }

    let (ok, total) = tally(&outcomes);
    println!("\nSummary");
    println!("  total:        {total}");
    println!("  succeeded:    {ok}");
    println!("  failed:       {}", total - ok);
    println!("  success rate: {:.1}%", success_rate(ok, total));
    println!();
    for (i, outcome) in outcomes.iter().enumerate() {
        match &outcome.result {
            Ok(_) => println!(
                "  {}. OK     {} ({}ms)",
                i + 1,
                outcome.url,
                outcome.elapsed.as_millis()
            ),
            Err(message) => println!(
                "  {}. FAILED {} ({})",
                i + 1,
                outcome.url,
                message.lines().next().unwrap_or_default()
            ),
        }
    }
}

fn cmd_count(file: Option<&PathBuf>) -> Result<()> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let text = normalize(&raw);
    println!("chars: {}", text.chars().count());
    println!("words: {}", count_words(&text));
    Ok(())
}

/// First `max_chars` characters of `text`, never splitting a code point.
fn preview(text: &str, max_chars: usize) -> String {
    text.chars()
        .take(max_chars)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

fn tally(outcomes: &[ProbeOutcome]) -> (usize, usize) {
    let ok = outcomes.iter().filter(|o| o.result.is_ok()).count();
    (ok, outcomes.len())
}

fn success_rate(ok: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        ok as f64 * 100.0 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(ok: bool) -> ProbeOutcome {
        ProbeOutcome {
            url: "https://example.com".into(),
            result: if ok {
                Ok(ExtractionResult {
                    url: "https://example.com".into(),
                    title: "t".into(),
                    content: "c".into(),
                    word_count: 1,
                })
            } else {
                Err("Page not found (HTTP 404)".into())
            },
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        assert_eq!(preview("中文内容很长", 2), "中文");
        assert_eq!(preview("line one\nline two", 100), "line one line two");
    }

    #[test]
    fn test_tally_and_rate() {
        let outcomes = vec![outcome(true), outcome(false), outcome(true), outcome(true)];
        assert_eq!(tally(&outcomes), (3, 4));
        assert_eq!(format!("{:.1}", success_rate(3, 4)), "75.0");
        assert_eq!(success_rate(0, 0), 0.0);
    }

    #[test]
    fn test_cli_parses_probe_defaults() {
        let cli = Cli::try_parse_from(["quill", "probe", "https://a.example", "https://b.example"])
            .unwrap();
        match cli.command {
            Commands::Probe { urls, delay_ms, .. } => {
                assert_eq!(urls.len(), 2);
                assert_eq!(delay_ms, 2000);
            }
            _ => panic!("expected probe"),
        }
    }

    #[test]
    fn test_fetch_config_rejects_zero_retries() {
        let opts = FetchOpts {
            max_retries: Some(0),
            timeout_secs: None,
            user_agent: None,
        };
        assert!(fetch_config(&opts).is_err());
    }
}
