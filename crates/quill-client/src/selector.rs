use std::sync::Arc;

use quill_core::error::AppError;
use quill_core::models::SelectedContent;
use quill_core::traits::ContentSelector;
use quill_core::validate::host_of;
use scraper::element_ref::Select;
use scraper::{Html, Selector};

use crate::site_rules::{DENY_SELECTORS, GENERIC_SELECTORS, SITE_RULES, SiteRule, host_matches};

/// A candidate block must have more than this many characters (after
/// trimming) to be accepted as the article body.
pub const MIN_BLOCK_CHARS: usize = 100;

/// A selector together with the source it was compiled from, for logging.
struct Compiled {
    source: String,
    selector: Selector,
}

struct CompiledRule {
    domain: String,
    selectors: Vec<Compiled>,
}

struct Selectors {
    deny: Option<Selector>,
    title: Option<Selector>,
    heading: Option<Selector>,
    body: Option<Selector>,
    site_rules: Vec<CompiledRule>,
    generic: Vec<Compiled>,
}

/// Content selector backed by `scraper`.
///
/// Strips navigation and boilerplate, then walks the site-specific selectors
/// for the request host followed by the generic ones. The first selector
/// whose matched text is long enough wins; otherwise the whole `<body>` is
/// used. All selectors are compiled once and shared between clones.
#[derive(Clone)]
pub struct HtmlContentSelector {
    selectors: Arc<Selectors>,
}

impl HtmlContentSelector {
    pub fn new() -> Self {
        Self::with_rules(SITE_RULES)
    }

    /// Use a custom site rule table instead of the built-in one.
    ///
    /// Selectors that fail to parse are skipped with a warning.
    pub fn with_rules(rules: &[SiteRule]) -> Self {
        let site_rules = rules
            .iter()
            .map(|rule| CompiledRule {
                domain: rule.domain.to_string(),
                selectors: compile_all(rule.selectors),
            })
            .collect();

        Self {
            selectors: Arc::new(Selectors {
                deny: compile(&DENY_SELECTORS.join(", ")),
                title: compile("title"),
                heading: compile("h1"),
                body: compile("body"),
                site_rules,
                generic: compile_all(GENERIC_SELECTORS),
            }),
        }
    }
}

impl Default for HtmlContentSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentSelector for HtmlContentSelector {
    fn select(&self, html: &str, url: &str) -> Result<SelectedContent, AppError> {
        let s = &self.selectors;
        let mut document = Html::parse_document(html);

        if let Some(deny) = &s.deny {
            remove_matching(&mut document, deny);
        }

        let host = host_of(url);

        let title = s
            .title
            .as_ref()
            .and_then(|sel| first_text(&document, sel))
            .or_else(|| s.heading.as_ref().and_then(|sel| first_text(&document, sel)))
            .or_else(|| host.clone())
            .unwrap_or_else(|| url.to_string());

        let site_selectors: &[Compiled] = host
            .as_deref()
            .and_then(|h| s.site_rules.iter().find(|rule| host_matches(h, &rule.domain)))
            .map(|rule| rule.selectors.as_slice())
            .unwrap_or_default();

        for candidate in site_selectors.iter().chain(&s.generic) {
            let Some(text) = matched_text(&document, &candidate.selector) else {
                continue;
            };
            let text = text.trim();
            let chars = text.chars().count();
            if chars > MIN_BLOCK_CHARS {
                tracing::debug!(selector = %candidate.source, chars, "Content block selected");
                return Ok(SelectedContent {
                    title,
                    content: text.to_string(),
                });
            }
            tracing::debug!(selector = %candidate.source, chars, "Content block too short");
        }

        tracing::debug!(%url, "No content block qualified, using <body>");
        let content = s
            .body
            .as_ref()
            .and_then(|sel| live(&document, sel).next())
            .map(|body| body.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        Ok(SelectedContent { title, content })
    }
}

fn compile(source: &str) -> Option<Selector> {
    match Selector::parse(source) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!(selector = source, error = ?e, "Skipping unparseable selector");
            None
        }
    }
}

fn compile_all(sources: &[&str]) -> Vec<Compiled> {
    sources
        .iter()
        .filter_map(|&source| {
            compile(source).map(|selector| Compiled {
                source: source.to_string(),
                selector,
            })
        })
        .collect()
}

/// Matches reachable from the root element.
///
/// `Html::select` walks every node in the arena, detached ones included, so
/// all reads after [`remove_matching`] must go through here.
fn live<'a, 'b>(document: &'a Html, selector: &'b Selector) -> Select<'a, 'b> {
    document.root_element().select(selector)
}

/// Detach every subtree matched by `selector`.
fn remove_matching(document: &mut Html, selector: &Selector) {
    let ids: Vec<_> = live(document, selector).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Trimmed text of the first match, if it is non-empty.
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    live(document, selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Text of all matches in document order, one block per line. Matches nested
/// inside an earlier match are skipped. `None` when nothing matches.
fn matched_text(document: &Html, selector: &Selector) -> Option<String> {
    let mut taken = Vec::new();
    let mut blocks: Vec<String> = Vec::new();

    for el in live(document, selector) {
        if el.ancestors().any(|a| taken.contains(&a.id())) {
            continue;
        }
        taken.push(el.id());
        blocks.push(el.text().collect());
    }

    if blocks.is_empty() {
        None
    } else {
        Some(blocks.join("\n"))
    }
}
