pub mod fetcher;
mod guard;
pub mod selector;
pub mod site_rules;
pub mod transport;

pub use fetcher::ReqwestFetcher;
pub use guard::GuardError;
pub use selector::HtmlContentSelector;
pub use site_rules::{SITE_RULES, SiteRule};
pub use transport::ReqwestTransport;
