//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::{Arc, Mutex};

use crate::error::{AppError, FetchError};
use crate::models::{FetchRequest, RawResponse, SelectedContent};
use crate::traits::{ContentSelector, Fetcher, HttpTransport};

// ---------------------------------------------------------------------------
// MockTransport
// ---------------------------------------------------------------------------

/// Mock transport that replays a scripted list of outcomes.
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Queue of outcomes. Each call pops the first element.
    /// If empty, returns a 200 with a default body.
    outcomes: Arc<Mutex<Vec<Result<RawResponse, FetchError>>>>,
    requests: Arc<Mutex<Vec<FetchRequest>>>,
}

impl MockTransport {
    pub fn with_outcomes(outcomes: Vec<Result<RawResponse, FetchError>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl HttpTransport for MockTransport {
    async fn send(&self, request: &FetchRequest) -> Result<RawResponse, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            Ok(RawResponse {
                status: 200,
                final_url: request.url.clone(),
                body: "<html><body>default</body></html>".to_string(),
            })
        } else {
            outcomes.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that returns a configurable response.
#[derive(Clone)]
pub struct MockFetcher {
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new(html: &str) -> Self {
        Self::with_responses(vec![Ok(html.to_string())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// URLs passed to `fetch`, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(url.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("<html><body>default</body></html>".to_string())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockSelector
// ---------------------------------------------------------------------------

/// Mock selector that ignores the HTML and returns fixed content.
#[derive(Clone)]
pub struct MockSelector {
    result: Arc<Mutex<Option<SelectedContent>>>,
}

impl MockSelector {
    pub fn new(title: &str, content: &str) -> Self {
        Self {
            result: Arc::new(Mutex::new(Some(SelectedContent {
                title: title.to_string(),
                content: content.to_string(),
            }))),
        }
    }

    /// A selector that finds nothing on the page.
    pub fn empty() -> Self {
        Self::new("", "")
    }

    /// A selector that fails outright, e.g. on unparseable markup.
    pub fn failing() -> Self {
        Self {
            result: Arc::new(Mutex::new(None)),
        }
    }
}

impl ContentSelector for MockSelector {
    fn select(&self, _html: &str, _url: &str) -> Result<SelectedContent, AppError> {
        match self.result.lock().unwrap().clone() {
            Some(content) => Ok(content),
            None => Err(AppError::Generic("selector failed".into())),
        }
    }
}
