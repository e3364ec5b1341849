use std::collections::{HashSet, VecDeque};

use engine_logging::engine_warn;
use serde::{Deserialize, Serialize};

use crate::view_model::CrawlSummary;
use crate::Url;

pub const DEFAULT_MAX_URLS: usize = 1000;
pub const DEFAULT_MAX_REDIRECTS_PER_CHAIN: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlBudget {
    /// Total URLs dequeued before the crawl stops.
    pub max_urls: usize,
    /// Redirect targets enqueued along one chain of consecutive 3xx responses.
    pub max_redirects_per_chain: u32,
}

impl Default for CrawlBudget {
    fn default() -> Self {
        Self {
            max_urls: DEFAULT_MAX_URLS,
            max_redirects_per_chain: DEFAULT_MAX_REDIRECTS_PER_CHAIN,
        }
    }
}

/// A queued URL together with the length of the redirect chain that led to it.
/// Links found on a page always start a new chain at 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending {
    pub url: Url,
    pub redirects: u32,
}

/// Breadth-first frontier: FIFO queue plus the set of canonical keys ever admitted.
///
/// A key enters `visited` and the queue in the same step (`admit`), so the
/// queue never holds a URL the visited set does not know about, and no key is
/// ever queued twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlState {
    budget: CrawlBudget,
    queue: VecDeque<Pending>,
    visited: HashSet<String>,
    dequeued: usize,
    in_flight: Option<Pending>,
}

impl CrawlState {
    pub fn new(seed: Url, budget: CrawlBudget) -> Self {
        let mut state = Self {
            budget,
            queue: VecDeque::new(),
            visited: HashSet::new(),
            dequeued: 0,
            in_flight: None,
        };
        state.admit(seed, 0);
        state
    }

    /// Pops the oldest pending URL and marks it as being fetched.
    ///
    /// Returns `None` once the queue is empty or `max_urls` URLs have been dequeued.
    pub fn begin_next(&mut self) -> Option<Url> {
        if self.dequeued >= self.budget.max_urls {
            return None;
        }
        let next = self.queue.pop_front()?;
        if let Some(abandoned) = self.in_flight.take() {
            engine_warn!("No outcome recorded for {}", abandoned.url);
        }
        self.dequeued += 1;
        let url = next.url.clone();
        self.in_flight = Some(next);
        Some(url)
    }

    pub fn in_flight(&self) -> Option<&Pending> {
        self.in_flight.as_ref()
    }

    /// True once the URL's canonical key has been admitted, whether or not it was fetched yet.
    pub fn has_seen(&self, url: &Url) -> bool {
        self.visited.contains(&url.canonical_key())
    }

    pub fn budget(&self) -> CrawlBudget {
        self.budget
    }

    pub fn dequeued(&self) -> usize {
        self.dequeued
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn visited(&self) -> usize {
        self.visited.len()
    }

    pub fn is_budget_exhausted(&self) -> bool {
        self.dequeued >= self.budget.max_urls
    }

    pub fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            dequeued: self.dequeued,
            queued: self.queue.len(),
            visited: self.visited.len(),
            budget_exhausted: self.is_budget_exhausted(),
        }
    }

    pub(crate) fn take_in_flight(&mut self) -> Option<Pending> {
        self.in_flight.take()
    }

    /// Inserts the key and enqueues in one step. Returns `false` for a key seen before.
    pub(crate) fn admit(&mut self, url: Url, redirects: u32) -> bool {
        if !self.visited.insert(url.canonical_key()) {
            return false;
        }
        self.queue.push_back(Pending { url, redirects });
        true
    }
}
