use serde::Serialize;

/// Counters describing where a crawl stands; returned when the crawl ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CrawlSummary {
    pub dequeued: usize,
    pub queued: usize,
    pub visited: usize,
    pub budget_exhausted: bool,
}
