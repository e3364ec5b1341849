use std::sync::mpsc;

use crawler_core::{
    update, CrawlBudget, CrawlState, CrawlSummary, Discovery, Effect, Msg, Url, UrlError,
};
use engine_logging::{engine_debug, engine_info, engine_warn};
use serde::{Deserialize, Serialize};

use crate::decode::decode_body;
use crate::extract::{Extractor, MarkupExtractor};
use crate::fetch::{Dispatcher, FetchSettings, Fetcher};
use crate::CrawlEvent;

/// Everything the crawl loop needs, loadable from a config file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub budget: CrawlBudget,
    pub fetch: FetchSettings,
}

pub trait CrawlSink {
    fn emit(&self, event: CrawlEvent);
}

pub struct ChannelSink {
    tx: mpsc::Sender<CrawlEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<CrawlEvent>) -> Self {
        Self { tx }
    }
}

impl CrawlSink for ChannelSink {
    fn emit(&self, event: CrawlEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("invalid seed url '{seed}': {source}")]
    InvalidSeed {
        seed: String,
        #[source]
        source: UrlError,
    },
}

/// Drives the frontier: fetch, classify, feed the outcome to `update`, report effects.
pub struct Crawler<F = Dispatcher> {
    fetcher: F,
    extractor: MarkupExtractor,
    budget: CrawlBudget,
}

impl Crawler<Dispatcher> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_fetcher(Dispatcher::new(config.fetch), config.budget)
    }
}

impl<F: Fetcher> Crawler<F> {
    pub fn with_fetcher(fetcher: F, budget: CrawlBudget) -> Self {
        Self {
            fetcher,
            extractor: MarkupExtractor::new(),
            budget,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn budget(&self) -> CrawlBudget {
        self.budget
    }

    /// Crawls breadth-first from `seed` until the queue empties or the budget runs out.
    ///
    /// Only an unparseable seed is an error; every per-URL failure is reported
    /// to the sink and the crawl moves on.
    pub fn crawl(&self, seed: &str, sink: &dyn CrawlSink) -> Result<CrawlSummary, CrawlError> {
        let seed_url = Url::parse(seed).map_err(|source| CrawlError::InvalidSeed {
            seed: seed.to_string(),
            source,
        })?;
        engine_info!("Starting crawl at {seed_url}");

        let mut state = CrawlState::new(seed_url, self.budget);
        while let Some(url) = state.begin_next() {
            let sequence = state.dequeued();
            engine_info!("Crawling [{sequence}]: {url}");
            sink.emit(CrawlEvent::Fetching {
                url: url.clone(),
                sequence,
            });

            let msg = self.visit(&url, sink);
            let redirect_status = match &msg {
                Msg::Redirect { status, .. } => Some(*status),
                _ => None,
            };
            let (next, effects) = update(state, msg);
            state = next;
            for effect in effects {
                report(effect, redirect_status, sink);
            }
        }

        let summary = state.summary();
        if summary.budget_exhausted {
            engine_info!(
                "Reached maximum URL limit ({}). Stopping crawl.",
                self.budget.max_urls
            );
            sink.emit(CrawlEvent::BudgetExhausted {
                max_urls: self.budget.max_urls,
            });
        }
        engine_info!(
            "Crawl finished: {} fetched, {} known, {} still queued",
            summary.dequeued,
            summary.visited,
            summary.queued
        );
        Ok(summary)
    }

    fn visit(&self, url: &Url, sink: &dyn CrawlSink) -> Msg {
        let response = match self.fetcher.fetch(url) {
            Ok(response) => response,
            Err(err) => {
                engine_warn!("Failed to fetch {url}: {err}");
                return Msg::FetchFailed {
                    reason: err.to_string(),
                };
            }
        };

        let header = response.header;
        if header.is_redirect() {
            return Msg::Redirect {
                status: header.status,
                location: header.location,
            };
        }
        if header.status != 200 {
            engine_warn!("Failed to fetch {url} (HTTP {})", header.status);
            return Msg::HttpFailure {
                status: header.status,
            };
        }

        let decoded = decode_body(&response.body, header.content_type.as_deref());
        if decoded.had_errors {
            engine_debug!("{url}: replaced undecodable bytes ({})", decoded.encoding_label);
        }
        let page = self.extractor.extract(url, &decoded.text);
        sink.emit(CrawlEvent::Words {
            url: url.clone(),
            words: page.words,
        });
        Msg::Page { links: page.links }
    }
}

fn report(effect: Effect, redirect_status: Option<u16>, sink: &dyn CrawlSink) {
    match effect {
        Effect::Enqueued {
            url,
            from,
            discovery: Discovery::Redirect,
            redirects,
        } => {
            let status = redirect_status.unwrap_or_default();
            engine_info!("Redirect ({status}) from {from} to {url} [{redirects} in chain]");
            sink.emit(CrawlEvent::Redirected {
                from,
                to: url,
                status,
            });
        }
        Effect::Enqueued {
            url,
            discovery: Discovery::Link,
            ..
        } => engine_debug!("Enqueued {url}"),
        Effect::Dropped { url, reason } => {
            engine_warn!("Dropped {url}: {reason}");
            sink.emit(CrawlEvent::Dropped { url, reason });
        }
        Effect::Extracted {
            url,
            links_found,
            links_enqueued,
        } => engine_debug!("{url}: {links_found} links, {links_enqueued} new"),
    }
}
