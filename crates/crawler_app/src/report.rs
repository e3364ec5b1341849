use std::cell::RefCell;
use std::io::{self, Stderr, Stdout, Write};

use crawler_core::CrawlSummary;
use crawler_engine::{CrawlEvent, CrawlSink};
use engine_logging::engine_warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Writes crawl events for a person (text) or a pipeline (JSON lines).
///
/// In text mode drops go to the error stream; in JSON mode every event is a
/// line on the output stream.
pub(crate) struct ConsoleSink<O: Write, E: Write> {
    format: OutputFormat,
    out: RefCell<O>,
    err: RefCell<E>,
}

impl ConsoleSink<Stdout, Stderr> {
    pub(crate) fn stdio(format: OutputFormat) -> Self {
        Self::new(format, io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleSink<O, E> {
    pub(crate) fn new(format: OutputFormat, out: O, err: E) -> Self {
        Self {
            format,
            out: RefCell::new(out),
            err: RefCell::new(err),
        }
    }

    pub(crate) fn finish(&self, summary: &CrawlSummary) {
        let result = match self.format {
            OutputFormat::Text => writeln!(
                self.out.borrow_mut(),
                "Crawled {} URLs ({} discovered, {} left in queue)",
                summary.dequeued,
                summary.visited,
                summary.queued
            ),
            OutputFormat::Json => summary_json(summary)
                .and_then(|line| writeln!(self.out.borrow_mut(), "{line}")),
        };
        if let Err(err) = result.and_then(|_| self.out.borrow_mut().flush()) {
            engine_warn!("Failed to write crawl summary: {err}");
        }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> (O, E) {
        (self.out.into_inner(), self.err.into_inner())
    }

    fn write_text(&self, event: &CrawlEvent) -> io::Result<()> {
        let mut out = self.out.borrow_mut();
        match event {
            CrawlEvent::Fetching { url, sequence } => writeln!(out, "Crawling [{sequence}]: {url}"),
            CrawlEvent::Words { words, .. } => {
                writeln!(out, "Words ({}): {}", words.len(), words.join(" "))
            }
            CrawlEvent::Redirected { from, to, status } => {
                writeln!(out, "Redirect ({status}) from {from} to {to}")
            }
            CrawlEvent::Dropped { url, reason } => {
                writeln!(self.err.borrow_mut(), "Skipped {url}: {reason}")
            }
            CrawlEvent::BudgetExhausted { max_urls } => {
                writeln!(out, "Reached maximum URL limit ({max_urls}). Stopping crawl.")
            }
        }
    }

    fn write_json(&self, event: &CrawlEvent) -> io::Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(self.out.borrow_mut(), "{line}")
    }
}

impl<O: Write, E: Write> CrawlSink for ConsoleSink<O, E> {
    fn emit(&self, event: CrawlEvent) {
        let result = match self.format {
            OutputFormat::Text => self.write_text(&event),
            OutputFormat::Json => self.write_json(&event),
        };
        if let Err(err) = result {
            engine_warn!("Failed to write crawl event: {err}");
        }
    }
}

fn summary_json(summary: &CrawlSummary) -> io::Result<String> {
    let mut value = serde_json::to_value(summary)?;
    if let Some(fields) = value.as_object_mut() {
        fields.insert("event".to_string(), "summary".into());
    }
    Ok(value.to_string())
}
