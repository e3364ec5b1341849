use crawler_core::Url;
use engine_logging::engine_debug;

use crate::links::anchor_href;
use crate::markup::{decode_entities, MarkupEvent, MarkupScanner};
use crate::token::{AlphanumericTokenizer, Tokenizer};
use crate::ParsedPage;

pub trait Extractor: Send + Sync {
    fn extract(&self, base: &Url, body: &str) -> ParsedPage;
}

/// Single pass over the body: visible text feeds the tokenizer, anchor tags
/// feed the link list. Links that cannot be resolved against the base are
/// left out.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupExtractor<T = AlphanumericTokenizer> {
    tokenizer: T,
}

impl MarkupExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Tokenizer> MarkupExtractor<T> {
    pub fn with_tokenizer(tokenizer: T) -> Self {
        Self { tokenizer }
    }
}

impl<T: Tokenizer> Extractor for MarkupExtractor<T> {
    fn extract(&self, base: &Url, body: &str) -> ParsedPage {
        let mut scanner = MarkupScanner::new();
        let mut text = String::with_capacity(body.len());
        let mut links = Vec::new();

        for ch in body.chars() {
            match scanner.feed(ch) {
                Some(MarkupEvent::Text(ch)) => text.push(ch),
                Some(MarkupEvent::Separator) => text.push(' '),
                Some(MarkupEvent::Tag(tag)) => {
                    if let Some(href) = anchor_href(&tag) {
                        match base.resolve(href) {
                            Ok(link) => links.push(link.to_string()),
                            Err(err) => engine_debug!("Skipping link {href:?} on {base}: {err}"),
                        }
                    }
                }
                None => {}
            }
        }

        ParsedPage {
            url: base.to_string(),
            words: self.tokenizer.tokenize(&decode_entities(&text)),
            links,
        }
    }
}
