//! Crawler engine: socket fetching, content extraction and the crawl loop.
mod decode;
mod engine;
mod extract;
mod fetch;
mod links;
mod markup;
mod token;
mod types;
mod wire;

pub use decode::{decode_body, DecodedBody};
pub use engine::{ChannelSink, CrawlError, CrawlSink, Crawler, EngineConfig};
pub use extract::{Extractor, MarkupExtractor};
pub use fetch::{
    Dispatcher, FetchSettings, Fetcher, DEFAULT_MAX_BODY_BYTES, DEFAULT_READ_CHUNK_BYTES,
};
pub use links::{anchor_href, find_href, is_anchor_tag};
pub use markup::{decode_entities, MarkupEvent, MarkupScanner, ScanState};
pub use token::{AlphanumericTokenizer, Tokenizer};
pub use types::{CrawlEvent, FailureKind, FetchError, ParsedPage, Response, ResponseHeader};
