use std::fmt;

use crawler_core::{DropReason, Url};
use serde::Serialize;

/// Header fields the crawler cares about, parsed once from the raw header block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseHeader {
    /// Status code from the status line; 0 when it could not be parsed.
    pub status: u16,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub location: Option<String>,
}

impl ResponseHeader {
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub header: ResponseHeader,
    /// Everything after the blank line, read until the peer closed. Chunk framing is kept verbatim.
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedPage {
    pub url: String,
    pub words: Vec<String>,
    pub links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    ResolutionFailed,
    ConnectFailed,
    HandshakeFailed,
    SendFailed,
    ReadFailed,
    Timeout,
    MalformedResponse,
    TooLarge { max_bytes: u64, actual: u64 },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::ResolutionFailed => write!(f, "name resolution failed"),
            FailureKind::ConnectFailed => write!(f, "connect failed"),
            FailureKind::HandshakeFailed => write!(f, "tls handshake failed"),
            FailureKind::SendFailed => write!(f, "sending request failed"),
            FailureKind::ReadFailed => write!(f, "reading response failed"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, read {actual})")
            }
        }
    }
}

/// Observable progress of a crawl, in the order things happen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CrawlEvent {
    Fetching { url: Url, sequence: usize },
    Words { url: Url, words: Vec<String> },
    Redirected { from: Url, to: Url, status: u16 },
    Dropped { url: String, reason: DropReason },
    BudgetExhausted { max_urls: usize },
}
