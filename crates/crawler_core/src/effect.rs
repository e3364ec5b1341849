use std::fmt;

use serde::Serialize;

use crate::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Discovery {
    Link,
    Redirect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropReason {
    InvalidUrl { message: String },
    FetchFailed { message: String },
    HttpStatus { status: u16 },
    RedirectWithoutLocation { status: u16 },
    RedirectBudgetExceeded { limit: u32 },
    AlreadyVisited,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::InvalidUrl { message } => write!(f, "invalid url: {message}"),
            DropReason::FetchFailed { message } => write!(f, "fetch failed: {message}"),
            DropReason::HttpStatus { status } => write!(f, "http status {status}"),
            DropReason::RedirectWithoutLocation { status } => {
                write!(f, "redirect {status} without Location")
            }
            DropReason::RedirectBudgetExceeded { limit } => {
                write!(f, "redirect limit of {limit} reached")
            }
            DropReason::AlreadyVisited => write!(f, "already visited"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// A new canonical key was admitted to the frontier.
    Enqueued {
        url: Url,
        from: Url,
        discovery: Discovery,
        redirects: u32,
    },
    /// `url` will not be (re)visited. For invalid references it is the raw text.
    Dropped { url: String, reason: DropReason },
    /// A 200 page was processed; its links have been offered to the frontier.
    Extracted {
        url: Url,
        links_found: usize,
        links_enqueued: usize,
    },
}
