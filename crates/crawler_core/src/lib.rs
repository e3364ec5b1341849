//! Crawler core: URL model and the pure frontier state machine. No IO.
mod effect;
mod frontier;
mod msg;
mod update;
mod url;
mod view_model;

pub use effect::{Discovery, DropReason, Effect};
pub use frontier::{
    CrawlBudget, CrawlState, Pending, DEFAULT_MAX_REDIRECTS_PER_CHAIN, DEFAULT_MAX_URLS,
};
pub use msg::Msg;
pub use update::update;
pub use self::url::{Scheme, Url, UrlError};
pub use view_model::CrawlSummary;
