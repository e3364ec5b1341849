use engine_logging::{engine_debug, engine_warn};

use crate::frontier::Pending;
use crate::{CrawlState, Discovery, DropReason, Effect, Msg};

/// Pure update function: applies the outcome of the in-flight URL and returns any effects.
pub fn update(mut state: CrawlState, msg: Msg) -> (CrawlState, Vec<Effect>) {
    if msg == Msg::NoOp {
        return (state, Vec::new());
    }

    let Some(current) = state.take_in_flight() else {
        engine_warn!("{} outcome arrived with no URL in flight", msg.label());
        return (state, Vec::new());
    };

    let effects = match msg {
        Msg::Redirect { status, location } => follow_redirect(&mut state, current, status, location),
        Msg::Page { links } => admit_links(&mut state, current, links),
        Msg::HttpFailure { status } => vec![Effect::Dropped {
            url: current.url.to_string(),
            reason: DropReason::HttpStatus { status },
        }],
        Msg::FetchFailed { reason } => vec![Effect::Dropped {
            url: current.url.to_string(),
            reason: DropReason::FetchFailed { message: reason },
        }],
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn follow_redirect(
    state: &mut CrawlState,
    current: Pending,
    status: u16,
    location: Option<String>,
) -> Vec<Effect> {
    let Some(location) = location.filter(|value| !value.trim().is_empty()) else {
        return vec![Effect::Dropped {
            url: current.url.to_string(),
            reason: DropReason::RedirectWithoutLocation { status },
        }];
    };

    let target = match current.url.resolve(&location) {
        Ok(target) => target,
        Err(err) => {
            return vec![Effect::Dropped {
                url: location,
                reason: DropReason::InvalidUrl {
                    message: err.to_string(),
                },
            }]
        }
    };

    let limit = state.budget().max_redirects_per_chain;
    if current.redirects >= limit {
        return vec![Effect::Dropped {
            url: target.to_string(),
            reason: DropReason::RedirectBudgetExceeded { limit },
        }];
    }

    let redirects = current.redirects + 1;
    if !state.admit(target.clone(), redirects) {
        return vec![Effect::Dropped {
            url: target.to_string(),
            reason: DropReason::AlreadyVisited,
        }];
    }

    vec![Effect::Enqueued {
        url: target,
        from: current.url,
        discovery: Discovery::Redirect,
        redirects,
    }]
}

fn admit_links(state: &mut CrawlState, current: Pending, links: Vec<String>) -> Vec<Effect> {
    let links_found = links.len();
    let mut links_enqueued = 0;
    let mut effects = Vec::new();

    for link in links {
        match current.url.resolve(&link) {
            Ok(url) => {
                if state.admit(url.clone(), 0) {
                    links_enqueued += 1;
                    effects.push(Effect::Enqueued {
                        url,
                        from: current.url.clone(),
                        discovery: Discovery::Link,
                        redirects: 0,
                    });
                } else {
                    engine_debug!("Skipping already visited {}", url);
                }
            }
            Err(err) => effects.push(Effect::Dropped {
                url: link,
                reason: DropReason::InvalidUrl {
                    message: err.to_string(),
                },
            }),
        }
    }

    effects.push(Effect::Extracted {
        url: current.url,
        links_found,
        links_enqueued,
    });
    effects
}
