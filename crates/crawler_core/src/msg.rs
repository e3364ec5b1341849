/// Outcome of fetching the URL currently in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Status in `300..400`, with the `Location` header if the response carried one.
    Redirect { status: u16, location: Option<String> },
    /// Status 200; the links the extractor found, in document order.
    Page { links: Vec<String> },
    /// Any other status. Nothing is extracted.
    HttpFailure { status: u16 },
    /// No response could be read (resolution, connect, handshake, IO, size ceiling).
    FetchFailed { reason: String },
    /// Nothing to report; leaves the state, including the URL in flight, untouched.
    NoOp,
}

impl Msg {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Msg::Redirect { .. } => "Redirect",
            Msg::Page { .. } => "Page",
            Msg::HttpFailure { .. } => "HttpFailure",
            Msg::FetchFailed { .. } => "FetchFailed",
            Msg::NoOp => "NoOp",
        }
    }
}
