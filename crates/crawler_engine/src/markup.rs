//! Character-level scanner that separates visible text from tags.
//!
//! Two states only. `<` always opens a tag (discarding any half-read one),
//! `>` closes it and hands the tag's inner text to the caller. Outside a tag
//! `>` is ordinary text.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Text,
    InTag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    /// A visible character.
    Text(char),
    /// A tag boundary; text on either side must not run together.
    Separator,
    /// Inner text of a completed tag, without the angle brackets.
    Tag(String),
}

#[derive(Debug, Default)]
pub struct MarkupScanner {
    state: ScanState,
    tag: String,
}

impl MarkupScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn feed(&mut self, ch: char) -> Option<MarkupEvent> {
        match (self.state, ch) {
            (ScanState::Text, '<') => {
                self.state = ScanState::InTag;
                self.tag.clear();
                Some(MarkupEvent::Separator)
            }
            (ScanState::Text, ch) => Some(MarkupEvent::Text(ch)),
            (ScanState::InTag, '<') => {
                self.tag.clear();
                None
            }
            (ScanState::InTag, '>') => {
                self.state = ScanState::Text;
                Some(MarkupEvent::Tag(std::mem::take(&mut self.tag)))
            }
            (ScanState::InTag, ch) => {
                self.tag.push(ch);
                None
            }
        }
    }
}

/// Replaces `&lt;`, `&gt;` and `&amp;`. Other references pass through untouched.
pub fn decode_entities(text: &str) -> String {
    const ENTITIES: [(&str, char); 3] = [("&lt;", '<'), ("&gt;", '>'), ("&amp;", '&')];

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES
            .iter()
            .find(|(entity, _)| rest.starts_with(entity))
        {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
