/// True for `a` alone or `a` followed by whitespace, in either case.
pub fn is_anchor_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!(chars.next(), Some('a' | 'A')) && chars.next().map_or(true, char::is_whitespace)
}

/// First quoted, non-empty `href` value in a tag body.
pub fn find_href(tag: &str) -> Option<&str> {
    let lower = tag.to_ascii_lowercase();
    let mut from = 0;
    while let Some(pos) = lower[from..].find("href") {
        let after = from + pos + "href".len();
        if let Some(value) = quoted_value(&tag[after..]) {
            return Some(value);
        }
        from = after;
    }
    None
}

/// Link target of an anchor tag, if it has one.
pub fn anchor_href(tag: &str) -> Option<&str> {
    if is_anchor_tag(tag) {
        find_href(tag)
    } else {
        None
    }
}

fn quoted_value(rest: &str) -> Option<&str> {
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|ch| matches!(ch, '"' | '\''))?;
    let body = &rest[1..];
    let value = &body[..body.find(quote)?];
    (!value.is_empty()).then_some(value)
}
