use crawler_core::{Scheme, Url, UrlError};
use pretty_assertions::assert_eq;

fn parts(url: &Url) -> (Scheme, &str, u16, &str, &str, &str) {
    (
        url.scheme(),
        url.host(),
        url.port(),
        url.path(),
        url.query(),
        url.fragment(),
    )
}

#[test]
fn http_url_with_query_and_fragment() {
    let url = Url::parse("http://example.com/path?query=123#fragment").unwrap();

    assert!(url.is_valid());
    assert_eq!(
        parts(&url),
        (Scheme::Http, "example.com", 80, "/path", "query=123", "fragment")
    );
    assert_eq!(url.to_string(), "http://example.com/path?query=123#fragment");
}

#[test]
fn https_url_with_explicit_port() {
    let url = Url::parse("https://www.example.com:8443/secure?token=abc#section").unwrap();

    assert_eq!(
        parts(&url),
        (Scheme::Https, "www.example.com", 8443, "/secure", "token=abc", "section")
    );
    assert_eq!(
        url.to_string(),
        "https://www.example.com:8443/secure?token=abc#section"
    );
}

#[test]
fn default_ports_follow_scheme_and_are_omitted() {
    let http = Url::parse("http://x/a").unwrap();
    let https = Url::parse("https://x/a").unwrap();
    assert_eq!(http.port(), 80);
    assert_eq!(https.port(), 443);
    assert_eq!(http.to_string(), "http://x/a");
    assert_eq!(https.to_string(), "https://x/a");

    let explicit_default = Url::parse("https://x:443/a").unwrap();
    assert_eq!(explicit_default.to_string(), "https://x/a");
    assert_eq!(explicit_default, https);

    let non_default = Url::parse("http://x:8080/a").unwrap();
    assert_eq!(non_default.to_string(), "http://x:8080/a");
}

#[test]
fn scheme_and_host_are_lowercased_but_path_is_not() {
    let url = Url::parse("HTTPS://Example.COM/About/Us").unwrap();
    assert_eq!(url.scheme(), Scheme::Https);
    assert_eq!(url.host(), "example.com");
    assert_eq!(url.path(), "/About/Us");
}

#[test]
fn missing_path_defaults_to_root() {
    assert_eq!(Url::parse("http://example.com").unwrap().path(), "/");

    let query_only = Url::parse("http://example.com?q=1").unwrap();
    assert_eq!(query_only.path(), "/");
    assert_eq!(query_only.query(), "q=1");
    assert_eq!(query_only.to_string(), "http://example.com/?q=1");

    let fragment_only = Url::parse("http://example.com#top").unwrap();
    assert_eq!(fragment_only.path(), "/");
    assert_eq!(fragment_only.fragment(), "top");
}

#[test]
fn query_keeps_slashes_and_fragment_keeps_hashes() {
    let url = Url::parse("http://e.com/a?next=/b/c#x#y").unwrap();
    assert_eq!(url.path(), "/a");
    assert_eq!(url.query(), "next=/b/c");
    assert_eq!(url.fragment(), "x#y");
}

#[test]
fn invalid_inputs_are_rejected() {
    assert_eq!(
        Url::parse("ftp://x/"),
        Err(UrlError::UnsupportedScheme("ftp".to_string()))
    );
    assert_eq!(
        Url::parse("://x"),
        Err(UrlError::UnsupportedScheme(String::new()))
    );
    assert_eq!(Url::parse(""), Err(UrlError::Empty));
    assert_eq!(
        Url::parse("example.com/index.html"),
        Err(UrlError::MissingSchemeSeparator)
    );
    assert_eq!(Url::parse("http:///path"), Err(UrlError::EmptyHost));
    assert_eq!(
        Url::parse("http://x:99999/"),
        Err(UrlError::InvalidPort("99999".to_string()))
    );
}

#[test]
fn canonical_form_round_trips() {
    let samples = [
        "http://example.com",
        "http://example.com/",
        "HTTP://EXAMPLE.com:80/A?b=C#D",
        "https://example.com:443",
        "https://example.com:8443/x/y/?",
        "http://example.com/#",
        "http://example.com?only=query",
        "http://example.com:/empty-port",
        "http://[::1]:3000/ipv6",
        "https://e.com/a b/c?d e#f g",
    ];

    for raw in samples {
        let parsed = Url::parse(raw).unwrap();
        let canonical = parsed.to_string();
        let reparsed = Url::parse(&canonical).unwrap();
        assert_eq!(reparsed, parsed, "round trip of {raw}");
        assert_eq!(reparsed.to_string(), canonical, "idempotence of {raw}");
    }
}

#[test]
fn canonical_key_matches_display() {
    let url: Url = "https://Example.com:443/x?y#z".parse().unwrap();
    assert_eq!(url.canonical_key(), "https://example.com/x?y#z");
    assert_eq!(url.request_target(), "/x?y");
}

#[test]
fn resolve_keeps_absolute_references() {
    let base = Url::parse("https://e.com/docs/page").unwrap();
    let resolved = base.resolve("http://other.org:8080/x").unwrap();
    assert_eq!(resolved.to_string(), "http://other.org:8080/x");
}

#[test]
fn resolve_normalizes_absolute_and_relative_forms_alike() {
    let base = Url::parse("http://e.com/docs/page").unwrap();
    let absolute = base.resolve("http://e.com/a b/../c").unwrap();
    let relative = base.resolve("/a b/../c").unwrap();

    assert_eq!(absolute.canonical_key(), relative.canonical_key());
    assert_eq!(absolute.request_target(), "/c");

    let spaced = base.resolve("HTTP://E.com:80/x y/./z").unwrap();
    assert_eq!(spaced.to_string(), "http://e.com/x%20y/z");
}

#[test]
fn resolve_keeps_parse_errors_for_absolute_references() {
    let base = Url::parse("http://e.com/").unwrap();
    assert_eq!(
        base.resolve("http://e.com:http/"),
        Err(UrlError::InvalidPort("http".to_string()))
    );
}

#[test]
fn resolve_absolute_path_inherits_scheme_and_host() {
    let base = Url::parse("http://e.com:8080/docs/page?x=1").unwrap();
    assert_eq!(
        base.resolve("/x?q=2#frag").unwrap().to_string(),
        "http://e.com:8080/x?q=2#frag"
    );
}

#[test]
fn resolve_document_relative_references_per_rfc3986() {
    let base = Url::parse("https://e.com/docs/guide/intro.html").unwrap();

    assert_eq!(
        base.resolve("setup.html").unwrap().to_string(),
        "https://e.com/docs/guide/setup.html"
    );
    assert_eq!(
        base.resolve("../api/index.html").unwrap().to_string(),
        "https://e.com/docs/api/index.html"
    );
    assert_eq!(
        base.resolve("?page=2").unwrap().to_string(),
        "https://e.com/docs/guide/intro.html?page=2"
    );
    assert_eq!(
        base.resolve("#install").unwrap().to_string(),
        "https://e.com/docs/guide/intro.html#install"
    );
    assert_eq!(
        base.resolve("//cdn.e.com/lib.js").unwrap().to_string(),
        "https://cdn.e.com/lib.js"
    );
}

#[test]
fn resolve_rejects_non_http_targets() {
    let base = Url::parse("https://e.com/").unwrap();
    assert!(base.resolve("mailto:someone@e.com").is_err());
    assert!(base.resolve("javascript:void(0)").is_err());
    assert_eq!(
        base.resolve("ftp://files.e.com/"),
        Err(UrlError::UnsupportedScheme("ftp".to_string()))
    );
}
