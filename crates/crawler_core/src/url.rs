use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// Maps an already-lowercased scheme label. Anything but `http`/`https` is rejected.
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "http" => Some(Scheme::Http),
            "https" => Some(Scheme::Https),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    pub fn is_encrypted(self) -> bool {
        matches!(self, Scheme::Https)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("url is empty")]
    Empty,
    #[error("missing '://' after scheme")]
    MissingSchemeSeparator,
    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("url has no host")]
    EmptyHost,
    #[error("invalid port '{0}'")]
    InvalidPort(String),
    #[error("unexpected character '{0}' after host")]
    UnexpectedCharacter(char),
    #[error("cannot resolve '{reference}' against {base}")]
    Unresolvable { base: String, reference: String },
}

/// An absolute `http`/`https` address split into its components.
///
/// Values are only produced by [`Url::parse`] and [`Url::resolve`], so every
/// `Url` is valid and immutable. The `Display` output is the canonical form
/// used as the frontier's dedup key, and parsing it yields an equal `Url`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Url {
    scheme: Scheme,
    host: String,
    port: u16,
    path: String,
    query: String,
    fragment: String,
}

impl Url {
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        if raw.is_empty() {
            return Err(UrlError::Empty);
        }

        let (label, rest) = raw
            .split_once("://")
            .ok_or(UrlError::MissingSchemeSeparator)?;
        let label = label.to_ascii_lowercase();
        let scheme = Scheme::from_label(&label).ok_or(UrlError::UnsupportedScheme(label))?;

        let authority_end = rest
            .find(|c| matches!(c, '/' | '?' | '#'))
            .unwrap_or(rest.len());
        let (authority, mut remainder) = rest.split_at(authority_end);
        let (host, port) = split_host_port(authority, scheme)?;

        let mut path = String::from("/");
        let mut query = String::new();
        let mut fragment = String::new();

        while let Some(first) = remainder.chars().next() {
            match first {
                '/' => {
                    let end = remainder
                        .find(|c| matches!(c, '?' | '#'))
                        .unwrap_or(remainder.len());
                    path = remainder[..end].to_string();
                    remainder = &remainder[end..];
                }
                '?' => {
                    let body = &remainder[1..];
                    let end = body.find('#').unwrap_or(body.len());
                    query = body[..end].to_string();
                    remainder = &body[end..];
                }
                '#' => {
                    fragment = remainder[1..].to_string();
                    remainder = "";
                }
                other => return Err(UrlError::UnexpectedCharacter(other)),
            }
        }

        Ok(Self {
            scheme,
            host,
            port,
            path,
            query,
            fragment,
        })
    }

    /// Resolves `reference` against `self`.
    ///
    /// Relative references follow RFC 3986 section 5 (`/x`, `x`, `../x`,
    /// `?q`, `#f`, `//host/x`). Absolute and relative references get the same
    /// normalization (dot segments removed, unsafe characters
    /// percent-encoded), so one resource has one canonical key however it is
    /// written. References landing on any other scheme (`mailto:`,
    /// `javascript:`) are errors.
    pub fn resolve(&self, reference: &str) -> Result<Url, UrlError> {
        let reference = reference.trim();
        let unresolvable = || UrlError::Unresolvable {
            base: self.to_string(),
            reference: reference.to_string(),
        };

        if has_supported_scheme(reference) {
            Url::parse(reference)?;
            let absolute = ::url::Url::parse(reference).map_err(|_| unresolvable())?;
            return Url::parse(absolute.as_str());
        }

        let base = ::url::Url::parse(&self.to_string()).map_err(|_| unresolvable())?;
        let joined = base.join(reference).map_err(|_| unresolvable())?;
        Url::parse(joined.as_str())
    }

    pub fn is_valid(&self) -> bool {
        !self.scheme.as_str().is_empty() && !self.host.is_empty()
    }

    pub fn canonical_key(&self) -> String {
        self.to_string()
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Path plus `?query`, as sent on the request line. The fragment never leaves the client.
    pub fn request_target(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if self.port != self.scheme.default_port() {
            write!(f, ":{}", self.port)?;
        }
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        if !self.fragment.is_empty() {
            write!(f, "#{}", self.fragment)?;
        }
        Ok(())
    }
}

impl FromStr for Url {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Url::parse(s)
    }
}

impl Serialize for Url {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn has_supported_scheme(reference: &str) -> bool {
    reference
        .split_once("://")
        .is_some_and(|(label, _)| Scheme::from_label(&label.to_ascii_lowercase()).is_some())
}

fn split_host_port(authority: &str, scheme: Scheme) -> Result<(String, u16), UrlError> {
    let (host, port) = match authority.strip_prefix('[') {
        // Bracketed IPv6 literal: the port, if any, follows the closing bracket.
        Some(inner) => match inner.find(']') {
            Some(close) => {
                let (host, after) = authority.split_at(close + 2);
                match after {
                    "" => (host, None),
                    _ => match after.strip_prefix(':') {
                        Some(port) => (host, Some(port)),
                        None => return Err(UrlError::InvalidPort(after.to_string())),
                    },
                }
            }
            None => (authority, None),
        },
        None => match authority.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        },
    };

    if host.is_empty() {
        return Err(UrlError::EmptyHost);
    }

    let port = match port {
        None | Some("") => scheme.default_port(),
        Some(raw) => raw
            .parse::<u16>()
            .map_err(|_| UrlError::InvalidPort(raw.to_string()))?,
    };

    Ok((host.to_ascii_lowercase(), port))
}
