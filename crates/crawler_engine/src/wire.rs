//! HTTP/1.1 framing for the dispatcher: the request line it sends and the
//! header/body split of what comes back.

use std::io::{self, Read};

use crawler_core::Url;

use crate::fetch::FetchSettings;
use crate::{FailureKind, FetchError, Response, ResponseHeader};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

pub(crate) fn build_request(url: &Url) -> String {
    format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        url.request_target(),
        url.host()
    )
}

/// Reads until the peer closes. The header terminator may straddle reads.
pub(crate) fn read_response<R: Read>(
    reader: &mut R,
    settings: &FetchSettings,
) -> Result<Response, FetchError> {
    let max_bytes = settings.max_body_bytes;
    let mut chunk = vec![0u8; settings.read_chunk_bytes.max(1)];
    let mut head: Vec<u8> = Vec::new();
    let mut body: Vec<u8> = Vec::new();
    let mut header: Option<ResponseHeader> = None;

    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            // TLS peers frequently close without close_notify.
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(map_read_error(err)),
        };
        let data = &chunk[..read];

        if header.is_some() {
            body.extend_from_slice(data);
        } else {
            let search_from = head.len().saturating_sub(HEADER_TERMINATOR.len() - 1);
            head.extend_from_slice(data);
            match find(&head[search_from..], HEADER_TERMINATOR) {
                Some(pos) => {
                    let end = search_from + pos + HEADER_TERMINATOR.len();
                    body.extend_from_slice(&head[end..]);
                    head.truncate(end);
                    header = Some(parse_header(&String::from_utf8_lossy(&head)));
                }
                None if head.len() as u64 > max_bytes => {
                    return Err(too_large(max_bytes, head.len()));
                }
                None => {}
            }
        }

        if body.len() as u64 > max_bytes {
            return Err(too_large(max_bytes, body.len()));
        }
    }

    match header {
        Some(header) => Ok(Response { header, body }),
        None => Err(FetchError::new(
            FailureKind::MalformedResponse,
            format!(
                "connection closed after {} bytes without end of headers",
                head.len()
            ),
        )),
    }
}

/// Parses the header block. Only the status line and three fields are kept.
pub(crate) fn parse_header(text: &str) -> ResponseHeader {
    let mut lines = text.lines();
    let status = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|token| token.parse::<u16>().ok())
        .unwrap_or(0);

    let mut header = ResponseHeader {
        status,
        ..ResponseHeader::default()
    };

    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some(value) = field_value(line, "Content-Type") {
            header.content_type = non_empty(value);
        } else if let Some(value) = field_value(line, "Content-Length") {
            header.content_length = value.parse::<u64>().ok();
        } else if let Some(value) = field_value(line, "Location") {
            header.location = non_empty(value);
        }
    }

    header
}

/// `Name: value` with the name matched as an exact, case-sensitive prefix.
fn field_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    line.strip_prefix(name)?.strip_prefix(':').map(str::trim)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn too_large(max_bytes: u64, actual: usize) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: actual as u64,
        },
        "response too large",
    )
}

fn map_read_error(err: io::Error) -> FetchError {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
            FetchError::new(FailureKind::Timeout, err.to_string())
        }
        _ => FetchError::new(FailureKind::ReadFailed, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::{self, Read};

    use crawler_core::Url;

    use super::{build_request, parse_header, read_response};
    use crate::fetch::FetchSettings;
    use crate::FailureKind;

    /// Hands out one scripted slice per `read` call, then EOF.
    struct ScriptedReader {
        reads: VecDeque<Result<Vec<u8>, io::ErrorKind>>,
    }

    impl ScriptedReader {
        fn new(parts: &[&[u8]]) -> Self {
            Self {
                reads: parts.iter().map(|part| Ok(part.to_vec())).collect(),
            }
        }

        fn then_error(mut self, kind: io::ErrorKind) -> Self {
            self.reads.push_back(Err(kind));
            self
        }
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.reads.pop_front() {
                None => Ok(0),
                Some(Err(kind)) => Err(io::Error::from(kind)),
                Some(Ok(mut part)) => {
                    let n = part.len().min(buf.len());
                    buf[..n].copy_from_slice(&part[..n]);
                    if n < part.len() {
                        part.drain(..n);
                        self.reads.push_front(Ok(part));
                    }
                    Ok(n)
                }
            }
        }
    }

    fn settings() -> FetchSettings {
        FetchSettings::default()
    }

    #[test]
    fn request_names_path_query_and_host_only() {
        let url = Url::parse("https://Example.com:8443/a/b?c=d#frag").unwrap();
        assert_eq!(
            build_request(&url),
            "GET /a/b?c=d HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn header_boundary_split_across_reads() {
        let mut reader = ScriptedReader::new(&[
            b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r",
            b"\n\r",
            b"\n<html>",
            b"</html>",
        ]);
        let response = read_response(&mut reader, &settings()).unwrap();

        assert_eq!(response.header.status, 200);
        assert_eq!(response.header.content_type.as_deref(), Some("text/html"));
        assert_eq!(response.body, b"<html></html>");
    }

    #[test]
    fn small_chunks_still_find_the_boundary() {
        let raw: &[u8] = b"HTTP/1.1 301 Moved\r\nLocation: /next\r\n\r\nbody";
        let mut reader = ScriptedReader::new(&[raw]);
        let settings = FetchSettings {
            read_chunk_bytes: 3,
            ..FetchSettings::default()
        };
        let response = read_response(&mut reader, &settings).unwrap();

        assert_eq!(response.header.status, 301);
        assert_eq!(response.header.location.as_deref(), Some("/next"));
        assert_eq!(response.body, b"body");
    }

    #[test]
    fn body_over_ceiling_is_an_error_not_a_truncation() {
        let mut reader = ScriptedReader::new(&[b"HTTP/1.1 200 OK\r\n\r\n0123", b"456789AB"]);
        let settings = FetchSettings {
            max_body_bytes: 10,
            ..FetchSettings::default()
        };
        let err = read_response(&mut reader, &settings).unwrap_err();
        assert_eq!(
            err.kind,
            FailureKind::TooLarge {
                max_bytes: 10,
                actual: 12
            }
        );
    }

    #[test]
    fn body_exactly_at_ceiling_is_accepted() {
        let mut reader = ScriptedReader::new(&[b"HTTP/1.1 200 OK\r\n\r\n0123456789"]);
        let settings = FetchSettings {
            max_body_bytes: 10,
            ..FetchSettings::default()
        };
        assert_eq!(read_response(&mut reader, &settings).unwrap().body.len(), 10);
    }

    #[test]
    fn close_before_headers_end_is_malformed() {
        let mut reader = ScriptedReader::new(&[b"HTTP/1.1 200 OK\r\nContent-"]);
        let err = read_response(&mut reader, &settings()).unwrap_err();
        assert_eq!(err.kind, FailureKind::MalformedResponse);
    }

    #[test]
    fn tls_style_unexpected_eof_ends_the_body() {
        let mut reader = ScriptedReader::new(&[b"HTTP/1.1 200 OK\r\n\r\nhello"])
            .then_error(io::ErrorKind::UnexpectedEof);
        let response = read_response(&mut reader, &settings()).unwrap();
        assert_eq!(response.body, b"hello");
    }

    #[test]
    fn read_timeout_is_reported_as_timeout() {
        let mut reader = ScriptedReader::new(&[b"HTTP/1.1 200 OK\r\n\r\nhel"])
            .then_error(io::ErrorKind::WouldBlock);
        let err = read_response(&mut reader, &settings()).unwrap_err();
        assert_eq!(err.kind, FailureKind::Timeout);
    }

    #[test]
    fn reset_connection_is_a_read_failure() {
        let mut reader = ScriptedReader::new(&[b"HTTP/1.1 200 OK\r\n"])
            .then_error(io::ErrorKind::ConnectionReset);
        let err = read_response(&mut reader, &settings()).unwrap_err();
        assert_eq!(err.kind, FailureKind::ReadFailed);
    }

    #[test]
    fn header_fields_are_trimmed() {
        let header = parse_header(
            "HTTP/1.1 302 Found\r\nContent-Type:   text/html; charset=utf-8  \r\n\
             Content-Length: 42\r\nLocation:\t https://e.com/next \r\nX-Location: ignored\r\n\r\n",
        );
        assert_eq!(header.status, 302);
        assert_eq!(
            header.content_type.as_deref(),
            Some("text/html; charset=utf-8")
        );
        assert_eq!(header.content_length, Some(42));
        assert_eq!(header.location.as_deref(), Some("https://e.com/next"));
    }

    #[test]
    fn field_names_match_case_sensitively() {
        let header = parse_header(
            "HTTP/1.1 301 Moved\r\nlocation: /x\r\ncontent-type: text/html\r\n\
             CONTENT-LENGTH: 7\r\n\r\n",
        );
        assert_eq!(header.status, 301);
        assert_eq!(header.location, None);
        assert_eq!(header.content_type, None);
        assert_eq!(header.content_length, None);
    }

    #[test]
    fn unparseable_status_and_missing_fields() {
        let header = parse_header("garbage\r\nContent-Length: many\r\nLocation:   \r\n\r\n");
        assert_eq!(header.status, 0);
        assert_eq!(header.content_type, None);
        assert_eq!(header.content_length, None);
        assert_eq!(header.location, None);
    }
}
