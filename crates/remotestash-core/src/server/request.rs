//! Reading one HTTP/1.x request off a stream.

use percent_encoding::percent_decode_str;
use std::io::{self, BufRead, BufReader, Read, Write};
use url::Url;

/// Longest accepted request or header line, in bytes.
const MAX_LINE: u64 = 8 * 1024;
/// Most header lines accepted per request.
const MAX_HEADERS: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("connection closed before a request was received")]
    Closed,
    #[error("malformed request line: {0:?}")]
    BadRequestLine(String),
    #[error("malformed header line: {0:?}")]
    BadHeader(String),
    #[error("request header section too large")]
    HeadersTooLarge,
    #[error("invalid Content-Length: {0:?}")]
    BadContentLength(String),
    #[error("body of {size} bytes exceeds limit of {limit}")]
    BodyTooLarge { size: u64, limit: u64 },
    #[error("invalid request target: {0:?}")]
    BadTarget(String),
    #[error("connection closed after {received} of {expected} body bytes")]
    TruncatedBody { expected: u64, received: u64 },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RequestError {
    /// Status to answer with, or None when the peer is gone and nothing should be sent.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Closed | RequestError::Io(_) | RequestError::TruncatedBody { .. } => None,
            RequestError::BodyTooLarge { .. } => Some(413),
            RequestError::HeadersTooLarge => Some(431),
            _ => Some(400),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    /// Raw request target, e.g. `/push?debug=1`.
    pub target: String,
    pub version: String,
    /// Percent-decoded path of the target, leading slashes collapsed to one.
    pub path: String,
    pub query: Option<String>,
    pub query_pairs: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Read a full request. Answers `Expect: 100-continue` before reading the body.
    pub fn read_from<S: Read + Write>(
        reader: &mut BufReader<S>,
        max_body: u64,
    ) -> Result<Self, RequestError> {
        let mut request = Self::read_head(reader)?;
        let Some(len) = request.content_length()? else {
            return Ok(request);
        };
        if len > max_body {
            return Err(RequestError::BodyTooLarge {
                size: len,
                limit: max_body,
            });
        }
        if request.expects_continue() {
            let stream = reader.get_mut();
            stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n")?;
            stream.flush()?;
        }
        request.body = Some(read_body(reader, len)?);
        Ok(request)
    }

    /// Request line and headers only.
    pub fn read_head<R: BufRead>(reader: &mut R) -> Result<Self, RequestError> {
        let line = read_line(reader)?.ok_or(RequestError::Closed)?;
        let mut parts = line.split_whitespace();
        let (method, target, version) = match (parts.next(), parts.next(), parts.next()) {
            (Some(m), Some(t), v) => (m.to_string(), t.to_string(), v.unwrap_or("HTTP/1.0")),
            _ => return Err(RequestError::BadRequestLine(line.clone())),
        };
        if !version.starts_with("HTTP/") {
            return Err(RequestError::BadRequestLine(line.clone()));
        }
        let version = version.to_string();

        let mut headers = Vec::new();
        loop {
            let line = read_line(reader)?.ok_or(RequestError::Closed)?;
            if line.is_empty() {
                break;
            }
            if headers.len() >= MAX_HEADERS {
                return Err(RequestError::HeadersTooLarge);
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| RequestError::BadHeader(line.clone()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(RequestError::BadHeader(line));
            }
            headers.push((name.to_string(), value.trim().to_string()));
        }

        let url = parse_target(&target)?;
        let query_pairs = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Ok(Self {
            method,
            path: percent_decode_str(url.path()).decode_utf8_lossy().into_owned(),
            query: url.query().map(str::to_owned),
            query_pairs,
            target,
            version,
            headers,
            body: None,
        })
    }

    /// First header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn has_query_key(&self, key: &str) -> bool {
        self.query_pairs.iter().any(|(k, _)| k == key)
    }

    pub fn content_length(&self) -> Result<Option<u64>, RequestError> {
        match self.header("content-length") {
            None => Ok(None),
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| RequestError::BadContentLength(v.to_string())),
        }
    }

    fn expects_continue(&self) -> bool {
        self.header("expect")
            .is_some_and(|v| v.eq_ignore_ascii_case("100-continue"))
    }
}

/// One CRLF- or LF-terminated line without its terminator. None on clean EOF.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>, RequestError> {
    let mut buf = Vec::new();
    let n = reader.by_ref().take(MAX_LINE).read_until(b'\n', &mut buf)?;
    if n == 0 {
        return Ok(None);
    }
    if buf.last() != Some(&b'\n') {
        if n as u64 >= MAX_LINE {
            return Err(RequestError::HeadersTooLarge);
        }
        return Err(RequestError::Closed);
    }
    buf.pop();
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    String::from_utf8(buf)
        .map(Some)
        .map_err(|e| RequestError::BadHeader(String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

fn read_body<R: Read>(reader: &mut R, len: u64) -> Result<Vec<u8>, RequestError> {
    let mut body = Vec::with_capacity(len.min(1024 * 1024) as usize);
    let received = reader.by_ref().take(len).read_to_end(&mut body)? as u64;
    if received != len {
        return Err(RequestError::TruncatedBody {
            expected: len,
            received,
        });
    }
    Ok(body)
}

/// Origin-form targets (`/path?query`) are set onto a fixed base so a
/// leading `//` is never taken for a host; absolute-form is parsed as is.
fn parse_target(target: &str) -> Result<Url, RequestError> {
    let bad = || RequestError::BadTarget(target.to_string());
    if !target.starts_with('/') {
        return Url::parse(target).map_err(|_| bad());
    }
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };
    let mut url = Url::parse("http://localhost/").map_err(|_| bad())?;
    url.set_path(&format!("/{}", path.trim_start_matches('/')));
    url.set_query(query);
    Ok(url)
}
