//! Request dispatch: maps `/push`, `/pull`, `/last` and `/status` onto the
//! stash directory, plus a `?debug` echo of whatever was received.

use anyhow::Result;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use super::disposition;
use super::request::Request;
use super::response::Response;
use crate::item::{Item, ItemInfo};
use crate::mime;
use crate::stash::Stash;

/// Value of the `Server` line in debug output.
const SERVER_VERSION: &str = concat!("remotestash/", env!("CARGO_PKG_VERSION"));

pub struct RequestHandler {
    stash_dir: PathBuf,
}

impl RequestHandler {
    pub fn new(stash_dir: impl Into<PathBuf>) -> Self {
        Self {
            stash_dir: stash_dir.into(),
        }
    }

    pub fn stash_dir(&self) -> &Path {
        &self.stash_dir
    }

    /// Produce the response for one request. GET and POST are treated alike.
    pub fn handle(&self, req: &Request, peer: SocketAddr) -> Response {
        if req.has_query_key("debug") {
            return debug_info(req, peer);
        }

        let path = req.path.as_str();
        let result = if path.starts_with("/push") {
            self.push(req)
        } else if path.starts_with("/pull") {
            self.pull()
        } else if path.starts_with("/last") {
            self.last()
        } else if path.starts_with("/status") {
            self.status()
        } else {
            tracing::debug!(%path, "no route");
            Ok(Response::empty(500))
        };

        result.unwrap_or_else(|e| {
            tracing::error!(%path, "request failed: {:#}", e);
            Response::text(500, format!("{:#}", e))
        })
    }

    fn push(&self, req: &Request) -> Result<Response> {
        let content_type = req
            .header("content-type")
            .unwrap_or(mime::APPLICATION_OCTET_STREAM);
        let mut info = ItemInfo::new(content_type);
        info.filename = req
            .header("content-disposition")
            .and_then(disposition::parse_filename);
        let item = Item::from_bytes(info, req.body.clone().unwrap_or_default());

        let mut stash = Stash::open(&self.stash_dir)?;
        stash.push(item)?;
        Ok(Response::json(200, &serde_json::json!({ "success": 1 })))
    }

    fn pull(&self) -> Result<Response> {
        let mut stash = Stash::open(&self.stash_dir)?;
        Ok(item_response(stash.pull()?))
    }

    fn last(&self) -> Result<Response> {
        let stash = Stash::open(&self.stash_dir)?;
        Ok(item_response(stash.last()?))
    }

    fn status(&self) -> Result<Response> {
        let stash = Stash::open(&self.stash_dir)?;
        Ok(Response::json(200, &stash.status()?))
    }
}

/// The item's bytes under its own content type; an empty text body when there is none.
fn item_response(item: Option<Item>) -> Response {
    let Some(item) = item else {
        return Response::text(200, "");
    };
    let content_type = item.info.content_type.clone();
    let filename = item.info.filename.clone();
    let mut response = Response::bytes(200, &content_type, item.into_bytes());
    if let Some(name) = filename {
        response = response.with_header("Content-Disposition", &disposition::inline_filename(&name));
    }
    response
}

fn debug_info(req: &Request, peer: SocketAddr) -> Response {
    let mut lines = vec![
        "CLIENT VALUES:".to_string(),
        format!("client_address={} ({})", peer, peer.ip()),
        format!("command={}", req.method),
        format!("path={}", req.target),
        format!("real path={}", req.path),
        format!("query={}", req.query.as_deref().unwrap_or("")),
        format!("query_dict={:?}", req.query_pairs),
        format!("request_version={}", req.version),
        String::new(),
        "SERVER VALUES:".to_string(),
        format!("server_version={}", SERVER_VERSION),
        "protocol_version=HTTP/1.1".to_string(),
        String::new(),
        "HEADERS RECEIVED:".to_string(),
    ];
    let mut headers: Vec<&(String, String)> = req.headers().iter().collect();
    headers.sort_by(|a, b| a.0.to_ascii_lowercase().cmp(&b.0.to_ascii_lowercase()));
    for (name, value) in headers {
        lines.push(format!("{}={}", name, value.trim_end()));
    }
    lines.push(String::new());
    if let Some(body) = req.body.as_deref().filter(|b| !b.is_empty()) {
        lines.push(format!("BODY [{} bytes]", body.len()));
        lines.push(String::from_utf8_lossy(body).into_owned());
    }
    Response::text(200, lines.join("\n"))
}
