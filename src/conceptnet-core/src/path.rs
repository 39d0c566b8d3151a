//! Request path construction.
//!
//! Paths are a pure function of the client config and a resolved request.

use std::fmt;

use crate::config::{ApiProfile, ClientConfig, Scheme};
use crate::options::SearchParams;
use crate::resolver::{AssociationQuery, ResolvedRequest};

/// Where a single GET goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl RequestTarget {
    pub fn new(config: &ClientConfig, path: String) -> Self {
        Self {
            scheme: config.scheme(),
            host: config.host().to_string(),
            port: config.port(),
            path,
        }
    }

    pub fn url(&self) -> String {
        format!("{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
    }
}

impl fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Build the target of `request` for the configured host.
pub fn build_target(config: &ClientConfig, request: &ResolvedRequest) -> RequestTarget {
    RequestTarget::new(config, build_path(config, request))
}

/// Build the path and query of `request` according to the config's profile.
pub fn build_path(config: &ClientConfig, request: &ResolvedRequest) -> String {
    match config.profile() {
        ApiProfile::Legacy => legacy_path(config.api_version(), request),
        ApiProfile::Current => current_path(request),
    }
}

/// Paths of the versioned `/data/{version}` API.
fn legacy_path(version: &str, request: &ResolvedRequest) -> String {
    let prefix = format!("/data/{}", version);
    match request {
        ResolvedRequest::Lookup(q) => {
            let mut path = format!(
                "{}{}?limit={}&offset={}",
                prefix,
                urlencoding::encode(&q.uri),
                q.limit,
                q.offset
            );
            if q.core {
                path.push_str("&filter=core");
            }
            path
        }
        ResolvedRequest::ResolveUri(q) => format!(
            "{}/uri?language={}&text={}",
            prefix,
            urlencoding::encode(&q.language),
            urlencoding::encode(&normalize_text(&q.text))
        ),
        ResolvedRequest::Search(params) => format!("{}/search?{}", prefix, raw_query(params)),
        ResolvedRequest::Associate(q) => association_path(&format!("{}/assoc", prefix), q),
        ResolvedRequest::Relatedness(q) => {
            association_path(&format!("{}/relatedness", prefix), q)
        }
    }
}

/// Paths of the unversioned API served from the root.
fn current_path(request: &ResolvedRequest) -> String {
    match request {
        ResolvedRequest::Lookup(q) => {
            let uri = encode_keep_slash(&q.uri);
            // Served from the root, so the path itself must start with `/`
            let root = if uri.starts_with('/') { "" } else { "/" };
            let mut path = format!("{}{}?limit={}&offset={}", root, uri, q.limit, q.offset);
            if q.core {
                path.push_str("&filter=core");
            }
            path
        }
        ResolvedRequest::ResolveUri(q) => format!(
            "/c/{}/{}",
            urlencoding::encode(&q.language),
            urlencoding::encode(&normalize_text(&q.text))
        ),
        ResolvedRequest::Search(params) => format!("/query?{}", form_query(params)),
        ResolvedRequest::Associate(q) => association_path("/related", q),
        ResolvedRequest::Relatedness(q) => association_path("/relatedness", q),
    }
}

fn association_path(base: &str, q: &AssociationQuery) -> String {
    let mut path = format!("{}{}", base, q.input);
    if let Some(filter) = &q.filter {
        path.push_str(&format!(
            "?filter={}&limit={}",
            encode_keep_slash(filter),
            q.limit
        ));
    }
    path
}

/// Replace every run of whitespace with a single underscore.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Percent-encode each `/`-separated segment, keeping the separators.
fn encode_keep_slash(s: &str) -> String {
    s.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// `k=v&...` with keys and values left as given.
fn raw_query(params: &SearchParams) -> String {
    params
        .pairs()
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// `application/x-www-form-urlencoded` query.
fn form_query(params: &SearchParams) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.pairs())
        .finish()
}
