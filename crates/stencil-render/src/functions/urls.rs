//! The `parseUrl` template function.

use std::collections::BTreeMap;

use minijinja::{Error, ErrorKind, Value};
use serde::Serialize;
use url::Url;

/// A string handed to `parseUrl` that is not a valid absolute URL.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unable to parse url {url}: {source}")]
pub struct MalformedUrlError {
    url: String,
    #[source]
    source: url::ParseError,
}

impl MalformedUrlError {
    pub fn new(url: impl Into<String>, source: url::ParseError) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }

    /// The rejected input.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// URL components exposed to templates.
///
/// `host` includes the port when one is given (`db:5432`); `hostname` never
/// does. Query parameters keep every value of repeated keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedUrl {
    pub url: String,
    pub scheme: String,
    pub username: String,
    pub password: Option<String>,
    pub host: String,
    pub hostname: String,
    pub port: Option<u16>,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
    pub query_params: BTreeMap<String, Vec<String>>,
}

/// Base used only to validate relative references; it never reaches output.
const RELATIVE_BASE: &str = "http://relative.invalid/";

impl ParsedUrl {
    /// Parses an absolute URL or a relative reference.
    ///
    /// Relative references (`/var/run/docker.sock`, `conf/app.ini?x=1`, the
    /// empty string) are accepted with an empty scheme and host; their `path`
    /// is kept exactly as written. A scheme-relative `//host/path` keeps its
    /// authority.
    pub fn parse(raw: &str) -> Result<Self, MalformedUrlError> {
        match Url::parse(raw) {
            Ok(parsed) => Ok(Self::from(&parsed)),
            Err(url::ParseError::RelativeUrlWithoutBase) => Self::parse_relative(raw),
            Err(e) => Err(MalformedUrlError::new(raw, e)),
        }
    }

    fn parse_relative(raw: &str) -> Result<Self, MalformedUrlError> {
        let joined = Url::parse(RELATIVE_BASE)
            .and_then(|base| base.join(raw))
            .map_err(|e| MalformedUrlError::new(raw, e))?;

        if raw.starts_with("//") {
            let mut parsed = Self::from(&joined);
            parsed.url = raw.to_string();
            parsed.scheme = String::new();
            return Ok(parsed);
        }

        let (rest, fragment) = split_once_owned(raw, '#');
        let (path, query) = split_once_owned(rest, '?');
        Ok(Self {
            url: raw.to_string(),
            scheme: String::new(),
            username: String::new(),
            password: None,
            host: String::new(),
            hostname: String::new(),
            port: None,
            path: path.to_string(),
            query,
            fragment,
            query_params: query_params(&joined),
        })
    }
}

fn split_once_owned(s: &str, sep: char) -> (&str, Option<String>) {
    match s.split_once(sep) {
        Some((head, tail)) => (head, Some(tail.to_string())),
        None => (s, None),
    }
}

fn query_params(url: &Url) -> BTreeMap<String, Vec<String>> {
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in url.query_pairs() {
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    params
}

impl From<&Url> for ParsedUrl {
    fn from(url: &Url) -> Self {
        let hostname = url.host_str().unwrap_or_default().to_string();
        let host = match url.port() {
            Some(port) => format!("{hostname}:{port}"),
            None => hostname.clone(),
        };

        Self {
            url: url.to_string(),
            scheme: url.scheme().to_string(),
            username: url.username().to_string(),
            password: url.password().map(str::to_string),
            host,
            hostname,
            port: url.port(),
            path: url.path().to_string(),
            query: url.query().map(str::to_string),
            fragment: url.fragment().map(str::to_string),
            query_params: query_params(url),
        }
    }
}

/// `parseUrl(raw)`.
///
/// A malformed URL is carried as the error source so the renderer can report
/// it as [`crate::RenderError::MalformedUrl`] rather than an ordinary
/// evaluation error.
pub fn parse_url(raw: &str) -> Result<Value, Error> {
    match ParsedUrl::parse(raw) {
        Ok(parsed) => Ok(Value::from_serialize(&parsed)),
        Err(err) => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("unable to parse url {raw}"),
        )
        .with_source(err)),
    }
}
