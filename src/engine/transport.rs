//! HTTP exchange with the search service: the [`SearchTransport`] seam, endpoint URLs, and the
//! reqwest-backed client used by the CLI.

use anyhow::{Context, Result};
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use crate::DumpOpts;
use crate::error::DumpError;
use crate::utils::config::BODY_SNIPPET_LEN;

/// One request/response exchange. Implementations return the body of a successful response and
/// an error for anything else (connection failure, non-success status).
pub trait SearchTransport: Send + Sync {
    fn get(&self, url: &str, body: Option<Vec<u8>>) -> Result<Vec<u8>>;
}

/// URLs for one index.
#[derive(Clone, Debug)]
pub struct Endpoints {
    count: String,
    search: String,
}

impl Endpoints {
    pub fn new(base_url: &str, index: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Endpoints {
            count: format!("{base}/{index}/_count"),
            search: format!("{base}/{index}/_search?request_cache=true"),
        }
    }

    pub fn count_url(&self) -> &str {
        &self.count
    }

    pub fn search_url(&self) -> &str {
        &self.search
    }
}

/// Blocking reqwest client with Basic auth; trusts only the configured CA for `https`.
pub struct HttpTransport {
    client: Client,
    user: String,
    password: String,
}

impl HttpTransport {
    pub fn from_opts(opts: &DumpOpts) -> Result<Self> {
        let mut builder = Client::builder().timeout(opts.request_timeout);
        if opts.uses_tls() {
            let pem = std::fs::read(&opts.ca_path).map_err(|e| {
                DumpError::Config(format!(
                    "cannot read CA certificate {}: {e}",
                    opts.ca_path.display()
                ))
            })?;
            let ca = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                DumpError::Config(format!(
                    "parsing CA certificate {} failed: {e}",
                    opts.ca_path.display()
                ))
            })?;
            builder = builder
                .tls_built_in_root_certs(false)
                .add_root_certificate(ca);
            debug!("Built https client (CA: {})", opts.ca_path.display());
        } else {
            debug!("Built http client");
        }
        let client = builder.build().context("build HTTP client")?;
        Ok(HttpTransport {
            client,
            user: opts.user.clone(),
            password: opts.password.clone(),
        })
    }
}

impl SearchTransport for HttpTransport {
    fn get(&self, url: &str, body: Option<Vec<u8>>) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let mut req = self
            .client
            .get(url)
            .basic_auth(&self.user, Some(&self.password))
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            req = req.body(body);
        }
        let resp = req.send().map_err(|source| DumpError::Request {
            url: url.to_string(),
            source,
        })?;
        let status = resp.status();
        let bytes = resp.bytes().map_err(|source| DumpError::Request {
            url: url.to_string(),
            source,
        })?;
        debug!("Response code: {}", status.as_u16());
        if !status.is_success() {
            return Err(DumpError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: body_snippet(&bytes),
            }
            .into());
        }
        Ok(bytes.to_vec())
    }
}

/// Lossy UTF-8 prefix of a body for messages.
pub fn body_snippet(body: &[u8]) -> String {
    let end = body.len().min(BODY_SNIPPET_LEN);
    let mut s = String::from_utf8_lossy(&body[..end]).into_owned();
    if body.len() > end {
        s.push_str("...");
    }
    s
}

#[derive(Deserialize)]
struct CountResponse {
    #[serde(default)]
    count: u64,
}

/// Ask `_count` how many documents the index holds. A response without `count` reads as 0.
pub fn fetch_document_count<T: SearchTransport + ?Sized>(
    transport: &T,
    endpoints: &Endpoints,
) -> Result<u64> {
    let body = transport
        .get(endpoints.count_url(), None)
        .context("pre-flight document count")?;
    let parsed: CountResponse = serde_json::from_slice(&body)
        .map_err(DumpError::Json)
        .context("pre-flight document count")?;
    debug!("Returning count {}", parsed.count);
    Ok(parsed.count)
}
