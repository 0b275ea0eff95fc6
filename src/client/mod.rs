//! Remote Engine Client
//!
//! [`Coser`] implementation that forwards queries to a similarity server,
//! so a [`crate::Cache`] can sit in front of a remote model exactly as it
//! does in front of a local one.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::engine::Coser;
use crate::error::{Error, Result};
use crate::model::{Expr, Match};
use crate::protocol::{
    CosNQuery, CosNResponse, CosQuery, CosResponse, CosesQuery, CosesResponse, ErrorBody,
    COSES_ROUTE, COS_N_ROUTE, COS_ROUTE,
};

/// Blocking HTTP client for a similarity server
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    http: Client,
}

impl HttpClient {
    /// Client for the server at `addr` (`host:port`)
    pub fn new(addr: impl AsRef<str>) -> Self {
        Self {
            base_url: format!("http://{}", addr.as_ref()),
            http: Client::new(),
        }
    }

    /// Use a preconfigured reqwest client (timeouts, proxies, ...)
    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// `http://host:port` of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fetch<Q: Serialize, R: DeserializeOwned>(&self, route: &str, query: &Q) -> Result<R> {
        let url = format!("{}{}", self.base_url, route);
        debug!("Querying {}", url);

        let response = self.http.post(&url).json(query).send()?;
        let status = response.status();
        let body = response.bytes()?;

        if status == StatusCode::BAD_REQUEST {
            let err = match serde_json::from_slice::<ErrorBody>(&body) {
                Ok(body) => body.into_error(),
                Err(_) => Error::Remote(String::from_utf8_lossy(&body).into_owned()),
            };
            return Err(err);
        }

        if !status.is_success() {
            return Err(Error::Remote(format!(
                "unexpected status {}: {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

impl Coser for HttpClient {
    fn cos(&self, a: &Expr, b: &Expr) -> Result<f32> {
        let query = CosQuery {
            a: a.clone(),
            b: b.clone(),
        };
        let response: CosResponse = self.fetch(COS_ROUTE, &query)?;
        Ok(response.value)
    }

    fn coses(&self, pairs: &[(Expr, Expr)]) -> Result<Vec<f32>> {
        let query = CosesQuery::from_pairs(pairs);
        let response: CosesResponse = self.fetch(COSES_ROUTE, &query)?;
        Ok(response.values)
    }

    fn cos_n(&self, expr: &Expr, n: usize) -> Result<Vec<Match>> {
        let query = CosNQuery {
            expr: expr.clone(),
            n,
        };
        let response: CosNResponse = self.fetch(COS_N_ROUTE, &query)?;
        Ok(response.matches)
    }
}
