// Catalog API HTTP client
//
// Wraps `reqwest::Client` with URL construction and status mapping.
// Endpoint groups (categories, items, images) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the catalog REST API.
///
/// All methods return decoded payloads; non-success statuses are mapped
/// to [`Error`] variants before the caller sees them.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CatalogClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the server root (e.g. `http://localhost:5000`); a
    /// trailing slash is added when missing so relative joins keep any
    /// path prefix.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: normalize_base(base_url),
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url: normalize_base(base_url),
        })
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(&format!("api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;
        parse_json(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("POST {}", url);
        let resp = self.http.post(url).json(body).send().await?;
        parse_json(resp).await
    }

    pub(crate) async fn patch<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("PATCH {}", url);
        let resp = self.http.patch(url).json(body).send().await?;
        parse_json(resp).await
    }

    /// Send a DELETE request. Any response body is ignored.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {}", url);
        let resp = self.http.delete(url).send().await?;
        check_status(resp).await.map(drop)
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        url: Url,
        form: reqwest::multipart::Form,
    ) -> Result<T, Error> {
        debug!("POST (multipart) {}", url);
        let resp = self.http.post(url).multipart(form).send().await?;
        parse_json(resp).await
    }
}

fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Map non-success statuses to typed errors, passing successes through.
async fn check_status(resp: Response) -> Result<Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let path = resp.url().path().to_owned();
    let retry_after = retry_after_secs(&resp);
    let message = resp.text().await.unwrap_or_default();
    let code = status.as_u16();

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized {
            status: code,
            message,
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::Validation {
            status: code,
            message,
        },
        StatusCode::NOT_FOUND => Error::NotFound { path },
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited {
            retry_after_secs: retry_after.unwrap_or(0),
        },
        _ => Error::Server {
            status: code,
            message,
        },
    })
}

async fn parse_json<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
    let resp = check_status(resp).await?;
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

/// Seconds to wait before retrying, from `Retry-After` or the
/// `X-RateLimit-Reset` epoch header.
fn retry_after_secs(resp: &Response) -> Option<u64> {
    let header = |name: &str| {
        resp.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
    };

    if let Some(secs) = header("retry-after") {
        return u64::try_from(secs).ok();
    }

    let reset = header("x-ratelimit-reset")?;
    let now = chrono::Utc::now().timestamp();
    u64::try_from(reset - now).ok().or(Some(0))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client =
            CatalogClient::from_reqwest("http://localhost:5000/catalog", reqwest::Client::new())
                .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/catalog/");
        assert_eq!(
            client.api_url("item/3").unwrap().as_str(),
            "http://localhost:5000/catalog/api/item/3"
        );
    }

    #[test]
    fn root_base_url_is_kept() {
        let client =
            CatalogClient::from_reqwest("http://localhost:5000", reqwest::Client::new()).unwrap();
        assert_eq!(
            client.api_url("category").unwrap().as_str(),
            "http://localhost:5000/api/category"
        );
    }
}
