//! WordPress REST clients
//!
//! - [`relations`] talks to the JetEngine relation endpoint
//! - [`content`] lists and creates items in `wp/v2` collections
//!
//! Both share a [`WpClient`], which carries the timeout and the optional
//! application-password `Authorization` header. Calls are never retried.

pub mod content;
pub mod relations;

pub use content::{ContentClient, ContentQuery};
pub use relations::{PingResponse, RelationClient};

use reqwest::{header::HeaderMap, Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::WordPressConfig;
use crate::crawler::headers::build_json_headers;
use crate::error::{Error, Result};

/// Authenticated JSON transport shared by the WordPress clients
#[derive(Clone)]
pub struct WpClient {
    client: Client,
    headers: HeaderMap,
}

impl WpClient {
    /// Create a client from configuration
    ///
    /// Missing credentials are not an error: requests are sent without an
    /// `Authorization` header.
    pub fn new(config: &WordPressConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("tripdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let token = config.basic_auth_token();
        if token.is_none() {
            tracing::debug!("No WordPress credentials configured, sending unauthenticated requests");
        }

        Ok(Self {
            client,
            headers: build_json_headers(token.as_deref()),
        })
    }

    /// Whether requests carry credentials
    pub fn is_authenticated(&self) -> bool {
        self.headers.contains_key(reqwest::header::AUTHORIZATION)
    }

    /// GET `url` and decode a JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        tracing::debug!(url = %url, "GET");

        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .query(query)
            .send()
            .await?;

        let response = check_status("GET", url, response)?;
        decode_json(response).await
    }

    /// POST a JSON body and decode the JSON reply
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.send_post(url, body).await?;
        let response = check_status("POST", url, response)?;
        decode_json(response).await
    }

    /// POST a JSON body, only checking for a 2xx status
    pub async fn post_for_status<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<u16> {
        let response = self.send_post(url, body).await?;
        let response = check_status("POST", url, response)?;
        Ok(response.status().as_u16())
    }

    /// GET `url` without treating the status as an error
    pub async fn get_raw(&self, url: &str) -> Result<(u16, String)> {
        tracing::debug!(url = %url, "GET");

        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }

    async fn send_post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Response> {
        tracing::debug!(url = %url, "POST");

        let body = serde_json::to_vec(body)?;
        let response = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .body(body)
            .send()
            .await?;

        Ok(response)
    }
}

fn check_status(method: &'static str, url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::status(method, url, status.as_u16()))
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Err(Error::Decode(String::from("empty response body")));
    }
    Ok(serde_json::from_str(&body)?)
}
