// src/infrastructure/exchange/transport.rs
// HTTPS transport over hyper

use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::{Body, Client, Method, Request};
use hyper_tls::HttpsConnector;
use std::time::Duration;

use crate::domain::errors::{ExchangeError, ExchangeResult};
use crate::domain::repository::{HttpResponse, HttpTransport};

pub struct HyperTransport {
    client: Client<HttpsConnector<HttpConnector>>,
    timeout: Duration,
}

impl HyperTransport {
    pub fn new(timeout: Duration) -> Self {
        let https = HttpsConnector::new();
        Self {
            client: Client::builder().build::<_, Body>(https),
            timeout,
        }
    }

    async fn send(&self, request: Request<Body>) -> ExchangeResult<HttpResponse> {
        let uri = request.uri().to_string();
        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| ExchangeError::network(format!("Request to {} timed out", uri)))?
            .map_err(|e| ExchangeError::network(format!("Request to {} failed: {}", uri, e)))?;

        let status = response.status().as_u16();
        let bytes = hyper::body::to_bytes(response.into_body())
            .await
            .map_err(|e| ExchangeError::network(format!("Failed to read response body: {}", e)))?;

        log::debug!("{} -> {} ({} bytes)", uri, status, bytes.len());

        Ok(HttpResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

#[async_trait]
impl HttpTransport for HyperTransport {
    async fn get(&self, url: &str) -> ExchangeResult<HttpResponse> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(url)
            .body(Body::empty())
            .map_err(|e| ExchangeError::network(format!("Invalid request: {}", e)))?;
        self.send(request).await
    }

    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: String,
    ) -> ExchangeResult<HttpResponse> {
        let mut builder = Request::builder().method(Method::POST).uri(url);
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = builder
            .body(Body::from(body))
            .map_err(|e| ExchangeError::network(format!("Invalid request: {}", e)))?;
        self.send(request).await
    }
}
