// src/infrastructure/exchange/gateway.rs
// Public and signed private calls: sign, send, classify

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::auth::{AuthSigner, NonceSource};
use super::classifier::{classify, Envelope, RequestMeta};
use crate::domain::errors::{ErrorKind, ExchangeError, ExchangeResult};
use crate::domain::repository::{HttpResponse, HttpTransport, Params, PrivateApi};

pub const DEFAULT_PUBLIC_URL: &str = "https://api.liqui.io/api/3";
pub const DEFAULT_PRIVATE_URL: &str = "https://api.liqui.io/tapi";

pub struct LiquiGateway {
    transport: Arc<dyn HttpTransport>,
    signer: AuthSigner,
    nonce: Arc<dyn NonceSource>,
    public_url: String,
    private_url: String,
}

impl LiquiGateway {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        signer: AuthSigner,
        nonce: Arc<dyn NonceSource>,
        public_url: &str,
        private_url: &str,
    ) -> Self {
        Self {
            transport,
            signer,
            nonce,
            public_url: public_url.trim_end_matches('/').to_string(),
            private_url: private_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.signer.has_credentials()
    }

    /// GET a public endpoint, e.g. `ticker/eth_btc`.
    pub async fn public_get(&self, path: &str, query: &[(String, String)]) -> ExchangeResult<Value> {
        let mut url = format!("{}/{}", self.public_url, path);
        if !query.is_empty() {
            let encoded = serde_urlencoded::to_string(query).map_err(|e| {
                ExchangeError::new(ErrorKind::Exchange, format!("Failed to encode query: {}", e))
            })?;
            url.push('?');
            url.push_str(&encoded);
        }

        log::debug!("GET {}", url);
        let response = self.transport.get(&url).await?;
        handle_response(&RequestMeta { method: "GET", url: &url }, response)
    }

    /// POST a signed call and return the envelope's `return` payload.
    pub async fn private_post(&self, method: &str, params: Params) -> ExchangeResult<Value> {
        let signed = self.signer.sign(method, &params, self.nonce.next_nonce())?;

        let mut headers = vec![(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        )];
        headers.extend(signed.headers);

        log::debug!("POST {} method={}", self.private_url, method);
        let response = self
            .transport
            .post(&self.private_url, &headers, signed.body)
            .await?;
        let envelope = handle_response(
            &RequestMeta {
                method: "POST",
                url: &self.private_url,
            },
            response,
        )?;

        Ok(envelope.get("return").cloned().unwrap_or(Value::Null))
    }
}

#[async_trait]
impl PrivateApi for LiquiGateway {
    async fn private_call(&self, method: &str, params: Params) -> ExchangeResult<Value> {
        self.private_post(method, params).await
    }
}

fn handle_response(meta: &RequestMeta<'_>, response: HttpResponse) -> ExchangeResult<Value> {
    match classify(&response.body, meta)? {
        Envelope::Recognized(value) if response.is_success() => Ok(value),
        Envelope::Recognized(value) => Err(default_error(meta, &response).with_raw(value)),
        Envelope::Unrecognized => Err(default_error(meta, &response)),
    }
}

/// Fallback for bodies the classifier does not recognize.
fn default_error(meta: &RequestMeta<'_>, response: &HttpResponse) -> ExchangeError {
    let snippet: String = response.body.chars().take(200).collect();
    if response.is_success() {
        ExchangeError::bad_response(format!(
            "{} {} returned an unparseable body: {}",
            meta.method, meta.url, snippet
        ))
    } else {
        ExchangeError::network(format!(
            "{} {} failed with HTTP {}: {}",
            meta.method, meta.url, response.status, snippet
        ))
    }
}
