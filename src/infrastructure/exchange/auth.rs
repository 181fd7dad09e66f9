// src/infrastructure/exchange/auth.rs
// Request signing for private endpoints
//
// Body: nonce=<n>&method=<endpoint>&<params>, urlencoded
// Headers: Key, Sign = hex(HMAC-SHA512(secret, body))

use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::domain::errors::{ErrorKind, ExchangeError, ExchangeResult};
use crate::domain::repository::Clock;

type HmacSha512 = Hmac<Sha512>;

/// Encoded body and authentication headers for one private call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub body: String,
    pub headers: Vec<(String, String)>,
}

#[derive(Clone)]
pub struct AuthSigner {
    api_key: Option<String>,
    secret: Option<String>,
}

impl fmt::Debug for AuthSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSigner")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AuthSigner {
    /// Empty strings count as missing credentials.
    pub fn new(api_key: Option<String>, secret: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some() && self.secret.is_some()
    }

    /// Sign a call to `method`. The caller supplies a strictly increasing nonce.
    pub fn sign(
        &self,
        method: &str,
        params: &[(String, String)],
        nonce: u64,
    ) -> ExchangeResult<SignedRequest> {
        let (api_key, secret) = match (&self.api_key, &self.secret) {
            (Some(key), Some(secret)) => (key, secret),
            _ => {
                return Err(ExchangeError::authentication(format!(
                    "API key and secret are required for {}",
                    method
                )))
            }
        };

        let nonce = nonce.to_string();
        let mut fields: Vec<(&str, &str)> = vec![("nonce", nonce.as_str()), ("method", method)];
        fields.extend(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let body = serde_urlencoded::to_string(&fields).map_err(|e| {
            ExchangeError::new(ErrorKind::Exchange, format!("Failed to encode request: {}", e))
        })?;

        let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
            .map_err(|e| ExchangeError::authentication(format!("Invalid secret: {}", e)))?;
        mac.update(body.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(SignedRequest {
            body,
            headers: vec![
                ("Key".to_string(), api_key.clone()),
                ("Sign".to_string(), signature),
            ],
        })
    }
}

/// Source of nonces for signed requests
pub trait NonceSource: Send + Sync {
    fn next_nonce(&self) -> u64;
}

/// Millisecond nonces, bumped by one when the clock has not advanced.
pub struct MillisNonce {
    clock: Arc<dyn Clock>,
    last: AtomicU64,
}

impl MillisNonce {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: AtomicU64::new(0),
        }
    }
}

impl NonceSource for MillisNonce {
    fn next_nonce(&self) -> u64 {
        let now = self.clock.now_millis().max(0) as u64;
        let mut last = self.last.load(Ordering::SeqCst);
        loop {
            let next = now.max(last + 1);
            match self
                .last
                .compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next,
                Err(current) => last = current,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Vec<(String, String)> {
        vec![
            ("pair".to_string(), "eth_btc".to_string()),
            ("type".to_string(), "buy".to_string()),
            ("amount".to_string(), "1.5".to_string()),
            ("rate".to_string(), "0.03".to_string()),
        ]
    }

    #[test]
    fn signs_body_with_hmac_sha512() {
        let signer = AuthSigner::new(Some("key".to_string()), Some("secret".to_string()));
        let signed = signer.sign("Trade", &params(), 1_500_000_000_000).unwrap();

        assert_eq!(
            signed.body,
            "nonce=1500000000000&method=Trade&pair=eth_btc&type=buy&amount=1.5&rate=0.03"
        );
        assert_eq!(signed.headers[0], ("Key".to_string(), "key".to_string()));
        assert_eq!(
            signed.headers[1].1,
            "5b14ee4cff539c2853c12ddce8db76299f60c93447200b411c649e4ece10fe68\
             293fd2e15e6977b86c90839f82535bd698ac5114f90962db854d22d9589c95d2"
        );
    }

    #[test]
    fn params_are_urlencoded() {
        let signer = AuthSigner::new(Some("key".to_string()), Some("secret".to_string()));
        let params = vec![
            ("coinName".to_string(), "btc".to_string()),
            ("note".to_string(), "a b&c".to_string()),
        ];
        let signed = signer.sign("CoinDepositAddress", &params, 7).unwrap();
        assert_eq!(signed.body, "nonce=7&method=CoinDepositAddress&coinName=btc&note=a+b%26c");
    }

    #[test]
    fn missing_credentials_fail_before_signing() {
        let signer = AuthSigner::new(Some("key".to_string()), Some(String::new()));
        assert!(!signer.has_credentials());
        let err = signer.sign("getInfo", &[], 1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);

        let err = AuthSigner::new(None, None).sign("getInfo", &[], 1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let signer = AuthSigner::new(Some("key".to_string()), Some("secret".to_string()));
        let printed = format!("{:?}", signer);
        assert!(!printed.contains("secret\""));
        assert!(printed.contains("<redacted>"));
    }

    struct StuckClock;

    impl Clock for StuckClock {
        fn now_millis(&self) -> i64 {
            1_000
        }
    }

    #[test]
    fn nonces_strictly_increase_on_a_stuck_clock() {
        let nonces = MillisNonce::new(Arc::new(StuckClock));
        let first = nonces.next_nonce();
        let second = nonces.next_nonce();
        let third = nonces.next_nonce();
        assert_eq!(first, 1_000);
        assert!(second > first);
        assert!(third > second);
    }
}
