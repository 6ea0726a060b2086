//! Cart token encoding and verification.
//!
//! A token is a compact HS256 JWS: `header.claims.signature`, each part base64url without
//! padding, the signature being HMAC-SHA256 over `header.claims`. The claims carry exactly one
//! application field, `cartId`, plus `iat`/`exp` in unix seconds.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac, digest::InvalidLength};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use time::{Duration, OffsetDateTime};

use crate::{
    DEFAULT_SESSION_TTL,
    error::{InvalidToken, IssueError},
    secret::SessionSecret,
    storefront::CartId,
};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";
const MAX_TOKEN_LEN: usize = 4096;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(rename = "cartId")]
    cart_id: String,
    iat: i64,
    exp: i64,
}

/// Outcome of [`TokenCodec::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Verification {
    Valid(CartId),
    Invalid(InvalidToken),
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The verified cart id, discarding the rejection reason.
    pub fn cart_id(self) -> Option<CartId> {
        match self {
            Self::Valid(id) => Some(id),
            Self::Invalid(_) => None,
        }
    }
}

/// Issues and verifies cart tokens under one secret.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    secret: SessionSecret,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: SessionSecret) -> Self {
        Self {
            secret,
            ttl: DEFAULT_SESSION_TTL,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, cart_id: &CartId) -> Result<String, IssueError> {
        self.issue_at(cart_id, OffsetDateTime::now_utc())
    }

    pub fn issue_at(
        &self,
        cart_id: &CartId,
        issued_at: OffsetDateTime,
    ) -> Result<String, IssueError> {
        if cart_id.is_empty() {
            return Err(IssueError::EmptyCartId);
        }

        let iat = issued_at.unix_timestamp();
        let claims = Claims {
            cart_id: cart_id.as_str().to_owned(),
            iat,
            exp: iat.saturating_add(self.ttl.whole_seconds()),
        };

        let header_part = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&Header {
            alg: ALGORITHM.to_owned(),
        })?);
        let claims_part = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signing_input = format!("{header_part}.{claims_part}");

        let mac = self.mac(&signing_input).map_err(|_| IssueError::InvalidKey)?;
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    pub fn verify(&self, token: &str) -> Verification {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Verification {
        match self.decode(token, now) {
            Ok(cart_id) => Verification::Valid(cart_id),
            Err(reason) => Verification::Invalid(reason),
        }
    }

    fn decode(&self, token: &str, now: OffsetDateTime) -> Result<CartId, InvalidToken> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(InvalidToken::Malformed("token exceeds max length".into()));
        }

        let mut parts = token.split('.');
        let (Some(header_part), Some(claims_part), Some(signature_part), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(InvalidToken::Malformed("expected three parts".into()));
        };

        let header: Header = decode_part(header_part)?;
        if header.alg != ALGORITHM {
            return Err(InvalidToken::UnsupportedAlgorithm(header.alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_part)
            .map_err(|err| InvalidToken::Malformed(err.to_string()))?;
        let signing_input_len = header_part.len() + 1 + claims_part.len();
        let signing_input = token
            .get(..signing_input_len)
            .ok_or_else(|| InvalidToken::Malformed("truncated token".into()))?;
        self.mac(signing_input)
            .map_err(|_| InvalidToken::BadSignature)?
            .verify_slice(&signature)
            .map_err(|_| InvalidToken::BadSignature)?;

        let claims: Claims = decode_part(claims_part)?;
        if claims.cart_id.is_empty() {
            return Err(InvalidToken::Malformed("empty cartId claim".into()));
        }
        if now.unix_timestamp() >= claims.exp {
            return Err(InvalidToken::Expired);
        }

        Ok(CartId::new(claims.cart_id))
    }

    fn mac(&self, signing_input: &str) -> Result<HmacSha256, InvalidLength> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())?;
        mac.update(signing_input.as_bytes());
        Ok(mac)
    }
}

fn decode_part<T: for<'de> Deserialize<'de>>(part: &str) -> Result<T, InvalidToken> {
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|err| InvalidToken::Malformed(err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| InvalidToken::Malformed(err.to_string()))
}
