//! HS256 JSON Web Token implementation of the `TokenService` port.
//!
//! Expiry is checked against the injected [`Clock`] rather than the system
//! time so issuance and verification can be tested deterministically.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::UserId;
use crate::domain::ports::{AccessToken, TokenError, TokenService};

/// Lifetime of issued tokens unless configured otherwise.
pub const DEFAULT_TOKEN_TTL: TimeDelta = TimeDelta::hours(24);

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies tokens with a shared secret.
pub struct JwtTokenService {
    secret: Zeroizing<Vec<u8>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtTokenService {
    /// Build a service signing with `secret`.
    pub fn new(secret: Zeroizing<Vec<u8>>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            secret,
            ttl: DEFAULT_TOKEN_TTL,
            clock,
        }
    }

    /// Override the token lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);
        validation
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: &UserId) -> Result<AccessToken, TokenError> {
        let now = self.clock.utc();
        let expires_at: DateTime<Utc> = now + self.ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|err| TokenError::signing(err.to_string()))?;
        Ok(AccessToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &Self::validation(),
        )
        .map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            TokenError::invalid(err.to_string())
        })?;

        if data.claims.exp <= self.clock.utc().timestamp() {
            debug!(exp = data.claims.exp, "bearer token expired");
            return Err(TokenError::invalid("token expired"));
        }

        UserId::parse(&data.claims.sub).map_err(|err| TokenError::invalid(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockable::MockClock;
    use rstest::{fixture, rstest};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn clock_at(now: DateTime<Utc>) -> Arc<dyn Clock + Send + Sync> {
        let mut clock = MockClock::new();
        clock.expect_utc().return_const(now);
        Arc::new(clock)
    }

    fn service_at(now: DateTime<Utc>) -> JwtTokenService {
        JwtTokenService::new(Zeroizing::new(b"test-secret".to_vec()), clock_at(now))
    }

    #[fixture]
    fn user_id() -> UserId {
        UserId::random()
    }

    #[rstest]
    fn issued_tokens_verify_to_the_same_user(user_id: UserId) {
        let service = service_at(fixed_now());
        let token = service.issue(&user_id).expect("issue token");
        assert_eq!(token.expires_at, fixed_now() + DEFAULT_TOKEN_TTL);
        assert_eq!(service.verify(&token.token).expect("verify"), user_id);
    }

    #[rstest]
    fn expired_tokens_are_rejected(user_id: UserId) {
        let token = service_at(fixed_now())
            .issue(&user_id)
            .expect("issue token");
        let later = service_at(fixed_now() + DEFAULT_TOKEN_TTL + TimeDelta::seconds(1));
        let err = later.verify(&token.token).expect_err("expired");
        assert!(matches!(err, TokenError::Invalid { .. }));
    }

    #[rstest]
    fn tokens_signed_with_another_secret_are_rejected(user_id: UserId) {
        let token = service_at(fixed_now())
            .issue(&user_id)
            .expect("issue token");
        let other = JwtTokenService::new(
            Zeroizing::new(b"other-secret".to_vec()),
            clock_at(fixed_now()),
        );
        assert!(other.verify(&token.token).is_err());
    }

    #[rstest]
    #[case("")]
    #[case("not.a.jwt")]
    fn malformed_tokens_are_rejected(#[case] token: &str) {
        let err = service_at(fixed_now()).verify(token).expect_err("malformed");
        assert_eq!(err.to_string(), "invalid token");
    }

    #[rstest]
    fn custom_ttl_shapes_expiry(user_id: UserId) {
        let service = service_at(fixed_now()).with_ttl(TimeDelta::hours(1));
        let token = service.issue(&user_id).expect("issue token");
        assert_eq!(token.expires_at, fixed_now() + TimeDelta::hours(1));
    }
}
