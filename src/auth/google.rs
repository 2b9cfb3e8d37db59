// Google identity verification.
//
// Two credential shapes reach the login endpoint and are resolved
// differently:
// 1. Opaque OAuth2 access tokens (Google mints them with a "ya29."
//    prefix) are resolved by asking the userinfo endpoint who they
//    belong to.
// 2. Anything else is treated as a signed ID token and verified against
//    Google's published RSA keys: RS256 signature, audience (our client
//    id), issuer, and expiry.
//
// Every failure collapses to InvalidCredential. The cause is logged
// server-side and never returned to the caller.

use crate::auth::TokenVerifier;
use crate::config::AuthConfig;
use crate::types::{ApiError, AppResult};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

/// Prefix Google uses for opaque OAuth2 access tokens.
const ACCESS_TOKEN_PREFIX: &str = "ya29.";

/// Both issuer spellings Google has used for ID tokens.
const ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

pub struct GoogleVerifier {
    client: Client,
    client_id: String,
    userinfo_url: String,
    certs_url: String,
}

// Response types for the Google endpoints

#[derive(Deserialize)]
struct UserInfo {
    email: Option<String>,
}

#[derive(Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

#[derive(Deserialize)]
struct IdTokenClaims {
    // aud, iss, and exp are checked by the validation, not read here.
    email: Option<String>,
}

impl GoogleVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            client: Client::new(),
            client_id: config.google_client_id.clone(),
            userinfo_url: config.userinfo_url.clone(),
            certs_url: config.certs_url.clone(),
        }
    }

    async fn email_from_access_token(&self, token: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .query(&[("access_token", token)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("userinfo endpoint returned {}", status);
        }

        let userinfo: UserInfo = response.json().await?;
        userinfo
            .email
            .ok_or_else(|| anyhow::anyhow!("no email found in user info"))
    }

    async fn email_from_id_token(&self, token: &str) -> anyhow::Result<String> {
        let header = jsonwebtoken::decode_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| anyhow::anyhow!("token header names no signing key"))?;

        let jwks: Jwks = self
            .client
            .get(&self.certs_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let jwk = jwks
            .keys
            .iter()
            .find(|key| key.kid == kid)
            .ok_or_else(|| anyhow::anyhow!("no published key matches kid {}", kid))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&ISSUERS);

        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)?;
        let data = jsonwebtoken::decode::<IdTokenClaims>(token, &key, &validation)?;

        data.claims
            .email
            .ok_or_else(|| anyhow::anyhow!("verified claims carry no email"))
    }
}

#[async_trait]
impl TokenVerifier for GoogleVerifier {
    async fn verify(&self, credential: &str) -> AppResult<String> {
        let resolved = if credential.starts_with(ACCESS_TOKEN_PREFIX) {
            self.email_from_access_token(credential).await
        } else {
            self.email_from_id_token(credential).await
        };

        match resolved {
            Ok(email) => {
                debug!(%email, "credential verified");
                Ok(email)
            }
            Err(cause) => {
                warn!(%cause, "credential verification failed");
                Err(ApiError::InvalidCredential)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;

    fn config_for(server: &mockito::ServerGuard) -> AuthConfig {
        AuthConfig {
            google_client_id: "client-id.apps.googleusercontent.com".to_string(),
            admin_email: "admin@example.com".to_string(),
            userinfo_url: format!("{}/userinfo", server.url()),
            certs_url: format!("{}/certs", server.url()),
        }
    }

    /// JWT-shaped string whose header decodes cleanly but whose
    /// signature is garbage.
    fn id_token_with_kid(kid: &str) -> String {
        let header =
            URL_SAFE_NO_PAD.encode(format!(r#"{{"alg":"RS256","typ":"JWT","kid":"{}"}}"#, kid));
        let payload = URL_SAFE_NO_PAD.encode(r#"{"email":"admin@example.com"}"#);
        format!("{}.{}.signature", header, payload)
    }

    #[tokio::test]
    async fn test_access_token_resolves_email() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/userinfo")
            .match_query(mockito::Matcher::UrlEncoded(
                "access_token".into(),
                "ya29.valid".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"email": "admin@example.com", "verified_email": true}"#)
            .create_async()
            .await;

        let verifier = GoogleVerifier::new(&config_for(&server));
        let email = verifier.verify("ya29.valid").await.unwrap();

        assert_eq!(email, "admin@example.com");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_access_token_rejected_by_provider() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/userinfo")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error": "invalid_token"}"#)
            .create_async()
            .await;

        let verifier = GoogleVerifier::new(&config_for(&server));
        let err = verifier.verify("ya29.expired").await.unwrap_err();

        assert!(matches!(err, ApiError::InvalidCredential));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_access_token_without_email_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/userinfo")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "112233"}"#)
            .create_async()
            .await;

        let verifier = GoogleVerifier::new(&config_for(&server));
        let err = verifier.verify("ya29.no-email").await.unwrap_err();

        assert!(matches!(err, ApiError::InvalidCredential));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_id_token_with_unknown_signing_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/certs")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"keys": [{"kty": "RSA", "kid": "other-kid", "n": "abc", "e": "AQAB"}]}"#)
            .create_async()
            .await;

        let verifier = GoogleVerifier::new(&config_for(&server));
        let err = verifier.verify(&id_token_with_kid("test-kid")).await.unwrap_err();

        assert!(matches!(err, ApiError::InvalidCredential));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_garbage_credential_never_reaches_the_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/certs").expect(0).create_async().await;

        let verifier = GoogleVerifier::new(&config_for(&server));
        let err = verifier.verify("not-a-jwt").await.unwrap_err();

        assert!(matches!(err, ApiError::InvalidCredential));
        mock.assert_async().await;
    }
}
