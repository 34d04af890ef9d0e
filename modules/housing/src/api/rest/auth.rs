//! Caller identification for the REST surface.
//!
//! Handlers take an [`Authenticated`] argument; the extractor asks the
//! [`Authenticator`] stored as a request extension to resolve the actor from
//! the request headers.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use problem::ProblemResponse;
use thiserror::Error;
use uuid::Uuid;

use crate::api::rest::error::catalog;
use crate::config::{AuthConfig, AuthMode, TokenEntry};
use crate::contract::model::{Actor, Role};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("malformed identity header: {0}")]
    MalformedIdentity(String),
}

/// Resolves the caller from request headers.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Actor, AuthError>;
}

/// Static bearer tokens from configuration.
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, Actor>,
}

impl StaticTokenAuthenticator {
    pub fn from_entries(entries: &[TokenEntry]) -> anyhow::Result<Self> {
        let mut tokens = HashMap::with_capacity(entries.len());
        for entry in entries {
            let role: Role = entry
                .role
                .parse()
                .with_context(|| format!("auth token for user {}", entry.user_id))?;
            tokens.insert(
                entry.token.clone(),
                Actor {
                    user_id: entry.user_id,
                    role,
                },
            );
        }
        Ok(Self { tokens })
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Actor, AuthError> {
        let value = headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingCredentials)?
            .to_str()
            .map_err(|_| AuthError::InvalidCredentials)?;
        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidCredentials)?;
        self.tokens
            .get(token)
            .copied()
            .ok_or(AuthError::InvalidCredentials)
    }
}

/// Identity forwarded by an upstream gateway that already authenticated the user.
#[derive(Default)]
pub struct TrustedHeaderAuthenticator;

impl Authenticator for TrustedHeaderAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Actor, AuthError> {
        let read = |name: &str| -> Result<&str, AuthError> {
            headers
                .get(name)
                .ok_or(AuthError::MissingCredentials)?
                .to_str()
                .map_err(|_| AuthError::MalformedIdentity(name.to_string()))
        };
        let user_id = Uuid::parse_str(read(USER_ID_HEADER)?.trim())
            .map_err(|_| AuthError::MalformedIdentity(USER_ID_HEADER.to_string()))?;
        let role = read(USER_ROLE_HEADER)?
            .trim()
            .to_ascii_lowercase()
            .parse::<Role>()
            .map_err(|_| AuthError::MalformedIdentity(USER_ROLE_HEADER.to_string()))?;
        Ok(Actor { user_id, role })
    }
}

pub fn build_authenticator(cfg: &AuthConfig) -> anyhow::Result<Arc<dyn Authenticator>> {
    Ok(match cfg.mode {
        AuthMode::Tokens => Arc::new(StaticTokenAuthenticator::from_entries(&cfg.tokens)?),
        AuthMode::TrustedHeaders => Arc::new(TrustedHeaderAuthenticator),
    })
}

/// Extractor for the calling actor; rejects with 401 Problem Details.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Actor);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let instance = parts.uri.path().to_string();
        let Some(authenticator) = parts.extensions.get::<Arc<dyn Authenticator>>() else {
            tracing::error!("no authenticator installed on the router");
            return Err(catalog::UNAUTHENTICATED.respond("Authentication is not configured", &instance));
        };
        authenticator
            .authenticate(&parts.headers)
            .map(Authenticated)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejecting unauthenticated request");
                catalog::UNAUTHENTICATED.respond(e.to_string(), &instance)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn entries() -> (Uuid, Vec<TokenEntry>) {
        let id = Uuid::new_v4();
        (
            id,
            vec![TokenEntry {
                token: "tok-landlord".into(),
                user_id: id,
                role: "landlord".into(),
            }],
        )
    }

    #[test]
    fn bearer_token_resolves_actor() {
        let (id, entries) = entries();
        let auth = StaticTokenAuthenticator::from_entries(&entries).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok-landlord"),
        );
        assert_eq!(auth.authenticate(&headers).unwrap(), Actor::landlord(id));
    }

    #[test]
    fn bad_bearer_tokens_are_rejected() {
        let (_, entries) = entries();
        let auth = StaticTokenAuthenticator::from_entries(&entries).unwrap();

        assert_eq!(
            auth.authenticate(&HeaderMap::new()),
            Err(AuthError::MissingCredentials)
        );

        for value in ["Bearer nope", "Basic tok-landlord", "Bearer "] {
            let mut headers = HeaderMap::new();
            headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
            assert_eq!(
                auth.authenticate(&headers),
                Err(AuthError::InvalidCredentials),
                "{value}"
            );
        }
    }

    #[test]
    fn token_with_unknown_role_fails_at_startup() {
        let entries = vec![TokenEntry {
            token: "t".into(),
            user_id: Uuid::new_v4(),
            role: "admin".into(),
        }];
        assert!(StaticTokenAuthenticator::from_entries(&entries).is_err());
    }

    #[test]
    fn trusted_headers_resolve_actor() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("Student"));
        assert_eq!(
            TrustedHeaderAuthenticator.authenticate(&headers).unwrap(),
            Actor::student(id)
        );
    }

    #[test]
    fn trusted_headers_reject_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("student"));
        assert_eq!(
            TrustedHeaderAuthenticator.authenticate(&headers),
            Err(AuthError::MalformedIdentity(USER_ID_HEADER.to_string()))
        );

        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("8a1b2c3d-0000-4000-8000-000000000000"));
        assert_eq!(
            TrustedHeaderAuthenticator.authenticate(&headers),
            Err(AuthError::MissingCredentials)
        );
    }
}
