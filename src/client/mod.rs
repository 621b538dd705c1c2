//! Typed HTTP client for the league API.
//!
//! Holds the access/refresh token pair returned by sign-in and refreshes it
//! once when a request comes back `401`.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::presentation::http::auth::{
    GoogleLoginRequest, LoginRequest, LogoutRequest, RefreshRequest, TerminatedResponse,
    TokenResponse, UserResponse,
};
use crate::presentation::http::envelope::{ApiEnvelope, PageResponse};
use crate::presentation::http::extract::PageQuery;
use crate::presentation::http::seasons::StandingResponse;
use crate::presentation::http::teams::{TeamQuery, TeamRequest, TeamResponse};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Api {
        status: StatusCode,
        message: String,
        errors: Vec<String>,
    },
    #[error("not signed in")]
    NotSignedIn,
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub session_id: Uuid,
}

pub struct LeagueClient {
    base_url: String,
    http_client: reqwest::Client,
    device_id: Option<String>,
    tokens: RwLock<Option<TokenPair>>,
}

impl LeagueClient {
    pub fn new(base_url: &str, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            device_id: None,
            tokens: RwLock::new(None),
        }
    }

    /// Sent with every sign-in so a later sign-in from the same device replaces the session.
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub async fn tokens(&self) -> Option<TokenPair> {
        self.tokens.read().await.clone()
    }

    pub async fn set_tokens(&self, tokens: Option<TokenPair>) {
        *self.tokens.write().await = tokens;
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserResponse, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            device_id: self.device_id.clone(),
        };
        let issued: TokenResponse = self
            .send(Method::POST, "/api/auth/login", false, |req| req.json(&body))
            .await?;
        Ok(self.store(issued).await)
    }

    pub async fn login_with_google(&self, id_token: &str) -> Result<UserResponse, ClientError> {
        let body = GoogleLoginRequest {
            id_token: id_token.to_string(),
            device_id: self.device_id.clone(),
        };
        let issued: TokenResponse = self
            .send(Method::POST, "/api/auth/google", false, |req| req.json(&body))
            .await?;
        Ok(self.store(issued).await)
    }

    /// Rotates the refresh token. A rejected refresh drops the stored pair.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let refresh_token = self
            .tokens()
            .await
            .map(|t| t.refresh_token)
            .ok_or(ClientError::NotSignedIn)?;
        // Posted directly: `send` calls back into `refresh` on a 401.
        let resp = self
            .http_client
            .post(format!("{}/api/auth/refresh", self.base_url))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;
        match unwrap_envelope::<TokenResponse>(resp).await {
            Ok(issued) => {
                self.store(issued).await;
                Ok(())
            }
            Err(e) => {
                if e.status() == Some(StatusCode::UNAUTHORIZED) {
                    self.set_tokens(None).await;
                }
                Err(e)
            }
        }
    }

    /// Ends the current session and forgets the tokens.
    pub async fn logout(&self) -> Result<u64, ClientError> {
        let body = LogoutRequest {
            refresh_token: self.tokens().await.map(|t| t.refresh_token),
        };
        let ended: TerminatedResponse = self
            .send(Method::POST, "/api/auth/logout", true, |req| req.json(&body))
            .await?;
        self.set_tokens(None).await;
        Ok(ended.terminated)
    }

    pub async fn me(&self) -> Result<UserResponse, ClientError> {
        self.send(Method::GET, "/api/auth/me", true, |req| req).await
    }

    pub async fn list_teams(
        &self,
        filter: &TeamQuery,
        page: PageQuery,
    ) -> Result<PageResponse<TeamResponse>, ClientError> {
        self.send(Method::GET, "/api/teams", true, |req| req.query(filter).query(&page))
            .await
    }

    pub async fn get_team(&self, id: Uuid) -> Result<TeamResponse, ClientError> {
        self.send(Method::GET, &format!("/api/teams/{id}"), true, |req| req)
            .await
    }

    pub async fn create_team(&self, team: &TeamRequest) -> Result<TeamResponse, ClientError> {
        self.send(Method::POST, "/api/teams", true, |req| req.json(team))
            .await
    }

    pub async fn update_team(
        &self,
        id: Uuid,
        team: &TeamRequest,
    ) -> Result<TeamResponse, ClientError> {
        self.send(Method::PUT, &format!("/api/teams/{id}"), true, |req| req.json(team))
            .await
    }

    pub async fn delete_team(&self, id: Uuid) -> Result<(), ClientError> {
        self.send(Method::DELETE, &format!("/api/teams/{id}"), true, |req| req)
            .await
    }

    pub async fn standings(&self, season_id: Uuid) -> Result<Vec<StandingResponse>, ClientError> {
        self.send(
            Method::GET,
            &format!("/api/seasons/{season_id}/standings"),
            true,
            |req| req,
        )
        .await
    }

    async fn store(&self, issued: TokenResponse) -> UserResponse {
        self.set_tokens(Some(TokenPair {
            access_token: issued.access_token,
            refresh_token: issued.refresh_token,
            session_id: issued.session_id,
        }))
        .await;
        issued.user
    }

    async fn send<T, F>(
        &self,
        method: Method,
        path: &str,
        authed: bool,
        build: F,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let url = format!("{}{}", self.base_url, path);
        let attempt = |token: Option<String>| {
            let req = self.http_client.request(method.clone(), &url);
            let req = match token {
                Some(token) => req.bearer_auth(token),
                None => req,
            };
            build(req).send()
        };

        if !authed {
            return unwrap_envelope(attempt(None).await?).await;
        }
        let token = self.access_token().await?;
        let resp = attempt(Some(token)).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return unwrap_envelope(resp).await;
        }

        tracing::debug!(%path, "access token rejected; refreshing once");
        self.refresh().await?;
        let token = self.access_token().await?;
        unwrap_envelope(attempt(Some(token)).await?).await
    }

    async fn access_token(&self) -> Result<String, ClientError> {
        self.tokens()
            .await
            .map(|t| t.access_token)
            .ok_or(ClientError::NotSignedIn)
    }
}

async fn unwrap_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    let envelope: ApiEnvelope<Value> = match serde_json::from_slice(&bytes) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => return Err(e.into()),
        Err(_) => {
            return Err(ClientError::Api {
                status,
                message: String::from_utf8_lossy(&bytes).into_owned(),
                errors: Vec::new(),
            });
        }
    };
    if !status.is_success() || !envelope.success {
        return Err(ClientError::Api {
            status,
            message: envelope.message.unwrap_or_else(|| status.to_string()),
            errors: envelope.errors,
        });
    }
    Ok(serde_json::from_value(envelope.data.unwrap_or(Value::Null))?)
}

pub fn page(page: i64, page_size: i64) -> PageQuery {
    PageQuery {
        page: Some(page),
        page_size: Some(page_size),
    }
}
