use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::application::access::{Principal, require_permission};
use crate::application::dto::auth::ClientContext;
use crate::application::errors::AppError;
use crate::bootstrap::app_context::AppContext;
use crate::domain::identity::permission::Permission;
use crate::domain::pagination::PageRequest;
use crate::presentation::http::envelope::ApiError;

const MAX_HEADER_VALUE: usize = 512;

/// Raw bearer token from the `Authorization` header.
pub struct Bearer(pub String);

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers)
            .map(Bearer)
            .ok_or(ApiError(AppError::Unauthenticated))
    }
}

/// Caller proven by a valid access token.
pub struct CurrentUser(pub Principal);

pub fn authenticate(ctx: &AppContext, headers: &HeaderMap) -> Result<Principal, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError(AppError::Unauthenticated))?;
    Ok(ctx.token_issuer().verify(&token)?)
}

#[axum::async_trait]
impl FromRequestParts<AppContext> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        authenticate(ctx, &parts.headers).map(CurrentUser)
    }
}

impl CurrentUser {
    pub async fn require(&self, ctx: &AppContext, permission: Permission) -> Result<(), ApiError> {
        let roles = ctx.role_repo();
        require_permission(roles.as_ref(), &self.0, permission).await?;
        Ok(())
    }
}

/// Client address and agent, copied onto sessions and audit entries.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub device_id: Option<String>,
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.chars().take(MAX_HEADER_VALUE).collect())
}

impl RequestMeta {
    pub fn from_parts(parts: &Parts) -> Self {
        let forwarded = header(&parts.headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
            .filter(|v| !v.is_empty());
        let ip_address = forwarded
            .or_else(|| header(&parts.headers, "x-real-ip"))
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            });
        Self {
            ip_address,
            user_agent: header(&parts.headers, "user-agent"),
            device_id: header(&parts.headers, "x-device-id"),
        }
    }

    /// A device id sent in the body wins over the header.
    pub fn client(&self, device_id: Option<String>) -> ClientContext {
        ClientContext {
            device_id: device_id
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .or_else(|| self.device_id.clone()),
            ip_address: self.ip_address.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestMeta::from_parts(parts))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<i64>,
    /// Items per page, 1..=100
    pub page_size: Option<i64>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}
