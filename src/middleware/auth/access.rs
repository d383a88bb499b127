//! Route guard: run the authorization pipeline before the handler.
//!
//! One `RequireAuth` layer protects one route (or one method of a route) and
//! carries the permission that route demands. Rejections never reach the
//! handler; they are answered here with the common JSON error envelope.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{Request, header},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use tracing::warn;

use crate::error::AppError;
use crate::services::auth::AuthService;

#[derive(Clone)]
pub struct RequireAuth {
    auth: Arc<AuthService>,
    permission: &'static str,
}

impl RequireAuth {
    /// `permission` is what the route demands; `""` means any authenticated
    /// caller.
    pub fn new(auth: Arc<AuthService>, permission: &'static str) -> Self {
        Self { auth, permission }
    }
}

impl<S> Layer<S> for RequireAuth {
    type Service = RequireAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequireAuthService {
            inner,
            auth: self.auth.clone(),
            permission: self.permission,
        }
    }
}

#[derive(Clone)]
pub struct RequireAuthService<S> {
    inner: S,
    auth: Arc<AuthService>,
    permission: &'static str,
}

impl<S> Service<Request<Body>> for RequireAuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        // Swap so the instance we call is the one that was polled ready.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let auth = self.auth.clone();
        let permission = self.permission;

        Box::pin(async move {
            // Non-ASCII header values are treated the same as no header.
            let header = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match auth.authorize(header, permission).await {
                Ok(claims) => {
                    // middleware → extractor への受け渡し
                    req.extensions_mut().insert(claims);
                    inner.call(req).await
                }
                Err(err) => {
                    warn!(code = err.code(), permission, error = %err, "request rejected");
                    Ok(AppError::from(err).into_response())
                }
            }
        })
    }
}
