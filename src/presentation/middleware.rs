use crate::infrastructure::security::TokenService;
use crate::presentation::handlers::ApiError;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
};
use std::{
    future::{Ready, ready},
    pin::Pin,
    rc::Rc,
    task::{Context, Poll},
};
use tracing::{trace, warn};

/// Routes reachable without a token.
const PUBLIC_ROUTES: &[&str] = &["/api/auth/register", "/api/auth/login", "/api/health"];

/// The verified caller, inserted into request extensions by the JWT
/// middleware and handed to handlers through the `FromRequest` extractor.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

pub struct JwtAuthMiddleware {
    tokens: TokenService,
}

impl JwtAuthMiddleware {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    tokens: TokenService,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        if is_public_route(req.path()) {
            trace!(path = %req.path(), "Public route, skipping auth");
            let fut = service.call(req);
            return Box::pin(async move { fut.await });
        }

        let token = match bearer_token(&req) {
            Some(token) => token,
            None => {
                warn!(path = %req.path(), "Request without bearer token");
                return Box::pin(async move {
                    Err(ApiError::Unauthorized("Missing bearer token".to_string()).into())
                });
            }
        };

        match self.tokens.verify(&token) {
            Ok(user_id) => {
                req.extensions_mut().insert(AuthenticatedUser { user_id });
                let fut = service.call(req);
                Box::pin(async move { fut.await })
            }
            Err(e) => {
                warn!(path = %req.path(), error = %e, "Rejected bearer token");
                Box::pin(async move {
                    Err(ApiError::Unauthorized("Invalid or expired token".to_string()).into())
                })
            }
        }
    }
}

fn is_public_route(path: &str) -> bool {
    PUBLIC_ROUTES.contains(&path)
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}
