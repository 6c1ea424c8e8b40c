//! Typed HTTP gateway over the REST API. Holds the bearer token issued at
//! login and attaches it to every subsequent request.

use crate::domain::expense::{CategoryTotal, CreateExpense, Expense, UpdateExpense};
use crate::domain::user::{LoginRequest, PublicUser, RegisterRequest};
use crate::presentation::auth::AuthResponse;
use crate::presentation::handlers::MessageResponse;
use anyhow::{Context, Result, bail};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> Result<PublicUser> {
        let req = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp = self
            .request(Method::POST, "/auth/register")
            .json(&req)
            .send()
            .await
            .context("Failed to reach the server")?;
        let auth: AuthResponse = decode(resp).await?;
        self.token = Some(auth.token);
        Ok(auth.user)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<PublicUser> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp = self
            .request(Method::POST, "/auth/login")
            .json(&req)
            .send()
            .await
            .context("Failed to reach the server")?;
        let auth: AuthResponse = decode(resp).await?;
        self.token = Some(auth.token);
        Ok(auth.user)
    }

    pub async fn list_expenses(&self) -> Result<Vec<Expense>> {
        let resp = self
            .request(Method::GET, "/expenses")
            .send()
            .await
            .context("Failed to reach the server")?;
        decode(resp).await
    }

    pub async fn create_expense(&self, req: &CreateExpense) -> Result<Expense> {
        let resp = self
            .request(Method::POST, "/expenses")
            .json(req)
            .send()
            .await
            .context("Failed to reach the server")?;
        decode(resp).await
    }

    pub async fn update_expense(&self, id: &str, req: &UpdateExpense) -> Result<Expense> {
        let resp = self
            .request(Method::PUT, &format!("/expenses/{}", id))
            .json(req)
            .send()
            .await
            .context("Failed to reach the server")?;
        decode(resp).await
    }

    pub async fn delete_expense(&self, id: &str) -> Result<()> {
        let resp = self
            .request(Method::DELETE, &format!("/expenses/{}", id))
            .send()
            .await
            .context("Failed to reach the server")?;
        let _: MessageResponse = decode(resp).await?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<Vec<CategoryTotal>> {
        let resp = self
            .request(Method::GET, "/expenses/stats")
            .send()
            .await
            .context("Failed to reach the server")?;
        decode(resp).await
    }
}

/// On success decodes the typed body; otherwise surfaces the server's
/// `{message}` as the error.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    if status.is_success() {
        return resp.json::<T>().await.context("Malformed response body");
    }
    let message = resp
        .json::<MessageResponse>()
        .await
        .map(|m| m.message)
        .unwrap_or_else(|_| format!("Request failed with status {}", status));
    bail!(message)
}
