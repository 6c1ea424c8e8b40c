use crate::domain::expense::{CategoryTotal, Expense};
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;

/// Credential persistence. Email is the unique key for an account, so it
/// is also the only lookup the store needs to answer.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save(&self, user: User) -> Result<()>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// Expense persistence. Every read/update/delete is filtered by the owning
/// user so one caller can never touch another's records.
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn save(&self, expense: Expense) -> Result<()>;
    /// All expenses for a user, newest date first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Expense>>;
    async fn find_for_user(&self, id: &str, user_id: &str) -> Result<Option<Expense>>;
    async fn update(&self, expense: Expense) -> Result<()>;
    /// Returns false when the record is absent or owned by someone else.
    async fn delete_for_user(&self, id: &str, user_id: &str) -> Result<bool>;
    async fn totals_by_category(&self, user_id: &str) -> Result<Vec<CategoryTotal>>;
}
