use crate::domain::error::DomainError;
use crate::domain::expense::{CategoryTotal, CreateExpense, Expense, UpdateExpense};
use crate::domain::repository::ExpenseRepository;
use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

pub struct ExpenseService<R: ExpenseRepository> {
    repository: Arc<R>,
}

impl<R: ExpenseRepository> ExpenseService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self), fields(user_id = user_id))]
    pub async fn list(&self, user_id: &str) -> Result<Vec<Expense>> {
        self.repository.list_for_user(user_id).await
    }

    #[instrument(skip(self, req), fields(user_id = user_id, category = %req.category))]
    pub async fn create(&self, user_id: &str, req: CreateExpense) -> Result<Expense> {
        validate_amount(req.amount)?;
        validate_category(&req.category)?;

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            amount: req.amount,
            category: req.category.trim().to_string(),
            description: req.description,
            date: req.date,
            payment_method: req.payment_method,
            created_at: Utc::now(),
        };

        self.repository.save(expense.clone()).await?;
        info!(expense_id = %expense.id, "Expense created");
        Ok(expense)
    }

    /// Partial replacement over the allow-listed fields only. Fields present
    /// in the request must pass the same validation as on create.
    #[instrument(skip(self, req), fields(user_id = user_id, expense_id = id))]
    pub async fn update(&self, user_id: &str, id: &str, req: UpdateExpense) -> Result<Expense> {
        let mut expense = self
            .repository
            .find_for_user(id, user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Expense not found".to_string()))?;

        if let Some(amount) = req.amount {
            validate_amount(amount)?;
            expense.amount = amount;
        }
        if let Some(category) = req.category {
            validate_category(&category)?;
            expense.category = category.trim().to_string();
        }
        if let Some(description) = req.description {
            expense.description = Some(description);
        }
        if let Some(date) = req.date {
            expense.date = date;
        }
        if let Some(payment_method) = req.payment_method {
            expense.payment_method = Some(payment_method);
        }

        self.repository.update(expense.clone()).await?;
        debug!(expense_id = %expense.id, "Expense updated");
        Ok(expense)
    }

    #[instrument(skip(self), fields(user_id = user_id, expense_id = id))]
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        let deleted = self.repository.delete_for_user(id, user_id).await?;
        if !deleted {
            return Err(DomainError::NotFound("Expense not found".to_string()).into());
        }
        info!(expense_id = id, "Expense deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = user_id))]
    pub async fn stats(&self, user_id: &str) -> Result<Vec<CategoryTotal>> {
        self.repository.totals_by_category(user_id).await
    }
}

fn validate_amount(amount: Decimal) -> Result<(), DomainError> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::Validation(
            "Amount must be a positive number".to_string(),
        ));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), DomainError> {
    if category.trim().is_empty() {
        return Err(DomainError::Validation("Category is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::expense_repository::InMemoryExpenseRepository;
    use chrono::NaiveDate;

    fn service() -> ExpenseService<InMemoryExpenseRepository> {
        ExpenseService::new(Arc::new(InMemoryExpenseRepository::new()))
    }

    fn create_req(amount: i64, category: &str) -> CreateExpense {
        CreateExpense {
            amount: Decimal::from(amount),
            category: category.to_string(),
            description: None,
            date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            payment_method: None,
        }
    }

    fn assert_validation(err: anyhow::Error) {
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Validation(_))
        ));
    }

    fn assert_not_found(err: anyhow::Error) {
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_then_list_round_trips() {
        let service = service();
        let created = service
            .create(
                "alice",
                CreateExpense {
                    description: Some("groceries".to_string()),
                    payment_method: Some("card".to_string()),
                    ..create_req(500, "Food")
                },
            )
            .await
            .unwrap();

        let listed = service.list("alice").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].amount, Decimal::from(500));
        assert_eq!(listed[0].category, "Food");
        assert_eq!(listed[0].description.as_deref(), Some("groceries"));
        assert_eq!(listed[0].payment_method.as_deref(), Some("card"));
    }

    #[tokio::test]
    async fn test_create_rejects_zero_and_negative_amount() {
        let service = service();
        assert_validation(service.create("alice", create_req(0, "Food")).await.unwrap_err());
        assert_validation(service.create("alice", create_req(-5, "Food")).await.unwrap_err());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_category() {
        let service = service();
        assert_validation(service.create("alice", create_req(10, "  ")).await.unwrap_err());
    }

    #[tokio::test]
    async fn test_update_replaces_only_present_fields() {
        let service = service();
        let created = service
            .create(
                "alice",
                CreateExpense {
                    description: Some("lunch".to_string()),
                    ..create_req(20, "Food")
                },
            )
            .await
            .unwrap();

        let updated = service
            .update(
                "alice",
                &created.id,
                UpdateExpense {
                    amount: Some(Decimal::from(35)),
                    ..UpdateExpense::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.amount, Decimal::from(35));
        // Untouched fields survive the partial update.
        assert_eq!(updated.category, "Food");
        assert_eq!(updated.description.as_deref(), Some("lunch"));
        assert_eq!(updated.date, created.date);
    }

    #[tokio::test]
    async fn test_update_validates_present_fields() {
        let service = service();
        let created = service.create("alice", create_req(20, "Food")).await.unwrap();

        let err = service
            .update(
                "alice",
                &created.id,
                UpdateExpense {
                    amount: Some(Decimal::from(-1)),
                    ..UpdateExpense::default()
                },
            )
            .await
            .unwrap_err();
        assert_validation(err);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let service = service();
        let err = service
            .update("alice", "missing", UpdateExpense::default())
            .await
            .unwrap_err();
        assert_not_found(err);
    }

    #[tokio::test]
    async fn test_update_foreign_expense_is_not_found_and_unchanged() {
        let service = service();
        let created = service.create("alice", create_req(20, "Food")).await.unwrap();

        let err = service
            .update(
                "bob",
                &created.id,
                UpdateExpense {
                    amount: Some(Decimal::from(999)),
                    ..UpdateExpense::default()
                },
            )
            .await
            .unwrap_err();
        assert_not_found(err);

        let listed = service.list("alice").await.unwrap();
        assert_eq!(listed[0].amount, Decimal::from(20));
    }

    #[tokio::test]
    async fn test_delete_foreign_expense_is_not_found() {
        let service = service();
        let created = service.create("alice", create_req(20, "Food")).await.unwrap();

        assert_not_found(service.delete("bob", &created.id).await.unwrap_err());
        assert_eq!(service.list("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stats_sums_per_category() {
        let service = service();
        service.create("alice", create_req(100, "Food")).await.unwrap();
        service.create("alice", create_req(50, "Food")).await.unwrap();
        service.create("alice", create_req(30, "Transport")).await.unwrap();

        let mut stats = service.stats("alice").await.unwrap();
        stats.sort_by(|a, b| a.category.cmp(&b.category));

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].category, "Food");
        assert_eq!(stats[0].total, Decimal::from(150));
        assert_eq!(stats[1].category, "Transport");
        assert_eq!(stats[1].total, Decimal::from(30));
    }
}
