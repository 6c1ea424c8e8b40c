use crate::domain::expense::{CategoryTotal, Expense};
use crate::domain::repository::ExpenseRepository;
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct InMemoryExpenseRepository {
    storage: Arc<RwLock<HashMap<String, Expense>>>,
}

impl InMemoryExpenseRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryExpenseRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryExpenseRepository {
    #[instrument(skip(self), fields(expense_id = %expense.id, user_id = %expense.user_id))]
    async fn save(&self, expense: Expense) -> Result<()> {
        let mut storage = self.storage.write().await;
        storage.insert(expense.id.clone(), expense.clone());
        debug!(expense_id = %expense.id, "Expense saved to memory storage");
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = user_id))]
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Expense>> {
        let storage = self.storage.read().await;
        let mut expenses: Vec<Expense> = storage
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        // Newest date first; creation time breaks ties within a day.
        expenses.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        trace!(count = expenses.len(), "Listed expenses for user");
        Ok(expenses)
    }

    #[instrument(skip(self), fields(expense_id = id, user_id = user_id))]
    async fn find_for_user(&self, id: &str, user_id: &str) -> Result<Option<Expense>> {
        let storage = self.storage.read().await;
        let expense = storage
            .get(id)
            .filter(|e| e.user_id == user_id)
            .cloned();
        Ok(expense)
    }

    #[instrument(skip(self), fields(expense_id = %expense.id))]
    async fn update(&self, expense: Expense) -> Result<()> {
        let mut storage = self.storage.write().await;
        storage.insert(expense.id.clone(), expense);
        Ok(())
    }

    #[instrument(skip(self), fields(expense_id = id, user_id = user_id))]
    async fn delete_for_user(&self, id: &str, user_id: &str) -> Result<bool> {
        let mut storage = self.storage.write().await;
        let owned = storage.get(id).is_some_and(|e| e.user_id == user_id);
        if owned {
            storage.remove(id);
            debug!(expense_id = id, "Expense deleted");
        }
        Ok(owned)
    }

    #[instrument(skip(self), fields(user_id = user_id))]
    async fn totals_by_category(&self, user_id: &str) -> Result<Vec<CategoryTotal>> {
        let storage = self.storage.read().await;
        let mut totals: HashMap<String, Decimal> = HashMap::new();
        for expense in storage.values().filter(|e| e.user_id == user_id) {
            *totals.entry(expense.category.clone()).or_default() += expense.amount;
        }
        Ok(totals
            .into_iter()
            .map(|(category, total)| CategoryTotal { category, total })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn expense(id: &str, user_id: &str, amount: i64, category: &str, date: &str) -> Expense {
        Expense {
            id: id.to_string(),
            user_id: user_id.to_string(),
            amount: Decimal::from(amount),
            category: category.to_string(),
            description: None,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            payment_method: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_owner() {
        let repo = InMemoryExpenseRepository::new();
        repo.save(expense("e1", "alice", 10, "Food", "2025-05-01"))
            .await
            .unwrap();
        repo.save(expense("e2", "bob", 20, "Food", "2025-05-02"))
            .await
            .unwrap();

        let alice = repo.list_for_user("alice").await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].id, "e1");

        let bob = repo.list_for_user("bob").await.unwrap();
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].id, "e2");
    }

    #[tokio::test]
    async fn test_list_orders_by_date_descending() {
        let repo = InMemoryExpenseRepository::new();
        repo.save(expense("old", "alice", 10, "Food", "2025-01-15"))
            .await
            .unwrap();
        repo.save(expense("new", "alice", 20, "Food", "2025-06-15"))
            .await
            .unwrap();
        repo.save(expense("mid", "alice", 30, "Food", "2025-03-15"))
            .await
            .unwrap();

        let listed = repo.list_for_user("alice").await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_find_for_user_hides_foreign_records() {
        let repo = InMemoryExpenseRepository::new();
        repo.save(expense("e1", "alice", 10, "Food", "2025-05-01"))
            .await
            .unwrap();

        assert!(repo.find_for_user("e1", "alice").await.unwrap().is_some());
        assert!(repo.find_for_user("e1", "bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_for_user_respects_ownership() {
        let repo = InMemoryExpenseRepository::new();
        repo.save(expense("e1", "alice", 10, "Food", "2025-05-01"))
            .await
            .unwrap();

        // Bob cannot delete Alice's expense and the record survives.
        assert!(!repo.delete_for_user("e1", "bob").await.unwrap());
        assert!(repo.find_for_user("e1", "alice").await.unwrap().is_some());

        assert!(repo.delete_for_user("e1", "alice").await.unwrap());
        assert!(repo.find_for_user("e1", "alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_returns_false() {
        let repo = InMemoryExpenseRepository::new();
        assert!(!repo.delete_for_user("missing", "alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_totals_group_by_category() {
        let repo = InMemoryExpenseRepository::new();
        repo.save(expense("e1", "alice", 100, "Food", "2025-05-01"))
            .await
            .unwrap();
        repo.save(expense("e2", "alice", 50, "Food", "2025-05-02"))
            .await
            .unwrap();
        repo.save(expense("e3", "alice", 30, "Transport", "2025-05-03"))
            .await
            .unwrap();
        // Another user's expenses must not leak into the totals.
        repo.save(expense("e4", "bob", 999, "Food", "2025-05-04"))
            .await
            .unwrap();

        let totals = repo.totals_by_category("alice").await.unwrap();
        let by_category: HashMap<String, Decimal> = totals
            .into_iter()
            .map(|t| (t.category, t.total))
            .collect();

        assert_eq!(by_category.len(), 2);
        assert_eq!(by_category["Food"], Decimal::from(150));
        assert_eq!(by_category["Transport"], Decimal::from(30));
    }

    #[tokio::test]
    async fn test_totals_empty_for_user_without_expenses() {
        let repo = InMemoryExpenseRepository::new();
        let totals = repo.totals_by_category("alice").await.unwrap();
        assert!(totals.is_empty());
    }
}
