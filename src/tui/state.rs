use crate::client::ApiClient;
use crate::domain::expense::{CategoryTotal, CreateExpense, Expense, UpdateExpense};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::widgets::TableState;
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Login,
    Register,
    Expenses,
    Dashboard,
    Help,
}

/// Draft state for the login/register pages. `name` is only used by the
/// register page.
#[derive(Default, Clone)]
pub struct AuthForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub focus_index: usize,
    pub error: Option<String>,
}

/// Draft state for the add/edit dialog. `id` is set when editing an
/// existing record.
#[derive(Default, Clone)]
pub struct ExpenseForm {
    pub id: Option<String>,
    pub amount: String,
    pub category: String,
    pub description: String,
    pub date: String,
    pub payment_method: String,
    pub focus_index: usize,
    pub error: Option<String>,
}

const EXPENSE_FORM_FIELDS: usize = 5;

#[derive(Default)]
pub struct ExpensesPage {
    pub list: Vec<Expense>,
    pub sel: TableState,
    pub loading: bool,
    pub error: Option<String>,
    pub editing: bool,
    pub form: ExpenseForm,
}

#[derive(Default)]
pub struct DashboardPage {
    pub stats: Vec<CategoryTotal>,
    pub expenses: Vec<Expense>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct App {
    pub api: ApiClient,
    pub tab: Tab,
    pub status: String,
    pub quit: bool,
    pub user_name: Option<String>,
    pub login: AuthForm,
    pub register: AuthForm,
    pub expenses: ExpensesPage,
    pub dashboard: DashboardPage,
}

impl App {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            tab: Tab::Login,
            status: "Tab: next field | Enter: submit | ←/→: login/register | Esc: quit".into(),
            quit: false,
            user_name: None,
            login: AuthForm::default(),
            register: AuthForm::default(),
            expenses: ExpensesPage::default(),
            dashboard: DashboardPage::default(),
        }
    }

    // ============= Data loading =============

    pub async fn refresh_expenses(&mut self) -> anyhow::Result<()> {
        self.expenses.loading = true;
        match self.api.list_expenses().await {
            Ok(list) => {
                self.expenses.list = list;
                self.expenses.error = None;
                self.clamp_selection();
            }
            Err(e) => {
                self.expenses.error = Some(e.to_string());
            }
        }
        self.expenses.loading = false;
        Ok(())
    }

    pub async fn refresh_dashboard(&mut self) -> anyhow::Result<()> {
        self.dashboard.loading = true;
        let result = async {
            let stats = self.api.stats().await?;
            let expenses = self.api.list_expenses().await?;
            Ok::<_, anyhow::Error>((stats, expenses))
        }
        .await;
        match result {
            Ok((stats, expenses)) => {
                self.dashboard.stats = stats;
                self.dashboard.expenses = expenses;
                self.dashboard.error = None;
            }
            Err(e) => {
                self.dashboard.error = Some(e.to_string());
            }
        }
        self.dashboard.loading = false;
        Ok(())
    }

    // ============= Selection helpers =============

    fn clamp_selection(&mut self) {
        let len = self.expenses.list.len();
        match (len, self.expenses.sel.selected()) {
            (0, _) => self.expenses.sel.select(None),
            (n, Some(i)) if i >= n => self.expenses.sel.select(Some(n - 1)),
            (_, None) => self.expenses.sel.select(Some(0)),
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let n = self.expenses.list.len();
        if n == 0 {
            self.expenses.sel.select(None);
            return;
        }
        let cur = self.expenses.sel.selected().unwrap_or(0) as isize;
        let next = (cur + delta).rem_euclid(n as isize) as usize;
        self.expenses.sel.select(Some(next));
    }

    pub fn selected_expense(&self) -> Option<&Expense> {
        let idx = self.expenses.sel.selected()?;
        self.expenses.list.get(idx)
    }

    // ============= Key handling =============

    pub async fn handle_key(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        if k.kind != KeyEventKind::Press {
            return Ok(());
        }

        if self.expenses.editing {
            self.handle_expense_form_input(k).await?;
            return Ok(());
        }

        match self.tab {
            Tab::Login | Tab::Register => self.handle_auth_input(k).await?,
            Tab::Expenses => match k.code {
                KeyCode::Up => self.move_selection(-1),
                KeyCode::Down => self.move_selection(1),
                KeyCode::Char('a') => self.open_add_form(),
                KeyCode::Char('e') => self.open_edit_form(),
                KeyCode::Char('x') | KeyCode::Delete => self.delete_selected().await,
                KeyCode::Char('r') => {
                    self.refresh_expenses().await.ok();
                }
                KeyCode::Char('d') => {
                    self.tab = Tab::Dashboard;
                    self.refresh_dashboard().await.ok();
                }
                KeyCode::Char('?') => self.tab = Tab::Help,
                KeyCode::Char('q') => self.quit = true,
                _ => {}
            },
            Tab::Dashboard => match k.code {
                KeyCode::Char('r') => {
                    self.refresh_dashboard().await.ok();
                }
                KeyCode::Char('b') | KeyCode::Esc => self.tab = Tab::Expenses,
                KeyCode::Char('?') => self.tab = Tab::Help,
                KeyCode::Char('q') => self.quit = true,
                _ => {}
            },
            Tab::Help => match k.code {
                KeyCode::Esc | KeyCode::Char('b') => {
                    self.tab = if self.api.is_authenticated() {
                        Tab::Expenses
                    } else {
                        Tab::Login
                    };
                }
                KeyCode::Char('q') => self.quit = true,
                _ => {}
            },
        }
        Ok(())
    }

    async fn handle_auth_input(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        let field_count = if self.tab == Tab::Register { 3 } else { 2 };
        match k.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Left | KeyCode::Right => {
                self.tab = if self.tab == Tab::Login {
                    Tab::Register
                } else {
                    Tab::Login
                };
            }
            KeyCode::Tab | KeyCode::Down => {
                let form = self.auth_form_mut();
                form.focus_index = (form.focus_index + 1) % field_count;
            }
            KeyCode::BackTab | KeyCode::Up => {
                let form = self.auth_form_mut();
                form.focus_index = (form.focus_index + field_count - 1) % field_count;
            }
            KeyCode::Char(c) => {
                let register = self.tab == Tab::Register;
                let form = self.auth_form_mut();
                match (register, form.focus_index) {
                    (true, 0) => form.name.push(c),
                    (true, 1) | (false, 0) => form.email.push(c),
                    _ => form.password.push(c),
                }
            }
            KeyCode::Backspace => {
                let register = self.tab == Tab::Register;
                let form = self.auth_form_mut();
                match (register, form.focus_index) {
                    (true, 0) => {
                        form.name.pop();
                    }
                    (true, 1) | (false, 0) => {
                        form.email.pop();
                    }
                    _ => {
                        form.password.pop();
                    }
                }
            }
            KeyCode::Enter => {
                if self.tab == Tab::Register {
                    self.submit_register().await;
                } else {
                    self.submit_login().await;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn auth_form_mut(&mut self) -> &mut AuthForm {
        if self.tab == Tab::Register {
            &mut self.register
        } else {
            &mut self.login
        }
    }

    async fn submit_login(&mut self) {
        let form = self.login.clone();
        if form.email.trim().is_empty() || form.password.is_empty() {
            self.login.error = Some("Email and password are required".into());
            return;
        }
        match self.api.login(form.email.trim(), &form.password).await {
            Ok(user) => self.enter_session(user.name).await,
            Err(e) => self.login.error = Some(e.to_string()),
        }
    }

    async fn submit_register(&mut self) {
        let form = self.register.clone();
        if form.name.trim().is_empty() || form.email.trim().is_empty() || form.password.is_empty() {
            self.register.error = Some("Name, email and password are required".into());
            return;
        }
        match self
            .api
            .register(form.name.trim(), form.email.trim(), &form.password)
            .await
        {
            Ok(user) => self.enter_session(user.name).await,
            Err(e) => self.register.error = Some(e.to_string()),
        }
    }

    async fn enter_session(&mut self, name: String) {
        self.status = format!(
            "Signed in as {} | a=add e=edit x=delete r=refresh d=dashboard ?=help q=quit",
            name
        );
        self.user_name = Some(name);
        self.login = AuthForm::default();
        self.register = AuthForm::default();
        self.tab = Tab::Expenses;
        self.refresh_expenses().await.ok();
    }

    // ============= Expense form =============

    fn open_add_form(&mut self) {
        self.expenses.form = ExpenseForm {
            date: chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            ..ExpenseForm::default()
        };
        self.expenses.editing = true;
    }

    fn open_edit_form(&mut self) {
        let Some(expense) = self.selected_expense().cloned() else {
            return;
        };
        self.expenses.form = ExpenseForm {
            id: Some(expense.id),
            amount: expense.amount.to_string(),
            category: expense.category,
            description: expense.description.unwrap_or_default(),
            date: expense.date.format("%Y-%m-%d").to_string(),
            payment_method: expense.payment_method.unwrap_or_default(),
            focus_index: 0,
            error: None,
        };
        self.expenses.editing = true;
    }

    async fn handle_expense_form_input(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        match k.code {
            KeyCode::Esc => {
                // Draft is discarded on cancel
                self.expenses.editing = false;
                self.expenses.form = ExpenseForm::default();
            }
            KeyCode::Tab | KeyCode::Down => {
                self.expenses.form.focus_index =
                    (self.expenses.form.focus_index + 1) % EXPENSE_FORM_FIELDS;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.expenses.form.focus_index = (self.expenses.form.focus_index
                    + EXPENSE_FORM_FIELDS
                    - 1)
                    % EXPENSE_FORM_FIELDS;
            }
            KeyCode::Char(c) => {
                let form = &mut self.expenses.form;
                match form.focus_index {
                    0 => {
                        if c.is_ascii_digit() || c == '.' {
                            form.amount.push(c);
                        }
                    }
                    1 => form.category.push(c),
                    2 => form.description.push(c),
                    3 => {
                        if c.is_ascii_digit() || c == '-' {
                            form.date.push(c);
                        }
                    }
                    _ => form.payment_method.push(c),
                }
            }
            KeyCode::Backspace => {
                let form = &mut self.expenses.form;
                match form.focus_index {
                    0 => {
                        form.amount.pop();
                    }
                    1 => {
                        form.category.pop();
                    }
                    2 => {
                        form.description.pop();
                    }
                    3 => {
                        form.date.pop();
                    }
                    _ => {
                        form.payment_method.pop();
                    }
                }
            }
            KeyCode::Enter => self.submit_expense_form().await,
            _ => {}
        }
        Ok(())
    }

    async fn submit_expense_form(&mut self) {
        let form = self.expenses.form.clone();

        let amount = match Decimal::from_str(form.amount.trim()) {
            Ok(a) => a,
            Err(_) => {
                self.expenses.form.error = Some("Invalid amount format".into());
                return;
            }
        };
        let date = match NaiveDate::parse_from_str(form.date.trim(), "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                self.expenses.form.error = Some("Date format: YYYY-MM-DD".into());
                return;
            }
        };
        if form.category.trim().is_empty() {
            self.expenses.form.error = Some("Category is required".into());
            return;
        }
        let description = non_empty(&form.description);
        let payment_method = non_empty(&form.payment_method);
        let category = form.category.trim().to_string();

        let result = match &form.id {
            Some(id) => self
                .api
                .update_expense(
                    id,
                    &UpdateExpense {
                        amount: Some(amount),
                        category: Some(category),
                        description,
                        date: Some(date),
                        payment_method,
                    },
                )
                .await
                .map(|_| "Expense updated"),
            None => self
                .api
                .create_expense(&CreateExpense {
                    amount,
                    category,
                    description,
                    date,
                    payment_method,
                })
                .await
                .map(|_| "Expense saved"),
        };

        match result {
            Ok(message) => {
                self.expenses.editing = false;
                self.expenses.form = ExpenseForm::default();
                self.status = message.into();
                self.refresh_expenses().await.ok();
            }
            Err(e) => {
                self.expenses.form.error = Some(e.to_string());
            }
        }
    }

    async fn delete_selected(&mut self) {
        let Some(id) = self.selected_expense().map(|e| e.id.clone()) else {
            return;
        };
        match self.api.delete_expense(&id).await {
            Ok(()) => {
                self.status = "Expense deleted".into();
                self.refresh_expenses().await.ok();
            }
            Err(e) => {
                self.status = format!("Delete failed: {}", e);
            }
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
