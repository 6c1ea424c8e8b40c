use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Cell, Clear, Paragraph, Row, Table},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::tui::charts;
use crate::tui::state::{App, Tab};

pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // top tabs | main content | bottom status bar
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(area);

    let titles = ["Login", "Register", "Expenses", "Dashboard", "Help"]
        .into_iter()
        .map(|t| Line::from(Span::raw(t)))
        .collect::<Vec<_>>();
    let bar_title = match &app.user_name {
        Some(name) => format!("Expense Tracker [{}]", name),
        None => "Expense Tracker".to_string(),
    };
    let tabs = ratatui::widgets::Tabs::new(titles)
        .select(match app.tab {
            Tab::Login => 0,
            Tab::Register => 1,
            Tab::Expenses => 2,
            Tab::Dashboard => 3,
            Tab::Help => 4,
        })
        .block(Block::default().borders(Borders::ALL).title(bar_title))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(tabs, root[0]);

    match app.tab {
        Tab::Login => draw_login(f, root[1], app),
        Tab::Register => draw_register(f, root[1], app),
        Tab::Expenses => draw_expenses(f, root[1], app),
        Tab::Dashboard => draw_dashboard(f, root[1], app),
        Tab::Help => draw_help(f, root[1]),
    }

    let status = Paragraph::new(app.status.clone())
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, root[2]);

    if app.expenses.editing {
        let modal = center_rect(root[1], 60, 14);
        f.render_widget(Clear, modal);
        draw_expense_modal(f, modal, app);
    }
}

// Auth pages

fn draw_login(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.login;
    let (m_email, m_password) = match form.focus_index {
        0 => ("  <editing>", ""),
        _ => ("", "  <editing>"),
    };

    let lines = vec![
        format!("Email    : {}{}", form.email, m_email),
        format!("Password : {}{}", mask(&form.password), m_password),
        "".into(),
        "Tab: switch field | Enter: sign in | ←/→: go to Register".into(),
        form.error.clone().unwrap_or_default(),
    ]
    .join("\n");

    let boxed = center_rect(area, 56, 9);
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Sign In"));
    f.render_widget(p, boxed);
}

fn draw_register(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.register;
    let (m_name, m_email, m_password) = match form.focus_index {
        0 => ("  <editing>", "", ""),
        1 => ("", "  <editing>", ""),
        _ => ("", "", "  <editing>"),
    };

    let lines = vec![
        format!("Name     : {}{}", form.name, m_name),
        format!("Email    : {}{}", form.email, m_email),
        format!("Password : {}{}", mask(&form.password), m_password),
        "".into(),
        "Tab: switch field | Enter: create account | ←/→: go to Login".into(),
        form.error.clone().unwrap_or_default(),
    ]
    .join("\n");

    let boxed = center_rect(area, 56, 10);
    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Create Account"));
    f.render_widget(p, boxed);
}

// Expenses page

fn draw_expenses(f: &mut Frame, area: Rect, app: &mut App) {
    let header = Row::new(vec!["Date", "Category", "Description", "Payment", "Amount"]).height(1);

    let body: Vec<Row> = app
        .expenses
        .list
        .iter()
        .map(|e| {
            Row::new(vec![
                Cell::from(e.date.to_string()),
                Cell::from(e.category.clone()),
                Cell::from(e.description.clone().unwrap_or_default()),
                Cell::from(e.payment_method.clone().unwrap_or_default()),
                Cell::from(fmt_money(e.amount)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(16),
        Constraint::Percentage(40),
        Constraint::Length(12),
        Constraint::Length(12),
    ];

    let title = if app.expenses.loading {
        "Expenses (loading…)".to_string()
    } else if let Some(err) = &app.expenses.error {
        format!("Expenses (error: {})", err)
    } else {
        "Expenses  (a=add, e=edit, x=delete, r=refresh, d=dashboard)".to_string()
    };

    let mut sel = app.expenses.sel.clone();
    let table = Table::new(body, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    f.render_stateful_widget(table, area, &mut sel);
    app.expenses.sel = sel;
}

fn draw_expense_modal(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.expenses.form;

    let markers: [&str; 5] = std::array::from_fn(|i| {
        if i == form.focus_index { "  <editing>" } else { "" }
    });

    let title = if form.id.is_some() {
        "Edit Expense"
    } else {
        "New Expense"
    };

    let lines = vec![
        format!("Amount      : {}{}", form.amount, markers[0]),
        format!("Category    : {}{}", form.category, markers[1]),
        format!("Description : {}{}", form.description, markers[2]),
        format!("Date        : {}{}", form.date, markers[3]),
        format!("Payment     : {}{}", form.payment_method, markers[4]),
        "".into(),
        "Tab: switch field | Enter: save | Esc: cancel".into(),
        form.error.clone().unwrap_or_default(),
    ]
    .join("\n");

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, area);
}

// Dashboard page

fn draw_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(8),
        ])
        .split(area);

    let page = &app.dashboard;

    // Summary
    let summary = if page.loading {
        "Loading…".to_string()
    } else if let Some(err) = &page.error {
        format!("Failed to load data: {}", err)
    } else {
        let total = charts::grand_total(&page.stats);
        let top = charts::top_category(&page.stats)
            .map(|t| t.category.clone())
            .unwrap_or_else(|| "No data".to_string());
        format!(
            "Total spent: {}   Avg monthly: {}   Top category: {}   Records: {}",
            fmt_money(total),
            fmt_money(total / Decimal::from(12)),
            top,
            page.expenses.len()
        )
    };
    let p = Paragraph::new(summary).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Dashboard  (r=refresh, b=back)"),
    );
    f.render_widget(p, rows[0]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    // Per-category totals
    let header = Row::new(vec!["Category", "Total"]).height(1);
    let mut stats = page.stats.clone();
    stats.sort_by(|a, b| b.total.cmp(&a.total));
    let body: Vec<Row> = stats
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(s.category.clone()),
                Cell::from(fmt_money(s.total)),
            ])
        })
        .collect();
    let table = Table::new(body, [Constraint::Percentage(60), Constraint::Percentage(40)])
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("By Category"));
    f.render_widget(table, cols[0]);

    // Monthly bar chart
    let monthly = charts::monthly_totals(&page.expenses);
    let bars: Vec<(&str, u64)> = monthly
        .iter()
        .map(|(label, total)| (label.as_str(), total.round().to_u64().unwrap_or(0)))
        .collect();
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Monthly Spending"))
        .data(&bars)
        .bar_width(7)
        .bar_gap(1);
    f.render_widget(chart, cols[1]);

    // Recent expenses
    let recent: Vec<Line> = page
        .expenses
        .iter()
        .take(5)
        .map(|e| {
            Line::from(format!(
                "{}  {}  {}  {}",
                e.date,
                e.category,
                e.description.clone().unwrap_or_default(),
                fmt_money(e.amount)
            ))
        })
        .collect();
    let p = Paragraph::new(recent)
        .block(Block::default().borders(Borders::ALL).title("Recent Expenses"));
    f.render_widget(p, rows[2]);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help_text = vec![
        "Login / Register:",
        "  Tab      : Switch field",
        "  ←/→      : Switch between Login and Register",
        "  Enter    : Submit",
        "  Esc      : Quit",
        "",
        "Expenses:",
        "  Up/Down  : Navigate list",
        "  a        : Add expense",
        "  e        : Edit selected expense",
        "  x/Del    : Delete selected expense",
        "  r        : Refresh list",
        "  d        : Open dashboard",
        "  q        : Quit",
        "",
        "Add/Edit dialog:",
        "  Tab      : Switch field",
        "  Enter    : Save",
        "  Esc      : Cancel (discards the draft)",
        "",
        "Dashboard:",
        "  r        : Refresh",
        "  b/Esc    : Back to expenses",
    ]
    .join("\n");

    let p = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Help & Keybindings"));
    f.render_widget(p, area);
}

fn mask(s: &str) -> String {
    "*".repeat(s.chars().count())
}

fn fmt_money(d: Decimal) -> String {
    d.round_dp(2).to_string()
}

fn center_rect(rect: Rect, w: u16, h: u16) -> Rect {
    let x = rect.x + rect.width.saturating_sub(w) / 2;
    let y = rect.y + rect.height.saturating_sub(h) / 2;
    Rect {
        x,
        y,
        width: w.min(rect.width),
        height: h.min(rect.height),
    }
}
