use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use api_types::{
    budget::MonthlyBudget, expense::DailyExpense, monthly_expense::MonthlyExpense,
    user::Credentials,
};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use engine::BudgetMonth;
use kakeibo_client::{
    ApiClient, BudgetClient, ClientError, LedgerClient, SessionContext, SessionStore, SessionUser,
};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    ui::{self, components::money::format_yen, keymap::AppAction},
};

mod forms;

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    History,
    Expense,
    Budgets,
}

impl Section {
    pub const ALL: [Self; 3] = [Self::History, Self::Expense, Self::Budgets];

    pub fn label(self) -> &'static str {
        match self {
            Self::History => "History",
            Self::Expense => "Expense",
            Self::Budgets => "Budgets",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::History => Self::Expense,
            Self::Expense => Self::Budgets,
            Self::Budgets => Self::History,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::History => Self::Budgets,
            Self::Expense => Self::History,
            Self::Budgets => Self::Expense,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Debug)]
pub struct LoginState {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub mode: LoginMode,
    pub message: Option<String>,
}

impl LoginState {
    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            LoginMode::Login => LoginMode::Register,
            LoginMode::Register => LoginMode::Login,
        };
        self.message = None;
    }

    fn advance_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    fn active_field_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }
}

/// Figures for the current month shown above every tab.
#[derive(Debug)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub budget: Option<MonthlyBudget>,
    pub spent: Option<MonthlyExpense>,
}

impl Dashboard {
    fn new(today: NaiveDate) -> Self {
        Self {
            today,
            budget: None,
            spent: None,
        }
    }

    pub fn month(&self) -> BudgetMonth {
        BudgetMonth::from_date(self.today)
    }

    pub fn spent_amount(&self) -> i64 {
        self.spent.as_ref().map_or(0, |spent| spent.amount)
    }

    pub fn remaining(&self) -> Option<i64> {
        self.budget
            .as_ref()
            .map(|budget| budget.available_amount - self.spent_amount())
    }

    /// Per-day allowance for the rest of the month. Non-finite on the last day.
    pub fn allowance(&self) -> Option<f64> {
        self.budget.as_ref().map(|budget| {
            engine::daily_allowance_on(budget.available_amount, self.spent_amount(), self.today)
        })
    }
}

#[derive(Debug, Default)]
pub struct HistoryState {
    pub items: Vec<DailyExpense>,
    pub selected: usize,
}

impl HistoryState {
    /// Newest first; undated expenses at the end.
    fn replace(&mut self, mut items: Vec<DailyExpense>) {
        items.sort_by(|a, b| {
            b.expense_date
                .cmp(&a.expense_date)
                .then(b.expense_id.cmp(&a.expense_id))
        });
        self.items = items;
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
    }

    pub fn total(&self) -> i64 {
        engine::ledger_total(&self.items)
    }

    fn selected_item(&self) -> Option<&DailyExpense> {
        self.items.get(self.selected)
    }

    fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.items.len() - 1);
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    First,
    Amount,
}

impl FormField {
    fn toggle(self) -> Self {
        match self {
            Self::First => Self::Amount,
            Self::Amount => Self::First,
        }
    }
}

/// Two-field form: a date (expense) or a month (budget), then an amount.
#[derive(Debug)]
pub struct FormState {
    pub first: String,
    pub amount: String,
    pub focus: FormField,
    pub message: Option<String>,
}

impl FormState {
    fn new(first: String) -> Self {
        Self {
            first,
            amount: String::new(),
            focus: FormField::Amount,
            message: None,
        }
    }

    fn active_field_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::First => &mut self.first,
            FormField::Amount => &mut self.amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub section: Section,
    pub login: LoginState,
    pub user: Option<SessionUser>,
    pub dashboard: Dashboard,
    pub history: HistoryState,
    pub expense: FormState,
    pub budget: FormState,
    pub toast: Option<ToastState>,
    pub base_url: String,
}

impl AppState {
    fn new(base_url: &str, today: NaiveDate) -> Self {
        Self {
            screen: Screen::Login,
            section: Section::History,
            login: LoginState {
                username: String::new(),
                password: String::new(),
                focus: LoginField::Username,
                mode: LoginMode::Login,
                message: None,
            },
            user: None,
            dashboard: Dashboard::new(today),
            history: HistoryState::default(),
            expense: FormState::new(today.format("%Y-%m-%d").to_string()),
            budget: FormState::new(BudgetMonth::from_date(today).to_string()),
            toast: None,
            base_url: base_url.to_string(),
        }
    }

    fn show_toast(&mut self, message: impl Into<String>, level: ToastLevel) {
        self.toast = Some(ToastState {
            message: message.into(),
            level,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    fn expire_toast(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|toast| toast.expires_at <= now) {
            self.toast = None;
        }
    }

    /// Back to the login screen, dropping everything loaded for the user.
    fn sign_out(&mut self, message: Option<String>) {
        let today = self.dashboard.today;
        let username = self
            .user
            .take()
            .map(|user| user.user_name)
            .unwrap_or_default();
        *self = Self::new(&self.base_url, today);
        self.login.username = username;
        self.login.message = message;
    }
}

pub struct App {
    api: ApiClient,
    ledger: LedgerClient,
    budgets: BudgetClient,
    timezone: Tz,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|_| AppError::Timezone(config.timezone.clone()))?;
        let session = Arc::new(SessionContext::new(SessionStore::new(&config.session_path)));
        let api = ApiClient::new(&config.base_url, session)?;

        Ok(Self {
            state: AppState::new(api.base_url(), today_in(timezone)),
            ledger: LedgerClient::new(api.clone()),
            budgets: BudgetClient::new(api.clone()),
            api,
            timezone,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        match self.api.session().restore() {
            Ok(Some(user)) => {
                tracing::info!(user_id = user.id, "restored session");
                self.enter_home(user).await;
            }
            Ok(None) => {}
            Err(err) => self.state.login.message = Some(err.user_message()),
        }

        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key).await;
                    }
                    _ => {}
                }
            }
            self.state.expire_toast(Instant::now());
        }

        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        let action = ui::keymap::map_key(key);
        match self.state.screen {
            Screen::Login => self.handle_login_action(action).await,
            Screen::Home => self.handle_home_action(action).await,
        }
    }

    async fn handle_login_action(&mut self, action: AppAction) {
        let login = &mut self.state.login;
        match action {
            AppAction::Quit => self.should_quit = true,
            AppAction::ToggleMode => login.toggle_mode(),
            AppAction::NextField | AppAction::Up | AppAction::Down => login.advance_focus(),
            AppAction::Backspace => {
                login.active_field_mut().pop();
            }
            AppAction::Input(ch) => login.active_field_mut().push(ch),
            AppAction::Cancel => login.message = None,
            AppAction::Submit => self.attempt_login().await,
            _ => {}
        }
    }

    async fn handle_home_action(&mut self, action: AppAction) {
        match action {
            AppAction::Quit => {
                self.should_quit = true;
                return;
            }
            AppAction::Logout => {
                self.logout();
                return;
            }
            AppAction::ToggleMode | AppAction::Refresh => {
                self.refresh().await;
                return;
            }
            AppAction::NextTab => {
                self.state.section = self.state.section.next();
                return;
            }
            AppAction::PrevTab => {
                self.state.section = self.state.section.prev();
                return;
            }
            AppAction::Cancel => {
                self.state.toast = None;
                return;
            }
            _ => {}
        }

        match self.state.section {
            Section::History => match action {
                AppAction::Up => self.state.history.select_prev(),
                AppAction::Down => self.state.history.select_next(),
                AppAction::Delete => self.delete_selected().await,
                AppAction::Input('q') => self.should_quit = true,
                _ => {}
            },
            Section::Expense => {
                if edit_form(&mut self.state.expense, action) {
                    self.submit_expense().await;
                }
            }
            Section::Budgets => {
                if edit_form(&mut self.state.budget, action) {
                    self.submit_budget().await;
                }
            }
        }
    }

    async fn attempt_login(&mut self) {
        let user_name = self.state.login.username.trim().to_string();
        let password = self.state.login.password.clone();
        if user_name.is_empty() || password.is_empty() {
            self.state.login.message = Some("Fill in user name and password.".to_string());
            return;
        }
        let credentials = Credentials {
            user_name,
            password,
        };

        match self.state.login.mode {
            LoginMode::Register => match self.api.register(&credentials).await {
                Ok(()) => {
                    self.state.login.mode = LoginMode::Login;
                    self.state.login.password.clear();
                    self.state.login.focus = LoginField::Password;
                    self.state.login.message =
                        Some("Registered. Log in with your new account.".to_string());
                }
                Err(err) => {
                    tracing::warn!("registration failed: {err}");
                    self.state.login.message = Some(err.user_message());
                }
            },
            LoginMode::Login => match self.api.login(&credentials).await {
                Ok(user) => {
                    self.state.login.password.clear();
                    self.state.login.message = None;
                    self.enter_home(user).await;
                }
                Err(err) => {
                    tracing::warn!("login failed: {err}");
                    self.state.login.message = Some(err.user_message());
                }
            },
        }
    }

    async fn enter_home(&mut self, user: SessionUser) {
        self.state.user = Some(user);
        self.state.screen = Screen::Home;
        self.state.section = Section::History;
        self.refresh().await;
    }

    /// Reloads the dashboard figures and the history.
    async fn refresh(&mut self) {
        let Some(user_id) = self.state.user.as_ref().map(|user| user.id) else {
            return;
        };
        let today = today_in(self.timezone);
        let month = BudgetMonth::from_date(today);
        self.state.dashboard.today = today;

        let budget = match self.budgets.current_budget(user_id, month).await {
            Ok(budget) => budget,
            Err(err) => return self.report(err),
        };
        let spent = match self.ledger.monthly_expense(user_id, month).await {
            Ok(spent) => spent,
            Err(err) => return self.report(err),
        };
        let expenses = match self.ledger.list_expenses(user_id).await {
            Ok(expenses) => expenses,
            Err(err) => return self.report(err),
        };

        self.state.dashboard.budget = budget;
        self.state.dashboard.spent = spent;
        self.state.history.replace(expenses);
        tracing::debug!(user_id, month = %month, "dashboard refreshed");
    }

    async fn submit_expense(&mut self) {
        let Some(user_id) = self.state.user.as_ref().map(|user| user.id) else {
            return;
        };
        let form = &mut self.state.expense;
        let parsed = forms::parse_date(&form.first)
            .and_then(|date| forms::parse_amount(&form.amount).map(|amount| (date, amount)));
        let (date, amount) = match parsed {
            Ok(parsed) => parsed,
            Err(message) => {
                form.message = Some(message);
                return;
            }
        };

        match self.ledger.create_expense(user_id, date, amount).await {
            Ok(update) => {
                self.state.expense.amount.clear();
                self.state.expense.message = None;
                match update.sync_warning() {
                    Some(warning) => self.state.show_toast(warning, ToastLevel::Error),
                    None => self.state.show_toast(
                        format!("Saved an expense of {}.", format_yen(amount)),
                        ToastLevel::Success,
                    ),
                }
                self.refresh().await;
            }
            Err(err) => self.report_in_form(err, Section::Expense),
        }
    }

    async fn delete_selected(&mut self) {
        let Some(expense) = self.state.history.selected_item().cloned() else {
            self.state.show_toast("Nothing to delete.", ToastLevel::Info);
            return;
        };

        match self.ledger.delete_expense(&expense).await {
            Ok(update) => {
                match update.sync_warning() {
                    Some(warning) => self.state.show_toast(warning, ToastLevel::Error),
                    None => self.state.show_toast(
                        format!("Deleted an expense of {}.", format_yen(expense.amount)),
                        ToastLevel::Success,
                    ),
                }
                self.refresh().await;
            }
            Err(err) => self.report(err),
        }
    }

    async fn submit_budget(&mut self) {
        let Some(user_id) = self.state.user.as_ref().map(|user| user.id) else {
            return;
        };
        let form = &mut self.state.budget;
        let parsed = forms::parse_month(&form.first)
            .and_then(|month| forms::parse_amount(&form.amount).map(|amount| (month, amount)));
        let (month, amount) = match parsed {
            Ok(parsed) => parsed,
            Err(message) => {
                form.message = Some(message);
                return;
            }
        };

        match self
            .budgets
            .create_or_update_budget(user_id, month, amount)
            .await
        {
            Ok(budget) => {
                self.state.budget.first = budget.budget_month;
                self.state.budget.amount.clear();
                self.state.budget.message = None;
                self.state.show_toast(
                    format!("Budget for {month} set to {}.", format_yen(amount)),
                    ToastLevel::Success,
                );
                self.refresh().await;
            }
            Err(err) => self.report_in_form(err, Section::Budgets),
        }
    }

    fn logout(&mut self) {
        if let Err(err) = self.api.logout() {
            tracing::warn!("failed to clear session file: {err}");
        }
        self.state.sign_out(Some("Logged out.".to_string()));
    }

    /// Shows a failed action to the user. An authentication failure ends the
    /// session.
    fn report(&mut self, err: ClientError) {
        tracing::warn!("action failed: {err}");
        match err {
            ClientError::MissingToken | ClientError::Unauthorized(_) => {
                if let Err(clear_err) = self.api.logout() {
                    tracing::warn!("failed to clear session file: {clear_err}");
                }
                self.state
                    .sign_out(Some("Session expired. Please log in again.".to_string()));
            }
            other => self.state.show_toast(other.user_message(), ToastLevel::Error),
        }
    }

    /// Like [`report`](Self::report), but validation problems stay next to the
    /// form that caused them.
    fn report_in_form(&mut self, err: ClientError, section: Section) {
        let form = match section {
            Section::Budgets => &mut self.state.budget,
            _ => &mut self.state.expense,
        };
        match err {
            ClientError::Validation(_) | ClientError::Engine(_) => {
                tracing::warn!("rejected input: {err}");
                form.message = Some(err.user_message());
            }
            other => self.report(other),
        }
    }
}

/// Applies an editing action to a form. Returns `true` on submit.
fn edit_form(form: &mut FormState, action: AppAction) -> bool {
    match action {
        AppAction::NextField | AppAction::Up | AppAction::Down => form.focus = form.focus.toggle(),
        AppAction::Backspace => {
            form.active_field_mut().pop();
        }
        AppAction::Input(ch) => form.active_field_mut().push(ch),
        AppAction::Submit => return true,
        _ => {}
    }
    false
}

fn today_in(timezone: Tz) -> NaiveDate {
    Utc::now().with_timezone(&timezone).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(id: i64, day: Option<u32>, amount: i64) -> DailyExpense {
        DailyExpense {
            expense_id: id,
            user_id: 1,
            expense_date: day.map(|d| date(2025, 1, d)),
            amount,
        }
    }

    #[test]
    fn sections_cycle_both_ways() {
        assert_eq!(Section::History.next(), Section::Expense);
        assert_eq!(Section::Budgets.next(), Section::History);
        assert_eq!(Section::History.prev(), Section::Budgets);
    }

    #[test]
    fn allowance_needs_a_budget() {
        let mut dashboard = Dashboard::new(date(2025, 1, 10));
        assert_eq!(dashboard.allowance(), None);

        dashboard.budget = Some(MonthlyBudget {
            id: Some(1),
            user_id: 1,
            budget_month: "2025-01".to_string(),
            available_amount: 2300,
            updated_at: None,
        });
        dashboard.spent = Some(MonthlyExpense {
            id: Some(2),
            user_id: 1,
            budget_month: "2025-01".to_string(),
            amount: 300,
            updated_at: None,
        });

        // 2000 left over 21 days.
        assert_eq!(dashboard.allowance(), Some(95.0));
        assert_eq!(dashboard.remaining(), Some(2000));
    }

    #[test]
    fn allowance_is_not_finite_on_last_day() {
        let mut dashboard = Dashboard::new(date(2025, 1, 31));
        dashboard.budget = Some(MonthlyBudget {
            id: None,
            user_id: 1,
            budget_month: "2025-01".to_string(),
            available_amount: 1000,
            updated_at: None,
        });
        assert!(dashboard.allowance().is_some_and(|value| !value.is_finite()));
    }

    #[test]
    fn history_is_newest_first_and_keeps_selection_in_range() {
        let mut history = HistoryState {
            items: Vec::new(),
            selected: 5,
        };
        history.replace(vec![
            expense(1, Some(3), 100),
            expense(2, None, 50),
            expense(3, Some(9), 200),
        ]);

        let ids: Vec<i64> = history.items.iter().map(|e| e.expense_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(history.selected, 2);
        assert_eq!(history.total(), 350);

        history.replace(Vec::new());
        assert_eq!(history.selected, 0);
        assert!(history.selected_item().is_none());
    }

    #[test]
    fn form_editing_and_submit() {
        let mut form = FormState::new("2025-01-05".to_string());
        assert_eq!(form.focus, FormField::Amount);

        assert!(!edit_form(&mut form, AppAction::Input('5')));
        assert!(!edit_form(&mut form, AppAction::Input('0')));
        assert!(!edit_form(&mut form, AppAction::Backspace));
        assert_eq!(form.amount, "5");

        edit_form(&mut form, AppAction::NextField);
        edit_form(&mut form, AppAction::Backspace);
        assert_eq!(form.first, "2025-01-0");

        assert!(edit_form(&mut form, AppAction::Submit));
    }

    #[test]
    fn sign_out_keeps_user_name_only() {
        let mut state = AppState::new("http://localhost:8080", date(2025, 1, 10));
        state.screen = Screen::Home;
        state.user = Some(SessionUser {
            id: 1,
            user_name: "taro".to_string(),
        });
        state.history.replace(vec![expense(1, Some(3), 100)]);

        state.sign_out(Some("Logged out.".to_string()));

        assert_eq!(state.screen, Screen::Login);
        assert!(state.user.is_none());
        assert!(state.history.items.is_empty());
        assert_eq!(state.login.username, "taro");
        assert_eq!(state.login.message.as_deref(), Some("Logged out."));
    }

    #[test]
    fn toast_expires() {
        let mut state = AppState::new("http://localhost:8080", date(2025, 1, 10));
        state.show_toast("saved", ToastLevel::Success);
        state.expire_toast(Instant::now());
        assert!(state.toast.is_some());

        state.expire_toast(Instant::now() + TOAST_TTL);
        assert!(state.toast.is_none());
    }
}
