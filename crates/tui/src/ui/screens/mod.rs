pub mod budgets;
pub mod dashboard;
pub mod expense;
pub mod history;
pub mod login;

mod form;
