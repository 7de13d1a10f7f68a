//! Screen controllers

mod form;
mod list;

pub use form::{FormController, FormSchema, FormSnapshot};
pub use list::{ListController, ListSnapshot, RefreshOutcome};
