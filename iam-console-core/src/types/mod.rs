//! 类型定义模块

mod query;
mod selection;

pub use query::{QueryChange, QueryState};
pub use selection::{SelectionMode, SelectionState};

// Re-export gateway 库的公共类型
pub use iam_console_gateway::{
    DEFAULT_PAGE_SIZE, Filters, ListQuery, Page, Record, Sort, SortDirection,
};
