//! 列表查询状态

use iam_console_gateway::{Filters, ListQuery, Sort};
use serde::{Deserialize, Serialize};

/// 列表控制器持有的查询状态
///
/// `page_index` 从 0 开始；只有在转换为 [`ListQuery`] 时才变为 1-based。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    /// 页码（0-based）
    pub page_index: u32,
    /// 每页条数
    pub page_size: u32,
    /// 排序
    pub sort: Option<Sort>,
    /// 多选列过滤
    pub filters: Filters,
    /// 过滤栏中的自由搜索词
    pub params: Vec<String>,
}

impl QueryState {
    /// 第一页、无排序、无过滤
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
            sort: None,
            filters: Filters::new(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_sort(mut self, sort: Option<Sort>) -> Self {
        self.sort = sort;
        self
    }

    /// 转换为 gateway 查询参数（页码 +1）
    pub fn to_list_query(&self) -> ListQuery {
        ListQuery {
            page: self.page_index + 1,
            page_size: self.page_size,
            sort: self.sort.clone(),
            filters: self.filters.clone(),
            params: self.params.clone(),
        }
    }

    /// 页码（1-based，用于显示）
    pub fn display_page(&self) -> u32 {
        self.page_index + 1
    }

    /// 应用一次表格变更，返回新的查询状态
    ///
    /// 过滤或搜索词变化而未显式指定分页时，回到第一页。
    #[must_use]
    pub fn apply(&self, change: &QueryChange) -> Self {
        let mut next = self.clone();
        let mut narrowed = false;

        if let Some(filters) = &change.filters {
            narrowed |= *filters != self.filters;
            next.filters = filters.clone();
        }
        if let Some(params) = &change.params {
            narrowed |= *params != self.params;
            next.params = params.clone();
        }
        if let Some(sort) = &change.sort {
            next.sort = sort.clone();
        }

        match change.pagination {
            Some((page_index, page_size)) => {
                next.page_index = page_index;
                next.page_size = page_size.max(1);
            }
            None if narrowed => next.page_index = 0,
            None => {}
        }
        next
    }
}

/// 一次表格变更事件（分页 / 过滤 / 排序 / 搜索词）
///
/// 未设置的部分保持不变。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryChange {
    /// `(page_index, page_size)`，0-based
    pub pagination: Option<(u32, u32)>,
    pub filters: Option<Filters>,
    /// `Some(None)` 清除排序
    pub sort: Option<Option<Sort>>,
    pub params: Option<Vec<String>>,
}

impl QueryChange {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page(mut self, page_index: u32, page_size: u32) -> Self {
        self.pagination = Some((page_index, page_size));
        self
    }

    #[must_use]
    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = Some(filters);
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(Some(sort));
        self
    }

    #[must_use]
    pub fn clear_sort(mut self) -> Self {
        self.sort = Some(None);
        self
    }

    #[must_use]
    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = Some(params.into_iter().map(Into::into).collect());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_is_one_based() {
        let state = QueryState {
            page_index: 2,
            ..QueryState::new(20)
        };
        let query = state.to_list_query();
        assert_eq!(query.page, 3);
        assert_eq!(query.page_size, 20);
        assert_eq!(state.display_page(), 3);
    }

    #[test]
    fn explicit_pagination_is_kept() {
        let state = QueryState::new(10);
        let next = state.apply(
            &QueryChange::new()
                .page(4, 20)
                .filters(Filters::new().with("status", ["WAITING"])),
        );
        assert_eq!(next.page_index, 4);
        assert_eq!(next.page_size, 20);
        assert_eq!(next.filters.get("status"), ["WAITING"]);
    }

    #[test]
    fn new_filters_restart_from_first_page() {
        let state = QueryState {
            page_index: 3,
            ..QueryState::new(10)
        };
        let next = state.apply(&QueryChange::new().params(["welcome"]));
        assert_eq!(next.page_index, 0);
        assert_eq!(next.params, ["welcome"]);

        // 排序变化不重置页码
        let sorted = state.apply(&QueryChange::new().sort(Sort::descending("id")));
        assert_eq!(sorted.page_index, 3);
        assert_eq!(sorted.apply(&QueryChange::new().clear_sort()).sort, None);
    }
}
