//! 表单选中状态

use iam_console_gateway::Record;
use serde::{Deserialize, Serialize};

/// 侧边面板模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// 面板关闭
    #[default]
    None,
    Create,
    Edit,
    View,
}

impl SelectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::View => "view",
        }
    }
}

/// 当前打开的记录
///
/// `Create` 模式下 `record` 是可选的种子记录（“基于此创建”）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    pub mode: SelectionMode,
    pub record: Option<Record>,
}

impl SelectionState {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn create(seed: Option<Record>) -> Self {
        Self {
            mode: SelectionMode::Create,
            record: seed,
        }
    }

    pub fn edit(record: Record) -> Self {
        Self {
            mode: SelectionMode::Edit,
            record: Some(record),
        }
    }

    pub fn view(record: Record) -> Self {
        Self {
            mode: SelectionMode::View,
            record: Some(record),
        }
    }

    /// 面板是否打开
    pub fn is_open(&self) -> bool {
        self.mode != SelectionMode::None
    }
}
