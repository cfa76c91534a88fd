// ==========================================
// 课程平台同行评审系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 评审进度 (Review Progress)
// ==========================================
// 三态进度: 未开始 / 进行中 / 已完成
// 由 ReviewProgressAggregator 根据评审完成数推导
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReviewProgress {
    NotStarted, // 未开始
    InProgress, // 进行中
    Completed,  // 已完成
}

impl ReviewProgress {
    /// 转换为 UI 层进度值 (0=未开始, 1=进行中, 2=已完成)
    pub fn as_i32(&self) -> i32 {
        match self {
            ReviewProgress::NotStarted => 0,
            ReviewProgress::InProgress => 1,
            ReviewProgress::Completed => 2,
        }
    }

    /// 转换为数据库存储字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ReviewProgress::NotStarted => "NOT_STARTED",
            ReviewProgress::InProgress => "IN_PROGRESS",
            ReviewProgress::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for ReviewProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 调用者身份 (Identity)
// ==========================================
// 由上层鉴权模块解析后显式传入
// 红线: 不提供全局身份访问器,身份只能作为参数传递
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,    // 稳定标识 (学生 key)
    pub email: String, // 邮箱
}

impl Identity {
    /// 创建新的 Identity 实例
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}
