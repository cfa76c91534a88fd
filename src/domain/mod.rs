// ==========================================
// 课程平台同行评审系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod types;
pub mod work;

// 重导出核心类型
pub use types::{Identity, ReviewProgress};
pub use work::{
    ReviewAssignment, ReviewView, StudentWork, SubmissionAnswer, WorkDocument, WorkKey,
};
