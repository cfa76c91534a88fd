// ==========================================
// 课程平台同行评审系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供上层 Web 平台调用
// ==========================================

pub mod error;
pub mod review_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use review_api::ReviewApi;
