// ==========================================
// 课程平台同行评审系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 同行评审分配与作业提交跟踪子系统
// (Web 路由/模板渲染/登录鉴权由上层平台提供)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 评审策略配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Identity, ReviewProgress};

// 领域实体
pub use domain::{
    ReviewAssignment, ReviewView, StudentWork, SubmissionAnswer, WorkDocument, WorkKey,
};

// 引擎
pub use engine::{ReviewAssignmentEngine, ReviewLifecycleManager, ReviewProgressAggregator};

// 仓储
pub use repository::{RepositoryError, RepositoryResult, StudentWorkRepository};

// 配置
pub use config::{config_keys, ConfigManager, ConfigScope};

// API
pub use api::{ApiError, ApiResult, ReviewApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "课程平台同行评审系统";
