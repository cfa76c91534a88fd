// ==========================================
// 课程平台同行评审系统 - 配置层
// ==========================================
// 职责: 评审策略配置管理,支持全局 + 单元级覆写
// 存储: config_scope / config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, ConfigScope};
