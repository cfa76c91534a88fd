// ==========================================
// 课程平台同行评审系统 - 引擎层
// ==========================================
// 职责: 实现评审业务规则,不拼 SQL
// 红线: Engine 不拼 SQL,所有数据访问经由仓储层
// ==========================================

pub mod assignment;
pub mod lifecycle;
pub mod progress;

// 重导出核心引擎
pub use assignment::ReviewAssignmentEngine;
pub use lifecycle::ReviewLifecycleManager;
pub use progress::ReviewProgressAggregator;
