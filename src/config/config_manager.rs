// ==========================================
// 课程平台同行评审系统 - 配置管理器
// ==========================================
// 职责: 评审策略配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 覆写顺序: 单元级 > 全局 > 内置默认值
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 配置键全集
pub mod config_keys {
    /// 单元要求的最少完成评审数 (进度判定阈值)
    pub const REVIEW_MIN_COUNT: &str = "review.min_count";
}

/// 内置默认: 最少完成评审数
pub const DEFAULT_REVIEW_MIN_COUNT: u32 = 2;

// ==========================================
// ConfigScope - 配置作用域
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigScope {
    /// 全局默认
    Global,
    /// 单元级覆写
    Unit(String),
}

impl ConfigScope {
    /// 作用域 ID (config_scope.scope_id)
    pub fn scope_id(&self) -> String {
        match self {
            ConfigScope::Global => "global".to_string(),
            ConfigScope::Unit(unit_id) => format!("unit/{}", unit_id),
        }
    }

    fn scope_type(&self) -> &'static str {
        match self {
            ConfigScope::Global => "GLOBAL",
            ConfigScope::Unit(_) => "UNIT",
        }
    }

    fn scope_key(&self) -> &str {
        match self {
            ConfigScope::Global => "global",
            ConfigScope::Unit(unit_id) => unit_id,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取指定作用域的配置值
    fn get_config_value(
        &self,
        scope: &ConfigScope,
        key: &str,
    ) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![scope.scope_id(), key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值 (作用域不存在时自动登记)
    pub fn set_config_value(
        &self,
        scope: &ConfigScope,
        key: &str,
        value: &str,
    ) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
               VALUES (?1, ?2, ?3)"#,
            params![scope.scope_id(), scope.scope_type(), scope.scope_key()],
        )?;

        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value, updated_at)
               VALUES (?1, ?2, ?3, datetime('now'))
               ON CONFLICT(scope_id, key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = excluded.updated_at"#,
            params![scope.scope_id(), key, value],
        )?;

        Ok(())
    }

    /// 获取单元要求的最少完成评审数
    ///
    /// 覆写顺序: 单元级 > 全局 > 内置默认值
    pub fn get_review_min_count(&self, unit_id: &str) -> Result<u32, Box<dyn Error>> {
        let unit_scope = ConfigScope::Unit(unit_id.to_string());

        let raw = match self.get_config_value(&unit_scope, config_keys::REVIEW_MIN_COUNT)? {
            Some(v) => Some(v),
            None => self.get_config_value(&ConfigScope::Global, config_keys::REVIEW_MIN_COUNT)?,
        };

        match raw {
            Some(v) => {
                let count: u32 = v.parse().map_err(|_| {
                    format!("配置值非法: {}={}", config_keys::REVIEW_MIN_COUNT, v)
                })?;
                Ok(count)
            }
            None => Ok(DEFAULT_REVIEW_MIN_COUNT),
        }
    }

    /// 设置最少完成评审数
    pub fn set_review_min_count(
        &self,
        scope: &ConfigScope,
        count: u32,
    ) -> Result<(), Box<dyn Error>> {
        self.set_config_value(scope, config_keys::REVIEW_MIN_COUNT, &count.to_string())
    }
}
