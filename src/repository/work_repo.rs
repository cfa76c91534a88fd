// ==========================================
// 课程平台同行评审系统 - 作业仓储
// ==========================================
// 职责: student_work 表的数据访问
// 约束: 所有查询使用参数化,防止 SQL 注入
// 并发: update 使用乐观锁 (revision 字段),
//       防止整行覆盖导致并发写入互相丢失 reviewers 条目
// ==========================================

use crate::domain::work::{StudentWork, WorkDocument, WorkKey};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::warn;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 乐观锁冲突时的最大重试次数
pub const MAX_UPDATE_RETRIES: u32 = 3;

// ==========================================
// StudentWorkRepository - 作业仓储
// ==========================================
pub struct StudentWorkRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentWorkRepository {
    /// 创建新的 StudentWorkRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入作业 (整行覆盖,后写覆盖先写)
    ///
    /// 学生重新提交作业时走此入口: 若记录已存在,文档被完整替换,
    /// revision 继续递增 (不回退),使并发中的评审写入者能感知到冲突。
    pub fn upsert(&self, work: &StudentWork) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let data = encode_document(&work.document)?;

        conn.execute(
            r#"INSERT INTO student_work (student_id, unit_id, data, revision, updated_at)
               VALUES (?, ?, ?, 1, ?)
               ON CONFLICT(student_id, unit_id) DO UPDATE SET
                   data = excluded.data,
                   revision = student_work.revision + 1,
                   updated_at = excluded.updated_at"#,
            params![
                &work.student_id,
                &work.unit_id,
                &data,
                work.updated_at.format(DATETIME_FORMAT).to_string(),
            ],
        )?;

        Ok(())
    }

    /// 按复合主键查询作业
    pub fn find_by_key(&self, key: &WorkKey) -> RepositoryResult<Option<StudentWork>> {
        let conn = self.get_conn()?;

        let row = match conn.query_row(
            r#"SELECT student_id, unit_id, data, revision, updated_at
               FROM student_work
               WHERE student_id = ? AND unit_id = ?"#,
            params![&key.student_id, &key.unit_id],
            map_raw_row,
        ) {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(decode_row(row)?))
    }

    /// 查询单元内全部作业 (按 student_id 排序,保证扫描顺序确定)
    pub fn find_by_unit(&self, unit_id: &str) -> RepositoryResult<Vec<StudentWork>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT student_id, unit_id, data, revision, updated_at
               FROM student_work
               WHERE unit_id = ?
               ORDER BY student_id"#,
        )?;

        let rows = stmt
            .query_map(params![unit_id], map_raw_row)?
            .collect::<Result<Vec<RawRow>, _>>()?;

        rows.into_iter().map(decode_row).collect()
    }

    /// 更新作业文档 (带乐观锁检查)
    ///
    /// # 并发控制
    /// 使用乐观锁 (revision 字段) 防止并发更新冲突:
    /// UPDATE 仅在 revision 与读取时一致才生效,成功后 revision + 1
    ///
    /// # 错误
    /// - `RepositoryError::OptimisticLockFailure`: revision 不匹配 (其他写入者已更新)
    /// - `RepositoryError::NotFound`: 记录不存在
    pub fn update(&self, work: &StudentWork) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let data = encode_document(&work.document)?;
        let key = work.key();

        // 执行更新，带 revision 检查
        let rows_affected = conn.execute(
            r#"UPDATE student_work
               SET data = ?, revision = revision + 1, updated_at = ?
               WHERE student_id = ? AND unit_id = ? AND revision = ?"#,
            params![
                &data,
                work.updated_at.format(DATETIME_FORMAT).to_string(),
                &work.student_id,
                &work.unit_id,
                work.revision,
            ],
        )?;

        // 检查是否更新成功
        if rows_affected == 0 {
            // 判断是记录不存在还是 revision 冲突
            let exists: Result<i32, _> = conn.query_row(
                "SELECT revision FROM student_work WHERE student_id = ? AND unit_id = ?",
                params![&work.student_id, &work.unit_id],
                |row| row.get(0),
            );

            match exists {
                Ok(actual_revision) => {
                    // 记录存在，但 revision 不匹配 -> 乐观锁冲突
                    return Err(RepositoryError::OptimisticLockFailure {
                        key: key.to_string(),
                        expected: work.revision,
                        actual: actual_revision,
                    });
                }
                Err(_) => {
                    // 记录不存在
                    return Err(RepositoryError::NotFound {
                        entity: "StudentWork".to_string(),
                        id: key.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// 读取-修改-写入 (带乐观锁重试)
    ///
    /// 所有对已有作业文档的修改必须走此入口:
    /// 读取最新文档 -> 应用 mutate 闭包 -> 带 revision 检查写回;
    /// 遇到乐观锁冲突则重新读取重试,超过 MAX_UPDATE_RETRIES 次后
    /// 以 VersionConflict 上抛,绝不静默丢弃并发写入。
    ///
    /// # 错误
    /// - `RepositoryError::NotFound`: 记录不存在
    /// - `RepositoryError::VersionConflict`: 重试耗尽
    /// - mutate 闭包返回的错误原样上抛 (不重试)
    pub fn mutate_document<F>(&self, key: &WorkKey, mut mutate: F) -> RepositoryResult<()>
    where
        F: FnMut(&mut WorkDocument) -> RepositoryResult<()>,
    {
        for attempt in 1..=MAX_UPDATE_RETRIES {
            let mut work = self.find_by_key(key)?.ok_or_else(|| RepositoryError::NotFound {
                entity: "StudentWork".to_string(),
                id: key.to_string(),
            })?;

            mutate(&mut work.document)?;
            work.updated_at = chrono::Local::now().naive_local();

            match self.update(&work) {
                Ok(()) => return Ok(()),
                Err(RepositoryError::OptimisticLockFailure { expected, actual, .. }) => {
                    warn!(
                        key = %key,
                        attempt,
                        expected_revision = expected,
                        actual_revision = actual,
                        "作业文档乐观锁冲突,重试"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(RepositoryError::VersionConflict {
            message: format!("作业 {} 更新重试{}次后仍冲突", key, MAX_UPDATE_RETRIES),
        })
    }
}

// ==========================================
// 行映射与文档编解码
// ==========================================

type RawRow = (String, String, String, i32, String);

fn map_raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn decode_row(row: RawRow) -> RepositoryResult<StudentWork> {
    let (student_id, unit_id, data, revision, updated_at) = row;

    let updated_at = NaiveDateTime::parse_from_str(&updated_at, DATETIME_FORMAT)
        .map_err(|e| RepositoryError::InternalError(format!("updated_at 解析失败: {}", e)))?;

    Ok(StudentWork {
        student_id,
        unit_id,
        document: decode_document(&data)?,
        revision,
        updated_at,
    })
}

/// 文档编码 (写库前)
fn encode_document(document: &WorkDocument) -> RepositoryResult<String> {
    Ok(serde_json::to_string(document)?)
}

/// 文档解码 (读库后),拒绝未知 schema 版本
fn decode_document(data: &str) -> RepositoryResult<WorkDocument> {
    let document: WorkDocument = serde_json::from_str(data)?;

    if document.schema_version != WorkDocument::SCHEMA_VERSION {
        return Err(RepositoryError::SchemaVersionMismatch {
            expected: WorkDocument::SCHEMA_VERSION,
            actual: document.schema_version,
        });
    }

    Ok(document)
}
