// ==========================================
// 课程平台同行评审系统 - 作业与评审领域模型
// ==========================================
// 主实体: StudentWork (一个学生在一个单元的作业)
// 子对象: ReviewAssignment (评审人分配,随文档持久化,不独立存储)
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// WorkKey - 作业复合主键
// ==========================================
// (student_id, unit_id) 唯一确定一份作业
// 替代 "student:unit" 字符串拼接键,具备明确的相等/哈希语义
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkKey {
    pub student_id: String, // 学生标识
    pub unit_id: String,    // 评估单元标识 (字符串类型,对齐课程元数据)
}

impl WorkKey {
    /// 创建新的 WorkKey 实例
    pub fn new(student_id: impl Into<String>, unit_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            unit_id: unit_id.into(),
        }
    }
}

impl fmt::Display for WorkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.student_id, self.unit_id)
    }
}

// ==========================================
// SubmissionAnswer - 带序号的答案
// ==========================================
// 不变量: 第 N 个答案的 index == N (严格连续,不允许空洞/乱序)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionAnswer {
    pub index: u32,   // 原始题目序号
    pub value: Value, // 答案内容 (不透明 JSON 值)
}

impl SubmissionAnswer {
    pub fn new(index: u32, value: Value) -> Self {
        Self { index, value }
    }
}

// ==========================================
// ReviewAssignment - 评审人分配
// ==========================================
// 嵌入在 WorkDocument.reviewers 中,以评审人标识为键
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAssignment {
    pub review: Option<Value>, // 评审内容 (提交前为 None)
    pub is_draft: bool,        // 草稿标志 (定稿前为 true)
    pub date_added: i64,       // 分配时间 (UTC 秒,仅在分配时写入一次)
}

impl ReviewAssignment {
    /// 创建新的分配条目 (未填写评审,草稿态)
    pub fn new(date_added: i64) -> Self {
        Self {
            review: None,
            is_draft: true,
            date_added,
        }
    }

    /// 判断评审内容是否存在
    ///
    /// None / JSON null / 空字符串均视为"未填写"
    pub fn has_content(&self) -> bool {
        !review_content_is_empty(&self.review)
    }
}

/// 判断评审内容是否为空 (None / null / 空字符串)
pub fn review_content_is_empty(review: &Option<Value>) -> bool {
    match review {
        None => true,
        Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

// ==========================================
// WorkDocument - 持久化作业文档
// ==========================================
// 带 schema_version 的强类型文档,整体序列化为 student_work.data
// reviewers 使用 BTreeMap 保证遍历顺序确定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkDocument {
    pub schema_version: u32,                           // 文档 schema 版本
    pub submission: Vec<SubmissionAnswer>,             // 按序号排列的答案
    pub reviewers: BTreeMap<String, ReviewAssignment>, // 评审人标识 -> 分配条目
}

impl WorkDocument {
    /// 当前文档 schema 版本
    pub const SCHEMA_VERSION: u32 = 1;

    /// 根据答案列表创建新文档 (评审人为空)
    ///
    /// 调用前应先通过 validate_submission 校验序号连续性
    pub fn new(submission: Vec<SubmissionAnswer>) -> Self {
        Self {
            schema_version: Self::SCHEMA_VERSION,
            submission,
            reviewers: BTreeMap::new(),
        }
    }

    /// 校验答案序号严格连续 (第 N 个答案的 index 必须为 N)
    ///
    /// # 返回
    /// - Err(String): 首个违规位置的描述
    pub fn validate_submission(answers: &[SubmissionAnswer]) -> Result<(), String> {
        for (pos, answer) in answers.iter().enumerate() {
            if answer.index as usize != pos {
                return Err(format!(
                    "答案序号不连续: 第{}个答案的 index={}",
                    pos, answer.index
                ));
            }
        }
        Ok(())
    }

    /// 按序号编出纯答案值列表 (供上层展示)
    pub fn answer_values(&self) -> Vec<&Value> {
        self.submission.iter().map(|a| &a.value).collect()
    }

    /// 当前评审人数量 (最少负载启发式的排序依据)
    pub fn reviewer_count(&self) -> usize {
        self.reviewers.len()
    }
}

// ==========================================
// StudentWork - 作业持久化实体
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentWork {
    pub student_id: String,        // 作业归属学生
    pub unit_id: String,           // 评估单元
    pub document: WorkDocument,    // 作业文档 (提交 + 评审)
    pub revision: i32,             // 乐观锁: 修订号
    pub updated_at: NaiveDateTime, // 更新时间
}

impl StudentWork {
    /// 返回复合主键
    pub fn key(&self) -> WorkKey {
        WorkKey::new(self.student_id.clone(), self.unit_id.clone())
    }
}

// ==========================================
// ReviewView - 评审视图
// ==========================================
// 面向上层 UI 的投影: 一个评审人在一份作业上的完整上下文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewView {
    pub student_id: String,                // 作业归属学生
    pub submission: Vec<SubmissionAnswer>, // 完整提交内容
    pub review: Option<Value>,             // 评审内容 (可能未填写)
    pub is_draft: bool,                    // 草稿标志
    pub date_added: i64,                   // 分配时间 (排序键)
}

impl ReviewView {
    /// 判断评审内容是否存在
    pub fn has_content(&self) -> bool {
        !review_content_is_empty(&self.review)
    }
}
