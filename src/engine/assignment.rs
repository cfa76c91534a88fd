// ==========================================
// 课程平台同行评审系统 - 评审分配引擎
// ==========================================
// 职责: 为评审人挑选下一份可评审的作业,维护评审人分配条目
// 策略: 最少负载启发式 (评审人最少的作业优先),贪心、非全局最优
// 红线: 评审人不得被分配到自己的作业,也不得在同一作业上重复分配
// ==========================================

use crate::domain::work::{ReviewAssignment, WorkKey};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::work_repo::StudentWorkRepository;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// ReviewAssignmentEngine - 评审分配引擎
// ==========================================
pub struct ReviewAssignmentEngine {
    work_repo: Arc<StudentWorkRepository>,
}

impl ReviewAssignmentEngine {
    /// 创建新的 ReviewAssignmentEngine 实例
    pub fn new(work_repo: Arc<StudentWorkRepository>) -> Self {
        Self { work_repo }
    }

    /// 为评审人挑选下一份可评审的作业
    ///
    /// 候选条件: 单元匹配、评审人未在该作业的 reviewers 中、作业不属于评审人本人。
    /// 候选中选取评审人数最少者;并列时按扫描顺序 (student_id 升序) 取最先者。
    ///
    /// 说明: 扫描结束即过期 (扫描期间无锁),属可接受的不精确;
    /// 后续 add_reviewer 的写入仍受乐观锁保护。
    ///
    /// # 返回
    /// - Ok(Some(student_id)): 选中作业的归属学生
    /// - Ok(None): 无可分配作业
    #[instrument(skip(self))]
    pub fn find_next_submission(
        &self,
        reviewer_id: &str,
        unit_id: &str,
    ) -> RepositoryResult<Option<String>> {
        let works = self.work_repo.find_by_unit(unit_id)?;

        let mut chosen: Option<(&str, usize)> = None;

        for work in &works {
            // 不评审自己的作业
            if work.student_id == reviewer_id {
                continue;
            }
            // 已在该作业上分配过
            if work.document.reviewers.contains_key(reviewer_id) {
                continue;
            }

            let count = work.document.reviewer_count();
            let is_better = match chosen {
                Some((_, min_so_far)) => count < min_so_far,
                None => true,
            };
            if is_better {
                chosen = Some((work.student_id.as_str(), count));
            }
        }

        Ok(chosen.map(|(student_id, _)| student_id.to_string()))
    }

    /// 将评审人分配到指定作业
    ///
    /// 新条目: review=None, is_draft=true, date_added=当前 UTC 秒。
    /// 同一评审人重复分配为覆盖写 (幂等,不产生重复条目)。
    ///
    /// # 错误
    /// - `BusinessRuleViolation`: 评审人即作业归属学生 (自评)
    /// - `NotFound`: 作业不存在
    /// - `VersionConflict`: 乐观锁重试耗尽
    #[instrument(skip(self))]
    pub fn add_reviewer(
        &self,
        student_id: &str,
        unit_id: &str,
        reviewer_id: &str,
    ) -> RepositoryResult<()> {
        if student_id == reviewer_id {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "评审人 {} 不能评审自己的作业",
                reviewer_id
            )));
        }

        let key = WorkKey::new(student_id, unit_id);
        let date_added = Utc::now().timestamp();

        self.work_repo.mutate_document(&key, |document| {
            document
                .reviewers
                .insert(reviewer_id.to_string(), ReviewAssignment::new(date_added));
            Ok(())
        })?;

        info!(student_id, unit_id, reviewer_id, "评审人已分配");
        Ok(())
    }

    /// 将评审人从指定作业移除
    ///
    /// # 错误
    /// - `NotFound`: 作业不存在,或评审人不在该作业的 reviewers 中 (作业保持不变)
    /// - `VersionConflict`: 乐观锁重试耗尽
    #[instrument(skip(self))]
    pub fn remove_reviewer(
        &self,
        student_id: &str,
        unit_id: &str,
        reviewer_id: &str,
    ) -> RepositoryResult<()> {
        let key = WorkKey::new(student_id, unit_id);

        self.work_repo.mutate_document(&key, |document| {
            if document.reviewers.remove(reviewer_id).is_none() {
                return Err(RepositoryError::NotFound {
                    entity: "ReviewAssignment".to_string(),
                    id: format!("{}@{}", reviewer_id, key),
                });
            }
            Ok(())
        })?;

        info!(student_id, unit_id, reviewer_id, "评审人已移除");
        Ok(())
    }
}
