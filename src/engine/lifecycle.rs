// ==========================================
// 课程平台同行评审系统 - 评审生命周期管理
// ==========================================
// 职责: 作业提交、评审提交 (草稿/定稿)、评审人视图查询
// 红线: 未分配的评审人提交评审必须显式报错,不得静默忽略
// ==========================================

use crate::domain::work::{
    review_content_is_empty, ReviewView, StudentWork, SubmissionAnswer, WorkDocument, WorkKey,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::work_repo::StudentWorkRepository;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// ReviewLifecycleManager - 评审生命周期管理器
// ==========================================
pub struct ReviewLifecycleManager {
    work_repo: Arc<StudentWorkRepository>,
}

impl ReviewLifecycleManager {
    /// 创建新的 ReviewLifecycleManager 实例
    pub fn new(work_repo: Arc<StudentWorkRepository>) -> Self {
        Self { work_repo }
    }

    /// 学生提交作业,进入评审池
    ///
    /// 总是写入全新文档 (评审人清空);同键已有记录被整体覆盖,后写覆盖先写。
    ///
    /// # 错误
    /// - `ValidationError`: 答案序号不连续
    #[instrument(skip(self, answers), fields(answer_count = answers.len()))]
    pub fn submit_work(
        &self,
        student_id: &str,
        unit_id: &str,
        answers: Vec<SubmissionAnswer>,
    ) -> RepositoryResult<()> {
        WorkDocument::validate_submission(&answers)
            .map_err(RepositoryError::ValidationError)?;

        let work = StudentWork {
            student_id: student_id.to_string(),
            unit_id: unit_id.to_string(),
            document: WorkDocument::new(answers),
            revision: 1,
            updated_at: chrono::Local::now().naive_local(),
        };

        self.work_repo.upsert(&work)?;

        info!(student_id, unit_id, "作业已提交");
        Ok(())
    }

    /// 评审人提交评审 (草稿或定稿)
    ///
    /// 评审人必须已被分配到该作业;定稿 (is_draft=false) 必须携带非空内容。
    /// date_added 保持分配时的值不变。
    ///
    /// # 错误
    /// - `ValidationError`: 定稿但评审内容为空
    /// - `NotFound`: 作业不存在,或评审人未被分配
    /// - `VersionConflict`: 乐观锁重试耗尽
    #[instrument(skip(self, review))]
    pub fn submit_review(
        &self,
        student_id: &str,
        unit_id: &str,
        reviewer_id: &str,
        review: Value,
        is_draft: bool,
    ) -> RepositoryResult<()> {
        // 定稿必须有内容,避免"已定稿但无内容"的不可判定状态
        if !is_draft && review_content_is_empty(&Some(review.clone())) {
            return Err(RepositoryError::ValidationError(
                "定稿评审必须携带非空内容".to_string(),
            ));
        }

        let key = WorkKey::new(student_id, unit_id);

        self.work_repo.mutate_document(&key, |document| {
            let entry = document.reviewers.get_mut(reviewer_id).ok_or_else(|| {
                RepositoryError::NotFound {
                    entity: "ReviewAssignment".to_string(),
                    id: format!("{}@{}", reviewer_id, key),
                }
            })?;

            entry.review = Some(review.clone());
            entry.is_draft = is_draft;
            Ok(())
        })?;

        info!(student_id, unit_id, reviewer_id, is_draft, "评审已提交");
        Ok(())
    }

    /// 查询评审人在单元内的全部评审视图
    ///
    /// 按 date_added 升序返回 (评审人被分配作业的时间顺序,供 UI 稳定展示);
    /// 排序为稳定排序,date_added 相同时保持扫描顺序。
    #[instrument(skip(self))]
    pub fn reviews_for_reviewer(
        &self,
        reviewer_id: &str,
        unit_id: &str,
    ) -> RepositoryResult<Vec<ReviewView>> {
        let works = self.work_repo.find_by_unit(unit_id)?;

        let mut views: Vec<ReviewView> = works
            .into_iter()
            .filter_map(|work| {
                let assignment = work.document.reviewers.get(reviewer_id)?.clone();
                Some(ReviewView {
                    student_id: work.student_id,
                    submission: work.document.submission,
                    review: assignment.review,
                    is_draft: assignment.is_draft,
                    date_added: assignment.date_added,
                })
            })
            .collect();

        views.sort_by_key(|v| v.date_added);
        Ok(views)
    }

    /// 查询学生本人的作业 (提交 + 评审全量)
    pub fn get_student_work(
        &self,
        student_id: &str,
        unit_id: &str,
    ) -> RepositoryResult<Option<StudentWork>> {
        self.work_repo
            .find_by_key(&WorkKey::new(student_id, unit_id))
    }
}
