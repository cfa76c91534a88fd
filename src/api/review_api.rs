// ==========================================
// 课程平台同行评审系统 - 评审 API
// ==========================================
// 职责: 面向上层 Web 平台的业务接口,只收发普通数据,不含框架类型
// 红线: 调用者身份 (Identity) 显式传参,不提供全局身份访问器
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::types::{Identity, ReviewProgress};
use crate::domain::work::{ReviewView, StudentWork, SubmissionAnswer};
use crate::engine::{ReviewAssignmentEngine, ReviewLifecycleManager, ReviewProgressAggregator};
use serde_json::Value;
use std::sync::Arc;

// ==========================================
// ReviewApi - 评审业务接口
// ==========================================
pub struct ReviewApi {
    assignment_engine: Arc<ReviewAssignmentEngine>,
    lifecycle: Arc<ReviewLifecycleManager>,
    progress_aggregator: Arc<ReviewProgressAggregator>,
    config_manager: Arc<ConfigManager>,
}

impl ReviewApi {
    /// 创建新的 ReviewApi 实例
    pub fn new(
        assignment_engine: Arc<ReviewAssignmentEngine>,
        lifecycle: Arc<ReviewLifecycleManager>,
        progress_aggregator: Arc<ReviewProgressAggregator>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            assignment_engine,
            lifecycle,
            progress_aggregator,
            config_manager,
        }
    }

    /// 学生提交作业
    ///
    /// # 参数
    /// - student: 提交者身份
    /// - unit_id: 评估单元ID
    /// - answers: 按序号排列的答案列表
    pub fn submit_work(
        &self,
        student: &Identity,
        unit_id: &str,
        answers: Vec<SubmissionAnswer>,
    ) -> ApiResult<()> {
        validate_unit_id(unit_id)?;
        validate_identity(student)?;

        self.lifecycle
            .submit_work(&student.id, unit_id, answers)
            .map_err(ApiError::from)
    }

    /// 评审人提交评审 (草稿或定稿)
    ///
    /// # 参数
    /// - student_id: 作业归属学生
    /// - unit_id: 评估单元ID
    /// - reviewer: 评审人身份
    /// - review: 评审内容 (不透明 JSON 值)
    /// - is_draft: 草稿标志
    pub fn submit_review(
        &self,
        student_id: &str,
        unit_id: &str,
        reviewer: &Identity,
        review: Value,
        is_draft: bool,
    ) -> ApiResult<()> {
        validate_unit_id(unit_id)?;
        validate_identity(reviewer)?;
        if student_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("学生ID不能为空".to_string()));
        }

        self.lifecycle
            .submit_review(student_id, unit_id, &reviewer.id, review, is_draft)
            .map_err(ApiError::from)
    }

    /// 为评审人挑选下一份可评审的作业
    ///
    /// # 返回
    /// - Ok(Some(student_id)): 可评审作业的归属学生
    /// - Ok(None): 当前无可分配作业
    pub fn find_new_submission(
        &self,
        reviewer: &Identity,
        unit_id: &str,
    ) -> ApiResult<Option<String>> {
        validate_unit_id(unit_id)?;
        validate_identity(reviewer)?;

        self.assignment_engine
            .find_next_submission(&reviewer.id, unit_id)
            .map_err(ApiError::from)
    }

    /// 将评审人分配到指定作业
    pub fn add_reviewer(
        &self,
        student_id: &str,
        unit_id: &str,
        reviewer: &Identity,
    ) -> ApiResult<()> {
        validate_unit_id(unit_id)?;
        validate_identity(reviewer)?;

        self.assignment_engine
            .add_reviewer(student_id, unit_id, &reviewer.id)
            .map_err(ApiError::from)
    }

    /// 将评审人从指定作业移除
    pub fn remove_reviewer(
        &self,
        student_id: &str,
        unit_id: &str,
        reviewer: &Identity,
    ) -> ApiResult<()> {
        validate_unit_id(unit_id)?;
        validate_identity(reviewer)?;

        self.assignment_engine
            .remove_reviewer(student_id, unit_id, &reviewer.id)
            .map_err(ApiError::from)
    }

    /// 查询评审人在单元内的全部评审视图 (按分配时间升序)
    pub fn get_reviews_for_reviewer(
        &self,
        reviewer: &Identity,
        unit_id: &str,
    ) -> ApiResult<Vec<ReviewView>> {
        validate_unit_id(unit_id)?;
        validate_identity(reviewer)?;

        self.lifecycle
            .reviews_for_reviewer(&reviewer.id, unit_id)
            .map_err(ApiError::from)
    }

    /// 查询学生本人的作业 (提交 + 评审全量)
    pub fn get_student_work(
        &self,
        student: &Identity,
        unit_id: &str,
    ) -> ApiResult<Option<StudentWork>> {
        validate_unit_id(unit_id)?;
        validate_identity(student)?;

        self.lifecycle
            .get_student_work(&student.id, unit_id)
            .map_err(ApiError::from)
    }

    /// 计算评审人在单元内的评审进度
    ///
    /// 最少评审数阈值取自配置 (单元级覆写 > 全局 > 内置默认)
    pub fn get_review_progress(
        &self,
        reviewer: &Identity,
        unit_id: &str,
    ) -> ApiResult<ReviewProgress> {
        let reviews = self.get_reviews_for_reviewer(reviewer, unit_id)?;

        let review_min_count = self
            .config_manager
            .get_review_min_count(unit_id)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        Ok(self
            .progress_aggregator
            .get_review_progress(&reviews, review_min_count))
    }
}

// ==========================================
// 参数验证
// ==========================================

fn validate_unit_id(unit_id: &str) -> ApiResult<()> {
    if unit_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("单元ID不能为空".to_string()));
    }
    Ok(())
}

fn validate_identity(identity: &Identity) -> ApiResult<()> {
    if identity.id.trim().is_empty() {
        return Err(ApiError::InvalidInput("身份标识不能为空".to_string()));
    }
    Ok(())
}
