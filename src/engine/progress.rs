// ==========================================
// 课程平台同行评审系统 - 评审进度聚合引擎
// ==========================================
// 职责: 由评审人的评审视图集合推导三态进度
// 红线: 纯函数,只依赖传入的视图与阈值,不读外部状态
// ==========================================

use crate::domain::types::ReviewProgress;
use crate::domain::work::ReviewView;

// ==========================================
// ReviewProgressAggregator - 进度聚合引擎
// ==========================================
pub struct ReviewProgressAggregator;

impl ReviewProgressAggregator {
    /// 创建新的 ReviewProgressAggregator 实例
    pub fn new() -> Self {
        Self
    }

    /// 统计已完成 (定稿) 的评审数
    pub fn count_completed_reviews(&self, reviews: &[ReviewView]) -> usize {
        reviews.iter().filter(|r| !r.is_draft).count()
    }

    /// 是否存在未动笔的评审 (评审内容为空即视为未开始,与草稿标志无关)
    pub fn has_unstarted_reviews(&self, reviews: &[ReviewView]) -> bool {
        reviews.iter().any(|r| !r.has_content())
    }

    /// 是否已完成全部分配的评审 (无草稿且无空内容)
    pub fn has_completed_all_assigned_reviews(&self, reviews: &[ReviewView]) -> bool {
        reviews.iter().all(|r| !r.is_draft && r.has_content())
    }

    /// 已完成数是否达到单元要求的最少评审数
    pub fn has_completed_enough_reviews(
        &self,
        reviews: &[ReviewView],
        review_min_count: u32,
    ) -> bool {
        self.count_completed_reviews(reviews) >= review_min_count as usize
    }

    /// 推导三态进度
    ///
    /// - 完成数达到阈值 -> Completed
    /// - 完成数 > 0 -> InProgress
    /// - 否则 -> NotStarted
    pub fn get_review_progress(
        &self,
        reviews: &[ReviewView],
        review_min_count: u32,
    ) -> ReviewProgress {
        let completed = self.count_completed_reviews(reviews);

        if self.has_completed_enough_reviews(reviews, review_min_count) {
            ReviewProgress::Completed
        } else if completed > 0 {
            ReviewProgress::InProgress
        } else {
            ReviewProgress::NotStarted
        }
    }
}

impl Default for ReviewProgressAggregator {
    fn default() -> Self {
        Self::new()
    }
}
