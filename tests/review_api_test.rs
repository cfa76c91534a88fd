// ==========================================
// 评审 API 集成测试
// ==========================================
// 职责: 验证 API 层参数校验、错误映射与进度配置联动
// ==========================================


#[cfg(test)]
mod review_api_test {
    use course_peer_review::config::{ConfigManager, ConfigScope};
    use course_peer_review::db;
    use course_peer_review::engine::{
        ReviewAssignmentEngine, ReviewLifecycleManager, ReviewProgressAggregator,
    };
    use course_peer_review::repository::StudentWorkRepository;
    use course_peer_review::{ApiError, ReviewApi, ReviewProgress};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tempfile::NamedTempFile;

    use crate::test_helpers::{create_test_db, identity, make_answers};

    const UNIT: &str = "u1";

    /// 创建测试环境
    fn setup_test_env() -> (NamedTempFile, Arc<ConfigManager>, ReviewApi) {
        let (temp_file, db_path) = create_test_db().unwrap();

        let conn = Arc::new(Mutex::new(db::open_sqlite_connection(&db_path).unwrap()));
        let work_repo = Arc::new(StudentWorkRepository::new(conn.clone()));
        let assignment_engine = Arc::new(ReviewAssignmentEngine::new(work_repo.clone()));
        let lifecycle = Arc::new(ReviewLifecycleManager::new(work_repo.clone()));
        let progress_aggregator = Arc::new(ReviewProgressAggregator::new());
        let config_manager = Arc::new(ConfigManager::from_connection(conn).unwrap());

        let api = ReviewApi::new(
            assignment_engine,
            lifecycle,
            progress_aggregator,
            config_manager.clone(),
        );

        (temp_file, config_manager, api)
    }

    // ==========================================
    // 测试1: 参数校验
    // ==========================================

    #[test]
    fn test_rejects_blank_parameters() {
        let (_temp, _config, api) = setup_test_env();

        let err = api
            .submit_work(&identity("student_a"), "  ", make_answers(&["a"]))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        let err = api
            .find_new_submission(&identity(""), UNIT)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        let err = api
            .submit_review("", UNIT, &identity("reviewer_b"), json!("评语"), true)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    // ==========================================
    // 测试2: 错误映射 (Repository -> Api)
    // ==========================================

    #[test]
    fn test_error_mapping() {
        let (_temp, _config, api) = setup_test_env();

        // NotFound: 作业不存在
        let err = api
            .add_reviewer("ghost", UNIT, &identity("reviewer_b"))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        // InvalidInput: 自评
        api.submit_work(&identity("student_a"), UNIT, make_answers(&["a"]))
            .unwrap();
        let err = api
            .add_reviewer("student_a", UNIT, &identity("student_a"))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        // InvalidInput: 答案序号不连续
        let mut answers = make_answers(&["a", "b"]);
        answers[0].index = 1;
        let err = api
            .submit_work(&identity("student_b"), UNIT, answers)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    // ==========================================
    // 测试3: 规格场景 - min_count=1 时定稿一篇即完成
    // ==========================================

    #[test]
    fn test_progress_scenario_min_count_one() {
        let (_temp, config, api) = setup_test_env();

        config
            .set_review_min_count(&ConfigScope::Unit(UNIT.to_string()), 1)
            .unwrap();

        let student_a = identity("student_a");
        let reviewer_b = identity("reviewer_b");

        api.submit_work(&student_a, UNIT, make_answers(&["ans1", "ans2"]))
            .unwrap();
        api.add_reviewer("student_a", UNIT, &reviewer_b).unwrap();

        // 分配后: 一条草稿、无内容,进度未开始
        let reviews = api.get_reviews_for_reviewer(&reviewer_b, UNIT).unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].review, None);
        assert!(reviews[0].is_draft);
        assert_eq!(
            api.get_review_progress(&reviewer_b, UNIT).unwrap(),
            ReviewProgress::NotStarted
        );

        // 定稿后: 进度完成
        api.submit_review("student_a", UNIT, &reviewer_b, json!("不错"), false)
            .unwrap();
        assert_eq!(
            api.get_review_progress(&reviewer_b, UNIT).unwrap(),
            ReviewProgress::Completed
        );
    }

    // ==========================================
    // 测试4: 单元级配置覆写全局
    // ==========================================

    #[test]
    fn test_unit_config_overrides_global() {
        let (_temp, config, api) = setup_test_env();

        config
            .set_review_min_count(&ConfigScope::Global, 2)
            .unwrap();
        config
            .set_review_min_count(&ConfigScope::Unit(UNIT.to_string()), 1)
            .unwrap();

        let reviewer_b = identity("reviewer_b");

        api.submit_work(&identity("student_a"), UNIT, make_answers(&["a"]))
            .unwrap();
        api.add_reviewer("student_a", UNIT, &reviewer_b).unwrap();
        api.submit_review("student_a", UNIT, &reviewer_b, json!("好"), false)
            .unwrap();

        // 单元级阈值 1 生效 -> 完成;若按全局阈值 2 则应是进行中
        assert_eq!(
            api.get_review_progress(&reviewer_b, UNIT).unwrap(),
            ReviewProgress::Completed
        );
    }

    // ==========================================
    // 测试5: 挑选-分配-再挑选 流程
    // ==========================================

    #[test]
    fn test_find_assign_flow() {
        let (_temp, _config, api) = setup_test_env();

        let reviewer = identity("reviewer_r");

        api.submit_work(&identity("student_a"), UNIT, make_answers(&["a"]))
            .unwrap();

        let chosen = api.find_new_submission(&reviewer, UNIT).unwrap().unwrap();
        assert_eq!(chosen, "student_a");

        api.add_reviewer(&chosen, UNIT, &reviewer).unwrap();

        // 已分配后不再有候选
        assert_eq!(api.find_new_submission(&reviewer, UNIT).unwrap(), None);

        // 学生可见自己的作业与评审人
        let work = api
            .get_student_work(&identity("student_a"), UNIT)
            .unwrap()
            .unwrap();
        assert!(work.document.reviewers.contains_key("reviewer_r"));
    }
}
