// ==========================================
// 评审分配引擎测试
// ==========================================
// 职责: 验证最少负载分配、自评排除、幂等分配、移除语义
// ==========================================


#[cfg(test)]
mod review_assignment_test {
    use course_peer_review::db;
    use course_peer_review::engine::{ReviewAssignmentEngine, ReviewLifecycleManager};
    use course_peer_review::repository::{RepositoryError, StudentWorkRepository};
    use std::sync::{Arc, Mutex};
    use tempfile::NamedTempFile;

    use crate::test_helpers::{create_test_db, make_answers};

    const UNIT: &str = "u1";

    /// 创建测试环境
    fn setup_test_env() -> (
        NamedTempFile,
        Arc<StudentWorkRepository>,
        ReviewAssignmentEngine,
        ReviewLifecycleManager,
    ) {
        let (temp_file, db_path) = create_test_db().unwrap();

        let conn = Arc::new(Mutex::new(db::open_sqlite_connection(&db_path).unwrap()));
        let work_repo = Arc::new(StudentWorkRepository::new(conn));
        let assignment = ReviewAssignmentEngine::new(work_repo.clone());
        let lifecycle = ReviewLifecycleManager::new(work_repo.clone());

        (temp_file, work_repo, assignment, lifecycle)
    }

    // ==========================================
    // 测试1: 无候选时返回 None
    // ==========================================

    #[test]
    fn test_find_next_submission_empty_unit() {
        let (_temp, _repo, assignment, _lifecycle) = setup_test_env();

        let chosen = assignment.find_next_submission("reviewer_r", UNIT).unwrap();
        assert_eq!(chosen, None);
    }

    // ==========================================
    // 测试2: 自评排除
    // ==========================================

    #[test]
    fn test_find_next_submission_excludes_own_work() {
        let (_temp, _repo, assignment, lifecycle) = setup_test_env();

        lifecycle
            .submit_work("student_a", UNIT, make_answers(&["ans"]))
            .unwrap();

        // 唯一的作业属于评审人本人 -> 无候选
        let chosen = assignment.find_next_submission("student_a", UNIT).unwrap();
        assert_eq!(chosen, None);

        // 其他评审人可以选中
        let chosen = assignment.find_next_submission("reviewer_r", UNIT).unwrap();
        assert_eq!(chosen, Some("student_a".to_string()));
    }

    // ==========================================
    // 测试3: 已分配的作业不再成为候选
    // ==========================================

    #[test]
    fn test_find_next_submission_excludes_already_assigned() {
        let (_temp, _repo, assignment, lifecycle) = setup_test_env();

        lifecycle
            .submit_work("student_a", UNIT, make_answers(&["ans"]))
            .unwrap();
        assignment
            .add_reviewer("student_a", UNIT, "reviewer_r")
            .unwrap();

        let chosen = assignment.find_next_submission("reviewer_r", UNIT).unwrap();
        assert_eq!(chosen, None);
    }

    // ==========================================
    // 测试4: 最少负载优先
    // ==========================================

    #[test]
    fn test_find_next_submission_prefers_least_loaded() {
        let (_temp, _repo, assignment, lifecycle) = setup_test_env();

        lifecycle
            .submit_work("student_a", UNIT, make_answers(&["a"]))
            .unwrap();
        lifecycle
            .submit_work("student_b", UNIT, make_answers(&["b"]))
            .unwrap();

        // student_a 已有一个评审人,student_b 没有
        assignment
            .add_reviewer("student_a", UNIT, "reviewer_1")
            .unwrap();

        let chosen = assignment.find_next_submission("reviewer_2", UNIT).unwrap();
        assert_eq!(chosen, Some("student_b".to_string()));
    }

    // ==========================================
    // 测试5: 并列时保证确定性,二次分配避开已占作业
    // ==========================================

    #[test]
    fn test_tie_then_second_reviewer_gets_other_candidate() {
        let (_temp, _repo, assignment, lifecycle) = setup_test_env();

        // 两份作业都是零评审人,并列
        lifecycle
            .submit_work("student_a1", UNIT, make_answers(&["a"]))
            .unwrap();
        lifecycle
            .submit_work("student_a2", UNIT, make_answers(&["b"]))
            .unwrap();

        let first = assignment
            .find_next_submission("reviewer_1", UNIT)
            .unwrap()
            .unwrap();
        assert!(first == "student_a1" || first == "student_a2");

        // 同一状态下重复询问,结果必须确定
        let again = assignment
            .find_next_submission("reviewer_1", UNIT)
            .unwrap()
            .unwrap();
        assert_eq!(first, again);

        assignment.add_reviewer(&first, UNIT, "reviewer_1").unwrap();

        // 第二个评审人应得到另一份 (最少负载)
        let second = assignment
            .find_next_submission("reviewer_2", UNIT)
            .unwrap()
            .unwrap();
        assert_ne!(second, first);
    }

    // ==========================================
    // 测试6: 最少负载不变量
    // ==========================================

    #[test]
    fn test_least_loaded_invariant() {
        let (_temp, _repo, assignment, lifecycle) = setup_test_env();

        let students = ["student_a", "student_b", "student_c"];
        for s in &students {
            lifecycle.submit_work(s, UNIT, make_answers(&["x"])).unwrap();
        }

        // 制造不同负载: a=2, b=1, c=0
        assignment.add_reviewer("student_a", UNIT, "r1").unwrap();
        assignment.add_reviewer("student_a", UNIT, "r2").unwrap();
        assignment.add_reviewer("student_b", UNIT, "r1").unwrap();

        let chosen = assignment
            .find_next_submission("r3", UNIT)
            .unwrap()
            .unwrap();
        assert_eq!(chosen, "student_c");
    }

    // ==========================================
    // 测试7: 重复分配幂等 (覆盖写,不产生重复条目)
    // ==========================================

    #[test]
    fn test_add_reviewer_idempotent() {
        let (_temp, repo, assignment, lifecycle) = setup_test_env();

        lifecycle
            .submit_work("student_a", UNIT, make_answers(&["a"]))
            .unwrap();

        assignment
            .add_reviewer("student_a", UNIT, "reviewer_r")
            .unwrap();
        assignment
            .add_reviewer("student_a", UNIT, "reviewer_r")
            .unwrap();

        let work = repo
            .find_by_key(&course_peer_review::WorkKey::new("student_a", UNIT))
            .unwrap()
            .unwrap();
        assert_eq!(work.document.reviewer_count(), 1);
        assert!(work.document.reviewers.contains_key("reviewer_r"));
    }

    // ==========================================
    // 测试8: 自评分配被拒绝
    // ==========================================

    #[test]
    fn test_add_reviewer_rejects_self_review() {
        let (_temp, _repo, assignment, lifecycle) = setup_test_env();

        lifecycle
            .submit_work("student_a", UNIT, make_answers(&["a"]))
            .unwrap();

        let err = assignment
            .add_reviewer("student_a", UNIT, "student_a")
            .unwrap_err();
        assert!(matches!(err, RepositoryError::BusinessRuleViolation(_)));
    }

    // ==========================================
    // 测试9: 作业不存在时分配报 NotFound
    // ==========================================

    #[test]
    fn test_add_reviewer_missing_work() {
        let (_temp, _repo, assignment, _lifecycle) = setup_test_env();

        let err = assignment
            .add_reviewer("ghost_student", UNIT, "reviewer_r")
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    // ==========================================
    // 测试10: 移除未分配评审人报 NotFound,作业不变
    // ==========================================

    #[test]
    fn test_remove_reviewer_not_assigned() {
        let (_temp, repo, assignment, lifecycle) = setup_test_env();

        lifecycle
            .submit_work("student_a", UNIT, make_answers(&["a"]))
            .unwrap();
        assignment
            .add_reviewer("student_a", UNIT, "reviewer_1")
            .unwrap();

        let before = repo
            .find_by_key(&course_peer_review::WorkKey::new("student_a", UNIT))
            .unwrap()
            .unwrap();

        let err = assignment
            .remove_reviewer("student_a", UNIT, "reviewer_ghost")
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));

        // 作业保持不变 (文档与 revision 均未动)
        let after = repo
            .find_by_key(&course_peer_review::WorkKey::new("student_a", UNIT))
            .unwrap()
            .unwrap();
        assert_eq!(after.document, before.document);
        assert_eq!(after.revision, before.revision);
    }

    // ==========================================
    // 测试11: 移除已分配评审人成功
    // ==========================================

    #[test]
    fn test_remove_reviewer_success() {
        let (_temp, repo, assignment, lifecycle) = setup_test_env();

        lifecycle
            .submit_work("student_a", UNIT, make_answers(&["a"]))
            .unwrap();
        assignment
            .add_reviewer("student_a", UNIT, "reviewer_1")
            .unwrap();
        assignment
            .remove_reviewer("student_a", UNIT, "reviewer_1")
            .unwrap();

        let work = repo
            .find_by_key(&course_peer_review::WorkKey::new("student_a", UNIT))
            .unwrap()
            .unwrap();
        assert_eq!(work.document.reviewer_count(), 0);
    }

    // ==========================================
    // 测试12: 跨单元互不干扰
    // ==========================================

    #[test]
    fn test_units_are_isolated() {
        let (_temp, _repo, assignment, lifecycle) = setup_test_env();

        lifecycle
            .submit_work("student_a", "u1", make_answers(&["a"]))
            .unwrap();
        lifecycle
            .submit_work("student_b", "u2", make_answers(&["b"]))
            .unwrap();

        let chosen = assignment.find_next_submission("reviewer_r", "u2").unwrap();
        assert_eq!(chosen, Some("student_b".to_string()));
    }
}
