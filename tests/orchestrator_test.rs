// ==========================================
// 批量方案编排器集成测试
// ==========================================
// 覆盖: 12 档顺序生成 / 槽位序号与跨档去重 /
// AI 选报与兜底切换 / 取消 / 重复与并发拦截
// ==========================================


use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use test_helpers::*;
use zhiyuan_engine::domain::{BandOutcome, SubjectSelection, TuitionRange};
use zhiyuan_engine::engine::{
    BatchPlanOrchestrator, CandidateBrief, EngineError, EngineResult, NoOpProgressListener,
    PlanProgressListener, SelectionMap, VolunteerSelector,
};
use zhiyuan_engine::repository::PlanRepository;
use zhiyuan_engine::{
    EducationLevel, PlanStatus, RecommendMode, StudentQueryContext, SubjectTrack, Tier,
};
use async_trait::async_trait;

// ==========================================
// 测试数据: 12 档全覆盖
// ==========================================

/// 智能模式/本科, 考生 600 分时各复合档位的投档线窗口
const BAND_SCORE_WINDOWS: [(i32, i32); 12] = [
    (610, 612), // 冲1 (9,12]
    (607, 609), // 冲2 (6,9]
    (604, 606), // 冲3 (3,6]
    (601, 603), // 冲4 (0,3]
    (596, 600), // 稳1 (-5,0]
    (591, 595), // 稳2 (-10,-5]
    (586, 590), // 稳3 (-15,-10]
    (581, 585), // 稳4 (-20,-15]
    (576, 580), // 保1 (-25,-20]
    (571, 575), // 保2 (-30,-25]
    (566, 570), // 保3 (-35,-30]
    (561, 565), // 保4 (-40,-35]
];

/// 为指定复合档位写入 4 个候选专业组 (各带 1 个专业)
///
/// group_id = 档位×100 + 序号, major_id = group_id×10 + 1
fn seed_band(conn: &std::sync::Arc<std::sync::Mutex<rusqlite::Connection>>, composite_band: i32) {
    let (lo, hi) = BAND_SCORE_WINDOWS[(composite_band - 1) as usize];
    for k in 0..4 {
        let group_id = (composite_band * 100 + k) as i64;
        let predicted = (lo + k.min(hi - lo)).min(hi);
        let seed = GroupSeed::new(group_id, &format!("测试院校{}", group_id), 100, predicted);
        seed_group(conn, &seed);
        seed_major(conn, group_id * 10 + 1, group_id, "测试专业", Some(2), Some(6_000));
    }
}

/// 写入 12 档 × 4 组的完整候选数据
fn seed_all_bands(conn: &std::sync::Arc<std::sync::Mutex<rusqlite::Connection>>) {
    seed_area(conn, 1, "中国", 0);
    seed_area(conn, 10, "湖南省", 1);
    seed_area(conn, 100, "长沙市", 10);
    for composite_band in 1..=12 {
        seed_band(conn, composite_band);
    }
}

fn test_student() -> StudentQueryContext {
    StudentQueryContext {
        score: 600,
        subject_track: SubjectTrack::Physics,
        education_level: EducationLevel::Undergraduate,
        subject_selection: SubjectSelection {
            physics: true,
            chemistry: true,
            ..Default::default()
        },
        preferred_area_ids: Vec::new(),
        preferred_major_type_ids: Vec::new(),
        tuition_ranges: Vec::new(),
        school_feature_filters: Vec::new(),
        school_type_filters: Vec::new(),
        school_special_filters: Vec::new(),
        mode: RecommendMode::Smart,
        has_final_score: true,
        profile_text: "物理类考生, 600 分, 偏好工科".to_string(),
    }
}

fn build_orchestrator(
    conn: &std::sync::Arc<std::sync::Mutex<rusqlite::Connection>>,
    selector: Arc<dyn VolunteerSelector>,
) -> (BatchPlanOrchestrator, Arc<PlanRepository>) {
    let plan_repo = Arc::new(PlanRepository::from_connection(conn.clone()));
    let orchestrator = BatchPlanOrchestrator::new(
        Arc::new(build_query_engine(conn)),
        plan_repo.clone(),
        selector,
        100,
    );
    (orchestrator, plan_repo)
}

/// 预先写入一个历史成功方案, 使后续生成不再是首次
/// (首次生成强制兜底, 不走 AI)
fn seed_prior_success(plan_repo: &PlanRepository, student_id: i64) {
    plan_repo
        .create_plan("prior-plan", student_id, "old-hash")
        .unwrap();
    plan_repo
        .update_status("prior-plan", PlanStatus::Success, None, 48)
        .unwrap();
}

// ==========================================
// 测试替身: 选报服务
// ==========================================

/// 每档选前 2 组, 每组选第 1 个专业
struct PickFirstTwoSelector {
    calls: AtomicUsize,
}

#[async_trait]
impl VolunteerSelector for PickFirstTwoSelector {
    async fn select(
        &self,
        _profile_text: &str,
        candidates: &[CandidateBrief],
    ) -> EngineResult<SelectionMap> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(candidates
            .iter()
            .take(2)
            .map(|c| {
                let majors = c.majors.first().map(|m| vec![m.id]).unwrap_or_default();
                (c.group_id, majors)
            })
            .collect())
    }
}

/// 始终失败的选报服务 (触发兜底)
struct AlwaysFailSelector;

#[async_trait]
impl VolunteerSelector for AlwaysFailSelector {
    async fn select(
        &self,
        _profile_text: &str,
        _candidates: &[CandidateBrief],
    ) -> EngineResult<SelectionMap> {
        Err(EngineError::UpstreamServiceFailure("服务不可用".to_string()))
    }
}

/// 在指定档位完成后置位取消标记的监听器
struct CancelAfterBandListener {
    cancel_after: i32,
    flag: Arc<AtomicBool>,
}

impl PlanProgressListener for CancelAfterBandListener {
    fn on_band_complete(&self, composite_band: i32, _percent: u8, _outcome: &BandOutcome) {
        if composite_band >= self.cancel_after {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}

// ==========================================
// 测试用例
// ==========================================

#[tokio::test]
async fn test_first_generation_fills_48_slots_with_fallback() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_all_bands(&conn);
    // 首次生成: 即便有正式成绩也走兜底选报
    let (orchestrator, plan_repo) =
        build_orchestrator(&conn, Arc::new(PickFirstTwoSelector { calls: AtomicUsize::new(0) }));

    let cancel = Arc::new(AtomicBool::new(false));
    let summary = orchestrator
        .generate_plan(1, &test_student(), &NoOpProgressListener, &cancel)
        .await
        .unwrap();

    assert_eq!(summary.status, PlanStatus::Success);
    assert_eq!(summary.filled_slots, 48);
    assert_eq!(summary.band_reports.len(), 12);
    for report in &summary.band_reports {
        assert_eq!(report.outcome, BandOutcome::FallbackSelected);
        assert_eq!(report.selected_groups, 4);
    }

    // 梯度顺序: 冲×4, 稳×4, 保×4
    let tiers: Vec<Tier> = summary.band_reports.iter().map(|r| r.tier).collect();
    assert_eq!(&tiers[0..4], &[Tier::Reach; 4]);
    assert_eq!(&tiers[4..8], &[Tier::Match; 4]);
    assert_eq!(&tiers[8..12], &[Tier::Safety; 4]);

    // 落库校验: 槽位序号 1..=48 无重复, 专业组跨档不重复
    let plan = plan_repo.find_plan(&summary.plan_id).unwrap().unwrap();
    assert_eq!(plan.status, PlanStatus::Success);
    assert_eq!(plan.slots.len(), 48);

    let slot_indexes: HashSet<i32> = plan.slots.iter().map(|s| s.slot_index).collect();
    assert_eq!(slot_indexes.len(), 48);
    assert!(slot_indexes.iter().all(|i| (1..=48).contains(i)));

    let group_ids: HashSet<i64> = plan.slots.iter().map(|s| s.group_id).collect();
    assert_eq!(group_ids.len(), 48, "专业组不允许跨档重复入选");

    // 每槽专业非空且不超过 6 个
    for slot in &plan.slots {
        assert!(!slot.major_ids.is_empty());
        assert!(slot.major_ids.len() <= 6);
    }
}

#[tokio::test]
async fn test_ai_selection_after_first_generation() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_all_bands(&conn);
    let selector = Arc::new(PickFirstTwoSelector { calls: AtomicUsize::new(0) });
    let (orchestrator, plan_repo) = build_orchestrator(&conn, selector.clone());
    seed_prior_success(&plan_repo, 1);

    let cancel = Arc::new(AtomicBool::new(false));
    let summary = orchestrator
        .generate_plan(1, &test_student(), &NoOpProgressListener, &cancel)
        .await
        .unwrap();

    assert_eq!(summary.status, PlanStatus::Success);
    // AI 每档只选 2 组 → 12 × 2 = 24 槽
    assert_eq!(summary.filled_slots, 24);
    assert_eq!(selector.calls.load(Ordering::SeqCst), 12);
    for report in &summary.band_reports {
        assert_eq!(report.outcome, BandOutcome::AiSelected);
        assert_eq!(report.selected_groups, 2);
    }

    // 槽位序号仍按档位基址计算: 第 N 档从 (N-1)*4+1 起
    let plan = plan_repo.find_plan(&summary.plan_id).unwrap().unwrap();
    for slot in &plan.slots {
        let base = (slot.composite_band - 1) * 4 + 1;
        assert!((base..base + 2).contains(&slot.slot_index));
    }
}

#[tokio::test]
async fn test_ai_failure_falls_back_per_band() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_all_bands(&conn);
    let (orchestrator, plan_repo) = build_orchestrator(&conn, Arc::new(AlwaysFailSelector));
    seed_prior_success(&plan_repo, 1);

    let cancel = Arc::new(AtomicBool::new(false));
    let summary = orchestrator
        .generate_plan(1, &test_student(), &NoOpProgressListener, &cancel)
        .await
        .unwrap();

    // AI 全程失败不影响方案成功, 每档兜底填满
    assert_eq!(summary.status, PlanStatus::Success);
    assert_eq!(summary.filled_slots, 48);
    for report in &summary.band_reports {
        assert_eq!(report.outcome, BandOutcome::FallbackSelected);
    }
}

#[tokio::test]
async fn test_sparse_bands_partial_completeness() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_area(&conn, 1, "中国", 0);
    seed_area(&conn, 10, "湖南省", 1);
    seed_area(&conn, 100, "长沙市", 10);
    // 只有冲1 和 稳1 有候选
    seed_band(&conn, 1);
    seed_band(&conn, 5);

    let (orchestrator, _) =
        build_orchestrator(&conn, Arc::new(PickFirstTwoSelector { calls: AtomicUsize::new(0) }));

    let cancel = Arc::new(AtomicBool::new(false));
    let summary = orchestrator
        .generate_plan(1, &test_student(), &NoOpProgressListener, &cancel)
        .await
        .unwrap();

    // 完整度不足不是失败
    assert_eq!(summary.status, PlanStatus::Success);
    assert_eq!(summary.filled_slots, 8);

    for report in &summary.band_reports {
        if report.composite_band == 1 || report.composite_band == 5 {
            assert_eq!(report.outcome, BandOutcome::FallbackSelected);
        } else {
            assert_eq!(report.outcome, BandOutcome::Empty);
            assert_eq!(report.selected_groups, 0);
        }
    }
}

#[tokio::test]
async fn test_cancellation_between_bands() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_all_bands(&conn);
    let (orchestrator, plan_repo) =
        build_orchestrator(&conn, Arc::new(PickFirstTwoSelector { calls: AtomicUsize::new(0) }));

    let cancel = Arc::new(AtomicBool::new(false));
    let listener = CancelAfterBandListener {
        cancel_after: 3,
        flag: cancel.clone(),
    };

    let summary = orchestrator
        .generate_plan(1, &test_student(), &listener, &cancel)
        .await
        .unwrap();

    // 第 3 档完成后取消: 已写入的 3 档保留, 后续档位不执行
    assert_eq!(summary.status, PlanStatus::Cancelled);
    assert_eq!(summary.band_reports.len(), 3);
    assert_eq!(summary.filled_slots, 12);

    let plan = plan_repo.find_plan(&summary.plan_id).unwrap().unwrap();
    assert_eq!(plan.status, PlanStatus::Cancelled);
    assert_eq!(plan.slots.len(), 12);
    assert!(plan.slots.iter().all(|s| s.composite_band <= 3));
}

#[tokio::test]
async fn test_duplicate_generation_rejected() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_all_bands(&conn);
    let (orchestrator, _) =
        build_orchestrator(&conn, Arc::new(PickFirstTwoSelector { calls: AtomicUsize::new(0) }));

    let student = test_student();
    let cancel = Arc::new(AtomicBool::new(false));

    orchestrator
        .generate_plan(1, &student, &NoOpProgressListener, &cancel)
        .await
        .unwrap();

    // 数据未变化的二次生成被拦截
    let err = orchestrator
        .generate_plan(1, &student, &NoOpProgressListener, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateGeneration));

    // 数据变化后允许重新生成
    let mut changed = student.clone();
    changed.score = 601;
    let summary = orchestrator
        .generate_plan(1, &changed, &NoOpProgressListener, &cancel)
        .await
        .unwrap();
    assert_eq!(summary.status, PlanStatus::Success);
}

#[tokio::test]
async fn test_concurrent_generation_rejected() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_all_bands(&conn);
    let (orchestrator, plan_repo) =
        build_orchestrator(&conn, Arc::new(PickFirstTwoSelector { calls: AtomicUsize::new(0) }));

    // 模拟未完成的生成任务
    plan_repo.create_plan("in-flight", 1, "some-hash").unwrap();

    let cancel = Arc::new(AtomicBool::new(false));
    let err = orchestrator
        .generate_plan(1, &test_student(), &NoOpProgressListener, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::GenerationInFlight));
}

#[tokio::test]
async fn test_preference_filters_carried_into_band_queries() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_all_bands(&conn);

    // 额外造一个学费超出偏好的组 (冲1 窗口内)
    let mut pricey = GroupSeed::new(9_999, "高收费学院", 100, 611);
    pricey.min_tuition = Some(80_000);
    pricey.max_tuition = Some(120_000);
    seed_group(&conn, &pricey);
    seed_major(&conn, 99_991, 9_999, "高收费专业", Some(2), Some(100_000));

    let (orchestrator, plan_repo) =
        build_orchestrator(&conn, Arc::new(PickFirstTwoSelector { calls: AtomicUsize::new(0) }));

    let mut student = test_student();
    student.tuition_ranges = vec![TuitionRange { min: 0, max: Some(10_000) }];

    let cancel = Arc::new(AtomicBool::new(false));
    let summary = orchestrator
        .generate_plan(1, &student, &NoOpProgressListener, &cancel)
        .await
        .unwrap();

    assert_eq!(summary.status, PlanStatus::Success);
    let plan = plan_repo.find_plan(&summary.plan_id).unwrap().unwrap();
    assert!(
        plan.slots.iter().all(|s| s.group_id != 9_999),
        "学费偏好外的专业组不应入选"
    );
}

#[tokio::test]
async fn test_data_hash_stability() {
    let student = test_student();
    let h1 = BatchPlanOrchestrator::data_hash(&student);
    let h2 = BatchPlanOrchestrator::data_hash(&student);
    assert_eq!(h1, h2);

    let mut changed = student.clone();
    changed.score = 599;
    assert_ne!(h1, BatchPlanOrchestrator::data_hash(&changed));
}
