// ==========================================
// 历史录取线聚合 / 专业目录组装集成测试
// ==========================================
// 覆盖: 逐年线差计算 / 缺失年份与缺失省控线语义 /
// 当年指标优先 / 计划增减 / 哨兵行排除
// ==========================================


use std::sync::Arc;
use test_helpers::*;
use zhiyuan_engine::engine::{HistoricalLineAggregator, SpecialtyCatalogReader};
use zhiyuan_engine::repository::{LineRepository, MajorRepository};
use zhiyuan_engine::{EducationLevel, SubjectTrack};

// ==========================================
// 历史录取线聚合器
// ==========================================

#[test]
fn test_aggregator_computes_yearly_line_diff() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_area(&conn, 1, "中国", 0);
    seed_group(&conn, &GroupSeed::new(1, "甲大学", 1, 610));
    seed_group(&conn, &GroupSeed::new(2, "乙大学", 1, 605));

    seed_cutoff(&conn, 2024, 2, 11, 475);
    seed_cutoff(&conn, 2023, 2, 11, 482);

    seed_group_line(&conn, 2024, 1, 2, 11, Some(606), Some(45));
    seed_group_line(&conn, 2023, 1, 2, 11, Some(601), Some(48));
    seed_group_line(&conn, 2024, 2, 2, 11, Some(580), Some(30));

    let line_repo = Arc::new(LineRepository::from_connection(conn.clone()));
    let aggregator = HistoricalLineAggregator::new(line_repo);

    let history = aggregator
        .history_for(&[1, 2], SubjectTrack::Physics, EducationLevel::Undergraduate)
        .unwrap();

    let g1 = history.get(&1).unwrap();
    assert_eq!(g1.len(), 2);
    assert_eq!(g1.get(&2024).unwrap().line_diff, Some(131));
    assert_eq!(g1.get(&2024).unwrap().provincial_line, Some(475));
    assert_eq!(g1.get(&2023).unwrap().line_diff, Some(119));
    // 无数据的年份不出现
    assert!(!g1.contains_key(&2021));
    assert!(!g1.contains_key(&2022));

    let g2 = history.get(&2).unwrap();
    assert_eq!(g2.len(), 1);
    assert_eq!(g2.get(&2024).unwrap().line_diff, Some(105));
}

#[test]
fn test_aggregator_missing_cutoff_keeps_score() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_area(&conn, 1, "中国", 0);
    seed_group(&conn, &GroupSeed::new(1, "甲大学", 1, 610));

    // 2022 有投档线但整年无省控线
    seed_group_line(&conn, 2022, 1, 2, 11, Some(590), Some(40));

    let line_repo = Arc::new(LineRepository::from_connection(conn.clone()));
    let aggregator = HistoricalLineAggregator::new(line_repo);

    let history = aggregator
        .history_for(&[1], SubjectTrack::Physics, EducationLevel::Undergraduate)
        .unwrap();

    let year = history.get(&1).unwrap().get(&2022).unwrap();
    assert_eq!(year.admitted_score, Some(590));
    assert_eq!(year.provincial_line, None);
    assert_eq!(year.line_diff, None);
}

#[test]
fn test_aggregator_track_and_level_isolation() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_area(&conn, 1, "中国", 0);
    seed_group(&conn, &GroupSeed::new(1, "甲大学", 1, 610));

    // 同组同年: 物理类与历史类各一条, 只取请求方向的
    seed_cutoff(&conn, 2024, 2, 11, 475);
    seed_cutoff(&conn, 2024, 1, 11, 490);
    seed_group_line(&conn, 2024, 1, 2, 11, Some(606), Some(45));
    seed_group_line(&conn, 2024, 1, 1, 11, Some(612), Some(20));

    let line_repo = Arc::new(LineRepository::from_connection(conn.clone()));
    let aggregator = HistoricalLineAggregator::new(line_repo);

    let physics = aggregator
        .history_for(&[1], SubjectTrack::Physics, EducationLevel::Undergraduate)
        .unwrap();
    assert_eq!(
        physics.get(&1).unwrap().get(&2024).unwrap().admitted_score,
        Some(606)
    );

    let history_track = aggregator
        .history_for(&[1], SubjectTrack::History, EducationLevel::Undergraduate)
        .unwrap();
    assert_eq!(
        history_track.get(&1).unwrap().get(&2024).unwrap().line_diff,
        Some(122)
    );
}

#[test]
fn test_aggregator_empty_input() {
    let (_tmp, conn) = create_test_db().unwrap();
    let line_repo = Arc::new(LineRepository::from_connection(conn.clone()));
    let aggregator = HistoricalLineAggregator::new(line_repo);

    let history = aggregator
        .history_for(&[], SubjectTrack::Physics, EducationLevel::Undergraduate)
        .unwrap();
    assert!(history.is_empty());
}

// ==========================================
// 专业目录读取器
// ==========================================

fn build_catalog_reader(
    conn: &std::sync::Arc<std::sync::Mutex<rusqlite::Connection>>,
) -> SpecialtyCatalogReader {
    let major_repo = Arc::new(MajorRepository::from_connection(conn.clone()));
    let line_repo = Arc::new(LineRepository::from_connection(conn.clone()));
    SpecialtyCatalogReader::new(major_repo, line_repo)
}

#[test]
fn test_catalog_current_year_precedence_and_plan_change() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_area(&conn, 1, "中国", 0);
    seed_group(&conn, &GroupSeed::new(1, "甲大学", 1, 610));

    seed_major(&conn, 11, 1, "计算机科学与技术", Some(8), Some(6_500));
    seed_cutoff(&conn, 2024, 2, 11, 475);

    // 2025 分专业记录: 预估线 + 计划数; 2024: 实际录取线
    seed_major_line(&conn, 2025, 1, 11, 2, 11, None, Some(618), Some(12));
    seed_major_line(&conn, 2024, 1, 11, 2, 11, Some(611), None, Some(9));

    let catalog = build_catalog_reader(&conn).specialties_for(1).unwrap();
    assert_eq!(catalog.len(), 1);

    let major = &catalog[0];
    assert_eq!(major.name, "计算机科学与技术");
    assert_eq!(major.tuition, Some(6_500));
    // 当年指标优先
    assert_eq!(major.predicted_score, Some(618));
    assert_eq!(major.plan_size, Some(12));
    // 计划增减 = 12 − 9
    assert_eq!(major.plan_number_change, 3);

    // 历史只含 2024, 线差相对该年省控线
    assert_eq!(major.history.len(), 1);
    assert_eq!(major.history[0].year, 2024);
    assert_eq!(major.history[0].line_diff, Some(136));
}

#[test]
fn test_catalog_history_sorted_descending() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_area(&conn, 1, "中国", 0);
    seed_group(&conn, &GroupSeed::new(1, "甲大学", 1, 610));
    seed_major(&conn, 11, 1, "软件工程", Some(8), Some(8_000));

    // 乱序写入三年记录
    seed_major_line(&conn, 2022, 1, 11, 2, 11, Some(595), None, Some(10));
    seed_major_line(&conn, 2024, 1, 11, 2, 11, Some(608), None, Some(10));
    seed_major_line(&conn, 2021, 1, 11, 2, 11, Some(588), None, Some(10));

    let catalog = build_catalog_reader(&conn).specialties_for(1).unwrap();
    let years: Vec<i32> = catalog[0].history.iter().map(|h| h.year).collect();
    assert_eq!(years, vec![2024, 2022, 2021]);
}

#[test]
fn test_catalog_major_without_records() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_area(&conn, 1, "中国", 0);
    seed_group(&conn, &GroupSeed::new(1, "甲大学", 1, 610));
    // 专业在册但任何年份都无记录
    seed_major(&conn, 11, 1, "新设专业", Some(8), Some(5_000));

    let catalog = build_catalog_reader(&conn).specialties_for(1).unwrap();
    assert_eq!(catalog.len(), 1);

    let major = &catalog[0];
    assert_eq!(major.predicted_score, None);
    assert_eq!(major.plan_size, None);
    assert_eq!(major.plan_number_change, 0);
    assert!(major.history.is_empty());
}

#[test]
fn test_catalog_excludes_sentinel_rows() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_area(&conn, 1, "中国", 0);
    // seed_group 本身写入 major_id=0 的整组线哨兵行
    seed_group(&conn, &GroupSeed::new(1, "甲大学", 1, 610));
    seed_major(&conn, 11, 1, "会计学", Some(12), Some(5_000));
    // 遗留占位行 major_id=1
    seed_major_line(&conn, 2024, 1, 1, 2, 11, Some(600), None, Some(5));

    let catalog = build_catalog_reader(&conn).specialties_for(1).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].major_id, 11);
    assert!(catalog[0].history.is_empty());
}

#[test]
fn test_catalog_empty_group() {
    let (_tmp, conn) = create_test_db().unwrap();
    let catalog = build_catalog_reader(&conn).specialties_for(42).unwrap();
    assert!(catalog.is_empty());
}

#[test]
fn test_catalog_current_year_score_fallback() {
    let (_tmp, conn) = create_test_db().unwrap();
    seed_area(&conn, 1, "中国", 0);
    seed_group(&conn, &GroupSeed::new(1, "甲大学", 1, 610));
    seed_major(&conn, 11, 1, "临床医学", Some(5), Some(7_000));

    // 2025 记录无预估线时回退到 score 列
    seed_major_line(&conn, 2025, 1, 11, 2, 11, Some(620), None, Some(6));

    let catalog = build_catalog_reader(&conn).specialties_for(1).unwrap();
    assert_eq!(catalog[0].predicted_score, Some(620));
}
