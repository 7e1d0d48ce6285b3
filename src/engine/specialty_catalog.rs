// ==========================================
// 高考志愿推荐引擎 - 专业目录读取器
// ==========================================
// 职责: 组装一个专业组的专业目录:
// 2021-2025 逐年出现过的专业并集, 当年指标优先,
// 每个专业附 2021-2024 历史 (含对年度批次线的线差)
// ==========================================

use crate::domain::group::YearLine;
use crate::domain::line::line_diff;
use crate::domain::major::MajorWithHistory;
use crate::domain::types::{EducationLevel, SubjectTrack, CURRENT_YEAR, HISTORY_YEARS};
use crate::repository::error::RepositoryResult;
use crate::repository::line_repo::LineRepository;
use crate::repository::major_repo::MajorRepository;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

// ==========================================
// SpecialtyCatalogReader - 专业目录读取器
// ==========================================
pub struct SpecialtyCatalogReader {
    major_repo: Arc<MajorRepository>,
    line_repo: Arc<LineRepository>,
}

impl SpecialtyCatalogReader {
    /// 构造函数
    pub fn new(major_repo: Arc<MajorRepository>, line_repo: Arc<LineRepository>) -> Self {
        Self {
            major_repo,
            line_repo,
        }
    }

    /// 读取专业组的专业目录
    ///
    /// - 专业范围: major 表该组条目 (哨兵/占位 id 已在仓储层排除)
    /// - 当年指标优先: 学费取 major 表, 预估线/
    ///   计划数取当年分专业记录
    /// - plan_number_change = 当年计划 − 上一年计划 (缺失按 0)
    /// - 历史按年份降序, 线差相对该年度批次线
    pub fn specialties_for(&self, group_id: i64) -> RepositoryResult<Vec<MajorWithHistory>> {
        let majors = self.major_repo.majors_for_group(group_id)?;
        if majors.is_empty() {
            return Ok(Vec::new());
        }

        // (year, major_id) -> 分专业记录
        let mut year_records: HashMap<(i32, i64), YearRecord> = HashMap::new();
        // (year, track_code, level_code) -> 省控线 (懒加载缓存)
        let mut cutoff_cache: HashMap<(i32, i32, i32), Option<i32>> = HashMap::new();

        let mut all_years = Vec::with_capacity(HISTORY_YEARS.len() + 1);
        all_years.extend(HISTORY_YEARS);
        all_years.push(CURRENT_YEAR);

        for year in all_years {
            for record in self.line_repo.major_lines_for_year(year, group_id)? {
                let cutoff = *cutoff_cache
                    .entry((year, record.subject_track, record.education_level))
                    .or_insert_with(|| {
                        let track = SubjectTrack::from_code(record.subject_track)?;
                        let level = EducationLevel::from_code(record.education_level)?;
                        self.line_repo.cutoff_for(year, track, level).ok().flatten()
                            .map(|c| c.cutoff_score)
                    });

                year_records.insert(
                    (year, record.major_id),
                    YearRecord {
                        score: record.score,
                        predicted_score: record.predicted_score,
                        plan_size: record.plan_size,
                        rank: record.rank,
                        provincial_line: cutoff,
                    },
                );
            }
        }

        debug!(
            group_id,
            majors = majors.len(),
            year_records = year_records.len(),
            "专业目录组装"
        );

        let catalog = majors
            .into_iter()
            .map(|major| {
                let current = year_records.get(&(CURRENT_YEAR, major.major_id));
                let plan_current = current.and_then(|r| r.plan_size).unwrap_or(0);
                let plan_previous = year_records
                    .get(&(CURRENT_YEAR - 1, major.major_id))
                    .and_then(|r| r.plan_size)
                    .unwrap_or(0);

                // 历史按年份降序
                let mut history: Vec<YearLine> = HISTORY_YEARS
                    .iter()
                    .filter_map(|&year| {
                        let record = year_records.get(&(year, major.major_id))?;
                        Some(YearLine {
                            year,
                            admitted_score: record.score,
                            plan_size: record.plan_size,
                            provincial_line: record.provincial_line,
                            line_diff: line_diff(
                                record.score.map(f64::from),
                                record.provincial_line.map(f64::from),
                            ),
                            rank: record.rank,
                        })
                    })
                    .collect();
                history.sort_by(|a, b| b.year.cmp(&a.year));

                MajorWithHistory {
                    major_id: major.major_id,
                    code: major.code,
                    name: major.name,
                    direction: major.direction,
                    tuition: major.tuition,
                    predicted_score: current.and_then(|r| r.predicted_score.or(r.score)),
                    plan_size: current.and_then(|r| r.plan_size),
                    plan_number_change: plan_current - plan_previous,
                    history,
                }
            })
            .collect();

        Ok(catalog)
    }
}

/// 分专业单年记录的内部投影
struct YearRecord {
    score: Option<i32>,
    predicted_score: Option<i32>,
    plan_size: Option<i32>,
    rank: Option<i64>,
    provincial_line: Option<i32>,
}
