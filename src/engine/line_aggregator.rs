// ==========================================
// 高考志愿推荐引擎 - 历史录取线聚合器
// ==========================================
// 职责: 为一批专业组拉取 2021-2024 投档线,
// 计算各年相对省控线的线差
//
// 失败模式: 某年数据缺失不影响整批, 该年直接缺席
// ==========================================

use crate::domain::group::YearLine;
use crate::domain::line::line_diff;
use crate::domain::types::{EducationLevel, SubjectTrack, HISTORY_YEARS};
use crate::repository::error::RepositoryResult;
use crate::repository::line_repo::LineRepository;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// 按专业组、按年份索引的历史线差表
pub type GroupHistoryMap = HashMap<i64, BTreeMap<i32, YearLine>>;

// ==========================================
// HistoricalLineAggregator - 历史录取线聚合器
// ==========================================
pub struct HistoricalLineAggregator {
    line_repo: Arc<LineRepository>,
}

impl HistoricalLineAggregator {
    /// 构造函数
    pub fn new(line_repo: Arc<LineRepository>) -> Self {
        Self { line_repo }
    }

    /// 拉取一批专业组的 2021-2024 历史录取线
    ///
    /// 每年: 先取该 (年, 方向, 层次) 省控线, 再取
    /// 整组投档线记录, 线差 = 录取线 − 省控线
    /// (任一侧缺失则线差为 None)
    ///
    /// # 参数
    /// - group_ids: 专业组 id 列表
    /// - subject_track: 选科方向
    /// - education_level: 学历层次
    ///
    /// # 返回
    /// map<group_id, map<year, YearLine>>; 无数据的
    /// (组, 年) 不出现在结果中
    pub fn history_for(
        &self,
        group_ids: &[i64],
        subject_track: SubjectTrack,
        education_level: EducationLevel,
    ) -> RepositoryResult<GroupHistoryMap> {
        let mut result: GroupHistoryMap = HashMap::new();
        if group_ids.is_empty() {
            return Ok(result);
        }

        for year in HISTORY_YEARS {
            let cutoff = self
                .line_repo
                .cutoff_for(year, subject_track, education_level)?;

            let records = self.line_repo.group_lines_for_year(
                year,
                group_ids,
                subject_track,
                education_level,
            )?;

            debug!(
                year,
                cutoff = ?cutoff.map(|c| c.cutoff_score),
                records = records.len(),
                "历史录取线年度聚合"
            );

            for record in records {
                let provincial_line = cutoff.map(|c| c.cutoff_score);
                let diff = line_diff(
                    record.score.map(f64::from),
                    provincial_line.map(f64::from),
                );

                result.entry(record.group_id).or_default().insert(
                    year,
                    YearLine {
                        year,
                        admitted_score: record.score,
                        plan_size: record.plan_size,
                        provincial_line,
                        line_diff: diff,
                        rank: record.rank,
                    },
                );
            }
        }

        Ok(result)
    }
}
