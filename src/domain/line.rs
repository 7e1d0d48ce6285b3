// ==========================================
// 高考志愿推荐引擎 - 录取线实体
// ==========================================
// 录取线按年份分表存储 (admission_line_2021..2025),
// 逻辑上为单一按年分区表
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// AdmissionLineRecord - 录取线记录
// ==========================================
// major_id = MAJOR_ID_GROUP_LINE 的记录为整组投档线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionLineRecord {
    pub group_id: i64,
    pub major_id: i64,
    pub year: i32,
    pub subject_track: i32,
    pub education_level: i32,
    pub score: Option<i32>,
    /// 预估投档线 (仅当前年份有值)
    pub predicted_score: Option<i32>,
    pub plan_size: Option<i32>,
    pub rank: Option<i64>,
}

// ==========================================
// ProvincialCutoff - 省控线
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProvincialCutoff {
    pub year: i32,
    pub subject_track: i32,
    pub education_level: i32,
    pub cutoff_score: i32,
}

/// 线差 = 录取分 − 省控线, 任一侧缺失则为 None
///
/// 分数领域为整数编码, 浮点来源需四舍五入而非截断
pub fn line_diff(score: Option<f64>, cutoff: Option<f64>) -> Option<i32> {
    match (score, cutoff) {
        (Some(s), Some(c)) => Some(s.round() as i32 - c.round() as i32),
        _ => None,
    }
}
