// ==========================================
// 高考志愿推荐引擎 - 专业实体
// ==========================================

use crate::domain::group::YearLine;
use serde::{Deserialize, Serialize};

// ==========================================
// Major - 专业
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Major {
    pub major_id: i64,
    pub code: String,
    pub name: String,
    pub group_id: i64,
    /// 专业方向备注, 如 "(中外合作办学)"
    pub direction: Option<String>,
    pub tuition: Option<i64>,
    /// 专业门类 id (用于专业类型筛选)
    pub type_id: Option<i64>,
    pub is_teacher_track: bool,
    pub is_medical_track: bool,
    pub is_civil_service_track: bool,
    pub description: Option<String>,
}

// ==========================================
// MajorWithHistory - 专业 + 逐年历史
// ==========================================
// SpecialtyCatalogReader 的输出: 当年指标优先,
// 历史按年份降序
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MajorWithHistory {
    pub major_id: i64,
    pub code: String,
    pub name: String,
    pub direction: Option<String>,
    pub tuition: Option<i64>,
    pub predicted_score: Option<i32>,
    pub plan_size: Option<i32>,
    /// 计划增减 = 当年计划 − 上一年计划 (缺失按 0)
    pub plan_number_change: i32,
    /// 按年份降序的历史记录
    pub history: Vec<YearLine>,
}
