// ==========================================
// 高考志愿推荐引擎 - 院校专业组实体
// ==========================================
// 专业组 = 招生单位: 一所院校按选科方向拆分的
// 专业集合, 共享一条投档线
// ==========================================

use crate::domain::major::MajorWithHistory;
use crate::domain::types::{Ownership, ScoreBandLabel, SubjectRequirement};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// SubjectRequirements - 六科选科要求
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectRequirements {
    pub physics: SubjectRequirement,
    pub history: SubjectRequirement,
    pub chemistry: SubjectRequirement,
    pub biology: SubjectRequirement,
    pub geography: SubjectRequirement,
    pub politics: SubjectRequirement,
}

impl SubjectRequirements {
    /// 全部不限
    pub fn unrestricted() -> Self {
        Self {
            physics: SubjectRequirement::NoRequirement,
            history: SubjectRequirement::NoRequirement,
            chemistry: SubjectRequirement::NoRequirement,
            biology: SubjectRequirement::NoRequirement,
            geography: SubjectRequirement::NoRequirement,
            politics: SubjectRequirement::NoRequirement,
        }
    }

    /// 考生选科是否满足全部六科要求
    ///
    /// 规则: 组内某科为"必选"时考生必须已选该科;
    /// "不限"对任何选科组合均满足
    pub fn satisfied_by(&self, selection: &SubjectSelection) -> bool {
        self.physics.satisfied_by(selection.physics)
            && self.history.satisfied_by(selection.history)
            && self.chemistry.satisfied_by(selection.chemistry)
            && self.biology.satisfied_by(selection.biology)
            && self.geography.satisfied_by(selection.geography)
            && self.politics.satisfied_by(selection.politics)
    }
}

// ==========================================
// SubjectSelection - 考生选科组合
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubjectSelection {
    pub physics: bool,
    pub history: bool,
    pub chemistry: bool,
    pub biology: bool,
    pub geography: bool,
    pub politics: bool,
}

// ==========================================
// SchoolProgramGroup - 院校专业组
// ==========================================
// CSV 编码的多值字段在行映射时解析为 Vec<i32>,
// 过滤谓词不再重复解析字符串
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolProgramGroup {
    pub group_id: i64,
    pub school_id: i64,
    pub school_name: String,
    pub school_code: String,
    pub group_name: String,
    pub area_id: i64,
    pub school_type: Option<i32>,
    pub ownership: Option<Ownership>,
    pub feature_codes: Vec<i32>,
    pub special_codes: Vec<i32>,
    pub subject_requirements: SubjectRequirements,
    pub min_tuition: Option<i64>,
    pub max_tuition: Option<i64>,
}

// ==========================================
// GroupCandidate - 候选专业组 (组 + 当年线)
// ==========================================
// GroupRepository::find_candidates 的返回行:
// 专业组与 2025 年投档线 join 的结果
#[derive(Debug, Clone)]
pub struct GroupCandidate {
    pub group: SchoolProgramGroup,
    /// 当年预估投档线 (必非空, 查询层已过滤)
    pub predicted_score: i32,
    /// 当年计划招生数
    pub plan_size: Option<i32>,
    /// 当年预估最低位次
    pub rank: Option<i64>,
}

impl GroupCandidate {
    /// 线差 = 预估投档线 − 考生成绩
    pub fn score_diff(&self, student_score: i32) -> i32 {
        self.predicted_score - student_score
    }
}

// ==========================================
// YearLine - 单年录取线聚合
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearLine {
    pub year: i32,
    pub admitted_score: Option<i32>,
    pub plan_size: Option<i32>,
    pub provincial_line: Option<i32>,
    /// 线差 = 录取线 − 省控线, 任一侧缺失则为 None
    pub line_diff: Option<i32>,
    pub rank: Option<i64>,
}

// ==========================================
// EnrichedGroupResult - 推荐结果 (不可变值对象)
// ==========================================
// 一次性构造, 字段全部前置声明, 不做事后注入
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedGroupResult {
    pub group_id: i64,
    pub school_id: i64,
    pub school_name: String,
    pub school_code: String,
    pub group_name: String,
    /// 组合地区文案, 如 "湖南省长沙市"
    pub location_text: String,
    /// 办学性质 (公办/民办), 编码无法识别时为 None
    pub ownership: Option<Ownership>,
    pub feature_texts: Vec<String>,
    pub type_texts: Vec<String>,
    pub special_texts: Vec<String>,
    pub predicted_score: i32,
    pub plan_size: Option<i32>,
    pub rank: Option<i64>,
    /// 线差 = 预估投档线 − 考生成绩
    pub score_diff: i32,
    /// 冲/稳/保分档结果
    pub band: ScoreBandLabel,
    /// 2021-2024 历史录取线, 按年份索引
    pub history: BTreeMap<i32, YearLine>,
    /// 组内专业目录 (含各专业历史)
    pub specialties: Vec<MajorWithHistory>,
    /// 计划增减 = 当年计划 − 上一年计划
    pub plan_increase: Option<i32>,
}

// ==========================================
// PaginationMeta - 分页元信息
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}
