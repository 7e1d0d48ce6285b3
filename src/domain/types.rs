// ==========================================
// 高考志愿推荐引擎 - 领域类型定义
// ==========================================
// 依据: 志愿填报业务规则 - 冲稳保分层体系
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 推荐梯度 (Tier)
// ==========================================
// 红线: 三档制 (冲/稳/保), 不是连续评分制
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Reach,  // 冲
    Match,  // 稳
    Safety, // 保
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Reach => write!(f, "冲"),
            Tier::Match => write!(f, "稳"),
            Tier::Safety => write!(f, "保"),
        }
    }
}

impl Tier {
    /// 从接口传入的梯度编号解析 (1=冲, 2=稳, 3=保)
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Tier::Reach),
            2 => Some(Tier::Match),
            3 => Some(Tier::Safety),
            _ => None,
        }
    }

    /// 转换为梯度编号
    pub fn to_id(&self) -> i32 {
        match self {
            Tier::Reach => 1,
            Tier::Match => 2,
            Tier::Safety => 3,
        }
    }

    /// 填报建议文案
    pub fn advisory(&self) -> &'static str {
        match self {
            Tier::Reach => "冲刺院校，往年投档线高于考生成绩，录取概率较低，建议谨慎填报",
            Tier::Match => "稳妥院校，往年投档线与考生成绩相当，录取概率适中",
            Tier::Safety => "保底院校，往年投档线明显低于考生成绩，录取概率较高",
        }
    }
}

// ==========================================
// 推荐模式 (Recommend Mode)
// ==========================================
// 智能/专业/自由三种模式, 分档宽度各不相同
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendMode {
    Smart,        // 智能模式
    Professional, // 专业模式
    Free,         // 自由模式
}

impl fmt::Display for RecommendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendMode::Smart => write!(f, "SMART"),
            RecommendMode::Professional => write!(f, "PROFESSIONAL"),
            RecommendMode::Free => write!(f, "FREE"),
        }
    }
}

impl RecommendMode {
    /// 从字符串解析推荐模式
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "professional" => RecommendMode::Professional,
            "free" => RecommendMode::Free,
            _ => RecommendMode::Smart, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RecommendMode::Smart => "smart",
            RecommendMode::Professional => "professional",
            RecommendMode::Free => "free",
        }
    }
}

// ==========================================
// 学历层次 (Education Level)
// ==========================================
// 本科/专科分别使用独立的分档表和省控线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EducationLevel {
    Undergraduate, // 本科
    Vocational,    // 专科
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EducationLevel::Undergraduate => write!(f, "本科"),
            EducationLevel::Vocational => write!(f, "专科"),
        }
    }
}

impl EducationLevel {
    /// 从数据库编码解析 (11=本科, 12=专科)
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            11 => Some(EducationLevel::Undergraduate),
            12 => Some(EducationLevel::Vocational),
            _ => None,
        }
    }

    /// 转换为数据库编码
    pub fn to_code(&self) -> i32 {
        match self {
            EducationLevel::Undergraduate => 11,
            EducationLevel::Vocational => 12,
        }
    }
}

// ==========================================
// 选科方向 (Subject Track)
// ==========================================
// 首选科目决定可报专业组与独立的批次线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubjectTrack {
    History, // 历史类
    Physics, // 物理类
}

impl fmt::Display for SubjectTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectTrack::History => write!(f, "历史类"),
            SubjectTrack::Physics => write!(f, "物理类"),
        }
    }
}

impl SubjectTrack {
    /// 从数据库编码解析 (1=历史, 2=物理)
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(SubjectTrack::History),
            2 => Some(SubjectTrack::Physics),
            _ => None,
        }
    }

    /// 转换为数据库编码
    pub fn to_code(&self) -> i32 {
        match self {
            SubjectTrack::History => 1,
            SubjectTrack::Physics => 2,
        }
    }
}

// ==========================================
// 选科要求 (Subject Requirement)
// ==========================================
// 专业组对单科的要求: 必选 或 不限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubjectRequirement {
    Required,      // 必选
    NoRequirement, // 不限
}

impl SubjectRequirement {
    /// 从数据库编码解析 (1=必选, 其他=不限)
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => SubjectRequirement::Required,
            _ => SubjectRequirement::NoRequirement,
        }
    }

    /// 转换为数据库编码
    pub fn to_code(&self) -> i32 {
        match self {
            SubjectRequirement::Required => 1,
            SubjectRequirement::NoRequirement => 0,
        }
    }

    /// 考生选科是否满足该要求
    ///
    /// 不限: 任何选科均满足
    /// 必选: 考生必须选了该科目
    pub fn satisfied_by(&self, selected: bool) -> bool {
        match self {
            SubjectRequirement::NoRequirement => true,
            SubjectRequirement::Required => selected,
        }
    }
}

// ==========================================
// 办学性质 (Ownership)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ownership {
    Public,  // 公办
    Private, // 民办
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ownership::Public => write!(f, "公办"),
            Ownership::Private => write!(f, "民办"),
        }
    }
}

impl Ownership {
    /// 从数据库编码解析 (1=公办, 2=民办)
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Ownership::Public),
            2 => Some(Ownership::Private),
            _ => None,
        }
    }
}

// ==========================================
// 志愿方案状态 (Plan Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Generating, // 生成中
    Success,    // 生成成功
    Failed,     // 生成失败
    Cancelled,  // 已取消
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStatus::Generating => write!(f, "GENERATING"),
            PlanStatus::Success => write!(f, "SUCCESS"),
            PlanStatus::Failed => write!(f, "FAILED"),
            PlanStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl PlanStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "SUCCESS" => PlanStatus::Success,
            "FAILED" => PlanStatus::Failed,
            "CANCELLED" => PlanStatus::Cancelled,
            _ => PlanStatus::Generating, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PlanStatus::Generating => "GENERATING",
            PlanStatus::Success => "SUCCESS",
            PlanStatus::Failed => "FAILED",
            PlanStatus::Cancelled => "CANCELLED",
        }
    }
}

// ==========================================
// ScoreBandLabel - 分档结果
// ==========================================
// 派生值, 不独立持久化, 附着在推荐结果上
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBandLabel {
    pub tier: Tier,
    /// 梯度内档位 1..=4
    pub band: i32,
    /// 展示文案, 如 "冲-志愿1-4"
    pub label: String,
    pub advisory: &'static str,
}

// ==========================================
// 常量: 年份与专业哨兵
// ==========================================

/// 当前招生年份 (预估线所在年份)
pub const CURRENT_YEAR: i32 = 2025;

/// 历史录取线覆盖的年份 (不含当前年)
pub const HISTORY_YEARS: [i32; 4] = [2021, 2022, 2023, 2024];

/// 专业组投档线哨兵: major_id 为该值的记录代表整组的投档线
pub const MAJOR_ID_GROUP_LINE: i64 = 0;

/// 历史遗留占位专业 id, 查询专业目录时排除
pub const MAJOR_ID_LEGACY_PLACEHOLDER: i64 = 1;

/// 每个梯度的细分档位数
pub const BANDS_PER_TIER: i32 = 4;

/// 每档志愿槽位数
pub const SLOTS_PER_BAND: i32 = 4;

/// 整个方案的志愿槽位总数 (12 档 × 4 槽)
pub const TOTAL_PLAN_SLOTS: i32 = 48;

/// 每个志愿最多可选专业数
pub const MAX_MAJORS_PER_SLOT: usize = 6;
