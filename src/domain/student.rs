// ==========================================
// 高考志愿推荐引擎 - 考生查询上下文
// ==========================================
// 上游档案服务的只读投影, 本核心不持久化
// 分数/学费文本解析属于该边界, 不属于分档器
// ==========================================

use crate::domain::group::SubjectSelection;
use crate::domain::types::{EducationLevel, RecommendMode, SubjectTrack};
use serde::{Deserialize, Serialize};

// ==========================================
// TuitionRange - 学费区间
// ==========================================
// max = None 表示 "min 及以上" 开区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuitionRange {
    pub min: i64,
    pub max: Option<i64>,
}

impl TuitionRange {
    /// 专业组学费区间 [group_min, group_max] 是否与本区间重叠
    ///
    /// 三种命中方式任一即重叠:
    /// 1) 组最低学费落在区间内
    /// 2) 组最高学费落在区间内
    /// 3) 组区间整体包住请求区间
    pub fn matches_group(&self, group_min: Option<i64>, group_max: Option<i64>) -> bool {
        let in_range = |v: i64| v >= self.min && self.max.map_or(true, |hi| v <= hi);

        if let Some(lo) = group_min {
            if in_range(lo) {
                return true;
            }
        }
        if let Some(hi) = group_max {
            if in_range(hi) {
                return true;
            }
        }
        if let (Some(lo), Some(hi)) = (group_min, group_max) {
            if lo <= self.min && self.max.map_or(false, |req_hi| hi >= req_hi) {
                return true;
            }
        }
        false
    }
}

// ==========================================
// StudentQueryContext - 考生查询上下文
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentQueryContext {
    pub score: i32,
    pub subject_track: SubjectTrack,
    pub education_level: EducationLevel,
    pub subject_selection: SubjectSelection,
    pub preferred_area_ids: Vec<i64>,
    pub preferred_major_type_ids: Vec<i64>,
    pub tuition_ranges: Vec<TuitionRange>,
    pub school_feature_filters: Vec<i32>,
    pub school_type_filters: Vec<i32>,
    pub school_special_filters: Vec<i32>,
    pub mode: RecommendMode,
    /// 是否已有正式高考成绩 (无正式成绩时批量生成走兜底选报)
    pub has_final_score: bool,
    /// 考生画像文本, 供 AI 选报使用
    pub profile_text: String,
}

// ==========================================
// 边界解析: 分数文本
// ==========================================

/// 解析分数文本: 剔除非数字字符, 解析失败按 0
///
/// 例: "612分" -> 612, "约 598" -> 598, "暂无" -> 0
pub fn parse_score_text(raw: &str) -> i32 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

// ==========================================
// 边界解析: 学费区间文本
// ==========================================

/// 解析单个金额片段, 支持中文数字与万/千单位
///
/// 例: "5000" -> 5000, "2万" -> 20000, "一万" -> 10000,
///     "两万五" -> 25000, "2万5" -> 25000, "3千" -> 3000
fn parse_amount(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let mut total: i64 = 0;
    let mut value: i64 = 0;
    // 单位之后的尾数折算到次级单位: "两万五" 的 "五" 是 5 千
    let mut tail_unit: i64 = 1;
    let mut saw_digit = false;

    for c in s.chars() {
        let digit = match c {
            '0'..='9' => Some(c as i64 - '0' as i64),
            '一' => Some(1),
            '二' | '两' => Some(2),
            '三' => Some(3),
            '四' => Some(4),
            '五' => Some(5),
            '六' => Some(6),
            '七' => Some(7),
            '八' => Some(8),
            '九' => Some(9),
            _ => None,
        };

        match (digit, c) {
            (Some(d), _) => {
                value = value * 10 + d;
                saw_digit = true;
            }
            (None, '十') => {
                value = if value == 0 { 10 } else { value * 10 };
                saw_digit = true;
            }
            (None, '万') => {
                total += value * 10_000;
                value = 0;
                tail_unit = 1_000;
            }
            (None, '千') => {
                total += value * 1_000;
                value = 0;
                tail_unit = 100;
            }
            (None, '元') => {}
            _ => return None,
        }
    }

    // 尾数: 个位按次级单位 ("两万五" = 2万 + 5千),
    // 多位按绝对金额 ("1万2000" = 1万 + 2000)
    total += if value < 10 { value * tail_unit } else { value };

    if saw_digit {
        Some(total)
    } else {
        None
    }
}

/// 解析学费区间文本
///
/// 支持形式:
/// - "一万以内" / "5000以下"  -> [0, X]
/// - "三万以上" / "2万以上"   -> [X, +∞)
/// - "1万-2万" / "5000~8000" -> [X, Y]
///
/// 解析失败返回 None, 上游按无学费偏好处理
pub fn parse_tuition_range_text(raw: &str) -> Option<TuitionRange> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(prefix) = s.strip_suffix("以内").or_else(|| s.strip_suffix("以下")) {
        let max = parse_amount(prefix)?;
        return Some(TuitionRange { min: 0, max: Some(max) });
    }

    if let Some(prefix) = s.strip_suffix("以上") {
        let min = parse_amount(prefix)?;
        return Some(TuitionRange { min, max: None });
    }

    for sep in ['-', '~', '－', '—'] {
        if let Some((lo, hi)) = s.split_once(sep) {
            let min = parse_amount(lo)?;
            let max = parse_amount(hi)?;
            return Some(TuitionRange { min, max: Some(max) });
        }
    }

    None
}
