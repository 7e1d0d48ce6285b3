// ==========================================
// 高考志愿推荐引擎 - 志愿方案实体
// ==========================================
// 48 槽志愿方案: 12 档 × 每档 4 槽,
// 生成完成后作为不可变快照持久化
// ==========================================

use crate::domain::types::{PlanStatus, Tier, SLOTS_PER_BAND};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// PlanSlot - 志愿槽位
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSlot {
    /// 全局槽位序号 1..=48
    pub slot_index: i32,
    pub tier: Tier,
    /// 复合档位 1..=12
    pub composite_band: i32,
    pub group_id: i64,
    /// 选定专业, 至多 6 个
    pub major_ids: Vec<i64>,
}

impl PlanSlot {
    /// 计算全局槽位序号
    ///
    /// slot_index = (复合档位 − 1) × 4 + 档内位置 + 1
    pub fn slot_index_for(composite_band: i32, position_within_band: i32) -> i32 {
        (composite_band - 1) * SLOTS_PER_BAND + position_within_band + 1
    }
}

// ==========================================
// VolunteerPlan - 志愿方案
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolunteerPlan {
    pub plan_id: String,
    pub student_id: i64,
    pub status: PlanStatus,
    pub status_message: Option<String>,
    /// 已填充槽位数, 少于 48 为完整度缺口而非失败
    pub filled_slots: i32,
    /// 生成时考生数据快照哈希, 用于重复生成拦截
    pub data_hash: String,
    pub slots: Vec<PlanSlot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// BandOutcome - 单档执行结果
// ==========================================
// 编排器每档上报一次, 供进度与完整度汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BandOutcome {
    /// AI 选报成功
    AiSelected,
    /// 走兜底选报 (无正式成绩 / AI 失败)
    FallbackSelected,
    /// 候选为空, 跳过
    Empty,
}
