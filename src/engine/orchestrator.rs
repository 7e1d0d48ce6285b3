// ==========================================
// 高考志愿推荐引擎 - 批量方案编排器
// ==========================================
// 职责: 驱动 12 个 (梯度×档位) 的顺序推荐查询,
// 每档 AI 选报 (或兜底选报), 累积 48 槽志愿方案
//
// 红线: 12 档必须按 冲1→4, 稳1→4, 保1→4 顺序执行,
// 后档依赖前档已选专业组的剔除集合, 不可并行
// 红线: 单档失败不中止整个方案, 仅持久化失败才终止
// ==========================================

use crate::domain::plan::{BandOutcome, PlanSlot};
use crate::domain::student::StudentQueryContext;
use crate::domain::types::{
    PlanStatus, Tier, BANDS_PER_TIER, MAX_MAJORS_PER_SLOT, SLOTS_PER_BAND, TOTAL_PLAN_SLOTS,
};
use crate::engine::ai_select::{CandidateBrief, MajorBrief, SelectionMap, VolunteerSelector};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::query_engine::{RecommendationQueryEngine, RecommendationRequest};
use crate::domain::group::EnrichedGroupResult;
use crate::repository::plan_repo::PlanRepository;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// 复合档位总数 (3 梯度 × 4 档)
const TOTAL_BANDS: i32 = 12;

// ==========================================
// PlanProgressListener - 进度监听
// ==========================================
pub trait PlanProgressListener: Send + Sync {
    /// 每档完成后上报一次 (percent: 0-100, 12 档递增)
    fn on_band_complete(&self, composite_band: i32, percent: u8, outcome: &BandOutcome);
}

/// 不上报进度的空实现
pub struct NoOpProgressListener;

impl PlanProgressListener for NoOpProgressListener {
    fn on_band_complete(&self, _composite_band: i32, _percent: u8, _outcome: &BandOutcome) {}
}

// ==========================================
// BandReport / PlanSummary - 生成结果
// ==========================================
#[derive(Debug, Clone)]
pub struct BandReport {
    pub composite_band: i32,
    pub tier: Tier,
    pub outcome: BandOutcome,
    pub selected_groups: usize,
}

#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub plan_id: String,
    pub status: PlanStatus,
    /// 已填充槽位数, 少于 48 为完整度缺口, 在此汇总层
    /// 体现, 不作为硬错误
    pub filled_slots: i32,
    pub band_reports: Vec<BandReport>,
}

// ==========================================
// BatchPlanOrchestrator - 批量方案编排器
// ==========================================
pub struct BatchPlanOrchestrator {
    query_engine: Arc<RecommendationQueryEngine>,
    plan_repo: Arc<PlanRepository>,
    selector: Arc<dyn VolunteerSelector>,
    /// 单档候选上限
    candidate_cap: usize,
}

impl BatchPlanOrchestrator {
    /// 构造函数
    ///
    /// # 参数
    /// - query_engine: 推荐查询引擎
    /// - plan_repo: 方案仓储
    /// - selector: AI 选报服务 (显式注入, 无全局缓存)
    /// - candidate_cap: 单档候选上限 (约 100)
    pub fn new(
        query_engine: Arc<RecommendationQueryEngine>,
        plan_repo: Arc<PlanRepository>,
        selector: Arc<dyn VolunteerSelector>,
        candidate_cap: usize,
    ) -> Self {
        Self {
            query_engine,
            plan_repo,
            selector,
            candidate_cap,
        }
    }

    /// 考生数据快照哈希 (重复生成拦截)
    pub fn data_hash(student: &StudentQueryContext) -> String {
        let serialized = serde_json::to_string(student).unwrap_or_default();
        let mut hasher = DefaultHasher::new();
        serialized.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    /// 生成完整 48 槽志愿方案
    ///
    /// # 参数
    /// - student_id: 考生 id
    /// - student: 考生查询上下文
    /// - listener: 进度监听 (每档上报)
    /// - cancel_flag: 取消标记, 档间检查
    ///
    /// # 返回
    /// - Ok(PlanSummary): 方案生成结果 (含取消/部分填充)
    /// - Err: 生成前置校验失败或持久化失败
    pub async fn generate_plan(
        &self,
        student_id: i64,
        student: &StudentQueryContext,
        listener: &dyn PlanProgressListener,
        cancel_flag: &Arc<AtomicBool>,
    ) -> EngineResult<PlanSummary> {
        // ==========================================
        // 前置校验: 并发串行化 + 数据哈希拦截
        // ==========================================
        if self.plan_repo.has_generating_plan(student_id)? {
            return Err(EngineError::GenerationInFlight);
        }

        let hash = Self::data_hash(student);
        if self.plan_repo.latest_success_hash(student_id)?.as_deref() == Some(hash.as_str()) {
            return Err(EngineError::DuplicateGeneration);
        }

        let first_generation = self.plan_repo.is_first_generation(student_id)?;
        // 无正式成绩 / 首次生成: 不走 AI, 直接兜底选报
        let deterministic_only = !student.has_final_score || first_generation;

        let plan_id = Uuid::new_v4().to_string();
        self.plan_repo.create_plan(&plan_id, student_id, &hash)?;

        info!(
            %plan_id,
            student_id,
            score = student.score,
            mode = %student.mode,
            deterministic_only,
            "开始批量生成志愿方案"
        );

        // ==========================================
        // 12 档顺序执行
        // ==========================================
        let mut chosen_groups: HashSet<i64> = HashSet::new();
        let mut filled_slots: i32 = 0;
        let mut band_reports = Vec::with_capacity(TOTAL_BANDS as usize);

        for composite_band in 1..=TOTAL_BANDS {
            // 档间取消检查: 已写入档位保留
            if cancel_flag.load(Ordering::SeqCst) {
                info!(%plan_id, composite_band, "方案生成在档间被取消");
                self.plan_repo.update_status(
                    &plan_id,
                    PlanStatus::Cancelled,
                    Some("生成任务被取消"),
                    filled_slots,
                )?;
                return Ok(PlanSummary {
                    plan_id,
                    status: PlanStatus::Cancelled,
                    filled_slots,
                    band_reports,
                });
            }

            let tier_id = (composite_band - 1) / BANDS_PER_TIER + 1;
            let band_id = (composite_band - 1) % BANDS_PER_TIER + 1;
            let tier = Tier::from_id(tier_id).unwrap_or(Tier::Reach);

            let (outcome, selected_groups) = match self
                .run_band(
                    &plan_id,
                    student,
                    tier_id,
                    band_id,
                    composite_band,
                    deterministic_only,
                    &mut chosen_groups,
                    &mut filled_slots,
                )
                .await
            {
                Ok(result) => result,
                // 持久化失败: 终止, 方案置为失败, 已写入档位不回滚
                Err(EngineError::PersistenceFailure(message)) => {
                    error!(%plan_id, composite_band, %message, "档位写入失败, 终止生成");
                    self.plan_repo.update_status(
                        &plan_id,
                        PlanStatus::Failed,
                        Some(&format!("第{}档写入失败: {}", composite_band, message)),
                        filled_slots,
                    )?;
                    return Err(EngineError::PersistenceFailure(message));
                }
                // 其他单档失败: 跳过该档继续
                Err(e) => {
                    warn!(%plan_id, composite_band, error = %e, "单档执行失败, 跳过该档");
                    (BandOutcome::Empty, 0)
                }
            };

            let percent = (composite_band * 100 / TOTAL_BANDS) as u8;
            listener.on_band_complete(composite_band, percent, &outcome);

            band_reports.push(BandReport {
                composite_band,
                tier,
                selected_groups,
                outcome,
            });
        }

        // ==========================================
        // 汇总落库
        // ==========================================
        if filled_slots < TOTAL_PLAN_SLOTS {
            info!(
                %plan_id,
                filled_slots,
                "方案完整度不足 48 槽 (部分档位候选不足)"
            );
        }

        self.plan_repo
            .update_status(&plan_id, PlanStatus::Success, None, filled_slots)?;

        info!(%plan_id, filled_slots, "志愿方案生成完成");

        Ok(PlanSummary {
            plan_id,
            status: PlanStatus::Success,
            filled_slots,
            band_reports,
        })
    }

    /// 执行单档: 查询候选 → 选报 → 槽位写入
    #[allow(clippy::too_many_arguments)]
    async fn run_band(
        &self,
        plan_id: &str,
        student: &StudentQueryContext,
        tier_id: i32,
        band_id: i32,
        composite_band: i32,
        deterministic_only: bool,
        chosen_groups: &mut HashSet<i64>,
        filled_slots: &mut i32,
    ) -> EngineResult<(BandOutcome, usize)> {
        let mut request = RecommendationRequest::basic(
            student.score,
            student.subject_track,
            student.education_level,
            tier_id,
            band_id,
            student.mode,
        );
        request.subject_selection = student.subject_selection;
        request.area_ids = student.preferred_area_ids.clone();
        request.major_type_ids = student.preferred_major_type_ids.clone();
        request.tuition_ranges = student.tuition_ranges.clone();
        request.school_feature_filters = student.school_feature_filters.clone();
        request.school_type_filters = student.school_type_filters.clone();
        request.school_special_filters = student.school_special_filters.clone();
        request.per_page = self.candidate_cap;
        request.exclude_group_ids = chosen_groups.iter().copied().collect();

        // 候选拉取无副作用, 可安全重试; 这里单次执行
        let (candidates, _meta) = self.query_engine.query(&request)?;

        if candidates.is_empty() {
            info!(composite_band, "该档无候选, 跳过");
            return Ok((BandOutcome::Empty, 0));
        }

        // ==========================================
        // 选报: AI 或兜底
        // ==========================================
        let (selection, outcome) = if deterministic_only {
            (Self::fallback_selection(&candidates), BandOutcome::FallbackSelected)
        } else {
            let briefs: Vec<CandidateBrief> =
                candidates.iter().map(candidate_brief).collect();

            match self.selector.select(&student.profile_text, &briefs).await {
                Ok(selection) => (selection, BandOutcome::AiSelected),
                // AI 失败: 兜底选报, 该档视为成功
                Err(e) => {
                    warn!(composite_band, error = %e, "AI 选报失败, 走兜底选报");
                    (Self::fallback_selection(&candidates), BandOutcome::FallbackSelected)
                }
            }
        };

        // ==========================================
        // 截断与校验: ≤4 组 / 每组 ≤6 专业,
        // 不在候选集内的选报结果丢弃
        // ==========================================
        let mut slots = Vec::with_capacity(SLOTS_PER_BAND as usize);
        let mut position: i32 = 0;

        for candidate in &candidates {
            if position >= SLOTS_PER_BAND {
                break;
            }
            let Some(major_ids) = selection.get(&candidate.group_id) else {
                continue;
            };

            let valid_majors: HashSet<i64> = candidate
                .specialties
                .iter()
                .map(|m| m.major_id)
                .collect();

            let major_ids: Vec<i64> = major_ids
                .iter()
                .copied()
                .filter(|id| valid_majors.contains(id))
                .take(MAX_MAJORS_PER_SLOT)
                .collect();

            slots.push(PlanSlot {
                slot_index: PlanSlot::slot_index_for(composite_band, position),
                tier: candidate.band.tier,
                composite_band,
                group_id: candidate.group_id,
                major_ids,
            });
            position += 1;
        }

        if slots.is_empty() {
            info!(composite_band, "选报结果为空, 该档跳过");
            return Ok((BandOutcome::Empty, 0));
        }

        self.plan_repo
            .append_slots(plan_id, &slots)
            .map_err(|e| EngineError::PersistenceFailure(e.to_string()))?;

        for slot in &slots {
            chosen_groups.insert(slot.group_id);
        }
        *filled_slots += slots.len() as i32;

        info!(
            composite_band,
            selected = slots.len(),
            total_filled = *filled_slots,
            "档位选报完成"
        );

        Ok((outcome, slots.len()))
    }

    /// 兜底选报: 按现有排序取前 4 组, 每组前 6 个专业
    fn fallback_selection(candidates: &[EnrichedGroupResult]) -> SelectionMap {
        candidates
            .iter()
            .take(SLOTS_PER_BAND as usize)
            .map(|candidate| {
                let majors: Vec<i64> = candidate
                    .specialties
                    .iter()
                    .take(MAX_MAJORS_PER_SLOT)
                    .map(|m| m.major_id)
                    .collect();
                (candidate.group_id, majors)
            })
            .collect()
    }
}

/// 候选摘要投影 (AI 输入)
fn candidate_brief(candidate: &EnrichedGroupResult) -> CandidateBrief {
    CandidateBrief {
        group_id: candidate.group_id,
        name: format!("{} {}", candidate.school_name, candidate.group_name),
        city: candidate.location_text.clone(),
        features: candidate.feature_texts.clone(),
        majors: candidate
            .specialties
            .iter()
            .map(|m| MajorBrief {
                id: m.major_id,
                name: m.name.clone(),
                tuition: m.tuition,
            })
            .collect(),
    }
}
