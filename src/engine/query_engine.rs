// ==========================================
// 高考志愿推荐引擎 - 推荐查询引擎
// ==========================================
// 职责: 单个 (梯度, 档位) 请求的完整查询编排:
// 档位线差区间 → 候选拉取 → 过滤 → 排序 → 分页 → 富化
//
// 红线: 全量查询与计数查询共用同一过滤谓词
// (build_filter_context + passes_filters), 两条路径
// 的过滤语义不允许分叉
// ==========================================

use crate::domain::group::{
    EnrichedGroupResult, GroupCandidate, PaginationMeta, SubjectSelection,
};
use crate::domain::student::TuitionRange;
use crate::domain::types::{EducationLevel, RecommendMode, SubjectTrack, CURRENT_YEAR};
use crate::engine::area_resolver::AreaHierarchyResolver;
use crate::engine::code_text::{CodeCategory, CodeTextTranslator};
use crate::engine::line_aggregator::HistoricalLineAggregator;
use crate::engine::score_band::ScoreBandClassifier;
use crate::engine::specialty_catalog::SpecialtyCatalogReader;
use crate::repository::error::RepositoryResult;
use crate::repository::group_repo::GroupRepository;
use crate::repository::major_repo::MajorRepository;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

// ==========================================
// RecommendationRequest - 查询请求
// ==========================================
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    pub student_score: i32,
    pub subject_track: SubjectTrack,
    pub education_level: EducationLevel,
    /// 梯度编号 1=冲 2=稳 3=保
    pub tier_id: i32,
    /// 梯度内档位 1..=4
    pub band_id: i32,
    pub subject_selection: SubjectSelection,
    pub area_ids: Vec<i64>,
    pub major_type_ids: Vec<i64>,
    pub mode: RecommendMode,
    /// 页码, 1 起
    pub page: usize,
    pub per_page: usize,
    pub school_feature_filters: Vec<i32>,
    pub school_type_filters: Vec<i32>,
    pub school_special_filters: Vec<i32>,
    pub tuition_ranges: Vec<TuitionRange>,
    /// 已入选方案的专业组, 查询时剔除 (批量生成第 N 档)
    pub exclude_group_ids: Vec<i64>,
}

impl RecommendationRequest {
    /// 基础请求 (无偏好过滤), 供批量生成与测试复用
    pub fn basic(
        student_score: i32,
        subject_track: SubjectTrack,
        education_level: EducationLevel,
        tier_id: i32,
        band_id: i32,
        mode: RecommendMode,
    ) -> Self {
        Self {
            student_score,
            subject_track,
            education_level,
            tier_id,
            band_id,
            subject_selection: SubjectSelection::default(),
            area_ids: Vec::new(),
            major_type_ids: Vec::new(),
            mode,
            page: 1,
            per_page: 20,
            school_feature_filters: Vec::new(),
            school_type_filters: Vec::new(),
            school_special_filters: Vec::new(),
            tuition_ranges: Vec::new(),
            exclude_group_ids: Vec::new(),
        }
    }
}

// ==========================================
// FilterContext - 共享过滤上下文
// ==========================================
// 过滤条件的一次性预解析: 地区闭包并集 /
// 命中专业门类的组集合 / 剔除集合
struct FilterContext<'a> {
    request: &'a RecommendationRequest,
    /// None = 未启用地区过滤
    area_closure: Option<HashSet<i64>>,
    /// None = 未启用专业门类过滤
    major_type_groups: Option<HashSet<i64>>,
    excluded: HashSet<i64>,
}

// ==========================================
// RecommendationQueryEngine - 推荐查询引擎
// ==========================================
pub struct RecommendationQueryEngine {
    group_repo: Arc<GroupRepository>,
    major_repo: Arc<MajorRepository>,
    aggregator: HistoricalLineAggregator,
    catalog: SpecialtyCatalogReader,
    classifier: ScoreBandClassifier,
    translator: CodeTextTranslator,
    area_resolver: Arc<AreaHierarchyResolver>,
}

impl RecommendationQueryEngine {
    /// 构造函数
    pub fn new(
        group_repo: Arc<GroupRepository>,
        major_repo: Arc<MajorRepository>,
        aggregator: HistoricalLineAggregator,
        catalog: SpecialtyCatalogReader,
        area_resolver: Arc<AreaHierarchyResolver>,
    ) -> Self {
        Self {
            group_repo,
            major_repo,
            aggregator,
            catalog,
            classifier: ScoreBandClassifier::new(),
            translator: CodeTextTranslator::new(),
            area_resolver,
        }
    }

    // ==========================================
    // 核心查询
    // ==========================================

    /// 单 (梯度, 档位) 推荐查询
    ///
    /// 流程:
    /// 1. 档位 → 线差闭区间 (无定义直接返回空页)
    /// 2. 仓储层拉取线差窗口内候选 (预估线非空)
    /// 3. 共享谓词过滤 (地区/门类/属性/选科/学费/剔除)
    /// 4. 线差降序排序 (最接近考生成绩者优先)
    /// 5. 内存分页 (排序键为派生值, 不走数据库 OFFSET)
    /// 6. 页内富化 (历史线/专业目录/分档/地区文案/编码文案)
    pub fn query(
        &self,
        request: &RecommendationRequest,
    ) -> RepositoryResult<(Vec<EnrichedGroupResult>, PaginationMeta)> {
        let mut sorted = match self.fetch_filtered(request)? {
            Some(filtered) => filtered,
            None => {
                return Ok((
                    Vec::new(),
                    PaginationMeta {
                        page: request.page.max(1),
                        per_page: request.per_page,
                        total: 0,
                        total_pages: 0,
                    },
                ))
            }
        };

        // 线差降序: 越接近考生成绩上限越靠前, 同分不保序
        sorted.sort_by(|a, b| b.predicted_score.cmp(&a.predicted_score));

        let total = sorted.len();
        let per_page = request.per_page.max(1);
        let page = request.page.max(1);
        let total_pages = total.div_ceil(per_page);

        let page_slice: Vec<GroupCandidate> = sorted
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();

        let enriched = self.enrich_page(request, page_slice)?;

        info!(
            tier_id = request.tier_id,
            band_id = request.band_id,
            mode = %request.mode,
            total,
            page,
            returned = enriched.len(),
            "推荐查询完成"
        );

        Ok((
            enriched,
            PaginationMeta {
                page,
                per_page,
                total,
                total_pages,
            },
        ))
    }

    /// 计数查询 (看板统计)
    ///
    /// 与 query 共用取数与过滤谓词, 省去排序/分页/富化开销
    pub fn count(&self, request: &RecommendationRequest) -> RepositoryResult<usize> {
        match self.fetch_filtered(request)? {
            Some(filtered) => Ok(filtered.len()),
            None => Ok(0),
        }
    }

    /// 12 档计数汇总 (梯度×档位 → 数量)
    pub fn count_all_bands(
        &self,
        base_request: &RecommendationRequest,
    ) -> RepositoryResult<BTreeMap<(i32, i32), usize>> {
        let mut result = BTreeMap::new();
        for tier_id in 1..=3 {
            for band_id in 1..=4 {
                let mut request = base_request.clone();
                request.tier_id = tier_id;
                request.band_id = band_id;
                result.insert((tier_id, band_id), self.count(&request)?);
            }
        }
        Ok(result)
    }

    // ==========================================
    // 共享取数 + 过滤
    // ==========================================

    /// 返回 None 表示档位无定义 (空结果, 非错误);
    /// 结果未排序, 排序由 query 自行承担
    fn fetch_filtered(
        &self,
        request: &RecommendationRequest,
    ) -> RepositoryResult<Option<Vec<GroupCandidate>>> {
        let Some((min_diff, max_diff)) = self.classifier.band_range_for(
            request.tier_id,
            request.band_id,
            request.education_level,
            request.mode,
        ) else {
            debug!(
                tier_id = request.tier_id,
                band_id = request.band_id,
                "档位无定义, 返回空结果"
            );
            return Ok(None);
        };

        let candidates = self.group_repo.find_candidates(
            request.subject_track,
            request.education_level,
            request.student_score + min_diff,
            request.student_score + max_diff,
        )?;

        let context = self.build_filter_context(request)?;

        let filtered: Vec<GroupCandidate> = candidates
            .into_iter()
            .filter(|candidate| Self::passes_filters(candidate, &context))
            .collect();

        Ok(Some(filtered))
    }

    /// 过滤条件预解析, query 与 count 共用
    fn build_filter_context<'a>(
        &self,
        request: &'a RecommendationRequest,
    ) -> RepositoryResult<FilterContext<'a>> {
        let area_closure = if request.area_ids.is_empty() {
            None
        } else {
            Some(self.area_resolver.descendants_union(&request.area_ids))
        };

        let major_type_groups = if request.major_type_ids.is_empty() {
            None
        } else {
            Some(
                self.major_repo
                    .group_ids_with_major_types(&request.major_type_ids)?,
            )
        };

        Ok(FilterContext {
            request,
            area_closure,
            major_type_groups,
            excluded: request.exclude_group_ids.iter().copied().collect(),
        })
    }

    /// 共享过滤谓词
    ///
    /// 类别内 OR, 类别间 AND; 未启用的条件一律放行
    fn passes_filters(candidate: &GroupCandidate, context: &FilterContext<'_>) -> bool {
        let group = &candidate.group;
        let request = context.request;

        // 剔除已入选的专业组
        if context.excluded.contains(&group.group_id) {
            return false;
        }

        // 地区: 组所在地须落在请求地区的子孙闭包并集内
        if let Some(closure) = &context.area_closure {
            if !closure.contains(&group.area_id) {
                return false;
            }
        }

        // 专业门类: 存在性检查, 组内任一专业命中即通过
        if let Some(groups) = &context.major_type_groups {
            if !groups.contains(&group.group_id) {
                return false;
            }
        }

        // 办学特色 (类别内 OR)
        if !request.school_feature_filters.is_empty()
            && !request
                .school_feature_filters
                .iter()
                .any(|code| group.feature_codes.contains(code))
        {
            return false;
        }

        // 院校类型 (类别内 OR)
        if !request.school_type_filters.is_empty()
            && !group
                .school_type
                .map_or(false, |t| request.school_type_filters.contains(&t))
        {
            return false;
        }

        // 专项类别 (类别内 OR)
        if !request.school_special_filters.is_empty()
            && !request
                .school_special_filters
                .iter()
                .any(|code| group.special_codes.contains(code))
        {
            return false;
        }

        // 选科要求: 六科兼容性
        if !group
            .subject_requirements
            .satisfied_by(&request.subject_selection)
        {
            return false;
        }

        // 学费区间 (区间间 OR)
        if !request.tuition_ranges.is_empty()
            && !request
                .tuition_ranges
                .iter()
                .any(|range| range.matches_group(group.min_tuition, group.max_tuition))
        {
            return false;
        }

        true
    }

    // ==========================================
    // 页内富化
    // ==========================================

    fn enrich_page(
        &self,
        request: &RecommendationRequest,
        page: Vec<GroupCandidate>,
    ) -> RepositoryResult<Vec<EnrichedGroupResult>> {
        if page.is_empty() {
            return Ok(Vec::new());
        }

        let group_ids: Vec<i64> = page.iter().map(|c| c.group.group_id).collect();
        let mut history_map = self.aggregator.history_for(
            &group_ids,
            request.subject_track,
            request.education_level,
        )?;

        let mut results = Vec::with_capacity(page.len());
        for candidate in page {
            let group_id = candidate.group.group_id;
            let score_diff = candidate.score_diff(request.student_score);

            // 候选来自同一张分档表的线差窗口, 分档必有定义;
            // 数据漂移时跳过该组并告警, 不中断整页
            let Some(band) =
                self.classifier
                    .classify(score_diff, request.education_level, request.mode)
            else {
                warn!(group_id, score_diff, "线差脱离分档表定义域, 跳过该组");
                continue;
            };

            let history = history_map.remove(&group_id).unwrap_or_default();
            let specialties = self.catalog.specialties_for(group_id)?;

            // 计划增减 = 当年计划 − 上一年计划
            let previous_plan = history.get(&(CURRENT_YEAR - 1)).and_then(|line| line.plan_size);
            let plan_increase = match (candidate.plan_size, previous_plan) {
                (Some(current), Some(previous)) => Some(current - previous),
                _ => None,
            };

            let group = candidate.group;
            results.push(EnrichedGroupResult {
                group_id,
                school_id: group.school_id,
                school_name: group.school_name,
                school_code: group.school_code,
                group_name: group.group_name,
                location_text: self.area_resolver.location_text(group.area_id),
                ownership: group.ownership,
                feature_texts: self
                    .translator
                    .translate_codes(&group.feature_codes, CodeCategory::Feature),
                type_texts: group
                    .school_type
                    .map(|t| self.translator.translate_codes(&[t], CodeCategory::SchoolType))
                    .unwrap_or_default(),
                special_texts: self
                    .translator
                    .translate_codes(&group.special_codes, CodeCategory::Special),
                predicted_score: candidate.predicted_score,
                plan_size: candidate.plan_size,
                rank: candidate.rank,
                score_diff,
                band,
                history,
                specialties,
                plan_increase,
            });
        }

        Ok(results)
    }
}
