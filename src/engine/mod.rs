// ==========================================
// 高考志愿推荐引擎 - 引擎层
// ==========================================
// 职责: 实现推荐与分档业务规则
// 红线: Engine 不拼 SQL, 过滤语义单点定义
// ==========================================

pub mod ai_select;
pub mod area_resolver;
pub mod code_text;
pub mod error;
pub mod line_aggregator;
pub mod orchestrator;
pub mod query_engine;
pub mod score_band;
pub mod specialty_catalog;

// 重导出核心引擎
pub use ai_select::{
    CandidateBrief, LlmSelectorConfig, LlmVolunteerSelector, MajorBrief, SelectionMap,
    VolunteerSelector,
};
pub use area_resolver::AreaHierarchyResolver;
pub use code_text::{CodeCategory, CodeTextTranslator};
pub use error::{EngineError, EngineResult};
pub use line_aggregator::{GroupHistoryMap, HistoricalLineAggregator};
pub use orchestrator::{
    BandReport, BatchPlanOrchestrator, NoOpProgressListener, PlanProgressListener, PlanSummary,
};
pub use query_engine::{RecommendationQueryEngine, RecommendationRequest};
pub use score_band::{band_table, BandDef, ScoreBandClassifier};
pub use specialty_catalog::SpecialtyCatalogReader;
