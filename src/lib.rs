// ==========================================
// 高考志愿推荐引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 冲/稳/保分层推荐 + 48 志愿批量生成
// 调用方式: 后台任务队列 worker 内同步调用,
// 仅 AI 选报为异步 I/O 边界
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    EducationLevel, PlanStatus, RecommendMode, ScoreBandLabel, SubjectRequirement, SubjectTrack,
    Tier,
};

// 领域实体
pub use domain::{
    AreaNode, EnrichedGroupResult, GroupCandidate, Major, MajorWithHistory, PaginationMeta,
    PlanSlot, SchoolProgramGroup, StudentQueryContext, SubjectSelection, TuitionRange,
    VolunteerPlan, YearLine,
};

// 引擎
pub use engine::{
    AreaHierarchyResolver, BatchPlanOrchestrator, CodeTextTranslator, HistoricalLineAggregator,
    RecommendationQueryEngine, RecommendationRequest, ScoreBandClassifier, SpecialtyCatalogReader,
    VolunteerSelector,
};

// 配置
pub use config::ConfigManager;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "高考志愿推荐引擎";

// ==========================================
// 预编译检查
// ==========================================

// 确保编译时所有模块可见
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
