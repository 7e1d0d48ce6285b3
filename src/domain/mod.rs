// ==========================================
// 高考志愿推荐引擎 - 领域层
// ==========================================
// 职责: 实体与值类型定义, 不含数据访问
// ==========================================

pub mod area;
pub mod group;
pub mod line;
pub mod major;
pub mod plan;
pub mod student;
pub mod types;

pub use area::{AreaNode, AreaPathSegment, AREA_ROOT_PARENT_ID};
pub use group::{
    EnrichedGroupResult, GroupCandidate, PaginationMeta, SchoolProgramGroup, SubjectRequirements,
    SubjectSelection, YearLine,
};
pub use line::{line_diff, AdmissionLineRecord, ProvincialCutoff};
pub use major::{Major, MajorWithHistory};
pub use plan::{BandOutcome, PlanSlot, VolunteerPlan};
pub use student::{parse_score_text, parse_tuition_range_text, StudentQueryContext, TuitionRange};
pub use types::{
    EducationLevel, Ownership, PlanStatus, RecommendMode, ScoreBandLabel, SubjectRequirement,
    SubjectTrack, Tier,
};
