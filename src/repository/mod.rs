// ==========================================
// 高考志愿推荐引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑, 只做数据访问
// 连接共享: Arc<Mutex<Connection>>
// ==========================================

pub mod area_repo;
pub mod error;
pub mod group_repo;
pub mod line_repo;
pub mod major_repo;
pub mod plan_repo;

pub use area_repo::AreaRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use group_repo::{parse_csv_codes, GroupRepository};
pub use line_repo::LineRepository;
pub use major_repo::MajorRepository;
pub use plan_repo::PlanRepository;
