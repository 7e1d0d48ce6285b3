// ==========================================
// 高考志愿推荐引擎 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 参考数据缺失/档位无定义不是错误 (空值语义),
// 此处只建模真正需要上抛的失败
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// AI 选报服务调用失败 (编排器捕获后走兜底选报)
    #[error("AI 选报服务调用失败: {0}")]
    UpstreamServiceFailure(String),

    /// 方案写入失败 (上抛, 方案置为失败)
    #[error("方案持久化失败: {0}")]
    PersistenceFailure(String),

    /// 重复生成拦截: 考生数据未变化
    #[error("考生数据未变化, 已存在相同数据快照的方案")]
    DuplicateGeneration,

    /// 并发生成拦截: 已有生成中的方案
    #[error("该考生已有生成中的方案")]
    GenerationInFlight,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
