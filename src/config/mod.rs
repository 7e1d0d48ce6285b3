// ==========================================
// 高考志愿推荐引擎 - 配置层
// ==========================================

pub mod config_manager;

pub use config_manager::{ConfigManager, DEFAULT_AI_TIMEOUT_SECS, DEFAULT_CANDIDATE_CAP};
