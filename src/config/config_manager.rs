// ==========================================
// 高考志愿推荐引擎 - 配置管理器
// ==========================================
// 职责: 配置加载与查询
// 存储: config_kv 表 (key-value + scope)
// 红线: AI 服务配置显式构造注入, 不做模块级缓存
// ==========================================

use crate::engine::ai_select::LlmSelectorConfig;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 单档候选上限默认值
pub const DEFAULT_CANDIDATE_CAP: usize = 100;

/// AI 请求超时默认值（秒）
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = crate::db::open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 配置值（幂等 upsert）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value)
            VALUES ('global', ?1, ?2)
            ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;

        Ok(())
    }

    /// 读取 AI 选报服务配置
    ///
    /// 缺失项按默认值处理; base_url/api_key 缺失时
    /// 返回 None (调用方退化为纯兜底选报)
    pub fn ai_selector_config(&self) -> Result<Option<LlmSelectorConfig>, Box<dyn Error>> {
        let Some(base_url) = self.get_config_value("ai.base_url")? else {
            return Ok(None);
        };
        let Some(api_key) = self.get_config_value("ai.api_key")? else {
            return Ok(None);
        };

        let model = self
            .get_config_value("ai.model")?
            .unwrap_or_else(|| "qwen-plus".to_string());

        let timeout_secs = self
            .get_config_value("ai.timeout_secs")?
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_AI_TIMEOUT_SECS);

        Ok(Some(LlmSelectorConfig {
            base_url,
            api_key,
            model,
            timeout_secs,
        }))
    }

    /// 读取单档候选上限
    pub fn candidate_cap(&self) -> Result<usize, Box<dyn Error>> {
        let cap = self
            .get_config_value("engine.candidate_cap")?
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CANDIDATE_CAP);
        Ok(cap)
    }
}
