// ==========================================
// 高考志愿推荐引擎 - 地区数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 地区为静态参考数据, 整表加载后由引擎层建索引
// ==========================================

use crate::domain::area::AreaNode;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// AreaRepository - 地区仓储
// ==========================================

/// 地区仓储
/// 职责: 读取 area 表
pub struct AreaRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AreaRepository {
    /// 创建新的地区仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 加载全部地区节点
    ///
    /// # 返回
    /// - Ok(Vec<AreaNode>): 按 sort_order 排序的地区列表
    /// - Err: 数据库错误
    pub fn load_all(&self) -> RepositoryResult<Vec<AreaNode>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, parent_id, group_code, sort_order
            FROM area
            ORDER BY sort_order, id
            "#,
        )?;

        let nodes = stmt
            .query_map([], |row| {
                Ok(AreaNode {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    parent_id: row.get(2)?,
                    group_code: row.get(3)?,
                    sort_order: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(nodes)
    }
}
