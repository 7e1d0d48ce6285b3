// ==========================================
// 高考志愿推荐引擎 - 专业数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::major::Major;
use crate::domain::types::{MAJOR_ID_GROUP_LINE, MAJOR_ID_LEGACY_PLACEHOLDER};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ==========================================
// MajorRepository - 专业仓储
// ==========================================

/// 专业仓储
pub struct MajorRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MajorRepository {
    /// 创建新的专业仓储实例
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

    fn map_major_row(row: &Row<'_>) -> rusqlite::Result<Major> {
        Ok(Major {
            major_id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            group_id: row.get(3)?,
            direction: row.get(4)?,
            tuition: row.get(5)?,
            type_id: row.get(6)?,
            is_teacher_track: row.get::<_, i32>(7)? != 0,
            is_medical_track: row.get::<_, i32>(8)? != 0,
            is_civil_service_track: row.get::<_, i32>(9)? != 0,
            description: row.get(10)?,
        })
    }

    /// 查询一个专业组下的全部专业 (排除哨兵/占位 id)
    pub fn majors_for_group(&self, group_id: i64) -> RepositoryResult<Vec<Major>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT major_id, code, name, group_id, direction, tuition, type_id,
                   is_teacher_track, is_medical_track, is_civil_service_track, description
            FROM major
            WHERE group_id = ?1
              AND major_id NOT IN (?2, ?3)
            ORDER BY code
            "#,
        )?;

        let majors = stmt
            .query_map(
                params![group_id, MAJOR_ID_GROUP_LINE, MAJOR_ID_LEGACY_PLACEHOLDER],
                Self::map_major_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(majors)
    }

    /// 查询包含任一指定专业门类的专业组 id 集合
    ///
    /// 专业类型筛选是"存在性"检查: 组内只要有一个专业
    /// 命中门类即可, 不逐专业过滤
    pub fn group_ids_with_major_types(
        &self,
        type_ids: &[i64],
    ) -> RepositoryResult<HashSet<i64>> {
        if type_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let conn = self.get_conn()?;

        let placeholders = vec!["?"; type_ids.len()].join(",");
        let sql = format!(
            "SELECT DISTINCT group_id FROM major WHERE type_id IN ({})",
            placeholders
        );

        let mut stmt = conn.prepare(&sql)?;

        let ids = stmt
            .query_map(rusqlite::params_from_iter(type_ids.iter()), |row| {
                row.get::<_, i64>(0)
            })?
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(ids)
    }
}
