// ==========================================
// 高考志愿推荐引擎 - 志愿方案数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 方案 = 头表 volunteer_plan + 槽位表 plan_slot
// 已写入的档位不回滚, 部分持久化是预期行为
// ==========================================

use crate::domain::plan::{PlanSlot, VolunteerPlan};
use crate::domain::types::{PlanStatus, Tier};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// PlanRepository - 志愿方案仓储
// ==========================================

/// 志愿方案仓储
pub struct PlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanRepository {
    /// 创建新的方案仓储实例
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

    /// 新建方案头记录 (状态: GENERATING)
    pub fn create_plan(
        &self,
        plan_id: &str,
        student_id: i64,
        data_hash: &str,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO volunteer_plan
                (plan_id, student_id, status, status_message, filled_slots,
                 data_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, NULL, 0, ?4, ?5, ?5)
            "#,
            params![
                plan_id,
                student_id,
                PlanStatus::Generating.to_db_str(),
                data_hash,
                now
            ],
        )?;

        Ok(())
    }

    /// 追加一档的槽位记录 (事务内批量写入)
    pub fn append_slots(&self, plan_id: &str, slots: &[PlanSlot]) -> RepositoryResult<()> {
        if slots.is_empty() {
            return Ok(());
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO plan_slot
                    (plan_id, slot_index, tier, composite_band, group_id, major_ids)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;

            for slot in slots {
                let major_ids_csv = slot
                    .major_ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(",");

                stmt.execute(params![
                    plan_id,
                    slot.slot_index,
                    slot.tier.to_id(),
                    slot.composite_band,
                    slot.group_id,
                    major_ids_csv
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(())
    }

    /// 更新方案状态与完整度
    pub fn update_status(
        &self,
        plan_id: &str,
        status: PlanStatus,
        message: Option<&str>,
        filled_slots: i32,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();

        let affected = conn.execute(
            r#"
            UPDATE volunteer_plan
            SET status = ?1, status_message = ?2, filled_slots = ?3, updated_at = ?4
            WHERE plan_id = ?5
            "#,
            params![status.to_db_str(), message, filled_slots, now, plan_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "VolunteerPlan".to_string(),
                id: plan_id.to_string(),
            });
        }

        Ok(())
    }

    /// 查询方案 (含槽位)
    pub fn find_plan(&self, plan_id: &str) -> RepositoryResult<Option<VolunteerPlan>> {
        let conn = self.get_conn()?;

        let header = conn
            .query_row(
                r#"
                SELECT plan_id, student_id, status, status_message, filled_slots,
                       data_hash, created_at, updated_at
                FROM volunteer_plan
                WHERE plan_id = ?1
                "#,
                params![plan_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, i32>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                        row.get::<_, String>(7)?,
                    ))
                },
            )
            .optional()?;

        let Some((pid, student_id, status, message, filled, hash, created, updated)) = header
        else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT slot_index, tier, composite_band, group_id, major_ids
            FROM plan_slot
            WHERE plan_id = ?1
            ORDER BY slot_index
            "#,
        )?;

        let slots = stmt
            .query_map(params![plan_id], |row| {
                let tier_id: i32 = row.get(1)?;
                let major_ids_csv: String = row.get(4)?;
                Ok(PlanSlot {
                    slot_index: row.get(0)?,
                    tier: Tier::from_id(tier_id).unwrap_or(Tier::Reach),
                    composite_band: row.get(2)?,
                    group_id: row.get(3)?,
                    major_ids: major_ids_csv
                        .split(',')
                        .filter_map(|part| part.trim().parse::<i64>().ok())
                        .collect(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(VolunteerPlan {
            plan_id: pid,
            student_id,
            status: PlanStatus::from_str(&status),
            status_message: message,
            filled_slots: filled,
            data_hash: hash,
            slots,
            created_at: parse_timestamp(&created),
            updated_at: parse_timestamp(&updated),
        }))
    }

    /// 查询考生最近一次成功方案的数据哈希
    ///
    /// 用于重复生成拦截: 数据未变化时不重复生成
    pub fn latest_success_hash(&self, student_id: i64) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let hash = conn
            .query_row(
                r#"
                SELECT data_hash FROM volunteer_plan
                WHERE student_id = ?1 AND status = ?2
                ORDER BY created_at DESC
                LIMIT 1
                "#,
                params![student_id, PlanStatus::Success.to_db_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(hash)
    }

    /// 考生是否存在生成中的方案 (并发生成串行化)
    pub fn has_generating_plan(&self, student_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM volunteer_plan WHERE student_id = ?1 AND status = ?2",
            params![student_id, PlanStatus::Generating.to_db_str()],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// 考生是否从未生成过方案 (首次生成走兜底选报)
    pub fn is_first_generation(&self, student_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM volunteer_plan WHERE student_id = ?1",
            params![student_id],
            |row| row.get(0),
        )?;

        Ok(count == 0)
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
