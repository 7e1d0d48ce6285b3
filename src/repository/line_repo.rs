// ==========================================
// 高考志愿推荐引擎 - 录取线数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 录取线按年份分表 (admission_line_2021..2025),
// 表名由白名单年份拼接, 不接受外部字符串
// ==========================================

use crate::domain::line::{AdmissionLineRecord, ProvincialCutoff};
use crate::domain::types::{
    EducationLevel, SubjectTrack, CURRENT_YEAR, HISTORY_YEARS, MAJOR_ID_GROUP_LINE,
    MAJOR_ID_LEGACY_PLACEHOLDER,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

/// 校验年份并返回对应分表名
fn line_table_for_year(year: i32) -> RepositoryResult<String> {
    let valid = year == CURRENT_YEAR || HISTORY_YEARS.contains(&year);
    if !valid {
        return Err(RepositoryError::FieldValueError {
            field: "year".to_string(),
            message: format!("不支持的录取线年份: {}", year),
        });
    }
    Ok(format!("admission_line_{}", year))
}

// ==========================================
// LineRepository - 录取线仓储
// ==========================================

/// 录取线仓储
/// 职责: 年份分表的投档线/专业线读取, 省控线查询
pub struct LineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LineRepository {
    /// 创建新的录取线仓储实例
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

    fn map_line_row(year: i32) -> impl Fn(&Row<'_>) -> rusqlite::Result<AdmissionLineRecord> {
        move |row| {
            Ok(AdmissionLineRecord {
                group_id: row.get(0)?,
                major_id: row.get(1)?,
                year,
                subject_track: row.get(2)?,
                education_level: row.get(3)?,
                score: row.get(4)?,
                predicted_score: row.get(5)?,
                plan_size: row.get(6)?,
                rank: row.get(7)?,
            })
        }
    }

    /// 查询一批专业组某年的投档线记录 (整组线, major_id 哨兵行)
    ///
    /// # 参数
    /// - year: 年份 (2021..=2025)
    /// - group_ids: 专业组 id 列表
    /// - subject_track: 选科方向
    /// - education_level: 学历层次
    pub fn group_lines_for_year(
        &self,
        year: i32,
        group_ids: &[i64],
        subject_track: SubjectTrack,
        education_level: EducationLevel,
    ) -> RepositoryResult<Vec<AdmissionLineRecord>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let table = line_table_for_year(year)?;
        let conn = self.get_conn()?;

        let placeholders = vec!["?"; group_ids.len()].join(",");
        let sql = format!(
            r#"
            SELECT group_id, major_id, subject_track, education_level,
                   score, predicted_score, plan_size, rank
            FROM {}
            WHERE major_id = ?
              AND subject_track = ?
              AND education_level = ?
              AND group_id IN ({})
            "#,
            table, placeholders
        );

        let mut stmt = conn.prepare(&sql)?;

        let mut bound: Vec<Box<dyn rusqlite::types::ToSql>> = vec![
            Box::new(MAJOR_ID_GROUP_LINE),
            Box::new(subject_track.to_code()),
            Box::new(education_level.to_code()),
        ];
        for id in group_ids {
            bound.push(Box::new(*id));
        }

        let records = stmt
            .query_map(
                rusqlite::params_from_iter(bound.iter().map(|b| b.as_ref())),
                Self::map_line_row(year),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// 查询一个专业组某年的分专业录取记录 (排除整组线与遗留占位行)
    ///
    /// # 参数
    /// - year: 年份 (2021..=2025)
    /// - group_id: 专业组 id
    pub fn major_lines_for_year(
        &self,
        year: i32,
        group_id: i64,
    ) -> RepositoryResult<Vec<AdmissionLineRecord>> {
        let table = line_table_for_year(year)?;
        let conn = self.get_conn()?;

        let sql = format!(
            r#"
            SELECT group_id, major_id, subject_track, education_level,
                   score, predicted_score, plan_size, rank
            FROM {}
            WHERE group_id = ?1
              AND major_id NOT IN (?2, ?3)
            "#,
            table
        );

        let mut stmt = conn.prepare(&sql)?;

        let records = stmt
            .query_map(
                params![group_id, MAJOR_ID_GROUP_LINE, MAJOR_ID_LEGACY_PLACEHOLDER],
                Self::map_line_row(year),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// 查询某年某方向某层次的省控线
    ///
    /// # 返回
    /// - Ok(Some): 找到省控线
    /// - Ok(None): 该年份无省控线数据
    pub fn cutoff_for(
        &self,
        year: i32,
        subject_track: SubjectTrack,
        education_level: EducationLevel,
    ) -> RepositoryResult<Option<ProvincialCutoff>> {
        let conn = self.get_conn()?;

        let cutoff = conn
            .query_row(
                r#"
                SELECT year, subject_track, education_level, cutoff_score
                FROM provincial_cutoff
                WHERE year = ?1 AND subject_track = ?2 AND education_level = ?3
                "#,
                params![year, subject_track.to_code(), education_level.to_code()],
                |row| {
                    Ok(ProvincialCutoff {
                        year: row.get(0)?,
                        subject_track: row.get(1)?,
                        education_level: row.get(2)?,
                        cutoff_score: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(cutoff)
    }
}
