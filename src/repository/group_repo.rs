// ==========================================
// 高考志愿推荐引擎 - 院校专业组数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: college_group 表与当年投档线的联查
// ==========================================

use crate::domain::group::{GroupCandidate, SchoolProgramGroup, SubjectRequirements};
use crate::domain::types::{
    EducationLevel, Ownership, SubjectRequirement, SubjectTrack, MAJOR_ID_GROUP_LINE,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

/// 解析 CSV 编码的多值字段 (如 "1,3,5")
///
/// 行映射时解析一次, 过滤谓词不再重复解析字符串;
/// 无法解析的片段静默丢弃
pub fn parse_csv_codes(raw: Option<&str>) -> Vec<i32> {
    match raw {
        None => Vec::new(),
        Some(s) => s
            .split(',')
            .filter_map(|part| part.trim().parse::<i32>().ok())
            .collect(),
    }
}

// ==========================================
// GroupRepository - 院校专业组仓储
// ==========================================

/// 院校专业组仓储
pub struct GroupRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GroupRepository {
    /// 创建新的专业组仓储实例
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

    /// 行映射: college_group 联查当年投档线
    fn map_candidate_row(row: &Row<'_>) -> rusqlite::Result<GroupCandidate> {
        let feature_csv: Option<String> = row.get(8)?;
        let special_csv: Option<String> = row.get(9)?;

        Ok(GroupCandidate {
            group: SchoolProgramGroup {
                group_id: row.get(0)?,
                school_id: row.get(1)?,
                school_name: row.get(2)?,
                school_code: row.get(3)?,
                group_name: row.get(4)?,
                area_id: row.get(5)?,
                school_type: row.get(6)?,
                ownership: row.get::<_, Option<i32>>(7)?.and_then(Ownership::from_code),
                feature_codes: parse_csv_codes(feature_csv.as_deref()),
                special_codes: parse_csv_codes(special_csv.as_deref()),
                subject_requirements: SubjectRequirements {
                    physics: SubjectRequirement::from_code(row.get(10)?),
                    history: SubjectRequirement::from_code(row.get(11)?),
                    chemistry: SubjectRequirement::from_code(row.get(12)?),
                    biology: SubjectRequirement::from_code(row.get(13)?),
                    geography: SubjectRequirement::from_code(row.get(14)?),
                    politics: SubjectRequirement::from_code(row.get(15)?),
                },
                min_tuition: row.get(16)?,
                max_tuition: row.get(17)?,
            },
            predicted_score: row.get(18)?,
            plan_size: row.get(19)?,
            rank: row.get(20)?,
        })
    }

    /// 查询落在预估线差窗口内的候选专业组
    ///
    /// 预估投档线窗口 [score_lo, score_hi] 已由调用方
    /// 按 考生成绩 + 档位线差区间 换算; 预估线为空的
    /// 组不参与推荐, 在 SQL 层过滤
    ///
    /// # 参数
    /// - subject_track: 选科方向
    /// - education_level: 学历层次
    /// - score_lo / score_hi: 预估投档线闭区间
    ///
    /// # 返回
    /// - Ok(Vec<GroupCandidate>): 候选专业组列表 (未排序)
    pub fn find_candidates(
        &self,
        subject_track: SubjectTrack,
        education_level: EducationLevel,
        score_lo: i32,
        score_hi: i32,
    ) -> RepositoryResult<Vec<GroupCandidate>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                g.group_id, g.school_id, g.school_name, g.school_code, g.group_name,
                g.area_id, g.school_type, g.ownership, g.feature_codes, g.special_codes,
                g.req_physics, g.req_history, g.req_chemistry,
                g.req_biology, g.req_geography, g.req_politics,
                g.min_tuition, g.max_tuition,
                l.predicted_score, l.plan_size, l.rank
            FROM college_group g
            JOIN admission_line_2025 l ON l.group_id = g.group_id
            WHERE l.major_id = ?1
              AND l.subject_track = ?2
              AND l.education_level = ?3
              AND l.predicted_score IS NOT NULL
              AND l.predicted_score BETWEEN ?4 AND ?5
            "#,
        )?;

        let candidates = stmt
            .query_map(
                params![
                    MAJOR_ID_GROUP_LINE,
                    subject_track.to_code(),
                    education_level.to_code(),
                    score_lo,
                    score_hi
                ],
                Self::map_candidate_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(candidates)
    }
}
