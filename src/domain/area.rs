// ==========================================
// 高考志愿推荐引擎 - 地区实体
// ==========================================
// 地区为扁平表存储的树: 根节点 parent_id = 0
// 静态参考数据, 运行期只读
// ==========================================

use serde::{Deserialize, Serialize};

/// 根节点的 parent_id 哨兵值
pub const AREA_ROOT_PARENT_ID: i64 = 0;

// ==========================================
// AreaNode - 地区节点
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaNode {
    pub id: i64,
    pub name: String,
    pub parent_id: i64,
    pub group_code: Option<String>,
    pub sort_order: i32,
}

impl AreaNode {
    /// 是否为根节点 (国家层级)
    pub fn is_root(&self) -> bool {
        self.parent_id == AREA_ROOT_PARENT_ID
    }
}

// ==========================================
// AreaPathSegment - 地区路径片段
// ==========================================
// full_path_of 的返回元素, 自根到目标节点有序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaPathSegment {
    pub id: i64,
    pub name: String,
}
