// ==========================================
// 高考志愿推荐引擎 - 地区层级解析器
// ==========================================
// 职责: 扁平地区表上的树解析
// - descendants_of: 节点 + 全部子孙 (广度展开)
// - full_path_of: 根到节点的有序路径
//
// 失败模式: 地区缺失返回空结构, 不中断推荐查询;
// 深度越界视为数据完整性异常, 记日志不上抛
// ==========================================

use crate::domain::area::{AreaNode, AreaPathSegment};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::warn;

/// 树遍历深度上限, 超出按数据异常处理 (地区树实际约 3 层)
pub const MAX_TREE_DEPTH: usize = 50;

// ==========================================
// AreaHierarchyResolver - 地区层级解析器
// ==========================================
pub struct AreaHierarchyResolver {
    nodes: HashMap<i64, AreaNode>,
    children: HashMap<i64, Vec<i64>>,
}

impl AreaHierarchyResolver {
    /// 基于整表地区数据构建解析器 (建父子索引)
    pub fn new(all_nodes: Vec<AreaNode>) -> Self {
        let mut nodes = HashMap::with_capacity(all_nodes.len());
        let mut children: HashMap<i64, Vec<i64>> = HashMap::new();

        for node in all_nodes {
            if !node.is_root() {
                children.entry(node.parent_id).or_default().push(node.id);
            }
            nodes.insert(node.id, node);
        }

        Self { nodes, children }
    }

    /// 地区节点查询
    pub fn node(&self, area_id: i64) -> Option<&AreaNode> {
        self.nodes.get(&area_id)
    }

    /// 节点及其全部子孙的 id 集合
    ///
    /// 广度展开父→子边; 地区缺失返回空集;
    /// 深度超限记日志并停止展开 (环保护)
    pub fn descendants_of(&self, area_id: i64) -> HashSet<i64> {
        let mut result = HashSet::new();
        if !self.nodes.contains_key(&area_id) {
            return result;
        }

        let mut queue: VecDeque<(i64, usize)> = VecDeque::new();
        queue.push_back((area_id, 0));

        while let Some((id, depth)) = queue.pop_front() {
            if depth > MAX_TREE_DEPTH {
                warn!(area_id = id, depth, "地区树深度超限, 疑似数据成环, 停止展开");
                break;
            }
            if !result.insert(id) {
                // 已访问, 数据成环时避免重复入队
                continue;
            }
            if let Some(child_ids) = self.children.get(&id) {
                for child in child_ids {
                    queue.push_back((*child, depth + 1));
                }
            }
        }

        result
    }

    /// 多个地区的子孙闭包并集 (查询引擎的地区过滤输入)
    pub fn descendants_union(&self, area_ids: &[i64]) -> HashSet<i64> {
        let mut union = HashSet::new();
        for id in area_ids {
            union.extend(self.descendants_of(*id));
        }
        union
    }

    /// 根到节点的有序路径
    ///
    /// 沿 parent_id 回溯到根 (parent_id == 0) 后反转;
    /// 地区缺失返回空路径
    pub fn full_path_of(&self, area_id: i64) -> Vec<AreaPathSegment> {
        let mut path = Vec::new();
        let mut current = area_id;
        let mut steps = 0;

        while let Some(node) = self.nodes.get(&current) {
            steps += 1;
            if steps > MAX_TREE_DEPTH {
                warn!(area_id, "地区路径回溯深度超限, 疑似数据成环");
                return Vec::new();
            }

            path.push(AreaPathSegment {
                id: node.id,
                name: node.name.clone(),
            });

            if node.is_root() {
                break;
            }
            current = node.parent_id;
        }

        path.reverse();
        path
    }

    /// 组合地区文案: 路径中除根 (国家) 外的段名拼接
    ///
    /// 例: 国家→湖南省→长沙市 => "湖南省长沙市"
    pub fn location_text(&self, area_id: i64) -> String {
        self.full_path_of(area_id)
            .iter()
            .skip(1)
            .map(|seg| seg.name.as_str())
            .collect()
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    /// 三层树: 国家(1) → 省(10,11) → 市(100,101,110)
    fn sample_tree() -> AreaHierarchyResolver {
        let node = |id: i64, name: &str, parent_id: i64| AreaNode {
            id,
            name: name.to_string(),
            parent_id,
            group_code: None,
            sort_order: id as i32,
        };
        AreaHierarchyResolver::new(vec![
            node(1, "中国", 0),
            node(10, "湖南省", 1),
            node(11, "湖北省", 1),
            node(100, "长沙市", 10),
            node(101, "株洲市", 10),
            node(110, "武汉市", 11),
        ])
    }

    #[test]
    fn test_descendants_of_province() {
        let resolver = sample_tree();
        let set = resolver.descendants_of(10);
        // 含自身与全部下属市, 不含兄弟省与根
        assert_eq!(set, [10, 100, 101].into_iter().collect());
    }

    #[test]
    fn test_descendants_of_leaf_and_missing() {
        let resolver = sample_tree();
        assert_eq!(resolver.descendants_of(110), [110].into_iter().collect());
        assert!(resolver.descendants_of(999).is_empty());
    }

    #[test]
    fn test_full_path_of_city() {
        let resolver = sample_tree();
        let path = resolver.full_path_of(100);
        let names: Vec<&str> = path.iter().map(|seg| seg.name.as_str()).collect();
        assert_eq!(names, vec!["中国", "湖南省", "长沙市"]);
    }

    #[test]
    fn test_location_text_excludes_root() {
        let resolver = sample_tree();
        assert_eq!(resolver.location_text(100), "湖南省长沙市");
        assert_eq!(resolver.location_text(999), "");
    }

    #[test]
    fn test_cyclic_data_does_not_hang() {
        // 构造成环数据: 2 ↔ 3
        let node = |id: i64, parent_id: i64| AreaNode {
            id,
            name: format!("n{}", id),
            parent_id,
            group_code: None,
            sort_order: 0,
        };
        let resolver = AreaHierarchyResolver::new(vec![node(2, 3), node(3, 2)]);

        // 去重保护下终止, 返回已收集节点
        let set = resolver.descendants_of(2);
        assert!(set.contains(&2));

        // 路径回溯深度超限返回空
        assert!(resolver.full_path_of(2).is_empty());
    }
}
