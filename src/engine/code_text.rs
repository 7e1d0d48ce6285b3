// ==========================================
// 高考志愿推荐引擎 - 编码文案翻译
// ==========================================
// 职责: 将整型/CSV 编码的院校属性翻译为展示文案
// 三张静态表: 办学特色 / 院校类型 / 专项类别
// 未知编码静默丢弃, 空输入返回空列表
// ==========================================

// ==========================================
// CodeCategory - 编码类别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCategory {
    /// 办学特色 (985/211/双一流等)
    Feature,
    /// 院校类型 (综合/理工/师范等)
    SchoolType,
    /// 专项类别 (中外合作/国家专项等)
    Special,
}

/// 办学特色编码表
const FEATURE_TABLE: [(i32, &str); 8] = [
    (1, "985工程"),
    (2, "211工程"),
    (3, "双一流"),
    (4, "强基计划"),
    (5, "保研资格"),
    (6, "研究生院"),
    (7, "省部共建"),
    (8, "中央部属"),
];

/// 院校类型编码表
const SCHOOL_TYPE_TABLE: [(i32, &str); 12] = [
    (1, "综合类"),
    (2, "理工类"),
    (3, "师范类"),
    (4, "农林类"),
    (5, "医药类"),
    (6, "财经类"),
    (7, "政法类"),
    (8, "艺术类"),
    (9, "体育类"),
    (10, "民族类"),
    (11, "军事类"),
    (12, "语言类"),
];

/// 专项类别编码表
const SPECIAL_TABLE: [(i32, &str); 6] = [
    (1, "中外合作办学"),
    (2, "民族班"),
    (3, "定向培养"),
    (4, "国家专项计划"),
    (5, "地方专项计划"),
    (6, "少数民族预科班"),
];

fn lookup(table: &[(i32, &'static str)], code: i32) -> Option<&'static str> {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, text)| *text)
}

// ==========================================
// CodeTextTranslator - 编码文案翻译器
// ==========================================
pub struct CodeTextTranslator {
    // 无状态引擎, 纯静态表查找
}

impl CodeTextTranslator {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 翻译单个编码
    pub fn translate_code(&self, code: i32, category: CodeCategory) -> Option<&'static str> {
        let table: &[(i32, &'static str)] = match category {
            CodeCategory::Feature => &FEATURE_TABLE,
            CodeCategory::SchoolType => &SCHOOL_TYPE_TABLE,
            CodeCategory::Special => &SPECIAL_TABLE,
        };
        lookup(table, code)
    }

    /// 翻译已解析的编码列表 (行映射时 CSV 已转为 Vec<i32>)
    pub fn translate_codes(&self, codes: &[i32], category: CodeCategory) -> Vec<String> {
        codes
            .iter()
            .filter_map(|code| self.translate_code(*code, category))
            .map(|text| text.to_string())
            .collect()
    }

    /// 翻译原始文本: 单个整数 / 数字字符串 / 逗号分隔编码串
    ///
    /// 无法解析的片段与未知编码一律静默丢弃
    pub fn translate_text(&self, raw: Option<&str>, category: CodeCategory) -> Vec<String> {
        let Some(s) = raw else {
            return Vec::new();
        };
        let codes: Vec<i32> = s
            .split(',')
            .filter_map(|part| part.trim().parse::<i32>().ok())
            .collect();
        self.translate_codes(&codes, category)
    }
}

impl Default for CodeTextTranslator {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_single_code() {
        let t = CodeTextTranslator::new();
        assert_eq!(t.translate_code(1, CodeCategory::Feature), Some("985工程"));
        assert_eq!(t.translate_code(3, CodeCategory::SchoolType), Some("师范类"));
        assert_eq!(t.translate_code(99, CodeCategory::Feature), None);
    }

    #[test]
    fn test_translate_csv_text() {
        let t = CodeTextTranslator::new();
        assert_eq!(
            t.translate_text(Some("1,3"), CodeCategory::Feature),
            vec!["985工程", "双一流"]
        );
        // 未知编码静默丢弃
        assert_eq!(
            t.translate_text(Some("2,99"), CodeCategory::Special),
            vec!["民族班"]
        );
    }

    #[test]
    fn test_translate_empty_input() {
        let t = CodeTextTranslator::new();
        assert!(t.translate_text(None, CodeCategory::Feature).is_empty());
        assert!(t.translate_text(Some(""), CodeCategory::Feature).is_empty());
        assert!(t
            .translate_text(Some("abc"), CodeCategory::SchoolType)
            .is_empty());
    }
}
