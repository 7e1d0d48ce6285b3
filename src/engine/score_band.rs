// ==========================================
// 高考志愿推荐引擎 - 线差分档器
// ==========================================
// 职责: 将线差 (预估投档线 − 考生成绩) 映射为
// 冲/稳/保梯度 + 梯度内档位, 以及反向映射
//
// 红线: 分档边界是行为契约, 逐位复现, 不得"取整优化"
// 红线: 反向映射必须查表直取, 不允许扫描线差域
// ==========================================
// 分档表: 3 模式 × 2 学历层次, 每表 3 梯度 × 4 档
// 区间约定: 全部左开右闭 (lo, hi]
// ==========================================

use crate::domain::types::{
    EducationLevel, RecommendMode, ScoreBandLabel, Tier, BANDS_PER_TIER, SLOTS_PER_BAND,
};

// ==========================================
// BandDef - 单档定义
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandDef {
    pub tier: Tier,
    /// 梯度内档位 1..=4
    pub band: i32,
    /// 线差下界 (不含)
    pub lo: i32,
    /// 线差上界 (含)
    pub hi: i32,
}

impl BandDef {
    const fn new(tier: Tier, band: i32, lo: i32, hi: i32) -> Self {
        Self { tier, band, lo, hi }
    }

    /// 复合档位 1..=12 (冲1..4=1..4, 稳1..4=5..8, 保1..4=9..12)
    pub fn composite_band(&self) -> i32 {
        (self.tier.to_id() - 1) * BANDS_PER_TIER + self.band
    }

    /// 档位覆盖的全局志愿槽位区间 [start, end]
    pub fn slot_span(&self) -> (i32, i32) {
        let b = self.composite_band();
        ((b - 1) * SLOTS_PER_BAND + 1, b * SLOTS_PER_BAND)
    }

    /// 展示文案, 如 "冲-志愿1-4"
    pub fn label(&self) -> String {
        let (start, end) = self.slot_span();
        format!("{}-志愿{}-{}", self.tier, start, end)
    }

    /// 线差是否落在本档 (左开右闭)
    pub fn contains(&self, diff: i32) -> bool {
        diff > self.lo && diff <= self.hi
    }
}

// ==========================================
// 分档表 (6 张, 边界为行为契约)
// ==========================================

/// 智能模式 · 本科
/// 冲 (0,12] / 稳 (-20,0] / 保 (-40,-20]
const SMART_UNDERGRAD: [BandDef; 12] = [
    BandDef::new(Tier::Reach, 1, 9, 12),
    BandDef::new(Tier::Reach, 2, 6, 9),
    BandDef::new(Tier::Reach, 3, 3, 6),
    BandDef::new(Tier::Reach, 4, 0, 3),
    BandDef::new(Tier::Match, 1, -5, 0),
    BandDef::new(Tier::Match, 2, -10, -5),
    BandDef::new(Tier::Match, 3, -15, -10),
    BandDef::new(Tier::Match, 4, -20, -15),
    BandDef::new(Tier::Safety, 1, -25, -20),
    BandDef::new(Tier::Safety, 2, -30, -25),
    BandDef::new(Tier::Safety, 3, -35, -30),
    BandDef::new(Tier::Safety, 4, -40, -35),
];

/// 智能模式 · 专科
/// 冲 (0,20] / 稳 (-40,0] / 保 (-100,-40], 档宽不等
const SMART_VOCATIONAL: [BandDef; 12] = [
    BandDef::new(Tier::Reach, 1, 15, 20),
    BandDef::new(Tier::Reach, 2, 10, 15),
    BandDef::new(Tier::Reach, 3, 5, 10),
    BandDef::new(Tier::Reach, 4, 0, 5),
    BandDef::new(Tier::Match, 1, -10, 0),
    BandDef::new(Tier::Match, 2, -20, -10),
    BandDef::new(Tier::Match, 3, -30, -20),
    BandDef::new(Tier::Match, 4, -40, -30),
    BandDef::new(Tier::Safety, 1, -55, -40),
    BandDef::new(Tier::Safety, 2, -70, -55),
    BandDef::new(Tier::Safety, 3, -85, -70),
    BandDef::new(Tier::Safety, 4, -100, -85),
];

/// 专业模式 · 本科
/// 整体负偏 (偏稳妥): 冲 (-20,0] / 稳 (-40,-20] / 保 (-60,-40]
const PROFESSIONAL_UNDERGRAD: [BandDef; 12] = [
    BandDef::new(Tier::Reach, 1, -5, 0),
    BandDef::new(Tier::Reach, 2, -10, -5),
    BandDef::new(Tier::Reach, 3, -15, -10),
    BandDef::new(Tier::Reach, 4, -20, -15),
    BandDef::new(Tier::Match, 1, -25, -20),
    BandDef::new(Tier::Match, 2, -30, -25),
    BandDef::new(Tier::Match, 3, -35, -30),
    BandDef::new(Tier::Match, 4, -40, -35),
    BandDef::new(Tier::Safety, 1, -45, -40),
    BandDef::new(Tier::Safety, 2, -50, -45),
    BandDef::new(Tier::Safety, 3, -55, -50),
    BandDef::new(Tier::Safety, 4, -60, -55),
];

/// 专业模式 · 专科
/// 本科表的两倍档宽: 冲 (-40,0] / 稳 (-80,-40] / 保 (-120,-80]
const PROFESSIONAL_VOCATIONAL: [BandDef; 12] = [
    BandDef::new(Tier::Reach, 1, -10, 0),
    BandDef::new(Tier::Reach, 2, -20, -10),
    BandDef::new(Tier::Reach, 3, -30, -20),
    BandDef::new(Tier::Reach, 4, -40, -30),
    BandDef::new(Tier::Match, 1, -50, -40),
    BandDef::new(Tier::Match, 2, -60, -50),
    BandDef::new(Tier::Match, 3, -70, -60),
    BandDef::new(Tier::Match, 4, -80, -70),
    BandDef::new(Tier::Safety, 1, -90, -80),
    BandDef::new(Tier::Safety, 2, -100, -90),
    BandDef::new(Tier::Safety, 3, -110, -100),
    BandDef::new(Tier::Safety, 4, -120, -110),
];

/// 自由模式 · 本科
/// 最宽区间: 冲 (0,180] / 稳 (-80,0] / 保 (-200,-80]
const FREE_UNDERGRAD: [BandDef; 12] = [
    BandDef::new(Tier::Reach, 1, 135, 180),
    BandDef::new(Tier::Reach, 2, 90, 135),
    BandDef::new(Tier::Reach, 3, 45, 90),
    BandDef::new(Tier::Reach, 4, 0, 45),
    BandDef::new(Tier::Match, 1, -20, 0),
    BandDef::new(Tier::Match, 2, -40, -20),
    BandDef::new(Tier::Match, 3, -60, -40),
    BandDef::new(Tier::Match, 4, -80, -60),
    BandDef::new(Tier::Safety, 1, -110, -80),
    BandDef::new(Tier::Safety, 2, -140, -110),
    BandDef::new(Tier::Safety, 3, -170, -140),
    BandDef::new(Tier::Safety, 4, -200, -170),
];

/// 自由模式 · 专科
/// 冲 (0,240] / 稳 (-100,0] / 保 (-260,-100]
const FREE_VOCATIONAL: [BandDef; 12] = [
    BandDef::new(Tier::Reach, 1, 180, 240),
    BandDef::new(Tier::Reach, 2, 120, 180),
    BandDef::new(Tier::Reach, 3, 60, 120),
    BandDef::new(Tier::Reach, 4, 0, 60),
    BandDef::new(Tier::Match, 1, -25, 0),
    BandDef::new(Tier::Match, 2, -50, -25),
    BandDef::new(Tier::Match, 3, -75, -50),
    BandDef::new(Tier::Match, 4, -100, -75),
    BandDef::new(Tier::Safety, 1, -140, -100),
    BandDef::new(Tier::Safety, 2, -180, -140),
    BandDef::new(Tier::Safety, 3, -220, -180),
    BandDef::new(Tier::Safety, 4, -260, -220),
];

/// 取 (模式, 学历层次) 对应的分档表
pub fn band_table(
    mode: RecommendMode,
    level: EducationLevel,
) -> &'static [BandDef; 12] {
    match (mode, level) {
        (RecommendMode::Smart, EducationLevel::Undergraduate) => &SMART_UNDERGRAD,
        (RecommendMode::Smart, EducationLevel::Vocational) => &SMART_VOCATIONAL,
        (RecommendMode::Professional, EducationLevel::Undergraduate) => &PROFESSIONAL_UNDERGRAD,
        (RecommendMode::Professional, EducationLevel::Vocational) => &PROFESSIONAL_VOCATIONAL,
        (RecommendMode::Free, EducationLevel::Undergraduate) => &FREE_UNDERGRAD,
        (RecommendMode::Free, EducationLevel::Vocational) => &FREE_VOCATIONAL,
    }
}

// ==========================================
// ScoreBandClassifier - 线差分档器
// ==========================================
pub struct ScoreBandClassifier {
    // 无状态引擎, 纯函数式查表
}

impl ScoreBandClassifier {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 线差分档
    ///
    /// # 参数
    /// - score_diff: 线差 = 预估投档线 − 考生成绩
    /// - level: 学历层次
    /// - mode: 推荐模式
    ///
    /// # 返回
    /// - Some(ScoreBandLabel): 梯度 + 档位 + 填报建议
    /// - None: 线差落在该模式全部档位之外
    pub fn classify(
        &self,
        score_diff: i32,
        level: EducationLevel,
        mode: RecommendMode,
    ) -> Option<ScoreBandLabel> {
        let table = band_table(mode, level);

        // 各档互不重叠, 至多命中一档
        table.iter().find(|def| def.contains(score_diff)).map(|def| {
            ScoreBandLabel {
                tier: def.tier,
                band: def.band,
                label: def.label(),
                advisory: def.tier.advisory(),
            }
        })
    }

    /// 反向映射: (梯度, 档位) -> 线差闭区间 [min, max]
    ///
    /// 查表直取: 档位序号即表下标, 左开下界换算为
    /// 整数闭区间下界 lo+1 (线差域为整数)
    ///
    /// # 参数
    /// - tier_id: 梯度编号 1=冲 2=稳 3=保
    /// - band_id: 梯度内档位 1..=4
    ///
    /// # 返回
    /// - Some((min, max)): 闭区间
    /// - None: 编号组合无定义
    pub fn band_range_for(
        &self,
        tier_id: i32,
        band_id: i32,
        level: EducationLevel,
        mode: RecommendMode,
    ) -> Option<(i32, i32)> {
        if !(1..=3).contains(&tier_id) || !(1..=BANDS_PER_TIER).contains(&band_id) {
            return None;
        }

        let table = band_table(mode, level);
        let index = ((tier_id - 1) * BANDS_PER_TIER + band_id - 1) as usize;
        let def = &table[index];

        debug_assert_eq!(def.tier.to_id(), tier_id);
        debug_assert_eq!(def.band, band_id);

        Some((def.lo + 1, def.hi))
    }
}

impl Default for ScoreBandClassifier {
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

    const ALL_MODES: [RecommendMode; 3] = [
        RecommendMode::Smart,
        RecommendMode::Professional,
        RecommendMode::Free,
    ];
    const ALL_LEVELS: [EducationLevel; 2] =
        [EducationLevel::Undergraduate, EducationLevel::Vocational];

    fn classifier() -> ScoreBandClassifier {
        ScoreBandClassifier::new()
    }

    /// 每张表的线差域 (lo_min, hi_max)
    fn table_domain(mode: RecommendMode, level: EducationLevel) -> (i32, i32) {
        let table = band_table(mode, level);
        let lo = table.iter().map(|d| d.lo).min().unwrap();
        let hi = table.iter().map(|d| d.hi).max().unwrap();
        (lo, hi)
    }

    #[test]
    fn test_totality_no_gaps_no_overlaps() {
        // 域内每个整数线差恰好命中一档
        let c = classifier();
        for mode in ALL_MODES {
            for level in ALL_LEVELS {
                let table = band_table(mode, level);
                let (lo, hi) = table_domain(mode, level);
                for diff in (lo + 1)..=hi {
                    let hits = table.iter().filter(|d| d.contains(diff)).count();
                    assert_eq!(
                        hits, 1,
                        "mode={:?} level={:?} diff={} 命中 {} 档",
                        mode, level, diff, hits
                    );
                    assert!(c.classify(diff, level, mode).is_some());
                }
                // 域外两侧无定义
                assert!(c.classify(lo, level, mode).is_none());
                assert!(c.classify(hi + 1, level, mode).is_none());
            }
        }
    }

    #[test]
    fn test_smart_undergrad_reference_boundaries() {
        // 智能·本科分档表逐位校验 (行为契约)
        let c = classifier();
        let level = EducationLevel::Undergraduate;
        let mode = RecommendMode::Smart;

        let cases = [
            (12, Tier::Reach, 1),
            (10, Tier::Reach, 1),
            (9, Tier::Reach, 2),
            (6, Tier::Reach, 3),
            (3, Tier::Reach, 4),
            (1, Tier::Reach, 4),
            (0, Tier::Match, 1),
            (-5, Tier::Match, 2),
            (-10, Tier::Match, 3),
            (-15, Tier::Match, 4),
            (-20, Tier::Safety, 1),
            (-25, Tier::Safety, 2),
            (-30, Tier::Safety, 3),
            (-35, Tier::Safety, 4),
            (-40, Tier::Safety, 4),
        ];
        for (diff, tier, band) in cases {
            let result = c.classify(diff, level, mode).unwrap();
            assert_eq!((result.tier, result.band), (tier, band), "diff={}", diff);
        }

        // 域外
        assert!(c.classify(13, level, mode).is_none());
        assert!(c.classify(-41, level, mode).is_none());
    }

    #[test]
    fn test_smart_undergrad_labels() {
        let c = classifier();
        let r = c
            .classify(10, EducationLevel::Undergraduate, RecommendMode::Smart)
            .unwrap();
        assert_eq!(r.label, "冲-志愿1-4");

        let r = c
            .classify(-3, EducationLevel::Undergraduate, RecommendMode::Smart)
            .unwrap();
        assert_eq!(r.label, "稳-志愿17-20");

        let r = c
            .classify(-38, EducationLevel::Undergraduate, RecommendMode::Smart)
            .unwrap();
        assert_eq!(r.label, "保-志愿45-48");
    }

    #[test]
    fn test_inverse_consistency_all_tables() {
        // band_range_for 与 classify 在所有表上互逆:
        // 区间内每个整数回分到同一档, 两端外整数分到他档或无档
        let c = classifier();
        for mode in ALL_MODES {
            for level in ALL_LEVELS {
                for tier_id in 1..=3 {
                    for band_id in 1..=4 {
                        let (min, max) = c
                            .band_range_for(tier_id, band_id, level, mode)
                            .expect("档位区间必有定义");
                        assert!(min <= max);

                        for diff in min..=max {
                            let r = c.classify(diff, level, mode).unwrap();
                            assert_eq!(
                                (r.tier.to_id(), r.band),
                                (tier_id, band_id),
                                "mode={:?} level={:?} diff={}",
                                mode,
                                level,
                                diff
                            );
                        }

                        let below = c.classify(min - 1, level, mode);
                        assert!(
                            below.map_or(true, |r| (r.tier.to_id(), r.band)
                                != (tier_id, band_id)),
                            "min-1 不应落回同档"
                        );
                        let above = c.classify(max + 1, level, mode);
                        assert!(
                            above.map_or(true, |r| (r.tier.to_id(), r.band)
                                != (tier_id, band_id)),
                            "max+1 不应落回同档"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_band_range_invalid_ids() {
        let c = classifier();
        let level = EducationLevel::Undergraduate;
        let mode = RecommendMode::Smart;
        assert!(c.band_range_for(0, 1, level, mode).is_none());
        assert!(c.band_range_for(4, 1, level, mode).is_none());
        assert!(c.band_range_for(1, 0, level, mode).is_none());
        assert!(c.band_range_for(1, 5, level, mode).is_none());
    }

    #[test]
    fn test_smart_undergrad_reach_band1_range() {
        // 推荐查询场景: 考生 600 分, 冲档1 => 投档线 [610, 612]
        let c = classifier();
        let (min, max) = c
            .band_range_for(1, 1, EducationLevel::Undergraduate, RecommendMode::Smart)
            .unwrap();
        assert_eq!((min, max), (10, 12));
        assert_eq!((600 + min, 600 + max), (610, 612));
    }

    #[test]
    fn test_classify_is_pure() {
        let c = classifier();
        let a = c.classify(-7, EducationLevel::Vocational, RecommendMode::Free);
        let b = c.classify(-7, EducationLevel::Vocational, RecommendMode::Free);
        assert_eq!(a, b);
    }

    #[test]
    fn test_free_mode_reach_extents() {
        // 自由模式冲档上限: 本科 +180 / 专科 +240
        let c = classifier();
        assert!(c
            .classify(180, EducationLevel::Undergraduate, RecommendMode::Free)
            .is_some());
        assert!(c
            .classify(181, EducationLevel::Undergraduate, RecommendMode::Free)
            .is_none());
        assert!(c
            .classify(240, EducationLevel::Vocational, RecommendMode::Free)
            .is_some());
        assert!(c
            .classify(241, EducationLevel::Vocational, RecommendMode::Free)
            .is_none());
    }

    #[test]
    fn test_professional_mode_fully_negative() {
        // 专业模式全域负偏: 正线差不分档
        let c = classifier();
        for level in ALL_LEVELS {
            assert!(c.classify(1, level, RecommendMode::Professional).is_none());
            assert!(c.classify(0, level, RecommendMode::Professional).is_some());
        }
    }
}
