//! 消隐位约定的判定。
//!
//! # 教案定位（Why）
//! - 现存的 ILDA 生产者对“哪一位表示折线切换”有两种互不兼容的约定：标准把 `0x80` 定义为消隐位，
//!   本系统的编码器则在折线起点与驻留点上写 `0x40`。
//! - 解码器必须在拆分折线之前针对整条流做一次判定，然后统一应用；逐记录判断会让两种约定混杂，得到错误的分段。
//!
//! # 契约说明（What）
//! - [`BlankingConvention::resolve`] 接收整条流的状态字节，按以下顺序判定：
//!   1. 存在只置 `0x80`、未置 `0x40` 的记录 → [`BlankingConvention::SpecBit`]；
//!   2. 否则，除组合帧结束标记 `0xC0` 外没有记录置 `0x80`，且 `0x40` 出现在最后一条以外的记录上
//!      → [`BlankingConvention::StartBit`]；
//!   3. 其余情况回落到 [`BlankingConvention::SpecBit`]。
//!
//! ## 风险提示（Trade-offs）
//! - 这是启发式而非保证：不带任何消隐位的单折线流、或刻意构造的对抗输入都可能被误判。
//!   该局限被接受并记录在案，而不是尝试猜测更严格的意图。

use crate::format::status;

/// 一条流中用于标记折线切换的状态位约定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlankingConvention {
    /// 标准约定：`0x80` 为消隐位。
    SpecBit,
    /// 本系统编码器约定：`0x40` 标记折线起点与驻留点。
    StartBit,
}

impl BlankingConvention {
    /// 该约定对应的状态位掩码。
    #[must_use]
    pub const fn mask(self) -> u8 {
        match self {
            Self::SpecBit => status::BLANKING,
            Self::StartBit => status::LAST_POINT,
        }
    }

    /// 判断某条记录是否开启新折线。
    #[must_use]
    pub fn starts_stroke(self, status_byte: u8) -> bool {
        status::has_flag(status_byte, self.mask())
    }

    /// 基于整条流的状态字节判定约定。
    #[must_use]
    pub fn resolve(statuses: &[u8]) -> Self {
        let blanking_only = statuses.iter().any(|&s| {
            status::has_flag(s, status::BLANKING) && !status::has_flag(s, status::LAST_POINT)
        });
        if blanking_only {
            return Self::SpecBit;
        }

        // 走到这里时，任何置 0x80 的记录必然同时置 0x40，即只剩组合帧结束标记。
        let start_before_last = statuses
            .split_last()
            .is_some_and(|(_, rest)| rest.iter().any(|&s| status::has_flag(s, status::LAST_POINT)));
        if start_before_last {
            return Self::StartBit;
        }

        Self::SpecBit
    }
}
