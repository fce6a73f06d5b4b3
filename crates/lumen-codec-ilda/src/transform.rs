//! 源坐标空间与 ILDA 16 位整数空间之间的归一化变换。
//!
//! # 教案定位（Why）
//! - 编码器需要把任意单位的折线等比缩放进 `[-32768, 32767]`，解码器在调试往返时需要精确地逆变换回源空间；
//!   两个方向共享同一组参数，因此放在独立的值类型里。
//!
//! # 契约说明（What）
//! - 正变换：`ilda = round((value - center) * scale)`，开启 `invert_y` 时 Y 先取反；随后裁剪到 16 位范围。
//! - 逆变换：`x = x_raw / scale + center_x`，`y = ∓y_raw / scale + center_y`。
//! - `scale` 必须严格为正；[`Transform::new`] 负责校验，[`Transform::fit`] 的结果天然满足。
//!
//! # 实现策略（How）
//! - 缩放系数取两轴中较小者并乘 0.9 的安全余量，保证边界点量化后不越界；因此裁剪在正常输入下不会触发，
//!   但仍保留并计数，作为最后一道防线。

use serde::{Deserialize, Serialize};

use crate::{
    error::{IldaError, Result},
    geometry::Bounds,
};

/// 16 位有符号整数空间的跨度。
pub const ILDA_SPAN: f64 = 65535.0;

/// 缩放系数的安全余量。
pub const SAFETY_MARGIN: f64 = 0.9;

/// 一组正/逆变换参数。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// 源单位 → ILDA 单位的缩放系数（严格为正）。
    pub scale: f64,
    /// 源空间 X 中心。
    pub center_x: f64,
    /// 源空间 Y 中心。
    pub center_y: f64,
    /// 是否翻转 Y 轴（源空间 Y 向下、激光投影 Y 向上）。
    pub invert_y: bool,
}

/// 单个坐标的量化结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantized {
    /// 裁剪后的值。
    pub value: i16,
    /// 是否触发了裁剪。
    pub clamped: bool,
}

impl Transform {
    /// 以显式参数构造，`scale` 非正（含 NaN）时返回校验错误。
    pub fn new(scale: f64, center_x: f64, center_y: f64, invert_y: bool) -> Result<Self> {
        if scale.is_nan() || scale <= 0.0 {
            return Err(IldaError::non_positive_scale(scale));
        }
        Ok(Self {
            scale,
            center_x,
            center_y,
            invert_y,
        })
    }

    /// 根据包围盒计算保持纵横比的变换。
    ///
    /// - 两轴跨度都大于 0：`scale = min(65535/x_range, 65535/y_range) * 0.9`；
    /// - 仅一轴跨度大于 0：`scale = 65535/range * 0.9`；
    /// - 两轴跨度都为 0（单点或退化输入）：`scale = 1.0`。
    #[must_use]
    pub fn fit(bounds: &Bounds, invert_y: bool) -> Self {
        let (x_range, y_range) = (bounds.x_range(), bounds.y_range());
        let scale = match (x_range > 0.0, y_range > 0.0) {
            (true, true) => (ILDA_SPAN / x_range).min(ILDA_SPAN / y_range) * SAFETY_MARGIN,
            (true, false) => ILDA_SPAN / x_range * SAFETY_MARGIN,
            (false, true) => ILDA_SPAN / y_range * SAFETY_MARGIN,
            (false, false) => 1.0,
        };
        // 跨度溢出为无穷或小到次正规数时，比例会退化为 0 或无穷，按退化输入处理。
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        let (center_x, center_y) = bounds.center();
        Self {
            scale,
            center_x,
            center_y,
            invert_y,
        }
    }

    /// 量化 X。
    #[must_use]
    pub fn quantize_x(&self, x: f64) -> Quantized {
        clamp_i16(((x - self.center_x) * self.scale).round())
    }

    /// 量化 Y，按需翻转。
    #[must_use]
    pub fn quantize_y(&self, y: f64) -> Quantized {
        let offset = y - self.center_y;
        let oriented = if self.invert_y { -offset } else { offset };
        clamp_i16((oriented * self.scale).round())
    }

    /// 把 ILDA 整数坐标映射回源空间。
    #[must_use]
    pub fn restore(&self, x_raw: i16, y_raw: i16) -> (f64, f64) {
        let x = f64::from(x_raw) / self.scale + self.center_x;
        let y_scaled = f64::from(y_raw) / self.scale;
        let y = if self.invert_y {
            -y_scaled + self.center_y
        } else {
            y_scaled + self.center_y
        };
        (x, y)
    }
}

/// 把已取整的浮点值裁剪到 `i16` 范围。
#[must_use]
pub fn clamp_i16(value: f64) -> Quantized {
    let clamped_value = value.clamp(f64::from(i16::MIN), f64::from(i16::MAX));
    Quantized {
        // 已裁剪到 i16 范围内且为整数，转换无损。
        value: clamped_value as i16,
        clamped: clamped_value != value,
    }
}
