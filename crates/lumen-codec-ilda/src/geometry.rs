//! 折线几何模型：编码器的输入与解码器的输出。
//!
//! # 教案定位（Why）
//! - 上游矢量化器（位图描摹库）产出“有序折线 → 有序点”的结构，本模块把这一数据契约固化为具名类型，
//!   让编码器与解码器共享同一种表示。
//! - 模型本身不承担任何字节处理职责，只提供包围盒与统计这类纯计算辅助。
//!
//! # 契约说明（What）
//! - [`Point`] 的坐标单位任意（常见为像素空间，Y 轴向下），没有固有边界；`z` 为可选深度。
//! - [`Stroke`] 是一条连续出光路径；交给编码器时必须非空。
//! - 一帧即 `&[Stroke]`，至少包含一条非空折线。

use serde::{Deserialize, Serialize};

/// 源坐标空间中的一个点。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X 坐标（源单位）。
    pub x: f64,
    /// Y 坐标（源单位）。
    pub y: f64,
    /// 可选深度；缺省时编码器写入 `EncodeOptions::z_value`。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Point {
    /// 构造二维点。
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// 构造带深度的三维点。
    #[must_use]
    pub const fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_none_or(f64::is_finite)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<(f64, f64, f64)> for Point {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::with_z(x, y, z)
    }
}

/// 一条折线：共享同一段连续出光路径的有序点序列。
pub type Stroke = Vec<Point>;

/// 由 `(x, y)` 元组切片构造折线的便捷函数，测试与调用方常用。
#[must_use]
pub fn stroke_from_xy(points: &[(f64, f64)]) -> Stroke {
    points.iter().copied().map(Point::from).collect()
}

/// 全部折线在 XY 平面上的轴对齐包围盒。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// 最小 X。
    pub min_x: f64,
    /// 最大 X。
    pub max_x: f64,
    /// 最小 Y。
    pub min_y: f64,
    /// 最大 Y。
    pub max_y: f64,
}

impl Bounds {
    /// 计算所有折线所有点的包围盒；没有任何点时返回 `None`。
    #[must_use]
    pub fn of(strokes: &[Stroke]) -> Option<Self> {
        let mut points = strokes.iter().flatten();
        let first = points.next()?;
        let init = Self {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        Some(points.fold(init, |acc, p| Self {
            min_x: acc.min_x.min(p.x),
            max_x: acc.max_x.max(p.x),
            min_y: acc.min_y.min(p.y),
            max_y: acc.max_y.max(p.y),
        }))
    }

    /// X 方向跨度。
    #[must_use]
    pub fn x_range(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Y 方向跨度。
    #[must_use]
    pub fn y_range(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// 包围盒中心 `((min_x+max_x)/2, (min_y+max_y)/2)`。
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// 折线集合的规模统计，调试工具用来快速比对编码前后的几何量。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeometrySummary {
    /// 所有折线的点数之和。
    pub points: usize,
    /// 折线条数。
    pub strokes: usize,
}

/// 统计折线条数与总点数。
#[must_use]
pub fn summarize(strokes: &[Stroke]) -> GeometrySummary {
    GeometrySummary {
        points: strokes.iter().map(Vec::len).sum(),
        strokes: strokes.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_every_stroke() {
        let strokes = vec![
            stroke_from_xy(&[(0.0, 5.0), (10.0, -2.0)]),
            stroke_from_xy(&[(-3.0, 7.5)]),
        ];
        let bounds = Bounds::of(&strokes).expect("非空输入必有包围盒");
        assert_eq!(bounds.min_x, -3.0);
        assert_eq!(bounds.max_x, 10.0);
        assert_eq!(bounds.min_y, -2.0);
        assert_eq!(bounds.max_y, 7.5);
        assert_eq!(bounds.center(), (3.5, 2.75));
    }

    #[test]
    fn bounds_of_nothing_is_none() {
        assert!(Bounds::of(&[]).is_none());
        assert!(Bounds::of(&[Vec::new()]).is_none());
    }

    #[test]
    fn summary_counts_points_and_strokes() {
        let strokes = vec![
            stroke_from_xy(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]),
            stroke_from_xy(&[(5.0, 5.0)]),
        ];
        assert_eq!(
            summarize(&strokes),
            GeometrySummary {
                points: 4,
                strokes: 2
            }
        );
    }

    #[test]
    fn non_finite_depth_is_detected() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::with_z(1.0, 2.0, f64::INFINITY).is_finite());
        assert!(!Point::new(f64::NAN, 0.0).is_finite());
    }
}
