//! 编解码配置。
//!
//! # 教案定位（Why）
//! - 编码与解码各有一组可选参数；把它们收拢为可序列化的值类型，宿主程序既可以在代码里用 `with_*` 链式构造，
//!   也可以直接嵌入自己的 TOML/JSON 配置文件。
//!
//! # 契约说明（What）
//! - 所有字段都有默认值，反序列化时缺省字段按 [`Default`] 补齐。
//! - 配置本身不做校验；非法值（例如越界的 `z_value`、非正的 `scale`）在调用编解码入口时以
//!   [`IldaError`](crate::IldaError) 的 Validation 类错误返回。

use serde::{Deserialize, Serialize};

use crate::{error::Result, format::IldaFormat, transform::Transform};

/// 默认帧名。
pub const DEFAULT_FRAME_NAME: &str = "Frame000";

/// 默认公司名。
pub const DEFAULT_COMPANY_NAME: &str = "ILDA";

/// 每条折线末尾追加的驻留点数量。
pub const DEFAULT_DWELL_POINTS: usize = 4;

/// 帧编码参数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// 写出的坐标格式，默认 Format 0（3D）。
    pub format: IldaFormat,
    /// 未携带深度的点写入的固定 Z 值，必须位于 `-32768..=32767`。
    pub z_value: i32,
    /// 是否翻转 Y 轴，默认开启（源空间 Y 向下）。
    pub invert_y: bool,
    /// 头部帧名。
    pub frame_name: String,
    /// 头部公司名。
    pub company_name: String,
    /// 头部帧序号。
    pub frame_number: u16,
    /// 头部总帧数。
    pub total_frames: u16,
    /// 每条折线末尾重复写出的驻留点数量。
    pub dwell_points: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            format: IldaFormat::ThreeD,
            z_value: 0,
            invert_y: true,
            frame_name: DEFAULT_FRAME_NAME.to_owned(),
            company_name: DEFAULT_COMPANY_NAME.to_owned(),
            frame_number: 0,
            total_frames: 1,
            dwell_points: DEFAULT_DWELL_POINTS,
        }
    }
}

impl EncodeOptions {
    /// 设置坐标格式。
    #[must_use]
    pub fn with_format(mut self, format: IldaFormat) -> Self {
        self.format = format;
        self
    }

    /// 设置固定深度。
    #[must_use]
    pub fn with_z_value(mut self, z_value: i32) -> Self {
        self.z_value = z_value;
        self
    }

    /// 设置是否翻转 Y 轴。
    #[must_use]
    pub fn with_invert_y(mut self, invert_y: bool) -> Self {
        self.invert_y = invert_y;
        self
    }

    /// 设置帧名。
    #[must_use]
    pub fn with_frame_name(mut self, name: impl Into<String>) -> Self {
        self.frame_name = name.into();
        self
    }

    /// 设置公司名。
    #[must_use]
    pub fn with_company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = name.into();
        self
    }

    /// 设置帧序号与总帧数。
    #[must_use]
    pub fn with_frame_position(mut self, frame_number: u16, total_frames: u16) -> Self {
        self.frame_number = frame_number;
        self.total_frames = total_frames;
        self
    }

    /// 设置驻留点数量。
    #[must_use]
    pub fn with_dwell_points(mut self, dwell_points: usize) -> Self {
        self.dwell_points = dwell_points;
        self
    }
}

/// 帧解码参数。
///
/// `scale` 为 `None` 时输出原始 ILDA 整数空间坐标（以浮点表示），其余变换字段被忽略。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// 编码器使用的缩放系数；提供时必须严格为正。
    pub scale: Option<f64>,
    /// 编码器使用的 X 中心。
    pub center_x: f64,
    /// 编码器使用的 Y 中心。
    pub center_y: f64,
    /// 编码器是否翻转了 Y 轴。
    pub invert_y: bool,
    /// 是否折叠驻留点产生的单点折线。
    pub fold_dwell: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            scale: None,
            center_x: 0.0,
            center_y: 0.0,
            invert_y: true,
            fold_dwell: false,
        }
    }
}

impl DecodeOptions {
    /// 以一组正变换参数构造其逆变换配置。
    #[must_use]
    pub fn inverse_of(transform: &Transform) -> Self {
        Self {
            scale: Some(transform.scale),
            center_x: transform.center_x,
            center_y: transform.center_y,
            invert_y: transform.invert_y,
            fold_dwell: false,
        }
    }

    /// 开启或关闭驻留点折叠。
    #[must_use]
    pub fn with_fold_dwell(mut self, fold_dwell: bool) -> Self {
        self.fold_dwell = fold_dwell;
        self
    }

    /// 解析出逆变换；未提供 `scale` 时返回 `None`，`scale` 非正时返回校验错误。
    pub fn transform(&self) -> Result<Option<Transform>> {
        self.scale
            .map(|scale| Transform::new(scale, self.center_x, self.center_y, self.invert_y))
            .transpose()
    }
}
