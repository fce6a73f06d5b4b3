//! 帧编码器：折线列表 → 头部 + 点记录正文 + 结束标记。
//!
//! # 教案定位（Why）
//! - 上游矢量化器给出的是任意单位的浮点折线，激光硬件只接受固定宽度的 16 位整数记录；
//!   编码器负责量化、状态位标注与驻留点填充，是整条链路里唯一生成 ILDA 字节的地方。
//!
//! # 契约说明（What）
//! - **输入**：非空的折线列表，每条折线非空，坐标有限；`EncodeOptions::z_value` 位于 16 位有符号范围。
//! - **输出**：[`EncodedFrame`]，携带三段字节（头部、正文、结束标记）以及本次使用的 [`Transform`]，
//!   调试时可直接据此构造逆变换。
//! - **状态位约定**：
//!   - 每条折线的第一个点写 `0x40`；
//!   - 每条折线之后追加 `dwell_points` 个末点副本，状态为 `0x40`，给振镜留出稳定时间；
//!   - 最后一条折线的最后一个驻留点额外置 `0x80`（即 `0xC0`），作为帧结束标记；
//!     `dwell_points` 为 0 时不写该标记，帧边界只由结束标记头部给出。
//! - 头部记录数由正文长度除以记录尺寸得出，而不是输入点数，因为驻留点会撑大实际记录数。
//!
//! # 风险提示（Trade-offs）
//! - 状态位约定与 ILDA 标准（`0x80` 表示消隐）不同，解码器通过启发式判定兼容两种约定，见 `blanking` 模块。

use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

use crate::{
    error::{IldaError, Result},
    format::{Header, HeaderFields, IldaFormat, Record, status},
    geometry::{Bounds, Point, Stroke},
    options::{DecodeOptions, EncodeOptions},
    transform::{Quantized, Transform, clamp_i16},
};

/// 一次编码的完整产物。
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFrame {
    header: Bytes,
    body: Bytes,
    footer: Bytes,
    format: IldaFormat,
    transform: Transform,
    clamped_coordinates: usize,
}

impl EncodedFrame {
    /// 32 字节帧头。
    #[must_use]
    pub fn header(&self) -> &Bytes {
        &self.header
    }

    /// 点记录正文。
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// 记录数为 0 的结束标记头部。
    #[must_use]
    pub fn footer(&self) -> &Bytes {
        &self.footer
    }

    /// 以 `[header, body, footer]` 形式返回三段字节（引用计数克隆，无拷贝）。
    #[must_use]
    pub fn chunks(&self) -> [Bytes; 3] {
        [self.header.clone(), self.body.clone(), self.footer.clone()]
    }

    /// 拼接为可直接写入 `.ild` 文件的连续字节。
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let mut out =
            BytesMut::with_capacity(self.header.len() + self.body.len() + self.footer.len());
        out.extend_from_slice(&self.header);
        out.extend_from_slice(&self.body);
        out.extend_from_slice(&self.footer);
        out.freeze()
    }

    /// 写出的坐标格式。
    #[must_use]
    pub fn format(&self) -> IldaFormat {
        self.format
    }

    /// 正文中的记录数（含驻留点）。
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.body.len() / self.format.record_size()
    }

    /// 本次编码使用的正变换。
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// 被安全裁剪修正过的坐标分量个数；正确的缩放计算下应为 0。
    #[must_use]
    pub fn clamped_coordinates(&self) -> usize {
        self.clamped_coordinates
    }

    /// 能把本帧解码回源坐标空间、并折叠驻留点的解码参数。
    #[must_use]
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::inverse_of(&self.transform).with_fold_dwell(true)
    }
}

/// 把折线列表编码为一帧 ILDA 数据。
///
/// # 实现细节（How）
/// 1. 校验输入：空帧、空折线、非有限坐标、越界深度；
/// 2. 计算全体点的包围盒并据此拟合 [`Transform`]；
/// 3. 逐折线写出记录：首点 `0x40`，其后追加驻留点，整帧最后一个驻留点写 `0xC0`；
/// 4. 以正文长度推导记录数，生成头部与结束标记。
///
/// # 错误（What）
/// - `EmptyFrame` / `EmptyStroke` / `NonFiniteCoordinate` / `DepthOutOfRange`：输入违反前置条件；
/// - `NonAsciiName`：帧名或公司名含非 ASCII 字符；
/// - `TooManyRecords`：记录数超出头部 16 位计数字段。
pub fn encode_frame(strokes: &[Stroke], options: &EncodeOptions) -> Result<EncodedFrame> {
    let z_default = validate(strokes, options)?;

    let Some(bounds) = Bounds::of(strokes) else {
        return Err(IldaError::EmptyFrame);
    };
    let transform = Transform::fit(&bounds, options.invert_y);

    let format = options.format;
    let geometric_points: usize = strokes.iter().map(Vec::len).sum();
    let total_records = strokes
        .len()
        .saturating_mul(options.dwell_points)
        .saturating_add(geometric_points);
    if total_records > usize::from(u16::MAX) {
        return Err(IldaError::TooManyRecords {
            records: total_records,
        });
    }

    let mut writer = BodyWriter {
        body: BytesMut::with_capacity(total_records * format.record_size()),
        format,
        transform: &transform,
        z_default,
        clamped: 0,
    };

    let last_stroke = strokes.len() - 1;
    for (stroke_index, stroke) in strokes.iter().enumerate() {
        let closes_frame = stroke_index == last_stroke;
        writer.write_stroke(stroke, options.dwell_points, closes_frame);
    }

    let BodyWriter { body, clamped, .. } = writer;
    let body = body.freeze();
    let records = body.len() / format.record_size();
    // 记录数已在写出前校验，不会超出 u16。
    let record_count = u16::try_from(records).map_err(|_| IldaError::TooManyRecords { records })?;

    let header = Header::new(
        format,
        HeaderFields {
            frame_name: options.frame_name.clone(),
            company_name: options.company_name.clone(),
            record_count,
            frame_number: options.frame_number,
            total_frames: options.total_frames,
            scanner_head: 0,
        },
    );
    let footer = Header::new(
        format,
        HeaderFields {
            total_frames: options.total_frames,
            ..HeaderFields::default()
        },
    );
    let header = Bytes::copy_from_slice(&header.to_bytes()?);
    let footer = Bytes::copy_from_slice(&footer.to_bytes()?);

    if clamped > 0 {
        warn!(
            clamped,
            scale = transform.scale,
            "ILDA 量化触发坐标裁剪，输出几何已被截断"
        );
    }
    debug!(
        records,
        strokes = strokes.len(),
        scale = transform.scale,
        center_x = transform.center_x,
        center_y = transform.center_y,
        ilda_format = ?format,
        "ILDA 帧编码完成"
    );

    Ok(EncodedFrame {
        header,
        body,
        footer,
        format,
        transform,
        clamped_coordinates: clamped,
    })
}

/// 校验前置条件，返回量化后的固定深度。
fn validate(strokes: &[Stroke], options: &EncodeOptions) -> Result<i16> {
    if strokes.is_empty() {
        return Err(IldaError::EmptyFrame);
    }
    let z_default = i16::try_from(options.z_value).map_err(|_| IldaError::DepthOutOfRange {
        value: options.z_value,
    })?;
    for (stroke_index, stroke) in strokes.iter().enumerate() {
        if stroke.is_empty() {
            return Err(IldaError::EmptyStroke {
                stroke: stroke_index,
            });
        }
        if let Some(point_index) = stroke.iter().position(|p| !p.is_finite()) {
            return Err(IldaError::NonFiniteCoordinate {
                stroke: stroke_index,
                point: point_index,
            });
        }
    }
    Ok(z_default)
}

/// 正文写出器：持有量化参数并统计裁剪次数。
struct BodyWriter<'a> {
    body: BytesMut,
    format: IldaFormat,
    transform: &'a Transform,
    z_default: i16,
    clamped: usize,
}

impl BodyWriter<'_> {
    fn write_stroke(&mut self, stroke: &[Point], dwell_points: usize, closes_frame: bool) {
        let mut last = Record::default();
        for (point_index, point) in stroke.iter().enumerate() {
            let mut record = self.quantize(point);
            if point_index == 0 {
                record.status |= status::LAST_POINT;
            }
            record.encode(self.format, &mut self.body);
            last = record;
        }

        for dwell_index in 0..dwell_points {
            let mut record = Record {
                status: status::LAST_POINT,
                ..last
            };
            if closes_frame && dwell_index == dwell_points - 1 {
                record.status |= status::END_OF_FRAME;
            }
            record.encode(self.format, &mut self.body);
        }
    }

    fn quantize(&mut self, point: &Point) -> Record {
        let x = self.count(self.transform.quantize_x(point.x));
        let y = self.count(self.transform.quantize_y(point.y));
        let z = match point.z {
            Some(z) => self.count(clamp_i16(z.round())),
            None => self.z_default,
        };
        Record {
            x,
            y,
            z,
            status: 0,
            color: 0,
        }
    }

    fn count(&mut self, quantized: Quantized) -> i16 {
        if quantized.clamped {
            self.clamped += 1;
        }
        quantized.value
    }
}
