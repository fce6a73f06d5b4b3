#![warn(missing_docs)]

//! # lumen-codec-ilda
//!
//! ## 教案目的（Why）
//! - **定位**：Lumen 图像转激光流水线的末端编解码器，把矢量化器产出的折线写成 ILDA 激光交换格式，
//!   并能把 `.ild` 字节还原为折线用于调试比对。
//! - **架构角色**：位于矢量化器（上游，提供折线）与播放/文件写出（下游，消费字节）之间；
//!   本 crate 不做任何 I/O，也不持有全局状态。
//!
//! ## 交互契约（What）
//! - **编码**：[`encode_frame`] 接收 `&[Stroke]` 与 [`EncodeOptions`]，返回包含头部、正文、结束标记的 [`EncodedFrame`]。
//! - **解码**：[`decode_strokes`] 接收任意 [`bytes::Buf`] 与 [`DecodeOptions`]，返回折线列表；
//!   [`scan_frames`] 只做帧边界扫描，供检查工具使用。
//! - **粗切分**：[`split_frames`] 按字节模式切分多帧文件，不做任何校验。
//! - **错误**：所有失败统一为 [`IldaError`]，通过 [`IldaError::kind`] 区分 Validation 与 Format 两类。
//!
//! ## 实现策略（How）
//! - `format` 集中定义线格式；`transform` 负责量化与逆变换；`blanking` 负责消隐约定判定；
//!   `encode`/`decode`/`split` 分别承载三个入口。
//! - 诊断通过 `tracing` 事件输出：编码完成与约定判定为 `debug`，坐标裁剪与边界恢复为 `warn`。
//!
//! ## 风险提示（Trade-offs）
//! - 编码器的状态位约定（`0x40` 标记折线起点）与 ILDA 标准不同，解码端依赖启发式兼容两者，
//!   对不含任何消隐位的极简流可能误判。
//! - 解码器只支持 Format 0；Format 1 仅能写出。

mod blanking;
mod decode;
mod encode;
mod error;
mod format;
mod geometry;
mod options;
mod split;
mod transform;

pub use crate::{
    blanking::BlankingConvention,
    decode::{FrameInfo, decode_strokes, fold_dwell, scan_frames},
    encode::{EncodedFrame, encode_frame},
    error::{ErrorKind, IldaError, Result},
    format::{
        HEADER_LEN, Header, HeaderFields, IldaFormat, MAGIC, NAME_LEN, Record,
        looks_like_format0_header, status,
    },
    geometry::{Bounds, GeometrySummary, Point, Stroke, stroke_from_xy, summarize},
    options::{
        DEFAULT_COMPANY_NAME, DEFAULT_DWELL_POINTS, DEFAULT_FRAME_NAME, DecodeOptions,
        EncodeOptions,
    },
    split::{FRAME_PATTERN, split_frame_ranges, split_frames},
    transform::{ILDA_SPAN, Quantized, SAFETY_MARGIN, Transform, clamp_i16},
};
