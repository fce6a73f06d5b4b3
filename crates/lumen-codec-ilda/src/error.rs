//! ILDA 编解码错误类型定义。
//!
//! # 教案定位（Why）
//! - 编码与解码两条路径的失败原因需要以稳定、可断言的形式交给调用方，由调用方决定终止还是换一种解释重试；
//!   编解码器内部不做任何本地恢复。
//! - 与 `encode`/`decode` 模块解耦，避免字节处理逻辑与错误枚举互相污染。
//!
//! # 使用契约（What）
//! - 每个变体通过 [`IldaError::kind`] 归入两大类：**Validation**（调用方违反了文档化的前置条件）与
//!   **Format**（字节流不符合 ILDA 结构）。
//! - “输入不是字节缓冲”这一类错误由类型系统在编译期拦截：解码入口要求 `impl bytes::Buf`，因此不存在运行时分支。
//! - 所有变体均实现 `Clone`/`PartialEq`，测试可以直接断言具体错误。

use thiserror::Error;

/// 编解码统一结果别名。
pub type Result<T, E = IldaError> = core::result::Result<T, E>;

/// 错误大类，对应“前置条件违规”与“字节格式违规”两种处置策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 输入违反了文档化的前置条件：空折线、深度越界、缩放系数非正等。
    Validation,
    /// 字节流不符合 ILDA 结构：魔数错误、格式码不支持、头部/正文截断、边界无法恢复。
    Format,
}

/// ILDA 编解码过程中可能出现的错误。
///
/// ## 教案解读（Why）
/// - 每个分支对应一条具体的协议或契约约束，调用方据此判断是上游几何数据有误、字节流损坏，还是配置错误。
/// - 字节偏移量随错误一起返回，便于把问题定位回原始 `.ild` 文件。
///
/// ## 契约定义（What）
/// - 任何错误都表示本次调用没有产出可用结果，调用方不得使用部分输出。
/// - 软修正（坐标裁剪）不会以错误形式出现，而是通过 `EncodedFrame::clamped_coordinates` 与 `warn!` 日志暴露。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IldaError {
    /// 待编码的折线列表为空。
    #[error("frame contains no strokes")]
    EmptyFrame,

    /// 第 `stroke` 条折线不含任何点。
    #[error("stroke {stroke} contains no points")]
    EmptyStroke {
        /// 出问题的折线下标（从 0 开始）。
        stroke: usize,
    },

    /// 坐标为 NaN 或无穷大，无法计算包围盒。
    #[error("stroke {stroke} point {point} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// 折线下标。
        stroke: usize,
        /// 点在折线内的下标。
        point: usize,
    },

    /// 固定深度 `z_value` 超出 16 位有符号整数范围。
    #[error("z_value must be in range -32768..=32767, got {value}")]
    DepthOutOfRange {
        /// 调用方传入的深度值。
        value: i32,
    },

    /// 逆变换所用的缩放系数不是严格正数（含 NaN）。
    #[error("scale must be > 0, got {scale}")]
    NonPositiveScale {
        /// 调用方传入的缩放系数，以字符串保存以便 `Eq` 比较 NaN。
        scale: String,
    },

    /// 头部名称字段包含非 ASCII 字符。
    #[error("header field `{field}` must be ASCII")]
    NonAsciiName {
        /// 字段名：`frame_name` 或 `company_name`。
        field: &'static str,
    },

    /// 正文记录数超出头部 16 位计数字段的表示范围。
    #[error("frame needs {records} records but a header can declare at most 65535")]
    TooManyRecords {
        /// 实际需要写出的记录数。
        records: usize,
    },

    /// 剩余字节不足 32 字节，无法读出完整头部。
    #[error("truncated ILDA header at offset {offset}: only {available} bytes left")]
    TruncatedHeader {
        /// 头部起始偏移。
        offset: usize,
        /// 剩余可用字节数。
        available: usize,
    },

    /// 32 字节块不具备 ILDA 头部的形状（魔数或保留字节错误）。
    #[error("invalid ILDA header at offset {offset}: {reason}")]
    InvalidHeader {
        /// 头部起始偏移。
        offset: usize,
        /// 静态说明原因的标签。
        reason: &'static str,
    },

    /// 头部形状合法，但格式码不是解码器支持的 Format 0。
    #[error("unsupported ILDA format {code} at offset {offset} (expected format 0)")]
    UnsupportedFormat {
        /// 头部起始偏移。
        offset: usize,
        /// 实际格式码。
        code: u8,
    },

    /// 头部声明的记录数超出剩余字节。
    #[error(
        "truncated ILDA body at offset {offset}: header declares {declared_records} records, only {available} bytes left"
    )]
    TruncatedBody {
        /// 正文起始偏移。
        offset: usize,
        /// 头部声明的记录数。
        declared_records: u16,
        /// 剩余可用字节数。
        available: usize,
    },

    /// 声明的正文末尾不是下一个头部，且向后扫描也找不到对齐的合法头部。
    #[error("could not find next ILDA header boundary after body starting at {body_start}")]
    BoundaryNotFound {
        /// 当前正文起始偏移。
        body_start: usize,
    },
}

impl IldaError {
    /// 返回错误所属的大类。
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyFrame
            | Self::EmptyStroke { .. }
            | Self::NonFiniteCoordinate { .. }
            | Self::DepthOutOfRange { .. }
            | Self::NonPositiveScale { .. }
            | Self::NonAsciiName { .. }
            | Self::TooManyRecords { .. } => ErrorKind::Validation,
            Self::TruncatedHeader { .. }
            | Self::InvalidHeader { .. }
            | Self::UnsupportedFormat { .. }
            | Self::TruncatedBody { .. }
            | Self::BoundaryNotFound { .. } => ErrorKind::Format,
        }
    }

    pub(crate) fn non_positive_scale(scale: f64) -> Self {
        Self::NonPositiveScale {
            scale: scale.to_string(),
        }
    }
}
