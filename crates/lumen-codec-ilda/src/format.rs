//! ILDA 线格式：头部、点记录与状态位。
//!
//! # 教案定位（Why）
//! - 把固定宽度的二进制布局集中在一个模块，编码器和解码器都只通过这里读写字节，避免偏移量散落各处。
//! - Format 0（3D）与 Format 1（2D）头部的字段偏移并不相同，使用带标签的 [`Header`] 枚举分别描述，
//!   防止“把 Format 0 的偏移拿去读 Format 1”这类错误。
//!
//! # 契约说明（What）
//! - 所有多字节字段均为大端序。
//! - Format 0 头部（32 字节）：
//!
//! ```text
//! 0      4        7      8           16            24      26       28       30        32
//! │ILDA  │00 00 00│ code │ frame name │ company name│ count │ frame# │ total  │ scanner │
//! ```
//!
//! - Format 1 头部沿用本系统写出器的历史布局：字节 4..7 为 `00 01 00`，名称字段紧随其后从偏移 7 开始，
//!   记录数位于 23，帧号 25，总帧数 27，扫描头 29，30..32 保留。
//! - 点记录：Format 0 为 `X Y Z status color`（8 字节），Format 1 为 `X Y status color`（6 字节）。

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use crate::error::{IldaError, Result};

/// 头部魔数。
pub const MAGIC: &[u8; 4] = b"ILDA";

/// 头部固定长度。
pub const HEADER_LEN: usize = 32;

/// 名称字段（帧名、公司名）的固定长度。
pub const NAME_LEN: usize = 8;

/// 状态字节的位定义。
pub mod status {
    /// 标准中的消隐位（激光关闭）。
    pub const BLANKING: u8 = 0b1000_0000;
    /// 标准中的“最后一点”位；本系统的编码器把它用作折线起点与驻留点标记。
    pub const LAST_POINT: u8 = 0b0100_0000;
    /// 编码器写在整帧最后一条记录上的帧结束标记。
    pub const END_OF_FRAME: u8 = BLANKING | LAST_POINT;

    /// 判断 `status` 是否包含 `flag` 中的任意位。
    #[inline]
    pub fn has_flag(status: u8, flag: u8) -> bool {
        status & flag != 0
    }
}

/// 编码器可写出的 ILDA 坐标格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IldaFormat {
    /// Format 0：三维坐标，8 字节记录。
    #[default]
    ThreeD,
    /// Format 1：二维坐标，6 字节记录。
    TwoD,
}

impl IldaFormat {
    /// 头部中的格式码。
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::ThreeD => 0,
            Self::TwoD => 1,
        }
    }

    /// 单条点记录的字节数。
    #[must_use]
    pub const fn record_size(self) -> usize {
        match self {
            Self::ThreeD => 8,
            Self::TwoD => 6,
        }
    }
}

/// 两种头部共享的字段集合。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderFields {
    /// 帧名（ASCII，最多 8 字节）。
    pub frame_name: String,
    /// 公司名（ASCII，最多 8 字节）。
    pub company_name: String,
    /// 声明的记录数；为 0 时该头部是流结束标记。
    pub record_count: u16,
    /// 帧序号。
    pub frame_number: u16,
    /// 文件中的总帧数。
    pub total_frames: u16,
    /// 扫描头编号。
    pub scanner_head: u8,
}

/// 每种头部的字段偏移表。
struct Layout {
    prefix: [u8; 4],
    name: usize,
    company: usize,
    count: usize,
    frame: usize,
    total: usize,
    scanner: usize,
}

const FORMAT0_LAYOUT: Layout = Layout {
    prefix: [0, 0, 0, 0],
    name: 8,
    company: 16,
    count: 24,
    frame: 26,
    total: 28,
    scanner: 30,
};

const FORMAT1_LAYOUT: Layout = Layout {
    prefix: [0, 1, 0, 0],
    name: 7,
    company: 15,
    count: 23,
    frame: 25,
    total: 27,
    scanner: 29,
};

/// ILDA 帧头部，按格式区分字段布局。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    /// Format 0（3D）头部。
    Format0(HeaderFields),
    /// Format 1（2D）头部。
    Format1(HeaderFields),
}

impl Header {
    /// 以指定格式包装字段。
    #[must_use]
    pub fn new(format: IldaFormat, fields: HeaderFields) -> Self {
        match format {
            IldaFormat::ThreeD => Self::Format0(fields),
            IldaFormat::TwoD => Self::Format1(fields),
        }
    }

    /// 头部对应的坐标格式。
    #[must_use]
    pub fn format(&self) -> IldaFormat {
        match self {
            Self::Format0(_) => IldaFormat::ThreeD,
            Self::Format1(_) => IldaFormat::TwoD,
        }
    }

    /// 共享字段的只读视图。
    #[must_use]
    pub fn fields(&self) -> &HeaderFields {
        match self {
            Self::Format0(fields) | Self::Format1(fields) => fields,
        }
    }

    /// 声明的记录数。
    #[must_use]
    pub fn record_count(&self) -> u16 {
        self.fields().record_count
    }

    /// 是否为流结束标记（记录数为 0）。
    #[must_use]
    pub fn is_end_of_stream(&self) -> bool {
        self.record_count() == 0
    }

    fn layout(&self) -> &'static Layout {
        match self {
            Self::Format0(_) => &FORMAT0_LAYOUT,
            Self::Format1(_) => &FORMAT1_LAYOUT,
        }
    }

    /// 序列化为 32 字节。
    ///
    /// 名称字段中的非 ASCII 内容会被拒绝，超过 8 字节的部分被截断，不足部分以 NUL 填充。
    pub fn to_bytes(&self) -> Result<[u8; HEADER_LEN]> {
        let layout = self.layout();
        let fields = self.fields();
        let mut out = [0u8; HEADER_LEN];

        out[..4].copy_from_slice(MAGIC);
        out[4..8].copy_from_slice(&layout.prefix);
        write_name(&mut out, layout.name, &fields.frame_name, "frame_name")?;
        write_name(&mut out, layout.company, &fields.company_name, "company_name")?;
        out[layout.count..layout.count + 2].copy_from_slice(&fields.record_count.to_be_bytes());
        out[layout.frame..layout.frame + 2].copy_from_slice(&fields.frame_number.to_be_bytes());
        out[layout.total..layout.total + 2].copy_from_slice(&fields.total_frames.to_be_bytes());
        out[layout.scanner] = fields.scanner_head;

        Ok(out)
    }

    /// 追加写入到任意 [`BufMut`]。
    pub fn encode(&self, out: &mut impl BufMut) -> Result<()> {
        out.put_slice(&self.to_bytes()?);
        Ok(())
    }

    /// 从 `data` 的开头解析一个头部；`offset` 仅用于错误信息。
    ///
    /// # 识别规则（How）
    /// 1. 不足 32 字节 → `TruncatedHeader`；
    /// 2. 魔数不是 `ILDA` → `InvalidHeader`；
    /// 3. 字节 4..7 全零：格式码为 0 → `Format0`，其它格式码 → `UnsupportedFormat`；
    /// 4. 字节 4..7 为 `00 01 00` → 历史布局的 `Format1`；
    /// 5. 其余形状 → `InvalidHeader`。
    pub fn parse(data: &[u8], offset: usize) -> Result<Self> {
        let Some(raw) = data.get(..HEADER_LEN) else {
            return Err(IldaError::TruncatedHeader {
                offset,
                available: data.len(),
            });
        };

        if &raw[..4] != MAGIC {
            return Err(IldaError::InvalidHeader {
                offset,
                reason: "magic is not `ILDA`",
            });
        }

        match &raw[4..7] {
            [0, 0, 0] => match raw[7] {
                0 => Ok(Self::Format0(read_fields(raw, &FORMAT0_LAYOUT))),
                code => Err(IldaError::UnsupportedFormat { offset, code }),
            },
            [0, 1, 0] => Ok(Self::Format1(read_fields(raw, &FORMAT1_LAYOUT))),
            _ => Err(IldaError::InvalidHeader {
                offset,
                reason: "reserved bytes 4..7 must be zero",
            }),
        }
    }
}

/// 快速判断一个候选块是否为 Format 0 头部（魔数 + 三个零字节 + 格式码 0）。
#[must_use]
pub fn looks_like_format0_header(candidate: &[u8]) -> bool {
    candidate.len() >= HEADER_LEN
        && &candidate[..4] == MAGIC
        && candidate[4..8] == [0, 0, 0, 0]
}

fn write_name(
    out: &mut [u8; HEADER_LEN],
    at: usize,
    name: &str,
    field: &'static str,
) -> Result<()> {
    if !name.is_ascii() {
        return Err(IldaError::NonAsciiName { field });
    }
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_LEN);
    out[at..at + len].copy_from_slice(&bytes[..len]);
    Ok(())
}

fn read_fields(raw: &[u8], layout: &Layout) -> HeaderFields {
    HeaderFields {
        frame_name: read_name(&raw[layout.name..layout.name + NAME_LEN]),
        company_name: read_name(&raw[layout.company..layout.company + NAME_LEN]),
        record_count: read_u16(raw, layout.count),
        frame_number: read_u16(raw, layout.frame),
        total_frames: read_u16(raw, layout.total),
        scanner_head: raw[layout.scanner],
    }
}

fn read_name(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn read_u16(raw: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([raw[at], raw[at + 1]])
}

/// 单条点记录（ILDA 整数空间）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Record {
    /// X（有符号 16 位）。
    pub x: i16,
    /// Y（有符号 16 位）。
    pub y: i16,
    /// Z（仅 Format 0 写出）。
    pub z: i16,
    /// 状态字节，见 [`status`]。
    pub status: u8,
    /// 调色板索引；单色编码器恒为 0。
    pub color: u8,
}

impl Record {
    /// 按指定格式追加写入。
    pub fn encode(&self, format: IldaFormat, out: &mut impl BufMut) {
        out.put_i16(self.x);
        out.put_i16(self.y);
        if format == IldaFormat::ThreeD {
            out.put_i16(self.z);
        }
        out.put_u8(self.status);
        out.put_u8(self.color);
    }

    /// 从 8 字节 Format 0 记录解码。
    #[must_use]
    pub fn decode_format0(raw: &[u8; 8]) -> Self {
        Self {
            x: i16::from_be_bytes([raw[0], raw[1]]),
            y: i16::from_be_bytes([raw[2], raw[3]]),
            z: i16::from_be_bytes([raw[4], raw[5]]),
            status: raw[6],
            color: raw[7],
        }
    }
}
