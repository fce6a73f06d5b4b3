//! 帧解码器：ILDA Format 0 字节流 → 折线列表。
//!
//! # 教案定位（Why）
//! - 调试链路需要把编码结果（或第三方工具产出的 `.ild` 文件）还原成折线，以便与上游几何逐点比对。
//! - 现实中的写出器并不总是如实填写头部记录数（本系统的历史写出器就曾漏计驻留点），
//!   因此解码器把声明的记录数当作提示，再用对齐扫描确认真实边界。
//!
//! # 契约说明（What）
//! - 输入为任意 [`bytes::Buf`]，内含一帧或多帧 Format 0 数据，以记录数为 0 的头部结束；
//!   “输入不是字节缓冲”由类型系统拦截。
//! - 输出为源坐标空间（提供 `scale` 时）或原始 ILDA 整数空间（未提供时）中的折线。
//! - 任何格式错误都会使整次解码失败，不返回部分结果。
//!
//! # 实现策略（How）
//! - 帧扫描是一个显式状态机：
//!
//! ```text
//! ExpectHeader ──count=0──▶ Done
//!      │
//!      ▼
//! ExpectBody ──▶ ConfirmBoundary ──magic 命中──▶ ExpectHeader
//!                      │
//!                      ▼
//!               RecoverBoundary ──对齐扫描命中──▶ ExpectHeader
//! ```
//!
//! - 全部记录收集完毕后，再一次性判定消隐约定（见 [`BlankingConvention`]）并拆分折线。
//!
//! ## 风险提示（Trade-offs）
//! - 边界恢复依赖“下一个头部位于 8 字节对齐处”这一假设；若正文记录恰好拼出合法头部的字节形状，扫描会提前截断。

use core::{mem, ops::Range};

use bytes::Buf;
use tracing::{debug, warn};

use crate::{
    blanking::BlankingConvention,
    error::{IldaError, Result},
    format::{HEADER_LEN, Header, IldaFormat, MAGIC, Record, looks_like_format0_header},
    geometry::{Point, Stroke},
    options::DecodeOptions,
    transform::Transform,
};

const RECORD_LEN: usize = IldaFormat::ThreeD.record_size();

/// 单帧的扫描结果，描述头部与正文在输入中的位置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    /// 头部起始偏移。
    pub header_offset: usize,
    /// 解析出的头部。
    pub header: Header,
    /// 正文字节范围（已确认或恢复的真实边界）。
    pub body: Range<usize>,
    /// 声明的记录数与真实边界不符，正文边界由对齐扫描恢复。
    pub recovered: bool,
}

impl FrameInfo {
    /// 头部声明的记录数。
    #[must_use]
    pub fn declared_records(&self) -> u16 {
        self.header.record_count()
    }

    /// 正文实际包含的记录数。
    #[must_use]
    pub fn actual_records(&self) -> usize {
        self.body.len() / RECORD_LEN
    }

    /// 从原始输入中读出本帧的全部记录。
    pub fn records<'a>(&self, data: &'a [u8]) -> impl Iterator<Item = Record> + use<'a> {
        let body = data.get(self.body.clone()).unwrap_or_default();
        let (records, _) = body.as_chunks::<RECORD_LEN>();
        records.iter().map(Record::decode_format0)
    }
}

/// 已读完头部、尚未确认正文边界的帧。
struct PendingFrame {
    header_offset: usize,
    header: Header,
    body_start: usize,
    expected_end: usize,
}

impl PendingFrame {
    fn finish(self, body_end: usize, recovered: bool) -> FrameInfo {
        FrameInfo {
            header_offset: self.header_offset,
            header: self.header,
            body: self.body_start..body_end,
            recovered,
        }
    }
}

enum ScanState {
    ExpectHeader { offset: usize },
    ExpectBody { header_offset: usize, header: Header },
    ConfirmBoundary(PendingFrame),
    RecoverBoundary(PendingFrame),
    Done,
}

/// 扫描输入中的全部帧，返回每帧的头部与正文位置，不做折线拆分。
///
/// # 错误（What）
/// - `TruncatedHeader`：剩余字节不足一个头部；
/// - `InvalidHeader` / `UnsupportedFormat`：头部形状错误或不是 Format 0；
/// - `TruncatedBody`：声明的记录数超出剩余字节；
/// - `BoundaryNotFound`：声明的正文末尾不是头部，且向后找不到对齐的 Format 0 头部。
pub fn scan_frames(data: &[u8]) -> Result<Vec<FrameInfo>> {
    let mut frames = Vec::new();
    let mut state = ScanState::ExpectHeader { offset: 0 };

    loop {
        state = match state {
            ScanState::ExpectHeader { offset } => {
                let remaining = data.get(offset..).unwrap_or_default();
                let header = match Header::parse(remaining, offset)? {
                    header @ Header::Format0(_) => header,
                    Header::Format1(_) => {
                        return Err(IldaError::UnsupportedFormat {
                            offset,
                            code: IldaFormat::TwoD.code(),
                        });
                    }
                };
                if header.is_end_of_stream() {
                    ScanState::Done
                } else {
                    ScanState::ExpectBody {
                        header_offset: offset,
                        header,
                    }
                }
            }
            ScanState::ExpectBody {
                header_offset,
                header,
            } => {
                let body_start = header_offset + HEADER_LEN;
                let declared = header.record_count();
                let expected_end = body_start + usize::from(declared) * RECORD_LEN;
                if expected_end > data.len() {
                    return Err(IldaError::TruncatedBody {
                        offset: body_start,
                        declared_records: declared,
                        available: data.len().saturating_sub(body_start),
                    });
                }
                ScanState::ConfirmBoundary(PendingFrame {
                    header_offset,
                    header,
                    body_start,
                    expected_end,
                })
            }
            ScanState::ConfirmBoundary(pending) => {
                let at = pending.expected_end;
                if data.get(at..at + MAGIC.len()) == Some(MAGIC.as_slice()) {
                    frames.push(pending.finish(at, false));
                    ScanState::ExpectHeader { offset: at }
                } else {
                    ScanState::RecoverBoundary(pending)
                }
            }
            ScanState::RecoverBoundary(pending) => {
                let body_start = pending.body_start;
                let Some(body_end) = find_next_header(data, body_start, pending.expected_end)
                else {
                    return Err(IldaError::BoundaryNotFound { body_start });
                };
                let frame = pending.finish(body_end, true);
                warn!(
                    header_offset = frame.header_offset,
                    declared = frame.declared_records(),
                    actual = frame.actual_records(),
                    "ILDA 头部记录数与正文不符，已按对齐扫描恢复帧边界"
                );
                frames.push(frame);
                ScanState::ExpectHeader { offset: body_end }
            }
            ScanState::Done => return Ok(frames),
        };
    }
}

/// 从 `search_from` 起寻找下一个相对 `body_start` 按记录对齐、且具备 Format 0 头部形状的位置。
fn find_next_header(data: &[u8], body_start: usize, search_from: usize) -> Option<usize> {
    let first = search_from.max(body_start);
    let aligned = body_start + (first - body_start).div_ceil(RECORD_LEN) * RECORD_LEN;
    let last_candidate = (data.len() + 1).checked_sub(HEADER_LEN)?;
    (aligned..last_candidate)
        .step_by(RECORD_LEN)
        .find(|&candidate| looks_like_format0_header(&data[candidate..]))
}

/// 把 ILDA Format 0 字节流解码为折线列表。
///
/// # 实现细节（How）
/// 1. 校验 `options` 中的逆变换参数（`scale` 必须为正）；
/// 2. 扫描所有帧并收集 `(x, y, status)`；
/// 3. 对整条流判定一次消隐约定；
/// 4. 遇到消隐位且当前折线非空时切分，末尾非空折线补齐输出；
/// 5. 按需把坐标逆变换回源空间，并按需折叠驻留点。
pub fn decode_strokes(mut data: impl Buf, options: &DecodeOptions) -> Result<Vec<Stroke>> {
    let transform = options.transform()?;
    let bytes = data.copy_to_bytes(data.remaining());

    let frames = scan_frames(&bytes)?;
    let records: Vec<Record> = frames
        .iter()
        .flat_map(|frame| frame.records(&bytes))
        .collect();
    let statuses: Vec<u8> = records.iter().map(|record| record.status).collect();
    let convention = BlankingConvention::resolve(&statuses);
    debug!(
        ?convention,
        frames = frames.len(),
        records = records.len(),
        "ILDA 消隐约定判定完成"
    );

    let strokes = split_records(&records, convention, transform.as_ref());
    Ok(if options.fold_dwell {
        fold_dwell(strokes)
    } else {
        strokes
    })
}

fn split_records(
    records: &[Record],
    convention: BlankingConvention,
    transform: Option<&Transform>,
) -> Vec<Stroke> {
    let mut strokes = Vec::new();
    let mut current = Stroke::new();
    for record in records {
        if convention.starts_stroke(record.status) && !current.is_empty() {
            strokes.push(mem::take(&mut current));
        }
        current.push(restore(record, transform));
    }
    if !current.is_empty() {
        strokes.push(current);
    }
    strokes
}

fn restore(record: &Record, transform: Option<&Transform>) -> Point {
    match transform {
        Some(transform) => {
            let (x, y) = transform.restore(record.x, record.y);
            Point::new(x, y)
        }
        None => Point::new(f64::from(record.x), f64::from(record.y)),
    }
}

/// 折叠驻留点：丢弃“只有一个点且与上一条保留折线末点重合”的折线。
///
/// 编码器在每条折线后追加的驻留点在 `0x40` 约定下会被拆成若干单点折线，折叠后即可得到原始的几何分段。
/// 上游本就存在的、与前一折线末点重合的单点折线也会被一并丢弃。
#[must_use]
pub fn fold_dwell(strokes: Vec<Stroke>) -> Vec<Stroke> {
    let mut folded: Vec<Stroke> = Vec::with_capacity(strokes.len());
    for stroke in strokes {
        let previous_end = folded.last().and_then(|kept| kept.last());
        let repeats_previous = matches!(stroke.as_slice(), [only] if Some(only) == previous_end);
        if !repeats_previous {
            folded.push(stroke);
        }
    }
    folded
}
