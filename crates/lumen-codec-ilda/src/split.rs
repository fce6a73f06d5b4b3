//! 多帧粗切分：按 `ILDA\0\0\0` 字节模式把文件切成若干帧切片。
//!
//! 仅供调试工具快速浏览多帧文件使用：不校验头部内容、不检查记录数与对齐，
//! 第一段从偏移 0 开始，最后一次出现之后的尾部（通常是结束标记）不返回。
//! 需要可靠边界时请使用 [`scan_frames`](crate::scan_frames)。

use core::ops::Range;

/// 帧分隔模式：魔数加三个保留零字节。
pub const FRAME_PATTERN: &[u8; 7] = b"ILDA\0\0\0";

/// 返回相邻两次模式出现之间的字节范围。
#[must_use]
pub fn split_frame_ranges(data: &[u8]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    while let Some(next) = find_pattern(data, start + 1) {
        ranges.push(start..next);
        start = next;
    }
    ranges
}

/// 与 [`split_frame_ranges`] 相同，但直接返回切片。
#[must_use]
pub fn split_frames(data: &[u8]) -> Vec<&[u8]> {
    split_frame_ranges(data)
        .into_iter()
        .map(|range| &data[range])
        .collect()
}

fn find_pattern(data: &[u8], from: usize) -> Option<usize> {
    data.get(from..)?
        .windows(FRAME_PATTERN.len())
        .position(|window| window == FRAME_PATTERN)
        .map(|pos| from + pos)
}
