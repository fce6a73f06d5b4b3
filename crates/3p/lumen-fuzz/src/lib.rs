//! lumen-fuzz 公共支持库。
//!
//! # 教案式定位
//! - **Why**：fuzz target 与常规回归测试共用同一套检查逻辑，CI 不依赖 libFuzzer 运行时也能重放样本。
//! - **What**：[`exercise_decoder`] 把任意字节喂给全部解码入口；[`check_roundtrip`] 对任意整数网格几何做
//!   编码 → 解码闭环并断言分段与误差。
//! - **How**：检查失败一律 panic，交由 libFuzzer 记录崩溃样本。

use arbitrary::Arbitrary;
use lumen_codec_ilda::{
    DecodeOptions, EncodeOptions, IldaError, IldaFormat, Point, Stroke, decode_strokes,
    encode_frame, scan_frames, split_frames,
};

/// 任意字节只允许返回结果或错误，不允许 panic。
pub fn exercise_decoder(data: &[u8]) {
    let _ = scan_frames(data);
    let _ = split_frames(data);
    let _ = decode_strokes(data, &DecodeOptions::default());
    let _ = decode_strokes(data, &DecodeOptions::default().with_fold_dwell(true));
}

/// 编码闭环用例：整数网格上的折线，保证坐标有限。
#[derive(Debug, Arbitrary)]
pub struct GeometryCase {
    /// 折线点坐标。
    pub strokes: Vec<Vec<(i16, i16)>>,
    /// 驻留点数量（取低 3 位）。
    pub dwell_points: u8,
    /// 是否写出 Format 1。
    pub two_d: bool,
    /// 是否翻转 Y。
    pub invert_y: bool,
}

/// 编码任意非空几何；Format 0 输出再解码并核对分段与误差。
pub fn check_roundtrip(case: &GeometryCase) {
    let strokes: Vec<Stroke> = case
        .strokes
        .iter()
        .filter(|stroke| !stroke.is_empty())
        .map(|stroke| {
            stroke
                .iter()
                .map(|&(x, y)| Point::new(f64::from(x), f64::from(y)))
                .collect()
        })
        .collect();
    if strokes.is_empty() {
        return;
    }

    let format = if case.two_d {
        IldaFormat::TwoD
    } else {
        IldaFormat::ThreeD
    };
    let options = EncodeOptions::default()
        .with_format(format)
        .with_invert_y(case.invert_y)
        .with_dwell_points(usize::from(case.dwell_points & 0x07));

    let frame = match encode_frame(&strokes, &options) {
        Ok(frame) => frame,
        Err(IldaError::TooManyRecords { .. }) => return,
        Err(other) => panic!("有限非空几何不应编码失败: {other}"),
    };
    assert_eq!(frame.clamped_coordinates(), 0, "缩放计算不应触发裁剪");
    assert_eq!(frame.body().len() % format.record_size(), 0);
    if format == IldaFormat::TwoD {
        return;
    }

    let decoded = decode_strokes(frame.to_bytes(), &frame.decode_options())
        .unwrap_or_else(|err| panic!("自身输出应可解码: {err}"));
    if strokes.iter().any(|stroke| stroke.len() < 2) {
        return;
    }
    assert_eq!(decoded.len(), strokes.len(), "折线条数不一致");
    let tolerance = 0.5 / frame.transform().scale + 1e-6;
    for (restored, original) in decoded.iter().zip(&strokes) {
        assert_eq!(restored.len(), original.len(), "折线点数不一致");
        for (r, o) in restored.iter().zip(original) {
            assert!((r.x - o.x).abs() <= tolerance && (r.y - o.y).abs() <= tolerance);
        }
    }
}
