use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use lumen_codec_ilda::{
    DecodeOptions, EncodeOptions, Point, Stroke, decode_strokes, encode_frame,
};

/// 构造一帧稠密几何：若干条圆周折线，点数接近真实描摹输出。
fn dense_frame(strokes: usize, points_per_stroke: usize) -> Vec<Stroke> {
    (0..strokes)
        .map(|s| {
            let radius = 50.0 + s as f64 * 10.0;
            (0..points_per_stroke)
                .map(|p| {
                    let angle = p as f64 / points_per_stroke as f64 * std::f64::consts::TAU;
                    Point::new(320.0 + radius * angle.cos(), 240.0 + radius * angle.sin())
                })
                .collect()
        })
        .collect()
}

/// 编码与解码一帧约 4000 点的几何。
///
/// # 设计目的（Why）
/// - 激光播放要求每秒数十帧，编码路径不能成为瓶颈；解码路径包含边界确认与约定判定，需要单独观察。
///
/// # 契约说明（What）
/// - 输入在基准外构造，只测量编解码本身。
fn bench_codec(c: &mut Criterion) {
    let strokes = dense_frame(20, 200);
    let options = EncodeOptions::default();
    c.bench_function("encode_frame/20x200", |b| {
        b.iter(|| encode_frame(black_box(&strokes), black_box(&options)))
    });

    let frame = encode_frame(&strokes, &options).expect("基准输入合法");
    let bytes = frame.to_bytes();
    let decode_options = frame.decode_options();
    c.bench_function("decode_strokes/20x200", |b| {
        b.iter(|| decode_strokes(black_box(bytes.clone()), black_box(&decode_options)))
    });
    c.bench_function("decode_strokes/raw", |b| {
        b.iter(|| decode_strokes(black_box(bytes.clone()), &DecodeOptions::default()))
    });
}

criterion_group!(codec_benches, bench_codec);
criterion_main!(codec_benches);
