//! 编解码性质验证
//!
//! # 教案级注释概览
//!
//! - **核心目标 (Why)**：用随机几何覆盖编码器与解码器之间的不变式，而不是罗列手写样例。
//! - **性质清单 (What)**：
//!   1. 有限输入下缩放计算正确，裁剪从不触发；
//!   2. 编码输出的最后一个头部记录数为 0；
//!   3. 正文长度是记录尺寸的整数倍，且与头部记录数一致；
//!   4. 以编码器自身参数解码，坐标误差不超过 `0.5 / scale`，折线分段保持不变；
//!   5. 标准 `0x80` 约定与本系统 `0x40` 约定描述同一组点时，解码得到相同分段；
//!   6. 任意字节输入只会返回结果或错误，不会 panic。
//! - **设计考量 (Trade-offs)**：性质 4 要求每条折线至少两个点，否则驻留点折叠无法区分“单点折线”与“驻留点”。

use lumen_codec_ilda::{
    DecodeOptions, EncodeOptions, HEADER_LEN, Header, HeaderFields, IldaFormat, Point, Record,
    Stroke, decode_strokes, encode_frame,
};
use proptest::prelude::*;

fn coordinate() -> impl Strategy<Value = f64> {
    -1.0e6..1.0e6
}

fn point() -> impl Strategy<Value = Point> {
    (coordinate(), coordinate()).prop_map(|(x, y)| Point::new(x, y))
}

fn strokes(min_points: usize) -> impl Strategy<Value = Vec<Stroke>> {
    prop::collection::vec(prop::collection::vec(point(), min_points..8), 1..6)
}

fn format() -> impl Strategy<Value = IldaFormat> {
    prop_oneof![Just(IldaFormat::ThreeD), Just(IldaFormat::TwoD)]
}

fn encode_options() -> impl Strategy<Value = EncodeOptions> {
    (format(), any::<i16>(), any::<bool>(), 0usize..6).prop_map(
        |(format, z, invert_y, dwell)| {
            EncodeOptions::default()
                .with_format(format)
                .with_z_value(i32::from(z))
                .with_invert_y(invert_y)
                .with_dwell_points(dwell)
        },
    )
}

/// 手工拼装单帧 Format 0 流（记录数如实填写），附带结束标记。
fn raw_stream(records: &[Record]) -> Vec<u8> {
    let mut out = Vec::new();
    let count = u16::try_from(records.len()).expect("记录数很小");
    Header::Format0(HeaderFields {
        record_count: count,
        ..HeaderFields::default()
    })
    .encode(&mut out)
    .expect("空名称");
    for record in records {
        record.encode(IldaFormat::ThreeD, &mut out);
    }
    Header::Format0(HeaderFields::default())
        .encode(&mut out)
        .expect("空名称");
    out
}

fn integer_strokes() -> impl Strategy<Value = Vec<Vec<(i16, i16)>>> {
    prop::collection::vec(
        prop::collection::vec((any::<i16>(), any::<i16>()), 1..5),
        1..5,
    )
    .prop_filter("至少两条记录", |strokes| {
        strokes.iter().map(Vec::len).sum::<usize>() >= 2
    })
}

/// 以给定的“折线起点状态位”把整数折线展开成记录。
fn mark_starts(strokes: &[Vec<(i16, i16)>], start_status: u8) -> Vec<Record> {
    strokes
        .iter()
        .flat_map(|stroke| {
            stroke.iter().enumerate().map(move |(index, &(x, y))| Record {
                x,
                y,
                z: 0,
                status: if index == 0 { start_status } else { 0x00 },
                color: 0,
            })
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_finite_input_never_clamps(input in strokes(1), options in encode_options()) {
        let frame = encode_frame(&input, &options).expect("合法输入");
        prop_assert_eq!(frame.clamped_coordinates(), 0);
    }

    #[test]
    fn prop_stream_ends_with_zero_count_header(input in strokes(1), options in encode_options()) {
        let bytes = encode_frame(&input, &options).expect("合法输入").to_bytes();
        let footer = Header::parse(&bytes[bytes.len() - HEADER_LEN..], bytes.len() - HEADER_LEN)
            .expect("结束标记可解析");
        prop_assert_eq!(footer.record_count(), 0);
        prop_assert_eq!(footer.format(), options.format);
    }

    #[test]
    fn prop_record_count_matches_body(input in strokes(1), options in encode_options()) {
        let frame = encode_frame(&input, &options).expect("合法输入");
        let size = options.format.record_size();
        prop_assert_eq!(frame.body().len() % size, 0);

        let header = Header::parse(frame.header(), 0).expect("头部可解析");
        prop_assert_eq!(usize::from(header.record_count()), frame.record_count());

        let geometric: usize = input.iter().map(Vec::len).sum();
        prop_assert_eq!(frame.record_count(), geometric + input.len() * options.dwell_points);
    }

    #[test]
    fn prop_round_trip_is_bounded_and_keeps_partition(
        input in strokes(2),
        options in encode_options().prop_map(|o| o.with_format(IldaFormat::ThreeD)),
    ) {
        let frame = encode_frame(&input, &options).expect("合法输入");
        let decoded = decode_strokes(frame.to_bytes(), &frame.decode_options()).expect("自身输出可解码");

        prop_assert_eq!(decoded.len(), input.len());
        let tolerance = 0.5 / frame.transform().scale + 1e-6;
        for (restored, original) in decoded.iter().zip(&input) {
            prop_assert_eq!(restored.len(), original.len());
            for (r, o) in restored.iter().zip(original) {
                prop_assert!((r.x - o.x).abs() <= tolerance, "x: {} vs {}", r.x, o.x);
                prop_assert!((r.y - o.y).abs() <= tolerance, "y: {} vs {}", r.y, o.y);
            }
        }
    }

    #[test]
    fn prop_conventions_agree_on_partition(input in integer_strokes()) {
        let spec_bit = raw_stream(&mark_starts(&input, 0x80));
        let start_bit = raw_stream(&mark_starts(&input, 0x40));

        let expected: Vec<Stroke> = input
            .iter()
            .map(|stroke| {
                stroke
                    .iter()
                    .map(|&(x, y)| Point::new(f64::from(x), f64::from(y)))
                    .collect()
            })
            .collect();
        let options = DecodeOptions::default();
        prop_assert_eq!(&decode_strokes(spec_bit.as_slice(), &options).expect("合法流"), &expected);
        prop_assert_eq!(&decode_strokes(start_bit.as_slice(), &options).expect("合法流"), &expected);
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(tail in prop::collection::vec(any::<u8>(), 0..256), with_magic in any::<bool>()) {
        let mut data = Vec::new();
        if with_magic {
            data.extend_from_slice(b"ILDA\0\0\0\0");
        }
        data.extend(tail);
        let _ = decode_strokes(data.as_slice(), &DecodeOptions::default());
    }
}
