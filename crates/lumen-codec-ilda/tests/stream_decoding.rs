//! 第三方字节流的解码行为：边界恢复、消隐约定判定与多帧粗切分。
//!
//! 测试流均手工拼装，用来模拟记录数填写错误的写出器以及遵循标准 `0x80` 消隐位的工具。

use lumen_codec_ilda::{
    DecodeOptions, ErrorKind, HEADER_LEN, Header, HeaderFields, IldaError, IldaFormat, Record,
    decode_strokes, scan_frames, split_frames, stroke_from_xy,
};

/// 逐帧拼装 Format 0 流：`(声明记录数, [(x, y, status)])`，末尾追加结束标记。
fn build_stream(frames: &[(u16, &[(i16, i16, u8)])]) -> Vec<u8> {
    let mut out = Vec::new();
    for (index, (declared, records)) in frames.iter().enumerate() {
        let header = Header::Format0(HeaderFields {
            frame_name: format!("F{index}"),
            company_name: "TOOL".into(),
            record_count: *declared,
            frame_number: u16::try_from(index).expect("帧数很小"),
            total_frames: u16::try_from(frames.len()).expect("帧数很小"),
            scanner_head: 0,
        });
        header.encode(&mut out).expect("ASCII 名称");
        for &(x, y, status) in *records {
            Record {
                x,
                y,
                z: 0,
                status,
                color: 0,
            }
            .encode(IldaFormat::ThreeD, &mut out);
        }
    }
    Header::Format0(HeaderFields::default())
        .encode(&mut out)
        .expect("空名称");
    out
}

#[test]
fn undercounted_header_still_splits_at_true_boundary() {
    let first: &[(i16, i16, u8)] = &[(0, 0, 0x00), (10, 0, 0x00), (20, 0, 0x00)];
    let second: &[(i16, i16, u8)] = &[(0, 10, 0x80), (10, 10, 0x00)];
    // 第一帧声明 2 条记录，实际写了 3 条。
    let data = build_stream(&[(2, first), (2, second)]);

    let frames = scan_frames(&data).expect("可恢复");
    assert_eq!(frames.len(), 2);
    assert!(frames[0].recovered);
    assert_eq!(frames[0].actual_records(), 3);
    assert!(!frames[1].recovered);
    assert_eq!(frames[1].header_offset, HEADER_LEN + 3 * 8);
    assert_eq!(frames[1].header.fields().frame_name, "F1");

    let strokes = decode_strokes(data.as_slice(), &DecodeOptions::default()).expect("可恢复");
    assert_eq!(
        strokes,
        vec![
            stroke_from_xy(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]),
            stroke_from_xy(&[(0.0, 10.0), (10.0, 10.0)]),
        ]
    );
}

#[test]
fn misaligned_magic_is_not_taken_as_boundary() {
    // 第二条记录的 y 字段写成 "IL"，再把 z 字段改写成 "DA"，在记录内偏移 2 处拼出未对齐的 "ILDA"。
    let tricky: &[(i16, i16, u8)] = &[(0, 0, 0x00), (0, 0x494C, 0x00), (0, 0, 0x00)];
    let mut data = build_stream(&[(1, tricky)]);
    let second_record = HEADER_LEN + 8;
    data[second_record + 4..second_record + 6].copy_from_slice(b"DA");
    assert_eq!(&data[second_record + 2..second_record + 6], b"ILDA");
    let frames = scan_frames(&data).expect("可恢复");
    assert_eq!(frames[0].actual_records(), 3);
}

#[test]
fn unrecoverable_boundary_is_format_error() {
    let mut data = build_stream(&[(1, &[(0, 0, 0x00), (1, 1, 0x00)])]);
    data.truncate(data.len() - HEADER_LEN);
    let err = scan_frames(&data).expect_err("没有结束标记");
    assert_eq!(err, IldaError::BoundaryNotFound { body_start: 32 });
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn truncated_inputs_are_format_errors() {
    let data = build_stream(&[(4, &[(0, 0, 0x00)])]);
    let err = decode_strokes(&data[..HEADER_LEN + 8], &DecodeOptions::default())
        .expect_err("正文不足");
    assert_eq!(
        err,
        IldaError::TruncatedBody {
            offset: 32,
            declared_records: 4,
            available: 8
        }
    );

    let err = decode_strokes(&data[..20], &DecodeOptions::default()).expect_err("头部不足");
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn bad_magic_is_format_error() {
    let mut data = build_stream(&[(1, &[(0, 0, 0x00)])]);
    data[..4].copy_from_slice(b"ILDB");
    assert!(matches!(
        scan_frames(&data),
        Err(IldaError::InvalidHeader { offset: 0, .. })
    ));
}

#[test]
fn both_conventions_yield_the_same_partition() {
    let spec_bit: &[(i16, i16, u8)] = &[(0, 0, 0x00), (10, 0, 0x00), (0, 10, 0x80), (10, 10, 0x00)];
    let start_bit: &[(i16, i16, u8)] = &[(0, 0, 0x40), (10, 0, 0x00), (0, 10, 0x40), (10, 10, 0x00)];

    let decode = |records: &[(i16, i16, u8)]| {
        decode_strokes(
            build_stream(&[(4, records)]).as_slice(),
            &DecodeOptions::default(),
        )
        .expect("合法流")
    };
    let expected = vec![
        stroke_from_xy(&[(0.0, 0.0), (10.0, 0.0)]),
        stroke_from_xy(&[(0.0, 10.0), (10.0, 10.0)]),
    ];
    assert_eq!(decode(spec_bit), expected);
    assert_eq!(decode(start_bit), expected);
}

#[test]
fn blanking_is_resolved_across_all_frames() {
    // 0x40 只出现在第一帧；判定针对整条流进行，第二帧同样按 0x40 拆分。
    let first: &[(i16, i16, u8)] = &[(0, 0, 0x40), (1, 0, 0x00)];
    let second: &[(i16, i16, u8)] = &[(2, 0, 0x00), (3, 0, 0x40), (4, 0, 0x00)];
    let data = build_stream(&[(2, first), (3, second)]);
    let strokes = decode_strokes(data.as_slice(), &DecodeOptions::default()).expect("合法流");
    assert_eq!(
        strokes,
        vec![
            stroke_from_xy(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
            stroke_from_xy(&[(3.0, 0.0), (4.0, 0.0)]),
        ]
    );
}

#[test]
fn splitter_returns_frames_but_not_the_terminator() {
    let data = build_stream(&[(1, &[(0, 0, 0x00)]), (2, &[(1, 1, 0x00), (2, 2, 0x00)])]);
    let frames = split_frames(&data);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].len(), HEADER_LEN + 8);
    assert_eq!(frames[1].len(), HEADER_LEN + 16);
    assert!(frames.iter().all(|frame| frame.starts_with(b"ILDA")));
}
