use expect_test::expect;

use crate::ErrorKind;

use super::*;

fn achromatic(baseline: URational, alternate: URational, channel: ChannelRecord) -> GainMapMetadata {
    GainMapMetadata {
        minimum_version: 0,
        writer_version: 0,
        is_multichannel: false,
        use_base_colour_space: false,
        reserved_flags: 0,
        hdr_headroom: HdrHeadroom {
            baseline,
            alternate,
        },
        channels: vec![channel],
    }
}

fn channel(min: i32, max: i32) -> ChannelRecord {
    ChannelRecord {
        gain_map_min: Rational::new(min, 4),
        gain_map_max: Rational::new(max, 4),
        gamma: Rational::new(1, 1),
        base_offset: Rational::new(1, 64),
        alternate_offset: Rational::new(1, 64),
    }
}

/// Assembles an `APP2` segment field by field, independently of the encoder.
fn raw_segment(urn: &[u8], flags: u8, rationals: &[(u32, u32)]) -> Vec<u8> {
    let mut payload = Vec::new();
    let mut urn_field = [0; 28];
    urn_field[..urn.len()].copy_from_slice(urn);
    payload.extend_from_slice(&urn_field);
    payload.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]);
    payload.push(flags);
    for &(numerator, denominator) in rationals {
        payload.extend_from_slice(&numerator.to_be_bytes());
        payload.extend_from_slice(&denominator.to_be_bytes());
    }

    let mut segment = vec![0xFF, 0xE2];
    segment.extend_from_slice(&(payload.len() as u16 + 2).to_be_bytes());
    segment.extend(payload);
    segment
}

#[test]
fn xmp() {
    let mut payload = XMP_IDENTIFIER.to_vec();
    payload.extend_from_slice(b"<x:xmpmeta/>");
    assert_eq!(decode_xmp(&payload), Some(&b"<x:xmpmeta/>"[..]));
    assert_eq!(decode_xmp(XMP_IDENTIFIER), Some(&[][..]));

    assert_eq!(decode_xmp(b"Exif\0\0MM\0*"), None);
    assert_eq!(decode_xmp(b"http://ns.adobe.com/xap/1.0/"), None);
    assert_eq!(decode_xmp(b""), None);
}

#[test]
fn xmp_segment() {
    let segment = encode_xmp_segment(b"abc").unwrap();
    assert_eq!(&segment[..4], &[0xFF, 0xE1, 0x00, 0x22]);
    assert_eq!(decode_xmp(&segment[4..]), Some(&b"abc"[..]));

    assert!(encode_xmp_segment(&vec![b' '; 65535]).is_none());
}

#[test]
fn rational_values() {
    assert_eq!(URational::new(10, 5).value(), 2.0);
    assert_eq!(SRational::new(-2, 4).value(), -0.5);
    assert_eq!(URational::new(u32::MAX, 1).value(), 4294967295.0);

    assert_eq!(SRational::new(7, 0).value(), f64::INFINITY);
    assert_eq!(SRational::new(-7, 0).value(), f64::NEG_INFINITY);
    assert_eq!(SRational::new(0, 0).value(), 0.0);
    assert_eq!(URational::new(7, 0).value(), f64::INFINITY);
    assert_eq!(URational::new(0, 0).value(), 0.0);
}

#[test]
fn gainmap_roundtrip() {
    let metadata = achromatic(
        Rational::new(10, 5),
        Rational::new(3, 1),
        ChannelRecord {
            gain_map_min: Rational::new(-2, 4),
            ..channel(0, 8)
        },
    );
    let segment = metadata.encode().unwrap();
    assert_eq!(segment.len(), 93);
    assert_eq!(segment.len(), metadata.encoded_len());

    let decoded = decode_gainmap(&segment).unwrap();
    assert_eq!(decoded.declared_length, 91);
    assert!(decoded.warnings.is_empty());

    let metadata = decoded.metadata;
    assert_eq!(metadata.hdr_headroom.baseline.value(), 2.0);
    assert_eq!(metadata.hdr_headroom.alternate.value(), 3.0);
    assert_eq!(metadata.channels.len(), 1);
    assert_eq!(metadata.channels[0].gain_map_min.value(), -0.5);
    assert_eq!(metadata.channels[0].gain_map_max.value(), 2.0);

    // Decoding the same bytes twice yields the same result.
    assert_eq!(decode_gainmap(&segment).unwrap().metadata, metadata);
}

#[test]
fn gainmap_multichannel() {
    let metadata = GainMapMetadata {
        minimum_version: 0,
        writer_version: 3,
        is_multichannel: true,
        use_base_colour_space: true,
        reserved_flags: 0x15,
        hdr_headroom: HdrHeadroom {
            baseline: Rational::new(0, 1),
            alternate: Rational::new(5, 2),
        },
        channels: vec![channel(-1, 4), channel(-2, 8), channel(-3, 12)],
    };
    let segment = metadata.encode().unwrap();
    assert_eq!(segment.len(), 4 + 28 + 4 + 1 + 16 + 40 * 3);
    assert_eq!(segment[36], 0xD5);

    let decoded = decode_gainmap(&segment).unwrap().metadata;
    assert_eq!(decoded, metadata);

    let names = decoded
        .named_channels()
        .map(|(name, record)| (name.to_string(), record.gain_map_max.value()))
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        [
            ("Red".to_string(), 1.0),
            ("Green".to_string(), 2.0),
            ("Blue".to_string(), 3.0),
        ]
    );
}

#[test]
fn gainmap_reference_layout() {
    let segment = raw_segment(
        ISO21496_URN.as_bytes(),
        0x40,
        &[
            (0, 1),   // baseline headroom
            (13, 10), // alternate headroom
            (0xFFFF_FFFF, 2), // gain map min: -1/2
            (13, 10),         // gain map max
            (1, 1),           // gamma
            (1, 64),          // base offset
            (1, 64),          // alternate offset
        ],
    );
    let decoded = decode_gainmap(&segment).unwrap();
    assert!(decoded.warnings.is_empty());

    expect![[r#"
        GainMapMetadata {
            minimum_version: 0,
            writer_version: 1,
            is_multichannel: false,
            use_base_colour_space: true,
            reserved_flags: 0,
            hdr_headroom: HdrHeadroom {
                baseline: 0/1,
                alternate: 13/10,
            },
            channels: [
                ChannelRecord {
                    gain_map_min: -1/2,
                    gain_map_max: 13/10,
                    gamma: 1/1,
                    base_offset: 1/64,
                    alternate_offset: 1/64,
                },
            ],
        }
    "#]]
    .assert_eq(&format!("{:#?}\n", decoded.metadata));
}

#[test]
fn gainmap_invalid_urn() {
    let segment = raw_segment(b"urn:iso:std:iso:ts:21496:-2", 0, &[(0, 1); 7]);
    let err = decode_gainmap(&segment).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidUrn);
    expect![[r#"invalid URN: expected 'urn:iso:std:iso:ts:21496:-1', found 'urn:iso:std:iso:ts:21496:-2'"#]]
        .assert_eq(&err.to_string());

    // Any length field is accepted; the URN is what identifies the format.
    let mut segment = raw_segment(b"ICC_PROFILE", 0, &[]);
    segment[2..4].copy_from_slice(&[0xFF, 0xFF]);
    assert_eq!(
        decode_gainmap(&segment).unwrap_err().kind(),
        ErrorKind::InvalidUrn
    );
}

#[test]
fn gainmap_bad_header() {
    let mut segment = achromatic(Rational::new(0, 1), Rational::new(1, 1), channel(0, 4))
        .encode()
        .unwrap();
    segment[1] = 0xE1;
    let err = decode_gainmap(&segment).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadMarker);
    assert_eq!(err.to_string(), "expected APP2 marker 0xFFE2, found 0xFFE1");

    let shorts: [&[u8]; 3] = [&[], &[0xFF], &[0xFF, 0xE2, 0x00]];
    for short in shorts {
        let err = decode_gainmap(short).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRecord);
    }

    // The URN field itself is cut off.
    let err = decode_gainmap(&[0xFF, 0xE2, 0x00, 0x06, b'u', b'r']).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedRecord);
}

#[test]
fn gainmap_length_mismatch() {
    let metadata = achromatic(Rational::new(0, 1), Rational::new(2, 1), channel(0, 4));
    let mut segment = metadata.encode().unwrap();
    segment[2..4].copy_from_slice(&200u16.to_be_bytes());

    let decoded = decode_gainmap(&segment).unwrap();
    assert_eq!(decoded.metadata, metadata);
    assert_eq!(decoded.declared_length, 200);
    assert_eq!(
        decoded.warnings,
        [GainMapWarning::LengthMismatch {
            declared: 200,
            actual: 91,
        }]
    );
}

#[test]
fn gainmap_trailing_bytes() {
    let metadata = achromatic(Rational::new(0, 1), Rational::new(2, 1), channel(0, 4));
    let mut segment = metadata.encode().unwrap();
    segment.extend_from_slice(&[0, 0, 0]);

    let decoded = decode_gainmap(&segment).unwrap();
    assert_eq!(decoded.metadata, metadata);
    assert_eq!(
        decoded.warnings,
        [
            GainMapWarning::LengthMismatch {
                declared: 91,
                actual: 94,
            },
            GainMapWarning::TrailingBytes { count: 3 },
        ]
    );

    let messages = decoded
        .warnings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    expect![[r#"
        [
            "APP2 length field says 91 bytes, but 94 bytes follow the marker",
            "ignoring 3 trailing bytes after gain map channel records",
        ]
    "#]]
    .assert_eq(&format!("{messages:#?}\n"));
}

#[test]
fn gainmap_truncated_channel() {
    let metadata = GainMapMetadata {
        is_multichannel: true,
        channels: vec![channel(0, 4); 3],
        ..achromatic(Rational::new(0, 1), Rational::new(2, 1), channel(0, 4))
    };
    let segment = metadata.encode().unwrap();

    let err = decode_gainmap(&segment[..segment.len() - 10]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedRecord);
    assert!(
        err.to_string().starts_with("gain map channel record 3 of 3:"),
        "{err}"
    );

    // Multichannel flag set, but only one record present.
    let err = decode_gainmap(&segment[..metadata.encoded_len() - 80]).unwrap_err();
    assert!(
        err.to_string().starts_with("gain map channel record 2 of 3:"),
        "{err}"
    );
}

#[test]
fn encode_channel_count_mismatch() {
    let metadata = GainMapMetadata {
        is_multichannel: true,
        ..achromatic(Rational::new(0, 1), Rational::new(2, 1), channel(0, 4))
    };
    let err = metadata.encode().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedRecord);
    assert_eq!(
        err.to_string(),
        "gain map has 1 channel records, but its flags call for 3"
    );
}
