#![allow(missing_docs)]

use std::sync::Arc;

use audt::codec::{ByteCursor, ByteWriter};
use audt::compression::{Compressor, Lz4Compressor, default_compressor};
use audt::format::{Header, SECTION_DELIMITER, checksum};
use audt::section::{read_section, write_section};
use audt::{AudtError, CorruptKind, MusicKey, SectionId, TimeSignature, VersionTag};

fn cursor(bytes: &[u8]) -> ByteCursor<'_> {
    ByteCursor::new(bytes, default_compressor())
}

// --- PRIMITIVES ---

#[test]
fn scalars_are_big_endian_and_fixed_width() -> audt::Result<()> {
    let mut w = ByteWriter::default();
    w.write_i32(0x0102_0304)?;
    w.write_i16(-2)?;
    w.write_f64(1.0)?;
    w.write_u32(5)?;

    assert_eq!(
        w.as_slice(),
        &[
            1, 2, 3, 4, //
            0xFF, 0xFE, //
            0x3F, 0xF0, 0, 0, 0, 0, 0, 0, //
            0, 0, 0, 5,
        ]
    );

    let bytes = w.into_inner();
    let mut c = cursor(&bytes);
    assert_eq!(c.read_i32()?, 0x0102_0304);
    assert_eq!(c.read_i16()?, -2);
    assert_eq!(c.read_f64()?, 1.0);
    assert_eq!(c.read_u32()?, 5);
    assert!(c.is_exhausted());
    Ok(())
}

#[test]
fn string_prefix_counts_bytes_not_chars() -> audt::Result<()> {
    let mut w = ByteWriter::default();
    w.write_string("C♯ é")?;
    let bytes = w.into_inner();

    assert_eq!(&bytes[..4], &[0, 0, 0, 7]);
    assert_eq!(cursor(&bytes).read_string()?, "C♯ é");
    Ok(())
}

#[test]
fn reading_past_the_end_is_truncated() {
    let bytes = [0u8, 0, 1];
    let err = cursor(&bytes).read_i32().unwrap_err();
    assert!(matches!(
        err,
        AudtError::Corrupt(CorruptKind::Truncated {
            offset: 0,
            needed: 4,
            remaining: 3
        })
    ));
}

#[test]
fn bounded_cursor_stops_at_its_fence() -> audt::Result<()> {
    let bytes = [0u8, 0, 0, 7, 0, 0, 0, 8];
    let mut c = ByteCursor::bounded(&bytes, 0, 4, default_compressor())?;
    assert_eq!(c.read_i32()?, 7);
    let err = c.read_i32().unwrap_err();
    assert!(matches!(
        err,
        AudtError::Corrupt(CorruptKind::Truncated { offset: 4, .. })
    ));
    Ok(())
}

#[test]
fn negative_length_and_bad_utf8_are_corrupt() {
    let negative = (-1i32).to_be_bytes();
    assert!(matches!(
        cursor(&negative).read_bytes(),
        Err(AudtError::Corrupt(CorruptKind::CorruptPayload(_)))
    ));

    let bad_utf8 = [0u8, 0, 0, 2, 0xC3, 0x28];
    assert!(matches!(
        cursor(&bad_utf8).read_string(),
        Err(AudtError::Corrupt(CorruptKind::CorruptPayload(_)))
    ));
}

#[test]
fn compressed_arrays_round_trip() -> audt::Result<()> {
    let times: Vec<f64> = (0..500).map(|i| f64::from(i) * 0.25).collect();
    let pitches: Vec<i32> = (0..500).map(|i| 21 + i % 88).collect();

    let mut w = ByteWriter::default();
    w.write_compressed_f64s(&times)?;
    w.write_compressed_i32s(&pitches)?;
    w.write_compressed_f64s(&[])?;
    let bytes = w.into_inner();

    // A repeating pitch pattern must actually shrink.
    let mut pitches_only = ByteWriter::default();
    pitches_only.write_compressed_i32s(&pitches)?;
    assert!(pitches_only.len() < 1000, "{} bytes", pitches_only.len());

    let mut c = cursor(&bytes);
    assert_eq!(c.read_compressed_f64s()?, times);
    assert_eq!(c.read_compressed_i32s()?, pitches);
    assert!(c.read_compressed_f64s()?.is_empty());
    assert!(c.is_exhausted());
    Ok(())
}

#[test]
fn array_count_must_match_its_payload() -> audt::Result<()> {
    // Claims 3 doubles but carries 2.
    let mut raw = Vec::new();
    raw.extend_from_slice(&3i32.to_be_bytes());
    raw.extend_from_slice(&1.0f64.to_be_bytes());
    raw.extend_from_slice(&2.0f64.to_be_bytes());

    let mut w = ByteWriter::default();
    w.write_compressed(&raw)?;
    let bytes = w.into_inner();

    let err = cursor(&bytes).read_compressed_f64s().unwrap_err();
    assert!(matches!(
        err,
        AudtError::Corrupt(CorruptKind::CorruptPayload(_))
    ));
    Ok(())
}

// --- COMPRESSION ---

#[test]
fn lz4_append_decompresses_like_one_shot() -> audt::Result<()> {
    let data: Vec<u8> = (0..4096u32).map(|i| (i % 13) as u8).collect();
    let mut appended = vec![0xAA];
    Lz4Compressor.compress_append(&data, &mut appended)?;

    assert_eq!(appended[0], 0xAA);
    assert_eq!(Lz4Compressor.decompress(&appended[1..])?.as_ref(), data.as_slice());
    let one_shot = Lz4Compressor.compress(&data)?;
    assert_eq!(Lz4Compressor.decompress(&one_shot)?.as_ref(), data.as_slice());
    Ok(())
}

#[test]
fn lz4_rejects_garbage() {
    let garbage = [3u8, 0, 0, 0, 0xFF, 0xFF];
    assert!(Lz4Compressor.decompress(&garbage).unwrap_err().is_corrupt());

    let impossible_size = [0xFF, 0xFF, 0xFF, 0x7F, 0x00];
    assert!(Lz4Compressor.decompress(&impossible_size).unwrap_err().is_corrupt());

    assert!(Lz4Compressor.decompress(&[1, 2]).unwrap_err().is_corrupt());
}

#[test]
fn compressor_reports_its_version() {
    let shared: Arc<dyn Compressor> = default_compressor();
    assert_eq!(shared.version(), 1);
}

// --- SECTION FRAMING ---

#[test]
fn section_framing_round_trip() -> audt::Result<()> {
    let mut w = ByteWriter::default();
    write_section(&mut w, SectionId::ProjectInfo, |w| w.write_i32(77))?;
    let bytes = w.into_inner();

    assert_eq!(&bytes[..4], &[0, 0, 0, 4]);
    assert_eq!(&bytes[8..], &SECTION_DELIMITER);

    let value = read_section(&mut cursor(&bytes), SectionId::ProjectInfo, |c| c.read_i32())?;
    assert_eq!(value, 77);
    Ok(())
}

#[test]
fn wrong_section_id_is_reported_with_both_ids() -> audt::Result<()> {
    let mut w = ByteWriter::default();
    write_section(&mut w, SectionId::AudioData, |w| w.write_i32(1))?;
    let bytes = w.into_inner();

    let err = read_section(&mut cursor(&bytes), SectionId::TransformData, |c| c.read_i32())
        .unwrap_err();
    assert!(err.is_section_framing());
    assert!(matches!(
        err,
        AudtError::Corrupt(CorruptKind::SectionIdMismatch {
            expected: SectionId::TransformData,
            actual: 3
        })
    ));
    Ok(())
}

#[test]
fn decoder_that_stops_early_misses_the_delimiter() -> audt::Result<()> {
    let mut w = ByteWriter::default();
    write_section(&mut w, SectionId::NoteData, |w| {
        w.write_i32(1)?;
        w.write_i32(2)
    })?;
    let bytes = w.into_inner();

    let err = read_section(&mut cursor(&bytes), SectionId::NoteData, |c| c.read_i32())
        .unwrap_err();
    assert!(matches!(
        err,
        AudtError::Corrupt(CorruptKind::MissingEndOfSectionDelimiter {
            section: SectionId::NoteData
        })
    ));
    Ok(())
}

// --- FORMAT PRIMITIVES ---

#[test]
fn checksum_sums_signed_bytes_modulo_mersenne_prime() {
    assert_eq!(checksum(&[]), 0);
    assert_eq!(checksum(&[0xFF, 0x01, 0x05]), 5);
    // A negative sum wraps into the positive range.
    assert_eq!(checksum(&[0x80]), 0x7FFF_FFFF - 128);
}

#[test]
fn header_layout() -> audt::Result<()> {
    let header = Header::new(VersionTag::CURRENT, 1);
    let bytes = header.to_bytes();
    assert_eq!(&bytes[..14], b"AUDITRANSCRIBE");
    assert_eq!(&bytes[20..24], &[0x00, 0x0B, 0x00, 0x03]);
    assert_eq!(&bytes[28..], &SECTION_DELIMITER);
    assert_eq!(Header::parse(&bytes)?, header);

    let mut bad = bytes;
    bad[0] = b'X';
    assert!(matches!(
        Header::parse(&bad),
        Err(AudtError::Corrupt(CorruptKind::IncorrectContainerFormat(_)))
    ));
    Ok(())
}

#[test]
fn version_tag_formatting() {
    assert_eq!(VersionTag::CURRENT.to_string(), "0x000B0003");
    assert_eq!(VersionTag::new(0x0005_0002).components(), [0, 5, 0, 2]);
}

#[test]
fn section_ids_follow_canonical_order() {
    assert_eq!(SectionId::from_u32(4), Some(SectionId::ProjectInfo));
    assert_eq!(SectionId::from_u32(0), None);
    assert_eq!(SectionId::ContainerMetadata.next(), Some(SectionId::TransformData));
    assert_eq!(SectionId::NoteData.next(), None);
}

// --- MUSIC VALUES ---

#[test]
fn music_key_identifiers() {
    assert_eq!(MusicKey::CMajor.uuid(), 1);
    assert_eq!(MusicKey::CSharpMajor.uuid(), 2);
    assert_eq!(MusicKey::BMinor.legacy_index(), 29);
    assert_eq!(MusicKey::from_uuid(30), Some(MusicKey::BMinor));
    assert_eq!(MusicKey::from_uuid(0), None);
    assert_eq!(MusicKey::from_uuid(31), None);
    assert_eq!(MusicKey::from_name("C# major"), Some(MusicKey::CSharpMajor));
    assert_eq!(MusicKey::from_name("Eb Minor"), Some(MusicKey::EFlatMinor));
    assert!(MusicKey::FSharpMinor.is_minor());
    assert_eq!(MusicKey::GFlatMajor.tonic_offset(), 6);
}

#[test]
fn legacy_time_signatures() {
    assert_eq!(TimeSignature::TWO_TWO.legacy_index(), Some(1));
    assert_eq!(TimeSignature::from_legacy_index(7), Some(TimeSignature::TWELVE_EIGHT));
    assert_eq!(TimeSignature::new(5, 4).legacy_index(), None);
    assert_eq!(TimeSignature::new(7, 8).to_string(), "7/8");
}
