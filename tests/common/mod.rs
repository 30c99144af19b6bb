#![allow(dead_code)]

use audt::format::{FOOTER_SIZE, checksum};
use audt::schema::{v0_5_0_2, v0_7_0_1};
use audt::{
    AudioData, ContainerMetadata, ContainerWriter, MusicKey, NoteData, ProjectData, ProjectInfo,
    TimeSignature, TransformData, VersionTag,
};

/// A 3x5 matrix of mixed-sign magnitudes with a narrow range.
pub fn scenario_matrix() -> Vec<Vec<f64>> {
    vec![
        vec![-1.25, 0.5, 1.75, -0.75, 0.0],
        vec![0.125, -1.5, 1.0, 0.625, -0.3125],
        vec![1.875, -0.0625, -1.0, 0.875, 0.25],
    ]
}

pub fn scenario_notes() -> NoteData {
    NoteData::new(
        vec![1.0, 2.0, 3.0, 4.5, 6.7, 8.9],
        vec![0.5, 1.0, 1.5, 2.5, 3.5, 10.0],
        vec![32, 41, 91, 82, 84, 55],
    )
    .unwrap()
}

pub fn scenario_info() -> ProjectInfo {
    ProjectInfo {
        name: Some("Test-1".to_string()),
        key: MusicKey::CSharpMajor,
        time_signature: TimeSignature::TWO_TWO,
        bpm: 123.45,
        offset_seconds: 0.01,
        playback_volume: 0.55,
        current_time_ms: 12,
    }
}

/// The project of the reference scenario (one audio stream, named project),
/// with a zero skippable-bytes offset.
pub fn scenario_project() -> ProjectData {
    ProjectData {
        metadata: ContainerMetadata::new(0),
        transform: TransformData::from_magnitudes(&scenario_matrix()).unwrap(),
        audio: AudioData {
            original: vec![1, 2, 3, 4, 5],
            slowed: None,
            sample_rate: 44100.0,
            duration_ms: 200,
            file_name: None,
        },
        project_info: scenario_info(),
        notes: scenario_notes(),
    }
}

/// The scenario project, reshaped so that `version` can store it.
pub fn project_for(version: VersionTag) -> ProjectData {
    let mut data = scenario_project();
    if version == v0_5_0_2::VERSION {
        data.project_info.name = None;
        data.audio.file_name = Some("take-3.mp3".to_string());
    } else if version != v0_7_0_1::VERSION {
        data.audio.slowed = Some(vec![9, 8, 7, 6, 5, 4, 3]);
    }
    data
}

/// Encodes `data` as a complete container in memory.
pub fn encode(version: VersionTag, data: &ProjectData) -> audt::Result<Vec<u8>> {
    let mut writer = ContainerWriter::new(version)?;
    writer.write_project(data)?;
    writer.finish_to_vec()
}

/// Recomputes the trailing checksum after a deliberate edit.
pub fn reseal(bytes: &mut [u8]) {
    let at = bytes.len() - 4;
    let sum = checksum(&bytes[..at]);
    bytes[at..].copy_from_slice(&sum.to_be_bytes());
}

/// Offset where the footer starts.
pub fn footer_offset(bytes: &[u8]) -> usize {
    bytes.len() - FOOTER_SIZE
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{actual} differs from {expected} by more than {tolerance}"
    );
}
