#![allow(missing_docs)]

use audt::quantize::quantize;
use audt::{
    Audt, AudioData, ContainerMetadata, ContainerReader, ContainerWriter, MusicKey, NoteData,
    ProjectData, ProjectInfo, TimeSignature, TransformData, VersionTag,
};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn spectrogram(rows: usize, cols: usize) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| ((r * 31 + c * 7) as f64 * 0.01).sin() * 40.0)
                .collect()
        })
        .collect()
}

fn notes(count: usize) -> NoteData {
    (0..count)
        .map(|i| audt::Note {
            onset: i as f64 * 0.25,
            duration: 0.5,
            pitch: 21 + (i % 88) as i32,
        })
        .collect()
}

fn generate_project() -> ProjectData {
    let audio: Vec<u8> = (0..4 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
    ProjectData {
        metadata: ContainerMetadata::default(),
        transform: TransformData::from_magnitudes(&spectrogram(1024, 512))
            .expect("quantizable spectrogram"),
        audio: AudioData {
            slowed: Some(audio.clone()),
            original: audio,
            sample_rate: 44100.0,
            duration_ms: 180_000,
            file_name: None,
        },
        project_info: ProjectInfo {
            name: Some("Bench".to_string()),
            key: MusicKey::AMinor,
            time_signature: TimeSignature::FOUR_FOUR,
            bpm: 120.0,
            offset_seconds: 0.0,
            playback_volume: 1.0,
            current_time_ms: 0,
        },
        notes: notes(2000),
    }
}

// --- BENCHMARKS ---

fn bench_quantize(c: &mut Criterion) {
    let matrix = spectrogram(1024, 512);
    let mut group = c.benchmark_group("Quantization");
    group.throughput(Throughput::Elements((1024 * 512) as u64));

    group.bench_function("quantize", |b| {
        b.iter(|| quantize(black_box(&matrix)).expect("quantize failed"));
    });

    let q = quantize(&matrix).expect("quantize failed");
    group.bench_function("dequantize", |b| {
        b.iter(|| black_box(&q).dequantize());
    });
    group.finish();
}

fn bench_write(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bench.audt");
    let data = generate_project();
    Audt::save(&path, &data).expect("initial save failed");

    let mut group = c.benchmark_group("Container Write");
    group.sample_size(20);

    // 1. Every section encoded again.
    group.bench_function("full_save", |b| {
        b.iter(|| Audt::save(black_box(&path), black_box(&data)).expect("save failed"));
    });

    // 2. Prefix copied, tail re-encoded.
    group.bench_function("partial_update", |b| {
        b.iter(|| {
            Audt::update(
                black_box(&path),
                black_box(&data.project_info),
                black_box(&data.notes),
            )
            .expect("update failed")
        });
    });

    // 3. Encoding alone, no disk.
    group.bench_function("encode_in_memory", |b| {
        b.iter(|| {
            let mut writer = ContainerWriter::new(VersionTag::CURRENT).expect("writer");
            writer.write_project(black_box(&data)).expect("encode failed");
            writer.finish_to_vec().expect("finish failed")
        });
    });
    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let data = generate_project();
    let mut writer = ContainerWriter::new(VersionTag::CURRENT).expect("writer");
    writer.write_project(&data).expect("encode failed");
    let bytes = writer.finish_to_vec().expect("finish failed");

    let mut group = c.benchmark_group("Container Read");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.sample_size(20);

    group.bench_function("verify_only", |b| {
        b.iter(|| ContainerReader::from_bytes(black_box(bytes.clone())).expect("verify failed"));
    });

    group.bench_function("read_project", |b| {
        b.iter(|| {
            let mut reader = ContainerReader::from_bytes(bytes.clone()).expect("verify failed");
            reader.read_project().expect("read failed")
        });
    });
    group.finish();
}

criterion_group!(benches, bench_quantize, bench_write, bench_read);
criterion_main!(benches);
