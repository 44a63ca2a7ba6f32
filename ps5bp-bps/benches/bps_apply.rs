use criterion::{criterion_group, criterion_main, Criterion};

use ps5bp_bps::{apply_patch, write_vlc};

fn build_source_read_patch(source: &[u8]) -> Vec<u8> {
    let mut patch = b"BPS1".to_vec();
    write_vlc(source.len() as u64, &mut patch);
    write_vlc(source.len() as u64, &mut patch);
    write_vlc(0, &mut patch);
    write_vlc(((source.len() as u64 - 1) << 2) | 0, &mut patch);
    let src_crc = crc32fast::hash(source);
    patch.extend_from_slice(&src_crc.to_le_bytes());
    patch.extend_from_slice(&src_crc.to_le_bytes());
    let body_crc = crc32fast::hash(&patch);
    patch.extend_from_slice(&body_crc.to_le_bytes());
    patch
}

fn bench_apply_patch(c: &mut Criterion) {
    let source = vec![0x42u8; 1 << 20];
    let patch = build_source_read_patch(&source);

    c.bench_function("apply_patch_1mb_identity", |b| {
        b.iter(|| apply_patch(&source, &patch).unwrap());
    });
}

criterion_group!(bps_apply, bench_apply_patch);
criterion_main!(bps_apply);
