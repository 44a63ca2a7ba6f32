use criterion::{criterion_group, criterion_main, Criterion};

use ps5bp_elf::Segment;
use ps5bp_stub::PltAddressMap;

fn synthetic_text_section(num_slots: usize) -> (Vec<u8>, Segment) {
    let mut data = vec![0x90u8; num_slots * 16];
    for i in 0..num_slots {
        let base = i * 16;
        data[base] = 0xFF;
        data[base + 1] = 0x25;
        let disp: i32 = 0x1000;
        data[base + 2..base + 6].copy_from_slice(&disp.to_le_bytes());
    }
    let segment = Segment {
        p_type: 0x1,
        file_offset: 0,
        virtual_address: 0x10000,
        file_size: data.len() as u64,
        memory_size: data.len() as u64,
        is_executable: true,
    };
    (data, segment)
}

fn bench_plt_scan(c: &mut Criterion) {
    let (data, segment) = synthetic_text_section(4096);
    c.bench_function("plt_address_map_build_4096_slots", |b| {
        b.iter(|| PltAddressMap::build(&data, std::slice::from_ref(&segment)));
    });
}

criterion_group!(plt_scan, bench_plt_scan);
criterion_main!(plt_scan);
