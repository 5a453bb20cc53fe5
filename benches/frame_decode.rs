// Decoder cost per camera frame
// Run with: cargo bench --bench frame_decode

use cardscan_core::{decode_frame, LumaFrame, ScanConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

#[path = "../src/features/qr_fixture.rs"]
mod qr_fixture;

use qr_fixture::qr_luma;

fn benchmark_frame_decode(c: &mut Criterion) {
    let config = ScanConfig::default();

    let (qr, side, _) = qr_luma("4006381333931", 4);
    c.bench_function("decode_qr_frame", |b| {
        b.iter(|| {
            let frame = LumaFrame {
                data: &qr,
                width: side,
                height: side,
                row_stride: side,
                rotation_deg: 0,
            };
            black_box(decode_frame(&frame, &config).unwrap());
        })
    });

    c.bench_function("decode_rotated_qr_frame", |b| {
        b.iter(|| {
            let frame = LumaFrame {
                data: &qr,
                width: side,
                height: side,
                row_stride: side,
                rotation_deg: 90,
            };
            black_box(decode_frame(&frame, &config).unwrap());
        })
    });

    // Typical preview size with nothing in view; this is the common case.
    let (width, height) = (640u32, 480u32);
    let blank = vec![128u8; (width * height) as usize];
    c.bench_function("decode_blank_vga_frame", |b| {
        b.iter(|| {
            let frame = LumaFrame {
                data: &blank,
                width,
                height,
                row_stride: width,
                rotation_deg: 0,
            };
            black_box(decode_frame(&frame, &config).unwrap());
        })
    });
}

criterion_group!(benches, benchmark_frame_decode);
criterion_main!(benches);
