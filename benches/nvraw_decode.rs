use std::hint::black_box;
use std::io::Cursor;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nvraw::rawfile::{
    BayerPhase, ConversionConfig, NvRawReader, NvRawToTiffPipeline, RawImage, RawImageReader,
    TiffCompression, write_legacy_file,
};

fn mock_image(width: usize, height: usize) -> RawImage {
    let mut image = RawImage::new(width, height, BayerPhase::Rggb, 10);
    image.pixel_data = (0..width * height)
        .map(|i| ((i % width + i / width) % 1024) as i16)
        .collect();
    image
}

fn legacy_file(width: usize, height: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    write_legacy_file(&mock_image(width, height), &mut bytes).unwrap();
    bytes
}

fn chunk(tag: &[u8; 16], payload: &[u8]) -> Vec<u8> {
    let mut bytes = tag.to_vec();
    bytes.extend_from_slice(&[0u8; 16]);
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

fn chunked_file(width: usize, height: usize) -> Vec<u8> {
    let image = mock_image(width, height);
    let header: Vec<u8> = [width as u32, height as u32, image.bayer_phase.code(), 10, 1, 1, 0, 0, 0]
        .iter()
        .flat_map(|w| w.to_le_bytes())
        .collect();
    let mut pixels: Vec<u8> = [1u32, 0].iter().flat_map(|w| w.to_le_bytes()).collect();
    pixels.extend(image.pixel_data.iter().flat_map(|s| s.to_le_bytes()));

    let mut bytes = chunk(b"NVRAWFILEHEADER\0", &header);
    bytes.extend(chunk(b"PIXELDATACHUNK\0\0", &pixels));
    bytes
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_by_size");

    let sizes = vec![
        (640, 480, "640x480"),
        (1920, 1080, "1920x1080"),
        (3840, 2160, "3840x2160"),
    ];

    for (width, height, label) in sizes {
        let legacy = legacy_file(width, height);
        group.bench_with_input(BenchmarkId::new("legacy", label), &legacy, |b, data| {
            b.iter(|| NvRawReader.read_raw(black_box(data)))
        });

        let chunked = chunked_file(width, height);
        group.bench_with_input(BenchmarkId::new("chunked", label), &chunked, |b, data| {
            b.iter(|| NvRawReader.read_raw(black_box(data)))
        });
    }

    group.finish();
}

fn benchmark_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_to_tiff");
    let data = chunked_file(1920, 1080);

    let configs = vec![
        (ConversionConfig::default(), "mosaic"),
        (ConversionConfig::builder().compression(TiffCompression::DeflateFast).build(), "mosaic_deflate"),
        (ConversionConfig::builder().debayer(true).build(), "debayer"),
    ];

    for (config, label) in configs {
        let pipeline = NvRawToTiffPipeline::new(config);
        group.bench_with_input(BenchmarkId::from_parameter(label), &data, |b, data| {
            b.iter(|| {
                let mut output = Cursor::new(Vec::new());
                let _ = pipeline.convert(black_box(data), &mut output);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_decode, benchmark_conversion);
criterion_main!(benches);
