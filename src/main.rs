use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use nvraw::logger;
use nvraw::rawfile::{
    ChannelAverages, ConversionConfig, NvRawToTiffPipeline, RawImage, TiffCompression,
};
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Compression {
    None,
    Lzw,
    DeflateFast,
    DeflateBalanced,
    DeflateBest,
}

impl From<Compression> for TiffCompression {
    fn from(value: Compression) -> Self {
        match value {
            Compression::None => TiffCompression::None,
            Compression::Lzw => TiffCompression::Lzw,
            Compression::DeflateFast => TiffCompression::DeflateFast,
            Compression::DeflateBalanced => TiffCompression::DeflateBalanced,
            Compression::DeflateBest => TiffCompression::DeflateBest,
        }
    }
}

/// Inspect an nvraw capture and optionally convert it to TIFF
#[derive(Debug, Parser)]
#[command(name = "nvraw", version)]
struct Args {
    /// nvraw file to read
    input: PathBuf,

    /// Write the image as TIFF to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Compression::None)]
    compression: Compression,

    /// Demosaic to RGB instead of writing the Bayer mosaic
    #[arg(long)]
    debayer: bool,

    /// Centered crop, e.g. 1920x1080
    #[arg(long, value_parser = parse_crop)]
    crop: Option<(usize, usize)>,

    /// Skip dimension and sample range checks
    #[arg(long)]
    no_validate: bool,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,
}

fn parse_crop(value: &str) -> Result<(usize, usize), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width = w.trim().parse().map_err(|e| format!("bad width '{}': {}", w, e))?;
    let height = h.trim().parse().map_err(|e| format!("bad height '{}': {}", h, e))?;
    Ok((width, height))
}

fn gains(values: &[f32; 4]) -> String {
    values
        .iter()
        .map(|g| format!("{:.3}", g))
        .collect::<Vec<_>>()
        .join(" ")
}

fn averages(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{:.2}", v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_averages(label: &str, avg: &ChannelAverages) {
    println!(
        "  {:<6} R/G/B [{}]  R/Gr/Gb/B [{}]  ({} quads)",
        label,
        averages(&avg.color),
        averages(&avg.phase),
        avg.quads
    );
}

fn print_statistics(image: &RawImage) {
    let region = image.center_region();
    let Some(all) = image.channel_averages() else {
        return;
    };
    println!(
        "Center region:   {}x{} at ({}, {})",
        region.width, region.height, region.left, region.top
    );
    print_averages("all", &all);

    if image.hdr.is_some() {
        let split = image.hdr_channel_averages();
        if let Some(long) = &split.long {
            print_averages("long", long);
        }
        if let Some(short) = &split.short {
            print_averages("short", short);
        }
    }
    if let Some(levels) = image.row_levels() {
        println!(
            "Row levels:      top {:.2}, middle {:.2}, bottom {:.2}",
            levels.top, levels.middle, levels.bottom
        );
    }
}

fn print_summary(image: &RawImage) {
    let source = image
        .source_format
        .map_or_else(|| "unknown".to_string(), |f| f.to_string());
    match image.legacy_version {
        Some(version) => println!("Format:          {} (version {})", source, version),
        None => println!("Format:          {}", source),
    }
    println!("Dimensions:      {}x{}", image.width, image.height);
    println!("Bayer phase:     {}", image.bayer_phase);
    println!("Bits per sample: {}", image.bits_per_sample);
    println!("Pixel format:    {}", image.pixel_format);
    println!("Exposure time:   {:.6}s", image.exposure_time);
    println!("ISO:             {}", image.iso);
    println!("Sensor gains:    {}", gains(&image.sensor_gains));
    println!("AWB gains:       {}", gains(&image.awb_gains));
    println!("AWB status:      {}", image.awb_converge_status);
    println!("Focus position:  {}", image.focus_position);
    if !image.sensor_id.is_empty() {
        println!("Sensor id:       {}", image.sensor_id_hex());
    }
    if !image.fuse_id.is_empty() {
        println!("Fuse id:         {}", image.fuse_id_hex());
    }
    if let Some(frame) = &image.frame_info {
        println!(
            "Frame:           {} image(s), t={}.{:06}s, flags={:#x}",
            frame.image_count, frame.time_seconds, frame.time_microseconds, frame.flags
        );
    }
    if let Some(hdr) = &image.hdr {
        println!(
            "HDR:             {} exposure(s), readout '{}'",
            hdr.number_of_exposures, hdr.readout_scheme
        );
        for exposure in &hdr.exposures {
            println!(
                "  {:<4} {:.6}s analog [{}] digital [{}]",
                exposure.symbol_str(),
                exposure.exposure_time,
                gains(&exposure.analog_gains),
                gains(&exposure.digital_gains)
            );
        }
        let table = image.hdr_readout_table();
        println!("  readout table: {:?}", table.0);
    }
    println!("Max pixel value: {}", image.max_pixel_value());
    print_statistics(image);
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(if args.verbose { "debug" } else { "info" });

    let image = RawImage::read_file(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    print_summary(&image);

    let Some(output) = &args.output else {
        if args.debayer || args.crop.is_some() {
            bail!("--debayer and --crop need an output path (-o)");
        }
        return Ok(());
    };

    let config = ConversionConfig::builder()
        .compression(args.compression.into())
        .validate_dimensions(!args.no_validate)
        .check_sample_range(!args.no_validate)
        .debayer(args.debayer)
        .crop(args.crop)
        .build();
    let pipeline = NvRawToTiffPipeline::new(config);

    info!("Compression: {:?}", pipeline.config().compression);
    info!(
        "Debayering: {}",
        if pipeline.config().debayer {
            "enabled"
        } else {
            "disabled"
        }
    );

    let timings = pipeline
        .convert_file(&args.input, output)
        .with_context(|| format!("converting to {}", output.display()))?;
    timings.log_summary();
    info!("Wrote {}", output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crop() {
        assert_eq!(parse_crop("1920x1080"), Ok((1920, 1080)));
        assert_eq!(parse_crop("64X32"), Ok((64, 32)));
        assert!(parse_crop("1920").is_err());
        assert!(parse_crop("ax2").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "nvraw", "in.nvraw", "-o", "out.tiff", "--compression", "deflate-fast", "--crop", "8x4",
        ])
        .unwrap();

        assert_eq!(args.output, Some(PathBuf::from("out.tiff")));
        assert!(matches!(args.compression, Compression::DeflateFast));
        assert_eq!(args.crop, Some((8, 4)));
        assert!(!args.debayer);
    }
}
