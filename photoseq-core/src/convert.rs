use crate::error::PhotoseqError;
use anyhow::{anyhow, Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const DEFAULT_QUALITY: u8 = 85;

/// libwebp effort level: slowest, smallest output
const WEBP_METHOD: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    #[default]
    Webp,
    Jpeg,
}

impl TargetFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Jpeg => "jpg",
        }
    }
}

impl std::fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Webp => write!(f, "webp"),
            Self::Jpeg => write!(f, "jpeg"),
        }
    }
}

impl std::str::FromStr for TargetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "webp" => Ok(Self::Webp),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            _ => Err(format!("Invalid target format: {}", s)),
        }
    }
}

/// Check that a quality value lies in 0..=100
pub fn validate_quality(value: i64) -> Result<u8, PhotoseqError> {
    u8::try_from(value)
        .ok()
        .filter(|q| *q <= 100)
        .ok_or(PhotoseqError::InvalidQuality(value))
}

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub output_dir: PathBuf,
    pub quality: u8,
    pub format: TargetFormat,
    /// Set by the Ctrl-C handler; stops before the next file
    pub interrupt: Option<Arc<AtomicBool>>,
}

impl ConvertOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            quality: DEFAULT_QUALITY,
            format: TargetFormat::default(),
            interrupt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub source: PathBuf,
    pub output: PathBuf,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

impl ConversionRecord {
    pub fn reduction_percent(&self) -> f64 {
        reduction_percent(self.bytes_before, self.bytes_after)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionFailure {
    pub source: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionReport {
    pub converted: Vec<ConversionRecord>,
    pub failures: Vec<ConversionFailure>,
    /// Files not attempted because the run was interrupted
    pub skipped: usize,
    pub interrupted: bool,
}

impl ConversionReport {
    pub fn success_count(&self) -> usize {
        self.converted.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn total_before(&self) -> u64 {
        self.converted.iter().map(|r| r.bytes_before).sum()
    }

    pub fn total_after(&self) -> u64 {
        self.converted.iter().map(|r| r.bytes_after).sum()
    }

    /// Negative when the converted files are larger than the originals
    pub fn bytes_saved(&self) -> i64 {
        let before = i64::try_from(self.total_before()).unwrap_or(i64::MAX);
        let after = i64::try_from(self.total_after()).unwrap_or(i64::MAX);
        before - after
    }

    pub fn reduction_percent(&self) -> f64 {
        reduction_percent(self.total_before(), self.total_after())
    }
}

/// Percentage of `before` saved by `after`; 0 for an empty input
#[allow(clippy::cast_precision_loss)]
pub fn reduction_percent(before: u64, after: u64) -> f64 {
    if before == 0 {
        return 0.0;
    }
    (before as f64 - after as f64) / before as f64 * 100.0
}

#[allow(clippy::cast_precision_loss)]
pub fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[derive(Debug, Clone, Copy)]
pub enum ConvertEvent<'a> {
    Converted {
        position: usize,
        total: usize,
        record: &'a ConversionRecord,
    },
    Failed {
        position: usize,
        total: usize,
        failure: &'a ConversionFailure,
    },
}

/// Composite transparent and palette images onto white, dropping alpha
pub fn flatten_to_rgb(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| -> u8 {
            let mixed = (u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255;
            u8::try_from(mixed).unwrap_or(u8::MAX)
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}

pub fn encode(rgb: &RgbImage, format: TargetFormat, quality: u8) -> Result<Vec<u8>> {
    match format {
        TargetFormat::Webp => {
            let mut config = webp::WebPConfig::new()
                .map_err(|()| anyhow!("Failed to initialise WebP encoder"))?;
            config.quality = f32::from(quality);
            config.method = WEBP_METHOD;
            let encoded = webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height())
                .encode_advanced(&config)
                .map_err(|e| anyhow!("WebP encoding failed: {:?}", e))?;
            Ok(encoded.to_vec())
        },
        TargetFormat::Jpeg => {
            let mut buffer = Vec::new();
            // The JPEG encoder has no quality 0
            JpegEncoder::new_with_quality(&mut buffer, quality.max(1))
                .encode_image(rgb)
                .context("JPEG encoding failed")?;
            Ok(buffer)
        },
    }
}

pub fn output_path_for(source: &Path, options: &ConvertOptions) -> Result<PathBuf> {
    let stem = source
        .file_stem()
        .ok_or_else(|| anyhow!("{} has no file name", source.display()))?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(options.format.extension());
    Ok(options.output_dir.join(name))
}

/// Decode one image, flatten it and write the re-encoded file
pub fn convert_file(source: &Path, output: &Path, options: &ConvertOptions) -> Result<ConversionRecord> {
    let bytes_before = fs::metadata(source)
        .with_context(|| format!("Failed to read {}", source.display()))?
        .len();

    let image = image::open(source)
        .with_context(|| format!("Failed to decode {}", source.display()))?;
    let rgb = flatten_to_rgb(&image);
    let encoded = encode(&rgb, options.format, options.quality)?;

    fs::write(output, &encoded)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(ConversionRecord {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        bytes_before,
        bytes_after: encoded.len() as u64,
    })
}

pub fn convert_batch(
    files: &[PathBuf],
    options: &ConvertOptions,
    observer: &mut dyn FnMut(ConvertEvent<'_>),
) -> Result<ConversionReport> {
    fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            options.output_dir.display()
        )
    })?;

    let total = files.len();
    let mut report = ConversionReport::default();
    let mut written: HashSet<PathBuf> = HashSet::new();

    for (i, source) in files.iter().enumerate() {
        if options
            .interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
        {
            report.interrupted = true;
            report.skipped = total - i;
            break;
        }

        let position = i + 1;
        let result = output_path_for(source, options).and_then(|output| {
            if written.contains(&output) {
                return Err(anyhow!(
                    "{} was already written by another file with the same name",
                    output.display()
                ));
            }
            let record = convert_file(source, &output, options)?;
            written.insert(output);
            Ok(record)
        });

        match result {
            Ok(record) => {
                report.converted.push(record);
                if let Some(record) = report.converted.last() {
                    observer(ConvertEvent::Converted {
                        position,
                        total,
                        record,
                    });
                }
            },
            Err(e) => {
                report.failures.push(ConversionFailure {
                    source: source.clone(),
                    message: format!("{:#}", e),
                });
                if let Some(failure) = report.failures.last() {
                    observer(ConvertEvent::Failed {
                        position,
                        total,
                        failure,
                    });
                }
            },
        }
    }

    Ok(report)
}
