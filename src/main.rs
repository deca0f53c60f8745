use clap::{Parser, ValueEnum};
use image::ImageReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use defectview::annotate::{Annotator, ColorPolicy, LabelMode};
use defectview::capture::{CaptureController, ImageSequenceSource};
use defectview::detection::{Detector, InferenceConfig};
use defectview::ledger::DefectLedger;
use defectview::session::ImageSession;

#[derive(Parser)]
#[command(name = "defectview")]
#[command(about = "Detect objects in images and draw annotated overlays")]
struct Cli {
    /// Paths to input image files (frame sequence in --live mode)
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// Path to the ONNX detection model
    #[arg(long, value_name = "MODEL")]
    model: Option<PathBuf>,

    /// Path to the class names file (one name per line)
    #[arg(long, value_name = "CLASSES")]
    classes: Option<PathBuf>,

    /// Model input edge length in pixels
    #[arg(long, default_value_t = 640)]
    input_size: u32,

    /// Minimum score to keep a prediction
    #[arg(long, default_value_t = 0.5)]
    confidence: f32,

    /// Overlap suppression threshold
    #[arg(long, default_value_t = 0.5)]
    iou: f32,

    /// Directory to save annotated images into
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Label content drawn next to each box
    #[arg(long, value_enum, default_value_t = LabelArg::Descriptive)]
    labels: LabelArg,

    /// TrueType font for label text; box strokes are drawn without it
    #[arg(long, value_name = "FONT")]
    font: Option<PathBuf>,

    /// Drive the images through the live capture loop instead of the
    /// one-at-a-time still workflow
    #[arg(long)]
    live: bool,

    /// Print the defect records as JSON after each image
    #[arg(long)]
    dump_json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LabelArg {
    /// Class name with confidence percentage
    Descriptive,
    /// Numeric ID cross-referencing the defect table
    Id,
}

fn build_detector(cli: &Cli) -> Result<Box<dyn Detector>> {
    #[cfg(feature = "onnx")]
    {
        use defectview::detection::onnx::{OnnxDetector, load_class_names};
        let model = cli
            .model
            .as_ref()
            .context("--model is required for inference")?;
        let classes = cli
            .classes
            .as_ref()
            .context("--classes is required for inference")?;
        let names = load_class_names(classes)?;
        let detector = OnnxDetector::new(model, names, cli.input_size, cli.input_size)?;
        Ok(Box::new(detector))
    }
    #[cfg(not(feature = "onnx"))]
    {
        let _ = cli;
        anyhow::bail!("this build has no inference backend; rebuild with --features onnx")
    }
}

fn load_font(path: &PathBuf) -> Result<ab_glyph::FontArc> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read font file {:?}", path))?;
    ab_glyph::FontArc::try_from_vec(bytes).context("failed to parse font file")
}

fn print_defect_table(ledger: &DefectLedger) {
    if ledger.is_empty() {
        return;
    }
    println!("{:<4} {:<20} {:>10}", "ID", "Class", "Confidence");
    for record in ledger.all() {
        println!(
            "{:<4} {:<20} {:>10}",
            record.id, record.class_label, record.confidence
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = InferenceConfig {
        confidence_threshold: cli.confidence,
        iou_threshold: cli.iou,
    };
    let detector = build_detector(&cli)?;
    let font = cli.font.as_ref().map(load_font).transpose()?;

    if let Some(dir) = &cli.output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {:?}", dir))?;
    }

    if cli.live {
        run_live(cli, detector, font, config)
    } else {
        run_stills(cli, detector, font, config)
    }
}

/// Process each image through the single-slot still workflow: annotate,
/// report, print the defect table, optionally save the export render.
fn run_stills(
    cli: Cli,
    detector: Box<dyn Detector>,
    font: Option<ab_glyph::FontArc>,
    config: InferenceConfig,
) -> Result<()> {
    let mut preview = match cli.labels {
        LabelArg::Descriptive => Annotator::new()
            .with_label_mode(LabelMode::Descriptive)
            .with_color(ColorPolicy::Adaptive),
        // Numbered red boxes; descriptive detail lives in the table.
        LabelArg::Id => Annotator::new()
            .with_label_mode(LabelMode::Identifier)
            .with_color(ColorPolicy::Fixed(image::Rgb([238, 0, 0]))),
    };
    let mut export = Annotator::new()
        .with_label_mode(LabelMode::Descriptive)
        .with_color(ColorPolicy::Fixed(defectview::session::EXPORT_COLOR));
    if let Some(font) = &font {
        preview = preview.with_font(font.clone(), 14.0);
        export = export.with_font(font.clone(), 14.0);
    }

    let mut session = ImageSession::new(detector)
        .with_config(config)
        .with_preview(preview)
        .with_export(export)
        .with_verbose(cli.verbose);

    let total = cli.images.len();
    for (i, path) in cli.images.iter().enumerate() {
        if cli.verbose {
            println!("Loading image: {:?}", path);
        }
        let frame = match ImageReader::open(path) {
            Ok(reader) => match reader.decode() {
                Ok(img) => img.into_rgb8(),
                Err(e) => {
                    eprintln!("skipping {:?}: failed to decode image: {}", path, e);
                    continue;
                }
            },
            Err(e) => {
                eprintln!("skipping {:?}: {}", path, e);
                continue;
            }
        };

        let report = match session.process(&frame, path, i + 1, total) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("inference failed for {:?}: {}", path, e);
                continue;
            }
        };

        println!("{}", report.summary);
        print_defect_table(session.ledger());
        println!("{}", report.time_line);

        if cli.dump_json {
            println!("{}", serde_json::to_string_pretty(session.ledger().all())?);
        }

        if let Some(dir) = &cli.output {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("image");
            session.save(&dir.join(format!("{}_annotated.png", stem)))?;
        }
    }

    Ok(())
}

/// Drive the image list through the capture loop as a simulated camera.
fn run_live(
    cli: Cli,
    detector: Box<dyn Detector>,
    font: Option<ab_glyph::FontArc>,
    config: InferenceConfig,
) -> Result<()> {
    let mut annotator = Annotator::new()
        .with_label_mode(LabelMode::Descriptive)
        .with_color(ColorPolicy::Adaptive);
    if let Some(font) = font {
        annotator = annotator.with_font(font, 14.0);
    }

    let source = ImageSequenceSource::new(cli.images.clone());
    let mut controller = CaptureController::new(source, detector, annotator).with_config(config);
    controller.start()?;

    let mut cycle = 0usize;
    while controller.is_running() && !controller.source().is_exhausted() {
        cycle += 1;
        match controller.run_cycle() {
            Ok(Some(output)) => {
                println!(
                    "cycle {}: {} detections, {}, {}",
                    cycle,
                    output.detections.len(),
                    output.time_line(),
                    output.fps_line()
                );
                if let Some(dir) = &cli.output {
                    output
                        .rendered
                        .save(dir.join(format!("frame_{:04}.png", cycle)))?;
                }
            }
            Ok(None) => {
                if cli.verbose {
                    println!("cycle {}: no frame available", cycle);
                }
            }
            Err(e) => eprintln!("cycle {}: inference failed: {}", cycle, e),
        }
    }
    controller.stop();

    Ok(())
}
