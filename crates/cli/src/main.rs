use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use vitals_core::detection::domain::face_detector::FaceDetector;
use vitals_core::detection::infrastructure::cached_face_detector::CachedFaceDetector;
use vitals_core::detection::infrastructure::fixed_face_detector::FixedFaceDetector;
use vitals_core::pipeline::infrastructure::threaded_session_executor::{
    ExecutorError, FrameJob, OverflowPolicy, ThreadedSessionExecutor, DEFAULT_QUEUE_CAPACITY,
};
use vitals_core::pipeline::session_config::ConfigUpdate;
use vitals_core::pipeline::session_logger::StatsSessionLogger;
use vitals_core::pipeline::vitals_result::VitalsResult;
use vitals_core::pipeline::vitals_service::VitalsService;
use vitals_core::shared::constants::{DEFAULT_FPS, IMAGE_EXTENSIONS};
use vitals_core::shared::estimator_config::EstimatorConfig;
use vitals_core::shared::face_region::FaceRegion;
use vitals_core::video::infrastructure::image_frame_decoder::ImageFrameDecoder;

/// Replays a directory of frame images through a vital sign session and
/// prints one JSON result per frame.
#[derive(Parser)]
#[command(name = "vitals")]
struct Cli {
    /// Directory of frame images, processed in file name order.
    input: PathBuf,

    /// Write results to this file instead of stdout (one JSON object per line).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Fixed face box as x,y,width,height (applied to every frame).
    #[arg(long, value_delimiter = ',')]
    face: Option<Vec<i32>>,

    /// JSON file mapping frame index to a face box or null.
    #[arg(long)]
    faces: Option<PathBuf>,

    /// Capture rate used to timestamp the frames.
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: f64,

    /// Estimator parameters as JSON; missing keys use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Session sensitivity sent as a configuration update before the first frame.
    #[arg(long)]
    sensitivity: Option<f64>,

    /// Session motion rejection sent as a configuration update before the first frame.
    #[arg(long)]
    motion_rejection: Option<f64>,

    /// Frames that may wait for the worker.
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Drop frames instead of waiting when the queue is full.
    #[arg(long)]
    drop_when_full: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    replay(&cli)
}

fn replay(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    validate(cli)?;

    let estimator_config = match &cli.config {
        Some(path) => EstimatorConfig::from_json_file(path)?,
        None => EstimatorConfig::default(),
    };
    let frames = list_frames(&cli.input)?;
    if frames.is_empty() {
        return Err(format!("No frame images found in {}", cli.input.display()).into());
    }
    log::info!("Found {} frames in {}", frames.len(), cli.input.display());

    let service = VitalsService::new(
        Box::new(ImageFrameDecoder::new()),
        build_detector(cli)?,
        &estimator_config,
        Box::new(StatsSessionLogger::default()),
    );
    let policy = if cli.drop_when_full {
        OverflowPolicy::DropNewest
    } else {
        OverflowPolicy::Block
    };
    let mut executor = ThreadedSessionExecutor::spawn(service, cli.queue_capacity, policy);
    executor.configure(&ConfigUpdate {
        sensitivity: cli.sensitivity,
        motion_rejection: cli.motion_rejection,
    });

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(fs::File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let total = frames.len();
    for (i, path) in frames.iter().enumerate() {
        let bytes = fs::read(path)?;
        match executor.submit(FrameJob::at(bytes, i as f64 / cli.fps)) {
            Ok(()) | Err(ExecutorError::QueueFull) => {}
            Err(e) => return Err(e.into()),
        }
        for result in executor.results().try_iter() {
            write_result(&mut out, &result)?;
        }
        eprint!("\rSubmitted frame {}/{total}", i + 1);
    }
    eprintln!();

    let finished = executor.finish()?;
    for result in &finished.remaining {
        write_result(&mut out, result)?;
    }
    out.flush()?;

    if let Some(summary) = finished.service.logger().summary() {
        log::info!("{summary}");
    }
    if finished.dropped_frames > 0 {
        log::info!("{} frames dropped", finished.dropped_frames);
    }
    if let Some(path) = &cli.output {
        log::info!("Results written to {}", path.display());
    }
    Ok(())
}

fn build_detector(cli: &Cli) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.faces {
        let detector = CachedFaceDetector::from_json_file(path)?;
        log::info!("Loaded {} cached detections", detector.len());
        return Ok(Box::new(detector));
    }
    let face = cli.face.as_deref().map(parse_face).transpose()?;
    if face.is_none() {
        log::warn!("No face source given; every frame will report No Face");
    }
    Ok(Box::new(FixedFaceDetector::new(face)))
}

fn parse_face(values: &[i32]) -> Result<FaceRegion, Box<dyn std::error::Error>> {
    let [x, y, width, height] = <[i32; 4]>::try_from(values)
        .map_err(|_| format!("Face must be x,y,width,height, got {} values", values.len()))?;
    if width <= 0 || height <= 0 {
        return Err(format!("Face size must be positive, got {width}x{height}").into());
    }
    Ok(FaceRegion::new(x, y, width, height))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.is_dir() {
        return Err(format!("Input directory not found: {}", cli.input.display()).into());
    }
    if cli.face.is_some() && cli.faces.is_some() {
        return Err("--face and --faces are mutually exclusive".into());
    }
    if let Some(path) = &cli.faces {
        if !path.exists() {
            return Err(format!("Faces file not found: {}", path.display()).into());
        }
    }
    if !(cli.fps.is_finite() && cli.fps > 0.0) {
        return Err(format!("FPS must be positive, got {}", cli.fps).into());
    }
    if cli.queue_capacity == 0 {
        return Err("Queue capacity must be at least 1".into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn list_frames(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image(&path) {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

fn write_result(out: &mut dyn Write, result: &VitalsResult) -> io::Result<()> {
    serde_json::to_writer(&mut *out, result)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_face() {
        assert_eq!(parse_face(&[1, 2, 30, 40]).unwrap(), FaceRegion::new(1, 2, 30, 40));
        assert!(parse_face(&[1, 2, 30]).is_err());
        assert!(parse_face(&[1, 2, 0, 40]).is_err());
    }

    #[test]
    fn test_is_image_ignores_case() {
        assert!(is_image(Path::new("frame_001.PNG")));
        assert!(is_image(Path::new("a/b.jpeg")));
        assert!(!is_image(Path::new("notes.txt")));
        assert!(!is_image(Path::new("no_extension")));
    }

    #[test]
    fn test_list_frames_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["002.png", "000.png", "001.jpg", "readme.md"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let names: Vec<_> = list_frames(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["000.png", "001.jpg", "002.png"]);
    }

    #[test]
    fn test_write_result_is_json_line() {
        let mut buf = Vec::new();
        write_result(&mut buf, &VitalsResult::no_face()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["quality"], "No Face");
    }

    #[test]
    fn test_replays_frames_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let frames = dir.path().join("frames");
        fs::create_dir(&frames).unwrap();
        for i in 0..3 {
            let img = image::RgbImage::from_pixel(32, 32, image::Rgb([200, 150, 120]));
            img.save(frames.join(format!("{i:03}.png"))).unwrap();
        }
        let output = dir.path().join("results.jsonl");
        let cli = Cli::parse_from([
            "vitals",
            frames.to_str().unwrap(),
            "--face",
            "0,0,32,32",
            "--output",
            output.to_str().unwrap(),
        ]);

        replay(&cli).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["quality"], "Poor");
            assert_eq!(value["roi"], serde_json::json!([8, 3, 16, 6]));
        }
    }

    #[test]
    fn test_rejects_conflicting_face_sources() {
        let dir = tempfile::tempdir().unwrap();
        let faces = dir.path().join("faces.json");
        fs::write(&faces, "{}").unwrap();
        let cli = Cli::parse_from([
            "vitals",
            dir.path().to_str().unwrap(),
            "--face",
            "0,0,10,10",
            "--faces",
            faces.to_str().unwrap(),
        ]);
        assert!(validate(&cli).is_err());
    }

    #[test]
    fn test_empty_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from(["vitals", dir.path().to_str().unwrap()]);
        assert!(replay(&cli).is_err());
    }
}
