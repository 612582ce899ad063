use std::time::Instant;

use clap::{Parser, Subcommand};
use image_target_tracker::TrackerConfig;
use image_target_tracker::data_loader::{CameraDescription, TimedFrame, load_frames, load_target};
use image_target_tracker::io::{FrameReport, TrackingReport, object_from_json, write_report};
use image_target_tracker::synthetic;
use image_target_tracker::tracker::Tracker;
use nalgebra as na;

#[derive(Parser)]
#[command(version, about, author)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track a target through a folder of frames with a fixed starting pose
    Track {
        /// Target description JSON
        #[arg(short, long)]
        target: String,

        /// Camera JSON with projection and model_view
        #[arg(short, long)]
        camera: String,

        /// Folder of .png / .jpg frames
        #[arg(short, long)]
        frames: String,

        /// Tracker configuration JSON
        #[arg(long)]
        config: Option<String>,

        /// Report output path
        #[arg(short, long, default_value = "tracking.json")]
        output: String,

        #[arg(long, default_value = "0")]
        start_idx: usize,

        #[arg(long, default_value = "1")]
        step: usize,
    },
    /// Track a random texture through synthetic shifted frames
    Demo {
        #[arg(long, default_value = "320")]
        width: u32,

        #[arg(long, default_value = "240")]
        height: u32,

        #[arg(short, long, default_value = "10")]
        num_frames: usize,

        #[arg(long, default_value = "7")]
        seed: u64,

        /// Report output path
        #[arg(short, long, default_value = "tracking.json")]
        output: String,
    },
}

fn run(
    tracker: &Tracker,
    frames: &[TimedFrame],
    model_view: &na::Matrix3x4<f64>,
) -> Result<Vec<FrameReport>, Box<dyn std::error::Error>> {
    let mut reports = Vec::with_capacity(frames.len());
    for f in frames {
        let result = tracker.track_detailed(&f.frame, model_view, 0)?;
        let lost = result.correspondences.is_none();
        reports.push(FrameReport {
            time_ns: f.time_ns,
            lost,
            correspondences: result.correspondences.unwrap_or_default(),
            timing: result.timing,
        });
    }
    Ok(reports)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let (tracker, frames, model_view, output) = match cli.command {
        Commands::Track {
            target,
            camera,
            frames,
            config,
            output,
            start_idx,
            step,
        } => {
            let config: TrackerConfig = match config {
                Some(path) => object_from_json(path)?,
                None => TrackerConfig::default(),
            };
            let camera: CameraDescription = object_from_json(&camera)?;
            let target = load_target(&target)?;
            let frames = load_frames(&frames, start_idx, step)?;
            let Some(first) = frames.first() else {
                return Err("no frames found".into());
            };
            let (w, h) = (first.frame.width(), first.frame.height());
            let tracker = Tracker::new(vec![target], camera.projection_matrix(), w, h, config)?;
            (tracker, frames, camera.model_view_matrix(), output)
        }
        Commands::Demo {
            width,
            height,
            num_frames,
            seed,
            output,
        } => {
            let texture = synthetic::random_texture(width, height, seed);
            let feature_pixels: Vec<_> = (1..4)
                .flat_map(|r| {
                    (1..4).map(move |c| {
                        (c as f32 * width as f32 / 4.0, r as f32 * height as f32 / 4.0)
                    })
                })
                .collect();
            let target = synthetic::single_level_target(
                texture.clone(),
                width,
                height,
                1.0,
                &feature_pixels,
            )?;
            let frames = (0..num_frames)
                .map(|i| -> Result<TimedFrame, Box<dyn std::error::Error>> {
                    let (dx, dy) = ((i % 4) as i32, (i % 3) as i32);
                    let shifted = synthetic::translate(&texture, width, height, dx, dy, 0);
                    Ok(TimedFrame {
                        time_ns: i as i64 * 33_333_333,
                        frame: synthetic::frame_from_intensity(&shifted, width, height)?,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let tracker = Tracker::new(
                vec![target],
                na::Matrix3::identity(),
                width,
                height,
                TrackerConfig::default(),
            )?;
            let model_view = synthetic::fronto_parallel_model_view(height as f64, 1.0);
            (tracker, frames, model_view, output)
        }
    };

    let now = Instant::now();
    let reports = run(&tracker, &frames, &model_view)?;
    let duration_sec = now.elapsed().as_secs_f64();
    println!("tracking took {:.6} sec", duration_sec);
    println!("avg: {} sec", duration_sec / frames.len().max(1) as f64);

    let report = TrackingReport::new(0, reports);
    println!(
        "tracked {} frames, lost {}",
        report.frames_tracked, report.frames_lost
    );
    write_report(&output, &report)?;
    Ok(())
}
