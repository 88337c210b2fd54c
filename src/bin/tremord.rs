//! tremord - capture daemon
//!
//! This daemon:
//! 1. Opens the configured frame source (stub, still image, or V4L2 device)
//! 2. Polls frames at the configured rate
//! 3. Runs each frame through the preprocessing pipeline
//! 4. Logs foreground coverage and source health
//! 5. Optionally records a clip at startup and reports its size

use anyhow::Result;
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tremor_capture::{open_source, preprocess, CaptureSession, TremordConfig};

#[derive(Parser, Debug)]
#[command(name = "tremord", about = "Camera capture and preprocessing daemon")]
struct Args {
    /// Capture device, overriding the config: stub://name, an image path,
    /// or a V4L2 device node.
    #[arg(long)]
    device: Option<String>,

    /// Stop after this many frames (0 = run until ctrl-c).
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// Record a clip for this many seconds at startup, then log its size.
    #[arg(long)]
    record_secs: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = TremordConfig::load()?;
    if let Some(device) = args.device {
        cfg.camera.device = device;
    }

    log::info!(
        "tremord {} starting: device={} {}x{} @ {} fps",
        env!("CARGO_PKG_VERSION"),
        cfg.camera.device,
        cfg.camera.width,
        cfg.camera.height,
        cfg.camera.target_fps
    );

    let source = open_source(
        &cfg.camera.device,
        cfg.camera.target_fps,
        cfg.camera.width,
        cfg.camera.height,
    )?;
    let mut session =
        CaptureSession::new(source).with_max_recorded_frames(cfg.recording.max_frames);
    session.connect()?;

    let running = Arc::new(AtomicBool::new(true));
    let running_flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_flag.store(false, Ordering::SeqCst);
    })?;

    let mut recording_deadline = args.record_secs.map(|secs| {
        session.start_recording();
        Instant::now() + Duration::from_secs(secs)
    });

    let frame_interval = Duration::from_millis(1000 / cfg.camera.target_fps.max(1) as u64);
    let mut last_health_log = Instant::now();
    let mut processed = 0u64;

    while running.load(Ordering::SeqCst) {
        let frame = session.get_frame()?;

        match preprocess(&frame) {
            Ok(binary) => {
                processed += 1;
                let foreground = binary.data().iter().filter(|&&p| p == 255).count();
                let ratio = foreground as f64 / binary.data().len() as f64;
                log::debug!(
                    "frame #{}: {}x{} foreground {:.1}%",
                    processed,
                    binary.width(),
                    binary.height(),
                    ratio * 100.0
                );
            }
            Err(e) => {
                log::warn!("frame rejected: {}", e);
            }
        }

        if let Some(deadline) = recording_deadline {
            if Instant::now() >= deadline {
                if let Some(clip) = session.stop_recording() {
                    log::info!("recorded clip: {} frames", clip.len());
                }
                recording_deadline = None;
            }
        }

        if last_health_log.elapsed() >= Duration::from_secs(5) {
            let stats = session.stats();
            log::info!(
                "source={} healthy={} captured={} buffered={} recording={}",
                stats.source,
                stats.source_healthy,
                stats.frames_captured,
                stats.frames_buffered,
                stats.recording
            );
            last_health_log = Instant::now();
        }

        if args.frames > 0 && processed >= args.frames {
            break;
        }

        std::thread::sleep(frame_interval);
    }

    if let Some(clip) = session.stop_recording() {
        log::info!("recorded clip (interrupted): {} frames", clip.len());
    }
    let stats = session.stats();
    log::info!(
        "tremord stopping: captured={} processed={}",
        stats.frames_captured,
        processed
    );
    Ok(())
}
