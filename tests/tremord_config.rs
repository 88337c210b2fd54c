use std::sync::Mutex;

use tempfile::NamedTempFile;

use tremor_capture::config::TremordConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "TREMOR_CONFIG",
        "TREMOR_CAMERA_DEVICE",
        "TREMOR_CAMERA_FPS",
        "TREMOR_CAMERA_WIDTH",
        "TREMOR_CAMERA_HEIGHT",
        "TREMOR_RECORDING_MAX_FRAMES",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let toml = r#"
[camera]
device = "/dev/video2"
target_fps = 15
width = 800
height = 600

[recording]
max_frames = 450
"#;
    std::io::Write::write_all(&mut file, toml.as_bytes()).expect("write config");

    std::env::set_var("TREMOR_CONFIG", file.path());
    std::env::set_var("TREMOR_CAMERA_DEVICE", "stub://bench");
    std::env::set_var("TREMOR_CAMERA_FPS", "30");

    let cfg = TremordConfig::load().expect("load config");
    assert_eq!(cfg.camera.device, "stub://bench");
    assert_eq!(cfg.camera.target_fps, 30);
    assert_eq!(cfg.camera.width, 800);
    assert_eq!(cfg.camera.height, 600);
    assert_eq!(cfg.recording.max_frames, Some(450));

    clear_env();
}

#[test]
fn defaults_apply_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = TremordConfig::load().expect("load defaults");
    assert_eq!(cfg.camera.device, "stub://camera");
    assert_eq!(cfg.camera.target_fps, 10);
    assert_eq!(cfg.camera.width, 640);
    assert_eq!(cfg.camera.height, 480);
    assert_eq!(cfg.recording.max_frames, None);
}

#[test]
fn zero_fps_rejected() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("TREMOR_CAMERA_FPS", "0");
    assert!(TremordConfig::load().is_err());
    clear_env();
}

#[test]
fn unparseable_env_value_rejected() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("TREMOR_RECORDING_MAX_FRAMES", "many");
    assert!(TremordConfig::load().is_err());
    clear_env();
}

#[test]
fn missing_config_file_is_an_error() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("TREMOR_CONFIG", "/definitely/not/here.toml");
    assert!(TremordConfig::load().is_err());
    clear_env();
}
