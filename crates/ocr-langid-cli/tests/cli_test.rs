//! Integration tests for the `ocr-langid` binary.

use std::io::Cursor;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;

use image::{ImageFormat, Rgb, RgbImage};

fn run(args: &[&str], cwd: &std::path::Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ocr-langid"))
        .args(args)
        .current_dir(cwd)
        .env("RUST_LOG", "error")
        .env_remove("OCR_LANGID_HOST")
        .env_remove("OCR_LANGID_PORT")
        .env_remove("OCR_LANGID_MAX_UPLOAD_BYTES")
        .output()
        .expect("Failed to execute ocr-langid")
}

fn write_png(path: &std::path::Path) {
    let img = RgbImage::from_pixel(32, 32, Rgb([255, 255, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    std::fs::write(path, out.into_inner()).unwrap();
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["--help"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("identify"));
}

#[test]
fn test_serve_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["serve", "--help"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Start the web server"));
    assert!(stdout.contains("--host"));
    assert!(stdout.contains("--port"));
    assert!(stdout.contains("--config"));
}

#[test]
fn test_identify_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["identify", "does-not-exist.png"], dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read does-not-exist.png"));
}

#[test]
fn test_identify_rejects_non_image() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "plain text, not pixels").unwrap();

    let output = run(&["identify", "notes.txt"], dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not an image"));
}

#[test]
fn test_identify_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    write_png(&dir.path().join("scan.png"));
    std::fs::write(dir.path().join("bad.toml"), "[ocr]\nlanguage = \"not_a_language\"\n").unwrap();

    let output = run(&["identify", "scan.png", "-c", "bad.toml"], dir.path());

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid configuration"));
}

#[test]
fn test_identify_rejects_unknown_language_override() {
    let dir = tempfile::tempdir().unwrap();
    write_png(&dir.path().join("scan.png"));

    let output = run(&["identify", "scan.png", "--language", "xx_unknown"], dir.path());

    assert!(!output.status.success());
}

#[test]
#[ignore = "requires a free port and a running server"]
fn test_serve_command_starts() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_ocr-langid"))
        .args(["serve", "-H", "127.0.0.1", "-p", "18500"])
        .current_dir(dir.path())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to start server");

    thread::sleep(Duration::from_secs(2));

    let mut health_response = ureq::get("http://127.0.0.1:18500/health")
        .call()
        .expect("Failed to call health endpoint");
    assert_eq!(health_response.status(), 200);

    let health_json: serde_json::Value = health_response
        .body_mut()
        .read_json()
        .expect("Failed to parse health response");
    assert_eq!(health_json["status"], "healthy");

    let mut info_response = ureq::get("http://127.0.0.1:18500/info")
        .call()
        .expect("Failed to call info endpoint");
    let info_json: serde_json::Value = info_response.body_mut().read_json().unwrap();
    assert_eq!(info_json["models_available"], false);

    child.kill().expect("Failed to kill server");
    child.wait().expect("Failed to wait for server");
}
