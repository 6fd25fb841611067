use std::path::{Path, PathBuf};

use assert_cmd::Command;
use image::{GrayImage, Luma};
use predicates::prelude::*;
use serde_json::Value;

fn write_image(dir: &Path, name: &str, img: &GrayImage) -> PathBuf {
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

fn diagonal() -> GrayImage {
    let mut img = GrayImage::from_pixel(100, 100, Luma([255]));
    for i in 10..=90 {
        img.put_pixel(i, i, Luma([0]));
    }
    img
}

fn ring() -> GrayImage {
    let mut img = GrayImage::from_pixel(120, 120, Luma([255]));
    let n = 800;
    for k in 0..n {
        let t = std::f64::consts::TAU * k as f64 / n as f64;
        let x = (60.0 + 25.0 * t.cos()).round() as u32;
        let y = (60.0 + 25.0 * t.sin()).round() as u32;
        img.put_pixel(x, y, Luma([0]));
    }
    img
}

fn hough() -> Command {
    Command::cargo_bin("hough-shapes").unwrap()
}

fn report(output: &[u8]) -> Value {
    serde_json::from_slice(output).unwrap()
}

#[test]
fn randomized_lines_report() {
    let dir = tempfile::tempdir().unwrap();
    let img = write_image(dir.path(), "diag.png", &diagonal());

    let out = hough()
        .arg(&img)
        .args(["--seed", "7", "lines", "--method", "randomized", "--votes", "50"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json = report(&out);
    assert_eq!(json["shape"], "lines");
    assert_eq!(json["method"], "randomized");
    assert_eq!(json["termination"], "points_exhausted");
    let lines = json["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["param"]["form"], "normal");
    let theta = lines[0]["param"]["theta"].as_f64().unwrap();
    assert!((theta - std::f64::consts::FRAC_PI_4).abs() < 0.02, "theta {theta}");
}

#[test]
fn standard_lines_write_accumulator() {
    let dir = tempfile::tempdir().unwrap();
    let img = write_image(dir.path(), "diag.png", &diagonal());
    let acc = dir.path().join("acc.png");

    let out = hough()
        .arg(&img)
        .args(["lines", "--method", "standard", "--votes", "60"])
        .arg("--accumulator-png")
        .arg(&acc)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json = report(&out);
    assert_eq!(json["method"], "standard");
    assert!(json.get("termination").is_none());
    assert!(!json["lines"].as_array().unwrap().is_empty());
    assert!(image::open(&acc).is_ok());
}

#[test]
fn circles_with_config_and_frame_dump() {
    let dir = tempfile::tempdir().unwrap();
    let img = write_image(dir.path(), "ring.png", &ring());
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{ "circles": { "min_separation": 10.0 } }"#).unwrap();
    let frames = dir.path().join("frames");

    let out = hough()
        .arg(&img)
        .arg("--config")
        .arg(&config)
        .arg("--dump-dir")
        .arg(&frames)
        .args(["--seed", "3", "circles", "--votes", "10"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json = report(&out);
    assert_eq!(json["shape"], "circles");
    let circles = json["circles"].as_array().unwrap();
    assert_eq!(circles.len(), 1);
    let radius = circles[0]["circle"]["radius"].as_f64().unwrap();
    assert!((radius - 25.0).abs() <= 2.0, "radius {radius}");
    assert!(frames.join("circles_0000.png").exists());
}

#[test]
fn unknown_method_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let img = write_image(dir.path(), "diag.png", &diagonal());
    hough()
        .arg(&img)
        .args(["lines", "--method", "fastest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fastest"));
}

#[test]
fn missing_image_fails_cleanly() {
    hough()
        .args(["/nonexistent/input.png", "lines"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error:"));
}

#[test]
fn bad_config_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let img = write_image(dir.path(), "diag.png", &diagonal());
    let config = dir.path().join("broken.json");
    std::fs::write(&config, "{ not json").unwrap();
    hough()
        .arg(&img)
        .arg("--config")
        .arg(&config)
        .arg("lines")
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.json"));
}
