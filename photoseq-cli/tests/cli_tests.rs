use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::fs;

/// A `photoseq` command running inside `temp`, isolated from any user config
fn photoseq(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("photoseq").unwrap();
    cmd.current_dir(temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join(".config"))
        .env_remove("PHOTOSEQ_YES")
        .arg("--no-color");
    cmd
}

fn photos(temp: &TempDir, names: &[&str]) {
    for name in names {
        temp.child("photos").child(name).write_str(name).unwrap();
    }
}

fn read(temp: &TempDir, name: &str) -> String {
    fs::read_to_string(temp.path().join("photos").join(name)).unwrap()
}

#[test]
fn test_number_confirmed_with_yes_answer() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["1.jpg", "2.jpg", "vacation.png", "beach.gif"]);

    photoseq(&temp)
        .arg("number")
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("beach.gif -> 3.jpg"))
        .stdout(predicate::str::contains("Number these 2 new photos? (yes/no)"))
        .stdout(predicate::str::contains("Numbers used: 3 to 4"))
        .stdout(predicate::str::contains("Total numbered photos: 4"));

    assert_eq!(read(&temp, "3.jpg"), "beach.gif");
    assert_eq!(read(&temp, "4.jpg"), "vacation.png");
    temp.child("photos/vacation.png").assert(predicate::path::missing());
}

#[test]
fn test_number_accepts_french_answer() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["new.png"]);

    photoseq(&temp)
        .arg("number")
        .write_stdin("oui\n")
        .assert()
        .success();

    assert_eq!(read(&temp, "1.jpg"), "new.png");
}

#[test]
fn test_number_declined_changes_nothing() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["new.png"]);

    photoseq(&temp)
        .arg("number")
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled"));

    temp.child("photos/new.png").assert(predicate::path::exists());
    temp.child("photos/1.jpg").assert(predicate::path::missing());
}

#[test]
fn test_number_without_answer_cancels() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["new.png"]);

    photoseq(&temp)
        .arg("number")
        .write_stdin("")
        .assert()
        .success();

    temp.child("photos/new.png").assert(predicate::path::exists());
}

#[test]
fn test_number_nothing_to_do() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["1.jpg", "2.jpg"]);

    photoseq(&temp)
        .arg("number")
        .assert()
        .success()
        .stdout(predicate::str::contains("No new photos to number"))
        .stdout(predicate::str::contains("(yes/no)").not());
}

#[test]
fn test_number_duplicate_index_is_configuration_error() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["2.jpg", "02.png", "new.png"]);

    photoseq(&temp)
        .args(["--yes", "number"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("index 2 is used by more than one file"));

    temp.child("photos/new.png").assert(predicate::path::exists());
}

#[test]
fn test_number_missing_directory() {
    let temp = TempDir::new().unwrap();

    photoseq(&temp)
        .args(["number", "--dir", "nowhere"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("directory not found"));
}

#[test]
fn test_order_with_yes_flag() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["a.jpg", "b.jpg"]);
    temp.child("order.json")
        .write_str(r#"{"order": ["b.jpg", "a.jpg"], "timestamp": "2024-05-01T10:00:00Z"}"#)
        .unwrap();

    photoseq(&temp)
        .args(["order", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed 2 of 2 photos"))
        .stdout(predicate::str::contains("(yes/no)").not());

    assert_eq!(read(&temp, "1.jpg"), "b.jpg");
    assert_eq!(read(&temp, "2.jpg"), "a.jpg");
}

#[test]
fn test_order_missing_entry_warns_and_keeps_gap() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["a.jpg", "c.jpg"]);
    temp.child("order.json")
        .write_str(r#"{"order": ["a.jpg", "gone.jpg", "c.jpg"]}"#)
        .unwrap();

    photoseq(&temp)
        .args(["-y", "order"])
        .assert()
        .success()
        .stderr(predicate::str::contains("gone.jpg does not exist"));

    assert_eq!(read(&temp, "1.jpg"), "a.jpg");
    assert_eq!(read(&temp, "3.jpg"), "c.jpg");
    temp.child("photos/2.jpg").assert(predicate::path::missing());
}

#[test]
fn test_order_dry_run_json() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["a.jpg", "b.jpg"]);
    temp.child("order.json")
        .write_str(r#"{"order": ["b.jpg", "a.jpg"]}"#)
        .unwrap();

    let output = photoseq(&temp)
        .args(["order", "--dry-run", "--output", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["operation"], "order");
    assert_eq!(parsed["status"], "dry_run");
    assert_eq!(parsed["manifest_timestamp"], "unknown");
    assert_eq!(parsed["summary"]["planned"], 2);
    assert_eq!(parsed["plan"]["renames"].as_array().unwrap().len(), 2);

    temp.child("photos/a.jpg").assert(predicate::path::exists());
}

#[test]
fn test_order_conflict_needs_overwrite() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["1.jpg", "b.jpg"]);
    temp.child("order.json")
        .write_str(r#"{"order": ["b.jpg"]}"#)
        .unwrap();

    photoseq(&temp)
        .args(["-y", "order"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--overwrite"));
    assert_eq!(read(&temp, "1.jpg"), "1.jpg");

    photoseq(&temp)
        .args(["-y", "order", "--overwrite"])
        .assert()
        .success();
    assert_eq!(read(&temp, "1.jpg"), "b.jpg");
}

#[test]
fn test_order_missing_manifest() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["a.jpg"]);

    photoseq(&temp)
        .args(["-y", "order"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("manifest not found"));
}

#[test]
fn test_order_duplicate_manifest_entry() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["a.jpg"]);
    temp.child("order.json")
        .write_str(r#"{"order": ["a.jpg", "a.jpg"]}"#)
        .unwrap();

    photoseq(&temp)
        .args(["-y", "order"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("more than once"));

    temp.child("photos/a.jpg").assert(predicate::path::exists());
}

#[test]
fn test_convert_png_to_webp() {
    let temp = TempDir::new().unwrap();
    temp.child("photos").create_dir_all().unwrap();
    image::RgbaImage::from_pixel(20, 10, image::Rgba([0, 128, 255, 100]))
        .save(temp.path().join("photos").join("sky.png"))
        .unwrap();

    photoseq(&temp)
        .args(["convert", "--quality", "70"])
        .write_stdin("yes\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Convert these 1 files to WEBP?"))
        .stdout(predicate::str::contains("1 files converted"))
        .stdout(predicate::str::contains("Overall reduction"))
        .stderr(predicate::str::contains("1/1: sky.png -> sky.webp"));

    temp.child("photos_webp/sky.webp")
        .assert(predicate::path::is_file());
}

#[test]
fn test_convert_json_reports_sizes() {
    let temp = TempDir::new().unwrap();
    temp.child("photos").create_dir_all().unwrap();
    image::RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30]))
        .save(temp.path().join("photos").join("a.png"))
        .unwrap();

    let output = photoseq(&temp)
        .args(["-y", "convert", "--format", "jpeg", "--out", "web", "--output", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["format"], "jpeg");
    assert_eq!(parsed["quality"], 85);
    assert_eq!(parsed["summary"]["converted"], 1);
    assert!(parsed["summary"]["bytes_after"].as_u64().unwrap() > 0);
    temp.child("web/a.jpg").assert(predicate::path::is_file());
}

#[test]
fn test_convert_bad_file_exits_with_one() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["broken.jpg"]);

    photoseq(&temp)
        .args(["-y", "convert"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("1 error(s)"));
}

#[test]
fn test_convert_rejects_quality_over_100() {
    let temp = TempDir::new().unwrap();

    photoseq(&temp)
        .args(["convert", "--quality", "150"])
        .assert()
        .code(2);
}

#[test]
fn test_config_quality_out_of_range() {
    let temp = TempDir::new().unwrap();
    temp.child(".photoseq/config.toml")
        .write_str("[defaults]\nquality = 120\n")
        .unwrap();

    photoseq(&temp)
        .arg("status")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid quality 120"));
}

#[test]
fn test_config_sets_photos_dir() {
    let temp = TempDir::new().unwrap();
    temp.child("pics/1.jpg").write_str("x").unwrap();
    temp.child("pics/5.jpg").write_str("x").unwrap();
    temp.child(".photoseq/config.toml")
        .write_str("[defaults]\nphotos_dir = \"pics\"\n")
        .unwrap();

    photoseq(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Numbered photos: 2"))
        .stdout(predicate::str::contains("Missing numbers: 2-4 (3 in total)"));
}

#[test]
fn test_status_json() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["1.jpg", "2.webp", "9.jpg", "new.png"]);

    let output = photoseq(&temp)
        .args(["status", "--output", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let status = &parsed["status"];
    assert_eq!(status["numbered"], 3);
    assert_eq!(status["unnumbered"], 1);
    assert_eq!(status["next_index"], 10);
    assert_eq!(status["gallery_visible"], 2);
}

#[test]
fn test_status_reports_converted_photos() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["1.jpg", "2.jpg", "3.jpg"]);
    temp.child("photos_webp/1.webp").write_str("x").unwrap();
    temp.child("photos_webp/3.webp").write_str("x").unwrap();

    photoseq(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Visible in gallery: 2 of 2 published in"));

    let output = photoseq(&temp)
        .args(["status", "--output", "json"])
        .output()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["gallery"]["published"], 2);
    assert_eq!(parsed["status"]["gallery_visible"], 3);
}

#[test]
fn test_status_with_date_numbered_photo() {
    let temp = TempDir::new().unwrap();
    photos(&temp, &["1.jpg", "20240105.jpg"]);

    photoseq(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Missing numbers: 2-20240104"))
        .stdout(predicate::str::contains("Next number: 20240106"));
}

#[test]
fn test_directory_flag() {
    let temp = TempDir::new().unwrap();
    temp.child("album/photos/x.png").write_str("x").unwrap();

    photoseq(&temp)
        .args(["-C", "album", "-y", "number"])
        .assert()
        .success();

    temp.child("album/photos/1.jpg")
        .assert(predicate::path::exists());
}

#[test]
fn test_version() {
    let temp = TempDir::new().unwrap();

    photoseq(&temp)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("photoseq "));

    let output = photoseq(&temp)
        .args(["version", "--output", "json"])
        .output()
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["name"], "photoseq");
}
