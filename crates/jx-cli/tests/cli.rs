//! End-to-end tests driving the `jexifs` binary.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn jexifs_binary() -> String {
    env!("CARGO_BIN_EXE_jexifs").to_string()
}

const INDEX: &str = "\
path date time exposure_time model
a/IMG_1.JPG 2013-07-09 19:55:00 1/250 X100
a/IMG_2.JPG 2013-07-09 20:05:00 1/60 X100
a/IMG_3.JPG 2013-07-09 23:50:00 1/60 X100
b/IMG_4.JPG 2013-07-10 00:10:00 1/30 X100
b/IMG_5.JPG 2013-07-10 20:01:00 1/125 Canon EOS 5D
";

/// Runs jexifs with an isolated config directory.
fn jexifs(temp: &TempDir, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(jexifs_binary())
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join(".config"))
        .env_remove("RUST_LOG")
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run jexifs");

    if let Some(input) = stdin {
        // jexifs may exit before reading stdin when its arguments are invalid
        let _ = child.stdin.take().unwrap().write_all(input.as_bytes());
    }
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "jexifs should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn write_index(temp: &TempDir) -> String {
    let path = temp.path().join("index.txt");
    std::fs::write(&path, INDEX).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_index_from_stdin() {
    let temp = TempDir::new().unwrap();
    let output = jexifs(&temp, &["-i", "-m", "X100", "-e", "1/60"], Some(INDEX));
    assert_eq!(
        stdout(&output),
        "a/IMG_2.JPG 2013-07-09 20:05:00 1/60 X100\n\
         a/IMG_3.JPG 2013-07-09 23:50:00 1/60 X100\n"
    );
}

#[test]
fn test_model_with_spaces_in_last_column() {
    let temp = TempDir::new().unwrap();
    let index = write_index(&temp);
    let output = jexifs(
        &temp,
        &["-i", &index, "-m", "Canon EOS 5D", "-f", "name: model"],
        None,
    );
    assert_eq!(stdout(&output), "IMG_5.JPG: Canon EOS 5D\n");
}

#[test]
fn test_dated_window_spans_midnight() {
    let temp = TempDir::new().unwrap();
    let index = write_index(&temp);
    let output = jexifs(
        &temp,
        &["-i", &index, "-t", "23:45", "-p", "0", "30", "-f", "name"],
        None,
    );
    assert_eq!(stdout(&output), "IMG_3.JPG\nIMG_4.JPG\n");
}

#[test]
fn test_headline_output_reads_back() {
    let temp = TempDir::new().unwrap();
    let index = write_index(&temp);

    let first = jexifs(
        &temp,
        &["-i", &index, "-d", "2013-07-09", "-H", "-f", "name;datetime"],
        None,
    );
    let selected = stdout(&first);
    assert!(selected.starts_with("name;datetime\n"));

    let second = jexifs(
        &temp,
        &["-i", "-D", "2013-07-09 20:05:00", "-f", "name"],
        Some(&selected),
    );
    assert_eq!(stdout(&second), "IMG_2.JPG\n");
}

#[test]
fn test_first_after_datetimes() {
    let temp = TempDir::new().unwrap();
    let index = write_index(&temp);
    let output = jexifs(
        &temp,
        &[
            "-i",
            &index,
            "-D",
            "2013-07-09 20:00",
            "2013-07-09 21:00",
            "-a",
            "-f",
            "name",
        ],
        None,
    );
    assert_eq!(stdout(&output), "IMG_2.JPG\nIMG_3.JPG\n");
}

#[test]
fn test_unordered_first_after_warns() {
    let temp = TempDir::new().unwrap();
    let index = write_index(&temp);

    let output = jexifs(&temp, &["-i", &index, "-D", "2013-07-09 20:00", "-a"], None);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not sorted by datetime"), "stderr: {stderr}");

    let output = jexifs(&temp, &["-i", &index, "-t", "20:00", "-p", "0", "10"], None);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--plus windows"), "stderr: {stderr}");

    let output = jexifs(
        &temp,
        &["-i", &index, "-t", "20:00", "-p", "0", "10", "-s", "date"],
        None,
    );
    assert!(String::from_utf8_lossy(&output.stderr).is_empty());
}

#[test]
fn test_json_output() {
    let temp = TempDir::new().unwrap();
    let index = write_index(&temp);
    let output = jexifs(&temp, &["-i", &index, "-t", "00:10", "--json"], None);

    let out = stdout(&output);
    let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(value["path"], "b/IMG_4.JPG");
    assert_eq!(value["exposure_time"], "1/30");
}

#[test]
fn test_index_without_headline_needs_format() {
    let temp = TempDir::new().unwrap();
    let body = "IMG_1.JPG;2013-07-09\n";

    let output = jexifs(&temp, &["-i"], Some(body));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("no index format"),
        "unexpected error: {stderr}"
    );

    let output = jexifs(&temp, &["-i", "-F", "name;date"], Some(body));
    assert_eq!(stdout(&output), "IMG_1.JPG;2013-07-09\n");
}

#[test]
fn test_config_file_sets_default_format() {
    let temp = TempDir::new().unwrap();
    let index = write_index(&temp);
    let config = temp.path().join("jexifs.toml");
    std::fs::write(&config, "format = \"model\"\n").unwrap();

    // The index headline takes precedence over the configured format.
    let output = jexifs(
        &temp,
        &["-c", config.to_str().unwrap(), "-i", &index, "-t", "00:10"],
        None,
    );
    assert_eq!(
        stdout(&output),
        "b/IMG_4.JPG 2013-07-10 00:10:00 1/30 X100\n"
    );
}

#[test]
fn test_scan_directory_of_images() {
    let temp = TempDir::new().unwrap();
    let photos = temp.path().join("photos");
    std::fs::create_dir_all(photos.join("day2")).unwrap();
    std::fs::write(photos.join("day2/IMG_2.JPG"), b"").unwrap();
    std::fs::write(photos.join("IMG_1.JPG"), b"").unwrap();
    std::fs::write(photos.join("IMG_1.xmp"), b"").unwrap();

    let source = format!("{}:JPG", photos.display());
    let output = jexifs(&temp, &[&source, "-f", "name model"], None);
    assert_eq!(stdout(&output), "IMG_1.JPG -\nIMG_2.JPG -\n");
}

#[test]
fn test_invalid_arguments_fail() {
    let temp = TempDir::new().unwrap();
    for args in [
        &["-i", "-", "-d", "someday"][..],
        &["-i", "-", "-e", "1/60", "1/250"][..],
        &["-i", "-", "-p", "soon"][..],
        &["-s", "size"][..],
    ] {
        let output = jexifs(&temp, args, Some(INDEX));
        assert!(!output.status.success(), "{args:?} should fail");
    }
}

#[test]
fn test_version() {
    let temp = TempDir::new().unwrap();
    let output = jexifs(&temp, &["--version"], None);
    assert!(stdout(&output).starts_with("jexifs "));
}
