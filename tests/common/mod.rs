#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Hourly violation counts shaped like the published `hourly_agg.csv`.
///
/// Data row `i` (1-based) carries `hour = (i - 1) % 24` and `violations = i`.
pub fn hourly_csv(rows: usize) -> String {
    const WEEKDAYS: [&str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];
    let mut text = String::from("weekday,hour,violations\n");
    for i in 1..=rows {
        let weekday = WEEKDAYS[(i - 1) / 24 % WEEKDAYS.len()];
        let _ = writeln!(text, "{weekday},{},{i}", (i - 1) % 24);
    }
    text
}
