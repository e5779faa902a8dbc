use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use tracing::debug;

static DUMP_COUNTER: AtomicUsize = AtomicUsize::new(0);
static RUN_STAMP: OnceLock<String> = OnceLock::new();

/// Writes grid renderings to `<dir>/<yyyyMMdd_HHmmss>_<n>.log`.
///
/// The timestamp (UTC) is taken once per process, the first time a dumper is
/// created, so every dump of one run shares it. `n` counts up from 1 across
/// the process, so dumps from concurrent queries never collide.
#[derive(Debug, Clone)]
pub struct Dumper {
    dir: PathBuf,
    stamp: &'static str,
}

impl Dumper {
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating dump directory {}", dir.display()))?;
        let stamp = match RUN_STAMP.get() {
            Some(stamp) => stamp,
            None => {
                let secs = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .context("system clock is before the unix epoch")?
                    .as_secs();
                RUN_STAMP.get_or_init(|| utc_stamp(secs))
            }
        };
        Ok(Self { dir, stamp })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `contents` to a fresh file and returns its path.
    pub fn write(&self, contents: &str) -> anyhow::Result<PathBuf> {
        let n = DUMP_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
        let path = self.dir.join(format!("{}_{n}.log", self.stamp));

        fs::write(&path, contents).with_context(|| format!("writing dump {}", path.display()))?;
        debug!(path = %path.display(), bytes = contents.len(), "Wrote grid dump");
        Ok(path)
    }
}

/// Formats seconds since the unix epoch as `yyyyMMdd_HHmmss` in UTC.
fn utc_stamp(secs: u64) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (hour, minute, second) = (rem / 3600, rem % 3600 / 60, rem % 60);

    // Civil date from day count, proleptic Gregorian calendar.
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);

    format!("{year:04}{month:02}{day:02}_{hour:02}{minute:02}{second:02}")
}
