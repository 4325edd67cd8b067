//! Time-bucketed file writer
//!
//! Every write lands in `<base>.<YYYY>-<MM>-<DD>-<HH>.log`, where the stamp is
//! the UTC start of the current rotation bucket. A stable alias at `<base>`
//! always points at the newest bucket so tools can tail a fixed name.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::clock::{Clock, SystemClock};
use super::retention::prune_expired;

/// Marker that may appear in configured paths and is removed before use
pub const PATH_PLACEHOLDER: &str = "___";

/// `chrono` format of the bucket stamp embedded in file names
pub const BUCKET_FORMAT: &str = "%Y-%m-%d-%H";

const SECS_PER_HOUR: u64 = 60 * 60;

/// Where and how often to rotate, and how long to keep old buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    base_path: PathBuf,
    retention_hours: u64,
    rotation_hours: u64,
}

impl RotationPolicy {
    /// Build a policy from the configured save path
    ///
    /// The placeholder marker is stripped from `save_path`. A rotation interval
    /// of zero hours is treated as one hour. Zero retention days keeps every
    /// bucket.
    pub fn new(save_path: &str, retention_days: u32, rotation_hours: u32) -> Self {
        Self {
            base_path: PathBuf::from(save_path.replace(PATH_PLACEHOLDER, "")),
            retention_hours: u64::from(retention_days) * 24,
            rotation_hours: u64::from(rotation_hours.max(1)),
        }
    }

    /// Path of the alias; bucket files are named after it
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// How long bucket files are kept, or `None` if they are never pruned
    pub fn retention(&self) -> Option<Duration> {
        (self.retention_hours > 0).then(|| Duration::from_secs(self.retention_hours * SECS_PER_HOUR))
    }

    /// Length of one bucket
    pub fn rotation_interval(&self) -> Duration {
        Duration::from_secs(self.rotation_hours * SECS_PER_HOUR)
    }

    /// Start of the bucket containing `now`, aligned to the interval since the epoch
    pub fn bucket_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let interval = self.rotation_interval().as_secs() as i64;
        let secs = now.timestamp();
        let start = secs - secs.rem_euclid(interval);
        DateTime::from_timestamp(start, 0).unwrap_or(now)
    }

    /// Path of the bucket file starting at `start`
    pub fn bucket_path(&self, start: DateTime<Utc>) -> PathBuf {
        let mut name = OsString::from(self.base_path.as_os_str());
        name.push(format!(".{}.log", start.format(BUCKET_FORMAT)));
        PathBuf::from(name)
    }

    /// Directory holding the alias and bucket files
    pub(crate) fn directory(&self) -> &Path {
        match self.base_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// The base path must name a file, not a directory
    ///
    /// `Path::file_name` looks through a trailing separator, so `logs/` would
    /// otherwise pass and put buckets inside the directory.
    fn validate(&self) -> io::Result<()> {
        let trailing_separator = self
            .base_path
            .to_string_lossy()
            .ends_with(std::path::is_separator);

        if self.base_path.file_name().is_none() || trailing_separator || self.base_path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "log save path {:?} does not name a file",
                    self.base_path.display()
                ),
            ));
        }
        Ok(())
    }
}

/// The bucket file currently receiving writes
struct OpenBucket {
    start: DateTime<Utc>,
    path: PathBuf,
    file: File,
}

/// A byte sink that rolls over to a new file whenever the bucket changes
///
/// Bucket selection, rotation, pruning and the write itself happen under one
/// lock, so concurrent writers never see a half-rotated state.
pub struct RotationWriter {
    policy: RotationPolicy,
    clock: Arc<dyn Clock>,
    current: Mutex<Option<OpenBucket>>,
}

impl RotationWriter {
    /// Create a writer driven by the system clock
    pub fn new(policy: RotationPolicy) -> io::Result<Self> {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    /// Create a writer driven by `clock`
    ///
    /// Fails if the policy path does not name a file or its directory cannot be
    /// created. No bucket file is opened until the first write.
    pub fn with_clock(policy: RotationPolicy, clock: Arc<dyn Clock>) -> io::Result<Self> {
        policy.validate()?;
        fs::create_dir_all(policy.directory())?;
        Ok(Self {
            policy,
            clock,
            current: Mutex::new(None),
        })
    }

    /// The policy this writer follows
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Path of the bucket file written last, if any
    pub fn current_path(&self) -> Option<PathBuf> {
        self.current
            .lock()
            .ok()
            .and_then(|current| current.as_ref().map(|b| b.path.clone()))
    }

    /// Write `buf` in full to the bucket for the current time
    ///
    /// On an I/O failure the write is abandoned and the error returned; the
    /// next write retries the rotation.
    pub fn write_record(&self, buf: &[u8]) -> io::Result<usize> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "rotation writer lock poisoned"))?;

        let now = self.clock.now();
        let start = self.policy.bucket_start(now);

        let bucket = match current.take() {
            Some(bucket) if bucket.start == start => bucket,
            _ => self.rotate(start, now)?,
        };
        let bucket = current.insert(bucket);

        bucket.file.write_all(buf)?;
        Ok(buf.len())
    }

    /// Open the bucket starting at `start`, repoint the alias and prune old buckets
    fn rotate(&self, start: DateTime<Utc>, now: DateTime<Utc>) -> io::Result<OpenBucket> {
        let path = self.policy.bucket_path(start);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        // Alias and pruning are best effort
        let _ = self.link_alias(&path);
        let _ = prune_expired(&self.policy, now, Some(&path));

        Ok(OpenBucket { start, path, file })
    }

    /// Point the alias at `target`, replacing it atomically via a temporary link
    fn link_alias(&self, target: &Path) -> io::Result<()> {
        let alias = self.policy.base_path();
        let mut tmp = OsString::from(alias.as_os_str());
        tmp.push("_symlink");
        let tmp = PathBuf::from(tmp);

        match fs::remove_file(&tmp) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        #[cfg(unix)]
        {
            // Bucket files always sit next to the alias
            let relative = target.file_name().map(Path::new).unwrap_or(target);
            std::os::unix::fs::symlink(relative, &tmp)?;
        }
        #[cfg(not(unix))]
        fs::hard_link(target, &tmp)?;

        fs::rename(&tmp, alias)
    }
}

impl Write for &RotationWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_record(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.current.lock() {
            Ok(mut current) => match current.as_mut() {
                Some(bucket) => bucket.file.flush(),
                None => Ok(()),
            },
            Err(_) => Ok(()),
        }
    }
}

impl Write for RotationWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self).flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::clock::ManualClock;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 21, h, m, 0).unwrap()
    }

    fn writer_at(dir: &TempDir, now: DateTime<Utc>) -> (RotationWriter, Arc<ManualClock>) {
        let base = dir.path().join("app");
        let policy = RotationPolicy::new(base.to_str().unwrap(), 7, 1);
        let clock = Arc::new(ManualClock::new(now));
        let writer = RotationWriter::with_clock(policy, clock.clone()).unwrap();
        (writer, clock)
    }

    #[test]
    fn test_policy_strips_placeholder() {
        let policy = RotationPolicy::new("/var/log/app___", 7, 1);
        assert_eq!(policy.base_path(), Path::new("/var/log/app"));
        assert_eq!(
            policy.bucket_path(at(14, 0)),
            PathBuf::from("/var/log/app.2026-01-21-14.log")
        );
    }

    #[test]
    fn test_policy_durations() {
        let policy = RotationPolicy::new("app", 2, 0);
        assert_eq!(policy.rotation_interval(), Duration::from_secs(3600));
        assert_eq!(policy.retention(), Some(Duration::from_secs(2 * 24 * 3600)));
        assert_eq!(RotationPolicy::new("app", 0, 1).retention(), None);
    }

    #[test]
    fn test_bucket_start_aligns_to_interval() {
        let hourly = RotationPolicy::new("app", 7, 1);
        assert_eq!(hourly.bucket_start(at(14, 59)), at(14, 0));

        let six_hourly = RotationPolicy::new("app", 7, 6);
        assert_eq!(six_hourly.bucket_start(at(14, 59)), at(12, 0));
        assert_eq!(six_hourly.bucket_start(at(5, 10)), at(0, 0));
    }

    #[test]
    fn test_directory_of_bare_name() {
        assert_eq!(RotationPolicy::new("app", 7, 1).directory(), Path::new("."));
    }

    #[test]
    fn test_construction_rejects_pathless_policy() {
        assert!(RotationWriter::new(RotationPolicy::new("___", 7, 1)).is_err());
        assert!(RotationWriter::new(RotationPolicy::new("", 7, 1)).is_err());
    }

    #[test]
    fn test_construction_rejects_directory_paths() {
        let dir = TempDir::new().unwrap();
        let logs = dir.path().join("logs");
        fs::create_dir(&logs).unwrap();

        let trailing = format!("{}/", logs.to_str().unwrap());
        let marker_only = format!("{}/___", logs.to_str().unwrap());
        for path in [trailing.as_str(), marker_only.as_str(), logs.to_str().unwrap()] {
            assert!(RotationWriter::new(RotationPolicy::new(path, 1, 1)).is_err());
        }
        assert_eq!(fs::read_dir(&logs).unwrap().count(), 0);
    }

    #[test]
    fn test_construction_creates_directory() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("nested/deeper/app");
        let writer = RotationWriter::new(RotationPolicy::new(base.to_str().unwrap(), 7, 1)).unwrap();
        assert!(dir.path().join("nested/deeper").is_dir());
        assert!(writer.current_path().is_none());
    }

    #[test]
    fn test_write_creates_bucket_and_alias() {
        let dir = TempDir::new().unwrap();
        let (writer, _clock) = writer_at(&dir, at(14, 30));

        assert_eq!(writer.write_record(b"first\n").unwrap(), 6);

        let bucket = dir.path().join("app.2026-01-21-14.log");
        assert_eq!(writer.current_path(), Some(bucket.clone()));
        assert_eq!(fs::read_to_string(&bucket).unwrap(), "first\n");
        assert_eq!(fs::read_to_string(dir.path().join("app")).unwrap(), "first\n");
        assert!(!dir.path().join("app_symlink").exists());
    }

    #[test]
    fn test_writes_straddling_hour_boundary() {
        let dir = TempDir::new().unwrap();
        let (writer, clock) = writer_at(&dir, at(14, 59));

        writer.write_record(b"before\n").unwrap();
        clock.set(at(15, 0));
        writer.write_record(b"after\n").unwrap();

        let first = dir.path().join("app.2026-01-21-14.log");
        let second = dir.path().join("app.2026-01-21-15.log");
        assert_eq!(fs::read_to_string(first).unwrap(), "before\n");
        assert_eq!(fs::read_to_string(&second).unwrap(), "after\n");
        assert_eq!(fs::read_to_string(dir.path().join("app")).unwrap(), "after\n");
        assert_eq!(writer.current_path(), Some(second));
    }

    #[test]
    fn test_same_bucket_appends() {
        let dir = TempDir::new().unwrap();
        let (mut writer, clock) = writer_at(&dir, at(9, 0));

        writer.write_all(b"one\n").unwrap();
        clock.set(at(9, 45));
        writer.write_all(b"two\n").unwrap();
        writer.flush().unwrap();

        let bucket = dir.path().join("app.2026-01-21-09.log");
        assert_eq!(fs::read_to_string(bucket).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_reopening_existing_bucket_appends() {
        let dir = TempDir::new().unwrap();
        let bucket = dir.path().join("app.2026-01-21-09.log");
        fs::write(&bucket, "earlier run\n").unwrap();

        let (writer, _clock) = writer_at(&dir, at(9, 10));
        writer.write_record(b"this run\n").unwrap();

        assert_eq!(
            fs::read_to_string(bucket).unwrap(),
            "earlier run\nthis run\n"
        );
    }

    #[test]
    fn test_rotation_prunes_expired_buckets() {
        let dir = TempDir::new().unwrap();
        let stale = dir.path().join("app.2026-01-10-09.log");
        let fresh = dir.path().join("app.2026-01-20-09.log");
        fs::write(&stale, "old\n").unwrap();
        fs::write(&fresh, "recent\n").unwrap();

        let (writer, _clock) = writer_at(&dir, at(9, 0));
        writer.write_record(b"now\n").unwrap();

        assert!(!stale.exists());
        assert!(fresh.exists());
    }

    #[test]
    fn test_concurrent_writes_keep_lines_whole() {
        let dir = TempDir::new().unwrap();
        let (writer, _clock) = writer_at(&dir, at(10, 0));
        let writer = Arc::new(writer);

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let writer = Arc::clone(&writer);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        writer
                            .write_record(format!("thread-{t} line-{i}\n").as_bytes())
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = fs::read_to_string(dir.path().join("app.2026-01-21-10.log")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 200);
        assert!(lines.iter().all(|l| l.starts_with("thread-") && l.contains(" line-")));
    }
}
