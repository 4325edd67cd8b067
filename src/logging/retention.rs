//! Log file retention management
//!
//! Handles cleanup of bucket files whose stamp falls outside the retention window.

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};

use super::rotation::RotationPolicy;

/// Parse the bucket start out of a bucket file name
///
/// Returns `None` unless `name` is exactly `<stem>.<YYYY-MM-DD-HH>.log`.
pub fn bucket_stamp(stem: &str, name: &str) -> Option<DateTime<Utc>> {
    let stamp = name
        .strip_prefix(stem)?
        .strip_prefix('.')?
        .strip_suffix(".log")?;
    if stamp.len() != 13 {
        return None;
    }

    NaiveDateTime::parse_from_str(&format!("{stamp}-00"), "%Y-%m-%d-%H-%M")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Remove bucket files older than the policy's retention window
///
/// `keep` is never removed. Deletion failures are ignored. Returns the number
/// of files deleted.
pub fn prune_expired(policy: &RotationPolicy, now: DateTime<Utc>, keep: Option<&Path>) -> usize {
    let Some(retention) = policy.retention() else {
        return 0;
    };
    let Some(stem) = policy.base_path().file_name().and_then(|n| n.to_str()) else {
        return 0;
    };
    let cutoff = now.timestamp() - retention.as_secs() as i64;

    let Ok(entries) = fs::read_dir(policy.directory()) else {
        return 0;
    };

    let mut deleted_count = 0;

    for entry in entries.flatten() {
        let path = entry.path();

        let Some(started) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|name| bucket_stamp(stem, name))
        else {
            continue;
        };

        if keep.is_some_and(|k| k.file_name() == path.file_name()) {
            continue;
        }

        if started.timestamp() < cutoff && fs::remove_file(&path).is_ok() {
            deleted_count += 1;
        }
    }

    deleted_count
}
