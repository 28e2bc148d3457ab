//! Cache freshness
//!
//! The age of the Lmod cache is the age of the oldest `cacheDir/system.txt`
//! across the configured architectures. Architectures without a timestamp
//! file do not count; when none has one the cache is reported as brand new.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::core::error::CacheError;
use crate::core::layout::{resolve_architectures, system_file};
use crate::core::util::format_time;

/// Oldest cache timestamp, or now when no architecture has one
pub fn oldest_cache_time(basedir: &Path, archs: &[OsString]) -> Result<SystemTime, CacheError> {
    oldest_cache_time_at(basedir, archs, SystemTime::now())
}

/// Like [`oldest_cache_time`], with an explicit "now"
pub fn oldest_cache_time_at(
    basedir: &Path,
    archs: &[OsString],
    now: SystemTime,
) -> Result<SystemTime, CacheError> {
    let mut oldest = now;

    for arch in resolve_architectures(basedir, archs)? {
        match cache_timestamp(&system_file(basedir, &arch))? {
            Some(mtime) if mtime < oldest => oldest = mtime,
            Some(_) => {}
            None => {
                tracing::debug!(arch = %arch.to_string_lossy(), "No cache timestamp, skipping")
            }
        }
    }

    tracing::debug!(oldest = %format_time(oldest), "Oldest cache");
    Ok(oldest)
}

/// Modification time of a cache timestamp file, `None` when there is no such file
pub fn cache_timestamp(path: &Path) -> Result<Option<SystemTime>, CacheError> {
    // a missing or non-directory cacheDir means no cache yet
    if !path.parent().is_some_and(Path::is_dir) {
        return Ok(None);
    }

    let timestamp_error = |source| CacheError::Timestamp {
        path: path.to_path_buf(),
        source,
    };

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(timestamp_error(e)),
    };
    if !metadata.is_file() {
        return Ok(None);
    }

    metadata.modified().map(Some).map_err(timestamp_error)
}

/// Time elapsed since `oldest`; zero for timestamps in the future
pub fn cache_age(oldest: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(oldest).unwrap_or_default()
}

/// Whether `age` exceeds the threshold (strictly greater)
pub fn is_stale(age: Duration, threshold_minutes: u64) -> bool {
    age > Duration::from_secs(threshold_minutes.saturating_mul(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::SYSTEM_FILE;
    use std::fs::File;

    fn write_timestamp(basedir: &Path, arch: &str, mtime: SystemTime) {
        let path = system_file(basedir, arch);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let file = File::create(&path).unwrap();
        file.set_modified(mtime).unwrap();
    }

    fn secs(time: SystemTime) -> u64 {
        time.duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs()
    }

    #[test]
    fn test_no_timestamp_files_is_now() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("skylake")).unwrap();
        fs::create_dir(temp.path().join("broadwell")).unwrap();

        let now = SystemTime::now();
        let oldest = oldest_cache_time_at(temp.path(), &[], now).unwrap();
        assert_eq!(oldest, now);
        assert_eq!(cache_age(oldest, now), Duration::ZERO);
    }

    #[test]
    fn test_no_timestamp_files_age_near_zero() {
        let temp = tempfile::tempdir().unwrap();
        let archs = vec![OsString::from("skylake"), OsString::from("missing")];

        let oldest = oldest_cache_time(temp.path(), &archs).unwrap();
        assert!(cache_age(oldest, SystemTime::now()) < Duration::from_secs(5));
    }

    #[test]
    fn test_returns_oldest_timestamp() {
        let temp = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let t1 = now - Duration::from_secs(3 * 3600);
        let t2 = now - Duration::from_secs(2 * 3600);
        let t3 = now - Duration::from_secs(3600);
        write_timestamp(temp.path(), "broadwell", t2);
        write_timestamp(temp.path(), "ivybridge", t1);
        write_timestamp(temp.path(), "skylake", t3);

        let oldest = oldest_cache_time_at(temp.path(), &[], now).unwrap();
        assert_eq!(secs(oldest), secs(t1));
    }

    #[test]
    fn test_respects_requested_architectures() {
        let temp = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let old = now - Duration::from_secs(7200);
        let recent = now - Duration::from_secs(60);
        write_timestamp(temp.path(), "broadwell", old);
        write_timestamp(temp.path(), "skylake", recent);

        let archs = vec![OsString::from("skylake")];
        let oldest = oldest_cache_time_at(temp.path(), &archs, now).unwrap();
        assert_eq!(secs(oldest), secs(recent));
    }

    #[test]
    fn test_ignores_non_file_timestamp() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(system_file(temp.path(), "skylake")).unwrap();

        let now = SystemTime::now();
        assert_eq!(oldest_cache_time_at(temp.path(), &[], now).unwrap(), now);
    }

    #[test]
    fn test_architecture_file_is_skipped() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("README"), "notes").unwrap();

        let now = SystemTime::now();
        assert_eq!(oldest_cache_time_at(temp.path(), &[], now).unwrap(), now);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_timestamp_link_is_skipped() {
        let temp = tempfile::tempdir().unwrap();
        let path = system_file(temp.path(), "skylake");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink("gone.txt", &path).unwrap();

        assert_eq!(cache_timestamp(&path).unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_timestamp_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        write_timestamp(temp.path(), "broadwell", SystemTime::now());
        let path = system_file(temp.path(), "skylake");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        // self-referencing link: stat fails with ELOOP
        std::os::unix::fs::symlink(SYSTEM_FILE, &path).unwrap();

        let result = oldest_cache_time_at(temp.path(), &[], SystemTime::now());
        match result {
            Err(CacheError::Timestamp { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_architecture_counts() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let old = now - Duration::from_secs(6 * 365 * 24 * 3600);
        let arch = OsStr::from_bytes(b"arch\xff");
        let path = system_file(temp.path(), arch);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(&path).unwrap().set_modified(old).unwrap();
        write_timestamp(temp.path(), "skylake", now - Duration::from_secs(60));

        let oldest = oldest_cache_time_at(temp.path(), &[], now).unwrap();
        assert_eq!(secs(oldest), secs(old));
    }

    #[test]
    fn test_missing_basedir_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let result = oldest_cache_time(&temp.path().join("nope"), &[]);
        assert!(matches!(result, Err(CacheError::ListArchitectures { .. })));
    }

    #[test]
    fn test_cache_age_future_timestamp() {
        let now = SystemTime::now();
        assert_eq!(cache_age(now + Duration::from_secs(30), now), Duration::ZERO);
        assert_eq!(
            cache_age(now - Duration::from_secs(30), now),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_is_stale_boundary() {
        assert!(!is_stale(Duration::from_secs(240 * 60), 240));
        assert!(is_stale(Duration::from_secs(240 * 60 + 1), 240));
        assert!(!is_stale(Duration::from_secs(0), 0));
        assert!(is_stale(Duration::from_secs(1), 0));
    }
}
