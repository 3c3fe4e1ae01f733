use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const STORE_ENV: &str = "JOBTRACK_STORE";
const STORE_FILE: &str = "saved_jobs.json";

/// Where the saved-jobs file lives: explicit path, then `$JOBTRACK_STORE`,
/// then the platform data directory.
pub fn store_path(explicit: Option<&Path>) -> PathBuf {
    resolve_store_path(explicit, std::env::var_os(STORE_ENV))
}

/// An empty `env_value` counts as unset.
fn resolve_store_path(explicit: Option<&Path>, env_value: Option<OsString>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env_value {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => default_path(),
    }
}

fn default_path() -> PathBuf {
    // Use XDG data directory or fallback
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobtrack") {
        proj_dirs.data_dir().join(STORE_FILE)
    } else {
        PathBuf::from(STORE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let path = resolve_store_path(
            Some(Path::new("/tmp/elsewhere.json")),
            Some(OsString::from("/tmp/from_env.json")),
        );
        assert_eq!(path, PathBuf::from("/tmp/elsewhere.json"));
    }

    #[test]
    fn env_value_beats_default() {
        let path = resolve_store_path(None, Some(OsString::from("/tmp/from_env.json")));
        assert_eq!(path, PathBuf::from("/tmp/from_env.json"));
    }

    #[test]
    fn empty_env_value_falls_through() {
        assert_eq!(resolve_store_path(None, Some(OsString::new())), default_path());
        assert_eq!(resolve_store_path(None, None), default_path());
    }

    #[test]
    fn default_file_name() {
        assert_eq!(default_path().file_name().unwrap(), STORE_FILE);
    }

    // The only test in the crate that touches JOBTRACK_STORE.
    #[test]
    fn store_path_reads_environment() {
        unsafe { std::env::set_var(STORE_ENV, "/tmp/jobtrack_env_test.json") };
        assert_eq!(store_path(None), PathBuf::from("/tmp/jobtrack_env_test.json"));
        assert_eq!(
            store_path(Some(Path::new("/tmp/flag.json"))),
            PathBuf::from("/tmp/flag.json")
        );

        unsafe { std::env::set_var(STORE_ENV, "") };
        assert_eq!(store_path(None), default_path());

        unsafe { std::env::remove_var(STORE_ENV) };
        assert_eq!(store_path(None), default_path());
    }
}
