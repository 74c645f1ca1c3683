use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::url::clean_target_url;

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8096";

/// Accepted `--poll-interval` values, in seconds.
pub const POLL_INTERVAL_RANGE: std::ops::RangeInclusive<u32> = 1..=60;
/// Smallest accepted `--max-polls`.
pub const MIN_MAX_POLLS: u32 = 1;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Content-change timeline for archived snapshots of a website
#[derive(Parser, Debug, Clone)]
#[command(
    name = "wayback-timeline",
    about = "Content-change timeline for archived snapshots of a website",
    version
)]
pub struct Settings {
    /// Website to analyse (scheme, leading www. and trailing slashes are dropped)
    pub url: String,

    /// Year of captures to analyse
    #[arg(long, value_parser = clap::value_parser!(u16).range(1996..=2100))]
    pub year: u16,

    /// Backend base URL
    #[arg(long, env = "WAYBACK_TIMELINE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Seconds between job status polls (1-60)
    #[arg(long, default_value = "2", value_parser = clap::value_parser!(u32).range(1..=60))]
    pub poll_interval: u32,

    /// Maximum number of job status polls before giving up
    #[arg(long, default_value = "300", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_polls: u32,

    /// Delay between job completion and fetching results, in milliseconds
    #[arg(long, default_value = "1000")]
    pub results_delay_ms: u64,

    /// Export format written after a successful run
    #[arg(long, default_value = "none", value_parser = ["none", "csv", "json", "both"])]
    pub export: String,

    /// Directory for export files (defaults to ~/.wayback-timeline/exports)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Number of table rows to print (0 prints every capture)
    #[arg(long, default_value = "20")]
    pub rows: usize,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

impl Settings {
    pub fn wants_csv(&self) -> bool {
        matches!(self.export.as_str(), "csv" | "both")
    }

    pub fn wants_json(&self) -> bool {
        matches!(self.export.as_str(), "json" | "both")
    }
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.wayback-timeline/last_used.json`.
///
/// The target URL and year are never persisted; every run names its own.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_polls: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl LastUsedParams {
    /// Default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".wayback-timeline").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable last-used params");
                Self::default()
            }
        }
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit
    /// value was provided, resolve derived values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation; takes args and an explicit config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "failed to clear last-used params");
            }
            return Self::resolve_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // NOTE: clap stores the arg id using the field name (underscores).
        if !is_arg_explicitly_set(&matches, "api_url") {
            if let Some(v) = last.api_url {
                settings.api_url = v;
            }
        }
        // Saved values bypass clap's range checks, so re-apply them here.
        if !is_arg_explicitly_set(&matches, "poll_interval") {
            if let Some(v) = last.poll_interval {
                if POLL_INTERVAL_RANGE.contains(&v) {
                    settings.poll_interval = v;
                } else {
                    tracing::warn!(value = v, "ignoring out-of-range saved poll_interval");
                }
            }
        }
        if !is_arg_explicitly_set(&matches, "max_polls") {
            if let Some(v) = last.max_polls {
                if v >= MIN_MAX_POLLS {
                    settings.max_polls = v;
                } else {
                    tracing::warn!(value = v, "ignoring out-of-range saved max_polls");
                }
            }
        }
        if !is_arg_explicitly_set(&matches, "export") {
            if let Some(v) = last.export {
                settings.export = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "output_dir") && settings.output_dir.is_none() {
            settings.output_dir = last.output_dir;
        }

        settings = Self::resolve_values(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!(error = %e, "failed to persist last-used params");
        }

        settings
    }

    /// Clean the target URL, trim the API URL, and apply `--debug`.
    fn resolve_values(mut settings: Settings) -> Settings {
        settings.url = clean_target_url(&settings.url);
        settings.api_url = settings.api_url.trim().trim_end_matches('/').to_string();

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            api_url: Some(s.api_url.clone()),
            poll_interval: Some(s.poll_interval),
            max_polls: Some(s.max_polls),
            export: Some(s.export.clone()),
            output_dir: s.output_dir.clone(),
        }
    }
}

/// Returns `true` when `name` was supplied on the command line or through
/// its environment variable (anything but the default value).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(clap::parser::ValueSource::CommandLine) | Some(clap::parser::ValueSource::EnvVariable)
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn args(extra: &[&str]) -> Vec<OsString> {
        let mut v: Vec<OsString> = vec![
            "wayback-timeline".into(),
            "example.com".into(),
            "--year".into(),
            "2020".into(),
        ];
        v.extend(extra.iter().map(OsString::from));
        v
    }

    // ── LastUsedParams ───────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            api_url: Some("http://backend:9000".to_string()),
            poll_interval: Some(5),
            max_polls: Some(42),
            export: Some("both".to_string()),
            output_dir: Some(PathBuf::from("/tmp/exports")),
        };

        params.save_to(&path).expect("save");
        let loaded = LastUsedParams::load_from(&path);

        assert_eq!(loaded.api_url.as_deref(), Some("http://backend:9000"));
        assert_eq!(loaded.poll_interval, Some(5));
        assert_eq!(loaded.max_polls, Some(42));
        assert_eq!(loaded.export.as_deref(), Some("both"));
        assert_eq!(loaded.output_dir, Some(PathBuf::from("/tmp/exports")));
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            export: Some("csv".to_string()),
            ..Default::default()
        };
        params.save_to(&path).expect("save");
        assert!(path.exists(), "file must exist after save");

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists(), "file must be gone after clear");
    }

    #[test]
    fn test_last_used_params_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = LastUsedParams::load_from(&tmp_config_path(&tmp));
        assert!(loaded.api_url.is_none());
        assert!(loaded.poll_interval.is_none());
        assert!(loaded.export.is_none());
        assert!(loaded.output_dir.is_none());
    }

    #[test]
    fn test_last_used_params_default_when_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let loaded = LastUsedParams::load_from(&path);
        assert!(loaded.api_url.is_none());
    }

    // ── Settings parsing ─────────────────────────────────────────────────────

    #[test]
    fn test_defaults_match_backend_contract() {
        let settings = Settings::parse_from(args(&[]));

        assert_eq!(settings.url, "example.com");
        assert_eq!(settings.year, 2020);
        assert_eq!(settings.poll_interval, 2);
        assert_eq!(settings.max_polls, 300);
        assert_eq!(settings.results_delay_ms, 1000);
        assert_eq!(settings.export, "none");
        assert!(settings.output_dir.is_none());
        assert_eq!(settings.rows, 20);
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_rejects_year_out_of_range() {
        let result = Settings::try_parse_from([
            "wayback-timeline",
            "example.com",
            "--year",
            "1980",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_requires_year() {
        let result = Settings::try_parse_from(["wayback-timeline", "example.com"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_export_helpers() {
        let both = Settings::parse_from(args(&["--export", "both"]));
        assert!(both.wants_csv());
        assert!(both.wants_json());

        let csv = Settings::parse_from(args(&["--export", "csv"]));
        assert!(csv.wants_csv());
        assert!(!csv.wants_json());

        let none = Settings::parse_from(args(&[]));
        assert!(!none.wants_csv());
        assert!(!none.wants_json());
    }

    #[test]
    fn test_saved_params_capture_backend_options() {
        let settings = Settings::parse_from(args(&[
            "--api-url",
            "http://jobs.local",
            "--poll-interval",
            "7",
            "--export",
            "json",
        ]));
        let last = LastUsedParams::from(&settings);

        assert_eq!(last.api_url.as_deref(), Some("http://jobs.local"));
        assert_eq!(last.poll_interval, Some(7));
        assert_eq!(last.export.as_deref(), Some("json"));
    }

    // ── load_with_last_used ──────────────────────────────────────────────────

    #[test]
    fn test_load_with_last_used_cleans_url() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            vec![
                "wayback-timeline".into(),
                "https://www.example.com/".into(),
                "--year".into(),
                "2019".into(),
            ],
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.url, "example.com");
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_export() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            export: Some("csv".to_string()),
            poll_interval: Some(9),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&[]), &config_path);
        assert_eq!(settings.export, "csv");
        assert_eq!(settings.poll_interval, 9);
    }

    #[test]
    fn test_explicit_export_flag_beats_saved_export() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            export: Some("csv".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(args(&["--export", "json"]), &config_path);
        assert_eq!(settings.export, "json");
    }

    #[test]
    fn test_clear_flag_deletes_saved_params() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            export: Some("both".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");
        assert!(config_path.exists(), "file must exist before clear");

        let settings = Settings::load_with_last_used_impl(args(&["--clear"]), &config_path);

        assert!(!config_path.exists(), "file must be gone after --clear");
        assert_eq!(settings.export, "none");
    }

    #[test]
    fn test_debug_flag_forces_debug_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings =
            Settings::load_with_last_used_impl(args(&["--debug"]), &tmp_config_path(&tmp));
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_out_of_range_saved_poll_values_are_ignored() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            poll_interval: Some(0),
            max_polls: Some(0),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&[]), &config_path);

        assert_eq!(settings.poll_interval, 2);
        assert_eq!(settings.max_polls, 300);
        let saved = LastUsedParams::load_from(&config_path);
        assert_eq!(saved.poll_interval, Some(2));
    }

    #[test]
    fn test_saved_poll_interval_above_range_is_ignored() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            poll_interval: Some(61),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&[]), &config_path);
        assert_eq!(settings.poll_interval, 2);
    }

    #[test]
    fn test_load_with_last_used_trims_api_url_slash() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            args(&["--api-url", "http://localhost:8096/"]),
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.api_url, "http://localhost:8096");
    }

    #[test]
    fn test_poll_interval_saved_for_next_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(args(&["--poll-interval", "4"]), &config_path);

        assert!(config_path.exists(), "config file must be persisted after run");
        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.poll_interval, Some(4));
    }
}
