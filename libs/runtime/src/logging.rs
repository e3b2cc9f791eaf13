use crate::config::{LoggingConfig, Section};
use std::{
    collections::HashMap,
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 5;

// -------- levels --------

fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        // unset file levels follow the console
        "" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Module paths use `_` where crate names use `-`.
fn target_name(section: &str) -> String {
    section.replace('-', "_")
}

/// `Targets` picks the longest matching prefix, so a named section overrides "default"
/// for its own crate only.
fn targets_for(cfg: &LoggingConfig, level_of: impl Fn(&Section) -> LevelFilter) -> Targets {
    let default = cfg
        .get(DEFAULT_SECTION)
        .map(&level_of)
        .unwrap_or(LevelFilter::OFF);
    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .fold(Targets::new().with_default(default), |t, (name, section)| {
            t.with_target(target_name(name), level_of(section))
        })
}

fn file_level(section: &Section) -> LevelFilter {
    if section.file.trim().is_empty() {
        LevelFilter::OFF
    } else if section.file_level.trim().is_empty() {
        parse_level(&section.console_level)
    } else {
        parse_level(&section.file_level)
    }
}

// -------- rotating files --------

type SharedFile = Arc<Mutex<FileRotate<AppendTimestamp>>>;

struct FileHandle(Option<SharedFile>);

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.0 {
            Some(file) => file
                .lock()
                .map_err(|_| std::io::Error::other("log file lock poisoned"))?
                .write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &self.0 {
            Some(file) => file
                .lock()
                .map_err(|_| std::io::Error::other("log file lock poisoned"))?
                .flush(),
            None => Ok(()),
        }
    }
}

/// Sends each record to the file of the section owning its target, falling back to the
/// default section's file.
#[derive(Default)]
struct FileRouter {
    default: Option<SharedFile>,
    by_target: HashMap<String, SharedFile>,
}

impl FileRouter {
    fn route(&self, target: &str) -> Option<SharedFile> {
        self.by_target
            .iter()
            .filter(|(prefix, _)| matches_target(target, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, file)| file.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_target.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = FileHandle;

    fn make_writer(&'a self) -> Self::Writer {
        FileHandle(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        FileHandle(self.route(meta.target()))
    }
}

fn matches_target(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// Relative paths resolve against `base_dir` (the configured home_dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_rotating(section: &Section, base_dir: &Path) -> std::io::Result<SharedFile> {
    let path = resolve_log_path(&section.file, base_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let rot = FileRotate::new(
        &path,
        AppendTimestamp::default(FileLimit::MaxFiles(
            section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS),
        )),
        ContentLimit::BytesSurpassed(max_bytes as usize),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(Arc::new(Mutex::new(rot)))
}

fn build_file_router(cfg: &LoggingConfig, base_dir: &Path) -> FileRouter {
    let mut router = FileRouter::default();
    for (name, section) in cfg {
        if section.file.trim().is_empty() {
            continue;
        }
        let file = match open_rotating(section, base_dir) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("Failed to open log file '{}' for '{name}': {e}", section.file);
                continue;
            }
        };
        if name == DEFAULT_SECTION {
            router.default = Some(file);
        } else {
            router.by_target.insert(target_name(name), file);
        }
    }
    router
}

// -------- public init --------

/// Install the global subscriber: a console layer plus, when any section names a file,
/// a JSON layer writing to size-rotated files. `base_dir` is usually the home_dir.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, prelude::*, Registry};

    // bridge `log` records (sqlx) before the subscriber goes in
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let console = fmt::layer()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(targets_for(cfg, |s| parse_level(&s.console_level)));

    let router = build_file_router(cfg, base_dir);
    if router.is_empty() {
        let _ = Registry::default().with(console).try_init();
        return;
    }

    let file = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(router)
        .with_filter(targets_for(cfg, file_level));

    let _ = Registry::default().with(console).with(file).try_init();
}

fn init_default_logging() {
    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;

    fn section(console: &str, file: &str, file_level: &str) -> Section {
        Section {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(parse_level("trace"), LevelFilter::TRACE);
        assert_eq!(parse_level("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level(" Warn "), LevelFilter::WARN);
        assert_eq!(parse_level("off"), LevelFilter::OFF);
        assert_eq!(parse_level("none"), LevelFilter::OFF);
        assert_eq!(parse_level("bogus"), LevelFilter::INFO);
    }

    #[test]
    fn test_named_sections_override_default() {
        let mut cfg = default_logging_config();
        cfg.insert("search-db".into(), section("trace", "", ""));

        let targets = targets_for(&cfg, |s| parse_level(&s.console_level));
        assert!(targets.would_enable("search_db::paginate", &tracing::Level::TRACE));
        assert!(!targets.would_enable("vocabulary::repo", &tracing::Level::DEBUG));
        assert!(targets.would_enable("vocabulary::repo", &tracing::Level::INFO));
    }

    #[test]
    fn test_file_level_falls_back_to_console() {
        assert_eq!(file_level(&section("debug", "a.log", "")), LevelFilter::DEBUG);
        assert_eq!(file_level(&section("debug", "a.log", "warn")), LevelFilter::WARN);
        assert_eq!(file_level(&section("debug", "", "warn")), LevelFilter::OFF);
    }

    #[test]
    fn test_target_matching() {
        assert!(matches_target("search_db", "search_db"));
        assert!(matches_target("search_db::paginate", "search_db"));
        assert!(!matches_target("search_dbx", "search_db"));
    }

    #[test]
    fn test_router_prefers_named_file() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert(DEFAULT_SECTION.into(), section("info", "logs/all.log", "debug"));
        cfg.insert("search_db".into(), section("info", "logs/search.log", "debug"));

        let router = build_file_router(&cfg, tmp.path());
        assert!(tmp.path().join("logs").exists(), "parent dir must be created");

        let named = router.route("search_db::paginate").unwrap();
        let fallback = router.route("vocabulary").unwrap();
        assert!(Arc::ptr_eq(&named, router.by_target.get("search_db").unwrap()));
        assert!(Arc::ptr_eq(&fallback, router.default.as_ref().unwrap()));
    }

    #[test]
    fn test_file_paths_resolved_against_home_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/test.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/test.log"));

        let abs = tmp.path().join("abs.log");
        assert_eq!(resolve_log_path(&abs.to_string_lossy(), Path::new("/other")), abs);
    }
}
