use crate::config::{LoggingConfig, Section};
use std::{
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt, Layer, Registry};

use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

// -------- level helpers --------

/// Unknown or empty level strings fall back to INFO.
fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

// -------- rotating writer for files --------

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendCount>>>);

impl<'a> fmt::MakeWriter<'a> for RotWriter {
    type Writer = RotWriterHandle;
    fn make_writer(&'a self) -> Self::Writer {
        RotWriterHandle(self.0.clone())
    }
}

struct RotWriterHandle(Arc<Mutex<FileRotate<AppendCount>>>);

impl RotWriterHandle {
    fn with_file<T>(
        &self,
        f: impl FnOnce(&mut FileRotate<AppendCount>) -> io::Result<T>,
    ) -> io::Result<T> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::other("log file writer lock poisoned"))?;
        f(&mut guard)
    }
}

impl Write for RotWriterHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_file(|file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_file(|file| file.flush())
    }
}

/// Relative paths are joined with `base_dir`; absolute paths are kept.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn create_rotating_writer_at_path(
    log_path: &Path,
    max_bytes: usize,
    max_backups: usize,
) -> io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendCount::new(max_backups),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn writer_for_section(name: &str, section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }

    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let max_backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);
    let log_path = resolve_log_path(&section.file, base_dir);

    match create_rotating_writer_at_path(&log_path, max_bytes as usize, max_backups) {
        Ok(writer) => Some(writer),
        Err(e) => {
            eprintln!(
                "Failed to init log file for subsystem '{}': {} ({})",
                name,
                log_path.to_string_lossy(),
                e
            );
            None
        }
    }
}

// -------- filters --------

/// Console: default section level for everything, overridden per subsystem.
fn console_targets(cfg: &LoggingConfig) -> Targets {
    let default_level = cfg
        .get(DEFAULT_SECTION)
        .map(|s| parse_level(&s.console_level))
        .unwrap_or(LevelFilter::INFO);

    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .fold(
            Targets::new().with_default(default_level),
            |targets, (name, section)| {
                targets.with_target(name.clone(), parse_level(&section.console_level))
            },
        )
}

/// Default file: everything except subsystems that write to their own file.
fn default_file_targets(cfg: &LoggingConfig, default_section: &Section) -> Targets {
    cfg.iter()
        .filter(|(name, section)| {
            name.as_str() != DEFAULT_SECTION && !section.file.trim().is_empty()
        })
        .fold(
            Targets::new().with_default(parse_level(&default_section.file_level)),
            |targets, (name, _)| targets.with_target(name.clone(), LevelFilter::OFF),
        )
}

fn subsystem_file_targets(name: &str, section: &Section) -> Targets {
    Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target(name.to_string(), parse_level(&section.file_level))
}

fn json_file_layer(writer: RotWriter, targets: Targets) -> BoxedLayer {
    fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(writer)
        .with_filter(targets)
        .boxed()
}

fn build_layers(cfg: &LoggingConfig, base_dir: &Path) -> Vec<BoxedLayer> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    layers.push(
        fmt::layer()
            .with_ansi(io::stdout().is_terminal())
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_filter(console_targets(cfg))
            .boxed(),
    );

    if let Some(section) = cfg.get(DEFAULT_SECTION) {
        if let Some(writer) = writer_for_section(DEFAULT_SECTION, section, base_dir) {
            layers.push(json_file_layer(writer, default_file_targets(cfg, section)));
        }
    }

    for (name, section) in cfg.iter().filter(|(n, _)| n.as_str() != DEFAULT_SECTION) {
        if let Some(writer) = writer_for_section(name, section, base_dir) {
            layers.push(json_file_layer(writer, subsystem_file_targets(name, section)));
        }
    }

    layers
}

// -------- public init --------

/// Install the global subscriber.
/// - `cfg`: subsystem → section; an empty map gives plain console output at INFO
/// - `base_dir`: directory for relative log file paths (usually `server.home_dir`)
///
/// Calling this twice is harmless; the second subscriber is ignored.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::layer::SubscriberExt;

    // Bridge `log` → `tracing` before the subscriber goes in. The subscriber is
    // installed with `set_global_default` so the bridge is not registered twice.
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let subscriber = tracing_subscriber::fmt()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
        return;
    }

    let subscriber = Registry::default().with(build_layers(cfg, base_dir));
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_logging_config, AppConfig};
    use std::fs;
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
    fn level_parsing() {
        assert_eq!(parse_level("trace"), LevelFilter::TRACE);
        assert_eq!(parse_level("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level(" Info "), LevelFilter::INFO);
        assert_eq!(parse_level("warn"), LevelFilter::WARN);
        assert_eq!(parse_level("ERROR"), LevelFilter::ERROR);
        assert_eq!(parse_level("off"), LevelFilter::OFF);
        assert_eq!(parse_level("none"), LevelFilter::OFF);
        assert_eq!(parse_level("loud"), LevelFilter::INFO);
        assert_eq!(parse_level(""), LevelFilter::INFO);
    }

    #[test]
    fn console_targets_apply_subsystem_overrides() {
        let mut cfg = default_logging_config();
        cfg.insert("housing".into(), section("debug", "", ""));
        cfg.insert("sqlx".into(), section("off", "", ""));

        let targets = console_targets(&cfg);
        assert!(targets.would_enable("housing::domain::service", &tracing::Level::DEBUG));
        assert!(!targets.would_enable("sqlx::query", &tracing::Level::ERROR));
        assert!(targets.would_enable("tower_http::trace", &tracing::Level::INFO));
        assert!(!targets.would_enable("tower_http::trace", &tracing::Level::DEBUG));
    }

    #[test]
    fn default_file_skips_subsystems_with_own_file() {
        let mut cfg = default_logging_config();
        cfg.insert("api_ingress".into(), section("info", "logs/api.log", "warn"));
        cfg.insert("housing".into(), section("info", "", ""));

        let default_section = cfg["default"].clone();
        let targets = default_file_targets(&cfg, &default_section);
        assert!(!targets.would_enable("api_ingress::web", &tracing::Level::ERROR));
        assert!(targets.would_enable("housing", &tracing::Level::DEBUG));

        let own = subsystem_file_targets("api_ingress", &cfg["api_ingress"]);
        assert!(own.would_enable("api_ingress::web", &tracing::Level::WARN));
        assert!(!own.would_enable("api_ingress::web", &tracing::Level::INFO));
        assert!(!own.would_enable("housing", &tracing::Level::ERROR));
    }

    #[test]
    fn file_paths_resolved_against_home_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/test.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/test.log"));

        let abs = tmp.path().join("abs.log");
        assert_eq!(resolve_log_path(abs.to_str().unwrap(), Path::new("/other")), abs);
    }

    #[test]
    fn rotating_writer_creates_parent_and_writes() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("nested/dir/app.log");

        let writer = create_rotating_writer_at_path(&p, 128 * 1024, 2).unwrap();
        assert!(p.parent().unwrap().exists());

        let mut handle = fmt::MakeWriter::make_writer(&writer);
        handle.write_all(b"{\"msg\":\"hello\"}\n").unwrap();
        handle.flush().unwrap();
        assert!(fs::read_to_string(&p).unwrap().contains("hello"));
    }

    #[test]
    fn layers_follow_configured_files() {
        let tmp = tempdir().unwrap();
        let mut cfg = default_logging_config();
        cfg.insert("api_ingress".into(), section("info", "logs/api.log", "warn"));
        cfg.insert("housing".into(), section("debug", "", ""));

        // console + default file + api_ingress file
        assert_eq!(build_layers(&cfg, tmp.path()).len(), 3);

        cfg.get_mut("default").unwrap().file.clear();
        assert_eq!(build_layers(&cfg, tmp.path()).len(), 2);
    }

    #[test]
    fn config_logging_integration_with_base_dir() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("test_config.yaml");
        let home = temp_dir.path().join("home");

        let yaml_content = format!(
            r#"
server:
  home_dir: "{}"
  host: "127.0.0.1"
  port: 8088

logging:
  default:
    console_level: info
    file: ""
    file_level: debug
  api_ingress:
    console_level: debug
    file: "logs/api_test.log"
    file_level: warn
    max_size_mb: 5
    max_backups: 2
"#,
            home.to_string_lossy().replace('\\', "/")
        );
        fs::write(&config_path, yaml_content).unwrap();

        let config = AppConfig::load_layered(&config_path).unwrap();
        let abs = resolve_log_path("logs/api_test.log", Path::new(&config.server.home_dir));
        assert!(abs.starts_with(&config.server.home_dir));
        assert!(abs.ends_with("logs/api_test.log"));
    }
}
