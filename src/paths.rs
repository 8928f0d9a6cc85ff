use std::path::PathBuf;
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Name used for per-user data directories.
const APP_DIR_NAME: &str = "png-to-csv";

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the default debug artifact directory: `<exe_dir>/output/`
pub fn get_debug_dir() -> PathBuf {
    get_exe_dir().join("output")
}

/// Returns the default config file: `<exe_dir>/png-to-csv.json`
pub fn get_config_path() -> PathBuf {
    get_exe_dir().join(format!("{APP_DIR_NAME}.json"))
}

/// Returns the cached language data directory: `<data_local_dir>/png-to-csv/tessdata/`
pub fn get_tessdata_cache_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| get_exe_dir().clone())
        .join(APP_DIR_NAME)
        .join("tessdata")
}
