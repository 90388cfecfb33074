use std::path::PathBuf;

/// Worker threads of the in-process service runtime.
pub const DEFAULT_SERVICE_THREADS: usize = 2;

/// First custom buffer kind value available to plugins; lower values are
/// reserved for the host.
pub const DEFAULT_CUSTOM_BUFFER_START: u64 = 1_000;

/// Returns the path to the data directory for idekitd.
/// Uses $XDG_DATA_HOME/idekitd if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/idekitd,
/// or ./idekitd if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("idekitd.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("idekitd")
}
