use std::path::PathBuf;

/// Returns the directory the JSON documents live in when no `[storage]`
/// section is configured.
///
/// # Platform-specific paths
///
/// - **macOS**: `~/Library/Application Support/runclub`
/// - **Linux**: `~/.local/share/runclub`
/// - **Windows**: `%LOCALAPPDATA%\runclub`
pub fn default_data_dir() -> anyhow::Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(data_dir.join("runclub"))
}
