pub mod commands;

use camino::Utf8PathBuf;

/// Default data root for the durable title store.
pub fn default_data_dir() -> anyhow::Result<Utf8PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "marquee")
        .ok_or_else(|| anyhow::anyhow!("could not determine a home directory"))?;
    Utf8PathBuf::from_path_buf(dirs.data_dir().to_path_buf())
        .map_err(|p| anyhow::anyhow!("data directory is not valid UTF-8: {}", p.display()))
}
