pub mod audio;
pub mod backlight;
pub mod display;
pub mod fan;
pub mod power;
pub mod radio;
pub mod rgb;

use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Entries of a sysfs class directory, sorted so "first device" is stable.
pub(crate) async fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

pub(crate) async fn read_trimmed(path: &Path) -> Result<String> {
    Ok(tokio::fs::read_to_string(path).await?.trim().to_string())
}
