//! Shared helpers for the crate's unit tests.

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Executes `f` inside a [`figment::Jail`], returning the closure's output.
///
/// The jail clears nothing by itself; callers that depend on a clean
/// environment should call `jail.clear_env()` first.
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|jail| {
        output = Some(f(jail)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

/// Temporary directory with a UTF-8 path, removed on drop.
pub struct Scratch {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl Scratch {
    /// Creates an empty scratch directory.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create scratch dir")?;
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow!("scratch dir is not UTF-8: {}", path.display()))?;
        Ok(Self { _dir: dir, path })
    }

    /// Root of the scratch directory.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Writes `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> Result<Utf8PathBuf> {
        let target = self.path.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        std::fs::write(&target, contents).with_context(|| format!("write {target}"))?;
        Ok(target)
    }
}
