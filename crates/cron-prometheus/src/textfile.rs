use std::{
    fs, io,
    path::{Path, PathBuf},
};

use cron_core::MetricsError;
use cron_model::Namespace;

/// Writes exposition text to `<dir>/cron_<namespace>_metrics.prom`.
///
/// Each write fully replaces the previous file. Content goes to a hidden
/// temporary file in the same directory first and is renamed into place, so a
/// collector never reads a half-written file.
#[derive(Debug, Clone)]
pub struct TextfileWriter {
    dir: PathBuf,
}

impl TextfileWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, namespace: &Namespace) -> PathBuf {
        self.dir.join(format!("cron_{namespace}_metrics.prom"))
    }

    /// Replace the metrics file of `namespace` with `text`; returns its path.
    pub fn write(&self, namespace: &Namespace, text: &str) -> Result<PathBuf, MetricsError> {
        let path = self.path_for(namespace);
        let tmp = self.dir.join(format!(
            ".cron_{namespace}_metrics.prom.{}.tmp",
            std::process::id()
        ));
        replace(&tmp, &path, text).map_err(|source| MetricsError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn replace(tmp: &Path, path: &Path, text: &str) -> io::Result<()> {
    let result = fs::write(tmp, text).and_then(|()| fs::rename(tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(tmp);
    }
    result
}
