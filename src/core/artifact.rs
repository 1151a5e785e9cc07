use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Directory where compiled artifacts live while their run is in progress.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reserves a fresh artifact path. Nothing is created on disk; the
    /// compiler writes the file and the returned guard removes it.
    pub fn allocate(&self) -> TempArtifact {
        let path = self.dir.join(format!("unit-{}", Uuid::new_v4().simple()));
        TempArtifact { path }
    }
}

/// Compiled executable owned by exactly one run. Removed on drop.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed artifact {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove artifact {}: {}", self.path.display(), e),
        }
    }
}
