use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// One rendered output ready to hand off: a suggested file name plus the
/// workbook bytes.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Artifact {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Write every artifact into `dest`. Returns the paths written.
///
/// Callers treat failure here as a warning: the comparison that produced the
/// artifacts stays valid and they remain exportable through other routes.
pub fn deliver_to_dir(dest: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = dest.join(&artifact.file_name);
        std::fs::write(&path, &artifact.bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = vec![
            Artifact::new("first_highlighted.xlsx", vec![1, 2, 3]),
            Artifact::new("second_highlighted.xlsx", vec![4, 5]),
        ];
        let written = deliver_to_dir(dir.path(), &artifacts).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(std::fs::read(&written[0]).unwrap(), vec![1, 2, 3]);
        assert_eq!(std::fs::read(&written[1]).unwrap(), vec![4, 5]);
    }

    #[test]
    fn missing_destination_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        let artifacts = vec![Artifact::new("a.xlsx", vec![0])];
        assert!(deliver_to_dir(&gone, &artifacts).is_err());
    }
}
