// Package manifest: the project's distribution metadata.
//
// Static fields come from Cargo's compile-time package metadata so there is
// exactly one place (Cargo.toml) where name, version and license are declared.
// The long description is read from README.md at runtime, the same way the
// project's original packaging script did.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Trove-style classifiers advertised for the package.
pub const CLASSIFIERS: &[&str] = &[
    "Programming Language :: Rust",
    "License :: OSI Approved :: MIT License",
    "Operating System :: OS Independent",
];

/// Distribution metadata for the `lda` package.
#[derive(Debug, Clone, Serialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub authors: Vec<String>,
    pub description: String,
    pub license: String,
    pub url: String,
    pub classifiers: Vec<String>,
    pub long_description: String,
    pub long_description_content_type: String,
}

impl PackageManifest {
    /// Build the manifest, reading the long description from `readme_path`.
    ///
    /// Fails if the README is missing or is not valid UTF-8.
    pub fn load(readme_path: impl AsRef<Path>) -> Result<Self> {
        let readme_path = readme_path.as_ref();
        let long_description = std::fs::read_to_string(readme_path)
            .with_context(|| format!("Failed to read {}", readme_path.display()))?;

        Ok(Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            authors: env!("CARGO_PKG_AUTHORS")
                .split(':')
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect(),
            description: env!("CARGO_PKG_DESCRIPTION").to_string(),
            license: env!("CARGO_PKG_LICENSE").to_string(),
            url: env!("CARGO_PKG_REPOSITORY").to_string(),
            classifiers: CLASSIFIERS.iter().map(|c| c.to_string()).collect(),
            long_description,
            long_description_content_type: "text/markdown".to_string(),
        })
    }

    /// The `License ::` classifier, if one is declared.
    pub fn license_classifier(&self) -> Option<&str> {
        self.classifiers
            .iter()
            .map(String::as_str)
            .find(|c| c.starts_with("License ::"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_reads_readme() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "# lda\n\nTopic models.").unwrap();

        let manifest = PackageManifest::load(file.path()).unwrap();
        assert_eq!(manifest.name, "lda");
        assert_eq!(manifest.version, "0.0.1");
        assert_eq!(manifest.license, "MIT");
        assert_eq!(manifest.description, "Latent Dirichlet Allocation Model");
        assert_eq!(manifest.long_description, "# lda\n\nTopic models.");
        assert_eq!(
            manifest.license_classifier(),
            Some("License :: OSI Approved :: MIT License")
        );
    }

    #[test]
    fn test_missing_readme_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = PackageManifest::load(dir.path().join("README.md")).unwrap_err();
        assert!(err.to_string().contains("README.md"));
    }
}
