//! Archive extraction and table file discovery
//!
//! Extracts a downloaded archive and picks the tables playing each role by
//! filename keyword.

use crate::constants::{TABULAR_EXTENSIONS, file_roles};
use crate::error::{FundError, Result};
use crate::models::PipelineVariant;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;
use zip::ZipArchive;

/// Tables chosen from an extracted archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedFiles {
    /// Everything in one table
    Single { table: PathBuf },
    /// General table plus at least one net asset value candidate
    Split {
        general: PathBuf,
        complement: Option<PathBuf>,
        assets_liabilities: Option<PathBuf>,
    },
}

/// Extract every entry of `zip_path` into `dest_dir`.
pub fn extract_archive(zip_path: &Path, dest_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dest_dir)?;
    let file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(file)?;
    debug!(
        "Extracting {} entries from {}",
        archive.len(),
        zip_path.display()
    );
    archive.extract(dest_dir)?;
    Ok(())
}

/// Tabular files (`.csv`/`.txt`) below `dir`, sorted by path
pub fn list_tabular_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && is_tabular_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn is_tabular_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            TABULAR_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn find_by_keyword(files: &[PathBuf], keyword: &str) -> Option<PathBuf> {
    files
        .iter()
        .find(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().to_lowercase().contains(keyword))
                .unwrap_or(false)
        })
        .cloned()
}

fn file_names(files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .collect()
}

/// Assign table roles for the chosen pipeline variant.
pub fn select_files(files: &[PathBuf], variant: PipelineVariant) -> Result<SelectedFiles> {
    match variant {
        PipelineVariant::Single => {
            let table = files
                .first()
                .cloned()
                .ok_or_else(|| FundError::MissingRequiredFile {
                    role: "tabular".to_string(),
                    available: Vec::new(),
                })?;
            Ok(SelectedFiles::Single { table })
        }
        PipelineVariant::Split => {
            let general = find_by_keyword(files, file_roles::GENERAL).ok_or_else(|| {
                FundError::MissingRequiredFile {
                    role: file_roles::GENERAL.to_string(),
                    available: file_names(files),
                }
            })?;
            let complement = find_by_keyword(files, file_roles::COMPLEMENT);
            let assets_liabilities = find_by_keyword(files, file_roles::ASSETS_LIABILITIES);

            if complement.is_none() && assets_liabilities.is_none() {
                return Err(FundError::MissingRequiredFile {
                    role: format!(
                        "{} or {}",
                        file_roles::COMPLEMENT,
                        file_roles::ASSETS_LIABILITIES
                    ),
                    available: file_names(files),
                });
            }

            Ok(SelectedFiles::Split {
                general,
                complement,
                assets_liabilities,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from("/scratch").join(n)).collect()
    }

    #[test]
    fn test_select_split_files() {
        let files = paths(&[
            "inf_mensal_fii_ativo_passivo_2024.csv",
            "inf_mensal_fii_complemento_2024.csv",
            "inf_mensal_fii_geral_2024.csv",
        ]);
        let selected = select_files(&files, PipelineVariant::Split).unwrap();
        assert_eq!(
            selected,
            SelectedFiles::Split {
                general: files[2].clone(),
                complement: Some(files[1].clone()),
                assets_liabilities: Some(files[0].clone()),
            }
        );
    }

    #[test]
    fn test_select_is_case_insensitive() {
        let files = paths(&["INF_MENSAL_FII_GERAL.CSV", "Inf_Ativo_Passivo.txt"]);
        match select_files(&files, PipelineVariant::Split).unwrap() {
            SelectedFiles::Split {
                complement,
                assets_liabilities,
                ..
            } => {
                assert!(complement.is_none());
                assert_eq!(assets_liabilities, Some(files[1].clone()));
            }
            other => panic!("Expected split selection, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_general_file() {
        let files = paths(&["inf_mensal_fii_complemento_2024.csv"]);
        let err = select_files(&files, PipelineVariant::Split).unwrap_err();
        match err {
            FundError::MissingRequiredFile { role, available } => {
                assert_eq!(role, "geral");
                assert_eq!(available, vec!["inf_mensal_fii_complemento_2024.csv"]);
            }
            other => panic!("Expected MissingRequiredFile, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_supplementary_file() {
        let files = paths(&["inf_mensal_fii_geral_2024.csv"]);
        let err = select_files(&files, PipelineVariant::Split).unwrap_err();
        assert!(matches!(err, FundError::MissingRequiredFile { .. }));
    }

    #[test]
    fn test_single_variant_takes_first_file() {
        let files = paths(&["a.csv", "b.csv"]);
        assert_eq!(
            select_files(&files, PipelineVariant::Single).unwrap(),
            SelectedFiles::Single {
                table: files[0].clone()
            }
        );
        assert!(select_files(&[], PipelineVariant::Single).is_err());
    }

    #[test]
    fn test_extract_and_list() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("archive.zip");
        {
            let mut writer = zip::ZipWriter::new(fs::File::create(&zip_path).unwrap());
            let options = SimpleFileOptions::default();
            writer.start_file("b_geral.csv", options).unwrap();
            writer.write_all(b"A;B\n1;2\n").unwrap();
            writer.start_file("nested/a_complemento.TXT", options).unwrap();
            writer.write_all(b"A;B\n1;2\n").unwrap();
            writer.start_file("readme.pdf", options).unwrap();
            writer.write_all(b"%PDF").unwrap();
            writer.finish().unwrap();
        }

        let out_dir = temp_dir.path().join("out");
        extract_archive(&zip_path, &out_dir).unwrap();
        let files = list_tabular_files(&out_dir).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.starts_with(&out_dir)));
        assert_eq!(
            file_names(&files),
            vec!["b_geral.csv", "a_complemento.TXT"]
        );
    }
}
