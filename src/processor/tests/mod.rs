//! Integration tests for the processor module
//!
//! Runs the complete pipeline against fixture archives served by the local
//! archive source.

pub mod basic_processing;

use crate::config::FundConfig;
use crate::models::PipelineVariant;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

pub const YEAR: i32 = 2024;

pub const MAPPING_ABCD: &str =
    r#"{"items":[{"ticker":"ABCD11","cnpj":"11.111.111/0001-11"}]}"#;

/// Directory layout for one pipeline run
pub struct Fixture {
    pub temp_dir: TempDir,
    pub data_dir: PathBuf,
    pub archive_dir: PathBuf,
}

impl Fixture {
    pub fn new(mapping_json: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");
        let archive_dir = temp_dir.path().join("archives");
        fs::create_dir_all(&data_dir).unwrap();
        fs::create_dir_all(&archive_dir).unwrap();
        fs::write(data_dir.join("fii_cnpj_map.json"), mapping_json).unwrap();

        Self {
            temp_dir,
            data_dir,
            archive_dir,
        }
    }

    /// Write the archive for `year` with the given (file name, content) entries
    pub fn add_archive(&self, year: i32, entries: &[(&str, &str)]) {
        let path = self.archive_dir.join(format!("inf_mensal_fii_{year}.zip"));
        write_zip(&path, entries);
    }

    pub fn config(&self, variant: PipelineVariant) -> FundConfig {
        FundConfig::default()
            .with_data_dir(&self.data_dir)
            .with_archive_dir(&self.archive_dir)
            .with_year(YEAR)
            .with_variant(variant)
            .with_scratch_parent(self.scratch_parent())
            .without_progress()
    }

    /// Parent of the per-run scratch directory, see [`Fixture::config`]
    pub fn scratch_parent(&self) -> PathBuf {
        self.temp_dir.path().join("scratch")
    }

    /// Entries left in the scratch parent after a run
    pub fn leftover_scratch_dirs(&self) -> Vec<PathBuf> {
        match fs::read_dir(self.scratch_parent()) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.data_dir.join("fiis_fundamentals.json")
    }

    pub fn read_output(&self) -> serde_json::Value {
        let text = fs::read_to_string(self.output_path()).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}

/// Write a ZIP archive, encoding entry contents as Latin-1 like upstream
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let mut writer = zip::ZipWriter::new(fs::File::create(path).unwrap());
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        let bytes = encoding_rs::mem::encode_latin1_lossy(content);
        writer.write_all(&bytes).unwrap();
    }
    writer.finish().unwrap();
}

/// General table with one share count row per (cnpj, date, shares)
pub fn general_csv(rows: &[(&str, &str, &str)]) -> String {
    let mut content = String::from("CNPJ_Fundo_Classe;Data_Referencia;Versao;Nome_Fundo_Classe;Cotas_Emitidas\n");
    for (cnpj, date, shares) in rows {
        content.push_str(&format!("{cnpj};{date};1;\"Fundo Imobiliário; Teste\";{shares}\n"));
    }
    content
}

/// Net asset table with one row per (cnpj, date, net assets)
pub fn net_assets_csv(rows: &[(&str, &str, &str)]) -> String {
    let mut content = String::from("CNPJ_Fundo_Classe;Data_Referencia;Versao;Valor_Ativo;Patrimonio_Liquido\n");
    for (cnpj, date, assets) in rows {
        content.push_str(&format!("{cnpj};{date};1;0;{assets}\n"));
    }
    content
}
