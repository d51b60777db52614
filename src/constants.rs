//! Application constants for the fundamentals pipeline
//!
//! Upstream locations, file naming conventions and the column candidate
//! tables used to locate fields in the CVM disclosure files. Adapting to an
//! upstream layout change should only require edits here.

// =============================================================================
// Upstream Source
// =============================================================================

/// Yearly archive of the FII monthly disclosure ("Informe Mensal").
/// `{year}` is substituted with the four-digit year.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://dados.cvm.gov.br/dados/FII/DOC/INF_MENSAL/DADOS/inf_mensal_fii_{year}.zip";

/// File name of the yearly archive, used by the local archive source
pub const ARCHIVE_FILE_TEMPLATE: &str = "inf_mensal_fii_{year}.zip";

/// Placeholder replaced by the year in the templates above
pub const YEAR_PLACEHOLDER: &str = "{year}";

/// Field delimiter of the disclosure files
pub const DEFAULT_DELIMITER: char = ';';

/// Extensions treated as tabular files after extraction
pub const TABULAR_EXTENSIONS: &[&str] = &["csv", "txt"];

// =============================================================================
// File Roles
// =============================================================================

/// Filename keywords identifying each table role (matched case-insensitively)
pub mod file_roles {
    /// Identifier, reference date and share count
    pub const GENERAL: &str = "geral";

    /// Preferred source of net asset value
    pub const COMPLEMENT: &str = "complemento";

    /// Fallback source of net asset value
    pub const ASSETS_LIABILITIES: &str = "ativo_passivo";
}

// =============================================================================
// Local Files
// =============================================================================

pub const DEFAULT_DATA_DIR: &str = "data";
pub const MAPPING_FILE_NAME: &str = "fii_cnpj_map.json";
pub const OUTPUT_FILE_NAME: &str = "fiis_fundamentals.json";

/// Prefix of the per-run scratch directory
pub const SCRATCH_PREFIX: &str = "cvm-inf-mensal-";

// =============================================================================
// Snapshot Labels
// =============================================================================

pub mod sources {
    pub const SINGLE_FILE: &str = "CVM - Informe Mensal Estruturado";
    pub const GENERAL_AND_COMPLEMENT: &str =
        "CVM - Informe Mensal Estruturado (geral + complemento)";
    pub const GENERAL_AND_ASSETS_LIABILITIES: &str =
        "CVM - Informe Mensal Estruturado (geral + ativo_passivo)";
}

// =============================================================================
// Column Candidates
// =============================================================================

/// Priority-ordered header candidates for one logical column.
///
/// Exact candidates are tried first, in order; substring candidates only
/// when no exact candidate matched. Names are compared upper-cased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnCandidates {
    pub name: &'static str,
    pub exact: &'static [&'static str],
    pub substring: &'static [&'static str],
}

pub mod columns {
    use super::ColumnCandidates;

    pub const IDENTIFIER: ColumnCandidates = ColumnCandidates {
        name: "identifier",
        exact: &[
            "CNPJ_FUNDO_CLASSE",
            "CNPJ_FUNDO",
            "CNPJ_CLASSE",
            "CNPJ_DO_FUNDO",
            "CNPJ",
        ],
        substring: &["CNPJ_FUNDO", "CNPJ"],
    };

    pub const REFERENCE_DATE: ColumnCandidates = ColumnCandidates {
        name: "reference_date",
        exact: &[
            "DATA_REFERENCIA",
            "DT_COMPTC",
            "DT_COMPETENCIA",
            "DATA_COMPETENCIA",
            "DT_REF",
        ],
        substring: &["DATA_REFERENCIA", "DT_COMPT", "COMPETENCIA", "DT_REF"],
    };

    pub const SHARE_COUNT: ColumnCandidates = ColumnCandidates {
        name: "share_count",
        exact: &[
            "COTAS_EMITIDAS",
            "QT_COTAS",
            "QT_COTA",
            "QTD_COTAS",
            "NR_COTAS",
            "QT_COTAS_EMITIDAS",
            "QTD_COTAS_EMITIDAS",
        ],
        substring: &["COTAS_EMITIDAS", "QT_COTA", "QTD_COTA", "NR_COTA"],
    };

    pub const NET_ASSETS: ColumnCandidates = ColumnCandidates {
        name: "net_assets",
        exact: &[
            "PATRIMONIO_LIQUIDO",
            "VL_PATRIM_LIQ",
            "VL_PATRIMONIO_LIQUIDO",
            "PATRIM_LIQ",
            "VL_PL",
        ],
        substring: &["PATRIMONIO_LIQ", "PATRIM_LIQ", "VL_PL"],
    };
}
