//! Basic processing integration tests

use super::{Fixture, MAPPING_ABCD, YEAR, general_csv, net_assets_csv};
use crate::models::PipelineVariant;
use crate::processor::FundamentalsProcessor;

const CNPJ: &str = "11.111.111/0001-11";

fn split_archive(fixture: &Fixture, shares: &str, assets: &str) {
    fixture.add_archive(
        YEAR,
        &[
            (
                "inf_mensal_fii_geral_2024.csv",
                &general_csv(&[(CNPJ, "2024-05-31", shares)]),
            ),
            (
                "inf_mensal_fii_complemento_2024.csv",
                &net_assets_csv(&[(CNPJ, "2024-05-31", assets)]),
            ),
        ],
    );
}

#[tokio::test]
async fn test_value_per_share_end_to_end() {
    let fixture = Fixture::new(MAPPING_ABCD);
    split_archive(&fixture, "1000", "100000");

    let processor = FundamentalsProcessor::new(fixture.config(PipelineVariant::Split));
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.year, YEAR);
    assert_eq!(stats.reference_date, "2024-05-31");
    assert_eq!(stats.tickers_total, 1);
    assert_eq!(stats.tickers_filled, 1);
    assert_eq!(stats.output_path, fixture.output_path());

    let output = fixture.read_output();
    assert_eq!(output["referenceDate"], "2024-05-31");
    assert_eq!(
        output["source"],
        "CVM - Informe Mensal Estruturado (geral + complemento)"
    );
    assert_eq!(output["items"][0]["ticker"], "ABCD11");
    assert_eq!(output["items"][0]["vp"].as_f64(), Some(100.0));
    assert!(output["items"][0]["dy12m"].is_null());
    assert!(output["items"][0]["pl"].is_null());
}

#[tokio::test]
async fn test_zero_share_count_gives_null() {
    let fixture = Fixture::new(MAPPING_ABCD);
    split_archive(&fixture, "0", "100000");

    let stats = FundamentalsProcessor::new(fixture.config(PipelineVariant::Split))
        .process()
        .await
        .unwrap();

    assert_eq!(stats.tickers_filled, 0);
    let output = fixture.read_output();
    assert_eq!(output["items"][0]["ticker"], "ABCD11");
    assert!(output["items"][0]["vp"].is_null());
}

#[tokio::test]
async fn test_latest_date_selected() {
    let fixture = Fixture::new(MAPPING_ABCD);
    fixture.add_archive(
        YEAR,
        &[
            (
                "inf_mensal_fii_geral_2024.csv",
                &general_csv(&[(CNPJ, "2024-04-30", "500"), (CNPJ, "2024-05-31", "1.000")]),
            ),
            (
                "inf_mensal_fii_complemento_2024.csv",
                &net_assets_csv(&[
                    (CNPJ, "2024-04-30", "1.000.000,00"),
                    (CNPJ, "2024-05-31", "100.000,00"),
                ]),
            ),
        ],
    );

    let stats = FundamentalsProcessor::new(fixture.config(PipelineVariant::Split))
        .process()
        .await
        .unwrap();

    assert_eq!(stats.reference_date, "2024-05-31");
    let output = fixture.read_output();
    assert_eq!(output["items"][0]["vp"].as_f64(), Some(100.0));
}

#[tokio::test]
async fn test_unmatched_tickers_are_kept_in_order() {
    let fixture = Fixture::new(
        r#"{"items":[
            {"ticker":"zzzz11","cnpj":"99.999.999/0001-99"},
            {"ticker":"ABCD11","cnpj":"11.111.111/0001-11"},
            {"ticker":"NOPE11","cnpj":""}
        ]}"#,
    );
    split_archive(&fixture, "1000", "100000");

    let stats = FundamentalsProcessor::new(fixture.config(PipelineVariant::Split))
        .process()
        .await
        .unwrap();

    assert_eq!(stats.tickers_total, 2);
    assert_eq!(stats.tickers_filled, 1);
    let output = fixture.read_output();
    let items = output["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["ticker"], "ZZZZ11");
    assert!(items[0]["vp"].is_null());
    assert_eq!(items[1]["ticker"], "ABCD11");
    assert_eq!(items[1]["vp"].as_f64(), Some(100.0));
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let fixture = Fixture::new(MAPPING_ABCD);
    split_archive(&fixture, "1000", "100000");
    let processor = FundamentalsProcessor::new(fixture.config(PipelineVariant::Split));

    processor.process().await.unwrap();
    let mut first = fixture.read_output();
    processor.process().await.unwrap();
    let mut second = fixture.read_output();

    first["updatedAt"] = serde_json::Value::Null;
    second["updatedAt"] = serde_json::Value::Null;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_keep_scratch_after_successful_run() {
    let fixture = Fixture::new(MAPPING_ABCD);
    split_archive(&fixture, "1000", "100000");

    let config = fixture.config(PipelineVariant::Split).with_keep_scratch();
    FundamentalsProcessor::new(config).process().await.unwrap();
    assert_eq!(fixture.leftover_scratch_dirs().len(), 1);

    FundamentalsProcessor::new(fixture.config(PipelineVariant::Split))
        .process()
        .await
        .unwrap();
    assert_eq!(fixture.leftover_scratch_dirs().len(), 1);
}
