//! Parquet export of the analysis dataset.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::info;

use crate::error::ExportError;
use crate::privacy::AnalysisRow;

/// Arrow schema of the analysis dataset.
pub fn analysis_schema() -> Schema {
    Schema::new(vec![
        Field::new("application_id", DataType::Utf8, true),
        Field::new("applicant_pseudo_id", DataType::Utf8, false),
        Field::new("pseudo_id_source", DataType::Utf8, false),
        Field::new("pseudo_id_fallback_used_flag", DataType::Boolean, false),
        Field::new("age_band", DataType::Utf8, true),
        Field::new("age_band_missing_flag", DataType::Boolean, false),
        Field::new("clean_gender", DataType::Utf8, true),
        Field::new("clean_zip_code", DataType::Utf8, true),
        Field::new("clean_annual_income", DataType::Float64, true),
        Field::new("clean_credit_history_months", DataType::Int64, true),
        Field::new("clean_debt_to_income", DataType::Float64, true),
        Field::new("clean_savings_balance", DataType::Float64, true),
        Field::new("clean_loan_approved", DataType::Boolean, true),
        Field::new("clean_interest_rate", DataType::Float64, true),
        Field::new("clean_approved_amount", DataType::Float64, true),
        Field::new("clean_rejection_reason", DataType::Utf8, true),
    ])
}

/// Convert analysis rows into one Arrow record batch.
pub fn analysis_to_record_batch(rows: &[AnalysisRow]) -> Result<RecordBatch, ExportError> {
    let schema = Arc::new(analysis_schema());

    let mut application_id = StringBuilder::new();
    let mut pseudo_id = StringBuilder::new();
    let mut pseudo_source = StringBuilder::new();
    let mut fallback_flag = BooleanBuilder::new();
    let mut age_band = StringBuilder::new();
    let mut age_band_missing = BooleanBuilder::new();
    let mut gender = StringBuilder::new();
    let mut zip_code = StringBuilder::new();
    let mut annual_income = Float64Builder::new();
    let mut credit_history = Int64Builder::new();
    let mut debt_to_income = Float64Builder::new();
    let mut savings_balance = Float64Builder::new();
    let mut loan_approved = BooleanBuilder::new();
    let mut interest_rate = Float64Builder::new();
    let mut approved_amount = Float64Builder::new();
    let mut rejection_reason = StringBuilder::new();

    for row in rows {
        application_id.append_option(row.application_id.as_deref());
        pseudo_id.append_value(&row.applicant_pseudo_id);
        pseudo_source.append_value(row.pseudo_id_source.as_str());
        fallback_flag.append_value(row.pseudo_id_fallback_used_flag);
        age_band.append_option(row.age_band.as_deref());
        age_band_missing.append_value(row.age_band_missing_flag);
        gender.append_option(row.clean_gender.as_deref());
        zip_code.append_option(row.clean_zip_code.as_deref());
        annual_income.append_option(row.clean_annual_income);
        credit_history.append_option(row.clean_credit_history_months);
        debt_to_income.append_option(row.clean_debt_to_income);
        savings_balance.append_option(row.clean_savings_balance);
        loan_approved.append_option(row.clean_loan_approved);
        interest_rate.append_option(row.clean_interest_rate);
        approved_amount.append_option(row.clean_approved_amount);
        rejection_reason.append_option(row.clean_rejection_reason.as_deref());
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(application_id.finish()),
        Arc::new(pseudo_id.finish()),
        Arc::new(pseudo_source.finish()),
        Arc::new(fallback_flag.finish()),
        Arc::new(age_band.finish()),
        Arc::new(age_band_missing.finish()),
        Arc::new(gender.finish()),
        Arc::new(zip_code.finish()),
        Arc::new(annual_income.finish()),
        Arc::new(credit_history.finish()),
        Arc::new(debt_to_income.finish()),
        Arc::new(savings_balance.finish()),
        Arc::new(loan_approved.finish()),
        Arc::new(interest_rate.finish()),
        Arc::new(approved_amount.finish()),
        Arc::new(rejection_reason.finish()),
    ];

    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Write the analysis dataset as a ZSTD-compressed Parquet file.
/// An empty dataset still produces a valid file carrying the schema.
pub fn write_analysis_parquet(rows: &[AnalysisRow], path: &Path) -> Result<usize, ExportError> {
    let batch = analysis_to_record_batch(rows)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(Default::default()))
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    info!(
        path = %path.display(),
        rows = rows.len(),
        "Analysis Parquet written"
    );
    Ok(rows.len())
}
