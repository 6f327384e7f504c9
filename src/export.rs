use std::fs::File;
use std::path::Path;

use csv::Writer;
use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::ladder::Analysis;
use crate::truth_table::TruthRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Serialize)]
struct AnalysisRecord {
    v1: f64,
    v2: f64,
    v3: f64,
    v_th: f64,
    r_th: f64,
    v_out: f64,
    current: f64,
    power: f64,
}

impl From<&Analysis> for AnalysisRecord {
    fn from(analysis: &Analysis) -> Self {
        AnalysisRecord {
            v1: analysis.inputs.v1,
            v2: analysis.inputs.v2,
            v3: analysis.inputs.v3,
            v_th: analysis.thevenin.v_th,
            r_th: analysis.thevenin.r_th,
            v_out: analysis.output.v_out,
            current: analysis.output.current,
            power: analysis.output.power,
        }
    }
}

#[derive(Serialize)]
struct TruthRowRecord<'a> {
    binary: &'a str,
    v1: f64,
    v2: f64,
    v3: f64,
    v_out: f64,
    current: f64,
    power: f64,
}

impl<'a> From<&'a TruthRow> for TruthRowRecord<'a> {
    fn from(row: &'a TruthRow) -> Self {
        TruthRowRecord {
            binary: &row.bit_pattern,
            v1: row.v1,
            v2: row.v2,
            v3: row.v3,
            v_out: row.v_out,
            current: row.current,
            power: row.power,
        }
    }
}

/// Export a single analysis to file
pub fn export_analysis<P: AsRef<Path>>(analysis: &Analysis, path: P, format: ExportFormat) -> Result<()> {
    let path = path.as_ref();
    match format {
        ExportFormat::Csv => write_csv(path, std::iter::once(AnalysisRecord::from(analysis)))?,
        ExportFormat::Json => write_json(path, analysis)?,
    }
    info!("Analysis exported to {:?}: {}", format, path.display());
    Ok(())
}

/// Export truth table rows to file
pub fn export_truth_table<P: AsRef<Path>>(rows: &[TruthRow], path: P, format: ExportFormat) -> Result<()> {
    let path = path.as_ref();
    match format {
        ExportFormat::Csv => write_csv(path, rows.iter().map(TruthRowRecord::from))?,
        ExportFormat::Json => write_json(path, rows)?,
    }
    info!("Truth table exported to {:?}: {}", format, path.display());
    Ok(())
}

fn write_csv<R, I>(path: &Path, records: I) -> Result<()>
where
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let file = File::create(path)?;
    let mut writer = Writer::from_writer(file);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}
