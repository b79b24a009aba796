//! Export analysis results.
//!
//! - JSON: the whole `AnalysisOutput`, for a renderer that draws the charts.
//! - CSV: both aligned series in long format, easy to consume in spreadsheets.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::app::pipeline::AnalysisOutput;
use crate::domain::AlignedSeries;
use crate::error::AppError;

/// Write the full analysis output as pretty JSON.
pub fn write_analysis_json(path: &Path, output: &AnalysisOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), output)
        .map_err(|e| AppError::new(4, format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

/// Write both aligned series to one CSV: `indicator,entity,date,value`.
///
/// Missing values are written as empty fields.
pub fn write_observations_csv(path: &Path, output: &AnalysisOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut w = BufWriter::new(file);
    write_observations(&mut w, &[&output.gdp.series, &output.trade.series])
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV: {e}")))?;
    w.flush()
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV: {e}")))?;
    Ok(())
}

fn write_observations<W: Write>(w: &mut W, series: &[&AlignedSeries]) -> std::io::Result<()> {
    writeln!(w, "indicator,entity,date,value")?;
    for s in series {
        for o in s.observations() {
            writeln!(
                w,
                "{},{},{},{}",
                csv_field(s.label()),
                csv_field(&o.entity),
                o.date,
                o.value.map(|v| v.to_string()).unwrap_or_default(),
            )?;
        }
    }
    Ok(())
}

/// Quote a field if it contains a delimiter or quote.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::Observation;

    #[test]
    fn csv_long_format_with_missing_values() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let gdp = AlignedSeries::from_observations("GDP Growth Rate (%)", vec![Observation::new("USA", d, Some(-2.2))]);
        let tb = AlignedSeries::from_observations("Trade, % of GDP", vec![Observation::new("USA", d, None)]);

        let mut buf = Vec::new();
        write_observations(&mut buf, &[&gdp, &tb]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "indicator,entity,date,value");
        assert_eq!(lines[1], "GDP Growth Rate (%),USA,2020-01-01,-2.2");
        assert_eq!(lines[2], "\"Trade, % of GDP\",USA,2020-01-01,");
    }
}
