// JSON dump of a full run report.

use std::io::Write;
use std::path::Path;

use sheetjoin_recon::model::RunReport;

pub fn write<W: Write>(report: &RunReport, mut out: W) -> Result<(), String> {
    serde_json::to_writer_pretty(&mut out, report)
        .map_err(|e| format!("Failed to serialize report: {}", e))?;
    writeln!(out).map_err(|e| e.to_string())
}

pub fn export(report: &RunReport, path: &Path) -> Result<(), String> {
    let file = std::fs::File::create(path)
        .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;
    write(report, std::io::BufWriter::new(file))
}
