// CSV export of a single table (normally `Matched`).

use std::path::Path;

use crate::table::Table;

pub fn export(table: &Table, path: &Path) -> Result<(), String> {
    export_with_delimiter(table, path, b',')
}

pub fn export_tsv(table: &Table, path: &Path) -> Result<(), String> {
    export_with_delimiter(table, path, b'\t')
}

fn export_with_delimiter(table: &Table, path: &Path, delimiter: u8) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    writer.write_record(&table.headers).map_err(|e| e.to_string())?;
    for row in &table.rows {
        let record: Vec<String> = row.iter().map(|c| c.display()).collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    log::info!("wrote {} ({} rows)", path.display(), table.rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{matched_table, tests::sample_report};
    use sheetjoin_recon::model::UNIDENTIFIED_ROOM;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_csv_export_matched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matched.csv");
        let table = matched_table(&sample_report(), UNIDENTIFIED_ROOM);

        export(&table, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID,Name,Room,Grade,AnswerRun,Slot001,"));
        assert!(lines[0].ends_with("Slot010"));
        assert_eq!(lines[1], "12345,JOAO SILVA,7AM,8º Ano,ABCDE*,A,B,C,D,E,*,,,,");
    }

    #[test]
    fn test_tsv_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matched.tsv");
        let table = matched_table(&sample_report(), UNIDENTIFIED_ROOM);

        export_tsv(&table, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.lines().next().unwrap().starts_with("ID\tName\tRoom"));
    }

    #[test]
    fn test_csv_export_unwritable_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let table = matched_table(&sample_report(), UNIDENTIFIED_ROOM);
        assert!(export(&table, &path).is_err());
    }
}
