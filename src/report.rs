//! Writing and reading of result tables
//!
//! Result tables are CSV files with the columns
//! `set_name, overlap_size, set_size, hit_size, universe_size, p_value, fdr`.
use std::fmt::Write as _;
use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use crate::enrichment::SetEnrichment;
use crate::parser::csv_reader;
use crate::OraResult;

/// Column names of the result table, in order
pub const RESULT_COLUMNS: [&str; 7] = [
    "set_name",
    "overlap_size",
    "set_size",
    "hit_size",
    "universe_size",
    "p_value",
    "fdr",
];

/// Writes `results` as CSV into `writer`
///
/// The header is always written, even if `results` is empty.
///
/// # Examples
///
/// ```
/// use overrep::report::results_to_writer;
/// use overrep::SetEnrichment;
///
/// let mut buffer = Vec::new();
/// let rows = vec![SetEnrichment::new("Glycolysis", 3, 5, 4, 10, 0.2619)];
/// results_to_writer(&mut buffer, &rows).unwrap();
///
/// let csv = String::from_utf8(buffer).unwrap();
/// assert!(csv.starts_with("set_name,overlap_size,set_size,hit_size,universe_size,p_value,fdr\n"));
/// assert!(csv.contains("Glycolysis,3,5,4,10,0.2619,1.0"));
/// ```
pub fn results_to_writer<W: Write>(writer: W, results: &[SetEnrichment]) -> OraResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(RESULT_COLUMNS)?;
    for row in results {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `results` as CSV file to `path`, see [`results_to_writer`]
pub fn write_results<P: AsRef<Path>>(path: P, results: &[SetEnrichment]) -> OraResult<()> {
    let file = std::fs::File::create(path.as_ref())?;
    results_to_writer(file, results)?;
    debug!(
        "Wrote {} results to {}",
        results.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Parses a result table that was written with [`results_to_writer`]
pub fn results_from_reader<R: Read>(reader: R) -> OraResult<Vec<SetEnrichment>> {
    let mut reader = csv_reader(reader);
    let mut results = Vec::new();
    for row in reader.deserialize::<SetEnrichment>() {
        results.push(row?);
    }
    Ok(results)
}

/// Parses the result table at `path`, see [`results_from_reader`]
pub fn read_results<P: AsRef<Path>>(path: P) -> OraResult<Vec<SetEnrichment>> {
    let file = std::fs::File::open(path)?;
    results_from_reader(file)
}

/// Formats `results` as a tab separated table for printing
pub fn format_results(results: &[&SetEnrichment]) -> String {
    let mut out = RESULT_COLUMNS.join("\t");
    out.push('\n');
    for row in results {
        // writing into a String never fails
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{:e}\t{:e}",
            row.set_name(),
            row.overlap_size(),
            row.set_size(),
            row.hit_size(),
            row.universe_size(),
            row.p_value(),
            row.fdr()
        );
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::enrichment::analyze;
    use crate::sets::{Items, SetCollection};
    use crate::OraConfig;

    fn results() -> Vec<SetEnrichment> {
        let sets: SetCollection = (0..40)
            .map(|i| (format!("gene{i}"), format!("pathway{}", i % 4)))
            .collect();
        let hits: Items = [0, 4, 8, 12, 16, 1, 2]
            .iter()
            .map(|i| format!("gene{i}"))
            .collect();
        analyze(&sets, &hits, None, &OraConfig::default()).unwrap()
    }

    #[test]
    fn roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ora_results.csv");
        let rows = results();

        write_results(&path, &rows).unwrap();
        let parsed = read_results(&path).unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn empty_table_has_header() {
        let mut buffer = Vec::new();
        results_to_writer(&mut buffer, &[]).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "set_name,overlap_size,set_size,hit_size,universe_size,p_value,fdr\n"
        );
        assert!(results_from_reader(RESULT_COLUMNS.join(",").as_bytes())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn column_order() {
        let mut buffer = Vec::new();
        results_to_writer(&mut buffer, &results()).unwrap();
        let csv = String::from_utf8(buffer).unwrap();
        let first = csv.lines().nth(1).unwrap();
        assert!(first.starts_with("pathway0,5,10,7,40,"));
    }

    #[test]
    fn invalid_result_table() {
        let data = "set_name,overlap_size\nfoo,bar\n";
        assert!(results_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn printable_table() {
        let rows = results();
        let refs: Vec<&SetEnrichment> = rows.iter().collect();
        let table = format_results(&refs);
        assert_eq!(table.lines().count(), rows.len() + 1);
        assert!(table.starts_with("set_name\toverlap_size"));
    }
}
