//! Parsing of CSV input tables into [`SetCollection`]s and [`Items`]
//!
//! All tables must contain a header row. Cells are trimmed and empty
//! cells are ignored.
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::sets::{Items, SetCollection};
use crate::{OraError, OraResult};

/// Default name of the item column of a sets table
pub const DEFAULT_ID_COLUMN: &str = "item_id";
/// Default name of the set column of a sets table
pub const DEFAULT_SET_COLUMN: &str = "set_name";

/// Creates a CSV reader that expects a header row
pub(crate) fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Returns the index of every column in `names`
///
/// # Errors
///
/// [`OraError::InvalidInput`] if a column is not present in the header
pub(crate) fn column_indices(
    headers: &csv::StringRecord,
    names: &[&str],
) -> OraResult<Vec<usize>> {
    names
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|header| header == *name)
                .ok_or_else(|| {
                    OraError::InvalidInput(format!(
                        "column `{name}` not found, available columns: {}",
                        headers.iter().collect::<Vec<_>>().join(", ")
                    ))
                })
        })
        .collect()
}

/// Parses a table of `(item, set name)` rows into a [`SetCollection`]
///
/// `id_column` and `set_column` name the columns that contain the item
/// identifiers and the set names. Other columns are ignored.
///
/// # Examples
///
/// ```
/// use overrep::parser::sets_from_reader;
///
/// let data = "gene,pathway,source\nHK1,Glycolysis,KEGG\nCS,TCA,KEGG\nHK2,Glycolysis,KEGG\n";
/// let sets = sets_from_reader(data.as_bytes(), "gene", "pathway").unwrap();
///
/// assert_eq!(sets.len(), 2);
/// assert_eq!(sets.get("Glycolysis").unwrap().len(), 2);
/// ```
///
/// # Errors
///
/// - [`OraError::InvalidInput`] if one of the columns is missing
/// - [`OraError::Csv`] if the data is not valid CSV
pub fn sets_from_reader<R: Read>(
    reader: R,
    id_column: &str,
    set_column: &str,
) -> OraResult<SetCollection> {
    let mut reader = csv_reader(reader);
    let indices = column_indices(reader.headers()?, &[id_column, set_column])?;
    let (id_idx, set_idx) = (indices[0], indices[1]);

    let mut sets = SetCollection::new();
    for record in reader.records() {
        let record = record?;
        match (record.get(id_idx), record.get(set_idx)) {
            (Some(item), Some(set_name)) if !item.is_empty() && !set_name.is_empty() => {
                sets.insert(item, set_name);
            }
            _ => debug!("Skipping incomplete row {:?}", record),
        }
    }
    Ok(sets)
}

/// Parses the sets table at `path`, see [`sets_from_reader`]
pub fn read_sets<P: AsRef<Path>>(
    path: P,
    id_column: &str,
    set_column: &str,
) -> OraResult<SetCollection> {
    let file = std::fs::File::open(path.as_ref())?;
    let sets = sets_from_reader(file, id_column, set_column)?;
    debug!("Parsed {} sets from {}", sets.len(), path.as_ref().display());
    Ok(sets)
}

/// Parses the first column of a table into [`Items`]
///
/// The name of the column does not matter, but the header row must be present.
///
/// # Examples
///
/// ```
/// use overrep::parser::items_from_reader;
///
/// let items = items_from_reader("compound\naspirin\nimatinib\naspirin\n".as_bytes()).unwrap();
/// assert_eq!(items.len(), 2);
/// assert!(items.contains("imatinib"));
/// ```
///
/// # Errors
///
/// - [`OraError::InvalidInput`] if the table has no columns
/// - [`OraError::Csv`] if the data is not valid CSV
pub fn items_from_reader<R: Read>(reader: R) -> OraResult<Items> {
    let mut reader = csv_reader(reader);
    if reader.headers()?.is_empty() {
        return Err(OraError::InvalidInput(
            "item table must contain at least one column".to_string(),
        ));
    }
    let mut items = Items::new();
    for record in reader.records() {
        let record = record?;
        if let Some(item) = record.get(0).filter(|item| !item.is_empty()) {
            items.insert(item.to_string());
        }
    }
    Ok(items)
}

/// Parses the first column of the table at `path`, see [`items_from_reader`]
pub fn read_items<P: AsRef<Path>>(path: P) -> OraResult<Items> {
    let file = std::fs::File::open(path.as_ref())?;
    let items = items_from_reader(file)?;
    debug!("Parsed {} items from {}", items.len(), path.as_ref().display());
    Ok(items)
}
