//! Gene to pathway annotations from KEGG and WikiPathways
//!
//! Pathway information is provided by an external data source that is
//! abstracted behind the [`PathwayLookup`] trait. The crate ships with
//! [`TablePathwayLookup`], which uses a previously exported mapping table.
//!
//! Lookups are allowed to be incomplete: genes that could not be resolved are
//! reported in [`PathwayLookupResult::unresolved`] and the analysis continues
//! with the remaining genes.
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::parser::{column_indices, csv_reader};
use crate::sets::SetCollection;
use crate::{OraError, OraResult};

/// Column names of pathway mapping tables, in order
pub const PATHWAY_COLUMNS: [&str; 4] = ["gene", "pathway_name", "pathway_id", "source"];

/// The database a pathway originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PathwaySource {
    #[serde(rename = "KEGG")]
    Kegg,
    #[serde(rename = "WIKIPATHWAYS")]
    WikiPathways,
}

impl PathwaySource {
    /// All supported sources
    pub const ALL: [PathwaySource; 2] = [PathwaySource::Kegg, PathwaySource::WikiPathways];

    /// The label of the source as used in mapping tables
    pub fn as_str(&self) -> &'static str {
        match self {
            PathwaySource::Kegg => "KEGG",
            PathwaySource::WikiPathways => "WIKIPATHWAYS",
        }
    }
}

impl Display for PathwaySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for PathwaySource {
    type Error = OraError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "kegg" => Ok(PathwaySource::Kegg),
            "wikipathways" => Ok(PathwaySource::WikiPathways),
            _ => Err(OraError::InvalidInput(format!(
                "unknown pathway source `{value}`"
            ))),
        }
    }
}

/// A single gene to pathway association
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathwayAnnotation {
    gene: String,
    pathway_name: String,
    pathway_id: String,
    source: PathwaySource,
}

impl PathwayAnnotation {
    pub fn new(gene: &str, pathway_name: &str, pathway_id: &str, source: PathwaySource) -> Self {
        Self {
            gene: gene.to_string(),
            pathway_name: pathway_name.to_string(),
            pathway_id: pathway_id.to_string(),
            source,
        }
    }

    /// The gene symbol
    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn pathway_name(&self) -> &str {
        &self.pathway_name
    }

    /// The identifier of the pathway within its source, e.g. `hsa00010`
    pub fn pathway_id(&self) -> &str {
        &self.pathway_id
    }

    pub fn source(&self) -> PathwaySource {
        self.source
    }
}

/// The annotations returned by a [`PathwayLookup`]
#[derive(Debug, Clone, Default)]
pub struct PathwayLookupResult {
    annotations: Vec<PathwayAnnotation>,
    unresolved: Vec<String>,
}

impl PathwayLookupResult {
    pub fn new(annotations: Vec<PathwayAnnotation>, unresolved: Vec<String>) -> Self {
        Self {
            annotations,
            unresolved,
        }
    }

    /// All gene to pathway associations that were found
    pub fn annotations(&self) -> &[PathwayAnnotation] {
        &self.annotations
    }

    /// Genes that are unknown to the pathway source
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    /// Returns `true` if every gene could be resolved
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Returns the pathways of `source` as [`SetCollection`]
    ///
    /// The items are the genes and each pathway (by name) is one set.
    ///
    /// # Examples
    ///
    /// ```
    /// use overrep::pathway::{PathwayAnnotation, PathwayLookupResult, PathwaySource};
    ///
    /// let result = PathwayLookupResult::new(
    ///     vec![
    ///         PathwayAnnotation::new("HK1", "Glycolysis", "hsa00010", PathwaySource::Kegg),
    ///         PathwayAnnotation::new("HK2", "Glycolysis", "hsa00010", PathwaySource::Kegg),
    ///         PathwayAnnotation::new("HK1", "Glycolysis", "WP534", PathwaySource::WikiPathways),
    ///     ],
    ///     vec![],
    /// );
    ///
    /// let kegg = result.sets(PathwaySource::Kegg);
    /// assert_eq!(kegg.get("Glycolysis").unwrap().len(), 2);
    /// let wiki = result.sets(PathwaySource::WikiPathways);
    /// assert_eq!(wiki.get("Glycolysis").unwrap().len(), 1);
    /// ```
    pub fn sets(&self, source: PathwaySource) -> SetCollection {
        self.annotations
            .iter()
            .filter(|annotation| annotation.source == source)
            .map(|annotation| (annotation.gene(), annotation.pathway_name()))
            .collect()
    }

    /// Logs a warning if some genes could not be resolved
    pub fn warn_unresolved(&self) {
        if !self.is_complete() {
            warn!(
                "{} genes could not be resolved to pathways: {}",
                self.unresolved.len(),
                self.unresolved.join(", ")
            );
        }
    }
}

/// A provider of gene to pathway associations
///
/// Implementations should return partial results instead of failing when only
/// some of the genes are unknown. [`OraError::ExternalLookupFailure`] is
/// reserved for a lookup that failed as a whole.
pub trait PathwayLookup {
    /// Returns the KEGG and WikiPathways associations of all `genes`
    fn lookup(&self, genes: &[String]) -> OraResult<PathwayLookupResult>;
}

/// A pathway in the internal storage of [`TablePathwayLookup`]
#[derive(Debug, Clone)]
struct Pathway {
    name: String,
    id: String,
    source: PathwaySource,
}

/// [`PathwayLookup`] backed by a gene to pathway mapping table
///
/// The table must contain the columns `gene`, `pathway_name`, `pathway_id`
/// and `source`, as written by [`pathway_mappings_to_writer`].
///
/// # Examples
///
/// ```
/// use overrep::pathway::{PathwayLookup, TablePathwayLookup};
///
/// let table = "gene,pathway_name,pathway_id,source\n\
///              TP53,p53 signaling pathway,hsa04115,KEGG\n\
///              TP53,Apoptosis,WP254,WIKIPATHWAYS\n";
/// let lookup = TablePathwayLookup::from_reader(table.as_bytes()).unwrap();
///
/// let genes = vec!["TP53".to_string(), "FOO".to_string()];
/// let result = lookup.lookup(&genes).unwrap();
/// assert_eq!(result.annotations().len(), 2);
/// assert_eq!(result.unresolved(), &["FOO".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TablePathwayLookup {
    genes: HashMap<String, SmallVec<[Pathway; 4]>>,
}

impl TablePathwayLookup {
    /// Constructs a new, empty [`TablePathwayLookup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a gene to pathway association
    pub fn insert(&mut self, annotation: PathwayAnnotation) {
        self.genes
            .entry(annotation.gene)
            .or_default()
            .push(Pathway {
                name: annotation.pathway_name,
                id: annotation.pathway_id,
                source: annotation.source,
            });
    }

    /// Returns the number of genes with at least one pathway
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Parses a gene to pathway mapping table
    ///
    /// # Errors
    ///
    /// - [`OraError::InvalidInput`] if a column is missing or a source is unknown
    /// - [`OraError::Csv`] if the data is not valid CSV
    pub fn from_reader<R: Read>(reader: R) -> OraResult<Self> {
        let mut reader = csv_reader(reader);
        let idx = column_indices(reader.headers()?, &PATHWAY_COLUMNS)?;

        let mut lookup = TablePathwayLookup::new();
        for record in reader.records() {
            let record = record?;
            let field = |i: usize| record.get(idx[i]).unwrap_or_default();
            if field(0).is_empty() || field(1).is_empty() {
                debug!("Skipping incomplete row {:?}", record);
                continue;
            }
            let source = PathwaySource::try_from(field(3))?;
            lookup.insert(PathwayAnnotation::new(field(0), field(1), field(2), source));
        }
        Ok(lookup)
    }

    /// Parses the mapping table at `path`, see [`TablePathwayLookup::from_reader`]
    pub fn from_path<P: AsRef<Path>>(path: P) -> OraResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let lookup = Self::from_reader(file)?;
        debug!(
            "Parsed pathways of {} genes from {}",
            lookup.len(),
            path.as_ref().display()
        );
        Ok(lookup)
    }
}

impl PathwayLookup for TablePathwayLookup {
    fn lookup(&self, genes: &[String]) -> OraResult<PathwayLookupResult> {
        let mut seen = HashSet::new();
        let mut annotations = Vec::new();
        let mut unresolved = Vec::new();
        for gene in genes.iter().filter(|gene| seen.insert(gene.as_str())) {
            match self.genes.get(gene) {
                Some(pathways) => {
                    annotations.extend(pathways.iter().map(|pathway| {
                        PathwayAnnotation::new(gene, &pathway.name, &pathway.id, pathway.source)
                    }));
                }
                None => unresolved.push(gene.clone()),
            }
        }
        Ok(PathwayLookupResult::new(annotations, unresolved))
    }
}

/// Writes gene to pathway associations as CSV
///
/// The header is always written, even if `annotations` is empty.
pub fn pathway_mappings_to_writer<W: Write>(
    writer: W,
    annotations: &[PathwayAnnotation],
) -> OraResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(PATHWAY_COLUMNS)?;
    for annotation in annotations {
        writer.serialize(annotation)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes gene to pathway associations as CSV file to `path`
pub fn write_pathway_mappings<P: AsRef<Path>>(
    path: P,
    annotations: &[PathwayAnnotation],
) -> OraResult<()> {
    let file = std::fs::File::create(path)?;
    pathway_mappings_to_writer(file, annotations)
}

#[cfg(test)]
mod test {
    use super::*;

    const TABLE: &str = "gene,pathway_name,pathway_id,source
HK1,Glycolysis / Gluconeogenesis,hsa00010,KEGG
HK2,Glycolysis / Gluconeogenesis,hsa00010,KEGG
HK2,Glycolysis and gluconeogenesis,WP534,WIKIPATHWAYS
CS,Citrate cycle (TCA cycle),hsa00020,kegg
";

    fn genes(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn source_labels() {
        assert_eq!(PathwaySource::try_from("KEGG").unwrap(), PathwaySource::Kegg);
        assert_eq!(
            PathwaySource::try_from("WikiPathways").unwrap(),
            PathwaySource::WikiPathways
        );
        assert!(PathwaySource::try_from("reactome").is_err());
        assert_eq!(PathwaySource::WikiPathways.to_string(), "WIKIPATHWAYS");
    }

    #[test]
    fn parse_table() {
        let lookup = TablePathwayLookup::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(lookup.len(), 3);
    }

    #[test]
    fn parse_unknown_source() {
        let table = "gene,pathway_name,pathway_id,source\nHK1,Glycolysis,R-HSA-70171,REACTOME\n";
        assert!(matches!(
            TablePathwayLookup::from_reader(table.as_bytes()),
            Err(OraError::InvalidInput(_))
        ));
    }

    #[test]
    fn parse_missing_column() {
        let table = "gene,pathway_name,source\nHK1,Glycolysis,KEGG\n";
        assert!(matches!(
            TablePathwayLookup::from_reader(table.as_bytes()),
            Err(OraError::InvalidInput(_))
        ));
    }

    #[test]
    fn partial_lookup() {
        let lookup = TablePathwayLookup::from_reader(TABLE.as_bytes()).unwrap();
        let result = lookup
            .lookup(&genes(&["HK2", "TP53", "HK2", "CS"]))
            .unwrap();

        assert_eq!(result.annotations().len(), 3);
        assert_eq!(result.unresolved(), &genes(&["TP53"]));
        assert!(!result.is_complete());
        assert_eq!(result.annotations()[0].gene(), "HK2");
        assert_eq!(result.annotations()[2].pathway_id(), "hsa00020");
    }

    #[test]
    fn sets_per_source() {
        let lookup = TablePathwayLookup::from_reader(TABLE.as_bytes()).unwrap();
        let result = lookup.lookup(&genes(&["HK1", "HK2", "CS"])).unwrap();
        assert!(result.is_complete());

        let kegg = result.sets(PathwaySource::Kegg);
        assert_eq!(kegg.len(), 2);
        assert_eq!(kegg.get("Glycolysis / Gluconeogenesis").unwrap().len(), 2);

        let wiki = result.sets(PathwaySource::WikiPathways);
        assert_eq!(wiki.len(), 1);
        assert!(wiki.get("Glycolysis and gluconeogenesis").unwrap().contains("HK2"));
    }

    #[test]
    fn empty_lookup() {
        let lookup = TablePathwayLookup::new();
        let result = lookup.lookup(&[]).unwrap();
        assert!(result.annotations().is_empty());
        assert!(result.is_complete());
    }

    #[test]
    fn write_mappings() {
        let annotations = vec![
            PathwayAnnotation::new("TP53", "p53 signaling pathway", "hsa04115", PathwaySource::Kegg),
            PathwayAnnotation::new("TP53", "Apoptosis", "WP254", PathwaySource::WikiPathways),
        ];
        let mut buffer = Vec::new();
        pathway_mappings_to_writer(&mut buffer, &annotations).unwrap();
        let csv = String::from_utf8(buffer).unwrap();
        assert_eq!(
            csv,
            "gene,pathway_name,pathway_id,source\n\
             TP53,p53 signaling pathway,hsa04115,KEGG\n\
             TP53,Apoptosis,WP254,WIKIPATHWAYS\n"
        );

        // written tables can be used as lookup source again
        let lookup = TablePathwayLookup::from_reader(csv.as_bytes()).unwrap();
        let result = lookup.lookup(&genes(&["TP53"])).unwrap();
        assert_eq!(result.annotations(), annotations.as_slice());
    }
}
