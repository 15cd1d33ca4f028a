//! Enrichment analyses of compound to gene target predictions
//!
//! Starting from a table of predicted compound-gene pairs and their global
//! rank, two analyses are run:
//!
//! 1. Compound–gene: are the well ranked compounds enriched among the compounds
//!    predicted for a gene? (items = compounds, sets = genes)
//! 2. Gene–pathway, once per [`PathwaySource`]: are the well ranked genes
//!    enriched in a pathway? (items = genes, sets = pathways)
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::enrichment::{analyze, HitCounting, OraConfig, SetEnrichment};
use crate::parser::{column_indices, csv_reader};
use crate::pathway::{write_pathway_mappings, PathwayAnnotation, PathwayLookup, PathwaySource};
use crate::report::write_results;
use crate::sets::{Items, SetCollection};
use crate::{OraError, OraResult};

pub const DEFAULT_COMPOUND_COLUMN: &str = "pert_iname_compound";
pub const DEFAULT_GENE_COLUMN: &str = "gene";
pub const DEFAULT_RANK_COLUMN: &str = "gene_compound_global_rank";

/// Column names and thresholds of the prediction workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    compound_column: String,
    gene_column: String,
    rank_column: String,
    max_rank: Option<f64>,
    ora: OraConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            compound_column: DEFAULT_COMPOUND_COLUMN.to_string(),
            gene_column: DEFAULT_GENE_COLUMN.to_string(),
            rank_column: DEFAULT_RANK_COLUMN.to_string(),
            max_rank: None,
            ora: OraConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn with_compound_column(mut self, column: &str) -> Self {
        self.compound_column = column.to_string();
        self
    }

    pub fn with_gene_column(mut self, column: &str) -> Self {
        self.gene_column = column.to_string();
        self
    }

    pub fn with_rank_column(mut self, column: &str) -> Self {
        self.rank_column = column.to_string();
        self
    }

    /// Predictions with a rank up to (including) `max_rank` are hits
    ///
    /// If not set, the number of predictions is used.
    pub fn with_max_rank(mut self, max_rank: Option<f64>) -> Self {
        self.max_rank = max_rank;
        self
    }

    pub fn with_ora(mut self, ora: OraConfig) -> Self {
        self.ora = ora;
        self
    }

    pub fn ora(&self) -> &OraConfig {
        &self.ora
    }
}

/// A single predicted compound-gene pair
///
/// Predictions without a rank are part of the mappings, but never a hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    compound: String,
    gene: String,
    rank: Option<f64>,
}

impl Prediction {
    pub fn new(compound: &str, gene: &str, rank: f64) -> Self {
        Self {
            compound: compound.to_string(),
            gene: gene.to_string(),
            rank: Some(rank),
        }
    }

    /// A prediction without a rank
    pub fn unranked(compound: &str, gene: &str) -> Self {
        Self {
            compound: compound.to_string(),
            gene: gene.to_string(),
            rank: None,
        }
    }

    pub fn compound(&self) -> &str {
        &self.compound
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn rank(&self) -> Option<f64> {
        self.rank
    }
}

/// All compound-gene predictions
#[derive(Debug, Clone, Default)]
pub struct PredictionTable {
    rows: Vec<Prediction>,
}

impl PredictionTable {
    pub fn new(rows: Vec<Prediction>) -> Self {
        Self { rows }
    }

    /// Parses a prediction table with the columns named in `config`
    ///
    /// Rows with an empty compound or gene are skipped. An empty rank
    /// cell gives an unranked prediction.
    ///
    /// # Errors
    ///
    /// - [`OraError::InvalidInput`] if a column is missing or a rank is not numeric
    /// - [`OraError::Csv`] if the data is not valid CSV
    pub fn from_reader<R: Read>(reader: R, config: &WorkflowConfig) -> OraResult<Self> {
        let mut reader = csv_reader(reader);
        let idx = column_indices(
            reader.headers()?,
            &[
                config.compound_column.as_str(),
                config.gene_column.as_str(),
                config.rank_column.as_str(),
            ],
        )?;

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let field = |i: usize| record.get(idx[i]).unwrap_or_default();
            let (compound, gene) = (field(0), field(1));
            if compound.is_empty() || gene.is_empty() {
                debug!("Skipping incomplete row {:?}", record);
                continue;
            }
            if field(2).is_empty() {
                rows.push(Prediction::unranked(compound, gene));
                continue;
            }
            let rank = field(2).parse::<f64>().map_err(|_| {
                OraError::InvalidInput(format!(
                    "invalid rank `{}` in row {}",
                    field(2),
                    line + 1
                ))
            })?;
            rows.push(Prediction::new(compound, gene, rank));
        }
        Ok(Self { rows })
    }

    /// Parses the prediction table at `path`, see [`PredictionTable::from_reader`]
    pub fn from_path<P: AsRef<Path>>(path: P, config: &WorkflowConfig) -> OraResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, config)
    }

    /// Returns the number of predictions
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct compound-gene pairs as [`SetCollection`]
    ///
    /// The compounds are the items, the genes are the sets. Pairs are
    /// sorted by compound and gene.
    pub fn mappings(&self) -> SetCollection {
        self.rows
            .iter()
            .map(|row| (row.compound.as_str(), row.gene.as_str()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Returns all distinct genes, sorted
    pub fn genes(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.gene.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn hits(&self, max_rank: f64) -> impl Iterator<Item = &Prediction> {
        self.rows
            .iter()
            .filter(move |row| row.rank.is_some_and(|rank| rank <= max_rank))
    }

    /// Compounds of all predictions with a rank up to `max_rank`
    pub fn hit_compounds(&self, max_rank: f64) -> Items {
        self.hits(max_rank)
            .map(|row| row.compound.clone())
            .collect()
    }

    /// Genes of all predictions with a rank up to `max_rank`
    pub fn hit_genes(&self, max_rank: f64) -> Items {
        self.hits(max_rank).map(|row| row.gene.clone()).collect()
    }
}

/// Results of the prediction workflow
#[derive(Debug, Clone, Default)]
pub struct WorkflowResults {
    compound_gene: Vec<SetEnrichment>,
    gene_pathway: Vec<(PathwaySource, Vec<SetEnrichment>)>,
    pathway_annotations: Vec<PathwayAnnotation>,
}

impl WorkflowResults {
    /// Enrichment of hit compounds among the compounds of each gene
    pub fn compound_gene(&self) -> &[SetEnrichment] {
        &self.compound_gene
    }

    /// Enrichment of hit genes in pathways of `source`
    ///
    /// Returns `None` if the pathway lookup failed
    pub fn gene_pathway(&self, source: PathwaySource) -> Option<&[SetEnrichment]> {
        self.gene_pathway
            .iter()
            .find(|(s, _)| *s == source)
            .map(|(_, rows)| rows.as_slice())
    }

    /// The gene to pathway associations used for the pathway analyses
    pub fn pathway_annotations(&self) -> &[PathwayAnnotation] {
        &self.pathway_annotations
    }

    /// Writes all result tables into `dir`
    ///
    /// Returns the paths of all written files
    pub fn write<P: AsRef<Path>>(&self, dir: P) -> OraResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        let path = dir.join("ora_compound_gene.csv");
        write_results(&path, &self.compound_gene)?;
        written.push(path);

        for (source, rows) in &self.gene_pathway {
            let path = dir.join(format!(
                "ora_gene_pathway_{}.csv",
                source.as_str().to_lowercase()
            ));
            write_results(&path, rows)?;
            written.push(path);
        }

        if !self.gene_pathway.is_empty() {
            let path = dir.join("pathways.csv");
            write_pathway_mappings(&path, &self.pathway_annotations)?;
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs the compound–gene and gene–pathway enrichment analyses
///
/// ```mermaid
/// flowchart LR
///     P[Prediction table] --> M[compound-gene mappings]
///     P --> H[hit compounds / hit genes]
///     M --> CG[ORA compound-gene]
///     H --> CG
///     M --> L{{PathwayLookup}}
///     L --> K[ORA gene-pathway KEGG]
///     L --> W[ORA gene-pathway WikiPathways]
///     H --> K
///     H --> W
/// ```
///
/// Pathway universes only contain genes that are annotated to a pathway of
/// the respective source, so hit genes are always restricted to the universe
/// for the pathway analyses ([`HitCounting::InUniverse`]).
///
/// A failing pathway lookup is logged and the pathway analyses are skipped.
/// Without any hit or prediction, the compound–gene table is empty.
///
/// # Errors
///
/// Returns the errors of [`analyze`] for the compound–gene analysis,
/// except [`OraError::EmptyUniverseOrHits`].
///
/// # Examples
///
/// ```
/// use overrep::pathway::{PathwaySource, TablePathwayLookup};
/// use overrep::workflow::{run, Prediction, PredictionTable, WorkflowConfig};
///
/// let table = PredictionTable::new(vec![
///     Prediction::new("aspirin", "PTGS1", 1.0),
///     Prediction::new("aspirin", "PTGS2", 2.0),
///     Prediction::new("ibuprofen", "PTGS1", 3.0),
///     Prediction::new("ibuprofen", "PTGS2", 4.0),
/// ]);
/// let config = WorkflowConfig::default().with_max_rank(Some(2.0));
/// let lookup = TablePathwayLookup::new();
///
/// let results = run(&table, &lookup, &config).unwrap();
/// assert_eq!(results.compound_gene().len(), 2);
/// assert!(results.gene_pathway(PathwaySource::Kegg).unwrap().is_empty());
/// ```
pub fn run(
    table: &PredictionTable,
    lookup: &dyn PathwayLookup,
    config: &WorkflowConfig,
) -> OraResult<WorkflowResults> {
    let max_rank = config
        .max_rank
        .unwrap_or_else(|| crate::f64_from_usize(table.len()));

    let mappings = table.mappings();
    let hit_compounds = table.hit_compounds(max_rank);
    let compound_gene = match analyze(&mappings, &hit_compounds, None, &config.ora) {
        Ok(rows) => rows,
        Err(OraError::EmptyUniverseOrHits) => {
            warn!("No compound predictions up to rank {}", max_rank);
            Vec::new()
        }
        Err(err) => return Err(err),
    };
    info!("Compound-gene analysis: {} genes tested", compound_gene.len());

    let mut results = WorkflowResults {
        compound_gene,
        ..Default::default()
    };

    let pathways = match lookup.lookup(&table.genes()) {
        Ok(pathways) => pathways,
        Err(err) => {
            warn!("Skipping pathway analyses: {}", err);
            return Ok(results);
        }
    };
    pathways.warn_unresolved();

    let hit_genes = table.hit_genes(max_rank);
    let pathway_config = config.ora.with_hit_counting(HitCounting::InUniverse);
    for source in PathwaySource::ALL {
        let sets = pathways.sets(source);
        let rows = match analyze(&sets, &hit_genes, None, &pathway_config) {
            Ok(rows) => rows,
            Err(OraError::EmptyUniverseOrHits) => {
                warn!("No {} pathways for the hit genes", source);
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        info!("Gene-pathway analysis ({}): {} pathways tested", source, rows.len());
        results.gene_pathway.push((source, rows));
    }
    results.pathway_annotations = pathways.annotations().to_vec();
    Ok(results)
}
