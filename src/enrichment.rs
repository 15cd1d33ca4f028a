//! Hypergeometric overrepresentation analysis of a [`SetCollection`]
//!
//! For every set with at least [`OraConfig::min_set_size`] members, the
//! probability to observe the same or a larger overlap with the hits by chance
//! is calculated with the upper tail of the hypergeometric distribution.
//! All p-values are then corrected using the Benjamini–Hochberg procedure.
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::sets::{Items, SetCollection};
use crate::stats::{benjamini_hochberg, round_to, Hypergeometric};
use crate::{f64_from_usize, u64_from_usize, OraError, OraResult};
use crate::{DEFAULT_MIN_SET_SIZE, DEFAULT_PRECISION};

/// Defines how the number of hits (draws) is counted
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum HitCounting {
    /// All distinct hits are counted, even if they are not part of the universe
    #[default]
    All,
    /// Hits are restricted to members of the universe before counting
    /// and before calculating overlaps
    InUniverse,
}

/// Parameters of an overrepresentation analysis
///
/// # Examples
///
/// ```
/// use overrep::{HitCounting, OraConfig};
///
/// let config = OraConfig::default()
///     .with_min_set_size(5)
///     .with_hit_counting(HitCounting::InUniverse);
///
/// assert_eq!(config.min_set_size(), 5);
/// assert_eq!(config.hit_counting(), HitCounting::InUniverse);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OraConfig {
    min_set_size: usize,
    hit_counting: HitCounting,
}

impl Default for OraConfig {
    fn default() -> Self {
        Self {
            min_set_size: DEFAULT_MIN_SET_SIZE,
            hit_counting: HitCounting::default(),
        }
    }
}

impl OraConfig {
    /// Sets with fewer members are not tested
    pub fn with_min_set_size(mut self, min_set_size: usize) -> Self {
        self.min_set_size = min_set_size;
        self
    }

    pub fn with_hit_counting(mut self, hit_counting: HitCounting) -> Self {
        self.hit_counting = hit_counting;
        self
    }

    pub fn min_set_size(&self) -> usize {
        self.min_set_size
    }

    pub fn hit_counting(&self) -> HitCounting {
        self.hit_counting
    }
}

/// The test result of a single set
///
/// [`SetEnrichment`] is returned by [`analyze`] and is also the row format
/// of the result CSV files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetEnrichment {
    set_name: String,
    overlap_size: usize,
    set_size: usize,
    hit_size: usize,
    universe_size: usize,
    p_value: f64,
    fdr: f64,
}

impl SetEnrichment {
    /// Constructs a new `SetEnrichment` without FDR
    pub fn new(
        set_name: &str,
        overlap_size: usize,
        set_size: usize,
        hit_size: usize,
        universe_size: usize,
        p_value: f64,
    ) -> Self {
        Self {
            set_name: set_name.to_string(),
            overlap_size,
            set_size,
            hit_size,
            universe_size,
            p_value,
            fdr: 1.0,
        }
    }

    /// The name of the tested set
    pub fn set_name(&self) -> &str {
        &self.set_name
    }

    /// The number of hits that are members of the set
    pub fn overlap_size(&self) -> usize {
        self.overlap_size
    }

    /// The number of members of the set
    pub fn set_size(&self) -> usize {
        self.set_size
    }

    /// The number of hits, identical for all sets of one analysis
    pub fn hit_size(&self) -> usize {
        self.hit_size
    }

    /// The number of items in the universe, identical for all sets of one analysis
    pub fn universe_size(&self) -> usize {
        self.universe_size
    }

    /// Returns the p-value of the enrichment
    ///
    /// The p-value indicates the probability to observe
    /// at least the same overlap by chance
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// Returns the Benjamini–Hochberg adjusted p-value
    pub fn fdr(&self) -> f64 {
        self.fdr
    }

    /// Returns the fold enrichment of hits in the set over the universe
    pub fn fold_enrichment(&self) -> f64 {
        (f64_from_usize(self.overlap_size) / f64_from_usize(self.hit_size))
            / (f64_from_usize(self.set_size) / f64_from_usize(self.universe_size))
    }

    /// Returns `true` if the FDR is below `threshold`
    pub fn is_significant(&self, threshold: f64) -> bool {
        self.fdr < threshold
    }
}

/// Calculates the overrepresentation of `hits` in every set of `sets`
///
/// - `universe` is the background population. If `None`, all items of `sets` are used.
/// - Only sets with at least `config.min_set_size()` members are tested.
/// - Sets with more members than the universe are skipped with a warning.
///
/// The results are sorted by ascending p-value. Sets with identical p-values
/// keep the order of `sets`. The p-values and FDR values are rounded to
/// [`DEFAULT_PRECISION`] decimal digits.
///
/// # Errors
///
/// - [`OraError::InvalidInput`] if `min_set_size` is 0 or if there are more
///   hits than items in the universe
/// - [`OraError::EmptyUniverseOrHits`] if there are no hits or the universe is empty
///
/// No set meeting the minimum size is not an error, an empty `Vec` is returned instead.
///
/// # Examples
///
/// ```
/// use overrep::{analyze, Items, OraConfig, SetCollection};
///
/// let sets: SetCollection = [("a", "S1"), ("b", "S1"), ("c", "S2"), ("d", "S2")]
///     .into_iter()
///     .collect();
/// let hits: Items = ["a", "b"].into_iter().map(String::from).collect();
///
/// let results = analyze(&sets, &hits, None, &OraConfig::default()).unwrap();
/// assert_eq!(results.len(), 2);
/// assert_eq!(results[0].set_name(), "S1");
/// assert!(results[0].p_value() < results[1].p_value());
/// ```
pub fn analyze(
    sets: &SetCollection,
    hits: &Items,
    universe: Option<&Items>,
    config: &OraConfig,
) -> OraResult<Vec<SetEnrichment>> {
    if config.min_set_size == 0 {
        return Err(OraError::InvalidInput(
            "minimum set size must be at least 1".to_string(),
        ));
    }

    let default_universe;
    let universe = if let Some(universe) = universe {
        universe
    } else {
        default_universe = sets.items();
        &default_universe
    };

    let restricted_hits;
    let hits = match config.hit_counting {
        HitCounting::All => hits,
        HitCounting::InUniverse => {
            restricted_hits = hits.intersection(universe).cloned().collect::<Items>();
            &restricted_hits
        }
    };

    if universe.is_empty() || hits.is_empty() {
        return Err(OraError::EmptyUniverseOrHits);
    }

    if hits.len() > universe.len() {
        return Err(OraError::InvalidInput(format!(
            "{} hits exceed the universe of {} items",
            hits.len(),
            universe.len()
        )));
    }

    let population = u64_from_usize(universe.len());
    let draws = u64_from_usize(hits.len());

    let mut res = Vec::new();
    for set in sets {
        if set.len() < config.min_set_size {
            debug!("Skipping {} with {} members", set.name(), set.len());
            continue;
        }
        if set.len() > universe.len() {
            warn!(
                "Skipping {} with {} members, larger than the universe of {} items",
                set.name(),
                set.len(),
                universe.len()
            );
            continue;
        }
        let overlap = set.overlap(hits);
        let hyper = Hypergeometric::new(
            // Items in the universe
            // ==> population
            population,
            // Members of the set
            // ==> successes
            u64_from_usize(set.len()),
            // Hits
            // ==> draws
            draws,
        )
        .map_err(|err| OraError::InvalidInput(format!("set {}: {}", set.name(), err)))?;

        // inclusive upper tail, i.e. "overlap or more"
        let p_value = hyper.upper_tail(u64_from_usize(overlap));
        debug!(
            "Set:{}\tPopulation: {}, Successes: {}, Draws: {}, Observed: {}, p: {}",
            set.name(),
            population,
            set.len(),
            draws,
            overlap,
            p_value
        );

        res.push(SetEnrichment::new(
            set.name(),
            overlap,
            set.len(),
            hits.len(),
            universe.len(),
            p_value,
        ));
    }

    let p_values: Vec<f64> = res.iter().map(SetEnrichment::p_value).collect();
    let fdr = benjamini_hochberg(&p_values)?;

    for (row, fdr) in res.iter_mut().zip(fdr) {
        row.p_value = round_to(row.p_value, DEFAULT_PRECISION);
        row.fdr = round_to(fdr, DEFAULT_PRECISION);
    }

    // `sort_by` is stable, ties keep the order of the set collection
    res.sort_by(|a, b| a.p_value.total_cmp(&b.p_value));

    info!(
        "Tested {} of {} sets with {} hits in a universe of {} items",
        res.len(),
        sets.len(),
        hits.len(),
        universe.len()
    );
    Ok(res)
}

/// Returns all results with an FDR below `threshold`, keeping their order
pub fn significant(results: &[SetEnrichment], threshold: f64) -> Vec<&SetEnrichment> {
    results
        .iter()
        .filter(|row| row.is_significant(threshold))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    const TOL: f64 = 1e-5;

    fn items(ids: &[&str]) -> Items {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn metabolism() -> SetCollection {
        let mut sets = SetCollection::new();
        for gene in ["HK1", "HK2", "GPI", "PFKL", "ALDOA"] {
            sets.insert(gene, "Glycolysis");
        }
        for gene in ["CS", "ACO1", "IDH1", "OGDH", "SDHA"] {
            sets.insert(gene, "TCA_Cycle");
        }
        sets
    }

    #[test]
    fn glycolysis_enriched() {
        let sets = metabolism();
        let hits = items(&["HK2", "PFKL", "ALDOA", "IDH1"]);
        let universe = sets.items();

        let res = analyze(&sets, &hits, Some(&universe), &OraConfig::default()).unwrap();
        assert_eq!(res.len(), 2);

        let glycolysis = &res[0];
        assert_eq!(glycolysis.set_name(), "Glycolysis");
        assert_eq!(glycolysis.overlap_size(), 3);
        assert_eq!(glycolysis.set_size(), 5);
        assert_eq!(glycolysis.hit_size(), 4);
        assert_eq!(glycolysis.universe_size(), 10);
        assert!((glycolysis.p_value() - 0.2619).abs() < TOL);
        assert!((glycolysis.fdr() - 0.52381).abs() < TOL);

        let tca = &res[1];
        assert_eq!(tca.set_name(), "TCA_Cycle");
        assert_eq!(tca.overlap_size(), 1);
        assert!((tca.p_value() - 0.97619).abs() < TOL);
        assert!((tca.fdr() - 0.97619).abs() < TOL);
    }

    #[test]
    fn default_universe() {
        let sets = metabolism();
        let hits = items(&["HK2", "PFKL", "ALDOA", "IDH1"]);
        let explicit = analyze(&sets, &hits, Some(&sets.items()), &OraConfig::default()).unwrap();
        let implicit = analyze(&sets, &hits, None, &OraConfig::default()).unwrap();
        assert_eq!(explicit, implicit);
    }

    #[test]
    fn min_set_size() {
        let mut sets = metabolism();
        sets.insert("TP53", "Apoptosis");
        let hits = items(&["HK2", "TP53"]);

        let res = analyze(&sets, &hits, None, &OraConfig::default()).unwrap();
        assert_eq!(res.len(), 2);
        assert!(res.iter().all(|row| row.set_name() != "Apoptosis"));

        let config = OraConfig::default().with_min_set_size(1);
        let res = analyze(&sets, &hits, None, &config).unwrap();
        assert_eq!(res.len(), 3);

        let config = OraConfig::default().with_min_set_size(6);
        let res = analyze(&sets, &hits, None, &config).unwrap();
        assert!(res.is_empty());
    }

    #[test]
    fn invalid_min_set_size() {
        let sets = metabolism();
        let hits = items(&["HK2"]);
        let config = OraConfig::default().with_min_set_size(0);
        assert!(matches!(
            analyze(&sets, &hits, None, &config),
            Err(OraError::InvalidInput(_))
        ));
    }

    #[test]
    fn empty_hits_or_universe() {
        let sets = metabolism();
        assert!(matches!(
            analyze(&sets, &Items::new(), None, &OraConfig::default()),
            Err(OraError::EmptyUniverseOrHits)
        ));

        let hits = items(&["HK2"]);
        assert!(matches!(
            analyze(&sets, &hits, Some(&Items::new()), &OraConfig::default()),
            Err(OraError::EmptyUniverseOrHits)
        ));

        assert!(matches!(
            analyze(&SetCollection::new(), &hits, None, &OraConfig::default()),
            Err(OraError::EmptyUniverseOrHits)
        ));
    }

    #[test]
    fn hits_outside_universe() {
        let sets = metabolism();
        let hits = items(&["HK2", "PFKL", "ALDOA", "IDH1", "NOT_A_GENE"]);

        let res = analyze(&sets, &hits, None, &OraConfig::default()).unwrap();
        assert_eq!(res[0].hit_size(), 5);
        assert_eq!(res[0].overlap_size(), 3);

        let config = OraConfig::default().with_hit_counting(HitCounting::InUniverse);
        let res = analyze(&sets, &hits, None, &config).unwrap();
        assert_eq!(res[0].hit_size(), 4);
        assert!((res[0].p_value() - 0.2619).abs() < TOL);
    }

    #[test]
    fn more_hits_than_universe() {
        let sets: SetCollection = [("a", "S1"), ("b", "S1")].into_iter().collect();
        let hits = items(&["a", "b", "c"]);
        assert!(matches!(
            analyze(&sets, &hits, None, &OraConfig::default()),
            Err(OraError::InvalidInput(_))
        ));

        let config = OraConfig::default().with_hit_counting(HitCounting::InUniverse);
        let res = analyze(&sets, &hits, None, &config).unwrap();
        assert_eq!(res[0].hit_size(), 2);
        assert!((res[0].p_value() - 1.0).abs() < TOL);
    }

    #[test]
    fn set_larger_than_universe() {
        let mut sets = metabolism();
        for gene in ["A", "B", "C", "D", "E", "F", "G"] {
            sets.insert(gene, "Large");
        }
        let universe = items(&["HK1", "HK2", "GPI", "PFKL", "ALDOA", "CS"]);
        let hits = items(&["HK2", "PFKL", "ALDOA"]);

        let res = analyze(&sets, &hits, Some(&universe), &OraConfig::default()).unwrap();
        let names: Vec<&str> = res.iter().map(SetEnrichment::set_name).collect();
        assert_eq!(names, vec!["Glycolysis", "TCA_Cycle"]);
        assert_eq!(res[0].universe_size(), 6);
        // C(5, 3) * C(1, 0) / C(6, 3)
        assert!((res[0].p_value() - 0.5).abs() < TOL);
        assert!((res[1].p_value() - 1.0).abs() < TOL);
    }

    #[test]
    fn stable_ties() {
        let sets: SetCollection = [
            ("a", "S1"),
            ("b", "S1"),
            ("c", "S2"),
            ("d", "S2"),
            ("e", "S3"),
            ("f", "S3"),
            ("g", "S4"),
            ("h", "S4"),
        ]
        .into_iter()
        .collect();
        let hits = items(&["g", "h"]);

        let res = analyze(&sets, &hits, None, &OraConfig::default()).unwrap();
        let names: Vec<&str> = res.iter().map(SetEnrichment::set_name).collect();
        assert_eq!(names, vec!["S4", "S1", "S2", "S3"]);
        assert!((res[0].p_value() - round_to(1.0 / 28.0, 5)).abs() < TOL);
        assert!((res[1].p_value() - 1.0).abs() < TOL);
    }

    #[test]
    fn result_properties() {
        let mut sets = SetCollection::new();
        for i in 0..60 {
            let item = format!("item{i}");
            sets.insert(&item, &format!("mod3_{}", i % 3));
            sets.insert(&item, &format!("mod7_{}", i % 7));
            if i < 20 {
                sets.insert(&item, "first20");
            }
        }
        let hits: Items = (0..15).map(|i| format!("item{i}")).collect();
        let config = OraConfig::default().with_min_set_size(9);

        let res = analyze(&sets, &hits, None, &config).unwrap();
        let expected = sets.iter().filter(|set| set.len() >= 9).count();
        assert_eq!(res.len(), expected);

        for row in &res {
            assert!((0.0..=1.0).contains(&row.p_value()));
            assert!((0.0..=1.0).contains(&row.fdr()));
            assert!(row.set_size() >= 9);
            assert!(row.overlap_size() <= row.set_size().min(row.hit_size()));
            assert_eq!(row.hit_size(), 15);
            assert_eq!(row.universe_size(), 60);
        }
        for window in res.windows(2) {
            assert!(window[0].p_value() <= window[1].p_value());
            assert!(window[0].fdr() <= window[1].fdr());
        }
        assert_eq!(res[0].set_name(), "first20");
    }

    #[test]
    fn idempotent() {
        let sets = metabolism();
        let hits = items(&["HK2", "PFKL", "ALDOA", "IDH1"]);
        let first = analyze(&sets, &hits, None, &OraConfig::default()).unwrap();
        let second = analyze(&sets, &hits, None, &OraConfig::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn significant_rows() {
        let sets: SetCollection = (0..20)
            .map(|i| (format!("item{i}"), if i < 10 { "A" } else { "B" }))
            .collect();
        let hits: Items = (0..8).map(|i| format!("item{i}")).collect();

        let res = analyze(&sets, &hits, None, &OraConfig::default()).unwrap();
        let sig = significant(&res, 0.05);
        assert_eq!(sig.len(), 1);
        assert_eq!(sig[0].set_name(), "A");
        assert!(significant(&res, 0.0).is_empty());
    }

    #[test]
    fn fold_enrichment() {
        let row = SetEnrichment::new("S1", 3, 5, 4, 10, 0.26);
        assert!((row.fold_enrichment() - 1.5).abs() < f64::EPSILON);
    }
}
