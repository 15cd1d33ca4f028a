//! Canonical in-memory representation of named item sets
//!
//! All input formats (CSV tables, prediction tables, pathway lookups) are
//! converted into a [`SetCollection`] and [`Items`] once at the boundary,
//! the statistics only ever operate on these types.
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// A set of unique item identifiers
///
/// Used for the hits and the universe (background) of an analysis.
pub type Items = HashSet<String>;

/// A single named set and its members
///
/// Each member can only appear once in the set.
#[derive(Debug, Clone, Default)]
pub struct ItemSet {
    name: String,
    members: Items,
}

impl ItemSet {
    /// Constructs a new, empty [`ItemSet`]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            members: Items::new(),
        }
    }

    /// The name of the set, e.g. a pathway or gene symbol
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of distinct members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the set has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Adds a member to the set
    ///
    /// Returns whether the member was newly inserted.
    pub fn insert(&mut self, item: String) -> bool {
        self.members.insert(item)
    }

    /// Returns `true` if `item` is a member of the set
    pub fn contains(&self, item: &str) -> bool {
        self.members.contains(item)
    }

    /// Returns an iterator of all members, in arbitrary order
    pub fn members(&self) -> impl Iterator<Item = &String> {
        self.members.iter()
    }

    /// Returns the number of `items` that are also members of the set
    pub fn overlap(&self, items: &Items) -> usize {
        // iterate the smaller of both sets
        if items.len() < self.members.len() {
            items.iter().filter(|item| self.members.contains(*item)).count()
        } else {
            self.members.iter().filter(|item| items.contains(*item)).count()
        }
    }
}

/// A collection of named [`ItemSet`]s
///
/// The collection is built from `(item, set name)` pairs. A set name appears once
/// per member and an item can belong to several sets. Sets are kept in the
/// order in which their name first appeared, so that the iteration order
/// (and every result derived from it) is deterministic.
///
/// # Examples
///
/// ```
/// use overrep::SetCollection;
///
/// let mut sets = SetCollection::new();
/// sets.insert("HK1", "Glycolysis");
/// sets.insert("CS", "TCA_Cycle");
/// sets.insert("HK2", "Glycolysis");
/// // duplicate pairs are ignored
/// assert!(!sets.insert("HK2", "Glycolysis"));
///
/// assert_eq!(sets.len(), 2);
/// assert_eq!(sets.get("Glycolysis").unwrap().len(), 2);
/// assert_eq!(sets.items().len(), 3);
///
/// let names: Vec<&str> = sets.iter().map(|set| set.name()).collect();
/// assert_eq!(names, vec!["Glycolysis", "TCA_Cycle"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SetCollection {
    sets: Vec<ItemSet>,
    index: HashMap<String, usize>,
}

impl SetCollection {
    /// Constructs a new, empty [`SetCollection`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `item` as a member of the set `set_name`
    ///
    /// The set is created if it does not exist yet.
    /// Returns whether the pair was newly inserted.
    pub fn insert(&mut self, item: &str, set_name: &str) -> bool {
        let idx = match self.index.entry(set_name.to_string()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                self.sets.push(ItemSet::new(set_name));
                *entry.insert(self.sets.len() - 1)
            }
        };
        self.sets[idx].insert(item.to_string())
    }

    /// Returns the [`ItemSet`] with the given name
    pub fn get(&self, set_name: &str) -> Option<&ItemSet> {
        self.index.get(set_name).map(|idx| &self.sets[*idx])
    }

    /// Returns the number of sets
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns `true` if the collection contains no sets
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Returns an iterator of all sets in order of first appearance
    pub fn iter(&self) -> std::slice::Iter<'_, ItemSet> {
        self.sets.iter()
    }

    /// Returns all distinct items that are member of at least one set
    ///
    /// This is the default universe of an analysis.
    pub fn items(&self) -> Items {
        self.sets
            .iter()
            .flat_map(|set| set.members().cloned())
            .collect()
    }
}

impl<'a> IntoIterator for &'a SetCollection {
    type Item = &'a ItemSet;
    type IntoIter = std::slice::Iter<'a, ItemSet>;
    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

impl<A: AsRef<str>, B: AsRef<str>> FromIterator<(A, B)> for SetCollection {
    fn from_iter<T: IntoIterator<Item = (A, B)>>(iter: T) -> Self {
        let mut collection = SetCollection::new();
        for (item, set_name) in iter {
            collection.insert(item.as_ref(), set_name.as_ref());
        }
        collection
    }
}
