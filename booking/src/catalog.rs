//! Read-only reference data: membership plans, theaters, show schedules.
//!
//! The step machine and the screens consume the [`Catalog`] trait. The
//! shipped implementation, [`StaticCatalog`], is parsed from JSON; a copy of
//! the prototype's fixture is embedded in the binary.

use crate::types::{Listing, MembershipPlan, Show, ShowFilter, TaggedShow, Theater};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// The built-in fixture
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// Errors raised while loading a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog file could not be read
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog is not valid JSON or has the wrong shape
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog parsed but violates a uniqueness or non-empty rule
    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

/// Reference data provider
///
/// Implementations are pure: the same query always returns the same answer,
/// and nothing a session does can change the data.
pub trait Catalog: Send + Sync {
    /// Membership plans, in display order
    fn membership_plans(&self) -> &[MembershipPlan];

    /// Theaters, in display order
    fn theaters(&self) -> &[Theater];

    /// Shows at `theater`; empty for an unknown theater
    fn shows_at(&self, theater: &str) -> Vec<Show>;

    /// Shows at every theater except `theater`, tagged with their venue
    fn shows_excluding(&self, theater: Option<&str>) -> Vec<TaggedShow>;

    /// Plan by name
    fn plan(&self, name: &str) -> Option<&MembershipPlan> {
        self.membership_plans().iter().find(|plan| plan.name == name)
    }

    /// Theater by name
    fn theater(&self, name: &str) -> Option<&Theater> {
        self.theaters().iter().find(|theater| theater.name == name)
    }
}

/// What the discovery step lists for `filter`
///
/// Home listings without a home theater are empty rather than an error.
pub fn listings(catalog: &dyn Catalog, filter: ShowFilter, home_theater: Option<&str>) -> Vec<Listing> {
    match filter {
        ShowFilter::Home => home_theater
            .map(|home| catalog.shows_at(home))
            .unwrap_or_default()
            .into_iter()
            .map(|show| Listing {
                show,
                theater: None,
            })
            .collect(),
        ShowFilter::Other => catalog
            .shows_excluding(home_theater)
            .into_iter()
            .map(|tagged| Listing {
                show: tagged.show,
                theater: Some(tagged.theater),
            })
            .collect(),
    }
}

#[derive(Deserialize)]
struct CatalogDocument {
    plans: Vec<MembershipPlan>,
    theaters: Vec<TheaterDocument>,
}

#[derive(Deserialize)]
struct TheaterDocument {
    name: String,
    location: String,
    description: String,
    #[serde(default)]
    shows: Vec<Show>,
}

/// In-memory catalog loaded from JSON
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    plans: Vec<MembershipPlan>,
    theaters: Vec<Theater>,
    shows: HashMap<String, Vec<Show>>,
}

impl StaticCatalog {
    /// The prototype's fixture: two plans, three theaters, one show each
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] only if the embedded fixture is malformed.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Load a catalog file
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, otherwise
    /// as [`StaticCatalog::from_json`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse and validate a catalog document
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Parse`] for malformed JSON
    /// - [`CatalogError::Invalid`] if there are no plans or no theaters, or
    ///   if plan names, theater names, or show titles within a theater repeat
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;

        if document.plans.is_empty() {
            return Err(CatalogError::Invalid("no membership plans".to_string()));
        }
        if document.theaters.is_empty() {
            return Err(CatalogError::Invalid("no theaters".to_string()));
        }
        ensure_unique("membership plan", document.plans.iter().map(|p| p.name.as_str()))?;
        ensure_unique("theater", document.theaters.iter().map(|t| t.name.as_str()))?;

        let mut theaters = Vec::with_capacity(document.theaters.len());
        let mut shows = HashMap::with_capacity(document.theaters.len());
        for entry in document.theaters {
            ensure_unique(
                &format!("show at {}", entry.name),
                entry.shows.iter().map(|s| s.title.as_str()),
            )?;
            shows.insert(entry.name.clone(), entry.shows);
            theaters.push(Theater {
                name: entry.name,
                location: entry.location,
                description: entry.description,
            });
        }

        Ok(Self {
            plans: document.plans,
            theaters,
            shows,
        })
    }
}

fn ensure_unique<'a>(what: &str, names: impl Iterator<Item = &'a str>) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CatalogError::Invalid(format!("duplicate {what} '{name}'")));
        }
    }
    Ok(())
}

impl Catalog for StaticCatalog {
    fn membership_plans(&self) -> &[MembershipPlan] {
        &self.plans
    }

    fn theaters(&self) -> &[Theater] {
        &self.theaters
    }

    fn shows_at(&self, theater: &str) -> Vec<Show> {
        self.shows.get(theater).cloned().unwrap_or_default()
    }

    fn shows_excluding(&self, theater: Option<&str>) -> Vec<TaggedShow> {
        self.theaters
            .iter()
            .filter(|t| Some(t.name.as_str()) != theater)
            .flat_map(|t| {
                self.shows_at(&t.name).into_iter().map(|show| TaggedShow {
                    theater: t.name.clone(),
                    show,
                })
            })
            .collect()
    }
}
