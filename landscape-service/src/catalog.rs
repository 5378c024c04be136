//! Lecture catalog and the structured query filter

use std::path::Path;

use landscape_core::Document;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Names that must all be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameFilter {
    #[serde(default)]
    pub names: Vec<String>,
}

/// Organization constraints, each any-of, all on one organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<String>>,
}

/// Open interval; both bounds exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
}

impl Bounds {
    fn contains(&self, value: u64) -> bool {
        self.min.map_or(true, |min| value > min) && self.max.map_or(true, |max| value < max)
    }
}

/// Lecture attribute constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LectureFilter {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub lecture_type: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Vec<String>>,
    /// Milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<Bounds>,
}

/// Structured selection of lectures. An empty filter selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<NameFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<NameFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizations: Option<OrganizationFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lectures: Option<LectureFilter>,
}

fn tagged(field: &str, values: &[String]) -> String {
    format!("{}:{}", field, sorted_key(values))
}

fn sorted_key(values: &[String]) -> String {
    let mut values = values.to_vec();
    values.sort();
    values.join("-")
}

fn any_of(allowed: &Option<Vec<String>>, value: Option<&str>) -> bool {
    match allowed {
        None => true,
        Some(list) => value.is_some_and(|v| list.iter().any(|a| a == v)),
    }
}

impl QueryFilter {
    /// Lectures carrying the given category.
    pub fn category(name: impl Into<String>) -> Self {
        Self {
            categories: Some(NameFilter {
                names: vec![name.into()],
            }),
            ..Self::default()
        }
    }

    /// Cache key: one `field:values` part per present constraint, values
    /// sorted and `-`-joined, parts `|`-joined in filter order.
    pub fn cache_key(&self) -> String {
        let mut key: Vec<String> = Vec::new();
        if let Some(categories) = &self.categories {
            key.push(tagged("categories", &categories.names));
        }
        if let Some(authors) = &self.authors {
            key.push(tagged("authors", &authors.names));
        }
        if let Some(orgs) = &self.organizations {
            let fields = [
                ("organizations.names", &orgs.names),
                ("organizations.cities", &orgs.cities),
                ("organizations.countries", &orgs.countries),
            ];
            for (field, values) in fields {
                if let Some(values) = values {
                    key.push(tagged(field, values));
                }
            }
        }
        if let Some(lectures) = &self.lectures {
            for (field, values) in [("type", &lectures.lecture_type), ("language", &lectures.language)] {
                if let Some(values) = values {
                    key.push(tagged(field, values));
                }
            }
            for (field, bounds) in [("duration", &lectures.duration), ("views", &lectures.views)] {
                if let Some(bounds) = bounds {
                    key.extend(bounds.min.map(|v| format!("{}.min:{}", field, v)));
                    key.extend(bounds.max.map(|v| format!("{}.max:{}", field, v)));
                }
            }
        }
        key.join("|")
    }

    /// Whether `doc` satisfies every constraint.
    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(categories) = &self.categories {
            let present = |name: &String| doc.categories.iter().any(|c| &c.title == name);
            if !categories.names.iter().all(present) {
                return false;
            }
        }

        if let Some(authors) = &self.authors {
            let present = |name: &String| doc.presenters.iter().any(|p| &p.name == name);
            if !authors.names.iter().all(present) {
                return false;
            }
        }

        if let Some(orgs) = &self.organizations {
            let found = doc
                .presenters
                .iter()
                .flat_map(|p| p.works_at.iter())
                .any(|o| {
                    any_of(&orgs.names, o.name.as_deref())
                        && any_of(&orgs.cities, o.city.as_deref())
                        && any_of(&orgs.countries, o.country.as_deref())
                });
            if !found {
                return false;
            }
        }

        if let Some(lectures) = &self.lectures {
            if !any_of(&lectures.lecture_type, doc.lecture_type.as_deref())
                || !any_of(&lectures.language, doc.language.as_deref())
            {
                return false;
            }
            if let Some(bounds) = &lectures.duration {
                if !doc.duration.is_some_and(|d| bounds.contains(d)) {
                    return false;
                }
            }
            if let Some(bounds) = &lectures.views {
                if !bounds.contains(doc.views) {
                    return false;
                }
            }
        }

        true
    }
}

/// Source of the corpus for a query.
pub trait CorpusSource: Send + Sync {
    /// Matching lectures in catalog order.
    fn query(&self, filter: &QueryFilter) -> Vec<Document>;

    /// Total number of lectures.
    fn size(&self) -> usize;
}

/// In-memory catalog over a JSON array of lecture records.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    lectures: Vec<Document>,
}

impl MemoryCatalog {
    pub fn new(lectures: Vec<Document>) -> Self {
        Self { lectures }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl CorpusSource for MemoryCatalog {
    fn query(&self, filter: &QueryFilter) -> Vec<Document> {
        self.lectures
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect()
    }

    fn size(&self) -> usize {
        self.lectures.len()
    }
}
