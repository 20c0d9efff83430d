use std::collections::BTreeMap;

use crate::analysis::DocumentClaims;
use crate::types::DocumentType;

/// Run-wide counters of document classifications and license claims.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimStatistic {
    document_types: BTreeMap<DocumentType, usize>,
    family_categories: BTreeMap<String, usize>,
    family_names: BTreeMap<String, usize>,
    license_names: BTreeMap<String, usize>,
    approved: usize,
    unapproved: usize,
    generated: usize,
    unknown: usize,
}

impl ClaimStatistic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one document. Each applicable counter moves by exactly one
    /// per distinct key, even when several licenses share a family.
    pub fn record(&mut self, claims: &DocumentClaims) {
        *self.document_types.entry(claims.document_type()).or_default() += 1;
        match claims.document_type() {
            DocumentType::Generated => self.generated += 1,
            DocumentType::Unknown => self.unknown += 1,
            _ => {}
        }

        let mut categories: Vec<&str> = Vec::new();
        let mut families: Vec<&str> = Vec::new();
        let mut names: Vec<&str> = Vec::new();
        for claim in claims.claims() {
            if claim.approved {
                self.approved += 1;
            } else {
                self.unapproved += 1;
            }
            push_unique(&mut categories, claim.family.category());
            push_unique(&mut families, claim.family.name());
            push_unique(&mut names, &claim.name);
        }
        for category in categories {
            increment(&mut self.family_categories, category);
        }
        for family in families {
            increment(&mut self.family_names, family);
        }
        for name in names {
            increment(&mut self.license_names, name);
        }
    }

    pub fn document_type_count(&self, document_type: DocumentType) -> usize {
        self.document_types.get(&document_type).copied().unwrap_or(0)
    }

    /// Counts per document type, in type order
    pub fn document_types(&self) -> &BTreeMap<DocumentType, usize> {
        &self.document_types
    }

    /// Counts per five character family category
    pub fn family_categories(&self) -> &BTreeMap<String, usize> {
        &self.family_categories
    }

    pub fn family_names(&self) -> &BTreeMap<String, usize> {
        &self.family_names
    }

    pub fn license_names(&self) -> &BTreeMap<String, usize> {
        &self.license_names
    }

    pub fn approved(&self) -> usize {
        self.approved
    }

    pub fn unapproved(&self) -> usize {
        self.unapproved
    }

    pub fn generated(&self) -> usize {
        self.generated
    }

    pub fn unknown(&self) -> usize {
        self.unknown
    }

    /// Total documents recorded
    pub fn documents(&self) -> usize {
        self.document_types.values().sum()
    }
}

fn push_unique<'a>(keys: &mut Vec<&'a str>, key: &'a str) {
    if !keys.contains(&key) {
        keys.push(key);
    }
}

fn increment(map: &mut BTreeMap<String, usize>, key: &str) {
    match map.get_mut(key) {
        Some(count) => *count += 1,
        None => {
            map.insert(key.to_string(), 1);
        }
    }
}
