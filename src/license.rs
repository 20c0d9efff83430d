use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ConfigErrorKind, RatError, Result};
use crate::header::MatcherTree;
use crate::matcher::Matcher;

/// Width of a family category code
pub const CATEGORY_WIDTH: usize = 5;

/// Normalize a category to exactly five characters, padding with spaces or truncating.
pub fn make_category(category: &str) -> String {
    let mut result: String = category.chars().take(CATEGORY_WIDTH).collect();
    let len = result.chars().count();
    result.extend(std::iter::repeat(' ').take(CATEGORY_WIDTH - len));
    result
}

/// A license family: category code plus display name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LicenseFamily {
    category: String,
    name: String,
}

impl LicenseFamily {
    pub fn new(category: &str, name: &str) -> Result<Self> {
        if category.trim().is_empty() {
            return Err(RatError::config(
                ConfigErrorKind::BlankText,
                "license family category must not be blank",
            ));
        }
        if name.trim().is_empty() {
            return Err(RatError::config(
                ConfigErrorKind::BlankText,
                format!("license family '{}' requires a name", category.trim()),
            ));
        }
        Ok(Self {
            category: make_category(category),
            name: name.trim().to_string(),
        })
    }

    /// The five character category code
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for LicenseFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.category.trim_end(), self.name)
    }
}

/// Families interned by category code
#[derive(Debug, Clone, Default)]
pub struct FamilyRegistry {
    families: BTreeMap<String, Arc<LicenseFamily>>,
}

impl FamilyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a family. A category that is already known returns the existing family.
    pub fn register(&mut self, category: &str, name: &str) -> Result<Arc<LicenseFamily>> {
        let family = LicenseFamily::new(category, name)?;
        if let Some(existing) = self.families.get(family.category()) {
            if existing.name() != family.name() {
                debug!(
                    category = family.category(),
                    kept = existing.name(),
                    ignored = family.name(),
                    "license family already registered"
                );
            }
            return Ok(existing.clone());
        }
        let family = Arc::new(family);
        self.families
            .insert(family.category().to_string(), family.clone());
        Ok(family)
    }

    /// Look up a family; the category is normalized first.
    pub fn get(&self, category: &str) -> Option<Arc<LicenseFamily>> {
        self.families.get(&make_category(category)).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<LicenseFamily>> {
        self.families.values()
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

/// A license: a header matcher tree attributed to one family
#[derive(Debug, Clone)]
pub struct License {
    id: String,
    name: String,
    family: Arc<LicenseFamily>,
    tree: MatcherTree,
    approved: bool,
    notes: Option<String>,
}

impl License {
    /// Create a license. Blank ids are rejected; a blank name falls back to the family name.
    pub fn new(id: &str, name: &str, family: Arc<LicenseFamily>, matcher: Matcher) -> Result<Self> {
        let id = id.trim();
        if id.is_empty() {
            return Err(RatError::config(
                ConfigErrorKind::BlankText,
                "license id must not be blank",
            ));
        }
        let name = if name.trim().is_empty() {
            family.name().to_string()
        } else {
            name.trim().to_string()
        };
        Ok(Self {
            id: id.to_string(),
            name,
            family,
            tree: MatcherTree::new(matcher),
            approved: true,
            notes: None,
        })
    }

    pub fn with_approved(mut self, approved: bool) -> Self {
        self.approved = approved;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> &Arc<LicenseFamily> {
        &self.family
    }

    pub fn tree(&self) -> &MatcherTree {
        &self.tree
    }

    /// The approval flag of the definition itself
    pub fn is_default_approved(&self) -> bool {
        self.approved
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Which licenses or families a query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LicenseFilter {
    /// All defined licenses
    #[default]
    All,
    /// Only approved licenses
    Approved,
    /// No licenses
    None,
}

impl FromStr for LicenseFilter {
    type Err = RatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(LicenseFilter::All),
            "approved" => Ok(LicenseFilter::Approved),
            "none" => Ok(LicenseFilter::None),
            other => Err(RatError::config(
                ConfigErrorKind::InvalidSetting,
                format!("unknown license filter '{}'", other),
            )),
        }
    }
}

/// Approval overrides applied on top of each license's own flag.
///
/// Removed ids always lose, approved ids always win otherwise. Then removed
/// categories, then approved categories, then the license flag decide.
#[derive(Debug, Clone, Default)]
pub struct ApprovalPolicy {
    approved_categories: BTreeSet<String>,
    removed_categories: BTreeSet<String>,
    approved_ids: BTreeSet<String>,
    removed_ids: BTreeSet<String>,
}

impl ApprovalPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn approve_category(&mut self, category: &str) {
        self.approved_categories.insert(make_category(category));
    }

    pub fn remove_category(&mut self, category: &str) {
        self.removed_categories.insert(make_category(category));
    }

    pub fn approve_id(&mut self, id: &str) {
        self.approved_ids.insert(id.trim().to_string());
    }

    pub fn remove_id(&mut self, id: &str) {
        self.removed_ids.insert(id.trim().to_string());
    }

    pub fn is_approved(&self, license: &License) -> bool {
        if self.removed_ids.contains(license.id()) {
            return false;
        }
        if self.approved_ids.contains(license.id()) {
            return true;
        }
        let category = license.family().category();
        if self.removed_categories.contains(category) {
            return false;
        }
        self.approved_categories.contains(category) || license.is_default_approved()
    }
}

/// The configured licenses of a run, plus the optional generated-document matcher
#[derive(Debug, Clone, Default)]
pub struct LicenseSet {
    families: FamilyRegistry,
    licenses: Vec<License>,
    policy: ApprovalPolicy,
    generated: Option<MatcherTree>,
}

impl LicenseSet {
    pub fn new(families: FamilyRegistry) -> Self {
        Self {
            families,
            ..Default::default()
        }
    }

    /// Add a license; ids must be unique and the family must be registered.
    pub fn add(&mut self, license: License) -> Result<()> {
        if self.license(license.id()).is_some() {
            return Err(RatError::config(
                ConfigErrorKind::DuplicateLicense,
                format!("license '{}' is defined more than once", license.id()),
            ));
        }
        if self.families.get(license.family().category()).is_none() {
            return Err(RatError::config(
                ConfigErrorKind::UnknownFamily,
                format!(
                    "license '{}' refers to unregistered family '{}'",
                    license.id(),
                    license.family().category().trim_end()
                ),
            ));
        }
        self.licenses.push(license);
        Ok(())
    }

    pub fn set_policy(&mut self, policy: ApprovalPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> &ApprovalPolicy {
        &self.policy
    }

    pub fn set_generated(&mut self, matcher: Matcher) {
        self.generated = Some(MatcherTree::new(matcher));
    }

    pub fn generated(&self) -> Option<&MatcherTree> {
        self.generated.as_ref()
    }

    pub fn families(&self) -> &FamilyRegistry {
        &self.families
    }

    pub fn license(&self, id: &str) -> Option<&License> {
        self.licenses.iter().find(|l| l.id() == id)
    }

    pub fn is_approved(&self, license: &License) -> bool {
        self.policy.is_approved(license)
    }

    /// Licenses passing `filter`, in definition order
    pub fn licenses(&self, filter: LicenseFilter) -> Vec<&License> {
        match filter {
            LicenseFilter::All => self.licenses.iter().collect(),
            LicenseFilter::Approved => self
                .licenses
                .iter()
                .filter(|l| self.is_approved(l))
                .collect(),
            LicenseFilter::None => Vec::new(),
        }
    }

    /// Families of the licenses passing `filter`, ordered by category
    pub fn license_families(&self, filter: LicenseFilter) -> Vec<Arc<LicenseFamily>> {
        let families: BTreeMap<&str, &Arc<LicenseFamily>> = self
            .licenses(filter)
            .into_iter()
            .map(|l| (l.family().category(), l.family()))
            .collect();
        families.into_values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.licenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.licenses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn license_set() -> LicenseSet {
        let mut families = FamilyRegistry::new();
        let al = families.register("AL", "Apache License").unwrap();
        let gpl = families.register("GPL", "GNU General Public License").unwrap();
        let mut set = LicenseSet::new(families);
        set.add(License::new("AL2.0", "", al, Matcher::text("Apache").unwrap()).unwrap())
            .unwrap();
        set.add(
            License::new("GPL3", "GPL 3.0", gpl, Matcher::text("GPL").unwrap())
                .unwrap()
                .with_approved(false),
        )
        .unwrap();
        set
    }

    #[test]
    fn test_make_category() {
        assert_eq!(make_category("AL"), "AL   ");
        assert_eq!(make_category("ABCDEFG"), "ABCDE");
        assert_eq!(make_category(""), "     ");
        assert_eq!(make_category("GPL  "), "GPL  ");
    }

    #[test]
    fn test_family_interning() {
        let mut registry = FamilyRegistry::new();
        let a = registry.register("AL", "Apache License").unwrap();
        let b = registry.register("AL   ", "Another name").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.name(), "Apache License");
        assert_eq!(registry.len(), 1);
        assert!(registry.get("AL").is_some());
    }

    #[test]
    fn test_family_requires_category_and_name() {
        let mut registry = FamilyRegistry::new();
        assert!(registry.register(" ", "Name").is_err());
        assert!(registry.register("MIT", "").is_err());
    }

    #[test]
    fn test_license_name_defaults_to_family() {
        let set = license_set();
        assert_eq!(set.license("AL2.0").unwrap().name(), "Apache License");
        assert_eq!(set.license("GPL3").unwrap().name(), "GPL 3.0");
    }

    #[test]
    fn test_duplicate_license_rejected() {
        let mut set = license_set();
        let family = set.families().get("AL").unwrap();
        let dup = License::new("AL2.0", "", family, Matcher::text("x").unwrap()).unwrap();
        let err = set.add(dup).unwrap_err();
        assert_eq!(err.config_kind(), Some(ConfigErrorKind::DuplicateLicense));
    }

    #[test]
    fn test_unregistered_family_rejected() {
        let mut set = license_set();
        let stray = Arc::new(LicenseFamily::new("BSD", "BSD").unwrap());
        let license = License::new("BSD3", "", stray, Matcher::text("BSD").unwrap()).unwrap();
        let err = set.add(license).unwrap_err();
        assert_eq!(err.config_kind(), Some(ConfigErrorKind::UnknownFamily));
    }

    #[test]
    fn test_license_filter() {
        let set = license_set();
        assert_eq!(set.licenses(LicenseFilter::All).len(), 2);
        let approved: Vec<&str> = set
            .licenses(LicenseFilter::Approved)
            .iter()
            .map(|l| l.id())
            .collect();
        assert_eq!(approved, vec!["AL2.0"]);
        assert!(set.licenses(LicenseFilter::None).is_empty());
        assert_eq!(set.license_families(LicenseFilter::All).len(), 2);
    }

    #[test]
    fn test_approval_policy_overrides() {
        let mut set = license_set();
        let mut policy = ApprovalPolicy::new();
        policy.approve_category("GPL");
        policy.remove_id("AL2.0");
        set.set_policy(policy);
        let approved: Vec<&str> = set
            .licenses(LicenseFilter::Approved)
            .iter()
            .map(|l| l.id())
            .collect();
        assert_eq!(approved, vec!["GPL3"]);

        let mut policy = ApprovalPolicy::new();
        policy.remove_category("AL");
        policy.approve_id("AL2.0");
        set.set_policy(policy);
        assert!(set.is_approved(set.license("AL2.0").unwrap()));
    }

    #[test]
    fn test_license_filter_from_str() {
        assert_eq!("APPROVED".parse::<LicenseFilter>().unwrap(), LicenseFilter::Approved);
        assert_eq!("all".parse::<LicenseFilter>().unwrap(), LicenseFilter::All);
        assert!("some".parse::<LicenseFilter>().is_err());
    }
}
