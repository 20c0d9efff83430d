use tracing::debug;

use crate::config::{AnalysisConfig, LicenseConfig, LicenseDefinition, MatcherSpec};
use crate::error::{ConfigErrorKind, RatError, Result};
use crate::license::{ApprovalPolicy, FamilyRegistry, License, LicenseSet};
use crate::matcher::{Matcher, SpdxRegistry};

/// Compile a configuration document into a [`LicenseSet`].
///
/// SPDX matchers are interned in `spdx`, so compiling several documents with
/// the same registry shares matchers between them.
pub fn compile_config(config: &LicenseConfig, spdx: &SpdxRegistry) -> Result<LicenseSet> {
    config.analysis.validate()?;

    let mut families = FamilyRegistry::new();
    for family in &config.families {
        families.register(&family.category, &family.name)?;
    }

    let mut licenses = Vec::with_capacity(config.licenses.len());
    for definition in &config.licenses {
        licenses.push(compile_license(definition, &mut families, spdx)?);
    }

    let mut set = LicenseSet::new(families);
    for license in licenses {
        set.add(license)?;
    }
    if let Some(generated) = &config.generated {
        set.set_generated(compile_matcher(generated, spdx)?);
    }
    set.set_policy(approval_policy(&config.analysis));

    debug!(
        licenses = set.len(),
        families = set.families().len(),
        spdx_ids = spdx.len(),
        "compiled license configuration"
    );
    Ok(set)
}

/// Compile one license definition, registering an inline family if declared.
pub fn compile_license(
    definition: &LicenseDefinition,
    families: &mut FamilyRegistry,
    spdx: &SpdxRegistry,
) -> Result<License> {
    let family = match (&definition.family_name, families.get(&definition.family)) {
        (_, Some(family)) => family,
        (Some(name), None) => families.register(&definition.family, name)?,
        (None, None) => {
            return Err(RatError::config(
                ConfigErrorKind::UnknownFamily,
                format!(
                    "license '{}' refers to undeclared family '{}'",
                    definition.id, definition.family
                ),
            ))
        }
    };

    let matcher = compile_matcher(&definition.matcher, spdx)?;
    let mut license = License::new(&definition.id, &definition.name, family, matcher)?
        .with_approved(definition.approved);
    if let Some(notes) = &definition.notes {
        license = license.with_notes(notes.clone());
    }
    Ok(license)
}

/// Compile a matcher definition tree.
pub fn compile_matcher(spec: &MatcherSpec, spdx: &SpdxRegistry) -> Result<Matcher> {
    let matcher = match spec {
        MatcherSpec::Text { text, .. } => Matcher::text(text)?,
        MatcherSpec::Regex { expr, .. } => Matcher::regex(expr)?,
        MatcherSpec::Copyright {
            start, end, owner, ..
        } => Matcher::copyright(start.as_deref(), end.as_deref(), owner.as_deref())?,
        MatcherSpec::FullText { text, .. } => Matcher::full_text(text)?,
        MatcherSpec::Spdx { name, .. } => Matcher::spdx(spdx, name)?,
        MatcherSpec::All { children, .. } => {
            Matcher::all(compile_children("all", children, spdx)?)
        }
        MatcherSpec::Any { children, .. } => {
            Matcher::any(compile_children("any", children, spdx)?)
        }
        MatcherSpec::Not { child, .. } => Matcher::not(compile_matcher(child, spdx)?),
    };

    Ok(match spec.id() {
        Some(id) => matcher.with_id(id),
        None => matcher,
    })
}

fn compile_children(
    kind: &str,
    children: &[MatcherSpec],
    spdx: &SpdxRegistry,
) -> Result<Vec<Matcher>> {
    if children.is_empty() {
        return Err(RatError::config(
            ConfigErrorKind::InvalidSetting,
            format!("'{}' matcher requires at least one child", kind),
        ));
    }
    children
        .iter()
        .map(|child| compile_matcher(child, spdx))
        .collect()
}

/// Build the approval overrides from analysis settings.
pub fn approval_policy(analysis: &AnalysisConfig) -> ApprovalPolicy {
    let mut policy = ApprovalPolicy::new();
    for category in &analysis.approved_categories {
        policy.approve_category(category);
    }
    for category in &analysis.removed_categories {
        policy.remove_category(category);
    }
    for id in &analysis.approved_license_ids {
        policy.approve_id(id);
    }
    for id in &analysis.removed_license_ids {
        policy.remove_id(id);
    }
    policy
}
