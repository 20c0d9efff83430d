use std::io::BufRead;
use std::sync::Arc;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::header::HeaderState;
use crate::license::{License, LicenseFamily, LicenseFilter, LicenseSet};
use crate::types::{DocumentType, MatchState};

/// One license found in a document header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseClaim {
    pub id: String,
    pub name: String,
    pub family: Arc<LicenseFamily>,
    pub approved: bool,
}

/// Result of analysing one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentClaims {
    name: String,
    document_type: DocumentType,
    claims: Vec<LicenseClaim>,
}

impl DocumentClaims {
    /// Claims for a document classified without header analysis (archive, binary, ignored ...).
    pub fn classified(name: impl Into<String>, document_type: DocumentType) -> Self {
        Self {
            name: name.into(),
            document_type,
            claims: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn claims(&self) -> &[LicenseClaim] {
        &self.claims
    }

    /// Ids of matched licenses that are approved
    pub fn approved(&self) -> Vec<&str> {
        self.claims
            .iter()
            .filter(|c| c.approved)
            .map(|c| c.id.as_str())
            .collect()
    }

    /// Ids of matched licenses that are not approved
    pub fn unapproved(&self) -> Vec<&str> {
        self.claims
            .iter()
            .filter(|c| !c.approved)
            .map(|c| c.id.as_str())
            .collect()
    }

    pub fn is_unknown(&self) -> bool {
        self.document_type == DocumentType::Unknown
    }
}

/// Read at most `max` lines from `reader`.
///
/// Invalid UTF-8 is replaced rather than rejected, and line terminators are removed.
pub fn read_header_lines<R: BufRead>(mut reader: R, max: usize) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    while lines.len() < max {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        lines.push(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(lines)
}

/// Resolves document headers to licenses.
///
/// Holds one evaluation context per configured license and reuses them for
/// every document, so an analyser must not be shared between threads. Create
/// one per worker; the [`LicenseSet`] itself can be shared.
#[derive(Debug)]
pub struct HeaderAnalyser<'a> {
    licenses: &'a LicenseSet,
    states: Vec<(&'a License, HeaderState<'a>)>,
    generated: Option<HeaderState<'a>>,
    max_header_lines: usize,
}

impl<'a> HeaderAnalyser<'a> {
    pub fn new(licenses: &'a LicenseSet, config: &AnalysisConfig) -> Self {
        let states = licenses
            .licenses(LicenseFilter::All)
            .into_iter()
            .map(|license| (license, license.tree().state()))
            .collect();
        Self {
            licenses,
            states,
            generated: licenses.generated().map(|tree| tree.state()),
            max_header_lines: config.max_header_lines,
        }
    }

    pub fn max_header_lines(&self) -> usize {
        self.max_header_lines
    }

    /// Analyse the header lines of one document.
    ///
    /// Only the first `max_header_lines` lines are considered.
    pub fn analyse<I, S>(&mut self, name: &str, lines: I) -> DocumentClaims
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.reset();

        for line in lines.into_iter().take(self.max_header_lines) {
            let line = line.as_ref();
            if let Some(generated) = &mut self.generated {
                if generated.match_line(Some(line)).is_matched() {
                    debug!(document = name, "generated document");
                    return DocumentClaims::classified(name, DocumentType::Generated);
                }
            }
            let mut pending = false;
            for (_, state) in &mut self.states {
                if state.match_line(Some(line)) == MatchState::Init {
                    pending = true;
                }
            }
            if !pending && self.generated.is_none() {
                break;
            }
        }

        let mut claims = Vec::new();
        for (license, state) in &mut self.states {
            if state.finalize().is_matched() {
                let approved = self.licenses.is_approved(license);
                debug!(
                    document = name,
                    license = license.id(),
                    approved,
                    "license claimed"
                );
                claims.push(LicenseClaim {
                    id: license.id().to_string(),
                    name: license.name().to_string(),
                    family: license.family().clone(),
                    approved,
                });
            }
        }

        let document_type = if claims.is_empty() {
            debug!(document = name, "no license detected");
            DocumentType::Unknown
        } else {
            DocumentType::Standard
        };

        DocumentClaims {
            name: name.to_string(),
            document_type,
            claims,
        }
    }

    /// Read the header from `reader` and analyse it.
    pub fn analyse_reader<R: BufRead>(&mut self, name: &str, reader: R) -> Result<DocumentClaims> {
        let lines = read_header_lines(reader, self.max_header_lines)?;
        Ok(self.analyse(name, &lines))
    }

    fn reset(&mut self) {
        for (_, state) in &mut self.states {
            state.reset();
        }
        if let Some(generated) = &mut self.generated {
            generated.reset();
        }
    }
}
