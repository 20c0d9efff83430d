use std::fmt;

/// Per-document evaluation state of a header matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchState {
    /// No verdict yet
    #[default]
    Init,
    /// Terminal positive verdict, sticky until reset
    Matched,
    /// Terminal negative verdict, reached only through finalize
    Unmatched,
}

impl MatchState {
    /// Check if this state is a terminal verdict
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MatchState::Init)
    }

    /// Check if this state is a positive verdict
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchState::Matched)
    }
}

/// Classification of a document in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentType {
    /// A regular text document whose header was analysed
    Standard,
    /// A document produced by a generator, exempt from license checks
    Generated,
    /// An archive (zip, jar, tar, ...)
    Archive,
    /// A binary document
    Binary,
    /// A notice document (NOTICE, LICENSE, README, ...)
    Notice,
    /// A standard document for which no license was detected
    Unknown,
    /// A document excluded by name
    Ignored,
}

impl DocumentType {
    /// All variants, in report order
    pub const ALL: [DocumentType; 7] = [
        DocumentType::Standard,
        DocumentType::Generated,
        DocumentType::Archive,
        DocumentType::Binary,
        DocumentType::Notice,
        DocumentType::Unknown,
        DocumentType::Ignored,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Standard => "STANDARD",
            DocumentType::Generated => "GENERATED",
            DocumentType::Archive => "ARCHIVE",
            DocumentType::Binary => "BINARY",
            DocumentType::Notice => "NOTICE",
            DocumentType::Unknown => "UNKNOWN",
            DocumentType::Ignored => "IGNORED",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
