//! Settings for parsing and validating documents.

use folio_syntax::{DecodeLimits, ReadSettings};

/// Which version wins if the header and the catalog's `/Version` disagree.
///
/// The default is [`VersionPolicy::HeaderWins`]. It decides what
/// [`Document::get_version`](crate::Document::get_version) returns and thereby the
/// `"version"` statistic and version checks of the validator. The individual values
/// stay available through `header_version` and `catalog_version` either way.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum VersionPolicy {
    /// The header version is used, unless the header has none. This is the default.
    #[default]
    HeaderWins,
    /// The catalog's `/Version` is used, unless the catalog has none.
    CatalogWins,
}

/// Settings for parsing a document.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParseSettings {
    /// The maximum nesting depth of arrays and dictionaries.
    pub max_nesting_depth: usize,
    /// The maximum depth of the page tree. Deeper branches are cut off and reported.
    pub max_page_tree_depth: usize,
    /// The maximum number of references followed when a reference points to another
    /// reference.
    pub max_reference_chain: usize,
    /// Limits for decoding stream data.
    pub decode_limits: DecodeLimits,
    /// How the document version is determined.
    pub version_policy: VersionPolicy,
    /// Whether broken cross-reference data is reconstructed by scanning the file.
    ///
    /// If disabled, such files fail to parse.
    pub repair: bool,
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self {
            max_nesting_depth: 256,
            max_page_tree_depth: 256,
            max_reference_chain: 32,
            decode_limits: DecodeLimits::default(),
            version_policy: VersionPolicy::default(),
            repair: true,
        }
    }
}

impl ParseSettings {
    pub(crate) fn read_settings(&self) -> ReadSettings {
        ReadSettings {
            max_depth: self.max_nesting_depth,
            decode_limits: self.decode_limits,
            repair: self.repair,
        }
    }
}

/// Settings for running a validation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ValidationSettings {
    /// Run the rules of a schema concurrently. This requires the `parallel` feature and
    /// has no effect otherwise. The resulting report is the same either way.
    pub parallel: bool,
}
