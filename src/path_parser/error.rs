use std::{error, fmt};

use bstr::BString;

pub type PathResult<T> = Result<T, PathError>;

/// Reasons a single path field could not be turned into a walk.
/// Parsing stops at the first of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The field was empty, whitespace, or the `*` placeholder.
    EmptyPath,
    /// An arrow-style walk contained no segments at all.
    NoNodesInPath,
    /// An orientation marker was followed by an empty name.
    EmptyNodeName,
    /// A suffix-style entry was shorter than a name plus a sign.
    EntryTooShort,
    /// A suffix-style entry did not end in + or -. Includes the
    /// offending entry.
    MissingOrientation(BString),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use PathError as PE;
        match self {
            PE::EmptyPath => write!(f, "path field is empty"),
            PE::NoNodesInPath => write!(f, "no nodes found in path"),
            PE::EmptyNodeName => write!(f, "empty segment name in path"),
            PE::EntryTooShort => write!(f, "path entry too short"),
            PE::MissingOrientation(entry) => write!(
                f,
                "missing orientation (+/-) in path entry: {}",
                entry
            ),
        }
    }
}

impl error::Error for PathError {}
