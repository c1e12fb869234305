pub mod orientation;

pub use self::orientation::*;

use bstr::{BStr, BString, ByteSlice};

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// The separator placed between steps in the canonical display
/// string of a walk, which is also the form handed to path
/// validation.
pub const DISPLAY_SEPARATOR: &str = ", ";

/// A segment name paired with the orientation it is traversed in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct OrientedName {
    pub name: BString,
    pub orient: Orientation,
}

impl OrientedName {
    pub fn new<N: Into<BString>>(name: N, orient: Orientation) -> Self {
        OrientedName {
            name: name.into(),
            orient,
        }
    }

    /// Build an oriented name from raw name bytes, trimming
    /// whitespace and dropping a single redundant trailing sign left
    /// behind by upstream tools. Returns None if nothing remains of
    /// the name.
    pub fn normalized(name: &[u8], orient: Orientation) -> Option<Self> {
        let name = strip_sign(name.trim()).trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, orient))
    }

    /// Parse a `name+` or `name-` entry, the form the canonical
    /// display string uses. The name is taken as written, it is not
    /// normalized again.
    pub fn parse_signed(entry: &[u8]) -> Option<Self> {
        let entry = entry.trim();
        let (&last, name) = entry.split_last()?;
        let orient = Orientation::from_sign(last)?;
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, orient))
    }

    pub fn name(&self) -> &BStr {
        self.name.as_bstr()
    }

    /// True if this names the same segment as `other`, regardless of
    /// orientation
    pub fn same_segment(&self, other: &OrientedName) -> bool {
        self.name == other.name
    }

    pub fn flip(&self) -> Self {
        Self::new(self.name.clone(), self.orient.flip())
    }
}

fn strip_sign(name: &[u8]) -> &[u8] {
    match name.split_last() {
        Some((&last, rest)) if is_sign(last) => rest,
        _ => name,
    }
}

/// `{}` writes `name+`/`name-`; `{:#}` writes the GAF step form,
/// `>name`/`<name`.
impl std::fmt::Display for OrientedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            write!(f, "{:#}{}", self.orient, self.name)
        } else {
            write!(f, "{}{}", self.name, self.orient)
        }
    }
}

/// The ordered steps parsed out of a single path field. A
/// successfully parsed walk is never empty.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct ParsedWalk(pub Vec<OrientedName>);

impl ParsedWalk {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrientedName> {
        self.0.iter()
    }

    pub fn steps(&self) -> &[OrientedName] {
        &self.0
    }

    pub fn into_steps(self) -> Vec<OrientedName> {
        self.0
    }

    /// The steps joined with `DISPLAY_SEPARATOR`, e.g. "5+, 3-, 8+"
    pub fn display_string(&self) -> String {
        self.to_string()
    }
}

/// `{}` writes the canonical display string; `{:#}` writes the GAF
/// walk form, e.g. ">5<3>8".
impl std::fmt::Display for ParsedWalk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if f.alternate() {
                write!(f, "{:#}", step)?;
            } else {
                if i != 0 {
                    write!(f, "{}", DISPLAY_SEPARATOR)?;
                }
                write!(f, "{}", step)?;
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ParsedWalk {
    type Item = &'a OrientedName;
    type IntoIter = std::slice::Iter<'a, OrientedName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Orientation::*;

    #[test]
    fn normalizing_drops_one_redundant_sign() {
        let n = OrientedName::normalized(b" 12+ ", Backward).unwrap();
        assert_eq!(OrientedName::new("12", Backward), n);

        let n = OrientedName::normalized(b"utg7-", Forward).unwrap();
        assert_eq!("utg7+", n.to_string());

        // only the last sign goes
        let n = OrientedName::normalized(b"a--", Forward).unwrap();
        assert_eq!("a-+", n.to_string());

        assert_eq!(None, OrientedName::normalized(b"   ", Forward));
        assert_eq!(None, OrientedName::normalized(b"+", Forward));
        assert_eq!(None, OrientedName::normalized(b" - ", Forward));
    }

    #[test]
    fn whitespace_before_a_dropped_sign_is_trimmed() {
        let n = OrientedName::normalized(b"a +", Forward).unwrap();
        assert_eq!(OrientedName::new("a", Forward), n);

        let n = OrientedName::normalized(b"\tutg 9 -", Backward).unwrap();
        assert_eq!(OrientedName::new("utg 9", Backward), n);
    }

    #[test]
    fn normalizing_is_idempotent() {
        for name in ["5", "utg000012l", "chr1_a"].iter() {
            let once =
                OrientedName::normalized(name.as_bytes(), Forward).unwrap();
            let twice = OrientedName::normalized(&once.name, Forward).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn signed_entries_round_trip() {
        for entry in ["5+", "3-", "edge_12-"].iter() {
            let parsed = OrientedName::parse_signed(entry.as_bytes()).unwrap();
            assert_eq!(*entry, parsed.to_string());
        }

        assert_eq!(None, OrientedName::parse_signed(b"5"));
        assert_eq!(None, OrientedName::parse_signed(b""));
        assert_eq!(None, OrientedName::parse_signed(b"-"));
    }

    #[test]
    fn display_strings_parse_back_to_the_same_steps() {
        let steps = vec![
            OrientedName::normalized(b"a--", Forward).unwrap(),
            OrientedName::normalized(b"b c", Backward).unwrap(),
            OrientedName::new("x+", Backward),
        ];
        for step in steps.iter() {
            let text = step.to_string();
            assert_eq!(
                Some(step),
                OrientedName::parse_signed(text.as_bytes()).as_ref()
            );
        }
    }

    #[test]
    fn walk_display_forms() {
        let walk = ParsedWalk(vec![
            OrientedName::new("5", Forward),
            OrientedName::new("3", Backward),
            OrientedName::new("8", Forward),
        ]);

        assert_eq!("5+, 3-, 8+", walk.display_string());
        assert_eq!(">5<3>8", format!("{:#}", walk));
        assert_eq!(3, walk.len());
        assert!(!walk.is_empty());
    }
}
