#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// The direction a walk traverses a segment in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum Orientation {
    Forward,
    Backward,
}

impl Orientation {
    /// Parse an orientation from a sign byte, where + is Forward,
    /// - is Backward
    #[inline]
    pub fn from_sign(b: u8) -> Option<Self> {
        match b {
            b'+' => Some(Orientation::Forward),
            b'-' => Some(Orientation::Backward),
            _ => None,
        }
    }

    /// Parse an orientation from an arrow marker byte, where > is
    /// Forward, < is Backward
    #[inline]
    pub fn from_arrow(b: u8) -> Option<Self> {
        match b {
            b'>' => Some(Orientation::Forward),
            b'<' => Some(Orientation::Backward),
            _ => None,
        }
    }

    #[inline]
    pub fn sign_byte(&self) -> u8 {
        match self {
            Self::Forward => b'+',
            Self::Backward => b'-',
        }
    }

    #[inline]
    pub fn arrow_byte(&self) -> u8 {
        match self {
            Self::Forward => b'>',
            Self::Backward => b'<',
        }
    }

    #[inline]
    pub fn is_reverse(&self) -> bool {
        *self == Orientation::Backward
    }

    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// True if the byte is one of the two sign characters
#[inline]
pub(crate) fn is_sign(b: u8) -> bool {
    b == b'+' || b == b'-'
}

/// Default orientation is forward
impl Default for Orientation {
    #[inline]
    fn default() -> Orientation {
        Orientation::Forward
    }
}

impl std::str::FromStr for Orientation {
    type Err = &'static str;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            [b] => Orientation::from_sign(*b),
            _ => None,
        }
        .ok_or("Could not parse orientation (was not + or -)")
    }
}

/// `{}` writes "+" or "-"; the alternate flag, `{:#}`, writes the
/// arrow form used in GAF walks, ">" or "<".
///
/// # Examples
///
/// ```
/// use gafwalk::walk::Orientation as O;
///
/// assert_eq!(&format!("{}", O::Forward), "+");
/// assert_eq!(&format!("{}", O::Backward), "-");
/// assert_eq!(&format!("{:#}", O::Forward), ">");
/// assert_eq!(&format!("{:#}", O::Backward), "<");
/// ```
impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sym = if f.alternate() {
            self.arrow_byte()
        } else {
            self.sign_byte()
        };
        write!(f, "{}", char::from(sym))
    }
}
