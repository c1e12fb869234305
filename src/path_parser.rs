pub mod error;

pub use self::error::*;

use bstr::ByteSlice;
use lazy_static::lazy_static;
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    combinator::map,
    IResult,
};
use regex::bytes::Regex;

use crate::walk::{OrientedName, Orientation, ParsedWalk};

/// The two textual forms a GAF path field can take. Which one
/// applies is decided purely by content, see `PathGrammar::detect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathGrammar {
    /// Steps are introduced by an orientation marker, `>s1<s2>s3`.
    /// Commas are cosmetic and semicolons are ignored.
    Arrow,
    /// Steps carry a trailing sign and are separated by commas or
    /// semicolons, `s1+,s2-,s3+`.
    Suffix,
}

impl PathGrammar {
    /// Any `>` or `<` in the field selects the arrow grammar, even if
    /// the field also looks like a suffix walk.
    pub fn detect(field: &[u8]) -> Self {
        if field.find_byteset(b"<>").is_some() {
            PathGrammar::Arrow
        } else {
            PathGrammar::Suffix
        }
    }

    pub fn parse(self, field: &[u8]) -> PathResult<ParsedWalk> {
        match self {
            PathGrammar::Arrow => parse_arrow_walk(field),
            PathGrammar::Suffix => parse_suffix_walk(field),
        }
    }
}

/// Parse the raw path field of one GAF record into its ordered,
/// oriented steps.
///
/// # Examples
///
/// ```
/// use gafwalk::path_parser::{parse_path, PathError};
///
/// let walk = parse_path(">5>3<8").unwrap();
/// assert_eq!("5+, 3+, 8-", walk.display_string());
///
/// let walk = parse_path("5+,3-,8+").unwrap();
/// assert_eq!("5+, 3-, 8+", walk.display_string());
///
/// assert_eq!(Err(PathError::EmptyPath), parse_path("*"));
/// ```
pub fn parse_path<T: AsRef<[u8]>>(field: T) -> PathResult<ParsedWalk> {
    let field = field.as_ref().trim();
    if field.is_empty() || field == b"*" {
        return Err(PathError::EmptyPath);
    }
    PathGrammar::detect(field).parse(field)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrowToken<'a> {
    Marker(Orientation),
    Separator,
    Text(&'a [u8]),
}

fn parse_marker(i: &[u8]) -> IResult<&[u8], Orientation> {
    let fwd = map(tag(">"), |_| Orientation::Forward);
    let bwd = map(tag("<"), |_| Orientation::Backward);
    alt((fwd, bwd))(i)
}

fn arrow_token(i: &[u8]) -> IResult<&[u8], ArrowToken<'_>> {
    alt((
        map(parse_marker, ArrowToken::Marker),
        map(tag(";"), |_| ArrowToken::Separator),
        map(is_not("<>;"), ArrowToken::Text),
    ))(i)
}

// A marker's orientation belongs to the name that follows it, so a
// name can only be emitted once the next marker (or the end of the
// field) is reached.
#[derive(Default)]
struct ArrowScanner {
    pending: Option<Orientation>,
    name: Vec<u8>,
    steps: Vec<OrientedName>,
}

impl ArrowScanner {
    fn flush(&mut self) -> PathResult<()> {
        let orient = match self.pending {
            Some(o) => o,
            None => return Ok(()),
        };
        let step = OrientedName::normalized(&self.name, orient)
            .ok_or(PathError::EmptyNodeName)?;
        self.steps.push(step);
        self.name.clear();
        Ok(())
    }
}

fn parse_arrow_walk(field: &[u8]) -> PathResult<ParsedWalk> {
    let cleaned: Vec<u8> = field.iter().copied().filter(|&b| b != b',').collect();

    let mut scanner = ArrowScanner::default();
    let mut input = cleaned.as_slice();
    while let Ok((rest, token)) = arrow_token(input) {
        match token {
            ArrowToken::Marker(orient) => {
                scanner.flush()?;
                scanner.pending = Some(orient);
            }
            ArrowToken::Separator => (),
            ArrowToken::Text(text) => scanner.name.extend_from_slice(text),
        }
        input = rest;
    }
    scanner.flush()?;

    if scanner.steps.is_empty() {
        return Err(PathError::NoNodesInPath);
    }
    Ok(ParsedWalk(scanner.steps))
}

fn parse_suffix_entry(entry: &[u8]) -> PathResult<OrientedName> {
    if entry.chars().count() < 2 {
        return Err(PathError::EntryTooShort);
    }

    let (&last, name) = entry.split_last().ok_or(PathError::EntryTooShort)?;
    let orient = Orientation::from_sign(last)
        .ok_or_else(|| PathError::MissingOrientation(entry.into()))?;

    OrientedName::normalized(name, orient).ok_or(PathError::EmptyNodeName)
}

fn parse_suffix_walk(field: &[u8]) -> PathResult<ParsedWalk> {
    lazy_static! {
        static ref RE_SEP: Regex = Regex::new(r"(?-u)[,;]+").unwrap();
    }

    let steps = RE_SEP
        .split(field)
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(parse_suffix_entry)
        .collect::<PathResult<Vec<_>>>()?;

    if steps.is_empty() {
        return Err(PathError::NoNodesInPath);
    }
    Ok(ParsedWalk(steps))
}
