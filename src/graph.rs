//! The path validation seam. Ingestion hands the canonical display
//! string of every parsed walk to a `PathValidator`, which either
//! returns a verified walk or a human-readable reason it isn't one.

use bstr::ByteSlice;
use fnv::{FnvHashMap, FnvHashSet};
use lazy_static::lazy_static;
use regex::bytes::Regex;

use crate::walk::{OrientedName, Orientation, ParsedWalk};

/// A walk that has been checked against a graph.
pub trait GraphWalk {
    /// The segments the walk visits, in traversal order.
    fn segments(&self) -> &[OrientedName];

    fn is_empty(&self) -> bool {
        self.segments().is_empty()
    }

    fn len(&self) -> usize {
        self.segments().len()
    }
}

/// Turns a canonical walk string, e.g. "5+, 3-, 8+", into a verified
/// walk.
pub trait PathValidator {
    type Walk: GraphWalk;

    fn make_walk(&self, path: &str) -> Result<Self::Walk, String>;
}

impl<V: PathValidator> PathValidator for &V {
    type Walk = V::Walk;

    fn make_walk(&self, path: &str) -> Result<Self::Walk, String> {
        V::make_walk(*self, path)
    }
}

impl GraphWalk for ParsedWalk {
    fn segments(&self) -> &[OrientedName] {
        self.steps()
    }
}

/// Split a canonical walk string on commas and parse each trimmed
/// `name+`/`name-` entry. Whitespace inside an entry belongs to the
/// segment name.
pub fn parse_canonical(path: &str) -> Result<Vec<OrientedName>, String> {
    lazy_static! {
        static ref RE_SEP: Regex = Regex::new(r"(?-u),+").unwrap();
    }

    RE_SEP
        .split(path.as_bytes())
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            OrientedName::parse_signed(entry).ok_or_else(|| {
                format!("invalid path entry {}", entry.as_bstr())
            })
        })
        .collect()
}

/// Accepts any syntactically valid walk without consulting a graph.
#[derive(Debug, Default, Clone, Copy)]
pub struct UncheckedValidator;

impl PathValidator for UncheckedValidator {
    type Walk = ParsedWalk;

    fn make_walk(&self, path: &str) -> Result<ParsedWalk, String> {
        parse_canonical(path).map(ParsedWalk)
    }
}

/// A walk whose every step is a known segment and whose every
/// consecutive pair of steps is joined by a link.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SegmentWalk {
    steps: Vec<OrientedName>,
    ids: Vec<usize>,
}

impl SegmentWalk {
    /// The graph's internal ids of the visited segments, in
    /// traversal order
    pub fn segment_ids(&self) -> &[usize] {
        &self.ids
    }
}

impl GraphWalk for SegmentWalk {
    fn segments(&self) -> &[OrientedName] {
        &self.steps
    }
}

type Handle = (usize, Orientation);

/// Minimal in-memory topology: segment names and the oriented links
/// between them. A link implies its reverse complement, so adding
/// `a+ -> b-` also allows the walk `b+ -> a-`.
#[derive(Debug, Default, Clone)]
pub struct SegmentGraph {
    name_map: FnvHashMap<Vec<u8>, usize>,
    inverse_map: Vec<Vec<u8>>,
    links: FnvHashSet<(Handle, Handle)>,
}

impl SegmentGraph {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a segment by name, returning its id. Adding an existing
    /// name returns the id it already has.
    pub fn add_segment<N: AsRef<[u8]>>(&mut self, name: N) -> usize {
        let name = name.as_ref();
        if let Some(id) = self.name_map.get(name) {
            return *id;
        }
        let id = self.inverse_map.len();
        self.name_map.insert(name.into(), id);
        self.inverse_map.push(name.into());
        id
    }

    /// Add a link between two segments, adding the segments as well
    /// if they aren't in the graph yet.
    pub fn add_link<N: AsRef<[u8]>>(
        &mut self,
        from: N,
        from_orient: Orientation,
        to: N,
        to_orient: Orientation,
    ) {
        let from = (self.add_segment(from), from_orient);
        let to = (self.add_segment(to), to_orient);
        self.links.insert((from, to));
        self.links.insert(((to.0, to.1.flip()), (from.0, from.1.flip())));
    }

    pub fn segment_id<N: AsRef<[u8]>>(&self, name: N) -> Option<usize> {
        self.name_map.get(name.as_ref()).copied()
    }

    pub fn segment_name(&self, id: usize) -> Option<&[u8]> {
        self.inverse_map.get(id).map(|n| n.as_slice())
    }

    pub fn segment_count(&self) -> usize {
        self.inverse_map.len()
    }

    pub fn has_link(&self, from: Handle, to: Handle) -> bool {
        self.links.contains(&(from, to))
    }
}

impl PathValidator for SegmentGraph {
    type Walk = SegmentWalk;

    fn make_walk(&self, path: &str) -> Result<SegmentWalk, String> {
        let steps = parse_canonical(path)?;

        let ids = steps
            .iter()
            .map(|step| {
                self.segment_id(&step.name).ok_or_else(|| {
                    format!("segment {} is not in the graph", step.name)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let handles = ids
            .iter()
            .zip(steps.iter())
            .map(|(&id, step)| (id, step.orient));
        let pairs = handles.clone().zip(handles.skip(1));
        for (step_ix, (from, to)) in pairs.enumerate() {
            if !self.has_link(from, to) {
                return Err(format!(
                    "no link from {} to {}",
                    steps[step_ix],
                    steps[step_ix + 1]
                ));
            }
        }

        Ok(SegmentWalk { steps, ids })
    }
}
