pub mod paging;

pub use self::paging::*;

use bstr::{BString, ByteSlice};
use lazy_static::lazy_static;
use log::debug;
use regex::bytes::Regex;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::gaf::{Alignment, IngestionResult};
use crate::graph::GraphWalk;
use crate::walk::{OrientedName, Orientation};

/// One term of a segment filter. A term ending in + or - must match
/// a step's name and orientation exactly; any other term matches the
/// segment in either orientation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum SegmentToken {
    Oriented(OrientedName),
    Unoriented(BString),
}

impl SegmentToken {
    pub fn parse(token: &[u8]) -> Option<Self> {
        let token = token.trim();
        let (&last, name) = token.split_last()?;
        let parsed = match Orientation::from_sign(last) {
            Some(orient) => {
                SegmentToken::Oriented(OrientedName::new(name, orient))
            }
            None => SegmentToken::Unoriented(token.into()),
        };
        Some(parsed)
    }

    pub fn is_oriented(&self) -> bool {
        matches!(self, SegmentToken::Oriented(_))
    }

    pub fn matches(&self, step: &OrientedName) -> bool {
        match self {
            SegmentToken::Oriented(name) => name == step,
            SegmentToken::Unoriented(name) => *name == step.name,
        }
    }

    /// True if any step of the walk matches
    pub fn matches_any(&self, steps: &[OrientedName]) -> bool {
        steps.iter().any(|step| self.matches(step))
    }
}

impl std::fmt::Display for SegmentToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentToken::Oriented(name) => write!(f, "{}", name),
            SegmentToken::Unoriented(name) => write!(f, "{}", name),
        }
    }
}

/// Split filter text into tokens on any run of commas and
/// whitespace.
///
/// ```
/// use gafwalk::query::{parse_segment_tokens, SegmentToken};
///
/// let tokens = parse_segment_tokens("5+, 3  utg8-");
/// assert_eq!(3, tokens.len());
/// assert!(tokens[0].is_oriented());
/// assert!(!tokens[1].is_oriented());
/// ```
pub fn parse_segment_tokens<T: AsRef<[u8]>>(text: T) -> Vec<SegmentToken> {
    lazy_static! {
        static ref RE_SEP: Regex = Regex::new(r"(?-u)[,\s]+").unwrap();
    }

    RE_SEP
        .split(text.as_ref())
        .filter_map(SegmentToken::parse)
        .collect()
}

/// How the per-token results of a segment filter combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum MatchMode {
    /// At least one token matches somewhere in the walk.
    Any,
    /// Every token matches somewhere in the walk. One step may
    /// satisfy several tokens.
    All,
}

impl Default for MatchMode {
    fn default() -> Self {
        MatchMode::Any
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct FilterCriteria {
    /// Inclusive lower bound on mapping quality. Zero or less
    /// disables the check.
    pub min_mapq: i64,
    pub tokens: Vec<SegmentToken>,
    pub mode: MatchMode,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_min_mapq(mut self, min_mapq: i64) -> Self {
        self.min_mapq = min_mapq;
        self
    }

    pub fn with_tokens(mut self, tokens: Vec<SegmentToken>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Parse the tokens from filter text, see `parse_segment_tokens`
    pub fn with_segments<T: AsRef<[u8]>>(self, text: T) -> Self {
        self.with_tokens(parse_segment_tokens(text))
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// False for the reset state, which lets everything through.
    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }

    /// An unknown quality never passes a positive threshold.
    pub fn passes_quality(&self, mapq: Option<u32>) -> bool {
        self.min_mapq <= 0
            || mapq.map_or(false, |q| i64::from(q) >= self.min_mapq)
    }

    pub fn matches_walk(&self, steps: &[OrientedName]) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        let mut tokens = self.tokens.iter();
        match self.mode {
            MatchMode::Any => tokens.any(|t| t.matches_any(steps)),
            MatchMode::All => tokens.all(|t| t.matches_any(steps)),
        }
    }

    pub fn matches<W: GraphWalk>(&self, alignment: &Alignment<W>) -> bool {
        self.passes_quality(alignment.mapping_quality)
            && self.matches_walk(alignment.walk.segments())
    }
}

/// The indices of the alignments that pass the criteria, in their
/// original order.
pub fn filter_alignments<W: GraphWalk>(
    alignments: &[Alignment<W>],
    criteria: &FilterCriteria,
) -> Vec<usize> {
    alignments
        .iter()
        .enumerate()
        .filter(|(_, a)| criteria.matches(a))
        .map(|(ix, _)| ix)
        .collect()
}

/// Filtering and paging state over one set of ingested alignments.
/// All mutation goes through `&mut self`; share it between threads
/// behind a lock.
pub struct QuerySession<'a, W> {
    alignments: &'a [Alignment<W>],
    criteria: FilterCriteria,
    view: PagedView,
}

impl<'a, W: GraphWalk> QuerySession<'a, W> {
    /// Starts unfiltered, with every alignment matching.
    pub fn new(alignments: &'a [Alignment<W>], config: &ViewConfig) -> Self {
        let all = (0..alignments.len()).collect();
        let view = PagedView::with_config(all, config);
        QuerySession {
            alignments,
            criteria: FilterCriteria::default(),
            view,
        }
    }

    pub fn from_result(
        result: &'a IngestionResult<W>,
        config: &ViewConfig,
    ) -> Self {
        Self::new(result.alignments(), config)
    }

    pub fn apply(&mut self, criteria: FilterCriteria) {
        let matches = filter_alignments(self.alignments, &criteria);
        debug!(
            "Filter matched {} of {} alignments",
            matches.len(),
            self.alignments.len()
        );
        self.criteria = criteria;
        self.view.set_matches(matches);
    }

    pub fn reset(&mut self) {
        self.apply(FilterCriteria::default());
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn view(&self) -> &PagedView {
        &self.view
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.view.set_page_size(size);
    }

    pub fn set_current_page(&mut self, page: usize) {
        self.view.set_current_page(page);
    }

    pub fn next_page(&mut self) {
        self.view.next_page();
    }

    pub fn previous_page(&mut self) {
        self.view.previous_page();
    }

    /// The alignments on the current page, with their indices
    pub fn current_rows(
        &self,
    ) -> impl Iterator<Item = (usize, &'a Alignment<W>)> + '_ {
        let alignments = self.alignments;
        self.view
            .rows_for_current_page()
            .iter()
            .filter_map(move |&ix| alignments.get(ix).map(|a| (ix, a)))
    }

    /// The verified walks of every alignment that currently matches.
    pub fn matching_walks(&self) -> impl Iterator<Item = &'a W> + '_ {
        let alignments = self.alignments;
        self.view
            .matches()
            .iter()
            .filter_map(move |&ix| alignments.get(ix))
            .map(|a| &a.walk)
    }
}

/// The names of the segments in `walks` that `is_drawn` reports as
/// having no visual element, once each, in the order first seen.
pub fn undrawn_segments<'w, W, I, F>(
    walks: I,
    mut is_drawn: F,
) -> Vec<BString>
where
    W: GraphWalk + 'w,
    I: IntoIterator<Item = &'w W>,
    F: FnMut(&OrientedName) -> bool,
{
    let mut seen = fnv::FnvHashSet::default();
    let mut missing = Vec::new();
    for step in walks.into_iter().flat_map(|w| w.segments()) {
        if !is_drawn(step) && seen.insert(step.name.clone()) {
            missing.push(step.name.clone());
        }
    }
    missing
}
