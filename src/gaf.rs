pub mod diagnostic;

pub use self::diagnostic::*;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bstr::{io::BufReadExt, BString, ByteSlice};
use log::{debug, info, warn};

use crate::graph::{GraphWalk, PathValidator};
use crate::path_parser::parse_path;
use crate::walk::Orientation;

/// Records with fewer fields than this are skipped.
pub const MIN_FIELDS: usize = 6;
/// 0-based index of the path field.
pub const PATH_FIELD: usize = 5;
/// 0-based index of the mapping quality field.
pub const MAPQ_FIELD: usize = 11;

/// One GAF record that parsed and validated. The numeric fields are
/// None when the record doesn't provide them or they aren't numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment<W> {
    pub query_name: BString,
    pub query_len: Option<usize>,
    pub query_start: Option<usize>,
    pub query_end: Option<usize>,
    pub strand: BString,
    pub mapping_quality: Option<u32>,
    /// 1-based, counting blank and comment lines
    pub line_number: usize,
    pub raw_path: BString,
    /// The parsed walk in its canonical form, e.g. "5+, 3-, 8+"
    pub path_string: String,
    pub walk: W,
}

impl<W: GraphWalk> Alignment<W> {
    pub fn node_count(&self) -> usize {
        self.walk.len()
    }
}

impl<W> Alignment<W> {
    pub fn strand_orientation(&self) -> Option<Orientation> {
        match self.strand.as_slice() {
            [b] => Orientation::from_sign(*b),
            _ => None,
        }
    }

    pub fn query_range(&self) -> QueryRange {
        QueryRange {
            start: self.query_start,
            end: self.query_end,
            len: self.query_len,
        }
    }
}

/// The query interval of an alignment, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRange {
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub len: Option<usize>,
}

/// Writes "start-end / len", "start-end" if the length is unknown
/// or zero, and nothing if either end is unknown.
impl std::fmt::Display for QueryRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.start, self.end, self.len) {
            (Some(s), Some(e), Some(l)) if l > 0 => write!(f, "{}-{} / {}", s, e, l),
            (Some(s), Some(e), _) => write!(f, "{}-{}", s, e),
            _ => Ok(()),
        }
    }
}

/// The alignments that were loaded, in input order, and one
/// diagnostic for every line that was skipped. Never both empty.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionResult<W> {
    alignments: Vec<Alignment<W>>,
    diagnostics: Vec<Diagnostic>,
}

impl<W> Default for IngestionResult<W> {
    fn default() -> Self {
        IngestionResult {
            alignments: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

impl<W> IngestionResult<W> {
    /// The result for a source that could not be opened.
    pub fn unavailable(source: String) -> Self {
        IngestionResult {
            alignments: Vec::new(),
            diagnostics: vec![Diagnostic::SourceUnavailable { source }],
        }
    }

    pub fn alignments(&self) -> &[Alignment<W>] {
        &self.alignments
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The diagnostics as display strings
    pub fn warnings(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.to_string()).collect()
    }

    pub fn get(&self, index: usize) -> Option<&Alignment<W>> {
        self.alignments.get(index)
    }

    pub fn len(&self) -> usize {
        self.alignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alignments.is_empty()
    }

    /// The verified walks of the given alignments, in the given
    /// order, for handing to whatever draws them. Indices past the
    /// end are skipped.
    pub fn walks_for<'a>(
        &'a self,
        indices: &'a [usize],
    ) -> impl Iterator<Item = &'a W> + 'a {
        indices
            .iter()
            .filter_map(move |&ix| self.alignments.get(ix))
            .map(|a| &a.walk)
    }

    pub fn into_parts(self) -> (Vec<Alignment<W>>, Vec<Diagnostic>) {
        (self.alignments, self.diagnostics)
    }

    fn finish(mut self) -> Self {
        if self.alignments.is_empty() && self.diagnostics.is_empty() {
            self.diagnostics.push(Diagnostic::NoAlignments);
        }
        info!(
            "Loaded {} alignments, {} diagnostics",
            self.alignments.len(),
            self.diagnostics.len()
        );
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub tolerance: ParserTolerance,
}

impl IngestConfig {
    pub fn safe() -> Self {
        Self::with_tolerance(ParserTolerance::Safe)
    }

    pub fn pedantic() -> Self {
        Self::with_tolerance(ParserTolerance::Pedantic)
    }

    pub fn quiet() -> Self {
        Self::with_tolerance(ParserTolerance::IgnoreAll)
    }

    pub fn with_tolerance(tolerance: ParserTolerance) -> Self {
        IngestConfig { tolerance }
    }
}

fn parse_num<T: std::str::FromStr>(field: Option<&&[u8]>) -> Option<T> {
    let bytes = field?.trim();
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

/// Reads GAF records into alignments, validating each walk with the
/// provided validator. Not reentrant: each parse call builds its own
/// result.
pub struct GafParser<'v, V> {
    validator: &'v V,
    config: IngestConfig,
}

impl<'v, V: PathValidator> GafParser<'v, V> {
    pub fn new(validator: &'v V) -> Self {
        Self::with_config(validator, IngestConfig::default())
    }

    pub fn with_config(validator: &'v V, config: IngestConfig) -> Self {
        GafParser { validator, config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Parse a single line. Blank lines and `#` comments produce
    /// Ok(None).
    pub fn parse_record(
        &self,
        line: &[u8],
        line_number: usize,
    ) -> Result<Option<Alignment<V::Walk>>, Diagnostic> {
        let line = line.trim();
        if line.is_empty() || line.starts_with(b"#") {
            return Ok(None);
        }

        let fields: Vec<&[u8]> = line.split_str("\t").collect();
        if fields.len() < MIN_FIELDS {
            return Err(Diagnostic::NotEnoughFields { line: line_number });
        }

        let raw_path = fields[PATH_FIELD];
        let parsed = parse_path(raw_path).map_err(|error| {
            Diagnostic::PathSyntax {
                line: line_number,
                error,
            }
        })?;

        let path_string = parsed.display_string();
        let walk = match self.validator.make_walk(&path_string) {
            Ok(walk) if !walk.is_empty() => walk,
            Ok(_) => {
                return Err(Diagnostic::invalid_path(line_number, String::new()))
            }
            Err(reason) => {
                return Err(Diagnostic::invalid_path(line_number, reason))
            }
        };

        Ok(Some(Alignment {
            query_name: fields[0].into(),
            query_len: parse_num(fields.get(1)),
            query_start: parse_num(fields.get(2)),
            query_end: parse_num(fields.get(3)),
            strand: fields[4].into(),
            mapping_quality: parse_num(fields.get(MAPQ_FIELD)),
            line_number,
            raw_path: raw_path.into(),
            path_string,
            walk,
        }))
    }

    // Returns false if ingestion should stop.
    fn push_record(
        &self,
        result: &mut IngestionResult<V::Walk>,
        line: &[u8],
        line_number: usize,
    ) -> bool {
        match self.parse_record(line, line_number) {
            Ok(Some(alignment)) => {
                result.alignments.push(alignment);
                true
            }
            Ok(None) => true,
            Err(diagnostic) => self.push_diagnostic(result, diagnostic),
        }
    }

    fn push_diagnostic(
        &self,
        result: &mut IngestionResult<V::Walk>,
        diagnostic: Diagnostic,
    ) -> bool {
        debug!("{}", diagnostic);
        let cont = diagnostic.can_safely_continue(&self.config.tolerance);
        if self.config.tolerance != ParserTolerance::IgnoreAll || !cont {
            result.diagnostics.push(diagnostic);
        }
        cont
    }

    /// Parse an already split sequence of lines, numbering them from 1.
    pub fn parse_lines<I>(&self, lines: I) -> IngestionResult<V::Walk>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut result = IngestionResult::default();
        for (ix, line) in lines.into_iter().enumerate() {
            if !self.push_record(&mut result, line.as_ref(), ix + 1) {
                break;
            }
        }
        result.finish()
    }

    /// Parse every line of a reader. A read error is recorded against
    /// the line it happened on and ends ingestion.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> IngestionResult<V::Walk> {
        let mut result = IngestionResult::default();
        for (ix, line) in reader.byte_lines().enumerate() {
            let line_number = ix + 1;
            let keep_going = match line {
                Ok(line) => self.push_record(&mut result, &line, line_number),
                Err(err) => self.push_diagnostic(
                    &mut result,
                    Diagnostic::ReadFailed {
                        line: line_number,
                        message: err.to_string(),
                    },
                ),
            };
            if !keep_going {
                break;
            }
        }
        result.finish()
    }

    /// Open and parse a GAF file. If the file can't be opened the
    /// result holds a single diagnostic and no alignments.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> IngestionResult<V::Walk> {
        let path = path.as_ref();
        match File::open(path) {
            Ok(file) => self.parse_reader(BufReader::new(file)),
            Err(err) => {
                warn!("Cannot open GAF file {}: {}", path.display(), err);
                IngestionResult::unavailable(path.display().to_string())
            }
        }
    }
}

/// Parse GAF records from a reader with the default configuration.
pub fn ingest<R: BufRead, V: PathValidator>(
    reader: R,
    validator: &V,
) -> IngestionResult<V::Walk> {
    GafParser::new(validator).parse_reader(reader)
}

/// Parse a GAF file with the default configuration.
pub fn ingest_file<P: AsRef<Path>, V: PathValidator>(
    path: P,
    validator: &V,
) -> IngestionResult<V::Walk> {
    GafParser::new(validator).parse_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{SegmentGraph, SegmentWalk, UncheckedValidator};
    use crate::walk::{OrientedName, ParsedWalk};
    use std::io::Write;
    use Orientation::*;

    const GOOD: &str =
        "read1\t6\t0\t6\t+\t>s2>s3<s4\t12\t2\t8\t6\t6\t60\tcg:Z:6M";

    fn graph() -> SegmentGraph {
        let mut graph = SegmentGraph::new();
        graph.add_link("s2", Forward, "s3", Forward);
        graph.add_link("s3", Forward, "s4", Backward);
        graph.add_segment("s9");
        graph
    }

    fn ingest_str<V: PathValidator>(
        text: &str,
        validator: &V,
    ) -> IngestionResult<V::Walk> {
        ingest(text.as_bytes(), validator)
    }

    #[test]
    fn full_record() {
        let result = ingest_str(GOOD, &graph());
        assert!(result.diagnostics().is_empty());
        assert_eq!(1, result.len());

        let a = &result.alignments()[0];
        assert_eq!("read1", a.query_name);
        assert_eq!(Some(6), a.query_len);
        assert_eq!(Some(0), a.query_start);
        assert_eq!(Some(6), a.query_end);
        assert_eq!("+", a.strand);
        assert_eq!(Some(Forward), a.strand_orientation());
        assert_eq!(Some(60), a.mapping_quality);
        assert_eq!(1, a.line_number);
        assert_eq!(">s2>s3<s4", a.raw_path);
        assert_eq!("s2+, s3+, s4-", a.path_string);
        assert_eq!(3, a.node_count());
        assert_eq!(&[0, 1, 2], a.walk.segment_ids());
    }

    #[test]
    fn missing_numbers_are_none() {
        let text = "q\tlen\t\t-4\t-\ts2+,s3+";
        let result = ingest_str(text, &graph());
        let a = &result.alignments()[0];
        assert_eq!(None, a.query_len);
        assert_eq!(None, a.query_start);
        assert_eq!(None, a.query_end);
        assert_eq!(None, a.mapping_quality);
        assert_eq!(Some(Backward), a.strand_orientation());
        assert_eq!("", a.query_range().to_string());
    }

    #[test]
    fn short_line_is_reported() {
        let text = format!("{}\nread2\t6\t0\t6", GOOD);
        let result = ingest_str(&text, &graph());
        assert_eq!(1, result.len());
        assert_eq!(
            vec!["Line 2: not enough fields, skipped.".to_string()],
            result.warnings()
        );
    }

    #[test]
    fn line_numbers_count_blank_and_comment_lines() {
        let text = format!(
            "# header\n\n   \n{}\nr\t1\t0\t1\t+\t*\nr\t1\t0\t1\t+\t>s2>s9\n{}",
            GOOD, GOOD
        );
        let result = ingest_str(&text, &graph());

        let lines: Vec<usize> =
            result.alignments().iter().map(|a| a.line_number).collect();
        assert_eq!(vec![4, 7], lines);
        assert_eq!(
            vec![
                "Line 5: failed to parse path (path field is empty).",
                "Line 6: invalid path (no link from s2+ to s9+).",
            ],
            result.warnings()
        );
    }

    #[test]
    fn empty_walks_get_the_generic_reason() {
        struct Rejecting;
        impl PathValidator for Rejecting {
            type Walk = ParsedWalk;
            fn make_walk(&self, _: &str) -> Result<ParsedWalk, String> {
                Ok(ParsedWalk::default())
            }
        }

        let result = ingest_str(GOOD, &Rejecting);
        assert!(result.is_empty());
        assert_eq!(
            vec!["Line 1: invalid path (the nodes do not form a path)."],
            result.warnings()
        );
    }

    #[test]
    fn no_data_lines() {
        let result = ingest_str("# only a comment\n\n", &graph());
        assert!(result.is_empty());
        assert_eq!(&[Diagnostic::NoAlignments], result.diagnostics());

        let result = ingest_str("", &UncheckedValidator);
        assert_eq!(
            vec!["No alignments were found in the file."],
            result.warnings()
        );
    }

    #[test]
    fn failed_lines_suppress_the_synthetic_diagnostic() {
        let result = ingest_str("a\tb\n", &graph());
        assert!(result.is_empty());
        assert_eq!(
            &[Diagnostic::NotEnoughFields { line: 1 }],
            result.diagnostics()
        );
    }

    #[test]
    fn tolerance_levels() {
        let text = format!("x\n{}\ny\n{}", GOOD, GOOD);
        let graph = graph();

        let safe = GafParser::new(&graph).parse_reader(text.as_bytes());
        assert_eq!(2, safe.len());
        assert_eq!(2, safe.diagnostics().len());

        let quiet = GafParser::with_config(&graph, IngestConfig::quiet())
            .parse_reader(text.as_bytes());
        assert_eq!(2, quiet.len());
        assert!(quiet.diagnostics().is_empty());

        let pedantic = GafParser::with_config(&graph, IngestConfig::pedantic())
            .parse_reader(text.as_bytes());
        assert!(pedantic.is_empty());
        assert_eq!(
            &[Diagnostic::NotEnoughFields { line: 1 }],
            pedantic.diagnostics()
        );

        // nothing loaded and every problem suppressed still reports
        let quiet = GafParser::with_config(&graph, IngestConfig::quiet())
            .parse_lines(vec!["x", "y"]);
        assert_eq!(&[Diagnostic::NoAlignments], quiet.diagnostics());
    }

    #[test]
    fn parse_lines_matches_reader() {
        let text = format!("{}\n\nbad\n{}", GOOD, GOOD);
        let graph = graph();
        let parser = GafParser::new(&graph);
        assert_eq!(
            parser.parse_reader(text.as_bytes()),
            parser.parse_lines(text.lines())
        );
    }

    #[test]
    fn files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", GOOD).unwrap();
        writeln!(file, "read2\t6\t0\t6\t+\t>s2>nope").unwrap();

        let result: IngestionResult<SegmentWalk> =
            ingest_file(file.path(), &graph());
        assert_eq!(1, result.len());
        assert_eq!(
            vec!["Line 2: invalid path (segment nope is not in the graph)."],
            result.warnings()
        );

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.gaf");
        let result = ingest_file(&missing, &graph());
        assert!(result.is_empty());
        assert_eq!(
            vec![format!("Cannot open GAF file: {}", missing.display())],
            result.warnings()
        );
    }

    #[test]
    fn query_ranges() {
        let result = ingest_str(GOOD, &UncheckedValidator);
        let a = &result.alignments()[0];
        assert_eq!("0-6 / 6", a.query_range().to_string());

        let range = QueryRange {
            start: Some(3),
            end: Some(9),
            len: Some(0),
        };
        assert_eq!("3-9", range.to_string());
    }

    #[test]
    fn walks_for_indices() {
        let text = format!(
            "{}\nr2\t1\t0\t1\t-\ts3+,s4-\n{}",
            GOOD, "r3\t1\t0\t1\t+\t>s9"
        );
        let result = ingest_str(&text, &graph());
        assert_eq!(3, result.len());

        let firsts: Vec<&OrientedName> = result
            .walks_for(&[2, 0, 17])
            .map(|w| &w.segments()[0])
            .collect();
        assert_eq!(
            vec![
                &OrientedName::new("s9", Forward),
                &OrientedName::new("s2", Forward)
            ],
            firsts
        );
    }

    // Hands out its bytes in a single read, then fails every read
    // after that.
    struct FailingReader {
        data: Vec<u8>,
        done: bool,
    }

    impl std::io::Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.done {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk went away",
                ));
            }
            self.done = true;
            buf[..self.data.len()].copy_from_slice(&self.data);
            Ok(self.data.len())
        }
    }

    fn failing_after(text: &str) -> BufReader<FailingReader> {
        BufReader::new(FailingReader {
            data: text.as_bytes().to_vec(),
            done: false,
        })
    }

    #[test]
    fn read_errors_stop_ingestion() {
        let text = format!("{}\nx\n{}\n", GOOD, GOOD);
        let graph = graph();

        let result = GafParser::new(&graph).parse_reader(failing_after(&text));
        let lines: Vec<usize> =
            result.alignments().iter().map(|a| a.line_number).collect();
        assert_eq!(vec![1, 3], lines);
        assert_eq!(
            vec![
                "Line 2: not enough fields, skipped.",
                "Line 4: could not be read (disk went away).",
            ],
            result.warnings()
        );

        // a read error is kept even when line problems are not
        let quiet = GafParser::with_config(&graph, IngestConfig::quiet())
            .parse_reader(failing_after(&text));
        assert_eq!(2, quiet.len());
        assert_eq!(
            vec!["Line 4: could not be read (disk went away)."],
            quiet.warnings()
        );
        assert_eq!(Some(4), quiet.diagnostics()[0].line());
    }
}
