use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use gafwalk::gaf::{GafParser, IngestConfig, ParserTolerance};
use gafwalk::graph::UncheckedValidator;
use gafwalk::query::{FilterCriteria, MatchMode, QuerySession, ViewConfig};

#[derive(Parser, Debug)]
#[command(name = "gafwalk")]
#[command(about = "List the GAF alignments that pass a filter, one page at a time")]
struct Cli {
    /// GAF file to load
    gaf: PathBuf,

    /// Only keep alignments with at least this mapping quality
    #[arg(short = 'q', long, default_value_t = 0)]
    min_mapq: i64,

    /// Segments the path must include, separated by commas or spaces;
    /// add + or - to require an orientation
    #[arg(short, long)]
    segments: Option<String>,

    /// Require every listed segment instead of any
    #[arg(long)]
    all: bool,

    #[arg(long, default_value_t = 500)]
    page_size: usize,

    /// 1-based page to print
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Stop at the first record that can't be loaded
    #[arg(long, conflicts_with = "quiet_lines")]
    pedantic: bool,

    /// Don't report records that can't be loaded
    #[arg(long)]
    quiet_lines: bool,

    /// Print the page as JSON instead of a table
    #[cfg(feature = "serde1")]
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn ingest_config(&self) -> IngestConfig {
        let tolerance = if self.pedantic {
            ParserTolerance::Pedantic
        } else if self.quiet_lines {
            ParserTolerance::IgnoreAll
        } else {
            ParserTolerance::Safe
        };
        IngestConfig::with_tolerance(tolerance)
    }

    fn criteria(&self) -> FilterCriteria {
        let mode = if self.all { MatchMode::All } else { MatchMode::Any };
        let criteria = FilterCriteria::new()
            .with_min_mapq(self.min_mapq)
            .with_mode(mode);
        match &self.segments {
            Some(text) => criteria.with_segments(text),
            None => criteria,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    let validator = UncheckedValidator;
    let parser = GafParser::with_config(&validator, cli.ingest_config());
    let result = parser.parse_file(&cli.gaf);

    for warning in result.warnings() {
        eprintln!("{}", warning);
    }

    let config = ViewConfig {
        page_size: cli.page_size,
    };
    let mut session = QuerySession::from_result(&result, &config);
    session.apply(cli.criteria());
    session.set_current_page(cli.page.saturating_sub(1));

    #[cfg(feature = "serde1")]
    {
        if cli.json {
            println!("{}", session.view().snapshot().to_json()?);
            return Ok(());
        }
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    writeln!(out, "#\tquery\tstrand\tmapq\tnodes\tpath\tquery_range")?;
    for (_, a) in session.current_rows() {
        let mapq = a
            .mapping_quality
            .map(|q| q.to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            a.line_number,
            a.query_name,
            a.strand,
            mapq,
            a.node_count(),
            a.path_string,
            a.query_range()
        )?;
    }

    let view = session.view();
    let shown_page = if view.page_count() == 0 {
        0
    } else {
        view.current_page() + 1
    };
    writeln!(
        out,
        "# page {} / {}, {} of {} alignments match",
        shown_page,
        view.page_count(),
        view.total_matches(),
        result.len()
    )?;

    out.flush()?;
    Ok(())
}
