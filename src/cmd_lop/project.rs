use clap::{Arg, ArgAction, ArgMatches, Command};
use indexmap::IndexMap;
use std::io::{BufRead, Write};

use lop::libs::chain::ChainReader;
use lop::{ChainIndex, ProjectedInterval};

pub fn make_subcommand() -> Command {
    Command::new("project")
        .about("Project intervals through a chain file")
        .after_help(
            r###"Ranges are read one per line as chr:start-end (1-based, closed);
with --bed, as BED3 (0-based, half-open). Output is a TSV of

    query   target  strand  chain_id    covered partial/full

with all ranges presented 1-based closed. A query spanning an alignment
gap comes back as several lines, one per ungapped piece; queries on
sequences absent from the chain file produce no lines.

Examples:
    lop project hg38ToMm39.over.chain.gz ranges.txt
    lop project --bed --min-score 3000 in.chain peaks.bed -o mapped.tsv

"###,
        )
        .arg(
            Arg::new("infile")
                .index(1)
                .required(true)
                .help("Input chain file (.chain or .chain.gz)"),
        )
        .arg(
            Arg::new("ranges")
                .index(2)
                .required(true)
                .help("File of ranges to project, one per line"),
        )
        .arg(
            Arg::new("bed")
                .long("bed")
                .action(ArgAction::SetTrue)
                .help("Read ranges as BED3 instead of chr:start-end"),
        )
        .arg(
            Arg::new("min_score")
                .long("min-score")
                .value_parser(clap::value_parser!(f64))
                .help("Skip chains scoring below this while reading"),
        )
        .arg(
            Arg::new("skip_malformed")
                .long("skip-malformed")
                .action(ArgAction::SetTrue)
                .help("Skip malformed chains instead of failing the build"),
        )
        .arg(
            Arg::new("best")
                .long("best")
                .action(ArgAction::SetTrue)
                .help("Keep only the best-ranked chain's pieces per query"),
        )
        .arg(
            Arg::new("full")
                .long("full")
                .action(ArgAction::SetTrue)
                .help("Drop pieces from chains covering the query only partially"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .short('p')
                .num_args(1)
                .default_value("1")
                .value_parser(clap::value_parser!(usize))
                .help("Number of threads for batch projection"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let rgfile = args.get_one::<String>("ranges").unwrap();

    let is_bed = args.get_flag("bed");
    let is_best = args.get_flag("best");
    let is_full = args.get_flag("full");

    // Set the number of threads for rayon
    let opt_parallel = *args.get_one::<usize>("parallel").unwrap();
    rayon::ThreadPoolBuilder::new()
        .num_threads(opt_parallel)
        .build_global()?;

    //----------------------------
    // Build the index
    //----------------------------
    let mut chain_reader = ChainReader::from_path(infile)?;
    if let Some(min) = args.get_one::<f64>("min_score") {
        chain_reader = chain_reader.with_min_score(*min);
    }

    let index = if args.get_flag("skip_malformed") {
        let (index, skipped) = ChainIndex::from_source_tolerant(chain_reader)?;
        if skipped > 0 {
            eprintln!("Warning: skipped {} malformed chains", skipped);
        }
        index
    } else {
        ChainIndex::from_source(chain_reader)?
    };

    //----------------------------
    // Project
    //----------------------------
    let queries = read_queries(rgfile, is_bed)?;

    // Queries grouped per source sequence take the batch path; the
    // grouping map remembers each query's input position so the output
    // keeps input order
    let mut grouped: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for (i, (name, _, _)) in queries.iter().enumerate() {
        grouped.entry(name.as_str()).or_default().push(i);
    }

    let mut results: Vec<Vec<ProjectedInterval>> = vec![Vec::new(); queries.len()];
    for (name, positions) in &grouped {
        let intervals: Vec<(u64, u64)> = positions
            .iter()
            .map(|&i| (queries[i].1, queries[i].2))
            .collect();
        let batch = index.project_batch(name, &intervals)?;
        for (&i, pieces) in positions.iter().zip(batch) {
            results[i] = pieces;
        }
    }

    //----------------------------
    // Output
    //----------------------------
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let mut unmapped = 0usize;

    for ((name, start, end), mut pieces) in queries.iter().zip(results) {
        if is_best {
            let first = pieces.first().map(|p| p.chain_id);
            pieces.retain(|p| Some(p.chain_id) == first);
        }
        if is_full {
            pieces.retain(|p| !p.is_partial);
        }
        if pieces.is_empty() {
            unmapped += 1;
            continue;
        }
        for p in &pieces {
            writer.write_all(
                format!(
                    "{}:{}-{}\t{}:{}-{}\t{}\t{}\t{}:{}-{}\t{}\n",
                    name,
                    start + 1,
                    end,
                    p.target_name,
                    p.target_start + 1,
                    p.target_end,
                    p.target_strand,
                    p.chain_id,
                    name,
                    p.source_covered_start + 1,
                    p.source_covered_end,
                    if p.is_partial { "partial" } else { "full" }
                )
                .as_ref(),
            )?;
        }
    }

    if unmapped > 0 {
        eprintln!("{} of {} ranges had no mapping", unmapped, queries.len());
    }

    Ok(())
}

/// Read query intervals, converting to 0-based half-open.
fn read_queries(path: &str, is_bed: bool) -> anyhow::Result<Vec<(String, u64, u64)>> {
    let reader = intspan::reader(path);
    let mut queries = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if is_bed {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 {
                return Err(anyhow::anyhow!("invalid BED line: {}", line));
            }
            queries.push((
                fields[0].to_string(),
                fields[1].parse()?,
                fields[2].parse()?,
            ));
        } else {
            let rg = intspan::Range::from_str(line);
            // intspan::Range::from_str("chr1") -> start=0, end=0
            if *rg.start() == 0 {
                return Err(anyhow::anyhow!("invalid range: {}", line));
            }
            // Convert 1-based inclusive to 0-based half-open
            let start = (*rg.start() as u64).saturating_sub(1);
            let end = *rg.end() as u64;
            queries.push((rg.chr().to_string(), start, end));
        }
    }

    Ok(queries)
}
