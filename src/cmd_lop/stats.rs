use clap::*;
use itertools::Itertools;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("stats")
        .about("Per-sequence summaries of a chain file")
        .after_help(
            r###"
Aggregates chains by source sequence and reports one row per sequence:

* source  - source sequence name
* size    - source sequence length
* chains  - number of chains anchored on the sequence
* blocks  - total alignment blocks across those chains
* aligned - total aligned bases (blocks from different chains may overlap)
* covered - distinct source bases covered by at least one block

Input files can be gzipped. Rows appear in the order sequences were first
seen in the chain file. Source sequences longer than 2,147,483,647 bp are
not supported.

Examples:
1. Summarize a chain file:
   lop stats tests/chain/hg38ToMm39.chain.gz

2. Also rank the 5 highest-scoring chains:
   lop stats tests/chain/hg38ToMm39.chain.gz --top 5

3. Output results to a file:
   lop stats tests/chain/hg38ToMm39.chain.gz -o summary.tsv

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("Input chain file to process"),
        )
        .arg(
            Arg::new("top")
                .long("top")
                .num_args(1)
                .value_parser(value_parser!(usize))
                .help("Append a ranking of the N highest-scoring chains"),
        )
        .arg(
            Arg::new("min_score")
                .long("min-score")
                .num_args(1)
                .value_parser(value_parser!(f64))
                .help("Ignore chains scoring below this threshold"),
        )
        .arg(
            Arg::new("skip_malformed")
                .long("skip-malformed")
                .action(ArgAction::SetTrue)
                .help("Skip structurally invalid chains instead of aborting"),
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

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());

    let mut reader = lop::libs::chain::ChainReader::from_path(infile)?;
    if let Some(min_score) = args.get_one::<f64>("min_score") {
        reader = reader.with_min_score(*min_score);
    }

    let index = if args.get_flag("skip_malformed") {
        let (index, skipped) = lop::ChainIndex::from_source_tolerant(reader)?;
        if skipped > 0 {
            eprintln!("Warning: skipped {} malformed chains", skipped);
        }
        index
    } else {
        lop::ChainIndex::from_source(reader)?
    };

    let field_names = vec!["source", "size", "chains", "blocks", "aligned", "covered"];

    //----------------------------
    // Operating
    //----------------------------
    writer.write_all(format!("{}\n", field_names.join("\t")).as_ref())?;

    for (name, size, chains) in index.iter() {
        // IntSpan coordinates are i32
        if size > i32::MAX as u64 {
            return Err(anyhow::anyhow!(
                "{} is {} bp; covered-base counting supports at most {} bp",
                name,
                size,
                i32::MAX
            ));
        }

        let blocks: usize = chains.iter().map(|c| c.blocks().len()).sum();
        let aligned: u64 = chains.iter().map(|c| c.aligned_len()).sum();

        let mut ints = intspan::IntSpan::new();
        for chain in chains {
            for block in chain.blocks() {
                ints.merge(&intspan::IntSpan::from_pair(
                    block.source_start as i32 + 1,
                    block.source_end as i32,
                ));
            }
        }
        let mut covered: u64 = 0;
        for (lower, upper) in ints.spans() {
            covered += (upper - lower + 1) as u64;
        }

        writer.write_all(
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\n",
                name,
                size,
                chains.len(),
                blocks,
                aligned,
                covered,
            )
            .as_ref(),
        )?;
    }

    if let Some(top) = args.get_one::<usize>("top") {
        let ranking = index
            .ranked_chains(Some(*top))
            .iter()
            .enumerate()
            .map(|(i, (id, score))| format!("{}\t{}\t{}", i + 1, id, score))
            .join("\n");

        writer.write_all(format!("\nrank\tchain\tscore\n{}\n", ranking).as_ref())?;
    }

    Ok(())
}
