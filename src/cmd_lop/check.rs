use clap::*;
use std::io::Write;

use lop::LiftError;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("check")
        .about("Validate chains and report structural problems")
        .after_help(
            r###"
Parses every chain in the file and validates it: strand characters,
block coordinates against the declared sequence sizes, source-order and
target-order of blocks, and coordinate overflow. Each problem is
reported as one line

    chain <id>: <reason>

followed by a summary count. A clean file prints only the summary.
Unparseable text (truncated headers, bad data lines) aborts instead,
since line boundaries can no longer be trusted after that.

The exit status is zero either way; the report is the product.

Examples:
1. Validate a chain file:
   lop check tests/chain/hg38ToMm39.chain.gz

2. Write the report to a file:
   lop check tests/chain/hg38ToMm39.chain.gz -o report.txt

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("Input chain file to validate"),
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

    let reader = lop::libs::chain::ChainReader::from_path(infile)?;

    //----------------------------
    // Operating
    //----------------------------
    let mut total = 0;
    let mut malformed = 0;

    for item in reader {
        let record = item?;
        total += 1;

        let verdict = record
            .to_parts()
            .and_then(|(meta, blocks)| lop::Chain::new(meta, blocks));

        match verdict {
            Ok(_) => {}
            Err(LiftError::MalformedChain { id, why }) => {
                malformed += 1;
                writer.write_all(format!("chain {}: {}\n", id, why).as_ref())?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    writer.write_all(format!("total {} chains, {} malformed\n", total, malformed).as_ref())?;

    Ok(())
}
