extern crate clap;
use clap::*;

mod cmd_lop;

fn main() -> anyhow::Result<()> {
    let app = Command::new("lop")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`lop` - Lift Over Projections of genomic intervals")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_lop::project::make_subcommand())
        .subcommand(cmd_lop::stats::make_subcommand())
        .subcommand(cmd_lop::check::make_subcommand())
        .after_help(
            r###"Subcommands:

* project - Project intervals onto another assembly through a chain file
* stats   - Per-sequence summaries of a chain file
* check   - Validate chains and report structural problems

Conventions:

* Chain files follow the UCSC format; the t side is the source assembly
  and the q side the target. Gzipped inputs are detected by extension.
* Ranges on the command line are 1-based closed (`chr1:100-200`), BED
  input is 0-based half-open. Internals are 0-based half-open.

"###,
        );

    // Check which subcommand the user ran...
    match app.get_matches().subcommand() {
        Some(("project", sub_matches)) => cmd_lop::project::execute(sub_matches),
        Some(("stats", sub_matches)) => cmd_lop::stats::execute(sub_matches),
        Some(("check", sub_matches)) => cmd_lop::check::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}

// TODO: support BED12 input for spliced queries
