use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn command_project_help() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("lop")?;
    cmd.arg("project").arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Project intervals through a chain file"));
    Ok(())
}

#[test]
fn command_project_basic() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let chain_path = dir.path().join("in.chain");
    let ranges_path = dir.path().join("ranges.txt");
    let out_path = dir.path().join("out.tsv");

    // chain score tName tSize tStrand tStart tEnd qName qSize qStrand qStart qEnd id
    // Blocks: [100,150)->[500,550) and [200,300)->[600,700)
    let chain_content = "\
chain 4900 chr1 1000 + 100 300 chr2 1000 + 500 700 1
50 50 50
100

";
    fs::write(&chain_path, chain_content)?;
    fs::write(&ranges_path, "chr1:121-150\nchr1:141-221\nchr3:1-10\n")?;

    let mut cmd = Command::cargo_bin("lop")?;
    cmd.arg("project")
        .arg(chain_path.to_str().unwrap())
        .arg(ranges_path.to_str().unwrap())
        .arg("-o")
        .arg(out_path.to_str().unwrap());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("1 of 3 ranges had no mapping"));

    let output = fs::read_to_string(&out_path)?;
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);

    // Fully inside the first block
    assert_eq!(
        lines[0],
        "chr1:121-150\tchr2:521-550\t+\t1\tchr1:121-150\tfull"
    );
    // Spans the gap: one piece per block, both partial
    assert_eq!(
        lines[1],
        "chr1:141-221\tchr2:541-550\t+\t1\tchr1:141-150\tpartial"
    );
    assert_eq!(
        lines[2],
        "chr1:141-221\tchr2:601-621\t+\t1\tchr1:201-221\tpartial"
    );

    Ok(())
}

#[test]
fn command_project_bed_input() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let chain_path = dir.path().join("in.chain");
    let bed_path = dir.path().join("ranges.bed");
    let out_path = dir.path().join("out.tsv");

    let chain_content = "\
chain 4900 chr1 1000 + 100 300 chr2 1000 + 500 700 1
50 50 50
100

";
    fs::write(&chain_path, chain_content)?;
    // BED is 0-based half-open; [120,150) is chr1:121-150
    fs::write(&bed_path, "chr1\t120\t150\n")?;

    let mut cmd = Command::cargo_bin("lop")?;
    cmd.arg("project")
        .arg("--bed")
        .arg(chain_path.to_str().unwrap())
        .arg(bed_path.to_str().unwrap())
        .arg("-o")
        .arg(out_path.to_str().unwrap());
    cmd.assert().success();

    let output = fs::read_to_string(&out_path)?;
    assert_eq!(
        output,
        "chr1:121-150\tchr2:521-550\t+\t1\tchr1:121-150\tfull\n"
    );

    Ok(())
}

#[test]
fn command_project_reverse_strand() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let chain_path = dir.path().join("in.chain");
    let ranges_path = dir.path().join("ranges.txt");
    let out_path = dir.path().join("out.tsv");

    // q side is reverse: [0,10) in reverse numbering is [90,100) forward
    let chain_content = "\
chain 800 chr1 1000 + 0 10 chrM 100 - 0 10 9
10

";
    fs::write(&chain_path, chain_content)?;
    fs::write(&ranges_path, "chr1:3-8\n")?;

    let mut cmd = Command::cargo_bin("lop")?;
    cmd.arg("project")
        .arg(chain_path.to_str().unwrap())
        .arg(ranges_path.to_str().unwrap())
        .arg("-o")
        .arg(out_path.to_str().unwrap());
    cmd.assert().success();

    let output = fs::read_to_string(&out_path)?;
    assert_eq!(output, "chr1:3-8\tchrM:93-98\t-\t9\tchr1:3-8\tfull\n");

    Ok(())
}

#[test]
fn command_project_best_and_rank_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let chain_path = dir.path().join("in.chain");
    let ranges_path = dir.path().join("ranges.txt");
    let out_path = dir.path().join("out.tsv");

    // Two chains cover the same query; the higher-scoring one ranks first
    let chain_content = "\
chain 100 chr1 1000 + 0 50 chr2 1000 + 0 50 1
50

chain 200 chr1 1000 + 0 50 chr3 1000 + 100 150 2
50

";
    fs::write(&chain_path, chain_content)?;
    fs::write(&ranges_path, "chr1:1-50\n")?;

    let mut cmd = Command::cargo_bin("lop")?;
    cmd.arg("project")
        .arg(chain_path.to_str().unwrap())
        .arg(ranges_path.to_str().unwrap())
        .arg("-o")
        .arg(out_path.to_str().unwrap());
    cmd.assert().success();

    let output = fs::read_to_string(&out_path)?;
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "chr1:1-50\tchr3:101-150\t+\t2\tchr1:1-50\tfull");
    assert_eq!(lines[1], "chr1:1-50\tchr2:1-50\t+\t1\tchr1:1-50\tfull");

    // --best keeps only the first-ranked chain's pieces
    let mut cmd = Command::cargo_bin("lop")?;
    cmd.arg("project")
        .arg("--best")
        .arg(chain_path.to_str().unwrap())
        .arg(ranges_path.to_str().unwrap())
        .arg("-o")
        .arg(out_path.to_str().unwrap());
    cmd.assert().success();

    let output = fs::read_to_string(&out_path)?;
    assert_eq!(output, "chr1:1-50\tchr3:101-150\t+\t2\tchr1:1-50\tfull\n");

    Ok(())
}

#[test]
fn command_project_full_drops_partial() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let chain_path = dir.path().join("in.chain");
    let ranges_path = dir.path().join("ranges.txt");
    let out_path = dir.path().join("out.tsv");

    let chain_content = "\
chain 4900 chr1 1000 + 100 300 chr2 1000 + 500 700 1
50 50 50
100

";
    fs::write(&chain_path, chain_content)?;
    // Spans the alignment gap, so every piece is partial
    fs::write(&ranges_path, "chr1:141-221\n")?;

    let mut cmd = Command::cargo_bin("lop")?;
    cmd.arg("project")
        .arg("--full")
        .arg(chain_path.to_str().unwrap())
        .arg(ranges_path.to_str().unwrap())
        .arg("-o")
        .arg(out_path.to_str().unwrap());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("1 of 1 ranges had no mapping"));

    let output = fs::read_to_string(&out_path)?;
    assert!(output.is_empty());

    Ok(())
}

#[test]
fn command_project_min_score() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let chain_path = dir.path().join("in.chain");
    let ranges_path = dir.path().join("ranges.txt");
    let out_path = dir.path().join("out.tsv");

    let chain_content = "\
chain 100 chr1 1000 + 0 50 chr2 1000 + 0 50 1
50

chain 200 chr1 1000 + 0 50 chr3 1000 + 100 150 2
50

";
    fs::write(&chain_path, chain_content)?;
    fs::write(&ranges_path, "chr1:1-50\n")?;

    let mut cmd = Command::cargo_bin("lop")?;
    cmd.arg("project")
        .arg("--min-score")
        .arg("150")
        .arg(chain_path.to_str().unwrap())
        .arg(ranges_path.to_str().unwrap())
        .arg("-o")
        .arg(out_path.to_str().unwrap());
    cmd.assert().success();

    let output = fs::read_to_string(&out_path)?;
    assert_eq!(output, "chr1:1-50\tchr3:101-150\t+\t2\tchr1:1-50\tfull\n");

    Ok(())
}

#[test]
fn command_project_skip_malformed() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let chain_path = dir.path().join("in.chain");
    let ranges_path = dir.path().join("ranges.txt");
    let out_path = dir.path().join("out.tsv");

    // Chain 7 declares chr1 as 20 bases but its block runs to 30
    let chain_content = "\
chain 500 chr1 20 + 0 30 chr2 1000 + 0 30 7
30

chain 900 chr1 1000 + 0 10 chr2 1000 + 0 10 8
10

";
    fs::write(&chain_path, chain_content)?;
    fs::write(&ranges_path, "chr1:1-10\n")?;

    // Strict ingestion aborts
    let mut cmd = Command::cargo_bin("lop")?;
    cmd.arg("project")
        .arg(chain_path.to_str().unwrap())
        .arg(ranges_path.to_str().unwrap());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Malformed chain 7"));

    // Tolerant ingestion skips and reports
    let mut cmd = Command::cargo_bin("lop")?;
    cmd.arg("project")
        .arg("--skip-malformed")
        .arg(chain_path.to_str().unwrap())
        .arg(ranges_path.to_str().unwrap())
        .arg("-o")
        .arg(out_path.to_str().unwrap());
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("skipped 1 malformed chains"));

    let output = fs::read_to_string(&out_path)?;
    assert_eq!(output, "chr1:1-10\tchr2:1-10\t+\t8\tchr1:1-10\tfull\n");

    Ok(())
}

#[test]
fn command_project_out_of_bounds() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let chain_path = dir.path().join("in.chain");
    let ranges_path = dir.path().join("ranges.txt");

    let chain_content = "\
chain 100 chr1 1000 + 0 10 chr2 1000 + 0 10 1
10

";
    fs::write(&chain_path, chain_content)?;
    fs::write(&ranges_path, "chr1:1-2000\n")?;

    let mut cmd = Command::cargo_bin("lop")?;
    cmd.arg("project")
        .arg(chain_path.to_str().unwrap())
        .arg(ranges_path.to_str().unwrap());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("out of bounds"));

    Ok(())
}

#[test]
fn command_project_non_utf8_ranges() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let chain_path = dir.path().join("in.chain");
    let ranges_path = dir.path().join("ranges.txt");

    let chain_content = "\
chain 100 chr1 1000 + 0 10 chr2 1000 + 0 10 1
10

";
    fs::write(&chain_path, chain_content)?;
    // An unreadable line must abort the run, not truncate the query list
    fs::write(&ranges_path, b"chr1:1-10\n\xff\xfechr1:3-8\n")?;

    let mut cmd = Command::cargo_bin("lop")?;
    cmd.arg("project")
        .arg(chain_path.to_str().unwrap())
        .arg(ranges_path.to_str().unwrap());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("valid UTF-8"));

    Ok(())
}

#[test]
fn command_project_parallel_matches_serial() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let chain_path = dir.path().join("in.chain");
    let ranges_path = dir.path().join("ranges.txt");
    let serial_path = dir.path().join("serial.tsv");
    let parallel_path = dir.path().join("parallel.tsv");

    let chain_content = "\
chain 4900 chr1 1000 + 100 300 chr2 1000 + 500 700 1
50 50 50
100

";
    fs::write(&chain_path, chain_content)?;

    // Enough queries to cross the batch threshold
    let mut ranges = String::new();
    for i in 0..150 {
        let start = (i * 7) % 800 + 1;
        ranges.push_str(&format!("chr1:{}-{}\n", start, start + 50));
    }
    fs::write(&ranges_path, &ranges)?;

    let mut cmd = Command::cargo_bin("lop")?;
    cmd.arg("project")
        .arg(chain_path.to_str().unwrap())
        .arg(ranges_path.to_str().unwrap())
        .arg("-o")
        .arg(serial_path.to_str().unwrap());
    cmd.assert().success();

    let mut cmd = Command::cargo_bin("lop")?;
    cmd.arg("project")
        .arg("-p")
        .arg("4")
        .arg(chain_path.to_str().unwrap())
        .arg(ranges_path.to_str().unwrap())
        .arg("-o")
        .arg(parallel_path.to_str().unwrap());
    cmd.assert().success();

    let serial = fs::read_to_string(&serial_path)?;
    let parallel = fs::read_to_string(&parallel_path)?;
    assert_eq!(serial, parallel);
    assert!(!serial.is_empty());

    Ok(())
}
