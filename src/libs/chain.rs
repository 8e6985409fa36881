//! UCSC chain format: wire-side records and a streaming reader.
//!
//! Header lines look like
//! `chain score tName tSize tStrand tStart tEnd qName qSize qStrand qStart qEnd id`,
//! followed by `size dt dq` data lines (the last line carries only `size`)
//! and a blank separator. Coordinates are 0-based, half-open, cumulative
//! down the data lines; when `qStrand` is `-` the q coordinates are given
//! in reverse-complement numbering.
//!
//! For liftover the `t` side is the source assembly and the `q` side the
//! target. [`ChainRecord::to_parts`] performs that mapping, flipping
//! reverse-space q coordinates to forward numbering.

use std::io::BufRead;
use std::str::FromStr;

use crate::libs::lift::{AlignmentBlock, ChainMeta, LiftError, Strand};

#[derive(Debug, Clone, Default)]
pub struct ChainHeader {
    pub score: f64,
    pub t_name: String,
    pub t_size: u64,
    pub t_strand: char,
    pub t_start: u64,
    pub t_end: u64,
    pub q_name: String,
    pub q_size: u64,
    pub q_strand: char,
    pub q_start: u64,
    pub q_end: u64,
    pub id: u64,
}

/// One `size dt dq` data line.
#[derive(Debug, Clone, Default)]
pub struct ChainData {
    pub size: u64,
    pub dt: u64,
    pub dq: u64,
}

/// A chain exactly as it appears on the wire: header plus data lines.
#[derive(Debug, Clone, Default)]
pub struct ChainRecord {
    pub header: ChainHeader,
    pub data: Vec<ChainData>,
}

impl ChainRecord {
    /// Convert to model attributes plus absolute-coordinate blocks.
    ///
    /// The cumulative walk starts at `tStart`/`qStart` and advances by
    /// `size + dt` / `size + dq` per line. Reverse-space q coordinates
    /// are flipped to forward numbering (`pos' = qSize - pos`), which
    /// leaves successive target intervals decreasing, as the model
    /// expects for reverse-strand chains.
    ///
    /// Structural problems (bad strand characters, blocks running past
    /// the declared q size, coordinate overflow) come back as
    /// [`LiftError::MalformedChain`] so that tolerant ingestion can skip
    /// the record.
    pub fn to_parts(&self) -> Result<(ChainMeta, Vec<AlignmentBlock>), LiftError> {
        let h = &self.header;
        let id = h.id;
        let malformed = |why: String| LiftError::MalformedChain { id, why };

        if h.t_strand != '+' {
            return Err(malformed(format!(
                "t strand must be '+', got '{}'",
                h.t_strand
            )));
        }
        let target_strand = Strand::from_char(h.q_strand)
            .ok_or_else(|| malformed(format!("invalid q strand '{}'", h.q_strand)))?;

        let mut blocks = Vec::with_capacity(self.data.len());
        let mut t_curr = h.t_start;
        let mut q_curr = h.q_start;
        for d in &self.data {
            let t_end = t_curr
                .checked_add(d.size)
                .ok_or_else(|| malformed("t coordinate overflow".to_string()))?;
            let q_end = q_curr
                .checked_add(d.size)
                .ok_or_else(|| malformed("q coordinate overflow".to_string()))?;

            let (target_start, target_end) = if target_strand.is_reverse() {
                if q_end > h.q_size {
                    return Err(malformed(format!(
                        "block runs past the q size ({} > {})",
                        q_end, h.q_size
                    )));
                }
                (h.q_size - q_end, h.q_size - q_curr)
            } else {
                (q_curr, q_end)
            };
            blocks.push(AlignmentBlock::new(t_curr, t_end, target_start, target_end));

            t_curr = t_end
                .checked_add(d.dt)
                .ok_or_else(|| malformed("t coordinate overflow".to_string()))?;
            q_curr = q_end
                .checked_add(d.dq)
                .ok_or_else(|| malformed("q coordinate overflow".to_string()))?;
        }

        let meta = ChainMeta {
            source_name: h.t_name.clone(),
            source_size: h.t_size,
            target_name: h.q_name.clone(),
            target_size: h.q_size,
            target_strand,
            score: h.score,
            id: h.id,
        };
        Ok((meta, blocks))
    }
}

impl FromStr for ChainHeader {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() < 13 || fields[0] != "chain" {
            return Err(anyhow::anyhow!("invalid chain header line: {}", s));
        }

        let num = |i: usize| -> anyhow::Result<u64> {
            fields[i]
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid number '{}' in chain header", fields[i]))
        };
        let strand = |i: usize| -> anyhow::Result<char> {
            let mut chars = fields[i].chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(anyhow::anyhow!(
                    "invalid strand '{}' in chain header",
                    fields[i]
                )),
            }
        };

        Ok(ChainHeader {
            score: fields[1]
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid score '{}' in chain header", fields[1]))?,
            t_name: fields[2].to_string(),
            t_size: num(3)?,
            t_strand: strand(4)?,
            t_start: num(5)?,
            t_end: num(6)?,
            q_name: fields[7].to_string(),
            q_size: num(8)?,
            q_strand: strand(9)?,
            q_start: num(10)?,
            q_end: num(11)?,
            id: num(12)?,
        })
    }
}

/// Streaming reader over chain-formatted text.
///
/// Yields one [`ChainRecord`] per `chain` stanza. An optional minimum
/// score skips whole chains during reading, header and data lines alike.
pub struct ChainReader<R> {
    reader: std::io::BufReader<R>,
    next_line: Option<String>,
    min_score: Option<f64>,
}

impl ChainReader<Box<dyn std::io::Read>> {
    /// Open a chain file, transparently decompressing `.gz`.
    pub fn from_path(path: &str) -> anyhow::Result<ChainReader<Box<dyn std::io::Read>>> {
        let file = std::fs::File::open(path)?;
        let inner: Box<dyn std::io::Read> = if path.ends_with(".gz") {
            Box::new(flate2::read::MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(ChainReader::new(inner))
    }
}

impl<R: std::io::Read> ChainReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: std::io::BufReader::new(inner),
            next_line: None,
            min_score: None,
        }
    }

    /// Skip chains scoring below `min` while reading.
    pub fn with_min_score(mut self, min: f64) -> Self {
        self.min_score = Some(min);
        self
    }

    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        if let Some(line) = self.next_line.take() {
            return Ok(Some(line));
        }
        let mut buf = String::new();
        let n = self.reader.read_line(&mut buf)?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some(buf))
        }
    }

    fn push_back(&mut self, line: String) {
        self.next_line = Some(line);
    }

    /// One record, or `None` at EOF.
    fn read_record(&mut self) -> anyhow::Result<Option<ChainRecord>> {
        // Find the next header, skipping blanks and comments
        let header_line = loop {
            match self.read_line()? {
                Some(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() || trimmed.starts_with('#') {
                        continue;
                    }
                    if trimmed.starts_with("chain") {
                        break trimmed.to_string();
                    }
                    return Err(anyhow::anyhow!("expected a chain header, got: {}", trimmed));
                }
                None => return Ok(None),
            }
        };

        let header = ChainHeader::from_str(&header_line)?;
        let mut data = Vec::new();

        // Data lines run until a blank line, the next header, or EOF
        loop {
            match self.read_line()? {
                Some(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        break;
                    }
                    if trimmed.starts_with("chain") {
                        self.push_back(line);
                        break;
                    }

                    let fields: Vec<&str> = trimmed.split_whitespace().collect();
                    match fields.len() {
                        1 => data.push(ChainData {
                            size: fields[0].parse()?,
                            dt: 0,
                            dq: 0,
                        }),
                        3 => data.push(ChainData {
                            size: fields[0].parse()?,
                            dt: fields[1].parse()?,
                            dq: fields[2].parse()?,
                        }),
                        _ => {
                            return Err(anyhow::anyhow!("invalid chain data line: {}", trimmed));
                        }
                    }
                }
                None => break,
            }
        }

        Ok(Some(ChainRecord { header, data }))
    }
}

impl<R: std::io::Read> Iterator for ChainReader<R> {
    type Item = anyhow::Result<ChainRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.read_record() {
                Ok(Some(record)) => record,
                Ok(None) => return None,
                Err(e) => return Some(Err(e)),
            };
            if let Some(min) = self.min_score {
                if record.header.score < min {
                    continue;
                }
            }
            return Some(Ok(record));
        }
    }
}

/// All records from a reader, in file order.
pub fn read_chain_records<R: std::io::Read>(reader: R) -> anyhow::Result<Vec<ChainRecord>> {
    ChainReader::new(reader).collect()
}

impl<R: std::io::Read> crate::libs::lift::ChainSource for ChainReader<R> {
    fn next_chain(&mut self) -> Option<anyhow::Result<(ChainMeta, Vec<AlignmentBlock>)>> {
        match self.next() {
            Some(Ok(record)) => Some(record.to_parts().map_err(anyhow::Error::new)),
            Some(Err(e)) => Some(Err(e)),
            None => None,
        }
    }
}
