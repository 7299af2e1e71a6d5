//! Parser for the combinational subset of the Berkeley Logic Interchange Format (BLIF).
//!
//! Each `.names` cover must have a single output and describe a function that matches
//! one of the gate tags at its arity.

use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use crate::{
    Circuit, Gate, GateKind, Result, TruthTable, circuit::MAX_NAMED_ARITY, error::ParserError,
};

fn invalid(line: usize, message: String) -> ParserError {
    ParserError::InvalidToken {
        line: Some(line),
        message,
    }
}

/// A line once comments are stripped and continuations joined, with the number of the
/// first physical line it spans.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogicalLine {
    number: usize,
    text: String,
}

fn logical_lines(reader: impl BufRead) -> std::result::Result<Vec<LogicalLine>, ParserError> {
    let mut lines = Vec::new();
    let mut pending: Option<LogicalLine> = None;
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ParserError::IoError(e.to_string()))?;
        let content = match line.find('#') {
            Some(start) => &line[..start],
            None => &line[..],
        };
        let (content, continued) = match content.trim_end().strip_suffix('\\') {
            Some(head) => (head, true),
            None => (content, false),
        };
        let current = pending.get_or_insert_with(|| LogicalLine {
            number: i + 1,
            text: String::new(),
        });
        current.text.push(' ');
        current.text.push_str(content);
        if !continued {
            if let Some(done) = pending.take() {
                if !done.text.trim().is_empty() {
                    lines.push(done);
                }
            }
        }
    }
    if let Some(done) = pending.take() {
        if !done.text.trim().is_empty() {
            lines.push(done);
        }
    }
    Ok(lines)
}

/// A `.names` block being read.
#[derive(Debug, Clone)]
struct Cover {
    line: usize,
    fanins: Vec<String>,
    output: String,
    cubes: Vec<String>,
    /// Output value shared by every row, once the first row was read.
    phase: Option<bool>,
}

impl Cover {
    fn new(line: usize, mut signals: Vec<String>) -> std::result::Result<Self, ParserError> {
        let output = signals
            .pop()
            .ok_or_else(|| invalid(line, "expected at least one signal after .names".to_string()))?;
        Ok(Cover {
            line,
            fanins: signals,
            output,
            cubes: Vec::new(),
            phase: None,
        })
    }

    fn add_row(&mut self, line: usize, tokens: &[&str]) -> std::result::Result<(), ParserError> {
        let (cube, value) = match (self.fanins.is_empty(), tokens) {
            (true, [value]) => ("", *value),
            // Some writers leave out the output column of on-set rows
            (false, [cube]) => (*cube, "1"),
            (false, [cube, value]) => (*cube, *value),
            _ => {
                return Err(invalid(
                    line,
                    format!("malformed row for {}: {}", self.output, tokens.join(" ")),
                ));
            }
        };
        if cube.len() != self.fanins.len() {
            return Err(invalid(
                line,
                format!(
                    "cube {} has {} entries, expected {}",
                    cube,
                    cube.len(),
                    self.fanins.len()
                ),
            ));
        }
        if let Some(c) = cube.chars().find(|c| !matches!(c, '0' | '1' | '-')) {
            return Err(invalid(line, format!("invalid cube character '{}'", c)));
        }
        let value = match value {
            "1" => true,
            "0" => false,
            _ => return Err(invalid(line, format!("invalid output value {}", value))),
        };
        match self.phase {
            Some(phase) if phase != value => {
                return Err(invalid(
                    line,
                    format!("cover of {} mixes on-set and off-set rows", self.output),
                ));
            }
            _ => self.phase = Some(value),
        }
        self.cubes.push(cube.to_string());
        Ok(())
    }

    fn truth_table(&self) -> std::result::Result<TruthTable, ParserError> {
        let arity = self.fanins.len();
        if arity > MAX_NAMED_ARITY {
            return Err(ParserError::UnsupportedFunction {
                line: Some(self.line),
                message: format!(
                    "{} has {} inputs, at most {} are supported",
                    self.output, arity, MAX_NAMED_ARITY
                ),
            });
        }
        // Without rows the function is constant 0, whatever the declared phase.
        let phase = self.phase.unwrap_or(true);
        Ok(TruthTable::from_fn(arity, |row| {
            let covered = self.cubes.iter().any(|cube| {
                cube.chars().enumerate().all(|(i, c)| {
                    let bit = (row >> (arity - 1 - i)) & 1 == 1;
                    match c {
                        '0' => !bit,
                        '1' => bit,
                        _ => true,
                    }
                })
            });
            covered == phase
        }))
    }

    fn into_gate(self) -> std::result::Result<Gate, ParserError> {
        let table = self.truth_table()?;
        let kind = GateKind::from_table(&table).ok_or_else(|| ParserError::UnsupportedFunction {
            line: Some(self.line),
            message: format!("{} computes {} which matches no gate tag", self.output, table),
        })?;
        Ok(Gate::new(self.output, kind, self.fanins))
    }
}

impl Circuit {
    /// Parses a circuit from a BLIF description.
    ///
    /// ```rust
    /// use rectify::{Circuit, GateKind};
    /// let blif = "
    /// .model half_adder
    /// .inputs a b
    /// .outputs s c
    /// .names a b s
    /// 10 1
    /// 01 1
    /// .names a b c
    /// 11 1
    /// .end
    /// ";
    /// let circuit = Circuit::from_blif_str(blif).unwrap();
    /// assert_eq!(circuit.get_name(), "half_adder");
    /// assert_eq!(circuit.get_gate("s").unwrap().get_kind(), GateKind::Xor);
    /// ```
    pub fn from_blif_str(text: &str) -> Result<Self> {
        Circuit::from_blif(BufReader::new(text.as_bytes()))
    }

    /// Parses a circuit from a reader over a BLIF description.
    pub fn from_blif(reader: BufReader<impl Read>) -> Result<Self> {
        let lines = logical_lines(reader)?;

        let mut name = String::from("top");
        let mut inputs: Vec<String> = Vec::new();
        let mut outputs: Vec<String> = Vec::new();
        let mut gates: Vec<Gate> = Vec::new();
        let mut cover: Option<Cover> = None;

        for LogicalLine { number, text } in &lines {
            let tokens: Vec<&str> = text.split_whitespace().collect();
            let Some(&head) = tokens.first() else {
                continue;
            };
            if !head.starts_with('.') {
                match cover.as_mut() {
                    Some(cover) => cover.add_row(*number, &tokens)?,
                    None => {
                        return Err(
                            invalid(*number, format!("row {} outside of a .names", text.trim()))
                                .into(),
                        );
                    }
                }
                continue;
            }

            // Any directive ends the current cover
            if let Some(done) = cover.take() {
                gates.push(done.into_gate()?);
            }
            let signals: Vec<String> = tokens[1..].iter().map(|s| s.to_string()).collect();
            match head {
                ".model" => {
                    if let Some(model) = tokens.get(1) {
                        name = model.to_string();
                    }
                }
                ".inputs" => inputs.extend(signals),
                ".outputs" => outputs.extend(signals),
                ".names" => cover = Some(Cover::new(*number, signals)?),
                ".end" => break,
                ".latch" | ".subckt" | ".gate" | ".mlatch" => {
                    return Err(ParserError::UnsupportedFeature {
                        line: Some(*number),
                        message: format!(
                            "{} (only combinational .names covers are supported)",
                            head
                        ),
                    }
                    .into());
                }
                _ => log::debug!("line {}: ignoring directive {}", number, head),
            }
        }
        if let Some(done) = cover.take() {
            gates.push(done.into_gate()?);
        }

        Circuit::build(name, inputs, outputs, gates)
    }

    /// Reads a circuit from a `.blif` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("blif") => {
                let f =
                    File::open(path.as_ref()).map_err(|e| ParserError::IoError(e.to_string()))?;
                Circuit::from_blif(BufReader::new(f))
            }
            _ => Err(ParserError::IoError("invalid extension, expected .blif".to_string()).into()),
        }
    }
}
