//! Quantized weight storage and the `.sense` text format.
//!
//! A weight file is a sequence of sections. A line ending in `:` names the
//! section; the lines that follow hold whitespace separated integers that
//! fill the section's array in row-major order:
//!
//! ```text
//! hidden_layer_1_weights:
//! 12 -7 3 ...
//! hidden_layer_1_bias:
//! ...
//! output_layer_weights:
//! ...
//! output_layer_bias:
//! 41
//! ```
//!
//! Only an unreadable file is fatal. Bad tokens, unknown sections and
//! surplus values are collected in a [`LoadReport`], logged, and skipped;
//! anything the file does not provide stays zero.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use super::{HIDDEN_SIZE, INPUT_SIZE, OUTPUT_SIZE};
use crate::error::WeightError;

/// Parameter arrays of the network, in file order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    /// Input to hidden weights `[INPUT_SIZE][HIDDEN_SIZE]`
    HiddenWeights,
    /// Hidden biases `[HIDDEN_SIZE]`
    HiddenBias,
    /// Hidden to output weights `[HIDDEN_SIZE][OUTPUT_SIZE]`
    OutputWeights,
    /// Output bias `[OUTPUT_SIZE]`
    OutputBias,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::HiddenWeights,
        Section::HiddenBias,
        Section::OutputWeights,
        Section::OutputBias,
    ];

    /// Header name as written in weight files (without the colon)
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Section::HiddenWeights => "hidden_layer_1_weights",
            Section::HiddenBias => "hidden_layer_1_bias",
            Section::OutputWeights => "output_layer_weights",
            Section::OutputBias => "output_layer_bias",
        }
    }

    /// Resolve a header name. Older exports name the output bias `output_layer_1_bias`.
    #[must_use]
    pub fn from_header(name: &str) -> Option<Section> {
        match name {
            "hidden_layer_1_weights" => Some(Section::HiddenWeights),
            "hidden_layer_1_bias" => Some(Section::HiddenBias),
            "output_layer_weights" => Some(Section::OutputWeights),
            "output_layer_bias" | "output_layer_1_bias" => Some(Section::OutputBias),
            _ => None,
        }
    }

    /// Number of values the section holds
    #[must_use]
    pub const fn capacity(self) -> usize {
        match self {
            Section::HiddenWeights => INPUT_SIZE * HIDDEN_SIZE,
            Section::HiddenBias => HIDDEN_SIZE,
            Section::OutputWeights => HIDDEN_SIZE * OUTPUT_SIZE,
            Section::OutputBias => OUTPUT_SIZE,
        }
    }

    const fn slot(self) -> usize {
        match self {
            Section::HiddenWeights => 0,
            Section::HiddenBias => 1,
            Section::OutputWeights => 2,
            Section::OutputBias => 3,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Non-fatal problem found while reading a weight file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadWarning {
    /// Token that is not a 32-bit signed integer
    InvalidToken { line: usize, token: String },
    /// Header that names no known section; its values are discarded
    UnknownSection { line: usize, name: String },
    /// More values than the section holds; the rest are discarded
    SectionOverflow {
        line: usize,
        section: Section,
        capacity: usize,
    },
    /// Values appearing before any section header
    ValuesOutsideSection { line: usize, count: usize },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::InvalidToken { line, token } => {
                write!(f, "line {line}: skipping invalid value '{token}'")
            }
            LoadWarning::UnknownSection { line, name } => {
                write!(f, "line {line}: unknown section '{name}', values ignored")
            }
            LoadWarning::SectionOverflow {
                line,
                section,
                capacity,
            } => write!(
                f,
                "line {line}: section '{section}' holds {capacity} values, ignoring the rest"
            ),
            LoadWarning::ValuesOutsideSection { line, count } => {
                write!(f, "line {line}: {count} values before any section header")
            }
        }
    }
}

/// Outcome of a load that did not fail outright.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    warnings: Vec<LoadWarning>,
    filled: [usize; 4],
}

impl LoadReport {
    #[must_use]
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// True when the file parsed without any warning
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Number of leading slots of `section` written from the file
    #[must_use]
    pub fn filled(&self, section: Section) -> usize {
        self.filled[section.slot()]
    }

    /// True when every section was filled to capacity
    #[must_use]
    pub fn is_complete(&self) -> bool {
        Section::ALL
            .iter()
            .all(|&s| self.filled(s) == s.capacity())
    }

    fn warn(&mut self, warning: LoadWarning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }
}

/// Quantized network parameters.
///
/// Built once by a load, then only read. Values are the trained floats
/// multiplied by [`Q`](super::Q) and rounded.
#[derive(Clone, PartialEq, Eq)]
pub struct WeightStore {
    hidden_weights: Box<[[i32; HIDDEN_SIZE]; INPUT_SIZE]>,
    hidden_bias: [i32; HIDDEN_SIZE],
    output_weights: [[i32; OUTPUT_SIZE]; HIDDEN_SIZE],
    output_bias: [i32; OUTPUT_SIZE],
}

impl WeightStore {
    /// Store with every parameter set to zero
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            hidden_weights: Box::new([[0; HIDDEN_SIZE]; INPUT_SIZE]),
            hidden_bias: [0; HIDDEN_SIZE],
            output_weights: [[0; OUTPUT_SIZE]; HIDDEN_SIZE],
            output_bias: [0; OUTPUT_SIZE],
        }
    }

    /// Store whose value at flat index `i` of `section` is `f(section, i)`.
    #[must_use]
    pub fn from_fn(mut f: impl FnMut(Section, usize) -> i32) -> Self {
        let mut store = Self::zeroed();
        for section in Section::ALL {
            for (i, slot) in store.section_mut(section).iter_mut().enumerate() {
                *slot = f(section, i);
            }
        }
        store
    }

    /// Load weights from a file, logging any warnings.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WeightError> {
        Self::load_with_report(path).map(|(store, _)| store)
    }

    /// Load weights from a file and return the warnings alongside.
    pub fn load_with_report<P: AsRef<Path>>(path: P) -> Result<(Self, LoadReport), WeightError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| WeightError::io(path, e))?;
        let (store, report) =
            Self::from_reader(BufReader::new(file)).map_err(|e| WeightError::io(path, e))?;

        if report.is_complete() && report.is_clean() {
            log::info!("Loaded weights from {}", path.display());
        } else {
            log::warn!(
                "Loaded weights from {} with {} warnings ({} of {} hidden weights)",
                path.display(),
                report.warnings().len(),
                report.filled(Section::HiddenWeights),
                Section::HiddenWeights.capacity()
            );
        }
        Ok((store, report))
    }

    /// Parse weights from any buffered reader.
    ///
    /// Fails only on I/O errors. Bytes that are not UTF-8 are decoded
    /// lossily, so the token holding them is reported as invalid.
    pub fn from_reader<R: BufRead>(mut reader: R) -> io::Result<(Self, LoadReport)> {
        let mut parser = Parser::new();
        let mut buf = Vec::new();
        let mut line_no = 0;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;
            parser.feed_line(line_no, &String::from_utf8_lossy(&buf));
        }
        Ok(parser.finish())
    }

    /// Parse weights from an in-memory string.
    #[must_use]
    pub fn parse_str(text: &str) -> (Self, LoadReport) {
        let mut parser = Parser::new();
        for (i, line) in text.lines().enumerate() {
            parser.feed_line(i + 1, line);
        }
        parser.finish()
    }

    /// Write the store in the text format, one value per line.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write!(writer, "{self}")
    }

    /// Write the store to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WeightError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| WeightError::io(path, e))?;
        let mut writer = io::BufWriter::new(file);
        self.write_to(&mut writer)
            .and_then(|()| writer.flush())
            .map_err(|e| WeightError::io(path, e))
    }

    #[inline]
    #[must_use]
    pub fn hidden_weights(&self) -> &[[i32; HIDDEN_SIZE]; INPUT_SIZE] {
        &self.hidden_weights
    }

    #[inline]
    #[must_use]
    pub fn hidden_bias(&self) -> &[i32; HIDDEN_SIZE] {
        &self.hidden_bias
    }

    #[inline]
    #[must_use]
    pub fn output_weights(&self) -> &[[i32; OUTPUT_SIZE]; HIDDEN_SIZE] {
        &self.output_weights
    }

    #[inline]
    #[must_use]
    pub fn output_bias(&self) -> &[i32; OUTPUT_SIZE] {
        &self.output_bias
    }

    /// Flat row-major view of one section
    #[must_use]
    pub fn section(&self, section: Section) -> &[i32] {
        match section {
            Section::HiddenWeights => self.hidden_weights.as_flattened(),
            Section::HiddenBias => &self.hidden_bias,
            Section::OutputWeights => self.output_weights.as_flattened(),
            Section::OutputBias => &self.output_bias,
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut [i32] {
        match section {
            Section::HiddenWeights => self.hidden_weights.as_flattened_mut(),
            Section::HiddenBias => &mut self.hidden_bias,
            Section::OutputWeights => self.output_weights.as_flattened_mut(),
            Section::OutputBias => &mut self.output_bias,
        }
    }

    /// True if no parameter is set
    #[must_use]
    pub fn is_zero(&self) -> bool {
        Section::ALL
            .iter()
            .all(|&s| self.section(s).iter().all(|&v| v == 0))
    }
}

impl Default for WeightStore {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl fmt::Debug for WeightStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nonzero = |s: Section| self.section(s).iter().filter(|&&v| v != 0).count();
        f.debug_struct("WeightStore")
            .field("hidden_weights_nonzero", &nonzero(Section::HiddenWeights))
            .field("hidden_bias", &self.hidden_bias)
            .field("output_weights", &self.output_weights)
            .field("output_bias", &self.output_bias)
            .finish()
    }
}

impl fmt::Display for WeightStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in Section::ALL {
            writeln!(f, "{}:", section.name())?;
            for value in self.section(section) {
                writeln!(f, "{value}")?;
            }
        }
        Ok(())
    }
}

/// Where values on the current line go.
enum Cursor {
    /// No header seen yet
    Idle,
    /// Filling a known section starting at `next`
    Filling {
        section: Section,
        next: usize,
        overflowed: bool,
    },
    /// Inside an unrecognised section
    Discarding,
}

struct Parser {
    store: WeightStore,
    report: LoadReport,
    cursor: Cursor,
}

impl Parser {
    fn new() -> Self {
        Self {
            store: WeightStore::zeroed(),
            report: LoadReport::default(),
            cursor: Cursor::Idle,
        }
    }

    fn feed_line(&mut self, line_no: usize, line: &str) {
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }

        if let Some(name) = line.strip_suffix(':') {
            let name = name.trim();
            self.cursor = match Section::from_header(name) {
                Some(section) => Cursor::Filling {
                    section,
                    next: 0,
                    overflowed: false,
                },
                None => {
                    self.report.warn(LoadWarning::UnknownSection {
                        line: line_no,
                        name: name.to_string(),
                    });
                    Cursor::Discarding
                }
            };
            return;
        }

        let mut orphans = 0;
        for token in line.split_whitespace() {
            let value = match token.parse::<i32>() {
                Ok(v) => v,
                Err(_) => {
                    self.report.warn(LoadWarning::InvalidToken {
                        line: line_no,
                        token: token.to_string(),
                    });
                    continue;
                }
            };

            match &mut self.cursor {
                Cursor::Idle => orphans += 1,
                Cursor::Discarding => {}
                Cursor::Filling {
                    section,
                    next,
                    overflowed,
                } => {
                    let slots = self.store.section_mut(*section);
                    if let Some(slot) = slots.get_mut(*next) {
                        *slot = value;
                        *next += 1;
                        let filled = &mut self.report.filled[section.slot()];
                        *filled = (*filled).max(*next);
                    } else if !*overflowed {
                        *overflowed = true;
                        self.report.warn(LoadWarning::SectionOverflow {
                            line: line_no,
                            section: *section,
                            capacity: section.capacity(),
                        });
                    }
                }
            }
        }

        if orphans > 0 {
            self.report.warn(LoadWarning::ValuesOutsideSection {
                line: line_no,
                count: orphans,
            });
        }
    }

    fn finish(self) -> (WeightStore, LoadReport) {
        (self.store, self.report)
    }
}
