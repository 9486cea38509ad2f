use std::io::{self, Write};
use std::path::PathBuf;

use crate::nnue::DEFAULT_EVAL_FILE;

pub enum UciOptionAction {
    ReloadWeights(PathBuf),
}

pub struct UciOptions {
    pub eval_file: PathBuf,
}

impl UciOptions {
    #[must_use]
    pub fn new(eval_file: impl Into<PathBuf>) -> Self {
        UciOptions {
            eval_file: eval_file.into(),
        }
    }

    pub fn print<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name sensenet {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(
            out,
            "option name EvalFile type string default {}",
            self.eval_file.display()
        )?;
        writeln!(out, "uciok")
    }

    pub fn apply_setoption(&mut self, name: &str, value: Option<&str>) -> Option<UciOptionAction> {
        let normalized = name.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "evalfile" => {
                let path = PathBuf::from(value?.trim());
                self.eval_file.clone_from(&path);
                Some(UciOptionAction::ReloadWeights(path))
            }
            _ => None,
        }
    }
}

impl Default for UciOptions {
    fn default() -> Self {
        Self::new(DEFAULT_EVAL_FILE)
    }
}

#[must_use]
pub fn parse_setoption(parts: &[&str]) -> Option<(String, Option<String>)> {
    if parts.is_empty() || parts[0] != "setoption" {
        return None;
    }

    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut mode = "";

    for part in parts.iter().skip(1) {
        match *part {
            "name" if mode != "value" => mode = "name",
            "value" if mode == "name" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(part),
                "value" => value_parts.push(part),
                _ => {}
            },
        }
    }

    if name_parts.is_empty() {
        return None;
    }

    let name = name_parts.join(" ");
    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };

    Some((name, value))
}
