//! Invocation-time questions: where to write the table and how far to move.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use jv_rig::LengthUnit;
use thiserror::Error;

pub const DEFAULT_TABLE_NAME: &str = "params.csv";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("not a valid movement: {input:?}")]
    InvalidMovement { input: String },
}

/// Line-oriented prompts over any reader/writer pair.
pub struct Prompter<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask `question`; an empty answer takes `default`.
    ///
    /// Returns `None` when input is closed before an answer, which callers
    /// treat as the user cancelling.
    pub fn ask(&mut self, question: &str, default: &str) -> Result<Option<String>, PromptError> {
        write!(self.output, "{question} [{default}]: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let answer = line.trim();
        if answer.is_empty() {
            Ok(Some(default.to_string()))
        } else {
            Ok(Some(answer.to_string()))
        }
    }

    pub fn destination(&mut self) -> Result<Option<PathBuf>, PromptError> {
        Ok(self
            .ask("File to save parameter values to", DEFAULT_TABLE_NAME)?
            .map(PathBuf::from))
    }

    pub fn movement(&mut self, unit: LengthUnit, default: &str) -> Result<Option<String>, PromptError> {
        self.ask(&format!("How much should the slider move? [{unit}]"), default)
    }
}

/// Parse a movement typed in `input_unit` and convert it to `native`.
pub fn parse_movement(
    text: &str,
    input_unit: LengthUnit,
    native: LengthUnit,
) -> Result<f64, PromptError> {
    let value: f64 = text
        .trim()
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| PromptError::InvalidMovement {
            input: text.to_string(),
        })?;
    Ok(input_unit.convert(value, native))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompter(input: &str) -> Prompter<&[u8], Vec<u8>> {
        Prompter::new(input.as_bytes(), Vec::new())
    }

    #[test]
    fn answer_is_trimmed() {
        let mut p = prompter("  out.csv \n");
        assert_eq!(p.ask("File", "params.csv").unwrap().as_deref(), Some("out.csv"));
        assert_eq!(String::from_utf8(p.output).unwrap(), "File [params.csv]: ");
    }

    #[test]
    fn empty_answer_takes_default() {
        let mut p = prompter("\n");
        assert_eq!(
            p.movement(LengthUnit::Millimeter, "10").unwrap().as_deref(),
            Some("10")
        );
        assert_eq!(
            String::from_utf8(p.output).unwrap(),
            "How much should the slider move? [mm] [10]: "
        );
    }

    #[test]
    fn closed_input_cancels() {
        let mut p = prompter("");
        assert!(p.destination().unwrap().is_none());
    }

    #[test]
    fn destination_default() {
        let mut p = prompter("\n");
        assert_eq!(p.destination().unwrap(), Some(PathBuf::from("params.csv")));
    }

    #[test]
    fn movement_converted_to_native() {
        let cm = parse_movement("10", LengthUnit::Millimeter, LengthUnit::Centimeter).unwrap();
        assert!((cm - 1.0).abs() < 1e-12);
        let cm = parse_movement(" -25 ", LengthUnit::Millimeter, LengthUnit::Centimeter).unwrap();
        assert!((cm + 2.5).abs() < 1e-12);
    }

    #[test]
    fn invalid_movement_rejected() {
        for bad in ["ten", "", "NaN", "inf"] {
            let err = parse_movement(bad, LengthUnit::Millimeter, LengthUnit::Centimeter)
                .unwrap_err();
            assert!(matches!(err, PromptError::InvalidMovement { .. }), "{bad}");
        }
    }
}
