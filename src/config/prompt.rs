//! Interactive prompts for values that were not given on the command line.
//! Each prompt repeats until the answer is valid; end of input is reported as
//! a missing setting.

use crate::domain::model::OutputFormat;
use crate::utils::error::{ArchiveError, Result};
use crate::utils::validation::{parse_keywords, parse_output_formats, parse_years, validate_target_url};
use std::io::{BufRead, Write};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, field: &str, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ArchiveError::MissingConfigError {
                field: field.to_string(),
            });
        }
        Ok(line.trim().to_string())
    }

    pub fn url(&mut self) -> Result<String> {
        loop {
            let answer = self.ask("url", "Enter URL (must start with http:// or https://): ")?;
            match validate_target_url("url", &answer) {
                Ok(()) => return Ok(answer),
                Err(_) => writeln!(
                    self.output,
                    "Invalid URL. Please enter a valid URL that starts with http:// or https://."
                )?,
            }
        }
    }

    pub fn years(&mut self) -> Result<Vec<u16>> {
        loop {
            let answer = self.ask(
                "years",
                "Enter years to fetch snapshots (comma-separated, e.g., 2004,2008): ",
            )?;
            match parse_years(&answer) {
                Ok(years) => return Ok(years),
                Err(_) => writeln!(
                    self.output,
                    "Invalid years. Please enter a comma-separated list of valid years."
                )?,
            }
        }
    }

    /// An empty answer means no keyword search.
    pub fn keywords(&mut self) -> Result<Vec<String>> {
        let answer = self.ask(
            "keywords",
            "Enter keywords to search for (comma-separated, leave empty to skip): ",
        )?;
        Ok(parse_keywords(&answer))
    }

    pub fn formats(&mut self) -> Result<Vec<OutputFormat>> {
        loop {
            let answer = self.ask(
                "formats",
                "Enter output formats (comma-separated, choose from text, csv, json, html): ",
            )?;
            match parse_output_formats(&answer) {
                Ok(formats) => return Ok(formats),
                Err(_) => writeln!(
                    self.output,
                    "Invalid output formats. Please enter a comma-separated list of valid formats (text, csv, json, html)."
                )?,
            }
        }
    }
}
