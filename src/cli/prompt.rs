//! Interactive prompts for paths missing from configuration

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

pub const SOURCE_PROMPT: &str = "Enter the full path to the main folder containing video subfolders:\n> ";
pub const OUTPUT_PROMPT: &str =
    "Enter the full path for the output directory where merged videos will be saved:\n> ";

/// Ask for one path; an empty answer is an error
pub fn ask_path<R, W>(input: &mut R, output: &mut W, question: &str) -> Result<PathBuf>
where
    R: BufRead,
    W: Write,
{
    output.write_all(question.as_bytes())?;
    output.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read answer from standard input")?;

    let answer = answer.trim();
    if answer.is_empty() {
        bail!("both the main source path and the output path are required");
    }
    Ok(PathBuf::from(answer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_ask_path_trims_answer() {
        let mut input = Cursor::new("  /videos/in \n");
        let mut output = Vec::new();
        let path = ask_path(&mut input, &mut output, SOURCE_PROMPT).unwrap();
        assert_eq!(path, PathBuf::from("/videos/in"));
        assert_eq!(String::from_utf8(output).unwrap(), SOURCE_PROMPT);
    }

    #[test]
    fn test_ask_path_rejects_empty_answer() {
        let mut input = Cursor::new("\n");
        let mut output = Vec::new();
        assert!(ask_path(&mut input, &mut output, OUTPUT_PROMPT).is_err());

        let mut closed = Cursor::new("");
        assert!(ask_path(&mut closed, &mut output, OUTPUT_PROMPT).is_err());
    }
}
