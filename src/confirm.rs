use std::io::{BufRead, Write};

use crate::errors::Result;

/// Ask a yes/no question over the given streams; the default answer is
/// no. Only `y`/`yes` (any case) confirm.
pub fn confirm(prompt: &str, input: &mut dyn BufRead, output: &mut dyn Write) -> Result<bool> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
