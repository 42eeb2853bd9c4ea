use colored::Colorize;
use std::io::{BufRead, Write};
use wreckroad_game::Chooser;

/// Prompts on a writer and reads 1-based picks from a reader.
///
/// `q`, an empty line or end of input abandons the run; anything else that
/// does not parse is asked again.
pub struct PromptChooser<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptChooser<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, prompt: &str, options: &[String]) -> std::io::Result<Option<usize>> {
        writeln!(self.output, "{}", prompt.bright_white().bold())?;
        for (idx, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {option}", idx + 1)?;
        }
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let answer = line.trim();
            if answer.is_empty() || answer.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            match answer.parse::<usize>() {
                Ok(pick) if (1..=options.len()).contains(&pick) => return Ok(Some(pick - 1)),
                _ => writeln!(
                    self.output,
                    "{}",
                    format!("pick a number from 1 to {}", options.len()).yellow()
                )?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Chooser for PromptChooser<R, W> {
    fn select_one(&mut self, prompt: &str, options: &[String]) -> Option<usize> {
        match self.ask(prompt, options) {
            Ok(pick) => pick,
            Err(err) => {
                log::warn!("prompt failed: {err}");
                None
            }
        }
    }
}
