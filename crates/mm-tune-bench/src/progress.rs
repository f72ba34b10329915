//! Interactive progress spinner for the bench loop. Deliberately not
//! routed through `tracing` -- it's a raw terminal affordance for a human
//! watching the bench run, not a structured log event.

use std::io::Write;

const SPINNER_CHARS: [char; 4] = ['|', '/', '-', '\\'];

/// Prints one spinner glyph per sample taken for a single `(shape, M)`
/// point, then erases everything it printed (plus slack) before the next
/// point starts.
pub struct Spinner {
    printed: usize,
}

impl Spinner {
    pub fn new() -> Self {
        Self { printed: 0 }
    }

    /// Advance the spinner for sample `i` of `n` total samples at this
    /// M-point. Prints a trailing `.` on the final sample instead of a
    /// spinner glyph.
    pub fn sample(&mut self, i: usize, n: usize) {
        if self.printed > 0 {
            print!("\u{8}");
        }
        if n == 0 || i + 1 >= n {
            print!(".");
        } else {
            print!("{}", SPINNER_CHARS[i % SPINNER_CHARS.len()]);
        }
        let _ = std::io::stdout().flush();
        self.printed += 1;
    }

    /// Erase every glyph this spinner printed, plus 20 slack characters
    /// to absorb stray keystrokes -- the original tool's `line_len + 20`
    /// backspace loop.
    pub fn finish(&mut self) {
        let erase_count = self.printed + 20;
        for _ in 0..erase_count {
            print!("\u{8} \u{8}");
        }
        let _ = std::io::stdout().flush();
        self.printed = 0;
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_printed_count_until_finished() {
        let mut spinner = Spinner::new();
        spinner.sample(0, 3);
        spinner.sample(1, 3);
        spinner.sample(2, 3);
        assert_eq!(spinner.printed, 3);
        spinner.finish();
        assert_eq!(spinner.printed, 0);
    }
}
