//! Overwrite confirmation prompt, reproducing the original tool's
//! `prompt_yes_no`: a blank line counts as "yes".

use std::io::{self, Write};

pub fn confirm_overwrite(path: &std::path::Path) -> io::Result<bool> {
    print!(
        "file {} already exists, overwrite? [Y/n] ",
        path.display()
    );
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let answer = line.trim();

    Ok(answer.is_empty() || answer.eq_ignore_ascii_case("y"))
}
