use log::error;
use std::io::Write;

use crate::checker::CheckResult;
use crate::output::{render_line, Outputs};

/// Writes the status line where the supervisor reads it, normally stdout.
pub struct PrintOutput<'a> {
    title: String,
    out: &'a mut dyn Write,
}

impl<'a> PrintOutput<'a> {
    pub fn new(title: &str, out: &'a mut dyn Write) -> Self {
        Self {
            title: title.to_string(),
            out,
        }
    }
}

impl Outputs for PrintOutput<'_> {
    fn process_probe(&mut self, probe: &CheckResult) {
        if let Err(err) = writeln!(self.out, "{}", render_line(&self.title, probe)) {
            error!("Failed to write status line: {}", err);
        }
    }
}
