use colored::Colorize;

use crate::{
    error::SubmissionFailure,
    fmt_kv,
    LogColor,
};

/// Renders a decoded [`SubmissionFailure`] as an indented error block.
pub struct PrettyInstructionError<'a> {
    pub failure: &'a SubmissionFailure,
    pub indent_size: usize,
}

impl<'a> PrettyInstructionError<'a> {
    pub fn new(failure: &'a SubmissionFailure) -> Self {
        Self {
            failure,
            indent_size: 2,
        }
    }
}

impl core::fmt::Display for PrettyInstructionError<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let indent = " ".repeat(self.indent_size);
        let failure = self.failure;

        writeln!(f, "{}", "Transaction failed".color(LogColor::Error).bold())?;
        if let Some(index) = failure.instruction_index {
            writeln!(f, "{indent}{}", fmt_kv!("Instruction", index, LogColor::Error))?;
        }
        if let Some(program) = failure.program_id {
            writeln!(f, "{indent}{}", fmt_kv!("Program", program, LogColor::Error))?;
        }
        if let Some(code) = failure.code {
            writeln!(f, "{indent}{}", fmt_kv!("Code", code, LogColor::Error))?;
        }
        writeln!(
            f,
            "{indent}{}",
            fmt_kv!("Reason", failure.message, LogColor::Error, LogColor::Warning)
        )
    }
}
