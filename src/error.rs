use crate::util::{Code, Position};
use crate::{GrammarError, NonTerminal, SyntaxError, SyntaxErrorReason};
use std::fmt::{Display, Formatter};
use std::ops::Range;

impl GrammarError {
    pub fn new(what: String, message: String) -> Self {
        Self { message, what }
    }
}

impl Display for GrammarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GrammarError: {}-{}", self.what, self.message)
    }
}

impl std::error::Error for GrammarError {}

impl SyntaxError {
    pub fn new(range: Range<usize>, reason: SyntaxErrorReason) -> Self {
        Self {
            range,
            reason,
            context: Vec::new(),
        }
    }

    pub(crate) fn with_context(
        range: Range<usize>,
        reason: SyntaxErrorReason,
        mut context: Vec<NonTerminal>,
    ) -> Self {
        context.sort_unstable();
        context.dedup();
        Self {
            range,
            reason,
            context,
        }
    }

    /// The line and column of the error in the parsed input.
    pub fn position(&self, code: &Code) -> Position {
        code.obtain_position(self.range.start)
    }
}

impl Display for SyntaxErrorReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SyntaxErrorReason::UnknownToken => write!(f, "unknown token"),
            SyntaxErrorReason::UnexpectedToken => write!(f, "unexpected token"),
            SyntaxErrorReason::UnmatchedPattern => write!(f, "unmatched pattern"),
            SyntaxErrorReason::EmptyNotAllowed => write!(f, "empty input is not allowed"),
        }
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SyntaxError: {} at {}..{}",
            self.reason, self.range.start, self.range.end
        )?;
        if !self.context.is_empty() {
            write!(f, ", expected")?;
            for (index, non_terminal) in self.context.iter().enumerate() {
                if index != 0 {
                    write!(f, ",")?;
                }
                write!(f, " {}", non_terminal)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for SyntaxError {}
