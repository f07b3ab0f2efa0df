// ABOUTME: Shared error-reporting sink for the lex/parse/resolve pipeline
// Collects static errors with their source line so the pipeline can keep
// going after a bad token or statement instead of aborting on the first one.
// The `debug!` calls here are ambient instrumentation only; the caller that
// owns the pipeline (src/main.rs, src/import.rs) is the single place that
// prints these errors for the user, via `errors()`.

use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct StaticError {
    pub line: usize,
    pub location: String,
    pub message: String,
}

/// Accumulates static (lex/parse/resolve) errors across a single run of the
/// pipeline. Shared by reference between the lexer, parser, and resolver.
#[derive(Debug, Default)]
pub struct Reporter {
    errors: Vec<StaticError>,
}

impl Reporter {
    pub fn new() -> Self {
        Reporter::default()
    }

    pub fn error(&mut self, line: usize, message: impl Into<String>) {
        self.report(line, String::new(), message);
    }

    pub fn error_at(&mut self, line: usize, location: impl Into<String>, message: impl Into<String>) {
        self.report(line, location.into(), message);
    }

    fn report(&mut self, line: usize, location: String, message: impl Into<String>) {
        let message = message.into();
        let where_ = if location.is_empty() {
            String::new()
        } else {
            format!(" {}", location)
        };
        debug!(line, "[line {}] Error{}: {}", line, where_, message);
        self.errors.push(StaticError {
            line,
            location,
            message,
        });
    }

    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[StaticError] {
        &self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clean() {
        let reporter = Reporter::new();
        assert!(!reporter.had_error());
    }

    #[test]
    fn records_errors() {
        let mut reporter = Reporter::new();
        reporter.error(3, "Unexpected character");
        assert!(reporter.had_error());
        assert_eq!(reporter.errors().len(), 1);
        assert_eq!(reporter.errors()[0].line, 3);
    }
}
