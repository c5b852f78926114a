//! Structured compiler errors recovered from Maven console output.
//!
//! Maven repeats every compiler error in its closing summary, after the
//! `Finished at:` banner and before the `[ERROR] -> [Help 1]` remark:
//!
//! ```text
//! [INFO] Finished at: 2024-01-01T00:00:00Z
//! [ERROR] /src/Foo.java:[10,5] cannot find symbol
//! [ERROR]   symbol:   class Bar
//! [ERROR]   location: class Foo
//! [ERROR] -> [Help 1]
//! ```
//!
//! Each `[ERROR] /path:[line,column] message` line opens a diagnostic; the
//! `[ERROR] key: value` lines up to the next one become its parameters.

use std::fmt;
use std::iter::Peekable;

use indexmap::IndexMap;
use serde::Serialize;

/// Line prefix of a compiler error anchored to an absolute source path.
const ANCHOR: &str = "[ERROR] /";
/// Maven's closing remark for its error summary.
const CLOSER: &str = "[ERROR] -> [Help 1]";
/// Banner opening the build summary.
const SUMMARY_BANNER: &str = "Finished at:";
const ERROR_TAG: &str = "[ERROR]";

/// One compiler error reported by the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationDiagnostic {
    /// Source file as printed by the compiler.
    pub source_path: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    pub message: String,
    /// Extra `key: value` detail lines (e.g. `symbol`, `location`) in first-seen order.
    pub parameters: IndexMap<String, String>,
}

impl fmt::Display for CompilationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} {{",
            self.source_path, self.line, self.column, self.message
        )?;
        for (i, (key, value)) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SummaryState {
    BeforeSummary,
    InSummary,
    /// Terminal.
    Closed,
}

/// Iterator adaptor turning console lines into [`CompilationDiagnostic`]s.
///
/// Lines are pulled lazily. Once the summary is closed no further input is
/// read, so a caller streaming from a live process must drain it separately.
#[derive(Debug)]
pub struct DiagnosticExtractor<I: Iterator<Item = String>> {
    lines: Peekable<I>,
    state: SummaryState,
}

/// Extract diagnostics from a sequence of console lines.
pub fn extract_diagnostics<I>(lines: I) -> DiagnosticExtractor<I::IntoIter>
where
    I: IntoIterator<Item = String>,
{
    DiagnosticExtractor::new(lines.into_iter())
}

impl<I: Iterator<Item = String>> DiagnosticExtractor<I> {
    pub fn new(lines: I) -> Self {
        Self {
            lines: lines.peekable(),
            state: SummaryState::BeforeSummary,
        }
    }

    fn observe(&mut self, line: &str) {
        self.state = match self.state {
            SummaryState::BeforeSummary if line.contains(SUMMARY_BANNER) => SummaryState::InSummary,
            SummaryState::InSummary if line.starts_with(CLOSER) => SummaryState::Closed,
            other => other,
        };
    }

    /// Consume parameter lines up to, not including, the next anchor or the closer.
    fn capture_parameters(&mut self) -> IndexMap<String, String> {
        let mut parameters = IndexMap::new();
        while let Some(line) = self
            .lines
            .next_if(|l| !l.starts_with(ANCHOR) && !l.starts_with(CLOSER))
        {
            if let Some((key, value)) = parse_parameter(&line) {
                parameters.insert(key.to_owned(), value.to_owned());
            } else {
                tracing::debug!(line = %line, "skipping unrecognized error detail line");
            }
        }
        parameters
    }
}

impl<I: Iterator<Item = String>> Iterator for DiagnosticExtractor<I> {
    type Item = CompilationDiagnostic;

    fn next(&mut self) -> Option<CompilationDiagnostic> {
        while self.state != SummaryState::Closed {
            let line = self.lines.next()?;
            self.observe(&line);
            if self.state != SummaryState::InSummary || !line.starts_with(ANCHOR) {
                continue;
            }

            let Some(located) = parse_located(&line) else {
                tracing::debug!(line = %line, "skipping unparseable error line");
                continue;
            };
            let parameters = self.capture_parameters();
            return Some(CompilationDiagnostic {
                source_path: located.path.to_owned(),
                line: located.line,
                column: located.column,
                message: located.message.to_owned(),
                parameters,
            });
        }
        None
    }
}

struct Located<'a> {
    path: &'a str,
    line: u32,
    column: u32,
    message: &'a str,
}

/// The text after `[ERROR]` and at least one whitespace character.
fn error_body(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(ERROR_TAG)?;
    let body = rest.trim_start();
    (body.len() < rest.len() && !body.is_empty()).then_some(body)
}

/// Parse `[ERROR] <path>:[<line>,<column>] <message>`.
///
/// The path may itself contain `:[`; the rightmost position that yields a
/// complete match wins.
fn parse_located(line: &str) -> Option<Located<'_>> {
    let body = error_body(line)?;
    body.rmatch_indices(":[").find_map(|(idx, _)| {
        let path = body.get(..idx).filter(|p| !p.is_empty())?;
        let rest = body.get(idx..)?.strip_prefix(":[")?;
        let (position, tail) = rest.split_once(']')?;
        let (line, column) = position.split_once(',')?;
        let message = tail.trim_start();
        if message.len() == tail.len() || message.is_empty() {
            return None;
        }
        Some(Located {
            path,
            line: parse_number(line)?,
            column: parse_number(column)?,
            message,
        })
    })
}

/// Parse `[ERROR] <key>: <value>`, splitting at the rightmost `:` followed by whitespace.
fn parse_parameter(line: &str) -> Option<(&str, &str)> {
    let body = error_body(line)?;
    body.rmatch_indices(':').find_map(|(idx, _)| {
        let key = body.get(..idx).filter(|k| !k.is_empty())?;
        let tail = body.get(idx..)?.strip_prefix(':')?;
        let value = tail.trim_start();
        (value.len() < tail.len() && !value.is_empty()).then_some((key, value))
    })
}

fn parse_number(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
