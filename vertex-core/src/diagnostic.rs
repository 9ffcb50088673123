//! Human-readable rendering of pipeline errors.
//!
//! Output looks like:
//!
//! ```text
//! error[UnexpectedToken]: expected `:` or `=`, found `int`
//!  --> hello.vx:1:7
//!   |
//! 1 | let x int = 5
//!   |       ^
//! ```

use std::fmt::Write as _;

use crate::error::CoreError;

/// Render `error` against the `source` it was raised for.
///
/// `file` is only used as a label. Positions past the end of the
/// source (e.g. an unexpected end of input after a trailing newline)
/// are rendered without a source excerpt.
pub fn render(source: &str, file: &str, error: &CoreError) -> String {
    let position = error.position();
    let mut out = String::new();
    let _ = writeln!(out, "error[{}]: {}", error.kind_name(), error.summary());

    let Some(line) = source.lines().nth(position.line.saturating_sub(1)) else {
        let _ = write!(out, " --> {file}:{position}");
        return out;
    };

    let gutter = position.line.to_string().len();
    let pad = " ".repeat(gutter);
    let _ = writeln!(out, "{pad}--> {file}:{position}");
    let _ = writeln!(out, "{pad} |");
    let _ = writeln!(out, "{} | {}", position.line, line);
    let _ = write!(out, "{pad} | {}", underline(line, position.column));
    out
}

/// Caret under the given 1-based column, keeping tabs so it lines up.
fn underline(line: &str, column: usize) -> String {
    let mut marker: String = line
        .chars()
        .take(column.saturating_sub(1))
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    marker.push('^');
    marker
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;

    fn render_failure(source: &str) -> String {
        let err = compile(source).unwrap_err();
        render(source, "input.vx", &err)
    }

    #[test]
    fn renders_caret_under_offending_token() {
        let text = render_failure("print 1\nlet x int = 5\n");
        assert_eq!(
            text,
            "error[UnexpectedToken]: expected `:` or `=`, found `int`\n \
             --> input.vx:2:7\n  |\n2 | let x int = 5\n  |       ^"
        );
    }

    #[test]
    fn keeps_tabs_in_marker() {
        let text = render_failure("\tprint nope");
        assert!(text.ends_with("\tprint nope\n  | \t      ^"), "{text}");
    }

    #[test]
    fn renders_without_excerpt_past_end_of_source() {
        let text = render_failure("print 1 +\n");
        assert!(text.starts_with("error[UnexpectedEOF]: expected expression, found end of input"));
        assert!(text.contains("input.vx:"));
    }
}
