//! Indentation-aware emission buffer for generated TypeScript, plus the
//! literal formatting helpers shared by the statement lowerings.

/// Accumulates generated source line by line. `open`/`close` adjust the
/// indentation depth around block braces; two-space indent matches the
/// Playwright house style.
pub(crate) struct CodeWriter {
    buf: String,
    depth: usize,
}

const INDENT: &str = "  ";

impl CodeWriter {
    pub(crate) fn new() -> Self {
        Self {
            buf: String::new(),
            depth: 0,
        }
    }

    /// Append one indented line.
    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str(INDENT);
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
    }

    /// Append a separator line, collapsing runs of blanks.
    pub(crate) fn blank(&mut self) {
        if !self.buf.is_empty() && !self.buf.ends_with("\n\n") {
            self.buf.push('\n');
        }
    }

    /// Append a line that opens a block and indent what follows.
    pub(crate) fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.depth += 1;
    }

    /// Dedent and append the closing line of a block.
    pub(crate) fn close(&mut self, text: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    /// Close the current block and open the next on the same line, as in
    /// `} else {`.
    pub(crate) fn chain(&mut self, text: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
        self.depth += 1;
    }

    pub(crate) fn into_string(self) -> String {
        self.buf
    }
}

/// Quote a value as a single-quoted TypeScript string literal.
pub(crate) fn ts_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

/// Format a number the way TypeScript sources write it: integral values
/// without a trailing `.0`.
pub(crate) fn ts_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_blocks_indent() {
        let mut writer = CodeWriter::new();
        writer.open("test('x', async () => {");
        writer.line("await page.reload();");
        writer.open("if (ok) {");
        writer.line("return;");
        writer.close("}");
        writer.close("});");

        assert_eq!(
            writer.into_string(),
            "test('x', async () => {\n  await page.reload();\n  if (ok) {\n    return;\n  }\n});\n"
        );
    }

    #[test]
    fn test_blank_lines_collapse() {
        let mut writer = CodeWriter::new();
        writer.line("a;");
        writer.blank();
        writer.blank();
        writer.line("b;");

        assert_eq!(writer.into_string(), "a;\n\nb;\n");
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(ts_string("plain"), "'plain'");
        assert_eq!(ts_string("it's"), "'it\\'s'");
        assert_eq!(ts_string("a\\b"), "'a\\\\b'");
        assert_eq!(ts_string("line\nbreak"), "'line\\nbreak'");
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(ts_number(30.0), "30");
        assert_eq!(ts_number(-2.0), "-2");
        assert_eq!(ts_number(1.5), "1.5");
        assert_eq!(ts_number(0.25), "0.25");
    }
}
