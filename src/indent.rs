use crate::error::LiteralError;

/// Line-start index over a source string, built with one `memchr` pass.
#[derive(Debug)]
pub struct LineTable<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineTable<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(memchr::memchr_iter(b'\n', source.as_bytes()).map(|i| i + 1));
        // A trailing newline does not open another line.
        if starts.len() > 1 && starts.last() == Some(&source.len()) {
            starts.pop();
        }
        Self { source, starts }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        if self.source.is_empty() { 0 } else { self.starts.len() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text of a 1-based line, without its line terminator.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<&'a str> {
        if line == 0 || line > self.len() {
            return None;
        }
        let start = self.starts[line - 1];
        let end = self
            .starts
            .get(line)
            .map_or(self.source.len(), |next| next - 1);
        let text = &self.source[start..end];
        let text = text.strip_suffix('\n').unwrap_or(text);
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    /// Count of leading spaces and tabs on a 1-based line.
    pub fn indentation(&self, line: usize) -> Result<usize, LiteralError> {
        let text = self.line(line).ok_or(LiteralError::LineNotFound {
            line,
            lines: self.len(),
        })?;
        Ok(leading_whitespace(text))
    }
}

/// Number of leading `' '` and `'\t'` characters, in any mixture.
#[must_use]
pub fn leading_whitespace(line: &str) -> usize {
    line.bytes().take_while(|b| matches!(b, b' ' | b'\t')).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_tabs_and_spaces_mixed() {
        let table = LineTable::new("package p\n\t  \tx := 1\n    y\n");
        assert_eq!(table.indentation(1).unwrap(), 0);
        assert_eq!(table.indentation(2).unwrap(), 4);
        assert_eq!(table.indentation(3).unwrap(), 4);
    }

    #[test]
    fn whitespace_only_line_counts_all_of_it() {
        let table = LineTable::new("a\n\t\t\nb");
        assert_eq!(table.indentation(2).unwrap(), 2);
    }

    #[test]
    fn line_past_end_is_line_not_found() {
        let table = LineTable::new("one\ntwo\n");
        assert_eq!(table.len(), 2);
        let err = table.indentation(3).unwrap_err();
        assert!(matches!(err, LiteralError::LineNotFound { line: 3, lines: 2 }));
        assert!(table.indentation(0).is_err());
    }

    #[test]
    fn lines_strip_terminators() {
        let table = LineTable::new("a\r\n\tb\r\nc");
        assert_eq!(table.line(1), Some("a"));
        assert_eq!(table.line(2), Some("\tb"));
        assert_eq!(table.line(3), Some("c"));
        assert_eq!(table.line(4), None);
    }

    #[test]
    fn empty_source_has_no_lines() {
        let table = LineTable::new("");
        assert!(table.is_empty());
        assert!(table.indentation(1).is_err());
    }
}
