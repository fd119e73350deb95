//! Line-structure parser for Python source.
//!
//! Tracks logical lines, the indentation stack, bracket nesting and string
//! literals, and reports the first structural error the way the CPython
//! tokenizer would.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonSyntaxError {
    pub message: String,
    pub line: usize,
}

type ParseResult = Result<(), PythonSyntaxError>;

const BLOCK_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "def", "class", "try", "except", "finally", "with",
    "async",
];

pub fn parse(code: &str) -> ParseResult {
    let mut scanner = Scanner::new();
    for (idx, line) in code.lines().enumerate() {
        scanner.feed(idx + 1, line)?;
    }
    scanner.finish()
}

fn error(message: impl Into<String>, line: usize) -> PythonSyntaxError {
    PythonSyntaxError {
        message: message.into(),
        line,
    }
}

struct LogicalLine {
    start: usize,
    header: bool,
    top_level_colon: bool,
    last_significant: Option<char>,
}

struct Scanner {
    indents: Vec<usize>,
    brackets: Vec<(char, usize)>,
    /// Open triple-quote delimiter and the line it started on.
    triple: Option<(char, usize)>,
    continued: bool,
    /// Header line whose body has not started yet.
    pending_block: Option<usize>,
    logical: Option<LogicalLine>,
    last_line: usize,
}

impl Scanner {
    fn new() -> Self {
        Self {
            indents: vec![0],
            brackets: Vec::new(),
            triple: None,
            continued: false,
            pending_block: None,
            logical: None,
            last_line: 0,
        }
    }

    fn feed(&mut self, line_no: usize, line: &str) -> ParseResult {
        self.last_line = line_no;

        let mut logical = match self.logical.take() {
            Some(logical) => logical,
            None => {
                let trimmed = line.trim_start();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    return Ok(());
                }
                self.check_indent(indent_width(line), line_no)?;
                let first_word: String = trimmed
                    .chars()
                    .take_while(|c| c.is_alphanumeric() || *c == '_')
                    .collect();
                LogicalLine {
                    start: line_no,
                    header: BLOCK_KEYWORDS.contains(&first_word.as_str()),
                    top_level_colon: false,
                    last_significant: None,
                }
            }
        };

        self.continued = false;
        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if let Some((quote, _)) = self.triple {
                if c == '\\' {
                    i += 2;
                } else if is_triple(&chars, i, quote) {
                    self.triple = None;
                    logical.last_significant = Some(quote);
                    i += 3;
                } else {
                    i += 1;
                }
                continue;
            }

            match c {
                '#' => break,
                '\'' | '"' => {
                    if is_triple(&chars, i, c) {
                        self.triple = Some((c, line_no));
                        i += 3;
                        continue;
                    }
                    let close = find_string_end(&chars, i + 1, c)
                        .ok_or_else(|| error("unterminated string literal", line_no))?;
                    logical.last_significant = Some(c);
                    i = close + 1;
                    continue;
                }
                '(' | '[' | '{' => self.brackets.push((c, line_no)),
                ')' | ']' | '}' => {
                    let expected = opener_for(c);
                    match self.brackets.pop() {
                        Some((open, _)) if open == expected => {}
                        Some((open, _)) => {
                            return Err(error(
                                format!(
                                    "closing parenthesis '{c}' does not match opening parenthesis '{open}'"
                                ),
                                line_no,
                            ));
                        }
                        None => return Err(error(format!("unmatched '{c}'"), line_no)),
                    }
                }
                ':' if self.brackets.is_empty() => logical.top_level_colon = true,
                '\\' if i + 1 == chars.len() => {
                    self.continued = true;
                    i += 1;
                    continue;
                }
                _ => {}
            }

            if !c.is_whitespace() {
                logical.last_significant = Some(c);
            }
            i += 1;
        }

        if self.triple.is_some() || !self.brackets.is_empty() || self.continued {
            self.logical = Some(logical);
            return Ok(());
        }

        if logical.header && !logical.top_level_colon {
            return Err(error("expected ':'", logical.start));
        }
        self.pending_block = (logical.last_significant == Some(':')).then_some(logical.start);
        Ok(())
    }

    fn check_indent(&mut self, indent: usize, line_no: usize) -> ParseResult {
        let top = self.indents.last().copied().unwrap_or(0);

        if let Some(header) = self.pending_block.take() {
            if indent > top {
                self.indents.push(indent);
                return Ok(());
            }
            return Err(error(
                format!("expected an indented block after line {header}"),
                line_no,
            ));
        }

        if indent > top {
            return Err(error("unexpected indent", line_no));
        }
        while self.indents.last().is_some_and(|&level| level > indent) {
            self.indents.pop();
        }
        if self.indents.last().copied().unwrap_or(0) != indent {
            return Err(error(
                "unindent does not match any outer indentation level",
                line_no,
            ));
        }
        Ok(())
    }

    fn finish(self) -> ParseResult {
        if let Some((_, line)) = self.triple {
            return Err(error("unterminated triple-quoted string literal", line));
        }
        if let Some((open, line)) = self.brackets.last() {
            return Err(error(format!("'{open}' was never closed"), *line));
        }
        if self.continued {
            return Err(error("unexpected EOF while parsing", self.last_line));
        }
        if let Some(header) = self.pending_block {
            return Err(error(
                format!("expected an indented block after line {header}"),
                header,
            ));
        }
        Ok(())
    }
}

fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / 8 + 1) * 8,
            _ => break,
        }
    }
    width
}

fn is_triple(chars: &[char], at: usize, quote: char) -> bool {
    chars.get(at) == Some(&quote)
        && chars.get(at + 1) == Some(&quote)
        && chars.get(at + 2) == Some(&quote)
}

fn find_string_end(chars: &[char], from: usize, quote: char) -> Option<usize> {
    let mut j = from;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            c if c == quote => return Some(j),
            _ => j += 1,
        }
    }
    None
}

fn opener_for(close: char) -> char {
    match close {
        ')' => '(',
        ']' => '[',
        _ => '{',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails_at(code: &str) -> (String, usize) {
        let err = parse(code).expect_err("expected a syntax error");
        (err.message, err.line)
    }

    #[test]
    fn test_valid_programs() {
        let programs = [
            "def add(a, b):\n    return a + b\n",
            "abcd",
            "if x: y = 1",
            "class A:\n    pass\n\nelse_value = 3\n",
            "data = {\n    'a': [1, 2],\n    'b': (3, 4),\n}\n",
            "def f():\n    \"\"\"Doc with ( and :\n    spanning lines.\"\"\"\n    return 1\n",
            "total = 1 + \\\n    2\n",
            "for i in range(3):\n    # comment\n\n    if i:\n        print(i)\n    else:\n        pass\nprint('done')\n",
            "try:\n    x = int('3')\nexcept ValueError as e:  # fallback\n    x = 0\n",
            "s = 'it\\'s'\n",
        ];
        for code in programs {
            assert_eq!(parse(code), Ok(()), "rejected: {code:?}");
        }
    }

    #[test]
    fn test_missing_colon() {
        assert_eq!(fails_at("def f()\n    return 1"), ("expected ':'".to_string(), 1));
    }

    #[test]
    fn test_unexpected_indent() {
        assert_eq!(fails_at("x = 1\n    y = 2").1, 2);
    }

    #[test]
    fn test_expected_indented_block() {
        let (message, line) = fails_at("if x:\nprint(x)");
        assert!(message.starts_with("expected an indented block"));
        assert_eq!(line, 2);

        assert_eq!(fails_at("while True:\n").1, 1);
    }

    #[test]
    fn test_unindent_mismatch() {
        let (message, line) = fails_at("if x:\n    a = 1\n  b = 2");
        assert!(message.contains("unindent"));
        assert_eq!(line, 3);
    }

    #[test]
    fn test_unclosed_bracket() {
        assert_eq!(fails_at("def f(:\n  return 1"), ("'(' was never closed".to_string(), 1));
    }

    #[test]
    fn test_mismatched_bracket() {
        let (message, line) = fails_at("x = 1\ny = (1, 2]");
        assert!(message.contains("does not match"));
        assert_eq!(line, 2);
        assert_eq!(fails_at("x = 1)").0, "unmatched ')'");
    }

    #[test]
    fn test_unterminated_strings() {
        assert_eq!(fails_at("s = 'abc").1, 1);
        assert_eq!(fails_at("x = 1\ns = \"\"\"never\nclosed").1, 2);
    }

    #[test]
    fn test_tab_indentation() {
        assert_eq!(parse("if x:\n\ty = 1\n\tz = 2\n"), Ok(()));
    }
}
