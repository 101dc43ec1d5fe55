/// Parsed query: plain keywords plus `name:value` modifier tokens, both in
/// the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub keywords: Vec<String>,
    pub modifiers: Vec<String>,
}

impl Query {
    /// Check if query is empty (no keywords AND no modifiers)
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.modifiers.is_empty()
    }
}

/// A modifier token split into its parts.
///
/// `values` is always `value` split on commas; single-value modifiers just
/// read `values[0]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedModifier {
    pub name: String,
    pub value: String,
    pub values: Vec<String>,
    pub invert: bool,
}

impl ParsedModifier {
    /// Split a modifier token at its first ':'.
    ///
    /// A leading '-' on the name inverts the modifier; a value wrapped in
    /// one pair of double quotes is unwrapped. Never fails: a token with
    /// no ':' is taken as a bare name with an empty value.
    pub fn parse(token: &str) -> Self {
        let (raw_name, raw_value) = token.split_once(':').unwrap_or((token, ""));

        let raw_name = raw_name.trim();
        let (name, invert) = match raw_name.strip_prefix('-') {
            Some(stripped) => (stripped, true),
            None => (raw_name, false),
        };

        let value = unquote(raw_value.trim());
        let values = value.split(',').map(|v| v.trim().to_string()).collect();

        Self {
            name: name.to_string(),
            value: value.to_string(),
            values,
            invert,
        }
    }

    /// First comma-separated value
    pub fn first_value(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or("")
    }
}

/// Strip one pair of wrapping double quotes
fn unquote(value: &str) -> &str {
    if value.len() > 1 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Parse a query string into a Query structure
pub fn parse_query(input: &str) -> Query {
    let mut parser = QueryParser::new(input);
    parser.parse()
}

/// Quote-aware tokenizer.
///
/// Whitespace outside double quotes separates tokens; the quote characters
/// stay in the token. An unbalanced quote swallows the rest of the input
/// into the current token.
struct QueryParser<'a> {
    input: &'a str,
    pos: usize,
    in_quotes: bool,
}

impl<'a> QueryParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            in_quotes: false,
        }
    }

    fn parse(&mut self) -> Query {
        let mut query = Query::default();

        while let Some(token) = self.next_token() {
            let token = token.trim().to_lowercase();
            if token.is_empty() {
                continue;
            }

            if token.contains(':') {
                query.modifiers.push(token);
            } else {
                query.keywords.push(token);
            }
        }

        query
    }

    fn next_token(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        if self.is_eof() {
            return None;
        }

        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch == '"' {
                self.in_quotes = !self.in_quotes;
            } else if ch.is_whitespace() && !self.in_quotes {
                break;
            }
            self.advance();
        }

        Some(&self.input[start..self.pos])
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map(|c| c.is_whitespace()).unwrap_or(false) {
            self.advance();
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.pos += ch.len_utf8();
        }
    }
}
