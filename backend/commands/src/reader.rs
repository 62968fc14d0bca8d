/// Cursor over the text that follows a command's activator.
///
/// Tokens are space-delimited; a token opening with `"` or `“` runs to the
/// next `"` or `”`. An unterminated quote runs to the end of the text.
#[derive(Debug, Clone)]
pub struct TextReader<'a> {
    rest: &'a str,
}

const OPENING_QUOTES: [char; 2] = ['"', '“'];
const CLOSING_QUOTES: [char; 2] = ['"', '”'];

impl<'a> TextReader<'a> {
    pub fn new(contents: &'a str) -> Self {
        Self { rest: contents.trim_start() }
    }

    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    /// The unconsumed text, untouched.
    pub fn as_str(&self) -> &'a str {
        self.rest
    }

    /// Next space-delimited or quoted token, or `None` once exhausted.
    pub fn next_token(&mut self) -> Option<String> {
        if self.rest.is_empty() {
            return None;
        }
        if let Some(quote) = self.rest.chars().next().filter(|c| OPENING_QUOTES.contains(c)) {
            return Some(self.read_quoted(quote.len_utf8()));
        }
        let token = match self.rest.find(' ') {
            Some(index) => {
                let (token, rest) = self.rest.split_at(index);
                self.rest = rest.trim_start();
                token
            }
            None => std::mem::take(&mut self.rest),
        };
        Some(token.to_string())
    }

    /// Everything left, trimmed. Quotes are not interpreted.
    pub fn read_remaining(&mut self) -> String {
        std::mem::take(&mut self.rest).trim().to_string()
    }

    fn read_quoted(&mut self, opening_len: usize) -> String {
        let inner = &self.rest[opening_len..];
        match inner.find(CLOSING_QUOTES) {
            Some(index) => {
                let token = &inner[..index];
                let closing_len = inner[index..].chars().next().map_or(1, char::len_utf8);
                self.rest = inner[index + closing_len..].trim_start();
                token.to_string()
            }
            None => {
                self.rest = "";
                inner.to_string()
            }
        }
    }
}
