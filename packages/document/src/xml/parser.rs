use super::entities::decode;
use super::lexer::{lex, SpannedToken, Token, TokenSpan};
use crate::error::{ParseError, ParseErrors, ParseResult};

/// Generic XML element, before any Obo meaning is attached
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlChild>,
    pub span: TokenSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlChild {
    Element(XmlElement),
    /// Decoded character data
    Text(String),
}

impl XmlElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlChild::Element(element) => Some(element),
            XmlChild::Text(_) => None,
        })
    }

    /// True when every text child is whitespace
    pub fn has_only_element_children(&self) -> bool {
        self.children.iter().all(|child| match child {
            XmlChild::Element(_) => true,
            XmlChild::Text(text) => text.trim().is_empty(),
        })
    }
}

/// Recursive-descent parser over the token stream
pub struct Parser<'src> {
    tokens: Vec<SpannedToken<'src>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    /// Lex `source`, failing with every lexer error at once
    pub fn new(source: &'src str) -> Result<Self, ParseErrors> {
        let mut tokens = Vec::new();
        let mut errors = ParseErrors::new();

        for result in lex(source) {
            match result {
                Ok(token) => tokens.push(token),
                Err(err) => errors.push(ParseError::LexError {
                    span: err.span,
                    message: err.message,
                }),
            }
        }

        if errors.is_empty() {
            Ok(Self { tokens, pos: 0 })
        } else {
            Err(errors)
        }
    }

    /// Parse exactly one root element, ignoring surrounding whitespace
    pub fn parse_document(&mut self) -> ParseResult<XmlElement> {
        self.skip_whitespace();
        let root = self.parse_element()?;
        self.skip_whitespace();

        if !self.is_at_end() {
            return Err(ParseError::invalid_syntax(
                self.peek_span(),
                "Content after the root element",
            ));
        }
        Ok(root)
    }

    fn parse_element(&mut self) -> ParseResult<XmlElement> {
        let start = self.peek_span().start;
        self.expect(Token::Open)?;
        let name = self.expect_name()?;

        let mut attributes: Vec<(String, String)> = Vec::new();
        while let Some(SpannedToken {
            token: Token::Name(key),
            span,
        }) = self.peek().cloned()
        {
            self.advance();
            self.expect(Token::Eq)?;
            let value = self.expect_quoted()?;
            if attributes.iter().any(|(k, _)| k == key) {
                return Err(ParseError::invalid_syntax(
                    span,
                    format!("Duplicate attribute '{}'", key),
                ));
            }
            attributes.push((key.to_string(), value));
        }

        if self.match_token(Token::SelfClose) {
            return Ok(XmlElement {
                name,
                attributes,
                children: Vec::new(),
                span: TokenSpan::new(start, self.current_span().end),
            });
        }
        self.expect(Token::Close)?;

        let mut children = Vec::new();
        loop {
            match self.peek().map(|t| t.token.clone()) {
                Some(Token::Text(raw)) => {
                    self.advance();
                    push_text(&mut children, &decode(raw));
                }
                Some(Token::CData(raw)) => {
                    self.advance();
                    push_text(&mut children, raw);
                }
                Some(Token::Open) => children.push(XmlChild::Element(self.parse_element()?)),
                Some(Token::CloseOpen) => {
                    self.advance();
                    let close_span = self.peek_span();
                    let closing = self.expect_name()?;
                    if closing != name {
                        return Err(ParseError::MismatchedTag {
                            span: close_span,
                            expected: name,
                            found: closing,
                        });
                    }
                    self.expect(Token::Close)?;
                    break;
                }
                Some(_) => {
                    return Err(ParseError::unexpected_token(
                        self.peek_span(),
                        "element content",
                        Self::format_token(self.peek()),
                    ))
                }
                None => {
                    return Err(ParseError::UnexpectedEof {
                        expected: format!("</{}>", name),
                    })
                }
            }
        }

        Ok(XmlElement {
            name,
            attributes,
            children,
            span: TokenSpan::new(start, self.current_span().end),
        })
    }

    fn skip_whitespace(&mut self) {
        while let Some(SpannedToken {
            token: Token::Text(text),
            ..
        }) = self.peek()
        {
            if !text.trim().is_empty() {
                break;
            }
            self.advance();
        }
    }

    // Helper methods

    fn peek(&self) -> Option<&SpannedToken<'src>> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&SpannedToken<'src>> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: &Token) -> bool {
        self.peek()
            .map(|t| std::mem::discriminant(&t.token) == std::mem::discriminant(token))
            .unwrap_or(false)
    }

    fn match_token(&mut self, token: Token) -> bool {
        if self.check(&token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> ParseResult<()> {
        if self.check(&token) {
            self.advance();
            return Ok(());
        }
        let expected = Self::format_token(Some(&SpannedToken {
            token,
            span: TokenSpan::new(0, 0),
        }));
        Err(self.error_here(expected))
    }

    fn expect_name(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(SpannedToken {
                token: Token::Name(name),
                ..
            }) => {
                let name = name.to_string();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_here("name".to_string())),
        }
    }

    fn expect_quoted(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(SpannedToken {
                token: Token::Quoted(raw),
                ..
            }) => {
                let value = decode(raw).into_owned();
                self.advance();
                Ok(value)
            }
            _ => Err(self.error_here("quoted attribute value".to_string())),
        }
    }

    fn error_here(&self, expected: String) -> ParseError {
        if self.is_at_end() {
            ParseError::UnexpectedEof { expected }
        } else {
            ParseError::unexpected_token(self.peek_span(), expected, Self::format_token(self.peek()))
        }
    }

    /// Get the span of the token we just consumed
    fn current_span(&self) -> TokenSpan {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span)
            .unwrap_or(TokenSpan::new(0, 0))
    }

    /// Get the span of the next token
    fn peek_span(&self) -> TokenSpan {
        self.peek().map(|t| t.span).unwrap_or_else(|| {
            let end = self.tokens.last().map(|t| t.span.end).unwrap_or(0);
            TokenSpan::new(end, end)
        })
    }

    /// Format a token for display in error messages
    fn format_token(token: Option<&SpannedToken>) -> String {
        match token.map(|t| &t.token) {
            None => "end of file".to_string(),
            Some(Token::Text(text)) => format!("text {:?}", text.trim()),
            Some(Token::CData(_)) => "CDATA section".to_string(),
            Some(Token::Open) => "'<'".to_string(),
            Some(Token::CloseOpen) => "'</'".to_string(),
            Some(Token::Name(name)) => format!("name '{}'", name),
            Some(Token::Eq) => "'='".to_string(),
            Some(Token::Quoted(value)) => format!("string \"{}\"", value),
            Some(Token::Close) => "'>'".to_string(),
            Some(Token::SelfClose) => "'/>'".to_string(),
        }
    }
}

fn push_text(children: &mut Vec<XmlChild>, text: &str) {
    if let Some(XmlChild::Text(last)) = children.last_mut() {
        last.push_str(text);
    } else {
        children.push(XmlChild::Text(text.to_string()));
    }
}

/// Parse XML source into a generic element tree
pub fn parse_element_tree(source: &str) -> Result<XmlElement, ParseErrors> {
    let mut parser = Parser::new(source)?;
    Ok(parser.parse_document()?)
}
