//! Lexer for Obo XML using logos
//!
//! XML needs two modes: character data between tags, and names/attributes
//! inside a tag. Each mode is its own logos token set and the lexer morphs
//! between them at `<` and `>`.

use logos::{Lexer, Logos};

/// Tokens between tags
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum ContentToken {
    #[regex(r"<\?[^?]*\?+([^?>][^?]*\?+)*>")]
    ProcessingInstruction,

    #[regex(r"<!--([^-]|-[^-])*-->")]
    Comment,

    #[regex(r"<!\[CDATA\[([^\]]|\][^\]]|\]\]+[^\]>])*\]\]+>")]
    CData,

    #[regex(r"<![A-Z][^>]*>")]
    Doctype,

    #[token("</")]
    CloseOpen,

    #[token("<")]
    Open,

    #[regex(r"[^<]+")]
    Text,
}

/// Tokens inside a tag
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum TagToken {
    #[regex(r"[A-Za-z_][A-Za-z0-9_.:\-]*")]
    Name,

    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#)]
    #[regex(r"'[^']*'")]
    Quoted,

    #[token(">")]
    Close,

    #[token("/>")]
    SelfClose,
}

/// Token types for Obo XML
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token<'src> {
    /// Raw character data; entities are still encoded
    Text(&'src str),
    /// Contents of a CDATA section, taken literally
    CData(&'src str),
    /// `<`
    Open,
    /// `</`
    CloseOpen,
    Name(&'src str),
    Eq,
    /// Attribute value without its quotes; entities are still encoded
    Quoted(&'src str),
    /// `>`
    Close,
    /// `/>`
    SelfClose,
}

/// Span information for a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A token with its span
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken<'src> {
    pub token: Token<'src>,
    pub span: TokenSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub span: TokenSpan,
    pub message: String,
}

/// Lex a whole document. Comments, processing instructions and doctypes are
/// dropped.
pub fn lex(source: &str) -> Vec<Result<SpannedToken<'_>, LexError>> {
    let mut out = Vec::new();
    let mut content: Lexer<'_, ContentToken> = ContentToken::lexer(source);

    loop {
        let Some(result) = content.next() else {
            break;
        };
        let range = content.span();
        let span = TokenSpan::new(range.start, range.end);
        let slice = content.slice();

        let token = match result {
            Ok(ContentToken::ProcessingInstruction)
            | Ok(ContentToken::Comment)
            | Ok(ContentToken::Doctype) => continue,
            Ok(ContentToken::Text) => Token::Text(slice),
            Ok(ContentToken::CData) => Token::CData(&slice[9..slice.len() - 3]),
            Ok(ContentToken::Open) => Token::Open,
            Ok(ContentToken::CloseOpen) => Token::CloseOpen,
            Err(()) => {
                out.push(Err(LexError {
                    span,
                    message: "Unterminated markup".to_string(),
                }));
                continue;
            }
        };

        let enters_tag = matches!(token, Token::Open | Token::CloseOpen);
        out.push(Ok(SpannedToken { token, span }));

        if enters_tag {
            let mut tag: Lexer<'_, TagToken> = content.morph();
            lex_tag(&mut tag, &mut out);
            content = tag.morph();
        }
    }

    out
}

/// Consume tag tokens up to and including `>` or `/>`
fn lex_tag<'src>(tag: &mut Lexer<'src, TagToken>, out: &mut Vec<Result<SpannedToken<'src>, LexError>>) {
    while let Some(result) = tag.next() {
        let range = tag.span();
        let span = TokenSpan::new(range.start, range.end);
        let slice = tag.slice();

        let token = match result {
            Ok(TagToken::Name) => Token::Name(slice),
            Ok(TagToken::Eq) => Token::Eq,
            Ok(TagToken::Quoted) => Token::Quoted(&slice[1..slice.len() - 1]),
            Ok(TagToken::Close) => Token::Close,
            Ok(TagToken::SelfClose) => Token::SelfClose,
            Err(()) => {
                out.push(Err(LexError {
                    span,
                    message: "Unexpected character in tag".to_string(),
                }));
                continue;
            }
        };

        let done = matches!(token, Token::Close | Token::SelfClose);
        out.push(Ok(SpannedToken { token, span }));
        if done {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token<'_>> {
        lex(source).into_iter().filter_map(|r| r.ok()).map(|t| t.token).collect()
    }

    #[test]
    fn test_lex_element() {
        assert_eq!(
            tokens(r#"<Text id="a">hi</Text>"#),
            vec![
                Token::Open,
                Token::Name("Text"),
                Token::Name("id"),
                Token::Eq,
                Token::Quoted("a"),
                Token::Close,
                Token::Text("hi"),
                Token::CloseOpen,
                Token::Name("Text"),
                Token::Close,
            ]
        );
    }

    #[test]
    fn test_text_keeps_spaces_and_tag_chars() {
        assert_eq!(
            tokens("<t> a = \"b\" > c</t>"),
            vec![
                Token::Open,
                Token::Name("t"),
                Token::Close,
                Token::Text(" a = \"b\" > c"),
                Token::CloseOpen,
                Token::Name("t"),
                Token::Close,
            ]
        );
    }

    #[test]
    fn test_skips_prolog_and_comments() {
        let source = "<?xml version=\"1.0\"?>\n<!-- note - here --><Break/>";
        assert_eq!(
            tokens(source),
            vec![Token::Text("\n"), Token::Open, Token::Name("Break"), Token::SelfClose]
        );
    }

    #[test]
    fn test_cdata() {
        assert_eq!(
            tokens("<![CDATA[a < b]]>"),
            vec![Token::CData("a < b")]
        );
    }

    #[test]
    fn test_single_quoted_and_qualified_names() {
        assert_eq!(
            tokens("<ObojoboDraft.Chunks.Break id='x'/>"),
            vec![
                Token::Open,
                Token::Name("ObojoboDraft.Chunks.Break"),
                Token::Name("id"),
                Token::Eq,
                Token::Quoted("x"),
                Token::SelfClose,
            ]
        );
    }

    #[test]
    fn test_spans_are_absolute() {
        let spanned: Vec<_> = lex("ab<t/>").into_iter().filter_map(|r| r.ok()).collect();
        assert_eq!(spanned[1].span, TokenSpan::new(2, 3));
        assert_eq!(spanned[2].span, TokenSpan::new(3, 4));
    }

    #[test]
    fn test_bad_tag_character() {
        let results = lex("<t #>");
        assert!(results.iter().any(|r| r.is_err()));
    }
}
