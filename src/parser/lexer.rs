//! Lexer for template source
//!
//! Literal text and comments are split out by a small scanner; the inside of
//! each `{{ ... }}` tag is tokenized with logos.

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Tokens inside a tag
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
enum TagToken {
    // Closing delimiters (longer first)
    #[token("}}}")]
    CloseRaw,
    #[token("}}")]
    Close,

    #[token(">")]
    Gt,
    #[token(".")]
    Dot,
    #[token("this")]
    This,

    // Identifiers must come after keywords
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    // Array index segment
    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    Index(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Literal text between tags
    Text(String),
    /// Body of a `{{! }}` or `{{!-- --}}` comment
    Comment(String),
    Open,
    OpenRaw,
    Close,
    CloseRaw,
    Gt,
    Dot,
    This,
    Ident(String),
    String(String),
    /// Input the lexer could not make sense of
    Invalid(String),
}

impl From<TagToken> for Token {
    fn from(tok: TagToken) -> Self {
        match tok {
            TagToken::CloseRaw => Token::CloseRaw,
            TagToken::Close => Token::Close,
            TagToken::Gt => Token::Gt,
            TagToken::Dot => Token::Dot,
            TagToken::This => Token::This,
            TagToken::Ident(s) | TagToken::Index(s) => Token::Ident(s),
            TagToken::String(s) => Token::String(s),
        }
    }
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> Vec<(Token, Span)> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];
        let Some(open) = rest.find("{{") else {
            tokens.push((Token::Text(rest.to_string()), pos..input.len()));
            break;
        };

        if open > 0 {
            tokens.push((Token::Text(rest[..open].to_string()), pos..pos + open));
        }

        let tag_start = pos + open;
        let tag = &input[tag_start..];

        if tag.starts_with("{{!") {
            let (body_start, terminator) = if tag.starts_with("{{!--") {
                (5, "--}}")
            } else {
                (3, "}}")
            };
            match tag[body_start..].find(terminator) {
                Some(len) => {
                    let end = body_start + len + terminator.len();
                    let body = tag[body_start..body_start + len].trim().to_string();
                    tokens.push((Token::Comment(body), tag_start..tag_start + end));
                    pos = tag_start + end;
                }
                None => {
                    tokens.push((Token::Invalid(tag.to_string()), tag_start..input.len()));
                    pos = input.len();
                }
            }
            continue;
        }

        let raw = tag.starts_with("{{{");
        let (open_tok, open_len) = if raw {
            (Token::OpenRaw, 3)
        } else {
            (Token::Open, 2)
        };
        tokens.push((open_tok, tag_start..tag_start + open_len));
        pos = tag_start + open_len;
        if !raw {
            pos = lex_partial_head(input, pos, &mut tokens);
        }

        let offset = pos;
        let mut lexer = TagToken::lexer(&input[offset..]);
        let mut closed = false;
        while let Some(result) = lexer.next() {
            let span = lexer.span();
            let span = offset + span.start..offset + span.end;
            match result {
                Ok(tok) => {
                    let is_close = matches!(tok, TagToken::Close | TagToken::CloseRaw);
                    let end = span.end;
                    tokens.push((tok.into(), span));
                    if is_close {
                        pos = end;
                        closed = true;
                        break;
                    }
                }
                Err(()) => tokens.push((Token::Invalid(lexer.slice().to_string()), span)),
            }
        }
        if !closed {
            pos = input.len();
        }
    }

    tokens
}

/// Lex the `> name` head of a partial call starting at `pos`
///
/// A bare name runs to the next whitespace or `}`, so names made by the
/// namers (`a.b`, `b/c`) can be written unquoted. Quoted names are left to
/// the tag lexer. Returns the position after whatever was consumed.
fn lex_partial_head(input: &str, pos: usize, tokens: &mut Vec<(Token, Span)>) -> usize {
    let body = &input[pos..];
    let trimmed = body.trim_start();
    if !trimmed.starts_with('>') {
        return pos;
    }
    let gt = pos + (body.len() - trimmed.len());
    tokens.push((Token::Gt, gt..gt + 1));

    let after = &input[gt + 1..];
    let name = after.trim_start();
    let name_start = gt + 1 + (after.len() - name.len());
    let name_len = name
        .find(|c: char| c.is_whitespace() || c == '}' || c == '"')
        .unwrap_or(name.len());
    if name_len == 0 {
        return gt + 1;
    }
    tokens.push((
        Token::Ident(name[..name_len].to_string()),
        name_start..name_start + name_len,
    ));
    name_start + name_len
}
