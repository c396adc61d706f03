//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::template::Template;

/// Parse template source into a compiled [`Template`]
pub fn parse(input: &str) -> Result<Template, Vec<crate::ParseError>> {
    let len = input.len();

    let token_iter = crate::parser::lexer::lex(input)
        .into_iter()
        .map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    template_parser()
        .parse(token_stream)
        .into_result()
        .map(Template::new)
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn template_parser<'a, I>(
) -> impl Parser<'a, I, Vec<Spanned<Node>>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // `this` contributes no segment, so `this.name` and `name` are the same path
    let segment = select! {
        Token::This => None,
        Token::Ident(s) => Some(Identifier::new(s)),
    };

    let path = segment
        .separated_by(just(Token::Dot))
        .at_least(1)
        .collect::<Vec<_>>()
        .map(|segments| Path::new(segments.into_iter().flatten().collect()))
        .labelled("path");

    let partial_name = select! {
        Token::Ident(s) => Identifier::new(s),
        Token::String(s) => Identifier::new(s),
    }
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())))
    .labelled("partial name");

    let partial = just(Token::Gt)
        .ignore_then(partial_name)
        .then(path.clone().or_not())
        .map(|(name, context)| Node::Partial { name, context });

    let variable = path.clone().map(|path| Node::Variable {
        path,
        escaped: true,
    });

    let tag = just(Token::Open)
        .ignore_then(choice((partial, variable)))
        .then_ignore(just(Token::Close));

    let raw = just(Token::OpenRaw)
        .ignore_then(path)
        .then_ignore(just(Token::CloseRaw))
        .map(|path| Node::Variable {
            path,
            escaped: false,
        });

    let literal = select! {
        Token::Text(s) => Node::Text(s),
        Token::Comment(s) => Node::Comment(s),
    };

    choice((literal, tag, raw))
        .map_with(|node, e| Spanned::new(node, span_range(&e.span())))
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseError;

    #[test]
    fn test_parse_text_and_variable() {
        let tpl = parse("Hello {{name}}").expect("Should parse");
        assert_eq!(tpl.nodes().len(), 2);
        assert_eq!(tpl.nodes()[0].node, Node::Text("Hello ".to_string()));
        match &tpl.nodes()[1].node {
            Node::Variable { path, escaped } => {
                assert_eq!(path.to_string(), "name");
                assert!(escaped);
            }
            other => panic!("Expected variable, got {:?}", other),
        }
        assert_eq!(tpl.nodes()[1].span, 6..14);
    }

    #[test]
    fn test_parse_raw_variable() {
        let tpl = parse("{{{body}}}").expect("Should parse");
        assert!(matches!(
            &tpl.nodes()[0].node,
            Node::Variable { escaped: false, .. }
        ));
    }

    #[test]
    fn test_parse_this_paths() {
        let tpl = parse("{{this}} {{this.name}}").expect("Should parse");
        match (&tpl.nodes()[0].node, &tpl.nodes()[2].node) {
            (Node::Variable { path: a, .. }, Node::Variable { path: b, .. }) => {
                assert!(a.is_this());
                assert_eq!(b.to_string(), "name");
            }
            other => panic!("Expected variables, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_partial_with_context() {
        let tpl = parse("{{> card user.profile}}").expect("Should parse");
        match &tpl.nodes()[0].node {
            Node::Partial { name, context } => {
                assert_eq!(name.node.as_str(), "card");
                assert_eq!(
                    context.as_ref().map(|p| p.to_string()).as_deref(),
                    Some("user.profile")
                );
            }
            other => panic!("Expected partial, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_quoted_partial_name() {
        let tpl = parse(r#"{{> "nav.bar"}}"#).expect("Should parse");
        match &tpl.nodes()[0].node {
            Node::Partial { name, context } => {
                assert_eq!(name.node.as_str(), "nav.bar");
                assert!(context.is_none());
            }
            other => panic!("Expected partial, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_bare_dotted_and_slashed_partial_names() {
        let tpl = parse("{{> a.b}}{{> b/c user}}").expect("Should parse");
        match (&tpl.nodes()[0].node, &tpl.nodes()[1].node) {
            (
                Node::Partial { name: a, context: None },
                Node::Partial { name: b, context: Some(ctx) },
            ) => {
                assert_eq!(a.node.as_str(), "a.b");
                assert_eq!(b.node.as_str(), "b/c");
                assert_eq!(ctx.to_string(), "user");
            }
            other => panic!("Expected partials, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_without_name_is_error() {
        assert!(parse("{{>}}").is_err());
    }

    #[test]
    fn test_parse_comment() {
        let tpl = parse("{{! note }}x").expect("Should parse");
        assert_eq!(tpl.nodes()[0].node, Node::Comment("note".to_string()));
    }

    #[test]
    fn test_parse_empty_template() {
        let tpl = parse("").expect("Should parse");
        assert!(tpl.nodes().is_empty());
    }

    #[test]
    fn test_unclosed_tag_is_error() {
        let errors = parse("Hello {{name").unwrap_err();
        assert!(!errors.is_empty());
        let ParseError::Syntax { message, .. } = &errors[0];
        assert!(message.contains("end of input"), "got: {}", message);
    }

    #[test]
    fn test_empty_tag_is_error() {
        assert!(parse("{{}}").is_err());
    }

    #[test]
    fn test_mismatched_raw_close_is_error() {
        assert!(parse("{{{name}}").is_err());
    }
}
