//! Template walk producing the rendered string

use serde_json::Value;

use super::{PartialLookup, RenderConfig, RenderError};
use crate::parser::{Node, Path};
use crate::template::Template;

static NULL: Value = Value::Null;

/// Render `template` against `data`, resolving partials through `partials`
pub fn render_with<L>(
    template: &Template,
    data: &Value,
    partials: &L,
    config: &RenderConfig,
) -> Result<String, RenderError>
where
    L: PartialLookup + ?Sized,
{
    let mut out = String::new();
    Renderer { partials, config }.render_nodes(template, data, 0, &mut out)?;
    Ok(out)
}

struct Renderer<'a, L: ?Sized> {
    partials: &'a L,
    config: &'a RenderConfig,
}

impl<L: PartialLookup + ?Sized> Renderer<'_, L> {
    fn render_nodes(
        &self,
        template: &Template,
        data: &Value,
        depth: usize,
        out: &mut String,
    ) -> Result<(), RenderError> {
        for node in template.nodes() {
            match &node.node {
                Node::Text(text) => out.push_str(text),
                Node::Comment(_) => {}
                Node::Variable { path, escaped } => match resolve(data, path) {
                    Some(value) => {
                        let text = stringify(value);
                        if *escaped && self.config.escape_html {
                            escape_html_into(&text, out);
                        } else {
                            out.push_str(&text);
                        }
                    }
                    None if self.config.strict => {
                        return Err(RenderError::MissingVariable {
                            path: path.to_string(),
                        })
                    }
                    None => {}
                },
                Node::Partial { name, context } => {
                    let name = name.node.as_str();
                    if depth >= self.config.max_depth {
                        return Err(RenderError::DepthExceeded {
                            name: name.to_string(),
                            max_depth: self.config.max_depth,
                        });
                    }
                    let partial =
                        self.partials
                            .find_partial(name)
                            .ok_or_else(|| RenderError::MissingPartial {
                                name: name.to_string(),
                            })?;
                    let compiled = partial.template()?;
                    let scope = match context {
                        Some(path) => resolve(data, path).unwrap_or(&NULL),
                        None => data,
                    };
                    self.render_nodes(&compiled, scope, depth + 1, out)?;
                }
            }
        }
        Ok(())
    }
}

/// Follow `path` through objects (by key) and arrays (by index)
fn resolve<'v>(data: &'v Value, path: &Path) -> Option<&'v Value> {
    path.segments.iter().try_fold(data, |value, segment| match value {
        Value::Object(map) => map.get(segment.as_str()),
        Value::Array(items) => segment
            .as_str()
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i)),
        _ => None,
    })
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_html_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partial::PartialRegistry;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(
        source: &str,
        data: Value,
        registry: &PartialRegistry,
    ) -> Result<String, RenderError> {
        let template = Template::parse(source).unwrap();
        render_with(&template, &data, registry, &RenderConfig::default())
    }

    #[test]
    fn test_render_variable() {
        let registry = PartialRegistry::new();
        let out = render("Hello {{name}}", json!({"name": "World"}), &registry).unwrap();
        assert_eq!(out, "Hello World");
    }

    #[test]
    fn test_render_nested_path_and_index() {
        let registry = PartialRegistry::new();
        let data = json!({"user": {"tags": ["a", "b"]}, "n": 3, "ok": true});
        let out = render("{{user.tags.1}} {{n}} {{ok}} {{none}}", data, &registry).unwrap();
        assert_eq!(out, "b 3 true ");
    }

    #[test]
    fn test_escaping() {
        let registry = PartialRegistry::new();
        let data = json!({"html": "<b>\"x\" & 'y'</b>"});
        let out = render("{{html}}|{{{html}}}", data, &registry).unwrap();
        assert_eq!(
            out,
            "&lt;b&gt;&quot;x&quot; &amp; &#x27;y&#x27;&lt;/b&gt;|<b>\"x\" & 'y'</b>"
        );
    }

    #[test]
    fn test_escaping_disabled() {
        let registry = PartialRegistry::new();
        let template = Template::parse("{{html}}").unwrap();
        let config = RenderConfig::new().with_escape_html(false);
        let out = render_with(&template, &json!({"html": "<i>"}), &registry, &config).unwrap();
        assert_eq!(out, "<i>");
    }

    #[test]
    fn test_comment_not_rendered() {
        let registry = PartialRegistry::new();
        let out = render("a{{! hidden }}b", json!({}), &registry).unwrap();
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_partial_uses_current_context() {
        let registry = PartialRegistry::new();
        registry.register_partial("greet", "Hi {{name}}").unwrap();
        let out = render("[{{> greet}}]", json!({"name": "Ann"}), &registry).unwrap();
        assert_eq!(out, "[Hi Ann]");
    }

    #[test]
    fn test_partial_with_context_path() {
        let registry = PartialRegistry::new();
        registry.register_partial("card", "{{title}}").unwrap();
        let data = json!({"post": {"title": "News"}});
        let out = render("{{> card post}}", data, &registry).unwrap();
        assert_eq!(out, "News");
    }

    #[test]
    fn test_missing_partial() {
        let registry = PartialRegistry::new();
        let err = render("{{> nope}}", json!({}), &registry).unwrap_err();
        assert!(matches!(err, RenderError::MissingPartial { ref name } if name == "nope"));
    }

    #[test]
    fn test_broken_partial_reports_compile_error() {
        let registry = PartialRegistry::new();
        registry.register_partial("bad", "{{oops").unwrap();
        let err = render("{{> bad}}", json!({}), &registry).unwrap_err();
        assert!(matches!(err, RenderError::Compile(_)));
    }

    #[test]
    fn test_recursive_partial_hits_depth_limit() {
        let registry = PartialRegistry::new();
        registry.register_partial("loop", "x{{> loop}}").unwrap();
        let template = Template::parse("{{> loop}}").unwrap();
        let config = RenderConfig::new().with_max_depth(3);

        let err = render_with(&template, &json!({}), &registry, &config).unwrap_err();
        assert!(matches!(err, RenderError::DepthExceeded { max_depth: 3, .. }));
    }

    #[test]
    fn test_strict_missing_variable() {
        let registry = PartialRegistry::new();
        let template = Template::parse("{{a.b}}").unwrap();
        let config = RenderConfig::new().with_strict(true);

        let err = render_with(&template, &json!({"a": {}}), &registry, &config).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"missing value for a.b");
    }
}
