//! Path template parsing.
//!
//! Three placeholder spellings are accepted and may be mixed:
//!
//! - `{name}` (OpenAPI style)
//! - `<name>`
//! - `<converter:name>` or `<converter(args):name>`, e.g. `<int(min=1):id>`
//!
//! The document always renders placeholders as `{name}`. Converters only add
//! schema hints and, for `path`, let a placeholder span slashes.

use crate::error::ApiConfigError;
use regex::Regex;
use serde_json::{json, Map, Value};

/// Converter attached to a `<converter:name>` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converter {
    pub name: String,
    /// Positional arguments.
    pub args: Vec<String>,
    /// `key=value` arguments in declaration order.
    pub kwargs: Vec<(String, String)>,
}

impl Converter {
    /// Extra schema keywords implied by this converter.
    pub fn schema_hints(&self) -> Map<String, Value> {
        let mut hints = Map::new();
        match self.name.as_str() {
            "uuid" => {
                hints.insert("format".into(), json!("uuid"));
            }
            "path" => {
                hints.insert("format".into(), json!("path"));
            }
            "float" => {
                hints.insert("format".into(), json!("float"));
            }
            "any" => {
                hints.insert("enum".into(), json!(self.args));
            }
            _ => {}
        }
        for (key, raw) in &self.kwargs {
            let keyword = match key.as_str() {
                "min" => "minimum",
                "max" => "maximum",
                "length" => "minLength",
                "minlength" => "minLength",
                "maxlength" => "maxLength",
                _ => continue,
            };
            let value = raw
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| raw.parse::<f64>().map(Value::from))
                .unwrap_or_else(|_| Value::String(raw.clone()));
            hints.insert(keyword.into(), value.clone());
            if key == "length" {
                hints.insert("maxLength".into(), value);
            }
        }
        hints
    }
}

/// A named placeholder inside a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub converter: Option<Converter>,
}

impl Placeholder {
    fn spans_slashes(&self) -> bool {
        self.converter.as_ref().is_some_and(|c| c.name == "path")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Param(Placeholder),
}

/// A parsed, validated URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    tokens: Vec<Token>,
}

fn invalid(template: &str, reason: impl Into<String>) -> ApiConfigError {
    ApiConfigError::InvalidTemplate {
        template: template.to_string(),
        reason: reason.into(),
    }
}

fn valid_ident(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_converter(template: &str, spec: &str) -> Result<Converter, ApiConfigError> {
    let (name, args) = match spec.find('(') {
        Some(open) => {
            let close = spec
                .strip_suffix(')')
                .ok_or_else(|| invalid(template, format!("unclosed converter arguments in `{spec}`")))?;
            (&spec[..open], &close[open + 1..])
        }
        None => (spec, ""),
    };
    if !valid_ident(name) {
        return Err(invalid(template, format!("bad converter name `{name}`")));
    }
    let mut converter = Converter {
        name: name.to_string(),
        args: Vec::new(),
        kwargs: Vec::new(),
    };
    for arg in args.split(',').map(str::trim).filter(|a| !a.is_empty()) {
        match arg.split_once('=') {
            Some((k, v)) => converter
                .kwargs
                .push((k.trim().to_string(), v.trim().trim_matches('\'').to_string())),
            None => converter.args.push(arg.trim_matches('\'').to_string()),
        }
    }
    Ok(converter)
}

impl PathTemplate {
    /// Parse `raw`, rejecting malformed placeholders and repeated names.
    pub fn parse(raw: &str) -> Result<Self, ApiConfigError> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut rest = raw;

        while let Some(c) = rest.chars().next() {
            match c {
                '{' | '<' => {
                    let close = if c == '{' { '}' } else { '>' };
                    let end = rest
                        .find(close)
                        .ok_or_else(|| invalid(raw, format!("unclosed `{c}`")))?;
                    let inner = &rest[1..end];
                    if inner.contains(['{', '<', '/']) {
                        return Err(invalid(raw, format!("malformed placeholder `{inner}`")));
                    }
                    let placeholder = if c == '{' {
                        Placeholder {
                            name: inner.trim().to_string(),
                            converter: None,
                        }
                    } else {
                        match inner.rsplit_once(':') {
                            Some((conv, name)) => Placeholder {
                                name: name.trim().to_string(),
                                converter: Some(parse_converter(raw, conv.trim())?),
                            },
                            None => Placeholder {
                                name: inner.trim().to_string(),
                                converter: None,
                            },
                        }
                    };
                    if !valid_ident(&placeholder.name) {
                        return Err(invalid(
                            raw,
                            format!("bad placeholder name `{}`", placeholder.name),
                        ));
                    }
                    let duplicate = tokens.iter().any(
                        |t| matches!(t, Token::Param(p) if p.name == placeholder.name),
                    );
                    if duplicate {
                        return Err(invalid(
                            raw,
                            format!("placeholder `{}` is used more than once", placeholder.name),
                        ));
                    }
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(Token::Param(placeholder));
                    rest = &rest[end + 1..];
                }
                '}' | '>' => return Err(invalid(raw, format!("stray `{c}`"))),
                _ => {
                    literal.push(c);
                    rest = &rest[c.len_utf8()..];
                }
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }
        Ok(Self {
            raw: raw.to_string(),
            tokens,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Param(p) => Some(p),
            Token::Literal(_) => None,
        })
    }

    pub fn placeholder(&self, name: &str) -> Option<&Placeholder> {
        self.placeholders().find(|p| p.name == name)
    }

    pub fn has_placeholders(&self) -> bool {
        self.placeholders().next().is_some()
    }

    /// Template with every placeholder rendered as `{name}`.
    pub fn openapi_path(&self) -> String {
        let mut out = String::with_capacity(self.raw.len());
        for token in &self.tokens {
            match token {
                Token::Literal(l) => out.push_str(l),
                Token::Param(p) => {
                    out.push('{');
                    out.push_str(&p.name);
                    out.push('}');
                }
            }
        }
        out
    }

    /// Template with placeholder names erased; two routes with the same
    /// shape can never be told apart by a matcher.
    pub fn shape(&self) -> String {
        let mut out = String::with_capacity(self.raw.len());
        for token in &self.tokens {
            match token {
                Token::Literal(l) => out.push_str(l),
                Token::Param(_) => out.push_str("{}"),
            }
        }
        out
    }

    /// Anchored matcher regex plus capture names in order.
    pub fn to_regex(&self) -> Result<(Regex, Vec<String>), ApiConfigError> {
        let mut pattern = String::with_capacity(self.raw.len() + 8);
        pattern.push('^');
        let mut names = Vec::new();
        for token in &self.tokens {
            match token {
                Token::Literal(l) => pattern.push_str(&regex::escape(l)),
                Token::Param(p) => {
                    pattern.push_str(if p.spans_slashes() { "(.+)" } else { "([^/]+)" });
                    names.push(p.name.clone());
                }
            }
        }
        pattern.push('$');
        let regex = Regex::new(&pattern).map_err(|e| ApiConfigError::RouteCompile {
            path: self.raw.clone(),
            reason: e.to_string(),
        })?;
        Ok((regex, names))
    }
}

/// Join a router prefix and a path without doubling the separator.
pub fn join_paths(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => path.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) if path.starts_with('/') => format!("{prefix}{path}"),
        (false, false) => format!("{prefix}/{path}"),
    }
}

/// Validate and normalize a router prefix.
pub fn normalize_prefix(prefix: &str) -> Result<String, ApiConfigError> {
    if prefix.is_empty() {
        return Ok(String::new());
    }
    let template = PathTemplate::parse(prefix).map_err(|e| ApiConfigError::InvalidPrefix {
        prefix: prefix.to_string(),
        reason: e.to_string(),
    })?;
    if template.has_placeholders() {
        return Err(ApiConfigError::InvalidPrefix {
            prefix: prefix.to_string(),
            reason: "prefixes cannot contain placeholders".into(),
        });
    }
    if !prefix.starts_with('/') {
        return Err(ApiConfigError::InvalidPrefix {
            prefix: prefix.to_string(),
            reason: "prefixes must start with `/`".into(),
        });
    }
    Ok(prefix.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_path_conversion() {
        let t = PathTemplate::parse("/ping/<int:foo>/{bar}/<baz>").unwrap();
        assert_eq!(t.openapi_path(), "/ping/{foo}/{bar}/{baz}");
        let names: Vec<_> = t.placeholders().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn test_converter_args() {
        let t = PathTemplate::parse("/<int(min=1,max=2):param>").unwrap();
        let hints = t.placeholder("param").unwrap().converter.as_ref().unwrap().schema_hints();
        assert_eq!(hints.get("minimum"), Some(&json!(1)));
        assert_eq!(hints.get("maximum"), Some(&json!(2)));
    }

    #[test]
    fn test_duplicate_placeholder_rejected() {
        assert!(PathTemplate::parse("/a/<id>/b/{id}").is_err());
    }

    #[test]
    fn test_malformed_rejected() {
        assert!(PathTemplate::parse("/a/{id").is_err());
        assert!(PathTemplate::parse("/a/id}").is_err());
        assert!(PathTemplate::parse("/a/<>").is_err());
        assert!(PathTemplate::parse("/a/{1x}").is_err());
    }

    #[test]
    fn test_regex_matches_segments() {
        let t = PathTemplate::parse("/files/<path:rest>/x/{id}").unwrap();
        let (re, names) = t.to_regex().unwrap();
        let caps = re.captures("/files/a/b/x/7").unwrap();
        assert_eq!(&caps[1], "a/b");
        assert_eq!(&caps[2], "7");
        assert_eq!(names, vec!["rest", "id"]);
    }

    #[test]
    fn test_join_and_prefix() {
        assert_eq!(join_paths("/api/", "/users"), "/api/users");
        assert_eq!(join_paths("", "/users"), "/users");
        assert_eq!(join_paths("/api", ""), "/api");
        assert_eq!(normalize_prefix("/api/").unwrap(), "/api");
        assert!(normalize_prefix("/api/{v}").is_err());
        assert!(normalize_prefix("api").is_err());
    }
}
