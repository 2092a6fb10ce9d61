//! Compilation of route patterns into path matchers.
//!
//! A route pattern is a path made of literal text and captures:
//!
//! ```ignore
//!  Syntax    Type
//!  $name     named parameter, one path segment
//!  $name?    optional named parameter
//!  $$name    catch-all parameter, the rest of the path
//! ```
//!
//! Named parameters match anything until the next `/` or the path end.
//! Several of them may share a segment as long as literal text separates
//! them:
//!
//! ```ignore
//!  Pattern: /blog/$year-$month
//!
//!   /blog/2021-04               match: year="2021", month="04"
//!   /blog/2021-04/              match: year="2021", month="04"
//!   /blog/2021                  no match
//! ```
//!
//! An optional parameter that spans a whole segment makes the segment,
//! including its leading `/`, optional:
//!
//! ```ignore
//!  Pattern: /posts/$id?
//!
//!   /posts                      match
//!   /posts/42                   match: id="42"
//! ```
//!
//! Catch-all parameters match everything until the path end, separators
//! included, so they must always be the final element of the pattern:
//!
//! ```ignore
//!  Pattern: /files/$$rest
//!
//!   /files/LICENSE              match: rest="LICENSE"
//!   /files/templates/a.html     match: rest="templates/a.html"
//!   /files/templates/           match: rest="templates/"
//!   /files/                     match
//!   /files                      no match
//! ```
use crate::error::Error;

use std::collections::{HashMap, HashSet};
use std::fmt;

use regex::Regex;

/// The parameters captured from a request path.
///
/// Values are raw substrings of the path. Optional captures that did not
/// take part in the match are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    map: HashMap<String, String>,
}

impl Params {
    /// Returns the value captured for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over `(name, value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.map.insert(name.into(), value.into());
    }
}

/// A compiled route pattern.
///
/// ```rust
/// use filerouter::Pattern;
///
/// let pattern = Pattern::new("/users/$id").unwrap();
/// let params = pattern.matches("/users/42").unwrap();
/// assert_eq!(params.get("id"), Some("42"));
/// assert!(pattern.matches("/users").is_none());
/// ```
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    names: Vec<String>,
}

impl Pattern {
    /// Compiles `pattern`, failing if it is structurally invalid.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        if !pattern.is_empty() && !pattern.starts_with('/') {
            return Err(Error::malformed(pattern, "expected a leading '/'"));
        }

        let tokens = tokenize(pattern)?;
        let mut names: Vec<String> = Vec::new();
        let mut expr = String::from("^");

        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::Literal(text) => {
                    // a whole-segment optional capture swallows the separator before it
                    let text = match tokens.get(i + 1) {
                        Some(Token::Param { optional: true, .. })
                            if text.ends_with('/') && segment_ends(&tokens, i + 1) =>
                        {
                            &text[..text.len() - 1]
                        }
                        _ => text.as_str(),
                    };
                    expr.push_str(&regex::escape(text));
                }
                Token::Param { name, optional } => {
                    let whole_segment = *optional
                        && i > 0
                        && matches!(&tokens[i - 1], Token::Literal(t) if t.ends_with('/'))
                        && segment_ends(&tokens, i);

                    if whole_segment {
                        expr.push_str(&format!("(?:/(?P<{}>[^/]+))?", name));
                    } else if *optional {
                        expr.push_str(&format!("(?P<{}>[^/]+)?", name));
                    } else {
                        expr.push_str(&format!("(?P<{}>[^/]+)", name));
                    }
                    names.push(name.clone());
                }
                Token::CatchAll(name) => {
                    expr.push_str(&format!("(?P<{}>.+)?", name));
                    names.push(name.clone());
                }
            }
        }

        expr.push_str("/?$");

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(Error::malformed(
                    pattern,
                    format!("duplicate parameter `{}`", name),
                ));
            }
        }

        let regex = Regex::new(&expr).map_err(|e| Error::malformed(pattern, e.to_string()))?;

        Ok(Self {
            source: pattern.to_owned(),
            regex,
            names,
        })
    }

    /// The pattern string this matcher was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The parameter names declared by the pattern, in order of appearance.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Tests `path` without extracting parameters.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Matches `path` and returns the captured parameters.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let caps = self.regex.captures(path)?;
        let mut params = Params::default();

        for name in &self.names {
            if let Some(value) = caps.name(name) {
                params.insert(name.as_str(), value.as_str());
            }
        }

        Some(params)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &self.source)
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Literal(String),
    Param { name: String, optional: bool },
    CatchAll(String),
}

// true if the token at `i` is followed by a separator or the end of the pattern
fn segment_ends(tokens: &[Token], i: usize) -> bool {
    match tokens.get(i + 1) {
        None => true,
        Some(Token::Literal(t)) => t.starts_with('/'),
        Some(_) => false,
    }
}

fn tokenize(pattern: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '$' {
            literal.push(c);
            continue;
        }

        let catch_all = matches!(chars.peek(), Some((_, '$')));
        if catch_all {
            chars.next();
        }

        let mut name = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                chars.next();
            } else {
                break;
            }
        }

        match name.chars().next() {
            None => return Err(Error::malformed(pattern, "expected a name after '$'")),
            Some(first) if first.is_ascii_digit() => {
                return Err(Error::malformed(
                    pattern,
                    format!("parameter name `{}` must not start with a digit", name),
                ))
            }
            _ => {}
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
        }

        if catch_all {
            if chars.peek().is_some() {
                return Err(Error::malformed(
                    pattern,
                    format!("catch-all `$${}` must be the final element", name),
                ));
            }
            tokens.push(Token::CatchAll(name));
        } else {
            let optional = matches!(chars.peek(), Some((_, '?')));
            if optional {
                chars.next();
            }
            tokens.push(Token::Param { name, optional });
        }
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }

    Ok(tokens)
}
