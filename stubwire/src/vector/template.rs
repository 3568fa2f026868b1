//! `${name}` payload templates and their arguments.

use indexmap::IndexMap;

use crate::error::VectorError;

/// Named arguments substituted into a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatArgs(IndexMap<String, String>);

impl FormatArgs {
    /// Create an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Get an argument by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Iterate over arguments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for FormatArgs {
    fn from(pairs: [(K, V); N]) -> Self {
        let mut args = Self::new();
        for (name, value) in pairs {
            args.insert(name, value);
        }
        args
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed payload template.
///
/// Only `${identifier}` is special. A bare `$` is literal, so templates can
/// carry code such as `$r=array();` unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template.
    pub fn new(source: impl Into<String>) -> Result<Self, VectorError> {
        let source = source.into();
        let mut segments = Vec::new();
        let mut rest = source.as_str();
        let mut offset = 0;

        while let Some(start) = rest.find("${") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or(VectorError::InvalidTemplate {
                position: offset + start,
            })?;
            let name = &after[..end];
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(VectorError::InvalidTemplate {
                    position: offset + start,
                });
            }
            segments.push(Segment::Placeholder(name.to_string()));

            let consumed = start + 2 + end + 1;
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { source, segments })
    }

    /// Substitute arguments into the template.
    ///
    /// `vector` names the owner in the error when an argument is missing.
    pub fn render(&self, vector: &str, args: &FormatArgs) -> Result<String, VectorError> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = args.get(name).ok_or_else(|| VectorError::MissingArgument {
                        vector: vector.to_string(),
                        argument: name.clone(),
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    /// Names of all placeholders, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// The unparsed template text.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_placeholders() {
        let template = Template::new("@system('${command}${stderr_redirection}');").unwrap();
        let args = FormatArgs::from([("command", "id"), ("stderr_redirection", " 2>&1")]);
        assert_eq!(
            template.render("system", &args).unwrap(),
            "@system('id 2>&1');"
        );
        assert_eq!(
            template.placeholders().collect::<Vec<_>>(),
            vec!["command", "stderr_redirection"]
        );
    }

    #[test]
    fn test_bare_dollar_is_literal() {
        let template = Template::new("$r=array(); @exec('${command}', $r);").unwrap();
        let args = FormatArgs::new().with("command", "ls");
        assert_eq!(
            template.render("exec", &args).unwrap(),
            "$r=array(); @exec('ls', $r);"
        );
    }

    #[test]
    fn test_missing_argument() {
        let template = Template::new("echo ${token}").unwrap();
        let err = template.render("echo", &FormatArgs::new()).unwrap_err();
        match err {
            VectorError::MissingArgument { vector, argument } => {
                assert_eq!(vector, "echo");
                assert_eq!(argument, "token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_placeholders() {
        assert!(matches!(
            Template::new("abc ${unterminated"),
            Err(VectorError::InvalidTemplate { position: 4 })
        ));
        assert!(Template::new("${}").is_err());
        assert!(Template::new("${two words}").is_err());
    }

    #[test]
    fn test_no_placeholders() {
        let template = Template::new("phpinfo();").unwrap();
        assert_eq!(template.render("info", &FormatArgs::new()).unwrap(), "phpinfo();");
        assert_eq!(template.as_str(), "phpinfo();");
    }
}
