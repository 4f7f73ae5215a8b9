use std::{fmt::Display, sync::OnceLock};

use anyhow::{bail, Context};
use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::contacts::Contact;

/// A message template using `{column}` placeholders
///
/// `{{` and `}}` are escapes for literal braces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

impl Template {
    /// Field names referenced by the template in order of first use
    pub fn placeholders(&self) -> Vec<&str> {
        let mut result: Vec<&str> = vec![];
        for segment in &self.segments {
            if let Segment::Field(name) = segment {
                if !result.contains(&name.as_str()) {
                    result.push(name);
                }
            }
        }
        result
    }

    pub fn render(&self, contact: &Contact) -> anyhow::Result<String> {
        let mut result = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => result.push_str(text),
                Segment::Field(name) => match contact.get(name) {
                    Some(value) => result.push_str(value),
                    None => bail!("contact has no value for placeholder {{{name}}}"),
                },
            }
        }
        Ok(result)
    }
}

impl TryFrom<&str> for Template {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        static CELL_TOKEN: OnceLock<Regex> = OnceLock::new();
        let re_token = CELL_TOKEN.get_or_init(|| {
            debug!("Compiling regex for parsing templates");
            Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("failed to compile regex")
        });

        let mut segments = vec![];
        let mut literal = String::new();
        let mut last_end = 0;
        for captures in re_token.captures_iter(value) {
            let whole = captures.get(0).unwrap(); // Group 0 is always the full match
            literal.push_str(&value[last_end..whole.start()]);
            last_end = whole.end();
            match (whole.as_str(), captures.get(1)) {
                ("{{", _) => literal.push('{'),
                ("}}", _) => literal.push('}'),
                (_, Some(field)) => {
                    let name = field.as_str();
                    validate_field_name(name)
                        .with_context(|| format!("Invalid placeholder at byte {}", whole.start()))?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(name.to_string()));
                }
                (brace, None) => {
                    bail!("Single {brace:?} encountered at byte {} in template", whole.start())
                }
            }
        }
        literal.push_str(&value[last_end..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: value.to_string(),
            segments,
        })
    }
}

impl TryFrom<String> for Template {
    type Error = anyhow::Error;

    fn try_from(value: String) -> anyhow::Result<Self> {
        value.as_str().try_into()
    }
}

impl Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

fn validate_field_name(name: &str) -> anyhow::Result<()> {
    if name.trim().is_empty() {
        bail!("empty placeholder {{}} is not supported, name the column instead");
    }
    if let Some(c) = name.chars().find(|c| matches!(c, ':' | '!')) {
        bail!("format specs and conversions are not supported ({c:?} in {{{name}}})");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn contact(pairs: &[(&str, &str)]) -> Contact {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn render_replaces_placeholders() {
        // Arrange
        let template = Template::try_from("Hello {name}, your code is {code}.").unwrap();
        let contact = contact(&[("name", "Ada"), ("code", "X1"), ("email", "ada@example.com")]);

        // Act
        let actual = template.render(&contact).unwrap();

        // Assert
        assert_eq!(actual, "Hello Ada, your code is X1.");
    }

    #[test]
    fn render_keeps_escaped_braces() {
        let template = Template::try_from("{{literal}} {name} }}").unwrap();
        let contact = contact(&[("name", "Bob")]);
        assert_eq!(template.render(&contact).unwrap(), "{literal} Bob }");
    }

    #[test]
    fn render_repeated_placeholder() {
        let template = Template::try_from("{name}{name}").unwrap();
        let contact = contact(&[("name", "ab")]);
        assert_eq!(template.render(&contact).unwrap(), "abab");
        assert_eq!(template.placeholders(), vec!["name"]);
    }

    #[test]
    fn render_missing_value_names_field() {
        let template = Template::try_from("Hi {first_name}").unwrap();
        let contact = contact(&[("email", "a@b.c")]);
        let err = template.render(&contact).unwrap_err();
        assert!(err.to_string().contains("{first_name}"), "{err}");
    }

    #[test]
    fn placeholders_in_order() {
        let template = Template::try_from("{b} and {a} then {b} {{c}}").unwrap();
        assert_eq!(template.placeholders(), vec!["b", "a"]);
    }

    #[test]
    fn no_placeholders() {
        let template = Template::try_from("Plain text\nwith lines").unwrap();
        assert!(template.placeholders().is_empty());
        assert_eq!(
            template.render(&Contact::default()).unwrap(),
            "Plain text\nwith lines"
        );
    }

    #[rstest]
    #[case("Hello {")]
    #[case("Hello }")]
    #[case("{}")]
    #[case("{name:>10}")]
    #[case("{name!r}")]
    #[case("{outer{inner}}")]
    fn parse_invalid(#[case] input: &str) {
        assert!(Template::try_from(input).is_err(), "{input:?} should not parse");
    }

    #[test]
    fn deserialize_from_json_string() {
        let template: Template = serde_json::from_str(r#""Dear {name}""#).unwrap();
        assert_eq!(template.to_string(), "Dear {name}");
        assert!(serde_json::from_str::<Template>(r#""Dear {name""#).is_err());
    }
}
