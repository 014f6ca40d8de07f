use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A hierarchical name such as `/thisRoom/pi/42/led/2/value/on`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct Name {
    components: Vec<String>,
}

impl Name {
    /// Parse a URI-style name. Empty components ("//", trailing "/") are ignored.
    pub fn from_uri(uri: &str) -> Self {
        Self {
            components: uri
                .split('/')
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn is_prefix_of(&self, other: &Name) -> bool {
        other.components.starts_with(&self.components)
    }

    /// Returns a new name with `component` appended.
    pub fn append(&self, component: impl Into<String>) -> Self {
        let mut components = self.components.clone();
        components.push(component.into());
        Self { components }
    }

    pub fn to_uri(&self) -> String {
        if self.components.is_empty() {
            return "/".to_string();
        }
        self.components.iter().fold(String::new(), |mut uri, c| {
            uri.push('/');
            uri.push_str(c);
            uri
        })
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

impl From<&str> for Name {
    fn from(uri: &str) -> Self {
        Self::from_uri(uri)
    }
}

impl From<String> for Name {
    fn from(uri: String) -> Self {
        Self::from_uri(&uri)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.to_uri()
    }
}

/// Requested action. Accepted on the wire but every authorized request toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    On,
    Off,
    Toggle,
}

impl Action {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "on" => Some(Self::On),
            "off" => Some(Self::Off),
            "toggle" => Some(Self::Toggle),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Toggle => "toggle",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields carried by `<root>/<code>/led/<output>/value/<action>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedRequest {
    pub access_code: String,
    /// Output identifier exactly as it appeared in the name (ASCII digits).
    pub output: String,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name is not under {0}")]
    NotUnderRoot(String),
    #[error("expected {expected} components, got {actual}")]
    ComponentCount { expected: usize, actual: usize },
    #[error("{field} component {value:?} is not numeric")]
    NotNumeric { field: &'static str, value: String },
    #[error("expected {expected:?}, got {actual:?}")]
    UnexpectedKeyword { expected: &'static str, actual: String },
    #[error("unknown action {0:?}")]
    UnknownAction(String),
}

/// Number of components following the root prefix in a request name.
const REQUEST_SUFFIX_LEN: usize = 5;

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn numeric(field: &'static str, value: &str) -> Result<String, NameError> {
    if is_digits(value) {
        Ok(value.to_string())
    } else {
        Err(NameError::NotNumeric {
            field,
            value: value.to_string(),
        })
    }
}

fn keyword(expected: &'static str, actual: &str) -> Result<(), NameError> {
    if actual == expected {
        Ok(())
    } else {
        Err(NameError::UnexpectedKeyword {
            expected,
            actual: actual.to_string(),
        })
    }
}

/// Parse a request name of the form `<root>/<code>/led/<output>/value/<action>`.
pub fn parse_request(name: &Name, root: &Name) -> Result<LedRequest, NameError> {
    if !root.is_prefix_of(name) {
        return Err(NameError::NotUnderRoot(root.to_uri()));
    }

    let [code, led, output, value, action] = &name.components()[root.len()..] else {
        return Err(NameError::ComponentCount {
            expected: root.len() + REQUEST_SUFFIX_LEN,
            actual: name.len(),
        });
    };

    let access_code = numeric("access code", code)?;
    keyword("led", led)?;
    let output = numeric("output", output)?;
    keyword("value", value)?;
    let action = Action::parse(action).ok_or_else(|| NameError::UnknownAction(action.clone()))?;

    Ok(LedRequest {
        access_code,
        output,
        action,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Name {
        Name::from_uri("/thisRoom/pi")
    }

    fn parse(uri: &str) -> Result<LedRequest, NameError> {
        parse_request(&Name::from_uri(uri), &root())
    }

    #[test]
    fn uri_round_trip_ignores_empty_components() {
        let name = Name::from_uri("//thisRoom/pi/");
        assert_eq!(name.components(), ["thisRoom", "pi"]);
        assert_eq!(name.to_uri(), "/thisRoom/pi");
        assert_eq!(Name::default().to_uri(), "/");
    }

    #[test]
    fn prefix_matching_is_per_component() {
        assert!(root().is_prefix_of(&Name::from_uri("/thisRoom/pi/42")));
        assert!(!root().is_prefix_of(&Name::from_uri("/thisRoom/pie/42")));
        assert!(!root().is_prefix_of(&Name::from_uri("/thisRoom")));
    }

    #[test]
    fn parses_well_formed_request() {
        let req = parse("/thisRoom/pi/42/led/2/value/on").unwrap();
        assert_eq!(req.access_code, "42");
        assert_eq!(req.output, "2");
        assert_eq!(req.action, Action::On);

        assert_eq!(parse("/thisRoom/pi/7/led/99/value/toggle").unwrap().action, Action::Toggle);
        assert_eq!(parse("/thisRoom/pi/7/led/1/value/off").unwrap().action, Action::Off);
    }

    #[test]
    fn rejects_other_roots() {
        assert_eq!(
            parse("/otherRoom/pi/42/led/2/value/on"),
            Err(NameError::NotUnderRoot("/thisRoom/pi".into()))
        );
    }

    #[test]
    fn rejects_wrong_component_count() {
        assert_eq!(
            parse("/thisRoom/pi/42/led/2/value"),
            Err(NameError::ComponentCount { expected: 7, actual: 6 })
        );
        assert_eq!(
            parse("/thisRoom/pi/42/led/2/value/on/extra"),
            Err(NameError::ComponentCount { expected: 7, actual: 8 })
        );
        assert!(parse("/thisRoom/pi").is_err());
    }

    #[test]
    fn rejects_non_numeric_fields() {
        assert!(matches!(
            parse("/thisRoom/pi/4x/led/2/value/on"),
            Err(NameError::NotNumeric { field: "access code", .. })
        ));
        assert!(matches!(
            parse("/thisRoom/pi/42/led/abc/value/on"),
            Err(NameError::NotNumeric { field: "output", .. })
        ));
        assert!(matches!(
            parse("/thisRoom/pi/-1/led/2/value/on"),
            Err(NameError::NotNumeric { .. })
        ));
    }

    #[test]
    fn rejects_wrong_keywords() {
        assert_eq!(
            parse("/thisRoom/pi/42/lights/2/value/on"),
            Err(NameError::UnexpectedKeyword {
                expected: "led",
                actual: "lights".into()
            })
        );
        assert_eq!(
            parse("/thisRoom/pi/42/led/2/state/on"),
            Err(NameError::UnexpectedKeyword {
                expected: "value",
                actual: "state".into()
            })
        );
    }

    #[test]
    fn rejects_unknown_action() {
        assert_eq!(
            parse("/thisRoom/pi/42/led/2/value/blink"),
            Err(NameError::UnknownAction("blink".into()))
        );
        assert!(parse("/thisRoom/pi/42/led/2/value/ON").is_err());
    }

    #[test]
    fn serializes_as_uri_string() {
        let json = serde_json::to_string(&root()).unwrap();
        assert_eq!(json, "\"/thisRoom/pi\"");
        let back: Name = serde_json::from_str(&json).unwrap();
        assert_eq!(back, root());
    }
}
