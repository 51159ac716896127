//! Typed selector expressions.
//!
//! Candidate lists are written in the compact syntax used by page-object
//! suites (`text=About`, `a:has-text('About')`, `[href*='about']`) and parsed
//! into a [`Selector`] that each backend knows how to evaluate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::DriverError;

/// A way of locating elements on a page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Selector {
    /// CSS selector (e.g., "header nav a")
    Css(String),
    /// XPath expression
    XPath(String),
    /// Innermost element whose normalized text contains the string,
    /// case-insensitive
    Text(String),
    /// CSS matches whose text content contains the string, case-insensitive
    HasText { css: String, text: String },
}

impl Selector {
    pub fn css(selector: impl Into<String>) -> Self {
        Selector::Css(selector.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Selector::Text(text.into())
    }

    pub fn has_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Selector::HasText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// Parse a selector expression
    pub fn parse(expr: &str) -> Result<Self, DriverError> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(invalid(expr, "selector is empty"));
        }

        if let Some(text) = trimmed.strip_prefix("text=") {
            let text = unquote(text.trim());
            if text.is_empty() {
                return Err(invalid(expr, "text selector has no text"));
            }
            return Ok(Selector::Text(text.to_string()));
        }

        if let Some(xpath) = trimmed.strip_prefix("xpath=") {
            return Ok(Selector::XPath(xpath.trim().to_string()));
        }

        if let Some(pos) = trimmed.find(":has-text(") {
            let inner = trimmed[pos + ":has-text(".len()..]
                .strip_suffix(')')
                .ok_or_else(|| invalid(expr, "unterminated :has-text("))?;
            let text = unquote(inner.trim());
            if text.is_empty() {
                return Err(invalid(expr, ":has-text() has no text"));
            }
            let css = trimmed[..pos].trim();
            return Ok(Selector::HasText {
                css: if css.is_empty() { "*" } else { css }.to_string(),
                text: text.to_string(),
            });
        }

        Ok(Selector::Css(trimmed.to_string()))
    }

    /// XPath expression matching the innermost elements whose normalized
    /// text contains `text` in any letter case, outside of `<head>`,
    /// `<script>` and `<style>`
    pub fn text_xpath(text: &str) -> String {
        let folded = format!(
            "translate(normalize-space(.), '{}', '{}')",
            UPPER_LETTERS, LOWER_LETTERS
        );
        let literal = xpath_literal(&text.to_lowercase());
        format!(
            "//body//*[not(self::script or self::style)][contains({text}, {lit})][not(.//*[contains({text}, {lit})])]",
            text = folded,
            lit = literal
        )
    }
}

// XPath 1.0 has no lower-case(); translate() folds these letters instead
const UPPER_LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZАБВГДЕЁЖЗИЙКЛМНОПРСТУФХЦЧШЩЪЫЬЭЮЯ";
const LOWER_LETTERS: &str = "abcdefghijklmnopqrstuvwxyzабвгдеёжзийклмнопрстуфхцчшщъыьэюя";

/// Quote a string as an XPath 1.0 literal
pub fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        format!("'{}'", s)
    } else if !s.contains('"') {
        format!("\"{}\"", s)
    } else {
        let parts: Vec<String> = s.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'\'' || first == b'"') && first == last {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn invalid(expr: &str, reason: &str) -> DriverError {
    DriverError::InvalidSelector {
        selector: expr.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(css) => write!(f, "{}", css),
            Selector::XPath(xpath) => write!(f, "xpath={}", xpath),
            Selector::Text(text) => write!(f, "text={}", text),
            Selector::HasText { css, text } => write!(f, "{}:has-text('{}')", css, text),
        }
    }
}

impl FromStr for Selector {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl TryFrom<String> for Selector {
    type Error = DriverError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Selector::parse(&s)
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

#[cfg(test)]
#[path = "selector_test.rs"]
mod selector_test;
