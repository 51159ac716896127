//! Navigation targets and their candidate selectors.
//!
//! Candidate lists and expected URL patterns are data, keyed by
//! [`NavTarget`]. The built-in map covers the Russian and English link
//! variants of the site; a JSON file can override any subset of targets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::errors::NavError;
use crate::selector::Selector;

/// A logical site section reachable from the primary navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavTarget {
    AboutUs,
    Contacts,
    Services,
    Careers,
    Blog,
}

impl NavTarget {
    pub const ALL: [NavTarget; 5] = [
        NavTarget::AboutUs,
        NavTarget::Contacts,
        NavTarget::Services,
        NavTarget::Careers,
        NavTarget::Blog,
    ];

    /// Human-readable name, as used in step titles
    pub fn label(&self) -> &'static str {
        match self {
            NavTarget::AboutUs => "About Us",
            NavTarget::Contacts => "Contacts",
            NavTarget::Services => "Services",
            NavTarget::Careers => "Careers",
            NavTarget::Blog => "Blog",
        }
    }

    /// Section word used in assertion messages ("about", "contacts", ...)
    pub fn section(&self) -> &'static str {
        match self {
            NavTarget::AboutUs => "about",
            NavTarget::Contacts => "contacts",
            NavTarget::Services => "services",
            NavTarget::Careers => "careers",
            NavTarget::Blog => "blog",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            NavTarget::AboutUs => "about_us",
            NavTarget::Contacts => "contacts",
            NavTarget::Services => "services",
            NavTarget::Careers => "careers",
            NavTarget::Blog => "blog",
        }
    }
}

impl fmt::Display for NavTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for NavTarget {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase().replace(['-', ' '], "_");
        NavTarget::ALL
            .into_iter()
            .find(|t| t.key() == normalized)
            .ok_or_else(|| NavError::Config(format!("Unknown navigation target: {}", s)))
    }
}

/// Candidate selectors and expected URL fragments for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Tried in order; the first visible one is clicked
    pub candidates: Vec<Selector>,
    /// Any of these appearing in the resulting URL counts as success
    pub url_patterns: Vec<String>,
}

impl TargetSpec {
    fn from_literals(candidates: &[&str], url_patterns: &[&str]) -> Self {
        TargetSpec {
            candidates: candidates
                .iter()
                .filter_map(|c| Selector::parse(c).ok())
                .collect(),
            url_patterns: url_patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Per-target candidate lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationMap {
    #[serde(default = "defaults::about_us")]
    pub about_us: TargetSpec,
    #[serde(default = "defaults::contacts")]
    pub contacts: TargetSpec,
    #[serde(default = "defaults::services")]
    pub services: TargetSpec,
    #[serde(default = "defaults::careers")]
    pub careers: TargetSpec,
    #[serde(default = "defaults::blog")]
    pub blog: TargetSpec,
}

impl Default for NavigationMap {
    fn default() -> Self {
        NavigationMap {
            about_us: defaults::about_us(),
            contacts: defaults::contacts(),
            services: defaults::services(),
            careers: defaults::careers(),
            blog: defaults::blog(),
        }
    }
}

impl NavigationMap {
    pub fn get(&self, target: NavTarget) -> &TargetSpec {
        match target {
            NavTarget::AboutUs => &self.about_us,
            NavTarget::Contacts => &self.contacts,
            NavTarget::Services => &self.services,
            NavTarget::Careers => &self.careers,
            NavTarget::Blog => &self.blog,
        }
    }

    /// Parse a JSON override; targets not mentioned keep their defaults
    pub fn from_json(json: &str) -> Result<Self, NavError> {
        let map: NavigationMap = serde_json::from_str(json)
            .map_err(|e| NavError::Config(format!("Invalid navigation map: {}", e)))?;
        map.validate()?;
        Ok(map)
    }

    pub fn from_file(path: &Path) -> Result<Self, NavError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            NavError::Config(format!(
                "Cannot read navigation map {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    /// Every target needs at least one candidate and one URL pattern
    pub fn validate(&self) -> Result<(), NavError> {
        for target in NavTarget::ALL {
            let spec = self.get(target);
            if spec.candidates.is_empty() {
                return Err(NavError::Config(format!(
                    "{} has no candidate selectors",
                    target.key()
                )));
            }
            if spec.url_patterns.is_empty() {
                return Err(NavError::Config(format!(
                    "{} has no URL patterns",
                    target.key()
                )));
            }
        }
        Ok(())
    }
}

mod defaults {
    use super::TargetSpec;

    pub fn about_us() -> TargetSpec {
        TargetSpec::from_literals(
            &[
                "text=О нас",
                "text=О компании",
                "[href*='about']",
                "a:has-text('О нас')",
                "a:has-text('О компании')",
            ],
            &["/about", "/o-nas", "/company", "/о-нас"],
        )
    }

    pub fn contacts() -> TargetSpec {
        TargetSpec::from_literals(
            &[
                "text=Контакты",
                "text=Contact us",
                "[href*='contact']",
                "a:has-text('Контакты')",
                "a:has-text('Contact')",
            ],
            &["/contact", "/kontakty", "/contacts", "/контакты"],
        )
    }

    pub fn services() -> TargetSpec {
        TargetSpec::from_literals(
            &[
                "text=Услуги",
                "text=Services",
                "[href*='service']",
                "a:has-text('Услуги')",
                "a:has-text('Services')",
            ],
            &["/service", "/uslugi", "/services", "/услуги"],
        )
    }

    pub fn careers() -> TargetSpec {
        TargetSpec::from_literals(
            &[
                "text=Карьера",
                "text=Careers",
                "[href*='career']",
                "a:has-text('Карьера')",
                "a:has-text('Careers')",
            ],
            &[
                "/career",
                "/karera",
                "/careers",
                "/карьера",
                "/vacancy",
                "/vacancies",
            ],
        )
    }

    pub fn blog() -> TargetSpec {
        TargetSpec::from_literals(
            &[
                "text=Блог",
                "text=Blog",
                "[href*='blog']",
                "a:has-text('Блог')",
                "a:has-text('Blog')",
            ],
            &["/blog", "/news", "/статьи", "/articles"],
        )
    }
}

/// First pattern found in `url`, compared case-insensitively against the
/// percent-decoded URL
pub fn matching_pattern<'a>(url: &str, patterns: &'a [String]) -> Option<&'a str> {
    // Undecodable URLs (invalid UTF-8 escapes) are matched as reported
    let url = urlencoding::decode(url)
        .map(|decoded| decoded.to_lowercase())
        .unwrap_or_else(|_| url.to_lowercase());
    patterns
        .iter()
        .find(|pattern| url.contains(&pattern.to_lowercase()))
        .map(String::as_str)
}

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;
