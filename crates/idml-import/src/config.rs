//! Import configuration
//!
//! Options can be built in code or loaded from TOML:
//!
//! ```toml
//! layout = "parallax-list"
//!
//! [order_override]
//! u1f0 = 2
//! u2a1 = 1
//!
//! [vocabulary]
//! headline = ["headline", "aufmacher"]
//!
//! [rendition]
//! suffix = "-300x200"
//! extension = "jpg"
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};

/// Which repeating content pattern the page uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// Teasers and info teasers
    #[default]
    TeaserList,
    /// Parallax items
    ParallaxList,
}

impl LayoutMode {
    /// Configuration name of the layout
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TeaserList => "teaser-list",
            Self::ParallaxList => "parallax-list",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "teaser-list" | "teaser" | "teasers" => Ok(Self::TeaserList),
            "parallax-list" | "parallax" => Ok(Self::ParallaxList),
            other => Err(ImportError::Config(format!(
                "unknown layout '{other}' (expected teaser-list or parallax-list)"
            ))),
        }
    }
}

/// Paragraph style prefixes marking each semantic role
///
/// Matching is a case-insensitive prefix test against the decoded style
/// name, so `"headline"` matches `Headline`, `Headline 2` and `headline-big`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleVocabulary {
    /// Page headline
    pub headline: Vec<String>,
    /// Lead / standfirst
    pub lead: Vec<String>,
    /// Teaser location line
    pub location: Vec<String>,
    /// Teaser intro paragraph carrying the link run
    pub teaser_link: Vec<String>,
    /// Explicit teaser headline
    pub teaser_headline: Vec<String>,
    /// Info story location
    pub info_location: Vec<String>,
    /// Info story headline
    pub info_head: Vec<String>,
    /// Info story body
    pub info_body: Vec<String>,
    /// Headline fallback (versal / H1 styles)
    pub alt_headline: Vec<String>,
    /// Lead fallback (info page intro)
    pub alt_lead: Vec<String>,
}

fn prefixes(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

impl Default for StyleVocabulary {
    fn default() -> Self {
        Self {
            headline: prefixes(&["headline", "titel", "title"]),
            lead: prefixes(&["lead", "standfirst", "vorspann"]),
            location: prefixes(&["location", "ortsmarke", "dachzeile"]),
            teaser_link: prefixes(&["teaser-link", "teaser link", "teaserlink"]),
            teaser_headline: prefixes(&["teaser-headline", "teaser headline", "teaserheadline"]),
            info_location: prefixes(&["info-location", "info-ort", "infoseite-ort"]),
            info_head: prefixes(&["info-head", "infoseite-head"]),
            info_body: prefixes(&["info-body", "info-text", "infoseite-text"]),
            alt_headline: prefixes(&["versal", "h1"]),
            alt_lead: prefixes(&["info-intro", "infoseite-intro"]),
        }
    }
}

impl StyleVocabulary {
    /// Whether `style` starts with any of `prefixes`, ignoring case
    #[must_use]
    pub fn matches(style: &str, prefixes: &[String]) -> bool {
        let style = style.trim().to_lowercase();
        prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && style.starts_with(&prefix.to_lowercase()))
    }
}

/// Naming of the small rendition looked up in the asset library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenditionConfig {
    /// Appended to the original file stem
    pub suffix: String,
    /// Extension of the rendition file, without dot
    pub extension: String,
}

impl Default for RenditionConfig {
    fn default() -> Self {
        Self {
            suffix: "_small".to_string(),
            extension: "jpg".to_string(),
        }
    }
}

/// Options for one import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Layout selecting which record list is populated and validated
    pub layout: LayoutMode,
    /// Sort keys for info teasers, by story id
    pub order_override: HashMap<String, i64>,
    /// Style prefixes used by the classifier
    pub vocabulary: StyleVocabulary,
    /// Rendition naming for asset lookup
    pub rendition: RenditionConfig,
}

impl ImportOptions {
    /// Options for the given layout with everything else defaulted
    #[must_use]
    pub fn for_layout(layout: LayoutMode) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Parse options from TOML text
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Config` if the TOML is invalid.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ImportError::Config(format!("invalid TOML: {e}")))
    }

    /// Load options from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Io` if the file cannot be read and
    /// `ImportError::Config` if it is not valid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_str() {
        assert_eq!("parallax".parse::<LayoutMode>().unwrap(), LayoutMode::ParallaxList);
        assert_eq!(" Teaser-List ".parse::<LayoutMode>().unwrap(), LayoutMode::TeaserList);
        assert!("grid".parse::<LayoutMode>().is_err());
    }

    #[test]
    fn test_vocabulary_prefix_match() {
        let vocabulary = StyleVocabulary::default();
        assert!(StyleVocabulary::matches("Headline 2", &vocabulary.headline));
        assert!(StyleVocabulary::matches("TEASER-LINK", &vocabulary.teaser_link));
        assert!(!StyleVocabulary::matches("Teaser-Headline", &vocabulary.headline));
        assert!(!StyleVocabulary::matches("Info-Location", &vocabulary.location));
    }

    #[test]
    fn test_options_from_toml() {
        let options = ImportOptions::from_toml_str(
            r#"
layout = "parallax-list"

[order_override]
u1 = 3

[vocabulary]
headline = ["aufmacher"]

[rendition]
suffix = "-300x200"
"#,
        )
        .unwrap();

        assert_eq!(options.layout, LayoutMode::ParallaxList);
        assert_eq!(options.order_override["u1"], 3);
        assert_eq!(options.vocabulary.headline, vec!["aufmacher".to_string()]);
        assert_eq!(options.vocabulary.lead, StyleVocabulary::default().lead);
        assert_eq!(options.rendition.suffix, "-300x200");
        assert_eq!(options.rendition.extension, "jpg");
    }

    #[test]
    fn test_options_invalid_toml() {
        let result = ImportOptions::from_toml_str("layout = \"grid\"");
        assert!(matches!(result, Err(ImportError::Config(_))));
    }
}
