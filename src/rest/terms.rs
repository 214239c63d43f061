//! Allow-lists of search parameter names for POWO and IPNI.
//!
//! Built-in lists cover the documented vocabulary. A markdown vocabulary
//! file can replace them at runtime:
//!
//! ```text
//! ## Name Terms
//! - genus  Genus name
//! - family
//!
//! # IPNI Search Terms
//! ## Author Terms
//! - author
//! ```
//!
//! `## <Group>` headers select the group, `- term` lines add the first word
//! of the line (lower-cased) and `# IPNI Search Terms` switches from the
//! POWO section to the IPNI section. Lines under an unrecognized header are
//! ignored.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::config::ClientMode;

const POWO_NAME: &[&str] = &[
    "full_name",
    "scientific_name",
    "genus",
    "species",
    "infraspecific",
    "family",
    "common_name",
    "author",
    "rank",
    "status",
];
const POWO_CHARACTERISTIC: &[&str] = &[
    "summary",
    "appearance",
    "flower",
    "fruit",
    "leaf",
    "habit",
    "habitat",
    "use",
    "conservation",
];
const POWO_GEOGRAPHY: &[&str] = &[
    "distribution",
    "native_distribution",
    "introduced_distribution",
    "region",
    "continent",
    "country",
];
const POWO_ADDITIONAL: &[&str] = &["accepted", "images", "page", "limit", "sort"];

const IPNI_NAME: &[&str] = &[
    "genus",
    "species",
    "infraspecific_rank",
    "infraspecific_name",
    "family",
    "publication_year",
    "full_name",
];
const IPNI_AUTHOR: &[&str] = &["author", "standard_form", "collaboration"];
const IPNI_PUBLICATION: &[&str] = &[
    "publication_title",
    "publication_year",
    "publication_place",
    "publisher",
];

const POWO_GROUP_HEADERS: &[(&str, &str)] = &[
    ("name terms", "name"),
    ("characteristic terms", "characteristic"),
    ("geography terms", "geography"),
    ("additional filters", "additional"),
];
const IPNI_GROUP_HEADERS: &[(&str, &str)] = &[
    ("name terms", "name"),
    ("author terms", "author"),
    ("publication terms", "publication"),
];

const IPNI_SECTION_HEADER: &str = "# IPNI Search Terms";

type Groups = BTreeMap<&'static str, Vec<String>>;

/// Parameter allow-lists, grouped per mode.
///
/// # Example
///
/// ```rust
/// use powo_api::rest::Terms;
/// use powo_api::ClientMode;
///
/// let terms = Terms::builtin();
/// let allowed = terms.allowed_params(ClientMode::Powo);
///
/// assert!(allowed.contains("genus"));
/// assert!(allowed.contains("accepted"));
/// assert!(!terms.allowed_params(ClientMode::Ipni).contains("accepted"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terms {
    source_path: Option<PathBuf>,
    powo: Groups,
    ipni: Groups,
}

impl Terms {
    /// Returns the built-in allow-lists.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            source_path: None,
            powo: builtin_powo(),
            ipni: builtin_ipni(),
        }
    }

    /// Loads allow-lists from `path`, falling back to the built-ins.
    ///
    /// The fallback is used when no path is given, or the file is missing,
    /// unreadable or blank.
    #[must_use]
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };

        Self::parse_markdown(path).unwrap_or_else(|| {
            tracing::debug!(
                path = %path.display(),
                "Search terms file unavailable; using built-in allow-lists"
            );
            Self {
                source_path: Some(path.to_path_buf()),
                ..Self::builtin()
            }
        })
    }

    /// Parses a markdown vocabulary file.
    ///
    /// Returns `None` if the file cannot be read or is blank.
    #[must_use]
    pub fn parse_markdown(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        let mut terms = Self::parse_str(&content)?;
        terms.source_path = Some(path.to_path_buf());
        Some(terms)
    }

    /// Parses markdown vocabulary text. Returns `None` if it is blank.
    ///
    /// A section that yields no groups keeps its built-in lists.
    #[must_use]
    pub fn parse_str(content: &str) -> Option<Self> {
        if content.trim().is_empty() {
            return None;
        }

        let mut in_ipni = false;
        let mut group: Option<&'static str> = None;
        let mut powo = Groups::new();
        let mut ipni = Groups::new();

        for line in content.lines().map(str::trim) {
            if line.is_empty() {
                continue;
            }

            if line == IPNI_SECTION_HEADER {
                in_ipni = true;
                group = None;
                continue;
            }

            if let Some(header) = line.strip_prefix("## ") {
                let header = header.to_lowercase();
                let headers = if in_ipni {
                    IPNI_GROUP_HEADERS
                } else {
                    POWO_GROUP_HEADERS
                };
                group = headers
                    .iter()
                    .find(|(title, _)| *title == header)
                    .map(|(_, name)| *name);
                continue;
            }

            let (Some(item), Some(group)) = (line.strip_prefix("- "), group) else {
                continue;
            };
            let Some(term) = item.split_whitespace().next() else {
                continue;
            };

            let term = term.to_lowercase();
            let target = if in_ipni { &mut ipni } else { &mut powo };
            let list = target.entry(group).or_default();
            if !list.contains(&term) {
                list.push(term);
            }
        }

        Some(Self {
            source_path: None,
            powo: if powo.is_empty() { builtin_powo() } else { powo },
            ipni: if ipni.is_empty() { builtin_ipni() } else { ipni },
        })
    }

    /// Returns the file the lists were loaded from, if any.
    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Returns the terms of one group, e.g. `"name"` or `"geography"`.
    #[must_use]
    pub fn group(&self, mode: ClientMode, group: &str) -> Option<&[String]> {
        self.groups(mode).get(group).map(Vec::as_slice)
    }

    /// Returns every parameter name accepted in `mode`.
    #[must_use]
    pub fn allowed_params(&self, mode: ClientMode) -> BTreeSet<String> {
        self.groups(mode).values().flatten().cloned().collect()
    }

    const fn groups(&self, mode: ClientMode) -> &Groups {
        match mode {
            ClientMode::Powo => &self.powo,
            ClientMode::Ipni => &self.ipni,
        }
    }
}

impl Default for Terms {
    fn default() -> Self {
        Self::builtin()
    }
}

fn owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(ToString::to_string).collect()
}

fn builtin_powo() -> Groups {
    Groups::from([
        ("name", owned(POWO_NAME)),
        ("characteristic", owned(POWO_CHARACTERISTIC)),
        ("geography", owned(POWO_GEOGRAPHY)),
        ("additional", owned(POWO_ADDITIONAL)),
    ])
}

fn builtin_ipni() -> Groups {
    Groups::from([
        ("name", owned(IPNI_NAME)),
        ("author", owned(IPNI_AUTHOR)),
        ("publication", owned(IPNI_PUBLICATION)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKDOWN: &str = "\
# POWO Search Terms

## Name Terms
- Genus  the genus
- family
- genus duplicate

## Unknown Section
- ignored

## Additional Filters
- accepted

# IPNI Search Terms

## Author Terms
- standard_form
";

    #[test]
    fn test_builtin_powo_allow_list() {
        let allowed = Terms::builtin().allowed_params(ClientMode::Powo);
        assert_eq!(allowed.len(), 30);
        for name in ["full_name", "flower", "native_distribution", "sort"] {
            assert!(allowed.contains(name), "{name} missing");
        }
    }

    #[test]
    fn test_builtin_ipni_allow_list_deduplicates_across_groups() {
        let allowed = Terms::builtin().allowed_params(ClientMode::Ipni);
        // publication_year appears in both name and publication groups.
        assert_eq!(allowed.len(), 13);
        assert!(allowed.contains("publication_year"));
        assert!(allowed.contains("collaboration"));
    }

    #[test]
    fn test_parse_markdown_groups_and_sections() {
        let terms = Terms::parse_str(MARKDOWN).unwrap();

        assert_eq!(
            terms.group(ClientMode::Powo, "name"),
            Some(&["genus".to_string(), "family".to_string()][..])
        );
        assert_eq!(
            terms.allowed_params(ClientMode::Powo),
            BTreeSet::from(["accepted".to_string(), "family".to_string(), "genus".to_string()])
        );
        assert_eq!(
            terms.allowed_params(ClientMode::Ipni),
            BTreeSet::from(["standard_form".to_string()])
        );
    }

    #[test]
    fn test_section_without_groups_keeps_builtins() {
        let terms = Terms::parse_str("## Name Terms\n- genus\n").unwrap();
        assert_eq!(terms.allowed_params(ClientMode::Powo).len(), 1);
        assert_eq!(
            terms.allowed_params(ClientMode::Ipni),
            Terms::builtin().allowed_params(ClientMode::Ipni)
        );
    }

    #[test]
    fn test_blank_content_is_rejected() {
        assert!(Terms::parse_str("").is_none());
        assert!(Terms::parse_str(" \n\t\n").is_none());
    }

    #[test]
    fn test_load_without_path_uses_builtins() {
        assert_eq!(Terms::load(None), Terms::builtin());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let path = Path::new("/definitely/not/here/POWO_SEARCH_TERMS.md");
        let terms = Terms::load(Some(path));

        assert_eq!(terms.source_path(), Some(path));
        assert_eq!(
            terms.allowed_params(ClientMode::Powo),
            Terms::builtin().allowed_params(ClientMode::Powo)
        );
        assert!(Terms::parse_markdown(path).is_none());
    }
}
