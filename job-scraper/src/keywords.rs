use serde::{Deserialize, Serialize};

const SENIORITY: [&str; 10] = [
    "junior",
    "jr",
    "entry",
    "entry-level",
    "intern",
    "internship",
    "trainee",
    "level 1",
    "tier 1",
    "tier1",
];

const ROLE: [&str; 9] = [
    "it support",
    "help desk",
    "helpdesk",
    "noc",
    "soc",
    "sysadmin",
    "system administrator",
    "desktop support",
    "technical support",
];

const REMOTE: [&str; 3] = ["remote", "work from home", "wfh"];

const EXCLUDE: [&str; 10] = [
    "senior",
    "sr.",
    "sr ",
    "lead",
    "manager",
    "director",
    "principal",
    "architect",
    "head of",
    "staff",
];

const MAX_EXPERIENCE_YEARS: u32 = 3;

fn owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}

/// Keyword sets used to classify candidates.
/// Every field falls back to its default when missing from a config file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Keywords {
    pub seniority: Vec<String>,
    pub role: Vec<String>,
    /// `None` disables the remote filter
    pub remote: Option<Vec<String>>,
    /// title terms that mark a posting as senior
    pub exclude: Vec<String>,
    pub max_experience_years: Option<u32>,
}

impl Default for Keywords {
    fn default() -> Self {
        Self {
            seniority: owned(&SENIORITY),
            role: owned(&ROLE),
            remote: Some(owned(&REMOTE)),
            exclude: owned(&EXCLUDE),
            max_experience_years: Some(MAX_EXPERIENCE_YEARS),
        }
    }
}

impl Keywords {
    pub fn without_remote_filter(mut self) -> Self {
        self.remote = None;
        self
    }
}

/// First term of `terms` found in `haystack`.
/// `haystack` must already be lowercase.
pub(crate) fn first_match<'a>(haystack: &str, terms: &'a [String]) -> Option<&'a str> {
    terms
        .iter()
        .map(String::as_str)
        .filter(|term| !term.is_empty())
        .find(|term| haystack.contains(&term.to_lowercase()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_first_match_is_case_insensitive_on_terms() {
        let terms = owned(&["Help Desk", "NOC"]);
        assert_eq!(first_match("remote help desk agent", &terms), Some("Help Desk"));
        assert_eq!(first_match("field engineer", &terms), None);
    }

    #[test]
    fn test_first_match_skips_empty_terms() {
        let terms = owned(&["", "wfh"]);
        assert_eq!(first_match("anything", &terms), None);
    }

    #[test]
    fn test_partial_keywords_json_uses_defaults() {
        let keywords: Keywords =
            serde_json::from_str(r#"{"role": ["service desk"], "remote": null}"#)
                .expect("valid keywords json");
        assert_eq!(keywords.role, vec!["service desk".to_owned()]);
        assert_eq!(keywords.seniority, Keywords::default().seniority);
        assert!(keywords.remote.is_none());
    }
}
