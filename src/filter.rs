//! Filename filter compilation and matching.

use anyhow::{Context, Result};
use regex::Regex;

/// A compiled filename filter.
///
/// Patterns use `*` and `?` wildcards and match case-insensitively against the
/// full filename (no partial matches). `*` matches one or more characters, not
/// zero, so `*.log` does not match a bare `.log`.
#[derive(Debug)]
pub struct NameFilter {
    pattern: String,
    matcher: Regex,
}

impl NameFilter {
    /// Compile a wildcard pattern into a filter
    pub fn compile(pattern: &str) -> Result<Self> {
        let escaped = regex::escape(pattern);
        let body = escaped.replace(r"\*", ".+").replace(r"\?", ".");
        let matcher = Regex::new(&format!("(?i)^{body}$"))
            .with_context(|| format!("Invalid filter pattern: {pattern}"))?;

        Ok(NameFilter {
            pattern: pattern.to_string(),
            matcher,
        })
    }

    /// Check whether a filename matches this filter
    pub fn matches(&self, name: &str) -> bool {
        self.matcher.is_match(name)
    }

    /// The original pattern this filter was compiled from
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Combine the include and exclude filters into a single eligibility check.
///
/// A file is eligible only if it passes the include filter (or none is set)
/// and does not match the exclude filter. Filters apply to filenames only,
/// never to directory names.
pub fn passes(name: &str, include: &Option<NameFilter>, exclude: &Option<NameFilter>) -> bool {
    if let Some(filter) = include {
        if !filter.matches(name) {
            return false;
        }
    }

    if let Some(filter) = exclude {
        if filter.matches(name) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_matches_one_or_more() {
        let filter = NameFilter::compile("*.log").unwrap();
        assert!(filter.matches("app.log"));
        assert!(filter.matches("error.log"));
        // `*` requires at least one character
        assert!(!filter.matches(".log"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let filter = NameFilter::compile("*.log").unwrap();
        assert!(filter.matches("app.LOG"));
        assert!(filter.matches("APP.Log"));
    }

    #[test]
    fn test_question_mark_matches_exactly_one() {
        let filter = NameFilter::compile("report.cs?").unwrap();
        assert!(filter.matches("report.csv"));
        assert!(!filter.matches("report.cs"));
        assert!(!filter.matches("report.csvx"));
    }

    #[test]
    fn test_pattern_is_anchored() {
        let filter = NameFilter::compile("data.txt").unwrap();
        assert!(filter.matches("data.txt"));
        assert!(!filter.matches("mydata.txt"));
        assert!(!filter.matches("data.txt.bak"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let filter = NameFilter::compile("a+b.txt").unwrap();
        assert!(filter.matches("a+b.txt"));
        assert!(!filter.matches("aab.txt"));
    }

    #[test]
    fn test_no_filters_pass_everything() {
        assert!(passes("anything.bin", &None, &None));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let include = Some(NameFilter::compile("report*.csv").unwrap());
        let exclude = Some(NameFilter::compile("*archive*").unwrap());
        assert!(passes("report_2024.csv", &include, &exclude));
        // matches the include filter but is excluded anyway
        assert!(!passes("report_archive.csv", &include, &exclude));
    }

    #[test]
    fn test_include_only() {
        let include = Some(NameFilter::compile("*.tmp").unwrap());
        assert!(passes("session.tmp", &include, &None));
        assert!(!passes("session.dat", &include, &None));
    }

    #[test]
    fn test_pattern_accessor() {
        let filter = NameFilter::compile("*.bak").unwrap();
        assert_eq!(filter.pattern(), "*.bak");
    }
}
