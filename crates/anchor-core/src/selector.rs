//! Page selector resolution
//!
//! A selector names the pages an anchor is stamped on: `"global"` for every
//! page, `"last"` for the final page, or a comma-separated list like `"1,3"`.
//! Resolution never fails. Anything unusable degrades to the first page.

use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelector {
    /// No selector given: first page only
    Default,
    /// Every page of the document
    Global,
    /// Final page of the document
    Last,
    /// Explicit 1-based page numbers, as written (unvalidated against a document)
    Pages(Vec<u32>),
}

impl PageSelector {
    /// Parse a selector string. Case-insensitive, surrounding whitespace ignored.
    ///
    /// List tokens that are not plain decimal numbers are dropped here;
    /// range checks happen in [`PageSelector::resolve`].
    pub fn parse(input: &str) -> Self {
        let input = input.trim().to_lowercase();

        match input.as_str() {
            "" => PageSelector::Default,
            "global" => PageSelector::Global,
            "last" => PageSelector::Last,
            list => PageSelector::Pages(
                list.split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
                    .filter_map(|token| token.parse::<u32>().ok())
                    .collect(),
            ),
        }
    }

    /// Resolve against a document with `total_pages` pages.
    ///
    /// Returns sorted unique 1-based page numbers, all within `1..=total_pages`.
    /// Only an empty document yields an empty result.
    pub fn resolve(&self, total_pages: u32) -> Vec<u32> {
        if total_pages == 0 {
            return Vec::new();
        }

        match self {
            PageSelector::Default => vec![1],
            PageSelector::Global => (1..=total_pages).collect(),
            PageSelector::Last => vec![total_pages],
            PageSelector::Pages(pages) => {
                let valid: BTreeSet<u32> = pages
                    .iter()
                    .copied()
                    .filter(|page| (1..=total_pages).contains(page))
                    .collect();

                if valid.is_empty() {
                    vec![1]
                } else {
                    valid.into_iter().collect()
                }
            }
        }
    }
}

impl fmt::Display for PageSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSelector::Default => Ok(()),
            PageSelector::Global => write!(f, "global"),
            PageSelector::Last => write!(f, "last"),
            PageSelector::Pages(pages) => {
                let list: Vec<String> = pages.iter().map(u32::to_string).collect();
                write!(f, "{}", list.join(","))
            }
        }
    }
}

/// Resolve a selector string into the 1-based pages it targets
pub fn resolve_pages(selector: &str, total_pages: u32) -> Vec<u32> {
    PageSelector::parse(selector).resolve(total_pages)
}
