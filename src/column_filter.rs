//! Column Filter - pure selection of visible columns from the schema.
//!
//! The resolver's token is deliberately not validated against a closed set
//! here: a term selects every field whose lowercase name contains it as a
//! substring, so an off-schema token legitimately selects zero columns and
//! a short token ("a") can select several.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFilter {
    term: Option<String>,
}

impl ColumnFilter {
    /// No filter: every schema field is visible.
    pub fn none() -> Self {
        Self { term: None }
    }

    /// Build a filter from a resolver token. The empty token means "no
    /// filter"; anything else becomes the active term, lowercased.
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if token.is_empty() {
            Self::none()
        } else {
            Self {
                term: Some(token.to_lowercase()),
            }
        }
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.term.is_some()
    }

    /// Visible fields, in schema order. With no active term every field is
    /// visible; otherwise a field is visible iff its lowercase name contains
    /// the term as a substring.
    pub fn select<'a>(&self, fields: &[&'a str]) -> Vec<&'a str> {
        match &self.term {
            None => fields.to_vec(),
            Some(term) => fields
                .iter()
                .copied()
                .filter(|field| field.to_lowercase().contains(term.as_str()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: [&str; 5] = ["id", "name", "age", "city", "occupation"];

    #[test]
    fn test_no_filter_shows_all_in_schema_order() {
        let filter = ColumnFilter::none();
        assert_eq!(filter.select(&FIELDS), FIELDS.to_vec());

        let filter = ColumnFilter::from_token("");
        assert_eq!(filter.select(&FIELDS), FIELDS.to_vec());
        assert!(!filter.is_active());
    }

    #[test]
    fn test_exact_field_token() {
        let filter = ColumnFilter::from_token("city");
        assert_eq!(filter.select(&FIELDS), vec!["city"]);
    }

    #[test]
    fn test_substring_token_selects_multiple() {
        let filter = ColumnFilter::from_token("a");
        assert_eq!(filter.select(&FIELDS), vec!["name", "age", "occupation"]);
    }

    #[test]
    fn test_token_is_case_insensitive() {
        let filter = ColumnFilter::from_token("  City ");
        assert_eq!(filter.term(), Some("city"));
        assert_eq!(filter.select(&FIELDS), vec!["city"]);
    }

    #[test]
    fn test_off_schema_token_selects_nothing() {
        let filter = ColumnFilter::from_token("salary");
        assert!(filter.select(&FIELDS).is_empty());
    }

    #[test]
    fn test_visible_iff_name_contains_term() {
        let filter = ColumnFilter::from_token("tion");
        let visible = filter.select(&FIELDS);
        for field in FIELDS {
            let expected = field.to_lowercase().contains("tion");
            assert_eq!(visible.contains(&field), expected, "field {}", field);
        }
    }
}
