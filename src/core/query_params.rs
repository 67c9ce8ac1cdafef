use std::collections::HashMap;

use crate::models::models::Category;
use crate::view::{CategoryFilter, SortBy, ViewState};

/// Parse query parameters from a URI string
///
/// Handles URL decoding (including `+` for spaces, so `Mental+Health` works)
/// and returns a HashMap of parameter key-value pairs. Only the last value
/// for a repeated key is kept.
pub fn parse_query_params(uri: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    if let Some(query_start) = uri.find('?') {
        let query = &uri[query_start + 1..];
        for param in query.split('&').filter(|p| !p.is_empty()) {
            if let Some(eq_idx) = param.find('=') {
                let key = &param[..eq_idx];
                let encoded_value = param[eq_idx + 1..].replace('+', " ");
                let decoded = urlencoding::decode(&encoded_value)
                    .map(|v| v.into_owned())
                    .unwrap_or(encoded_value);
                params.insert(key.to_string(), decoded);
            } else {
                // Flag parameter without value
                params.insert(param.to_string(), String::new());
            }
        }
    }

    params
}

/// Get a boolean flag parameter (e.g., ?include_hidden=true)
pub fn get_bool_flag(params: &HashMap<String, String>, key: &str) -> bool {
    params.get(key).map(|v| v == "true").unwrap_or(false)
}

/// `category` parameter; absent, empty or `all` means no filter.
pub fn get_category_filter(params: &HashMap<String, String>) -> Result<CategoryFilter, String> {
    match params.get("category").map(String::as_str) {
        None | Some("") | Some("all") => Ok(CategoryFilter::All),
        Some(raw) => raw.parse::<Category>().map(CategoryFilter::Only),
    }
}

pub fn get_sort(params: &HashMap<String, String>) -> Result<Option<SortBy>, String> {
    match params.get("sort").map(String::as_str) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<SortBy>().map(Some),
    }
}

/// Builds the view parameters a list request asks for.
pub fn view_state_from_query(uri: &str) -> Result<ViewState, String> {
    let params = parse_query_params(uri);
    Ok(ViewState {
        sort_by: get_sort(&params)?.unwrap_or_default(),
        filter: get_category_filter(&params)?,
        include_hidden: get_bool_flag(&params, "include_hidden"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_category_with_space() {
        let view = view_state_from_query("/api/posts/?category=Mental+Health&sort=upvotes").unwrap();
        assert_eq!(view.filter, CategoryFilter::Only(Category::MentalHealth));
        assert_eq!(view.sort_by, SortBy::Upvotes);
        assert!(!view.include_hidden);

        let view = view_state_from_query("/api/posts/?category=Mental%20Health").unwrap();
        assert_eq!(view.filter, CategoryFilter::Only(Category::MentalHealth));
    }

    #[test]
    fn defaults_without_query() {
        let view = view_state_from_query("/api/posts/").unwrap();
        assert_eq!(view, ViewState::default());
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(view_state_from_query("/api/posts/?category=Sports").is_err());
        assert!(view_state_from_query("/api/posts/?sort=oldest").is_err());
    }

    #[test]
    fn include_hidden_flag() {
        let view = view_state_from_query("/api/posts/?include_hidden=true&category=all").unwrap();
        assert!(view.include_hidden);
        assert_eq!(view.filter, CategoryFilter::All);
    }
}
