//! Pure resolution rules applied to request parameters before any query is
//! touched.

use tracing::warn;

use super::value_objects::{Capabilities, RequestParameters, SortDirection};

pub const SORT_BY: &str = "sort_by";
pub const SORT_TYPE: &str = "sort_type";
pub const SEARCH: &str = "q";
pub const PER_PAGE: &str = "per_page";
pub const PAGE: &str = "page";

/// Picks the sortable path the request asks for.
///
/// An exact match wins, then the first dotted path whose last segment equals
/// the request value, then the configured default.
pub fn resolve_sort_field<'a>(
    params: &RequestParameters,
    sortable: &'a [String],
    default: Option<&'a str>,
) -> Option<&'a str> {
    let requested = params.text(SORT_BY);

    if let Some(requested) = requested.as_deref() {
        if let Some(exact) = sortable.iter().find(|field| field.as_str() == requested) {
            return Some(exact.as_str());
        }

        let suffix = format!(".{requested}");
        if let Some(nested) = sortable
            .iter()
            .find(|field| field.contains('.') && field.ends_with(&suffix))
        {
            return Some(nested.as_str());
        }
    }

    default
}

pub fn resolve_sort_direction(params: &RequestParameters, default: SortDirection) -> SortDirection {
    params
        .text(SORT_TYPE)
        .and_then(|value| SortDirection::parse_exact(&value))
        .unwrap_or(default)
}

/// The search term, `None` when absent or blank.
pub fn search_term(params: &RequestParameters) -> Option<String> {
    params
        .text(SEARCH)
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty())
}

/// Wraps the term for a `LIKE ... ESCAPE '!'` comparison.
pub fn search_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '!') {
            pattern.push('!');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub fn should_paginate(
    capabilities: Capabilities,
    force_pagination: bool,
    params: &RequestParameters,
) -> bool {
    capabilities.contains(Capabilities::PAGINATE) && (force_pagination || params.has(PER_PAGE))
}

pub fn resolve_per_page(params: &RequestParameters, default: u64) -> u64 {
    let Some(raw) = params.text(PER_PAGE) else {
        return default;
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value.trunc() >= 1.0 => {
            (value.trunc() as u64).min(MAX_OFFSET - 1)
        }
        _ => {
            warn!(per_page = %raw, default, "Ignoring invalid per_page parameter");
            default
        }
    }
}

/// Largest row offset a page may start at; SQL offsets are signed 64-bit.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// 1-based page number, capped so that `(page - 1) * per_page` stays
/// within [`MAX_OFFSET`].
pub fn resolve_page(params: &RequestParameters, per_page: u64) -> u64 {
    let last = MAX_OFFSET / per_page.max(1) + 1;

    params
        .text(PAGE)
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|page| *page >= 1)
        .map(|page| page.min(last))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> RequestParameters {
        RequestParameters::from_pairs(pairs.iter().copied())
    }

    fn sortable() -> Vec<String> {
        vec![
            "title".to_string(),
            "price".to_string(),
            "translations.name".to_string(),
        ]
    }

    #[test]
    fn test_sort_field_exact_match() {
        let fields = sortable();
        let request = params(&[("sort_by", "price")]);
        assert_eq!(resolve_sort_field(&request, &fields, Some("title")), Some("price"));
    }

    #[test]
    fn test_sort_field_suffix_match() {
        let fields = sortable();
        let request = params(&[("sort_by", "name")]);
        assert_eq!(
            resolve_sort_field(&request, &fields, None),
            Some("translations.name")
        );
    }

    #[test]
    fn test_sort_field_falls_back_to_default() {
        let fields = sortable();
        let request = params(&[("sort_by", "secret")]);
        assert_eq!(resolve_sort_field(&request, &fields, Some("title")), Some("title"));
        assert_eq!(resolve_sort_field(&request, &fields, None), None);
        assert_eq!(
            resolve_sort_field(&RequestParameters::new(), &fields, None),
            None
        );
    }

    #[test]
    fn test_sort_direction_only_exact_values() {
        assert_eq!(
            resolve_sort_direction(&params(&[("sort_type", "desc")]), SortDirection::Asc),
            SortDirection::Desc
        );
        assert_eq!(
            resolve_sort_direction(&params(&[("sort_type", "ASC")]), SortDirection::Desc),
            SortDirection::Desc
        );
        assert_eq!(
            resolve_sort_direction(&RequestParameters::new(), SortDirection::Asc),
            SortDirection::Asc
        );
    }

    #[test]
    fn test_search_term_ignores_blank() {
        assert_eq!(search_term(&params(&[("q", "   ")])), None);
        assert_eq!(search_term(&params(&[("q", " red ")])), Some("red".to_string()));
        assert_eq!(search_term(&RequestParameters::new()), None);
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        assert_eq!(search_pattern("shirt"), "%shirt%");
        assert_eq!(search_pattern("50%_off!"), "%50!%!_off!!%");
    }

    #[test]
    fn test_per_page_resolution() {
        assert_eq!(resolve_per_page(&params(&[("per_page", "5")]), 12), 5);
        assert_eq!(resolve_per_page(&params(&[("per_page", "7.9")]), 12), 7);
        assert_eq!(resolve_per_page(&params(&[("per_page", "abc")]), 12), 12);
        assert_eq!(resolve_per_page(&params(&[("per_page", "0")]), 12), 12);
        assert_eq!(resolve_per_page(&params(&[("per_page", "-3")]), 12), 12);
        assert_eq!(resolve_per_page(&RequestParameters::new(), 12), 12);
    }

    #[test]
    fn test_page_resolution() {
        assert_eq!(resolve_page(&params(&[("page", "3")]), 10), 3);
        assert_eq!(resolve_page(&params(&[("page", "0")]), 10), 1);
        assert_eq!(resolve_page(&params(&[("page", "x")]), 10), 1);
        assert_eq!(resolve_page(&RequestParameters::new(), 10), 1);
    }

    #[test]
    fn test_page_offset_stays_in_range() {
        let huge = params(&[("page", "18446744073709551615")]);

        for per_page in [1, 10, 12, MAX_OFFSET - 1] {
            let page = resolve_page(&huge, per_page);
            let offset = (page - 1).checked_mul(per_page).expect("offset fits in u64");
            assert!(offset <= MAX_OFFSET, "per_page {per_page}: offset {offset}");
        }

        let per_page = resolve_per_page(&params(&[("per_page", "1e30")]), 12);
        assert_eq!(per_page, MAX_OFFSET - 1);
    }

    #[test]
    fn test_should_paginate() {
        let with_per_page = params(&[("per_page", "5")]);
        assert!(should_paginate(Capabilities::ALL, false, &with_per_page));
        assert!(should_paginate(Capabilities::PAGINATE, true, &RequestParameters::new()));
        assert!(!should_paginate(Capabilities::ALL, false, &RequestParameters::new()));
        assert!(!should_paginate(Capabilities::SORT, true, &with_per_page));
    }
}
