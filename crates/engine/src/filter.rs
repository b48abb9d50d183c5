//! Ad listing query builder — turns raw query-string pairs into a
//! [`FilterSpec`].
//!
//! Rules:
//! 1. Any `sort` parameter selects sort mode; equality filters are then
//!    ignored for the whole request.
//! 2. Each `sort` value is `<column>,<direction>`. Direction is `asc` or
//!    `desc` in any case and defaults to ascending when omitted. Columns are
//!    passed through untouched; the store rejects the ones it does not have.
//! 3. Otherwise `plane_age`, `category_id` and `price` become AND-ed equality
//!    filters. Absent or empty parameters are left out.
//!
//! Unrecognised parameters are ignored.

use store::{EqualityFilters, FilterSpec, SortDirection, SortKey};

use crate::EngineError;

pub const SORT_PARAM: &str = "sort";
pub const PLANE_AGE_PARAM: &str = "plane_age";
pub const CATEGORY_ID_PARAM: &str = "category_id";
pub const PRICE_PARAM: &str = "price";

/// Build the listing spec for a request's query parameters, in the order
/// they appeared.
///
/// # Errors
/// [`EngineError::Validation`] for an empty sort column, an unknown sort
/// direction, or an equality value that is not a non-negative integer.
pub fn build_filter(params: &[(String, String)]) -> Result<FilterSpec, EngineError> {
    let sort_values: Vec<&str> = params
        .iter()
        .filter(|(key, _)| key == SORT_PARAM)
        .map(|(_, value)| value.as_str())
        .collect();

    if !sort_values.is_empty() {
        let keys = sort_values
            .into_iter()
            .map(parse_sort_entry)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(FilterSpec::Sorted(keys));
    }

    let mut filters = EqualityFilters::default();
    for (key, value) in params {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            PLANE_AGE_PARAM => filters.plane_age = Some(parse_non_negative(key, value)?),
            CATEGORY_ID_PARAM => filters.category_id = Some(parse_non_negative(key, value)?),
            PRICE_PARAM => filters.price = Some(parse_non_negative(key, value)?),
            _ => {}
        }
    }
    Ok(FilterSpec::Equality(filters))
}

fn parse_sort_entry(raw: &str) -> Result<SortKey, EngineError> {
    let (column, direction) = match raw.split_once(',') {
        Some((column, direction)) => (column.trim(), Some(direction.trim())),
        None => (raw.trim(), None),
    };

    if column.is_empty() {
        return Err(EngineError::Validation(format!("sort entry '{raw}' has no column")));
    }

    let direction = match direction.map(str::to_ascii_lowercase).as_deref() {
        None | Some("asc") => SortDirection::Asc,
        Some("desc") => SortDirection::Desc,
        Some(other) => {
            return Err(EngineError::Validation(format!(
                "unknown sort direction '{other}' (expected asc or desc)"
            )))
        }
    };

    Ok(SortKey::new(column, direction))
}

fn parse_non_negative<T>(key: &str, value: &str) -> Result<T, EngineError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.parse::<T>() {
        Ok(n) if n >= T::default() => Ok(n),
        _ => Err(EngineError::Validation(format!(
            "{key} must be a non-negative integer, got '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn single_category_filter() {
        let spec = build_filter(&params(&[("category_id", "1")])).unwrap();
        assert_eq!(
            spec,
            FilterSpec::Equality(EqualityFilters { category_id: Some(1), ..Default::default() })
        );
    }

    #[test]
    fn equality_filters_combine() {
        let spec =
            build_filter(&params(&[("category_id", "2"), ("price", "1000"), ("plane_age", "7")]))
                .unwrap();
        assert_eq!(
            spec,
            FilterSpec::Equality(EqualityFilters {
                plane_age: Some(7),
                category_id: Some(2),
                price: Some(1000),
            })
        );
    }

    #[test]
    fn no_params_lists_everything() {
        assert_eq!(build_filter(&[]).unwrap(), FilterSpec::all());
    }

    #[test]
    fn sort_takes_precedence_over_filters() {
        let spec = build_filter(&params(&[("category_id", "1"), ("sort", "price,desc")])).unwrap();
        assert_eq!(spec, FilterSpec::Sorted(vec![SortKey::new("price", SortDirection::Desc)]));
    }

    #[test]
    fn sort_keys_keep_input_order() {
        let spec =
            build_filter(&params(&[("sort", "price,asc"), ("sort", "category_id,desc")])).unwrap();
        assert_eq!(
            spec,
            FilterSpec::Sorted(vec![
                SortKey::new("price", SortDirection::Asc),
                SortKey::new("category_id", SortDirection::Desc),
            ])
        );
    }

    #[test]
    fn direction_is_case_insensitive() {
        let spec = build_filter(&params(&[("sort", "plane_age,DeSc")])).unwrap();
        assert_eq!(spec, FilterSpec::Sorted(vec![SortKey::new("plane_age", SortDirection::Desc)]));
    }

    #[test]
    fn missing_direction_sorts_ascending() {
        let spec = build_filter(&params(&[("sort", "price")])).unwrap();
        assert_eq!(spec, FilterSpec::Sorted(vec![SortKey::new("price", SortDirection::Asc)]));
    }

    #[test]
    fn unknown_column_is_passed_through() {
        let spec = build_filter(&params(&[("sort", "favourite_colour,desc")])).unwrap();
        assert_eq!(
            spec,
            FilterSpec::Sorted(vec![SortKey::new("favourite_colour", SortDirection::Desc)])
        );
    }

    #[test]
    fn unknown_direction_is_rejected() {
        let err = build_filter(&params(&[("sort", "price,sideways")])).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn empty_sort_column_is_rejected() {
        let err = build_filter(&params(&[("sort", ",desc")])).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn non_numeric_filter_is_rejected() {
        let err = build_filter(&params(&[("price", "cheap")])).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let err = build_filter(&params(&[("plane_age", "-3")])).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn empty_and_unknown_params_are_ignored() {
        let spec = build_filter(&params(&[("price", ""), ("colour", "red")])).unwrap();
        assert_eq!(spec, FilterSpec::all());
    }
}
