//! Request parameters.
//!
//! Path parameters are mandatory and parsed by hand. The query string is
//! checked against a declared schema before its filter is trusted.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use validator::Validate;

/// Name of the declared query parameter schema.
pub const QUERY_PARAMS_SCHEMA_NAME: &str = "MovieCrewMembersByMovieQueryParams";

/// Parses the `movieId` path parameter into a decimal number literal.
///
/// Reads an optional sign and the leading digits after whitespace, and
/// ignores whatever follows them, so `"42abc"` and `"42.7"` both yield `42`.
/// The digits are kept verbatim apart from leading zeros, which leaves IDs
/// wider than 64 bits intact.
///
/// Returns `None` if the parameter is absent, has no leading digits, or is
/// zero. Movie IDs start at 1.
pub fn parse_movie_id(path_parameters: &HashMap<String, String>) -> Option<String> {
    let raw = path_parameters.get("movieId")?.trim_start();
    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = unsigned[..end].trim_start_matches('0');
    if digits.is_empty() {
        return None;
    }
    Some(format!("{}{}", sign, digits))
}

/// Extracts the `role` path parameter.
///
/// Returns `None` if the parameter is absent or empty.
pub fn parse_role(path_parameters: &HashMap<String, String>) -> Option<&str> {
    path_parameters
        .get("role")
        .map(String::as_str)
        .filter(|role| !role.is_empty())
}

/// Query parameters for crew lookups.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, Validate)]
pub struct CrewQueryParams {
    /// Substring that one of the names has to contain.
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
}

impl CrewQueryParams {
    /// Collects the known parameters from a query string map.
    ///
    /// Unknown parameters are ignored.
    pub fn from_query_string(query: &HashMap<String, String>) -> Self {
        Self {
            name: query.get("name").cloned(),
        }
    }

    /// Returns the name filter if the parameters satisfy the schema.
    pub fn valid_name(&self) -> Option<&str> {
        match self.validate() {
            Ok(()) => self.name.as_deref(),
            Err(_) => None,
        }
    }

    /// JSON Schema describing valid query parameters.
    pub fn schema() -> Value {
        json!({
            "title": QUERY_PARAMS_SCHEMA_NAME,
            "type": "object",
            "properties": {
                "name": { "type": "string", "minLength": 1 },
            },
            "required": ["name"],
            "additionalProperties": true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn movie_id(value: &str) -> Option<String> {
        parse_movie_id(&params(&[("movieId", value)]))
    }

    #[test]
    fn parse_movie_id_accepts_integers() {
        assert_eq!(movie_id("42").as_deref(), Some("42"));
        assert_eq!(movie_id("-5").as_deref(), Some("-5"));
        assert_eq!(movie_id("+5").as_deref(), Some("5"));
    }

    #[test]
    fn parse_movie_id_reads_leading_digits_only() {
        assert_eq!(movie_id("42abc").as_deref(), Some("42"));
        assert_eq!(movie_id("42.7").as_deref(), Some("42"));
        assert_eq!(movie_id("  007 ").as_deref(), Some("7"));
    }

    #[test]
    fn parse_movie_id_keeps_ids_wider_than_64_bits() {
        assert_eq!(
            movie_id("99999999999999999999").as_deref(),
            Some("99999999999999999999"),
        );
    }

    #[test]
    fn parse_movie_id_treats_garbage_as_missing() {
        assert_eq!(parse_movie_id(&params(&[])), None);
        assert_eq!(movie_id("abc"), None);
        assert_eq!(movie_id(""), None);
        assert_eq!(movie_id("+"), None);
        assert_eq!(movie_id(".5"), None);
        assert_eq!(movie_id("0"), None);
        assert_eq!(movie_id("-000"), None);
    }

    #[test]
    fn parse_role_rejects_empty_role() {
        assert_eq!(parse_role(&params(&[("role", "director")])), Some("director"));
        assert_eq!(parse_role(&params(&[("role", "")])), None);
        assert_eq!(parse_role(&params(&[])), None);
    }

    #[test]
    fn valid_name_requires_non_empty_name() {
        let ok = CrewQueryParams::from_query_string(&params(&[("name", "Smith")]));
        assert_eq!(ok.valid_name(), Some("Smith"));
        let empty = CrewQueryParams::from_query_string(&params(&[("name", "")]));
        assert_eq!(empty.valid_name(), None);
        let absent = CrewQueryParams::from_query_string(&params(&[("page", "2")]));
        assert_eq!(absent.valid_name(), None);
    }

    #[test]
    fn schema_requires_name() {
        assert_eq!(CrewQueryParams::schema()["required"], json!(["name"]));
    }
}
