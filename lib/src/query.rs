//! Read requests against the crew table.
//!
//! A [`CrewQuery`] is a backend-neutral description of exactly one `Query`
//! or `Scan` call. [`QueryPolicy`] decides how lookups turn into requests.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::crew::{CREW_ROLE_ATTRIBUTE, MOVIE_ID_ATTRIBUTE, NAMES_ATTRIBUTE};
use crate::error::Error;

/// Default name of the secondary index ordered by role.
pub const DEFAULT_ROLE_INDEX_NAME: &str = "roleIx";

/// How a lookup is turned into a read request.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum QueryPolicy {
    /// Exact match on movie and role.
    /// A name filter turns the request into a scan of the table.
    ExactMatch,
    /// Role prefix match on the role index.
    /// A name filter turns the request into a scan of the index.
    #[default]
    RolePrefix,
    /// Role prefix match on the role index. Names are never filtered.
    RolePrefixOnly,
}

impl QueryPolicy {
    /// Whether this policy honors a name filter.
    pub fn supports_name_filter(&self) -> bool {
        !matches!(self, QueryPolicy::RolePrefixOnly)
    }
}

impl FromStr for QueryPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact-match" => Ok(QueryPolicy::ExactMatch),
            "role-prefix" => Ok(QueryPolicy::RolePrefix),
            "role-prefix-only" => Ok(QueryPolicy::RolePrefixOnly),
            _ => Err(Error::InvalidConfig(format!("unknown query policy: {}", s))),
        }
    }
}

/// Kind of read.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    /// Key-conditioned query.
    Query,
    /// Filtered scan.
    Scan,
}

/// Expression attribute value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExpressionValue {
    /// Decimal number literal.
    Number(String),
    String(String),
}

/// One read request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CrewQuery {
    pub operation: Operation,
    pub table_name: String,
    pub index_name: Option<String>,
    pub key_condition: Option<String>,
    pub filter: Option<String>,
    pub attribute_names: BTreeMap<String, String>,
    pub attribute_values: BTreeMap<String, ExpressionValue>,
}

/// Lookup to be translated into a read request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CrewLookup<'a> {
    pub movie_id: &'a str,
    pub role: &'a str,
    pub name: Option<&'a str>,
}

/// Builds read requests for a table.
#[derive(Clone, Debug)]
pub struct QueryBuilder {
    table_name: String,
    role_index_name: String,
    policy: QueryPolicy,
}

impl QueryBuilder {
    /// Creates a builder.
    pub fn new(
        table_name: impl Into<String>,
        role_index_name: impl Into<String>,
        policy: QueryPolicy,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            role_index_name: role_index_name.into(),
            policy,
        }
    }

    /// Policy in effect.
    pub fn policy(&self) -> QueryPolicy {
        self.policy
    }

    /// Builds the read request for a lookup.
    pub fn build(&self, lookup: &CrewLookup<'_>) -> CrewQuery {
        let (index_name, role_condition) = match self.policy {
            QueryPolicy::ExactMatch => (None, "#crewRole = :crewRole"),
            QueryPolicy::RolePrefix | QueryPolicy::RolePrefixOnly => (
                Some(self.role_index_name.clone()),
                "begins_with(#crewRole, :crewRole)",
            ),
        };
        let key_condition = format!("#movieId = :movieId and {}", role_condition);
        let mut attribute_names = BTreeMap::from([
            ("#movieId".to_string(), MOVIE_ID_ATTRIBUTE.to_string()),
            ("#crewRole".to_string(), CREW_ROLE_ATTRIBUTE.to_string()),
        ]);
        let mut attribute_values = BTreeMap::from([
            (":movieId".to_string(), ExpressionValue::Number(lookup.movie_id.to_string())),
            (":crewRole".to_string(), ExpressionValue::String(lookup.role.to_string())),
        ]);
        let name = lookup.name.filter(|_| self.policy.supports_name_filter());
        match name {
            Some(name) => {
                attribute_names.insert("#names".to_string(), NAMES_ATTRIBUTE.to_string());
                attribute_values.insert(
                    ":names".to_string(),
                    ExpressionValue::String(name.to_string()),
                );
                CrewQuery {
                    operation: Operation::Scan,
                    table_name: self.table_name.clone(),
                    index_name,
                    key_condition: None,
                    filter: Some(format!("{} and contains(#names, :names)", key_condition)),
                    attribute_names,
                    attribute_values,
                }
            },
            None => CrewQuery {
                operation: Operation::Query,
                table_name: self.table_name.clone(),
                index_name,
                key_condition: Some(key_condition),
                filter: None,
                attribute_names,
                attribute_values,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(name: Option<&'a str>) -> CrewLookup<'a> {
        CrewLookup { movie_id: "42", role: "director", name }
    }

    #[test]
    fn role_prefix_without_name_queries_index() {
        let builder = QueryBuilder::new("Crew", "roleIx", QueryPolicy::RolePrefix);
        let query = builder.build(&lookup(None));
        assert_eq!(query.operation, Operation::Query);
        assert_eq!(query.index_name.as_deref(), Some("roleIx"));
        assert_eq!(
            query.key_condition.as_deref(),
            Some("#movieId = :movieId and begins_with(#crewRole, :crewRole)"),
        );
        assert_eq!(query.filter, None);
        assert_eq!(
            query.attribute_values[":movieId"],
            ExpressionValue::Number("42".to_string()),
        );
        assert_eq!(
            query.attribute_values[":crewRole"],
            ExpressionValue::String("director".to_string()),
        );
        assert!(!query.attribute_names.contains_key("#names"));
    }

    #[test]
    fn role_prefix_with_name_scans_index() {
        let builder = QueryBuilder::new("Crew", "roleIx", QueryPolicy::RolePrefix);
        let query = builder.build(&lookup(Some("Smith")));
        assert_eq!(query.operation, Operation::Scan);
        assert_eq!(query.index_name.as_deref(), Some("roleIx"));
        assert_eq!(query.key_condition, None);
        assert_eq!(
            query.filter.as_deref(),
            Some(
                "#movieId = :movieId and begins_with(#crewRole, :crewRole) \
                 and contains(#names, :names)",
            ),
        );
        assert_eq!(query.attribute_names["#names"], "names");
        assert_eq!(
            query.attribute_values[":names"],
            ExpressionValue::String("Smith".to_string()),
        );
    }

    #[test]
    fn exact_match_uses_table_keys() {
        let builder = QueryBuilder::new("Crew", "roleIx", QueryPolicy::ExactMatch);
        let query = builder.build(&lookup(None));
        assert_eq!(query.operation, Operation::Query);
        assert_eq!(query.table_name, "Crew");
        assert_eq!(query.index_name, None);
        assert_eq!(
            query.key_condition.as_deref(),
            Some("#movieId = :movieId and #crewRole = :crewRole"),
        );
    }

    #[test]
    fn exact_match_with_name_scans_table() {
        let builder = QueryBuilder::new("Crew", "roleIx", QueryPolicy::ExactMatch);
        let query = builder.build(&lookup(Some("Smith")));
        assert_eq!(query.operation, Operation::Scan);
        assert_eq!(query.index_name, None);
        assert_eq!(
            query.filter.as_deref(),
            Some(
                "#movieId = :movieId and #crewRole = :crewRole \
                 and contains(#names, :names)",
            ),
        );
    }

    #[test]
    fn role_prefix_only_ignores_name() {
        let builder = QueryBuilder::new("Crew", "roleIx", QueryPolicy::RolePrefixOnly);
        let query = builder.build(&lookup(Some("Smith")));
        assert_eq!(query, builder.build(&lookup(None)));
        assert_eq!(query.operation, Operation::Query);
    }

    #[test]
    fn query_policy_parses_known_names() {
        assert_eq!("exact-match".parse::<QueryPolicy>().unwrap(), QueryPolicy::ExactMatch);
        assert_eq!("Role-Prefix".parse::<QueryPolicy>().unwrap(), QueryPolicy::RolePrefix);
        assert_eq!(
            " role-prefix-only ".parse::<QueryPolicy>().unwrap(),
            QueryPolicy::RolePrefixOnly,
        );
        assert!("scan-everything".parse::<QueryPolicy>().is_err());
        assert!("prefix".parse::<QueryPolicy>().is_err());
    }
}
