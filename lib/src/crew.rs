//! Crew member records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Attribute name of the partition key.
pub const MOVIE_ID_ATTRIBUTE: &str = "movieId";

/// Attribute name of the crew role.
pub const CREW_ROLE_ATTRIBUTE: &str = "crewRole";

/// Attribute name of the crew member names.
pub const NAMES_ATTRIBUTE: &str = "names";

/// Crew member record.
///
/// One record groups every person credited with a role on a movie.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewMember {
    /// Movie ID.
    pub movie_id: i64,
    /// Role, e.g. `director`.
    pub crew_role: String,
    /// Names credited with the role.
    #[serde(default)]
    pub names: Vec<String>,
}

impl CrewMember {
    /// Decodes a record from an unmarshalled item.
    pub fn from_json(item: Value) -> Result<Self, Error> {
        serde_json::from_value(item).map_err(|e| Error::InvalidData(
            format!("malformed crew member: {}", e),
        ))
    }
}
