//! Crew lookup handler.
//!
//! Serves `GET /movies/{movieId}/crew/{role}?name=...` behind an API Gateway
//! HTTP API. Every outcome, including storage failures, is answered with a
//! proxy response so that nothing escapes to the Lambda runtime.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::{Level, event};

use crate::config::{Config, SchemaViolationPolicy};
use crate::error::Error;
use crate::params::{CrewQueryParams, parse_movie_id, parse_role};
use crate::query::{CrewLookup, QueryBuilder};
use crate::store::CrewStore;

/// Part of an API Gateway proxy event the handler looks at.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayRequest {
    /// Raw path, only for logging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_path: Option<String>,
    /// Path parameters.
    #[serde(default, deserialize_with = "deserialize_nullable_map")]
    pub path_parameters: HashMap<String, String>,
    /// Query string parameters.
    #[serde(default, deserialize_with = "deserialize_nullable_map")]
    pub query_string_parameters: HashMap<String, String>,
}

// API Gateway sends `null` instead of omitting empty maps.
fn deserialize_nullable_map<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<HashMap<String, String>>::deserialize(deserializer)
        .map(Option::unwrap_or_default)
}

/// API Gateway proxy response.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayResponse {
    /// Status code.
    pub status_code: u16,
    /// Headers.
    pub headers: HashMap<String, String>,
    /// JSON body.
    pub body: String,
}

impl ApiGatewayResponse {
    fn json(status_code: u16, body: &Value) -> Self {
        Self {
            status_code,
            headers: HashMap::from([
                ("content-type".to_string(), "application/json".to_string()),
            ]),
            body: body.to_string(),
        }
    }

    /// Parses the body back into JSON.
    pub fn json_body(&self) -> Result<Value, Error> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Reasons a lookup is not answered with data.
#[derive(Debug)]
pub enum LookupError {
    MissingMovieId,
    MissingRole,
    ParameterSchema,
    Storage(Error),
}

impl std::error::Error for LookupError {}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::MissingMovieId => write!(f, "Missing movieId parameter"),
            LookupError::MissingRole => write!(f, "Missing role parameter"),
            LookupError::ParameterSchema => write!(
                f,
                "Incorrect type. Must match Query parameters schema",
            ),
            LookupError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl LookupError {
    /// HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self {
            LookupError::MissingMovieId | LookupError::MissingRole => 400,
            LookupError::ParameterSchema | LookupError::Storage(_) => 500,
        }
    }

    /// Converts into a response.
    ///
    /// Storage errors are reported without their details.
    pub fn into_response(self) -> ApiGatewayResponse {
        let body = match &self {
            LookupError::MissingMovieId | LookupError::MissingRole => json!({
                "Message": self.to_string(),
            }),
            LookupError::ParameterSchema => json!({
                "message": self.to_string(),
                "schema": CrewQueryParams::schema(),
            }),
            LookupError::Storage(_) => json!({
                "error": "failed to look up crew members",
            }),
        };
        ApiGatewayResponse::json(self.status_code(), &body)
    }
}

/// Crew lookup handler.
pub struct CrewLookupHandler<S> {
    store: S,
    builder: QueryBuilder,
    schema_violation_policy: SchemaViolationPolicy,
}

impl<S> CrewLookupHandler<S>
where
    S: CrewStore,
{
    /// Creates a handler on a given store.
    pub fn new(config: &Config, store: S) -> Self {
        Self {
            store,
            builder: QueryBuilder::new(
                &config.table_name,
                &config.role_index_name,
                config.query_policy,
            ),
            schema_violation_policy: config.schema_violation_policy,
        }
    }

    /// Handles a raw API Gateway event.
    ///
    /// The whole event is logged before the handler narrows it down. Fails
    /// only if the event is not shaped like a proxy event at all.
    pub async fn handle_event(&self, event: Value) -> Result<ApiGatewayResponse, Error> {
        event!(Level::INFO, "Event: {}", event);
        let request: ApiGatewayRequest = serde_json::from_value(event)?;
        Ok(self.handle(&request).await)
    }

    /// Handles a request.
    pub async fn handle(&self, request: &ApiGatewayRequest) -> ApiGatewayResponse {
        event!(Level::DEBUG, "request: {:?}", request);
        match self.lookup(request).await {
            Ok(items) => ApiGatewayResponse::json(200, &json!({ "data": items })),
            Err(err) => {
                match &err {
                    LookupError::Storage(e) => {
                        event!(Level::ERROR, "failed to look up crew members: {}", e);
                    },
                    _ => event!(Level::WARN, "rejected request: {}", err),
                }
                err.into_response()
            },
        }
    }

    /// Looks up the crew members a request asks for.
    pub async fn lookup(
        &self,
        request: &ApiGatewayRequest,
    ) -> Result<Vec<Value>, LookupError> {
        let movie_id = parse_movie_id(&request.path_parameters)
            .ok_or(LookupError::MissingMovieId)?;
        let role = parse_role(&request.path_parameters)
            .ok_or(LookupError::MissingRole)?;
        let params = CrewQueryParams::from_query_string(&request.query_string_parameters);
        let name = self.name_filter(request, &params)?;
        let query = self.builder.build(&CrewLookup {
            movie_id: &movie_id,
            role,
            name,
        });
        self.store.fetch(&query).await.map_err(LookupError::Storage)
    }

    fn name_filter<'a>(
        &self,
        request: &ApiGatewayRequest,
        params: &'a CrewQueryParams,
    ) -> Result<Option<&'a str>, LookupError> {
        if !self.builder.policy().supports_name_filter() {
            return Ok(None);
        }
        if request.query_string_parameters.is_empty() {
            return Ok(None);
        }
        match params.valid_name() {
            Some(name) => Ok(Some(name)),
            None => match self.schema_violation_policy {
                SchemaViolationPolicy::Fallback => Ok(None),
                SchemaViolationPolicy::Reject => Err(LookupError::ParameterSchema),
            },
        }
    }
}
