//! Serves `GET /movies/{movieId}/crew/{role}`.
//!
//! # Environment variables
//!
//! - `TABLE_NAME`: name of the DynamoDB table that stores crew members.
//! - `REGION`: AWS region of the table.
//! - `ROLE_INDEX_NAME`: secondary index ordered by role. Optional.
//! - `QUERY_POLICY`: `exact-match`, `role-prefix`, or `role-prefix-only`.
//!   Optional.
//! - `INVALID_PARAMS`: `fallback` or `reject`. Optional.

use anyhow::Context;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::{Level, event};

use movie_crew::config::Config;
use movie_crew::handler::{ApiGatewayResponse, CrewLookupHandler};
use movie_crew::store::{CrewStore, DynamoCrewStore};

async fn function_handler<S>(
    handler: &CrewLookupHandler<S>,
    event: LambdaEvent<Value>,
) -> Result<ApiGatewayResponse, Error>
where
    S: CrewStore,
{
    let time = std::time::Instant::now();
    let (payload, _context) = event.into_parts();
    let response = handler.handle_event(payload).await?;
    event!(
        Level::INFO,
        "responded {} in {} μs",
        response.status_code,
        time.elapsed().as_micros(),
    );
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    event!(
        Level::INFO,
        "serving table {} with {:?} and {:?}",
        config.table_name,
        config.query_policy,
        config.schema_violation_policy,
    );
    // the client itself is created on the first request
    let store = DynamoCrewStore::new(config.region.clone());
    let handler = CrewLookupHandler::new(&config, store);

    lambda_runtime::run(service_fn(|event| function_handler(&handler, event))).await
}
