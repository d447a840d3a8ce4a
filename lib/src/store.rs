//! Deals with the crew table.

use async_trait::async_trait;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::OnceCell;
use tracing::{Level, event};

use crate::error::Error;
use crate::query::{CrewQuery, ExpressionValue, Operation};

/// Source of crew member items.
#[async_trait]
pub trait CrewStore: Send + Sync {
    /// Runs a read request and returns the unmarshalled items.
    async fn fetch(&self, query: &CrewQuery) -> Result<Vec<Value>, Error>;
}

#[async_trait]
impl<'a, T> CrewStore for &'a T
where
    T: CrewStore + ?Sized,
{
    async fn fetch(&self, query: &CrewQuery) -> Result<Vec<Value>, Error> {
        (**self).fetch(query).await
    }
}

/// Crew store backed by DynamoDB.
///
/// The client is created on the first request and reused by every
/// following request served by the same process.
pub struct DynamoCrewStore {
    region: Option<String>,
    client: OnceCell<aws_sdk_dynamodb::Client>,
}

impl DynamoCrewStore {
    /// Creates a store whose client is configured on first use.
    ///
    /// Uses the default region provider chain if `region` is `None`.
    pub fn new(region: Option<String>) -> Self {
        Self {
            region,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> &aws_sdk_dynamodb::Client {
        self.client.get_or_init(|| async {
            event!(Level::INFO, "creating DynamoDB client");
            let mut loader = aws_config::from_env();
            if let Some(region) = self.region.clone() {
                loader = loader.region(Region::new(region));
            }
            let config = loader.load().await;
            aws_sdk_dynamodb::Client::new(&config)
        }).await
    }
}

#[async_trait]
impl CrewStore for DynamoCrewStore {
    async fn fetch(&self, query: &CrewQuery) -> Result<Vec<Value>, Error> {
        let client = self.client().await;
        let names = attribute_names(query);
        let values = attribute_values(query);
        let items = match query.operation {
            Operation::Query => {
                event!(Level::DEBUG, "querying {:?}", query);
                client.query()
                    .table_name(&query.table_name)
                    .set_index_name(query.index_name.clone())
                    .set_key_condition_expression(query.key_condition.clone())
                    .set_filter_expression(query.filter.clone())
                    .set_expression_attribute_names(Some(names))
                    .set_expression_attribute_values(Some(values))
                    .send().await?
                    .items
            },
            Operation::Scan => {
                event!(Level::DEBUG, "scanning {:?}", query);
                client.scan()
                    .table_name(&query.table_name)
                    .set_index_name(query.index_name.clone())
                    .set_filter_expression(query.filter.clone())
                    .set_expression_attribute_names(Some(names))
                    .set_expression_attribute_values(Some(values))
                    .send().await?
                    .items
            },
        };
        items_to_json(items.unwrap_or_default())
    }
}

/// Unmarshals raw items into plain JSON.
///
/// Numbers come back as JSON numbers, not as wrapped strings.
pub fn items_to_json(
    items: Vec<HashMap<String, AttributeValue>>,
) -> Result<Vec<Value>, Error> {
    Ok(serde_dynamo::from_items(items)?)
}

fn attribute_names(query: &CrewQuery) -> HashMap<String, String> {
    query.attribute_names
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn attribute_values(query: &CrewQuery) -> HashMap<String, AttributeValue> {
    query.attribute_values
        .iter()
        .map(|(k, v)| (k.clone(), to_attribute_value(v)))
        .collect()
}

fn to_attribute_value(value: &ExpressionValue) -> AttributeValue {
    match value {
        ExpressionValue::Number(n) => AttributeValue::N(n.clone()),
        ExpressionValue::String(s) => AttributeValue::S(s.clone()),
    }
}
