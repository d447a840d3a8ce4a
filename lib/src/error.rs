//! Common error.

/// Common error.
#[derive(Debug)]
pub enum Error {
    InvalidData(String),
    InvalidConfig(String),
    SerdeJsonError(serde_json::Error),
    SerdeDynamoError(serde_dynamo::Error),
    AwsSdkError(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidData(s) => write!(f, "Invalid data: {}", s),
            Error::InvalidConfig(s) => write!(f, "Invalid config: {}", s),
            Error::SerdeJsonError(e) => write!(f, "serde_json::Error: {}", e),
            Error::SerdeDynamoError(e) => write!(f, "serde_dynamo::Error: {}", e),
            Error::AwsSdkError(s) => write!(f, "AWS SDK error: {}", s),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerdeJsonError(e)
    }
}

impl From<serde_dynamo::Error> for Error {
    fn from(e: serde_dynamo::Error) -> Self {
        Error::SerdeDynamoError(e)
    }
}

impl<E, R> From<aws_sdk_dynamodb::error::SdkError<E, R>> for Error
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    fn from(e: aws_sdk_dynamodb::error::SdkError<E, R>) -> Self {
        // the plain `Display` of `SdkError` drops the service message
        Error::AwsSdkError(format!(
            "{}",
            aws_sdk_dynamodb::error::DisplayErrorContext(e),
        ))
    }
}
