use anyhow::{Context, Error, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;

use movie_crew::config::Config;
use movie_crew::crew::CrewMember;
use movie_crew::handler::{ApiGatewayRequest, ApiGatewayResponse, CrewLookupHandler};
use movie_crew::store::DynamoCrewStore;

#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    table: TableArgs,
    /// Prints debug logs.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TableArgs {
    /// Name of the crew table.
    #[arg(long, env = "TABLE_NAME", global = true)]
    table_name: Option<String>,
    /// AWS region of the table.
    #[arg(long, env = "REGION", global = true)]
    region: Option<String>,
    /// Secondary index ordered by role.
    #[arg(long, env = "ROLE_INDEX_NAME", global = true)]
    role_index_name: Option<String>,
    /// `exact-match`, `role-prefix`, or `role-prefix-only`.
    #[arg(long, env = "QUERY_POLICY", global = true)]
    query_policy: Option<String>,
    /// `fallback` or `reject`.
    #[arg(long, env = "INVALID_PARAMS", global = true)]
    invalid_params: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Looks up crew members of a movie.
    Lookup {
        /// Movie ID.
        movie_id: String,
        /// Role or role prefix.
        role: String,
        /// Only crew members whose names contain this.
        #[arg(long)]
        name: Option<String>,
    },
    /// Runs an API Gateway event saved as JSON through the handler.
    Invoke {
        /// Path to the event file.
        event_path: String,
    },
}

impl TableArgs {
    fn into_config(self) -> Result<Config, Error> {
        let table_name = self.table_name.context("no TABLE_NAME set")?;
        let mut config = Config::new(table_name);
        config.region = self.region;
        if let Some(index) = self.role_index_name {
            config.role_index_name = index;
        }
        if let Some(policy) = self.query_policy {
            config.query_policy = policy.parse()?;
        }
        if let Some(policy) = self.invalid_params {
            config.schema_violation_policy = policy.parse()?;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    let config = cli.table.into_config()?;
    let store = DynamoCrewStore::new(config.region.clone());
    let handler = CrewLookupHandler::new(&config, store);
    let response = match cli.command {
        Commands::Lookup { movie_id, role, name } => {
            handler.handle(&lookup_request(movie_id, role, name)).await
        },
        Commands::Invoke { event_path } => {
            let file = File::open(&event_path)
                .with_context(|| format!("failed to open {}", event_path))?;
            let event: Value = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("malformed JSON in {}", event_path))?;
            handler.handle_event(event).await
                .with_context(|| format!("malformed event in {}", event_path))?
        },
    };
    print_response(&response)
}

fn lookup_request(
    movie_id: String,
    role: String,
    name: Option<String>,
) -> ApiGatewayRequest {
    let mut request = ApiGatewayRequest {
        raw_path: Some(format!("/movies/{}/crew/{}", movie_id, role)),
        ..Default::default()
    };
    request.path_parameters.insert("movieId".to_string(), movie_id);
    request.path_parameters.insert("role".to_string(), role);
    if let Some(name) = name {
        request.query_string_parameters.insert("name".to_string(), name);
    }
    request
}

fn print_response(response: &ApiGatewayResponse) -> Result<(), Error> {
    println!("status: {}", response.status_code);
    let body = response.json_body()?;
    if response.status_code != 200 {
        println!("{}", serde_json::to_string_pretty(&body)?);
        bail!("lookup failed with status {}", response.status_code);
    }
    let items = body["data"].as_array().cloned().unwrap_or_default();
    println!("{} record(s)", items.len());
    for item in items {
        match CrewMember::from_json(item.clone()) {
            Ok(member) => println!(
                "{}\t{}\t{}",
                member.movie_id,
                member.crew_role,
                member.names.join(", "),
            ),
            Err(_) => println!("{}", item),
        }
    }
    Ok(())
}
