pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::AppConfig;
use crate::http::{HttpError, HttpHelper};
use crate::resources::ResourceKind;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront admin CLI - manage backend collections")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, env = "STOREFRONT_API_URL", help = "Backend base URL")]
    pub base_url: Option<String>,

    #[arg(long, global = true, env = "STOREFRONT_TOKEN", hide_env_values = true, help = "Bearer token")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List every record of a collection")]
    List {
        #[arg(value_enum)]
        resource: ResourceKind,
    },

    #[command(about = "Create a record from JSON on stdin")]
    Create {
        #[arg(value_enum)]
        resource: ResourceKind,
    },

    #[command(about = "Replace a record with JSON on stdin")]
    Update {
        #[arg(value_enum)]
        resource: ResourceKind,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(value_enum)]
        resource: ResourceKind,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Sales statistics and entry")]
    Sales {
        #[command(subcommand)]
        cmd: commands::sales::SalesCommands,
    },

    #[command(about = "Preview a cart total against current inventory prices")]
    Checkout {
        #[arg(long = "item", value_name = "PRODUCT_ID:QTY", required = true)]
        items: Vec<String>,
    },

    #[command(about = "Validate and register a new account")]
    Register(commands::register::RegisterArgs),

    #[command(about = "Development token utilities")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Connection details shared by every command that talks to the backend.
#[derive(Debug, Clone)]
pub struct Session {
    pub http: HttpHelper,
    pub base: Url,
}

impl Session {
    pub fn new(config: &AppConfig, base_url: Option<&str>, token: Option<&str>) -> anyhow::Result<Self> {
        let raw = base_url.unwrap_or(&config.api.base_url);
        let base = Url::parse(raw).map_err(|e| anyhow::anyhow!("invalid base url '{}': {}", raw, e))?;

        let mut http = HttpHelper::new(&config.api)?;
        if let Some(token) = token {
            http = http.with_bearer(token);
        }
        Ok(Self { http, base })
    }
}

pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let session = || Session::new(config, cli.base_url.as_deref(), cli.token.as_deref());

    let result = match &cli.command {
        Commands::List { resource } => commands::resource::list(&session()?, *resource, output_format).await,
        Commands::Create { resource } => commands::resource::create(&session()?, *resource, output_format).await,
        Commands::Update { resource, id } => {
            commands::resource::update(&session()?, *resource, id, output_format).await
        }
        Commands::Delete { resource, id } => {
            commands::resource::delete(&session()?, *resource, id, output_format).await
        }
        Commands::Sales { cmd } => commands::sales::handle(&session()?, cmd, output_format).await,
        Commands::Checkout { items } => commands::checkout::handle(&session()?, items, output_format).await,
        Commands::Register(args) => commands::register::handle(&session()?, args, output_format).await,
        Commands::Token { cmd } => commands::token::handle(cmd, &config.security, output_format),
    };

    if let Err(e) = &result {
        if output_format == OutputFormat::Json {
            let status = e.downcast_ref::<HttpError>().map(|e| e.status);
            utils::output_error(&output_format, &e.to_string(), status)?;
        }
    }
    result
}
