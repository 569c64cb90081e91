use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::config::{HeaderStyle, UpdateRoute};

const PWSTATE_LONG_VERSION: &str = concat!(
"version: ", env!("CARGO_PKG_VERSION"), "\n",
"git sha: ", env!("PWSTATE_GIT_SHA"), "\n",
"build time (UTC): ", env!("PWSTATE_BUILD_TIME"), "\n",
"target: ", env!("PWSTATE_TARGET")
);

#[derive(Parser)]
#[command(
    name = "pwstate",
    version = env!("CARGO_PKG_VERSION"),
    long_version = PWSTATE_LONG_VERSION,
    about = "Reconcile Passwordstate credentials with a desired state"
)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Increase log verbosity (-v info, -vv debug); PWSTATE_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct ConnectionArgs {
    /// Passwordstate base URL (or PWSTATE_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,
    /// API key; prefer PWSTATE_API_KEY so the key stays out of the process list
    #[arg(long, global = true)]
    pub api_key: Option<String>,
    /// Header the API key is sent in
    #[arg(long, global = true, value_enum)]
    pub header_style: Option<HeaderStyleArg>,
    /// Update endpoint form: body (PUT /api/passwords/) or path (PUT /api/passwords/{id})
    #[arg(long, global = true, value_enum)]
    pub update_route: Option<UpdateRouteArg>,
    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
    /// Named deployment from config.toml
    #[arg(long, global = true)]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Retrieve a password entry and print its fields as JSON
    Fetch {
        /// Password ID
        #[arg(long)]
        id: u64,
        /// Password list containing the entry (informational)
        #[arg(long)]
        list_id: Option<u64>,
        /// Mask the password value in the output
        #[arg(long)]
        redact_password: bool,
    },
    /// Update username and/or password only where they differ from the live values
    Update {
        /// Password ID
        #[arg(long)]
        id: u64,
        /// Desired username
        #[arg(long)]
        username: Option<String>,
        /// Desired password (or PWSTATE_DESIRED_PASSWORD)
        #[arg(long, conflicts_with = "prompt_password")]
        password: Option<String>,
        /// Prompt for the desired password
        #[arg(long)]
        prompt_password: bool,
        /// Report what would change without updating
        #[arg(long)]
        check: bool,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum HeaderStyleArg {
    #[value(name = "api_key")]
    Snake,
    #[value(name = "APIKey")]
    Pascal,
}

impl From<HeaderStyleArg> for HeaderStyle {
    fn from(arg: HeaderStyleArg) -> Self {
        match arg {
            HeaderStyleArg::Snake => HeaderStyle::Snake,
            HeaderStyleArg::Pascal => HeaderStyle::Pascal,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum UpdateRouteArg {
    Body,
    Path,
}

impl From<UpdateRouteArg> for UpdateRoute {
    fn from(arg: UpdateRouteArg) -> Self {
        match arg {
            UpdateRouteArg::Body => UpdateRoute::Body,
            UpdateRouteArg::Path => UpdateRoute::Path,
        }
    }
}
