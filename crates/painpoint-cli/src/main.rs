mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand,
    pain_point::{CreateArgs, ShowArgs},
    sub::SubSubcommand,
    update::UpdateArgs,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "painpoints",
    about = "Pain-point ledger: append records and updates, read derived scores",
    version,
    propagate_version = true
)]
struct Cli {
    #[arg(long, global = true, env = "PAINPOINTS_ROOT")]
    root: Option<PathBuf>,

    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Content host token; defaults to the variable named by content.token_env
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write painpoints.yaml for a content repository
    Init {
        /// Repository owner on the content host
        #[arg(long)]
        owner: String,
        /// Repository name on the content host
        #[arg(long)]
        repo: String,
        /// Branch to read from and commit to
        #[arg(long)]
        branch: Option<String>,
        /// Directory inside the repository holding pain points
        #[arg(long = "content-root")]
        content_root: Option<String>,
        /// Content host API base URL
        #[arg(long)]
        api_base: Option<String>,
        /// Overwrite an existing painpoints.yaml
        #[arg(long)]
        force: bool,
    },

    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// List pain points
    List,

    /// Show a pain point with its scores and timeline
    Show(ShowArgs),

    /// Create a pain point
    Create(CreateArgs),

    /// Append an update to a pain point or sub-pain-point
    Update(UpdateArgs),

    Sub {
        #[command(subcommand)]
        subcommand: SubSubcommand,
    },

    /// Serve the HTTP API
    Serve {
        /// Port to listen on; defaults to server.port
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let token = cli.token;

    let result = match cli.command {
        Commands::Init {
            owner,
            repo,
            branch,
            content_root,
            api_base,
            force,
        } => cmd::init::run(
            &root,
            cmd::init::InitOptions {
                owner,
                repo,
                branch,
                content_root,
                api_base,
                force,
            },
        ),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::List => cmd::pain_point::list(&root, token, cli.json),
        Commands::Show(args) => cmd::pain_point::show(&root, token, args, cli.json),
        Commands::Create(args) => cmd::pain_point::create(&root, token, args, cli.json),
        Commands::Update(args) => cmd::update::run(&root, token, args, cli.json),
        Commands::Sub { subcommand } => cmd::sub::run(&root, token, subcommand, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, token, port),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
