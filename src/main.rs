use clap::Parser;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linkrange::cli::{embed_command, resolve_command, vault_root, Cli, Command};
use linkrange::server::Backend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkrange=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Lsp => {
            let (service, socket) = LspService::new(Backend::new);
            Server::new(stdin(), stdout(), socket).serve(service).await;
        }
        Command::Resolve {
            reference,
            vault,
            json,
        } => {
            println!("{}", resolve_command(&reference, &vault_root(vault)?, json)?);
        }
        Command::Embed { reference, vault } => {
            print!("{}", embed_command(&reference, &vault_root(vault)?).await?);
        }
    }

    Ok(())
}
