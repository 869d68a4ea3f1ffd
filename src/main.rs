use std::path::{Path, PathBuf};
use std::sync::Arc;

use catalog::client::{CatalogView, HttpCatalog, render_table};
use catalog::config::{BooksCommand, Cli, Command, Config, default_config_dir, default_config_path};
use catalog::db::Database;
use catalog::handler::AppState;
use catalog::model::{BookInput, parse_year};
use catalog::routes;
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    let _ = dotenvy::dotenv();

    // --config puts data (the database) next to the config file,
    // otherwise both live under ~/.catalog/
    let explicit = args.config_path.is_some();
    let (config_path, data_dir) = match args.config_path {
        Some(path) => {
            let path = PathBuf::from(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."));
            (path, dir)
        }
        None => (default_config_path(), default_config_dir()),
    };

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(env_filter("info"))
                .init();
            let cfg = load_config(&config_path, explicit);
            serve(cfg, data_dir).await;
        }
        Command::Books { action } => {
            tracing_subscriber::fmt()
                .compact()
                .with_writer(std::io::stderr)
                .with_env_filter(env_filter("warn"))
                .init();
            let cfg = load_config(&config_path, explicit);
            if let Err(e) = books(cfg, action).await {
                tracing::error!(error = %e, "books command failed");
                std::process::exit(1);
            }
        }
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn load_config(path: &Path, explicit: bool) -> Config {
    Config::load_or_default(path, explicit).unwrap_or_else(|e| {
        tracing::error!(error = ?e, path = ?path, "failed to load config file");
        std::process::exit(1);
    })
}

async fn serve(cfg: Config, data_dir: PathBuf) {
    tracing::info!("catalog.svc starting");

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(error = %e, path = ?data_dir, "failed to create data directory");
        std::process::exit(1);
    }

    // schema must be in place before the listener accepts anything
    let db = Arc::new(Database::new(&cfg, &data_dir).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup database");
        std::process::exit(1);
    }));

    let state = AppState::new(db).with_store_errors_exposed(cfg.app.expose_store_errors);
    let app = routes::app(state, &cfg.cors);

    let address = cfg.app.address();
    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    let cancellation_token = CancellationToken::new();
    let signal_token = cancellation_token.clone();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            return;
        }
        tracing::info!("ctrl+c signal received, preparing to shutdown");
        signal_token.cancel();
    });

    tracing::info!("catalog.svc running on {}", &address);
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(cancellation_token.cancelled_owned())
        .await
    {
        tracing::error!(error = %err, "server stopped unexpectedly");
        std::process::exit(1);
    }

    tracing::info!("catalog.svc going off, graceful shutdown complete");
}

async fn books(cfg: Config, action: BooksCommand) -> anyhow::Result<()> {
    let mut view = CatalogView::new(HttpCatalog::new(&cfg.client.base_url));

    let ok = match action {
        BooksCommand::List => view.mount().await,
        BooksCommand::Add { title, author, year } => {
            let year = match year {
                Some(y) => parse_year(&y).map_err(anyhow::Error::msg)?,
                None => None,
            };
            view.set_draft(BookInput {
                title: Some(title),
                author: Some(author),
                year,
            });
            view.submit().await
        }
        BooksCommand::Edit {
            id,
            title,
            author,
            year,
        } => {
            if !view.mount().await {
                false
            } else if !view.start_edit(id) {
                anyhow::bail!("no book with id {}", id);
            } else {
                let draft = view.draft_mut();
                if let Some(title) = title {
                    draft.title = Some(title);
                }
                if let Some(author) = author {
                    draft.author = Some(author);
                }
                if let Some(year) = year {
                    draft.year = parse_year(&year).map_err(anyhow::Error::msg)?;
                }
                view.submit().await
            }
        }
        BooksCommand::Delete { id } => view.delete(id).await,
    };

    if !ok {
        anyhow::bail!("request to {} failed", cfg.client.base_url);
    }

    println!("{}", render_table(view.books()));
    Ok(())
}
