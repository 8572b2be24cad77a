//! Handlers for the one-shot subcommands
//!
//! Each handler works on the same session, client and views the dashboard
//! uses, and prints plain text for scripting.

use crate::auth::{
    AuthSession, FileStorage, GoogleProvider, IdentityProvider, MemoryStorage, MockProvider,
    Storage, TokenStore, UnconfiguredProvider,
};
use crate::cli::Commands;
use crate::config::Config;
use crate::gate::{AuthGate, GateDecision, Route};
use crate::knowledge::{KnowledgeClient, Node};
use crate::views::{Applied, NodesView, SearchMode, SearchView};
use anyhow::{anyhow, bail, Context};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Everything a command or the dashboard needs, wired once at startup
pub struct Services {
    pub config: Config,
    pub session: Arc<AuthSession>,
    pub client: Arc<KnowledgeClient>,
}

impl Services {
    /// Wire storage, provider, session and client from `config`
    ///
    /// `interactive` keeps the provider from printing over the dashboard.
    pub fn from_config(config: Config, interactive: bool) -> anyhow::Result<Self> {
        let storage: Arc<dyn Storage> = if config.ephemeral {
            Arc::new(MemoryStorage::new())
        } else {
            Arc::new(FileStorage::new(config.storage_dir.clone()))
        };
        let provider = provider_for(&config, interactive)?;
        Self::new(config, storage, provider)
    }

    pub fn new(
        config: Config,
        storage: Arc<dyn Storage>,
        provider: Arc<dyn IdentityProvider>,
    ) -> anyhow::Result<Self> {
        let session = Arc::new(AuthSession::hydrate(TokenStore::new(storage), provider));
        let client = KnowledgeClient::from_config(&config)
            .context("Failed to build HTTP client")?
            .with_invalidation(session.clone());

        Ok(Self {
            config,
            session,
            client: Arc::new(client),
        })
    }
}

fn provider_for(config: &Config, interactive: bool) -> anyhow::Result<Arc<dyn IdentityProvider>> {
    if config.skip_auth {
        tracing::warn!("Authentication skipped, using the mock identity provider");
        return Ok(Arc::new(MockProvider::default()));
    }

    if let Some(missing) = config.missing_google_setting() {
        return Ok(Arc::new(UnconfiguredProvider::new(missing)));
    }

    let google = GoogleProvider::from_config(config)?;
    Ok(if interactive {
        Arc::new(google.quiet())
    } else {
        Arc::new(google)
    })
}

/// Run a subcommand to completion
pub async fn run(command: Commands, services: &Services) -> anyhow::Result<()> {
    match command {
        Commands::Login => login(services).await,
        Commands::Logout => logout(services).await,
        Commands::Whoami => {
            whoami(services);
            Ok(())
        }
        Commands::Nodes => nodes(services).await,
        Commands::Delete { id, yes } => delete(services, &id, yes).await,
        Commands::Search { query, mode } => search(services, &query.join(" "), mode).await,
    }
}

async fn login(services: &Services) -> anyhow::Result<()> {
    if let Some(current) = services.session.current_user() {
        println!("Already signed in as {}", current.display_name);
        return Ok(());
    }

    let session = services.session.sign_in().await?;
    println!("Signed in as {}", session.display_name);
    Ok(())
}

async fn logout(services: &Services) -> anyhow::Result<()> {
    services.session.logout().await;
    println!("Signed out.");
    Ok(())
}

fn whoami(services: &Services) {
    match services.session.current_user() {
        Some(current) => println!(
            "{} (via {})",
            current.display_name,
            services.session.provider_name()
        ),
        None => println!("Not signed in"),
    }
}

/// Commands touching nodes run behind the same gate as the dashboard
fn require_session(services: &Services) -> anyhow::Result<()> {
    let authenticated = services.session.current_user().is_some();
    match AuthGate::evaluate(Route::Home, authenticated) {
        GateDecision::Allow => Ok(()),
        GateDecision::Redirect(_) => bail!("Not signed in. Run `secondbrain login` first."),
    }
}

fn ensure_applied(applied: Applied) -> anyhow::Result<()> {
    match applied {
        Applied::Updated => Ok(()),
        Applied::Failed(alert) => Err(anyhow!(alert.message())),
        Applied::Stale => Err(anyhow!("Session changed while the request was running")),
    }
}

async fn fetch_nodes(services: &Services) -> anyhow::Result<NodesView> {
    require_session(services)?;
    let mut view = NodesView::new();
    ensure_applied(view.refresh(&services.client, &services.session).await)?;
    Ok(view)
}

async fn nodes(services: &Services) -> anyhow::Result<()> {
    let view = fetch_nodes(services).await?;
    if view.nodes().is_empty() {
        println!("No nodes yet.");
        return Ok(());
    }
    for node in view.nodes() {
        print_node(node);
    }
    Ok(())
}

async fn delete(services: &Services, id: &str, yes: bool) -> anyhow::Result<()> {
    let mut view = fetch_nodes(services).await?;
    if !view.request_delete(id) {
        bail!("No node with id {}", id);
    }

    if !yes {
        let title = view
            .pending_delete()
            .map(|node| node.display_title().to_string())
            .unwrap_or_default();
        if !confirm(&format!("Delete \"{}\"? This cannot be undone.", title))? {
            view.cancel_delete();
            println!("Cancelled.");
            return Ok(());
        }
    }

    let applied = view
        .delete_confirmed(&services.client, &services.session)
        .await
        .ok_or_else(|| anyhow!(crate::constants::SESSION_EXPIRED_MESSAGE))?;
    ensure_applied(applied)?;
    println!("Deleted {}", id);
    Ok(())
}

async fn search(services: &Services, query: &str, mode: SearchMode) -> anyhow::Result<()> {
    require_session(services)?;

    let mut view = SearchView::with_mode(mode);
    view.set_query(query);

    if mode == SearchMode::Semantic {
        println!(
            "{} runs on the assistant backend; no local results. Use --mode keyword.",
            mode.label()
        );
        return Ok(());
    }

    if let Some(hint) = view.hint() {
        println!("{}", hint);
        return Ok(());
    }

    ensure_applied(view.refresh(&services.client, &services.session).await)?;
    let results = view.results();
    if results.is_empty() {
        println!("No matches for \"{}\"", query);
    }
    for node in results {
        print_node(node);
    }
    Ok(())
}

fn print_node(node: &Node) {
    println!("{}  {}", node.id, node.display_title());
    println!("    {}", node.summary());
    if let Some(url) = &node.url {
        println!("    {}", url);
    }
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
