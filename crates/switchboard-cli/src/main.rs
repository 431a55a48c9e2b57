use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
#[allow(deprecated)]
use rig::client::completion::CompletionModelHandle;
use rig::client::{CompletionClient, Nothing};
use rig::providers::{anthropic, groq, ollama, openai, openrouter};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use switchboard_config::{find_config_path, load_config, resolve_path, Config};
use switchboard_core::agents::build_registry;
use switchboard_core::agents::coder::EXAMPLE_PROMPTS;
use switchboard_core::{
    Gateway, HistoryStore, ModelPool, ModelSelector, ModelTier, Router, TierModel,
};

/// Render markdown text to the terminal using termimad.
fn render_markdown(text: &str) {
    let skin = termimad::MadSkin::default();
    skin.print_text(text);
}

#[derive(Parser)]
#[command(
    name = "switchboard",
    about = "Routes natural-language questions to specialist LLM agents",
    version
)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a free-form question (routed to the best-matching agent)
    Ask {
        /// The question to dispatch
        question: String,
    },
    /// Run one of the canned python examples through the coder agent
    Example {
        /// Example number (see `example` with no index for the list)
        #[arg(short, long)]
        index: Option<usize>,
    },
    /// Interactive question loop
    Repl,
    /// Print the interaction history verbatim
    History,
    /// Start the web interaction surface
    Serve,
    /// Show configuration summary
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(find_config_path);
    let config = load_config(&config_path)?;

    match cli.command {
        Commands::Status => {
            return run_status(&config_path, &config);
        }
        Commands::History => {
            let history = HistoryStore::new(resolve_path(&config.history.path));
            for line in history.load_all()? {
                println!("{line}");
            }
            return Ok(());
        }
        Commands::Example { index: None } => {
            println!("Available examples:");
            for (i, prompt) in EXAMPLE_PROMPTS.iter().enumerate() {
                println!("  {i}: {prompt}");
            }
            return Ok(());
        }
        _ => {}
    }

    // The remaining commands dispatch through agents and need the full
    // gateway; any failure here is startup-fatal.
    let gateway = build_gateway(&config)?;

    match cli.command {
        Commands::Ask { question } => {
            run_question(&gateway, &question).await;
        }
        Commands::Example { index: Some(i) } => {
            let Some(prompt) = EXAMPLE_PROMPTS.get(i) else {
                anyhow::bail!(
                    "no example #{i} (available: 0..{})",
                    EXAMPLE_PROMPTS.len() - 1
                );
            };
            println!("Running example: {prompt}\n");
            run_example(&gateway, prompt).await;
        }
        Commands::Repl => {
            run_repl(&gateway).await?;
        }
        Commands::Serve => {
            switchboard_web::serve(gateway, &config.gateway).await?;
        }
        _ => unreachable!(),
    }

    Ok(())
}

/// Resolve an API key from config, falling back to an environment variable.
fn resolve_api_key(
    provider_cfg: &Option<switchboard_config::ProviderConfig>,
    env_var: &str,
) -> Option<String> {
    provider_cfg
        .as_ref()
        .and_then(|c| c.api_key.clone())
        .filter(|k| !k.is_empty())
        .or_else(|| std::env::var(env_var).ok().filter(|k| !k.is_empty()))
}

/// Create a completion model for a specific provider + model combination.
///
/// Errors clearly if provider is unknown or has no API key.
#[allow(deprecated)]
fn create_model_for(
    provider: &str,
    model_name: &str,
    config: &Config,
) -> Result<CompletionModelHandle<'static>> {
    if provider.is_empty() {
        anyhow::bail!(
            "No provider configured.\n\
             Valid providers: openai, anthropic, ollama, openrouter, groq"
        );
    }

    if model_name.is_empty() {
        anyhow::bail!("No model configured for provider '{provider}'.");
    }

    match provider {
        "openai" => {
            let key =
                resolve_api_key(&config.providers.openai, "OPENAI_API_KEY").ok_or_else(|| {
                    anyhow::anyhow!(
                        "OpenAI provider selected but no API key found. \
                     Set providers.openai.apiKey in config.json or OPENAI_API_KEY env var."
                    )
                })?;
            let mut builder = openai::CompletionsClient::builder().api_key(&key);
            if let Some(ref base) = config
                .providers
                .openai
                .as_ref()
                .and_then(|c| c.api_base.clone())
                .filter(|b| !b.is_empty())
            {
                builder = builder.base_url(base);
                tracing::info!("Using OpenAI provider with custom base: {base}");
            }
            let client: openai::CompletionsClient = builder
                .build()
                .map_err(|e| anyhow::anyhow!("Failed to create OpenAI client: {e}"))?;
            let model = client.completion_model(model_name);
            tracing::info!("Using OpenAI provider with model '{model_name}'");
            Ok(CompletionModelHandle::new(Arc::new(model)))
        }

        "anthropic" => {
            let key = resolve_api_key(&config.providers.anthropic, "ANTHROPIC_API_KEY")
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Anthropic provider selected but no API key found. \
                     Set providers.anthropic.apiKey in config.json or ANTHROPIC_API_KEY env var."
                    )
                })?;
            let client: anthropic::Client = anthropic::Client::builder()
                .api_key(&key)
                .build()
                .map_err(|e| anyhow::anyhow!("Failed to create Anthropic client: {e}"))?;
            let model = client.completion_model(model_name).with_prompt_caching();
            tracing::info!(
                "Using Anthropic provider with model '{model_name}' (prompt caching enabled)"
            );
            Ok(CompletionModelHandle::new(Arc::new(model)))
        }

        "ollama" => {
            let mut builder = ollama::Client::builder().api_key(Nothing);
            if let Some(ref base) = config
                .providers
                .ollama
                .as_ref()
                .and_then(|c| c.api_base.clone())
                .filter(|b| !b.is_empty())
            {
                builder = builder.base_url(base);
            }
            let client: ollama::Client = builder
                .build()
                .map_err(|e| anyhow::anyhow!("Failed to create Ollama client: {e}"))?;
            let model = client.completion_model(model_name);
            tracing::info!("Using Ollama provider with model '{model_name}'");
            Ok(CompletionModelHandle::new(Arc::new(model)))
        }

        "openrouter" => {
            let key = resolve_api_key(&config.providers.openrouter, "OPENROUTER_API_KEY")
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "OpenRouter provider selected but no API key found. \
                     Set providers.openrouter.apiKey in config.json or OPENROUTER_API_KEY env var."
                    )
                })?;
            let client: openrouter::Client = openrouter::Client::new(&key)
                .map_err(|e| anyhow::anyhow!("Failed to create OpenRouter client: {e}"))?;
            let model = client.completion_model(model_name);
            tracing::info!("Using OpenRouter provider with model '{model_name}'");
            Ok(CompletionModelHandle::new(Arc::new(model)))
        }

        "groq" => {
            let key = resolve_api_key(&config.providers.groq, "GROQ_API_KEY").ok_or_else(|| {
                anyhow::anyhow!(
                    "Groq provider selected but no API key found. \
                     Set providers.groq.apiKey in config.json or GROQ_API_KEY env var."
                )
            })?;
            let client: groq::Client = groq::Client::new(&key)
                .map_err(|e| anyhow::anyhow!("Failed to create Groq client: {e}"))?;
            let model = client.completion_model(model_name);
            tracing::info!("Using Groq provider with model '{model_name}'");
            Ok(CompletionModelHandle::new(Arc::new(model)))
        }

        other => {
            anyhow::bail!(
                "Unknown provider '{other}'. \
                 Valid providers: openai, anthropic, ollama, openrouter, groq"
            );
        }
    }
}

/// Build one tier's model from its config entry, if present.
fn create_tier_model(config: &Config, tier: ModelTier) -> Result<Option<TierModel>> {
    let Some(model_ref) = config.agents.models.get(tier.key()) else {
        return Ok(None);
    };
    let handle = create_model_for(&model_ref.provider, &model_ref.model, config)
        .map_err(|e| anyhow::anyhow!("Failed to create model for tier '{tier}': {e}"))?;
    tracing::info!(
        "Model tier '{tier}': {} / {}",
        model_ref.provider,
        model_ref.model
    );
    Ok(Some(TierModel {
        handle,
        name: model_ref.model.clone(),
    }))
}

/// Build the ModelPool from config. Requires a "default" tier; "coder" and
/// "tabular" fall back to it when absent.
fn create_model_pool(config: &Config) -> Result<ModelPool> {
    let routing = create_tier_model(config, ModelTier::Routing)?.ok_or_else(|| {
        anyhow::anyhow!(
            "No models configured. Set agents.models in config.json with at least a \"default\" entry.\n\
             Example:\n  \
             \"models\": {{ \"default\": {{ \"provider\": \"openai\", \"model\": \"gpt-4-turbo\" }} }}"
        )
    })?;
    let coder = create_tier_model(config, ModelTier::Coder)?;
    let tabular = create_tier_model(config, ModelTier::Tabular)?;

    for tier in config.agents.models.keys() {
        if !["default", "coder", "tabular"].contains(&tier.as_str()) {
            tracing::warn!("Ignoring unknown model tier '{tier}' in config");
        }
    }

    Ok(ModelPool::new(routing, coder, tabular))
}

/// Assemble the full gateway: model pool, agent registry, router, history.
fn build_gateway(config: &Config) -> Result<Arc<Gateway>> {
    let models = create_model_pool(config)?;
    let registry = Arc::new(build_registry(config, &models)?);

    let defaults = &config.agents.defaults;
    let routing = models.get(ModelTier::Routing);
    let selector = ModelSelector::new(
        routing.handle.clone(),
        routing.name.clone(),
        defaults.temperature as f64,
        defaults.max_tokens as u64,
    );

    let router = Router::new(Arc::new(selector), registry.clone());
    let history = HistoryStore::new(resolve_path(&config.history.path));

    Ok(Arc::new(Gateway::new(router, registry, history)))
}

/// Dispatch one question and print the outcome inline. Failures are shown
/// to the user, never escalated into a crash.
async fn run_question(gateway: &Gateway, question: &str) {
    println!("Processing your answer...\n");
    match gateway.ask(question).await {
        Ok(reply) => {
            render_markdown(&reply.answer);
            if let Some(e) = reply.history_error {
                eprintln!("\n(warning: history not saved: {e})");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
        }
    }
}

/// Run a canned example through the coder capability directly.
async fn run_example(gateway: &Gateway, prompt: &str) {
    println!("Processing your answer...\n");
    match gateway.run_example(prompt).await {
        Ok(reply) => {
            render_markdown(&reply.answer);
            if let Some(e) = reply.history_error {
                eprintln!("\n(warning: history not saved: {e})");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
        }
    }
}

async fn run_repl(gateway: &Gateway) -> Result<()> {
    println!("Ask a question; /history shows the log, /quit exits.");
    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("switchboard> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match line {
                    "/quit" | "/exit" => break,
                    "/history" => match gateway.history_lines() {
                        Ok(lines) if lines.is_empty() => println!("(history is empty)"),
                        Ok(lines) => {
                            for l in lines {
                                println!("{l}");
                            }
                        }
                        Err(e) => eprintln!("Error reading history: {e}"),
                    },
                    question => run_question(gateway, question).await,
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn run_status(config_path: &std::path::Path, config: &Config) -> Result<()> {
    println!("Config: {}", config_path.display());
    println!("History log: {}", resolve_path(&config.history.path).display());
    println!(
        "Gateway: http://{}:{}",
        config.gateway.host, config.gateway.port
    );

    if config.agents.models.is_empty() {
        println!("Models: (none configured)");
    } else {
        println!("Models:");
        let mut tiers: Vec<_> = config.agents.models.iter().collect();
        tiers.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (tier, model_ref) in tiers {
            println!("  {tier}: {} / {}", model_ref.provider, model_ref.model);
        }
    }

    println!("Datasets:");
    let data_dir = resolve_path(&config.datasets.data_dir);
    for file in [
        &config.datasets.cats,
        &config.datasets.dogs,
        &config.datasets.sleep_patterns,
        &config.datasets.healthy_foods,
    ] {
        let path = {
            let p = resolve_path(file);
            if p.is_absolute() {
                p
            } else {
                data_dir.join(p)
            }
        };
        let mark = if path.exists() { "ok" } else { "MISSING" };
        println!("  [{mark}] {}", path.display());
    }

    Ok(())
}
