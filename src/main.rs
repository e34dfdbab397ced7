use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::{LevelFilter, info, warn};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use toolrouter::agent::Agent;
use toolrouter::config::Config;
use toolrouter::llm::{LlmClient, OllamaClient, OllamaConfig};
use toolrouter::rag::{ChatMemory, DocumentQa, Embedder, MemoryVectorStore, OllamaEmbedder, Persona, RagChat};
use toolrouter::router::{Arguments, FAILURE_MARKER, InvocationRequest, InvocationResult, LlmIntentClassifier, NonInteractive, ToolRouter};
use toolrouter::session::{BACKEND_HINT, ChatSession};
use toolrouter::RouterError;
use toolrouter::tools::{ToolContext, standard_registry};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("toolrouter")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("toolrouter.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // The builder lets everything through; the global max level does the gating
    env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .parse_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();
    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(LevelFilter::Info);
    }

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// RUST_LOG wins over the config file
fn apply_log_level(config: &Config) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    if let Some(level) = &config.log_level {
        match level.parse::<LevelFilter>() {
            Ok(filter) => log::set_max_level(filter),
            Err(_) => warn!("Ignoring unknown log level '{}'", level),
        }
    }
}

fn llm_client(config: &Config) -> Result<OllamaClient> {
    OllamaClient::new(OllamaConfig::from(&config.llm)).context("Failed to create LLM client")
}

fn build_router(config: &Config) -> Result<ToolRouter> {
    let llm: Arc<dyn LlmClient> = Arc::new(llm_client(config)?);
    let classifier = Arc::new(LlmIntentClassifier::new(llm.clone()));
    let registry = standard_registry(classifier.clone()).context("Failed to register tools")?;
    let ctx = ToolContext::from_config(config, llm)?;
    Ok(ToolRouter::new(registry, classifier, ctx))
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None | Some(Commands::Agent) => run_agent(config).await,
        Some(Commands::Tools) => handle_tools_command(config),
        Some(Commands::Run { tool, args }) => handle_run_command(tool, args, config).await,
        Some(Commands::Chat) => run_chat(config).await,
        Some(Commands::Rag { memory }) => run_rag(memory.as_ref(), config).await,
        Some(Commands::Qa { files, question }) => run_qa(files, question.as_deref(), config).await,
    }
}

async fn run_agent(config: &Config) -> Result<()> {
    info!("Launching agent in {}", config.agent.resolved_workdir().display());
    let router = build_router(config)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    Agent::new(&router, config.agent.exit_token.clone())
        .with_chat_session(config.agent.chat_session)
        .run(&mut stdin.lock(), &mut stdout)
        .await?;
    Ok(())
}

fn handle_tools_command(config: &Config) -> Result<()> {
    let router = build_router(config)?;
    for spec in router.registry().specs() {
        let params = if spec.parameters.is_empty() {
            String::new()
        } else {
            format!(" ({})", spec.parameters.join(", "))
        };
        println!("  • {}{}: {}", spec.name.cyan(), params.dimmed(), spec.description);
    }
    Ok(())
}

async fn handle_run_command(tool: &str, args: &[(String, String)], config: &Config) -> Result<()> {
    info!("Running '{}' with {} arguments", tool, args.len());
    let router = build_router(config)?;

    let arguments: Arguments = args.iter().cloned().collect();
    let request = InvocationRequest::new(tool).with_arguments(arguments);

    match router.dispatch(request, &mut NonInteractive).await {
        InvocationResult::Success(text) => {
            println!("{}", text);
            Ok(())
        }
        InvocationResult::Failure(err) => {
            eprintln!("{} {}", FAILURE_MARKER, err.to_string().red());
            Err(eyre!(err))
        }
    }
}

async fn run_chat(config: &Config) -> Result<()> {
    let llm = llm_client(config)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    ChatSession::new(&llm, config.agent.exit_token.clone())
        .run(&mut stdin.lock(), &mut stdout)
        .await?;
    Ok(())
}

async fn run_rag(memory_override: Option<&PathBuf>, config: &Config) -> Result<()> {
    let memory_file = memory_override.unwrap_or(&config.rag.memory_file);
    let memory = ChatMemory::load(memory_file).context("Failed to load chat memory")?;

    let llm: Arc<dyn LlmClient> = Arc::new(llm_client(config)?);
    let persona = Persona::new(config.rag.user_name.clone(), config.rag.tone.clone());
    let mut rag = RagChat::new(llm, embedder(config)?, Arc::new(MemoryVectorStore::new()), memory, persona)
        .with_config(&config.rag);

    println!(
        "{}",
        format!(
            "Loaded {} messages from {}. Chatting as {}. Type '{}' to leave.",
            rag.memory().len(),
            rag.memory().path().display(),
            config.rag.user_name,
            config.agent.exit_token
        )
        .dimmed()
    );

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "{}", "You: ".green().bold())?;
        stdout.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case(&config.agent.exit_token) {
            break;
        }

        print!("{} ", "AI:".cyan().bold());
        let turn = rag
            .turn(line, |fragment| {
                print!("{}", fragment);
                let _ = io::stdout().flush();
            })
            .await;
        println!();

        if let Err(e) = turn {
            warn!("RAG turn failed: {}", e);
            report_failure(&e);
        }
    }

    Ok(())
}

async fn run_qa(files: &[PathBuf], question: Option<&str>, config: &Config) -> Result<()> {
    let llm: Arc<dyn LlmClient> = Arc::new(llm_client(config)?);
    let mut qa = DocumentQa::new(llm, embedder(config)?, Arc::new(MemoryVectorStore::new())).with_config(&config.rag);

    for file in files {
        let count = qa
            .ingest_file(file)
            .await
            .with_context(|| format!("Failed to ingest {}", file.display()))?;
        println!("{}", format!("Ingested {} ({} chunks)", file.display(), count).dimmed());
    }

    if let Some(question) = question {
        let answer = qa.answer(question).await?;
        println!("{}", answer);
        return Ok(());
    }

    println!("{}", format!("Ask about the documents. Type '{}' to leave.", config.agent.exit_token).dimmed());
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "{}", "Question: ".green().bold())?;
        stdout.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case(&config.agent.exit_token) {
            break;
        }

        match qa.answer(line).await {
            Ok(answer) => println!("{} {}", "Answer:".cyan().bold(), answer),
            Err(e) => {
                warn!("Question failed: {}", e);
                report_failure(&e);
            }
        }
    }

    Ok(())
}

fn embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    Ok(Arc::new(OllamaEmbedder::new(
        llm_client(config)?,
        config.llm.embedding_model.clone(),
        config.rag.dimension,
    )))
}

fn report_failure(err: &RouterError) {
    println!("{} {}", FAILURE_MARKER, err.to_string().red());
    if err.is_backend() {
        println!("{}", BACKEND_HINT.dimmed());
    }
}

fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    apply_log_level(&config);
    if cli.is_verbose() {
        log::set_max_level(LevelFilter::Debug);
    }

    info!("Starting with config from: {:?}", cli.config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run_application(&cli, &config))
}
