//! CLI definition and command dispatch for June.
//!
//! This module defines the command-line interface using `clap` and provides
//! the `run()` function that dispatches commands to the assistant.
//!
//! ## Configuration Precedence
//!
//! Configuration is resolved with the following precedence (highest to lowest):
//! 1. CLI flags (`--config`, `--verbose`)
//! 2. Environment variables (`JUNE_CONFIG`, `JUNE_VERBOSE`, `GEMINI_API_KEY`)
//! 3. Config file (`~/.june/config.yaml` or path from `--config`/`JUNE_CONFIG`)
//! 4. Built-in defaults

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use serde_json::json;

use crate::ui::{color, format, table, ColorMode, MessageType, Progress, ProgressMode, Style};

use june_core::{
    build_context, check_config, Assistant, Category, ChatState, GlobalConfig, JuneError,
    ReplyOrigin, Role,
};

// ============================================================================
// CLI Definition
// ============================================================================

/// Version string including git commit hash
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// June – portfolio knowledge assistant
#[derive(Parser, Debug)]
#[command(name = "june")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, env = "JUNE_VERBOSE")]
    pub verbose: bool,

    /// Suppress the spinner and informational messages
    #[arg(short, long, global = true, env = "JUNE_QUIET")]
    pub quiet: bool,

    /// Path to configuration file (default: ~/.june/config.yaml)
    #[arg(long, global = true, env = "JUNE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Color output mode
    #[arg(long, global = true, env = "JUNE_COLOR", value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask a single question on a fresh conversation
    #[command(after_help = r#"EXAMPLES:
    # Ask a question
    june ask "How can I contact Daniel?"

    # Quotes are optional
    june ask What are his skills?

    # Get the reply and its origin as JSON
    june ask "What projects has he built?" --json
"#)]
    Ask {
        /// The question to ask
        #[arg(required = true)]
        query: Vec<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive conversation
    #[command(after_help = r#"EXAMPLES:
    # Start chatting
    june chat

    # Commands available inside the chat:
    #   /suggest   list quick suggestions
    #   /history   show recorded turns
    #   /reset     start a new conversation
    #   /exit      leave (also /quit or Ctrl-D)
"#)]
    Chat,

    /// Show the chunks retrieved for a query and their scores
    #[command(after_help = r#"EXAMPLES:
    # Show the top chunks for a query
    june retrieve "How can I contact Daniel?"

    # Consider more chunks
    june retrieve skills --top-k 8

    # Also print the context sent to the model
    june retrieve "What are his skills?" --context

    # Output as JSON
    june retrieve education --json
"#)]
    Retrieve {
        /// The query to score chunks against
        #[arg(required = true)]
        query: Vec<String>,

        /// Maximum number of chunks (default: retrieval.contextTopK)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print the assembled context block
        #[arg(long)]
        context: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List the knowledge base
    #[command(after_help = r#"EXAMPLES:
    # List every chunk
    june chunks

    # Only the skills chunks
    june chunks --category skills

    # Full chunks as JSON
    june chunks --json
"#)]
    Chunks {
        /// Only list chunks of this category (e.g. skills, contact, projects)
        #[arg(short, long)]
        category: Option<Category>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print quick suggestions for visitors
    #[command(after_help = r#"EXAMPLES:
    june suggestions
    june suggestions --json
"#)]
    Suggestions {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration (check, show)
    #[command(after_help = r#"EXAMPLES:
    # Validate configuration and profile
    june config check

    # Validate a specific config file
    june --config ./june.yaml config check

    # Show resolved configuration (API key redacted)
    june config show

    # Output as JSON
    june config show --json
"#)]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and knowledge profile
    #[command(after_help = r#"EXAMPLES:
    june config check
    june config check --json
"#)]
    Check {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show resolved configuration with secrets redacted
    #[command(after_help = r#"EXAMPLES:
    june config show
    june config show --json
"#)]
    Show {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// Run function
// ============================================================================

/// Run the CLI application.
///
/// Parses command-line arguments, loads configuration and the knowledge
/// profile, and dispatches to the appropriate command handler. `config`
/// commands run before loading so they can report a broken configuration.
///
/// # Returns
///
/// Returns `ExitCode::SUCCESS` on success, or `ExitCode::FAILURE` on error.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Warnings always, debug with --verbose. Logs go to stderr.
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = format!(
        "june_core={},june_model={},june_cli={}",
        log_level, log_level, log_level
    );

    tracing_subscriber::fmt()
        .with_env_filter(&filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let style = Style::new(cli.color);
    let config_path = cli.config.as_deref();

    if let Command::Config { action } = &cli.command {
        return finish(&style, handle_config(&style, config_path, action));
    }

    let config = match GlobalConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "{}",
                style.error_with_context(
                    "Failed to load configuration",
                    Some(&e.to_string()),
                    Some(&config_hint(config_path)),
                )
            );
            return ExitCode::FAILURE;
        }
    };

    let assistant = match Assistant::from_config(&config) {
        Ok(assistant) => assistant,
        Err(e) => {
            eprintln!(
                "{}",
                style.error_with_context(
                    "Failed to initialize assistant",
                    Some(&e.to_string()),
                    Some("Run `june config check` to validate the configuration and profile"),
                )
            );
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Ask { query, json } => handle_ask(&style, &assistant, &query, json, cli.quiet),
        Command::Chat => handle_chat(&style, &assistant, cli.quiet),
        Command::Retrieve {
            query,
            top_k,
            context,
            json,
        } => handle_retrieve(&style, &assistant, &query, top_k, context, json),
        Command::Chunks { category, json } => handle_chunks(&style, &assistant, category, json),
        Command::Suggestions { json } => handle_suggestions(&style, &assistant, json),
        Command::Config { .. } => Ok(()),
    };

    finish(&style, result)
}

fn finish(style: &Style, result: Result<(), JuneError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", style.message(MessageType::Err, &e.to_string()));
            ExitCode::FAILURE
        }
    }
}

fn config_hint(path: Option<&Path>) -> String {
    match path {
        Some(path) => format!("Check your config at {}", path.display()),
        None => "Check your global config at ~/.june/config.yaml".to_string(),
    }
}

/// Join positional words into one query, rejecting blank input.
fn join_query(words: &[String]) -> Result<String, JuneError> {
    let query = words.join(" ");
    if query.trim().is_empty() {
        return Err(anyhow!("Query must not be empty").into());
    }
    Ok(query)
}

// ============================================================================
// Command handlers
// ============================================================================

fn handle_ask(
    style: &Style,
    assistant: &Assistant,
    words: &[String],
    json: bool,
    quiet: bool,
) -> Result<(), JuneError> {
    let query = join_query(words)?;

    let progress = thinking_spinner(assistant, ProgressMode::detect(quiet, json));
    let (_state, reply) = assistant.converse(ChatState::new(), &query);
    if let Some(progress) = progress {
        progress.finish_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reply).unwrap_or_default());
        return Ok(());
    }

    println!("{}", reply.text);
    if !quiet && reply.origin != ReplyOrigin::Model {
        eprintln!(
            "{}",
            style.message(
                MessageType::Info,
                &format!("Answered from {}", style.origin(reply.origin))
            )
        );
    }
    Ok(())
}

/// Spinner shown while a model request is in flight.
fn thinking_spinner(assistant: &Assistant, mode: ProgressMode) -> Option<Progress> {
    if !assistant.has_model() {
        return None;
    }
    let name = &assistant.knowledge().persona().name;
    Some(Progress::spinner(&format!("{} is typing...", name), mode))
}

fn handle_chat(style: &Style, assistant: &Assistant, quiet: bool) -> Result<(), JuneError> {
    let persona = assistant.knowledge().persona();
    let speaker = style.speaker(&persona.name);
    let interactive = atty::is(atty::Stream::Stdin);
    let mode = ProgressMode::detect(quiet, false);

    println!("{} {}", speaker, persona.greeting);
    if !quiet {
        match assistant.model_id() {
            Some(model) => println!(
                "{}",
                style.message(MessageType::Info, &style.key_value("Model", model))
            ),
            None => println!(
                "{}",
                style.message(
                    MessageType::Warn,
                    "No API key configured; answering from local knowledge"
                )
            ),
        }
        println!(
            "{}",
            style.message(MessageType::Hint, "Type /suggest for ideas, /exit to leave")
        );
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut state = ChatState::new();

    loop {
        if interactive {
            print!("you> ");
            io::stdout()
                .flush()
                .map_err(|e| anyhow!("Failed to flush stdout: {}", e))?;
        }

        let line = match lines.next() {
            Some(line) => line.map_err(|e| anyhow!("Failed to read input: {}", e))?,
            None => break,
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/exit" | "/quit" => break,
            "/reset" => {
                state.reset();
                println!("{}", style.message(MessageType::Ok, "Conversation reset"));
            }
            "/suggest" => print_suggestions(style, assistant.suggestions()),
            "/history" => print_history(style, &state, &persona.name),
            _ if input.starts_with('/') => println!(
                "{}",
                style.message(
                    MessageType::Warn,
                    &format!("Unknown command '{}'. Try /suggest, /history, /reset or /exit", input)
                )
            ),
            _ => {
                let progress = thinking_spinner(assistant, mode);
                let (next, reply) = assistant.converse(state, input);
                state = next;
                if let Some(progress) = progress {
                    progress.finish_clear();
                }
                println!("{} {}", speaker, reply.text);
            }
        }
    }

    if !quiet {
        println!("{}", style.message(MessageType::Info, "Goodbye"));
    }
    Ok(())
}

fn print_suggestions(style: &Style, suggestions: &[String]) {
    if suggestions.is_empty() {
        println!("{}", style.message(MessageType::Info, "No suggestions configured"));
        return;
    }
    println!("{}", style.section("Suggestions"));
    for (i, suggestion) in suggestions.iter().enumerate() {
        println!("  {}. {}", i + 1, suggestion);
    }
}

fn print_history(style: &Style, state: &ChatState, assistant_name: &str) {
    let turns = state.history().turns();
    if turns.is_empty() {
        println!("{}", style.message(MessageType::Info, "No turns recorded yet"));
        return;
    }
    println!(
        "{}",
        style.section(&format!("History ({} turns)", turns.len()))
    );
    for turn in turns {
        let who = match turn.role {
            Role::User => "you",
            Role::Assistant => assistant_name,
        };
        println!(
            "  [{}] {}: {}",
            format::format_clock(turn.timestamp),
            who,
            format::preview(&turn.content, 100)
        );
    }
}

fn handle_retrieve(
    style: &Style,
    assistant: &Assistant,
    words: &[String],
    top_k: Option<usize>,
    show_context: bool,
    json: bool,
) -> Result<(), JuneError> {
    let query = join_query(words)?;
    let k = top_k.unwrap_or(assistant.settings().context_top_k);
    let results = assistant.retriever().retrieve(&query, k);
    let owner = assistant.knowledge().owner();

    if json {
        let mut output = json!({
            "query": query,
            "topK": k,
            "results": &results,
        });
        if show_context {
            output["context"] = json!(build_context(results.iter().map(|r| r.chunk), owner));
        }
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return Ok(());
    }

    if results.is_empty() {
        println!(
            "{}",
            style.message(MessageType::Info, "No chunks matched the query")
        );
    } else {
        println!(
            "{}",
            style.message(
                MessageType::Ok,
                &format!("{} chunk(s) for \"{}\" (top {})", results.len(), query, k)
            )
        );
        println!();
        println!("{}", table::render_retrieval_table(&results));

        let best = results[0].score;
        for scored in &results {
            println!(
                "  {} {} {} {}",
                style.score(scored.score, best),
                style.chunk_id(&scored.chunk.id),
                style.category(scored.chunk.category),
                scored.chunk.title
            );
        }
    }

    if show_context {
        println!();
        println!("{}", style.section("Context"));
        let context = build_context(results.iter().map(|r| r.chunk), owner);
        println!("{}", format::indent(&context, 2));
    }

    Ok(())
}

fn handle_chunks(
    style: &Style,
    assistant: &Assistant,
    category: Option<Category>,
    json: bool,
) -> Result<(), JuneError> {
    let kb = assistant.knowledge();
    let chunks: Vec<_> = kb
        .chunks()
        .iter()
        .filter(|c| category.is_none_or(|cat| c.category == cat))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&chunks).unwrap_or_default());
        return Ok(());
    }

    if chunks.is_empty() {
        println!("{}", style.message(MessageType::Info, "No chunks found"));
        return Ok(());
    }

    println!(
        "{}",
        style.message(
            MessageType::Info,
            &format!("{} chunk(s) in {}'s profile", chunks.len(), kb.owner())
        )
    );
    println!();
    println!(
        "{}",
        table::render_chunks_table(chunks.iter().copied(), color::terminal_width())
    );
    Ok(())
}

fn handle_suggestions(style: &Style, assistant: &Assistant, json: bool) -> Result<(), JuneError> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(assistant.suggestions()).unwrap_or_default()
        );
        return Ok(());
    }
    print_suggestions(style, assistant.suggestions());
    Ok(())
}

fn handle_config(
    style: &Style,
    path: Option<&Path>,
    action: &ConfigAction,
) -> Result<(), JuneError> {
    match action {
        ConfigAction::Check { json } => handle_config_check(style, path, *json),
        ConfigAction::Show { json } => handle_config_show(style, path, *json),
    }
}

/// Validate the configuration file and the knowledge profile.
fn handle_config_check(style: &Style, path: Option<&Path>, json: bool) -> Result<(), JuneError> {
    let validation = check_config(path);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&validation).unwrap_or_default()
        );
    } else {
        println!(
            "{}",
            style.message(
                MessageType::Info,
                &format!("Checked {} configuration source(s)", validation.sources.len())
            )
        );

        for source in &validation.sources {
            let status = if !source.exists {
                "-"
            } else if source.valid {
                "✓"
            } else {
                "✗"
            };
            println!("  {} {} ({})", status, source.name, source.location);
        }
        println!(
            "  {} API key {}",
            if validation.api_key_configured { "✓" } else { "-" },
            if validation.api_key_configured {
                "configured"
            } else {
                "not configured (local replies only)"
            }
        );
        println!();

        if !validation.warnings.is_empty() {
            println!(
                "{}",
                style.message(
                    MessageType::Warn,
                    &format!("{} warning(s):", validation.warnings.len())
                )
            );
            for warning in &validation.warnings {
                println!("  • {}", warning);
            }
            println!();
        }

        if !validation.errors.is_empty() {
            println!(
                "{}",
                style.message(
                    MessageType::Err,
                    &format!("{} error(s):", validation.errors.len())
                )
            );
            for error in &validation.errors {
                println!("  • {}", error);
            }
            println!();
        }

        if validation.errors.is_empty() && validation.warnings.is_empty() {
            println!("{}", style.message(MessageType::Ok, "Configuration is valid"));
        } else if validation.errors.is_empty() {
            println!(
                "{}",
                style.message(MessageType::Ok, "Configuration is valid with warnings")
            );
        } else {
            println!("{}", style.message(MessageType::Err, "Configuration has errors"));
        }
    }

    if !validation.is_valid() {
        return Err(JuneError::invalid_configuration(
            format!("{} configuration error(s) found", validation.errors.len()),
            "Fix the reported values and run `june config check` again",
        ));
    }

    Ok(())
}

/// Show resolved configuration with the API key redacted.
fn handle_config_show(style: &Style, path: Option<&Path>, json: bool) -> Result<(), JuneError> {
    let mut config = match path {
        Some(path) => GlobalConfig::read_file(path)?,
        None => match GlobalConfig::default_path() {
            Some(default) => GlobalConfig::read_file(&default)?,
            None => GlobalConfig::default(),
        },
    };
    config.apply_env_overrides();
    let resolved = config.redacted();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&resolved).unwrap_or_default()
        );
    } else {
        println!(
            "{}",
            style.message(MessageType::Info, "Resolved configuration:")
        );
        println!();
        let pretty = serde_json::to_string_pretty(&resolved)
            .unwrap_or_else(|_| format!("{:?}", resolved));
        println!("{}", pretty);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_joins_words() {
        let cli = Cli::try_parse_from(["june", "ask", "How", "can", "I", "contact", "Daniel?"])
            .unwrap();
        match cli.command {
            Command::Ask { query, json } => {
                assert_eq!(join_query(&query).unwrap(), "How can I contact Daniel?");
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_chunks_category() {
        let cli = Cli::try_parse_from(["june", "chunks", "--category", "skills"]).unwrap();
        match cli.command {
            Command::Chunks { category, .. } => assert_eq!(category, Some(Category::Skills)),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Cli::try_parse_from(["june", "chunks", "--category", "hobbies"]).is_err());
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "june",
            "retrieve",
            "skills",
            "--top-k",
            "3",
            "--color",
            "never",
            "--config",
            "/tmp/june.yaml",
        ])
        .unwrap();
        assert_eq!(cli.color, ColorMode::Never);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/june.yaml")));
        match cli.command {
            Command::Retrieve { top_k, .. } => assert_eq!(top_k, Some(3)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_blank_query_is_rejected() {
        assert!(join_query(&["  ".to_string()]).is_err());
    }
}
