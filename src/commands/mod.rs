/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`    - Interactive chat mode
- `ask`     - One-shot question
- `history` - Server-side history listing and cleanup
- `health`  - Backend reachability check
- `auth`    - Token storage in the OS keyring

Handlers build a `QaClient` from the configuration and drive the
`ChatController` the same way in every mode.
*/

use crate::api::QaClient;
use crate::chat::connection;
use crate::chat::{ChatContext, ChatController, ConnectionStatus, Message, Role, SubmitOutcome};
use crate::config::Config;
use crate::error::{QueryGptError, Result};

// Special commands parser for interactive chat
pub mod special_commands;

// History management commands
pub mod history;

/// Print one message the way the chat view shows it.
///
/// Answers carry their number so that `/like <n>` can refer to them.
fn print_message(message: &Message, answer_number: Option<usize>) {
    use colored::Colorize;

    match message.role {
        Role::User => {
            println!(
                "{} {}",
                "You".bold().blue(),
                message.time_label().dimmed()
            );
            println!("{}\n", message.content);
        }
        Role::Assistant => {
            let mut header = format!("{}", "Assistant".bold().green());
            if let Some(n) = answer_number {
                header = format!("[{}] {}", n, header);
            }
            let mut meta = message.time_label();
            if let Some(ms) = message.response_time_ms {
                meta.push_str(&format!("  {}ms", ms));
            }
            if let Some(rating) = message.rating {
                meta.push_str(&format!("  {}", rating));
            }
            println!("{} {}", header, meta.dimmed());

            if message.is_successful == Some(false) {
                println!("{}\n", message.content.red());
            } else {
                println!("{}\n", message.content);
            }
        }
    }
}

/// Print every message of the conversation with answer numbers.
fn print_conversation(controller: &ChatController) {
    let mut answers = 0;
    for message in controller.messages() {
        let number = if message.role == Role::Assistant {
            answers += 1;
            Some(answers)
        } else {
            None
        };
        print_message(message, number);
    }
}

/// Print the most recent answer.
fn print_last_answer(controller: &ChatController) {
    let answers = controller
        .messages()
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .count();
    if let Some(message) = controller.messages().last() {
        print_message(message, Some(answers));
    }
}

/// Id of the n-th answer on screen (1-based).
fn answer_id(controller: &ChatController, number: usize) -> Option<String> {
    controller
        .messages()
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .nth(number.checked_sub(1)?)
        .map(|m| m.id.clone())
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Probes the backend, loads the first page of history when signed in,
    //! and runs a readline loop that submits questions through the
    //! `ChatController`.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use crate::chat::suggestions::{suggestion, SUGGESTED_QUESTIONS};
    use crate::chat::{HistoryLoad, MergeMode, SubmitRejection};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `token` - Bearer token, `None` when signed out
    /// * `no_history` - Skip loading history on start
    pub async fn run_chat(config: Config, token: Option<String>, no_history: bool) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let client = QaClient::new(&config.api)?;
        let mut ctx = ChatContext::new(token);
        let mut controller = ChatController::new(config.api.llm_provider.clone());

        let mut rl = DefaultEditor::new()?;

        connection::probe(&client, &mut ctx.connection).await;

        let auto_history = config.history.load_on_start && !no_history;
        if ctx.connection.is_connected() && auto_history {
            let outcome = controller
                .load_history(
                    &client,
                    &mut ctx,
                    1,
                    config.history.page_size,
                    MergeMode::Replace,
                )
                .await;
            report_history_load(&outcome);
        }

        print_welcome_banner(&ctx);
        if controller.shows_welcome() {
            print_welcome_screen(&controller, config.chat.show_suggestions);
        } else {
            print_conversation(&controller);
        }

        loop {
            let prompt = format_prompt(&ctx);
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e);
                            continue;
                        }
                    };

                    let question = match command {
                        SpecialCommand::None => trimmed.to_string(),
                        SpecialCommand::AskSuggestion(n) => match suggestion(n) {
                            Some(question) => question.to_string(),
                            None => {
                                eprintln!(
                                    "No suggestion {}; choose 1-{}\n",
                                    n,
                                    SUGGESTED_QUESTIONS.len()
                                );
                                continue;
                            }
                        },
                        SpecialCommand::Help => {
                            print_help();
                            continue;
                        }
                        SpecialCommand::Health => {
                            let before = ctx.connection;
                            let status = connection::probe(&client, &mut ctx.connection).await;
                            println!("Backend: {}\n", status.colored_label());
                            if auto_history && status.recovered_from(before) {
                                let outcome = controller
                                    .load_history(
                                        &client,
                                        &mut ctx,
                                        1,
                                        config.history.page_size,
                                        MergeMode::Replace,
                                    )
                                    .await;
                                report_history_load(&outcome);
                                if matches!(outcome, HistoryLoad::Loaded { .. }) {
                                    print_conversation(&controller);
                                }
                            }
                            continue;
                        }
                        SpecialCommand::History(page) => {
                            let outcome = controller
                                .load_history(
                                    &client,
                                    &mut ctx,
                                    page,
                                    config.history.page_size,
                                    MergeMode::Replace,
                                )
                                .await;
                            report_history_load(&outcome);
                            if matches!(outcome, HistoryLoad::Loaded { .. }) {
                                print_conversation(&controller);
                            }
                            continue;
                        }
                        SpecialCommand::Clear => {
                            controller.clear();
                            print_welcome_screen(&controller, config.chat.show_suggestions);
                            continue;
                        }
                        SpecialCommand::Rate { answer, rating } => {
                            match answer_id(&controller, answer) {
                                Some(id) => {
                                    controller.rate(&id, rating);
                                    println!("Rated answer {}\n", answer);
                                }
                                None => eprintln!("No answer {} on screen\n", answer),
                            }
                            continue;
                        }
                        SpecialCommand::Stats => {
                            println!(
                                "History: {}\n",
                                history::format_stats(&controller.stats())
                            );
                            continue;
                        }
                        SpecialCommand::ShowStatus => {
                            print_status_display(&controller, &ctx, &config);
                            continue;
                        }
                        SpecialCommand::Suggest => {
                            print_suggestions();
                            continue;
                        }
                        SpecialCommand::Exit => break,
                    };

                    submit(&mut controller, &client, &mut ctx, &question).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn submit(
        controller: &mut ChatController,
        client: &QaClient,
        ctx: &mut ChatContext,
        question: &str,
    ) {
        use colored::Colorize;

        println!("{}", "Thinking...".dimmed());
        match controller.submit_question(client, ctx, question).await {
            Ok(outcome) => {
                print_last_answer(controller);
                if outcome == SubmitOutcome::Failed {
                    println!("Backend: {}\n", ctx.connection.colored_label());
                }
            }
            Err(SubmitRejection::EmptyQuestion) => {}
            Err(rejection) => eprintln!("{}\n", rejection.to_string().yellow()),
        }
    }

    fn report_history_load(outcome: &HistoryLoad) {
        use colored::Colorize;

        match outcome {
            HistoryLoad::Loaded { sessions, total } => {
                tracing::info!("Loaded {} of {} sessions", sessions, total);
            }
            HistoryLoad::Skipped => println!("{}", "Sign in to load your history.".yellow()),
            HistoryLoad::Forbidden => {
                eprintln!("{}", "History unavailable: access forbidden.".yellow())
            }
            HistoryLoad::Failed { error, unreachable } => {
                if *unreachable {
                    eprintln!("{}", "History unavailable: backend unreachable.".red());
                } else {
                    eprintln!("{}", format!("History unavailable: {}", error).red());
                }
            }
        }
    }

    fn format_prompt(ctx: &ChatContext) -> String {
        format!("[{}] >> ", ctx.connection.colored_label())
    }

    /// Display welcome banner at the start of interactive chat mode
    fn print_welcome_banner(ctx: &ChatContext) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                  QueryGPT Chat - Welcome!                    ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Backend: {}", ctx.connection.colored_label());
        if ctx.token.is_none() {
            println!("Not signed in: run `querygpt auth login <token>` to ask questions");
        }
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    /// Greeting shown while the conversation is empty
    fn print_welcome_screen(controller: &ChatController, show_suggestions: bool) {
        println!("Welcome to QueryGPT! Ask me anything.");
        let stats = controller.stats();
        if stats.total_chats > 0 {
            println!("History: {}", history::format_stats(&stats));
        }
        println!();
        if show_suggestions {
            print_suggestions();
        }
    }

    fn print_suggestions() {
        use colored::Colorize;

        println!("Try one of these (/ask <n>):");
        for (i, question) in SUGGESTED_QUESTIONS.iter().enumerate() {
            println!("  {} {}", format!("{}.", i + 1).cyan(), question);
        }
        println!();
    }

    /// Display detailed status information about the current session
    fn print_status_display(controller: &ChatController, ctx: &ChatContext, config: &Config) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    QueryGPT Session Status                   ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Backend:           {}", config.api.base_url);
        println!("Connection:        {}", ctx.connection.colored_label());
        println!(
            "Signed in:         {}",
            if ctx.token.is_some() { "yes" } else { "no" }
        );
        println!("LLM Provider:      {}", controller.llm_provider());
        println!("Questions:         {}", controller.question_count());
        println!("Conversation Size: {} messages", controller.messages().len());
        println!();
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::chat::ConnectionStatus;

        #[test]
        fn test_format_prompt_shows_connection() {
            let ctx = ChatContext {
                token: None,
                connection: ConnectionStatus::Disconnected,
            };
            assert!(format_prompt(&ctx).contains("Offline"));
        }

        #[test]
        fn test_print_welcome_screen_does_not_panic() {
            print_welcome_screen(&ChatController::new("openai"), true);
        }

        #[test]
        fn test_print_status_display_does_not_panic() {
            let ctx = ChatContext::new(Some("tok".to_string()));
            print_status_display(&ChatController::new("openai"), &ctx, &Config::default());
        }
    }
}

/// Ask command
///
/// Submits one question through the same controller as the chat loop.
pub mod ask {
    use super::*;

    /// Ask `question` and print the answer
    ///
    /// # Errors
    ///
    /// Fails when the submission is rejected (not signed in, backend down,
    /// empty question) or when the request itself fails.
    pub async fn run_ask(config: Config, token: Option<String>, question: String) -> Result<()> {
        let client = QaClient::new(&config.api)?;
        let mut ctx = ChatContext::new(token);
        let mut controller = ChatController::new(config.api.llm_provider.clone());

        connection::probe(&client, &mut ctx.connection).await;

        let outcome = controller
            .submit_question(&client, &mut ctx, &question)
            .await
            .map_err(|rejection| QueryGptError::Backend(rejection.to_string()))?;

        print_last_answer(&controller);

        match outcome {
            SubmitOutcome::Answered { .. } => Ok(()),
            SubmitOutcome::Failed => Err(QueryGptError::Backend(format!(
                "request to {} failed (backend is {})",
                client.base_url(),
                ctx.connection
            ))
            .into()),
        }
    }
}

/// Health command
pub mod health {
    use super::*;

    /// Probe the backend once and print the status
    ///
    /// # Errors
    ///
    /// Returns an error when the backend is not reachable, so scripts can
    /// rely on the exit code.
    pub async fn run_health(config: &Config) -> Result<()> {
        let client = QaClient::new(&config.api)?;
        let mut status = ConnectionStatus::default();
        let status = connection::probe(&client, &mut status).await;

        println!("{}: {}", client.base_url(), status.colored_label());
        if status.is_connected() {
            Ok(())
        } else {
            Err(QueryGptError::Backend(format!("{} is {}", client.base_url(), status)).into())
        }
    }
}

/// Auth command(s)
///
/// The identity provider issues the bearer token; these commands only keep
/// it in the OS keyring between runs.
pub mod auth {
    use super::*;
    use crate::auth::{resolve_token, KeyringTokenStore, TokenOrigin};
    use crate::cli::AuthCommand;

    /// Handle `auth login|logout|status`
    pub fn handle_auth(command: AuthCommand, explicit_token: Option<String>) -> Result<()> {
        use colored::Colorize;

        let store = KeyringTokenStore;
        match command {
            AuthCommand::Login { secret } => {
                store.save(&secret)?;
                println!("{}", "Token stored in the system keyring.".green());
            }
            AuthCommand::Logout => {
                store.delete()?;
                println!("{}", "Stored token removed.".green());
            }
            AuthCommand::Status => {
                let (_, origin) = resolve_token(explicit_token, &store);
                match origin {
                    TokenOrigin::Missing => println!("{}", "Not signed in.".yellow()),
                    origin => println!("Signed in (token from {}).", origin),
                }
            }
        }
        Ok(())
    }

}
