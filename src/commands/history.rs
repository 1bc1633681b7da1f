use crate::api::{QaBackend, QaClient, Session};
use crate::chat::ChatStats;
use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::{QueryGptError, Result};
use colored::Colorize;
use prettytable::{format, Table};

const QUESTION_WIDTH: usize = 40;

/// Handle history commands
pub async fn handle_history(
    config: &Config,
    token: Option<&str>,
    command: HistoryCommand,
) -> Result<()> {
    let token = token.ok_or_else(|| {
        QueryGptError::MissingCredentials(
            "history requires a token; run `querygpt auth login <token>` or pass --token"
                .to_string(),
        )
    })?;
    let client = QaClient::new(&config.api)?;

    match command {
        HistoryCommand::List { page, size, json } => {
            let size = size.unwrap_or(config.history.page_size);
            let response = client.history(token, page, size).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(());
            }

            if response.sessions.is_empty() {
                println!("{}", "No conversation history found.".yellow());
                return Ok(());
            }

            println!("\nConversation History:");
            render_sessions(&response.sessions).printstd();
            println!();
            println!(
                "Page {} of {} sessions  |  {}",
                response.page,
                response.total,
                format_stats(&ChatStats::from_sessions(&response.sessions))
            );
            println!();
        }
        HistoryCommand::Delete { id } => {
            let response = client.delete_session(token, id).await?;
            tracing::info!("Deleted session {}: {}", id, response.message);
            println!("{}", format!("Deleted session {}", id).green());
        }
        HistoryCommand::Clear => {
            let response = client.clear_history(token).await?;
            let count = response.deleted_count.unwrap_or(0);
            println!(
                "{}",
                format!("Cleared history ({} sessions deleted)", count).green()
            );
        }
        HistoryCommand::Stats => {
            let stats = client.stats(token).await?;
            println!("\nServer Stats:");
            println!("  Total sessions:      {}", stats.total_sessions);
            println!("  Successful sessions: {}", stats.successful_sessions);
            println!("  Success rate:        {:.1}%", stats.success_rate);
            println!(
                "  Avg response time:   {:.0}ms",
                stats.average_response_time_ms
            );
            println!();
        }
    }

    Ok(())
}

/// One row per session, newest first as returned by the backend.
fn render_sessions(sessions: &[Session]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Question".bold(),
        "Status".bold(),
        "Time".bold(),
        "Asked".bold()
    ]);

    for session in sessions {
        let status = if session.is_successful {
            "ok".green()
        } else {
            "failed".red()
        };
        table.add_row(prettytable::row![
            session.id.to_string().cyan(),
            truncate(&session.question, QUESTION_WIDTH),
            status,
            format!("{}ms", session.response_time_ms),
            session.created_at.format("%Y-%m-%d %H:%M")
        ]);
    }

    table
}

/// One-line summary used by `history list` and `/stats`.
pub fn format_stats(stats: &ChatStats) -> String {
    format!(
        "{} chats, {}% success, {}ms avg",
        stats.total_chats, stats.success_rate, stats.avg_response_time_ms
    )
}

fn truncate(text: &str, width: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() > width {
        let cut: String = single_line.chars().take(width - 3).collect();
        format!("{}...", cut)
    } else {
        single_line
    }
}
