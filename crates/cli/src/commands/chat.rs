use std::io::{self, BufRead, Write};

use roomrate_core::{AppConfig, ConversationEngine, InMemorySessionStore};

use super::CommandResult;

/// Local stand-in for the messaging transport: every stdin line becomes one
/// inbound message for `user`, and every engine reply is printed. Sessions
/// live for the life of the command.
pub fn run(config: &AppConfig, user: &str) -> CommandResult {
    let engine = ConversationEngine::from_config(config, InMemorySessionStore::default());
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => return CommandResult::failure(format!("stdin read failed: {error}"), 1),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        if let Some(reply) = engine.handle_message(user, input) {
            if writeln!(stdout, "{reply}\n").is_err() {
                break;
            }
        }
    }

    CommandResult::success("")
}
