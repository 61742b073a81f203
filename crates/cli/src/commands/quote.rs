use chrono::{Datelike, Local};
use roomrate_core::{parse_date_range, reply, AppConfig, GuestCount};

use super::CommandResult;

/// One-shot pricing: parse the date expression, validate the guest count, and
/// render the same quote the conversation would send (or JSON with `--json`).
pub fn run(config: &AppConfig, dates: &str, guests: u32, json: bool) -> CommandResult {
    let range = match parse_date_range(dates, Local::now().year()) {
        Ok(range) => range,
        Err(error) => {
            return CommandResult::failure(format!("could not parse `{dates}`: {error}"), 2)
        }
    };

    let guests = match GuestCount::new(guests) {
        Ok(guests) => guests,
        Err(error) => return CommandResult::failure(format!("invalid guest count: {error}"), 2),
    };

    let quote = match config.pricing.rate_table().quote(range, guests) {
        Ok(quote) => quote,
        Err(error) => return CommandResult::failure(format!("could not price stay: {error}"), 2),
    };

    if json {
        match serde_json::to_string_pretty(&quote) {
            Ok(payload) => CommandResult::success(payload),
            Err(error) => CommandResult::failure(format!("could not render quote: {error}"), 1),
        }
    } else {
        CommandResult::success(reply::quote_reply(
            &quote,
            &config.conversation.trigger_keyword,
            &config.conversation.booking_keyword,
        ))
    }
}
