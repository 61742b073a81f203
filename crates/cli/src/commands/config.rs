use roomrate_core::AppConfig;

use super::CommandResult;

/// Dumps the effective configuration after file, env, and CLI overrides.
pub fn run(config: &AppConfig) -> CommandResult {
    match toml::to_string_pretty(config) {
        Ok(rendered) => CommandResult::success(rendered),
        Err(error) => CommandResult::failure(format!("could not render configuration: {error}"), 1),
    }
}
