pub mod chat;
pub mod config;
pub mod doctor;
pub mod quote;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

impl CommandResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn failure(message: impl Into<String>, exit_code: u8) -> Self {
        Self { exit_code, output: message.into() }
    }
}
