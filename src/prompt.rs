use anyhow::Result;
use dialoguer::{Confirm, Input, Password};

/// Terminal input capability. Mutation flows take one of these instead of
/// reading the terminal directly, so they can run against scripted answers in
/// tests.
pub trait Prompter {
    /// Asks for a value; an empty answer yields `default`.
    fn ask(&mut self, label: &str, default: &str) -> Result<String>;

    /// Asks for a secret without echoing; an empty answer is allowed.
    fn ask_hidden(&mut self, label: &str) -> Result<String>;

    /// Yes/no question, defaulting to no.
    fn confirm(&mut self, label: &str) -> Result<bool>;
}

pub struct TermPrompter;

impl Prompter for TermPrompter {
    fn ask(&mut self, label: &str, default: &str) -> Result<String> {
        let value = Input::new()
            .with_prompt(label)
            .default(default.to_string())
            .allow_empty(true)
            .interact_text()?;
        Ok(value)
    }

    fn ask_hidden(&mut self, label: &str) -> Result<String> {
        let value = Password::new()
            .with_prompt(label)
            .allow_empty_password(true)
            .interact()?;
        Ok(value)
    }

    fn confirm(&mut self, label: &str) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(label)
            .default(false)
            .interact()?;
        Ok(answer)
    }
}
