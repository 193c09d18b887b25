use anyhow::{Context, Result};
use async_trait::async_trait;
use inquire::Text;
use instant_weather_core::Prompter;

/// Terminal prompts. Esc cancels a prompt, Ctrl-C aborts the whole flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct InquirePrompter;

#[async_trait]
impl Prompter for InquirePrompter {
    async fn prompt(&self, message: &str, initial: Option<&str>) -> Result<Option<String>> {
        let message = message.to_string();
        let initial = initial.map(str::to_string);

        // inquire blocks on terminal input.
        tokio::task::spawn_blocking(move || {
            let mut text = Text::new(&message);
            if let Some(initial) = initial.as_deref() {
                text = text.with_initial_value(initial);
            }
            text.prompt_skippable()
                .with_context(|| format!("Failed to show prompt '{message}'"))
        })
        .await
        .context("Prompt task failed")?
    }
}
