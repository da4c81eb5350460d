use async_trait::async_trait;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

use tgr_core::{ports::LoginPrompt, Result};

/// Asks for the login code and password on the terminal.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdinPrompt;

#[async_trait]
impl LoginPrompt for StdinPrompt {
    async fn login_code(&self) -> Result<String> {
        ask("Please enter the code you received: ").await
    }

    async fn password(&self, hint: Option<&str>) -> Result<String> {
        match hint {
            Some(hint) => ask(&format!("Please enter your password (hint: {hint}): ")).await,
            None => ask("Please enter your password: ").await,
        }
    }
}

async fn ask(question: &str) -> Result<String> {
    let mut stdout = io::stdout();
    stdout.write_all(question.as_bytes()).await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(io::stdin()).read_line(&mut line).await?;
    Ok(line.trim().to_string())
}
