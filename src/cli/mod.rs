//! CLI commands for the Feishu relay using clap.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use std::path::PathBuf;

use crate::config::{load_settings, mask_secret, LoadedSettings, Settings};
use crate::feishu::{provider_code, FeishuClient, MessageSender, TokenCache};
use crate::providers::create_provider;
use crate::web::run_web_server;

/// Feishu relay - answers Feishu chat messages with DeepSeek completions.
#[derive(Parser)]
#[command(name = "feishu-relay")]
#[command(version)]
#[command(about = "Feishu webhook relay for DeepSeek chat completions", long_about = None)]
pub struct Commands {
    /// Settings file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the webhook server (default)
    Serve {
        /// Listen address
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Fetch a tenant access token to check the Feishu credentials
    Token,

    /// Send a text message to a Feishu user or chat
    Send {
        /// Receive id (ou_/on_/oc_ prefixes select the id type)
        receive_id: String,

        /// Message text
        text: String,
    },

    /// Ask the completion provider a question
    Ask {
        /// Prompt text
        prompt: String,
    },

    /// Print the effective settings with secrets masked
    Config,
}

impl Commands {
    /// Load settings for this invocation, with `serve` flags applied last.
    pub fn settings(&self) -> Result<LoadedSettings> {
        let mut loaded = load_settings(self.config.as_deref())?;
        if let Some(Command::Serve { host, port }) = &self.command {
            if let Some(host) = host {
                loaded.settings.server.host = host.clone();
            }
            if let Some(port) = port {
                loaded.settings.server.port = *port;
            }
        }
        Ok(loaded)
    }

    pub async fn run(&self, settings: &Settings) -> Result<()> {
        match &self.command {
            None | Some(Command::Serve { .. }) => cmd_serve(settings).await,
            Some(Command::Token) => cmd_token(settings).await,
            Some(Command::Send { receive_id, text }) => cmd_send(settings, receive_id, text).await,
            Some(Command::Ask { prompt }) => cmd_ask(settings, prompt).await,
            Some(Command::Config) => cmd_config(settings),
        }
    }
}

async fn cmd_serve(settings: &Settings) -> Result<()> {
    for warning in settings.warnings() {
        tracing::warn!("{}", warning);
    }
    tracing::info!(
        "Starting Feishu relay on port {} (app id {}, DeepSeek key {})",
        settings.server.port,
        mask_secret(&settings.feishu.app_id),
        mask_secret(settings.deepseek.api_key().unwrap_or("")),
    );

    run_web_server(settings).await?;
    Ok(())
}

fn feishu_client(settings: &Settings) -> FeishuClient {
    let client = Client::new();
    let tokens = TokenCache::new(
        client.clone(),
        &settings.feishu.base_url,
        settings.feishu.app_id.clone(),
        settings.feishu.app_secret.clone(),
    );
    FeishuClient::new(client, &settings.feishu.base_url, tokens)
}

async fn cmd_token(settings: &Settings) -> Result<()> {
    let feishu = feishu_client(settings);
    let token = fresh_token(feishu.tokens()).await?;

    println!("Tenant access token: {}", mask_secret(&token));
    Ok(())
}

/// Fetch a token from the auth endpoint, bypassing any cached value.
async fn fresh_token(tokens: &TokenCache) -> Result<String> {
    tokens.invalidate();
    tokens
        .get_token()
        .await
        .context("Feishu rejected the app credentials")
}

async fn cmd_send(settings: &Settings, receive_id: &str, text: &str) -> Result<()> {
    let feishu = feishu_client(settings);
    let response = feishu
        .send_text(receive_id, text)
        .await
        .with_context(|| format!("Could not send message to {}", receive_id))?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    match provider_code(&response) {
        Some(0) => Ok(()),
        code => anyhow::bail!("Feishu returned code {:?}", code),
    }
}

async fn cmd_ask(settings: &Settings, prompt: &str) -> Result<()> {
    let provider = create_provider(Client::new(), &settings.deepseek);
    if !provider.is_configured() {
        tracing::warn!("Provider {} is not configured", provider.name());
    }
    tracing::debug!("Asking provider {}", provider.name());

    println!("{}", provider.complete(prompt).await);
    Ok(())
}

fn cmd_config(settings: &Settings) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&settings.masked())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{spawn_stub, StubFeishu};

    #[test]
    fn serve_is_optional() {
        let args = Commands::try_parse_from(["feishu-relay"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn serve_flags_parse() {
        let args =
            Commands::try_parse_from(["feishu-relay", "serve", "--port", "9000", "--host", "127.0.0.1"])
                .unwrap();
        assert_eq!(
            args.command,
            Some(Command::Serve {
                host: Some("127.0.0.1".to_string()),
                port: Some(9000),
            })
        );
    }

    #[test]
    fn send_and_global_config() {
        let args = Commands::try_parse_from([
            "feishu-relay",
            "send",
            "oc_123",
            "hello",
            "--config",
            "/tmp/relay.json",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/relay.json")));
        assert_eq!(
            args.command,
            Some(Command::Send {
                receive_id: "oc_123".to_string(),
                text: "hello".to_string(),
            })
        );
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(Commands::try_parse_from(["feishu-relay", "serve", "--port", "99999"]).is_err());
    }

    #[tokio::test]
    async fn token_command_bypasses_the_cache() {
        let stub = StubFeishu::default();
        let base = spawn_stub(stub.router()).await;
        let tokens = TokenCache::new(Client::new(), &base, "cli_app", "secret");

        assert_eq!(tokens.get_token().await.unwrap(), "t-1");
        assert_eq!(fresh_token(&tokens).await.unwrap(), "t-2");
        assert_eq!(stub.auth_calls(), 2);
    }

    #[tokio::test]
    async fn token_command_reports_rejection() {
        let stub = StubFeishu::rejecting();
        let base = spawn_stub(stub.router()).await;
        let tokens = TokenCache::new(Client::new(), &base, "cli_app", "wrong");

        let err = fresh_token(&tokens).await.unwrap_err();
        assert!(err.to_string().contains("rejected"));
    }
}
