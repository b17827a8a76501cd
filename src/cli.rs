use std::{
    env,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::Context;
use serde_json::Value;

use gcal_integration::{
    actions::{ActionContext, ActionName, dispatch},
    config::Config,
    google::{GoogleClientFactory, ServiceAccountTokenSource},
};

pub const USAGE: &str = "Usage: gcal-integration [--config PATH] <action> [JSON_INPUT]";

#[derive(Debug, Clone, PartialEq)]
pub enum CliMode {
    Help,
    Run(RunArgs),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunArgs {
    pub action: String,
    pub input: Option<String>,
    pub config_path: Option<PathBuf>,
}

pub fn parse_cli_mode() -> Result<CliMode, String> {
    parse_args(env::args().skip(1))
}

pub fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<CliMode, String> {
    let mut config_path = None;
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(CliMode::Help),
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| "--config requires a path".to_string())?;
                config_path = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown argument: {}", flag)),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let action = positional
        .next()
        .ok_or_else(|| "Missing action name".to_string())?;
    let input = positional.next();

    if let Some(extra) = positional.next() {
        return Err(format!("Unexpected argument: {}", extra));
    }

    Ok(CliMode::Run(RunArgs {
        action,
        input,
        config_path,
    }))
}

pub fn help_text() -> String {
    let mut lines = vec![USAGE.to_string(), String::new(), "Actions:".to_string()];
    lines.extend(ActionName::ALL.iter().map(|name| format!("  {}", name)));
    lines.push(String::new());
    lines.push("JSON_INPUT is read from stdin when omitted.".to_string());
    lines.join("\n")
}

fn read_input(input: Option<String>) -> anyhow::Result<Value> {
    let text = match input {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&text).context("Action input is not valid JSON")
}

pub async fn run_action(args: RunArgs) -> anyhow::Result<String> {
    let config_path = args.config_path.unwrap_or_else(Config::config_path);
    let config = Config::load_or_create(&config_path)
        .inspect_err(|e| tracing::error!("Failed to load config: {}", e))
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    config
        .validate()
        .with_context(|| format!("Edit the config file at {}", config_path.display()))?;

    let input = read_input(args.input)?;

    let tokens = ServiceAccountTokenSource::from_config(&config.google, &config.api)?;
    let clients = GoogleClientFactory::new(tokens, config.api.clone());
    let ctx = ActionContext {
        config: &config.google,
        clients: &clients,
    };

    let output = dispatch(&ctx, &args.action, input).await?;
    Ok(serde_json::to_string_pretty(&output)?)
}
