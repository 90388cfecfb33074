use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use idekitd::dispatch::{Dispatcher, EchoLogic, InProcessService};
use idekitd::plugin::{PluginHostInfo, PluginRegistry};
use idekitd::protocol::Request;

/// Dispatch a YAML-encoded request to the built-in echo service and print
/// the response.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to a YAML request; reads stdin when omitted.
    request: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let _log_guard = idekitd::log::init()?;
    let cli = Cli::parse();

    let text = match &cli.request {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };

    let request = Request::from_yaml(&text).context("failed to parse the request")?;

    let service = Arc::new(InProcessService::new(Arc::new(EchoLogic))?);
    let registry = Arc::new(PluginRegistry::new(PluginHostInfo::default()));
    let dispatcher = Dispatcher::new(service, registry);

    let response = dispatcher.send_sync(&request);
    println!("{}", response.describe());

    Ok(())
}
