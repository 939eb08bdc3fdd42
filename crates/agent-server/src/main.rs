use clap::Parser;
use std::io;
use std::path::PathBuf;

use agent_loop::ModelPair;
use agent_server::logging::init_logging;
use agent_server::{run_server, ServerConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "agent-server")]
#[command(about = "Tool-augmented conversational agent server")]
#[command(version)]
struct Cli {
    /// Enable debug mode
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Server port
    #[arg(long, env = "PORT", default_value = "8081")]
    port: u16,

    /// Upstream chat-completions base URL
    #[arg(long, env = "LLM_BASE_URL", default_value = "https://api.openai.com/v1")]
    llm_base_url: String,

    /// Upstream API key
    #[arg(long, env = "LLM_API_KEY", default_value = "")]
    api_key: String,

    /// Model that decides whether a tool is needed
    #[arg(long, env = "ROUTER_MODEL", default_value = "gpt-4o-mini")]
    router_model: String,

    /// Model that writes the answer
    #[arg(long, env = "RESPONDER_MODEL", default_value = "gpt-4o")]
    responder_model: String,

    /// Tool provider configuration file
    #[arg(long, env = "PROVIDERS_CONFIG", default_value = "providers.json")]
    providers_config: PathBuf,

    /// Log level (overrides debug flag)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.debug, cli.log_level.as_deref());

    log::info!("Starting agent server on port {}", cli.port);
    log::info!("  LLM base URL: {}", cli.llm_base_url);
    log::info!("  Router model: {}", cli.router_model);
    log::info!("  Responder model: {}", cli.responder_model);
    log::debug!("  Providers config: {:?}", cli.providers_config);

    if cli.api_key.is_empty() {
        log::warn!("No LLM API key configured; upstream calls will likely be rejected");
    }

    run_server(ServerConfig {
        port: cli.port,
        llm_base_url: cli.llm_base_url,
        api_key: cli.api_key,
        models: ModelPair::new(cli.router_model, cli.responder_model),
        providers_config: cli.providers_config,
    })
    .await
}
