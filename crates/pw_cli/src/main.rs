use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use pw_core::{ProviderConfig, Result, Settings, UsageTracker, WordPressConfig};
use pw_inference::models::{create_model, ModelKind};
use pw_pipeline::wordpress::diagnostics::{test_connection, ConfigurationStatus, DebugConfigReport};
use pw_pipeline::{handle_command, init_logging, ArticleManager, HumanDuration, PipelineArgs, PipelineCommands};
use pw_pipeline::WordPressPublisher;
use pw_storage::{create_repository, StorageKind};
use pw_web::AppState;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pagewright", author, version, about, long_about = None)]
pub struct Cli {
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    deepseek_api_key: Option<String>,
    /// Fallback provider, used once when DeepSeek keeps failing
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,
    #[arg(long, env = "WORDPRESS_URL")]
    wordpress_url: Option<String>,
    #[arg(long, env = "WORDPRESS_USERNAME")]
    wordpress_username: Option<String>,
    /// WordPress application password
    #[arg(long, env = "WORDPRESS_PASSWORD", hide_env_values = true)]
    wordpress_password: Option<String>,
    #[arg(long, default_value = "remote", help = "Text generator to use. Available: remote (default), dummy")]
    model: ModelKind,
    #[arg(long, default_value = "memory")]
    storage: StorageKind,
    /// Pause between sections of long articles (e.g. 1s, 500ms)
    #[arg(long, default_value = "1s")]
    section_pause: HumanDuration,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "PAGEWRIGHT_ADDR", default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
    /// Show configuration status with secrets masked
    Config,
    /// Check that the WordPress REST API is reachable with the configured credentials
    TestWordpress,
    #[command(flatten)]
    Pipeline(PipelineCommands),
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings::new(
            ProviderConfig::deepseek(self.deepseek_api_key.clone()),
            Some(ProviderConfig::openai(self.openai_api_key.clone())),
            WordPressConfig {
                base_url: self.wordpress_url.clone(),
                username: self.wordpress_username.clone(),
                password: self.wordpress_password.clone(),
            },
        )
    }

    fn model_kind(&self) -> ModelKind {
        // plan never reaches the generator
        match self.command {
            Commands::Pipeline(PipelineCommands::Plan { .. }) => ModelKind::Dummy,
            _ => self.model,
        }
    }

    fn manager(&self, settings: &Settings) -> Result<Arc<ArticleManager>> {
        let usage = Arc::new(UsageTracker::new());
        let generator = create_model(
            self.model_kind(),
            pw_inference::Config::from_settings(settings),
            usage.clone(),
        )?;
        info!("🧠 Text generator initialized (using {})", generator.name());
        let publisher = Arc::new(WordPressPublisher::new(settings.wordpress.clone()));
        let repository = create_repository(self.storage);
        Ok(Arc::new(
            ArticleManager::new(generator, publisher, repository, usage).with_section_pause(self.section_pause.0),
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let settings = cli.settings();

    match &cli.command {
        Commands::Serve { addr } => {
            let manager = cli.manager(&settings)?;
            pw_web::serve(*addr, AppState::new(manager, settings)).await?;
        }
        Commands::Config => {
            let status = ConfigurationStatus::from_settings(&settings);
            println!("{}", serde_json::to_string_pretty(&status)?);
            let report = DebugConfigReport::from_settings(&settings);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::TestWordpress => {
            let report = test_connection(&reqwest::Client::new(), &settings.wordpress).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.success {
                std::process::exit(1);
            }
        }
        Commands::Pipeline(command) => {
            let manager = cli.manager(&settings)?;
            handle_command(PipelineArgs { command: command.clone() }, &manager).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pagewright").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_pipeline_commands_are_top_level() {
        let cli = parse(&["--model", "dummy", "generate", "Smart Locks", "--words", "3000"]);
        assert_eq!(cli.model, ModelKind::Dummy);
        assert!(matches!(cli.command, Commands::Pipeline(PipelineCommands::Generate { .. })));

        let cli = parse(&["plan", "4500"]);
        assert_eq!(cli.model_kind(), ModelKind::Dummy);
    }

    #[test]
    fn test_serve_address() {
        let cli = parse(&["serve", "--addr", "0.0.0.0:8080"]);
        match cli.command {
            Commands::Serve { addr } => assert_eq!(addr.port(), 8080),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_settings_from_args() {
        let cli = parse(&[
            "--deepseek-api-key",
            "ds",
            "--wordpress-url",
            "https://site.test",
            "--wordpress-username",
            "admin",
            "--wordpress-password",
            "secret",
            "config",
        ]);
        let settings = cli.settings();
        assert!(settings.primary.has_key());
        assert!(settings.wordpress.is_complete());
    }

    #[test]
    fn test_remote_model_requires_key() {
        let cli = parse(&["--model", "remote", "part", "Smart Locks"]);
        let settings = Settings::new(ProviderConfig::deepseek(None), None, WordPressConfig::default());
        assert!(cli.manager(&settings).is_err());
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = parse(&["config", "--verbose"]);
        assert!(cli.verbose);
    }
}
