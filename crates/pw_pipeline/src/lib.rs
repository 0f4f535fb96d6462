pub mod cli;
pub mod logging;
pub mod manager;
pub mod tags;
pub mod wordpress;

pub use cli::{handle_command, HumanDuration, PipelineArgs, PipelineCommands};
pub use logging::{init_logging, Logger};
pub use manager::{ArticleManager, PublishRequest};
pub use wordpress::WordPressPublisher;

pub mod prelude {
    pub use super::manager::{ArticleManager, PublishRequest};
    pub use super::wordpress::WordPressPublisher;
    pub use pw_core::{Article, Error, PublishedPost, Result};
}
