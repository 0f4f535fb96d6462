use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Subcommand};
use pw_core::types::split_tags;
use pw_core::{NewArticle, PublishStatus, Result};
use pw_inference::prompt::{
    calculate_total_parts, part_word_target, plan_parts, ArticleBrief, PartRequest, CONTINUATION_SENTINEL,
    DEFAULT_TONE,
};
use tracing::info;

use crate::manager::{ArticleManager, PublishRequest};

/// Durations such as `2s`, `1m30s` or `1h`. A bare number is seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_millis = 0u64;
        let mut current_number = String::new();
        let mut has_value = false;
        let mut chars = s.trim().chars().peekable();

        while let Some(c) = chars.next() {
            if c.is_ascii_digit() {
                current_number.push(c);
                continue;
            }
            if c.is_whitespace() {
                continue;
            }
            let num = current_number
                .parse::<u64>()
                .map_err(|_| format!("Invalid character in duration: {}", c))?;
            let unit_millis = match c {
                'm' if chars.peek() == Some(&'s') => {
                    chars.next();
                    1
                }
                's' => 1_000,
                'm' => 60_000,
                'h' => 3_600_000,
                'd' => 86_400_000,
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            total_millis += num * unit_millis;
            current_number.clear();
            has_value = true;
        }

        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_millis += num * 1_000;
            has_value = true;
        }

        if !has_value {
            return Err("Duration must include a number".to_string());
        }
        Ok(HumanDuration(Duration::from_millis(total_millis)))
    }
}

/// Topic fields shared by the generating commands.
#[derive(Args, Debug, Clone)]
pub struct BriefArgs {
    /// Article title or topic
    pub title: String,
    /// Target length in words
    #[arg(long, short = 'w', default_value_t = 6000)]
    pub words: u32,
    /// Comma separated tags
    #[arg(long, default_value = "")]
    pub tags: String,
    #[arg(long)]
    pub tone: Option<String>,
    #[arg(long, default_value = "")]
    pub category: String,
    /// Extra instructions appended to every prompt
    #[arg(long)]
    pub instructions: Option<String>,
}

impl BriefArgs {
    fn tone(&self) -> String {
        self.tone.clone().unwrap_or_else(|| DEFAULT_TONE.to_string())
    }

    pub fn brief(&self) -> ArticleBrief {
        ArticleBrief {
            title: self.title.clone(),
            word_count: self.words,
            tone: self.tone(),
            tags: split_tags(&self.tags),
            category: self.category.clone(),
            additional_instructions: self.instructions.clone(),
        }
    }

    pub fn new_article(&self) -> NewArticle {
        NewArticle {
            title: self.title.clone(),
            tags: split_tags(&self.tags),
            category: self.category.clone(),
            word_count: Some(self.words),
            tone: self.tone.clone(),
            additional_instructions: self.instructions.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    #[command(subcommand)]
    pub command: PipelineCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PipelineCommands {
    /// Show how many parts a target length is split into and the words per part
    Plan {
        #[arg(default_value_t = 6000)]
        words: u32,
    },
    /// Generate a single part of an interactive article
    Part {
        /// Article topic
        topic: String,
        #[arg(long, default_value_t = 1)]
        part: u32,
        #[arg(long)]
        total_parts: Option<u32>,
        /// Target words for the whole article; the part target is derived from it
        #[arg(long, short = 'w', default_value_t = 6000)]
        words: u32,
        #[arg(long, default_value = "")]
        tags: String,
        #[arg(long)]
        tone: Option<String>,
        /// Markdown file with the parts generated so far
        #[arg(long)]
        previous: Option<PathBuf>,
        #[arg(long)]
        instructions: Option<String>,
    },
    /// Generate every part in order and print the cleaned Markdown
    Generate {
        #[command(flatten)]
        brief: BriefArgs,
        /// Write the Markdown to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Publish the result once generated
        #[arg(long)]
        publish: bool,
        #[arg(long, default_value = "draft")]
        status: PublishStatus,
    },
    /// Create an article record, generate it and publish it as a draft
    Article {
        #[command(flatten)]
        brief: BriefArgs,
        /// How often to check the record (e.g. 500ms, 2s, 1m)
        #[arg(long, default_value = "2s")]
        poll_interval: HumanDuration,
    },
    /// Publish a Markdown file
    Publish {
        /// Markdown file to publish
        file: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        tags: String,
        #[arg(long, default_value = "draft")]
        status: PublishStatus,
    },
}

fn read_markdown(path: &Path) -> Result<String> {
    let markdown = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(markdown)
}

pub async fn handle_command(args: PipelineArgs, manager: &Arc<ArticleManager>) -> Result<()> {
    match args.command {
        PipelineCommands::Plan { words } => {
            let parts = plan_parts(words);
            println!("📐 {} words in {} part(s)", words, parts.len());
            for (index, target) in parts.iter().enumerate() {
                println!("  Part {}: {} words", index + 1, target);
            }
        }
        PipelineCommands::Part {
            topic,
            part,
            total_parts,
            words,
            tags,
            tone,
            previous,
            instructions,
        } => {
            let total_parts = total_parts.unwrap_or_else(|| calculate_total_parts(words));
            let previous_content = previous.as_deref().map(read_markdown).transpose()?;
            let request = PartRequest {
                topic,
                part,
                total_parts,
                previous_content,
                tags: split_tags(&tags),
                tone,
                word_count: part_word_target(words, part, total_parts),
                additional_instructions: instructions,
            };
            let markdown = manager.generate_part(&request).await?;
            println!("{}", markdown);
            if markdown.contains(CONTINUATION_SENTINEL) {
                info!("➡️ Run part {} next", part + 1);
            }
        }
        PipelineCommands::Generate {
            brief,
            output,
            publish,
            status,
        } => {
            let markdown = manager.generate_all_parts(&brief.brief()).await?;
            match &output {
                Some(path) => {
                    std::fs::write(path, &markdown)?;
                    info!("💾 Saved article to {}", path.display());
                }
                None => println!("{}", markdown),
            }
            if publish {
                let published = manager
                    .publish_markdown(&PublishRequest {
                        title: brief.title.clone(),
                        markdown,
                        tags: split_tags(&brief.tags),
                        category: brief.category.clone(),
                        status,
                    })
                    .await?;
                println!("✅ Published post {}: {}", published.post_id, published.edit_url);
            }
        }
        PipelineCommands::Article { brief, poll_interval } => {
            let record = manager.submit(brief.new_article()).await?;
            info!("⏳ Waiting for article {}", record.id);
            let done = manager.wait_for(record.id, poll_interval.0).await?;
            match done.error {
                Some(error) => println!("❌ Article {} failed: {}", done.id, error),
                None => println!(
                    "✅ Article {} {} (WordPress post {})",
                    done.id,
                    done.status,
                    done.wordpress_id.map(|id| id.to_string()).unwrap_or_default()
                ),
            }
        }
        PipelineCommands::Publish {
            file,
            title,
            category,
            tags,
            status,
        } => {
            let markdown = read_markdown(&file)?;
            let published = manager
                .publish_markdown(&PublishRequest {
                    title,
                    markdown,
                    tags: split_tags(&tags),
                    category,
                    status,
                })
                .await?;
            println!("✅ Published post {}: {}", published.post_id, published.edit_url);
        }
    }
    Ok(())
}
