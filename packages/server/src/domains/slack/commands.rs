//! Mention commands.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::common::{PipelineError, PipelineResult, PostId};
use crate::domains::brainstorm::actions::run_brainstorm;
use crate::domains::posts::actions::scheduling::{resolve_timezone, tomorrow_in};
use crate::domains::posts::actions::{
    announce_drafts, cancel_schedule, generate_drafts, schedule_approved_posts,
    upcoming_schedule, ScheduleConfig,
};
use crate::domains::posts::models::{preview, Post, PostStatus};
use crate::domains::thoughts::actions::{capture_thought, chat_fallback, thought_stats};
use crate::domains::thoughts::models::ThoughtSource;
use crate::kernel::ServerDeps;

pub const DEFAULT_POSTS_PER_DAY: i64 = 2;
pub const DEFAULT_SCHEDULE_DAYS: i64 = 7;
const MAX_LISTED_SCHEDULE: usize = 10;
const MAX_LISTED_DRAFTS: usize = 5;

lazy_static! {
    static ref LEADING_MENTION: Regex = Regex::new(r"^\s*<@[A-Za-z0-9]+(\|[^>]*)?>\s*").unwrap();
}

/// Text with the leading bot mention removed
pub fn strip_mention(text: &str) -> &str {
    match LEADING_MENTION.find(text) {
        Some(m) => text[m.end()..].trim(),
        None => text.trim(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Stats,
    /// `None` means every raw thought
    Generate { category: Option<String> },
    Drafts,
    /// Raw count, range-checked when the command runs
    Schedule { posts_per_day: i64 },
    ViewSchedule { days: i64 },
    Unschedule { post_id: String },
    Brainstorm { topic: String },
    /// Anything else is kept as a thought
    Capture(String),
    Empty,
}

impl Command {
    pub fn parse(mention_text: &str) -> Self {
        let text = strip_mention(mention_text);
        let words: Vec<&str> = text.split_whitespace().collect();
        let Some(first) = words.first() else {
            return Command::Empty;
        };

        match first.to_lowercase().as_str() {
            "help" => Command::Help,
            "stats" => Command::Stats,
            "generate" => Command::Generate {
                category: words
                    .get(1)
                    .map(|c| c.to_lowercase())
                    .filter(|c| c != "all"),
            },
            "drafts" => Command::Drafts,
            "schedule" => Command::Schedule {
                posts_per_day: words
                    .get(1)
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(DEFAULT_POSTS_PER_DAY),
            },
            "view" | "show" if words.get(1).map(|w| w.to_lowercase()) == Some("schedule".into()) => {
                Command::ViewSchedule {
                    days: words
                        .get(2)
                        .and_then(|n| n.parse().ok())
                        .filter(|d: &i64| *d > 0)
                        .unwrap_or(DEFAULT_SCHEDULE_DAYS),
                }
            }
            "unschedule" => Command::Unschedule {
                post_id: words.get(1).map(|s| s.to_string()).unwrap_or_default(),
            },
            "brainstorm" => Command::Brainstorm {
                topic: text[first.len()..].trim().to_string(),
            },
            _ => Command::Capture(text.to_string()),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Stats => "stats",
            Command::Generate { .. } => "generate",
            Command::Drafts => "drafts",
            Command::Schedule { .. } => "schedule",
            Command::ViewSchedule { .. } => "view schedule",
            Command::Unschedule { .. } => "unschedule",
            Command::Brainstorm { .. } => "brainstorm",
            Command::Capture(_) => "capture",
            Command::Empty => "empty",
        }
    }
}

/// Run `command` and reply in `channel`. Failures are reported to the
/// channel; only a failed reply surfaces as an error.
pub async fn execute(deps: &ServerDeps, channel: &str, command: Command) -> PipelineResult<()> {
    info!(command = command.name(), channel = %channel, "Running command");

    let reply = match &command {
        Command::Help => Ok(Some(help_text())),
        Command::Stats => stats(deps).await.map(Some),
        Command::Generate { category } => generate(deps, channel, category.as_deref()).await,
        Command::Drafts => list_drafts(deps).await.map(Some),
        Command::Schedule { posts_per_day } => {
            schedule(deps, channel, *posts_per_day, Utc::now()).await.map(Some)
        }
        Command::ViewSchedule { days } => view_schedule(deps, *days, Utc::now()).await.map(Some),
        Command::Unschedule { post_id } => unschedule(deps, post_id).await.map(Some),
        Command::Brainstorm { topic } => brainstorm(deps, channel, topic).await.map(Some),
        Command::Capture(text) => capture(deps, text).await.map(Some),
        Command::Empty => Ok(None),
    };

    let text = match reply {
        Ok(Some(text)) => text,
        Ok(None) => return Ok(()),
        Err(PipelineError::InvalidConfiguration(message)) => format!("❌ {}", message),
        Err(e) => {
            warn!(command = command.name(), error = %e, "Command failed");
            format!("❌ Failed to run `{}`. Please try again.", command.name())
        }
    };

    send(deps, channel, &text).await
}

async fn send(deps: &ServerDeps, channel: &str, text: &str) -> PipelineResult<()> {
    deps.upstream("send message", deps.chat.send_message(channel, text))
        .await
        .map(|_| ())
}

pub fn help_text() -> String {
    r#"*Ghostwriter* 🤖

I capture your thoughts and help turn them into LinkedIn posts.

*Commands:*
- `@Ghostwriter generate [category]` - Generate post drafts
- `@Ghostwriter brainstorm [topic]` - Brainstorm ideas
- `@Ghostwriter drafts` - View pending drafts
- `@Ghostwriter schedule [1-4]` - Schedule approved posts
- `@Ghostwriter view schedule [days]` - See posting schedule
- `@Ghostwriter unschedule [post id]` - Take a post off the schedule
- `@Ghostwriter stats` - Show statistics
- `@Ghostwriter help` - Show this help

*Workflow:*
1. Share thoughts naturally
2. Generate posts: `@Ghostwriter generate`
3. React with ✅ to approve drafts (or 1️⃣ 2️⃣ 3️⃣ to pick one)
4. Schedule: `@Ghostwriter schedule 2` (2 posts/day)

*Categories:*
technical, business, learning, product_update, personal, industry_insight, milestone"#
        .to_string()
}

async fn stats(deps: &ServerDeps) -> PipelineResult<String> {
    let stats = thought_stats(deps).await?;

    let mut text = format!(
        "📊 *Thought Statistics*\n\nTotal captured: *{}*\n\n*By Category:*\n",
        stats.total
    );
    for (category, count) in &stats.by_category {
        text.push_str(&format!("• {}: {}\n", category, count));
    }
    text.push_str("\n*Recent Thoughts:*\n");
    for (i, thought) in stats.recent.iter().enumerate() {
        text.push_str(&format!(
            "{}. [{}] {}\n",
            i + 1,
            thought.category,
            preview(&thought.content, 60)
        ));
    }
    Ok(text)
}

async fn generate(
    deps: &ServerDeps,
    channel: &str,
    category: Option<&str>,
) -> PipelineResult<Option<String>> {
    send(deps, channel, "✨ Generating LinkedIn post drafts... This may take a moment.").await?;

    let Some(generated) = generate_drafts(deps, category).await? else {
        return Ok(Some(
            "📭 No thoughts found to generate posts from. Share some thoughts first!".to_string(),
        ));
    };

    if generated.drafts.is_empty() {
        return Ok(Some("❌ Failed to save any drafts. Please try again.".to_string()));
    }

    announce_drafts(deps, channel, &generated).await?;
    Ok(None)
}

async fn list_drafts(deps: &ServerDeps) -> PipelineResult<String> {
    let drafts = deps
        .upstream("fetch drafts", deps.posts.find_by_status(PostStatus::Draft))
        .await?;

    if drafts.is_empty() {
        return Ok(
            "📭 No pending drafts. Use `@Ghostwriter generate` to create some!".to_string(),
        );
    }

    let mut text = format!("📝 *Pending Drafts* ({})\n\n", drafts.len());
    for (i, draft) in drafts.iter().take(MAX_LISTED_DRAFTS).enumerate() {
        text.push_str(&format!(
            "*Draft {}:* `{}`\n{}\n\n",
            i + 1,
            draft.id,
            draft.preview(100)
        ));
    }
    if drafts.len() > MAX_LISTED_DRAFTS {
        text.push_str(&format!("_...and {} more_\n", drafts.len() - MAX_LISTED_DRAFTS));
    }
    Ok(text)
}

async fn schedule(
    deps: &ServerDeps,
    channel: &str,
    posts_per_day: i64,
    now: DateTime<Utc>,
) -> PipelineResult<String> {
    let config = ScheduleConfig::new(
        u32::try_from(posts_per_day).unwrap_or(0),
        tomorrow_in(&deps.schedule_timezone, now),
        deps.schedule_timezone.clone(),
    );
    config.validate()?;

    send(
        deps,
        channel,
        &format!(
            "📅 Scheduling approved posts... ({} posts per day)",
            config.posts_per_day
        ),
    )
    .await?;

    let count = schedule_approved_posts(deps, &config).await?;
    if count == 0 {
        return Ok(
            "📭 No approved posts to schedule. Approve some drafts first with ✅ reaction!"
                .to_string(),
        );
    }

    let mut text = format!(
        "✅ *Scheduled {} posts!*\n\n📊 Posting {} times per day\n\n",
        count, config.posts_per_day
    );

    match upcoming_schedule(deps, DEFAULT_SCHEDULE_DAYS, now).await {
        Ok(upcoming) if !upcoming.is_empty() => {
            text.push_str("*Upcoming Posts:*\n");
            for (i, post) in upcoming.iter().take(MAX_LISTED_SCHEDULE).enumerate() {
                text.push_str(&format!(
                    "{}. {}\n   _{}_\n\n",
                    i + 1,
                    format_slot(post, &deps.schedule_timezone),
                    post.preview(80)
                ));
            }
            if upcoming.len() > MAX_LISTED_SCHEDULE {
                text.push_str(&format!(
                    "_...and {} more_\n",
                    upcoming.len() - MAX_LISTED_SCHEDULE
                ));
            }
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Failed to load schedule for summary"),
    }

    Ok(text)
}

async fn view_schedule(deps: &ServerDeps, days: i64, now: DateTime<Utc>) -> PipelineResult<String> {
    let upcoming = upcoming_schedule(deps, days, now).await?;

    if upcoming.is_empty() {
        return Ok(
            "📭 No posts scheduled. Use `@Ghostwriter schedule` to schedule approved posts!"
                .to_string(),
        );
    }

    let mut text = format!("📅 *Posting Schedule* (Next {} days)\n\n", days);
    for (i, post) in upcoming.iter().enumerate() {
        text.push_str(&format!(
            "*{}. {}* `{}`\n{}\n\n",
            i + 1,
            format_slot(post, &deps.schedule_timezone),
            post.id,
            post.preview(80)
        ));
    }
    text.push_str(&format!("\n_Total: {} scheduled posts_", upcoming.len()));
    Ok(text)
}

async fn unschedule(deps: &ServerDeps, raw_id: &str) -> PipelineResult<String> {
    let Ok(post_id) = PostId::parse(raw_id) else {
        return Err(PipelineError::InvalidConfiguration(
            "Usage: `@Ghostwriter unschedule [post id]`".to_string(),
        ));
    };

    match cancel_schedule(deps, post_id).await {
        Ok(_) => Ok(format!("↩️ Post `{}` is back in the approved queue.", post_id)),
        Err(PipelineError::PreconditionFailed { actual, .. }) if actual.is_terminal() => Ok(
            format!("⚠️ Post `{}` is {} and can no longer change.", post_id, actual),
        ),
        Err(PipelineError::PreconditionFailed { actual, .. }) => Ok(format!(
            "⚠️ Post `{}` is {}, only scheduled posts can be unscheduled.",
            post_id, actual
        )),
        Err(PipelineError::NotFound(_)) => Ok(format!("⚠️ Post `{}` not found.", post_id)),
        Err(e) => Err(e),
    }
}

async fn brainstorm(deps: &ServerDeps, channel: &str, topic: &str) -> PipelineResult<String> {
    if topic.is_empty() {
        return Ok("Please provide a topic: `@Ghostwriter brainstorm [your topic]`".to_string());
    }

    send(deps, channel, "🧠 Brainstorming ideas... This may take a moment.").await?;
    let session = run_brainstorm(deps, topic).await?;

    let mut text = format!(
        "🧠 *Brainstorm Session*\n\n*Topic:* {}\n\n━━━━━━━━━━━━━━━━━━\n\n{}\n\n━━━━━━━━━━━━━━━━━━\n\n*Key Angles:*\n",
        session.topic, session.content
    );
    for (i, angle) in session.key_angles.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, angle));
    }
    text.push_str("\n💡 Add more context and use `@Ghostwriter generate` when ready!");
    Ok(text)
}

async fn capture(deps: &ServerDeps, text: &str) -> PipelineResult<String> {
    let thought = capture_thought(deps, text, ThoughtSource::Slack, chat_fallback()).await?;
    Ok(format!(
        "💭 Captured! Category: *{}* | Tags: {}",
        thought.category,
        thought.topic_tags.join(", ")
    ))
}

/// `Mar 10 at 9:00 AM` in the schedule's timezone
fn format_slot(post: &Post, timezone: &str) -> String {
    match post.scheduled_at {
        Some(at) => at
            .with_timezone(&resolve_timezone(timezone))
            .format("%b %d at %-I:%M %p")
            .to_string(),
        None => "unknown".to_string(),
    }
}
