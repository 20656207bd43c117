//! Scheduling Assigner - gives approved posts concrete publication times
//! and hands due posts to the external publisher.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::common::{PipelineError, PipelineResult, PostId};
use crate::domains::posts::actions::lifecycle;
use crate::domains::posts::machines::{decide, LifecycleEvent};
use crate::domains::posts::models::{Post, PostStatus};
use crate::kernel::ServerDeps;

pub const MIN_POSTS_PER_DAY: u32 = 1;
pub const MAX_POSTS_PER_DAY: u32 = 4;

/// Built fresh for every schedule request.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub posts_per_day: u32,
    /// Ordered `HH:MM` slots; empty means the default table for `posts_per_day`
    pub preferred_times: Vec<String>,
    pub start_date: NaiveDate,
    /// IANA timezone name
    pub timezone: String,
}

impl ScheduleConfig {
    pub fn new(posts_per_day: u32, start_date: NaiveDate, timezone: impl Into<String>) -> Self {
        Self {
            posts_per_day,
            preferred_times: Vec::new(),
            start_date,
            timezone: timezone.into(),
        }
    }

    pub fn with_preferred_times(mut self, times: &[&str]) -> Self {
        self.preferred_times = times.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if !(MIN_POSTS_PER_DAY..=MAX_POSTS_PER_DAY).contains(&self.posts_per_day) {
            return Err(PipelineError::InvalidConfiguration(format!(
                "Posts per day must be between {} and {}",
                MIN_POSTS_PER_DAY, MAX_POSTS_PER_DAY
            )));
        }
        if let Some(bad) = self.preferred_times.iter().find(|t| parse_slot(t).is_none()) {
            return Err(PipelineError::InvalidConfiguration(format!(
                "Invalid posting time `{}`, expected HH:MM",
                bad
            )));
        }
        Ok(())
    }

    fn slots(&self) -> Vec<String> {
        if self.preferred_times.is_empty() {
            default_slots(self.posts_per_day)
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            self.preferred_times.clone()
        }
    }
}

pub fn default_slots(posts_per_day: u32) -> &'static [&'static str] {
    match posts_per_day {
        1 => &["09:00"],
        2 => &["09:00", "15:00"],
        3 => &["09:00", "13:00", "17:00"],
        4 => &["09:00", "12:00", "15:00", "18:00"],
        _ => &["09:00", "13:00", "17:00"],
    }
}

/// Unknown names fall back to UTC.
pub fn resolve_timezone(name: &str) -> Tz {
    match name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            warn!(timezone = %name, "Invalid timezone, using UTC");
            Tz::UTC
        }
    }
}

/// The calendar day after `now` as seen in `timezone`.
pub fn tomorrow_in(timezone: &str, now: DateTime<Utc>) -> NaiveDate {
    let local = now.with_timezone(&resolve_timezone(timezone)).date_naive();
    local.succ_opt().unwrap_or(local)
}

/// Wall-clock `date time` in `tz` as a UTC instant. Ambiguous local times
/// take the earlier instant; times inside a DST gap move forward an hour.
pub fn local_instant(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_slot(slot: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(slot.trim(), "%H:%M").ok()
}

/// Assign every approved post a slot, round-robin over (date, slot) from
/// (`start_date`, first slot). Returns how many posts were scheduled. A
/// post whose slot cannot be resolved or whose write fails is skipped and
/// does not use up the slot.
pub async fn schedule_approved_posts(
    deps: &ServerDeps,
    config: &ScheduleConfig,
) -> PipelineResult<usize> {
    let approved = deps
        .upstream(
            "fetch approved posts",
            deps.posts.find_by_status(PostStatus::Approved),
        )
        .await?;

    if approved.is_empty() {
        info!("No approved posts to schedule");
        return Ok(0);
    }

    info!(count = approved.len(), posts_per_day = config.posts_per_day, "Scheduling approved posts");

    let tz = resolve_timezone(&config.timezone);
    let slots = config.slots();
    let mut date = config.start_date;
    let mut slot_index = 0;
    let mut scheduled = 0;

    for post in &approved {
        let slot = &slots[slot_index];
        let Some(at) = parse_slot(slot).and_then(|time| local_instant(date, time, tz)) else {
            warn!(post_id = %post.id, slot = %slot, date = %date, "Unusable time slot, skipping post");
            continue;
        };

        let transition = match decide(post, LifecycleEvent::Schedule { at }) {
            Ok(t) => t,
            Err(e) => {
                warn!(post_id = %post.id, error = %e, "Skipping post");
                continue;
            }
        };

        if let Err(e) = lifecycle::apply_transition(deps, post.id, &transition).await {
            warn!(post_id = %post.id, error = %e, "Failed to schedule post");
            continue;
        }

        info!(post_id = %post.id, scheduled_at = %at, "Scheduled post");
        scheduled += 1;

        slot_index += 1;
        if slot_index >= slots.len() {
            slot_index = 0;
            date = date.succ_opt().unwrap_or(date);
        }
    }

    info!(scheduled, "Scheduling finished");
    Ok(scheduled)
}

/// Scheduled posts due before `now + days`, earliest first.
pub async fn upcoming_schedule(
    deps: &ServerDeps,
    days: i64,
    now: DateTime<Utc>,
) -> PipelineResult<Vec<Post>> {
    let cutoff = now + Duration::days(days);
    let mut posts: Vec<Post> = scheduled_posts(deps)
        .await?
        .into_iter()
        .filter(|p| p.scheduled_at.is_some_and(|at| at < cutoff))
        .collect();
    posts.sort_by_key(|p| p.scheduled_at);
    Ok(posts)
}

pub async fn cancel_schedule(deps: &ServerDeps, post_id: PostId) -> PipelineResult<Post> {
    lifecycle::load_and_apply(deps, post_id, LifecycleEvent::Unschedule).await
}

pub async fn reschedule_post(
    deps: &ServerDeps,
    post_id: PostId,
    at: DateTime<Utc>,
) -> PipelineResult<Post> {
    lifecycle::load_and_apply(deps, post_id, LifecycleEvent::Reschedule { at }).await
}

/// Earliest scheduled post whose time has come.
pub async fn next_due_post(deps: &ServerDeps, now: DateTime<Utc>) -> PipelineResult<Option<Post>> {
    Ok(scheduled_posts(deps)
        .await?
        .into_iter()
        .filter(|p| p.scheduled_at.is_some_and(|at| at <= now))
        .min_by_key(|p| p.scheduled_at))
}

pub async fn mark_published(
    deps: &ServerDeps,
    post_id: PostId,
    at: DateTime<Utc>,
) -> PipelineResult<Post> {
    lifecycle::load_and_apply(deps, post_id, LifecycleEvent::Publish { at }).await
}

async fn scheduled_posts(deps: &ServerDeps) -> PipelineResult<Vec<Post>> {
    deps.upstream(
        "fetch scheduled posts",
        deps.posts.find_by_status(PostStatus::Scheduled),
    )
    .await
}
