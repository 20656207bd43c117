//! Anthropic Messages API client implementing [`BaseContentService`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BaseContentService, BrainstormIdea, Categorization};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const CATEGORIES: &[&str] = &[
    "technical",
    "business",
    "learning",
    "product_update",
    "personal",
    "industry_insight",
    "milestone",
];

pub struct AnthropicClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_key,
            model,
            client,
        })
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .context("Failed to call Anthropic API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error {}: {}", status, body);
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic response")?;

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .context("Anthropic response had no text block")
    }
}

#[async_trait]
impl BaseContentService for AnthropicClient {
    async fn categorize(&self, text: &str) -> Result<Categorization> {
        let prompt = format!(
            r#"You are an AI assistant helping to categorize LinkedIn content ideas.

Analyze this thought and provide:
1. Category (choose ONE): {}
2. Topic tags (2-4 relevant keywords)
3. Content readiness (choose ONE): draft_ready, needs_brainstorm

Thought: "{}"

Respond in this exact format:
CATEGORY: [category]
TAGS: [tag1, tag2, tag3]
READINESS: [draft_ready or needs_brainstorm]
REASON: [brief explanation why]"#,
            CATEGORIES.join(", "),
            text
        );

        let response = self.complete(&prompt, 500).await?;
        debug!(response = %response, "categorization response");
        Ok(parse_categorization(&response))
    }

    async fn generate_variations(&self, thoughts: &[String]) -> Result<Vec<String>> {
        anyhow::ensure!(!thoughts.is_empty(), "no thoughts provided");

        let listed: String = thoughts
            .iter()
            .enumerate()
            .map(|(i, t)| format!("\nThought {}: {}", i + 1, t))
            .collect();

        let prompt = format!(
            r#"You are a LinkedIn ghostwriter helping create authentic, engaging posts.

Input thoughts:{}

Create a LinkedIn post that:
1. Sounds natural and conversational (not corporate or salesy)
2. Starts with a strong hook
3. Uses short paragraphs and line breaks for readability
4. Includes a clear insight or takeaway
5. Ends with engagement (a question or call to action)
6. Is between 150-300 words
7. Uses emojis sparingly (1-2 max)

Generate 3 different variations with different angles:
- Variation 1: Story-driven approach
- Variation 2: Insight/lesson-focused
- Variation 3: Data/results-focused

Format your response as:
===VARIATION 1===
[post content]

===VARIATION 2===
[post content]

===VARIATION 3===
[post content]"#,
            listed
        );

        let response = self.complete(&prompt, 2000).await?;
        let variations = parse_variations(&response);
        anyhow::ensure!(!variations.is_empty(), "model returned no variations");
        Ok(variations)
    }

    async fn brainstorm(&self, topic: &str) -> Result<BrainstormIdea> {
        let prompt = format!(
            r#"You are helping brainstorm LinkedIn content ideas.

The user shared this incomplete thought:
"{}"

Help develop this into a complete LinkedIn post idea by:
1. Exploring different angles to approach this topic
2. Identifying what additional context or examples would strengthen it
3. Suggesting 3-4 specific directions this could go

Respond in this format:
EXPLORATION:
[2-3 paragraphs exploring the topic and why it matters]

KEY ANGLES:
1. [Angle 1 description]
2. [Angle 2 description]
3. [Angle 3 description]
4. [Angle 4 description]

QUESTIONS TO CONSIDER:
- [Question 1]
- [Question 2]
- [Question 3]"#,
            topic
        );

        let response = self.complete(&prompt, 2000).await?;
        Ok(parse_brainstorm(&response))
    }
}

// =============================================================================
// Response parsing
// =============================================================================

/// Read CATEGORY / TAGS / READINESS lines; missing fields fall back to
/// `uncategorized`, `["general"]` and `needs_brainstorm`.
pub fn parse_categorization(response: &str) -> Categorization {
    let mut category = String::new();
    let mut tags = Vec::new();
    let mut readiness = String::new();

    for line in response.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("CATEGORY:") {
            category = rest.trim().to_lowercase();
        } else if let Some(rest) = line.strip_prefix("TAGS:") {
            tags = rest
                .trim()
                .trim_matches(|c| c == '[' || c == ']')
                .split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
        } else if let Some(rest) = line.strip_prefix("READINESS:") {
            readiness = rest.trim().to_lowercase();
        }
    }

    if category.is_empty() {
        category = "uncategorized".to_string();
    }
    if tags.is_empty() {
        tags = vec!["general".to_string()];
    }
    if readiness.is_empty() {
        readiness = "needs_brainstorm".to_string();
    }

    Categorization {
        category,
        tags,
        readiness,
    }
}

/// Split on `===VARIATION n===` markers, dropping each marker line.
pub fn parse_variations(response: &str) -> Vec<String> {
    response
        .split("===VARIATION")
        .filter_map(|part| {
            let (_, body) = part.split_once('\n')?;
            let body = body.trim();
            (!body.is_empty()).then(|| body.to_string())
        })
        .collect()
}

fn section<'a>(response: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = response.find(start)? + start.len();
    let to = response[from..]
        .find(end)
        .map(|i| from + i)
        .unwrap_or(response.len());
    Some(&response[from..to])
}

pub fn parse_brainstorm(response: &str) -> BrainstormIdea {
    const EXPLORATION: &str = "EXPLORATION:";
    const ANGLES: &str = "KEY ANGLES:";
    const QUESTIONS: &str = "QUESTIONS TO CONSIDER:";

    let exploration = section(response, EXPLORATION, ANGLES)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let angles = section(response, ANGLES, QUESTIONS)
        .map(|s| {
            s.lines()
                .map(str::trim)
                .filter_map(|line| {
                    let (num, rest) = line.split_once('.')?;
                    if num.is_empty() || !num.chars().all(|c| c.is_ascii_digit()) {
                        return None;
                    }
                    let angle = rest.trim();
                    (!angle.is_empty()).then(|| angle.to_string())
                })
                .collect()
        })
        .unwrap_or_default();

    BrainstormIdea {
        exploration,
        angles,
    }
}
