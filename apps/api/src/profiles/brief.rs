//! AI pre-call brief generation.
//!
//! Fetches an employer's website, sends the readable text to the LLM, and
//! returns structured intelligence. The result is persisted to
//! employer_profiles and rendered into the admin confirmation email.
//! Never raises — degrades to an empty brief on any failure so booking
//! confirmation is never blocked.

use anyhow::{Context, Result};
use ego_tree::NodeRef;
use scraper::{Html, Node};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::llm_client::{strip_json_fences, LlmClient};

/// Safely within the model's context window.
pub const MAX_CONTENT_CHARS: usize = 8_000;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; RYZEBot/1.0; +https://ryzerecruiting.com)";

const BRIEF_SYSTEM: &str = "\
You are an expert recruiting researcher preparing a pre-call brief for a \
finance and accounting recruiter (CPA background) at RYZE Recruiting. \
You MUST respond with ONLY a valid JSON object — no preamble, no explanation, \
no markdown fences.";

const SKIP_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "meta", "noscript",
];

/// Structured pre-call intelligence. `Default` is the empty brief returned on
/// any failure; `raw` carries model output that was produced but did not
/// parse as the requested JSON.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreCallBrief {
    pub company_overview: Option<String>,
    pub industry: Option<String>,
    pub estimated_size: Option<String>,
    pub hiring_needs: Vec<String>,
    pub talking_points: Vec<String>,
    pub red_flags: Option<String>,
    pub raw: Option<String>,
}

impl PreCallBrief {
    pub fn is_empty(&self) -> bool {
        self.company_overview.is_none()
            && self.industry.is_none()
            && self.estimated_size.is_none()
            && self.hiring_needs.is_empty()
            && self.talking_points.is_empty()
            && self.red_flags.is_none()
            && self.raw.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct BriefPayload {
    #[serde(default)]
    company_overview: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    estimated_size: Option<String>,
    #[serde(default)]
    hiring_needs: Vec<String>,
    #[serde(default)]
    talking_points: Vec<String>,
    #[serde(default)]
    red_flags: Option<String>,
}

/// Fetch an employer's website and generate a structured pre-call brief.
/// Returns an empty brief on any failure — never raises.
pub async fn generate_pre_call_brief(llm: &LlmClient, website_url: &str) -> PreCallBrief {
    if !llm.is_configured() {
        warn!("ANTHROPIC_API_KEY not set — skipping AI brief generation.");
        return PreCallBrief::default();
    }

    let website_text = match fetch_website_text(website_url).await {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to fetch website {website_url}: {e}");
            return PreCallBrief::default();
        }
    };
    if website_text.is_empty() {
        warn!("No readable content extracted from {website_url}");
        return PreCallBrief::default();
    }

    let response = match llm.call(&build_prompt(&website_text), BRIEF_SYSTEM).await {
        Ok(response) => response,
        Err(e) => {
            error!("LLM call failed for {website_url}: {e}");
            return PreCallBrief::default();
        }
    };
    let Some(text) = response.text() else {
        error!("LLM returned no text content for {website_url}");
        return PreCallBrief::default();
    };

    let brief = parse_brief_response(text);
    if brief.raw.is_some() {
        error!("Failed to parse AI brief JSON for {website_url} — keeping raw text");
    } else {
        info!("AI brief parsed successfully for {website_url}");
    }
    brief
}

/// Parse the model's response into a brief. Falls back to carrying the raw
/// text when the output is not the requested JSON object, so nothing is lost.
fn parse_brief_response(text: &str) -> PreCallBrief {
    let stripped = strip_json_fences(text);
    match serde_json::from_str::<BriefPayload>(stripped) {
        Ok(payload) => PreCallBrief {
            company_overview: payload.company_overview,
            industry: payload.industry,
            estimated_size: payload.estimated_size,
            hiring_needs: payload.hiring_needs,
            talking_points: payload.talking_points,
            red_flags: payload.red_flags,
            raw: None,
        },
        Err(_) => PreCallBrief {
            raw: Some(stripped.to_string()),
            ..PreCallBrief::default()
        },
    }
}

fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Fetch a URL and return cleaned readable text with all HTML stripped.
async fn fetch_website_text(url: &str) -> Result<String> {
    let url = normalize_url(url);

    let response = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")?
        .get(&url)
        .send()
        .await?
        .error_for_status()?;

    let html = response.text().await?;
    Ok(extract_visible_text(&html))
}

/// Strips noise elements and collapses whitespace, truncating to the
/// character budget on a char boundary.
fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_text(document.tree.root(), &mut raw);

    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    lines.join("\n").chars().take(MAX_CONTENT_CHARS).collect()
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Element(el) if SKIP_TAGS.contains(&el.name()) => return,
        Node::Text(text) => {
            out.push_str(&text);
            out.push('\n');
        }
        _ => {}
    }
    for child in node.children() {
        collect_text(child, out);
    }
}

fn build_prompt(website_text: &str) -> String {
    format!(
        r#"Based on the website content below, return ONLY a valid JSON object.

Required format:
{{
  "company_overview": "2-3 sentence description of what the company does and who they serve",
  "industry": "specific industry classification",
  "estimated_size": "headcount or revenue signals, e.g. 50-100 employees",
  "hiring_needs": ["role 1", "role 2", "role 3"],
  "talking_points": ["point 1", "point 2", "point 3"],
  "red_flags": "any concerns or considerations, or null if none"
}}

Website content:
{website_text}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_visible_text_strips_noise_elements() {
        let html = r#"<html><head><style>body { color: red; }</style></head>
            <body>
              <nav>Home About</nav>
              <script>console.log("tracking");</script>
              <p>We build accounting software for mid-market firms.</p>
              <footer>Copyright 2026</footer>
            </body></html>"#;
        let text = extract_visible_text(html);
        assert!(text.contains("accounting software"));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("Home About"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn test_extract_visible_text_collapses_blank_lines() {
        let html = "<body><p>First</p>\n\n\n<p>  Second  </p></body>";
        assert_eq!(extract_visible_text(html), "First\nSecond");
    }

    #[test]
    fn test_extract_visible_text_truncates_on_char_boundary() {
        let html = format!("<body><p>{}</p></body>", "é".repeat(MAX_CONTENT_CHARS + 50));
        let text = extract_visible_text(&html);
        assert_eq!(text.chars().count(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn test_normalize_url_prefixes_scheme() {
        assert_eq!(normalize_url("acme.com"), "https://acme.com");
        assert_eq!(normalize_url("http://acme.com"), "http://acme.com");
        assert_eq!(normalize_url("https://acme.com"), "https://acme.com");
    }

    #[test]
    fn test_parse_brief_response_valid_json() {
        let brief = parse_brief_response(
            r#"{"company_overview": "Makes widgets.", "industry": "Manufacturing",
                "estimated_size": "50-100 employees",
                "hiring_needs": ["Controller"], "talking_points": ["Growing fast"],
                "red_flags": null}"#,
        );
        assert_eq!(brief.industry.as_deref(), Some("Manufacturing"));
        assert_eq!(brief.hiring_needs, vec!["Controller"]);
        assert!(brief.red_flags.is_none());
        assert!(brief.raw.is_none());
        assert!(!brief.is_empty());
    }

    #[test]
    fn test_parse_brief_response_fenced_json() {
        let brief =
            parse_brief_response("```json\n{\"industry\": \"Healthcare\"}\n```");
        assert_eq!(brief.industry.as_deref(), Some("Healthcare"));
        assert!(brief.raw.is_none());
    }

    #[test]
    fn test_parse_brief_response_falls_back_to_raw() {
        let brief = parse_brief_response("The company appears to be a staffing agency.");
        assert!(brief.industry.is_none());
        assert_eq!(
            brief.raw.as_deref(),
            Some("The company appears to be a staffing agency.")
        );
        assert!(!brief.is_empty());
    }

    #[test]
    fn test_default_brief_is_empty() {
        assert!(PreCallBrief::default().is_empty());
    }

    #[test]
    fn test_build_prompt_embeds_content() {
        let prompt = build_prompt("ACME makes rockets.");
        assert!(prompt.contains("ACME makes rockets."));
        assert!(prompt.contains("hiring_needs"));
    }
}
