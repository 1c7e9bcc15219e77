//! Posting reports on GitLab merge requests
//!
//! The bot keeps a single note per merge request: the first note authored by
//! the bot user is edited in place, otherwise a new note is created.

use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{GitLabConfig, USER_AGENT};

const NOTES_PER_PAGE: u32 = 100;

#[derive(Debug, Error)]
pub enum GitLabError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid GitLab URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("GitLab returned status {status} for {url}")]
    Http { status: u16, url: String },
}

/// What happened to the report note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteAction {
    Created { id: u64 },
    Updated { id: u64 },
}

#[derive(Debug, Deserialize)]
struct Note {
    id: u64,
    author: NoteAuthor,
}

#[derive(Debug, Deserialize)]
struct NoteAuthor {
    username: String,
}

/// Client for the merge request notes API
pub struct GitLabClient {
    client: reqwest::Client,
    notes_url: String,
    token: String,
    bot_username: String,
}

impl GitLabClient {
    pub fn new(config: &GitLabConfig) -> Result<Self, GitLabError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let notes_url = notes_url(config)?;

        Ok(Self {
            client,
            notes_url: notes_url.to_string(),
            token: config.bot_token.clone(),
            bot_username: config.bot_username.clone(),
        })
    }

    /// Post `report` as the bot's note, replacing the previous one if any
    pub async fn upsert_report(&self, report: &str) -> Result<NoteAction, GitLabError> {
        let body = json!({ "body": format_comment(report) });

        match self.find_bot_note().await? {
            Some(id) => {
                let url = format!("{}/{}", self.notes_url, id);
                let response = self
                    .client
                    .put(&url)
                    .header("PRIVATE-TOKEN", &self.token)
                    .json(&body)
                    .send()
                    .await?;
                ensure_success(response.status(), &url)?;
                info!("Updated note {}", id);
                Ok(NoteAction::Updated { id })
            }
            None => {
                let response = self
                    .client
                    .post(&self.notes_url)
                    .header("PRIVATE-TOKEN", &self.token)
                    .json(&body)
                    .send()
                    .await?;
                ensure_success(response.status(), &self.notes_url)?;
                let note: Note = response.json().await?;
                info!("Created note {}", note.id);
                Ok(NoteAction::Created { id: note.id })
            }
        }
    }

    /// Walk the notes page by page until one authored by the bot shows up
    async fn find_bot_note(&self) -> Result<Option<u64>, GitLabError> {
        let mut page = 1u32;

        loop {
            let url = format!(
                "{}?per_page={}&page={}",
                self.notes_url, NOTES_PER_PAGE, page
            );
            debug!("Listing notes: {}", url);

            let response = self
                .client
                .get(&url)
                .header("PRIVATE-TOKEN", &self.token)
                .send()
                .await?;
            ensure_success(response.status(), &url)?;

            let next_page = response
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u32>().ok());
            let notes: Vec<Note> = response.json().await?;

            if let Some(note) = notes
                .iter()
                .find(|note| note.author.username == self.bot_username)
            {
                return Ok(Some(note.id));
            }

            match next_page {
                Some(next) if next > page => page = next,
                _ => return Ok(None),
            }
        }
    }
}

/// Notes endpoint of the merge request; the project id may be a full path
fn notes_url(config: &GitLabConfig) -> Result<Url, GitLabError> {
    let invalid = |reason: String| GitLabError::InvalidUrl {
        url: config.server_url.clone(),
        reason,
    };

    let mut url = Url::parse(config.server_url.trim()).map_err(|e| invalid(e.to_string()))?;
    let merge_request_iid = config.merge_request_iid.to_string();

    url.path_segments_mut()
        .map_err(|_| invalid("cannot be a base URL".to_string()))?
        .pop_if_empty()
        .extend(["api", "v4", "projects"])
        .push(&config.project_id)
        .extend(["merge_requests", merge_request_iid.as_str(), "notes"]);

    Ok(url)
}

fn ensure_success(status: reqwest::StatusCode, url: &str) -> Result<(), GitLabError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(GitLabError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

/// Wrap the report in a fenced code block so the table keeps its alignment
pub fn format_comment(report: &str) -> String {
    if report.ends_with('\n') {
        format!("```\n{}```", report)
    } else {
        format!("```\n{}\n```", report)
    }
}
