//! GitHub enrichment: public repositories of the candidate, when the CV links a profile.
//!
//! Enrichment is best effort: every failure is logged and yields no projects.

use std::sync::OnceLock;

use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const GITHUB_API_URL: &str = "https://api.github.com";
const PER_PAGE: u32 = 100;
const MAX_PAGES: u32 = 10;
const USER_AGENT: &str = concat!("cvmatch/", env!("CARGO_PKG_VERSION"));

/// A public repository as passed to the structuring prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubProject {
    pub repository_name: String,
    pub description: String,
    pub repository_url: String,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    name: String,
    description: Option<String>,
    html_url: String,
}

impl From<RepoResponse> for GithubProject {
    fn from(repo: RepoResponse) -> Self {
        Self {
            repository_name: repo.name,
            description: repo
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| "No description provided".to_string()),
            repository_url: repo.html_url,
        }
    }
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?://(?:www\.)?github\.com/\S+").expect("valid regex"))
}

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https?://(?:www\.)?github\.com/([A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)/?")
            .expect("valid regex")
    })
}

/// First GitHub URL in the text, without trailing punctuation.
pub fn extract_github_url(text: &str) -> Option<String> {
    url_pattern()
        .find(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ')', ']', '>', '"', '\'']).to_string())
}

/// `https://github.com/octocat/repo` → `octocat`.
pub fn username_from_url(url: &str) -> Option<String> {
    username_pattern()
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    token: Option<String>,
    api_url: String,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Result<Self, reqwest::Error> {
        Self::with_api_url(token, GITHUB_API_URL.to_string())
    }

    pub fn with_api_url(token: Option<String>, api_url: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            token,
            api_url,
        })
    }

    /// Projects for the first GitHub profile linked in `cv_text`.
    pub async fn projects_for_cv(&self, cv_text: &str) -> Vec<GithubProject> {
        let Some(url) = extract_github_url(cv_text) else {
            return Vec::new();
        };
        let Some(username) = username_from_url(&url) else {
            warn!("Unable to extract GitHub username from URL: {url}");
            return Vec::new();
        };
        self.fetch_projects(&username).await
    }

    /// All public repositories of `username`, page by page.
    pub async fn fetch_projects(&self, username: &str) -> Vec<GithubProject> {
        info!("Fetching GitHub projects for user: {username}");
        let url = format!("{}/users/{username}/repos", self.api_url);
        let mut projects = Vec::new();

        for page in 1..=MAX_PAGES {
            let mut request = self
                .client
                .get(&url)
                .header("Accept", "application/vnd.github+json")
                .query(&[("page", page), ("per_page", PER_PAGE)]);
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    warn!("Error while fetching GitHub projects: {e}");
                    break;
                }
            };
            if !response.status().is_success() {
                warn!("Failed to fetch GitHub repos for {username}: {}", response.status());
                break;
            }
            let repos: Vec<RepoResponse> = match response.json().await {
                Ok(r) => r,
                Err(e) => {
                    warn!("Unexpected GitHub response: {e}");
                    break;
                }
            };
            if repos.is_empty() {
                break;
            }
            let last_page = repos.len() < PER_PAGE as usize;
            projects.extend(repos.into_iter().map(GithubProject::from));
            if last_page {
                break;
            }
        }

        info!("Total GitHub projects fetched: {}", projects.len());
        projects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_github_url_first_match() {
        let text = "Contacts: mario@rossi.it\nGitHub: https://github.com/mrossi. \
                    See also https://github.com/other";
        assert_eq!(
            extract_github_url(text).as_deref(),
            Some("https://github.com/mrossi")
        );
    }

    #[test]
    fn test_extract_github_url_none() {
        assert!(extract_github_url("linkedin.com/in/mrossi").is_none());
    }

    #[test]
    fn test_username_from_url() {
        assert_eq!(
            username_from_url("https://github.com/octo-cat/").as_deref(),
            Some("octo-cat")
        );
        assert_eq!(
            username_from_url("http://www.github.com/mrossi/tinydb").as_deref(),
            Some("mrossi")
        );
        assert!(username_from_url("https://gitlab.com/mrossi").is_none());
    }

    #[test]
    fn test_missing_description_gets_placeholder() {
        let repo: RepoResponse = serde_json::from_str(
            r#"{"name": "tinydb", "description": null, "html_url": "https://github.com/mrossi/tinydb"}"#,
        )
        .unwrap();
        let project = GithubProject::from(repo);
        assert_eq!(project.description, "No description provided");
        assert_eq!(project.repository_name, "tinydb");
    }

    #[tokio::test]
    async fn test_cv_without_link_skips_network() {
        let client = GithubClient::with_api_url(None, "http://127.0.0.1:9".to_string()).unwrap();
        assert!(client.projects_for_cv("no links here").await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_api_yields_no_projects() {
        let client = GithubClient::with_api_url(None, "http://127.0.0.1:9".to_string()).unwrap();
        assert!(client.fetch_projects("mrossi").await.is_empty());
    }
}
