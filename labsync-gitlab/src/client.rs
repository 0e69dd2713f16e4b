//! Blocking GitLab REST v4 client and group discovery.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use labsync_core::remote::{GroupSource, GroupSummary, ProjectSource, RemoteProject};
use labsync_core::{Credentials, GroupId, ProjectId, RemoteError, Settings};

use crate::models::{GroupBody, ProjectBody};
use crate::project::GitlabProject;

const API_PREFIX: &str = "api/v4";
const USER_AGENT: &str = "labsync";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const PER_PAGE: &str = "100";
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct GitlabClient {
    agent: ureq::Agent,
    api_base: String,
    token: Option<String>,
}

impl fmt::Debug for GitlabClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitlabClient")
            .field("api_base", &self.api_base)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl GitlabClient {
    /// Create a client for `host` (e.g. `https://gitlab.example.com`).
    pub fn new(host: &str, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build();
        Self {
            agent,
            api_base: api_base(host),
            token,
        }
    }

    pub fn from_settings(settings: &Settings, credentials: &Credentials) -> Self {
        Self::new(&settings.host, credentials.private_token.clone())
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.api_base)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let request = self.agent.request(method, url);
        match &self.token {
            Some(token) => request.set(TOKEN_HEADER, token),
            None => request,
        }
    }

    /// Single GET decoded as JSON.
    pub(crate) fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RemoteError> {
        let url = self.url(path);
        let request = query
            .iter()
            .fold(self.request("GET", &url), |req, (k, v)| req.query(k, v));
        let response = check(request.call(), &url)?;
        decode(response, &url)
    }

    /// HEAD request: `true` on success, `false` on 404, other failures propagate.
    pub(crate) fn exists(&self, path: &str, query: &[(&str, &str)]) -> Result<bool, RemoteError> {
        let url = self.url(path);
        let request = query
            .iter()
            .fold(self.request("HEAD", &url), |req, (k, v)| req.query(k, v));
        match check(request.call(), &url) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// GET every page of a list endpoint, following `x-next-page`.
    pub(crate) fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, RemoteError> {
        let url = self.url(path);
        let mut page = String::from("1");
        let mut items = Vec::new();
        loop {
            let request = query.iter().fold(
                self.request("GET", &url)
                    .query("per_page", PER_PAGE)
                    .query("page", &page),
                |req, (k, v)| req.query(k, v),
            );
            let response = check(request.call(), &url)?;
            let next = next_page(response.header("x-next-page"));
            let batch: Vec<T> = decode(response, &url)?;
            debug!(%url, %page, items = batch.len(), "fetched page");
            items.extend(batch);
            match next {
                Some(n) => page = n,
                None => break,
            }
        }
        Ok(items)
    }

    /// POST/PUT a JSON body; the response body is discarded.
    pub(crate) fn send_json(
        &self,
        method: &str,
        path: &str,
        body: serde_json::Value,
    ) -> Result<(), RemoteError> {
        let url = self.url(path);
        check(self.request(method, &url).send_json(body), &url)?;
        Ok(())
    }
}

impl GroupSource for GitlabClient {
    fn list_subgroups(&self, group: GroupId) -> Result<Vec<GroupSummary>, RemoteError> {
        let groups: Vec<GroupBody> =
            self.get_all(&format!("groups/{group}/subgroups"), &[("all_available", "true")])?;
        Ok(groups.into_iter().map(GroupSummary::from).collect())
    }

    fn list_projects(&self, group: GroupId) -> Result<Vec<RemoteProject>, RemoteError> {
        let projects: Vec<ProjectBody> = self.get_all(&format!("groups/{group}/projects"), &[])?;
        Ok(projects.into_iter().map(RemoteProject::from).collect())
    }
}

impl ProjectSource for GitlabClient {
    type Handle = GitlabProject;

    /// No request is made; the first call on the handle surfaces a bad id.
    fn open(&self, id: ProjectId) -> Result<GitlabProject, RemoteError> {
        Ok(GitlabProject::new(self.clone(), id))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn api_base(host: &str) -> String {
    format!("{}/{API_PREFIX}", host.trim_end_matches('/'))
}

fn next_page(header: Option<&str>) -> Option<String> {
    header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_owned)
}

/// Map ureq's error split onto [`RemoteError`]; 404 becomes `NotFound`.
fn check(
    result: Result<ureq::Response, ureq::Error>,
    url: &str,
) -> Result<ureq::Response, RemoteError> {
    match result {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(404, _)) => Err(RemoteError::NotFound {
            resource: url.to_owned(),
        }),
        Err(ureq::Error::Status(status, response)) => Err(RemoteError::Status {
            status,
            url: url.to_owned(),
            body: response.into_string().unwrap_or_default(),
        }),
        Err(ureq::Error::Transport(transport)) => Err(RemoteError::Transport {
            url: url.to_owned(),
            message: transport.to_string(),
        }),
    }
}

fn decode<T: DeserializeOwned>(response: ureq::Response, url: &str) -> Result<T, RemoteError> {
    response.into_json().map_err(|e| RemoteError::Decode {
        url: url.to_owned(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://gitlab.example.com", "https://gitlab.example.com/api/v4")]
    #[case("https://gitlab.example.com/", "https://gitlab.example.com/api/v4")]
    fn api_base_strips_trailing_slash(#[case] host: &str, #[case] expected: &str) {
        assert_eq!(api_base(host), expected);
    }

    #[test]
    fn url_joins_path() {
        let client = GitlabClient::new("https://gitlab.example.com", None);
        assert_eq!(
            client.url("groups/1/subgroups"),
            "https://gitlab.example.com/api/v4/groups/1/subgroups"
        );
    }

    #[rstest]
    #[case(Some("2"), Some("2"))]
    #[case(Some(" 3 "), Some("3"))]
    #[case(Some(""), None)]
    #[case(None, None)]
    fn next_page_header(#[case] header: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(next_page(header).as_deref(), expected);
    }

    #[test]
    fn status_404_is_not_found() {
        let response = ureq::Response::new(404, "Not Found", "").unwrap();
        let err = check(Err(ureq::Error::Status(404, response)), "u").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn other_status_is_not_not_found() {
        let response = ureq::Response::new(401, "Unauthorized", "bad token").unwrap();
        let err = check(Err(ureq::Error::Status(401, response)), "u").unwrap_err();
        assert!(!err.is_not_found());
        assert!(
            matches!(&err, RemoteError::Status { status: 401, body, .. } if body == "bad token"),
            "got: {err}"
        );
    }

    #[test]
    fn debug_does_not_leak_token() {
        let client = GitlabClient::new("https://gitlab.example.com", Some("glpat-x".into()));
        assert!(!format!("{client:?}").contains("glpat-x"));
    }
}
