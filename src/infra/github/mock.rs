//! wiremock-based GitHub mock server for testing.
//!
//! Provides `GitHubMockServer` for HTTP-level mocking of GitHub API calls.
//! This is used across all tests that need to interact with GitHub APIs.
//!
//! # Usage
//!
//! ```ignore
//! let mock = GitHubMockServer::start().await;
//! let ctx = mock.repo("NASA-PDS", "validate");
//!
//! // Issue operations
//! ctx.issue(42).title("B17 Sprint kickoff").create().await;
//! ctx.issue(42).add_labels_expecting(1).await;
//! ctx.issue(42).sub_issues(&[43, 44]).await;
//! ctx.list_issues(&[ctx.issue(1).labels(vec!["bug"]).to_json()]).await;
//!
//! // Labels
//! ctx.labels(&["theme", "B16"]).await;
//! ctx.create_label_expecting("B17", 1).await;
//!
//! // Server-level search and GraphQL project operations
//! mock.search_issues(&[]).await;
//! mock.projects(&[("PVT_1", 17, "B17")]).await;
//! mock.add_project_item("PVTI_1").await;
//!
//! // Dry-run guard: fails on drop if anything mutating was requested
//! mock.expect_no_mutations().await;
//! ```

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, path_regex, query_param_contains};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::client::OctocrabClient;

fn mock_label(name: &str) -> serde_json::Value {
    json!({
        "id": 1,
        "node_id": "LA_test",
        "name": name,
        "color": "0366d6",
        "default": false
    })
}

fn mock_issue(
    owner: &str,
    repo: &str,
    number: u64,
    title: &str,
    state: &str,
    labels: &[&str],
) -> serde_json::Value {
    let labels: Vec<_> = labels.iter().map(|l| mock_label(l)).collect();
    json!({
        "id": number,
        "node_id": format!("I_{number}"),
        "number": number,
        "title": title,
        "state": state,
        "html_url": format!("https://github.com/{owner}/{repo}/issues/{number}"),
        "labels": labels,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-02T00:00:00Z",
        "closed_at": if state == "closed" { json!("2025-01-03T00:00:00Z") } else { json!(null) }
    })
}

/// wiremock-based GitHub mock server for testing.
pub struct GitHubMockServer {
    server: MockServer,
}

impl GitHubMockServer {
    /// Start a new mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get an OctocrabClient configured to use this mock server.
    pub fn client(&self) -> OctocrabClient {
        OctocrabClient::with_base_url(&self.server.uri(), "test-token").unwrap()
    }

    /// Create a repository context for building mocks.
    pub fn repo<'a>(&'a self, owner: &'a str, repo: &'a str) -> MockRepoContext<'a> {
        MockRepoContext {
            server: &self.server,
            owner,
            repo,
        }
    }

    /// Mock GET /search/issues returning `items` for every query.
    pub async fn search_issues(&self, items: &[serde_json::Value]) {
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": items.len(),
                "incomplete_results": false,
                "items": items
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock GET /search/issues for queries containing `fragment`.
    pub async fn search_issues_matching(&self, fragment: &str, items: &[serde_json::Value]) {
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param_contains("q", fragment))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": items.len(),
                "incomplete_results": false,
                "items": items
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock GET /search/issues failing with `status` for queries containing `fragment`.
    pub async fn search_issues_failing(&self, fragment: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param_contains("q", fragment))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "message": "API rate limit exceeded",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock the organization project lookup. Entries are (id, number, title).
    pub async fn projects(&self, projects: &[(&str, u64, &str)]) {
        let nodes: Vec<_> = projects
            .iter()
            .map(|(id, number, title)| json!({"id": id, "number": number, "title": title}))
            .collect();
        self.graphql_containing(
            "projectsV2",
            json!({"data": {"organization": {"projectsV2": {"nodes": nodes}}}}),
        )
        .await;
    }

    /// Mock the project fields query.
    pub async fn project_fields(&self, fields: &[MockProjectField<'_>]) {
        let mut nodes: Vec<_> = fields.iter().map(MockProjectField::to_json).collect();
        // Iteration fields are not selected by the fragments and come back empty.
        nodes.push(json!({}));
        self.graphql_containing(
            "ProjectV2SingleSelectField",
            json!({"data": {"node": {"fields": {"nodes": nodes}}}}),
        )
        .await;
    }

    /// Mock the issue project-items query. Entries are (item id, project id).
    pub async fn issue_project_items(&self, items: &[(&str, &str)]) {
        let nodes: Vec<_> = items
            .iter()
            .map(|(id, project)| json!({"id": id, "project": {"id": project}}))
            .collect();
        self.graphql_containing(
            "projectItems",
            json!({"data": {"node": {"projectItems": {"nodes": nodes}}}}),
        )
        .await;
    }

    /// Mock the add-item mutation.
    pub async fn add_project_item(&self, item_id: &str) {
        self.graphql_containing(
            "addProjectV2ItemById",
            json!({"data": {"addProjectV2ItemById": {"item": {"id": item_id}}}}),
        )
        .await;
    }

    /// Mock the field update mutation, expecting it to be called `times` times.
    pub async fn set_item_field_expecting(&self, times: u64) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("updateProjectV2ItemFieldValue"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"updateProjectV2ItemFieldValue": {"projectV2Item": {"id": "PVTI_x"}}}
            })))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Mock every GraphQL request to fail with `message`.
    pub async fn graphql_error(&self, message: &str) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{"message": message}]
            })))
            .mount(&self.server)
            .await;
    }

    /// Fail verification on drop if any mutating REST or GraphQL call is made.
    pub async fn expect_no_mutations(&self) {
        for verb in ["POST", "PATCH", "PUT", "DELETE"] {
            Mock::given(method(verb))
                .and(path_regex(r"^/repos/"))
                .respond_with(ResponseTemplate::new(500))
                .expect(0)
                .named(format!("{verb} /repos/*"))
                .mount(&self.server)
                .await;
        }
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("mutation"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .named("GraphQL mutation")
            .mount(&self.server)
            .await;
    }

    async fn graphql_containing(&self, fragment: &str, response: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains(fragment))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }
}

/// Project field definition for `GitHubMockServer::project_fields`.
pub struct MockProjectField<'a> {
    id: &'a str,
    name: &'a str,
    data_type: &'a str,
    options: Vec<(&'a str, &'a str)>,
}

impl<'a> MockProjectField<'a> {
    pub fn date(id: &'a str, name: &'a str) -> Self {
        Self {
            id,
            name,
            data_type: "DATE",
            options: Vec::new(),
        }
    }

    pub fn text(id: &'a str, name: &'a str) -> Self {
        Self {
            id,
            name,
            data_type: "TEXT",
            options: Vec::new(),
        }
    }

    pub fn single_select(id: &'a str, name: &'a str, options: &[(&'a str, &'a str)]) -> Self {
        Self {
            id,
            name,
            data_type: "SINGLE_SELECT",
            options: options.to_vec(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        let mut value = json!({"id": self.id, "name": self.name, "dataType": self.data_type});
        if self.data_type == "SINGLE_SELECT" {
            let options: Vec<_> = self
                .options
                .iter()
                .map(|(id, name)| json!({"id": id, "name": name}))
                .collect();
            value["options"] = json!(options);
        }
        value
    }
}

// ============ Builder Pattern API ============

/// Repository context for building mocks.
pub struct MockRepoContext<'a> {
    server: &'a MockServer,
    owner: &'a str,
    repo: &'a str,
}

impl<'a> MockRepoContext<'a> {
    /// Create an issue mock builder.
    pub fn issue(&self, number: u64) -> MockIssueBuilder<'a> {
        MockIssueBuilder {
            server: self.server,
            owner: self.owner,
            repo: self.repo,
            number,
            title: "Test Issue",
            state: "open",
            labels: Vec::new(),
            pull_request: false,
        }
    }

    /// Mock GET /repos/{owner}/{repo}/labels.
    pub async fn labels(&self, names: &[&str]) {
        let labels: Vec<_> = names.iter().map(|n| mock_label(n)).collect();
        Mock::given(method("GET"))
            .and(path(format!("/repos/{}/{}/labels", self.owner, self.repo)))
            .respond_with(ResponseTemplate::new(200).set_body_json(labels))
            .mount(self.server)
            .await;
    }

    /// Mock GET /repos/{owner}/{repo}/labels failing with `status`.
    pub async fn labels_failing(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{}/{}/labels", self.owner, self.repo)))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "message": "Server Error",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(self.server)
            .await;
    }

    /// Mock POST /repos/{owner}/{repo}/labels whose body contains `fragment`,
    /// expecting exactly `times` calls.
    pub async fn create_label_expecting(&self, fragment: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/repos/{}/{}/labels", self.owner, self.repo)))
            .and(body_string_contains(fragment))
            .respond_with(ResponseTemplate::new(201).set_body_json(mock_label("created")))
            .expect(times)
            .mount(self.server)
            .await;
    }

    /// Mock GET /repos/{owner}/{repo}/issues returning `issues`.
    pub async fn list_issues(&self, issues: &[serde_json::Value]) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{}/{}/issues", self.owner, self.repo)))
            .respond_with(ResponseTemplate::new(200).set_body_json(issues))
            .mount(self.server)
            .await;
    }
}

/// Builder for mocking issue endpoints.
pub struct MockIssueBuilder<'a> {
    server: &'a MockServer,
    owner: &'a str,
    repo: &'a str,
    number: u64,
    title: &'a str,
    state: &'a str,
    labels: Vec<&'a str>,
    pull_request: bool,
}

impl<'a> MockIssueBuilder<'a> {
    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    pub fn state(mut self, state: &'a str) -> Self {
        self.state = state;
        self
    }

    pub fn labels(mut self, labels: Vec<&'a str>) -> Self {
        self.labels = labels;
        self
    }

    /// Mark the item as a pull request.
    pub fn pull_request(mut self) -> Self {
        self.pull_request = true;
        self
    }

    /// JSON representation as returned by listing and search endpoints.
    pub fn to_json(&self) -> serde_json::Value {
        let mut issue = mock_issue(
            self.owner,
            self.repo,
            self.number,
            self.title,
            self.state,
            &self.labels,
        );
        if self.pull_request {
            issue["pull_request"] = json!({
                "url": format!("https://api.github.com/repos/{}/{}/pulls/{}", self.owner, self.repo, self.number)
            });
        }
        issue
    }

    /// Mock POST /repos/{owner}/{repo}/issues (create new issue) for this title.
    pub async fn create(self) {
        let route = format!("/repos/{}/{}/issues", self.owner, self.repo);
        let title_fragment = serde_json::to_string(self.title).unwrap();
        let body = self.to_json();
        Mock::given(method("POST"))
            .and(path(route))
            .and(body_string_contains(title_fragment))
            .respond_with(ResponseTemplate::new(201).set_body_json(body))
            .mount(self.server)
            .await;
    }

    /// Mock POST /repos/{owner}/{repo}/issues failing with `status` for this title.
    pub async fn create_failing(self, status: u16) {
        let route = format!("/repos/{}/{}/issues", self.owner, self.repo);
        let title_fragment = serde_json::to_string(self.title).unwrap();
        Mock::given(method("POST"))
            .and(path(route))
            .and(body_string_contains(title_fragment))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "message": "Server Error",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(self.server)
            .await;
    }

    /// Mock POST /repos/{owner}/{repo}/issues/{number}/labels, expecting `times` calls.
    pub async fn add_labels_expecting(self, times: u64) {
        Mock::given(method("POST"))
            .and(path(format!(
                "/repos/{}/{}/issues/{}/labels",
                self.owner, self.repo, self.number
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([mock_label("B17")])))
            .expect(times)
            .mount(self.server)
            .await;
    }

    /// Mock GET /repos/{owner}/{repo}/issues/{number}/sub_issues.
    pub async fn sub_issues(self, numbers: &[u64]) {
        let subs: Vec<_> = numbers
            .iter()
            .map(|n| mock_issue(self.owner, self.repo, *n, "Sub-issue", "open", &[]))
            .collect();
        Mock::given(method("GET"))
            .and(path(format!(
                "/repos/{}/{}/issues/{}/sub_issues",
                self.owner, self.repo, self.number
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(subs))
            .mount(self.server)
            .await;
    }

    /// Mock GET /repos/{owner}/{repo}/issues/{number}/sub_issues returning 404.
    pub async fn sub_issues_not_found(self) {
        Mock::given(method("GET"))
            .and(path(format!(
                "/repos/{}/{}/issues/{}/sub_issues",
                self.owner, self.repo, self.number
            )))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(self.server)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_json_contains_state_dependent_closed_at() {
        let open = mock_issue("o", "r", 1, "t", "open", &[]);
        let closed = mock_issue("o", "r", 2, "t", "closed", &[]);
        assert!(open["closed_at"].is_null());
        assert_eq!(closed["closed_at"], "2025-01-03T00:00:00Z");
    }

    #[test]
    fn single_select_field_json_has_options() {
        let field = MockProjectField::single_select("F", "Product", &[("O", "Validate")]);
        let value = field.to_json();
        assert_eq!(value["dataType"], "SINGLE_SELECT");
        assert_eq!(value["options"][0]["name"], "Validate");
        assert!(MockProjectField::text("T", "Notes").to_json()["options"].is_null());
    }
}
