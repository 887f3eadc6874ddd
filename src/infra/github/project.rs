//! Organization project (Projects v2) operations over GraphQL.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::client::OctocrabClient;
use super::error::Result;

/// A project board found in an organization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub number: u64,
    pub title: String,
}

/// A custom field of a project board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectField {
    pub id: String,
    pub name: String,
    pub data_type: String,
    /// Options of a single-select field, as (id, name).
    pub options: Vec<(String, String)>,
}

impl ProjectField {
    pub fn option_id(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(_, option)| option == name)
            .map(|(id, _)| id.as_str())
    }
}

/// Value written into a project item field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    SingleSelect(String),
}

impl FieldValue {
    /// Choose the value shape matching a field's data type.
    /// Returns None for a single-select field without a matching option.
    pub fn for_field(field: &ProjectField, value: &str) -> Option<Self> {
        match field.data_type.as_str() {
            "SINGLE_SELECT" => field
                .option_id(value)
                .map(|id| FieldValue::SingleSelect(id.to_string())),
            "DATE" => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(FieldValue::Date),
            _ => Some(FieldValue::Text(value.to_string())),
        }
    }

    fn to_input(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(text) => json!({ "text": text }),
            FieldValue::Date(date) => json!({ "date": date.format("%Y-%m-%d").to_string() }),
            FieldValue::SingleSelect(id) => json!({ "singleSelectOptionId": id }),
        }
    }
}

#[async_trait::async_trait]
pub trait ProjectClient: Send + Sync {
    /// Find an organization project by exact title.
    async fn find_project(&self, org: &str, title: &str) -> Result<Option<ProjectRef>>;

    /// Custom fields of a project.
    async fn project_fields(&self, project_id: &str) -> Result<Vec<ProjectField>>;

    /// Item id of `content_id` (an issue node id) in the project, if it is already there.
    async fn project_item_id(&self, project_id: &str, content_id: &str)
    -> Result<Option<String>>;

    /// Add an issue to a project and return the new item id.
    async fn add_project_item(&self, project_id: &str, content_id: &str) -> Result<String>;

    /// Set one field of a project item.
    async fn set_item_field(
        &self,
        project_id: &str,
        item_id: &str,
        field_id: &str,
        value: &FieldValue,
    ) -> Result<()>;
}

const FIND_PROJECT_QUERY: &str = r#"
query($org: String!, $title: String!) {
  organization(login: $org) {
    projectsV2(first: 20, query: $title) {
      nodes { id number title }
    }
  }
}
"#;

const PROJECT_FIELDS_QUERY: &str = r#"
query($projectId: ID!) {
  node(id: $projectId) {
    ... on ProjectV2 {
      fields(first: 50) {
        nodes {
          ... on ProjectV2Field { id name dataType }
          ... on ProjectV2SingleSelectField { id name dataType options { id name } }
        }
      }
    }
  }
}
"#;

const ISSUE_PROJECT_ITEMS_QUERY: &str = r#"
query($contentId: ID!) {
  node(id: $contentId) {
    ... on Issue {
      projectItems(first: 50) {
        nodes { id project { id } }
      }
    }
  }
}
"#;

const ADD_ITEM_MUTATION: &str = r#"
mutation($projectId: ID!, $contentId: ID!) {
  addProjectV2ItemById(input: {projectId: $projectId, contentId: $contentId}) {
    item { id }
  }
}
"#;

const SET_FIELD_MUTATION: &str = r#"
mutation($projectId: ID!, $itemId: ID!, $fieldId: ID!, $value: ProjectV2FieldValue!) {
  updateProjectV2ItemFieldValue(
    input: {projectId: $projectId, itemId: $itemId, fieldId: $fieldId, value: $value}
  ) {
    projectV2Item { id }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationProjects {
    organization: Option<ProjectsHolder>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectsHolder {
    projects_v2: Nodes<ProjectRef>,
}

#[derive(Debug, Deserialize)]
struct FieldsNode {
    node: Option<FieldsHolder>,
}

#[derive(Debug, Deserialize)]
struct FieldsHolder {
    fields: Option<Nodes<RawField>>,
}

/// Field node; iteration fields and others come back as empty objects.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    id: Option<String>,
    name: Option<String>,
    data_type: Option<String>,
    #[serde(default)]
    options: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct IssueItemsNode {
    node: Option<IssueItemsHolder>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueItemsHolder {
    project_items: Option<Nodes<ProjectItem>>,
}

#[derive(Debug, Deserialize)]
struct ProjectItem {
    id: String,
    project: IdOnly,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemResponse {
    add_project_v2_item_by_id: AddItemPayload,
}

#[derive(Debug, Deserialize)]
struct AddItemPayload {
    item: IdOnly,
}

#[async_trait::async_trait]
impl ProjectClient for OctocrabClient {
    async fn find_project(&self, org: &str, title: &str) -> Result<Option<ProjectRef>> {
        let data: OrganizationProjects = self
            .graphql(FIND_PROJECT_QUERY, json!({ "org": org, "title": title }))
            .await?;
        let project = data
            .organization
            .into_iter()
            .flat_map(|o| o.projects_v2.nodes)
            .find(|p| p.title == title);
        tracing::debug!(org, title, found = project.is_some(), "project lookup");
        Ok(project)
    }

    async fn project_fields(&self, project_id: &str) -> Result<Vec<ProjectField>> {
        let data: FieldsNode = self
            .graphql(PROJECT_FIELDS_QUERY, json!({ "projectId": project_id }))
            .await?;
        let fields = data
            .node
            .and_then(|n| n.fields)
            .map(|f| f.nodes)
            .unwrap_or_default();
        Ok(fields
            .into_iter()
            .filter_map(|raw| {
                Some(ProjectField {
                    id: raw.id?,
                    name: raw.name?,
                    data_type: raw.data_type.unwrap_or_default(),
                    options: raw.options.into_iter().map(|o| (o.id, o.name)).collect(),
                })
            })
            .collect())
    }

    async fn project_item_id(
        &self,
        project_id: &str,
        content_id: &str,
    ) -> Result<Option<String>> {
        let data: IssueItemsNode = self
            .graphql(ISSUE_PROJECT_ITEMS_QUERY, json!({ "contentId": content_id }))
            .await?;
        Ok(data
            .node
            .and_then(|n| n.project_items)
            .into_iter()
            .flat_map(|items| items.nodes)
            .find(|item| item.project.id == project_id)
            .map(|item| item.id))
    }

    async fn add_project_item(&self, project_id: &str, content_id: &str) -> Result<String> {
        let data: AddItemResponse = self
            .graphql(
                ADD_ITEM_MUTATION,
                json!({ "projectId": project_id, "contentId": content_id }),
            )
            .await?;
        Ok(data.add_project_v2_item_by_id.item.id)
    }

    async fn set_item_field(
        &self,
        project_id: &str,
        item_id: &str,
        field_id: &str,
        value: &FieldValue,
    ) -> Result<()> {
        let _: serde_json::Value = self
            .graphql(
                SET_FIELD_MUTATION,
                json!({
                    "projectId": project_id,
                    "itemId": item_id,
                    "fieldId": field_id,
                    "value": value.to_input(),
                }),
            )
            .await?;
        Ok(())
    }
}
