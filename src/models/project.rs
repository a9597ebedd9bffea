//! Project model and trait implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::KonduktoClient;
use crate::error::{KdtError, Result};
use crate::models::label::Label;
use crate::models::team::Team;
use crate::pagination::{Page, PaginationParams};
use crate::traits::{Create, Get, List, Update};

/// A Kondukto project.
///
/// Projects group the scans of one application. The `id` is unique; the
/// `name` is only a convenience key and may be shared by projects linked to
/// different ALM tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,

    pub name: String,

    /// Default branch scanned when no branch is given.
    #[serde(default)]
    pub default_branch: Option<String>,

    /// Owning team.
    #[serde(default)]
    pub team: Option<Team>,

    #[serde(default)]
    pub labels: Vec<Label>,

    /// ALM tool the project is linked to (e.g. "github", "gitlab").
    #[serde(default)]
    pub alm_tool: Option<String>,

    #[serde(default)]
    pub links: Option<ProjectLinks>,
}

/// Links returned alongside a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectLinks {
    /// Project page in the Kondukto UI.
    #[serde(default)]
    pub html: Option<String>,
}

impl Project {
    /// Link to the project in the Kondukto UI.
    pub fn ui_link(&self) -> Option<&str> {
        self.links.as_ref().and_then(|l| l.html.as_deref())
    }

    /// Label names, in server order.
    pub fn label_names(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.name.as_str()).collect()
    }

    /// List every project matching `query`.
    ///
    /// Returns an empty list when nothing matches.
    pub async fn list(client: &KonduktoClient, query: &ProjectListQuery) -> Result<Vec<Self>> {
        Self::list_all(client, query).await
    }

    /// Find a project by its exact, case-sensitive name.
    ///
    /// The server filters by substring, so results are narrowed to exact
    /// matches here. When several projects share the name, the first one in
    /// server order is returned and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns [`KdtError::NotFound`] if no project has exactly this name.
    #[tracing::instrument(skip(client))]
    pub async fn find_by_name(client: &KonduktoClient, name: &str) -> Result<Self> {
        let query = ProjectListQuery {
            name: Some(name.to_string()),
            alm: None,
        };
        let projects = Self::list(client, &query).await?;
        pick_by_name(projects, name)
    }

    /// Fetch the scans of this project.
    pub async fn scans(&self, client: &KonduktoClient) -> Result<Vec<crate::models::scan::Scan>> {
        crate::models::scan::Scan::list_for_project(client, &self.id).await
    }
}

/// Select the exact match for `name` out of a substring search result.
pub(crate) fn pick_by_name(projects: Vec<Project>, name: &str) -> Result<Project> {
    let mut matches = projects.into_iter().filter(|p| p.name == name);

    let first = matches.next().ok_or_else(|| KdtError::NotFound {
        entity_type: "Project",
        id: name.to_string(),
    })?;

    let others: Vec<String> = matches.map(|p| p.id).collect();
    if !others.is_empty() {
        tracing::warn!(
            project = name,
            chosen = %first.id,
            ignored = ?others,
            "project name is ambiguous, using the first match"
        );
    }

    Ok(first)
}

/// Query parameters for listing projects.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectListQuery {
    /// Filter by project name (partial match).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Filter by ALM tool identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alm: Option<String>,
}

/// Repository a new project is linked to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSource {
    /// ALM tool (e.g. "github", "gitlab", "none").
    pub tool: String,

    /// Repository URL or identifier on the ALM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Parameters for creating a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectCreateParams {
    pub name: String,

    pub source: ProjectSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
}

/// Parameters for updating a project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,

    /// Replaces the label set when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<Label>>,
}

/// API response wrapper for listing projects.
#[derive(Debug, Deserialize)]
struct ProjectListResponse {
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    total: Option<u64>,
}

#[async_trait]
impl Get for Project {
    type Id = String;

    #[tracing::instrument(skip(client))]
    async fn get(client: &KonduktoClient, id: String) -> Result<Self> {
        let path = format!("api/v2/projects/{}", urlencoding::encode(&id));

        let response = client.get(&path).await?;
        KonduktoClient::json(response).await
    }
}

#[async_trait]
impl List for Project {
    type Query = ProjectListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &KonduktoClient,
        query: &Self::Query,
        start: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        #[derive(Serialize)]
        struct RequestParams<'a> {
            #[serde(flatten)]
            query: &'a ProjectListQuery,
            #[serde(flatten)]
            page: PaginationParams,
        }

        let params = RequestParams {
            query,
            page: PaginationParams::at(start, limit),
        };

        let response = client.get_with_query("api/v2/projects", &params).await?;
        let data: ProjectListResponse = KonduktoClient::json(response).await?;

        Ok(Page::new(data.projects, start, limit, data.total))
    }
}

#[async_trait]
impl Create for Project {
    type Params = ProjectCreateParams;

    #[tracing::instrument(skip(client, params), fields(name = %params.name))]
    async fn create(client: &KonduktoClient, params: &Self::Params) -> Result<Self> {
        if params.name.trim().is_empty() {
            return Err(KdtError::InvalidArgument(
                "project name must not be empty".to_string(),
            ));
        }

        let response = client.post("api/v2/projects", params).await?;
        KonduktoClient::json(response).await
    }
}

#[async_trait]
impl Update for Project {
    type Id = String;
    type Params = ProjectUpdateParams;

    #[tracing::instrument(skip(client))]
    async fn update(client: &KonduktoClient, id: String, params: Self::Params) -> Result<Self> {
        let path = format!("api/v2/projects/{}", urlencoding::encode(&id));

        let response = client.patch(&path, &params).await?;
        KonduktoClient::json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, name: &str) -> Project {
        serde_json::from_value(serde_json::json!({ "id": id, "name": name })).unwrap()
    }

    #[test]
    fn test_pick_by_name_requires_exact_match() {
        let projects = vec![project("1", "web-api"), project("2", "web")];
        let picked = pick_by_name(projects, "web").unwrap();
        assert_eq!(picked.id, "2");
    }

    #[test]
    fn test_pick_by_name_is_case_sensitive() {
        let err = pick_by_name(vec![project("1", "Web")], "web").unwrap_err();
        assert!(matches!(err, KdtError::NotFound { entity_type: "Project", .. }));
    }

    #[test]
    fn test_pick_by_name_takes_first_of_duplicates() {
        let projects = vec![project("gh-1", "foo"), project("gl-2", "foo")];
        assert_eq!(pick_by_name(projects, "foo").unwrap().id, "gh-1");
    }

    #[test]
    fn test_deserialize_full_project() {
        let p: Project = serde_json::from_value(serde_json::json!({
            "id": "6512ab",
            "name": "payments",
            "default_branch": "main",
            "team": { "id": "t1", "name": "appsec" },
            "labels": [{ "id": "l1", "name": "pci", "color": "#ff0000" }],
            "alm_tool": "github",
            "links": { "html": "https://kondukto.example.com/projects/6512ab" }
        }))
        .unwrap();

        assert_eq!(p.team.as_ref().map(|t| t.name.as_str()), Some("appsec"));
        assert_eq!(p.label_names(), vec!["pci"]);
        assert_eq!(
            p.ui_link(),
            Some("https://kondukto.example.com/projects/6512ab")
        );
    }

    #[test]
    fn test_update_params_skip_unset_fields() {
        let params = ProjectUpdateParams {
            default_branch: Some("develop".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({ "default_branch": "develop" }));
    }
}
