//! Mock server state management.
//!
//! Provides the in-memory data store for the mock Kondukto API server.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{Event, Label, Project, ProjectCreateParams, ReleaseStatus, Scan, Team};

/// Shared state for the mock server.
///
/// This struct holds all the mock data that the server will serve.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Projects in insertion order. Names may repeat.
    pub projects: Vec<Project>,

    /// Scans indexed by project id, newest first.
    pub scans: HashMap<String, Vec<Scan>>,

    /// Event snapshots the next restart of a scan walks through, indexed by
    /// scan id. The last snapshot repeats once the others are consumed.
    pub scripts: HashMap<String, Vec<Event>>,

    /// Snapshots still to be served, indexed by event id.
    pub events: HashMap<String, VecDeque<Event>>,

    /// Release statuses indexed by project id.
    pub releases: HashMap<String, ReleaseStatus>,

    pub teams: Vec<Team>,

    pub labels: Vec<Label>,

    /// Optional authentication token. If set, requests must carry it.
    pub required_token: Option<String>,

    next_id: u64,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add a project to the state.
    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.push(project);
        self
    }

    /// Add a scan to a project. Later scans are treated as newer.
    pub fn with_scan(mut self, project_id: &str, scan: Scan) -> Self {
        self.scans
            .entry(project_id.to_string())
            .or_default()
            .insert(0, scan);
        self
    }

    /// Script the event snapshots served after the scan is restarted.
    pub fn with_script(mut self, scan_id: &str, snapshots: Vec<Event>) -> Self {
        self.scripts.insert(scan_id.to_string(), snapshots);
        self
    }

    /// Set the release status of a project.
    pub fn with_release(mut self, project_id: &str, status: ReleaseStatus) -> Self {
        self.releases.insert(project_id.to_string(), status);
        self
    }

    pub fn with_team(mut self, team: Team) -> Self {
        self.teams.push(team);
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Set the required authentication token.
    pub fn with_required_token(mut self, token: &str) -> Self {
        self.required_token = Some(token.to_string());
        self
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    /// Get a project by id.
    pub fn get_project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// List projects, filtered by name substring and ALM tool.
    pub fn list_projects(&self, name: Option<&str>, alm: Option<&str>) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| {
                name.map(|n| p.name.to_lowercase().contains(&n.to_lowercase()))
                    .unwrap_or(true)
            })
            .filter(|p| {
                alm.map(|a| p.alm_tool.as_deref() == Some(a))
                    .unwrap_or(true)
            })
            .collect()
    }

    /// Create a project from client parameters and return it.
    pub fn create_project(&mut self, params: ProjectCreateParams) -> Project {
        let id = self.next_id("proj");
        let project = Project {
            links: None,
            id,
            name: params.name,
            default_branch: params.default_branch,
            team: params.team,
            labels: params.labels,
            alm_tool: Some(params.source.tool),
        };
        self.projects.push(project.clone());
        project
    }

    /// Update a project and return the updated version.
    pub fn update_project(
        &mut self,
        id: &str,
        name: Option<String>,
        default_branch: Option<String>,
        team: Option<Team>,
        labels: Option<Vec<Label>>,
    ) -> Option<&Project> {
        let project = self.projects.iter_mut().find(|p| p.id == id)?;
        if let Some(n) = name {
            project.name = n;
        }
        if let Some(b) = default_branch {
            project.default_branch = Some(b);
        }
        if let Some(t) = team {
            project.team = Some(t);
        }
        if let Some(l) = labels {
            project.labels = l;
        }
        Some(project)
    }

    /// Scans of a project, newest first.
    pub fn list_scans(&self, project_id: &str) -> Vec<&Scan> {
        self.scans
            .get(project_id)
            .map(|scans| scans.iter().collect())
            .unwrap_or_default()
    }

    /// Get a scan by id across all projects.
    pub fn get_scan(&self, id: &str) -> Option<&Scan> {
        self.scans.values().flatten().find(|s| s.id == id)
    }

    /// Start a run of a scan and return its event id.
    ///
    /// Without a script the run finishes on the second poll.
    pub fn restart_scan(&mut self, scan_id: &str) -> Option<String> {
        self.get_scan(scan_id)?;
        let event_id = self.next_id("ev");

        let script = self
            .scripts
            .get(scan_id)
            .cloned()
            .unwrap_or_else(|| vec![snapshot(1, 1, ""), snapshot(4, 0, "")]);

        let queue = script
            .into_iter()
            .map(|mut e| {
                e.id = event_id.clone();
                e.scan_id = scan_id.to_string();
                e
            })
            .collect();

        self.events.insert(event_id.clone(), queue);
        Some(event_id)
    }

    /// Serve the next snapshot of an event.
    pub fn poll_event(&mut self, event_id: &str) -> Option<Event> {
        let queue = self.events.get_mut(event_id)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }

    /// Release status of a project, "undefined" when none was set.
    pub fn release_status(&self, project_id: &str) -> ReleaseStatus {
        self.releases.get(project_id).cloned().unwrap_or_else(|| ReleaseStatus {
            status: "undefined".to_string(),
            ..Default::default()
        })
    }
}

/// Event snapshot with placeholder ids, filled in on restart.
pub fn snapshot(status: i32, active: i32, message: &str) -> Event {
    Event {
        id: String::new(),
        status,
        active,
        scan_id: String::new(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::Fixtures;

    #[test]
    fn test_state_keeps_duplicate_names_in_order() {
        let state = MockState::new()
            .with_project(Fixtures::project("p-1", "payments"))
            .with_project(Fixtures::project("p-2", "payments"))
            .with_project(Fixtures::project("p-3", "inventory"));

        let found = state.list_projects(Some("pay"), None);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, "p-1");
        assert_eq!(found[1].id, "p-2");
    }

    #[test]
    fn test_state_create_project_assigns_id() {
        let mut state = MockState::new();
        let project = state.create_project(ProjectCreateParams {
            name: "payments".to_string(),
            ..Default::default()
        });

        assert!(!project.id.is_empty());
        assert_eq!(state.get_project(&project.id).unwrap().name, "payments");
    }

    #[test]
    fn test_state_update_project() {
        let mut state = MockState::new().with_project(Fixtures::project("p-1", "old"));

        let updated = state
            .update_project(
                "p-1",
                Some("new".to_string()),
                None,
                Some(Team::named("appsec")),
                Some(vec![Label::named("pci")]),
            )
            .unwrap();

        assert_eq!(updated.name, "new");
        assert_eq!(updated.team.as_ref().unwrap().name, "appsec");
        assert_eq!(updated.labels.len(), 1);
    }

    #[test]
    fn test_state_scans_are_newest_first() {
        let state = MockState::new()
            .with_scan("p-1", Fixtures::scan("old", "semgrep", "main"))
            .with_scan("p-1", Fixtures::scan("new", "semgrep", "main"));

        let scans = state.list_scans("p-1");
        assert_eq!(scans[0].id, "new");
        assert_eq!(scans[1].id, "old");
    }

    #[test]
    fn test_state_event_script_repeats_last_snapshot() {
        let mut state = MockState::new()
            .with_scan("p-1", Fixtures::scan("s-1", "semgrep", "main"))
            .with_script("s-1", vec![snapshot(1, 1, ""), snapshot(4, 0, "")]);

        let event_id = state.restart_scan("s-1").unwrap();

        assert_eq!(state.poll_event(&event_id).unwrap().status, 1);
        assert_eq!(state.poll_event(&event_id).unwrap().status, 4);
        let last = state.poll_event(&event_id).unwrap();
        assert_eq!(last.status, 4);
        assert_eq!(last.scan_id, "s-1");
    }

    #[test]
    fn test_state_restart_unknown_scan() {
        let mut state = MockState::new();
        assert!(state.restart_scan("missing").is_none());
    }

    #[test]
    fn test_state_release_defaults_to_undefined() {
        let state = MockState::new();
        assert!(state.release_status("p-1").is_undefined());
    }
}
