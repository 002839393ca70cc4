//! In-memory directory of users, projects, memberships and API clients.
//!
//! Implements the read-only collaborator traits of `lexicon-auth` and the
//! mutations the resource layer performs. Every multi-record change happens
//! under a single write lock, so readers never observe a half-applied update.
//!
//! # Invariants
//! - At most one membership per (project, user).
//! - A project always keeps at least one owner.
//! - A client belongs to exactly one project; its secret is replaced atomically.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use lexicon_auth::{ClientRecord, CredentialStore, MembershipLookup, Role, StoreError, UserRecord};
use lexicon_core::{ClientId, DomainError, DomainResult, ProjectId, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
}

/// A membership row joined with the member's public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUser {
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub role: Role,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectClient {
    pub client_id: ClientId,
    pub project_id: ProjectId,
    pub name: String,
    pub secret: String,
}

impl From<&ClientRecord> for ProjectClient {
    fn from(value: &ClientRecord) -> Self {
        Self {
            client_id: value.client_id.clone(),
            project_id: value.project_id.clone(),
            name: value.name.clone(),
            secret: value.secret.clone(),
        }
    }
}

#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewClient {
    pub project_id: ProjectId,
    pub name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Directory
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, UserRecord>,
    emails: HashMap<String, UserId>,
    projects: HashMap<ProjectId, Project>,
    memberships: HashMap<(ProjectId, UserId), Role>,
    clients: HashMap<ClientId, ClientRecord>,
}

impl State {
    fn owner_count(&self, project: &ProjectId) -> usize {
        self.memberships
            .iter()
            .filter(|((p, _), role)| p == project && **role == Role::Owner)
            .count()
    }

    fn ensure_project(&self, project: &ProjectId) -> DomainResult<()> {
        if self.projects.contains_key(project) {
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }

    fn project_user(&self, project: &ProjectId, user: &UserId, role: Role) -> ProjectUser {
        let (email, name) = self
            .users
            .get(user)
            .map(|u| (u.email.clone(), u.name.clone()))
            .unwrap_or_default();
        ProjectUser {
            project_id: project.clone(),
            user_id: user.clone(),
            role,
            email,
            name,
        }
    }

    fn client_in_project(&self, project: &ProjectId, client: &ClientId) -> DomainResult<&ClientRecord> {
        match self.clients.get(client) {
            Some(record) if &record.project_id == project => Ok(record),
            _ => Err(DomainError::NotFound),
        }
    }
}

/// In-memory directory for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<State>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9\-]+(\.[a-z0-9\-]+)*\.[a-z]{2,}$").ok());

/// Matches a normalized (lowercase, trimmed) address.
fn valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

fn validated_email(raw: &str) -> DomainResult<String> {
    let email = normalize_email(raw);
    if !valid_email(&email) {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(email)
}

fn validated_name(raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(name.to_string())
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, State>> {
        self.inner
            .read()
            .map_err(|_| DomainError::invariant("directory lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, State>> {
        self.inner
            .write()
            .map_err(|_| DomainError::invariant("directory lock poisoned"))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_user(&self, new: NewUser) -> DomainResult<UserRecord> {
        let email = validated_email(&new.email)?;
        let name = validated_name(&new.name)?;

        let mut state = self.write()?;
        if state.emails.contains_key(&email) {
            return Err(DomainError::conflict("email already registered"));
        }

        let record = UserRecord {
            id: UserId::new(),
            email: email.clone(),
            name,
            password_hash: new.password_hash,
        };
        state.emails.insert(email, record.id.clone());
        state.users.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    pub fn user(&self, id: &UserId) -> DomainResult<UserRecord> {
        self.read()?.users.get(id).cloned().ok_or(DomainError::NotFound)
    }

    pub fn update_user_name(&self, id: &UserId, name: &str) -> DomainResult<UserRecord> {
        let name = validated_name(name)?;
        let mut state = self.write()?;
        let user = state.users.get_mut(id).ok_or(DomainError::NotFound)?;
        user.name = name;
        Ok(user.clone())
    }

    /// Change the login email; the old address is released in the same step.
    pub fn update_user_email(&self, id: &UserId, email: &str) -> DomainResult<UserRecord> {
        let email = validated_email(email)?;
        let mut state = self.write()?;
        let current = state.users.get(id).ok_or(DomainError::NotFound)?.email.clone();
        if current == email {
            return cloned_user(&state, id);
        }
        if state.emails.contains_key(&email) {
            return Err(DomainError::conflict("email already registered"));
        }

        state.emails.remove(&current);
        state.emails.insert(email.clone(), id.clone());
        let user = state.users.get_mut(id).ok_or(DomainError::NotFound)?;
        user.email = email;
        Ok(user.clone())
    }

    pub fn update_user_password(&self, id: &UserId, password_hash: String) -> DomainResult<UserRecord> {
        let mut state = self.write()?;
        let user = state.users.get_mut(id).ok_or(DomainError::NotFound)?;
        user.password_hash = password_hash;
        Ok(user.clone())
    }

    pub fn user_by_email(&self, email: &str) -> DomainResult<UserRecord> {
        let state = self.read()?;
        state
            .emails
            .get(&normalize_email(email))
            .and_then(|id| state.users.get(id))
            .cloned()
            .ok_or(DomainError::NotFound)
    }

    /// Every membership the user holds, across projects.
    pub fn user_project_roles(&self, user: &UserId) -> DomainResult<Vec<ProjectUser>> {
        let state = self.read()?;
        let mut rows: Vec<ProjectUser> = state
            .memberships
            .iter()
            .filter(|((_, u), _)| u == user)
            .map(|((p, u), role)| state.project_user(p, u, *role))
            .collect();
        rows.sort_by(|a, b| a.project_id.cmp(&b.project_id));
        Ok(rows)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Projects
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a project and make `owner` its owner in one step.
    pub fn create_project(&self, owner: &UserId, new: NewProject) -> DomainResult<Project> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("project name cannot be empty"));
        }

        let mut state = self.write()?;
        if !state.users.contains_key(owner) {
            return Err(DomainError::NotFound);
        }

        let project = Project {
            id: ProjectId::new(),
            name: name.to_string(),
        };
        state.projects.insert(project.id.clone(), project.clone());
        state
            .memberships
            .insert((project.id.clone(), owner.clone()), Role::Owner);

        tracing::info!(project_id = %project.id, owner = %owner, "project created");
        Ok(project)
    }

    pub fn project(&self, id: &ProjectId) -> DomainResult<Project> {
        self.read()?.projects.get(id).cloned().ok_or(DomainError::NotFound)
    }

    pub fn user_projects(&self, user: &UserId) -> DomainResult<Vec<Project>> {
        let state = self.read()?;
        let mut projects: Vec<Project> = state
            .memberships
            .keys()
            .filter(|(_, u)| u == user)
            .filter_map(|(p, _)| state.projects.get(p).cloned())
            .collect();
        projects.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(projects)
    }

    pub fn rename_project(&self, id: &ProjectId, name: &str) -> DomainResult<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("project name cannot be empty"));
        }
        let mut state = self.write()?;
        let project = state.projects.get_mut(id).ok_or(DomainError::NotFound)?;
        project.name = name.to_string();
        Ok(project.clone())
    }

    /// Remove a project together with its memberships and clients.
    pub fn delete_project(&self, id: &ProjectId) -> DomainResult<()> {
        let mut state = self.write()?;
        state.projects.remove(id).ok_or(DomainError::NotFound)?;
        state.memberships.retain(|(p, _), _| p != id);
        state.clients.retain(|_, c| &c.project_id != id);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Memberships
    // ─────────────────────────────────────────────────────────────────────────

    pub fn project_users(&self, project: &ProjectId) -> DomainResult<Vec<ProjectUser>> {
        let state = self.read()?;
        state.ensure_project(project)?;
        let mut rows: Vec<ProjectUser> = state
            .memberships
            .iter()
            .filter(|((p, _), _)| p == project)
            .map(|((p, u), role)| state.project_user(p, u, *role))
            .collect();
        rows.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(rows)
    }

    pub fn assign_project_user(&self, project: &ProjectId, user: &UserId, role: Role) -> DomainResult<ProjectUser> {
        let mut state = self.write()?;
        state.ensure_project(project)?;
        if !state.users.contains_key(user) {
            return Err(DomainError::NotFound);
        }

        let key = (project.clone(), user.clone());
        if state.memberships.contains_key(&key) {
            return Err(DomainError::conflict("user already has a role on this project"));
        }
        state.memberships.insert(key, role);
        Ok(state.project_user(project, user, role))
    }

    pub fn update_project_user_role(
        &self,
        project: &ProjectId,
        user: &UserId,
        role: Role,
    ) -> DomainResult<ProjectUser> {
        let mut state = self.write()?;
        let key = (project.clone(), user.clone());
        let current = *state.memberships.get(&key).ok_or(DomainError::NotFound)?;

        if current == Role::Owner && role != Role::Owner && state.owner_count(project) <= 1 {
            return Err(DomainError::conflict("project must keep at least one owner"));
        }

        state.memberships.insert(key, role);
        Ok(state.project_user(project, user, role))
    }

    pub fn revoke_project_user(&self, project: &ProjectId, user: &UserId) -> DomainResult<()> {
        let mut state = self.write()?;
        let key = (project.clone(), user.clone());
        let current = *state.memberships.get(&key).ok_or(DomainError::NotFound)?;

        if current == Role::Owner && state.owner_count(project) <= 1 {
            return Err(DomainError::conflict("project must keep at least one owner"));
        }

        state.memberships.remove(&key);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API clients
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_client(&self, new: NewClient, secret: String) -> DomainResult<ProjectClient> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("client name cannot be empty"));
        }

        let mut state = self.write()?;
        state.ensure_project(&new.project_id)?;

        let record = ClientRecord {
            client_id: ClientId::new(),
            project_id: new.project_id,
            name: name.to_string(),
            secret,
        };
        let client = ProjectClient::from(&record);
        state.clients.insert(record.client_id.clone(), record);
        Ok(client)
    }

    pub fn project_clients(&self, project: &ProjectId) -> DomainResult<Vec<ProjectClient>> {
        let state = self.read()?;
        state.ensure_project(project)?;
        let mut clients: Vec<ProjectClient> = state
            .clients
            .values()
            .filter(|c| &c.project_id == project)
            .map(ProjectClient::from)
            .collect();
        clients.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        Ok(clients)
    }

    pub fn project_client(&self, project: &ProjectId, client: &ClientId) -> DomainResult<ProjectClient> {
        let state = self.read()?;
        state.client_in_project(project, client).map(ProjectClient::from)
    }

    pub fn rename_client(&self, project: &ProjectId, client: &ClientId, name: &str) -> DomainResult<ProjectClient> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("client name cannot be empty"));
        }
        let mut state = self.write()?;
        state.client_in_project(project, client)?;
        let record = state.clients.get_mut(client).ok_or(DomainError::NotFound)?;
        record.name = name.to_string();
        Ok(ProjectClient::from(&*record))
    }

    /// Replace the client's secret; the previous one stops working immediately.
    pub fn reset_client_secret(
        &self,
        project: &ProjectId,
        client: &ClientId,
        secret: String,
    ) -> DomainResult<ProjectClient> {
        let mut state = self.write()?;
        state.client_in_project(project, client)?;
        let record = state.clients.get_mut(client).ok_or(DomainError::NotFound)?;
        record.secret = secret;
        tracing::info!(client_id = %client, project_id = %project, "client secret regenerated");
        Ok(ProjectClient::from(&*record))
    }

    pub fn delete_client(&self, project: &ProjectId, client: &ClientId) -> DomainResult<()> {
        let mut state = self.write()?;
        state.client_in_project(project, client)?;
        state.clients.remove(client);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth collaborator traits
// ─────────────────────────────────────────────────────────────────────────────

fn cloned_user(state: &State, id: &UserId) -> DomainResult<UserRecord> {
    state.users.get(id).cloned().ok_or(DomainError::NotFound)
}

fn to_store_error(err: DomainError) -> StoreError {
    match err {
        DomainError::NotFound => StoreError::NotFound,
        other => StoreError::Unavailable(other.to_string()),
    }
}

#[async_trait]
impl CredentialStore for InMemoryDirectory {
    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, StoreError> {
        self.user_by_email(email).map_err(to_store_error)
    }

    async fn get_user_by_id(&self, id: &UserId) -> Result<UserRecord, StoreError> {
        self.user(id).map_err(to_store_error)
    }

    async fn find_client_by_id(&self, id: &ClientId) -> Result<ClientRecord, StoreError> {
        let state = self.read().map_err(to_store_error)?;
        state.clients.get(id).cloned().ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl MembershipLookup for InMemoryDirectory {
    async fn get_role(&self, project: &ProjectId, user: &UserId) -> Result<String, StoreError> {
        let state = self.read().map_err(to_store_error)?;
        state
            .memberships
            .get(&(project.clone(), user.clone()))
            .map(|role| role.as_str().to_string())
            .ok_or(StoreError::NotFound)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
