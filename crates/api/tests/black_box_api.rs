use lexicon_api::config::ApiConfig;
use reqwest::StatusCode;
use serde_json::{Value, json};

const SIGNING_KEY: &str = "test-signing-key";
const PASSWORD: &str = "correct horse battery";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = lexicon_api::app::build_app(&ApiConfig::new(SIGNING_KEY, "lexicon-test")).expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}/api/v1", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn register(&self, email: &str) -> String {
        let res = self
            .client
            .post(self.url("/users/register"))
            .json(&json!({ "email": email, "name": "Test User", "password": PASSWORD }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url("/auth/token"))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    async fn login(&self, email: &str) -> String {
        let res = self
            .token_request(&[("grant_type", "password"), ("username", email), ("password", PASSWORD)])
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn create_project(&self, token: &str, name: &str) -> String {
        let res = self
            .client
            .post(self.url("/projects"))
            .bearer_auth(token)
            .json(&json!({ "name": name }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }

    async fn assign(&self, token: &str, project: &str, email: &str, role: &str) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/projects/{project}/users")))
            .bearer_auth(token)
            .json(&json!({ "projectId": project, "email": email, "role": role }))
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn ping_is_public_and_responses_carry_hsts() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/ping")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["strict-transport-security"],
        "max-age=63072000; includeSubDomains"
    );

    let res = srv.client.get(srv.url("/users/self")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key("strict-transport-security"));
}

#[tokio::test]
async fn password_grant_issues_an_uncacheable_bearer_token() {
    let srv = TestServer::spawn().await;
    srv.register("alice@example.com").await;

    let res = srv
        .token_request(&[
            ("grant_type", "password"),
            ("username", "alice@example.com"),
            ("password", PASSWORD),
        ])
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["cache-control"], "no-store");
    assert_eq!(res.headers()["pragma"], "no-cache");

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 86400);

    let token = body["access_token"].as_str().unwrap();
    let res = srv.get(token, "/users/self").await;
    assert_eq!(res.status(), StatusCode::OK);
    let me: Value = res.json().await.unwrap();
    assert_eq!(me["email"], "alice@example.com");
}

#[tokio::test]
async fn wrong_password_and_unknown_email_are_indistinguishable() {
    let srv = TestServer::spawn().await;
    srv.register("alice@example.com").await;

    let wrong_password = srv
        .token_request(&[
            ("grant_type", "password"),
            ("username", "alice@example.com"),
            ("password", "not the password"),
        ])
        .await;
    let unknown_email = srv
        .token_request(&[
            ("grant_type", "password"),
            ("username", "nobody@example.com"),
            ("password", PASSWORD),
        ])
        .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.text().await.unwrap(),
        unknown_email.text().await.unwrap()
    );
}

#[tokio::test]
async fn malformed_token_requests_are_rejected_before_credentials() {
    let srv = TestServer::spawn().await;

    let res = srv.token_request(&[("grant_type", "authorization_code")]).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv.token_request(&[("username", "alice@example.com")]).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .token_request(&[("grant_type", "password"), ("username", "alice@example.com")])
        .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = srv.token_request(&[("grant_type", "client_credentials"), ("client_id", "abc")]).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn bearer_scheme_is_case_insensitive_and_garbage_is_rejected() {
    let srv = TestServer::spawn().await;
    srv.register("alice@example.com").await;
    let token = srv.login("alice@example.com").await;

    let res = srv
        .client
        .get(srv.url("/users/self"))
        .header("authorization", format!("bearer {token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    for header in ["Bearer not.a.token", "Basic abc", "Bearer ", "Bearer"] {
        let res = srv
            .client
            .get(srv.url("/users/self"))
            .header("authorization", header)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{header}");
    }
}

#[tokio::test]
async fn viewer_can_read_but_not_administer() {
    let srv = TestServer::spawn().await;
    srv.register("owner@example.com").await;
    srv.register("viewer@example.com").await;
    srv.register("outsider@example.com").await;

    let owner = srv.login("owner@example.com").await;
    let project = srv.create_project(&owner, "Website").await;
    let res = srv.assign(&owner, &project, "viewer@example.com", "viewer").await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let viewer = srv.login("viewer@example.com").await;
    let res = srv.get(&viewer, &format!("/projects/{project}")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Website");

    let res = srv
        .client
        .delete(srv.url(&format!("/projects/{project}")))
        .bearer_auth(&viewer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv.get(&viewer, &format!("/projects/{project}/users")).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let outsider = srv.login("outsider@example.com").await;
    let res = srv.get(&outsider, &format!("/projects/{project}")).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Owner lists members without seeing itself.
    let res = srv.get(&owner, &format!("/projects/{project}/users")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let members: Value = res.json().await.unwrap();
    assert_eq!(members.as_array().unwrap().len(), 1);
    assert_eq!(members[0]["email"], "viewer@example.com");
}

#[tokio::test]
async fn owners_cannot_edit_their_own_membership_or_cross_projects() {
    let srv = TestServer::spawn().await;
    let owner_id = srv.register("owner@example.com").await;
    srv.register("bob@example.com").await;

    let owner = srv.login("owner@example.com").await;
    let project = srv.create_project(&owner, "Website").await;
    let other = srv.create_project(&owner, "Mobile").await;

    let res = srv
        .client
        .patch(srv.url(&format!("/projects/{project}/users/{owner_id}/role")))
        .bearer_auth(&owner)
        .json(&json!({ "role": "viewer" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .delete(srv.url(&format!("/projects/{project}/users/{owner_id}")))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Payload names a different project than the authorized path.
    let res = srv
        .client
        .post(srv.url(&format!("/projects/{project}/users")))
        .bearer_auth(&owner)
        .json(&json!({ "projectId": other, "email": "bob@example.com", "role": "editor" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv.assign(&owner, &project, "bob@example.com", "editor").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let res = srv.assign(&owner, &project, "bob@example.com", "viewer").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn client_credentials_are_scoped_to_one_project_and_rotatable() {
    let srv = TestServer::spawn().await;
    srv.register("owner@example.com").await;
    let owner = srv.login("owner@example.com").await;
    let project = srv.create_project(&owner, "Website").await;
    let other = srv.create_project(&owner, "Mobile").await;

    let res = srv
        .client
        .post(srv.url(&format!("/projects/{project}/clients")))
        .bearer_auth(&owner)
        .json(&json!({ "name": "ci" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let client: Value = res.json().await.unwrap();
    let client_id = client["clientId"].as_str().unwrap().to_string();
    let old_secret = client["secret"].as_str().unwrap().to_string();
    assert_eq!(old_secret.len(), 43);

    let res = srv
        .token_request(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", old_secret.as_str()),
        ])
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let client_token = body["access_token"].as_str().unwrap().to_string();

    assert_eq!(srv.get(&client_token, &format!("/projects/{project}")).await.status(), StatusCode::OK);
    assert_eq!(srv.get(&client_token, &format!("/projects/{other}")).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        srv.get(&client_token, &format!("/projects/{project}/clients")).await.status(),
        StatusCode::FORBIDDEN
    );

    let res = srv
        .client
        .post(srv.url("/projects"))
        .bearer_auth(&client_token)
        .json(&json!({ "name": "Nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .patch(srv.url(&format!("/projects/{project}/clients/{client_id}/resetSecret")))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let rotated: Value = res.json().await.unwrap();
    let new_secret = rotated["secret"].as_str().unwrap().to_string();
    assert_ne!(new_secret, old_secret);

    let res = srv
        .token_request(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", old_secret.as_str()),
        ])
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .token_request(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", new_secret.as_str()),
        ])
        .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn introspection_reports_liveness() {
    let srv = TestServer::spawn().await;
    let user_id = srv.register("alice@example.com").await;
    let token = srv.login("alice@example.com").await;

    let res = srv
        .client
        .post(srv.url("/auth/introspect"))
        .form(&[("token", token.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["active"], true);
    assert_eq!(body["sub"], user_id);
    assert_eq!(body["subType"], "user");
    assert_eq!(body["iss"], "lexicon-test");

    let res = srv
        .client
        .post(srv.url("/auth/introspect"))
        .form(&[("token", "garbage")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "active": false }));

    let res = srv
        .client
        .post(srv.url("/auth/introspect"))
        .form(&[("other", "x")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_json_mutation_bodies_are_unsupported() {
    let srv = TestServer::spawn().await;
    srv.register("alice@example.com").await;
    let token = srv.login("alice@example.com").await;

    let res = srv
        .client
        .post(srv.url("/projects"))
        .bearer_auth(&token)
        .header("content-type", "text/plain")
        .body("name=Website")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unsupported_media_type");
}

#[tokio::test]
async fn self_view_can_include_roles_or_grants() {
    let srv = TestServer::spawn().await;
    srv.register("owner@example.com").await;
    srv.register("viewer@example.com").await;
    let owner = srv.login("owner@example.com").await;
    let project = srv.create_project(&owner, "Website").await;
    srv.assign(&owner, &project, "viewer@example.com", "viewer").await;
    let viewer = srv.login("viewer@example.com").await;

    let plain: Value = srv.get(&viewer, "/users/self").await.json().await.unwrap();
    assert!(plain.get("projectRoles").is_none());
    assert!(plain.get("projectGrants").is_none());

    let roles: Value = srv
        .get(&viewer, "/users/self?include=projectRoles")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(roles["projectRoles"], json!({ project.clone(): "viewer" }));
    assert!(roles.get("projectGrants").is_none());

    let grants: Value = srv
        .get(&viewer, "/users/self?include=projectGrants")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(
        grants["projectGrants"],
        json!({ project.clone(): ["canViewProject", "canViewLocales", "canExportLocales"] })
    );

    let owner_grants: Value = srv
        .get(&owner, "/users/self?include=projectGrants")
        .await
        .json()
        .await
        .unwrap();
    let owner_caps = owner_grants["projectGrants"][&project].as_array().unwrap();
    assert_eq!(owner_caps.len(), 13);
    assert!(owner_caps.iter().any(|c| c == "canManageAPIClients"));
}

#[tokio::test]
async fn password_change_requires_the_old_password_and_the_callers_own_id() {
    let srv = TestServer::spawn().await;
    let alice_id = srv.register("alice@example.com").await;
    let bob_id = srv.register("bob@example.com").await;
    let alice = srv.login("alice@example.com").await;
    let new_password = "a brand new passphrase";

    let change = |user_id: String, old: &'static str| {
        srv.client
            .patch(srv.url("/users/self/password"))
            .bearer_auth(&alice)
            .json(&json!({ "userId": user_id, "oldPassword": old, "newPassword": new_password }))
            .send()
    };

    let res = change(alice_id.clone(), "not the password").await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = change(bob_id, PASSWORD).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = change(alice_id.clone(), PASSWORD).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["id"], alice_id);
    assert!(body.get("password_hash").is_none());

    let res = srv
        .token_request(&[
            ("grant_type", "password"),
            ("username", "alice@example.com"),
            ("password", PASSWORD),
        ])
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .token_request(&[
            ("grant_type", "password"),
            ("username", "alice@example.com"),
            ("password", new_password),
        ])
        .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn name_and_email_changes_apply_only_to_the_caller() {
    let srv = TestServer::spawn().await;
    let alice_id = srv.register("alice@example.com").await;
    let bob_id = srv.register("bob@example.com").await;
    let alice = srv.login("alice@example.com").await;

    let res = srv
        .client
        .patch(srv.url("/users/self/name"))
        .bearer_auth(&alice)
        .json(&json!({ "userId": bob_id, "name": "Mallory" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .patch(srv.url("/users/self/name"))
        .bearer_auth(&alice)
        .json(&json!({ "userId": alice_id, "name": "Alice Liddell" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Alice Liddell");

    let res = srv
        .client
        .patch(srv.url("/users/self/email"))
        .bearer_auth(&alice)
        .json(&json!({ "userId": alice_id, "email": "bob@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = srv
        .client
        .patch(srv.url("/users/self/email"))
        .bearer_auth(&alice)
        .json(&json!({ "userId": alice_id, "email": "alice@wonderland.example" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    srv.login("alice@wonderland.example").await;
}
