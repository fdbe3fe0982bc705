//! End-to-end session flows against a mocked forum service: sign-in,
//! registration and verification, resume-on-start, expiry, and the
//! transport-failure distinction.

use forumo::{
    guard, AuthSession, AuthState, CredentialStore, Decision, EmailDomain, Error, ForumApi,
    Resumed,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::net::TcpListener;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn store_in(dir: &TempDir) -> CredentialStore {
    CredentialStore::new(dir.path().join("token"))
}

fn session_for(server: &MockServer, dir: &TempDir) -> AuthSession {
    let api = ForumApi::new(&server.uri()).expect("Failed to build client");
    let domain = EmailDomain::new("student.gla.ac.uk").expect("Failed to build domain");
    AuthSession::new(api, store_in(dir), domain)
}

fn account_json() -> serde_json::Value {
    json!({
        "id": 1,
        "email": "a@student.gla.ac.uk",
        "name": "A",
        "role": {
            "id": 3,
            "name": "member",
            "color": "#808080",
            "permissions": {"can_create_threads": true, "can_reply": true}
        },
        "verified": true
    })
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({
            "email": "a@student.gla.ac.uk",
            "password": "password123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-abc",
            "user": account_json()
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_persists_credential_and_identity() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    mount_login(&server).await;

    let session = session_for(&server, &dir);
    let identity = session
        .login(
            "a@student.gla.ac.uk",
            &SecretString::from("password123".to_string()),
        )
        .await
        .expect("Failed to sign in");

    assert_eq!(identity.name, "A");
    assert_eq!(identity.role.name, "member");
    assert!(session.state().is_authenticated());

    let stored = store_in(&dir)
        .load()
        .expect("Failed to load")
        .expect("missing token");
    assert_eq!(stored.expose_secret(), "tok-abc");
}

#[tokio::test]
async fn failed_login_reverts_to_anonymous() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let session = session_for(&server, &dir);
    let result = session
        .login(
            "a@student.gla.ac.uk",
            &SecretString::from("wrong".to_string()),
        )
        .await;

    assert!(matches!(result, Err(Error::InvalidCredentials)));
    assert_eq!(session.state(), AuthState::Anonymous);
    assert!(store_in(&dir).load().expect("Failed to load").is_none());
}

#[tokio::test]
async fn domain_guard_rejects_without_network_call() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let session = session_for(&server, &dir);
    let result = session
        .login("a@gmail.com", &SecretString::from("password123".to_string()))
        .await;

    assert!(matches!(result, Err(Error::InvalidEmailDomain(_))));
    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn logout_clears_store_then_identity() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    mount_login(&server).await;

    let session = session_for(&server, &dir);
    session
        .login(
            "a@student.gla.ac.uk",
            &SecretString::from("password123".to_string()),
        )
        .await
        .expect("Failed to sign in");

    session.logout().expect("Failed to sign out");

    assert!(store_in(&dir).load().expect("Failed to load").is_none());
    assert!(session.identity().is_none());
    // With the identity gone, every gate behaves as if nobody is signed in.
    assert_eq!(
        guard(session.identity().as_ref(), Some(&["admin"])),
        Decision::PromptLogin
    );
    assert_eq!(guard(session.identity().as_ref(), None), Decision::PromptLogin);
}

#[tokio::test]
async fn second_login_is_rejected_while_first_is_in_flight() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": "tok-abc", "user": account_json()}))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let session = session_for(&server, &dir);
    let password = SecretString::from("password123".to_string());
    let (first, second) = tokio::join!(
        session.login("a@student.gla.ac.uk", &password),
        session.login("a@student.gla.ac.uk", &password)
    );

    let outcomes = [first.is_ok(), second.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    let rejected = if first.is_ok() { second } else { first };
    assert!(matches!(rejected, Err(Error::AttemptInProgress)));

    // Only one network call was made, and its result was applied once.
    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(session.state().is_authenticated());
}

#[tokio::test]
async fn resume_without_credential_is_anonymous() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let session = session_for(&server, &dir);
    let resumed = session.resume().await.expect("Failed to resume");

    assert_eq!(resumed, Resumed::Anonymous);
    assert_eq!(session.state(), AuthState::Anonymous);
}

#[tokio::test]
async fn resume_with_accepted_credential_rederives_identity() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    store_in(&dir)
        .save(&SecretString::from("tok-abc".to_string()))
        .expect("Failed to seed store");

    Mock::given(method("POST"))
        .and(path("/auth/validate"))
        .and(header("Authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("Authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_json()))
        .mount(&server)
        .await;

    let session = session_for(&server, &dir);
    let resumed = session.resume().await.expect("Failed to resume");

    match resumed {
        Resumed::Authenticated(identity) => {
            assert_eq!(identity.user_id, 1);
            assert_eq!(identity.role.name, "member");
        }
        other => panic!("expected authenticated resume, got {other:?}"),
    }
    assert!(session.state().is_authenticated());
}

#[tokio::test]
async fn rejected_credential_clears_store_even_when_authenticated() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    mount_login(&server).await;

    let session = session_for(&server, &dir);
    session
        .login(
            "a@student.gla.ac.uk",
            &SecretString::from("password123".to_string()),
        )
        .await
        .expect("Failed to sign in");

    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/auth/validate"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let resumed = session.resume().await.expect("Failed to resume");

    assert_eq!(resumed, Resumed::Expired);
    assert_eq!(session.state(), AuthState::Anonymous);
    assert!(store_in(&dir).load().expect("Failed to load").is_none());
}

#[tokio::test]
async fn transport_failure_leaves_state_and_credential_untouched() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    mount_login(&server).await;

    let session = session_for(&server, &dir);
    session
        .login(
            "a@student.gla.ac.uk",
            &SecretString::from("password123".to_string()),
        )
        .await
        .expect("Failed to sign in");

    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/auth/validate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let resumed = session.resume().await.expect("Failed to resume");

    assert_eq!(resumed, Resumed::Inconclusive);
    assert!(session.state().is_authenticated());
    let stored = store_in(&dir)
        .load()
        .expect("Failed to load")
        .expect("missing token");
    assert_eq!(stored.expose_secret(), "tok-abc");
}

#[tokio::test]
async fn register_verify_then_login() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(json!({
            "email": "a@student.gla.ac.uk",
            "password": "password123",
            "name": "A"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Registration successful! Please verify your email.",
            "verify_token": "tok-123"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/verify"))
        .and(body_json(json!({"token": "tok-123"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Email verified"})),
        )
        .mount(&server)
        .await;
    mount_login(&server).await;

    let session = session_for(&server, &dir);
    let password = SecretString::from("password123".to_string());

    let outcome = session
        .register("a@student.gla.ac.uk", &password, "A")
        .await
        .expect("Failed to register");
    assert_eq!(outcome.verify_token.as_deref(), Some("tok-123"));
    assert!(matches!(
        session.state(),
        AuthState::PendingVerification(pending) if pending.verify_token.as_deref() == Some("tok-123")
    ));
    // Registration alone never stores a credential.
    assert!(store_in(&dir).load().expect("Failed to load").is_none());

    let message = session
        .verify_email("tok-123")
        .await
        .expect("Failed to verify");
    assert_eq!(message, "Email verified");
    // Verification does not implicitly authenticate.
    assert_eq!(session.state(), AuthState::Anonymous);

    let identity = session
        .login("a@student.gla.ac.uk", &password)
        .await
        .expect("Failed to sign in");
    assert_eq!(identity.email, "a@student.gla.ac.uk");
    assert!(session.state().is_authenticated());
}

#[tokio::test]
async fn duplicate_registration_is_distinguishable() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": "Email already registered"})),
        )
        .mount(&server)
        .await;

    let session = session_for(&server, &dir);
    let result = session
        .register(
            "a@student.gla.ac.uk",
            &SecretString::from("password123".to_string()),
            "A",
        )
        .await;

    assert!(matches!(result, Err(Error::DuplicateRegistration)));
    assert_eq!(session.state(), AuthState::Anonymous);
}

#[tokio::test]
async fn login_while_authenticated_is_rejected() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    mount_login(&server).await;

    let session = session_for(&server, &dir);
    let password = SecretString::from("password123".to_string());
    session
        .login("a@student.gla.ac.uk", &password)
        .await
        .expect("Failed to sign in");

    let again = session.login("a@student.gla.ac.uk", &password).await;
    assert!(matches!(again, Err(Error::SessionActive)));
    assert!(session.state().is_authenticated());
}
