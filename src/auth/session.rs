//! The auth state machine: single owner of the current identity and the
//! only writer of the credential store. Transitions are strictly
//! serialized; at most one attempt is in flight and completions that have
//! been superseded discard themselves via a generation stamp. The lock is
//! never held across an await.

use crate::api::ForumApi;
use crate::auth::store::CredentialStore;
use crate::auth::types::{AuthState, Identity, RegistrationOutcome};
use crate::auth::validator::{self, Validation};
use crate::error::{Error, Result};
use regex::Regex;
use secrecy::SecretString;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Client-side guard for the institutional email namespace. UX only; the
/// server remains the authority on acceptance.
#[derive(Clone, Debug)]
pub struct EmailDomain {
    domain: String,
    pattern: Regex,
}

impl EmailDomain {
    /// # Errors
    /// Returns an error if `domain` cannot be compiled into an address
    /// pattern.
    pub fn new(domain: &str) -> Result<Self> {
        let domain = domain.trim().trim_start_matches('@').to_string();
        let pattern = Regex::new(&format!(r"(?i)^[^@\s]+@{}$", regex::escape(&domain)))
            .map_err(|err| Error::Config(format!("invalid email domain: {err}")))?;

        Ok(Self { domain, pattern })
    }

    /// # Errors
    /// Returns `InvalidEmailDomain` when the address is outside the
    /// namespace.
    pub fn check(&self, email: &str) -> Result<()> {
        if self.pattern.is_match(email.trim()) {
            Ok(())
        } else {
            Err(Error::InvalidEmailDomain(self.domain.clone()))
        }
    }
}

/// Outcome of resuming a stored session at application start (or of an
/// explicit mid-session revalidation).
#[derive(Clone, Debug, PartialEq)]
pub enum Resumed {
    /// No credential was stored.
    Anonymous,
    /// The credential was accepted and the identity re-derived.
    Authenticated(Identity),
    /// The authority rejected the credential; the store was cleared. The
    /// caller should surface a one-time notice.
    Expired,
    /// Validation was inconclusive; prior state and credential untouched.
    Inconclusive,
}

pub struct AuthSession {
    api: ForumApi,
    store: CredentialStore,
    domain: EmailDomain,
    inner: Mutex<Inner>,
}

struct Inner {
    state: AuthState,
    generation: u64,
    in_flight: bool,
}

impl AuthSession {
    #[must_use]
    pub fn new(api: ForumApi, store: CredentialStore, domain: EmailDomain) -> Self {
        Self {
            api,
            store,
            domain,
            inner: Mutex::new(Inner {
                state: AuthState::Anonymous,
                generation: 0,
                in_flight: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.lock().state.clone()
    }

    /// Snapshot of the current identity, if authenticated.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.lock().state.identity().cloned()
    }

    /// Claims the single in-flight slot and stamps the attempt. Rejects
    /// when another attempt is pending or the state disallows a new one.
    fn begin(&self) -> Result<(u64, AuthState)> {
        let mut inner = self.lock();
        if inner.in_flight {
            return Err(Error::AttemptInProgress);
        }
        match inner.state {
            AuthState::Authenticated(_) => return Err(Error::SessionActive),
            AuthState::Authenticating => return Err(Error::AttemptInProgress),
            AuthState::Anonymous | AuthState::PendingVerification(_) => {}
        }

        inner.in_flight = true;
        inner.generation += 1;
        Ok((inner.generation, inner.state.clone()))
    }

    /// Releases the in-flight slot and, unless the attempt was superseded
    /// by a later session change, installs the new state.
    fn settle<T>(&self, generation: u64, state: AuthState, result: Result<T>) -> Result<T> {
        let mut inner = self.lock();
        inner.in_flight = false;
        if inner.generation != generation {
            debug!("discarding stale attempt result");
            return Err(Error::Aborted);
        }
        inner.state = state;
        result
    }

    /// Signs in and persists the returned credential. On any failure the
    /// state reverts to `Anonymous` with a distinguishable error kind.
    ///
    /// # Errors
    /// `InvalidEmailDomain` before any network call, `InvalidCredentials`,
    /// `EmailUnverified`, `Transport`, `SessionActive`, or
    /// `AttemptInProgress`.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Identity> {
        self.domain.check(email)?;

        let (generation, _prior) = self.begin()?;
        {
            let mut inner = self.lock();
            if inner.generation == generation {
                inner.state = AuthState::Authenticating;
            }
        }

        let outcome = self.api.login(email, password).await;

        let mut inner = self.lock();
        inner.in_flight = false;
        if inner.generation != generation {
            debug!("discarding stale login result");
            return Err(Error::Aborted);
        }

        match outcome {
            Ok(response) => match Identity::from_account(response.user) {
                Ok(identity) => {
                    let token = SecretString::from(response.token);
                    // Credential first, then state: no reader may ever see
                    // "authenticated" without a stored credential.
                    if let Err(err) = self.store.save(&token) {
                        inner.state = AuthState::Anonymous;
                        return Err(err);
                    }
                    inner.state = AuthState::Authenticated(identity.clone());
                    Ok(identity)
                }
                Err(err) => {
                    inner.state = AuthState::Anonymous;
                    Err(err)
                }
            },
            Err(err) => {
                inner.state = AuthState::Anonymous;
                Err(err)
            }
        }
    }

    /// Registers a new account. Success parks the session in
    /// `PendingVerification`; no credential is written until the user
    /// verifies and signs in explicitly.
    ///
    /// # Errors
    /// `InvalidEmailDomain`, `DuplicateRegistration`, `Transport`,
    /// `SessionActive`, or `AttemptInProgress`.
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
        name: &str,
    ) -> Result<RegistrationOutcome> {
        self.domain.check(email)?;

        let (generation, _prior) = self.begin()?;
        let response = self.api.register(email, password, name).await;

        match response {
            Ok(response) => {
                let outcome = RegistrationOutcome {
                    message: response.message,
                    verify_token: response.verify_token,
                };
                self.settle(
                    generation,
                    AuthState::PendingVerification(outcome.clone()),
                    Ok(outcome),
                )
            }
            Err(err) => self.settle(generation, AuthState::Anonymous, Err(err)),
        }
    }

    /// Confirms an email address. Success lands in `Anonymous`:
    /// verification never implicitly authenticates, the user signs in
    /// explicitly afterwards. Allowed from `Anonymous` too, so a fresh
    /// process can verify a token issued in an earlier run.
    ///
    /// # Errors
    /// `InvalidVerification`, `Transport`, `SessionActive`, or
    /// `AttemptInProgress`. Failure keeps the pending registration so the
    /// token entry can be retried.
    pub async fn verify_email(&self, token: &str) -> Result<String> {
        let (generation, prior) = self.begin()?;
        let response = self.api.verify_email(token).await;

        match response {
            Ok(response) => self.settle(generation, AuthState::Anonymous, Ok(response.message)),
            Err(err) => self.settle(generation, prior, Err(err)),
        }
    }

    /// Signs out. The credential store is cleared synchronously before the
    /// state changes, under the same lock, so no reader can observe "no
    /// credential, still authenticated". Also invalidates any in-flight
    /// attempt.
    ///
    /// # Errors
    /// Returns an error if the credential file cannot be removed; the
    /// session state is left untouched in that case.
    pub fn logout(&self) -> Result<()> {
        let mut inner = self.lock();
        self.store.clear()?;
        inner.generation += 1;
        inner.state = AuthState::Anonymous;
        Ok(())
    }

    /// Re-establishes a session from the stored credential. This is the
    /// application-start path, and also re-checks an already-authenticated
    /// session: explicit rejection demotes to `Anonymous` and clears the
    /// store, while an inconclusive validation leaves prior state and
    /// credential exactly as they were.
    ///
    /// # Errors
    /// `AttemptInProgress` when another attempt is pending, `Storage` on
    /// credential file failures.
    pub async fn resume(&self) -> Result<Resumed> {
        let (generation, prior) = {
            let mut inner = self.lock();
            if inner.in_flight {
                return Err(Error::AttemptInProgress);
            }
            inner.in_flight = true;
            inner.generation += 1;
            (inner.generation, inner.state.clone())
        };

        let token = match self.store.load() {
            Ok(Some(token)) => token,
            Ok(None) => return self.settle(generation, AuthState::Anonymous, Ok(Resumed::Anonymous)),
            Err(err) => return self.settle(generation, prior, Err(err)),
        };

        // A cold start surfaces the in-between state while the stored
        // credential is being re-checked.
        if matches!(prior, AuthState::Anonymous) {
            let mut inner = self.lock();
            if inner.generation == generation {
                inner.state = AuthState::Authenticating;
            }
        }

        match validator::validate(&self.api, &token).await {
            Validation::Rejected => match self.store.clear() {
                Ok(()) => self.settle(generation, AuthState::Anonymous, Ok(Resumed::Expired)),
                Err(err) => self.settle(generation, prior, Err(err)),
            },
            Validation::Inconclusive => {
                self.settle(generation, prior, Ok(Resumed::Inconclusive))
            }
            Validation::Accepted => match self.api.me(&token).await {
                Ok(account) => match Identity::from_account(account) {
                    Ok(identity) => self.settle(
                        generation,
                        AuthState::Authenticated(identity.clone()),
                        Ok(Resumed::Authenticated(identity)),
                    ),
                    Err(err) => self.settle(generation, prior, Err(err)),
                },
                Err(Error::SessionExpired) => match self.store.clear() {
                    Ok(()) => self.settle(generation, AuthState::Anonymous, Ok(Resumed::Expired)),
                    Err(err) => self.settle(generation, prior, Err(err)),
                },
                Err(err) => {
                    warn!("profile fetch failed after validation: {err}");
                    self.settle(generation, prior, Ok(Resumed::Inconclusive))
                }
            },
        }
    }
}
