use std::{sync::Arc, time::Duration};

use serde_json::Value;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    auth::{
        dto::{LoginForm, SignupForm},
        session::{Session, SessionStore},
        validate::validate_signup,
    },
    error::AuthError,
    records::{parse_age, Collection, LearningPace, RecordStore, UserRecord},
    ui::{Notice, Page, Redirect},
};

const DEFAULT_SOCIO_ECONOMIC_CONTEXT: &str = "middle_class";
const DEFAULT_MENTOR_PREFERENCE: &str = "adaptive";

/// Where a login or signup form currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
    Success,
    Error(String),
}

/// A completed login or signup.
#[derive(Debug, Clone)]
pub struct AuthSuccess {
    pub user: UserRecord,
    pub notice: Notice,
    pub redirect: Redirect,
}

/// Result of the page-load session check.
#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    pub user: Option<UserRecord>,
    pub redirect: Option<Redirect>,
}

/// Login, signup, session gate and logout over a record store and the
/// session store. Form state is published on a watch channel.
pub struct AuthWorkflow {
    records: Arc<dyn RecordStore>,
    sessions: SessionStore,
    login_latency: Duration,
    state: watch::Sender<FormState>,
}

impl AuthWorkflow {
    pub fn new(
        records: Arc<dyn RecordStore>,
        sessions: SessionStore,
        login_latency: Duration,
    ) -> Self {
        let (state, _) = watch::channel(FormState::Idle);
        Self {
            records,
            sessions,
            login_latency,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn login(&self, form: LoginForm) -> Result<AuthSuccess, AuthError> {
        self.state.send_replace(FormState::Submitting);
        let result = self.try_login(form).await;
        self.settle(result)
    }

    async fn try_login(&self, form: LoginForm) -> Result<AuthSuccess, AuthError> {
        if !self.login_latency.is_zero() {
            tokio::time::sleep(self.login_latency).await;
        }

        let row = self
            .records
            .list_records(Collection::Users)
            .await?
            .into_iter()
            .find(|row| row_email(row) == Some(form.email.as_str()))
            .ok_or_else(|| {
                warn!(email = %form.email, "login unknown email");
                AuthError::NotFound("User not found. Please sign up first.".into())
            })?;

        // No stored credential to compare against; presence is all that is checked.
        if form.password.is_empty() {
            return Err(AuthError::validation("Password is required"));
        }
        let user = read_user(row)?;

        let session = Session {
            token: self.sessions.generate_token(),
            user,
            remember_me: form.remember_me,
        };
        self.sessions.persist(&session)?;

        info!(email = %session.user.email, "user logged in");
        Ok(AuthSuccess {
            user: session.user,
            notice: Notice::success("Login successful! Welcome back."),
            redirect: Redirect::delayed(Page::Dashboard),
        })
    }

    pub async fn signup(&self, form: SignupForm) -> Result<AuthSuccess, AuthError> {
        if let Err(e) = validate_signup(&form) {
            debug!(error = %e, "signup form rejected");
            return self.settle(Err(e));
        }
        self.state.send_replace(FormState::Submitting);
        let result = self.try_signup(form).await;
        self.settle(result)
    }

    async fn try_signup(&self, form: SignupForm) -> Result<AuthSuccess, AuthError> {
        let existing = self.records.list_records(Collection::Users).await?;
        if existing.iter().any(|row| row_email(row) == Some(form.email.as_str())) {
            warn!(email = %form.email, "email already registered");
            return Err(AuthError::Conflict(
                "An account with this email already exists.".into(),
            ));
        }

        let profile_pic = form.profile_picture.as_ref().map(|p| p.to_data_uri());
        let new_user = new_user_record(&form, profile_pic)?;
        let body = serde_json::to_value(&new_user).map_err(|e| AuthError::Storage(e.to_string()))?;

        let stored = self.records.create_record(Collection::Users, body).await?;
        let user = read_user(stored)?;

        let session = Session {
            token: self.sessions.generate_token(),
            user,
            remember_me: false,
        };
        self.sessions.persist(&session)?;

        info!(email = %session.user.email, user_id = ?session.user.id, "user registered");
        Ok(AuthSuccess {
            user: session.user,
            notice: Notice::success(
                "Account created successfully! Welcome to NCVET AI Assistant.",
            ),
            redirect: Redirect::delayed(Page::Dashboard),
        })
    }

    /// Runs on page load. A corrupted session is wiped without telling the
    /// user; a valid one only redirects away from the auth page.
    pub fn check_session(&self, current: Page) -> GateOutcome {
        match self.sessions.load() {
            Ok(Some(session)) => {
                let redirect = (current == Page::Auth).then(|| Redirect::now(Page::Dashboard));
                GateOutcome {
                    user: Some(session.user),
                    redirect,
                }
            }
            Ok(None) => GateOutcome {
                user: None,
                redirect: None,
            },
            Err(e) => {
                if matches!(e, AuthError::CorruptSession(_)) {
                    warn!("clearing corrupted session");
                    if let Err(e) = self.sessions.clear_credentials() {
                        warn!(error = %e, "failed to clear corrupted session");
                    }
                } else {
                    warn!(error = %e, "session read failed");
                }
                GateOutcome {
                    user: None,
                    redirect: None,
                }
            }
        }
    }

    pub fn logout(&self) -> Redirect {
        if let Err(e) = self.sessions.clear() {
            warn!(error = %e, "session clear failed during logout");
        }
        self.state.send_replace(FormState::Idle);
        info!("user logged out");
        Redirect::now(Page::Landing)
    }

    /// Marks a form rejected before it reached `login` or `signup`.
    pub fn reject(&self, e: AuthError) -> AuthError {
        self.state.send_replace(FormState::Error(e.to_string()));
        e
    }

    fn settle(&self, result: Result<AuthSuccess, AuthError>) -> Result<AuthSuccess, AuthError> {
        let next = match &result {
            Ok(_) => FormState::Success,
            Err(e) => FormState::Error(e.to_string()),
        };
        self.state.send_replace(next);
        result
    }
}

/// Rows are matched on their raw `email`, whatever shape the rest is in.
fn row_email(row: &Value) -> Option<&str> {
    row.get("email").and_then(Value::as_str)
}

fn read_user(row: Value) -> Result<UserRecord, AuthError> {
    serde_json::from_value(row).map_err(|e| {
        warn!(error = %e, "user record is unreadable");
        AuthError::network()
    })
}

/// Personalisation fields stay at their defaults until onboarding fills them.
fn new_user_record(form: &SignupForm, profile_pic: Option<String>) -> Result<UserRecord, AuthError> {
    let created_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| AuthError::Storage(e.to_string()))?;
    Ok(UserRecord {
        id: None,
        email: form.email.clone(),
        full_name: format!("{} {}", form.first_name, form.last_name),
        age: parse_age(&form.age),
        location: form.state.clone(),
        education_level: form.education_level.clone(),
        profile_pic,
        current_skills: Vec::new(),
        career_aspiration: String::new(),
        learning_pace: LearningPace::SelfPaced,
        socio_economic_context: DEFAULT_SOCIO_ECONOMIC_CONTEXT.into(),
        ai_mentor_preferences: DEFAULT_MENTOR_PREFERENCE.into(),
        created_at,
        extra: Default::default(),
    })
}
