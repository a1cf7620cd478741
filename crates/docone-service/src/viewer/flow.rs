//! Gate orchestration for anonymous viewers.
//!
//! A request for a link is validated, routed through whichever gates are
//! still unset for the viewer's browser session, and re-validated just
//! before a view is granted so that a link which expired or hit its view
//! cap while the viewer was typing is still refused. Granting a view
//! claims one from the link's view count, then starts an analytics
//! session, once per browser session.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use docone_auth::gate::GateStore;
use docone_core::error::AppError;
use docone_core::result::AppResult;
use docone_entity::document::Document;
use docone_entity::gate::GateState;
use docone_entity::link::ShareableLink;

use crate::analytics::{AnalyticsTracker, SessionOrigin};
use crate::capture::{EmailCaptureLedger, EmailSubmission};
use crate::link::{AccessDecision, AccessValidator, DenyReason, LinkRegistry};

/// How often, and how many times, a request retries the admission lock
/// held by a concurrent request of the same browser session.
const ADMISSION_POLL_INTERVAL: Duration = Duration::from_millis(25);
const ADMISSION_POLLS: usize = 80;

/// Identity of the requesting browser session.
#[derive(Debug, Clone)]
pub struct ViewerClient {
    /// Opaque browser session token (cookie value).
    pub viewer: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Link details shown on a gate page.
#[derive(Debug, Clone, Serialize)]
pub struct LinkPrompt {
    pub link_code: String,
    pub name: Option<String>,
    pub custom_message: Option<String>,
    pub document_title: String,
}

/// A granted view.
#[derive(Debug, Clone)]
pub struct Admission {
    pub link: ShareableLink,
    pub document: Document,
    /// Analytics session for heartbeats.
    pub session_id: String,
    pub viewer_email: Option<String>,
}

/// Result of a viewer interaction.
#[derive(Debug, Clone)]
pub enum ViewerOutcome {
    /// Access refused; the reason selects the message.
    Denied(DenyReason),
    /// The password gate must be passed first.
    NeedsPassword(LinkPrompt),
    /// The email gate must be passed first.
    NeedsEmail(LinkPrompt),
    /// The viewer may see the document.
    Granted(Box<Admission>),
}

/// Where a viewer stands without granting anything.
#[derive(Debug, Clone)]
pub enum GateStep {
    Denied(DenyReason),
    Password(LinkPrompt),
    Email(LinkPrompt),
    /// No gate remains; the main link page will admit the viewer.
    Open,
}

/// How a file is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAccess {
    Inline,
    Download,
}

enum Step {
    Denied(DenyReason),
    Password(ShareableLink),
    Email(ShareableLink),
    Ready(ShareableLink, GateState),
    Admitted(ShareableLink, GateState),
}

/// Walks viewers through the gates of a link.
#[derive(Debug, Clone)]
pub struct ViewerService {
    registry: LinkRegistry,
    validator: AccessValidator,
    tracker: AnalyticsTracker,
    ledger: EmailCaptureLedger,
    gates: Arc<dyn GateStore>,
    documents: Arc<dyn docone_database::store::DocumentStore>,
}

impl ViewerService {
    /// Creates a new viewer service.
    pub fn new(
        registry: LinkRegistry,
        validator: AccessValidator,
        tracker: AnalyticsTracker,
        ledger: EmailCaptureLedger,
        gates: Arc<dyn GateStore>,
        documents: Arc<dyn docone_database::store::DocumentStore>,
    ) -> Self {
        Self {
            registry,
            validator,
            tracker,
            ledger,
            gates,
            documents,
        }
    }

    /// Request the link page. Admits the viewer if every gate is satisfied.
    pub async fn open(&self, code: &str, client: &ViewerClient) -> AppResult<ViewerOutcome> {
        match self.resolve(code, client).await? {
            Step::Denied(reason) => Ok(ViewerOutcome::Denied(reason)),
            Step::Password(link) => Ok(ViewerOutcome::NeedsPassword(self.prompt(&link).await?)),
            Step::Email(link) => Ok(ViewerOutcome::NeedsEmail(self.prompt(&link).await?)),
            Step::Ready(link, gate) => self.admit(link, gate, client).await,
            Step::Admitted(link, gate) => self.readmit(link, gate).await,
        }
    }

    /// Inspect the gates without granting a view.
    pub async fn peek(&self, code: &str, client: &ViewerClient) -> AppResult<GateStep> {
        Ok(match self.resolve(code, client).await? {
            Step::Denied(reason) => GateStep::Denied(reason),
            Step::Password(link) => GateStep::Password(self.prompt(&link).await?),
            Step::Email(link) => GateStep::Email(self.prompt(&link).await?),
            Step::Ready(..) | Step::Admitted(..) => GateStep::Open,
        })
    }

    /// Submit the link password. On success the fact is recorded and the
    /// flow continues as for [`open`](Self::open).
    pub async fn submit_password(
        &self,
        code: &str,
        client: &ViewerClient,
        password: &str,
    ) -> AppResult<ViewerOutcome> {
        if let Step::Admitted(link, gate) = self.resolve(code, client).await? {
            return self.readmit(link, gate).await;
        }

        let link = self.registry.find_by_code(code).await?;
        if let AccessDecision::Denied(reason) = self.validator.evaluate(link.as_ref(), Some(password))
        {
            if reason == DenyReason::PasswordIncorrect {
                info!(link_code = code, "Incorrect link password submitted");
            }
            return Ok(ViewerOutcome::Denied(reason));
        }

        let mut gate = self.gates.load(&client.viewer, code).await?;
        if !gate.password_verified {
            gate.password_verified = true;
            self.gates.save(&client.viewer, code, &gate).await?;
        }
        self.open(code, client).await
    }

    /// Submit the email gate form: records the capture, then admits.
    ///
    /// Capture, session start and the gate fact form one unit. If admission
    /// fails after the capture, the recorded email still satisfies the gate
    /// so the next request (or a resubmission) retries admission.
    pub async fn submit_email(
        &self,
        code: &str,
        client: &ViewerClient,
        submission: EmailSubmission,
    ) -> AppResult<ViewerOutcome> {
        let (link, mut gate) = match self.resolve(code, client).await? {
            Step::Denied(reason) => return Ok(ViewerOutcome::Denied(reason)),
            Step::Password(link) => {
                return Ok(ViewerOutcome::NeedsPassword(self.prompt(&link).await?));
            }
            Step::Admitted(link, gate) => return self.readmit(link, gate).await,
            Step::Email(link) => {
                let gate = self.gates.load(&client.viewer, code).await?;
                (link, gate)
            }
            Step::Ready(link, gate) => (link, gate),
        };

        if !link.require_email {
            return self.admit(link, gate, client).await;
        }

        let capture = self
            .ledger
            .capture(
                link.id,
                submission,
                client.ip_address.clone(),
                client.user_agent.clone(),
            )
            .await?;

        gate.captured_email = Some(capture.email.clone());
        gate.capture_id = Some(capture.id);
        self.gates.save(&client.viewer, code, &gate).await?;

        self.admit(link, gate, client).await
    }

    /// Authorize streaming the served file to a viewer who was granted a view.
    pub async fn authorize_file(
        &self,
        code: &str,
        client: &ViewerClient,
        access: FileAccess,
    ) -> AppResult<(ShareableLink, Document)> {
        let link = self.registry.find_by_code(code).await?;
        let link = AccessValidator::check_serving(link.as_ref(), Utc::now())
            .map_err(|reason| deny_error(reason))?
            .clone();

        let gate = self.gates.load(&client.viewer, code).await?;
        if !gate.has_session() {
            return Err(AppError::forbidden(
                "Open the link and pass its gates before requesting the file",
            ));
        }
        if access == FileAccess::Download && !link.allow_download {
            return Err(AppError::forbidden("Downloads are disabled for this link"));
        }

        let document = self.document_of(&link).await?;
        Ok((link, document))
    }

    async fn resolve(&self, code: &str, client: &ViewerClient) -> AppResult<Step> {
        let link = self.registry.find_by_code(code).await?;
        let now = Utc::now();
        let gate = self.gates.load(&client.viewer, code).await?;

        if gate.has_session() {
            return Ok(match AccessValidator::check_serving(link.as_ref(), now) {
                Ok(link) => Step::Admitted(link.clone(), gate),
                Err(reason) => Step::Denied(reason),
            });
        }

        let link = match AccessValidator::check_validity(link.as_ref(), now) {
            Ok(link) => link.clone(),
            Err(reason) => return Ok(Step::Denied(reason)),
        };

        if !gate.password_satisfied(link.requires_password()) {
            return Ok(Step::Password(link));
        }
        if !gate.email_satisfied(link.require_email) {
            return Ok(Step::Email(link));
        }
        Ok(Step::Ready(link, gate))
    }

    async fn admit(
        &self,
        link: ShareableLink,
        gate: GateState,
        client: &ViewerClient,
    ) -> AppResult<ViewerOutcome> {
        let code = link.link_code.clone();
        for attempt in 0..ADMISSION_POLLS {
            if attempt > 0 {
                tokio::time::sleep(ADMISSION_POLL_INTERVAL).await;
                // A concurrent request from this browser session may have
                // finished the admission meanwhile.
                let stored = self.gates.load(&client.viewer, &code).await?;
                if stored.has_session() {
                    return self.readmit_current(&code, stored).await;
                }
            }
            if self.gates.begin_admission(&client.viewer, &code).await? {
                let outcome = self.admit_exclusive(link, gate, client).await;
                if let Err(e) = self.gates.end_admission(&client.viewer, &code).await {
                    warn!(error = %e, "Failed to release admission lock");
                }
                return outcome;
            }
        }
        Err(AppError::conflict(
            "This link is already being opened in another tab; try again",
        ))
    }

    /// Admission while holding the browser session's lock for the link.
    async fn admit_exclusive(
        &self,
        link: ShareableLink,
        mut gate: GateState,
        client: &ViewerClient,
    ) -> AppResult<ViewerOutcome> {
        // Another tab may have been admitted just before the lock was taken.
        let stored = self.gates.load(&client.viewer, &link.link_code).await?;
        if stored.has_session() {
            return self.readmit_current(&link.link_code, stored).await;
        }

        // The claim re-checks validity on the stored row.
        let Some(link) = self.registry.increment_view(link.id).await? else {
            let fresh = self.registry.find(link.id).await?;
            let reason = match AccessValidator::check_validity(fresh.as_ref(), Utc::now()) {
                Err(reason) => reason,
                Ok(_) => DenyReason::ViewLimitReached,
            };
            return Ok(ViewerOutcome::Denied(reason));
        };

        let session_id = self
            .tracker
            .start_session(
                link.id,
                SessionOrigin {
                    viewer_email: gate.captured_email.clone(),
                    viewer_ip: client.ip_address.clone(),
                    viewer_user_agent: client.user_agent.clone(),
                },
            )
            .await?;

        gate.tracking_session_id = Some(session_id.clone());
        self.gates.save(&client.viewer, &link.link_code, &gate).await?;

        if let Some(capture_id) = gate.capture_id {
            if let Err(e) = self.ledger.mark_viewed(capture_id).await {
                warn!(capture_id = %capture_id, error = %e, "Failed to flag capture as viewed");
            }
        }

        info!(
            link_id = %link.id,
            session_id = %session_id,
            view_count = link.view_count,
            "View granted"
        );

        let document = self.document_of(&link).await?;
        Ok(ViewerOutcome::Granted(Box::new(Admission {
            link,
            document,
            session_id,
            viewer_email: gate.captured_email,
        })))
    }

    /// Readmit against the current link row.
    async fn readmit_current(&self, code: &str, gate: GateState) -> AppResult<ViewerOutcome> {
        let link = self.registry.find_by_code(code).await?;
        match AccessValidator::check_serving(link.as_ref(), Utc::now()) {
            Ok(link) => self.readmit(link.clone(), gate).await,
            Err(reason) => Ok(ViewerOutcome::Denied(reason)),
        }
    }

    async fn readmit(&self, link: ShareableLink, gate: GateState) -> AppResult<ViewerOutcome> {
        let document = self.document_of(&link).await?;
        let session_id = gate.tracking_session_id.unwrap_or_default();
        Ok(ViewerOutcome::Granted(Box::new(Admission {
            link,
            document,
            session_id,
            viewer_email: gate.captured_email,
        })))
    }

    async fn prompt(&self, link: &ShareableLink) -> AppResult<LinkPrompt> {
        let document = self.document_of(link).await?;
        Ok(LinkPrompt {
            link_code: link.link_code.clone(),
            name: link.name.clone(),
            custom_message: link.custom_message.clone(),
            document_title: document.title,
        })
    }

    async fn document_of(&self, link: &ShareableLink) -> AppResult<Document> {
        self.documents
            .find_document(link.document_id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))
    }
}

/// Error form of a denial, for endpoints that cannot render a decision.
pub fn deny_error(reason: DenyReason) -> AppError {
    if reason.is_not_found() {
        AppError::not_found(reason.message())
    } else {
        AppError::forbidden(reason.message())
    }
}
