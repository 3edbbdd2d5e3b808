// src/batch.rs
//
// Drives a delivery run: select eligible providers, then for each one
// render -> serialize -> compose -> send, isolating per-item failures
// and pacing requests. One reporting period, generation timestamp, and
// (normally) one token for the whole run.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::thread;
use std::time::Duration;

use crate::db::{providers, Database};
use crate::domain::period::ReportingPeriod;
use crate::domain::provider::Provider;
use crate::errors::ServerError;
use crate::mail::{
    compose, report_email_body, Attachment, DeliveryError, MessageSender, TokenCache, TokenSource,
};
use crate::report;

/// Pause between consecutive sends in a batch, for the delivery API's
/// rate limits.
pub const BATCH_PACING: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryOutcome {
    #[serde(rename = "providerId")]
    pub provider_id: String,
    pub email: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub message: String,
    pub total: usize,
    pub results: Vec<DeliveryOutcome>,
}

impl RunSummary {
    pub fn error_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == OutcomeStatus::Error)
            .count()
    }
}

/// The wired-up delivery pipeline. All collaborators are borrowed trait
/// objects so tests can swap in fakes.
pub struct Pipeline<'a> {
    pub sender: &'a dyn MessageSender,
    pub tokens: &'a TokenCache,
    pub token_source: &'a dyn TokenSource,
    pub pacing: Duration,
}

impl Pipeline<'_> {
    /// Scheduled batch path. Store failure and a failed initial token
    /// acquisition are run-fatal; everything else becomes a per-item
    /// outcome.
    pub fn run_batch(&self, db: &Database, now: NaiveDateTime) -> Result<RunSummary, ServerError> {
        let eligible: Vec<Provider> = providers::list_providers(db)?
            .into_iter()
            .filter(Provider::is_batch_eligible)
            .collect();

        let period = ReportingPeriod::preceding(now.date());

        // A run with zero valid tokens cannot proceed; fail before the
        // first item rather than producing a page of identical errors.
        self.tokens
            .acquire(self.token_source)
            .map_err(|e| ServerError::RunFailed(e.to_string()))?;

        let total = eligible.len();
        let mut results = Vec::with_capacity(total);

        for (i, provider) in eligible.iter().enumerate() {
            if i > 0 {
                thread::sleep(self.pacing);
            }
            results.push(self.deliver_one(provider, period, now));
        }

        let summary = RunSummary {
            message: format!("Batch run complete: {total} provider(s) processed"),
            total,
            results,
        };
        println!(
            "📬 Batch run: {} sent, {} failed",
            summary.total - summary.error_count(),
            summary.error_count()
        );
        Ok(summary)
    }

    /// Manual single-provider path: same pipeline, batch of one, no
    /// pacing. The specific failure is surfaced in the single outcome.
    pub fn send_for_provider(
        &self,
        db: &Database,
        provider_id: &str,
        now: NaiveDateTime,
    ) -> Result<RunSummary, ServerError> {
        let provider = providers::get_provider(db, provider_id)?;

        if provider
            .contact_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .is_none()
        {
            return Err(ServerError::BadRequest(format!(
                "provider {provider_id} has no contact email"
            )));
        }

        let period = ReportingPeriod::preceding(now.date());
        let outcome = self.deliver_one(&provider, period, now);

        Ok(RunSummary {
            message: format!("Report delivery attempted for provider {provider_id}"),
            total: 1,
            results: vec![outcome],
        })
    }

    fn deliver_one(
        &self,
        provider: &Provider,
        period: ReportingPeriod,
        generated_at: NaiveDateTime,
    ) -> DeliveryOutcome {
        let email = provider
            .contact_email
            .clone()
            .unwrap_or_default();

        let outcome = |status, error| DeliveryOutcome {
            provider_id: provider.id.clone(),
            email: email.clone(),
            status,
            error,
        };

        match self.deliver(provider, period, generated_at, &email) {
            Ok(message_id) => {
                println!("✅ Sent report for {} (message {message_id})", provider.id);
                outcome(OutcomeStatus::Success, None)
            }
            Err(e) => {
                eprintln!("❌ Report for {} failed: {e}", provider.id);
                outcome(OutcomeStatus::Error, Some(e))
            }
        }
    }

    fn deliver(
        &self,
        provider: &Provider,
        period: ReportingPeriod,
        generated_at: NaiveDateTime,
        email: &str,
    ) -> Result<String, String> {
        let rendered = report::render(provider, period, generated_at);
        let pdf = report::serialize_pdf(&rendered);

        let filename = format!(
            "compliance-report-{}-{}.pdf",
            period.month_name().to_lowercase(),
            period.year
        );
        let subject = format!(
            "Compliance Report — {} — {}",
            provider.display_name(),
            period.label()
        );
        let body = report_email_body(provider.display_name(), period).into_string();

        let raw = compose(email, &subject, &body, &[Attachment::pdf(filename, pdf)], None)
            .map_err(|e| e.to_string())?;

        let token = self
            .tokens
            .acquire(self.token_source)
            .map_err(|e| e.to_string())?;

        match self.sender.send(&token, &raw) {
            Ok(id) => Ok(id),
            Err(DeliveryError::AuthExpired) => {
                // One retry with a fresh token; a second 401 is final.
                self.tokens.invalidate();
                let token = self
                    .tokens
                    .acquire(self.token_source)
                    .map_err(|e| e.to_string())?;
                self.sender.send(&token, &raw).map_err(|e| e.to_string())
            }
            Err(e) => Err(e.to_string()),
        }
    }
}
