use astra::Request;
use chrono::Local;
use maud::html;

use crate::batch::Pipeline;
use crate::db::Database;
use crate::responses::{html_response, json_response, ResultResp};
use crate::errors::ServerError;

pub fn handle(req: Request, db: &Database, pipeline: &Pipeline) -> ResultResp {
    let method = req.method().as_str();
    let path = req.uri().path().to_string();

    match (method, path.as_str()) {
        ("GET", "/") => html_response(html! {
            h1 { "Compliance Mailer" }
            p { "POST /reports/run to start a batch run." }
        }),

        ("GET", "/healthz") => json_response(200, &serde_json::json!({ "status": "ok" })),

        // Scheduled trigger: run the whole batch, return the aggregated
        // summary. Per-item errors live inside the summary, not here.
        ("POST", "/reports/run") => {
            let summary = pipeline.run_batch(db, Local::now().naive_local())?;
            json_response(200, &summary)
        }

        // Manual trigger for a single provider; the specific failure is
        // surfaced to the initiating user.
        ("POST", p) if p.starts_with("/reports/send/") => {
            let provider_id = &p["/reports/send/".len()..];
            if provider_id.is_empty() {
                return Err(ServerError::BadRequest("missing provider id".into()));
            }
            let summary = pipeline.send_for_provider(db, provider_id, Local::now().naive_local())?;
            let status = if summary.error_count() > 0 { 502 } else { 200 };
            json_response(status, &summary)
        }

        _ => Err(ServerError::NotFound),
    }
}
