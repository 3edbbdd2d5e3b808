// src/mail/body.rs

use maud::{html, Markup, DOCTYPE};

use crate::domain::period::ReportingPeriod;

/// HTML body for the compliance-report email. The report itself rides
/// along as a PDF attachment; the body is a short cover note.
pub fn report_email_body(provider_name: &str, period: ReportingPeriod) -> Markup {
    html! {
        (DOCTYPE)
        html {
            body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;" {
                div style="max-width: 600px; margin: 0 auto; padding: 20px;" {
                    h2 { "Compliance Report — " (period.label()) }
                    p {
                        "Please find attached the compliance report for "
                        strong { (provider_name) }
                        " covering " (period.label()) "."
                    }
                    p {
                        "The attached document summarizes the provider's registration, "
                        "regulatory standing, and council information for the period."
                    }
                    hr style="margin-top: 30px; border: none; border-top: 1px solid #eee;";
                    p style="font-size: 0.8em; color: #999;" {
                        "This report was generated automatically. "
                        "Reply to this message to reach the compliance desk."
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_mentions_provider_and_period() {
        let period = ReportingPeriod { month: 2, year: 2025 };
        let html = report_email_body("Acme Internet Ltda", period).into_string();
        assert!(html.contains("Acme Internet Ltda"));
        assert!(html.contains("February 2025"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn provider_name_is_escaped() {
        let period = ReportingPeriod { month: 2, year: 2025 };
        let html = report_email_body("<script>x</script>", period).into_string();
        assert!(!html.contains("<script>"));
    }
}
