// src/domain/provider.rs

use serde::{Deserialize, Deserializer, Serialize};

/// One regulated internet-service provider, as stored in the document
/// store. Every scalar field that originates from user input is optional;
/// the renderer substitutes documented fallbacks, never fails.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Provider {
    pub id: String,

    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
    pub tax_regime: Option<String>,
    pub anatel_registration: Option<String>,
    pub scm_license_number: Option<String>,
    pub company_status: Option<String>,

    #[serde(default)]
    pub regulatory: RegulatoryInfo,

    #[serde(default)]
    pub council: CouncilInfo,

    pub notes: Option<String>,
    pub contact_email: Option<String>,

    /// Strict flag: only the JSON literal `true` enables automatic
    /// delivery. Strings like "true", numbers, and missing values all
    /// disable it. See [`strict_true`].
    #[serde(default, deserialize_with = "strict_true")]
    pub auto_send: bool,
}

/// The eight named regulatory-compliance fields. Each holds a raw status
/// string ("Regular", "Irregular", ...) rendered as a colored chip.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegulatoryInfo {
    pub spectrum_licensing: Option<String>,
    pub universal_service_fund: Option<String>,
    pub telecom_tech_fund: Option<String>,
    pub annual_traffic_report: Option<String>,
    pub tax_clearance: Option<String>,
    pub labor_clearance: Option<String>,
    pub municipal_operating_license: Option<String>,
    pub consumer_service_index: Option<String>,
}

impl RegulatoryInfo {
    /// Rows in the fixed order the report table shows them.
    pub fn rows(&self) -> [(&'static str, Option<&str>); 8] {
        [
            ("Spectrum Licensing", self.spectrum_licensing.as_deref()),
            ("Universal Service Fund", self.universal_service_fund.as_deref()),
            ("Telecom Technology Fund", self.telecom_tech_fund.as_deref()),
            ("Annual Traffic Report", self.annual_traffic_report.as_deref()),
            ("Tax Clearance", self.tax_clearance.as_deref()),
            ("Labor Clearance", self.labor_clearance.as_deref()),
            (
                "Municipal Operating License",
                self.municipal_operating_license.as_deref(),
            ),
            ("Consumer Service Index", self.consumer_service_index.as_deref()),
        ]
    }
}

/// Regional engineering-council data embedded in the provider record.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CouncilInfo {
    pub registration_number: Option<String>,
    pub responsible_first_name: Option<String>,
    pub responsible_last_name: Option<String>,
    pub case_numbers: Option<String>,
}

impl Provider {
    /// True when this provider should be included in a scheduled batch run:
    /// a usable contact address plus the strict auto-send flag.
    pub fn is_batch_eligible(&self) -> bool {
        let has_email = self
            .contact_email
            .as_deref()
            .map(|e| !e.trim().is_empty())
            .unwrap_or(false);
        has_email && self.auto_send
    }

    pub fn display_name(&self) -> &str {
        self.legal_name.as_deref().unwrap_or("N/A")
    }
}

/// Deserialize a value as `true` only when it is the JSON boolean literal
/// `true`. Anything else (including the string "true") maps to `false`.
/// The source system has always treated non-boolean values as disabled;
/// that behavior is preserved deliberately.
fn strict_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    Ok(v == serde_json::Value::Bool(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_from(json: &str) -> Provider {
        serde_json::from_str(json).expect("provider should deserialize")
    }

    #[test]
    fn auto_send_only_accepts_boolean_true() {
        let p = provider_from(r#"{"id":"p1","auto_send":true}"#);
        assert!(p.auto_send);

        let p = provider_from(r#"{"id":"p1","auto_send":"true"}"#);
        assert!(!p.auto_send);

        let p = provider_from(r#"{"id":"p1","auto_send":1}"#);
        assert!(!p.auto_send);

        let p = provider_from(r#"{"id":"p1","auto_send":false}"#);
        assert!(!p.auto_send);

        let p = provider_from(r#"{"id":"p1"}"#);
        assert!(!p.auto_send);
    }

    #[test]
    fn eligibility_requires_email_and_flag() {
        let p = provider_from(r#"{"id":"p1","contact_email":"a@b.c","auto_send":true}"#);
        assert!(p.is_batch_eligible());

        // Flag set, but blank address
        let p = provider_from(r#"{"id":"p1","contact_email":"   ","auto_send":true}"#);
        assert!(!p.is_batch_eligible());

        let p = provider_from(r#"{"id":"p1","contact_email":"a@b.c"}"#);
        assert!(!p.is_batch_eligible());
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let p = provider_from(r#"{"id":"p1","legacy_field":{"x":1},"auto_send":true}"#);
        assert_eq!(p.id, "p1");
        assert!(p.auto_send);
    }
}
