// src/mail/message.rs
//
// Builds the RFC 822 / MIME multipart message the delivery API expects
// and transport-encodes it as unpadded base64url for the {"raw": ...}
// JSON envelope.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use rand::RngCore;
use std::error::Error;
use std::fmt;

const CRLF: &str = "\r\n";
const ENCODED_WORD_CHUNK: usize = 76;
const BODY_WRAP: usize = 76;

#[derive(Debug)]
pub enum ComposeError {
    BadAttachment(String),
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::BadAttachment(msg) => write!(f, "Bad attachment: {msg}"),
        }
    }
}

impl Error for ComposeError {}

/// One attachment. Payload is either raw bytes (the normal path for the
/// in-process PDF) or base64 already produced by a caller, optionally
/// carrying a `data:` URI prefix that gets stripped.
pub struct Attachment {
    pub filename: String,
    pub media_type: mime::Mime,
    pub data: AttachmentData,
}

pub enum AttachmentData {
    Bytes(Vec<u8>),
    Base64(String),
}

impl Attachment {
    pub fn pdf(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            media_type: mime::APPLICATION_PDF,
            data: AttachmentData::Bytes(bytes),
        }
    }

    /// Base64 body wrapped at 76 columns. Caller-supplied base64 is
    /// validated so a malformed payload fails here rather than at the
    /// delivery API.
    fn encoded_body(&self) -> Result<String, ComposeError> {
        let b64 = match &self.data {
            AttachmentData::Bytes(bytes) => STANDARD.encode(bytes),
            AttachmentData::Base64(s) => {
                let stripped = strip_data_uri_prefix(s).replace(['\r', '\n'], "");
                STANDARD.decode(stripped.as_bytes()).map_err(|e| {
                    ComposeError::BadAttachment(format!(
                        "{}: invalid base64 payload: {e}",
                        self.filename
                    ))
                })?;
                stripped
            }
        };
        Ok(wrap_chunks(&b64, BODY_WRAP).join(CRLF))
    }
}

fn strip_data_uri_prefix(s: &str) -> &str {
    if s.starts_with("data:") {
        match s.find(',') {
            Some(at) => &s[at + 1..],
            None => s,
        }
    } else {
        s
    }
}

/// Random URL-safe boundary token, unique per message.
pub fn generate_boundary() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("bnd_{}", URL_SAFE_NO_PAD.encode(bytes))
}

/// RFC 2047 encoded-word form for subjects with non-ASCII bytes; plain
/// ASCII passes through untouched. The base64 text is split into
/// 76-character chunks, each wrapped `=?UTF-8?B?...?=` and joined with a
/// CRLF plus one leading space (header folding).
pub fn encode_subject(subject: &str) -> String {
    if subject.is_ascii() {
        return subject.to_string();
    }

    let b64 = STANDARD.encode(subject.as_bytes());
    wrap_chunks(&b64, ENCODED_WORD_CHUNK)
        .into_iter()
        .map(|chunk| format!("=?UTF-8?B?{chunk}?="))
        .collect::<Vec<_>>()
        .join("\r\n ")
}

fn wrap_chunks(s: &str, width: usize) -> Vec<String> {
    s.as_bytes()
        .chunks(width)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect()
}

/// Assemble the full multipart/mixed message and transport-encode it.
/// `boundary` is injectable for deterministic tests; pass `None` to get
/// a fresh random one.
pub fn compose(
    to: &str,
    subject: &str,
    html_body: &str,
    attachments: &[Attachment],
    boundary: Option<&str>,
) -> Result<String, ComposeError> {
    Ok(transport_encode(&compose_mime(
        to,
        subject,
        html_body,
        attachments,
        boundary,
    )?))
}

/// The un-encoded MIME byte stream; separate from [`compose`] so tests
/// can parse it directly.
pub fn compose_mime(
    to: &str,
    subject: &str,
    html_body: &str,
    attachments: &[Attachment],
    boundary: Option<&str>,
) -> Result<Vec<u8>, ComposeError> {
    let generated;
    let boundary = match boundary {
        Some(b) => b,
        None => {
            generated = generate_boundary();
            &generated
        }
    };

    let mut msg = String::new();
    msg.push_str(&format!("To: {to}{CRLF}"));
    msg.push_str(&format!("Subject: {}{CRLF}", encode_subject(subject)));
    msg.push_str(&format!("MIME-Version: 1.0{CRLF}"));
    msg.push_str(&format!(
        "Content-Type: multipart/mixed; boundary=\"{boundary}\"{CRLF}"
    ));

    // HTML body part. Always present, so an attachment-free message is
    // still well-formed multipart with exactly one part.
    msg.push_str(&format!("{CRLF}--{boundary}{CRLF}"));
    msg.push_str(&format!("Content-Type: text/html; charset=UTF-8{CRLF}{CRLF}"));
    msg.push_str(html_body);

    for attachment in attachments {
        let body = attachment.encoded_body()?;
        msg.push_str(&format!("{CRLF}--{boundary}{CRLF}"));
        msg.push_str(&format!(
            "Content-Type: {}; name=\"{}\"{CRLF}",
            attachment.media_type, attachment.filename
        ));
        msg.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{}\"{CRLF}",
            attachment.filename
        ));
        msg.push_str(&format!("Content-Transfer-Encoding: base64{CRLF}{CRLF}"));
        msg.push_str(&body);
    }

    msg.push_str(&format!("{CRLF}--{boundary}--"));
    Ok(msg.into_bytes())
}

/// base64url without padding, as the delivery API's JSON envelope wants.
pub fn transport_encode(mime_bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(mime_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "test-boundary-123";

    fn decode_transport(raw: &str) -> Vec<u8> {
        URL_SAFE_NO_PAD.decode(raw.as_bytes()).expect("valid base64url")
    }

    /// Minimal MIME split for round-trip assertions: headers + parts.
    fn split_parts(mime: &str, boundary: &str) -> (String, Vec<String>) {
        let sep = format!("\r\n--{boundary}\r\n");
        let terminator = format!("\r\n--{boundary}--");
        let body = mime.strip_suffix(&terminator).expect("terminated message");
        let mut pieces = body.split(&sep);
        let headers = pieces.next().unwrap().to_string();
        (headers, pieces.map(str::to_string).collect())
    }

    #[test]
    fn ascii_subject_passes_through() {
        assert_eq!(encode_subject("Monthly Report"), "Monthly Report");
    }

    #[test]
    fn non_ascii_subject_is_rfc2047_encoded() {
        let encoded = encode_subject("Relatório Mensal");
        assert!(encoded.starts_with("=?UTF-8?B?"));
        assert!(encoded.ends_with("?="));

        let b64 = encoded
            .trim_start_matches("=?UTF-8?B?")
            .trim_end_matches("?=");
        let decoded = STANDARD.decode(b64).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "Relatório Mensal");
    }

    #[test]
    fn long_non_ascii_subject_folds_into_chunked_encoded_words() {
        let subject = "Relatório ".repeat(20);
        let encoded = encode_subject(&subject);

        let words: Vec<&str> = encoded.split("\r\n ").collect();
        assert!(words.len() > 1);

        let mut b64 = String::new();
        for word in &words {
            assert!(word.starts_with("=?UTF-8?B?") && word.ends_with("?="));
            let chunk = word.trim_start_matches("=?UTF-8?B?").trim_end_matches("?=");
            assert!(chunk.len() <= 76);
            b64.push_str(chunk);
        }
        let decoded = STANDARD.decode(b64).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), subject);
    }

    #[test]
    fn round_trip_recovers_everything() {
        let payload: Vec<u8> = (0u8..=255).collect();
        let attachment = Attachment::pdf("report.pdf", payload.clone());

        let raw = compose(
            "ops@acme.example",
            "Relatório Mensal",
            "<p>See attachment.</p>",
            &[attachment],
            Some(BOUNDARY),
        )
        .unwrap();

        let mime = decode_transport(&raw);
        let text = String::from_utf8(mime).unwrap();
        let (headers, parts) = split_parts(&text, BOUNDARY);

        assert!(headers.contains("To: ops@acme.example\r\n"));
        assert!(headers.contains("MIME-Version: 1.0\r\n"));
        assert!(headers.contains(&format!(
            "Content-Type: multipart/mixed; boundary=\"{BOUNDARY}\""
        )));

        // Subject decodes back to the original.
        let subject_line = headers
            .lines()
            .find(|l| l.starts_with("Subject: "))
            .unwrap();
        let b64 = subject_line
            .trim_start_matches("Subject: =?UTF-8?B?")
            .trim_end_matches("?=");
        assert_eq!(
            String::from_utf8(STANDARD.decode(b64).unwrap()).unwrap(),
            "Relatório Mensal"
        );

        assert_eq!(parts.len(), 2);
        assert!(parts[0].contains("Content-Type: text/html; charset=UTF-8"));
        assert!(parts[0].ends_with("<p>See attachment.</p>"));

        assert!(parts[1].contains("Content-Disposition: attachment; filename=\"report.pdf\""));
        assert!(parts[1].contains("Content-Transfer-Encoding: base64"));
        let body = parts[1].split("\r\n\r\n").nth(1).unwrap();
        let recovered = STANDARD.decode(body.replace("\r\n", "")).unwrap();
        assert_eq!(recovered, payload);
    }

    #[test]
    fn zero_attachments_is_still_multipart_with_one_part() {
        let raw = compose("a@b.c", "Monthly Report", "<p>hi</p>", &[], Some(BOUNDARY)).unwrap();
        let text = String::from_utf8(decode_transport(&raw)).unwrap();
        let (_, parts) = split_parts(&text, BOUNDARY);
        assert_eq!(parts.len(), 1);
        assert!(text.ends_with(&format!("\r\n--{BOUNDARY}--")));
    }

    #[test]
    fn data_uri_prefix_is_stripped() {
        let b64 = STANDARD.encode(b"pdf bytes here");
        let attachment = Attachment {
            filename: "x.pdf".into(),
            media_type: mime::APPLICATION_PDF,
            data: AttachmentData::Base64(format!("data:application/pdf;base64,{b64}")),
        };
        let mime_bytes =
            compose_mime("a@b.c", "s", "<p></p>", &[attachment], Some(BOUNDARY)).unwrap();
        let text = String::from_utf8(mime_bytes).unwrap();
        assert!(text.contains(&b64));
        assert!(!text.contains("data:application/pdf"));
    }

    #[test]
    fn malformed_base64_payload_is_a_compose_error() {
        let attachment = Attachment {
            filename: "bad.pdf".into(),
            media_type: mime::APPLICATION_PDF,
            data: AttachmentData::Base64("!!!not base64!!!".into()),
        };
        let err = compose_mime("a@b.c", "s", "", &[attachment], Some(BOUNDARY)).unwrap_err();
        assert!(err.to_string().contains("bad.pdf"));
    }

    #[test]
    fn transport_encoding_is_urlsafe_unpadded() {
        let raw = compose("a@b.c", "s", "<p>?</p>", &[], None).unwrap();
        assert!(!raw.contains('+'));
        assert!(!raw.contains('/'));
        assert!(!raw.contains('='));
    }

    #[test]
    fn generated_boundaries_are_unique() {
        assert_ne!(generate_boundary(), generate_boundary());
    }
}
