mod body;
mod credentials;
mod gmail;
mod message;

pub use body::report_email_body;
pub use credentials::{
    AuthError, GrantCompleter, InteractiveGrant, RefreshTokenSource, TokenCache, TokenGrant,
    TokenSource,
};
pub use gmail::{DeliveryError, GmailClient, MessageSender};
pub use message::{compose, compose_mime, generate_boundary, Attachment, AttachmentData, ComposeError};
