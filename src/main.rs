use std::net::SocketAddr;
use std::sync::Arc;

use astra::Server;

use crate::batch::{Pipeline, BATCH_PACING};
use crate::db::{init_db, Database};
use crate::mail::{GmailClient, RefreshTokenSource, TokenCache};
use crate::responses::error_to_response;

mod batch;
mod db;
mod domain;
mod errors;
mod mail;
mod report;
mod responses;
mod router;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

fn main() {
    let db = Database::new("compliance_mailer.sqlite3");

    if let Err(e) = init_db(&db, "sql/schema.sql") {
        eprintln!("❌ Provider store initialization failed: {e}");
        std::process::exit(1);
    }

    // The scheduled server path authorizes via silent refresh; the
    // interactive consent flow is only for UI-initiated sends.
    let token_source = match RefreshTokenSource::from_env(TOKEN_URL) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("❌ Mail credential configuration missing: {e}");
            std::process::exit(1);
        }
    };
    let tokens = Arc::new(TokenCache::new());
    let sender = Arc::new(GmailClient::new());

    let addr: SocketAddr = "127.0.0.1:3000".parse().unwrap();
    println!("Starting server at http://{addr}");

    let server = Server::bind(&addr).max_workers(8);

    let result = server.serve(move |req, _info| {
        let pipeline = Pipeline {
            sender: sender.as_ref(),
            tokens: tokens.as_ref(),
            token_source: token_source.as_ref(),
            pacing: BATCH_PACING,
        };
        match router::handle(req, &db, &pipeline) {
            Ok(resp) => resp,
            Err(err) => error_to_response(err),
        }
    });

    if let Err(e) = result {
        eprintln!("Server ended with error: {e}");
    }

    println!("Server shut down cleanly.");
}
