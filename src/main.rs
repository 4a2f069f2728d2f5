use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};
use simplelog::{ConfigBuilder, WriteLogger};

use homestead::api::HttpBackend;
use homestead::core::config::{self, CliOverrides};
use homestead::core::persist;
use homestead::core::store::{SessionAction, SessionSnapshot, SessionStore};
use homestead::storage::FirebaseStorage;
use homestead::tui::{self, Exit};
use homestead::view::ProfileView;

#[derive(Parser)]
#[command(name = "homestead", about = "Manage your real-estate profile from the terminal")]
struct Args {
    /// Base URL of the listings API (overrides config and HOMESTEAD_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let cli = CliOverrides {
        api_url: args.api_url,
        log_level: args.log_level,
    };
    let resolved = config::resolve(&file_config, &cli);

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }
    info!("Homestead starting up against {}", resolved.api_base_url);

    let session_path = persist::session_path();
    let cached = match session_path.as_deref().map(persist::load_session) {
        Some(Ok(user)) => user,
        Some(Err(e)) => {
            warn!("Ignoring unreadable session cache: {}", e);
            None
        }
        None => None,
    };
    let Some(user) = cached else {
        eprintln!("Not signed in. Sign in through the web app, then copy your session to ~/.homestead/session.json");
        return ExitCode::FAILURE;
    };

    let backend = match HttpBackend::new(&resolved.api_base_url, resolved.session_cookie.as_deref()) {
        Ok(b) => b,
        Err(e) => {
            error!("Cannot build API client: {}", e);
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let storage = FirebaseStorage::new(
        &resolved.storage_base_url,
        &resolved.storage_bucket,
        resolved.storage_auth_token.clone(),
    );

    let store = SessionStore::new(SessionSnapshot::default());
    store.dispatch(SessionAction::SignInSuccess(user));
    let mut view = ProfileView::new(store, Arc::new(backend), Arc::new(storage));

    match tui::run(&mut view, session_path) {
        Ok(Exit::SessionEnded) => {
            info!("Session ended");
            println!("Signed out.");
            ExitCode::SUCCESS
        }
        Ok(Exit::Quit) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Terminal error: {}", e);
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
