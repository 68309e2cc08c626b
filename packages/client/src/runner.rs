//! Client execution logic with reconnection support.

use std::time::Duration;

use crate::{
    api::ApiClient,
    domain::{should_attempt_reconnect, should_exit_immediately},
    error::ClientError,
    session::run_client_session,
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Register the user, then run the WebSocket client with reconnection logic.
pub async fn run_client(server_url: String, username: String) -> Result<(), ClientError> {
    let mut api = ApiClient::new(&server_url);

    // Registration happens once; reconnects reuse the issued token
    let registered = match api.register(&username).await {
        Ok(registered) => registered,
        Err(e) => {
            tracing::error!("Registration failed: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Registered as '{}' (user id {})",
        registered.username,
        registered.user_id
    );

    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            server_url,
            registered.username,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(
            &server_url,
            &registered.token,
            &registered.user_id,
            &registered.username,
            &api,
        )
        .await
        {
            Ok(_) => {
                tracing::info!("Client session ended normally");
                // If connection ended normally (user exit), don't reconnect
                break;
            }
            Err(e) => {
                if should_exit_immediately(&e) {
                    tracing::error!("{}", e);
                    tracing::error!("Cannot continue with this credential. Exiting.");
                    std::process::exit(1);
                }

                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if !should_attempt_reconnect(&e, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    std::process::exit(1);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }

    Ok(())
}
