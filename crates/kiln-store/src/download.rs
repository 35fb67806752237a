//! HTTP fetching from remotes.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;

use kiln_util::errors::KilnError;

use crate::auth;
use crate::remote::Remote;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build an HTTP client for one remote.
pub fn build_client(remote: &Remote) -> Result<Client, KilnError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("kiln/", env!("CARGO_PKG_VERSION")))
        .danger_accept_invalid_certs(!remote.verify_ssl)
        .build()
        .map_err(|e| KilnError::Network {
            message: format!("Failed to create HTTP client: {e}"),
        })
}

/// GET a text document, with authentication and retries.
///
/// Returns `Ok(None)` for 404. Connection failures, timeouts and 5xx
/// responses are retried with a linear back-off; other statuses fail at once.
pub fn fetch_text(
    client: &Client,
    remote: &Remote,
    url: &str,
    query: &[(&str, &str)],
) -> Result<Option<String>, KilnError> {
    let mut last_err = String::new();
    let credentials = if remote.has_auth() { "with" } else { "without" };
    debug!("GET {url} from remote '{}' {credentials} credentials", remote.name);

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            debug!("retrying {url} (attempt {}): {last_err}", attempt + 1);
            thread::sleep(RETRY_DELAY * attempt);
        }

        let req = auth::apply_auth(client.get(url).query(query), remote);

        match req.send() {
            Ok(resp) => {
                let status = resp.status();
                if status == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if status.is_server_error() {
                    last_err = format!("HTTP {status} from {url}");
                    continue;
                }
                if !status.is_success() {
                    return Err(KilnError::Network {
                        message: format!("HTTP {status} fetching {url} from remote '{}'", remote.name),
                    });
                }

                let text = resp.text().map_err(|e| KilnError::Network {
                    message: format!("Failed to read response from {url}: {e}"),
                })?;
                return Ok(Some(text));
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                last_err = format!("{e}");
                continue;
            }
            Err(e) => {
                return Err(KilnError::Network {
                    message: format!("Request to {url} failed: {e}"),
                });
            }
        }
    }

    Err(KilnError::Network {
        message: format!("Failed after {MAX_RETRIES} attempts for {url}: {last_err}"),
    })
}
