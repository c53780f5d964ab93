use std::time::Duration;

use log::error;
use reqwest::{header, Client, ClientBuilder};
use serde::Deserialize;

use crate::time::Stamp;

pub const DEFAULT_URL: &str = "https://icanhazdadjoke.com/";

pub const ERR_UNAVAILABLE: &str = "Couldn't reach the joke service. Please try again.";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Copy, Clone, Debug)]
pub enum FetchError {
    Transport,
    BadStatus,
    BadBody,
}

/// One fetched joke and the moment it arrived.
#[derive(Debug)]
pub struct JokeResult {
    pub joke: String,
    pub fetched_at: String,
}

// the endpoint also sends `id` and `status`, neither of which we keep
#[derive(Debug, Deserialize)]
struct JokePayload {
    joke: String,
}

pub struct JokeClient {
    http: Client,
    url: String,
}

impl JokeClient {
    pub fn new(url: String) -> Result<Self, reqwest::Error> {
        let http = ClientBuilder::new().timeout(FETCH_TIMEOUT).build()?;

        Ok(Self { http, url })
    }

    pub async fn fetch(&self) -> Result<JokeResult, FetchError> {
        let response = self
            .http
            .get(&self.url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("joke fetch failed: {e:?}");
                FetchError::Transport
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("joke endpoint returned {status}");
            return Err(FetchError::BadStatus);
        }

        let payload: JokePayload = response.json().await.map_err(|e| {
            error!("joke body didn't parse: {e:?}");
            FetchError::BadBody
        })?;

        Ok(JokeResult {
            joke: payload.joke,
            fetched_at: Stamp::now().to_string(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::net::SocketAddr;

    use warp::Filter;

    macro_rules! serve {
        ($route:expr) => {{
            let (addr, server): (SocketAddr, _) =
                warp::serve($route).bind_ephemeral(([127, 0, 0, 1], 0));
            tokio::spawn(server);
            format!("http://{addr}/")
        }};
    }

    #[tokio::test]
    async fn extracts_the_joke_field() {
        let url = serve!(warp::any().map(|| {
            warp::reply::json(&serde_json::json!({
                "id": "R7UfaahVfFd",
                "joke": "I used to be a banker, but I lost interest.",
                "status": 200,
            }))
        }));

        let client = JokeClient::new(url).unwrap();
        let result = client.fetch().await.unwrap();

        assert_eq!(result.joke, "I used to be a banker, but I lost interest.");
        assert_eq!(result.fetched_at.len(), 19);
    }

    #[tokio::test]
    async fn bad_status_is_an_error() {
        let url = serve!(warp::any().map(|| {
            warp::reply::with_status("gone", warp::http::StatusCode::INTERNAL_SERVER_ERROR)
        }));

        let client = JokeClient::new(url).unwrap();
        assert!(matches!(client.fetch().await, Err(FetchError::BadStatus)));
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let url = serve!(warp::any().map(|| "this is not json"));

        let client = JokeClient::new(url).unwrap();
        assert!(matches!(client.fetch().await, Err(FetchError::BadBody)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        // nothing listens on the discard port
        let client = JokeClient::new("http://127.0.0.1:9/".into()).unwrap();
        assert!(matches!(client.fetch().await, Err(FetchError::Transport)));
    }
}
