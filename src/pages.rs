use askama::Template;
use log::error;
use warp::reply::Html;

use crate::joke::JokeResult;
use crate::portal::{Error, Result};

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage;

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutPage;

#[derive(Template)]
#[template(path = "dad_joke.html")]
pub struct JokePage {
    joke: Option<String>,
    fetched_at: Option<String>,
    error: Option<String>,
}

impl JokePage {
    /// Page state before any fetch has been asked for.
    pub fn empty() -> Self {
        Self {
            joke: None,
            fetched_at: None,
            error: None,
        }
    }

    pub fn fetched(result: JokeResult) -> Self {
        Self {
            joke: Some(result.joke),
            fetched_at: Some(result.fetched_at),
            error: None,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            joke: None,
            fetched_at: None,
            error: Some(message.into()),
        }
    }
}

pub fn render<T: Template>(page: &T) -> Result<Html<String>> {
    match page.render() {
        Ok(html) => Ok(warp::reply::html(html)),
        Err(e) => {
            error!("template render failed: {e:?}");
            Err(Error::Internal)
        }
    }
}
