use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use warp::http::header::SET_COOKIE;
use warp::http::{StatusCode, Uri};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

mod args;
mod auth;
mod joke;
mod pages;
mod portal;
mod session;
mod time;

use args::Args;
use auth::{LoginAttempt, PrefixChecker};
use joke::JokeClient;
use pages::{AboutPage, HomePage, JokePage, LoginPage};
use portal::{Error, LoginOutcome, Portal};
use session::{SessionRecord, Sessions, SESSION_COOKIE};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.debug() {
        pretty_env_logger::formatted_builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        pretty_env_logger::init();
    }

    let key = match session::load_key() {
        Ok(key) => key,
        Err(e) => {
            error!("refusing to start: {e:?}");
            std::process::exit(1);
        }
    };

    let jokes = match JokeClient::new(args.joke_url().into()) {
        Ok(jokes) => jokes,
        Err(e) => {
            error!("couldn't construct the joke client: {e:?}");
            std::process::exit(1);
        }
    };

    let addr = match args.addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!("couldn't parse address: {e:?}");
            std::process::exit(1);
        }
    };

    let portal = Arc::new(Portal::new(
        Box::new(PrefixChecker),
        jokes,
        Sessions::new(key, args.secure()),
    ));

    info!("listening on {addr}");

    warp::serve(routes(portal)).run(addr).await;
}

fn routes(portal: Arc<Portal>) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let with_portal = {
        let portal = Arc::clone(&portal);
        warp::any().map(move || Arc::clone(&portal))
    };

    // every protected handler re-checks the record it's handed
    let session = with_portal
        .clone()
        .and(warp::cookie::optional::<String>(SESSION_COOKIE))
        .map(|portal: Arc<Portal>, raw: Option<String>| portal.authenticate(raw));

    let login_get = warp::path::end().and(warp::get()).and_then(login_page);

    let login_post = warp::path::end()
        .and(warp::post())
        .and(with_portal.clone())
        .and(warp::body::form())
        .and_then(submit_login);

    let home = warp::path!("home")
        .and(warp::get())
        .and(session.clone())
        .and_then(home_page);

    let joke_get = warp::path!("dad_joke")
        .and(warp::get())
        .and(session.clone())
        .and_then(joke_page);

    let joke_post = warp::path!("dad_joke")
        .and(warp::post())
        .and(with_portal.clone())
        .and(session.clone())
        .and_then(fetch_joke);

    let about = warp::path!("about")
        .and(warp::get())
        .and(session.clone())
        .and_then(about_page);

    let logout = warp::path!("logout")
        .and(warp::get())
        .and(with_portal)
        .and(session)
        .and_then(logout);

    login_get
        .or(login_post)
        .or(home)
        .or(joke_get)
        .or(joke_post)
        .or(about)
        .or(logout)
        .recover(handle_rejection)
        .with(warp::log("dadportal"))
}

fn page_reply<T: askama::Template>(page: &T) -> Result<Response, Rejection> {
    pages::render(page)
        .map(Reply::into_response)
        .map_err(warp::reject::custom)
}

fn to_login() -> Response {
    warp::redirect::found(Uri::from_static("/")).into_response()
}

async fn login_page() -> Result<Response, Rejection> {
    page_reply(&LoginPage { error: None })
}

async fn submit_login(portal: Arc<Portal>, attempt: LoginAttempt) -> Result<Response, Rejection> {
    match portal.login(&attempt) {
        LoginOutcome::Granted { session } => {
            let cookie = portal
                .open_session(&session)
                .map_err(warp::reject::custom)?;

            let redirect = warp::redirect::found(Uri::from_static("/home"));
            Ok(warp::reply::with_header(redirect, SET_COOKIE, cookie).into_response())
        }
        LoginOutcome::Denied { message } => page_reply(&LoginPage {
            error: Some(message),
        }),
    }
}

async fn home_page(session: Option<SessionRecord>) -> Result<Response, Rejection> {
    if session.is_none() {
        return Ok(to_login());
    }

    page_reply(&HomePage)
}

async fn about_page(session: Option<SessionRecord>) -> Result<Response, Rejection> {
    if session.is_none() {
        return Ok(to_login());
    }

    page_reply(&AboutPage)
}

async fn joke_page(session: Option<SessionRecord>) -> Result<Response, Rejection> {
    if session.is_none() {
        return Ok(to_login());
    }

    page_reply(&JokePage::empty())
}

async fn fetch_joke(
    portal: Arc<Portal>,
    session: Option<SessionRecord>,
) -> Result<Response, Rejection> {
    if session.is_none() {
        return Ok(to_login());
    }

    let page = match portal.fetch_joke().await {
        Ok(result) => JokePage::fetched(result),
        Err(_) => JokePage::failed(joke::ERR_UNAVAILABLE),
    };

    page_reply(&page)
}

async fn logout(portal: Arc<Portal>, session: Option<SessionRecord>) -> Result<Response, Rejection> {
    let cookie = portal.close_session(session.as_ref());

    Ok(warp::reply::with_header(to_login(), SET_COOKIE, cookie).into_response())
}

async fn handle_rejection(rejection: Rejection) -> Result<impl Reply, Rejection> {
    let status: StatusCode = if let Some(&err) = rejection.find::<Error>() {
        err.into()
    } else if rejection.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        return Err(rejection);
    };

    Ok(warp::reply::with_status(warp::reply(), status))
}
