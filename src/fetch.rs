use std::path::PathBuf;
use std::time::Duration;

use attohttpc::header::{COOKIE, LOCATION};
#[cfg(feature = "charsets")]
use attohttpc::charsets::Charset;
use attohttpc::{RequestBuilder, Response, Session, StatusCode};
use url::Url;

use crate::env::{Environment, Precedence};
use crate::error::{ErrorKind, InvalidResponseKind, Result};
use crate::locate::{Locator, DEFAULT_FILE_NAME};

/// Environment key holding the session token by default.
pub const DEFAULT_SESSION_KEY: &str = "SC";
/// Cookie carrying the session token by default.
pub const DEFAULT_COOKIE_NAME: &str = "session";

/// `Fetcher` carries the settings used to find the session and fetch URLs with it.
///
/// Every call to `fetch` locates and reads the environment file again, so edits to the
/// file are picked up by the next call.
#[derive(Debug)]
pub struct Fetcher {
    file_name: String,
    search_root: Option<PathBuf>,
    max_depth: Option<usize>,
    session_key: String,
    cookie_name: String,
    require_session: bool,
    precedence: Precedence,
    follow_redirects: bool,
    max_redirections: u32,
    session: Session,
}

impl Default for Fetcher {
    fn default() -> Fetcher {
        Fetcher::new()
    }
}

impl Fetcher {
    /// Create a new `Fetcher` with default settings.
    pub fn new() -> Fetcher {
        Fetcher {
            file_name: DEFAULT_FILE_NAME.to_owned(),
            search_root: None,
            max_depth: None,
            session_key: DEFAULT_SESSION_KEY.to_owned(),
            cookie_name: DEFAULT_COOKIE_NAME.to_owned(),
            require_session: false,
            precedence: Precedence::Process,
            follow_redirects: true,
            max_redirections: 5,
            session: Session::new(),
        }
    }

    //
    // Environment settings
    //

    /// Set the name of the environment file to look for.
    ///
    /// The default is `.env`.
    pub fn env_file_name(&mut self, name: impl Into<String>) {
        self.file_name = name.into();
    }

    /// Set the directory the search starts from.
    ///
    /// When unset, the current working directory at the time of the call is used.
    pub fn search_root(&mut self, root: impl Into<PathBuf>) {
        self.search_root = Some(root.into());
    }

    /// Limit how deep the search goes below the search root.
    ///
    /// The default is no limit.
    pub fn max_depth(&mut self, depth: usize) {
        self.max_depth = Some(depth);
    }

    /// Set the environment key holding the session token.
    ///
    /// The default is `SC`.
    pub fn session_key(&mut self, key: impl Into<String>) {
        self.session_key = key.into();
    }

    /// Set the name of the cookie carrying the session token.
    ///
    /// The default is `session`.
    pub fn cookie_name(&mut self, name: impl Into<String>) {
        self.cookie_name = name.into();
    }

    /// Sets if a missing session token is an error.
    ///
    /// This value defaults to false, in which case the cookie is sent with an empty value.
    pub fn require_session(&mut self, require: bool) {
        self.require_session = require;
    }

    /// Sets if values from the environment file replace those of the process environment.
    ///
    /// This value defaults to false: variables already set in the process are kept.
    pub fn override_process_env(&mut self, override_env: bool) {
        self.precedence = if override_env { Precedence::File } else { Precedence::Process };
    }

    //
    // HTTP settings
    //

    /// Sets if redirections are followed.
    ///
    /// This value defaults to true. The session cookie is only sent again when the
    /// redirection stays on the same origin.
    pub fn follow_redirects(&mut self, follow_redirects: bool) {
        self.follow_redirects = follow_redirects;
    }

    /// Set the maximum number of redirections followed.
    ///
    /// The default is 5.
    pub fn max_redirections(&mut self, max_redirections: u32) {
        self.max_redirections = max_redirections;
    }

    /// Set the maximum number of headers accepted in responses.
    ///
    /// The default is 100.
    pub fn max_headers(&mut self, max_headers: usize) {
        self.session.max_headers(max_headers);
    }

    /// Sets a connect timeout. There is none by default.
    pub fn connect_timeout(&mut self, duration: Duration) {
        self.session.connect_timeout(duration);
    }

    /// Sets a read timeout. There is none by default.
    pub fn read_timeout(&mut self, duration: Duration) {
        self.session.read_timeout(duration);
    }

    /// Sets a timeout for each request, applied after the connection is established.
    /// There is none by default.
    pub fn timeout(&mut self, duration: Duration) {
        self.session.timeout(duration);
    }

    /// Set the charset used to decode responses that do not announce one.
    ///
    /// The default is `None`, in which case ISO-8859-1 (as windows-1252) is used.
    #[cfg(feature = "charsets")]
    pub fn default_charset(&mut self, default_charset: Option<Charset>) {
        self.session.default_charset(default_charset);
    }

    /// Sets if requests announce that they accept gzip and deflate bodies.
    ///
    /// This value defaults to true.
    #[cfg(feature = "compress")]
    pub fn allow_compression(&mut self, allow_compression: bool) {
        self.session.allow_compression(allow_compression);
    }

    /// Sets if invalid TLS certificates are accepted.
    ///
    /// Accepting invalid certificates implies that invalid hostnames are accepted as well.
    ///
    /// # Danger
    /// This will accept **any** TLS certificate and send the session token to whoever
    /// presents it.
    pub fn danger_accept_invalid_certs(&mut self, accept_invalid_certs: bool) {
        self.session.danger_accept_invalid_certs(accept_invalid_certs);
    }

    /// Sets if TLS certificates not matching the hostname are accepted.
    ///
    /// # Danger
    /// Use this setting with care.
    pub fn danger_accept_invalid_hostnames(&mut self, accept_invalid_hostnames: bool) {
        self.session.danger_accept_invalid_hostnames(accept_invalid_hostnames);
    }

    //
    // Operations
    //

    fn locator(&self) -> Locator {
        let locator = Locator::new(self.file_name.as_str());
        match self.max_depth {
            Some(depth) => locator.max_depth(depth),
            None => locator,
        }
    }

    /// Find the environment file, or `None` when there is none.
    ///
    /// A relative search root is taken from the current working directory.
    pub fn locate(&self) -> Result<Option<PathBuf>> {
        let locator = self.locator();
        match &self.search_root {
            Some(root) => locator.find_from(root),
            None => locator.find(),
        }
    }

    /// Find and read the environment file.
    ///
    /// When no file is found the returned `Environment` only sees the process environment.
    pub fn load_env(&self) -> Result<Environment> {
        let path = self.locate()?;
        let env = Environment::load(path.as_deref())?;
        Ok(env.with_precedence(self.precedence))
    }

    /// Read the session token from the environment.
    ///
    /// A missing token is rendered as an empty string, unless a session is required.
    pub fn session_token(&self, env: &Environment) -> Result<String> {
        match env.get(&self.session_key) {
            Some(token) => Ok(token),
            None if self.require_session => Err(ErrorKind::MissingSession(self.session_key.clone()).into()),
            None => {
                warn!("{} is not set, sending an empty session", self.session_key);
                Ok(String::new())
            }
        }
    }

    fn cookie(&self, env: &Environment) -> Result<String> {
        let token = self.session_token(env)?;
        Ok(format!("{}={}", self.cookie_name, token))
    }

    fn request(&self, url: &Url, cookie: Option<&str>) -> Result<RequestBuilder> {
        let builder = self.session.get(url.as_str()).follow_redirects(false);
        match cookie {
            Some(cookie) => Ok(builder.try_header(COOKIE, cookie)?),
            None => Ok(builder),
        }
    }

    /// Build the request for `url` using the session found in `env`, without sending it.
    ///
    /// The returned request does not follow redirections by itself.
    pub fn prepare_with<U>(&self, url: U, env: &Environment) -> Result<RequestBuilder>
    where
        U: AsRef<str>,
    {
        let url = parse_url(url.as_ref())?;
        let cookie = self.cookie(env)?;
        self.request(&url, Some(&cookie))
    }

    /// Locate the environment and build the request for `url`, without sending it.
    pub fn prepare<U>(&self, url: U) -> Result<RequestBuilder>
    where
        U: AsRef<str>,
    {
        let env = self.load_env()?;
        self.prepare_with(url, &env)
    }

    /// Send an authenticated GET request to `url` and return the response.
    ///
    /// Redirections are followed here rather than by the HTTP client so that the cookie
    /// is dropped as soon as a hop leaves the origin.
    pub fn fetch_response<U>(&self, url: U) -> Result<Response>
    where
        U: AsRef<str>,
    {
        let mut url = parse_url(url.as_ref())?;
        let env = self.load_env()?;
        let mut cookie = Some(self.cookie(&env)?);
        let mut redirections = 0;

        loop {
            debug!("GET {}", url);
            let resp = self.request(&url, cookie.as_deref())?.send()?;

            if !self.follow_redirects || !is_redirect(resp.status()) {
                return Ok(resp);
            }
            if redirections >= self.max_redirections {
                return Err(ErrorKind::TooManyRedirections.into());
            }
            redirections += 1;

            let next = redirect_target(&url, &resp)?;
            if cookie.is_some() && next.origin() != url.origin() {
                debug!("redirected off origin to {}, dropping the session", next.origin().ascii_serialization());
                cookie = None;
            }
            debug!("redirected to {}", next);
            url = next;
        }
    }

    /// Send an authenticated GET request to `url` and return the body as text.
    ///
    /// The status code is not checked: the body of an error page is returned like any other.
    pub fn fetch<U>(&self, url: U) -> Result<String>
    where
        U: AsRef<str>,
    {
        Ok(self.fetch_response(url)?.text()?)
    }
}

fn parse_url(url: &str) -> Result<Url> {
    let url = Url::parse(url).map_err(|_| ErrorKind::InvalidBaseUrl)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ErrorKind::InvalidBaseUrl.into()),
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

fn redirect_target(base: &Url, resp: &Response) -> Result<Url> {
    let location = resp
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(InvalidResponseKind::LocationHeader)?;
    let next = base.join(location).map_err(|_| InvalidResponseKind::RedirectionUrl)?;
    match next.scheme() {
        "http" | "https" => Ok(next),
        _ => Err(InvalidResponseKind::RedirectionUrl.into()),
    }
}

/// Fetch `url` with the session of the nearest `.env` file and return the body as text.
///
/// # Examples
/// ```no_run
/// let input = envfetch::fetch("https://adventofcode.com/2020/day/1/input")?;
/// println!("{}", input);
/// # Ok::<(), envfetch::Error>(())
/// ```
pub fn fetch<U>(url: U) -> Result<String>
where
    U: AsRef<str>,
{
    Fetcher::new().fetch(url)
}
