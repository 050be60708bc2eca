#![allow(async_fn_in_trait)]

use crate::config::Settings;
use crate::error::{Error, Result};
use bytes::Bytes;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use log::{debug, info};
use reqwest::Client;
use std::num::NonZeroU32;
use std::time::Duration;
use url::Url;

/// The API resources this client reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    Course(&'a str),
    Schedule(&'a str),
    /// Every course code; a large answer
    AllCourses,
}

impl Endpoint<'_> {
    pub fn segments(&self) -> [&str; 2] {
        match *self {
            Endpoint::Course(code) => ["course", code],
            Endpoint::Schedule(code) => ["schedule", code],
            Endpoint::AllCourses => ["course", "-"],
        }
    }

    /// Path below the base url, e.g. `course/TDT4100`.
    pub fn path(&self) -> String {
        self.segments().join("/")
    }

    pub fn is_bulk(&self) -> bool {
        matches!(self, Endpoint::AllCourses)
    }

    pub fn code(&self) -> Option<&str> {
        match *self {
            Endpoint::Course(code) | Endpoint::Schedule(code) => Some(code),
            Endpoint::AllCourses => None,
        }
    }
}

/// Trims a course code and rejects values that would not address a single course:
/// dot segments are dropped from urls and `-` names the full course listing.
pub fn checked_code(code: &str) -> Result<&str> {
    let code = code.trim();
    match code {
        "" => Err(Error::invalid("code", "course code is empty")),
        "." | ".." | "-" => Err(Error::invalid(
            "code",
            format!("{code:?} is not a course code"),
        )),
        _ => Ok(code),
    }
}

/// A raw answer. The body is kept whatever the status, since the service
/// reports its own errors as JSON documents.
#[derive(Debug, Clone)]
pub struct Payload {
    pub status: u16,
    pub url: String,
    pub body: Bytes,
}

impl Payload {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one GET per call against the API.
pub trait Fetch {
    async fn fetch(&self, endpoint: &Endpoint<'_>) -> Result<Payload>;
}

pub struct HttpFetcher {
    client: Client,
    base: Url,
    timeout: Duration,
    bulk_timeout: Duration,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let base = Url::parse(&settings.base_url)?;
        if base.cannot_be_a_base() {
            return Err(Error::Config {
                message: format!("base url {base} cannot take a path"),
            });
        }

        let client = Client::builder()
            .gzip(true)
            .user_agent(settings.user_agent.as_str())
            .build()?;

        let limiter = settings
            .requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rate| RateLimiter::direct(Quota::per_second(rate)));

        Ok(Self {
            client,
            base,
            timeout: settings.timeout(),
            bulk_timeout: settings.bulk_timeout(),
            limiter,
        })
    }

    /// Builds the request url; codes become single escaped path segments.
    pub fn url_for(&self, endpoint: &Endpoint<'_>) -> Result<Url> {
        if let Some(code) = endpoint.code() {
            checked_code(code)?;
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config {
                message: format!("base url {} cannot take a path", self.base),
            })?
            .pop_if_empty()
            .extend(endpoint.segments());
        Ok(url)
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, endpoint: &Endpoint<'_>) -> Result<Payload> {
        let url = self.url_for(endpoint)?;

        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let timeout = if endpoint.is_bulk() {
            self.bulk_timeout
        } else {
            self.timeout
        };
        debug!("GET {url} (timeout {timeout:?})");

        let response = self.client.get(url.clone()).timeout(timeout).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        info!("{status} {url}: {} bytes", body.len());

        Ok(Payload {
            status,
            url: url.into(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(base_url: &str) -> HttpFetcher {
        HttpFetcher::new(&Settings {
            base_url: base_url.into(),
            ..Settings::default()
        })
        .unwrap()
    }

    #[test]
    fn urls_extend_the_base_path() {
        let f = fetcher("http://www.ime.ntnu.no/api");
        assert_eq!(
            f.url_for(&Endpoint::Course("TDT4100")).unwrap().as_str(),
            "http://www.ime.ntnu.no/api/course/TDT4100"
        );
        assert_eq!(
            f.url_for(&Endpoint::AllCourses).unwrap().as_str(),
            "http://www.ime.ntnu.no/api/course/-"
        );

        let f = fetcher("http://localhost:8080/api/");
        assert_eq!(
            f.url_for(&Endpoint::Schedule("TMA4100")).unwrap().as_str(),
            "http://localhost:8080/api/schedule/TMA4100"
        );
    }

    #[test]
    fn codes_cannot_escape_their_segment() {
        let f = fetcher("http://www.ime.ntnu.no/api");
        let url = f.url_for(&Endpoint::Course("../schedule/X")).unwrap();
        assert_eq!(url.path_segments().unwrap().count(), 3);
        assert!(url.path().starts_with("/api/course/"));
    }

    #[test]
    fn dot_segments_and_listing_marker_are_rejected() {
        let f = fetcher("http://www.ime.ntnu.no/api");
        for code in [".", "..", "-", ""] {
            let err = f.url_for(&Endpoint::Course(code)).unwrap_err();
            assert!(matches!(err, Error::Invalid { field: "code", .. }), "{code:?}");
            assert!(f.url_for(&Endpoint::Schedule(code)).is_err(), "{code:?}");
        }
        assert_eq!(checked_code(" TDT4100 ").unwrap(), "TDT4100");
        assert_eq!(
            f.url_for(&Endpoint::AllCourses).unwrap().as_str(),
            "http://www.ime.ntnu.no/api/course/-"
        );
    }

    #[test]
    fn bad_base_url_is_a_config_error() {
        let err = HttpFetcher::new(&Settings {
            base_url: "not a url".into(),
            ..Settings::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, Error::Config { .. }));

        let err = HttpFetcher::new(&Settings {
            base_url: "mailto:someone@example.com".into(),
            ..Settings::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn status_classification() {
        let payload = Payload {
            status: 404,
            url: String::new(),
            body: Bytes::new(),
        };
        assert!(!payload.is_success());
    }
}
