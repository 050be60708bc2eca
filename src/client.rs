use crate::config::Settings;
use crate::error::{Error, Result};
use crate::fetch::{checked_code, Endpoint, Fetch, HttpFetcher, Payload};
use crate::mapping;
use crate::registry::{course_key, Registries};
use crate::structs::{Course, Schedule};
use crate::wire::{CourseDocument, CourseListDocument, ScheduleDocument};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Entry point for catalog lookups. Courses, persons and areas are memoized
/// per client, so repeated lookups share instances.
pub struct Client<F = HttpFetcher> {
    fetcher: F,
    registries: Registries,
}

impl Client<HttpFetcher> {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self::with_fetcher(HttpFetcher::new(settings)?))
    }
}

impl<F: Fetch> Client<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        Self {
            fetcher,
            registries: Registries::new(),
        }
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Finds a course by code. A course seen before is returned without a request.
    pub async fn find_course(&self, code: &str) -> Result<Arc<Course>> {
        let code = checked_code(code)?;
        let key = course_key(code);
        if let Some(course) = self.registries.courses.get(&key) {
            debug!("course {key} served from registry");
            return Ok(course);
        }

        let doc: CourseDocument = self.get(&Endpoint::Course(code)).await?;
        let course = mapping::map_course(doc.course, &self.registries);
        Ok(self.registries.courses.insert(&key, course))
    }

    /// Finds the current schedule of a course.
    pub async fn find_schedule(&self, code: &str) -> Result<Schedule> {
        let code = checked_code(code)?;
        let doc: ScheduleDocument = self.get(&Endpoint::Schedule(code)).await?;
        let schedule = mapping::map_schedule(doc)?;
        info!(
            "schedule for {}: {} activities",
            schedule.code,
            schedule.activities.len()
        );
        Ok(schedule)
    }

    pub async fn find_schedule_for_course(&self, course: &Course) -> Result<Schedule> {
        self.find_schedule(&course.code).await
    }

    /// Lists every course code the API knows. The answer is large and slow to produce.
    pub async fn find_all_course_codes(&self) -> Result<Vec<String>> {
        let doc: CourseListDocument = self.get(&Endpoint::AllCourses).await?;
        let codes: Vec<String> = doc.course.into_iter().map(|c| c.code).collect();
        info!("{} course codes listed", codes.len());
        Ok(codes)
    }

    /// Drops a memoized course so the next lookup fetches it again.
    pub fn forget_course(&self, code: &str) -> Option<Arc<Course>> {
        self.registries.courses.remove(&course_key(code))
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &Endpoint<'_>) -> Result<T> {
        let payload = self.fetcher.fetch(endpoint).await?;
        decode(payload)
    }
}

/// Classifies an answer: transport status, service error document, or a decodable body.
fn decode<T: DeserializeOwned>(payload: Payload) -> Result<T> {
    let value: Value = match serde_json::from_slice(&payload.body) {
        Ok(value) => value,
        Err(_) if !payload.is_success() => {
            return Err(Error::Status {
                status: payload.status,
                url: payload.url,
            })
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(error) = value.get("Error") {
        warn!("{} rejected by web service: {error}", payload.url);
        return Err(Error::Service {
            payload: error.clone(),
        });
    }
    if !payload.is_success() {
        warn!("{} answered {}", payload.url, payload.status);
        return Err(Error::Status {
            status: payload.status,
            url: payload.url,
        });
    }

    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn payload(status: u16, body: &'static str) -> Payload {
        Payload {
            status,
            url: "http://example.invalid/api/course/X".into(),
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[test]
    fn error_key_wins_over_status() {
        let err = decode::<Value>(payload(404, r#"{"Error":"Course not found"}"#)).unwrap_err();
        match err {
            Error::Service { payload } => assert_eq!(payload, "Course not found"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn html_error_page_is_a_status_error() {
        let err = decode::<Value>(payload(502, "<html>Bad Gateway</html>")).unwrap_err();
        assert!(matches!(err, Error::Status { status: 502, .. }));
    }

    #[test]
    fn garbage_with_ok_status_is_a_decode_error() {
        let err = decode::<Value>(payload(200, "not json")).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn json_without_error_key_on_failure_status() {
        let err = decode::<Value>(payload(500, r#"{"message":"boom"}"#)).unwrap_err();
        assert!(err.is_transport());
    }
}
