//! Payload shapes as the IME API sends them.
//!
//! Required fields are plain types, everything else is optional so a sparse
//! record still decodes. Lists inside a record tolerate both a missing key and
//! an explicit `null`; the top-level course listing must carry its key.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
pub struct CourseDocument {
    pub course: WireCourse,
}

#[derive(Debug, Deserialize)]
pub struct CourseListDocument {
    #[serde(deserialize_with = "nullable_vec")]
    pub course: Vec<WireCourseSummary>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleDocument {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub activity: Vec<WireActivity>,
}

#[derive(Debug, Deserialize)]
pub struct WireCourseSummary {
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCourse {
    pub code: String,
    pub name: Option<String>,
    pub new_norwegian_name: Option<String>,
    pub norwegian_name: Option<String>,
    pub english_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub credit: Option<f64>,
    pub credit_type_code: Option<String>,
    pub credit_type_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub study_level_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub study_level: Option<i64>,
    pub study_level_name: Option<String>,
    pub study_programme_code: Option<String>,
    pub course_type_code: Option<String>,
    pub course_type_name: Option<String>,
    pub grade_rule: Option<String>,
    pub grade_rule_text: Option<String>,
    pub taught_in_spring: Option<bool>,
    pub taught_in_autumn: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub taught_from_term: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub taught_from_year: Option<i32>,
    pub taught_in_english: Option<bool>,
    #[serde(rename = "ouID", default, deserialize_with = "lenient_number")]
    pub ou_id: Option<i64>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub info_type: Vec<WireInfoType>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub assessment: Vec<WireAssessment>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub educational_role: Vec<WireEducationalRole>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub education_term: Vec<Map<String, Value>>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub mandatory_activity: Vec<WireMandatoryActivity>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub subject_area: Vec<WireArea>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub credit_reduction: Vec<WireCreditReduction>,
}

#[derive(Debug, Deserialize)]
pub struct WireInfoType {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAssessment {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    pub code_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub assessment_form_code: Option<String>,
    pub assessment_form_description: Option<String>,
    pub date: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct WireEducationalRole {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    pub person: WirePerson,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePerson {
    #[serde(deserialize_with = "identity")]
    pub person_id: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub publication_status: Option<String>,
    pub username: Option<String>,
    pub employee: Option<bool>,
    pub affiliated: Option<bool>,
    pub student: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct WireMandatoryActivity {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireArea {
    #[serde(deserialize_with = "identity")]
    pub code: String,
    pub name: Option<String>,
    pub norwegian_name: Option<String>,
    pub english_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCreditReduction {
    pub course_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub credit_reduction: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub from_term: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub from_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireActivity {
    pub course_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub activity_id: Option<String>,
    pub activity_description: Option<String>,
    pub activity_acronym: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub activity_schedules: Vec<WireActivitySchedule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireActivitySchedule {
    pub start: String,
    pub end: String,
    pub day_number: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub weeks: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub rooms: Vec<WireRoom>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRoom {
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lydia_code: Option<String>,
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a string, number or bool and keeps its textual form.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected a scalar, found {other}"
        ))),
    }
}

/// Accepts a number or a numeric string; an empty string counts as absent.
fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let text = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(None),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().to_owned(),
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected a number, found {other}"
            )))
        }
    };
    text.parse()
        .map(Some)
        .map_err(|e| serde::de::Error::custom(format!("{text:?}: {e}")))
}

/// Identity keys come as numbers for some records and strings for others.
fn identity<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a non-empty id, found {other}"
        ))),
    }
}
