use chrono::{NaiveTime, Weekday};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    pub code: String,
    pub name: Option<String>,
    /// "newNorwegianName" when set, otherwise "norwegianName"
    pub norwegian_name: Option<String>,
    pub english_name: Option<String>,
    pub version_code: Option<String>,
    pub credit: Option<f64>,
    pub credit_type_code: Option<String>,
    pub credit_type_name: Option<String>,
    pub study_level_code: Option<String>,
    pub study_level: Option<i64>,
    pub study_level_name: Option<String>,
    pub study_programme_code: Option<String>,
    pub course_type_code: Option<String>,
    pub course_type_name: Option<String>,
    pub grade_rule: Option<String>,
    pub grade_rule_text: Option<String>,
    pub taught_in_spring: Option<bool>,
    pub taught_in_autumn: Option<bool>,
    pub taught_from_term: Option<String>,
    pub taught_from_year: Option<i32>,
    pub taught_in_english: Option<bool>,
    pub ou_id: Option<i64>,
    pub info_types: Vec<InfoType>,
    pub assessment: Option<Assessment>,
    pub educational_roles: Vec<EducationalRole>,
    pub education_term: Option<EducationTerm>,
    pub mandatory_activities: Vec<String>,
    pub subject_areas: Vec<Arc<Area>>,
    pub credit_reductions: Vec<CreditReduction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub publication_status: Option<String>,
    pub username: Option<String>,
    pub employee: Option<bool>,
    pub affiliated: Option<bool>,
    pub student: Option<bool>,
}

impl Person {
    pub fn full_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.clone(),
            (None, None) => String::new(),
        }
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// A subject-area tag, shared between every course that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub code: String,
    pub name: Option<String>,
    pub norwegian_name: Option<String>,
    pub english_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoType {
    pub code: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
}

impl fmt::Display for InfoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code.as_deref().unwrap_or_default())
    }
}

/// One assessment entry. Fields the client does not interpret are kept in `other`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub code: Option<String>,
    pub code_name: Option<String>,
    pub assessment_form: Option<String>,
    pub assessment_form_description: Option<String>,
    pub date: Option<String>,
    pub other: Map<String, Value>,
}

/// The term record of a course, passed through as the service sends it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EducationTerm(pub Map<String, Value>);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationalRole {
    pub role: Option<String>,
    pub person: Arc<Person>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditReduction {
    pub course_code: Option<String>,
    pub credit_reduction: Option<f64>,
    pub from_term: Option<String>,
    pub from_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    /// Course code of the first activity
    pub code: String,
    /// Activity id of the first activity
    pub id: String,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub description: Option<String>,
    pub acronym: Option<String>,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub day_of_week: Weekday,
    pub weeks: Vec<u8>,
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub name: Option<String>,
    pub code: Option<String>,
}
