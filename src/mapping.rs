//! Turns decoded payloads into catalog values.

use crate::error::{Error, Result};
use crate::registry::Registries;
use crate::structs::*;
use crate::wire::*;
use chrono::{NaiveTime, Weekday};
use std::sync::Arc;

/// Which entry of a course's assessment list becomes `Course::assessment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentSelection {
    First,
    Last,
}

/// The service has always been read as "last entry wins"; whether "first" was meant is unknown.
pub const ASSESSMENT_SELECTION: AssessmentSelection = AssessmentSelection::Last;

pub fn select_assessment<T>(list: Vec<T>, selection: AssessmentSelection) -> Option<T> {
    match selection {
        AssessmentSelection::First => list.into_iter().next(),
        AssessmentSelection::Last => list.into_iter().last(),
    }
}

/// Maps a course record. Persons and areas are resolved through `registries`,
/// so records seen before are shared rather than duplicated.
pub fn map_course(raw: WireCourse, registries: &Registries) -> Course {
    let norwegian_name = match raw.new_norwegian_name {
        Some(name) if !name.is_empty() => Some(name),
        _ => raw.norwegian_name,
    };

    let info_types = raw
        .info_type
        .into_iter()
        .map(|info| InfoType {
            code: info.code,
            name: info.name,
            text: info.text,
        })
        .collect();

    let educational_roles = raw
        .educational_role
        .into_iter()
        .map(|role| EducationalRole {
            role: role.code,
            person: map_person(role.person, registries),
        })
        .collect();

    let subject_areas = raw
        .subject_area
        .into_iter()
        .map(|area| map_area(area, registries))
        .collect();

    Course {
        code: raw.code,
        name: raw.name,
        norwegian_name,
        english_name: raw.english_name,
        version_code: raw.version_code,
        credit: raw.credit,
        credit_type_code: raw.credit_type_code,
        credit_type_name: raw.credit_type_name,
        study_level_code: raw.study_level_code,
        study_level: raw.study_level,
        study_level_name: raw.study_level_name,
        study_programme_code: raw.study_programme_code,
        course_type_code: raw.course_type_code,
        course_type_name: raw.course_type_name,
        grade_rule: raw.grade_rule,
        grade_rule_text: raw.grade_rule_text,
        taught_in_spring: raw.taught_in_spring,
        taught_in_autumn: raw.taught_in_autumn,
        taught_from_term: raw.taught_from_term,
        taught_from_year: raw.taught_from_year,
        taught_in_english: raw.taught_in_english,
        ou_id: raw.ou_id,
        info_types,
        assessment: select_assessment(raw.assessment, ASSESSMENT_SELECTION).map(map_assessment),
        educational_roles,
        education_term: raw.education_term.into_iter().next().map(EducationTerm),
        // one entry per record, unnamed ones included
        mandatory_activities: raw
            .mandatory_activity
            .into_iter()
            .map(|activity| activity.name.unwrap_or_default())
            .collect(),
        subject_areas,
        credit_reductions: raw
            .credit_reduction
            .into_iter()
            .map(|reduction| CreditReduction {
                course_code: reduction.course_code,
                credit_reduction: reduction.credit_reduction,
                from_term: reduction.from_term,
                from_year: reduction.from_year,
            })
            .collect(),
    }
}

fn map_assessment(raw: WireAssessment) -> Assessment {
    Assessment {
        code: raw.code,
        code_name: raw.code_name,
        assessment_form: raw.assessment_form_code,
        assessment_form_description: raw.assessment_form_description,
        date: raw.date,
        other: raw.other,
    }
}

/// Returns the registered person with this id, or registers a new one.
pub fn map_person(raw: WirePerson, registries: &Registries) -> Arc<Person> {
    let id = raw.person_id.clone();
    registries.persons.get_or_create(&id, move || Person {
        id: raw.person_id,
        date_of_birth: raw.date_of_birth,
        gender: raw.gender,
        first_name: raw.first_name,
        last_name: raw.last_name,
        email: raw.email,
        publication_status: raw.publication_status,
        username: raw.username,
        employee: raw.employee,
        affiliated: raw.affiliated,
        student: raw.student,
    })
}

/// Returns the registered area with this code, or registers a new one.
pub fn map_area(raw: WireArea, registries: &Registries) -> Arc<Area> {
    let code = raw.code.clone();
    registries.areas.get_or_create(&code, move || Area {
        code: raw.code,
        name: raw.name,
        norwegian_name: raw.norwegian_name,
        english_name: raw.english_name,
    })
}

/// Maps a schedule. The schedule takes its code and id from the first activity,
/// so an empty activity list is rejected.
pub fn map_schedule(raw: ScheduleDocument) -> Result<Schedule> {
    let first = raw
        .activity
        .first()
        .ok_or_else(|| Error::invalid("activity", "schedule has no activities"))?;
    let code = first
        .course_code
        .clone()
        .ok_or_else(|| Error::invalid("courseCode", "missing on first activity"))?;
    let id = first
        .activity_id
        .clone()
        .ok_or_else(|| Error::invalid("activityId", "missing on first activity"))?;

    let activities = raw
        .activity
        .into_iter()
        .map(map_activity)
        .collect::<Result<Vec<_>>>()?;

    Ok(Schedule {
        code,
        id,
        activities,
    })
}

fn map_activity(raw: WireActivity) -> Result<Activity> {
    let slot = raw.activity_schedules.into_iter().next().ok_or_else(|| {
        Error::invalid(
            "activitySchedules",
            format!(
                "activity {} has no schedule entry",
                raw.activity_acronym.as_deref().unwrap_or("?")
            ),
        )
    })?;

    let locations = slot
        .rooms
        .into_iter()
        .map(|room| Location {
            name: room.location,
            code: room.lydia_code,
        })
        .collect();

    Ok(Activity {
        description: raw.activity_description,
        acronym: raw.activity_acronym,
        start: parse_time("start", &slot.start)?,
        end: parse_time("end", &slot.end)?,
        day_of_week: day_of_week(slot.day_number)?,
        weeks: parse_weeks(slot.weeks.as_deref().unwrap_or_default())?,
        locations,
    })
}

/// Day numbers count from Monday = 0.
pub fn day_of_week(day_number: i64) -> Result<Weekday> {
    u8::try_from(day_number)
        .ok()
        .and_then(|n| Weekday::try_from(n).ok())
        .ok_or_else(|| Error::invalid("dayNumber", format!("{day_number} is not in 0..=6")))
}

fn parse_time(field: &'static str, text: &str) -> Result<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .map_err(|e| Error::invalid(field, format!("{text:?}: {e}")))
}

/// Parses a comma separated week list such as `"1,2,3"` or `"34-36,40"`.
pub fn parse_weeks(text: &str) -> Result<Vec<u8>> {
    let mut weeks = Vec::new();
    for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.split_once('-') {
            Some((from, to)) => {
                let (from, to) = (parse_week(from)?, parse_week(to)?);
                if from > to {
                    return Err(Error::invalid("weeks", format!("reversed range {token:?}")));
                }
                weeks.extend(from..=to);
            }
            None => weeks.push(parse_week(token)?),
        }
    }
    Ok(weeks)
}

fn parse_week(token: &str) -> Result<u8> {
    token
        .trim()
        .parse()
        .map_err(|_| Error::invalid("weeks", format!("{token:?} is not a week number")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn course(value: serde_json::Value) -> WireCourse {
        serde_json::from_value::<CourseDocument>(value).unwrap().course
    }

    #[test]
    fn weeks_split_on_commas() {
        assert_eq!(parse_weeks("1,2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_weeks(" 34-36, 40 ").unwrap(), vec![34, 35, 36, 40]);
        assert!(parse_weeks("").unwrap().is_empty());
        assert!(parse_weeks("1,x").unwrap_err().is_decode());
        assert!(parse_weeks("9-3").is_err());
    }

    #[test]
    fn day_zero_is_monday() {
        assert_eq!(day_of_week(0).unwrap(), Weekday::Mon);
        assert_eq!(day_of_week(6).unwrap(), Weekday::Sun);
        assert!(day_of_week(7).is_err());
        assert!(day_of_week(-1).is_err());
    }

    #[test]
    fn assessment_selection() {
        assert_eq!(select_assessment(vec![1, 2, 3], AssessmentSelection::Last), Some(3));
        assert_eq!(select_assessment(vec![1, 2, 3], AssessmentSelection::First), Some(1));
        assert_eq!(select_assessment(Vec::<u8>::new(), ASSESSMENT_SELECTION), None);
    }

    #[test]
    fn norwegian_name_prefers_new_name() {
        let registries = Registries::new();
        let mapped = map_course(
            course(json!({ "course": {
                "code": "TDT4100",
                "norwegianName": "Objektorientert programmering",
                "newNorwegianName": "Objektorientert programmering (ny)"
            }})),
            &registries,
        );
        assert_eq!(
            mapped.norwegian_name.as_deref(),
            Some("Objektorientert programmering (ny)")
        );

        let mapped = map_course(
            course(json!({ "course": {
                "code": "TDT4100",
                "norwegianName": "Objektorientert programmering",
                "newNorwegianName": ""
            }})),
            &registries,
        );
        assert_eq!(
            mapped.norwegian_name.as_deref(),
            Some("Objektorientert programmering")
        );

        let mapped = map_course(
            course(json!({ "course": {
                "code": "TDT4100",
                "norwegianName": "Objektorientert programmering"
            }})),
            &registries,
        );
        assert_eq!(
            mapped.norwegian_name.as_deref(),
            Some("Objektorientert programmering")
        );
    }

    #[test]
    fn mandatory_activities_keep_one_entry_per_record() {
        let mapped = map_course(
            course(json!({ "course": {
                "code": "TDT4100",
                "mandatoryActivity": [{ "name": "Øvinger" }, { "number": 2 }, { "name": "Prosjekt" }]
            }})),
            &Registries::new(),
        );
        assert_eq!(mapped.mandatory_activities, vec!["Øvinger", "", "Prosjekt"]);
    }

    #[test]
    fn shared_person_resolves_to_one_instance() {
        let registries = Registries::new();
        let mapped = map_course(
            course(json!({ "course": {
                "code": "TDT4100",
                "educationalRole": [
                    { "code": "Coordinator", "person": { "personId": 7, "firstName": "Kari" } },
                    { "code": "Lecturer", "person": { "personId": 7, "firstName": "Kari" } }
                ]
            }})),
            &registries,
        );
        assert!(Arc::ptr_eq(
            &mapped.educational_roles[0].person,
            &mapped.educational_roles[1].person
        ));
        assert_eq!(registries.persons.len(), 1);
    }

    #[test]
    fn schedule_without_activities_fails() {
        let err = map_schedule(ScheduleDocument { activity: vec![] }).unwrap_err();
        assert!(matches!(err, Error::Invalid { field: "activity", .. }));
    }

    #[test]
    fn activity_without_schedule_entry_fails() {
        let doc: ScheduleDocument = serde_json::from_value(json!({ "activity": [{
            "courseCode": "TDT4100",
            "activityId": "1",
            "activityAcronym": "FOR",
            "activitySchedules": []
        }]}))
        .unwrap();
        let err = map_schedule(doc).unwrap_err();
        assert!(matches!(err, Error::Invalid { field: "activitySchedules", .. }));
    }
}
