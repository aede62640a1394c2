use chrono::{NaiveDate, Timelike};
use quiz_portal::models::{
    Chapter, Quiz, Role, ScoreRecord, Session, Subject, duration_hhmm, timestamp,
};
use serde_json::json;

// --- Wire Helpers ---

#[test]
fn test_duration_parsing() {
    assert_eq!(duration_hhmm::parse("01:30"), Some(90));
    assert_eq!(duration_hhmm::parse("00:45:00"), Some(45));
    assert_eq!(duration_hhmm::parse("2:05:59"), Some(125));
    assert_eq!(duration_hhmm::parse(" 10:00 "), Some(600));

    for bad in ["", "90", "01:60", "01:30:60", "1:2:3:4", "ab:cd"] {
        assert_eq!(duration_hhmm::parse(bad), None, "{bad:?}");
    }
}

#[test]
fn test_duration_formatting() {
    assert_eq!(duration_hhmm::format(90), "01:30");
    assert_eq!(duration_hhmm::format(5), "00:05");
    assert_eq!(duration_hhmm::format(0), "00:00");
}

#[test]
fn test_timestamp_formats() {
    let iso = timestamp::parse("2024-01-10T10:30:00").unwrap();
    let python = timestamp::parse("2024-01-10 10:30:00.123456").unwrap();
    let zulu = timestamp::parse("2024-01-10T10:30:00Z").unwrap();

    assert_eq!(iso.date(), NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    assert_eq!(iso, zulu);
    assert_eq!(python.with_nanosecond(0), Some(iso));
    assert!(timestamp::parse("10/01/2024").is_none());
}

// --- Roles & Session ---

#[test]
fn test_role_names() {
    assert_eq!(Role::from_name("admin"), Role::Admin);
    assert_eq!(Role::from_name("Admin"), Role::Admin);
    assert_eq!(Role::from_name("customer"), Role::Customer);
    assert_eq!(Role::from_name("student"), Role::Customer);
    assert_eq!(Role::default(), Role::Customer);
    assert_eq!(serde_json::to_value(Role::Admin).unwrap(), json!("admin"));
}

#[test]
fn test_session_serialization_omits_empty_fields() {
    let session = Session {
        email: "u@example.com".to_string(),
        name: None,
        role: Role::Customer,
        message: None,
    };

    let value = serde_json::to_value(&session).unwrap();
    assert_eq!(value, json!({ "email": "u@example.com", "role": "customer" }));

    let back: Session = serde_json::from_value(value).unwrap();
    assert_eq!(back, session);
}

// --- Catalogue ---

#[test]
fn test_subject_with_nested_chapters() {
    let subject: Subject = serde_json::from_value(json!({
        "sub_id": "s1",
        "sub_name": "Maths",
        "sub_desc": null,
        "chapters": [{ "chp_id": "c1", "chp_name": "Algebra" }]
    }))
    .unwrap();

    assert_eq!(subject.id, "s1");
    assert_eq!(subject.description, "");
    assert_eq!(
        subject.chapters,
        vec![Chapter {
            id: "c1".to_string(),
            name: "Algebra".to_string(),
            description: String::new(),
            question_count: 0,
        }]
    );
}

#[test]
fn test_quiz_serializes_backend_field_names() {
    let quiz: Quiz = serde_json::from_value(json!({
        "q_id": "q1",
        "q_name": "Quiz1",
        "chp_id": "c1",
        "sub_id": "s1",
        "date_of_quiz": "2030-01-15",
        "time_dur": "01:30:00"
    }))
    .unwrap();

    assert_eq!(quiz.duration_minutes, 90);
    assert!(quiz.questions.is_empty());

    let out = serde_json::to_value(&quiz).unwrap();
    assert_eq!(out["time_dur"], "01:30");
    assert_eq!(out["date_of_quiz"], "2030-01-15");
    assert_eq!(out["chp_id"], "c1");
}

#[test]
fn test_quiz_rejects_bad_duration() {
    let result: Result<Quiz, _> = serde_json::from_value(json!({
        "q_id": "q1",
        "q_name": "Quiz1",
        "chp_id": "c1",
        "sub_id": "s1",
        "date_of_quiz": "2030-01-15",
        "time_dur": "ninety"
    }));
    assert!(result.is_err());
}

#[test]
fn test_score_record_without_user_id() {
    let score: ScoreRecord = serde_json::from_value(json!({
        "score_id": "sc1",
        "q_id": "q1",
        "time_stamp": "2024-01-10T10:30:00",
        "total_score": 66.67
    }))
    .unwrap();

    assert_eq!(score.user_id, "");
    assert_eq!(score.timestamp.hour(), 10);
    assert_eq!(score.total_score, 66.67);
}
