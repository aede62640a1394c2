use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

// --- Identity ---

/// Role
///
/// Access class of a session: `admin` manages content, `customer` takes quizzes.
/// Role names from the backend go through `from_name`, which maps anything that is
/// not `admin` to `customer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    #[default]
    Customer,
}

impl Role {
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Customer
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
        }
    }
}

/// Session
///
/// The authenticated identity for the current run. Serialized as-is under the `user`
/// storage key and restored from there on startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Session {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// --- Content Hierarchy (Subject > Chapter, Quiz > Question) ---

/// Chapter
///
/// A chapter belongs to exactly one subject and is only ever held inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct Chapter {
    #[serde(rename = "chp_id")]
    pub id: String,
    #[serde(rename = "chp_name")]
    pub name: String,
    #[serde(rename = "chp_desc", default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(rename = "questionCount", default)]
    pub question_count: u32,
}

/// Subject
///
/// Top of the catalogue. The subject listing nests every chapter, so one fetch loads
/// both levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct Subject {
    #[serde(rename = "sub_id")]
    pub id: String,
    #[serde(rename = "sub_name")]
    pub name: String,
    #[serde(rename = "sub_desc", default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

/// Question
///
/// `answer` is the zero-based index of the correct option, string-encoded the way
/// the backend stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct Question {
    #[serde(rename = "ques_id")]
    pub id: String,
    pub statement: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub answer: String,
}

impl Question {
    /// The stored answer as an option index, None when it is not a number.
    pub fn correct_option_index(&self) -> Option<usize> {
        self.answer.trim().parse().ok()
    }
}

/// Quiz
///
/// A scheduled quiz under one chapter. `subject_id` repeats the chapter's subject so
/// a quiz can be filed without looking the chapter up. The duration travels as `HH:MM`
/// (or `HH:MM:SS`) and is held in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quiz {
    #[serde(rename = "q_id")]
    pub id: String,
    #[serde(rename = "q_name")]
    pub name: String,
    #[serde(rename = "chp_id")]
    pub chapter_id: String,
    #[serde(rename = "sub_id")]
    pub subject_id: String,
    #[serde(rename = "date_of_quiz")]
    pub scheduled_date: NaiveDate,
    #[serde(rename = "time_dur", with = "duration_hhmm")]
    #[ts(type = "string")]
    pub duration_minutes: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub remarks: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

// --- Listing Projections & Results ---

/// UpcomingQuizSummary
///
/// Denormalized listing row for the user dashboard. Derived from quizzes on the
/// backend; never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpcomingQuizSummary {
    #[serde(rename = "q_id")]
    pub quiz_id: String,
    #[serde(rename = "q_name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub subject: String,
    pub chapter: String,
    #[serde(rename = "questionCount", default)]
    pub question_count: u32,
    #[serde(rename = "date_of_quiz")]
    pub scheduled_date: NaiveDate,
    #[serde(rename = "time_dur", with = "duration_hhmm")]
    #[ts(type = "string")]
    pub duration_minutes: u32,
}

/// ScoreRecord
///
/// One graded attempt. The backend stores `total_score` as a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreRecord {
    #[serde(rename = "score_id")]
    pub id: String,
    #[serde(rename = "q_id")]
    pub quiz_id: String,
    // The caller's own score list omits this; the admin listing includes it.
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(rename = "time_stamp", with = "timestamp")]
    #[ts(type = "string")]
    pub timestamp: NaiveDateTime,
    pub total_score: f64,
}

/// AttemptQuestion
///
/// A question as served to a quiz taker: no answer key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AttemptQuestion {
    #[serde(rename = "ques_id")]
    pub id: String,
    pub statement: String,
    #[serde(default)]
    pub options: Vec<String>,
}

/// QuizAttempt
///
/// Everything needed to render an attempt in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuizAttempt {
    #[serde(rename = "q_id")]
    pub quiz_id: String,
    #[serde(rename = "q_name")]
    pub name: String,
    #[serde(rename = "date_of_quiz")]
    pub scheduled_date: NaiveDate,
    #[serde(rename = "time_dur", with = "duration_hhmm")]
    #[ts(type = "string")]
    pub duration_minutes: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub remarks: String,
    #[serde(default)]
    pub questions: Vec<AttemptQuestion>,
}

/// QuizSubmission
///
/// Grading result for a submitted attempt. `score` is the percentage of correct answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuizSubmission {
    #[serde(default)]
    pub message: String,
    pub score: f64,
    pub correct: u32,
    pub total: u32,
}

/// AdminStats
///
/// Output of the administrative dashboard endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_quizzes: u64,
    pub total_attempts: u64,
    pub average_score: f64,
}

// --- Reporting (dashboards, admin search, CSV export) ---

/// DashboardScore
///
/// One attempt as listed on the user dashboard. Lighter than `ScoreRecord`: the
/// dashboard endpoint does not send score ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardScore {
    #[serde(rename = "q_id")]
    pub quiz_id: String,
    pub score: f64,
    #[serde(rename = "time_stamp", with = "timestamp")]
    #[ts(type = "string")]
    pub timestamp: NaiveDateTime,
}

/// QuizListing
///
/// Flat quiz row used by the dashboard and the admin search. No duration, no
/// questions. An unscheduled quiz comes back with its date as the text `None`,
/// which is read as no date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuizListing {
    #[serde(rename = "q_id")]
    pub quiz_id: String,
    #[serde(rename = "q_name")]
    pub name: String,
    #[serde(rename = "chp_id")]
    pub chapter_id: String,
    #[serde(rename = "sub_id")]
    pub subject_id: String,
    #[serde(rename = "date_of_quiz", default, deserialize_with = "lenient_date")]
    pub scheduled_date: Option<NaiveDate>,
}

/// UserDashboard
///
/// Everything the user summary view shows in one response: who is signed in, which
/// quizzes they attempted, their scores and the full quiz list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserDashboard {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_name: String,
    #[serde(default)]
    pub attempted_quizzes: Vec<String>,
    #[serde(default)]
    pub scores: Vec<DashboardScore>,
    #[serde(default)]
    pub all_quizzes: Vec<QuizListing>,
}

impl UserDashboard {
    pub fn has_attempted(&self, quiz_id: &str) -> bool {
        self.attempted_quizzes.iter().any(|id| id == quiz_id)
    }
}

/// UserRecord
///
/// A registered account as the admin user search returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(rename = "user_mail")]
    pub email: String,
    #[serde(rename = "user_name", default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub qualification: String,
    #[serde(rename = "dob", default, deserialize_with = "lenient_date")]
    pub date_of_birth: Option<NaiveDate>,
}

/// ScoreFilter
///
/// Narrows the admin score listing. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreFilter {
    pub user_id: Option<String>,
    pub quiz_id: Option<String>,
}

/// ExportTask
///
/// Handle for a CSV export running in the backend's worker queue. Poll it with
/// `QuizStore::export_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExportTask {
    pub task_id: String,
    #[serde(default)]
    pub message: String,
}

/// ExportStatus
///
/// Progress of an export. `filename` and `download_url` are only present once the
/// worker reports `SUCCESS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExportStatus {
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl ExportStatus {
    pub fn is_ready(&self) -> bool {
        self.state == "SUCCESS"
    }

    /// The worker gave up; polling again will not change the outcome.
    pub fn is_failed(&self) -> bool {
        matches!(self.state.as_str(), "FAILURE" | "REVOKED")
    }
}

// --- Request Payloads (Input Schemas) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct NewSubject {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct NewChapter {
    pub name: String,
    pub description: String,
}

/// NewQuiz
///
/// When `name` is None the store names the quiz after its position in the list.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewQuiz {
    pub chapter_id: String,
    pub subject_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub scheduled_date: NaiveDate,
    pub duration_minutes: u32,
    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct NewQuestion {
    pub statement: String,
    pub options: Vec<String>,
    pub correct_option: usize,
}

/// RegistrationProfile
///
/// Form data collected at sign-up. The password is sent to the backend once and never
/// stored locally.
#[derive(Debug, Clone, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct RegistrationProfile {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub qualification: String,
    pub date_of_birth: String,
}

/// SubjectUpdate
///
/// Partial edit of a subject. Only the fields that are set are sent; the backend keeps
/// its current value for the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Partial edit of a chapter; same rules as `SubjectUpdate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChapterUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// QuizUpdate
///
/// Partial edit of a quiz. The chapter and subject a quiz belongs to cannot be changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuizUpdate {
    pub name: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub duration_minutes: Option<u32>,
    pub remarks: Option<String>,
}

/// QuestionUpdate
///
/// Partial edit of a question. `correct_option` indexes into the new `options` when
/// both are given, otherwise into the question's current options.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionUpdate {
    pub statement: Option<String>,
    pub options: Option<Vec<String>>,
    pub correct_option: Option<usize>,
}

/// Answers keyed by question id, each the selected option as the backend compares it.
pub type QuizAnswers = BTreeMap<String, String>;

// --- Wire helpers ---

/// Account ids are integers on the users table and strings on the scores table; both
/// are held as text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(n) => n.to_string(),
    })
}

/// Reporting endpoints format dates with Python's `str()`, so a missing date arrives
/// as `"None"` rather than `null`. Anything that is not `YYYY-MM-DD` reads as None.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

/// Nullable text columns come back as `null`; the domain treats them as empty.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Quiz durations travel as `"HH:MM"` (form input) or `"HH:MM:SS"` (database time
/// column) and are held as whole minutes. Seconds are dropped.
pub mod duration_hhmm {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn parse(raw: &str) -> Option<u32> {
        let mut parts = raw.trim().split(':');
        let hours: u32 = parts.next()?.parse().ok()?;
        let minutes: u32 = parts.next()?.parse().ok()?;
        if minutes >= 60 {
            return None;
        }
        match parts.next() {
            None => {}
            Some(seconds) if seconds.parse::<u32>().is_ok_and(|s| s < 60) => {}
            Some(_) => return None,
        }
        if parts.next().is_some() {
            return None;
        }
        Some(hours * 60 + minutes)
    }

    pub fn format(minutes: u32) -> String {
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }

    pub fn serialize<S: Serializer>(minutes: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(*minutes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid duration `{raw}`")))
    }
}

/// Score timestamps arrive either ISO-8601 (`2024-01-10T10:30:00`) or in Python's
/// `str(datetime)` form (`2024-01-10 10:30:00.123456`).
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim().trim_end_matches('Z');
        FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.format("%Y-%m-%dT%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
    }
}
