use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::{
    api::{ApiResponse, ApiState, path_with_query},
    error::StoreError,
    models::{
        AdminStats, Chapter, ChapterUpdate, ExportStatus, ExportTask, NewChapter, NewQuestion,
        NewQuiz, NewSubject, Question, QuestionUpdate, Quiz, QuizAnswers, QuizAttempt,
        QuizListing, QuizSubmission, QuizUpdate, ScoreFilter, ScoreRecord, Subject,
        SubjectUpdate, UpcomingQuizSummary, UserDashboard, UserRecord, duration_hhmm,
    },
};

/// QuizStore
///
/// Client-side copy of the quiz catalogue and the signed-in user's results.
///
/// Every operation runs in two phases: the request, then reconciliation of the local
/// collections. Reconciliation is a full replace of the owning collection, fetched
/// again from the backend after a write:
///
/// | collection         | refreshed from                      |
/// |--------------------|-------------------------------------|
/// | subjects, chapters | `GET /api/subjects`                 |
/// | quizzes            | `GET /api/quizzes`                  |
/// | one quiz's questions | `GET /api/quizzes/{id}/questions` |
/// | upcoming quizzes   | `GET /api/upcoming-quizzes`         |
/// | user scores        | `GET /api/scores`                   |
///
/// Once the backend has accepted a write, the operation succeeds. If the refresh that
/// follows fails, the collection keeps its previous contents and the refresh error is
/// left in `error()`, but the caller still gets `Ok`: reporting a committed create or
/// a graded submission as failed would invite a duplicate retry.
///
/// `loading` is set for the whole of one operation (request and refresh) and `error`
/// keeps the message of the last failure until the next operation starts.
///
/// Reporting calls (dashboards, admin search, exports) return their result directly
/// and leave the collections alone.
pub struct QuizStore {
    api: ApiState,
    subjects: Vec<Subject>,
    quizzes: Vec<Quiz>,
    upcoming_quizzes: Vec<UpcomingQuizSummary>,
    user_scores: Vec<ScoreRecord>,
    loading: bool,
    error: Option<String>,
}

impl QuizStore {
    pub fn new(api: ApiState) -> Self {
        Self {
            api,
            subjects: Vec::new(),
            quizzes: Vec::new(),
            upcoming_quizzes: Vec::new(),
            user_scores: Vec::new(),
            loading: false,
            error: None,
        }
    }

    // --- State ---

    /// Subjects with their chapters nested, in backend order.
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Every quiz in the catalogue. A quiz's `questions` are only filled once a
    /// question has been added, edited or removed through this store.
    pub fn quizzes(&self) -> &[Quiz] {
        &self.quizzes
    }

    pub fn upcoming_quizzes(&self) -> &[UpcomingQuizSummary] {
        &self.upcoming_quizzes
    }

    /// The signed-in user's graded attempts.
    pub fn user_scores(&self) -> &[ScoreRecord] {
        &self.user_scores
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failure, or of a refresh that failed after a committed write.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // --- Lookups (local only, never fetch) ---

    pub fn subject_by_id(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    /// chapter_by_id
    ///
    /// Searches the chapters of every loaded subject. Chapter ids are unique across
    /// subjects on the backend, so the first match is the only one.
    pub fn chapter_by_id(&self, id: &str) -> Option<&Chapter> {
        self.subjects
            .iter()
            .flat_map(|s| s.chapters.iter())
            .find(|c| c.id == id)
    }

    pub fn quiz_by_id(&self, id: &str) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.id == id)
    }

    /// Looks in the upcoming list only; a past quiz is found through `quiz_by_id`.
    pub fn upcoming_quiz_by_id(&self, id: &str) -> Option<&UpcomingQuizSummary> {
        self.upcoming_quizzes.iter().find(|q| q.quiz_id == id)
    }

    // --- Collection Fetches ---

    /// fetch_subjects
    ///
    /// Replaces the subject list (and every nested chapter) with the backend's. Ids
    /// that are gone on the backend are gone locally afterwards.
    pub async fn fetch_subjects(&mut self) -> Result<(), StoreError> {
        self.begin();
        let result = self.load_subjects().await;
        self.finish(result)
    }

    pub async fn fetch_quizzes(&mut self) -> Result<(), StoreError> {
        self.begin();
        let result = self.load_quizzes().await;
        self.finish(result)
    }

    /// Replaces the upcoming list with exactly what the backend returns; quizzes that
    /// are no longer upcoming disappear.
    pub async fn fetch_upcoming_quizzes(&mut self) -> Result<(), StoreError> {
        self.begin();
        let result = self.load_upcoming().await;
        self.finish(result)
    }

    pub async fn fetch_user_scores(&mut self) -> Result<(), StoreError> {
        self.begin();
        let result = self.load_scores().await;
        self.finish(result)
    }

    // --- Content Management (admin) ---

    /// add_subject
    ///
    /// Creates a subject and returns it as the refreshed subject list reports it.
    pub async fn add_subject(&mut self, new: NewSubject) -> Result<Subject, StoreError> {
        self.begin();
        let result = self.create_subject(new).await;
        self.finish(result)
    }

    async fn create_subject(&mut self, new: NewSubject) -> Result<Subject, StoreError> {
        let id = new_id();
        let response = self
            .api
            .post(
                "/api/subjects",
                json!({ "sub_id": id, "sub_name": new.name, "sub_desc": new.description }),
            )
            .await?;
        expect_success(&response, "Failed to add subject")?;

        self.refresh(Reload::Subjects).await;
        Ok(self.subject_by_id(&id).cloned().unwrap_or(Subject {
            id,
            name: new.name,
            description: new.description,
            chapters: Vec::new(),
        }))
    }

    /// add_chapter
    ///
    /// The subject must already be loaded; otherwise nothing is sent.
    pub async fn add_chapter(
        &mut self,
        subject_id: &str,
        new: NewChapter,
    ) -> Result<Chapter, StoreError> {
        self.begin();
        let result = self.create_chapter(subject_id, new).await;
        self.finish(result)
    }

    async fn create_chapter(
        &mut self,
        subject_id: &str,
        new: NewChapter,
    ) -> Result<Chapter, StoreError> {
        if self.subject_by_id(subject_id).is_none() {
            return Err(StoreError::NotFound("Subject not found".to_string()));
        }

        let id = new_id();
        let response = self
            .api
            .post(
                &format!("/api/subjects/{subject_id}/chapters"),
                json!({ "chp_id": id, "chp_name": new.name, "chp_desc": new.description }),
            )
            .await?;
        expect_success(&response, "Failed to add chapter")?;

        self.refresh(Reload::Subjects).await;
        Ok(self.chapter_by_id(&id).cloned().unwrap_or(Chapter {
            id,
            name: new.name,
            description: new.description,
            question_count: 0,
        }))
    }

    /// add_quiz
    ///
    /// The chapter must be loaded and belong to the given subject. An unnamed quiz is
    /// called `Quiz{n}`, n being its position after the ones already loaded.
    pub async fn add_quiz(&mut self, new: NewQuiz) -> Result<Quiz, StoreError> {
        self.begin();
        let result = self.create_quiz(new).await;
        self.finish(result)
    }

    async fn create_quiz(&mut self, new: NewQuiz) -> Result<Quiz, StoreError> {
        let subject = self
            .subject_by_id(&new.subject_id)
            .ok_or_else(|| StoreError::NotFound("Subject not found".to_string()))?;
        if !subject.chapters.iter().any(|c| c.id == new.chapter_id) {
            return Err(StoreError::NotFound("Chapter not found".to_string()));
        }

        let id = new_id();
        let name = new
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Quiz{}", self.quizzes.len() + 1));

        let response = self
            .api
            .post(
                &format!("/api/chapters/{}/quizzes", new.chapter_id),
                json!({
                    "q_id": id,
                    "q_name": name,
                    "sub_id": new.subject_id,
                    "date_of_quiz": new.scheduled_date,
                    "time_dur": duration_hhmm::format(new.duration_minutes),
                    "remarks": new.remarks,
                }),
            )
            .await?;
        expect_success(&response, "Failed to add quiz")?;

        self.refresh(Reload::Quizzes).await;
        Ok(self.quiz_by_id(&id).cloned().unwrap_or(Quiz {
            id,
            name,
            chapter_id: new.chapter_id,
            subject_id: new.subject_id,
            scheduled_date: new.scheduled_date,
            duration_minutes: new.duration_minutes,
            remarks: new.remarks,
            questions: Vec::new(),
        }))
    }

    /// add_question
    ///
    /// The quiz must be loaded, and `correct_option` must index into `options`.
    pub async fn add_question(
        &mut self,
        quiz_id: &str,
        new: NewQuestion,
    ) -> Result<Question, StoreError> {
        self.begin();
        let result = self.create_question(quiz_id, new).await;
        self.finish(result)
    }

    async fn create_question(
        &mut self,
        quiz_id: &str,
        new: NewQuestion,
    ) -> Result<Question, StoreError> {
        let quiz = self
            .quiz_by_id(quiz_id)
            .ok_or_else(|| StoreError::NotFound("Quiz not found".to_string()))?;
        if new.correct_option >= new.options.len() {
            return Err(StoreError::Validation(INVALID_CORRECT_OPTION.to_string()));
        }

        let id = new_id();
        let answer = new.correct_option.to_string();
        // The question row repeats its quiz's subject and chapter.
        let payload = json!({
            "ques_id": id,
            "sub_id": quiz.subject_id,
            "chp_id": quiz.chapter_id,
            "statement": new.statement,
            "options": new.options,
            "answer": answer,
        });

        let response = self
            .api
            .post(&format!("/api/quizzes/{quiz_id}/questions"), payload)
            .await?;
        expect_success(&response, "Failed to add question")?;

        self.refresh(Reload::Questions(quiz_id)).await;
        let stored = self
            .quiz_by_id(quiz_id)
            .and_then(|q| q.questions.iter().find(|question| question.id == id))
            .cloned();
        Ok(stored.unwrap_or(Question {
            id,
            statement: new.statement,
            options: new.options,
            answer,
        }))
    }

    /// update_subject
    ///
    /// Sends only the fields that are set. The subject must be loaded.
    pub async fn update_subject(
        &mut self,
        subject_id: &str,
        update: SubjectUpdate,
    ) -> Result<(), StoreError> {
        self.begin();
        let result = self.edit_subject(subject_id, update).await;
        self.finish(result)
    }

    async fn edit_subject(
        &mut self,
        subject_id: &str,
        update: SubjectUpdate,
    ) -> Result<(), StoreError> {
        if self.subject_by_id(subject_id).is_none() {
            return Err(StoreError::NotFound("Subject not found".to_string()));
        }
        let payload = changes([
            ("sub_name", update.name.map(Value::from)),
            ("sub_desc", update.description.map(Value::from)),
        ])?;

        self.put_and_reload(
            &format!("/api/subjects/{subject_id}"),
            payload,
            "Failed to update subject",
            Reload::Subjects,
        )
        .await
    }

    /// Same contract as `update_subject`, for a chapter of any loaded subject.
    pub async fn update_chapter(
        &mut self,
        chapter_id: &str,
        update: ChapterUpdate,
    ) -> Result<(), StoreError> {
        self.begin();
        let result = self.edit_chapter(chapter_id, update).await;
        self.finish(result)
    }

    async fn edit_chapter(
        &mut self,
        chapter_id: &str,
        update: ChapterUpdate,
    ) -> Result<(), StoreError> {
        if self.chapter_by_id(chapter_id).is_none() {
            return Err(StoreError::NotFound("Chapter not found".to_string()));
        }
        let payload = changes([
            ("chp_name", update.name.map(Value::from)),
            ("chp_desc", update.description.map(Value::from)),
        ])?;

        self.put_and_reload(
            &format!("/api/chapters/{chapter_id}"),
            payload,
            "Failed to update chapter",
            Reload::Subjects,
        )
        .await
    }

    /// update_quiz
    ///
    /// Reschedules, renames or retimes a loaded quiz. The duration goes out as `HH:MM`
    /// like on creation.
    pub async fn update_quiz(
        &mut self,
        quiz_id: &str,
        update: QuizUpdate,
    ) -> Result<(), StoreError> {
        self.begin();
        let result = self.edit_quiz(quiz_id, update).await;
        self.finish(result)
    }

    async fn edit_quiz(&mut self, quiz_id: &str, update: QuizUpdate) -> Result<(), StoreError> {
        if self.quiz_by_id(quiz_id).is_none() {
            return Err(StoreError::NotFound("Quiz not found".to_string()));
        }
        let payload = changes([
            ("q_name", update.name.map(Value::from)),
            ("date_of_quiz", update.scheduled_date.map(|d| json!(d))),
            (
                "time_dur",
                update
                    .duration_minutes
                    .map(|m| Value::from(duration_hhmm::format(m))),
            ),
            ("remarks", update.remarks.map(Value::from)),
        ])?;

        self.put_and_reload(
            &format!("/api/quizzes/{quiz_id}"),
            payload,
            "Failed to update quiz",
            Reload::Quizzes,
        )
        .await
    }

    /// update_question
    ///
    /// Edits one question of a loaded quiz. A new `correct_option` is checked against
    /// the new options when they are part of the update, or else against the
    /// question's current options when those are loaded.
    pub async fn update_question(
        &mut self,
        quiz_id: &str,
        question_id: &str,
        update: QuestionUpdate,
    ) -> Result<(), StoreError> {
        self.begin();
        let result = self.edit_question(quiz_id, question_id, update).await;
        self.finish(result)
    }

    async fn edit_question(
        &mut self,
        quiz_id: &str,
        question_id: &str,
        update: QuestionUpdate,
    ) -> Result<(), StoreError> {
        let quiz = self
            .quiz_by_id(quiz_id)
            .ok_or_else(|| StoreError::NotFound("Quiz not found".to_string()))?;

        if let Some(index) = update.correct_option {
            let options = update.options.as_deref().or_else(|| {
                quiz.questions
                    .iter()
                    .find(|q| q.id == question_id)
                    .map(|q| q.options.as_slice())
            });
            if options.is_some_and(|options| index >= options.len()) {
                return Err(StoreError::Validation(INVALID_CORRECT_OPTION.to_string()));
            }
        }

        let payload = changes([
            ("statement", update.statement.map(Value::from)),
            ("options", update.options.map(|o| json!(o))),
            ("answer", update.correct_option.map(|i| Value::from(i.to_string()))),
        ])?;

        self.put_and_reload(
            &format!("/api/questions/{question_id}"),
            payload,
            "Failed to update question",
            Reload::Questions(quiz_id),
        )
        .await
    }

    /// delete_subject
    ///
    /// The backend removes the subject's chapters with it, so one refresh of the
    /// subject list covers both.
    pub async fn delete_subject(&mut self, subject_id: &str) -> Result<(), StoreError> {
        self.begin();
        let result = self
            .remove_and_reload(
                &format!("/api/subjects/{subject_id}"),
                "Failed to delete subject",
                Reload::Subjects,
            )
            .await;
        self.finish(result)
    }

    pub async fn delete_chapter(&mut self, chapter_id: &str) -> Result<(), StoreError> {
        self.begin();
        let result = self
            .remove_and_reload(
                &format!("/api/chapters/{chapter_id}"),
                "Failed to delete chapter",
                Reload::Subjects,
            )
            .await;
        self.finish(result)
    }

    pub async fn delete_quiz(&mut self, quiz_id: &str) -> Result<(), StoreError> {
        self.begin();
        let result = self
            .remove_and_reload(
                &format!("/api/quizzes/{quiz_id}"),
                "Failed to delete quiz",
                Reload::Quizzes,
            )
            .await;
        self.finish(result)
    }

    /// Questions are addressed by their own id; `quiz_id` only picks which quiz's
    /// question list to refresh afterwards.
    pub async fn delete_question(
        &mut self,
        quiz_id: &str,
        question_id: &str,
    ) -> Result<(), StoreError> {
        self.begin();
        let result = self
            .remove_and_reload(
                &format!("/api/questions/{question_id}"),
                "Failed to delete question",
                Reload::Questions(quiz_id),
            )
            .await;
        self.finish(result)
    }

    // --- Reporting (admin) ---

    pub async fn fetch_admin_stats(&mut self) -> Result<AdminStats, StoreError> {
        self.begin();
        let result = self
            .get_json("/api/admin/dashboard", "Failed to load dashboard")
            .await;
        self.finish(result)
    }

    /// search_users
    ///
    /// Accounts whose name or email contains `query`, case-insensitively. An empty
    /// query lists every account.
    pub async fn search_users(&mut self, query: &str) -> Result<Vec<UserRecord>, StoreError> {
        self.begin();
        let path = path_with_query("/api/admin/users", &[("q", query)]);
        let result = self.get_json(&path, "Failed to search users").await;
        self.finish(result)
    }

    /// Quizzes whose name contains `query`; an empty query lists them all.
    pub async fn search_quizzes(&mut self, query: &str) -> Result<Vec<QuizListing>, StoreError> {
        self.begin();
        let path = path_with_query("/api/admin/quizzes", &[("q", query)]);
        let result = self.get_json(&path, "Failed to search quizzes").await;
        self.finish(result)
    }

    /// search_scores
    ///
    /// Every recorded attempt, optionally narrowed to one user and/or one quiz. Unlike
    /// `fetch_user_scores` this spans all accounts, and `user_scores` is left alone.
    pub async fn search_scores(
        &mut self,
        filter: &ScoreFilter,
    ) -> Result<Vec<ScoreRecord>, StoreError> {
        self.begin();
        let path = path_with_query(
            "/api/admin/scores",
            &[
                ("user_id", filter.user_id.as_deref().unwrap_or_default()),
                ("q_id", filter.quiz_id.as_deref().unwrap_or_default()),
            ],
        );
        let result = self.get_json(&path, "Failed to search scores").await;
        self.finish(result)
    }

    // --- CSV Export ---

    /// export_user_scores
    ///
    /// Queues a CSV of the caller's own scores. The file is produced in the background;
    /// poll `export_status` with the returned task id.
    pub async fn export_user_scores(&mut self) -> Result<ExportTask, StoreError> {
        self.begin();
        let result = self
            .post_json("/api/export/user-scores", "Failed to start export")
            .await;
        self.finish(result)
    }

    /// Admin variant of `export_user_scores`, covering every account.
    pub async fn export_all_scores(&mut self) -> Result<ExportTask, StoreError> {
        self.begin();
        let result = self
            .post_json("/api/export/all-scores", "Failed to start export")
            .await;
        self.finish(result)
    }

    pub async fn export_status(&mut self, task_id: &str) -> Result<ExportStatus, StoreError> {
        self.begin();
        let result = self
            .get_json(
                &format!("/api/export/status/{task_id}"),
                "Failed to check export status",
            )
            .await;
        self.finish(result)
    }

    // --- Quiz Taking (customer) ---

    /// start_quiz
    ///
    /// Loads the question set for an attempt. The catalogue is left as it is.
    pub async fn start_quiz(&mut self, quiz_id: &str) -> Result<QuizAttempt, StoreError> {
        self.begin();
        let result = self
            .get_json(&format!("/api/quizzes/{quiz_id}/start"), "Failed to start quiz")
            .await;
        self.finish(result)
    }

    /// submit_quiz_score
    ///
    /// Sends the chosen options for grading. The backend computes and records the
    /// score; the score list is then fetched again so it includes the new attempt.
    /// Once graded, the submission is returned even if that refresh fails.
    pub async fn submit_quiz_score(
        &mut self,
        quiz_id: &str,
        answers: &QuizAnswers,
    ) -> Result<QuizSubmission, StoreError> {
        self.begin();
        let result = self.submit_answers(quiz_id, answers).await;
        self.finish(result)
    }

    async fn submit_answers(
        &mut self,
        quiz_id: &str,
        answers: &QuizAnswers,
    ) -> Result<QuizSubmission, StoreError> {
        let response = self
            .api
            .post(
                &format!("/api/quizzes/{quiz_id}/submit"),
                json!({ "answers": answers }),
            )
            .await?;
        let submission: QuizSubmission = decode(&response, "Failed to submit quiz")?;
        tracing::info!(quiz_id, score = submission.score, "quiz submitted");

        self.refresh(Reload::Scores).await;
        Ok(submission)
    }

    /// The caller's most recent attempt at one quiz. Not merged into `user_scores`.
    pub async fn latest_score_for_quiz(
        &mut self,
        quiz_id: &str,
    ) -> Result<ScoreRecord, StoreError> {
        self.begin();
        let result = self
            .get_json(&format!("/api/scores/{quiz_id}"), "No score found for this quiz")
            .await;
        self.finish(result)
    }

    // --- Reporting (customer) ---

    /// fetch_user_dashboard
    ///
    /// The summary view's data in one call: attempted quiz ids, the caller's scores
    /// and the full quiz list.
    pub async fn fetch_user_dashboard(&mut self) -> Result<UserDashboard, StoreError> {
        self.begin();
        let result = self
            .get_json("/api/user/dashboard", "Failed to load dashboard")
            .await;
        self.finish(result)
    }

    // --- Internals ---

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn finish<T>(&mut self, result: Result<T, StoreError>) -> Result<T, StoreError> {
        self.loading = false;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "quiz store operation failed");
            self.error = Some(e.to_string());
        }
        result
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &str,
    ) -> Result<T, StoreError> {
        let response = self.api.get(path).await?;
        decode(&response, fallback)
    }

    // The export triggers take no parameters; the backend reads the caller from the
    // session.
    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &str,
    ) -> Result<T, StoreError> {
        let response = self.api.post(path, json!({})).await?;
        decode(&response, fallback)
    }

    async fn put_and_reload(
        &mut self,
        path: &str,
        payload: Value,
        fallback: &str,
        reload: Reload<'_>,
    ) -> Result<(), StoreError> {
        let response = self.api.put(path, payload).await?;
        expect_success(&response, fallback)?;
        self.refresh(reload).await;
        Ok(())
    }

    async fn remove_and_reload(
        &mut self,
        path: &str,
        fallback: &str,
        reload: Reload<'_>,
    ) -> Result<(), StoreError> {
        let response = self.api.delete(path).await?;
        expect_success(&response, fallback)?;
        self.refresh(reload).await;
        Ok(())
    }

    /// Reconciles after a committed write. A failure does not undo the write, so it is
    /// recorded in `error` and the local collection keeps its previous contents.
    async fn refresh(&mut self, reload: Reload<'_>) {
        let result = match reload {
            Reload::Subjects => self.load_subjects().await,
            Reload::Quizzes => self.load_quizzes().await,
            Reload::Questions(quiz_id) => self.load_questions(quiz_id).await,
            Reload::Scores => self.load_scores().await,
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "refresh after committed write failed");
            self.error = Some(e.to_string());
        }
    }

    async fn load_upcoming(&mut self) -> Result<(), StoreError> {
        self.upcoming_quizzes = self
            .get_json("/api/upcoming-quizzes", "Failed to fetch upcoming quizzes")
            .await?;
        Ok(())
    }

    async fn load_subjects(&mut self) -> Result<(), StoreError> {
        self.subjects = self
            .get_json("/api/subjects", "Failed to fetch subjects")
            .await?;
        Ok(())
    }

    async fn load_quizzes(&mut self) -> Result<(), StoreError> {
        self.quizzes = self
            .get_json("/api/quizzes", "Failed to fetch quizzes")
            .await?;
        Ok(())
    }

    async fn load_scores(&mut self) -> Result<(), StoreError> {
        self.user_scores = self
            .get_json("/api/scores", "Failed to fetch scores")
            .await?;
        Ok(())
    }

    /// Replaces the questions of one loaded quiz. A quiz that has been dropped from the
    /// catalogue in the meantime is left alone.
    async fn load_questions(&mut self, quiz_id: &str) -> Result<(), StoreError> {
        let questions: Vec<Question> = self
            .get_json(
                &format!("/api/quizzes/{quiz_id}/questions"),
                "Failed to fetch questions",
            )
            .await?;
        if let Some(quiz) = self.quizzes.iter_mut().find(|q| q.id == quiz_id) {
            quiz.questions = questions;
        }
        Ok(())
    }
}

const INVALID_CORRECT_OPTION: &str = "Correct option must be one of the listed options";

/// Which collection a write invalidates.
enum Reload<'a> {
    Subjects,
    Quizzes,
    Questions(&'a str),
    Scores,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builds a partial-update body from the fields that are set. An update that sets
/// nothing is refused before it reaches the network.
fn changes<const N: usize>(fields: [(&str, Option<Value>); N]) -> Result<Value, StoreError> {
    let body: Map<String, Value> = fields
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect();
    if body.is_empty() {
        return Err(StoreError::Validation("Nothing to update".to_string()));
    }
    Ok(Value::Object(body))
}

fn expect_success(response: &ApiResponse, fallback: &str) -> Result<(), StoreError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(StoreError::rejected(
            response.status,
            response.error_message(fallback),
        ))
    }
}

fn decode<T: DeserializeOwned>(response: &ApiResponse, fallback: &str) -> Result<T, StoreError> {
    expect_success(response, fallback)?;
    Ok(response.decode()?)
}
