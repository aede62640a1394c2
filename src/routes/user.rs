use super::{RouteEntry, View};

/// User Route Table
///
/// Screens for customers: browsing, taking quizzes, reviewing results.
pub fn user_routes() -> Vec<RouteEntry> {
    vec![
        // Upcoming quizzes.
        RouteEntry::View {
            pattern: "/user/dashboard",
            view: View::UserDashboard,
        },
        RouteEntry::View {
            pattern: "/user/scores",
            view: View::UserScores,
        },
        RouteEntry::View {
            pattern: "/user/summary",
            view: View::UserSummary,
        },
        // An attempt in progress; `quiz_id` is passed to `QuizStore::start_quiz`.
        RouteEntry::View {
            pattern: "/user/quiz/{quiz_id}",
            view: View::QuizTaking,
        },
    ]
}
