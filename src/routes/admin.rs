use super::{RouteEntry, View};

/// Admin Route Table
///
/// Content management screens. The views read `AuthStore::is_admin` themselves; the
/// table does not filter.
pub fn admin_routes() -> Vec<RouteEntry> {
    vec![
        // Subjects and their chapters.
        RouteEntry::View {
            pattern: "/admin/dashboard",
            view: View::AdminDashboard,
        },
        // Quizzes and their questions.
        RouteEntry::View {
            pattern: "/admin/quiz",
            view: View::AdminQuiz,
        },
        // Aggregate statistics.
        RouteEntry::View {
            pattern: "/admin/summary",
            view: View::AdminSummary,
        },
    ]
}
