use super::{RouteEntry, View};

/// Public Route Table
///
/// Entry points reachable without a session.
pub fn public_routes() -> Vec<RouteEntry> {
    vec![
        // The root has no screen of its own.
        RouteEntry::Redirect {
            from: "/",
            to: "/login",
        },
        // Sign-in for both roles; admins switch to the admin form on the same page.
        RouteEntry::View {
            pattern: "/login",
            view: View::Login,
        },
    ]
}
