//! Route Table Index
//!
//! Organizes the client's path table by audience. Nothing here enforces access: a view
//! decides what to show by reading the auth store.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Sign-in and the root redirect.
pub mod public;

/// Content management views.
pub mod admin;

/// Quiz-taking views.
pub mod user;

/// View
///
/// Identifier of every screen the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    Login,
    AdminDashboard,
    AdminQuiz,
    AdminSummary,
    UserDashboard,
    UserScores,
    UserSummary,
    QuizTaking,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Login => "login",
            View::AdminDashboard => "admin-dashboard",
            View::AdminQuiz => "admin-quiz",
            View::AdminSummary => "admin-summary",
            View::UserDashboard => "user-dashboard",
            View::UserScores => "user-scores",
            View::UserSummary => "user-summary",
            View::QuizTaking => "quiz-taking",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// RouteEntry
///
/// One row of the path table. Pattern segments written `{name}` capture a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteEntry {
    View { pattern: &'static str, view: View },
    Redirect { from: &'static str, to: &'static str },
}

/// RouteMatch
///
/// A resolved path: the view to show, the captured parameters, and the path that was
/// originally requested when a redirect was followed.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    pub view: View,
    pub params: BTreeMap<String, String>,
    pub redirected_from: Option<String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Router
///
/// Path → view table assembled from the per-audience modules.
#[derive(Debug, Clone)]
pub struct Router {
    entries: Vec<RouteEntry>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        let mut entries = public::public_routes();
        entries.extend(admin::admin_routes());
        entries.extend(user::user_routes());
        Self { entries }
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// resolve
    ///
    /// Maps a path to its view. The query string, fragment and one trailing slash are
    /// ignored. Redirects are followed once.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let path = normalize(path);

        for entry in &self.entries {
            match entry {
                RouteEntry::Redirect { from, to } if *from == path => {
                    let mut target = self.resolve(to)?;
                    target.redirected_from = Some(path.to_string());
                    return Some(target);
                }
                RouteEntry::View { pattern, view } => {
                    if let Some(params) = match_pattern(pattern, path) {
                        return Some(RouteMatch {
                            view: *view,
                            params,
                            redirected_from: None,
                        });
                    }
                }
                RouteEntry::Redirect { .. } => {}
            }
        }
        None
    }

    /// path_for
    ///
    /// Builds the path of `view`, filling its parameters from `params`. Returns None if a
    /// required parameter is missing.
    pub fn path_for(&self, view: View, params: &[(&str, &str)]) -> Option<String> {
        let pattern = self.entries.iter().find_map(|entry| match entry {
            RouteEntry::View { pattern, view: v } if *v == view => Some(*pattern),
            _ => None,
        })?;

        let segments = pattern
            .split('/')
            .map(|segment| match param_name(segment) {
                Some(name) => params
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| value.to_string()),
                None => Some(segment.to_string()),
            })
            .collect::<Option<Vec<_>>>()?;
        Some(segments.join("/"))
    }
}

fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ if path.is_empty() => "/",
        _ => path,
    }
}

fn param_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
        match param_name(expected) {
            Some(_) if actual.is_empty() => return None,
            Some(name) => {
                params.insert(name.to_string(), actual.to_string());
            }
            None if expected != actual => return None,
            None => {}
        }
    }
    Some(params)
}
