use quiz_portal::{
    AppState, StoreError, View,
    config::{AppConfig, Env},
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Headless client entry point: restores the persisted session, resolves the path given
/// as the first argument (default `/`), then loads and prints the data that view shows.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quiz_portal=debug,reqwest=info".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!(api = %config.api_base_url, "client starting in {:?} mode", config.env);

    // 4. State Assembly
    let mut app = match AppState::new(config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = ?e, "failed to build HTTP client");
            std::process::exit(1);
        }
    };

    // 5. Session Restore (storage only, no network)
    if app.auth.check_session() {
        if let Some(user) = app.auth.current_user() {
            tracing::info!(email = %user.email, role = user.role.as_str(), "session restored");
        }
    } else {
        tracing::info!("no stored session");
    }

    // 6. Route Resolution
    let path = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());
    let Some(route) = app.router.resolve(&path) else {
        tracing::error!(%path, "no view for path");
        std::process::exit(2);
    };
    if let Some(from) = &route.redirected_from {
        tracing::info!(%from, view = %route.view, "redirected");
    }
    tracing::info!(view = %route.view, "resolved view");

    // 7. View Data
    if let Err(e) = load_view(&mut app, route.view, route.param("quiz_id")).await {
        tracing::error!(view = %route.view, error = ?e, "failed to load view data");
        eprintln!("{e}");
        std::process::exit(1);
    }
}

/// Fetches what the given view displays and prints it as JSON.
async fn load_view(app: &mut AppState, view: View, quiz_id: Option<&str>) -> Result<(), StoreError> {
    match view {
        View::Login => match app.auth.current_user() {
            Some(user) => print_json(user),
            None => println!("Not signed in."),
        },
        View::AdminDashboard => {
            app.quiz.fetch_subjects().await?;
            print_json(app.quiz.subjects());
        }
        View::AdminQuiz => {
            app.quiz.fetch_quizzes().await?;
            print_json(app.quiz.quizzes());
        }
        View::AdminSummary => print_json(&app.quiz.fetch_admin_stats().await?),
        View::UserDashboard => {
            app.quiz.fetch_upcoming_quizzes().await?;
            print_json(app.quiz.upcoming_quizzes());
        }
        View::UserSummary => print_json(&app.quiz.fetch_user_dashboard().await?),
        View::UserScores => {
            app.quiz.fetch_user_scores().await?;
            print_json(app.quiz.user_scores());
        }
        View::QuizTaking => {
            let quiz_id = quiz_id.unwrap_or_default();
            print_json(&app.quiz.start_quiz(quiz_id).await?);
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "failed to render output"),
    }
}
