//! Logs in with an existing session cookie, then prints what the main screens would display
//!
//! ```text
//! TODO_API_URL=http://localhost:8000/ TODO_SESSION_COOKIE='user_role=writer; Path=/' cargo run --example overview
//! ```

use std::sync::Arc;

use url::Url;

use todo_lists_client::config::Settings;
use todo_lists_client::controllers::{AppController, Context, Controller, ListsController, Outcome, TodosController};
use todo_lists_client::session::SessionContext;
use todo_lists_client::traits::{Route, Shell};
use todo_lists_client::utils::pause;
use todo_lists_client::Client;

const ENV_SESSION_COOKIE: &str = "TODO_SESSION_COOKIE";

/// A shell that prints instead of displaying things
struct PrintingShell;

impl Shell for PrintingShell {
    fn toast(&self, message: &str) {
        println!("[toast] {}", message);
    }

    fn navigate(&self, route: Route) {
        println!("[navigate] {:?}", route);
    }

    fn redirect(&self, url: &Url) {
        println!("[redirect] {}", url);
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Invalid settings: {}", err);
            return;
        }
    };
    let client = match Client::new(settings.clone()) {
        Ok(client) => client,
        Err(err) => {
            log::error!("Unable to create a client: {}", err);
            return;
        }
    };
    match std::env::var(ENV_SESSION_COOKIE) {
        Ok(cookie) => client.add_cookie(&cookie),
        Err(_) => log::warn!("{} is not set, the screens will ask to log in", ENV_SESSION_COOKIE),
    }
    let client = Arc::new(client);

    let ctx = Context::new(client.clone(), Arc::new(PrintingShell), SessionContext::new(client.clone()), settings);
    println!("Session: {:?}", ctx.session.current());

    let app = AppController::new(ctx.clone());
    if app.activate().await.is_applied() {
        if let Some(text) = app.state().notifications_text() {
            println!("{}", text);
        }
    }

    let lists = ListsController::new(ctx.clone());
    if let Outcome::Applied = lists.activate().await {
        let state = lists.state();
        println!("---- {} -----", state.status_text);
        todo_lists_client::utils::print_lists(&state.lists);
        println!("---- Shared with me -----");
        todo_lists_client::utils::print_lists(&state.accepted);
    }
    pause();

    let todos = TodosController::new(ctx.clone());
    if todos.activate().await.is_applied() {
        let state = todos.state();
        println!("---- Todos ({}/{} completed) -----", state.completed_count(), state.total_count());
        todo_lists_client::utils::print_todos(&state.todos);
    }
}
