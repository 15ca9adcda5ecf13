//! The calendar screen: incomplete todos laid out as appointments

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use super::{Context, Controller, Outcome};
use crate::bus::AppEvent;
use crate::client::fetch_all;
use crate::format;
use crate::ids::TodoId;
use crate::operations::todos;
use crate::todo::Todo;
use crate::view_state::{lock, Liveness, RequestSequencer};

/// A todo as the calendar displays it
#[derive(Clone, Debug, PartialEq)]
pub struct Appointment {
    pub todo: Todo,
    /// The start date of the todo, or its due date when it has no start date
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
}

impl Appointment {
    pub fn from_todo(todo: Todo) -> Self {
        let start = todo.start().or_else(|| todo.due());
        let end = todo.due();
        Self { todo, start, end }
    }

    /// Whether the appointment can be placed on the calendar at all
    pub fn is_scheduled(&self) -> bool {
        self.start.is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalendarState {
    pub appointments: Vec<Appointment>,
    /// The appointment whose details popover is open
    pub selected: Option<Appointment>,
}

pub struct CalendarController {
    ctx: Context,
    state: Mutex<CalendarState>,
    seq: RequestSequencer,
    liveness: Liveness,
}

impl CalendarController {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            state: Mutex::new(CalendarState::default()),
            seq: RequestSequencer::new(),
            liveness: Liveness::new(),
        }
    }

    pub fn state(&self) -> CalendarState {
        lock(&self.state).clone()
    }

    pub async fn load(&self) -> Outcome {
        let query = if self.ctx.session.current().is_admin() { todos::get_todos_global() } else { todos::get_todos() };
        let token = self.seq.issue();
        let result = fetch_all::<Todo>(self.ctx.transport(), &query).await;
        if self.seq.accepts(token, &self.liveness) == false {
            return Outcome::Discarded;
        }
        match result {
            Ok(todos) => {
                let appointments = todos
                    .into_iter()
                    .filter(|t| t.completed == false)
                    .map(Appointment::from_todo)
                    .collect();
                let mut state = lock(&self.state);
                state.appointments = appointments;
                state.selected = None;
                Outcome::Applied
            },
            Err(err) => self.ctx.fail("Error fetching todos", "Failed to load todos.", err),
        }
    }

    /// Open the details popover of an appointment
    pub fn select_appointment(&self, todo_id: &TodoId) -> Option<Appointment> {
        let mut state = lock(&self.state);
        state.selected = state.appointments.iter().find(|a| &a.todo.id == todo_id).cloned();
        state.selected.clone()
    }

    pub fn close_popover(&self) {
        lock(&self.state).selected = None;
    }

    /// How dates are rendered in the popover
    pub fn format_date(value: Option<&str>) -> String {
        format::format_date(value)
    }
}

#[async_trait]
impl Controller for CalendarController {
    async fn activate(&self) -> Outcome {
        self.liveness.revive();
        if self.ctx.require_session().is_none() {
            return Outcome::Redirected;
        }
        self.load().await
    }

    async fn handle_event(&self, event: &AppEvent) -> Outcome {
        match event {
            AppEvent::TodosChanged { .. } | AppEvent::TodoAdded(_) | AppEvent::TodoUpdated(_) | AppEvent::Resync => {
                self.load().await
            },
            _ => Outcome::Discarded,
        }
    }

    fn tear_down(&self) {
        self.liveness.kill();
    }
}
