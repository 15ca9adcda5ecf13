//! Combinable filters of the todo tables

use crate::todo::{Priority, Todo};

/// Key of the "no filter" entry of the filter dropdowns
pub const NO_FILTER_KEY: &str = "None";
/// Key of the "completed" entry of the completion dropdown
pub const COMPLETED_KEY: &str = "Completed";

/// Every active criterion must match (the empty filter matches everything)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TodoFilter {
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    /// Case-insensitive prefix of the title
    pub title_prefix: String,
    /// Case-insensitive prefix of the name of the todo's list
    pub list_name_prefix: String,
}

impl TodoFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set the priority criterion from a dropdown key (`None` disables it)
    pub fn set_priority_key(&mut self, key: &str) {
        self.priority = match key {
            "" | NO_FILTER_KEY => None,
            other => Some(Priority::from(other)),
        };
    }

    /// Set the completion criterion from a dropdown key: `Completed`, `Uncompleted` or `None`
    pub fn set_completed_key(&mut self, key: &str) {
        self.completed = match key {
            "" | NO_FILTER_KEY => None,
            COMPLETED_KEY => Some(true),
            _ => Some(false),
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        if let Some(priority) = &self.priority {
            if todo.priority.as_ref() != Some(priority) {
                return false;
            }
        }
        if let Some(completed) = self.completed {
            if todo.completed != completed {
                return false;
            }
        }
        starts_with(&todo.title, &self.title_prefix) && starts_with(todo.list_name(), &self.list_name_prefix)
    }

    pub fn apply(&self, todos: &[Todo]) -> Vec<Todo> {
        todos.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}

/// Blank prefixes match everything
fn starts_with(value: &str, prefix: &str) -> bool {
    if prefix.trim().is_empty() {
        return true;
    }
    value.to_lowercase().starts_with(&prefix.to_lowercase())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::list::List;

    fn todo(title: &str, priority: Priority, completed: bool, list: &str) -> Todo {
        Todo {
            title: title.to_string(),
            priority: Some(priority),
            completed,
            list: Some(Box::new(List { name: list.to_string(), ..List::default() })),
            ..Todo::default()
        }
    }

    fn todos() -> Vec<Todo> {
        vec![
            todo("Buy milk", Priority::High, false, "Groceries"),
            todo("Buy bread", Priority::Low, true, "Groceries"),
            todo("Book hotel", Priority::High, true, "Trip"),
        ]
    }

    #[test]
    fn criteria_are_combined() {
        let mut filter = TodoFilter::default();
        filter.set_priority_key("HIGH");
        assert_eq!(filter.apply(&todos()).len(), 2);

        filter.set_completed_key("Completed");
        let visible = filter.apply(&todos());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Book hotel");

        filter.set_completed_key("Uncompleted");
        filter.title_prefix = "buy".to_string();
        filter.list_name_prefix = "Gro".to_string();
        let visible = filter.apply(&todos());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Buy milk");
    }

    #[test]
    fn clearing_twice_is_clearing_once() {
        let mut filter = TodoFilter::default();
        filter.set_priority_key("LOW");
        filter.title_prefix = "Buy".to_string();

        filter.clear();
        let once = filter.clone();
        filter.clear();
        assert_eq!(filter, once);
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&todos()), todos());
    }

    #[test]
    fn none_keys_disable_criteria() {
        let mut filter = TodoFilter::default();
        filter.set_priority_key("None");
        filter.set_completed_key("None");
        filter.title_prefix = "   ".to_string();
        assert_eq!(filter.apply(&todos()).len(), 3);
    }
}
