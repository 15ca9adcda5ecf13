///! Some utility functions

use std::io::{stdin, stdout, Read, Write};

use crate::format;
use crate::list::List;
use crate::todo::Todo;

/// A debug utility that pretty-prints lists, with their todos when they were selected
pub fn print_lists(lists: &[List]) {
    for list in lists {
        let visibility = list.visibility.as_ref().map(|v| v.as_str()).unwrap_or("?");
        println!("LIST {} [{}] ({})", list.name, visibility, list.id);
        if list.tags.is_empty() == false {
            println!("    tags: {}", format::format_tags(&list.tags));
        }
        for collaborator in &list.collaborators {
            let status = collaborator.status.as_ref().map(|s| s.as_str()).unwrap_or("?");
            println!("    @ {} ({})", collaborator.user.email, status);
        }
        for todo in &list.todos {
            print_todo(todo);
        }
    }
}

pub fn print_todos(todos: &[Todo]) {
    for todo in todos {
        print_todo(todo);
    }
}

pub fn print_todo(todo: &Todo) {
    let completion = if todo.completed { "✓" } else { " " };
    let priority = match todo.priority.as_ref().map(|p| p.as_str()) {
        Some("HIGH") => "!!",
        Some("MEDIUM") => "! ",
        _ => "  ",
    };
    let due = format::format_date(todo.due_date.as_deref());
    println!("    {}{} {}\t{}\tdue: {}", completion, priority, todo.title, todo.id, due);
}

/// Wait for the user to press enter
pub fn pause() {
    let mut stdout = stdout();
    let _ = stdout.write_all(b"Press Enter to continue...");
    let _ = stdout.flush();
    let _ = stdin().read_exact(&mut [0]);
}
