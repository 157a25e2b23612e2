//! Plain-text rendering of the console for the terminal adapter.

use crate::commands::review::ConsoleView;
use crate::models::ReviewerRequest;
use crate::services::navigation::HomePage;
use crate::services::review_console::RowBinding;
use std::fmt::Write;

/// One line per row: index, label, note and the two actions.
pub fn render_row(row: &RowBinding) -> String {
    let mut line = format!("{:>3}. {}", row.index + 1, row.label);
    if !row.request.instructor_note().is_empty() {
        let _ = write!(line, " | note: {}", row.request.instructor_note());
    }
    let _ = write!(
        line,
        "  [{} {id}] [{} {id}]",
        row.approve.decision.caption().to_lowercase(),
        row.deny.decision.caption().to_lowercase(),
        id = row.request.id()
    );
    if let Some(error) = &row.error {
        let _ = write!(line, "\n     ! {}", error);
    }
    line
}

/// Render the whole console.
pub fn render_console(view: &ConsoleView) -> String {
    let mut out = String::from("Instructor - Manage Reviewer Requests\n");

    if let Some(error) = &view.load_error {
        let _ = writeln!(out, "! Could not load reviewer requests: {}", error);
    }
    if view.rows.is_empty() {
        out.push_str("No pending reviewer requests.\n");
    }
    for row in &view.rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out
}

/// Render a list of requests without actions, e.g. `list --all`.
pub fn render_requests(requests: &[ReviewerRequest]) -> String {
    let mut out = String::new();
    for request in requests {
        let _ = write!(out, "{}", request);
        if let Some(date) = request.date_submitted() {
            let _ = write!(out, " (submitted {})", date);
        }
        if !request.instructor_note().is_empty() {
            let _ = write!(out, " | note: {}", request.instructor_note());
        }
        out.push('\n');
    }
    out
}

/// Render the home page greeting and menu.
pub fn render_home(home: &HomePage) -> String {
    let mut out = format!("{}\n{}\n", home.greeting, home.description);
    for entry in &home.menu {
        let _ = writeln!(out, "  {:<32} ({})", entry.caption, entry.target);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Instructor, RequestStatus};
    use crate::services::review_console::{ReviewConsole, RowCommand, TransitionPolicy};

    fn console() -> ReviewConsole {
        ReviewConsole::render(
            vec![
                ReviewerRequest::new("S101", "Alice Johnson"),
                ReviewerRequest::new("S102", "Bob Smith"),
            ],
            TransitionPolicy::default(),
        )
    }

    #[test]
    fn test_render_row() {
        let mut console = console();
        console.set_note_input("S102", "insufficient").unwrap();
        console.dispatch(&RowCommand::deny("S102")).unwrap();

        let bindings = console.bindings();
        assert_eq!(
            render_row(&bindings[0]),
            "  1. Alice Johnson (S101) - pending  [approve S101] [deny S101]"
        );
        assert_eq!(
            render_row(&bindings[1]),
            "  2. Bob Smith (S102) - denied | note: insufficient  [approve S102] [deny S102]"
        );
    }

    #[test]
    fn test_render_console_lists_rows_in_order() {
        let view = ConsoleView {
            instructor: Instructor::default(),
            policy: TransitionPolicy::default(),
            load_error: None,
            rows: console().bindings(),
        };
        let text = render_console(&view);
        let alice = text.find("Alice Johnson").unwrap();
        let bob = text.find("Bob Smith").unwrap();
        assert!(alice < bob);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_render_requests() {
        let mut req = ReviewerRequest::new("S101", "Alice Johnson").with_date_submitted("2025-03-01");
        req.record_decision(RequestStatus::Approved, "ok", 1);
        assert_eq!(
            render_requests(&[req]),
            "Alice Johnson (S101) - approved (submitted 2025-03-01) | note: ok\n"
        );
    }

    #[test]
    fn test_render_home() {
        let text = render_home(&HomePage::new(Instructor::new("jdoe", "Dr. Doe")));
        assert!(text.starts_with("Hello, Dr. Doe!\n"));
        assert!(text.contains("(qa-page)"));
    }
}
