//! HTML rendering of the review console.
//!
//! Each row is a small form: the label, a note field and two submit buttons
//! posting to `/requests/{id}/approve` or `/requests/{id}/deny`.

use crate::commands::review::ConsoleView;
use crate::services::navigation::{HomePage, NavigationEvent};
use crate::services::review_console::RowBinding;
use std::fmt::Write;

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_row(out: &mut String, row: &RowBinding) {
    let id = urlencoding::encode(row.request.id());
    let status = row.request.status();

    let _ = write!(
        out,
        r#"<li class="row status-{status}" data-request-id="{data_id}">
<form method="post">
<span class="label">{label}</span>
<input type="text" name="note" size="15" value="{note}" aria-label="Instructor note">
<button type="submit" formaction="/requests/{id}/approve">{approve}</button>
<button type="submit" formaction="/requests/{id}/deny">{deny}</button>
</form>
"#,
        status = status,
        data_id = escape_html(row.request.id()),
        label = escape_html(&row.label),
        note = escape_html(&row.note_input),
        id = id,
        approve = row.approve.decision.caption(),
        deny = row.deny.decision.caption(),
    );

    if !row.request.instructor_note().is_empty() {
        let _ = writeln!(
            out,
            r#"<p class="note">Note: {}</p>"#,
            escape_html(row.request.instructor_note())
        );
    }
    if let Some(error) = &row.error {
        let _ = writeln!(out, r#"<p class="error" role="alert">{}</p>"#, escape_html(error));
    }
    out.push_str("</li>\n");
}

/// Render the full console page.
pub fn render_console_page(home: &HomePage, view: &ConsoleView) -> String {
    let mut out = String::new();
    out.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Instructor - Manage Reviewer Requests</title>\n</head>\n<body>\n",
    );

    let _ = writeln!(out, "<h1>{}</h1>", escape_html(&home.greeting));
    let _ = writeln!(out, "<p class=\"description\">{}</p>", escape_html(home.description));

    out.push_str("<nav>\n");
    for entry in &home.menu {
        let _ = writeln!(
            out,
            r#"<form method="post" action="/navigate/{}" class="{}"><button type="submit">{}</button></form>"#,
            entry.target,
            if entry.primary { "primary" } else { "secondary" },
            escape_html(entry.caption)
        );
    }
    out.push_str("</nav>\n");

    if let Some(error) = &view.load_error {
        let _ = writeln!(
            out,
            r#"<p class="error" role="alert">Could not load reviewer requests: {}</p>"#,
            escape_html(error)
        );
    }

    if view.rows.is_empty() {
        out.push_str("<p class=\"empty\">No pending reviewer requests.</p>\n");
    } else {
        out.push_str("<ul class=\"requests\">\n");
        for row in &view.rows {
            render_row(&mut out, row);
        }
        out.push_str("</ul>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

/// Hand-off page shown after a navigation button is pressed.
pub fn render_navigation_page(event: &NavigationEvent) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{caption}</title>\n</head>\n<body>\n\
         <p class=\"navigation\" data-target=\"{target}\">Leaving the review console for {caption}.</p>\n\
         <p><a href=\"/\">Return to reviewer requests</a></p>\n</body>\n</html>\n",
        caption = escape_html(event.target.caption()),
        target = event.target,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Instructor, ReviewerRequest};
    use crate::services::navigation::NavigationTarget;
    use crate::services::review_console::{ReviewConsole, RowCommand, TransitionPolicy};

    fn view_of(console: &ReviewConsole) -> ConsoleView {
        ConsoleView {
            instructor: Instructor::default(),
            policy: TransitionPolicy::default(),
            load_error: None,
            rows: console.bindings(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_form_action_encodes_request_id() {
        let console = ReviewConsole::render(
            vec![ReviewerRequest::new("a b/c", "Dana White")],
            TransitionPolicy::default(),
        );
        let html = render_console_page(&HomePage::new(Instructor::default()), &view_of(&console));

        assert!(html.contains(r#"formaction="/requests/a%20b%2Fc/approve""#));
        assert!(html.contains(r#"data-request-id="a b/c""#));
    }

    #[test]
    fn test_page_has_one_row_per_request_in_order() {
        let console = ReviewConsole::render(
            vec![
                ReviewerRequest::new("S101", "Alice Johnson"),
                ReviewerRequest::new("S102", "Bob Smith"),
            ],
            TransitionPolicy::default(),
        );
        let html = render_console_page(&HomePage::new(Instructor::default()), &view_of(&console));

        assert_eq!(html.matches("<li class=\"row").count(), 2);
        let alice = html.find("Alice Johnson (S101) - pending").unwrap();
        let bob = html.find("Bob Smith (S102) - pending").unwrap();
        assert!(alice < bob);
        assert!(html.contains(r#"formaction="/requests/S101/approve""#));
        assert!(html.contains(r#"formaction="/requests/S102/deny""#));
        assert!(html.contains("Hello, Instructor!"));
    }

    #[test]
    fn test_page_shows_note_and_escapes_input() {
        let mut console = ReviewConsole::render(
            vec![ReviewerRequest::new("S101", "Alice <script>")],
            TransitionPolicy::default(),
        );
        console.set_note_input("S101", "fine & dandy").unwrap();
        console.dispatch(&RowCommand::approve("S101")).unwrap();

        let html = render_console_page(&HomePage::new(Instructor::default()), &view_of(&console));
        assert!(html.contains("Alice &lt;script&gt; (S101) - approved"));
        assert!(html.contains("Note: fine &amp; dandy"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_empty_page_and_load_error() {
        let console = ReviewConsole::render(Vec::new(), TransitionPolicy::default());
        let mut view = view_of(&console);
        view.load_error = Some("Database error: locked".into());

        let html = render_console_page(&HomePage::new(Instructor::default()), &view);
        assert!(html.contains("No pending reviewer requests."));
        assert!(html.contains("Could not load reviewer requests: Database error: locked"));
    }

    #[test]
    fn test_navigation_page() {
        let event = NavigationEvent {
            target: NavigationTarget::QaPage,
            username: "instructor".into(),
            at: 0,
        };
        let html = render_navigation_page(&event);
        assert!(html.contains(r#"data-target="qa-page""#));
        assert!(html.contains("Q &amp; A Page"));
    }
}
