//! Instructor home page and navigation events.
//!
//! The console does not implement the pages it links to. Selecting a menu
//! entry emits a [`NavigationEvent`] on a broadcast channel; whoever owns the
//! rendering surface decides what to show next.

use crate::error::AppError;
use crate::models::Instructor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::broadcast;

/// Event name used when navigation events are forwarded to a frontend.
pub const NAVIGATION_EVENT: &str = "navigate";

/// Named destinations reachable from the instructor home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationTarget {
    ReviewPage,
    QaPage,
    ApproveDenyRequests,
    Logout,
    Back,
}

impl NavigationTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReviewPage => "review-page",
            Self::QaPage => "qa-page",
            Self::ApproveDenyRequests => "approve-deny-requests",
            Self::Logout => "logout",
            Self::Back => "back",
        }
    }

    /// Caption of the home page button.
    pub fn caption(&self) -> &'static str {
        match self {
            Self::ReviewPage => "Review Page",
            Self::QaPage => "Q & A Page",
            Self::ApproveDenyRequests => "Approve/Deny Reviewer Requests",
            Self::Logout => "Logout",
            Self::Back => "Back",
        }
    }
}

impl FromStr for NavigationTarget {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "review-page" => Ok(Self::ReviewPage),
            "qa-page" => Ok(Self::QaPage),
            "approve-deny-requests" => Ok(Self::ApproveDenyRequests),
            "logout" => Ok(Self::Logout),
            "back" => Ok(Self::Back),
            other => Err(AppError::invalid_input_field(
                format!("unknown navigation target '{}'", other),
                "target",
            )),
        }
    }
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transfer of control requested from the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent {
    pub target: NavigationTarget,
    pub username: String,
    pub at: i64,
}

/// A button on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    pub target: NavigationTarget,
    pub caption: &'static str,
    /// Main tools are shown prominently; the rest sit in the footer.
    pub primary: bool,
}

/// Instructor landing page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub instructor: Instructor,
    pub greeting: String,
    pub description: &'static str,
    pub menu: Vec<MenuEntry>,
}

impl HomePage {
    pub fn new(instructor: Instructor) -> Self {
        let greeting = format!("Hello, {}!", instructor.display_name);
        let menu = [
            (NavigationTarget::ReviewPage, true),
            (NavigationTarget::QaPage, true),
            (NavigationTarget::ApproveDenyRequests, true),
            (NavigationTarget::Logout, false),
            (NavigationTarget::Back, false),
        ]
        .into_iter()
        .map(|(target, primary)| MenuEntry {
            target,
            caption: target.caption(),
            primary,
        })
        .collect();

        Self {
            instructor,
            greeting,
            description:
                "Access the review tools, browse Q&A content, or approve/deny reviewer requests",
            menu,
        }
    }
}

/// Emits navigation events to any number of subscribers.
#[derive(Clone)]
pub struct Navigator {
    sender: broadcast::Sender<NavigationEvent>,
}

impl Navigator {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.sender.subscribe()
    }

    /// Emit a navigation event. Having no subscriber is not an error.
    pub fn navigate(&self, instructor: &Instructor, target: NavigationTarget) -> NavigationEvent {
        let event = NavigationEvent {
            target,
            username: instructor.username.clone(),
            at: chrono::Utc::now().timestamp(),
        };

        log::info!("[navigation] {} -> {}", event.username, target);
        if self.sender.send(event.clone()).is_err() {
            log::debug!("[navigation] No subscribers for {}", NAVIGATION_EVENT);
        }
        event
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_page_menu() {
        let page = HomePage::new(Instructor::new("jdoe", "Dr. Doe"));
        assert_eq!(page.greeting, "Hello, Dr. Doe!");

        let targets: Vec<NavigationTarget> = page.menu.iter().map(|m| m.target).collect();
        assert_eq!(
            targets,
            vec![
                NavigationTarget::ReviewPage,
                NavigationTarget::QaPage,
                NavigationTarget::ApproveDenyRequests,
                NavigationTarget::Logout,
                NavigationTarget::Back,
            ]
        );
        assert_eq!(page.menu.iter().filter(|m| m.primary).count(), 3);
    }

    #[test]
    fn test_target_round_trips_through_text() {
        for target in [
            NavigationTarget::ReviewPage,
            NavigationTarget::QaPage,
            NavigationTarget::ApproveDenyRequests,
            NavigationTarget::Logout,
            NavigationTarget::Back,
        ] {
            assert_eq!(target.as_str().parse::<NavigationTarget>().unwrap(), target);
        }
        assert!("settings".parse::<NavigationTarget>().is_err());
    }

    #[tokio::test]
    async fn test_navigate_broadcasts_event() {
        let navigator = Navigator::new();
        let mut rx = navigator.subscribe();
        let instructor = Instructor::new("jdoe", "Dr. Doe");

        let sent = navigator.navigate(&instructor, NavigationTarget::Logout);
        let received = rx.recv().await.unwrap();

        assert_eq!(received, sent);
        assert_eq!(received.username, "jdoe");
    }

    #[test]
    fn test_navigate_without_subscribers() {
        let navigator = Navigator::new();
        let event = navigator.navigate(&Instructor::default(), NavigationTarget::Back);
        assert_eq!(event.target, NavigationTarget::Back);
    }
}
