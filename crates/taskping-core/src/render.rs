// Body/URL resolution collaborators
//
// Content formatting is outside the delivery pipeline proper; the stream
// session only needs something that can turn a stored event into human
// text and a target URL at read time.

use crate::event::EventData;

/// Resolves the human-facing parts of a delivered event.
pub trait EventRenderer: Send + Sync {
    /// Body text shown under the notification title.
    fn body(&self, event_name: &str, data: &EventData) -> String;

    /// URL the client opens when the notification is activated.
    fn url(&self, event_name: &str, data: &EventData) -> String;
}

/// Default renderer for the task-board domain.
///
/// Task-bearing events link to the task view, with a comment fragment
/// appended when the event concerns a comment. Everything else falls
/// back to the dashboard.
#[derive(Debug, Clone, Default)]
pub struct DefaultRenderer;

impl EventRenderer for DefaultRenderer {
    fn body(&self, event_name: &str, data: &EventData) -> String {
        let label = humanize_event_name(event_name);

        match data.task.as_ref().and_then(|task| task.title.as_deref()) {
            Some(title) => format!("{}: {}", label, title),
            None => label,
        }
    }

    fn url(&self, _event_name: &str, data: &EventData) -> String {
        match &data.task {
            Some(task) if task.id > 0 => match &data.comment {
                Some(comment) => format!("/tasks/{}#comment-{}", task.id, comment.id),
                None => format!("/tasks/{}", task.id),
            },
            _ => "/".to_string(),
        }
    }
}

/// "task.comment.create" -> "Task comment create"
fn humanize_event_name(event_name: &str) -> String {
    let spaced = event_name.replace(['.', '_'], " ");
    let mut chars = spaced.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CommentData, TaskData};

    fn task_event(task_id: i64, comment_id: Option<i64>) -> EventData {
        EventData {
            task: Some(TaskData {
                id: task_id,
                title: Some("Ship release".to_string()),
                ..Default::default()
            }),
            comment: comment_id.map(|id| CommentData {
                id,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_url_points_at_task_view() {
        let renderer = DefaultRenderer;
        assert_eq!(renderer.url("task.update", &task_event(42, None)), "/tasks/42");
    }

    #[test]
    fn test_url_appends_comment_fragment() {
        let renderer = DefaultRenderer;
        assert_eq!(
            renderer.url("task.comment.create", &task_event(42, Some(7))),
            "/tasks/42#comment-7"
        );
    }

    #[test]
    fn test_url_falls_back_to_dashboard() {
        let renderer = DefaultRenderer;
        assert_eq!(renderer.url("project.archive", &EventData::default()), "/");
    }

    #[test]
    fn test_body_includes_task_title() {
        let renderer = DefaultRenderer;
        assert_eq!(
            renderer.body("task.assignee.change", &task_event(42, None)),
            "Task assignee change: Ship release"
        );
    }

    #[test]
    fn test_body_without_task_context() {
        let renderer = DefaultRenderer;
        assert_eq!(
            renderer.body("project.archive", &EventData::default()),
            "Project archive"
        );
    }
}
