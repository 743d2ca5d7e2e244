use super::{Action, Channel, Criterion, Group, SearchAction, TopicParts, TopicPath, PLACEHOLDER};
use crate::error::{ProtocolError, Result};
use tracing::warn;
use twinlink_model::signal::AcknowledgementLabel;
use twinlink_model::Headers;

/// Parse a topic path string positionally.
pub(super) fn parse(path: &str) -> Result<TopicPath> {
    let unknown = || {
        warn!(path, "Rejected topic path");
        ProtocolError::unknown_topic_path(path, &Headers::new())
    };

    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 4 || segments.iter().any(|segment| segment.is_empty()) {
        return Err(unknown());
    }

    let group = Group::from_string(segments[2]).ok_or_else(unknown)?;
    let (channel, criterion_index) = match group {
        Group::Things => match Channel::from_string(segments[3]) {
            Some(channel @ (Channel::Twin | Channel::Live)) => (channel, 4),
            _ => return Err(unknown()),
        },
        Group::Policies => (Channel::None, 3),
    };

    let criterion = segments
        .get(criterion_index)
        .and_then(|segment| Criterion::from_string(segment))
        .ok_or_else(unknown)?;
    let tail = &segments[criterion_index + 1..];

    let mut parts = TopicParts {
        namespace: segments[0].to_string(),
        id: segments[1].to_string(),
        group,
        channel,
        criterion,
        action: None,
        search_action: None,
        subject: None,
    };

    match (group, criterion) {
        (_, Criterion::Commands) => {
            let action = single(tail).and_then(Action::from_string).ok_or_else(unknown)?;
            if !action.is_command_action() {
                return Err(unknown());
            }
            parts.action = Some(action);
        }
        (Group::Things, Criterion::Events) => {
            let action = single(tail).and_then(Action::from_string).ok_or_else(unknown)?;
            if !action.is_event_action() {
                return Err(unknown());
            }
            parts.action = Some(action);
        }
        (_, Criterion::Errors) => {
            if !tail.is_empty() {
                return Err(unknown());
            }
        }
        (Group::Things, Criterion::Messages) => {
            if tail.is_empty() {
                return Err(unknown());
            }
            parts.subject = Some(tail.join("/"));
        }
        (Group::Things, Criterion::Acks) => {
            let label = single(tail).ok_or_else(unknown)?;
            AcknowledgementLabel::parse(label).map_err(|_| unknown())?;
            parts.subject = Some(label.to_string());
        }
        (Group::Things, Criterion::Search) => {
            let placeholders = parts.namespace == PLACEHOLDER && parts.id == PLACEHOLDER;
            if channel != Channel::Twin || !placeholders {
                return Err(unknown());
            }
            parts.search_action = Some(single(tail).and_then(SearchAction::from_string).ok_or_else(unknown)?);
        }
        (Group::Policies, _) => return Err(unknown()),
    }

    parts.seal()
}

fn single<'a>(tail: &[&'a str]) -> Option<&'a str> {
    match tail {
        [segment] => Some(segment),
        _ => None,
    }
}
