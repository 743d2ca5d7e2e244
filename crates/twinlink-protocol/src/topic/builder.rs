//! Type-state builder for [`TopicPath`].
//!
//! Each step only offers the continuations the grammar allows, so a
//! `policies/twin` topic or a `commands` topic without action does not
//! compile:
//!
//! ```rust
//! use twinlink_protocol::topic::{CommandAction, TopicPath};
//!
//! let topic = TopicPath::builder("org.eclipse.ditto", "lamp")
//!     .things()
//!     .twin()
//!     .commands()
//!     .action(CommandAction::Modify)
//!     .build()
//!     .unwrap();
//! assert_eq!(topic.path(), "org.eclipse.ditto/lamp/things/twin/commands/modify");
//! ```

use super::{Action, Channel, CommandAction, Criterion, Group, SearchAction, TopicParts, TopicPath};
use crate::error::Result;
use std::marker::PhantomData;
use twinlink_model::signal::{AcknowledgementLabel, EventAction};

/// Marker for the twin channel.
#[derive(Debug)]
pub enum Twin {}

/// Marker for the live channel.
#[derive(Debug)]
pub enum Live {}

fn parts(namespace: String, id: String) -> TopicParts {
    TopicParts {
        namespace,
        id,
        group: Group::Things,
        channel: Channel::None,
        criterion: Criterion::Errors,
        action: None,
        search_action: None,
        subject: None,
    }
}

#[derive(Debug)]
pub struct TopicPathBuilder {
    parts: TopicParts,
}

impl TopicPathBuilder {
    pub(super) fn new(namespace: String, id: String) -> Self {
        Self {
            parts: parts(namespace, id),
        }
    }

    pub fn things(mut self) -> ThingsTopicBuilder {
        self.parts.group = Group::Things;
        ThingsTopicBuilder { parts: self.parts }
    }

    pub fn policies(mut self) -> PoliciesTopicBuilder {
        self.parts.group = Group::Policies;
        self.parts.channel = Channel::None;
        PoliciesTopicBuilder { parts: self.parts }
    }
}

#[derive(Debug)]
pub struct ThingsTopicBuilder {
    parts: TopicParts,
}

impl ThingsTopicBuilder {
    pub fn twin(mut self) -> ChannelTopicBuilder<Twin> {
        self.parts.channel = Channel::Twin;
        ChannelTopicBuilder::new(self.parts)
    }

    pub fn live(mut self) -> ChannelTopicBuilder<Live> {
        self.parts.channel = Channel::Live;
        ChannelTopicBuilder::new(self.parts)
    }
}

/// Things topic with a chosen channel `C`.
#[derive(Debug)]
pub struct ChannelTopicBuilder<C> {
    parts: TopicParts,
    channel: PhantomData<C>,
}

impl<C> ChannelTopicBuilder<C> {
    fn new(parts: TopicParts) -> Self {
        Self {
            parts,
            channel: PhantomData,
        }
    }

    fn criterion(mut self, criterion: Criterion) -> TopicParts {
        self.parts.criterion = criterion;
        self.parts
    }

    pub fn commands(self) -> CommandsTopicBuilder {
        CommandsTopicBuilder {
            parts: self.criterion(Criterion::Commands),
        }
    }

    pub fn events(self) -> EventsTopicBuilder {
        EventsTopicBuilder {
            parts: self.criterion(Criterion::Events),
        }
    }

    pub fn errors(self) -> FinalTopicBuilder {
        FinalTopicBuilder {
            parts: self.criterion(Criterion::Errors),
        }
    }

    pub fn messages(self) -> MessagesTopicBuilder {
        MessagesTopicBuilder {
            parts: self.criterion(Criterion::Messages),
        }
    }

    pub fn acks(self) -> AcksTopicBuilder {
        AcksTopicBuilder {
            parts: self.criterion(Criterion::Acks),
        }
    }
}

impl ChannelTopicBuilder<Twin> {
    /// Search is only available on the twin channel.
    pub fn search(self) -> SearchTopicBuilder {
        SearchTopicBuilder {
            parts: self.criterion(Criterion::Search),
        }
    }
}

/// Policies offer commands and errors only.
#[derive(Debug)]
pub struct PoliciesTopicBuilder {
    parts: TopicParts,
}

impl PoliciesTopicBuilder {
    pub fn commands(mut self) -> CommandsTopicBuilder {
        self.parts.criterion = Criterion::Commands;
        CommandsTopicBuilder { parts: self.parts }
    }

    pub fn errors(mut self) -> FinalTopicBuilder {
        self.parts.criterion = Criterion::Errors;
        FinalTopicBuilder { parts: self.parts }
    }
}

#[derive(Debug)]
pub struct CommandsTopicBuilder {
    parts: TopicParts,
}

impl CommandsTopicBuilder {
    pub fn action(mut self, action: CommandAction) -> FinalTopicBuilder {
        self.parts.action = Some(Action::from(action));
        FinalTopicBuilder { parts: self.parts }
    }

    pub fn create(self) -> FinalTopicBuilder {
        self.action(CommandAction::Create)
    }

    pub fn retrieve(self) -> FinalTopicBuilder {
        self.action(CommandAction::Retrieve)
    }

    pub fn modify(self) -> FinalTopicBuilder {
        self.action(CommandAction::Modify)
    }

    pub fn delete(self) -> FinalTopicBuilder {
        self.action(CommandAction::Delete)
    }
}

#[derive(Debug)]
pub struct EventsTopicBuilder {
    parts: TopicParts,
}

impl EventsTopicBuilder {
    pub fn action(mut self, action: EventAction) -> FinalTopicBuilder {
        self.parts.action = Some(Action::from(action));
        FinalTopicBuilder { parts: self.parts }
    }

    pub fn created(self) -> FinalTopicBuilder {
        self.action(EventAction::Created)
    }

    pub fn modified(self) -> FinalTopicBuilder {
        self.action(EventAction::Modified)
    }

    pub fn deleted(self) -> FinalTopicBuilder {
        self.action(EventAction::Deleted)
    }
}

#[derive(Debug)]
pub struct MessagesTopicBuilder {
    parts: TopicParts,
}

impl MessagesTopicBuilder {
    /// Message subject; may contain `/` but no empty segments.
    pub fn subject(mut self, subject: impl Into<String>) -> FinalTopicBuilder {
        self.parts.subject = Some(subject.into());
        FinalTopicBuilder { parts: self.parts }
    }
}

#[derive(Debug)]
pub struct AcksTopicBuilder {
    parts: TopicParts,
}

impl AcksTopicBuilder {
    pub fn label(mut self, label: &AcknowledgementLabel) -> FinalTopicBuilder {
        self.parts.subject = Some(label.as_str().to_string());
        FinalTopicBuilder { parts: self.parts }
    }
}

#[derive(Debug)]
pub struct SearchTopicBuilder {
    parts: TopicParts,
}

impl SearchTopicBuilder {
    pub fn search_action(mut self, action: SearchAction) -> FinalTopicBuilder {
        self.parts.search_action = Some(action);
        FinalTopicBuilder { parts: self.parts }
    }
}

/// A structurally complete topic, waiting for value validation.
#[derive(Debug)]
pub struct FinalTopicBuilder {
    parts: TopicParts,
}

impl FinalTopicBuilder {
    /// Fails with `UnknownTopicPath` if the namespace, id or subject are not
    /// valid path segments.
    pub fn build(self) -> Result<TopicPath> {
        self.parts.seal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_things_topics() {
        let topic = TopicPath::builder("ns", "lamp").things().live().events().modified().build().unwrap();
        assert_eq!(topic.path(), "ns/lamp/things/live/events/modified");
        assert_eq!(topic.action(), Some(Action::Modified));

        let topic = TopicPath::builder("ns", "lamp")
            .things()
            .twin()
            .messages()
            .subject("switch/on")
            .build()
            .unwrap();
        assert_eq!(topic.path(), "ns/lamp/things/twin/messages/switch/on");
        assert_eq!(topic.subject(), Some("switch/on"));
    }

    #[test]
    fn test_policy_topics() {
        let topic = TopicPath::builder("ns", "policy").policies().commands().retrieve().build().unwrap();
        assert_eq!(topic.path(), "ns/policy/policies/commands/retrieve");
        assert_eq!(topic.channel(), Channel::None);

        let errors = TopicPath::builder("ns", "policy").policies().errors().build().unwrap();
        assert_eq!(errors.path(), "ns/policy/policies/errors");
    }

    #[test]
    fn test_search_and_acks() {
        let topic = TopicPath::search_builder().search_action(SearchAction::Next).build().unwrap();
        assert_eq!(topic.path(), "_/_/things/twin/search/next");

        let label = AcknowledgementLabel::parse("twin-persisted").unwrap();
        let topic = TopicPath::builder("ns", "lamp").things().twin().acks().label(&label).build().unwrap();
        assert_eq!(topic.path(), "ns/lamp/things/twin/acks/twin-persisted");
    }

    #[test]
    fn test_invalid_segments() {
        assert!(TopicPath::builder("", "lamp").things().twin().errors().build().is_err());
        assert!(TopicPath::builder("ns", "a/b").things().twin().errors().build().is_err());
        assert!(TopicPath::builder("ns", "lamp")
            .things()
            .twin()
            .messages()
            .subject("a//b")
            .build()
            .is_err());
    }
}
