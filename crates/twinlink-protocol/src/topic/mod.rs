//! Topic paths: the grammar-constrained subject of every adaptable.
//!
//! ```text
//! <namespace>/<id>/<group>/[<channel>/]<criterion>[/<action>|/<subject...>|/<search-action>]
//!
//! org.eclipse.ditto/lamp/things/twin/commands/modify
//! org.eclipse.ditto/lamp/things/live/messages/switch/on
//! org.eclipse.ditto/lamp-policy/policies/commands/retrieve
//! _/_/things/twin/search/subscribe
//! ```
//!
//! Topic paths are built with the type-state [`TopicPathBuilder`] or parsed
//! with [`TopicPath::parse`]; both only ever produce valid combinations.

mod builder;
mod parse;

pub use builder::{
    AcksTopicBuilder, ChannelTopicBuilder, CommandsTopicBuilder, EventsTopicBuilder, FinalTopicBuilder, Live,
    MessagesTopicBuilder, PoliciesTopicBuilder, SearchTopicBuilder, ThingsTopicBuilder, TopicPathBuilder, Twin,
};

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use twinlink_model::signal::{EventAction, ModifyAction};
use twinlink_model::{EntityId, Headers};

/// Placeholder used for empty namespaces and for search topics.
pub const PLACEHOLDER: &str = "_";

macro_rules! topic_token {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $token:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $token),*
                }
            }

            pub fn from_string(s: &str) -> Option<Self> {
                match s {
                    $($token => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

topic_token!(
    /// Resource family of a topic.
    Group {
        Things => "things",
        Policies => "policies",
    }
);

topic_token!(
    /// Whether a signal targets the persisted twin or the live device.
    /// Policies have no channel.
    Channel {
        Twin => "twin",
        Live => "live",
        None => "none",
    }
);

topic_token!(
    Criterion {
        Commands => "commands",
        Events => "events",
        Search => "search",
        Messages => "messages",
        Errors => "errors",
        Acks => "acks",
    }
);

topic_token!(
    /// Action of a command or event topic.
    Action {
        Create => "create",
        Retrieve => "retrieve",
        Modify => "modify",
        Delete => "delete",
        Created => "created",
        Modified => "modified",
        Deleted => "deleted",
    }
);

topic_token!(
    /// Action of a command topic.
    CommandAction {
        Create => "create",
        Retrieve => "retrieve",
        Modify => "modify",
        Delete => "delete",
    }
);

topic_token!(
    SearchAction {
        Subscribe => "subscribe",
        Request => "request",
        Cancel => "cancel",
        Created => "created",
        Next => "next",
        Complete => "complete",
        Failed => "failed",
    }
);

impl Action {
    pub fn is_command_action(&self) -> bool {
        matches!(self, Self::Create | Self::Retrieve | Self::Modify | Self::Delete)
    }

    pub fn is_event_action(&self) -> bool {
        !self.is_command_action()
    }

    /// The modify action of a command topic; `None` for retrieve and events.
    pub fn modify_action(&self) -> Option<ModifyAction> {
        match self {
            Self::Create => Some(ModifyAction::Create),
            Self::Modify => Some(ModifyAction::Modify),
            Self::Delete => Some(ModifyAction::Delete),
            _ => None,
        }
    }

    pub fn event_action(&self) -> Option<EventAction> {
        match self {
            Self::Created => Some(EventAction::Created),
            Self::Modified => Some(EventAction::Modified),
            Self::Deleted => Some(EventAction::Deleted),
            _ => None,
        }
    }
}

impl From<CommandAction> for Action {
    fn from(action: CommandAction) -> Self {
        match action {
            CommandAction::Create => Self::Create,
            CommandAction::Retrieve => Self::Retrieve,
            CommandAction::Modify => Self::Modify,
            CommandAction::Delete => Self::Delete,
        }
    }
}

impl From<ModifyAction> for CommandAction {
    fn from(action: ModifyAction) -> Self {
        match action {
            ModifyAction::Create => Self::Create,
            ModifyAction::Modify => Self::Modify,
            ModifyAction::Delete => Self::Delete,
        }
    }
}

impl From<EventAction> for Action {
    fn from(action: EventAction) -> Self {
        match action {
            EventAction::Created => Self::Created,
            EventAction::Modified => Self::Modified,
            EventAction::Deleted => Self::Deleted,
        }
    }
}

impl SearchAction {
    /// Subscribe, request and cancel are sent by clients; the rest by the platform.
    pub fn is_command(&self) -> bool {
        matches!(self, Self::Subscribe | Self::Request | Self::Cancel)
    }
}

/// A validated topic path. The string form is computed once on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicPath {
    namespace: String,
    id: String,
    group: Group,
    channel: Channel,
    criterion: Criterion,
    action: Option<Action>,
    search_action: Option<SearchAction>,
    subject: Option<String>,
    path: String,
}

/// Fields of a topic path before it is sealed.
#[derive(Debug, Clone)]
pub(crate) struct TopicParts {
    pub namespace: String,
    pub id: String,
    pub group: Group,
    pub channel: Channel,
    pub criterion: Criterion,
    pub action: Option<Action>,
    pub search_action: Option<SearchAction>,
    pub subject: Option<String>,
}

impl TopicParts {
    fn render(&self) -> String {
        let mut path = format!("{}/{}/{}", self.namespace, self.id, self.group);
        if self.channel != Channel::None {
            path.push('/');
            path.push_str(self.channel.as_str());
        }
        path.push('/');
        path.push_str(self.criterion.as_str());

        let tail = self
            .action
            .map(|action| action.as_str())
            .or_else(|| self.search_action.map(|action| action.as_str()))
            .or(self.subject.as_deref());
        if let Some(tail) = tail {
            path.push('/');
            path.push_str(tail);
        }
        path
    }

    /// Check the segment values. Structure is guaranteed by the builder and parser.
    pub(crate) fn seal(self) -> Result<TopicPath> {
        let path = self.render();
        let valid_segment = |segment: &str| !segment.is_empty() && !segment.contains('/');
        let subject_ok = self
            .subject
            .as_deref()
            .map_or(true, |subject| subject.split('/').all(|part| !part.is_empty()));

        if !valid_segment(&self.namespace) || !valid_segment(&self.id) || !subject_ok {
            return Err(ProtocolError::unknown_topic_path(path, &Headers::new()));
        }

        Ok(TopicPath {
            namespace: self.namespace,
            id: self.id,
            group: self.group,
            channel: self.channel,
            criterion: self.criterion,
            action: self.action,
            search_action: self.search_action,
            subject: self.subject,
            path,
        })
    }
}

impl TopicPath {
    /// Start building a topic for `namespace/id`.
    pub fn builder(namespace: impl Into<String>, id: impl Into<String>) -> TopicPathBuilder {
        TopicPathBuilder::new(namespace.into(), id.into())
    }

    /// Start building a topic for an entity; an empty namespace becomes `_`.
    pub fn builder_for(entity_id: &EntityId) -> TopicPathBuilder {
        let namespace = match entity_id.namespace() {
            "" => PLACEHOLDER,
            namespace => namespace,
        };
        Self::builder(namespace, entity_id.name())
    }

    /// Start building a search topic, `_/_/things/twin/search/...`.
    pub fn search_builder() -> SearchTopicBuilder {
        Self::builder(PLACEHOLDER, PLACEHOLDER).things().twin().search()
    }

    pub fn parse(path: &str) -> Result<Self> {
        parse::parse(path)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn group(&self) -> Group {
        self.group
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    pub fn action(&self) -> Option<Action> {
        self.action
    }

    pub fn search_action(&self) -> Option<SearchAction> {
        self.search_action
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_group(&self, group: Group) -> bool {
        self.group == group
    }

    pub fn is_channel(&self, channel: Channel) -> bool {
        self.channel == channel
    }

    pub fn is_criterion(&self, criterion: Criterion) -> bool {
        self.criterion == criterion
    }

    /// The entity id the topic addresses; `_` maps back to the empty namespace.
    pub fn entity_id(&self) -> Result<EntityId> {
        let namespace = match self.namespace.as_str() {
            PLACEHOLDER => "",
            namespace => namespace,
        };
        EntityId::new(namespace, self.id.clone()).map_err(ProtocolError::from)
    }
}

impl fmt::Display for TopicPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl FromStr for TopicPath {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for TopicPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.path)
    }
}

impl<'de> Deserialize<'de> for TopicPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let path = String::deserialize(deserializer)?;
        TopicPath::parse(&path).map_err(serde::de::Error::custom)
    }
}
