//! Codec between the notification vocabulary and the generic data tree
//!
//! The codec is compiled from the fixed `nc-notifications` / `notifications`
//! modules (revision 2008-07-14). It is immutable once built, so one instance
//! serves every mount; [`NotificationCodec::shared`] builds it on first use.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock, OnceLock};

use thiserror::Error;

use super::{CreateSubscriptionInput, DateAndTime, Stream};
use crate::model::{
    ContainerNode, DataNode, InstanceIdentifier, LeafValue, ListNode, QName, QNameModule,
    SchemaPath,
};
use crate::schema::{ContextError, ModuleInfo, Revision, SchemaContext};

/// Namespace of the module describing available streams
pub const NETMOD_NOTIFICATION_NS: &str = "urn:ietf:params:xml:ns:netmod:notification";

/// Namespace of the module defining `create-subscription`
pub const NETCONF_NOTIFICATION_NS: &str = "urn:ietf:params:xml:ns:netconf:notification:1.0";

/// Name of the module describing available streams
pub const NETMOD_NOTIFICATION_MODULE: &str = "nc-notifications";

/// Name of the module defining `create-subscription`
pub const NETCONF_NOTIFICATION_MODULE: &str = "notifications";

fn vocabulary_revision() -> Option<Revision> {
    Revision::from_ymd(2008, 7, 14)
}

/// `nc-notifications` module
pub static NETMOD_NOTIFICATION: LazyLock<QNameModule> =
    LazyLock::new(|| QNameModule::new(NETMOD_NOTIFICATION_NS, vocabulary_revision()));

/// `notifications` module
pub static NETCONF_NOTIFICATION: LazyLock<QNameModule> =
    LazyLock::new(|| QNameModule::new(NETCONF_NOTIFICATION_NS, vocabulary_revision()));

/// Operational path listing the device's streams in the built-in vocabulary
pub static STREAMS_PATH: LazyLock<InstanceIdentifier> =
    LazyLock::new(|| streams_path(&NETMOD_NOTIFICATION));

/// Schema path of `create-subscription` in the built-in vocabulary
pub static CREATE_SUBSCRIPTION: LazyLock<SchemaPath> =
    LazyLock::new(|| create_subscription_path(&NETCONF_NOTIFICATION));

/// `/netconf/streams` in `module`
fn streams_path(module: &QNameModule) -> InstanceIdentifier {
    InstanceIdentifier::root()
        .node(QName::new(module, "netconf"))
        .node(QName::new(module, "streams"))
}

fn create_subscription_path(module: &QNameModule) -> SchemaPath {
    SchemaPath::top_level(QName::new(module, "create-subscription"))
}

static SHARED: OnceLock<Result<Arc<NotificationCodec>, CodecError>> = OnceLock::new();

/// Conversion failures between typed values and the data tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Compiled context lacks a definition the codec binds to
    #[error("schema context lacks {0}")]
    MissingDefinition(String),

    /// Modules could not be compiled
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Node has the wrong name or kind
    #[error("expected {expected}, found {found}")]
    UnexpectedNode { expected: String, found: String },

    /// Mandatory leaf absent
    #[error("{node} is missing leaf {leaf}")]
    MissingLeaf { node: String, leaf: String },

    /// Leaf value does not match its type
    #[error("invalid value '{value}' for {leaf}")]
    InvalidValue { leaf: String, value: String },

    /// Stream names must be unique within one read
    #[error("duplicate stream {0}")]
    DuplicateStream(String),
}

/// Module definitions the codec is compiled from
#[must_use]
pub fn vocabulary_modules() -> Vec<ModuleInfo> {
    vec![
        ModuleInfo::new(NETMOD_NOTIFICATION_MODULE, NETMOD_NOTIFICATION_NS, vocabulary_revision())
            .with_data_path(&["netconf"])
            .with_data_path(&["netconf", "streams"])
            .with_notification("replayComplete")
            .with_notification("notificationComplete"),
        ModuleInfo::new(NETCONF_NOTIFICATION_MODULE, NETCONF_NOTIFICATION_NS, vocabulary_revision())
            .with_rpc("create-subscription"),
    ]
}

/// Binding-to-tree codec for the notification vocabulary
///
/// Every name the codec reads or writes is qualified by the module revision
/// found in its schema context, so a codec compiled from a newer revision of
/// the vocabulary speaks that revision.
#[derive(Debug)]
pub struct NotificationCodec {
    context: SchemaContext,
    streams_module: QNameModule,
    rpc_module: QNameModule,
    streams_path: InstanceIdentifier,
    create_subscription: SchemaPath,
}

impl NotificationCodec {
    /// Compile the codec from the built-in vocabulary
    ///
    /// # Errors
    ///
    /// Returns error if the vocabulary does not compile
    pub fn new() -> Result<Self, CodecError> {
        Self::from_modules(vocabulary_modules())
    }

    /// Compile the codec from explicit module definitions
    ///
    /// # Errors
    ///
    /// Returns error if the modules conflict or lack the stream list or
    /// `create-subscription` definitions
    pub fn from_modules(modules: Vec<ModuleInfo>) -> Result<Self, CodecError> {
        let context = SchemaContext::from_modules(modules)?;
        let streams_module = newest_module(&context, NETMOD_NOTIFICATION_MODULE)?;
        let rpc_module = newest_module(&context, NETCONF_NOTIFICATION_MODULE)?;

        let streams_path = streams_path(&streams_module);
        if !context.has_data_path(streams_path.steps()) {
            return Err(CodecError::MissingDefinition(format!(
                "container {streams_path}"
            )));
        }
        let create_subscription = create_subscription_path(&rpc_module);
        if !create_subscription
            .last()
            .is_some_and(|rpc| context.has_rpc(rpc))
        {
            return Err(CodecError::MissingDefinition(format!(
                "rpc {create_subscription}"
            )));
        }

        tracing::debug!(
            modules = context.modules().len(),
            streams = %streams_module,
            rpc = %rpc_module,
            "notification codec compiled"
        );
        Ok(Self {
            context,
            streams_module,
            rpc_module,
            streams_path,
            create_subscription,
        })
    }

    /// Process-wide codec, compiled once on first call
    ///
    /// # Errors
    ///
    /// Returns the bootstrap error on every call if compilation failed
    pub fn shared() -> Result<Arc<Self>, CodecError> {
        SHARED
            .get_or_init(|| {
                Self::new().map(Arc::new).inspect_err(|e| {
                    tracing::error!(error = %e, "notification codec bootstrap failed");
                })
            })
            .clone()
    }

    /// Context the codec was compiled from
    #[must_use]
    pub const fn schema_context(&self) -> &SchemaContext {
        &self.context
    }

    /// Operational path of the `streams` container
    #[must_use]
    pub const fn streams_path(&self) -> &InstanceIdentifier {
        &self.streams_path
    }

    /// Schema path of the `create-subscription` operation
    #[must_use]
    pub const fn create_subscription_path(&self) -> &SchemaPath {
        &self.create_subscription
    }

    /// Encode `create-subscription` input as its `input` container
    #[must_use]
    pub fn to_rpc_input(&self, input: &CreateSubscriptionInput) -> ContainerNode {
        let ns = &self.rpc_module;
        let mut node = ContainerNode::new(QName::new(ns, "input")).with_leaf(
            QName::new(ns, "stream"),
            LeafValue::String(input.stream.clone()),
        );
        if let Some(start) = &input.start_time {
            node = node.with_leaf(
                QName::new(ns, "startTime"),
                LeafValue::String(start.as_str().to_string()),
            );
        }
        node
    }

    /// Decode an `input` container back into typed input
    ///
    /// # Errors
    ///
    /// Returns error if the container is not a `create-subscription` input
    pub fn decode_rpc_input(&self, node: &ContainerNode) -> Result<CreateSubscriptionInput, CodecError> {
        let ns = &self.rpc_module;
        expect_name(&node.name, &QName::new(ns, "input"))?;

        let stream = string_leaf(node, &QName::new(ns, "stream"))?.ok_or_else(|| {
            CodecError::MissingLeaf {
                node: "input".to_string(),
                leaf: "stream".to_string(),
            }
        })?;
        let start_time = string_leaf(node, &QName::new(ns, "startTime"))?
            .map(|s| DateAndTime::parse(&s).map_err(|_| invalid("startTime", &s)))
            .transpose()?;

        Ok(CreateSubscriptionInput { stream, start_time })
    }

    /// Decode the `streams` container read from [`Self::streams_path`]
    ///
    /// Streams keep document order. A container without entries decodes to
    /// an empty list.
    ///
    /// # Errors
    ///
    /// Returns error on a misshapen tree, a missing or duplicate stream name,
    /// or a malformed leaf value
    pub fn streams_from_node(&self, node: &DataNode) -> Result<Vec<Stream>, CodecError> {
        let ns = &self.streams_module;
        let DataNode::Container(streams) = node else {
            return Err(unexpected("container streams", node));
        };
        expect_name(&streams.name, &QName::new(ns, "streams"))?;

        let entries = match streams.child(&QName::new(ns, "stream")) {
            None => return Ok(Vec::new()),
            Some(DataNode::List(list)) => &list.entries,
            Some(other) => return Err(unexpected("list stream", other)),
        };

        let mut seen = HashSet::new();
        let mut decoded = Vec::with_capacity(entries.len());
        for entry in entries {
            let stream = decode_stream(ns, entry)?;
            if !seen.insert(stream.name.clone()) {
                return Err(CodecError::DuplicateStream(stream.name));
            }
            decoded.push(stream);
        }
        Ok(decoded)
    }

    /// Encode streams as the `streams` container
    #[must_use]
    pub fn streams_to_node(&self, streams: &[Stream]) -> ContainerNode {
        let ns = &self.streams_module;
        let entries = streams
            .iter()
            .map(|stream| {
                let mut entry = ContainerNode::new(QName::new(ns, "stream"))
                    .with_leaf(QName::new(ns, "name"), LeafValue::String(stream.name.clone()))
                    .with_leaf(
                        QName::new(ns, "replaySupport"),
                        LeafValue::Boolean(stream.replay_support),
                    );
                if let Some(description) = &stream.description {
                    entry = entry.with_leaf(
                        QName::new(ns, "description"),
                        LeafValue::String(description.clone()),
                    );
                }
                if let Some(created) = &stream.replay_log_creation_time {
                    entry = entry.with_leaf(
                        QName::new(ns, "replayLogCreationTime"),
                        LeafValue::String(created.to_rfc3339()),
                    );
                }
                entry
            })
            .collect();

        ContainerNode::new(QName::new(ns, "streams")).with_child(DataNode::List(ListNode {
            name: QName::new(ns, "stream"),
            entries,
        }))
    }
}

fn newest_module(context: &SchemaContext, name: &str) -> Result<QNameModule, CodecError> {
    context
        .find_module(name, None)
        .map(|m| m.module.clone())
        .ok_or_else(|| CodecError::MissingDefinition(format!("module {name}")))
}

fn decode_stream(ns: &QNameModule, entry: &ContainerNode) -> Result<Stream, CodecError> {
    let name = string_leaf(entry, &QName::new(ns, "name"))?.ok_or_else(|| {
        CodecError::MissingLeaf {
            node: "stream".to_string(),
            leaf: "name".to_string(),
        }
    })?;
    let description = string_leaf(entry, &QName::new(ns, "description"))?;

    let replay_support = match entry.leaf(&QName::new(ns, "replaySupport")) {
        None => false,
        Some(LeafValue::Boolean(b)) => *b,
        Some(LeafValue::String(s)) => match s.as_str() {
            "true" => true,
            "false" => false,
            _ => return Err(invalid("replaySupport", s)),
        },
        Some(other) => return Err(invalid("replaySupport", &other.to_string())),
    };

    let replay_log_creation_time = string_leaf(entry, &QName::new(ns, "replayLogCreationTime"))?
        .map(|s| {
            DateAndTime::parse(&s)
                .map(|t| t.to_datetime())
                .map_err(|_| invalid("replayLogCreationTime", &s))
        })
        .transpose()?;

    Ok(Stream {
        name,
        description,
        replay_support,
        replay_log_creation_time,
    })
}

fn string_leaf(node: &ContainerNode, name: &QName) -> Result<Option<String>, CodecError> {
    match node.leaf(name) {
        None => Ok(None),
        Some(LeafValue::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid(&name.local_name, &other.to_string())),
    }
}

fn expect_name(found: &QName, expected: &QName) -> Result<(), CodecError> {
    if found == expected {
        Ok(())
    } else {
        Err(CodecError::UnexpectedNode {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}

fn unexpected(expected: &str, found: &DataNode) -> CodecError {
    CodecError::UnexpectedNode {
        expected: expected.to_string(),
        found: format!("{} {}", found.kind(), found.name()),
    }
}

fn invalid(leaf: &str, value: &str) -> CodecError {
    CodecError::InvalidValue {
        leaf: leaf.to_string(),
        value: value.to_string(),
    }
}
