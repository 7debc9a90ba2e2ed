//! Reveal Events and Stream Protocol
//!
//! Two message families live here:
//!
//! - [`RevealEvent`]: one atomic unit of animation progress applied to the
//!   render surface: a node or a link becoming visible. Produced once,
//!   applied at most once.
//! - [`StreamMessage`]: the typed wire protocol of the optional remote reveal
//!   stream. The backend frames node/link payloads with `metadata`, `steps`,
//!   `error`, and `complete` control messages; the adapter decodes JSON text
//!   frames into this enum and nothing downstream touches raw JSON.

use serde::{Deserialize, Serialize};

use crate::tree::NodeId;

// ============================================================================
// Notifications
// ============================================================================

/// Severity of a transient notification shown by the surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
    /// Error
    Error,
    /// Success
    Success,
}

// ============================================================================
// Reveal Events
// ============================================================================

/// One atomic unit of animation progress
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealEvent {
    /// A node became visible
    Node {
        /// Identity of the revealed node
        id: NodeId,
        /// Position in the overall reveal order
        sequence_index: usize,
    },
    /// A link between two already-visible nodes became visible
    Link {
        /// Parent endpoint
        source: NodeId,
        /// Child endpoint
        target: NodeId,
        /// Position in the overall reveal order
        sequence_index: usize,
    },
}

impl RevealEvent {
    /// Position of this event in the overall reveal order
    #[must_use]
    pub fn sequence_index(&self) -> usize {
        match self {
            Self::Node { sequence_index, .. } | Self::Link { sequence_index, .. } => {
                *sequence_index
            }
        }
    }
}

// ============================================================================
// Stream Protocol
// ============================================================================

/// Node payload of a remote reveal step
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamNode {
    /// Element name
    pub name: String,
    /// Optional image reference
    #[serde(default, rename = "imagePath", skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

/// Link payload of a remote reveal step (endpoints by element name)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamLink {
    /// Parent endpoint name
    pub source: String,
    /// Child endpoint name
    pub target: String,
}

/// A typed message on the remote reveal stream
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamMessage {
    /// Stream header describing what is about to be animated
    Metadata {
        /// Algorithm the backend used
        #[serde(default)]
        algorithm: String,
        /// Target element being derived
        #[serde(default)]
        element: String,
    },

    /// Declared total number of reveal steps
    #[serde(rename_all = "camelCase")]
    Steps {
        /// Total steps the backend intends to send
        total_steps: usize,
    },

    /// A node reveal step
    #[serde(rename_all = "camelCase")]
    Node {
        /// The node payload
        node: StreamNode,
        /// Whether the node is a base element
        #[serde(default)]
        is_base_node: bool,
        /// 1-based index of this step
        #[serde(default)]
        step_index: usize,
        /// Declared total steps (repeated per step)
        #[serde(default)]
        total_steps: usize,
    },

    /// A link reveal step
    #[serde(rename_all = "camelCase")]
    Link {
        /// The link payload
        link: StreamLink,
        /// 1-based index of this step
        #[serde(default)]
        step_index: usize,
        /// Declared total steps (repeated per step)
        #[serde(default)]
        total_steps: usize,
    },

    /// The backend hit an error; the stream is over
    Error {
        /// Error description
        #[serde(default)]
        message: String,
    },

    /// The stream finished normally
    #[serde(rename_all = "camelCase")]
    Complete {
        /// Nodes the search visited (statistics, not reveals)
        #[serde(default)]
        nodes_visited: usize,
    },
}

impl StreamMessage {
    /// Whether this message ends the stream (normally or not)
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::Complete { .. })
    }

    /// Whether this message is a reveal step (node or link payload)
    #[must_use]
    pub fn is_step(&self) -> bool {
        matches!(self, Self::Node { .. } | Self::Link { .. })
    }
}
