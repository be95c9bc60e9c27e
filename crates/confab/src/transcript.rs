//! Append-only transcript of rendered messages.
//!
//! Insertion order is the only meaningful order: entries are never removed
//! or reordered during a session. The one whole-transcript operation is
//! [`Transcript::clear`], used by the session-reset control.

use crate::display::DisplayNode;

/// Monotonically increasing entry identifier, unique within a session even
/// across a reset.
pub type EntryId = u64;

/// Who produced an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    User,
    Agent,
}

/// One rendered message in the transcript.
#[derive(Clone, Debug)]
pub struct TranscriptEntry {
    pub id: EntryId,
    pub origin: Origin,
    /// Identity class of the renderer that produced the node
    /// (`str-message`, `markdown-message`, ...).
    pub class: &'static str,
    pub node: DisplayNode,
}

/// The ordered visual history of exchanged messages.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    next_id: EntryId,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rendered node and return its id.
    pub fn push(&mut self, origin: Origin, class: &'static str, node: DisplayNode) -> EntryId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(TranscriptEntry {
            id,
            origin,
            class,
            node,
        });
        id
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&TranscriptEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries. Ids keep increasing so stale references from before
    /// the clear can never alias a new entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Most recent entry carrying an options body, if any.
    pub fn last_options(&self) -> Option<&TranscriptEntry> {
        self.last_matching(|e| matches!(e.node, DisplayNode::Options(_)))
    }

    /// Most recent entry carrying a chart, if any.
    pub fn last_chart(&self) -> Option<&TranscriptEntry> {
        self.last_matching(|e| matches!(e.node, DisplayNode::Chart(_)))
    }

    /// Most recent retrieval-augmented answer, if any.
    pub fn last_rag(&self) -> Option<&TranscriptEntry> {
        self.last_matching(|e| matches!(e.node, DisplayNode::Rag(_)))
    }

    fn last_matching(&self, pred: impl Fn(&TranscriptEntry) -> bool) -> Option<&TranscriptEntry> {
        self.entries.iter().rev().find(|e| pred(e))
    }
}
