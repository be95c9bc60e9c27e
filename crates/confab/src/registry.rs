//! Action-kind registries: which kinds a widget variant accepts, and how
//! each accepted kind renders.
//!
//! Two registries exist for the two protocol variants: the full reference
//! set and the reduced legacy set. Both share one interface; the renderer
//! table itself is a single exhaustive match, so a new [`ActionKind`]
//! without a renderer decision is a compile error, not a runtime warning.

use serde::{Deserialize, Serialize};

use crate::protocol::ActionKind;
use crate::render::{self, RenderFn};

/// Which protocol variant a widget speaks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryVariant {
    /// The reference superset: `agent_reply_*` plus `user_message`.
    #[default]
    Full,
    /// Legacy three-kind set: `bot_reply_str|markdown|html` plus
    /// `user_message`.
    Reduced,
}

/// How one action kind renders: the pure renderer and the identity class
/// tagged onto its transcript entries.
#[derive(Clone, Copy)]
pub struct RendererSpec {
    pub class: &'static str,
    pub render: RenderFn,
}

/// A variant's view of the renderer table. Populated at construction,
/// never mutated: extension happens by adding kinds at build time.
#[derive(Clone, Copy, Debug)]
pub struct ActionRegistry {
    variant: RegistryVariant,
    allow_raw_html: bool,
}

impl ActionRegistry {
    pub fn new(variant: RegistryVariant, allow_raw_html: bool) -> Self {
        Self {
            variant,
            allow_raw_html,
        }
    }

    /// The reference registry with every kind enabled.
    pub fn full() -> Self {
        Self::new(RegistryVariant::Full, true)
    }

    /// The reduced legacy registry.
    pub fn reduced() -> Self {
        Self::new(RegistryVariant::Reduced, true)
    }

    pub fn variant(&self) -> RegistryVariant {
        self.variant
    }

    /// Look up the renderer for a kind. `None` means the kind does not
    /// render in this registry; the dispatcher drops such frames without
    /// touching the transcript.
    pub fn resolve(&self, kind: ActionKind) -> Option<RendererSpec> {
        if !self.accepts(kind) {
            return None;
        }
        spec_for(kind)
    }

    /// Every kind this registry renders.
    pub fn supported(&self) -> Vec<ActionKind> {
        ActionKind::ALL
            .iter()
            .copied()
            .filter(|&k| self.resolve(k).is_some())
            .collect()
    }

    fn accepts(&self, kind: ActionKind) -> bool {
        use ActionKind::*;
        if !self.allow_raw_html && matches!(kind, AgentReplyHtml | BotReplyHtml) {
            return false;
        }
        match self.variant {
            RegistryVariant::Full => !matches!(kind, BotReplyStr | BotReplyMarkdown | BotReplyHtml),
            RegistryVariant::Reduced => {
                matches!(kind, UserMessage | BotReplyStr | BotReplyMarkdown | BotReplyHtml)
            }
        }
    }
}

/// The renderer table. Exhaustive over [`ActionKind`] by construction.
fn spec_for(kind: ActionKind) -> Option<RendererSpec> {
    use ActionKind::*;
    let spec = match kind {
        // Control action, nothing to render.
        Reset => return None,
        UserMessage | AgentReplyStr | BotReplyStr => RendererSpec {
            class: "str-message",
            render: render::text,
        },
        AgentReplyMarkdown | BotReplyMarkdown => RendererSpec {
            class: "markdown-message",
            render: render::markdown::markdown,
        },
        AgentReplyHtml | BotReplyHtml => RendererSpec {
            class: "html-message",
            render: render::html,
        },
        AgentReplyImage => RendererSpec {
            class: "image-message",
            render: render::media::image,
        },
        AgentReplyFile => RendererSpec {
            class: "file-message",
            render: render::media::file,
        },
        AgentReplyDataframe => RendererSpec {
            class: "dataframe-message",
            render: render::table::dataframe,
        },
        AgentReplyOptions => RendererSpec {
            class: "options-message",
            render: render::options,
        },
        AgentReplyRag => RendererSpec {
            class: "rag-message",
            render: render::rag::rag,
        },
        AgentReplyLocation => RendererSpec {
            class: "location-message",
            render: render::location::location,
        },
        AgentReplyPlotly => RendererSpec {
            class: "plotly-message",
            render: render::chart::chart,
        },
    };
    Some(spec)
}
