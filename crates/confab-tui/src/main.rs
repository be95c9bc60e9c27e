//! Chat widget host: connect to a websocket agent platform and chat.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p confab-tui
//! cargo run -p confab-tui -- --ws-address ws://localhost:8765
//! cargo run -p confab-tui -- --agent-name "Support" --theme-color "#3498db"
//! cargo run -p confab-tui -- --registry reduced --no-html
//! ```
//!
//! The widget starts hidden; click the launcher (or press `^T`) to open it.

use clap::{Parser, ValueEnum};
use confab::logging::CaptureLayer;
use confab::{RegistryVariant, ThemeColor, WidgetConfig, WidgetSession};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Clone, Copy, ValueEnum)]
enum RegistryArg {
    /// Reference superset (`agent_reply_*`).
    Full,
    /// Legacy text/markdown/html triple (`bot_reply_*`).
    Reduced,
}

impl From<RegistryArg> for RegistryVariant {
    fn from(arg: RegistryArg) -> Self {
        match arg {
            RegistryArg::Full => RegistryVariant::Full,
            RegistryArg::Reduced => RegistryVariant::Reduced,
        }
    }
}

/// Terminal host embedding the confab chat widget.
#[derive(Parser)]
#[command(about = "Chat with a websocket agent platform from the terminal")]
struct Args {
    /// Websocket address of the agent platform.
    #[arg(long, default_value = "ws://localhost:8765")]
    ws_address: String,

    /// Display name for your own messages.
    #[arg(long, default_value = "Guest")]
    user_name: String,

    /// Agent name shown in the widget header.
    #[arg(long, default_value = "Agent")]
    agent_name: String,

    /// Accent color as #rrggbb.
    #[arg(long, default_value = "#2ecc71")]
    theme_color: String,

    /// Placeholder for the empty message input.
    #[arg(long, default_value = "Type a message...")]
    placeholder: String,

    /// Glyph on the floating launcher.
    #[arg(long, default_value = "\u{2738}")]
    icon: String,

    /// Which protocol variant the agent speaks.
    #[arg(long, value_enum, default_value_t = RegistryArg::Full)]
    registry: RegistryArg,

    /// Disable the raw-HTML message kind entirely.
    #[arg(long)]
    no_html: bool,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    let theme_color = ThemeColor::parse(&args.theme_color)
        .ok_or_else(|| format!("--theme-color `{}` is not a #rrggbb color", args.theme_color))?;

    let config = WidgetConfig {
        user_name: args.user_name,
        agent_name: args.agent_name,
        theme_color,
        ws_address: args.ws_address,
        input_placeholder: args.placeholder,
        icon: args.icon,
        registry: args.registry.into(),
        allow_raw_html: !args.no_html,
        ..WidgetConfig::default()
    };

    // Diagnostics go to the in-widget log pane (^L); the terminal itself
    // belongs to the widget while it runs.
    let (capture, logs) = CaptureLayer::new();
    tracing_subscriber::registry().with(capture).init();

    let (session, events) = WidgetSession::connect(config);
    tokio::task::spawn_blocking(move || confab_tui::run(session, events, logs))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}
