//! Framework-agnostic display tree.
//!
//! Renderers produce these nodes; a frontend materializes them into its own
//! widget system. No rendering-library types appear here so the same
//! transcript can back a terminal pane, a snapshot test, or a headless run.

/// One rendered message body.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayNode {
    /// Literal text, no markup interpretation.
    Text(String),
    /// Markdown parsed into styled lines.
    Rich(Vec<RichLine>),
    /// Raw markup passed through unescaped. The body crosses a trust
    /// boundary: sanitization is the upstream agent's responsibility.
    RawHtml(String),
    /// An inline image decoded from base64.
    Image(ImageBlock),
    /// A download affordance for a transferred file.
    File(FileBlock),
    /// A tabular grid decoded from a dataframe body.
    Table(Grid),
    /// One button per offered option; selecting one sends its label.
    Options(Vec<OptionButton>),
    /// A retrieval-augmented answer with expandable supporting documents.
    Rag(RagBlock),
    /// A geographic marker, materialized as a map at the next draw.
    Map(GeoPoint),
    /// A plotted chart with compact inline dimensions and a fullscreen
    /// affordance.
    Chart(ChartBlock),
}

// ── Rich text ─────────────────────────────────────────────────────────

/// A styled line of rich text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichLine {
    pub spans: Vec<RichSpan>,
}

impl RichLine {
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }
}

/// A styled run within a line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichSpan {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

impl RichSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

// ── Media ─────────────────────────────────────────────────────────────

/// Decoded inline image. The platform fixes the MIME to JPEG.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBlock {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

/// File download affordance. The href is a data URI carrying the payload,
/// so the affordance is self-contained.
#[derive(Clone, Debug, PartialEq)]
pub struct FileBlock {
    pub name: String,
    pub mime: String,
    pub data_uri: String,
    /// Decoded size in bytes, for display.
    pub size: usize,
}

// ── Structured bodies ─────────────────────────────────────────────────

/// Tabular data: header row plus row-major cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One offered option. Selecting it sends `label` as a user message,
/// exactly as if the user had typed it.
#[derive(Clone, Debug, PartialEq)]
pub struct OptionButton {
    pub key: String,
    pub label: String,
}

/// A retrieval-augmented answer: the answer itself plus the documents the
/// model consumed, revealed by a details toggle that starts collapsed.
#[derive(Clone, Debug, PartialEq)]
pub struct RagBlock {
    pub answer: String,
    pub llm_name: String,
    pub question: String,
    pub docs: Vec<RagDoc>,
}

/// One supporting document of a RAG answer.
#[derive(Clone, Debug, PartialEq)]
pub struct RagDoc {
    pub source: String,
    pub page: String,
    pub content: String,
}

/// A coordinate pair. The frontend materializes the map on its next draw,
/// once a concrete drawing area exists.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Marker popup text: the bare coordinate pair.
    pub fn popup(&self) -> String {
        format!("{}, {}", self.latitude, self.longitude)
    }
}

// ── Charts ────────────────────────────────────────────────────────────

/// Trace geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceKind {
    Scatter,
    Line,
    Bar,
}

/// One data series of a chart.
#[derive(Clone, Debug, PartialEq)]
pub struct Trace {
    pub name: Option<String>,
    pub kind: TraceKind,
    pub points: Vec<(f64, f64)>,
}

/// A parsed chart: traces plus the layout flags the widget forces on.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartBlock {
    pub title: Option<String>,
    pub traces: Vec<Trace>,
    /// Category labels when the x axis was non-numeric.
    pub x_labels: Option<Vec<String>>,
    /// Always forced on, regardless of the inbound layout.
    pub autosize: bool,
    /// Always forced on, regardless of the inbound layout.
    pub responsive: bool,
}

/// A chart materialized at concrete dimensions: the scaled point sets and
/// axis bounds a plot widget consumes. The fullscreen overlay owns one of
/// these and drops it on close so full-size renders never accumulate.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedPlot {
    pub width: u16,
    pub height: u16,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub datasets: Vec<Trace>,
}
