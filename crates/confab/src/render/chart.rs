//! Chart bodies: plotly-style `{data, layout}` JSON plotted inline.
//!
//! The inline rendering is compact and fixed-size; a fullscreen affordance
//! re-plots the same traces at 90% of the current viewport into an overlay.
//! Closing the overlay purges the full-size plot so repeated open/close
//! cycles never accumulate prepared datasets.

use serde_json::Value;

use crate::config::ThemeColor;
use crate::display::{ChartBlock, DisplayNode, PreparedPlot, Trace, TraceKind};
use crate::error::MalformedBody;

use super::body_str;

/// Compact inline plot width, in cells.
pub const COMPACT_WIDTH: u16 = 46;
/// Compact inline plot height, in cells.
pub const COMPACT_HEIGHT: u16 = 12;
/// Fraction of the viewport the fullscreen overlay occupies.
pub const FULLSCREEN_RATIO: f64 = 0.9;

pub fn chart(body: &Value, _theme: &ThemeColor) -> Result<DisplayNode, MalformedBody> {
    let raw = body_str(body, "chart")?;
    let spec: Value = serde_json::from_str(raw)
        .map_err(|e| MalformedBody::new("chart", format!("body is not chart JSON: {e}")))?;

    let data = spec
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| MalformedBody::new("chart", "missing data array"))?;

    let mut x_labels: Option<Vec<String>> = None;
    let traces = data
        .iter()
        .map(|t| parse_trace(t, &mut x_labels))
        .collect::<Result<Vec<_>, _>>()?;
    if traces.is_empty() {
        return Err(MalformedBody::new("chart", "data array is empty"));
    }

    let title = spec
        .get("layout")
        .and_then(layout_title)
        .map(str::to_string);

    Ok(DisplayNode::Chart(ChartBlock {
        title,
        traces,
        x_labels,
        // Forced on regardless of what the inbound layout says.
        autosize: true,
        responsive: true,
    }))
}

/// Plotly writes titles both as `layout.title` and `layout.title.text`.
fn layout_title(layout: &Value) -> Option<&str> {
    let title = layout.get("title")?;
    title
        .as_str()
        .or_else(|| title.get("text").and_then(Value::as_str))
}

fn parse_trace(
    trace: &Value,
    x_labels: &mut Option<Vec<String>>,
) -> Result<Trace, MalformedBody> {
    let obj = trace
        .as_object()
        .ok_or_else(|| MalformedBody::new("chart", "trace is not an object"))?;

    let kind = match obj.get("type").and_then(Value::as_str) {
        Some("bar") => TraceKind::Bar,
        _ => match obj.get("mode").and_then(Value::as_str) {
            Some(mode) if mode.contains("lines") => TraceKind::Line,
            _ => TraceKind::Scatter,
        },
    };

    let ys = obj
        .get("y")
        .and_then(Value::as_array)
        .ok_or_else(|| MalformedBody::new("chart", "trace has no y array"))?;

    // Numeric x values are used as-is; a categorical axis becomes label
    // indices, keeping the first trace's labels for the axis.
    let xs: Vec<f64> = match obj.get("x").and_then(Value::as_array) {
        Some(raw_xs) if raw_xs.iter().all(|v| v.as_f64().is_some()) => {
            raw_xs.iter().filter_map(Value::as_f64).collect()
        }
        Some(raw_xs) => {
            if x_labels.is_none() {
                *x_labels = Some(raw_xs.iter().map(super::value_text).collect());
            }
            (0..raw_xs.len()).map(|i| i as f64).collect()
        }
        None => (0..ys.len()).map(|i| i as f64).collect(),
    };

    let points = xs
        .into_iter()
        .zip(ys.iter())
        .filter_map(|(x, y)| y.as_f64().map(|y| (x, y)))
        .collect::<Vec<_>>();
    if points.is_empty() {
        return Err(MalformedBody::new("chart", "trace has no numeric points"));
    }

    Ok(Trace {
        name: obj.get("name").and_then(Value::as_str).map(str::to_string),
        kind,
        points,
    })
}

impl ChartBlock {
    /// Materialize the traces at concrete dimensions: clone the point sets
    /// and compute padded axis bounds. The compact view prepares at
    /// [`COMPACT_WIDTH`]×[`COMPACT_HEIGHT`]; the fullscreen overlay at 90%
    /// of the viewport.
    pub fn prepare(&self, width: u16, height: u16) -> PreparedPlot {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for trace in &self.traces {
            for &(x, y) in &trace.points {
                x_min = x_min.min(x);
                x_max = x_max.max(x);
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        }
        PreparedPlot {
            width,
            height,
            x_bounds: pad_bounds(x_min, x_max),
            y_bounds: pad_bounds(y_min, y_max),
            datasets: self.traces.clone(),
        }
    }

    /// Dimensions of the fullscreen re-plot for a given viewport.
    pub fn fullscreen_dims(viewport_width: u16, viewport_height: u16) -> (u16, u16) {
        (
            (f64::from(viewport_width) * FULLSCREEN_RATIO) as u16,
            (f64::from(viewport_height) * FULLSCREEN_RATIO) as u16,
        )
    }
}

/// Widen degenerate or tight bounds so plots never collapse onto an axis.
fn pad_bounds(min: f64, max: f64) -> [f64; 2] {
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    if min == max {
        return [min - 1.0, max + 1.0];
    }
    let pad = (max - min) * 0.05;
    [min - pad, max + pad]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(raw: &str) -> Result<ChartBlock, MalformedBody> {
        match chart(&Value::String(raw.into()), &ThemeColor::DEFAULT)? {
            DisplayNode::Chart(block) => Ok(block),
            other => panic!("expected chart, got {other:?}"),
        }
    }

    #[test]
    fn layout_flags_are_forced_on() {
        let block = render(
            r#"{"data":[{"x":[1,2],"y":[3,4]}],"layout":{"autosize":false,"responsive":false}}"#,
        )
        .unwrap();
        assert!(block.autosize);
        assert!(block.responsive);
    }

    #[test]
    fn scatter_line_and_bar_kinds() {
        let block = render(
            r#"{"data":[
                {"x":[1],"y":[1]},
                {"x":[1],"y":[1],"mode":"lines+markers"},
                {"x":[1],"y":[1],"type":"bar"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(block.traces[0].kind, TraceKind::Scatter);
        assert_eq!(block.traces[1].kind, TraceKind::Line);
        assert_eq!(block.traces[2].kind, TraceKind::Bar);
    }

    #[test]
    fn categorical_x_becomes_labeled_indices() {
        let block = render(r#"{"data":[{"x":["a","b","c"],"y":[1,2,3]}]}"#).unwrap();
        assert_eq!(block.x_labels.as_deref(), Some(&["a", "b", "c"].map(String::from)[..]));
        assert_eq!(block.traces[0].points, vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
    }

    #[test]
    fn missing_x_counts_up() {
        let block = render(r#"{"data":[{"y":[5,6]}]}"#).unwrap();
        assert_eq!(block.traces[0].points, vec![(0.0, 5.0), (1.0, 6.0)]);
    }

    #[test]
    fn title_from_both_layout_shapes() {
        let a = render(r#"{"data":[{"y":[1]}],"layout":{"title":"plain"}}"#).unwrap();
        assert_eq!(a.title.as_deref(), Some("plain"));
        let b = render(r#"{"data":[{"y":[1]}],"layout":{"title":{"text":"nested"}}}"#).unwrap();
        assert_eq!(b.title.as_deref(), Some("nested"));
    }

    #[test]
    fn malformed_bodies_are_rejected() {
        assert!(render("not json").is_err());
        assert!(render(r#"{"layout":{}}"#).is_err());
        assert!(render(r#"{"data":[]}"#).is_err());
        assert!(render(r#"{"data":[{"x":[1]}]}"#).is_err());
    }

    #[test]
    fn prepare_pads_bounds_and_keeps_dims() {
        let block = render(r#"{"data":[{"x":[0,10],"y":[5,5]}]}"#).unwrap();
        let plot = block.prepare(COMPACT_WIDTH, COMPACT_HEIGHT);
        assert_eq!((plot.width, plot.height), (COMPACT_WIDTH, COMPACT_HEIGHT));
        assert!(plot.x_bounds[0] < 0.0 && plot.x_bounds[1] > 10.0);
        // Flat series still gets a non-degenerate y range.
        assert!(plot.y_bounds[0] < 5.0 && plot.y_bounds[1] > 5.0);
        assert_eq!(plot.datasets.len(), 1);
    }

    #[test]
    fn fullscreen_dims_are_ninety_percent() {
        assert_eq!(ChartBlock::fullscreen_dims(100, 40), (90, 36));
    }
}
