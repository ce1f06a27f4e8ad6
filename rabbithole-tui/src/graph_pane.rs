use rabbithole_core::graph::GraphView;
use rabbithole_core::theme::{Palette, Rgb};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::canvas::{Canvas, Circle, Line as CanvasLine},
    widgets::{Block, Borders},
};
use std::io::{self, IsTerminal};

/// Half-width of the canvas coordinate space. Satellites sit on a circle of
/// radius 2, so this leaves room for their labels.
const GRAPH_BOUND: f64 = 3.0;

/// Click tolerance in canvas units.
const HIT_TOLERANCE: f64 = 0.6;

/// A renderer for the similarity graph.
///
/// The implementation is chosen once at startup by a capability check:
/// a real canvas pane on interactive terminals, a no-op stub otherwise.
pub trait GraphPane {
    fn draw(&self, f: &mut Frame, area: Rect, graph: &GraphView, palette: &Palette);

    /// Resolve a terminal cell position to the id of the node under it.
    fn hit_test(&self, area: Rect, graph: &GraphView, column: u16, row: u16) -> Option<String>;
}

/// Pick the graph renderer for this process.
pub fn detect() -> Box<dyn GraphPane> {
    let dumb_term = std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false);
    if io::stdout().is_terminal() && !dumb_term {
        Box::new(CanvasGraphPane)
    } else {
        Box::new(NoopGraphPane)
    }
}

/// Braille-canvas renderer: edges as lines shaded by width, nodes as circles
/// with labels printed beside them.
pub struct CanvasGraphPane;

impl GraphPane for CanvasGraphPane {
    fn draw(&self, f: &mut Frame, area: Rect, graph: &GraphView, palette: &Palette) {
        let canvas = Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Connections "),
            )
            .x_bounds([-GRAPH_BOUND, GRAPH_BOUND])
            .y_bounds([-GRAPH_BOUND, GRAPH_BOUND])
            .paint(|ctx| {
                for (source, target, edge) in graph.edges() {
                    ctx.draw(&CanvasLine {
                        x1: source.x,
                        y1: source.y,
                        x2: target.x,
                        y2: target.y,
                        color: edge_color(palette.edge, edge.width),
                    });
                }
                ctx.layer();

                for node in graph.nodes() {
                    let rgb = match node.role {
                        rabbithole_core::graph::NodeRole::Center => palette.center_node,
                        rabbithole_core::graph::NodeRole::Satellite => palette.satellite_node,
                    };
                    let color = to_color(rgb);
                    ctx.draw(&Circle {
                        x: node.x,
                        y: node.y,
                        radius: node.size / 80.0,
                        color,
                    });
                    ctx.print(
                        node.x,
                        node.y - 0.35,
                        ratatui::text::Line::styled(
                            node.label.clone(),
                            Style::default().fg(color),
                        ),
                    );
                }
            });

        f.render_widget(canvas, area);
    }

    fn hit_test(&self, area: Rect, graph: &GraphView, column: u16, row: u16) -> Option<String> {
        // Strip the block border before mapping to canvas coordinates.
        let inner = Rect {
            x: area.x + 1,
            y: area.y + 1,
            width: area.width.saturating_sub(2),
            height: area.height.saturating_sub(2),
        };
        if inner.width == 0
            || inner.height == 0
            || column < inner.x
            || column >= inner.x + inner.width
            || row < inner.y
            || row >= inner.y + inner.height
        {
            return None;
        }

        let fx = (column - inner.x) as f64 + 0.5;
        let fy = (row - inner.y) as f64 + 0.5;
        let x = -GRAPH_BOUND + fx / inner.width as f64 * (2.0 * GRAPH_BOUND);
        // Canvas y grows upward, terminal rows grow downward.
        let y = GRAPH_BOUND - fy / inner.height as f64 * (2.0 * GRAPH_BOUND);

        graph.hit_test(x, y, HIT_TOLERANCE).map(|id| id.to_string())
    }
}

/// Stub renderer for terminals that cannot host the canvas.
pub struct NoopGraphPane;

impl GraphPane for NoopGraphPane {
    fn draw(&self, f: &mut Frame, area: Rect, _graph: &GraphView, _palette: &Palette) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Connections ");
        f.render_widget(block, area);
    }

    fn hit_test(&self, _area: Rect, _graph: &GraphView, _column: u16, _row: u16) -> Option<String> {
        None
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Thicker edges render brighter. Width is floored at 1 and capped at 2 by
/// the score scaling, so the factor stays within [0.5, 1.0].
fn edge_color(rgb: Rgb, width: f64) -> Color {
    let factor = (width / 2.0).clamp(0.5, 1.0);
    Color::Rgb(
        (rgb.0 as f64 * factor) as u8,
        (rgb.1 as f64 * factor) as u8,
        (rgb.2 as f64 * factor) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rabbithole_core::SearchResult;

    fn graph_with_center() -> GraphView {
        let mut graph = GraphView::new();
        graph.rebuild(
            &SearchResult::new("center", "Center", 1.0),
            &[SearchResult::new("sat", "Satellite", 0.9)],
        );
        graph
    }

    #[test]
    fn hit_test_maps_the_middle_cell_to_the_center_node() {
        let graph = graph_with_center();
        let pane = CanvasGraphPane;
        let area = Rect::new(0, 0, 42, 22);

        // Middle of the inner drawing area is canvas (0, 0).
        let hit = pane.hit_test(area, &graph, 21, 11);
        assert_eq!(hit.as_deref(), Some("center"));
    }

    #[test]
    fn hit_test_outside_the_area_is_none() {
        let graph = graph_with_center();
        let pane = CanvasGraphPane;
        let area = Rect::new(0, 0, 42, 22);

        assert_eq!(pane.hit_test(area, &graph, 60, 5), None);
        assert_eq!(pane.hit_test(area, &graph, 0, 0), None); // border cell
    }

    #[test]
    fn noop_pane_never_hits() {
        let graph = graph_with_center();
        let pane = NoopGraphPane;
        let area = Rect::new(0, 0, 42, 22);
        assert_eq!(pane.hit_test(area, &graph, 21, 11), None);
    }

    #[test]
    fn edge_color_brightens_with_width() {
        let dim = edge_color((200, 200, 200), 1.0);
        let bright = edge_color((200, 200, 200), 2.0);
        assert_eq!(dim, Color::Rgb(100, 100, 100));
        assert_eq!(bright, Color::Rgb(200, 200, 200));
    }
}
