//! Debug drawing of edges and generated links

use navlink_common::debug::{Color, DebugDraw, DebugVisualize};

use crate::edge::Edge;
use crate::registry::{Connection, LinkKind};

/// Color of falloff arrows on regular edges
pub const EDGE_DIRECTION_COLOR: Color = Color::CYAN;
/// Color of falloff arrows on merged representative edges
pub const REPRESENTATIVE_DIRECTION_COLOR: Color = Color::ORANGE;
pub const STANDARD_LINK_COLOR: Color = Color::GREEN;
pub const DROP_DOWN_LINK_COLOR: Color = Color::YELLOW;

/// Draws one arrow per connection anchor along the edge's falloff direction.
///
/// Returns the number of arrows drawn. Edges without anchors draw nothing.
pub fn highlight_edge_directions(edges: &[Edge], length: f32, draw: &mut DebugDraw) -> usize {
    let mut drawn = 0;
    for edge in edges {
        let color = if edge.is_representative() {
            REPRESENTATIVE_DIRECTION_COLOR
        } else {
            EDGE_DIRECTION_COLOR
        };
        for &point in &edge.connection_points {
            draw.arrow(point, point + edge.falloff_direction * length, color);
            drawn += 1;
        }
    }
    drawn
}

/// Draws accepted connections, colored by kind
pub fn highlight_links(connections: &[Connection], draw: &mut DebugDraw) {
    for connection in connections {
        let color = match connection.kind {
            LinkKind::Standard => STANDARD_LINK_COLOR,
            LinkKind::DropDown => DROP_DOWN_LINK_COLOR,
        };
        draw.thick_line(connection.start, connection.end, color, 2.0);
    }
}

impl DebugVisualize for Edge {
    fn debug_draw(&self, draw: &mut DebugDraw) {
        draw.line(self.start, self.end, Color::WHITE);
        highlight_edge_directions(std::slice::from_ref(self), 0.5, draw);
    }
}
