//! Plain-text map rendering for terminals and reports.
use super::graph::RunMap;
use super::node::{Node, NodeId};

const CELL: usize = 4;
const UNTYPED_GLYPH: char = 'o';
const EMPTY_GLYPH: char = '.';

/// Render the map with the boss on top and the first layer at the bottom.
///
/// Each layer is one row of glyphs (`.` for a pruned column); the row between
/// two layers draws `|`, `/` and `\` for straight and diagonal edges.
#[must_use]
pub fn render_map(map: &RunMap) -> String {
    let width = map.width();
    let row_len = width * CELL;
    let mut out = String::new();

    if let Some(boss) = map.boss() {
        let mut row = blank_row(row_len);
        put(&mut row, boss.column() * CELL + 1, glyph(boss));
        push_line(
            &mut out,
            &format!(
                "{:>3} {}  <- {} routes",
                map.height(),
                row.iter().collect::<String>().trim_end(),
                boss.incoming.len()
            ),
        );
    }

    for layer_idx in (0..map.height()).rev() {
        let Some(layer) = map.layer(layer_idx) else {
            continue;
        };
        if layer_idx + 1 < map.height() {
            let mut edges = blank_row(row_len);
            for node in layer {
                for target in &node.outgoing {
                    draw_edge(&mut edges, node.id, *target);
                }
            }
            push_line(
                &mut out,
                &format!("    {}", edges.iter().collect::<String>().trim_end()),
            );
        } else {
            push_line(&mut out, "");
        }

        let mut row: Vec<char> = (0..width)
            .flat_map(|_| [' ', EMPTY_GLYPH, ' ', ' '])
            .collect();
        for node in layer {
            put(&mut row, node.column() * CELL + 1, glyph(node));
        }
        push_line(
            &mut out,
            &format!("{layer_idx:>3} {}", row.iter().collect::<String>().trim_end()),
        );
    }
    out
}

/// Legend for the glyphs used by [`render_map`].
#[must_use]
pub fn legend() -> &'static str {
    "B battle  ? choice  T treasure  G garage  $ merchant  X boss  o untyped  . pruned"
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn glyph(node: &Node) -> char {
    node.kind.map_or(UNTYPED_GLYPH, |kind| kind.glyph())
}

fn blank_row(len: usize) -> Vec<char> {
    vec![' '; len]
}

fn put(row: &mut [char], idx: usize, ch: char) {
    if let Some(slot) = row.get_mut(idx) {
        *slot = ch;
    }
}

fn draw_edge(row: &mut [char], from: NodeId, to: NodeId) {
    let base = from.column * CELL + 1;
    if to.column == from.column {
        put(row, base, '|');
    } else if to.column == from.column + 1 {
        put(row, base + 2, '/');
    } else if let Some(idx) = base.checked_sub(2) {
        put(row, idx, '\\');
    }
}
