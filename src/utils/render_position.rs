//! Text board for divergence reports and debugging output.

use crate::game_state::position::Position;

/// `[color][kind]`, kinds in `PieceKind::index` order.
const GLYPHS: [[char; 6]; 2] = [
    ['♙', '♘', '♗', '♖', '♕', '♔'],
    ['♟', '♞', '♝', '♜', '♛', '♚'],
];

const FILES: &str = "  a b c d e f g h";

/// Board from white's side, rank 8 on top, followed by the FEN.
pub fn render_position(position: &Position) -> String {
    let mut lines = Vec::with_capacity(11);
    lines.push(FILES.to_owned());
    for rank in (0..8u8).rev() {
        let label = char::from(b'1' + rank);
        let squares: Vec<String> = (rank * 8..rank * 8 + 8)
            .map(|square| match position.piece_at(square) {
                Some((color, kind)) => GLYPHS[color.index()][kind.index()].to_string(),
                None => "·".to_owned(),
            })
            .collect();
        lines.push(format!("{label} {} {label}", squares.join(" ")));
    }
    lines.push(FILES.to_owned());
    lines.push(position.to_fen());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::render_position;
    use crate::game_state::position::Position;

    #[test]
    fn ranks_run_top_down_with_fen_footer() {
        let text = render_position(&Position::starting());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[1], "8 ♜ ♞ ♝ ♛ ♚ ♝ ♞ ♜ 8");
        assert_eq!(lines[5], "4 · · · · · · · · 4");
        assert_eq!(lines[8], "1 ♖ ♘ ♗ ♕ ♔ ♗ ♘ ♖ 1");
        assert_eq!(lines[10], Position::starting().to_fen());
    }
}
