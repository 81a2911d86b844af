use crate::game_state::position::Position;
use crate::move_generation::legal_move_generator::LegalMoveGenerator;
use crate::move_generation::legal_move_shared::classify_move;
use crate::move_generation::rules_oracle::{OracleResult, RulesOracle};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub captures: usize,
    pub en_passant: usize,
    pub castles: usize,
    pub promotions: usize,
    pub checks: usize,
    pub checkmates: usize,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }
}

/// Leaf-node count through any oracle.
pub fn perft_nodes<O: RulesOracle>(oracle: &O, position: &Position, depth: u8) -> OracleResult<usize> {
    if depth == 0 {
        return Ok(1);
    }

    let moves = oracle.legal_moves(position)?;
    if depth == 1 {
        return Ok(moves.len());
    }

    let mut total = 0usize;
    for mv in moves {
        let next = oracle.apply(position, &mv)?;
        total += perft_nodes(oracle, &next, depth - 1)?;
    }
    Ok(total)
}

/// Leaf-node count with per-move-kind breakdown of the last ply.
pub fn perft(generator: &LegalMoveGenerator, position: &Position, depth: u8) -> OracleResult<PerftCounts> {
    if depth == 0 {
        return Ok(PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        });
    }

    let mut total = PerftCounts::default();
    for (mv, next) in generator.legal_moves_with_successors(position)? {
        if depth > 1 {
            total.merge(perft(generator, &next, depth - 1)?);
            continue;
        }

        let traits = classify_move(position, &mv)?;
        total.nodes += 1;
        total.captures += usize::from(traits.is_capture());
        total.en_passant += usize::from(traits.en_passant);
        total.castles += usize::from(traits.castling);
        total.promotions += usize::from(mv.promotion.is_some());

        if generator.in_check(&next)? {
            total.checks += 1;
            if generator.legal_moves_with_successors(&next)?.is_empty() {
                total.checkmates += 1;
            }
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::{perft, perft_nodes, PerftCounts};
    use crate::game_state::position::Position;
    use crate::move_generation::legal_move_generator::LegalMoveGenerator;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const ENDGAME: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

    #[test]
    fn perft_depth_zero_counts_single_node() {
        let counts = perft(&LegalMoveGenerator, &Position::starting(), 0).expect("perft should run");
        assert_eq!(
            counts,
            PerftCounts {
                nodes: 1,
                ..PerftCounts::default()
            }
        );
    }

    #[test]
    fn start_position_node_counts() {
        let start = Position::starting();
        assert_eq!(perft_nodes(&LegalMoveGenerator, &start, 1).expect("perft should run"), 20);
        assert_eq!(perft_nodes(&LegalMoveGenerator, &start, 2).expect("perft should run"), 400);

        let counts = perft(&LegalMoveGenerator, &start, 3).expect("perft should run");
        assert_eq!(counts.nodes, 8902);
        assert_eq!(counts.captures, 34);
        assert_eq!(counts.checks, 12);
        assert_eq!(counts.checkmates, 0);
    }

    #[test]
    fn kiwipete_exercises_castling_and_en_passant() {
        let position = Position::from_fen(KIWIPETE).expect("FEN should parse");

        let one = perft(&LegalMoveGenerator, &position, 1).expect("perft should run");
        assert_eq!(one.nodes, 48);
        assert_eq!(one.captures, 8);
        assert_eq!(one.castles, 2);

        let two = perft(&LegalMoveGenerator, &position, 2).expect("perft should run");
        assert_eq!(
            two,
            PerftCounts {
                nodes: 2039,
                captures: 351,
                en_passant: 1,
                castles: 91,
                promotions: 0,
                checks: 3,
                checkmates: 0,
            }
        );
    }

    #[test]
    fn sparse_endgame_counts() {
        let position = Position::from_fen(ENDGAME).expect("FEN should parse");
        assert_eq!(perft_nodes(&LegalMoveGenerator, &position, 1).expect("perft should run"), 14);
        assert_eq!(perft_nodes(&LegalMoveGenerator, &position, 2).expect("perft should run"), 191);

        let three = perft(&LegalMoveGenerator, &position, 3).expect("perft should run");
        assert_eq!(three.nodes, 2812);
        assert_eq!(three.captures, 209);
        assert_eq!(three.en_passant, 2);
        assert_eq!(three.checks, 267);
    }
}
