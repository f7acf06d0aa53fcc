//! Per-piece move and capture generation.

use super::action::Move;
use super::types::{Board, Coord, Piece, PieceKind};
use tracing::{instrument, trace};

/// The eight king directions as (row, col) deltas.
const DIRECTIONS: [(i8, i8); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Enumerates the moves of the piece standing on `from`.
///
/// Returns an empty list for an empty square. Trapped pieces are not
/// filtered here; the turn engine refuses to select them.
///
/// `last_flipped` is the square flipped on the previous turn; the piece
/// there cannot be jumped.
#[instrument(skip(board))]
pub fn moves_for(board: &Board, from: Coord, last_flipped: Option<Coord>) -> Vec<Move> {
    let Some(piece) = board.get(from) else {
        return Vec::new();
    };

    let moves = match piece.kind() {
        PieceKind::Governor => governor_moves(board, from, piece, last_flipped),
        PieceKind::Ambassador => ambassador_moves(board, from, piece, last_flipped),
        PieceKind::Emperor => emperor_moves(board, from, piece, last_flipped),
    };
    trace!(kind = %piece.kind(), count = moves.len(), "Generated moves");
    moves
}

/// True if the piece on `cell` may be jumped by `mover`.
fn is_target(board: &Board, cell: Coord, mover: &Piece, last_flipped: Option<Coord>) -> bool {
    if last_flipped == Some(cell) {
        return false;
    }
    board.get(cell).is_some_and(|p| p.owner() != mover.owner())
}

fn governor_moves(
    board: &Board,
    from: Coord,
    piece: Piece,
    last_flipped: Option<Coord>,
) -> Vec<Move> {
    let forward = piece.owner().forward();
    let mut moves = Vec::new();

    for dc in [-1, 0, 1] {
        if let Some(to) = from.offset(forward, dc)
            && to.is_playable()
            && board.is_empty(to)
        {
            moves.push(Move::Step { to });
        }
    }

    // Opening double step: both cells empty, never into the Sacrifice Zone.
    if !piece.has_moved() {
        for dc in [-1, 0, 1] {
            if let Some(mid) = from.offset(forward, dc)
                && let Some(to) = from.offset(2 * forward, 2 * dc)
                && to.is_playable()
                && board.is_empty(mid)
                && board.is_empty(to)
            {
                moves.push(Move::Step { to });
            }
        }
    }

    for dc in [-1, 1] {
        if let Some(jumped) = from.offset(forward, dc)
            && let Some(to) = from.offset(2 * forward, 2 * dc)
            && board.is_empty(to)
            && is_target(board, jumped, &piece, last_flipped)
        {
            moves.push(Move::Capture { to, jumped });
        }
    }

    moves
}

fn ambassador_moves(
    board: &Board,
    from: Coord,
    piece: Piece,
    last_flipped: Option<Coord>,
) -> Vec<Move> {
    let mut moves = Vec::new();

    for (dr, dc) in DIRECTIONS {
        // Slide across empty interior cells; `cursor` ends on the first cell that stops us.
        let mut cursor = from.offset(dr, dc);
        while let Some(cell) = cursor {
            if !cell.is_playable() || !board.is_empty(cell) {
                break;
            }
            moves.push(Move::Step { to: cell });
            cursor = cell.offset(dr, dc);
        }

        if let Some(jumped) = cursor
            && let Some(to) = jumped.offset(dr, dc)
            && board.is_empty(to)
            && is_target(board, jumped, &piece, last_flipped)
        {
            moves.push(Move::Capture { to, jumped });
        }
    }

    moves
}

fn emperor_moves(
    board: &Board,
    from: Coord,
    piece: Piece,
    last_flipped: Option<Coord>,
) -> Vec<Move> {
    let mut moves = Vec::new();

    for (dr, dc) in DIRECTIONS {
        let Some(adjacent) = from.offset(dr, dc) else {
            continue;
        };
        if adjacent.is_playable() && board.is_empty(adjacent) {
            moves.push(Move::Step { to: adjacent });
        }
        if let Some(to) = from.offset(2 * dr, 2 * dc)
            && board.is_empty(to)
            && is_target(board, adjacent, &piece, last_flipped)
        {
            moves.push(Move::Capture {
                to,
                jumped: adjacent,
            });
        }
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::dragon_face::Player;

    fn at(row: u8, col: u8) -> Coord {
        Coord::new(row, col).unwrap()
    }

    #[test]
    fn test_empty_square_has_no_moves() {
        let board = Board::new();
        assert!(moves_for(&board, at(5, 4), None).is_empty());
    }

    #[test]
    fn test_opening_position_governor_moves() {
        let board = Board::new();
        let moves = moves_for(&board, at(8, 1), None);
        let destinations: Vec<_> = moves.iter().map(|m| m.to()).collect();
        // (7,0) and (6,-1) lie outside the interior or the grid.
        assert_eq!(destinations, vec![at(7, 1), at(7, 2), at(6, 1), at(6, 3)]);
    }

    #[test]
    fn test_back_row_blocked_at_start() {
        let board = Board::new();
        assert!(moves_for(&board, at(9, 4), None).is_empty());
        // Ambassadors on the back row are hemmed in by their own Governors.
        assert!(moves_for(&board, at(9, 2), None).is_empty());
    }

    #[test]
    fn test_emperor_jump_lands_in_sacrifice_zone() {
        let mut board = Board::empty();
        board.set(at(2, 2), Some(Piece::emperor(Player::One)));
        board.set(at(1, 1), Some(Piece::ambassador(Player::Two)));
        let moves = moves_for(&board, at(2, 2), None);
        assert!(moves.contains(&Move::Capture {
            to: at(0, 0),
            jumped: at(1, 1),
        }));
    }
}
