//! Line-oriented terminal presentation adapter.
//!
//! Reads commands such as `8 4`, `8,4`, `reset` or `quit` and renders
//! [`GameSnapshot`]s as text.

use crate::games::dragon_face::{COLS, Coord, GameSnapshot, ROWS};
use crate::orchestrator::Input;
use crate::session::Seat;
use tracing::instrument;

/// Help text shown on unknown input.
pub const HELP: &str = "Commands: <row> <col> (e.g. `8 4`), `reset`, `quit`";

/// Parses one input line.
#[instrument]
pub fn parse_command(line: &str) -> Option<Input> {
    let line = line.trim().to_lowercase();
    match line.as_str() {
        "reset" | "r" => return Some(Input::Reset),
        "quit" | "exit" | "q" => return Some(Input::Quit),
        _ => {}
    }

    let mut parts = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let row = parts.next()?.parse().ok()?;
    let col = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Coord::new(row, col).map(Input::Click)
}

/// Renders the board with selection, destinations and rescue targets marked.
pub fn render_board(snapshot: &GameSnapshot) -> String {
    let mut out = String::from("    ");
    for col in 0..COLS {
        out.push_str(&format!(" {} ", col));
    }
    out.push('\n');

    for row in 0..ROWS as u8 {
        out.push_str(&format!("{:>3} ", row));
        for col in 0..COLS as u8 {
            let Some(at) = Coord::new(row, col) else {
                continue;
            };
            out.push_str(&render_cell(snapshot, at));
        }
        out.push('\n');
    }
    out
}

fn render_cell(snapshot: &GameSnapshot, at: Coord) -> String {
    let symbol = match snapshot.board().get(at) {
        Some(piece) => piece.symbol(),
        None if snapshot.destinations().contains(&at) => '*',
        None if at.is_playable() => '.',
        None => '~',
    };

    if snapshot.selected() == &Some(at) {
        format!("[{}]", symbol)
    } else if snapshot.rescue_targets().contains(&at) {
        format!("<{}>", symbol)
    } else if snapshot.last_flipped() == &Some(at) {
        format!("'{}'", symbol)
    } else {
        format!(" {} ", symbol)
    }
}

/// One-line status for the local seat.
pub fn render_status(snapshot: &GameSnapshot, seat: Seat) -> String {
    if let Some(winner) = snapshot.winner() {
        return format!("{} won!!! Type `reset` to play again.", winner);
    }

    let current = *snapshot.current_player();
    let whose = match seat {
        Seat::HotSeat => format!("{}'s turn", current),
        Seat::Single(local) if local == current => format!("{}'s turn (you)", current),
        Seat::Single(_) => format!("{}'s turn (waiting for opponent)", current),
    };

    let (one, two) = snapshot.piece_counts();
    let detail = if snapshot.pending_rescue().is_some() {
        " - choose a trapped Ambassador <A> to rescue".to_string()
    } else {
        String::new()
    };
    format!("{}{}  [P1: {} pieces, P2: {} pieces]", whose, detail, one, two)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::dragon_face::{Game, Player};

    #[test]
    fn test_parse_coordinates() {
        let expected = Some(Input::Click(Coord::new(8, 4).unwrap()));
        assert_eq!(parse_command("8 4"), expected);
        assert_eq!(parse_command(" 8,4 "), expected);
        assert_eq!(parse_command("8, 4"), expected);
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_command("reset"), Some(Input::Reset));
        assert_eq!(parse_command("QUIT"), Some(Input::Quit));
        assert_eq!(parse_command("exit"), Some(Input::Quit));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("11 0"), None);
        assert_eq!(parse_command("1 2 3"), None);
        assert_eq!(parse_command("a b"), None);
        assert_eq!(parse_command("-1 4"), None);
    }

    #[test]
    fn test_render_marks_selection_and_destinations() {
        let mut game = Game::new();
        game.handle_click(Coord::new(8, 4).unwrap());
        let text = render_board(&game.snapshot());

        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), ROWS + 1);
        assert!(rows[9].contains("[G]"));
        assert!(rows[8].contains(" * "));
        assert!(rows[2].contains(" e "));
        assert!(rows[1].starts_with("  0  ~ "));
    }

    #[test]
    fn test_status_names_whose_turn() {
        let snapshot = Game::new().snapshot();
        let status = render_status(&snapshot, Seat::Single(Player::Two));
        assert!(status.starts_with("Player 1's turn (waiting for opponent)"));
        assert!(status.contains("P1: 14 pieces"));
    }
}
