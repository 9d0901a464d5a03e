//! Classic session tests - locking, clearing, pacing and game over

use nemein::core::{ClassicSession, SessionConfig, SessionPhase, Snapshot};
use nemein::types::{Command, PieceKind, Rotation, Variant, QUEUE_LOOKAHEAD};

fn session_with(kind: PieceKind, width: usize, height: usize) -> ClassicSession {
    ClassicSession::new(SessionConfig::new(width, height).with_piece_override(kind))
}

fn drive(session: &mut ClassicSession, commands: &[Command]) -> Snapshot {
    let mut last = session.snapshot();
    for &command in commands {
        last = session.apply_command(command).unwrap();
    }
    last
}

// ============== Locking and Clearing ==============

#[test]
fn test_horizontal_bar_clears_bottom_row() {
    let mut session = session_with(PieceKind::I, 4, 6);
    let first = drive(&mut session, &[Command::TickDown]);
    assert_eq!(first.board_codes()[0], vec![2, 2, 2, 2]);
    assert_eq!(first.session().ghost_y, 5);

    let snap = drive(&mut session, &[Command::HardDrop]);
    let board = snap.board_codes();
    assert_eq!(board[0], vec![0, 0, 0, 0]);
    assert_eq!(board[1], vec![2, 2, 2, 2]);
    for row in &board[2..5] {
        assert!(row.iter().all(|&c| c == 0));
    }
    assert_eq!(board[5], vec![9, 9, 9, 9]);

    let progress = session.progress();
    assert_eq!(progress.lines, 1);
    assert_eq!(progress.score, 1);
    assert_eq!(progress.tetromino_count, 1);
    assert_eq!(snap.tick_interval_ms(), 940);
}

#[test]
fn test_tenth_piece_raises_level_and_speed() {
    let mut session = session_with(PieceKind::I, 4, 6);
    drive(&mut session, &[Command::TickDown]);
    let mut snap = session.snapshot();
    for _ in 0..10 {
        snap = drive(&mut session, &[Command::HardDrop]);
    }
    assert_eq!(snap.session().level, 2);
    assert_eq!(snap.session().lines, 10);
    // Nine clears at level 1, the tenth at level 2.
    assert_eq!(snap.session().score, 11);
    assert_eq!(snap.tick_interval_ms(), 880);
    assert!(!snap.game_over());
}

#[test]
fn test_fresh_session_ticks_at_default_interval() {
    let mut session = ClassicSession::new(SessionConfig::default());
    let snap = drive(&mut session, &[Command::TickDown, Command::TickDown]);
    assert_eq!(snap.tick_interval_ms(), 1000);
    assert_eq!(snap.variant(), Variant::Classic);
    assert_eq!(snap.board_codes().len(), 20);
    assert!(snap.board_codes().iter().all(|row| row.len() == 10));
}

#[test]
fn test_stacking_squares_tops_out() {
    let mut session = session_with(PieceKind::O, 4, 4);
    drive(&mut session, &[Command::TickDown]);

    let snap = drive(&mut session, &[Command::HardDrop]);
    assert!(!snap.game_over());
    assert_eq!(session.phase(), SessionPhase::LockDelayArmed);
    assert_eq!(snap.board_codes()[3], vec![0, 1, 1, 0]);

    let snap = drive(&mut session, &[Command::HardDrop]);
    assert!(snap.game_over());
    assert_eq!(session.progress().tetromino_count, 2);
    assert_eq!(snap.board_codes()[0], vec![0, 1, 1, 0]);

    // Nothing moves once the game is over.
    let frozen = drive(&mut session, &[Command::MoveLeft, Command::Hold, Command::TickDown]);
    assert_eq!(frozen.board_codes(), snap.board_codes());
    assert_eq!(session.progress().tetromino_count, 2);
}

// ============== Queue and Hold ==============

#[test]
fn test_queue_keeps_lookahead_after_locks() {
    let mut session = ClassicSession::new(SessionConfig::new(10, 20).with_seed(11));
    drive(&mut session, &[Command::TickDown]);
    let expected_next = session.snapshot().session().queue[0];

    let snap = drive(&mut session, &[Command::HardDrop]);
    assert_eq!(snap.session().queue.len(), QUEUE_LOOKAHEAD);
    assert_eq!(snap.session().active.kind, expected_next);
    assert_eq!(snap.session().active.rotation, Rotation::O);
}

#[test]
fn test_held_piece_returns_in_spawn_rotation() {
    let mut session = ClassicSession::new(SessionConfig::new(10, 20).with_seed(5));
    drive(&mut session, &[Command::TickDown]);
    let first = session.active().kind;

    drive(&mut session, &[Command::Hold, Command::HardDrop]);
    drive(&mut session, &[Command::RotateCw]);
    let snap = drive(&mut session, &[Command::Hold]);
    assert_eq!(snap.session().active.kind, first);
    assert_eq!(snap.session().active.rotation, Rotation::O);
    assert_eq!(session.position(), (4, 0));
}

// ============== Determinism ==============

#[test]
fn test_same_seed_same_game() {
    let script = [
        Command::TickDown,
        Command::MoveLeft,
        Command::RotateCw,
        Command::HardDrop,
        Command::MoveRight,
        Command::MoveRight,
        Command::HardDrop,
        Command::Hold,
        Command::SoftDrop,
        Command::HardDrop,
    ];
    let mut a = ClassicSession::new(SessionConfig::default().with_seed(2024));
    let mut b = ClassicSession::new(SessionConfig::default().with_seed(2024));
    assert_eq!(drive(&mut a, &script), drive(&mut b, &script));
}

#[test]
fn test_symbols_match_commands() {
    let mut by_symbol = session_with(PieceKind::L, 10, 20);
    let mut by_command = session_with(PieceKind::L, 10, 20);
    for (symbol, command) in [
        ("tickDown", Command::TickDown),
        ("rotateCcw", Command::RotateCcw),
        ("moveLeft", Command::MoveLeft),
        ("softDrop", Command::SoftDrop),
        ("hardDrop", Command::HardDrop),
    ] {
        let a = by_symbol.apply_symbol(symbol).unwrap();
        let b = by_command.apply_command(command).unwrap();
        assert_eq!(a, b, "{symbol}");
    }
}

// ============== Serialization ==============

#[test]
fn test_snapshot_json_shape() {
    let mut session = session_with(PieceKind::T, 6, 10);
    let snap = drive(&mut session, &[Command::TickDown, Command::TickDown]);
    let json = serde_json::to_value(&snap).unwrap();

    assert_eq!(json["variant"], "classic");
    assert_eq!(json["active"]["kind"], "t");
    assert_eq!(json["active"]["rotation"], "O");
    assert_eq!(json["active"]["y"], 1);
    assert_eq!(json["ghostY"], 9);
    assert_eq!(json["canHold"], true);
    assert_eq!(json["tickIntervalMs"], 1000);
    assert_eq!(json["board"][1], serde_json::json!([0, 3, 3, 3, 0, 0]));
    assert!(json["held"].is_null());
}
