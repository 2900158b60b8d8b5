//! Save and resume lifecycle tests.
//!
//! Covers: snapshot preconditions, seat capture, duration rounding,
//! the Loading-state guard, and resume constraints.

use chrono::{DateTime, Duration, TimeZone, Utc};
use tablesave_core::{
    constraint::{Constraint, SeatRequirement},
    error::PersistError,
    game::{Game, GameOptions, GameView, LiveGame, Player},
    game_state::GameState,
    saved_game::{SaveConfig, SavedGameData, SavedGameModel},
    types::CURRENT_MODEL_VERSION,
};

fn now() -> DateTime<Utc> {
    let _ = env_logger::builder().is_test(true).try_init();
    Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
}

/// 4 seats: Alice (12 VP, human), vacant, Bot7 (5 VP, built-in robot), Carol (8 VP, human).
fn example_game(state: GameState, duration_secs: i64) -> Game {
    let mut game = Game::new("game1", 4, now() - Duration::seconds(duration_secs));
    game.sit_down(0, Player::human("Alice", 12));
    game.sit_down(2, Player::built_in_robot("Bot7", 5));
    game.sit_down(3, Player::human("Carol", 8));
    game.set_client_version_min(2000);
    let mut opts = GameOptions::new();
    opts.set("PL", "4");
    opts.set("VP", "t12");
    game.set_options(Some(opts));
    game.set_game_state(state);
    game
}

fn saved(state: GameState) -> SavedGameData {
    SavedGameModel::from_game_at(&example_game(state, 125), &SaveConfig::default(), now())
        .expect("snapshot")
        .data()
        .clone()
}

struct Reject(&'static str);

impl Constraint for Reject {
    fn id(&self) -> String { self.0.to_string() }
    fn evaluate(&self, _: &SavedGameData, _: &dyn GameView) -> bool { false }
}

struct Accept;

impl Constraint for Accept {
    fn id(&self) -> String { "accept".to_string() }
    fn evaluate(&self, _: &SavedGameData, _: &dyn GameView) -> bool { true }
}

// ── Save path ──────────────────────────────────────────────

#[test]
fn example_game_snapshot_fields() {
    let game = example_game(GameState::RollOrCard, 125);
    let model = SavedGameModel::from_game_at(&game, &SaveConfig::default(), now()).unwrap();
    let data = model.data();

    assert_eq!(data.model_version, CURRENT_MODEL_VERSION);
    assert_eq!(data.game_version, 2000);
    assert_eq!(data.game_name, "game1");
    assert_eq!(data.game_options.as_deref(), Some("PL=4,VP=t12"));
    assert_eq!(data.game_duration_seconds, 125);
    assert_eq!(data.game_state, GameState::RollOrCard);

    assert_eq!(data.player_seats.len(), 4);
    assert!(!data.player_seats[0].is_seat_vacant);
    assert_eq!(data.player_seats[0].name, "Alice");
    assert_eq!(data.player_seats[0].total_vp, 12);
    assert!(!data.player_seats[0].is_robot);
    assert!(data.player_seats[1].is_seat_vacant);
    assert!(data.player_seats[2].is_robot);
    assert!(data.player_seats[2].is_built_in_robot);
    assert_eq!(data.player_seats[3].total_vp, 8);
}

#[test]
fn snapshot_leaves_live_game_untouched() {
    let game = example_game(GameState::Play1, 60);
    let before = game.clone();
    let model = SavedGameModel::from_game_at(&game, &SaveConfig::default(), now()).unwrap();

    assert_eq!(game, before);
    let saved_from = model.game().expect("saved game is retrievable");
    assert_eq!(saved_from.name(), "game1");
}

#[test]
fn seat_count_and_vacancy_follow_the_game() {
    for max_players in [2usize, 4, 6] {
        let mut game = Game::new("g", max_players, now());
        for pn in (0..max_players).step_by(2) {
            game.sit_down(pn, Player::human(format!("p{pn}"), 0));
        }
        game.set_game_state(GameState::Play1);

        let data = SavedGameData::capture(&game, &SaveConfig::default(), now()).unwrap();
        assert_eq!(data.player_seats.len(), max_players);
        for (pn, seat) in data.player_seats.iter().enumerate() {
            assert_eq!(seat.is_seat_vacant, game.is_seat_vacant(pn), "seat {pn}");
        }
    }
}

#[test]
fn snapshot_during_setup_fails() {
    for state in [
        GameState::New,
        GameState::Ready,
        GameState::Loading,
        GameState::Start1A,
        GameState::Start3B,
    ] {
        let game = example_game(state, 10);
        let err = SavedGameModel::from_game_at(&game, &SaveConfig::default(), now()).unwrap_err();
        assert!(
            matches!(
                err,
                PersistError::InvalidState { required: GameState::RollOrCard, actual } if actual == state
            ),
            "state {state:?}: got {err}"
        );
    }
}

#[test]
fn snapshot_of_finished_game_is_allowed() {
    assert_eq!(saved(GameState::Over).game_state, GameState::Over);
}

#[test]
fn model_version_comes_from_config() {
    let config = SaveConfig { model_version: 2401 };
    let game = example_game(GameState::Play1, 5);
    let model = SavedGameModel::from_game_at(&game, &config, now()).unwrap();
    assert_eq!(model.data().model_version, 2401);
}

#[test]
fn duration_round_trips_whole_seconds() {
    for d in [0i64, 1, 59, 125, 3600, 86_400] {
        let game = example_game(GameState::Play1, d);
        let data = SavedGameData::capture(&game, &SaveConfig::default(), now()).unwrap();
        assert_eq!(i64::from(data.game_duration_seconds), d);
    }
}

#[test]
fn duration_half_second_rounds_up() {
    let capture_after = |elapsed_ms: i64| {
        let mut game = Game::new("game1", 4, now() - Duration::milliseconds(elapsed_ms));
        game.set_game_state(GameState::Play1);
        SavedGameData::capture(&game, &SaveConfig::default(), now())
            .unwrap()
            .game_duration_seconds
    };
    assert_eq!(capture_after(2_499), 2);
    assert_eq!(capture_after(2_500), 3);
    assert_eq!(capture_after(125_400), 125);
}

// ── Load path ──────────────────────────────────────────────

#[test]
fn loading_game_mirrors_saved_record() {
    let data = saved(GameState::PlacingRobber);
    let game = data.create_loading_game(now()).unwrap();

    assert_eq!(game.game_state(), GameState::Loading);
    assert_eq!(game.name(), "game1");
    assert_eq!(game.max_players(), 4);
    assert_eq!(game.client_version_min_required(), 2000);
    assert!(game.is_seat_vacant(1));
    assert_eq!(game.player(2).name, "Bot7");
    assert!(game.player(2).is_built_in_robot);
    assert_eq!(game.game_options().and_then(|o| o.get("VP")), Some("t12"));
    assert_eq!(now() - game.start_time(), Duration::seconds(125));
}

#[test]
fn resume_restores_saved_state() {
    let data = saved(GameState::WaitingForDiscards);
    let mut model = SavedGameModel::load_new(data, now()).unwrap();
    assert_eq!(model.game().unwrap().game_state(), GameState::Loading);

    let game = model.resume_play(false).unwrap();
    assert_eq!(game.game_state(), GameState::WaitingForDiscards);
    assert_eq!(model.game().unwrap().game_state(), GameState::WaitingForDiscards);
}

#[test]
fn resume_outside_loading_fails_and_leaves_state() {
    let data = saved(GameState::Play1);
    let mut game = data.create_loading_game(now()).unwrap();
    game.set_game_state(GameState::PlacingCity);
    let mut model = SavedGameModel::load(data, game).unwrap();

    let err = model.resume_play(true).unwrap_err();
    assert!(matches!(err, PersistError::UnsupportedOperation { state: GameState::PlacingCity }));
    assert_eq!(model.game().unwrap().game_state(), GameState::PlacingCity);
}

#[test]
fn second_resume_is_refused() {
    let mut model = SavedGameModel::load_new(saved(GameState::Play1), now()).unwrap();
    model.resume_play(false).unwrap();

    let err = model.resume_play(false).unwrap_err();
    assert!(matches!(err, PersistError::UnsupportedOperation { state: GameState::Play1 }));
}

#[test]
fn resume_without_game_fails() {
    let mut model: SavedGameModel<Game> = SavedGameModel::from_data(saved(GameState::Play1));
    assert!(matches!(model.resume_play(true), Err(PersistError::NoGameAttached)));
}

#[test]
fn attach_rejects_seat_count_mismatch() {
    let data = saved(GameState::Play1);
    let mut game = Game::new("game1", 6, now());
    game.set_game_state(GameState::Loading);

    let err = SavedGameModel::load(data, game).unwrap_err();
    assert!(matches!(err, PersistError::SeatCountMismatch { expected: 6, actual: 4 }));
}

#[test]
fn record_in_loading_or_setup_state_cannot_be_loaded() {
    for state in [GameState::New, GameState::Loading, GameState::Start1A] {
        let mut data = saved(GameState::Play1);
        data.game_state = state;

        let err = SavedGameModel::load_new(data, now()).unwrap_err();
        assert!(
            matches!(
                err,
                PersistError::InvalidState { required: GameState::RollOrCard, actual } if actual == state
            ),
            "state {state:?}: got {err}"
        );
    }
}

#[test]
fn loading_state_file_is_refused_before_resume() {
    let mut data = saved(GameState::Play1);
    data.game_state = GameState::Loading;
    let json = tablesave_core::codec::to_json(&data).unwrap();

    let err = tablesave_core::codec::from_json(&json, CURRENT_MODEL_VERSION).unwrap_err();
    assert!(matches!(err, PersistError::InvalidState { actual: GameState::Loading, .. }));
}

#[test]
fn attach_twice_is_refused() {
    let data = saved(GameState::Play1);
    let mut model = SavedGameModel::load_new(data.clone(), now()).unwrap();
    let second = data.create_loading_game(now()).unwrap();
    assert!(matches!(model.attach(second), Err(PersistError::InvalidArgument(_))));
}

#[test]
fn resume_through_borrowed_game() {
    let data = saved(GameState::Play1);
    let mut game = data.create_loading_game(now()).unwrap();
    {
        let mut model = SavedGameModel::load(data, &mut game).unwrap();
        model.resume_play(false).unwrap();
    }
    assert_eq!(game.game_state(), GameState::Play1);
}

// ── Constraints ────────────────────────────────────────────

#[test]
fn failing_constraint_blocks_resume() {
    let mut model = SavedGameModel::load_new(saved(GameState::Play1), now()).unwrap();
    model.register_constraint(Box::new(Accept));
    model.register_constraint(Box::new(Reject("seat 3 must be a fast robot")));

    let err = model.resume_play(false).unwrap_err();
    match err {
        PersistError::ConstraintViolation { constraint } => {
            assert_eq!(constraint, "seat 3 must be a fast robot");
        }
        other => panic!("expected ConstraintViolation, got {other}"),
    }
    assert_eq!(model.game().unwrap().game_state(), GameState::Loading);
}

#[test]
fn ignore_constraints_skips_evaluation() {
    let mut model = SavedGameModel::load_new(saved(GameState::Play1), now()).unwrap();
    model.register_constraint(Box::new(Reject("never")));

    let game = model.resume_play(true).unwrap();
    assert_eq!(game.game_state(), GameState::Play1);
}

#[test]
fn passing_constraints_allow_resume() {
    let mut model = SavedGameModel::load_new(saved(GameState::Play1), now()).unwrap();
    model.register_constraint(Box::new(Accept));
    model.register_constraint(Box::new(SeatRequirement::BuiltInRobot(2)));
    model.register_constraint(Box::new(SeatRequirement::Vacant(1)));
    model.register_constraint(Box::new(SeatRequirement::Human(0)));
    assert_eq!(model.constraints().len(), 4);

    assert!(model.resume_play(false).is_ok());
}

#[test]
fn seat_requirement_reports_its_identity() {
    let mut model = SavedGameModel::load_new(saved(GameState::Play1), now()).unwrap();
    model.register_constraint(Box::new(SeatRequirement::ThirdPartyRobot(2)));

    let err = model.resume_play(false).unwrap_err();
    assert!(matches!(
        err,
        PersistError::ConstraintViolation { ref constraint }
            if constraint == "seat 2 must be a third-party robot"
    ));
}

#[test]
fn seat_requirement_out_of_range_fails() {
    let mut model = SavedGameModel::load_new(saved(GameState::Play1), now()).unwrap();
    model.register_constraint(Box::new(SeatRequirement::Human(9)));
    assert!(matches!(
        model.resume_play(false),
        Err(PersistError::ConstraintViolation { .. })
    ));
}
