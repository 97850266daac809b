use cuatro_engine::cards::{Card, CardColor, CardKind, PLUS_FOUR};
use cuatro_engine::engine::Engine;
use cuatro_engine::errors::GameError;
use cuatro_engine::game::{Action, Game, GameConfig, Player};

fn table(usernames: &[&str], ref_card: u8) -> Game {
    let max_players = usernames.len() as u8;
    Game {
        creator: usernames[0].to_string(),
        config: GameConfig::new(5, max_players).unwrap(),
        key: format!("0.0-{}", usernames[0]),
        creation: 0.0,
        players: usernames
            .iter()
            .map(|u| Player::new(*u, Vec::new()))
            .collect(),
        ref_card,
        current: Some(usernames[0].to_string()),
        clockwise: true,
        filled: true,
    }
}

fn number(color: CardColor, n: u8) -> u8 {
    Card::new(CardKind::Number, color, n).encode()
}

#[test]
fn clockwise_turn_advance_wraps_modulo_roster() {
    let game = table(&["a", "b", "c", "d"], 0);
    assert_eq!(game.next_index(0), 1);
    assert_eq!(game.next_index(3), 0);
}

#[test]
fn counter_clockwise_turn_advance_wraps_from_the_first_seat() {
    let mut game = table(&["a", "b", "c", "d"], 0);
    game.clockwise = false;
    assert_eq!(game.next_index(2), 1);
    assert_eq!(game.next_index(1), 0);
    // seat 0 steps back to the end of the roster
    assert_eq!(game.next_index(0), 3);
}

#[test]
fn placing_out_of_turn_is_rejected() {
    let mut game = table(&["alice", "bob"], number(CardColor::Red, 1));
    let card = number(CardColor::Red, 2);
    game.players[1].cards.push(card);

    assert_eq!(game.place(1, card), Err(GameError::NotTurn));
    assert_eq!(game.players[1].cards.len(), 1);
}

#[test]
fn placing_an_illegal_card_is_rejected_before_ownership() {
    let mut game = table(&["alice", "bob"], number(CardColor::Red, 1));
    // green 2 matches neither color nor number; not even in the hand
    let card = number(CardColor::Green, 2);

    assert_eq!(game.place(0, card), Err(GameError::CardMismatch));
}

#[test]
fn placing_a_card_the_player_does_not_own_is_rejected() {
    let mut game = table(&["alice", "bob"], number(CardColor::Red, 1));
    let card = number(CardColor::Red, 2);

    assert_eq!(game.place(0, card), Err(GameError::PlayerNoCard));
}

#[test]
fn placing_a_number_card_passes_the_turn() {
    let mut game = table(&["alice", "bob"], number(CardColor::Red, 1));
    let card = number(CardColor::Red, 2);
    game.players[0].cards.push(card);

    game.place(0, card).unwrap();

    assert!(game.players[0].cards.is_empty());
    assert_eq!(game.ref_card, card);
    assert_eq!(game.current.as_deref(), Some("bob"));
    assert!(game.clockwise);
}

#[test]
fn plus_two_charges_the_next_player() {
    let mut game = table(&["alice", "bob", "carol"], number(CardColor::Blue, 4));
    let card = Card::new(CardKind::PlusTwo, CardColor::Blue, 0).encode();
    game.players[0].cards.push(card);

    game.place(0, card).unwrap();

    assert_eq!(game.players[1].debt, 2);
    assert_eq!(game.current.as_deref(), Some("bob"));
    assert_eq!(game.ref_card, card);
}

#[test]
fn plus_four_is_matched_against_its_canonical_encoding() {
    let mut game = table(&["alice", "bob"], number(CardColor::Red, 1));
    // the submitted byte may carry junk color/number bits
    let submitted = PLUS_FOUR | 0b01_0011;
    game.players[0].cards.push(PLUS_FOUR);

    game.place(0, submitted).unwrap();

    assert!(game.players[0].cards.is_empty());
    assert_eq!(game.players[1].debt, 4);
    // the submitted byte, not the canonical one, becomes the reference
    assert_eq!(game.ref_card, submitted);
    assert_eq!(game.current.as_deref(), Some("bob"));
}

#[test]
fn plus_four_without_the_canonical_card_is_rejected() {
    let mut game = table(&["alice", "bob"], number(CardColor::Red, 1));
    game.players[0].cards.push(number(CardColor::Red, 7));

    assert_eq!(game.place(0, PLUS_FOUR), Err(GameError::PlayerNoCard));
    assert_eq!(game.players[1].debt, 0);
}

#[test]
fn reverse_with_two_players_keeps_the_turn() {
    let mut game = table(&["alice", "bob"], number(CardColor::Red, 1));
    let card = Card::new(CardKind::Reverse, CardColor::Red, 0).encode();
    game.players[0].cards.push(card);

    game.place(0, card).unwrap();

    assert!(!game.clockwise);
    assert_eq!(game.current.as_deref(), Some("alice"));
    assert_eq!(game.ref_card, card);
}

#[test]
fn reverse_with_more_players_advances_under_the_new_direction() {
    let mut game = table(&["alice", "bob", "carol", "dave"], number(CardColor::Red, 1));
    let card = Card::new(CardKind::Reverse, CardColor::Red, 0).encode();
    game.players[0].cards.push(card);

    game.place(0, card).unwrap();

    assert!(!game.clockwise);
    // counter-clockwise from seat 0 lands on the last seat
    assert_eq!(game.current.as_deref(), Some("dave"));
}

#[test]
fn settle_debt_clears_debt_and_draws_that_many_cards() {
    let mut game = table(&["alice", "bob"], number(CardColor::Red, 1));
    game.current = Some("bob".to_string());
    game.players[0].debt = 5;

    let mut engine = Engine::load(game, Some(21));
    engine
        .dispatch(&Action::SettleDebt {
            username: "alice".to_string(),
        })
        .unwrap();

    let game = engine.game();
    assert_eq!(game.players[0].debt, 0);
    assert_eq!(game.players[0].cards.len(), 5);
    // settle-debt is turn-free and never moves the turn
    assert_eq!(game.current.as_deref(), Some("bob"));
}

#[test]
fn settle_debt_with_no_debt_is_a_no_op() {
    let game = table(&["alice", "bob"], number(CardColor::Red, 1));
    let mut engine = Engine::load(game, Some(22));
    engine
        .dispatch(&Action::SettleDebt {
            username: "alice".to_string(),
        })
        .unwrap();

    assert!(engine.game().players[0].cards.is_empty());
    assert_eq!(engine.game().players[0].debt, 0);
}

#[test]
fn draw_is_a_free_action_for_any_player() {
    let mut game = table(&["alice", "bob"], number(CardColor::Red, 1));
    game.current = Some("bob".to_string());

    let mut engine = Engine::load(game, Some(23));
    engine
        .dispatch(&Action::Draw {
            username: "alice".to_string(),
        })
        .unwrap();

    let game = engine.game();
    assert_eq!(game.players[0].cards.len(), 1);
    assert_eq!(game.current.as_deref(), Some("bob"));
}

#[test]
fn dispatch_for_an_unknown_player_fails() {
    let game = table(&["alice", "bob"], number(CardColor::Red, 1));
    let mut engine = Engine::load(game, Some(24));

    let err = engine
        .dispatch(&Action::Draw {
            username: "mallory".to_string(),
        })
        .unwrap_err();
    assert_eq!(err, GameError::UnknownPlayer("mallory".to_string()));
}

#[test]
fn full_game_from_creation_to_first_placement() {
    let config = GameConfig::new(2, 2).unwrap();
    let mut engine = Engine::create("alice", config, Some(2024)).unwrap();

    engine.join("bob").unwrap();
    assert!(engine.game().filled);
    assert_eq!(engine.game().current.as_deref(), Some("alice"));

    // hand alice a card whose color matches the reference card
    let reference = Card::decode(engine.game().ref_card);
    let play = Card::new(CardKind::Number, reference.color, 9).encode();
    engine.game_mut().players[0].cards.push(play);

    engine
        .dispatch(&Action::Place {
            username: "alice".to_string(),
            card: play,
        })
        .unwrap();

    let game = engine.game();
    assert_eq!(game.ref_card, play);
    assert_eq!(game.current.as_deref(), Some("bob"));
}
