// ═══════════════════════════════════════════════════════════════════════
// Test suite for the Warwick engine
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::{self, find_card, twin, CATALOG, DECK_SIZE};
use crate::engine::{
    advance, apply_action, attack_options, build_candidates, discard_slots, seize, Action,
    BuildOrder,
};
use crate::hand::DrawPool;
use crate::invariants::check_invariants;
use crate::setup::{create_initial_state, create_state_with_stock};
use crate::tableau::{BlockReason, Buildability};
use crate::types::*;

// ── Helpers ────────────────────────────────────────────────────────────

/// Stock with the named cards on top (in order), then every other
/// instance in id order. Opening hands take the first five each.
fn stock_with_front(names: &[&str]) -> DrawPool {
    let mut front = Vec::new();
    for name in names {
        let first = find_card(name).unwrap_or_else(|| panic!("no card named {name}"));
        let id = if front.contains(&first) { twin(first) } else { first };
        assert!(!front.contains(&id), "more than two {name}");
        front.push(id);
    }
    let rest = cards::all_card_ids().into_iter().filter(|c| !front.contains(c));
    DrawPool::new(front.iter().copied().chain(rest).collect())
}

fn state_with(p0: [&str; 5], p1: [&str; 5], config: GameConfig) -> GameState {
    let names: Vec<&str> = p0.iter().chain(p1.iter()).copied().collect();
    create_state_with_stock(config, stock_with_front(&names))
}

fn hand_pos(state: &GameState, seat: Seat, name: &str) -> usize {
    state.player(seat).hand.iter()
        .find(|(_, c)| c.def().name == name)
        .map(|(pos, _)| pos)
        .unwrap_or_else(|| panic!("{name} not in hand"))
}

/// Move a named card from hand straight onto the tableau (test setup).
fn lay(state: &mut GameState, seat: Seat, name: &str) {
    let pos = hand_pos(state, seat, name);
    let player = state.player_mut(seat);
    let id = player.hand.remove_at(pos).unwrap();
    let upgrade = player.tableau.has(id.def().kind);
    player.tableau.place(id, upgrade).unwrap();
}

/// Deterministic driver: first legal option everywhere.
fn first_legal(state: &GameState, redraw: bool) -> Action {
    match state.pending.as_ref().expect("pending decision") {
        PendingDecision::Build { seat, candidates, .. } => {
            let pick = candidates.iter().find(|c| c.verdict.is_legal()).unwrap();
            let player = state.player(*seat);
            let discards = discard_slots(player, pick.slot)
                .into_iter()
                .take(pick.verdict.discard_count())
                .collect();
            Action::Build(Some(BuildOrder { slot: pick.slot, discards }))
        }
        PendingDecision::Redraw { .. } => Action::Redraw(redraw),
        PendingDecision::StorageFill { options, .. } => Action::StorageFill(options.first().copied()),
        PendingDecision::Attack { targets, .. } => Action::Attack(targets.first().copied()),
        PendingDecision::Trash { seat, .. } => {
            Action::Trash(state.player(*seat).hand.iter().next().map(|(pos, _)| pos))
        }
        PendingDecision::DiscardDraw { .. } => Action::DiscardDraw(true),
        PendingDecision::DiscardToLimit { seat, .. } => {
            Action::Discard(state.player(*seat).hand.iter().next().unwrap().0)
        }
    }
}

fn play_out(state: &mut GameState, redraw: bool) {
    advance(state);
    let mut steps = 0;
    while !state.is_over() {
        steps += 1;
        assert!(steps < 10_000, "game did not finish");
        let action = first_legal(state, redraw);
        apply_action(state, action).unwrap();
    }
}

// ═════════════════════════════════════════════════════════════════════
// CATALOG
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_catalog_shape() {
    assert_eq!(CATALOG.len(), 40);
    assert_eq!(DECK_SIZE, 80);
    for kind in Kind::ALL {
        let mut costs: Vec<u8> = CATALOG.iter().filter(|c| c.kind == kind).map(|c| c.cost).collect();
        costs.sort_unstable();
        assert_eq!(costs, vec![1, 2, 3, 4], "{kind} levels");
    }
}

#[test]
fn test_card_instances_have_two_copies() {
    let fowlery = find_card("Fowlery").unwrap();
    assert_eq!(fowlery.copy_index(), 0);
    assert_eq!(twin(fowlery).copy_index(), 1);
    assert_eq!(twin(fowlery).def(), fowlery.def());
    assert_eq!(twin(twin(fowlery)), fowlery);
}

#[test]
fn test_catalog_bonuses() {
    let faire = find_card("Faire").unwrap().def();
    assert_eq!((faire.draw_from_discard_power, faire.trash_bonus, faire.draw_bonus), (1, 1, 2));
    assert_eq!(faire.victory_points, 1);
    let wizard = find_card("Wizard").unwrap().def();
    assert_eq!((wizard.build_bonus, wizard.attack_bonus), (2, 2));
    let gold = find_card("Gold stream").unwrap().def();
    assert_eq!(gold.cost_modifier, [-1, -1, -1, 0]);
}

#[test]
fn test_phase_thresholds() {
    assert_eq!(Phase::from_round(1), Phase::Early);
    assert_eq!(Phase::from_round(3), Phase::Early);
    assert_eq!(Phase::from_round(4), Phase::Mid);
    assert_eq!(Phase::from_round(6), Phase::Mid);
    assert_eq!(Phase::from_round(7), Phase::Late);
    assert_eq!(Phase::from_round(29), Phase::Late);
}

#[test]
fn test_config_from_partial_json() {
    let config = GameConfig::from_json(r#"{ "seed": 7, "round_cap": 12 }"#).unwrap();
    assert_eq!(config.seed, 7);
    assert_eq!(config.round_cap, 12);
    assert_eq!(config.hand_limit, 5);
    assert_eq!(config.fill_target, 9);
}

// ═════════════════════════════════════════════════════════════════════
// SETUP
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_initial_deal() {
    let state = create_initial_state(GameConfig { seed: 42, ..GameConfig::default() });
    assert_eq!(state.player(Seat::First).hand.count(), 5);
    assert_eq!(state.player(Seat::Second).hand.count(), 5);
    assert_eq!(state.stock.remaining(), DECK_SIZE - 10);
    assert!(check_invariants(&state).is_empty());
}

#[test]
fn test_shuffle_is_seeded() {
    let a = create_initial_state(GameConfig { seed: 1, ..GameConfig::default() });
    let b = create_initial_state(GameConfig { seed: 1, ..GameConfig::default() });
    let c = create_initial_state(GameConfig { seed: 2, ..GameConfig::default() });
    assert_eq!(a.stock.undrawn(), b.stock.undrawn());
    assert_ne!(a.stock.undrawn(), c.stock.undrawn());
}

// ═════════════════════════════════════════════════════════════════════
// BUILD RESOLUTION
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_pig_farm_upgrades_fowlery_for_free() {
    let mut state = state_with(
        ["Fowlery", "Pig Farm", "Chapel", "Walls", "Tower"],
        ["Mine", "Quarry", "Bank", "Fort", "Keep"],
        GameConfig::default(),
    );
    lay(&mut state, Seat::First, "Fowlery");
    let candidates = build_candidates(state.player(Seat::First));
    let pig = candidates.iter().find(|c| c.card.def().name == "Pig Farm").unwrap();
    assert_eq!(pig.verdict, Buildability::Upgrade);
    assert!(pig.verdict.is_upgrade());
    assert_eq!(pig.verdict.discard_count(), 0);
}

#[test]
fn test_build_moves_cards_and_updates_tableau() {
    let mut state = state_with(
        ["Church", "Walls", "Tower", "Keep", "Castle"],
        ["Mine", "Quarry", "Bank", "Fort", "Chapel"],
        GameConfig::default(),
    );
    advance(&mut state);
    assert!(matches!(state.pending, Some(PendingDecision::Build { seat: Seat::First, .. })));

    let church = CardRef::Hand(hand_pos(&state, Seat::First, "Church"));
    let order = BuildOrder { slot: church, discards: vec![CardRef::Hand(1), CardRef::Hand(2)] };
    apply_action(&mut state, Action::Build(Some(order))).unwrap();

    let me = state.player(Seat::First);
    assert_eq!(me.tableau.top(Kind::Civic).map(|c| c.def().name), Some("Church"));
    assert_eq!(me.tableau.victory_points(), 2);
    assert_eq!(me.tableau.fill(), 1);
    assert_eq!(state.discard.len(), 2);
    assert!(check_invariants(&state).is_empty());
}

#[test]
fn test_build_rejects_wrong_payment() {
    let mut state = state_with(
        ["Church", "Walls", "Tower", "Keep", "Castle"],
        ["Mine", "Quarry", "Bank", "Fort", "Chapel"],
        GameConfig::default(),
    );
    advance(&mut state);
    let church = CardRef::Hand(hand_pos(&state, Seat::First, "Church"));

    let short = BuildOrder { slot: church, discards: vec![CardRef::Hand(1)] };
    assert!(apply_action(&mut state, Action::Build(Some(short))).is_err());
    // the decision is still open after a rejected answer
    assert!(matches!(state.pending, Some(PendingDecision::Build { .. })));

    let self_pay = BuildOrder { slot: church, discards: vec![church, CardRef::Hand(1)] };
    assert!(apply_action(&mut state, Action::Build(Some(self_pay))).is_err());

    let locked = BuildOrder { slot: church, discards: vec![CardRef::Storage(0), CardRef::Hand(1)] };
    assert_eq!(
        apply_action(&mut state, Action::Build(Some(locked))),
        Err(crate::EngineError::DisallowedSource(CardRef::Storage(0)))
    );
    assert!(check_invariants(&state).is_empty());
}

#[test]
fn test_wrong_action_kind_is_rejected() {
    let mut state = create_initial_state(GameConfig::default());
    assert_eq!(apply_action(&mut state, Action::Redraw(true)), Err(crate::EngineError::NoPendingDecision));
    advance(&mut state);
    if state.pending.is_some() {
        assert!(apply_action(&mut state, Action::Discard(0)).is_err());
    }
}

#[test]
fn test_storage_build_offers_fill() {
    let mut state = state_with(
        ["Storehouse", "Walls", "Tower", "Keep", "Castle"],
        ["Mine", "Quarry", "Bank", "Fort", "Chapel"],
        GameConfig::default(),
    );
    advance(&mut state);
    let slot = CardRef::Hand(hand_pos(&state, Seat::First, "Storehouse"));
    let discards = vec![CardRef::Hand(1), CardRef::Hand(2), CardRef::Hand(3)];
    apply_action(&mut state, Action::Build(Some(BuildOrder { slot, discards }))).unwrap();

    match &state.pending {
        Some(PendingDecision::StorageFill { slot: 0, options, .. }) => {
            assert!(options.contains(&StorageSource::Stock));
            assert!(options.contains(&StorageSource::DiscardTop));
        }
        other => panic!("expected storage fill, got {other:?}"),
    }
    apply_action(&mut state, Action::StorageFill(Some(StorageSource::DiscardTop))).unwrap();
    // Storehouse unlocks a second slot
    assert!(matches!(state.pending, Some(PendingDecision::StorageFill { slot: 1, .. })));
    apply_action(&mut state, Action::StorageFill(Some(StorageSource::Stock))).unwrap();

    let me = state.player(Seat::First);
    assert_eq!(me.tableau.storage.iter().flatten().count(), 2);
    assert!(check_invariants(&state).is_empty());
}

// ═════════════════════════════════════════════════════════════════════
// ATTACK
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_defensive_building_forces_the_target() {
    let mut state = state_with(
        ["Armory", "Town Watch", "Garrison", "Archers", "Chapel"],
        ["Tower", "Church", "Fowlery", "Mine", "Sawmill"],
        GameConfig::default(),
    );
    lay(&mut state, Seat::First, "Armory");
    lay(&mut state, Seat::First, "Town Watch");
    lay(&mut state, Seat::Second, "Tower");
    lay(&mut state, Seat::Second, "Fowlery");

    // level 1 soldier cannot take a level 2 tower, and may not go around it
    let options = attack_options(state.player(Seat::First), state.player(Seat::Second)).unwrap();
    assert!(options.defended);
    assert!(options.targets.is_empty());

    lay(&mut state, Seat::First, "Garrison");
    lay(&mut state, Seat::First, "Archers");
    let options = attack_options(state.player(Seat::First), state.player(Seat::Second)).unwrap();
    assert_eq!(options.targets, vec![Kind::Defensive]);
}

#[test]
fn test_open_tableau_offers_every_reachable_kind() {
    let mut state = state_with(
        ["Armory", "Town Watch", "Adept", "Novice", "Chapel"],
        ["Church", "Fowlery", "Mine", "Barrack", "Sawmill"],
        GameConfig::default(),
    );
    lay(&mut state, Seat::First, "Armory");
    lay(&mut state, Seat::First, "Town Watch");
    lay(&mut state, Seat::Second, "Church");
    lay(&mut state, Seat::Second, "Fowlery");
    lay(&mut state, Seat::Second, "Barrack");

    let options = attack_options(state.player(Seat::First), state.player(Seat::Second)).unwrap();
    assert_eq!(options.power, 1);
    assert_eq!(options.targets, vec![Kind::Farm]);

    // attack bonus from the school raises the reach
    lay(&mut state, Seat::First, "Novice");
    lay(&mut state, Seat::First, "Adept");
    let options = attack_options(state.player(Seat::First), state.player(Seat::Second)).unwrap();
    assert_eq!(options.power, 2);
    assert_eq!(options.targets, vec![Kind::Farm, Kind::Civic]);
}

#[test]
fn test_no_soldier_no_attack() {
    let state = create_initial_state(GameConfig::default());
    assert!(attack_options(state.player(Seat::First), state.player(Seat::Second)).is_none());
}

#[test]
fn test_seize_moves_building_and_trashes_soldier() {
    let mut state = state_with(
        ["Armory", "Town Watch", "Garrison", "Archers", "Chapel"],
        ["Church", "Fowlery", "Mine", "Quarry", "Sawmill"],
        GameConfig::default(),
    );
    lay(&mut state, Seat::First, "Armory");
    lay(&mut state, Seat::First, "Town Watch");
    lay(&mut state, Seat::Second, "Fowlery");

    let taken = seize(&mut state, Seat::First, Kind::Farm).unwrap();
    assert_eq!(taken.def().name, "Fowlery");
    assert!(state.player(Seat::First).hand.contains(taken));
    assert!(!state.player(Seat::First).tableau.has(Kind::Soldiers));
    assert_eq!(state.trash.top().map(|c| c.def().name), Some("Town Watch"));
    assert_eq!(state.player(Seat::Second).tableau.fill(), 0);
    assert_eq!(state.player(Seat::First).tableau.fill(), 1);
    assert!(check_invariants(&state).is_empty());
}

#[test]
fn test_seize_with_full_hand_changes_nothing() {
    let config = GameConfig { hand_limit: 5, hand_capacity: 5, ..GameConfig::default() };
    let mut state = state_with(
        ["Armory", "Town Watch", "Garrison", "Archers", "Chapel"],
        ["Church", "Fowlery", "Mine", "Quarry", "Sawmill"],
        config,
    );
    lay(&mut state, Seat::First, "Armory");
    lay(&mut state, Seat::First, "Town Watch");
    lay(&mut state, Seat::Second, "Fowlery");
    let GameState { stock, players, .. } = &mut state;
    assert_eq!(stock.draw_into(2, &mut players[0].hand), 2);
    assert!(state.player(Seat::First).hand.is_full());

    let options = attack_options(state.player(Seat::First), state.player(Seat::Second)).unwrap();
    assert!(options.targets.is_empty());

    let err = seize(&mut state, Seat::First, Kind::Farm).unwrap_err();
    assert_eq!(err, crate::EngineError::HandFull { capacity: 5 });
    assert_eq!(state.player(Seat::Second).tableau.top(Kind::Farm).map(|c| c.def().name), Some("Fowlery"));
    assert!(state.player(Seat::First).tableau.has(Kind::Soldiers));
    assert!(state.trash.is_empty());
    assert!(check_invariants(&state).is_empty());
}

// ═════════════════════════════════════════════════════════════════════
// TURN STATE MACHINE
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_unplayable_full_hand_offers_redraw() {
    let mut state = state_with(
        ["Town Watch", "Town Watch", "Archers", "Archers", "Militia"],
        ["Mine", "Quarry", "Bank", "Fort", "Chapel"],
        GameConfig::default(),
    );
    advance(&mut state);
    assert_eq!(state.pending, Some(PendingDecision::Redraw { seat: Seat::First }));
    let before = state.stock.remaining();
    apply_action(&mut state, Action::Redraw(true)).unwrap();
    assert_eq!(state.discard.len(), 5);
    assert_eq!(state.stock.remaining(), before - 5);
    assert_eq!(state.player(Seat::First).hand.count(), 5);
    // the reset ends the turn
    assert_eq!(state.current, Seat::Second);
    assert!(check_invariants(&state).is_empty());
}

#[test]
fn test_draw_tops_up_by_at_most_two() {
    let mut state = state_with(
        ["Town Watch", "Town Watch", "Archers", "Archers", "Militia"],
        ["Cathedral", "Quarry", "Bank", "Fort", "Chapel"],
        GameConfig::default(),
    );
    advance(&mut state);
    apply_action(&mut state, Action::Redraw(true)).unwrap();
    // second seat builds the cathedral with everything else
    let slot = CardRef::Hand(hand_pos(&state, Seat::Second, "Cathedral"));
    let discards = discard_slots(state.player(Seat::Second), slot);
    assert_eq!(discards.len(), 4);
    apply_action(&mut state, Action::Build(Some(BuildOrder { slot, discards }))).unwrap();
    // hand was 0 after the build; the draw step adds two
    assert_eq!(state.player(Seat::Second).hand.count(), 2);
    assert_eq!(state.player(Seat::Second).tableau.victory_points(), 4);
}

#[test]
fn test_fill_is_checked_only_at_owner_turn_start() {
    let config = GameConfig { fill_target: 1, ..GameConfig::default() };
    let soldiers = ["Town Watch", "Town Watch", "Archers", "Archers", "Militia"];
    let builder = ["Chapel", "Knights", "Knights", "Fort", "Church"];

    // first seat fills: the second seat finishes the round, then it ends
    let mut state = state_with(builder, soldiers, config.clone());
    play_out(&mut state, false);
    let outcome = state.outcome.unwrap();
    assert_eq!(outcome.reason, EndReason::TableauFilled(Seat::First));
    assert_eq!((state.round, state.current), (2, Seat::First));

    // second seat fills: the first seat plays a whole extra turn before
    // the second seat's check ends the game
    let mut state = state_with(soldiers, builder, config);
    play_out(&mut state, false);
    let outcome = state.outcome.unwrap();
    assert_eq!(outcome.reason, EndReason::TableauFilled(Seat::Second));
    assert_eq!((state.round, state.current), (2, Seat::Second));
}

#[test]
fn test_round_cap_ends_game() {
    let config = GameConfig { seed: 5, round_cap: 3, ..GameConfig::default() };
    let mut state = create_initial_state(config);
    play_out(&mut state, true);
    let outcome = state.outcome.unwrap();
    assert_eq!(outcome.reason, EndReason::SafetyCap);
    assert_eq!(state.round, 3);
    let expected = match outcome.victory_points[0].cmp(&outcome.victory_points[1]) {
        std::cmp::Ordering::Greater => Some(Seat::First),
        std::cmp::Ordering::Less => Some(Seat::Second),
        std::cmp::Ordering::Equal => None,
    };
    assert_eq!(outcome.winner, expected);
}

#[test]
fn test_full_games_keep_invariants() {
    for seed in 0..20 {
        let mut state = create_initial_state(GameConfig { seed, ..GameConfig::default() });
        advance(&mut state);
        let mut steps = 0;
        while !state.is_over() {
            steps += 1;
            assert!(steps < 10_000);
            let seat = state.current;
            let action = first_legal(&state, true);
            apply_action(&mut state, action).unwrap();
            let violations = check_invariants(&state);
            assert!(violations.is_empty(), "seed {seed}: {violations:?}");
            if state.current != seat && !state.is_over() {
                let hand = &state.player(seat).hand;
                assert!(hand.count() <= hand.limit(), "seed {seed}: hand over limit after turn");
            }
        }
        let outcome = state.outcome.unwrap();
        assert!(state.round <= 30);
        assert_eq!(outcome.victory_points[0], state.players[0].tableau.victory_points());
    }
}

#[test]
fn test_blocked_reason_text() {
    let reason = BlockReason::CannotAfford { cost: 1, available: 0 };
    assert!(reason.to_string().starts_with("can't afford"));
    assert_eq!(BlockReason::NoMilitary.to_string(), "no military power");
}

// ═════════════════════════════════════════════════════════════════════
// PROPERTIES
// ═════════════════════════════════════════════════════════════════════

mod props {
    use proptest::prelude::*;

    use super::*;
    use crate::hand::{Hand, Pile};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Any seeded game ends within the cap with every card accounted for.
        #[test]
        fn prop_games_terminate_and_conserve(seed in any::<u64>(), redraw in any::<bool>()) {
            let mut state = create_initial_state(GameConfig { seed, ..GameConfig::default() });
            play_out(&mut state, redraw);
            prop_assert!(state.outcome.is_some());
            prop_assert!(state.round <= state.config.round_cap);
            prop_assert!(check_invariants(&state).is_empty());
        }

        /// Removals leave holes that the next insert fills lowest-first.
        #[test]
        fn prop_hand_holes_fill_lowest_first(removals in proptest::collection::vec(0usize..7, 0..7)) {
            let mut hand = Hand::new(5, 7);
            let mut stock = DrawPool::new(cards::all_card_ids());
            stock.draw_into(5, &mut hand);
            let mut pile = Pile::new();
            for pos in removals {
                let held = hand.get(pos).is_some();
                prop_assert_eq!(hand.move_to(pos, &mut pile).is_ok(), held);
            }
            prop_assert_eq!(hand.count() + pile.len(), 5);
            prop_assert_eq!(hand.slots().iter().flatten().count(), hand.count());

            let lowest = hand.slots().iter().position(Option::is_none);
            if let Some(card) = pile.pop() {
                prop_assert_eq!(hand.insert(card).ok(), lowest);
            }
        }
    }
}
