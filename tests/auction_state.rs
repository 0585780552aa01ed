mod common;

use common::{category, player, team};
use league_auction::auction::{AuctionDefaults, AuctionError, AuctionState};

fn state() -> AuctionState {
    AuctionState::new(AuctionDefaults::default())
}

#[test]
fn category_sets_floor_and_clock() {
    let mut st = state();
    st.load(
        vec![player("Virat", "A+", Some(500_000))],
        vec![team("Strikers", 5_000_000)],
        vec![category("A+", 500_000, 15)],
    );

    assert_eq!(st.current_index(), 0);
    assert_eq!(st.base_price(), 500_000);
    assert_eq!(st.current_bid(), 500_000);
    assert_eq!(st.timer_remaining(), 15);
}

#[test]
fn missing_price_and_category_use_defaults() {
    let mut st = state();
    st.load(vec![player("Nobody", "Z", None)], vec![], vec![]);

    assert_eq!(st.base_price(), 200_000);
    assert_eq!(st.current_bid(), 200_000);
    assert_eq!(st.timer_remaining(), 10);
}

#[test]
fn zero_timer_category_falls_back() {
    let mut st = state();
    st.load(
        vec![player("Rohit", "B", Some(0))],
        vec![],
        vec![category("B", 0, 0)],
    );
    assert_eq!(st.base_price(), 200_000);
    assert_eq!(st.timer_remaining(), 10);
}

#[test]
fn bid_never_drops_below_floor() {
    let mut st = state();
    st.load(vec![player("Shubman", "A", Some(300_000))], vec![], vec![]);

    assert!(!st.adjust_bid(-1));
    assert_eq!(st.current_bid(), 300_000);

    assert!(st.adjust_bid(50_000));
    assert_eq!(st.current_bid(), 350_000);

    assert!(!st.adjust_bid(-50_001));
    assert_eq!(st.current_bid(), 350_000);

    assert!(st.adjust_bid(-50_000));
    assert_eq!(st.current_bid(), 300_000);

    assert!(!st.adjust_bid(i64::MAX));
    assert_eq!(st.current_bid(), 300_000);
}

#[test]
fn accepted_bid_puts_full_time_back() {
    let mut st = state();
    st.load(
        vec![player("Jasprit", "A+", Some(500_000))],
        vec![],
        vec![category("A+", 500_000, 15)],
    );
    st.tick();
    st.tick();
    st.tick();
    assert_eq!(st.timer_remaining(), 12);

    assert!(st.adjust_bid(25_000));
    assert_eq!(st.timer_remaining(), 15);

    // rejected adjustments leave the clock alone
    st.tick();
    assert!(!st.adjust_bid(-1_000_000));
    assert_eq!(st.timer_remaining(), 14);
}

#[test]
fn tick_stops_at_zero() {
    let mut st = state();
    st.load(vec![player("Ishan", "", None)], vec![], vec![]);
    for _ in 0..15 {
        st.tick();
    }
    assert_eq!(st.timer_remaining(), 0);
}

#[test]
fn out_of_range_select_changes_nothing() {
    let mut st = state();
    st.load(
        vec![player("One", "", None), player("Two", "", None)],
        vec![],
        vec![],
    );
    assert!(st.select_player(1));
    let before = st.current_player().cloned();

    assert!(!st.select_player(2));
    assert!(!st.select_player(usize::MAX));
    assert_eq!(st.current_index(), 1);
    assert_eq!(st.current_player().cloned(), before);

    assert!(!st.next_player());
    assert!(st.prev_player());
    assert!(!st.prev_player());
    assert_eq!(st.current_index(), 0);
}

#[test]
fn over_budget_sale_is_rejected() {
    let strikers = team("Strikers", 1_000_000);
    let mut st = state();
    st.load(
        vec![player("Hardik", "", None)],
        vec![strikers.clone()],
        vec![],
    );
    st.select_team(strikers.id).unwrap();
    assert!(st.adjust_bid(1_000_000));
    assert_eq!(st.current_bid(), 1_200_000);

    let err = st.plan_sale(None, None).unwrap_err();
    assert!(matches!(err, AuctionError::InsufficientBudget { budget: 1_000_000, .. }));
    assert_eq!(err.to_string(), "Insufficient budget! Strikers only has 1000000");
    assert_eq!(st.team(strikers.id).unwrap().team.budget, 1_000_000);
}

#[test]
fn sale_then_release_round_trips_budget() {
    let strikers = team("Strikers", 1_000_000);
    let hardik = player("Hardik", "", None);
    let mut st = state();
    st.load(vec![hardik.clone()], vec![strikers.clone()], vec![]);

    let sale = st.plan_sale(Some(strikers.id), Some(300_000)).unwrap();
    assert_eq!(sale.price, 300_000);

    let mut sold = hardik.clone();
    sold.team_id = Some(strikers.id);
    sold.sold_price = Some(300_000);
    let mut charged = strikers.clone();
    charged.budget = 700_000;
    st.apply_sale(&sale, sold, charged);

    let slot = st.team(strikers.id).unwrap();
    assert_eq!(slot.team.budget, 700_000);
    assert_eq!(slot.players_count, 1);
    let p = st.current_player().unwrap();
    assert_eq!(p.team_id, Some(strikers.id));
    assert_eq!(p.sold_price, Some(300_000));
    assert_eq!(st.team_roster(strikers.id).len(), 1);

    let release = st.plan_release().unwrap();
    assert_eq!(release.refund, 300_000);
    st.apply_release(&release, hardik.clone(), strikers.clone());

    let slot = st.team(strikers.id).unwrap();
    assert_eq!(slot.team.budget, 1_000_000);
    assert_eq!(slot.players_count, 0);
    assert_eq!(st.current_bid(), 200_000);
    assert_eq!(st.selected_team(), None);
    assert!(st.team_roster(strikers.id).is_empty());

    // the same sale goes through again
    assert!(st.plan_sale(Some(strikers.id), Some(300_000)).is_ok());
}

#[test]
fn player_count_is_floored_at_zero() {
    let strikers = team("Strikers", 1_000_000);
    let mut p = player("Axar", "", None);
    p.team_id = Some(strikers.id);
    p.sold_price = Some(250_000);

    let mut st = state();
    st.load(vec![p.clone()], vec![strikers.clone()], vec![]);
    assert_eq!(st.team(strikers.id).unwrap().players_count, 1);

    let release = st.plan_release().unwrap();
    let mut unsold = p.clone();
    unsold.team_id = None;
    unsold.sold_price = None;
    st.apply_release(&release, unsold.clone(), strikers.clone());
    st.apply_release(&release, unsold, strikers.clone());
    assert_eq!(st.team(strikers.id).unwrap().players_count, 0);
}

#[test]
fn selecting_a_sold_player_shows_the_sale() {
    let strikers = team("Strikers", 1_000_000);
    let mut p = player("Axar", "", Some(250_000));
    p.team_id = Some(strikers.id);
    p.sold_price = Some(400_000);

    let mut st = state();
    st.load(vec![p], vec![strikers.clone()], vec![]);
    assert_eq!(st.current_bid(), 400_000);
    assert_eq!(st.selected_team(), Some(strikers.id));
    assert_eq!(st.snapshot().selected_team_name.as_deref(), Some("Strikers"));
}

#[test]
fn sale_preconditions() {
    let strikers = team("Strikers", 1_000_000);
    let mut st = state();

    assert!(matches!(st.plan_sale(None, None), Err(AuctionError::NoPlayer)));

    st.load(vec![player("Kuldeep", "", None)], vec![strikers.clone()], vec![]);
    assert!(matches!(st.plan_sale(None, None), Err(AuctionError::NoTeam)));
    assert!(matches!(
        st.plan_sale(Some(uuid::Uuid::new_v4()), None),
        Err(AuctionError::UnknownTeam(_))
    ));
    assert!(matches!(
        st.plan_sale(Some(strikers.id), Some(199_999)),
        Err(AuctionError::BelowBasePrice { .. })
    ));
    assert!(matches!(st.plan_release(), Err(AuctionError::NotSold(_))));
    assert!(matches!(
        st.select_team(uuid::Uuid::new_v4()),
        Err(AuctionError::UnknownTeam(_))
    ));
}

#[test]
fn selling_a_sold_player_is_refused() {
    let strikers = team("Strikers", 1_000_000);
    let mut p = player("Axar", "", None);
    p.team_id = Some(strikers.id);
    p.sold_price = Some(250_000);

    let mut st = state();
    st.load(vec![p], vec![strikers.clone()], vec![]);
    assert!(matches!(
        st.plan_sale(Some(strikers.id), None),
        Err(AuctionError::AlreadySold(_))
    ));
}

#[test]
fn pending_jump_resolves_on_load() {
    let late = player("Late", "", None);
    let mut st = state();
    st.load(vec![player("Early", "", None)], vec![], vec![]);

    assert!(!st.jump_to_player(late.id));
    assert_eq!(st.pending_player(), Some(late.id));

    st.load(
        vec![player("Early", "", None), late.clone()],
        vec![],
        vec![],
    );
    assert_eq!(st.pending_player(), None);
    assert_eq!(st.current_player().map(|p| p.id), Some(late.id));
}

#[test]
fn pending_jump_survives_a_reload_without_the_player() {
    let early = player("Early", "", None);
    let late = player("Late", "", None);
    let mut st = state();
    st.load(vec![early.clone()], vec![], vec![]);
    assert!(!st.jump_to_player(late.id));

    // the player has not been created yet
    st.load(vec![early.clone()], vec![], vec![]);
    assert_eq!(st.pending_player(), Some(late.id));
    assert_eq!(st.current_player().map(|p| p.id), Some(early.id));

    st.load(vec![early, late.clone()], vec![], vec![]);
    assert_eq!(st.pending_player(), None);
    assert_eq!(st.current_player().map(|p| p.name.as_str()), Some("Late"));
}

#[test]
fn reload_keeps_the_current_player() {
    let players = vec![
        player("A", "", None),
        player("B", "", None),
        player("C", "", None),
    ];
    let mut st = state();
    st.load(players.clone(), vec![], vec![]);
    st.select_player(2);

    // a newer player shifts everyone down by one
    let mut reordered = vec![player("Newest", "", None)];
    reordered.extend(players.iter().cloned());
    st.load(reordered, vec![], vec![]);

    assert_eq!(st.current_index(), 3);
    assert_eq!(st.current_player().map(|p| p.name.as_str()), Some("C"));
}

#[test]
fn empty_directory_has_no_player() {
    let mut st = state();
    st.load(vec![], vec![], vec![]);
    assert!(st.current_player().is_none());
    assert!(!st.adjust_bid(1));
    assert!(!st.next_player());
    assert_eq!(st.snapshot().total, 0);
}
