use isocity::{
    hash::hash,
    topology::{intersection_degree, is_intersection},
    BuildingType, GameConfig, GameState, PlacementError, Tile,
};

fn new_game() -> GameState {
    GameState::new(&GameConfig::default())
}

fn game_with(config: GameConfig) -> GameState {
    GameState::new(&config)
}

#[test]
fn hash_is_deterministic_over_the_grid() {
    for x in 0..15 {
        for y in 0..15 {
            let value = hash(x, y);
            assert_eq!(value.to_bits(), hash(x, y).to_bits());
            assert!((0.0..1.0).contains(&value));
        }
    }
}

#[test]
fn bulldozing_never_touches_the_treasury() {
    let mut game = new_game();
    game.place_building(2, 2, BuildingType::Commercial).unwrap();
    let before = game.treasury();

    game.place_building(2, 2, BuildingType::None).unwrap();
    assert_eq!(game.treasury(), before);
    assert_eq!(game.tile(2, 2).unwrap(), Tile::EMPTY);
    assert_eq!(game.tile(2, 2).unwrap().construction_ticks_left(), None);

    game.place_building(9, 9, BuildingType::None).unwrap();
    assert_eq!(game.treasury(), before);
}

#[test]
fn building_debits_exactly_the_cost() {
    let mut game = new_game();
    game.place_building(4, 4, BuildingType::Residential).unwrap();
    assert_eq!(game.treasury(), 900);
    let tile = game.tile(4, 4).unwrap();
    assert_eq!(tile.building(), BuildingType::Residential);
    assert!(tile.construction_ticks_left().unwrap() > 0);
}

#[test]
fn insufficient_funds_is_a_no_op() {
    let mut game = game_with(GameConfig {
        initial_money: 50,
        ..Default::default()
    });
    let before = game.snapshot();
    let err = game
        .place_building(4, 4, BuildingType::Residential)
        .unwrap_err();
    assert!(matches!(err, PlacementError::InsufficientFunds { .. }));
    assert_eq!(game.snapshot(), before);
}

#[test]
fn residential_counts_on_the_tick_it_completes() {
    let mut game = new_game();
    game.place_building(1, 1, BuildingType::Residential).unwrap();
    let ticks = game.tile(1, 1).unwrap().construction_ticks_left().unwrap();

    for _ in 1..ticks {
        let outcome = game.advance_tick();
        assert_eq!(outcome.population, 0);
        assert_eq!(outcome.treasury, 900);
    }
    let outcome = game.advance_tick();
    assert_eq!(outcome.completed, 1);
    assert_eq!(outcome.population, 5);
    assert_eq!(game.population(), 5);
    assert!(game.tile(1, 1).unwrap().is_active());
}

#[test]
fn single_tick_construction_finishes_after_one_tick() {
    let mut game = game_with(GameConfig {
        construction_ticks: 1,
        ..Default::default()
    });
    game.place_building(0, 0, BuildingType::Residential).unwrap();
    assert_eq!(game.population(), 0);
    game.advance_tick();
    assert_eq!(game.population(), 5);
}

#[test]
fn upkeep_can_push_the_treasury_negative() {
    let mut game = game_with(GameConfig {
        initial_money: 520,
        construction_ticks: 1,
        ..Default::default()
    });
    game.place_building(0, 0, BuildingType::Hospital).unwrap();
    assert_eq!(game.treasury(), 20);
    game.advance_tick();
    assert_eq!(game.treasury(), 0);
    game.advance_tick();
    assert_eq!(game.treasury(), -20);

    let err = game.place_building(1, 1, BuildingType::Road).unwrap_err();
    assert!(matches!(err, PlacementError::InsufficientFunds { .. }));
}

#[test]
fn commercial_and_hospital_yield_minus_five() {
    let mut game = game_with(GameConfig {
        initial_money: 5000,
        construction_ticks: 1,
        ..Default::default()
    });
    game.place_building(0, 0, BuildingType::Commercial).unwrap();
    game.place_building(1, 0, BuildingType::Hospital).unwrap();
    let before = game.treasury();
    let outcome = game.advance_tick();
    assert_eq!(outcome.income, -5);
    assert_eq!(game.treasury(), before - 5);
}

#[test]
fn population_is_recounted_not_accumulated() {
    let mut game = game_with(GameConfig {
        construction_ticks: 1,
        ..Default::default()
    });
    game.place_building(0, 0, BuildingType::Residential).unwrap();
    game.advance_tick();
    game.advance_tick();
    assert_eq!(game.population(), 5);

    game.place_building(0, 0, BuildingType::None).unwrap();
    game.advance_tick();
    assert_eq!(game.population(), 0);
}

#[test]
fn reads_are_idempotent() {
    let mut game = new_game();
    game.place_building(3, 3, BuildingType::Park).unwrap();
    game.advance_tick();

    let first = (game.tile(3, 3).unwrap(), game.treasury(), game.population());
    for _ in 0..5 {
        assert_eq!(
            (game.tile(3, 3).unwrap(), game.treasury(), game.population()),
            first
        );
    }
    assert_eq!(game.tick(), 1);
}

#[test]
fn out_of_bounds_reads_and_writes_are_reported() {
    let mut game = new_game();
    assert!(game.tile(-1, 0).is_err());
    assert!(game.tile(0, 15).is_err());
    let err = game.place_building(15, 15, BuildingType::Road).unwrap_err();
    assert!(matches!(err, PlacementError::OutOfBounds(_)));
    assert_eq!(game.treasury(), 1000);
}

#[test]
fn occupied_tile_requires_bulldozing_first() {
    let mut game = new_game();
    game.place_building(5, 5, BuildingType::Road).unwrap();
    let err = game
        .place_building(5, 5, BuildingType::Residential)
        .unwrap_err();
    assert!(matches!(
        err,
        PlacementError::TileOccupied {
            occupant: BuildingType::Road,
            ..
        }
    ));
    game.place_building(5, 5, BuildingType::None).unwrap();
    game.place_building(5, 5, BuildingType::Residential).unwrap();
    assert_eq!(game.treasury(), 1000 - 10 - 100);
}

#[test]
fn only_one_airport_per_city() {
    let mut game = game_with(GameConfig {
        initial_money: 10_000,
        ..Default::default()
    });
    game.place_building(0, 0, BuildingType::Airport).unwrap();
    let err = game.place_building(5, 5, BuildingType::Airport).unwrap_err();
    assert_eq!(
        err,
        PlacementError::DuplicateUnique {
            building: BuildingType::Airport
        }
    );

    game.place_building(0, 0, BuildingType::None).unwrap();
    game.place_building(5, 5, BuildingType::Airport).unwrap();
}

#[test]
fn crossing_roads_form_an_intersection() {
    let mut game = new_game();
    for (x, y) in [(7, 7), (6, 7), (8, 7), (7, 6), (7, 8)] {
        game.place_building(x, y, BuildingType::Road).unwrap();
    }
    assert_eq!(intersection_degree(game.grid(), 7, 7), 4);
    assert!(is_intersection(game.grid(), 7, 7));
    assert_eq!(intersection_degree(game.grid(), 6, 7), 1);

    game.place_building(7, 6, BuildingType::None).unwrap();
    game.place_building(7, 8, BuildingType::None).unwrap();
    assert_eq!(intersection_degree(game.grid(), 7, 7), 2);
    assert!(!is_intersection(game.grid(), 7, 7));
}
