use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wreckroad_game::{
    Catalog, Inventory, Rank, RankTable, Reward, TreasureSpec, estimate_power,
    generate_enemy_loadout, odds_for_power, power_breakdown, rank_band, roll_reward,
};

fn inventory(catalog: &Catalog, ids: &[&str]) -> Inventory {
    Inventory::from_parts(ids.iter().map(|id| {
        catalog
            .get(id)
            .cloned()
            .unwrap_or_else(|| panic!("catalog has no {id}"))
    }))
}

fn starter_only(catalog: &Catalog) -> Inventory {
    inventory(catalog, &["rustbucket", "moped_engine", "bicycle_wheels", "bicycle_wheels"])
}

fn mixed_ranks(catalog: &Catalog) -> Inventory {
    inventory(
        catalog,
        &[
            "monster_truck",
            "four_cylinder",
            "off_road_tires",
            "bicycle_wheels",
            "bicycle_wheels",
            "steel_bumper",
            "repair_kit",
            "machine_gun",
        ],
    )
}

fn wide_variety(catalog: &Catalog) -> Inventory {
    inventory(
        catalog,
        &[
            "rustbucket",
            "dune_buggy",
            "monster_truck",
            "moped_engine",
            "turbo_v8",
            "four_cylinder",
            "electric_drive",
            "off_road_tires",
            "all_terrain_tires",
            "bicycle_wheels",
            "metal_bumper",
            "plastic_bumper",
            "steel_bumper",
            "repair_kit",
            "armor_plating",
            "flamethrower",
            "machine_gun",
        ],
    )
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn power_fixtures_match_reference_values() {
    let catalog = Catalog::default_catalog();
    let table = RankTable::default_table();
    assert_close(estimate_power(&starter_only(&catalog), &table).unwrap(), 3.0);
    assert_close(estimate_power(&mixed_ranks(&catalog), &table).unwrap(), 14.5);
    assert_close(estimate_power(&wide_variety(&catalog), &table).unwrap(), 27.7);
}

#[test]
fn breakdown_scores_best_parts_up_to_slot_capacity() {
    let catalog = Catalog::default_catalog();
    let table = RankTable::default_table();
    let breakdown = power_breakdown(&wide_variety(&catalog), &table).unwrap();
    // the monster truck leads on both rank and tech points
    assert_eq!(breakdown.chassis[0].part_id, "monster_truck");
    assert_eq!(breakdown.chassis[1].part_id, "monster_truck");
    assert_eq!(breakdown.equipment.len(), 14);
    assert_eq!(breakdown.equipment[0].part_id, "off_road_tires");

    // starter chassis caps each slot at two
    let capped = inventory(
        &catalog,
        &["rustbucket", "off_road_tires", "bicycle_wheels", "all_terrain_tires"],
    );
    let breakdown = power_breakdown(&capped, &table).unwrap();
    let wheels: Vec<&str> = breakdown
        .equipment
        .iter()
        .map(|entry| entry.part_id.as_str())
        .collect();
    assert_eq!(wheels, vec!["off_road_tires", "all_terrain_tires"]);
}

#[test]
fn odds_shift_toward_stronger_ranks_as_power_grows() {
    let catalog = Catalog::default_catalog();
    let table = RankTable::default_table();
    let starter = odds_for_power(estimate_power(&starter_only(&catalog), &table).unwrap(), &table)
        .unwrap();
    let wide = odds_for_power(estimate_power(&wide_variety(&catalog), &table).unwrap(), &table)
        .unwrap();
    assert!(starter[&Rank::Starter] > wide[&Rank::Starter]);
    assert!(starter[&Rank::Rare] < wide[&Rank::Rare]);

    let band = rank_band(3.0, &table).unwrap();
    assert_eq!((band.floor, band.ceiling), (Rank::Starter, Rank::Common));
    let band = rank_band(500.0, &table).unwrap();
    assert_eq!((band.floor, band.ceiling), (Rank::Epic, Rank::Epic));
}

#[test]
fn enemy_loadouts_never_exceed_chassis_budget() {
    let catalog = Catalog::default_catalog();
    let table = RankTable::default_table();
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    for fixture in [starter_only(&catalog), mixed_ranks(&catalog), wide_variety(&catalog)] {
        let odds = odds_for_power(estimate_power(&fixture, &table).unwrap(), &table).unwrap();
        for _ in 0..200 {
            let enemy = generate_enemy_loadout(&catalog, &odds, &mut rng).unwrap();
            assert!(enemy.chassis.is_chassis());
            assert!(enemy.tech_points_used <= enemy.budget());
            assert!(enemy.parts.iter().all(|part| !part.is_chassis()));
            let stats = enemy.stats();
            assert!(stats.integrity >= enemy.chassis.stats.integrity);
        }
    }
}

#[test]
fn treasure_rewards_follow_power_scaled_odds() {
    let catalog = Catalog::default_catalog();
    let table = RankTable::default_table();
    let odds = odds_for_power(27.7, &table).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let spec = TreasureSpec {
        rank_ceiling: Some(Rank::Uncommon),
        ..TreasureSpec::default()
    };
    for _ in 0..100 {
        let reward = roll_reward(&catalog, &odds, &spec, &mut rng).unwrap();
        assert!(matches!(reward, Reward::Single(_)));
        assert!(reward.parts()[0].rank <= Rank::Uncommon);
    }

    let spec = TreasureSpec {
        player_chooses: true,
        ..TreasureSpec::default()
    };
    for _ in 0..100 {
        let reward = roll_reward(&catalog, &odds, &spec, &mut rng).unwrap();
        let Reward::Choice(parts) = reward else {
            panic!("choice mode returned a single part");
        };
        assert!(!parts.is_empty() && parts.len() <= 3);
    }
}
