use std::ops::ControlFlow;

use wreckroad_game::{
    EmbeddedData, EncounterKind, Inventory, MapEngine, RandomChooser, RngBundle, TreasureSpec,
    WalkOutcome, decode_to_seed, encode_friendly, walk,
};

#[test]
fn share_code_drives_a_reproducible_run() {
    let seed = decode_to_seed("WR-PISTON42").expect("valid code");
    assert_eq!(encode_friendly(seed), "WR-PISTON42");

    let engine = MapEngine::new(EmbeddedData);
    let offers = engine.offers(seed).unwrap();
    let replay = engine.offers(seed).unwrap();
    assert_eq!(offers.len(), 3);
    for (offer, again) in offers.iter().zip(&replay) {
        assert_eq!(offer.map.fingerprint(), again.map.fingerprint());
    }
}

#[test]
fn walked_run_meets_enemies_and_treasure_along_the_path() {
    let engine = MapEngine::new(EmbeddedData);
    let catalog = engine.catalog().unwrap();
    let mut inventory = Inventory::from_parts(
        ["rustbucket", "moped_engine", "bicycle_wheels"]
            .into_iter()
            .filter_map(|id| catalog.get(id).cloned()),
    );

    for seed in 0..25_u64 {
        let offers = engine.offers(seed).unwrap();
        let map = &offers[0].map;
        let bundle = RngBundle::from_user_seed(seed);
        let mut choices = bundle.layout();
        let mut chooser = RandomChooser::new(&mut *choices);

        let mut battles = 0;
        let mut error = None;
        let log = walk(map, &mut chooser, |node| {
            let outcome = match node.kind {
                Some(EncounterKind::Battle | EncounterKind::Boss) => engine
                    .enemy(&inventory, &mut *bundle.loadout())
                    .map(|enemy| {
                        battles += 1;
                        assert!(enemy.tech_points_used <= enemy.budget());
                    }),
                Some(EncounterKind::Treasure) => engine
                    .treasure(&inventory, &TreasureSpec::default(), &mut *bundle.rewards())
                    .map(|reward| {
                        for part in reward.parts() {
                            inventory.add(part.clone());
                        }
                    }),
                _ => Ok(()),
            };
            match outcome {
                Ok(()) => ControlFlow::Continue(()),
                Err(err) => {
                    error = Some(err.to_string());
                    ControlFlow::Break(())
                }
            }
        });

        assert_eq!(error, None, "seed {seed}");
        assert_eq!(log.outcome, WalkOutcome::BossReached, "seed {seed}");
        assert_eq!(log.path.len(), map.height() + 1);
        assert_eq!(log.path.last(), Some(&map.boss_id()));
        assert!(battles >= 1, "seed {seed}: the boss always fights");
    }
    assert!(engine.power(&inventory).unwrap().total >= 2.0);
}
