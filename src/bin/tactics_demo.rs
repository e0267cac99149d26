//! Headless driver for the tactics core: seeds a world, queues one player
//! move, then forces a few Decision/Execution cycles and narrates each one
//! to stdout. Grounded on the sibling project's `main.rs` game loop, with
//! terminal rendering/input/audio stripped out — those are out of scope
//! here (see the crate's top-level docs). Not a playable interface.

use tactics_core::{Action, ActionKind, Coordinate, Phase, Processor, SimConfig, World};

fn main() {
    let seed: u32 = std::env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(42);

    let mut world = World::new(SimConfig::load());
    world.init_game(Some(seed));

    println!("seeded world with {seed}");
    print_units(&world);

    queue_opening_move(&mut world);

    for turn in 1..=3 {
        println!("\n=== turn {turn}: decision expires ===");
        let remaining = world.timer;
        world.update_timer(remaining);
        world.set_phase(Phase::Execution);
        println!("queued {} action(s) for this execution", world.queue.len());

        let queue = std::mem::take(&mut world.queue);
        let mut processor = Processor::new(queue);
        let events = processor.run_to_completion(&mut world);
        for event in &events {
            println!("  {event:?}");
        }
        for event in &world.damage_events {
            println!("  damage: {} took {} at {:?}", event.id, event.amount, event.position);
        }

        println!("--- turn {turn}: after execution ---");
        print_units(&world);
    }
}

/// Queues a single MOVE for the player toward an adjacent walkable tile, so
/// the first execution has at least one player-issued intent to narrate.
fn queue_opening_move(world: &mut World) {
    let Some(player) = world.units.get("player") else { return };
    let start = player.position;
    let target = Coordinate::new(start.x + 1, start.y, start.floor);

    let Some(path) = world.find_path(start, target, "player") else { return };
    if path.len() < 2 {
        return;
    }
    world.queue_action(Action::new("demo-move-1", ActionKind::Move, "player", 1.0).with_target_position(target));
}

fn print_units(world: &World) {
    let mut ids: Vec<&String> = world.units.keys().collect();
    ids.sort();
    for id in ids {
        let unit = &world.units[id];
        println!(
            "  {id:10} {:?} pos=({},{},{}) hp={}/{} ap={:.1}/{:.1}",
            unit.kind,
            unit.position.x,
            unit.position.y,
            unit.position.floor,
            unit.status.hp,
            unit.status.max_hp,
            unit.status.ap,
            unit.status.max_ap,
        );
    }
}
