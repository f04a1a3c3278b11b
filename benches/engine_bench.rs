use criterion::{black_box, criterion_group, criterion_main, Criterion};

use crucible::battle::{locate_battles, resolve_normal, Plan, SideInput};
use crucible::scripted::{demo_order, demo_world, run_round};
use crucible::world::{Faction, ForceKind, LeaderId, Territory, WorldState};

fn bench_locate(c: &mut Criterion) {
    let world = demo_world();
    c.bench_function("locate_battles_demo_world", |b| {
        b.iter(|| locate_battles(black_box(&world)))
    });
}

fn bench_resolve(c: &mut Criterion) {
    let mut world = WorldState::empty();
    world.place_forces(Territory::Citadel, Faction::Cartel, ForceKind::Regular, 5);
    world.place_forces(Territory::Citadel, Faction::Imperium, ForceKind::Regular, 4);
    let aggressor = SideInput {
        faction: Faction::Cartel,
        plan: Plan {
            leader: Some(LeaderId::Soren),
            no_leader_declared: false,
            regulars_committed: 3,
            ..Plan::fallback()
        },
    };
    let defender = SideInput {
        faction: Faction::Imperium,
        plan: Plan {
            leader: Some(LeaderId::Caius),
            no_leader_declared: false,
            regulars_committed: 4,
            ..Plan::fallback()
        },
    };
    c.bench_function("resolve_contested_battle", |b| {
        b.iter(|| {
            resolve_normal(
                black_box(&world),
                Territory::Citadel,
                black_box(&aggressor),
                black_box(&defender),
            )
        })
    });
}

fn bench_full_round(c: &mut Criterion) {
    c.bench_function("scripted_round_demo_world", |b| {
        b.iter(|| {
            let mut world = demo_world();
            run_round(black_box(&mut world), demo_order(), 7)
        })
    });
}

criterion_group!(benches, bench_locate, bench_resolve, bench_full_round);
criterion_main!(benches);
