use botdata::journal::{MemoryJournal, StoreWrite};
use botdata::matchmaking::LocalMatchQueue;
use botdata::world::SimWorld;
use botdata::{BatchRequest, Config, RegionFilter, Sampler, WorldBotService, WorldData};
use common::TeamId;

const WORLD: &str = r#"
[[regions]]
id = 0
name = "Eastern Kingdoms"

[[creatures]]
entry = 70001
name = "Footman"
[[creatures]]
entry = 70002
name = "Conjurer"
[[creatures]]
entry = 70010
name = "Grunt"
[[creatures]]
entry = 70011
name = "Shadowblade"
[[creatures]]
entry = 70030
name = "Necromancer"
[[creatures]]
entry = 70031
name = "Acolyte"

[[extras]]
entry = 70001
class = 1
race = 1
[[extras]]
entry = 70002
class = 8
race = 1
[[extras]]
entry = 70010
class = 1
race = 2
[[extras]]
entry = 70011
class = 4
race = 2
[[extras]]
entry = 70030
class = 18
race = 0
[[extras]]
entry = 70031
class = 18
race = 0

[[nodes]]
id = 1
region = 0
x = 0.0
y = 0.0
z = 0.0
flags = 1
links = "2:0"

[[nodes]]
id = 2
region = 0
x = 120.0
y = 0.0
z = 0.0
flags = 1
links = "3:0"

[[nodes]]
id = 3
region = 0
x = 240.0
y = 0.0
z = 0.0
flags = 1
links = "1:0"
"#;

fn start(desired: usize, journal: MemoryJournal) -> WorldBotService<SimWorld, LocalMatchQueue> {
    let data: WorldData = toml::from_str(WORLD).unwrap();
    let mut config = Config::default();
    config.generation.desired_wanderers = desired;
    WorldBotService::startup(
        config,
        &data,
        Box::new(journal),
        Sampler::seeded(11),
        SimWorld::new(),
        LocalMatchQueue::new(),
    )
    .unwrap()
}

#[test]
fn wanderers_spawn_and_return_to_the_pool() {
    let journal = MemoryJournal::new();
    let mut service = start(2, journal.clone());
    assert_eq!(service.spare_count(), 4);
    assert!(service.registry().is_empty());

    for _ in 0..4 {
        service.tick(500);
    }
    let live = service.registry().snapshot();
    assert_eq!(live.len(), 2);
    assert!(live.iter().all(|actor| actor.wanderer && actor.active));
    assert!(journal
        .writes()
        .contains(&StoreWrite::SetNextGeneratedId { id: 80002 }));

    for actor in &live {
        assert!(service.despawn_bot(actor.id));
    }
    service.tick(100);
    assert!(service.registry().is_empty());
    assert_eq!(service.spare_count(), 6);
}

#[test]
fn registry_is_readable_from_other_threads() {
    let mut service = start(0, MemoryJournal::new());
    let report = service.generate_batch(BatchRequest {
        count: 2,
        region: RegionFilter::Region(0),
        team: Some(TeamId::Horde),
        immediate: true,
        bracket: None,
    });
    assert!(report.succeeded());

    let registry = service.registry();
    let names: Vec<String> = std::thread::spawn(move || {
        registry.snapshot().into_iter().map(|actor| actor.name).collect()
    })
    .join()
    .unwrap();
    assert_eq!(names.len(), 2);
    for name in names {
        assert!(service.find_bot_by_name(&name.to_uppercase()).is_some());
    }
}
