use dsfs_core::Comembership;
use dsfs_snapshot::Archive;
use dsfs_store::Keyspace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Statistics collected during a soak run
#[derive(Clone, Debug)]
pub struct SoakStats {
    pub seed: u64,
    pub keys: usize,
    pub operations: usize,
    pub adds: usize,
    pub unions: usize,
    pub removes: usize,
    pub queries: usize,
    pub events: usize,
    pub final_elements: usize,
    pub final_sets: usize,
    pub archive_bytes: usize,
    pub total_time: Duration,
    pub ops_per_second: f64,
}

impl SoakStats {
    pub fn print(&self) {
        println!("\n╔════════════════════════════════════════════════════════════╗");
        println!("║                  Soak Run Statistics                        ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║  Seed:                      {:>38} ║", format!("{:#x}", self.seed));
        println!("║  Keys:                      {:>38} ║", self.keys);
        println!("║  Commands Applied:          {:>38} ║", self.operations);
        println!("║  Adds / Unions / Removes:   {:>38} ║", format!("{} / {} / {}", self.adds, self.unions, self.removes));
        println!("║  Queries:                   {:>38} ║", self.queries);
        println!("║  Events Drained:            {:>38} ║", self.events);
        println!("║  Final Elements:            {:>38} ║", self.final_elements);
        println!("║  Final Sets:                {:>38} ║", self.final_sets);
        println!("║  Archive Size (bytes):      {:>38} ║", self.archive_bytes);
        println!("║  Total Time:                {:>37}s ║", format!("{:.3}", self.total_time.as_secs_f64()));
        println!("║  Commands/Second:           {:>38.0} ║", self.ops_per_second);
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

/// Randomized soak against one keyspace.
///
/// Applies a weighted stream of commands, spot-checking along the way
/// that co-membership stays symmetric and materialized sets contain
/// what they must. Afterwards the incremental set counts are checked
/// against a structural recount and the whole keyspace goes through an
/// archive round-trip that must answer every membership question
/// identically.
pub fn run_soak(seed: u64, num_keys: usize, num_ops: usize) -> SoakStats {
    println!("\n╔════════════════════════════════════════════════════════════╗");
    println!("║        Keyspace Soak (randomized commands)                  ║");
    println!("║  Keys: {} | Commands: {} | Seed: {:#x}", num_keys, num_ops, seed);
    println!("╚════════════════════════════════════════════════════════════╝");

    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ks = Keyspace::new();

    let mut adds = 0;
    let mut unions = 0;
    let mut removes = 0;
    let mut queries = 0;
    let mut events = 0;

    println!("\n[Phase 1/3] Applying commands...");
    for op in 0..num_ops {
        let key = format!("soak:{}", rng.gen_range(0..num_keys));
        match rng.gen_range(0..100u32) {
            0..=34 => {
                let count = rng.gen_range(1..=3);
                let values: Vec<Vec<u8>> = (0..count).map(|_| pick_value(&mut rng)).collect();
                ks.add(&key, values);
                adds += 1;
            }
            35..=54 => {
                let a = pick_value(&mut rng);
                let b = pick_value(&mut rng);
                let _ = ks.union(&key, &a, &b);
                unions += 1;
            }
            55..=69 => {
                let a = pick_value(&mut rng);
                let b = pick_value(&mut rng);
                let forward = comember_bit(&mut ks, &key, &a, &b);
                let backward = comember_bit(&mut ks, &key, &b, &a);
                assert_eq!(forward, backward, "co-membership must be symmetric");
                queries += 1;
            }
            70..=79 => {
                let value = pick_value(&mut rng);
                if let Ok(members) = ks.members_of(&key, &value) {
                    assert!(members.contains(&value));
                    assert!(members.len() <= ks.element_count(&key));
                }
                queries += 1;
            }
            80..=89 => {
                let value = pick_value(&mut rng);
                let _ = ks.remove(&key, [value]);
                removes += 1;
            }
            _ => {
                if let Some(sample) = ks.random_element(&key, &mut rng) {
                    assert!(ks.forest(&key).map_or(false, |f| f.contains(&sample)));
                }
                queries += 1;
            }
        }

        if (op + 1) % 1_000 == 0 {
            events += ks.take_events().len();
        }
        if (op + 1) % 10_000 == 0 {
            println!("  Commands applied: {}/{}", op + 1, num_ops);
        }
    }
    events += ks.take_events().len();
    println!("[Phase 1/3] ✓ Completed");

    println!("[Phase 2/3] Recounting sets structurally...");
    check_counts(&ks);
    println!("[Phase 2/3] ✓ Completed");

    println!("[Phase 3/3] Archive round-trip...");
    let archive: Archive = ks.to_archive().unwrap();
    let archive_bytes = archive.size();
    let reloaded = Keyspace::from_archive(&archive).unwrap();
    verify_equivalent(&mut ks, reloaded);
    println!("[Phase 3/3] ✓ Completed");

    let total_time = start.elapsed();
    let keys: Vec<String> = ks.keys().map(str::to_string).collect();
    let final_elements = keys.iter().map(|k| ks.element_count(k)).sum();
    let final_sets = keys.iter().map(|k| ks.cardinality(k)).sum();
    let ops_per_second = num_ops as f64 / total_time.as_secs_f64();

    SoakStats {
        seed,
        keys: keys.len(),
        operations: num_ops,
        adds,
        unions,
        removes,
        queries,
        events,
        final_elements,
        final_sets,
        archive_bytes,
        total_time,
        ops_per_second,
    }
}

fn pick_value(rng: &mut StdRng) -> Vec<u8> {
    format!("e{:03}", rng.gen_range(0..150)).into_bytes()
}

fn comember_bit(ks: &mut Keyspace, key: &str, a: &[u8], b: &[u8]) -> Option<bool> {
    match ks.are_comembers(key, a, b) {
        Ok(Comembership::SameSet) => Some(true),
        Ok(Comembership::DifferentSets) => Some(false),
        Err(_) => None,
    }
}

/// Cross-check the incremental counters against structural truth.
fn check_counts(ks: &Keyspace) {
    for key in ks.keys() {
        let forest = ks.forest(key).unwrap();
        assert!(!forest.is_empty(), "no key may hold an empty forest");
        assert!(forest.cardinality() <= forest.len());
        let roots = forest
            .entries()
            .filter(|(_, element)| element.is_representative())
            .count();
        assert_eq!(
            roots,
            forest.cardinality(),
            "incremental set count disagrees with a structural recount"
        );
    }
}

/// The reloaded keyspace must answer every membership question the
/// original does.
fn verify_equivalent(original: &mut Keyspace, mut reloaded: Keyspace) {
    let keys: Vec<String> = original.keys().map(str::to_string).collect();
    let reloaded_keys: Vec<String> = reloaded.keys().map(str::to_string).collect();
    assert_eq!(keys, reloaded_keys);

    for key in &keys {
        assert_eq!(original.element_count(key), reloaded.element_count(key));
        assert_eq!(original.cardinality(key), reloaded.cardinality(key));
        let values: Vec<Vec<u8>> = original
            .forest(key)
            .map(|f| f.values().map(|v| v.to_vec()).collect())
            .unwrap_or_default();
        for value in &values {
            let mut want = original.members_of(key, value).unwrap();
            let mut got = reloaded.members_of(key, value).unwrap();
            want.sort();
            got.sort();
            assert_eq!(got, want);
        }
    }
}
