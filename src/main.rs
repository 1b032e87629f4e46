use soak::run_soak;
pub mod soak;

fn main() {
    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            KEYSPACE SOAK RUNS                               ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    // Run 1: few keys, heavy traffic per key
    let stats = run_soak(0xC0FFEE, 4, 25_000);
    stats.print();

    // Run 2: many keys, spread traffic
    let stats = run_soak(0x5EED, 32, 50_000);
    stats.print();

    println!("\n✓ All soak runs completed successfully!");
}
