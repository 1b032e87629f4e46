//! # Coppice CLI
//!
//! A standalone walkthrough and REPL for the Coppice keyspace. Each key
//! holds one disjoint-set forest over byte-string elements; unions,
//! co-membership checks, and removals happen in place, and the whole
//! keyspace round-trips through digest-sealed archives on disk.
//!
//! ## Value model
//!
//! ```text
//! key: groves  →  { {ash, birch}, {cedar} }          one forest per key
//! archive      →  version + SHA-256 digest + JSON    whole-keyspace file
//! ```

use std::collections::HashSet;
use std::io::{self, Write};

use clap::{Parser, Subcommand};
use colored::*;
use dsfs_store::{Archive, Comembership, Keyspace, KeyspaceEvent, UnionOutcome};

// ─── CLI ───────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "coppice-cli")]
#[command(about = "Disjoint-set forests as first-class values in a keyed store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Basic demo: plant a grove, merge sets, re-elect a representative
    Demo,
    /// Archive round-trip: save a keyspace to disk, reload, verify answers
    Persist {
        /// Archive file path
        #[arg(default_value = "coppice.archive")]
        path: String,
    },
    /// Interactive REPL for manual experimentation
    Repl,
}

// ─── Pretty printing ──────────────────────────────────────────────────────

fn header(text: &str) {
    let bar = "═".repeat(60);
    println!("\n{}", bar.bright_cyan());
    println!("  {}", text.bold().bright_white());
    println!("{}", bar.bright_cyan());
}

fn section(text: &str) {
    println!("\n{} {}", "▸".bright_yellow(), text.bold());
}

fn step(text: &str) {
    println!("  {} {}", "•".bright_green(), text);
}

fn join_values(values: &[Vec<u8>]) -> String {
    let mut names: Vec<String> = values
        .iter()
        .map(|v| String::from_utf8_lossy(v).into_owned())
        .collect();
    names.sort();
    format!("{{{}}}", names.join(", "))
}

/// Materialize every set under a key, each sorted, the list sorted too.
fn sets_of(ks: &mut Keyspace, key: &str) -> Vec<Vec<String>> {
    let values: Vec<Vec<u8>> = match ks.forest(key) {
        Some(forest) => forest.values().map(|v| v.to_vec()).collect(),
        None => return Vec::new(),
    };

    let mut seen: HashSet<Vec<u8>> = HashSet::new();
    let mut sets = Vec::new();
    for value in &values {
        if seen.contains(value) {
            continue;
        }
        let members = match ks.members_of(key, value) {
            Ok(m) => m,
            Err(_) => continue,
        };
        let mut names: Vec<String> = members
            .iter()
            .map(|m| String::from_utf8_lossy(m).into_owned())
            .collect();
        names.sort();
        for member in members {
            seen.insert(member);
        }
        sets.push(names);
    }
    sets.sort();
    sets
}

fn show_key(ks: &mut Keyspace, key: &str) {
    let border = "─".repeat(44);
    println!("  ┌{}┐", border);
    println!(
        "  │ {:^42} │",
        format!("Key: {}", key).bright_yellow().to_string()
    );
    println!("  ├{}┤", border);

    if !ks.contains_key(key) {
        println!("  │ {:^42} │", "(no such key)".dimmed().to_string());
        println!("  └{}┘", border);
        return;
    }

    let line = format!("  elements: {}   sets: {}", ks.element_count(key), ks.cardinality(key));
    println!("  │ {:<42} │", line);
    for (i, set) in sets_of(ks, key).iter().enumerate() {
        let line = format!("  set {}: {{{}}}", i + 1, set.join(", "));
        println!("  │ {:<42} │", line);
    }
    println!("  └{}┘", border);
}

fn union_step(ks: &mut Keyspace, key: &str, a: &str, b: &str) {
    match ks.union(key, a.as_bytes(), b.as_bytes()) {
        Ok(UnionOutcome::Merged) => step(&format!("{}: {} ∪ {} → merged", key, a, b)),
        Ok(UnionOutcome::AlreadyUnified) => {
            step(&format!("{}: {} ∪ {} → already one set", key, a, b))
        }
        Err(e) => println!("  {} {}", "!".bright_red(), e),
    }
}

fn same_step(ks: &mut Keyspace, key: &str, a: &str, b: &str) {
    match ks.are_comembers(key, a.as_bytes(), b.as_bytes()) {
        Ok(Comembership::SameSet) => step(&format!("{} ~ {}: same set", a, b)),
        Ok(Comembership::DifferentSets) => step(&format!("{} ~ {}: different sets", a, b)),
        Err(e) => println!("  {} {}", "!".bright_red(), e),
    }
}

fn show_events(events: &[KeyspaceEvent]) {
    if events.is_empty() {
        println!("  {}", "(no pending events)".dimmed());
        return;
    }
    for event in events {
        match event {
            KeyspaceEvent::ElementsAdded { key, count } => {
                step(&format!("{}: +{} element(s)", key, count))
            }
            KeyspaceEvent::ElementsRemoved { key, count } => {
                step(&format!("{}: -{} element(s)", key, count))
            }
            KeyspaceEvent::SetsMerged { key } => step(&format!("{}: two sets merged", key)),
            KeyspaceEvent::KeyDeleted { key } => step(&format!("{}: key deleted", key)),
        }
    }
}

fn verdict(ok: bool) {
    if ok {
        println!(
            "\n  {} {}",
            "✓".bright_green().bold(),
            "ARCHIVE VERIFIED — the reload answers identically!"
                .bright_green()
                .bold()
        );
    } else {
        println!(
            "\n  {} {}",
            "✗".bright_red().bold(),
            "MISMATCH DETECTED — the reload disagrees!".bright_red().bold()
        );
    }
}

// ─── Demo ──────────────────────────────────────────────────────────────────

fn run_demo() {
    header("DEMO — Forests, Unions, and Re-Elected Representatives");

    section("Phase 1: Plant a grove");
    let mut ks = Keyspace::new();
    let added = ks.add("groves", ["ash", "birch", "cedar", "dogwood", "elm"]);
    step(&format!("groves: added {} singletons", added));
    show_key(&mut ks, "groves");

    section("Phase 2: Merge sets");
    union_step(&mut ks, "groves", "ash", "birch");
    union_step(&mut ks, "groves", "cedar", "dogwood");
    union_step(&mut ks, "groves", "ash", "dogwood");
    union_step(&mut ks, "groves", "birch", "cedar");
    show_key(&mut ks, "groves");

    section("Phase 3: Ask questions");
    same_step(&mut ks, "groves", "ash", "dogwood");
    same_step(&mut ks, "groves", "ash", "elm");
    let members = ks.members_of("groves", b"birch").unwrap();
    step(&format!("members of birch's set: {}", join_values(&members)));
    let mut rng = rand::thread_rng();
    if let Some(pick) = ks.random_element("groves", &mut rng) {
        step(&format!("random element: {}", String::from_utf8_lossy(&pick)));
    }

    section("Phase 4: Remove elements");
    let removed = ks.remove("groves", ["ash"]);
    step(&format!("removed {} element(s); the survivors stay together", removed));
    same_step(&mut ks, "groves", "birch", "dogwood");
    let removed = ks.remove("groves", ["elm"]);
    step(&format!("removed {} singleton(s); one whole set gone", removed));
    show_key(&mut ks, "groves");

    section("Phase 5: Drain the change feed");
    let events = ks.take_events();
    show_events(&events);
    step(&format!("dirty writes this session: {}", ks.dirty()));
}

// ─── Persist ───────────────────────────────────────────────────────────────

fn run_persist(path: &str) {
    header("PERSIST — Archive Round-Trip on Disk");

    section("Phase 1: Build a keyspace worth keeping");
    let mut ks = Keyspace::new();
    ks.add("groves", ["ash", "birch", "cedar", "dogwood"]);
    ks.add("herds", ["elk", "fallow", "gaur"]);
    ks.union("groves", b"ash", b"birch").unwrap();
    ks.union("groves", b"cedar", b"dogwood").unwrap();
    ks.union("herds", b"elk", b"fallow").unwrap();
    show_key(&mut ks, "groves");
    show_key(&mut ks, "herds");

    section("Phase 2: Seal and save");
    step(&format!("dirty writes before save: {}", ks.dirty()));
    ks.save_to_file(path).unwrap();
    step(&format!("saved to '{}'", path));
    step(&format!("dirty writes after save:  {}", ks.dirty()));

    let archive = Archive::load_from_file(path).unwrap();
    step(&format!(
        "archive: version {} | {} bytes | digest {}",
        archive.version,
        archive.size(),
        archive.digest.short()
    ));

    section("Phase 3: Reload and verify");
    let mut back = Keyspace::load_from_file(path).unwrap();
    let checks = [
        ("groves", "ash", "birch"),
        ("groves", "ash", "cedar"),
        ("groves", "cedar", "dogwood"),
        ("herds", "elk", "fallow"),
        ("herds", "elk", "gaur"),
    ];

    let mut ok = true;
    for (key, a, b) in checks {
        let want = ks.are_comembers(key, a.as_bytes(), b.as_bytes()).unwrap();
        let got = back.are_comembers(key, a.as_bytes(), b.as_bytes()).unwrap();
        if want == got {
            println!("  {} {}: {} ~ {} → {:?}", "=".bright_green(), key, a, b, got);
        } else {
            ok = false;
            println!(
                "  {} {}: {} ~ {} → {:?} became {:?}",
                "≠".bright_red(),
                key,
                a,
                b,
                want,
                got
            );
        }
    }
    verdict(ok);
}

// ─── Interactive REPL ──────────────────────────────────────────────────────

fn run_repl() {
    header("INTERACTIVE REPL — Coppice Keyspace");

    let mut ks = Keyspace::new();
    let mut rng = rand::thread_rng();

    println!();
    println!("  {}", "Commands:".bold().underline());
    println!(
        "    {} <key> <value...>        Add elements as singletons",
        "add".bright_cyan()
    );
    println!(
        "    {} <key> <value...>        Remove elements",
        "remove".bright_cyan()
    );
    println!(
        "    {} <key> <a> <b>           Merge the sets holding a and b",
        "union".bright_cyan()
    );
    println!(
        "    {} <key> <a> <b>            Are a and b in the same set?",
        "same".bright_cyan()
    );
    println!(
        "    {} <key> <value>         Materialize the set holding value",
        "members".bright_cyan()
    );
    println!(
        "    {} <key>                   Number of sets under key",
        "card".bright_cyan()
    );
    println!(
        "    {} <key>                  Number of elements under key",
        "count".bright_cyan()
    );
    println!(
        "    {} <key>                   Pick a random element",
        "rand".bright_cyan()
    );
    println!(
        "    {}                         List keys with their sizes",
        "keys".bright_cyan()
    );
    println!(
        "    {} <key>                   Box view of a key",
        "show".bright_cyan()
    );
    println!(
        "    {} <key>                    Delete a key outright",
        "del".bright_cyan()
    );
    println!(
        "    {} <path> | {} <path>     Archive to / restore from disk",
        "save".bright_cyan(),
        "load".bright_cyan()
    );
    println!(
        "    {}                       Drain pending change events",
        "events".bright_cyan()
    );
    println!(
        "    {}                        Dirty counter and snapshot policy",
        "dirty".bright_cyan()
    );
    println!(
        "    {}                         Exit",
        "quit".bright_cyan()
    );
    println!();

    loop {
        print!("{}", "coppice> ".bright_cyan().bold());
        io::stdout().flush().unwrap();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() || input.is_empty() {
            break;
        }
        let parts: Vec<&str> = input.trim().split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0] {
            "add" | "a" => {
                if parts.len() < 3 {
                    println!("  {} Usage: add <key> <value...>", "!".bright_red());
                    continue;
                }
                let added = ks.add(parts[1], &parts[2..]);
                step(&format!("{}: +{} element(s)", parts[1], added));
            }

            "remove" | "rem" => {
                if parts.len() < 3 {
                    println!("  {} Usage: remove <key> <value...>", "!".bright_red());
                    continue;
                }
                let removed = ks.remove(parts[1], &parts[2..]);
                step(&format!("{}: -{} element(s)", parts[1], removed));
            }

            "union" | "u" => {
                if parts.len() < 4 {
                    println!("  {} Usage: union <key> <a> <b>", "!".bright_red());
                    continue;
                }
                union_step(&mut ks, parts[1], parts[2], parts[3]);
            }

            "same" | "comembers" => {
                if parts.len() < 4 {
                    println!("  {} Usage: same <key> <a> <b>", "!".bright_red());
                    continue;
                }
                same_step(&mut ks, parts[1], parts[2], parts[3]);
            }

            "members" | "m" => {
                if parts.len() < 3 {
                    println!("  {} Usage: members <key> <value>", "!".bright_red());
                    continue;
                }
                match ks.members_of(parts[1], parts[2].as_bytes()) {
                    Ok(members) => step(&join_values(&members)),
                    Err(e) => println!("  {} {}", "!".bright_red(), e),
                }
            }

            "card" => {
                if parts.len() < 2 {
                    println!("  {} Usage: card <key>", "!".bright_red());
                    continue;
                }
                step(&format!("{}: {} set(s)", parts[1], ks.cardinality(parts[1])));
            }

            "count" | "size" => {
                if parts.len() < 2 {
                    println!("  {} Usage: count <key>", "!".bright_red());
                    continue;
                }
                step(&format!(
                    "{}: {} element(s)",
                    parts[1],
                    ks.element_count(parts[1])
                ));
            }

            "rand" => {
                if parts.len() < 2 {
                    println!("  {} Usage: rand <key>", "!".bright_red());
                    continue;
                }
                match ks.random_element(parts[1], &mut rng) {
                    Some(value) => step(&String::from_utf8_lossy(&value)),
                    None => println!("  {}", "(empty key)".dimmed()),
                }
            }

            "keys" | "ls" => {
                let names: Vec<String> = ks.keys().map(str::to_string).collect();
                if names.is_empty() {
                    println!("  {}", "(no keys)".dimmed());
                } else {
                    for name in &names {
                        step(&format!(
                            "{} ({} elements, {} sets)",
                            name,
                            ks.element_count(name),
                            ks.cardinality(name)
                        ));
                    }
                }
            }

            "show" | "s" => {
                if parts.len() < 2 {
                    println!("  {} Usage: show <key>", "!".bright_red());
                    continue;
                }
                show_key(&mut ks, parts[1]);
            }

            "del" => {
                if parts.len() < 2 {
                    println!("  {} Usage: del <key>", "!".bright_red());
                    continue;
                }
                if ks.delete_key(parts[1]) {
                    step(&format!("deleted '{}'", parts[1]));
                } else {
                    println!("  {} Unknown key '{}'", "!".bright_yellow(), parts[1]);
                }
            }

            "save" => {
                if parts.len() < 2 {
                    println!("  {} Usage: save <path>", "!".bright_red());
                    continue;
                }
                match ks.save_to_file(parts[1]) {
                    Ok(()) => step(&format!("saved to '{}'", parts[1])),
                    Err(e) => println!("  {} {}", "!".bright_red(), e),
                }
            }

            "load" => {
                if parts.len() < 2 {
                    println!("  {} Usage: load <path>", "!".bright_red());
                    continue;
                }
                match Keyspace::load_from_file(parts[1]) {
                    Ok(loaded) => {
                        ks = loaded;
                        step(&format!(
                            "loaded '{}' ({} key(s))",
                            parts[1],
                            ks.key_count()
                        ));
                    }
                    Err(e) => println!("  {} {}", "!".bright_red(), e),
                }
            }

            "events" => {
                let events = ks.take_events();
                show_events(&events);
            }

            "dirty" => {
                step(&format!(
                    "{} effective write(s) since last save (threshold {})",
                    ks.dirty(),
                    ks.policy().dirty_threshold
                ));
                if ks.should_snapshot() {
                    println!("  {} snapshot due", "▸".bright_yellow());
                }
            }

            "quit" | "exit" | "q" => {
                println!("  {}", "Goodbye!".dimmed());
                break;
            }

            "help" | "h" | "?" => {
                println!("  add <k> <v...> | remove <k> <v...> | union <k> <a> <b>");
                println!("  same <k> <a> <b> | members <k> <v> | card <k> | count <k>");
                println!("  rand <k> | keys | show <k> | del <k>");
                println!("  save <path> | load <path> | events | dirty | quit");
            }

            other => {
                println!(
                    "  {} Unknown command '{}' — type 'help'",
                    "?".bright_yellow(),
                    other
                );
            }
        }
    }
}

// ─── Entry point ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo => run_demo(),
        Commands::Persist { path } => run_persist(&path),
        Commands::Repl => run_repl(),
    }
}
