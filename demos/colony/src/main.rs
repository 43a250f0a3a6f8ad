//! colony — small driver for the rust_bgu fetch scheduler.
//!
//! Loads a hand-written storage scenario from embedded CSV, scatters extra
//! random debris around the map, and runs a fixed number of cycles with a
//! handful of duplicant agents.  Between cycles some debris drifts, so the
//! refresh stage and the deferred drain have real work to do.
//!
//! ```text
//! cargo run -p colony --release -- [config.json]
//! RUST_LOG=bg_sched=debug cargo run -p colony
//! ```
//!
//! The optional JSON file holds a `SchedulerConfig`; missing fields keep
//! their defaults.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bg_core::{AgentId, CandidateId, CategoryId, Cell, Priority, SchedulerConfig, TagSet};
use bg_fetch::{Agent, Fetch, Pickup};
use bg_sched::{BrainHooks, CycleOutcome, SchedulerBuilder};
use bg_world::{Candidate, ManhattanOracle, load_candidates_reader, load_errands_reader};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:            u64   = 42;
const AGENT_COUNT:     u32   = 12;
const DEBRIS_COUNT:    u32   = 400;
const CYCLE_COUNT:     usize = 25;
const DRIFT_PER_CYCLE: usize = 16;
const FIRST_DEBRIS_ID: u32   = 1_000;

// ── Scenario CSV ──────────────────────────────────────────────────────────────

// Categories: 1 = food, 2 = ore, 3 = metal.
// Tag bits:   0 = edible, 1 = raw, 2 = refined.
const CANDIDATES_CSV: &str = "\
id,category,cell_x,cell_y,priority,tags,shape,automation_excluded\n\
0,1,10,12,2,0,standard,false\n\
1,1,14,40,1,0,standard,false\n\
2,2,60,60,1,1,standard,false\n\
3,2,62,58,1,1,single,true\n\
4,3,120,200,3,2,standard,false\n\
5,3,30,30,1,1|2,single,false\n\
";

const ERRANDS_CSV: &str = "\
id,category,dest_x,dest_y,priority,tags\n\
0,1,20,20,5,0\n\
1,2,64,64,2,\n\
2,3,100,180,3,2\n\
3,2,10,300,1,1\n\
";

// ── Hooks ─────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ColonyHooks {
    fetches:   usize,
    pickups:   usize,
    inline:    usize,
    committed: usize,
}

impl BrainHooks for ColonyHooks {
    fn on_committed(&mut self, _agent: &Agent, fetches: &[Fetch], pickups: &[Pickup]) {
        self.fetches += fetches.len();
        self.pickups += pickups.len();
    }

    fn update_inline(&mut self, _agent: &Agent) {
        self.inline += 1;
    }

    fn on_cycle_end(&mut self, outcome: &CycleOutcome) {
        if outcome.is_committed() {
            self.committed += 1;
        }
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn load_config(path: Option<&str>) -> Result<SchedulerConfig> {
    let Some(path) = path else {
        return Ok(SchedulerConfig::default());
    };
    let text = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("reading config {path}"))?;
    let config: SchedulerConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))?;
    Ok(config)
}

fn random_cell(rng: &mut SmallRng, config: &SchedulerConfig) -> Cell {
    Cell::new(
        rng.gen_range(0..config.bounds.width as i32),
        rng.gen_range(0..config.bounds.height as i32),
    )
}

fn make_agents(rng: &mut SmallRng, config: &SchedulerConfig) -> Vec<Agent> {
    (0..AGENT_COUNT)
        .map(|i| {
            let mut agent = Agent::new(AgentId(i), random_cell(rng, config));
            // Every fourth agent is a sweeper robot; agent 0 is the player's
            // favourite.
            if i % 4 == 3 {
                agent = agent.automated();
            }
            if i == 0 {
                agent = agent.first_priority();
            }
            if i % 3 == 1 {
                agent = agent.with_interests(TagSet::single(1));
            }
            agent
        })
        .collect()
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let arg    = std::env::args().nth(1);
    let config = load_config(arg.as_deref())?;
    info!(
        timeout_ms = config.barrier_timeout_ms,
        strategy   = %config.commit_strategy,
        threads    = ?config.num_threads,
        "colony starting"
    );

    // 1. Scenario: CSV core plus random debris.
    let mut rng   = SmallRng::seed_from_u64(SEED);
    let mut index = load_candidates_reader(Cursor::new(CANDIDATES_CSV))?;
    let errands   = load_errands_reader(Cursor::new(ERRANDS_CSV))?;
    for i in 0..DEBRIS_COUNT {
        let category = CategoryId(rng.gen_range(1..=3));
        let tags     = TagSet::single(rng.gen_range(0..3));
        let debris   = Candidate::new(CandidateId(FIRST_DEBRIS_ID + i), category, random_cell(&mut rng, &config))
            .with_priority(Priority(rng.gen_range(0..3)))
            .with_tags(tags);
        index.insert(debris)?;
    }
    info!(candidates = index.len(), errands = errands.len(), "scenario loaded");

    // 2. Scheduler.
    let blocked: Vec<Cell> = (0..20).map(|y| Cell::new(32, y)).collect();
    let mut sched = SchedulerBuilder::new(config.clone())
        .candidates(index)
        .errands(errands)
        .oracle(Arc::new(ManhattanOracle::new(1).with_blocked(blocked)))
        .build()?;
    let agents = make_agents(&mut rng, &config);

    // 3. Cycles.
    let mut hooks = ColonyHooks::default();
    let t0 = Instant::now();
    for cycle in 0..CYCLE_COUNT {
        let outcome = sched.run_cycle(agents.iter().cloned(), &mut hooks)?;
        info!(cycle, ?outcome, "cycle finished");

        let world = sched.world_mut()?;
        if let Some(index) = world.candidates_mut() {
            for _ in 0..DRIFT_PER_CYCLE {
                let id = CandidateId(FIRST_DEBRIS_ID + rng.gen_range(0..DEBRIS_COUNT));
                let to = random_cell(&mut rng, &config);
                index.move_to(id, to)?;
            }
        }
    }
    let elapsed = t0.elapsed();

    // 4. Summary.
    let stats = sched.stats();
    info!(
        elapsed_ms       = elapsed.as_millis() as u64,
        committed        = stats.committed,
        timed_out        = stats.timed_out,
        inline           = stats.inline,
        inline_offsets   = stats.inline_offsets,
        deferred_drained = stats.deferred_drained,
        "run complete"
    );
    println!();
    println!("cycles committed : {}", hooks.committed);
    println!("pickups listed   : {}", hooks.pickups);
    println!("fetches listed   : {}", hooks.fetches);
    println!("inline updates   : {}", hooks.inline);
    println!();

    println!("{:<8} {:<8} {:<10} {:<12}", "Agent", "Fetches", "Pickups", "Best fetch");
    println!("{}", "-".repeat(40));
    for agent in &agents {
        let fetches = sched.targets().fetches_for(agent.id);
        let best = fetches
            .first()
            .map(|f| format!("{} @ {}", f.errand, f.destination))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<8} {:<8} {:<10} {:<12}",
            agent.id.0,
            fetches.len(),
            sched.targets().pickups_for(agent.id).len(),
            best,
        );
    }

    let near = sched.partition().within(Cell::new(20, 20), 8);
    println!();
    println!("candidates within 8 cells of (20, 20): {}", near.len());

    Ok(())
}
