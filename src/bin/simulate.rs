use chrono::{SecondsFormat, Utc};
use clap::Parser;
use deadmans_party_core::config::GameConfig;
use deadmans_party_core::constants::EXECUTION_ID;
use deadmans_party_core::engine::GameEngine;
use deadmans_party_core::error::EndDayError;
use deadmans_party_core::rng::Rng;
use deadmans_party_core::rooms::{Container, StandardRoom};
use deadmans_party_core::types::{GameOutcome, LossReason, RuntimeEvent, Snapshot};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SETTLE_ATTEMPTS: usize = 8;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    games: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    days: Option<i32>,
    #[arg(long)]
    characters: Option<usize>,
    #[arg(long)]
    murderers: Option<usize>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    accuse_chance: Option<f32>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seed: u32,
    #[serde(rename = "accuseChance")]
    accuse_chance: f32,
    config: GameConfig,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    outcome: GameOutcome,
    #[serde(rename = "daysPlayed")]
    days_played: u32,
    #[serde(rename = "daysRemaining")]
    days_remaining: i32,
    murderers: usize,
    #[serde(rename = "murderersCaught")]
    murderers_caught: usize,
    victims: usize,
    executions: usize,
    transfers: usize,
    #[serde(rename = "rejectedTransfers")]
    rejected_transfers: usize,
    #[serde(rename = "quietNights")]
    quiet_nights: usize,
    investigations: usize,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    day: u32,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageDays")]
    average_days: f32,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    timestamp: String,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    day: Option<u32>,
    details: Value,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let started_at = now_iso();
    let scenarios = match resolve_scenarios(&cli) {
        Ok(scenarios) => scenarios,
        Err(error) => {
            emit_log(
                "error",
                "config_invalid",
                cli.match_id.as_deref().unwrap_or("sim"),
                None,
                None,
                None,
                json!({ "error": error }),
            );
            std::process::exit(2);
        }
    };
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, Utc::now().timestamp_millis()));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_days = 0u64;
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "days": scenario.config.days,
                "characters": scenario.config.character_count,
                "murderers": scenario.config.murderer_count,
                "rooms": scenario.config.rooms.len(),
                "accuseChance": scenario.accuse_chance,
            }),
        );
        let scenario_run = match run_scenario(&scenario) {
            Ok(run) => run,
            Err(error) => {
                emit_log(
                    "error",
                    "scenario_setup_failed",
                    &match_id,
                    Some(&scenario.name),
                    Some(scenario.seed),
                    None,
                    json!({ "error": error }),
                );
                std::process::exit(2);
            }
        };

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.day),
                json!({
                    "message": anomaly.message,
                }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        total_days += u64::from(scenario_run.result.days_played);
        *outcome_counts
            .entry(outcome_key(scenario_run.result.outcome))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.result.days_played),
            json!({
                "outcome": scenario_run.result.outcome,
                "victims": scenario_run.result.victims,
                "murderersCaught": scenario_run.result.murderers_caught,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&scenario_run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => emit_log(
                "error",
                "result_serialize_failed",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                None,
                json!({ "error": error.to_string() }),
            ),
        }
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        started_at,
        now_iso(),
        scenario_results,
        outcome_counts,
        total_anomalies,
        total_days,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageDays": summary.average_days,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[derive(Debug, Default)]
struct Tally {
    transfers: usize,
    rejected_transfers: usize,
    quiet_nights: usize,
    investigations: usize,
    executions: usize,
    murderers_caught: usize,
}

impl Tally {
    fn count_events(&mut self, events: &[RuntimeEvent]) {
        for event in events {
            match event {
                RuntimeEvent::EntityMoved { .. } => self.transfers += 1,
                RuntimeEvent::TransferRejected { .. } => self.rejected_transfers += 1,
                RuntimeEvent::QuietNight => self.quiet_nights += 1,
                RuntimeEvent::Executed { murderer, .. } => {
                    self.executions += 1;
                    if *murderer {
                        self.murderers_caught += 1;
                    }
                }
                _ => {}
            }
        }
    }
}

fn run_scenario(scenario: &Scenario) -> Result<ScenarioRunResult, String> {
    let mut engine =
        GameEngine::new(scenario.config.clone(), scenario.seed).map_err(|err| err.to_string())?;
    let mut player = Rng::new(scenario.seed ^ 0x9e37_79b9);
    let mut tally = Tally::default();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let day_limit = u32::try_from(scenario.config.days.max(0)).unwrap_or(0) + 2;

    while !engine.is_ended() {
        let day = engine.day();
        investigate_randomly(&mut engine, &mut player, &mut tally);
        if player.bool(scenario.accuse_chance) {
            accuse_someone(&mut engine, &mut player);
        }
        if let Err(error) = settle_board(&mut engine) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                day,
                format!("board could not be settled: {error}"),
            );
            break;
        }
        if let Err(error) = engine.end_day() {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                day,
                format!("settled board refused to end the day: {error}"),
            );
            break;
        }

        let snapshot = engine.build_snapshot(true);
        tally.count_events(&snapshot.events);
        let mut messages = engine.invariant_violations();
        messages.extend(collect_snapshot_anomalies(&snapshot, scenario.config.days));
        for message in messages {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.day,
                message,
            );
        }

        if snapshot.day > day_limit {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.day,
                "day safety limit exceeded".to_string(),
            );
            break;
        }
    }

    let summary = engine.build_summary();
    Ok(ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            outcome: summary.outcome,
            days_played: summary.days_played,
            days_remaining: engine.days_remaining(),
            murderers: summary.murderers.len(),
            murderers_caught: tally.murderers_caught,
            victims: summary.victims.len(),
            executions: tally.executions,
            transfers: tally.transfers,
            rejected_transfers: tally.rejected_transfers,
            quiet_nights: tally.quiet_nights,
            investigations: tally.investigations,
            anomalies,
        },
        anomaly_records,
    })
}

fn investigate_randomly(engine: &mut GameEngine, player: &mut Rng, tally: &mut Tally) {
    let looks = player.int(0, 2);
    for _ in 0..looks {
        let number = player.pick_index(engine.rooms().len()) + 1;
        if engine.investigate(number).is_ok() {
            tally.investigations += 1;
        }
    }
}

fn accuse_someone(engine: &mut GameEngine, player: &mut Rng) {
    let crowded: Vec<usize> = engine
        .rooms()
        .iter()
        .filter(|room| room.len() >= 3)
        .map(StandardRoom::number)
        .collect();
    if crowded.is_empty() {
        return;
    }
    let number = crowded[player.pick_index(crowded.len())];
    let suspects: Vec<_> = engine
        .room(number)
        .map(|room| {
            room.occupants()
                .iter()
                .copied()
                .filter(|&id| engine.entity(id).map(|e| e.is_alive()).unwrap_or(false))
                .collect()
        })
        .unwrap_or_default();
    if suspects.is_empty() {
        return;
    }
    let accused = suspects[player.pick_index(suspects.len())];
    let _ = engine.transfer(accused, EXECUTION_ID);
}

fn settle_board(engine: &mut GameEngine) -> Result<(), EndDayError> {
    let mut last_error = None;
    for _ in 0..SETTLE_ATTEMPTS {
        match engine.can_end_day() {
            Ok(()) => return Ok(()),
            Err(EndDayError::LobbyNotEmpty { count }) => {
                for id in engine.lobby().occupants().to_vec() {
                    if let Some(number) = open_room(engine.rooms(), None) {
                        let _ = engine.transfer(id, number as i32);
                    }
                }
                last_error = Some(EndDayError::LobbyNotEmpty { count });
            }
            Err(EndDayError::LoneOccupant { room }) => {
                let loner = engine
                    .room(room)
                    .and_then(|r| r.occupants().first().copied());
                match (loner, open_room(engine.rooms(), Some(room))) {
                    (Some(id), Some(number)) => {
                        let _ = engine.transfer(id, number as i32);
                    }
                    _ => return Err(EndDayError::LoneOccupant { room }),
                }
                last_error = Some(EndDayError::LoneOccupant { room });
            }
            Err(error) => return Err(error),
        }
    }
    match last_error {
        Some(error) => Err(error),
        None => engine.can_end_day(),
    }
}

fn open_room(rooms: &[StandardRoom], skip: Option<usize>) -> Option<usize> {
    let candidates = || {
        rooms
            .iter()
            .filter(move |room| Some(room.number()) != skip && !room.is_full())
    };
    candidates()
        .find(|room| !room.is_empty())
        .or_else(|| if skip.is_some() { None } else { candidates().next() })
        .map(StandardRoom::number)
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, days: i32) -> Vec<String> {
    let mut anomalies = Vec::new();
    for room in &snapshot.rooms {
        if room.occupants.len() > room.capacity {
            anomalies.push(format!(
                "room {} over capacity: {}/{}",
                room.number,
                room.occupants.len(),
                room.capacity
            ));
        }
    }
    if snapshot.execution.occupants.len() > 1 {
        anomalies.push("execution room holds more than one suspect".to_string());
    }
    if !snapshot.lobby.occupants.is_empty() {
        anomalies.push(format!(
            "lobby not empty after day end: {}",
            snapshot.lobby.occupants.len()
        ));
    }
    let expected_remaining = days - snapshot.day as i32;
    if snapshot.days_remaining != expected_remaining {
        anomalies.push(format!(
            "day counter drifted: {} remaining on day {}, expected {expected_remaining}",
            snapshot.days_remaining, snapshot.day
        ));
    }
    if snapshot.outcome == GameOutcome::Won && snapshot.murderers_remaining != 0 {
        anomalies.push(format!(
            "won with {} murderers at large",
            snapshot.murderers_remaining
        ));
    }
    if !snapshot.outcome.is_terminal() && snapshot.murderers_remaining == 0 {
        anomalies.push("no murderers left but the game goes on".to_string());
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Result<Vec<Scenario>, String> {
    let seed = normalize_seed(
        cli.seed
            .unwrap_or_else(|| Utc::now().timestamp_millis().unsigned_abs()),
    );
    let accuse_chance = cli.accuse_chance.unwrap_or(0.35).clamp(0.0, 1.0);

    let mut config = match cli.config.as_ref() {
        Some(path) => GameConfig::from_json_file(path).map_err(|err| err.to_string())?,
        None => GameConfig::default(),
    };
    if let Some(days) = cli.days {
        config.days = days.clamp(0, 30);
    }
    if let Some(characters) = cli.characters {
        config.character_count = characters;
    }
    if let Some(murderers) = cli.murderers {
        config.murderer_count = murderers;
    }
    config.validate().map_err(|err| err.to_string())?;

    let games = if cli.single {
        1
    } else {
        cli.games.unwrap_or(3).clamp(1, 1_000)
    };
    Ok((0..games)
        .map(|idx| Scenario {
            name: if cli.single {
                "single".to_string()
            } else {
                format!("party-{}", idx + 1)
            },
            seed: normalize_seed(u64::from(seed) + idx as u64),
            accuse_chance,
            config: config.clone(),
        })
        .collect())
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    day: u32,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        day,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at: String,
    finished_at: String,
    scenarios: Vec<ScenarioResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
    total_days: u64,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_days = if scenario_count == 0 {
        0.0
    } else {
        total_days as f32 / scenario_count as f32
    };
    RunSummary {
        match_id,
        started_at,
        finished_at,
        scenario_count,
        anomaly_count,
        average_days,
        outcome_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    day: Option<u32>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp: now_iso(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        day,
        details,
    };
    if let Ok(text) = serde_json::to_string(&log_line) {
        eprintln!("{text}");
    }
}

fn outcome_key(outcome: GameOutcome) -> String {
    match outcome {
        GameOutcome::InProgress => "in_progress",
        GameOutcome::Won => "won",
        GameOutcome::Lost {
            loss: LossReason::InnocentExecuted { .. },
        } => "innocent_executed",
        GameOutcome::Lost {
            loss: LossReason::MurdererEscaped,
        } => "murderer_escaped",
    }
    .to_string()
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
