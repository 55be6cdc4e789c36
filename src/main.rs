use clap::Parser;
use club_ladder::{
    args::{Args, Command},
    config::LadderConfig,
    database::DbClient,
    ladder::Ladder,
    model::structures::{ladder_match::MatchSummary, player::Player, rank_change::RankChange},
    utils::tracing_utils::init_tracing
};
use serde::Serialize;
use std::{error::Error, process::ExitCode, sync::Arc};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok(); // Load environment variables from .env file

    let args = Args::parse();
    init_tracing(&args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = LadderConfig::from_args(&args);
    let client = Arc::new(DbClient::connect(&args.connection_string).await?);

    info!(
        "Connected, commit strategy {}, compensation {}",
        config.commit_strategy,
        if config.compensate_on_failure { "on" } else { "off" }
    );

    let ladder = Ladder::new(Arc::clone(&client), client, config);
    let json = args.json;

    match args.command {
        Command::InitDb => ladder.ladder_store().init_schema().await?,
        Command::Standings => print_players(&ladder.standings().await?, json)?,
        Command::AddPlayer { name } => print_players(&[ladder.add_player(&name).await?], json)?,
        Command::Rename { id, name } => print_players(&[ladder.rename_player(id, &name).await?], json)?,
        Command::Remove { id } => print_changes(&ladder.remove_player(id).await?, json)?,
        Command::Record {
            winner,
            loser,
            winner_score,
            loser_score
        } => {
            let submission = ladder.submit_match(winner, loser, winner_score, loser_score).await?;
            if json {
                print_json(&submission)?;
            } else {
                println!("Recorded match {}", submission.match_.id);
                print_changes(&submission.resolution.changes, false)?;
            }
        }
        Command::History { limit } => print_history(&ladder.history(limit).await?, json)?,
        Command::Challengeable { id } => print_players(&ladder.challengeable(id).await?, json)?,
        Command::Reorder { assignments } => print_changes(&ladder.reorder(&assignments).await?, json)?,
        Command::Seed => print_players(&ladder.seed_sample_players().await?, json)?,
        Command::Verify => {
            let integrity = ladder.check_integrity().await?;
            if json {
                print_json(&integrity)?;
            } else if integrity.is_dense() {
                println!("Ladder is consistent: ranks 1..={}", integrity.player_count);
            } else {
                println!("Ladder is inconsistent: {:?}", integrity);
            }

            if !integrity.is_dense() {
                return Err("rank integrity check failed".into());
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_players(players: &[Player], json: bool) -> Result<(), serde_json::Error> {
    if json {
        return print_json(players);
    }

    for p in players {
        println!("{:>4}  {:<30} {}", p.rank, p.name, p.id);
    }

    Ok(())
}

fn print_changes(changes: &[RankChange], json: bool) -> Result<(), serde_json::Error> {
    if json {
        return print_json(changes);
    }

    if changes.is_empty() {
        println!("No rank changes");
    }
    for c in changes {
        println!("{}  {} -> {}", c.player_id, c.old_rank, c.new_rank);
    }

    Ok(())
}

fn print_history(history: &[MatchSummary], json: bool) -> Result<(), serde_json::Error> {
    if json {
        return print_json(history);
    }

    for entry in history {
        let m = &entry.match_;
        println!(
            "{}  {} beat {} {}-{}",
            m.created_at.format("%Y-%m-%d %H:%M"),
            entry.winner_name.as_deref().unwrap_or("(removed)"),
            entry.loser_name.as_deref().unwrap_or("(removed)"),
            m.winner_score,
            m.loser_score
        );
    }

    Ok(())
}
