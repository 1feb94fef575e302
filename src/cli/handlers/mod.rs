use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::{config_io, task_io};
use crate::model::config::BoardConfig;
use crate::model::filter::FilterCriteria;
use crate::model::task::{Priority, TaskStatus};
use crate::ops::board::Board;
use crate::ops::sort::board_order;

/// Title width for `filter` text output
const LIST_TITLE_WIDTH: usize = 48;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    let json = cli.json;
    let config = config_io::load_config(cli.config.as_deref().map(Path::new))?;
    let file = PathBuf::from(&cli.file);

    match cli.command {
        Commands::Filter(args) => cmd_filter(&file, &config, args, json),
        Commands::Board(args) => cmd_board(&file, &config, args, json),
        Commands::Move(args) => cmd_move(&file, &config, args, json),
        Commands::Bench(args) => cmd_bench(&file, &config, args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_board(file: &Path, config: &BoardConfig) -> Result<Board, Box<dyn Error>> {
    let tasks = task_io::load_tasks(file)?;
    Ok(Board::new(config, tasks))
}

/// Parse `YYYY-MM-DD` or RFC 3339. A bare date is midnight UTC, or the last
/// second of the day when `end_of_day` is set.
fn parse_date(s: &str, end_of_day: bool) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}' (expected YYYY-MM-DD or RFC 3339)", s))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| format!("invalid date '{}'", s))
}

fn build_criteria(args: &CriteriaArgs, status: Option<&str>) -> Result<FilterCriteria, Box<dyn Error>> {
    let mut criteria = FilterCriteria::new();
    criteria.search = args.search.clone();
    if let Some(p) = &args.priority {
        criteria.priority = Some(p.parse::<Priority>()?);
    }
    for tag in &args.tags {
        criteria.tags.insert(tag.trim_start_matches('#').to_string());
    }
    if let Some(s) = status {
        criteria.status = Some(s.parse::<TaskStatus>()?);
    }
    if let Some(from) = &args.due_from {
        criteria.due_from = Some(parse_date(from, false)?);
    }
    if let Some(to) = &args.due_to {
        criteria.due_to = Some(parse_date(to, true)?);
    }
    if let (Some(from), Some(to)) = (criteria.due_from, criteria.due_to) {
        if from > to {
            return Err("--due-from is after --due-to".into());
        }
    }
    Ok(criteria)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_filter(
    file: &Path,
    config: &BoardConfig,
    args: FilterArgs,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let criteria = build_criteria(&args.criteria, args.status.as_deref())?;
    let mut board = load_board(file, config)?;
    let mut tasks = board.view(&criteria).to_vec();
    if args.sorted {
        board_order(&mut tasks);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else {
        print!("{}", format_task_list(&tasks, LIST_TITLE_WIDTH));
    }
    Ok(())
}

fn cmd_board(
    file: &Path,
    config: &BoardConfig,
    args: BoardArgs,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let criteria = build_criteria(&args.criteria, None)?;
    let mut board = load_board(file, config)?;
    let columns = board.columns(&criteria);

    if json {
        let out: Vec<ColumnJson> = columns
            .iter()
            .map(|(status, tasks)| ColumnJson {
                status: *status,
                count: tasks.len(),
                tasks,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let rendered: Vec<String> = columns
            .iter()
            .map(|(status, tasks)| format_column(*status, tasks, args.width))
            .collect();
        print!("{}", rendered.join("\n"));
    }
    Ok(())
}

fn cmd_move(
    file: &Path,
    config: &BoardConfig,
    args: MoveArgs,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let status: TaskStatus = args.status.parse()?;
    let mut board = load_board(file, config)?;
    board.move_task(&args.id, status)?;
    task_io::save_tasks(file, board.tasks())?;

    if json {
        if let Some(task) = board.get(&args.id) {
            println!("{}", serde_json::to_string_pretty(task)?);
        }
    } else {
        println!("moved {} to {}", args.id, status);
    }
    Ok(())
}

fn cmd_bench(
    file: &Path,
    config: &BoardConfig,
    args: BenchArgs,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let criteria = build_criteria(&args.criteria, None)?;
    let mut board = load_board(file, config)?;
    for _ in 0..args.iterations {
        board.columns(&criteria);
    }

    let stats = board.cache_stats();
    let summaries = board.perf().summaries();
    if json {
        let out = BenchJson {
            iterations: args.iterations,
            cache: stats,
            hit_rate: stats.hit_rate(),
            ops: summaries.iter().map(OpSummaryJson::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", format_bench(args.iterations, &stats, &summaries));
    }
    Ok(())
}
