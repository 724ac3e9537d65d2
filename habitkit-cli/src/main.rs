//! habitkit - habit tracker with streak lifecycles
//!
//! Track daily habits from the command line: check in, keep streaks alive,
//! and watch lifetime stats accumulate.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use habitkit_core::streak;
use habitkit_core::{CheckInRequest, Config, Database, Habit, HabitUpdate, NewHabit};

#[derive(Parser, Debug)]
#[command(name = "habitkit")]
#[command(about = "Habit tracker with streak lifecycles")]
#[command(version)]
struct Args {
    /// User id to act as (default: `defaults.user` from config)
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new habit
    Add {
        /// Habit title
        title: String,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,

        /// Icon name or emoji
        #[arg(long)]
        icon: Option<String>,

        /// Display colour
        #[arg(long)]
        colour: Option<String>,
    },

    /// List habits, newest first
    List,

    /// Show one habit
    Show {
        /// Habit id
        id: String,
    },

    /// Edit a habit's descriptive fields
    Edit {
        /// Habit id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        icon: Option<String>,

        #[arg(long)]
        colour: Option<String>,
    },

    /// Delete a habit and its check-in history
    Rm {
        /// Habit id
        id: String,
    },

    /// Check in for a habit
    Checkin {
        /// Habit id
        id: String,

        /// Calendar date of the check-in, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Proof image URL to attach
        #[arg(long)]
        image: Option<String>,
    },

    /// Show a habit's check-in history, newest first
    History {
        /// Habit id
        id: String,
    },

    /// Attach or replace the image on an existing check-in
    Attach {
        /// Habit id
        id: String,

        /// Calendar date of the check-in, YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// Image URL
        #[arg(long)]
        image: String,
    },

    /// Show per-user stats
    Stats {
        /// Export format (json)
        #[arg(long)]
        export: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = habitkit_core::logging::init(&config.logging).ok();

    let db = Database::open(&Config::database_path()).context("failed to open database")?;
    db.migrate().context("failed to run migrations")?;

    let user = args
        .user
        .clone()
        .unwrap_or_else(|| config.defaults.user.clone());

    match args.command {
        Command::Add {
            title,
            description,
            icon,
            colour,
        } => {
            let habit = db.create_habit(&NewHabit {
                user_id: user,
                title,
                description,
                icon,
                colour,
            })?;
            println!("Created habit {} ({})", habit.title, habit.id);
        }

        Command::List => {
            let habits = streak::list_habits(&db, &user)?;
            if habits.is_empty() {
                println!("No habits yet. Add one with `habitkit add <title>`.");
            } else {
                for habit in &habits {
                    print_habit_line(habit);
                }
            }
        }

        Command::Show { id } => {
            let habit = streak::get_habit(&db, &user, &id)?;
            print_habit(&habit);
        }

        Command::Edit {
            id,
            title,
            description,
            icon,
            colour,
        } => {
            let update = HabitUpdate {
                title,
                description,
                icon,
                colour,
            };
            if update.is_empty() {
                anyhow::bail!("Nothing to change. Pass at least one of --title, --description, --icon, --colour");
            }
            let habit = db.update_habit(&id, &user, &update)?;
            println!("Updated habit {} ({})", habit.title, habit.id);
        }

        Command::Rm { id } => {
            db.delete_habit(&id, &user)?;
            println!("Deleted habit {}", id);
        }

        Command::Checkin { id, date, image } => {
            let local_date =
                date.unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string());
            let habit = streak::check_in(
                &db,
                &CheckInRequest {
                    habit_id: id,
                    user_id: user,
                    local_date,
                    image_url: image,
                },
            )?;
            match habit.streak {
                0 => println!(
                    "Checked in to {}. The streak lapsed; check in again tomorrow to restart it.",
                    habit.title
                ),
                1 => println!("Checked in to {}. Streak started!", habit.title),
                n => println!("Checked in to {}. Streak: {} days", habit.title, n),
            }
        }

        Command::History { id } => {
            // Resolve through the engine first so ownership errors read the same
            // as everywhere else
            let habit = streak::get_habit(&db, &user, &id)?;
            let entries = db.list_check_ins(&habit.id, &user)?;
            if entries.is_empty() {
                println!("No check-ins yet for {}", habit.title);
            } else {
                println!("{} - {} check-in(s)", habit.title, entries.len());
                for entry in &entries {
                    match entry.image_url.as_deref() {
                        Some(url) => println!("  {}  {}", entry.check_in_date, url),
                        None => println!("  {}", entry.check_in_date),
                    }
                }
            }
        }

        Command::Attach { id, date, image } => {
            let entry = streak::attach_check_in_image(&db, &user, &id, &date, &image)?;
            println!("Attached image to check-in on {}", entry.check_in_date);
        }

        Command::Stats { export } => {
            let summary = streak::stats(&db, &user)?;
            match export.as_deref() {
                Some("json") => {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
                Some(other) => anyhow::bail!("Unknown export format: {}. Use 'json'", other),
                None => {
                    println!("Active habits:    {}", summary.active_habits);
                    println!("Best streak:      {}", summary.best_streak);
                    println!("Total check-ins:  {}", summary.total_check_ins);
                }
            }
        }
    }

    Ok(())
}

fn print_habit_line(habit: &Habit) {
    let icon = habit.icon.as_deref().unwrap_or("-");
    println!(
        "{}  {:<20} streak: {:<4} id: {}",
        icon, habit.title, habit.streak, habit.id
    );
}

fn print_habit(habit: &Habit) {
    println!("{}", habit.title);
    if let Some(description) = &habit.description {
        println!("  {}", description);
    }
    println!("  id:            {}", habit.id);
    println!("  streak:        {}", habit.streak);
    match &habit.last_check_in {
        Some(ts) => println!("  last check-in: {}", ts.with_timezone(&Local).format("%Y-%m-%d %H:%M")),
        None => println!("  last check-in: never"),
    }
    if let Some(url) = &habit.image_url {
        println!("  image:         {}", url);
    }
}
