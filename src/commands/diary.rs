use std::sync::{Arc, Mutex};

use clap::{Args, Subcommand};
use kalorie_core::diary::DeleteOutcome;
use kalorie_core::portion::{format_portion, grams_to_portion, nutrition_for_portion};
use kalorie_core::store::format_number;
use kalorie_core::{
    DiaryController, InMemorySurface, LoadOutcome, MealType, NewDiaryEntry, ReconcileReport,
    Store,
};

use super::{parse_date, OutputFormat};

#[derive(Args)]
pub struct DiaryCommand {
    #[command(subcommand)]
    pub command: DiarySubcommand,
}

#[derive(Subcommand)]
pub enum DiarySubcommand {
    /// Show the diary for a date, grouped by meal
    Show {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a food to the diary
    Add {
        /// Food ID
        food_id: i64,

        /// Amount in portions of 100 g
        #[arg(long, short, default_value = "1.0", conflicts_with = "grams")]
        portion: f64,

        /// Amount in grams
        #[arg(long, short)]
        grams: Option<f64>,

        /// Meal (morgenmad, frokost, aftensmad, mellemmaaltid1, mellemmaaltid2)
        #[arg(long, short, default_value = "frokost")]
        meal: MealType,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// Delete a diary entry
    Delete {
        /// Entry ID
        id: i64,

        /// Date the entry belongs to (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// Compare the local diary with the server and resync if they differ
    Check {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },
}

impl DiaryCommand {
    pub async fn run(&self, store: Arc<Store>) -> Result<(), Box<dyn std::error::Error>> {
        let surface = Arc::new(Mutex::new(InMemorySurface::new()));
        let controller = DiaryController::new(store.clone(), surface);

        match &self.command {
            DiarySubcommand::Show { date, format } => {
                let date = parse_date(date.as_deref())?;
                let outcome = store.load_all(date).await;
                if outcome.any_failed() {
                    tracing::warn!(?outcome, "some data could not be loaded");
                }
                let report = controller.reconcile_now();
                let summary = store.daily_summary();

                match format {
                    OutputFormat::Json => {
                        let output = serde_json::json!({
                            "date": date,
                            "meals": report.groups,
                            "summary": summary,
                        });
                        println!("{}", serde_json::to_string_pretty(&output)?);
                    }
                    OutputFormat::Text => {
                        println!("Diary for {}", date);
                        println!("{}", "=".repeat(30));
                        print_groups(&report);

                        println!();
                        println!("Goal:      {:>8} kcal", format_number(summary.goal_calories.round()));
                        println!("Food:      {:>8} kcal", format_number(summary.food_calories.round()));
                        println!("Exercise:  {:>8} kcal", format_number(summary.exercise_calories.round()));
                        println!("Remaining: {:>8} kcal", format_number(summary.remaining_calories.round()));
                    }
                }
            }
            DiarySubcommand::Add {
                food_id,
                portion,
                grams,
                meal,
                date,
            } => {
                let date = parse_date(date.as_deref())?;
                if store.load_foods().await != LoadOutcome::Applied {
                    return Err("Could not load foods from server".into());
                }
                let food = store
                    .foods()
                    .into_iter()
                    .find(|f| f.id == *food_id)
                    .ok_or_else(|| format!("Food {} not found", food_id))?;

                let portion = grams.map(grams_to_portion).unwrap_or(*portion);
                let preview = nutrition_for_portion(&food, portion);
                println!(
                    "{} {} ({} kcal)",
                    format_portion(portion, true),
                    food.name,
                    format_number(preview.calories.round())
                );

                let entry = NewDiaryEntry::from_portion(&food, portion, *meal, date);
                let created = controller.add_entry(entry).await?;
                println!("Added entry {} to {}", created.id, meal.display_name());
            }
            DiarySubcommand::Delete { id, date } => {
                let date = parse_date(date.as_deref())?;
                controller.resync(date).await;

                match controller.delete_entry(*id).await? {
                    DeleteOutcome::Deleted => println!("Deleted entry {}", id),
                    DeleteOutcome::Detached => {
                        println!("Entry {} not found in diary for {}", id, date)
                    }
                }
            }
            DiarySubcommand::Check { date } => {
                let date = parse_date(date.as_deref())?;
                controller.resync(date).await;

                if controller.check_and_sync(date).await? {
                    println!("Diary for {} was out of date and has been refreshed", date);
                    print_groups(&controller.reconcile_now());
                } else {
                    println!("Diary for {} is up to date", date);
                }
            }
        }

        Ok(())
    }
}

fn print_groups(report: &ReconcileReport) {
    for group in &report.groups {
        println!(
            "\n{} ({} kcal)",
            group.meal_type.display_name(),
            format_number(group.subtotal_kcal.round())
        );
        if group.is_empty() {
            println!("  -");
        }
        for entry in &group.entries {
            println!("  [{}] {}", entry.id, entry);
        }
    }
}
