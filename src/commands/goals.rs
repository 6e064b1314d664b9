use std::sync::Arc;

use clap::{Args, Subcommand};
use kalorie_core::{
    EventBus, FormattedGoals, GoalEdits, GoalField, GoalsController, LoadOutcome, MacroSplit,
    Store,
};

use super::OutputFormat;

#[derive(Args)]
pub struct GoalsCommand {
    #[command(subcommand)]
    pub command: GoalsSubcommand,
}

#[derive(Subcommand)]
pub enum GoalsSubcommand {
    /// Show the current daily goals
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Change goals and save them
    ///
    /// Setting calories redistributes them over the macros; setting a macro
    /// recomputes the calories. Calories with all three macros are saved as
    /// given.
    Set {
        /// Daily calories
        #[arg(long)]
        calories: Option<f64>,

        /// Protein in grams
        #[arg(long)]
        protein: Option<f64>,

        /// Carbohydrates in grams
        #[arg(long)]
        carbs: Option<f64>,

        /// Fat in grams
        #[arg(long)]
        fat: Option<f64>,
    },
}

impl GoalsCommand {
    pub async fn run(
        &self,
        store: Arc<Store>,
        bus: EventBus,
        default_split: MacroSplit,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            GoalsSubcommand::Show { format } => {
                store.load_goals().await;
                let Some(goals) = store.formatted_goals() else {
                    println!("No goals set. Use 'kalorie goals set' to create them.");
                    return Ok(());
                };

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&goals)?);
                    }
                    OutputFormat::Text => print_goals(&goals),
                }
            }
            GoalsSubcommand::Set {
                calories,
                protein,
                carbs,
                fat,
            } => {
                let edits = GoalEdits {
                    calories: *calories,
                    protein: *protein,
                    carbs: *carbs,
                    fat: *fat,
                };
                if edits.is_empty() {
                    return Err("Nothing to set. Pass at least one of --calories, --protein, --carbs, --fat.".into());
                }

                let mut controller = GoalsController::new(store.clone(), bus, default_split);
                match controller.refresh().await {
                    LoadOutcome::Applied => {}
                    LoadOutcome::Missing => {
                        println!("No goals on server, starting from defaults");
                    }
                    outcome => {
                        return Err(format!(
                            "Could not load current goals ({}); nothing was saved",
                            outcome
                        )
                        .into());
                    }
                }

                controller.apply_edits(edits)?;
                let saved = controller.commit().await?;

                println!("Saved goals: {}", saved);
                if let Some(goals) = store.formatted_goals() {
                    print_goals(&goals);
                }
            }
        }

        Ok(())
    }
}

fn print_goals(goals: &FormattedGoals) {
    println!("{:<12} {:>8} kcal", GoalField::Calories.label(), goals.daily_calories.formatted);
    for (field, entry) in [
        (GoalField::Protein, &goals.protein),
        (GoalField::Carbs, &goals.carbs),
        (GoalField::Fat, &goals.fat),
    ] {
        println!(
            "{:<12} {:>8}  ({})",
            field.label(),
            entry.grams.formatted,
            entry.percentage_formatted
        );
    }
}
