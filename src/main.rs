use std::path::PathBuf;

use anyhow::bail;
use clap::{ArgGroup, Parser, Subcommand};

mod attendance;
mod error;
mod frequency;
mod models;
mod normalize;
mod report;
mod roster;
mod session;
mod unify;

use frequency::{FrequencyAnswer, FrequencyQuery};
use roster::SearchField;
use session::DataSession;

#[derive(Parser)]
#[command(name = "trilhas-attendance")]
#[command(about = "Reconciles workshop sign-in sheets against the student roster", long_about = None)]
struct Cli {
    /// Roster workbook, one sheet per school
    #[arg(long, default_value = "dados/trilhas_formativas.xlsx")]
    roster: PathBuf,
    /// Sign-in workbook, one sheet per workshop
    #[arg(long, default_value = "dados/lista_presenca_trilhas_formativas.xlsx")]
    attendance: PathBuf,
    /// Emit JSON instead of text blocks
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the unified roster by one field
    Students {
        #[arg(long, value_enum)]
        field: SearchField,
        #[arg(long)]
        query: String,
    },
    /// Attendance percentages by student name, registration, or workshop
    #[command(group(
        ArgGroup::new("scope")
            .args(["name", "registration", "workshop"])
            .required(true)
            .multiple(false)
    ))]
    Frequency {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        registration: Option<String>,
        #[arg(long)]
        workshop: Option<String>,
    },
    /// Write the full student-by-workshop frequency table as CSV
    Export {
        #[arg(long, default_value = "frequency.csv")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let session = DataSession::load(&cli.roster, &cli.attendance);
    if !session.is_loaded() {
        bail!(
            "data load failed: {}",
            session.status_message().unwrap_or("unknown error")
        );
    }
    if let Some(warning) = session.status_message() {
        eprintln!("warning: {warning}");
    }
    eprintln!(
        "Loaded {} students and {} attendance rows.",
        session.students().len(),
        session.records().len()
    );

    match cli.command {
        Commands::Students { field, query } => match session.search_students(field, &query) {
            Ok(matches) => {
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&matches)?);
                } else {
                    print!("{}", report::students_report(&matches, &query));
                }
            }
            Err(err) => println!("{err}"),
        },
        Commands::Frequency {
            name,
            registration,
            workshop,
        } => {
            let query = if let Some(value) = name {
                FrequencyQuery::StudentName(value)
            } else if let Some(value) = registration {
                FrequencyQuery::Registration(value)
            } else if let Some(value) = workshop {
                FrequencyQuery::Workshop(value)
            } else {
                unreachable!("clap enforces exactly one scope flag");
            };

            match session.frequency(&query) {
                Ok(answer) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&answer)?);
                    } else {
                        match answer {
                            FrequencyAnswer::Students(details) => print!(
                                "{}",
                                report::student_frequency_report(&details, query.value())
                            ),
                            FrequencyAnswer::Workshops(details) => print!(
                                "{}",
                                report::workshop_frequency_report(&details, query.value())
                            ),
                        }
                    }
                }
                Err(err) => println!("{err}"),
            }
        }
        Commands::Export { out } => match session.frequency_table() {
            Ok(results) => {
                let mut writer = csv::Writer::from_path(&out)?;
                for result in &results {
                    writer.serialize(result)?;
                }
                writer.flush()?;
                println!(
                    "Frequency table written to {} ({} rows).",
                    out.display(),
                    results.len()
                );
            }
            Err(err) => println!("{err}"),
        },
    }

    Ok(())
}
