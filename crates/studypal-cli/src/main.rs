//! `studypal`: command-line front end for the StudyPal engine.
//!
//! This binary is the composition root: it reads configuration, opens the
//! SQLite gateway, signs the user in through the offline authenticator, and
//! hands a single [`StudyEngine`] to the requested command.
//!
//! # Usage
//!
//! ```text
//! studypal --email ada@example.com add-document --title Cells --body "..."
//! studypal ask <document-id> --question "What is ATP?" --answer "energy"
//! studypal sets
//! ```

mod auth;
mod config;
mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{ArgGroup, Parser, Subcommand};
use studypal_core::{
  StudyEngine,
  auth::{Authenticator as _, Credentials},
  document::{NewDocument, SourceKind},
  event::ChangeEvent,
  gateway::PersistenceGateway,
};
use studypal_store_sqlite::SqliteGateway;
use tokio::sync::broadcast::{Receiver, error::TryRecvError};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::{auth::OfflineAuthenticator, config::CliConfig};

#[derive(Parser)]
#[command(author, version, about = "Turn questions about your documents into flashcards")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "studypal.toml")]
  config: PathBuf,

  /// Sign in as this email before running the command.
  #[arg(long, env = "STUDYPAL_EMAIL")]
  email: Option<String>,

  /// Display name to register with (defaults to the email's local part).
  #[arg(long, requires = "email")]
  name: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// List documents, most recent first.
  Documents,
  /// Add a document.
  AddDocument {
    #[arg(long)]
    title:  String,
    #[arg(long)]
    body:   String,
    /// manual, camera, ocr, or gallery.
    #[arg(long, default_value_t = SourceKind::Manual)]
    source: SourceKind,
  },
  /// Toggle a document's favorite flag.
  Favorite { document: Uuid },
  /// Delete a document and all of its flashcards.
  DeleteDocument { document: Uuid },
  /// Record a question asked against a document and save the answer as a
  /// flashcard.
  Ask {
    document: Uuid,
    #[arg(long)]
    question: String,
    #[arg(long)]
    answer:   String,
  },
  /// List the flashcards of one document.
  Cards { document: Uuid },
  /// Show flashcard sets with mastery counts.
  Sets,
  /// Record the outcome of reviewing a flashcard.
  #[command(group(ArgGroup::new("outcome").required(true).args(["known", "unknown"])))]
  Review {
    card:    Uuid,
    #[arg(long)]
    known:   bool,
    #[arg(long)]
    unknown: bool,
  },
  /// Delete a single flashcard.
  DeleteCard { card: Uuid },
  /// Show the signed-in user's progress.
  Profile,
  /// List every badge that can be earned.
  Badges,
  /// Forget the signed-in user.
  SignOut,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = CliConfig::load(&cli.config)?;

  if let Some(dir) = cfg.store_path.parent() {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("failed to create {}", dir.display()))?;
  }
  let gateway = SqliteGateway::open(&cfg.store_path)
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  let mut engine = StudyEngine::open(Arc::new(gateway), cfg.engine.clone());
  let mut events = engine.subscribe();

  if let Some(email) = cli.email.or(cfg.email) {
    let credentials = Credentials { email, password: String::new(), name: cli.name };
    let identity = OfflineAuthenticator
      .authenticate(&credentials)
      .await
      .context("sign-in failed")?;
    let user = engine.sign_in(identity);
    tracing::info!(user = %user.name, "signed in");
  }

  let result = run(&mut engine, cli.command);
  report_events(&mut events);
  result
}

fn run<G: PersistenceGateway>(
  engine: &mut StudyEngine<G>,
  command: Command,
) -> anyhow::Result<()> {
  match command {
    Command::Documents => {
      if engine.documents().is_empty() {
        println!("No documents yet.");
      }
      for doc in engine.documents() {
        println!("{}", render::document(doc));
      }
    }
    Command::AddDocument { title, body, source } => {
      if engine.current_user().is_none() {
        tracing::warn!("not signed in; progress will not be recorded");
      }
      let doc = engine.add_document(NewDocument::new(title, body).with_source(source));
      println!("{}", render::document(&doc));
    }
    Command::Favorite { document } => {
      let favorite = engine.toggle_favorite(document)?;
      println!("{}", if favorite { "Marked as favorite." } else { "Removed from favorites." });
    }
    Command::DeleteDocument { document } => {
      let removed = engine.delete_document(document)?;
      println!("Deleted document and {removed} flashcard(s).");
    }
    Command::Ask { document, question, answer } => {
      anyhow::ensure!(!question.trim().is_empty(), "question must not be empty");
      engine.ask_question(document)?;
      let card = engine.create_flashcard(document, &question, &answer)?;
      let index = engine.flashcards_for(document).len();
      println!("{}", render::flashcard(index, &card));
    }
    Command::Cards { document } => {
      anyhow::ensure!(
        engine.repository().document(document).is_some(),
        "document not found: {document}"
      );
      for (i, card) in engine.flashcards_for(document).into_iter().enumerate() {
        println!("{}", render::flashcard(i + 1, card));
      }
    }
    Command::Sets => {
      let sets = engine.flashcard_sets();
      for set in &sets {
        println!("{}", render::set(set));
      }
      println!("{}", render::summary(&engine.summary()));
    }
    Command::Review { card, known, unknown } => {
      debug_assert!(known != unknown);
      let card = engine.review_flashcard(card, known)?;
      println!("{}", render::flashcard(1, &card));
    }
    Command::DeleteCard { card } => {
      let removed = engine.delete_flashcard(card)?;
      println!("Deleted flashcard {}.", removed.flashcard_id);
    }
    Command::Profile => match engine.current_user() {
      Some(user) => println!("{}", render::profile(user)),
      None => println!("Not signed in. Pass --email to sign in."),
    },
    Command::Badges => {
      for info in studypal_core::badge::catalog() {
        println!("{}: {}", info.name, info.description);
      }
    }
    Command::SignOut => {
      engine.sign_out();
      println!("Signed out.");
    }
  }
  Ok(())
}

/// Surface badge awards and persistence failures raised while the command
/// ran.
fn report_events(events: &mut Receiver<ChangeEvent>) {
  for event in drain_notices(events) {
    match event {
      ChangeEvent::BadgeAwarded { badge, .. } => {
        println!("Badge unlocked: {}", render::badge_line(badge));
      }
      ChangeEvent::PersistenceFailed { key, message } => {
        eprintln!("warning: could not save {key}: {message}");
      }
      _ => {}
    }
  }
}

/// Everything pending that the user should hear about. Skips past a lag
/// instead of stopping at it.
fn drain_notices(events: &mut Receiver<ChangeEvent>) -> Vec<ChangeEvent> {
  let mut notices = Vec::new();
  loop {
    match events.try_recv() {
      Ok(event @ (ChangeEvent::BadgeAwarded { .. } | ChangeEvent::PersistenceFailed { .. })) => {
        notices.push(event);
      }
      Ok(_) => {}
      Err(TryRecvError::Lagged(missed)) => {
        tracing::warn!(missed, "event channel lagged; some notices were lost");
      }
      Err(TryRecvError::Empty | TryRecvError::Closed) => break,
    }
  }
  notices
}
