mod config;
mod input;
mod render;
mod session_loop;

use tokio::io::{AsyncBufReadExt, BufReader};

use services::{
    CatalogService, Clock, ResultContext, ResultFilter, ResultsService, RunnerConfig, StartedTest,
};
use storage::{Storage, load_catalog, sample_catalog};
use study_core::model::{ExamKind, TestKind};

use crate::config::{Command, Config, print_usage};
use crate::session_loop::{SessionSetup, confirm, drive};

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(config) = Config::from_env().inspect_err(|_| print_usage())? else {
        print_usage();
        return Ok(());
    };

    let catalog = match &config.catalog {
        Some(path) => load_catalog(path)?,
        None => sample_catalog()?,
    };
    let storage = Storage::from_catalog(catalog)?;

    let clock = Clock::default_clock();
    let catalog_service =
        CatalogService::new(storage.catalog.clone()).with_shuffle_seed(config.shuffle_seed);
    let results = ResultsService::new(clock, storage.results.clone());
    let runner = RunnerConfig::default().with_autosave_secs(config.autosave_secs);

    match config.command {
        Command::Exams => {
            let exams = catalog_service.list_exams().await?;
            print!("{}", render::exam_list(&exams));
        }
        Command::Decks { search } => {
            let decks = catalog_service
                .search_decks(search.as_deref().unwrap_or_default())
                .await?;
            let stats = catalog_service.deck_stats().await?;
            print!("{}", render::deck_list(&decks, &stats));
        }
        Command::Cards { deck_id, search } => {
            let deck = catalog_service.get_deck(deck_id).await?;
            let cards = catalog_service
                .search_cards(deck_id, search.as_deref().unwrap_or_default())
                .await?;
            println!("{} ({})", deck.title, deck.subject);
            print!("{}", render::card_list(&cards));
        }
        Command::Take { exam_id } => {
            let plan = catalog_service.plan_exam(exam_id).await?;
            let exam = plan.exam.clone();
            println!("{} ({} min), ? for help", exam.title, exam.duration);

            let setup = SessionSetup {
                runner,
                clock,
                results,
                context: ResultContext::from_exam(&exam),
            };
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let recorded = match plan.start()? {
                StartedTest::Mcq(session) => drive(session, &setup, &mut lines).await?,
                StartedTest::Written(session) => drive(session, &setup, &mut lines).await?,
            };

            if exam.kind == ExamKind::Mixed
                && !recorded.is_empty()
                && confirm(&mut lines, "continue with the written part? (y/n)").await?
            {
                let written = catalog_service.plan_test(exam_id, TestKind::Written).await?;
                if let StartedTest::Written(session) = written.start()? {
                    drive(session, &setup, &mut lines).await?;
                }
            }
        }
        Command::Study { deck_id } => {
            let deck = catalog_service.get_deck(deck_id).await?;
            let session = catalog_service.start_deck(deck_id).await?;
            println!("{} ({} cards), ? for help", deck.title, session.cards().len());

            let setup = SessionSetup {
                runner,
                clock,
                results,
                context: ResultContext::from_deck(&deck),
            };
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            drive(session, &setup, &mut lines).await?;
        }
        Command::Results { subject, period } => {
            let filter = ResultFilter { subject, period };
            let listed = results.list(&filter).await?;
            let overview = results.overview(&filter).await?;
            let subjects = results.subjects().await?;
            print!("{}", render::result_list(&listed, &overview, &subjects));
        }
        Command::ResultDetail { id } => {
            let detail = results.detail(id).await?;
            print!("{}", render::result_detail(&detail));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
