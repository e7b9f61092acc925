use std::error::Error;

use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::oneshot;

use services::runner::SessionHandle;
use services::{
    Clock, ResultContext, ResultsService, RunnerConfig, RunnerError, SessionMachine, spawn_session,
};
use study_core::model::ResultId;

use crate::input::{Input, help_text, parse_input};
use crate::render::Screen;

/// Everything a terminal session needs besides the session itself.
pub struct SessionSetup {
    pub runner: RunnerConfig,
    pub clock: Clock,
    pub results: ResultsService,
    pub context: ResultContext,
}

enum Ending {
    Completed,
    Left,
}

/// Run `machine` against terminal input until it completes or the user
/// leaves, recording every completed pass.
///
/// # Errors
///
/// Returns input, runner or storage failures.
pub async fn drive<M, R>(
    mut machine: M,
    setup: &SessionSetup,
    lines: &mut Lines<R>,
) -> Result<Vec<ResultId>, Box<dyn Error>>
where
    M: SessionMachine + Screen,
    R: AsyncBufRead + Unpin,
{
    let mut recorded = Vec::new();
    loop {
        let (report_tx, report_rx) = oneshot::channel();
        let handle = spawn_session(
            machine,
            setup.runner,
            setup.clock,
            Box::new(move |report| {
                let _ = report_tx.send(report);
            }),
        );
        print!("{}", handle.state().screen());

        let exit = match interact(&handle, lines).await? {
            Ending::Completed => handle.finished().await?,
            Ending::Left => handle.exit().await?,
        };
        let Ok(report) = report_rx.await else {
            println!("left the session, nothing recorded");
            return Ok(recorded);
        };

        print!("{}", exit.state.summary());
        let id = setup.results.record(&report, &setup.context).await?;
        println!("saved as result {id} ({}%)", report.score());
        recorded.push(id);

        let Some(next) = exit.state.restarted() else {
            return Ok(recorded);
        };
        if !confirm(lines, "type restart to go again, anything else to finish").await? {
            return Ok(recorded);
        }
        log::debug!("restarting {} session for {}", report.kind, setup.context.title);
        machine = next;
    }
}

/// Ask a question and report whether the answer was `restart` or `y`.
pub async fn confirm<R>(lines: &mut Lines<R>, prompt: &str) -> Result<bool, Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
{
    println!("{prompt}");
    let Some(line) = lines.next_line().await? else {
        return Ok(false);
    };
    Ok(matches!(line.trim(), "y" | "yes") || parse_input(&line) == Ok(Input::Restart))
}

async fn interact<M, R>(
    handle: &SessionHandle<M>,
    lines: &mut Lines<R>,
) -> Result<Ending, Box<dyn Error>>
where
    M: SessionMachine + Screen,
    R: AsyncBufRead + Unpin,
{
    let mut updates = handle.subscribe();
    let mut last_saved = None;

    loop {
        if updates.borrow_and_update().state.is_completed() {
            return Ok(Ending::Completed);
        }

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(Ending::Left);
                };
                match parse_input(&line) {
                    Ok(Input::Session(command)) => match handle.send(command).await {
                        Ok(progress) if progress.is_complete => return Ok(Ending::Completed),
                        Ok(_) => print!("{}", handle.state().screen()),
                        Err(RunnerError::Closed) => return Ok(Ending::Completed),
                        Err(e) => println!("{e}"),
                    },
                    Ok(Input::Help) => println!("{}", help_text()),
                    Ok(Input::Restart) => println!("restart is offered once the session is over"),
                    Ok(Input::Quit) => return Ok(Ending::Left),
                    Err(e) => println!("{e}"),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    return Ok(Ending::Completed);
                }
                let saved = updates.borrow().saved;
                if let Some(saved) = saved.filter(|s| Some(s.at) != last_saved) {
                    last_saved = Some(saved.at);
                    println!("  draft saved ({} words)", saved.mark.words);
                }
            }
        }
    }
}
