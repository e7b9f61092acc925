use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

/// Periodic input source feeding a runner queue.
///
/// The first message is sent one `period` after spawning. The task is aborted
/// when the `Ticker` is dropped, so it never outlives its session.
#[derive(Debug)]
pub struct Ticker {
    task: JoinHandle<()>,
}

impl Ticker {
    pub fn spawn<T, F>(period: Duration, sender: mpsc::Sender<T>, mut message: F) -> Self
    where
        T: Send + 'static,
        F: FnMut() -> T + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if sender.send(message()).await.is_err() {
                    break;
                }
            }
        });
        Self { task }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let (tx, mut rx) = mpsc::channel(8);
        let _ticker = Ticker::spawn(Duration::from_secs(1), tx, || ());

        tokio::time::sleep(Duration::from_millis(3500)).await;
        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_stops_the_task() {
        let (tx, mut rx) = mpsc::channel(8);
        let ticker = Ticker::spawn(Duration::from_secs(1), tx, || ());
        drop(ticker);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.recv().await.is_none());
    }
}
