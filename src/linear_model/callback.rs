//! Per-epoch progress observers.
//!
//! Observers see the loss after every epoch but cannot touch the training
//! state.

/// Receives the loss recorded at the end of each epoch.
pub trait EpochObserver {
    fn on_epoch(&mut self, epoch: usize, loss: f64);
}

impl<F> EpochObserver for F
where
    F: FnMut(usize, f64),
{
    fn on_epoch(&mut self, epoch: usize, loss: f64) {
        self(epoch, loss)
    }
}

/// Ignores every epoch.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl EpochObserver for NoopObserver {
    fn on_epoch(&mut self, _epoch: usize, _loss: f64) {}
}

/// Logs the loss at `info` twenty times over a run and at `debug` otherwise.
#[derive(Clone, Copy, Debug)]
pub struct LogProgress {
    every: usize,
}

impl LogProgress {
    pub fn new(max_epochs: usize) -> Self {
        Self {
            every: (max_epochs / 20).max(1),
        }
    }

    pub fn every(&self) -> usize {
        self.every
    }
}

impl EpochObserver for LogProgress {
    fn on_epoch(&mut self, epoch: usize, loss: f64) {
        if epoch % self.every == 0 {
            log::info!("epoch {epoch}\tloss: {loss:.7}");
        } else {
            log::debug!("epoch {epoch}\tloss: {loss:.7}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_observer() {
        let mut seen = Vec::new();
        {
            let mut observer = |epoch: usize, loss: f64| seen.push((epoch, loss));
            observer.on_epoch(0, 1.5);
            observer.on_epoch(1, 0.5);
        }
        assert_eq!(seen, vec![(0, 1.5), (1, 0.5)]);
    }

    #[test]
    fn test_log_progress_cadence() {
        assert_eq!(LogProgress::new(1000).every(), 50);
        assert_eq!(LogProgress::new(5).every(), 1);
    }
}
