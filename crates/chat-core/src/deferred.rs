use std::time::{Duration, Instant};

/// Work scheduled to run after the current event has been fully handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// Reset the document after a message was sent.
    ClearDocument,
}

#[derive(Debug, Clone)]
struct Scheduled {
    due: Instant,
    task: DeferredTask,
}

/// Tasks waiting for their due time. The host drives it with `take_due`.
#[derive(Debug, Clone, Default)]
pub struct DeferredQueue {
    tasks: Vec<Scheduled>,
}

impl DeferredQueue {
    pub fn schedule(&mut self, task: DeferredTask, delay: Duration) {
        self.schedule_at(task, Instant::now() + delay);
    }

    pub fn schedule_at(&mut self, task: DeferredTask, due: Instant) {
        tracing::trace!(?task, "task deferred");
        self.tasks.push(Scheduled { due, task });
    }

    /// Removes and returns the tasks due at `now`, oldest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<DeferredTask> {
        let mut due: Vec<Scheduled> = Vec::new();
        self.tasks.retain(|scheduled| {
            if scheduled.due <= now {
                due.push(scheduled.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|scheduled| scheduled.due);
        due.into_iter().map(|scheduled| scheduled.task).collect()
    }

    /// Removes every task regardless of due time.
    pub fn drain(&mut self) -> Vec<DeferredTask> {
        let mut tasks = std::mem::take(&mut self.tasks);
        tasks.sort_by_key(|scheduled| scheduled.due);
        tasks.into_iter().map(|scheduled| scheduled.task).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_due_tasks_are_taken() {
        let now = Instant::now();
        let mut queue = DeferredQueue::default();
        queue.schedule_at(DeferredTask::ClearDocument, now + Duration::from_millis(10));
        assert!(queue.take_due(now).is_empty());
        assert_eq!(queue.len(), 1);
        assert_eq!(
            queue.take_due(now + Duration::from_millis(10)),
            vec![DeferredTask::ClearDocument]
        );
        assert!(queue.is_empty());
    }
}
