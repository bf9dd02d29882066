//! Posting work onto the tree's thread.
//!
//! The tree itself is single-threaded. Other threads get a [`TaskPoster`], which queues closures
//! that run the next time the owning thread calls [`NodeTree::run_posted_tasks`].

use crate::error::{Error, Result};
use crate::tree::NodeTree;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;

/// A unit of work posted from another thread.
pub type Task = Box<dyn FnOnce(&mut NodeTree) + Send>;

type WakeHook = Arc<Mutex<Option<Box<dyn Fn() + Send>>>>;

pub(crate) struct TaskQueue {
    sender: Sender<Task>,
    receiver: Receiver<Task>,
    wake: WakeHook,
}

impl TaskQueue {
    pub(crate) fn new() -> TaskQueue {
        let (sender, receiver) = channel::unbounded();
        TaskQueue {
            sender,
            receiver,
            wake: Arc::new(Mutex::new(None)),
        }
    }
}

/// Sends tasks to a [`NodeTree`] from any thread.
#[derive(Clone)]
pub struct TaskPoster {
    sender: Sender<Task>,
    wake: WakeHook,
}

impl TaskPoster {
    /// Queues a task and wakes the owning thread.
    ///
    /// Fails if the tree has been dropped.
    pub fn post<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce(&mut NodeTree) + Send + 'static,
    {
        self.sender
            .send(Box::new(task))
            .map_err(|_| Error::Unavailable("node tree has been dropped"))?;
        if let Some(wake) = &*self.wake.lock() {
            wake();
        }
        Ok(())
    }
}

impl NodeTree {
    /// Returns a handle that other threads can use to post tasks to this tree.
    pub fn task_poster(&self) -> TaskPoster {
        TaskPoster {
            sender: self.tasks.sender.clone(),
            wake: Arc::clone(&self.tasks.wake),
        }
    }

    /// Sets the function called (on the posting thread) after every post.
    ///
    /// Typically this schedules a call to [`NodeTree::run_posted_tasks`] on the owning thread's
    /// event loop.
    pub fn set_wake_hook<F: Fn() + Send + 'static>(&mut self, hook: F) {
        *self.tasks.wake.lock() = Some(Box::new(hook));
    }

    /// Runs tasks that were queued before this call. Tasks posted while running are left for the
    /// next call.
    ///
    /// Returns the number of tasks run.
    pub fn run_posted_tasks(&mut self) -> usize {
        let pending = self.tasks.receiver.len();
        let mut ran = 0;
        while ran < pending {
            match self.tasks.receiver.try_recv() {
                Ok(task) => {
                    task(self);
                    ran += 1;
                }
                Err(_) => break,
            }
        }
        if ran > 0 {
            tracing::trace!(ran, "ran posted tasks");
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::NodeKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn tasks_run_on_the_owning_thread() {
        let mut tree = NodeTree::new();
        let wakes = Arc::new(AtomicUsize::new(0));
        let wakes2 = Arc::clone(&wakes);
        tree.set_wake_hook(move || {
            wakes2.fetch_add(1, Ordering::SeqCst);
        });

        let poster = tree.task_poster();
        thread::spawn(move || {
            for _ in 0..3 {
                poster
                    .post(|tree| {
                        tree.create(NodeKind::Text).unwrap();
                    })
                    .unwrap();
            }
        })
        .join()
        .unwrap();

        assert_eq!(wakes.load(Ordering::SeqCst), 3);
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.run_posted_tasks(), 3);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn tasks_posted_while_running_wait_for_the_next_run() {
        let mut tree = NodeTree::new();
        let poster = tree.task_poster();
        let inner = poster.clone();
        poster
            .post(move |_| {
                inner.post(|tree| {
                    tree.create(NodeKind::Stack).unwrap();
                })
                .unwrap();
            })
            .unwrap();
        assert_eq!(tree.run_posted_tasks(), 1);
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.run_posted_tasks(), 1);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn posting_to_a_dropped_tree_fails() {
        let tree = NodeTree::new();
        let poster = tree.task_poster();
        drop(tree);
        assert!(poster.post(|_| ()).is_err());
    }
}
