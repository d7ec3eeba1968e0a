//! Background rendering.
//!
//! A [`RenderWorker`] owns one dedicated thread that parses and renders
//! submitted sources strictly in submission order. Each result is handed to
//! the job's callback through an [`Executor`], so the caller picks where
//! callbacks run.

use std::io;
use std::sync::mpsc;
use std::thread::JoinHandle;

use mdview_renderer::{OutlineToken, StyledDocument};
use tracing::{debug, warn};

use crate::markdown::Markdown;

/// Unit of work handed to an [`Executor`].
pub type Task = Box<dyn FnOnce() + Send>;

/// Runs result callbacks on behalf of a [`RenderWorker`].
pub trait Executor: Send + 'static {
    fn execute(&self, task: Task);
}

/// Runs callbacks directly on the worker thread.
///
/// The next job starts only after the callback returns.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, task: Task) {
        task();
    }
}

/// Runs callbacks on a rayon thread pool.
#[derive(Debug)]
pub struct PoolExecutor {
    pool: rayon::ThreadPool,
}

impl PoolExecutor {
    /// Executor backed by a new pool of `threads` threads.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool threads cannot be spawned.
    pub fn new(threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("mdview-callback-{index}"))
            .build()?;
        Ok(Self { pool })
    }

    /// Executor backed by an existing pool.
    #[must_use]
    pub fn from_pool(pool: rayon::ThreadPool) -> Self {
        Self { pool }
    }
}

impl Executor for PoolExecutor {
    fn execute(&self, task: Task) {
        self.pool.spawn(task);
    }
}

/// Output a job asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderTarget {
    RichText,
    Html,
    Outline,
}

/// Result of one job.
#[derive(Debug)]
pub enum RenderOutput {
    RichText(StyledDocument),
    Html(String),
    Outline(Vec<OutlineToken>),
}

impl RenderOutput {
    fn render(markdown: &Markdown, source: &str, target: RenderTarget) -> Self {
        match target {
            RenderTarget::RichText => Self::RichText(markdown.render_rich_text(source)),
            RenderTarget::Html => Self::Html(markdown.render_html(source)),
            RenderTarget::Outline => Self::Outline(markdown.extract_outline(source)),
        }
    }
}

type Callback = Box<dyn FnOnce(RenderOutput) + Send>;

struct Job {
    source: String,
    target: RenderTarget,
    callback: Callback,
}

/// Dedicated thread that serializes parse and render jobs.
///
/// Dropping the worker stops accepting jobs, finishes every job already
/// queued and joins the thread.
pub struct RenderWorker {
    sender: Option<mpsc::Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl RenderWorker {
    /// Start a worker rendering with `markdown` and delivering results via
    /// `executor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned.
    pub fn spawn(markdown: Markdown, executor: impl Executor) -> io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Job>();

        let handle = std::thread::Builder::new()
            .name("mdview-render".to_owned())
            .spawn(move || {
                // Ends once every sender is gone and the queue is empty.
                for job in receiver {
                    debug!(target = ?job.target, bytes = job.source.len(), "rendering");
                    let output = RenderOutput::render(&markdown, &job.source, job.target);
                    let callback = job.callback;
                    executor.execute(Box::new(move || callback(output)));
                }
            })?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Queue `source` for rendering; `callback` receives the result.
    ///
    /// Jobs run one at a time in submission order. Returns `false` if the
    /// worker thread has stopped, in which case `callback` is never called.
    pub fn submit(
        &self,
        source: impl Into<String>,
        target: RenderTarget,
        callback: impl FnOnce(RenderOutput) + Send + 'static,
    ) -> bool {
        let job = Job {
            source: source.into(),
            target,
            callback: Box::new(callback),
        };
        let sent = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(job).is_ok());
        if !sent {
            warn!("render worker has stopped, dropping job");
        }
        sent
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        // Disconnect so the worker loop ends after draining the queue.
        drop(self.sender.take());
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("render worker panicked");
        }
    }
}

impl std::fmt::Debug for RenderWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderWorker")
            .field("running", &self.sender.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    fn html_of(output: RenderOutput) -> String {
        match output {
            RenderOutput::Html(html) => html,
            other => panic!("expected HTML, got {other:?}"),
        }
    }

    #[test]
    fn test_jobs_run_in_submission_order() {
        let results = Arc::new(Mutex::new(Vec::new()));
        let worker = RenderWorker::spawn(Markdown::new(), InlineExecutor).unwrap();

        for i in 0..20 {
            let results = Arc::clone(&results);
            assert!(worker.submit(format!("# Doc {i}\n"), RenderTarget::Html, move |out| {
                results.lock().unwrap().push(html_of(out));
            }));
        }
        drop(worker);

        let expected: Vec<_> = (0..20).map(|i| format!("<h1>Doc {i}</h1>\n")).collect();
        assert_eq!(*results.lock().unwrap(), expected);
    }

    #[test]
    fn test_drop_drains_queued_jobs() {
        let count = Arc::new(Mutex::new(0));
        let worker = RenderWorker::spawn(Markdown::new(), InlineExecutor).unwrap();
        for _ in 0..50 {
            let count = Arc::clone(&count);
            worker.submit("- a\n- b\n", RenderTarget::RichText, move |_| {
                *count.lock().unwrap() += 1;
            });
        }
        drop(worker);
        assert_eq!(*count.lock().unwrap(), 50);
    }

    #[test]
    fn test_inline_executor_runs_on_worker_thread() {
        let (tx, rx) = mpsc::channel();
        let worker = RenderWorker::spawn(Markdown::new(), InlineExecutor).unwrap();
        worker.submit("text", RenderTarget::Html, move |_| {
            let name = std::thread::current().name().map(str::to_owned);
            tx.send(name).unwrap();
        });
        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("mdview-render"));
    }

    #[test]
    fn test_pool_executor_delivers_on_pool() {
        let (tx, rx) = mpsc::channel();
        let executor = PoolExecutor::new(2).unwrap();
        let worker = RenderWorker::spawn(Markdown::new(), executor).unwrap();

        let sent = tx.clone();
        worker.submit("# A\n\n## B\n", RenderTarget::Outline, move |out| {
            let thread = std::thread::current().name().map(str::to_owned);
            sent.send((out, thread)).unwrap();
        });
        drop(tx);

        let (output, thread) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let RenderOutput::Outline(tokens) = output else {
            panic!("expected outline, got {output:?}");
        };
        let levels: Vec<_> = tokens.iter().map(|t| t.level).collect();
        assert_eq!(levels, vec![1, 2]);
        assert!(
            thread.as_deref().is_some_and(|n| n.starts_with("mdview-callback-")),
            "callback ran on {thread:?}"
        );
    }

    #[test]
    fn test_rich_text_job() {
        let (tx, rx) = mpsc::channel();
        let worker = RenderWorker::spawn(Markdown::new(), InlineExecutor).unwrap();
        worker.submit("**bold**", RenderTarget::RichText, move |out| {
            tx.send(out).unwrap();
        });
        let RenderOutput::RichText(styled) = rx.recv_timeout(Duration::from_secs(5)).unwrap()
        else {
            panic!("expected rich text");
        };
        assert!(styled.text().starts_with("bold"));
    }
}
