//! Runs every enabled generator as an independent task until shutdown.

use crate::core::clock::{Clock, SystemClock};
use crate::core::config::GeneratorsConfig;
use crate::core::event::EventRecord;
use crate::core::pool::CategoryPool;
use crate::core::traits::{EventGenerator, RecordSink};
use crate::sources::login::{LoginFailureGenerator, LoginSuccessGenerator};
use crate::sources::service::{ServiceCallGenerator, ServiceFailureGenerator};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const SHUTDOWN_MESSAGE: &str = "Shutting down";

/// The generator variants the supervisor knows how to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    LoginFailure,
    LoginSuccess,
    ServiceFailure,
    ServiceCall,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 4] = [
        GeneratorKind::LoginFailure,
        GeneratorKind::LoginSuccess,
        GeneratorKind::ServiceFailure,
        GeneratorKind::ServiceCall,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GeneratorKind::LoginFailure => LoginFailureGenerator::NAME,
            GeneratorKind::LoginSuccess => LoginSuccessGenerator::NAME,
            GeneratorKind::ServiceFailure => ServiceFailureGenerator::NAME,
            GeneratorKind::ServiceCall => ServiceCallGenerator::NAME,
        }
    }

    /// Kinds switched on in the config, in canonical order.
    pub fn enabled(config: &GeneratorsConfig) -> Vec<GeneratorKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| match kind {
                GeneratorKind::LoginFailure => config.login_failure,
                GeneratorKind::LoginSuccess => config.login_success,
                GeneratorKind::ServiceFailure => config.service_failure,
                GeneratorKind::ServiceCall => config.service_call,
            })
            .collect()
    }

    fn build(&self, pool: Arc<CategoryPool>, rng: StdRng) -> Box<dyn EventGenerator> {
        match self {
            GeneratorKind::LoginFailure => Box::new(LoginFailureGenerator::new(pool, rng)),
            GeneratorKind::LoginSuccess => Box::new(LoginSuccessGenerator::new(pool, rng)),
            GeneratorKind::ServiceFailure => Box::new(ServiceFailureGenerator::new(pool, rng)),
            GeneratorKind::ServiceCall => Box::new(ServiceCallGenerator::new(pool, rng)),
        }
    }

    fn salt(&self) -> u64 {
        let index: u64 = match self {
            GeneratorKind::LoginFailure => 1,
            GeneratorKind::LoginSuccess => 2,
            GeneratorKind::ServiceFailure => 3,
            GeneratorKind::ServiceCall => 4,
        };
        index.wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

#[derive(Debug)]
pub enum SupervisorError {
    NoGenerators,
    Task(tokio::task::JoinError),
}

impl std::fmt::Display for SupervisorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupervisorError::NoGenerators => write!(f, "no generators enabled"),
            SupervisorError::Task(err) => write!(f, "generator task failed: {err}"),
        }
    }
}

impl std::error::Error for SupervisorError {}

/// Records emitted per generator during one run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub emitted: Vec<(&'static str, u64)>,
}

impl RunSummary {
    pub fn emitted_by(&self, name: &str) -> Option<u64> {
        self.emitted
            .iter()
            .find(|(generator, _)| *generator == name)
            .map(|(_, count)| *count)
    }

    pub fn total(&self) -> u64 {
        self.emitted.iter().map(|(_, count)| count).sum()
    }
}

/// Starts the generators, waits for shutdown, then stops and joins them.
pub struct GeneratorSupervisor {
    pool: Arc<CategoryPool>,
    sink: Arc<dyn RecordSink>,
    clock: Arc<dyn Clock>,
    seed: Option<u64>,
    kinds: Vec<GeneratorKind>,
}

impl GeneratorSupervisor {
    pub fn new(pool: CategoryPool, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            pool: Arc::new(pool),
            sink,
            clock: Arc::new(SystemClock),
            seed: None,
            kinds: GeneratorKind::ALL.to_vec(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Seeds every generator; `None` draws seeds from entropy.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_generators(mut self, kinds: Vec<GeneratorKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Runs until `shutdown` resolves.
    ///
    /// Emits a single "Shutting down" record once every generator has stopped.
    pub async fn run<F>(self, shutdown: F) -> Result<RunSummary, SupervisorError>
    where
        F: Future<Output = ()>,
    {
        if self.kinds.is_empty() {
            return Err(SupervisorError::NoGenerators);
        }

        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();
        for kind in &self.kinds {
            let generator = kind.build(Arc::clone(&self.pool), generator_rng(self.seed, *kind));
            tasks.spawn(drive(
                generator,
                Arc::clone(&self.sink),
                Arc::clone(&self.clock),
                cancel.child_token(),
            ));
        }
        let names: Vec<&str> = self.kinds.iter().map(GeneratorKind::name).collect();
        info!(generators = ?names, "generators started");

        shutdown.await;
        info!("shutdown requested, stopping generators");
        cancel.cancel();

        let mut summary = RunSummary::default();
        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => summary.emitted.push(entry),
                Err(err) => {
                    warn!(error = %err, "generator task failed");
                    if failure.is_none() {
                        failure = Some(SupervisorError::Task(err));
                    }
                }
            }
        }
        summary.emitted.sort_by_key(|(name, _)| *name);

        let record = EventRecord::info(self.clock.now(), SHUTDOWN_MESSAGE);
        if let Err(err) = self.sink.emit(&record) {
            warn!(error = %err, "failed to emit shutdown record");
        }
        if let Err(err) = self.sink.flush() {
            warn!(error = %err, "failed to flush sink");
        }
        info!(total = summary.total(), "generators stopped");

        match failure {
            Some(err) => Err(err),
            None => Ok(summary),
        }
    }
}

async fn drive(
    mut generator: Box<dyn EventGenerator>,
    sink: Arc<dyn RecordSink>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
) -> (&'static str, u64) {
    let name = generator.name();
    debug!(generator = name, "generator started");
    let mut emitted = 0_u64;

    while !cancel.is_cancelled() {
        if let Some(record) = generator.next_record(clock.now()) {
            match sink.emit(&record) {
                Ok(()) => emitted += 1,
                Err(err) => warn!(generator = name, error = %err, "failed to emit record"),
            }
        }

        let delay = generator.next_delay();
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    debug!(generator = name, emitted, "generator stopped");
    (name, emitted)
}

fn generator_rng(seed: Option<u64>, kind: GeneratorKind) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ kind.salt()),
        None => StdRng::from_entropy(),
    }
}
