use crate::token::RequestTokens;
use crate::traits::JobBackend;
use crate::{ClientConfig, ClientError, EvaluationResult, Metrics, ScoringMode};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum RowStatus {
    Available(Metrics),
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRow {
    pub mode: ScoringMode,
    pub status: RowStatus,
}

impl EvaluationRow {
    pub fn metric(&self, name: &str) -> Option<f64> {
        match &self.status {
            RowStatus::Available(metrics) => metrics.get(name).copied(),
            RowStatus::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.status, RowStatus::Available(_))
    }
}

/// One row per scoring mode, always in baseline, embedding, hybrid order.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationTable {
    pub k: usize,
    pub rows: Vec<EvaluationRow>,
}

impl EvaluationTable {
    pub fn results(&self) -> Vec<EvaluationResult> {
        self.rows
            .iter()
            .filter_map(|row| match &row.status {
                RowStatus::Available(metrics) => Some(EvaluationResult {
                    mode: row.mode,
                    metrics: metrics.clone(),
                }),
                RowStatus::Unavailable(_) => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSnapshot {
    pub k: usize,
    pub running: bool,
    pub table: Option<EvaluationTable>,
}

#[derive(Debug)]
struct EvaluationState {
    k: usize,
    started: bool,
    running: bool,
    table: Option<EvaluationTable>,
}

pub struct EvaluationAggregator<B> {
    backend: Arc<B>,
    tokens: RequestTokens,
    state: Mutex<EvaluationState>,
}

impl<B> EvaluationAggregator<B>
where
    B: JobBackend,
{
    pub fn new(backend: Arc<B>, config: &ClientConfig) -> Self {
        Self {
            backend,
            tokens: RequestTokens::new(),
            state: Mutex::new(EvaluationState {
                k: config.evaluation_k,
                started: false,
                running: false,
                table: None,
            }),
        }
    }

    pub fn snapshot(&self) -> EvaluationSnapshot {
        let state = self.lock();
        EvaluationSnapshot {
            k: state.k,
            running: state.running,
            table: state.table.clone(),
        }
    }

    /// Entering the view runs once automatically; later calls are no-ops.
    pub async fn start(&self) -> EvaluationSnapshot {
        let first = {
            let mut state = self.lock();
            !std::mem::replace(&mut state.started, true)
        };
        if first {
            self.run().await
        } else {
            self.snapshot()
        }
    }

    /// Changes the cutoff without fetching; takes effect on the next rerun.
    pub fn set_k(&self, k: usize) -> Result<(), ClientError> {
        if k == 0 {
            return Err(ClientError::InvalidArgument("k must be at least 1".to_string()));
        }
        self.lock().k = k;
        Ok(())
    }

    pub async fn rerun(&self) -> EvaluationSnapshot {
        self.lock().started = true;
        self.run().await
    }

    async fn run(&self) -> EvaluationSnapshot {
        let (token, k) = {
            let mut state = self.lock();
            state.running = true;
            (self.tokens.issue(), state.k)
        };
        debug!(k, token = token.value(), "offline evaluation started");

        let (baseline, embedding, hybrid) = tokio::join!(
            self.evaluate(ScoringMode::Baseline, k),
            self.evaluate(ScoringMode::Embedding, k),
            self.evaluate(ScoringMode::Hybrid, k),
        );
        let rows = vec![baseline, embedding, hybrid];

        let mut state = self.lock();
        if self.tokens.is_current(token) {
            let available = rows.iter().filter(|row| row.is_available()).count();
            info!(k, available, "offline evaluation finished");
            state.table = Some(EvaluationTable { k, rows });
            state.running = false;
        } else {
            debug!(k, token = token.value(), "discarding superseded evaluation run");
        }
        drop(state);
        self.snapshot()
    }

    async fn evaluate(&self, mode: ScoringMode, k: usize) -> EvaluationRow {
        let status = match self.backend.offline_eval(mode, k).await {
            Ok(metrics) => RowStatus::Available(metrics),
            Err(error) => {
                warn!(mode = %mode, k, %error, "offline evaluation failed");
                RowStatus::Unavailable(error.user_message())
            }
        };
        EvaluationRow { mode, status }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EvaluationState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
