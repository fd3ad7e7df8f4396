// THEORY:
// Software correction of a full frame is embarrassingly parallel: every pixel is
// corrected on its own. `ParallelCorrector` cuts a frame into bands of whole rows,
// hands them round-robin to a fixed pool of worker tasks, and stitches the results
// back together in band order. The output is byte-identical to
// `ColorPipeline::render`, because every worker runs the same per-pixel
// `CvdEngine::correct`.
//
// Band buffers are recycled through a small pool so steady-state video does not
// allocate per frame.

use crate::core_modules::cvd_engine::CvdEngine;
use crate::core_modules::frame::Frame;
use crate::core_modules::mode_state::ModeState;
use crate::error::{HueLensError, Result};
use crate::pipeline::{ColorPipeline, PipelineConfig};
use futures::future::try_join_all;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

const BAND_POOL_SIZE: usize = 64;

/// A contiguous run of whole frame rows.
pub struct FrameBand {
    pub index: usize,
    pub data: Vec<u8>,
}

pub struct BandTask {
    pub band: FrameBand,
    pub mode: ModeState,
    pub result_sender: oneshot::Sender<FrameBand>,
}

pub struct WorkerPool {
    task_sender: mpsc::UnboundedSender<BandTask>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `worker_count` workers. Must be called inside a tokio runtime.
    pub fn new(engine: Arc<CvdEngine>, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<BandTask>();
        let mut workers = Vec::with_capacity(worker_count + 1);

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<BandTask>())
            .unzip();

        // Single dispatcher distributing bands round-robin.
        workers.push(tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                let _ = worker_senders[worker_idx].send(task);
                worker_idx = (worker_idx + 1) % worker_count;
            }
        }));

        for mut worker_receiver in worker_receivers {
            let worker_engine = Arc::clone(&engine);
            workers.push(tokio::spawn(async move {
                while let Some(task) = worker_receiver.recv().await {
                    let BandTask {
                        mut band,
                        mode,
                        result_sender,
                    } = task;
                    worker_engine.correct_rgba_in_place(&mut band.data, mode.deficiency, mode.enabled);
                    let _ = result_sender.send(band);
                }
            }));
        }

        Self {
            task_sender,
            workers,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len() - 1
    }

    pub async fn process_band(&self, band: FrameBand, mode: ModeState) -> Result<FrameBand> {
        let (result_sender, result_receiver) = oneshot::channel();
        let task = BandTask {
            band,
            mode,
            result_sender,
        };

        self.task_sender
            .send(task)
            .map_err(|_| HueLensError::WorkerUnavailable("failed to send band to worker pool"))?;

        result_receiver
            .await
            .map_err(|_| HueLensError::WorkerUnavailable("worker dropped band result"))
    }

    /// Closes the queue and waits for every worker to drain.
    pub async fn shutdown(self) {
        drop(self.task_sender);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

pub struct ParallelCorrector {
    worker_pool: WorkerPool,
    rows_per_band: u32,
    band_pool: Mutex<VecDeque<Vec<u8>>>,
    frame_counter: AtomicU64,
}

impl ParallelCorrector {
    /// Must be called inside a tokio runtime.
    pub fn new(engine: Arc<CvdEngine>, config: &PipelineConfig) -> Self {
        Self {
            worker_pool: WorkerPool::new(engine, config.resolved_worker_count()),
            rows_per_band: config.rows_per_band.max(1),
            band_pool: Mutex::new(VecDeque::with_capacity(BAND_POOL_SIZE)),
            frame_counter: AtomicU64::new(0),
        }
    }

    pub fn for_pipeline(pipeline: &ColorPipeline) -> Self {
        Self::new(Arc::clone(pipeline.engine()), pipeline.config())
    }

    pub fn worker_count(&self) -> usize {
        self.worker_pool.worker_count()
    }

    /// Corrected copy of `source` under `mode`; the source is left untouched.
    pub async fn correct_frame(&self, source: &Frame, mode: ModeState) -> Result<Frame> {
        let frame_id = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        if mode.active_deficiency().is_none() || source.data().is_empty() {
            return Ok(source.clone());
        }

        let band_bytes = self.rows_per_band as usize * source.stride();
        let pending = source
            .data()
            .chunks(band_bytes)
            .enumerate()
            .map(|(index, rows)| {
                let band = FrameBand {
                    index,
                    data: self.take_buffer(rows),
                };
                self.worker_pool.process_band(band, mode)
            });
        let bands = try_join_all(pending).await?;

        let band_count = bands.len();
        let mut data = vec![0u8; source.data().len()];
        for band in bands {
            let offset = band.index * band_bytes;
            data[offset..offset + band.data.len()].copy_from_slice(&band.data);
            self.return_buffer(band.data);
        }
        debug!(frame_id, band_count, deficiency = %mode.deficiency, "frame corrected in parallel");
        Frame::new(source.width(), source.height(), data)
    }

    fn take_buffer(&self, rows: &[u8]) -> Vec<u8> {
        let mut buffer = self
            .band_pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_default();
        buffer.clear();
        buffer.extend_from_slice(rows);
        buffer
    }

    fn return_buffer(&self, buffer: Vec<u8>) {
        let mut pool = self.band_pool.lock().unwrap_or_else(PoisonError::into_inner);
        if pool.len() < BAND_POOL_SIZE {
            pool.push_back(buffer);
        }
    }

    pub async fn shutdown(self) {
        self.worker_pool.shutdown().await;
    }
}
