use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, warn};

use super::{compression_config::CompressionMode, decoder::Decoder, error::DecoderError};

struct DecompressionJob<T> {
    tag: T,
    bytes: Vec<u8>,
}

/// Output of a finished decompression job, carrying the tag it was submitted with
pub struct DecompressionResult<T> {
    pub tag: T,
    pub result: Result<Vec<u8>, DecoderError>,
}

/// Runs decompression on a background thread so large history batches do
/// not stall the tick that received them. Results come back in submission
/// order.
pub struct DecompressionWorker<T: Send + 'static> {
    job_sender: Option<Sender<DecompressionJob<T>>>,
    result_receiver: Receiver<DecompressionResult<T>>,
    handle: Option<JoinHandle<()>>,
    in_flight: usize,
}

impl<T: Send + 'static> DecompressionWorker<T> {
    pub fn try_spawn(
        compression_mode: CompressionMode,
        max_decompressed_bytes: usize,
    ) -> Result<Self, DecoderError> {
        let mut decoder = Decoder::try_new(compression_mode, max_decompressed_bytes)?;
        let (job_sender, job_receiver) = channel::unbounded::<DecompressionJob<T>>();
        let (result_sender, result_receiver) = channel::unbounded();

        let handle = thread::spawn(move || {
            for job in job_receiver {
                let result = decoder.try_decode(&job.bytes);
                if result_sender
                    .send(DecompressionResult {
                        tag: job.tag,
                        result,
                    })
                    .is_err()
                {
                    break;
                }
            }
            debug!("Decompression worker shutting down");
        });

        Ok(Self {
            job_sender: Some(job_sender),
            result_receiver,
            handle: Some(handle),
            in_flight: 0,
        })
    }

    /// Queue a compressed payload. Returns false if the worker thread is gone.
    pub fn submit(&mut self, tag: T, bytes: Vec<u8>) -> bool {
        let Some(sender) = &self.job_sender else {
            return false;
        };
        if sender.send(DecompressionJob { tag, bytes }).is_err() {
            warn!("Decompression worker is no longer running");
            return false;
        }
        self.in_flight += 1;
        true
    }

    /// Collect every result that has finished so far, without blocking
    pub fn drain_results(&mut self) -> Vec<DecompressionResult<T>> {
        let results: Vec<_> = self.result_receiver.try_iter().collect();
        self.in_flight -= results.len();
        results
    }

    /// Block until every submitted job has finished
    pub fn flush(&mut self) -> Vec<DecompressionResult<T>> {
        let mut results = Vec::with_capacity(self.in_flight);
        while self.in_flight > 0 {
            match self.result_receiver.recv() {
                Ok(result) => {
                    self.in_flight -= 1;
                    results.push(result);
                }
                Err(_) => {
                    warn!("Decompression worker exited with {} jobs pending", self.in_flight);
                    self.in_flight = 0;
                }
            }
        }
        results
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl<T: Send + 'static> Drop for DecompressionWorker<T> {
    fn drop(&mut self) {
        // closing the channel ends the worker loop
        self.job_sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Decompression worker panicked");
            }
        }
    }
}
