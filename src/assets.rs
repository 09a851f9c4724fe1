//! Background file loading.
//!
//! Every request runs on its own short-lived thread; results come back over
//! a channel and are only handed to the caller from [`AssetLoader::poll`],
//! so completions are always processed on the thread that owns the world.
//! There is no cancellation and no retry; stale results are filtered by the
//! `generation` the caller stamps on each request.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use image::RgbaImage;

use crate::error::AssetError;

/// Decoded content of a finished load.
#[derive(Debug)]
pub enum Payload {
    Text(String),
    Image(RgbaImage),
}

#[derive(Debug)]
pub struct Completion<T> {
    pub tag: T,
    pub generation: u64,
    pub path: PathBuf,
    pub result: Result<Payload, AssetError>,
}

#[derive(Copy, Clone, Debug)]
enum Kind {
    Text,
    Image,
}

pub struct AssetLoader<T> {
    tx: Sender<Completion<T>>,
    rx: Receiver<Completion<T>>,
    in_flight: usize,
}

impl<T: Clone + Send + 'static> Default for AssetLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> AssetLoader<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, in_flight: 0 }
    }

    /// Requests issued but not yet returned by `poll`/`wait`.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn request_text(&mut self, tag: T, generation: u64, path: impl Into<PathBuf>) {
        self.spawn(tag, generation, path.into(), Kind::Text);
    }

    pub fn request_image(&mut self, tag: T, generation: u64, path: impl Into<PathBuf>) {
        self.spawn(tag, generation, path.into(), Kind::Image);
    }

    fn spawn(&mut self, tag: T, generation: u64, path: PathBuf, kind: Kind) {
        self.in_flight += 1;
        let tx = self.tx.clone();
        let (thread_tag, thread_path) = (tag.clone(), path.clone());
        let spawned = std::thread::Builder::new()
            .name(format!("load {}", path.display()))
            .spawn(move || {
                let result = read(&thread_path, kind);
                let _ = tx.send(Completion { tag: thread_tag, generation, path: thread_path, result });
            });
        if let Err(source) = spawned {
            log::error!("unable to start loader thread for {}: {source}", path.display());
            let result = Err(AssetError::Io { path: path.clone(), source });
            let _ = self.tx.send(Completion { tag, generation, path, result });
        }
    }

    /// Every completion that has arrived, without blocking.
    pub fn poll(&mut self) -> Vec<Completion<T>> {
        let done: Vec<_> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(done.len());
        done
    }

    /// Block up to `timeout` for the next completion. `None` on timeout or
    /// when nothing is in flight.
    pub fn wait(&mut self, timeout: Duration) -> Option<Completion<T>> {
        if self.in_flight == 0 {
            return None;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(done) => {
                self.in_flight -= 1;
                Some(done)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

fn read(path: &Path, kind: Kind) -> Result<Payload, AssetError> {
    let io = |source| AssetError::Io { path: path.to_path_buf(), source };
    match kind {
        Kind::Text => std::fs::read_to_string(path).map(Payload::Text).map_err(io),
        Kind::Image => {
            let bytes = std::fs::read(path).map_err(io)?;
            Ok(Payload::Image(image::load_from_memory(&bytes)?.to_rgba8()))
        }
    }
}
