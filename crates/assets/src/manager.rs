use crate::AssetError;
use crate::decode::{LoadedTexture, decode_cube, decode_file};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use torusfield_common::{ColorSpace, CubeFaces, TextureHandle, TextureLoader};

/// Counts of requested and finished textures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadProgress {
    pub finished: u32,
    pub failed: u32,
    pub total: u32,
}

impl LoadProgress {
    pub fn is_complete(&self) -> bool {
        self.finished == self.total
    }
}

/// What [`LoadingManager::poll`] reports.
#[derive(Debug)]
pub enum LoadEvent {
    Loaded {
        handle: TextureHandle,
        texture: LoadedTexture,
    },
    Failed {
        handle: TextureHandle,
        error: AssetError,
    },
    /// One more request finished.
    Progress { source: String, progress: LoadProgress },
    /// Every request issued so far has finished.
    AllLoaded(LoadProgress),
}

enum Request {
    Flat {
        handle: TextureHandle,
        path: PathBuf,
        color_space: ColorSpace,
    },
    Cube {
        handle: TextureHandle,
        faces: CubeFaces,
    },
}

struct Outcome {
    handle: TextureHandle,
    source: String,
    result: Result<LoadedTexture, AssetError>,
}

/// Decodes textures on one background thread, in request order.
///
/// Implements [`TextureLoader`], so the scene builder can request textures
/// through it. Results come back through [`poll`](Self::poll) (per frame)
/// or [`wait_all`](Self::wait_all) (blocking, for headless tools).
pub struct LoadingManager {
    requests: Sender<Request>,
    results: Receiver<Outcome>,
    _worker: JoinHandle<()>,
    next_handle: u32,
    outstanding: Vec<TextureHandle>,
    /// Requests that never reached the worker.
    undelivered: Vec<Outcome>,
    /// Events gathered by a `wait_all` that timed out, handed out next poll.
    ready: Vec<LoadEvent>,
    progress: LoadProgress,
}

impl Default for LoadingManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingManager {
    pub fn new() -> Self {
        let (requests, request_rx) = mpsc::channel::<Request>();
        let (result_tx, results) = mpsc::channel::<Outcome>();
        let worker = thread::spawn(move || Self::worker_loop(request_rx, result_tx));
        Self {
            requests,
            results,
            _worker: worker,
            next_handle: 0,
            outstanding: Vec::new(),
            undelivered: Vec::new(),
            ready: Vec::new(),
            progress: LoadProgress::default(),
        }
    }

    pub fn progress(&self) -> LoadProgress {
        self.progress
    }

    fn worker_loop(requests: Receiver<Request>, results: Sender<Outcome>) {
        while let Ok(request) = requests.recv() {
            let outcome = match request {
                Request::Flat {
                    handle,
                    path,
                    color_space,
                } => Outcome {
                    handle,
                    source: path.display().to_string(),
                    result: decode_file(&path)
                        .map(|image| LoadedTexture::Flat { image, color_space }),
                },
                Request::Cube { handle, faces } => Outcome {
                    handle,
                    source: faces.0[0]
                        .parent()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default(),
                    result: decode_cube(&faces).map(LoadedTexture::Cube),
                },
            };
            if results.send(outcome).is_err() {
                break;
            }
        }
    }

    fn submit(&mut self, request: Request, handle: TextureHandle, source: String) {
        self.progress.total += 1;
        self.outstanding.push(handle);
        tracing::debug!(handle = handle.0, %source, "texture requested");
        if self.requests.send(request).is_err() {
            self.undelivered.push(Outcome {
                handle,
                source,
                result: Err(AssetError::Disconnected),
            });
        }
    }

    fn next_handle(&mut self) -> TextureHandle {
        let handle = TextureHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn finish(&mut self, outcome: Outcome, events: &mut Vec<LoadEvent>) {
        let Some(pos) = self.outstanding.iter().position(|h| *h == outcome.handle) else {
            return;
        };
        self.outstanding.swap_remove(pos);
        self.progress.finished += 1;

        match outcome.result {
            Ok(texture) => {
                tracing::debug!(
                    handle = outcome.handle.0,
                    source = %outcome.source,
                    kind = texture.kind(),
                    "texture loaded"
                );
                events.push(LoadEvent::Loaded {
                    handle: outcome.handle,
                    texture,
                });
            }
            Err(error) => {
                self.progress.failed += 1;
                tracing::error!(
                    handle = outcome.handle.0,
                    source = %outcome.source,
                    %error,
                    "texture failed to load"
                );
                events.push(LoadEvent::Failed {
                    handle: outcome.handle,
                    error,
                });
            }
        }

        tracing::debug!(
            finished = self.progress.finished,
            total = self.progress.total,
            "loading progress"
        );
        events.push(LoadEvent::Progress {
            source: outcome.source,
            progress: self.progress,
        });

        if self.outstanding.is_empty() {
            tracing::info!(
                total = self.progress.total,
                failed = self.progress.failed,
                "all textures loaded"
            );
            events.push(LoadEvent::AllLoaded(self.progress));
        }
    }

    fn fail_outstanding(&mut self, events: &mut Vec<LoadEvent>) {
        for handle in self.outstanding.clone() {
            self.finish(
                Outcome {
                    handle,
                    source: String::new(),
                    result: Err(AssetError::Disconnected),
                },
                events,
            );
        }
    }

    /// Collect everything that finished since the last call. Never blocks.
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let mut events = std::mem::take(&mut self.ready);
        for outcome in std::mem::take(&mut self.undelivered) {
            self.finish(outcome, &mut events);
        }
        while !self.outstanding.is_empty() {
            match self.results.try_recv() {
                Ok(outcome) => self.finish(outcome, &mut events),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.fail_outstanding(&mut events);
                    break;
                }
            }
        }
        events
    }

    /// Block until every request has finished or `timeout` passes.
    ///
    /// On timeout nothing is lost: the events gathered so far are returned
    /// by the next [`poll`](Self::poll) or `wait_all`.
    pub fn wait_all(&mut self, timeout: Duration) -> Result<Vec<LoadEvent>, AssetError> {
        let deadline = Instant::now() + timeout;
        let mut events = self.poll();
        while !self.outstanding.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(remaining) {
                Ok(outcome) => self.finish(outcome, &mut events),
                Err(RecvTimeoutError::Timeout) => {
                    self.ready = events;
                    return Err(AssetError::Timeout {
                        pending: self.outstanding.len() as u32,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => self.fail_outstanding(&mut events),
            }
        }
        Ok(events)
    }
}

impl TextureLoader for LoadingManager {
    fn load_texture(&mut self, path: PathBuf, color_space: ColorSpace) -> TextureHandle {
        let handle = self.next_handle();
        let source = path.display().to_string();
        self.submit(
            Request::Flat {
                handle,
                path,
                color_space,
            },
            handle,
            source,
        );
        handle
    }

    fn load_cube(&mut self, faces: CubeFaces) -> TextureHandle {
        let handle = self.next_handle();
        let source = faces.0[0]
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        self.submit(Request::Cube { handle, faces }, handle, source);
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::tests::{write_cube, write_png};

    const WAIT: Duration = Duration::from_secs(10);

    #[test]
    fn handles_are_sequential() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = LoadingManager::new();
        let a = m.load_texture(dir.path().join("a.png"), ColorSpace::Linear);
        let b = m.load_texture(dir.path().join("b.png"), ColorSpace::Srgb);
        assert_eq!((a, b), (TextureHandle(0), TextureHandle(1)));
        assert_eq!(m.progress().total, 2);
    }

    #[test]
    fn loads_flat_and_cube() {
        let dir = tempfile::tempdir().unwrap();
        let normal = write_png(dir.path(), "normal.png", 2, 2, [128, 128, 255, 255]);
        let faces = write_cube(dir.path(), 2);

        let mut m = LoadingManager::new();
        let n = m.load_texture(normal, ColorSpace::Linear);
        let c = m.load_cube(faces);
        let events = m.wait_all(WAIT).unwrap();

        let loaded: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                LoadEvent::Loaded { handle, texture } => Some((*handle, texture.kind())),
                _ => None,
            })
            .collect();
        assert_eq!(loaded, vec![(n, "texture"), (c, "cube map")]);
        assert!(matches!(
            events.last(),
            Some(LoadEvent::AllLoaded(LoadProgress {
                finished: 2,
                failed: 0,
                total: 2
            }))
        ));
    }

    #[test]
    fn failure_is_reported_and_loading_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "good.png", 1, 1, [1, 2, 3, 255]);

        let mut m = LoadingManager::new();
        let missing = m.load_texture(dir.path().join("missing.jpg"), ColorSpace::Srgb);
        m.load_texture(good, ColorSpace::Srgb);
        let events = m.wait_all(WAIT).unwrap();

        assert!(events.iter().any(|e| matches!(
            e,
            LoadEvent::Failed { handle, error: AssetError::Io { .. } } if *handle == missing
        )));
        let progress = m.progress();
        assert!(progress.is_complete());
        assert_eq!(progress.failed, 1);
    }

    #[test]
    fn progress_counts_up() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = LoadingManager::new();
        for i in 0..3 {
            let p = write_png(dir.path(), &format!("{i}.png"), 1, 1, [0, 0, 0, 255]);
            m.load_texture(p, ColorSpace::Srgb);
        }
        let finished: Vec<u32> = m
            .wait_all(WAIT)
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                LoadEvent::Progress { progress, .. } => Some(progress.finished),
                _ => None,
            })
            .collect();
        assert_eq!(finished, vec![1, 2, 3]);
    }

    #[test]
    fn timed_out_wait_keeps_finished_results() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "good.png", 1, 1, [9, 9, 9, 255]);

        let mut m = LoadingManager::new();
        let h = m.load_texture(good, ColorSpace::Srgb);
        // A request the worker never answers.
        m.outstanding.push(TextureHandle(99));
        m.progress.total += 1;

        let err = m.wait_all(Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, AssetError::Timeout { pending: 1 }));

        let events = m.poll();
        let loaded: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                LoadEvent::Loaded { handle, .. } => Some(*handle),
                _ => None,
            })
            .collect();
        assert_eq!(loaded, vec![h]);
        assert_eq!(m.progress().finished, 1);
        assert!(m.poll().is_empty());
    }

    #[test]
    fn poll_with_nothing_requested_is_empty() {
        let mut m = LoadingManager::new();
        assert!(m.poll().is_empty());
        assert!(m.progress().is_complete());
    }
}
