mod rtc_devices;

pub use rtc_devices::*;

use async_trait::async_trait;
use huddle_core::ConnectionId;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

use crate::error::MediaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

#[derive(Debug)]
struct TrackFlags {
    enabled: AtomicBool,
    stopped: AtomicBool,
}

/// Shared view of a track's enabled/stopped flags, handed to sample writers.
#[derive(Debug, Clone)]
pub struct TrackState(Arc<TrackFlags>);

impl TrackState {
    fn new() -> Self {
        Self(Arc::new(TrackFlags {
            enabled: AtomicBool::new(true),
            stopped: AtomicBool::new(false),
        }))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.enabled.load(Ordering::Acquire)
    }

    pub fn is_stopped(&self) -> bool {
        self.0.stopped.load(Ordering::Acquire)
    }
}

/// One captured local track.
pub struct MediaTrack {
    kind: MediaKind,
    state: TrackState,
    rtc: Option<Arc<TrackLocalStaticSample>>,
}

impl MediaTrack {
    pub fn new(kind: MediaKind, rtc: Option<Arc<TrackLocalStaticSample>>) -> Self {
        Self {
            kind,
            state: TrackState::new(),
            rtc,
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn state(&self) -> TrackState {
        self.state.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    pub fn is_stopped(&self) -> bool {
        self.state.is_stopped()
    }

    /// The webrtc track peer connections attach, when the backend has one.
    pub fn rtc_track(&self) -> Option<&Arc<TrackLocalStaticSample>> {
        self.rtc.as_ref()
    }

    fn set_enabled(&self, enabled: bool) {
        self.state.0.enabled.store(enabled, Ordering::Release);
    }

    fn stop(&self) {
        self.state.0.stopped.store(true, Ordering::Release);
    }
}

impl fmt::Debug for MediaTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaTrack")
            .field("kind", &self.kind)
            .field("enabled", &self.is_enabled())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

type ReleaseFn = Box<dyn FnOnce() + Send + Sync>;

/// Held camera/microphone capture.
///
/// Dropping it stops every track and hands the devices back exactly once,
/// so a call that ends through any path leaves no capture running.
pub struct LocalMedia {
    tracks: Vec<MediaTrack>,
    release: Option<ReleaseFn>,
}

impl LocalMedia {
    pub fn new(tracks: Vec<MediaTrack>, release: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            tracks,
            release: Some(Box::new(release)),
        }
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn track(&self, kind: MediaKind) -> Option<&MediaTrack> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    /// Flips the enabled flag of every track of `kind`. Returns false when
    /// there is no such track.
    pub fn set_enabled(&self, kind: MediaKind, enabled: bool) -> bool {
        let mut found = false;
        for track in self.tracks.iter().filter(|t| t.kind == kind) {
            track.set_enabled(enabled);
            found = true;
        }
        found
    }
}

impl Drop for LocalMedia {
    fn drop(&mut self) {
        for track in &self.tracks {
            track.stop();
        }
        if let Some(release) = self.release.take() {
            debug!("Releasing {} local track(s)", self.tracks.len());
            release();
        }
    }
}

impl fmt::Debug for LocalMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalMedia")
            .field("tracks", &self.tracks)
            .finish()
    }
}

/// Source of local capture.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn acquire(&self, constraints: &MediaConstraints) -> Result<LocalMedia, MediaError>;
}

/// Handle to a stream a remote peer is sending us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStream {
    pub remote: ConnectionId,
    pub stream_id: String,
    pub track_id: String,
    pub kind: MediaKind,
}
