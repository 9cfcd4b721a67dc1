use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

use crate::error::MediaError;
use crate::media::{LocalMedia, MediaConstraints, MediaDevices, MediaKind, MediaTrack, TrackState};

const OPUS_FRAME: Duration = Duration::from_millis(20);

/// One 20 ms Opus frame of silence.
const OPUS_SILENCE: [u8; 3] = [0xf8, 0xff, 0xfe];

/// Local Opus/VP8 sample tracks for webrtc-rs peer connections.
///
/// The audio track is paced with silence frames so the remote side sees a
/// live stream; writes pause while the track is disabled. The video track
/// carries whatever a capture source writes into it.
pub struct RtcMediaDevices {
    stream_id: String,
}

impl RtcMediaDevices {
    pub fn new() -> Self {
        Self {
            stream_id: format!("huddle-{}", uuid::Uuid::new_v4()),
        }
    }
}

impl Default for RtcMediaDevices {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaDevices for RtcMediaDevices {
    async fn acquire(&self, constraints: &MediaConstraints) -> Result<LocalMedia, MediaError> {
        let mut tracks = Vec::new();

        if constraints.audio {
            let rtc = Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_OPUS.to_owned(),
                    clock_rate: 48000,
                    channels: 2,
                    ..Default::default()
                },
                "audio".to_owned(),
                self.stream_id.clone(),
            ));
            let track = MediaTrack::new(MediaKind::Audio, Some(rtc.clone()));
            spawn_silence(rtc, track.state());
            tracks.push(track);
        }

        if constraints.video {
            let rtc = Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    clock_rate: 90000,
                    ..Default::default()
                },
                "video".to_owned(),
                self.stream_id.clone(),
            ));
            tracks.push(MediaTrack::new(MediaKind::Video, Some(rtc)));
        }

        if tracks.is_empty() {
            return Err(MediaError::Unavailable(
                "neither audio nor video was requested".into(),
            ));
        }

        info!("Acquired {} local track(s) for {}", tracks.len(), self.stream_id);
        let stream_id = self.stream_id.clone();
        Ok(LocalMedia::new(tracks, move || {
            info!("Released local media {}", stream_id);
        }))
    }
}

fn spawn_silence(track: Arc<TrackLocalStaticSample>, state: TrackState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(OPUS_FRAME);

        while !state.is_stopped() {
            ticker.tick().await;
            if !state.is_enabled() {
                continue;
            }

            let sample = Sample {
                data: Bytes::from_static(&OPUS_SILENCE),
                duration: OPUS_FRAME,
                ..Default::default()
            };
            if let Err(e) = track.write_sample(&sample).await {
                debug!("Audio sample write failed: {}", e);
            }
        }
    });
}
