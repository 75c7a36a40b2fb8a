//! Request-level metrics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use metrics::counter;

/// Counters for the API surface, readable without a Prometheus recorder.
#[derive(Debug)]
pub struct MetricsCollector {
    pub mosaic_requests: AtomicU64,
    pub video_requests: AtomicU64,
    pub frames_written: AtomicU64,
    pub videos_encoded: AtomicU64,
    pub request_errors: AtomicU64,
    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            mosaic_requests: AtomicU64::new(0),
            video_requests: AtomicU64::new(0),
            frames_written: AtomicU64::new(0),
            videos_encoded: AtomicU64::new(0),
            request_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_mosaic_request(&self) {
        self.mosaic_requests.fetch_add(1, Ordering::Relaxed);
        counter!("mosaic_requests_total").increment(1);
    }

    pub fn record_video_request(&self) {
        self.video_requests.fetch_add(1, Ordering::Relaxed);
        counter!("mosaic_video_requests_total").increment(1);
    }

    pub fn record_frame_written(&self) {
        self.frames_written.fetch_add(1, Ordering::Relaxed);
        counter!("mosaic_frames_written_total").increment(1);
    }

    pub fn record_video_encoded(&self) {
        self.videos_encoded.fetch_add(1, Ordering::Relaxed);
        counter!("mosaic_videos_encoded_total").increment(1);
    }

    pub fn record_error(&self, code: &'static str) {
        self.request_errors.fetch_add(1, Ordering::Relaxed);
        counter!("mosaic_request_errors_total", "code" => code).increment(1);
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Prometheus text exposition of the collector's own counters.
    pub fn render(&self) -> String {
        let mut output = String::new();
        for (name, help, value) in [
            ("mosaic_api_mosaic_requests", "Mosaic generation requests", &self.mosaic_requests),
            ("mosaic_api_video_requests", "Video generation requests", &self.video_requests),
            ("mosaic_api_frames_written", "Mosaic frames written to disk", &self.frames_written),
            ("mosaic_api_videos_encoded", "Videos encoded", &self.videos_encoded),
            ("mosaic_api_request_errors", "Requests that returned an error", &self.request_errors),
        ] {
            output.push_str(&format!(
                "# HELP {name} {help}\n# TYPE {name} counter\n{name} {}\n",
                value.load(Ordering::Relaxed)
            ));
        }
        output.push_str(&format!(
            "# HELP mosaic_api_uptime_seconds Process uptime\n# TYPE mosaic_api_uptime_seconds gauge\nmosaic_api_uptime_seconds {}\n",
            self.uptime_secs()
        ));
        output
    }
}
