//! Frame sequencing against fake interpolator and encoder processes.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mosaic_common::MosaicError;
use sequencer::{
    ExternalTool, FfmpegEncoder, FrameSequenceOrchestrator, ProcessError, RifeInterpolator,
    ToolOutput,
};
use storage::{Session, SessionManager};
use test_utils::temp_test_dir;

// ============================================================================
// Fake tools
// ============================================================================

/// Writes `output/<i>.png` whose content is `<content of 0.png>+<i>`.
struct FakeRife {
    outputs: u32,
    fail_on_call: Option<usize>,
    calls: Mutex<usize>,
}

impl FakeRife {
    fn new(outputs: u32) -> Self {
        Self {
            outputs,
            fail_on_call: None,
            calls: Mutex::new(0),
        }
    }

    fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }
}

#[async_trait]
impl ExternalTool for FakeRife {
    async fn run(&self, args: &[String], working_dir: &Path) -> Result<ToolOutput, ProcessError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        assert!(args.contains(&"--img".to_string()));

        if self.fail_on_call == Some(call) {
            return Err(ProcessError::Failed {
                program: "python".to_string(),
                status: Some(1),
                stderr: "CUDA out of memory".to_string(),
            });
        }

        let start = std::fs::read_to_string(working_dir.join("0.png")).unwrap();
        let output = working_dir.join("output");
        std::fs::create_dir_all(&output).unwrap();
        for i in 0..self.outputs {
            std::fs::write(output.join(format!("{}.png", i)), format!("{}+{}", start, i)).unwrap();
        }
        Ok(ToolOutput::default())
    }
}

/// Records the numbered input sequence and writes the output file.
#[derive(Default)]
struct FakeFfmpeg {
    seen: Mutex<Vec<String>>,
    missing_binary: bool,
}

#[async_trait]
impl ExternalTool for FakeFfmpeg {
    async fn run(&self, args: &[String], working_dir: &Path) -> Result<ToolOutput, ProcessError> {
        if self.missing_binary {
            return Err(ProcessError::NotFound("ffmpeg".to_string()));
        }

        let mut seen = Vec::new();
        let mut n = 0;
        while let Ok(content) = std::fs::read_to_string(working_dir.join(format!("{}.png", n))) {
            seen.push(content);
            n += 1;
        }
        *self.seen.lock().unwrap() = seen;

        let output = args.last().unwrap();
        std::fs::write(working_dir.join(output), b"mp4").unwrap();
        Ok(ToolOutput::default())
    }
}

fn orchestrator(rife: Arc<FakeRife>, ffmpeg: Arc<FakeFfmpeg>, exponent: u32) -> FrameSequenceOrchestrator {
    FrameSequenceOrchestrator::new(
        RifeInterpolator::new(rife, "inference_img_preserve.py", "train_log")
            .with_exponent(exponent)
            .unwrap(),
        FfmpegEncoder::new(ffmpeg),
    )
}

async fn session_with_frames(manager: &SessionManager, labels: &[&str]) -> Session {
    let session = manager.create().await.unwrap();
    for label in labels {
        std::fs::write(session.dir().join(format!("frame_{}.png", label)), label).unwrap();
    }
    session
}

fn interpolated_labels(session: &Session) -> Vec<String> {
    let mut labels: Vec<String> = std::fs::read_dir(session.layout.interpolated_dir())
        .unwrap()
        .filter_map(|e| {
            let e = e.unwrap();
            e.file_type().unwrap().is_file().then(|| {
                e.file_name()
                    .to_string_lossy()
                    .trim_end_matches(".png")
                    .to_string()
            })
        })
        .collect();
    labels.sort();
    labels
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_single_pair_yields_32_minute_frames() {
    let root = temp_test_dir();
    let manager = SessionManager::new(root.path());
    let session = session_with_frames(&manager, &["0900", "0930"]).await;
    let ffmpeg = Arc::new(FakeFfmpeg::default());

    let artifact = orchestrator(Arc::new(FakeRife::new(32)), ffmpeg.clone(), 5)
        .run(&session)
        .await
        .unwrap();

    assert_eq!(artifact.frame_count, 32);
    assert_eq!(artifact.path, session.layout.video_path());
    assert!(artifact.path.exists());

    let labels = interpolated_labels(&session);
    let expected: Vec<String> = (0..32).map(|m| format!("09{:02}", m)).collect();
    assert_eq!(labels, expected);
    assert_eq!(labels.first().unwrap(), "0900");
    assert_eq!(labels.last().unwrap(), "0931");

    // The original mosaic frames are untouched
    assert_eq!(
        std::fs::read_to_string(session.dir().join("frame_0900.png")).unwrap(),
        "0900"
    );
    assert_eq!(
        std::fs::read_to_string(session.dir().join("frame_0930.png")).unwrap(),
        "0930"
    );
}

#[tokio::test]
async fn test_renumbering_is_contiguous_and_time_ordered() {
    let root = temp_test_dir();
    let manager = SessionManager::new(root.path());
    let session = session_with_frames(&manager, &["0945", "0915", "1015"]).await;
    let ffmpeg = Arc::new(FakeFfmpeg::default());

    let artifact = orchestrator(Arc::new(FakeRife::new(32)), ffmpeg.clone(), 5)
        .run(&session)
        .await
        .unwrap();

    // 0915..0946 from the first pair, 0945..1016 from the second; two overlap
    assert_eq!(artifact.frame_count, 62);

    let seen = ffmpeg.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 62);
    assert_eq!(seen[0], "0915+0");
    assert_eq!(seen[29], "0915+29");
    // Overlapping minutes come from the later pair
    assert_eq!(seen[30], "0945+0");
    assert_eq!(seen[31], "0945+1");
    assert_eq!(seen[61], "0945+31");
}

#[tokio::test]
async fn test_scratch_directories_removed_after_success() {
    let root = temp_test_dir();
    let manager = SessionManager::new(root.path());
    let session = session_with_frames(&manager, &["0900", "0930"]).await;

    orchestrator(Arc::new(FakeRife::new(4)), Arc::new(FakeFfmpeg::default()), 2)
        .run(&session)
        .await
        .unwrap();

    assert!(!session.layout.scratch_dir().exists());
    assert!(!session.layout.renamed_dir().exists());
    assert!(session.layout.interpolated_dir().is_dir());
}

#[tokio::test]
async fn test_rerun_starts_from_clean_interpolated_dir() {
    let root = temp_test_dir();
    let manager = SessionManager::new(root.path());
    let session = session_with_frames(&manager, &["0900", "0930"]).await;
    let ffmpeg = Arc::new(FakeFfmpeg::default());
    let runner = orchestrator(Arc::new(FakeRife::new(4)), ffmpeg.clone(), 2);

    runner.run(&session).await.unwrap();
    std::fs::remove_file(session.dir().join("frame_0930.png")).unwrap();
    std::fs::write(session.dir().join("frame_1000.png"), "1000").unwrap();
    let artifact = runner.run(&session).await.unwrap();

    assert_eq!(artifact.frame_count, 4);
    assert_eq!(interpolated_labels(&session), vec!["0900", "0901", "0902", "0903"]);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_fewer_than_two_frames_rejected() {
    let root = temp_test_dir();
    let manager = SessionManager::new(root.path());
    let session = session_with_frames(&manager, &["0900"]).await;
    let rife = Arc::new(FakeRife::new(32));

    let err = orchestrator(rife.clone(), Arc::new(FakeFfmpeg::default()), 5)
        .run(&session)
        .await
        .unwrap_err();

    assert!(matches!(err, MosaicError::InvalidInput(_)));
    assert_eq!(*rife.calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_interpolation_failure_aborts_without_video() {
    let root = temp_test_dir();
    let manager = SessionManager::new(root.path());
    let session = session_with_frames(&manager, &["0900", "0930", "1000"]).await;
    let rife = Arc::new(FakeRife::new(32).failing_on(2));
    let ffmpeg = Arc::new(FakeFfmpeg::default());

    let err = orchestrator(rife.clone(), ffmpeg.clone(), 5)
        .run(&session)
        .await
        .unwrap_err();

    match err {
        MosaicError::InterpolationFailed(message) => assert!(message.contains("CUDA out of memory")),
        other => panic!("expected InterpolationFailed, got {:?}", other),
    }
    assert_eq!(*rife.calls.lock().unwrap(), 2);
    assert!(ffmpeg.seen.lock().unwrap().is_empty());
    assert!(!session.layout.video_path().exists());
    assert!(!session.layout.scratch_dir().exists());
}

#[tokio::test]
async fn test_missing_interpolator_output_is_failure() {
    let root = temp_test_dir();
    let manager = SessionManager::new(root.path());
    let session = session_with_frames(&manager, &["0900", "0930"]).await;

    // Produces 16 frames where 32 are expected
    let err = orchestrator(Arc::new(FakeRife::new(16)), Arc::new(FakeFfmpeg::default()), 5)
        .run(&session)
        .await
        .unwrap_err();

    assert!(matches!(err, MosaicError::InterpolationFailed(_)));
}

#[tokio::test]
async fn test_missing_encoder_is_encoding_failure() {
    let root = temp_test_dir();
    let manager = SessionManager::new(root.path());
    let session = session_with_frames(&manager, &["0900", "0930"]).await;
    let ffmpeg = Arc::new(FakeFfmpeg {
        missing_binary: true,
        ..Default::default()
    });

    let err = orchestrator(Arc::new(FakeRife::new(32)), ffmpeg, 5)
        .run(&session)
        .await
        .unwrap_err();

    match err {
        MosaicError::EncodingFailed(message) => assert!(message.contains("FFMPEG_PATH")),
        other => panic!("expected EncodingFailed, got {:?}", other),
    }
    assert!(!session.layout.video_path().exists());
    assert!(!session.layout.renamed_dir().exists());
}
