//! Event dispatch for the compressor window.
//!
//! [`Controller::handle`] maps every [`Event`] (user input or a finished
//! async task) to its handler and returns the [`Effect`]s to run. Nothing in
//! here depends on the UI toolkit or performs I/O, which keeps the whole
//! session lifecycle testable.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::{CompressorError, CompressorResult};
use crate::orchestrator::{Completion, CompressionOutcome, CompressionRequest, DebounceTicket, Orchestrator};
use crate::state::{Quality, Session, SessionId, Settings, SourceFile};
use crate::input::{check_extension, DropZone};
use crate::ui::Presenter;

/// Identifies one file read; only the latest read may load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadTicket(u64);

/// Everything the controller reacts to
#[derive(Debug, Clone)]
pub enum Event {
    /// A drag with files entered the window
    DragEntered,
    /// The drag left without dropping
    DragLeft,
    /// A file was dropped on the window
    FileDropped(PathBuf),
    /// The drop zone was clicked
    BrowseClicked,
    /// The file picker closed (None if cancelled)
    FilePicked(Option<PathBuf>),
    /// A file read finished
    FileRead {
        ticket: ReadTicket,
        result: CompressorResult<SourceFile>,
    },
    /// The quality slider moved
    QualityChanged(u8),
    /// A debounce timer expired
    DebounceElapsed(DebounceTicket),
    /// A compression request finished
    CompressionFinished(CompressionOutcome),
    DownloadClicked,
    /// The save dialog/write finished (None if cancelled)
    DownloadFinished(CompressorResult<Option<PathBuf>>),
    ResetClicked,
}

/// Side effects the UI shell must run
#[derive(Debug, Clone)]
pub enum Effect {
    OpenPicker,
    ReadFile { ticket: ReadTicket, path: PathBuf },
    StartTimer { ticket: DebounceTicket, after: Duration },
    Compress(CompressionRequest),
    SaveFile { file_name: String, data: Arc<Vec<u8>> },
    /// Blocking notification for the user
    Alert(String),
}

#[derive(Debug, Clone)]
pub struct Controller {
    settings: Settings,
    session: Option<Session>,
    quality: Quality,
    orchestrator: Orchestrator,
    presenter: Presenter,
    drop_zone: DropZone,
    next_session: u64,
    next_read: u64,
    pending_read: Option<ReadTicket>,
}

impl Controller {
    pub fn new(settings: Settings) -> Self {
        Self {
            quality: settings.default_quality(),
            orchestrator: Orchestrator::new(&settings),
            settings,
            session: None,
            presenter: Presenter::default(),
            drop_zone: DropZone::default(),
            next_session: 0,
            next_read: 0,
            pending_read: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    pub fn drop_zone(&self) -> &DropZone {
        &self.drop_zone
    }

    pub fn can_download(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.artifact().is_some())
    }

    /// Dispatch one event to its handler
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::DragEntered => {
                self.drop_zone.hover();
                Vec::new()
            }
            Event::DragLeft => {
                self.drop_zone.leave();
                Vec::new()
            }
            Event::FileDropped(path) => match self.drop_zone.drop_file(path) {
                Some(path) => self.start_read(path),
                None => Vec::new(),
            },
            Event::BrowseClicked => vec![Effect::OpenPicker],
            Event::FilePicked(Some(path)) => self.start_read(path),
            Event::FilePicked(None) => Vec::new(),
            Event::FileRead { ticket, result } => self.file_read(ticket, result),
            Event::QualityChanged(percent) => self.quality_changed(percent),
            Event::DebounceElapsed(ticket) => self
                .orchestrator
                .debounce_elapsed(ticket, self.session.as_ref(), self.quality)
                .map(Effect::Compress)
                .into_iter()
                .collect(),
            Event::CompressionFinished(outcome) => self.compression_finished(outcome),
            Event::DownloadClicked => self.download(),
            Event::DownloadFinished(result) => self.download_finished(result),
            Event::ResetClicked => {
                self.reset();
                Vec::new()
            }
        }
    }

    fn start_read(&mut self, path: PathBuf) -> Vec<Effect> {
        // Leaves any read in flight and the status line alone
        if let Err(e) = check_extension(&path) {
            let e = CompressorError::from(e);
            warn!("{}", e);
            return vec![Effect::Alert(e.user_message())];
        }

        self.next_read += 1;
        let ticket = ReadTicket(self.next_read);
        self.pending_read = Some(ticket);
        self.presenter.set_status(format!("Reading {}...", path.display()));
        vec![Effect::ReadFile { ticket, path }]
    }

    fn file_read(&mut self, ticket: ReadTicket, result: CompressorResult<SourceFile>) -> Vec<Effect> {
        self.drop_zone.settle();
        if self.pending_read != Some(ticket) {
            debug!("Ignoring superseded file read");
            return Vec::new();
        }
        self.pending_read = None;

        match result {
            Ok(source) => self.load(source),
            Err(e) => self.fail(e),
        }
    }

    /// Replace the session with a new source and start its first compression
    fn load(&mut self, source: SourceFile) -> Vec<Effect> {
        info!("Loaded {} ({}, {} bytes)", source.name, source.media_type, source.size());
        debug!("Source path: {:?}", source.path);

        self.next_session += 1;
        self.orchestrator.cancel_pending();
        self.presenter.show_original(&source);
        self.presenter.show_controls();
        self.presenter.set_status(format!("Compressing {}...", source.name));

        let session = Session::new(SessionId(self.next_session), source);
        let request = self.orchestrator.request(&session, self.quality);
        self.session = Some(session);

        vec![Effect::Compress(request)]
    }

    fn quality_changed(&mut self, percent: u8) -> Vec<Effect> {
        self.quality = Quality::new(percent);
        if self.session.is_none() {
            return Vec::new();
        }

        let ticket = self.orchestrator.quality_changed();
        vec![Effect::StartTimer {
            ticket,
            after: self.orchestrator.debounce_window(),
        }]
    }

    fn compression_finished(&mut self, outcome: CompressionOutcome) -> Vec<Effect> {
        match self.orchestrator.complete(self.session.as_mut(), outcome) {
            Completion::Installed { artifact, .. } => {
                let original_size = self.session.as_ref().map_or(0, |s| s.source().size());
                self.presenter.show_compressed(original_size, &artifact);
                let status = self
                    .presenter
                    .savings_label()
                    .unwrap_or_default();
                self.presenter.set_status(format!("{} at quality {}", status, artifact.quality));
                Vec::new()
            }
            Completion::Failed(e) => self.fail(e.into()),
            Completion::Stale => Vec::new(),
        }
    }

    fn download(&mut self) -> Vec<Effect> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        let Some(artifact) = session.artifact() else {
            return Vec::new();
        };

        vec![Effect::SaveFile {
            file_name: session.download_name(),
            data: Arc::clone(&artifact.data),
        }]
    }

    fn download_finished(&mut self, result: CompressorResult<Option<PathBuf>>) -> Vec<Effect> {
        match result {
            Ok(Some(path)) => {
                info!("Saved compressed image to {}", path.display());
                self.presenter.set_status(format!("Saved to {}", path.display()));
                Vec::new()
            }
            Ok(None) => Vec::new(),
            Err(e) => self.fail(e),
        }
    }

    /// Discard the session and return to the initial screen
    fn reset(&mut self) {
        self.session = None;
        self.quality = self.settings.default_quality();
        if self.orchestrator.has_pending_change() {
            debug!("Dropping pending quality change");
        }
        self.orchestrator.cancel_pending();
        self.pending_read = None;
        self.drop_zone = DropZone::default();
        self.presenter.reset();
        debug!("Session reset");
    }

    fn fail(&mut self, e: CompressorError) -> Vec<Effect> {
        error!("{}", e);
        self.presenter.set_status(e.to_string());
        vec![Effect::Alert(e.user_message())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::NativeCompressor;
    use crate::error::{CompressionError, InputError};
    use crate::orchestrator;
    use crate::ui::presenter::EMPTY_SIZE_LABEL;

    fn controller() -> Controller {
        Controller::new(Settings::default())
    }

    fn jpeg(name: &str, size: usize) -> SourceFile {
        SourceFile::new(name, "image/jpeg", vec![0xAB; size])
    }

    /// Drive a pick + read through the controller, returning the effects of the read
    fn load(controller: &mut Controller, source: SourceFile) -> Vec<Effect> {
        let effects = controller.handle(Event::FilePicked(Some(PathBuf::from(&source.name))));
        let ticket = match effects.as_slice() {
            [Effect::ReadFile { ticket, .. }] => *ticket,
            other => panic!("expected a read, got {:?}", other),
        };
        controller.handle(Event::FileRead {
            ticket,
            result: Ok(source),
        })
    }

    fn compress_requests(effects: &[Effect]) -> Vec<&CompressionRequest> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Compress(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    fn finish(request: &CompressionRequest, size: usize) -> Event {
        Event::CompressionFinished(CompressionOutcome {
            id: request.id,
            session: request.session,
            quality: request.quality,
            result: Ok(vec![1; size]),
        })
    }

    #[test]
    fn test_non_image_rejected_without_state_change() {
        let mut controller = controller();
        let effects = controller.handle(Event::FilePicked(Some(PathBuf::from("notes.txt"))));

        assert!(matches!(effects.as_slice(), [Effect::Alert(msg)] if msg == "Please select an image file!"));
        assert!(controller.session().is_none());
        assert!(!controller.presenter().sections_visible());
    }

    #[test]
    fn test_sniffed_non_image_rejected_after_read() {
        let mut controller = controller();
        let effects = controller.handle(Event::FilePicked(Some(PathBuf::from("download.bin"))));
        let ticket = match effects.as_slice() {
            [Effect::ReadFile { ticket, .. }] => *ticket,
            other => panic!("expected a read, got {:?}", other),
        };

        let effects = controller.handle(Event::FileRead {
            ticket,
            result: Err(InputError::NotAnImage {
                name: "download.bin".into(),
                media_type: "application/octet-stream".into(),
            }
            .into()),
        });

        assert!(matches!(effects.as_slice(), [Effect::Alert(msg)] if msg == "Please select an image file!"));
        assert!(controller.session().is_none());
    }

    #[test]
    fn test_non_image_pick_keeps_image_read_in_flight() {
        let mut controller = controller();
        let ticket = match controller.handle(Event::FilePicked(Some(PathBuf::from("photo.jpg")))).as_slice() {
            [Effect::ReadFile { ticket, .. }] => *ticket,
            other => panic!("expected a read, got {:?}", other),
        };
        let status = controller.presenter().status().to_string();

        let effects = controller.handle(Event::FilePicked(Some(PathBuf::from("notes.txt"))));
        assert!(matches!(effects.as_slice(), [Effect::Alert(_)]));
        assert_eq!(controller.presenter().status(), status);

        let effects = controller.handle(Event::FileRead {
            ticket,
            result: Ok(jpeg("photo.jpg", 100)),
        });
        assert_eq!(compress_requests(&effects).len(), 1);
        assert_eq!(controller.session().map(|s| s.source().name.as_str()), Some("photo.jpg"));
        assert!(controller.presenter().sections_visible());
    }

    #[test]
    fn test_dropped_video_is_rejected_without_reading() {
        let mut controller = controller();
        controller.handle(Event::DragEntered);

        let effects = controller.handle(Event::FileDropped(PathBuf::from("clip.mp4")));
        assert!(matches!(effects.as_slice(), [Effect::Alert(_)]));
        assert!(!controller.drop_zone().is_highlighted());

        // Rest of the same drop is ignored; the next drag is accepted
        assert!(controller.handle(Event::FileDropped(PathBuf::from("b.png"))).is_empty());
        controller.handle(Event::DragEntered);
        let effects = controller.handle(Event::FileDropped(PathBuf::from("a.png")));
        assert!(matches!(effects.as_slice(), [Effect::ReadFile { .. }]));
    }

    #[test]
    fn test_image_load_starts_exactly_one_compression() {
        let mut controller = controller();
        let effects = load(&mut controller, jpeg("cat.jpg", 5_000_000));

        let requests = compress_requests(&effects);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].quality, Quality::new(80));
        assert!((requests[0].options.quality - 0.8).abs() < f32::EPSILON);
        assert_eq!(requests[0].options.output_type, "image/jpeg");

        assert!(controller.session().is_some());
        assert!(controller.presenter().sections_visible());
        assert_eq!(controller.presenter().original_size_label(), "4.77 MB");
        assert!(!controller.can_download());
    }

    #[test]
    fn test_slider_burst_compresses_once_with_latest_value() {
        let mut controller = controller();
        let effects = load(&mut controller, jpeg("cat.jpg", 100));
        let first = compress_requests(&effects)[0].clone();
        controller.handle(finish(&first, 60));

        let mut tickets = Vec::new();
        for percent in [50, 30] {
            for effect in controller.handle(Event::QualityChanged(percent)) {
                match effect {
                    Effect::StartTimer { ticket, after } => {
                        assert_eq!(after, Duration::from_millis(300));
                        tickets.push(ticket);
                    }
                    other => panic!("unexpected effect {:?}", other),
                }
            }
        }

        let mut effects = Vec::new();
        for ticket in tickets {
            effects.extend(controller.handle(Event::DebounceElapsed(ticket)));
        }

        let requests = compress_requests(&effects);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].quality, Quality::new(30));
        assert_eq!(controller.quality().to_string(), "30%");
    }

    #[test]
    fn test_quality_change_while_empty_schedules_nothing() {
        let mut controller = controller();
        assert!(controller.handle(Event::QualityChanged(40)).is_empty());
        assert_eq!(controller.quality(), Quality::new(40));
    }

    #[test]
    fn test_new_file_cancels_pending_debounce() {
        let mut controller = controller();
        load(&mut controller, jpeg("a.jpg", 100));
        let ticket = match controller.handle(Event::QualityChanged(20)).as_slice() {
            [Effect::StartTimer { ticket, .. }] => *ticket,
            other => panic!("expected a timer, got {:?}", other),
        };

        let effects = load(&mut controller, jpeg("b.jpg", 100));
        assert_eq!(compress_requests(&effects).len(), 1);
        assert!(controller.handle(Event::DebounceElapsed(ticket)).is_empty());
    }

    #[test]
    fn test_compression_failure_keeps_previous_result() {
        let mut controller = controller();
        let effects = load(&mut controller, jpeg("cat.jpg", 100));
        let request = compress_requests(&effects)[0].clone();
        controller.handle(finish(&request, 40));
        assert_eq!(controller.presenter().compressed_size_label(), "40 Bytes");

        let effects = controller.handle(Event::CompressionFinished(CompressionOutcome {
            id: request.id,
            session: request.session,
            quality: request.quality,
            result: Err(CompressionError::Decode("bad".into())),
        }));

        assert!(matches!(effects.as_slice(), [Effect::Alert(msg)] if msg.contains("compression failed")));
        assert_eq!(controller.presenter().compressed_size_label(), "40 Bytes");
        assert!(controller.can_download());
    }

    #[test]
    fn test_download_uses_prefixed_name() {
        let mut controller = controller();
        assert!(controller.handle(Event::DownloadClicked).is_empty());

        let effects = load(&mut controller, jpeg("holiday.jpg", 100));
        let request = compress_requests(&effects)[0].clone();
        controller.handle(finish(&request, 70));

        match controller.handle(Event::DownloadClicked).as_slice() {
            [Effect::SaveFile { file_name, data }] => {
                assert_eq!(file_name, "compressed_holiday.jpg");
                assert_eq!(data.len(), 70);
            }
            other => panic!("expected a save, got {:?}", other),
        }

        let effects = controller.handle(Event::DownloadFinished(Err(CompressorError::download("disk full"))));
        assert!(matches!(effects.as_slice(), [Effect::Alert(_)]));
    }

    #[test]
    fn test_reset_returns_to_empty() {
        let mut controller = controller();
        let effects = load(&mut controller, jpeg("cat.jpg", 2048));
        let request = compress_requests(&effects)[0].clone();
        controller.handle(finish(&request, 1024));
        let ticket = match controller.handle(Event::QualityChanged(10)).as_slice() {
            [Effect::StartTimer { ticket, .. }] => *ticket,
            other => panic!("expected a timer, got {:?}", other),
        };

        controller.handle(Event::ResetClicked);

        assert!(controller.session().is_none());
        assert_eq!(controller.quality(), Quality::DEFAULT);
        assert!(!controller.presenter().sections_visible());
        assert_eq!(controller.presenter().original_size_label(), EMPTY_SIZE_LABEL);
        assert_eq!(controller.presenter().compressed_size_label(), EMPTY_SIZE_LABEL);
        assert!(controller.handle(Event::DebounceElapsed(ticket)).is_empty());

        // A late result from the discarded session changes nothing
        assert!(controller.handle(finish(&request, 10)).is_empty());
        assert_eq!(controller.presenter().compressed_size_label(), EMPTY_SIZE_LABEL);
    }

    #[test]
    fn test_only_first_dropped_file_is_read() {
        let mut controller = controller();
        controller.handle(Event::DragEntered);
        assert!(controller.drop_zone().is_highlighted());

        let first = controller.handle(Event::FileDropped(PathBuf::from("a.png")));
        let second = controller.handle(Event::FileDropped(PathBuf::from("b.png")));

        assert!(matches!(first.as_slice(), [Effect::ReadFile { path, .. }] if path == &PathBuf::from("a.png")));
        assert!(second.is_empty());
        assert!(!controller.drop_zone().is_highlighted());
    }

    #[test]
    fn test_superseded_read_is_ignored() {
        let mut controller = controller();
        let stale = match controller.handle(Event::FilePicked(Some(PathBuf::from("old.jpg")))).as_slice() {
            [Effect::ReadFile { ticket, .. }] => *ticket,
            other => panic!("expected a read, got {:?}", other),
        };
        controller.handle(Event::FilePicked(Some(PathBuf::from("new.jpg"))));

        let effects = controller.handle(Event::FileRead {
            ticket: stale,
            result: Ok(jpeg("old.jpg", 10)),
        });
        assert!(effects.is_empty());
        assert!(controller.session().is_none());
    }

    #[tokio::test]
    async fn test_end_to_end_with_native_compressor() {
        let photo = image::RgbImage::from_fn(320, 240, |x, y| {
            let noise = ((x * 7919 + y * 104_729) % 37) as u8;
            image::Rgb([(x % 256) as u8 ^ noise, (y % 256) as u8, noise.wrapping_mul(5)])
        });
        let mut source = std::io::Cursor::new(Vec::new());
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut source, 100)
            .encode_image(&photo)
            .unwrap();
        let source = SourceFile::new("photo.jpg", "image/jpeg", source.into_inner());
        let original_size = source.size();

        let mut controller = controller();
        let effects = load(&mut controller, source);
        let request = compress_requests(&effects)[0].clone();

        let outcome = orchestrator::execute(Arc::new(NativeCompressor), request).await;
        controller.handle(Event::CompressionFinished(outcome));

        let artifact = controller.session().and_then(|s| s.artifact()).unwrap();
        assert!(artifact.size() < original_size);
        assert_ne!(controller.presenter().compressed_size_label(), EMPTY_SIZE_LABEL);
        assert!(controller.presenter().savings_label().unwrap().starts_with("Saved"));
    }
}
