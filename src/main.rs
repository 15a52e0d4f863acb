use std::sync::Arc;

use iced::{event, window, Element, Subscription, Task, Theme};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod compress;
mod controller;
mod error;
mod input;
mod orchestrator;
mod state;
mod ui;

use compress::{Compress, NativeCompressor};
use controller::{Controller, Effect, Event};
use orchestrator::debounce;
use state::Settings;

/// Main application state
struct ImageCompressor {
    /// Session lifecycle and everything on screen
    controller: Controller,
    /// Compression capability handed to background tasks
    compressor: Arc<dyn Compress>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User input or a finished background task
    Event(Event),
    /// An alert dialog was dismissed
    AlertClosed,
}

impl ImageCompressor {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        info!(
            "Image compressor ready (quality {}%, debounce {}ms, max {}px)",
            settings.default_quality, settings.debounce_ms, settings.max_dimension
        );
        if let Ok(json) = settings.to_json() {
            debug!("Effective settings:\n{}", json);
        }

        (
            ImageCompressor {
                controller: Controller::new(settings),
                compressor: Arc::new(NativeCompressor),
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Event(event) => {
                let effects = self.controller.handle(event);
                Task::batch(effects.into_iter().map(|effect| self.run(effect)))
            }
            Message::AlertClosed => Task::none(),
        }
    }

    /// Turn a controller effect into an async task
    fn run(&self, effect: Effect) -> Task<Message> {
        match effect {
            Effect::OpenPicker => Task::perform(ui::dialogs::pick_image(), |path| {
                Message::Event(Event::FilePicked(path))
            }),
            Effect::ReadFile { ticket, path } => Task::perform(input::load_source(path), move |result| {
                Message::Event(Event::FileRead { ticket, result })
            }),
            Effect::StartTimer { ticket, after } => Task::perform(debounce::elapsed(ticket, after), |ticket| {
                Message::Event(Event::DebounceElapsed(ticket))
            }),
            Effect::Compress(request) => Task::perform(
                orchestrator::execute(Arc::clone(&self.compressor), request),
                |outcome| Message::Event(Event::CompressionFinished(outcome)),
            ),
            Effect::SaveFile { file_name, data } => Task::perform(ui::dialogs::save_artifact(file_name, data), |result| {
                Message::Event(Event::DownloadFinished(result))
            }),
            Effect::Alert(text) => Task::perform(ui::dialogs::alert(text), |_| Message::AlertClosed),
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        ui::view(&self.controller)
    }

    /// Window-wide drag and drop
    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(window_event)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn window_event(event: iced::Event, _status: event::Status, _id: window::Id) -> Option<Message> {
    let iced::Event::Window(event) = event else {
        return None;
    };

    let event = match event {
        window::Event::FileHovered(_) => Event::DragEntered,
        window::Event::FilesHoveredLeft => Event::DragLeft,
        window::Event::FileDropped(path) => Event::FileDropped(path),
        _ => return None,
    };
    Some(Message::Event(event))
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_target(false)
        .with_ansi(true)
        .compact()
        .init();

    info!("=== Image Compressor starting ===");

    iced::application("Image Compressor", ImageCompressor::update, ImageCompressor::view)
        .subscription(ImageCompressor::subscription)
        .theme(ImageCompressor::theme)
        .centered()
        .run_with(ImageCompressor::new)
}
