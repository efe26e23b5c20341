use iced::widget::{column, scrollable, stack};
use iced::{event, keyboard, time, window, Element, Event, Length, Size, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod card;
mod config;
mod error;
mod gallery;
mod state;
mod ui;

use card::reveal::{scroll_progress, DeviceClass, Reveal, Transition};
use card::typewriter::Typewriter;
use config::Config;
use error::{AppError, StoreError};
use gallery::lightbox::{remove_photo, Lightbox, NavKey};
use gallery::projection::{fetch_snapshot, Projection, Snapshot};
use gallery::thumbnail::attach_thumbnails;
use gallery::upload::{collect_uploads_async, upload_batch, BatchReport, UploadQueue};
use state::data::{PhotoId, UploadFile};
use state::library::Library;

/// Extensions offered by the file picker; the MIME filter still applies afterwards
const PICKER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff"];

/// Window size used until the first resize event arrives
const INITIAL_SIZE: Size = Size::new(1280.0, 800.0);

/// Main application state
struct GreetingCard {
    config: Config,
    /// The photo store
    library: Library,

    /// Window width by scroll viewport height
    area: Size,
    scroll_y: f32,
    reveal: Reveal,
    typewriter: Typewriter,

    gallery: Projection,
    lightbox: Lightbox,
    uploads: UploadQueue,
    drag_active: bool,
    refreshing: bool,
    refresh_again: bool,

    /// Status message to display to the user
    status: String,
    /// Per-file failures of the last upload batch
    upload_errors: Vec<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    WindowResized(Size),
    Scrolled(scrollable::Viewport),
    /// Tap on the card cover (narrow layout)
    ToggleCard,
    TypewriterTick(Instant),

    /// User clicked the drop zone
    BrowseFiles,
    FileHovered,
    FilesHoveredLeft,
    FileDropped(PathBuf),
    FilesCollected(Vec<UploadFile>),
    UploadFinished(Arc<BatchReport>),

    RefreshGallery,
    GalleryLoaded(Result<Option<Snapshot>, String>),

    PhotoSelected(PhotoId),
    CloseViewer,
    PreviousPhoto,
    NextPhoto,
    ViewerKey(NavKey),
    DeleteSelected,
    PhotoDeleted(Result<PhotoId, String>),
}

impl GreetingCard {
    /// Create a new instance of the application
    fn new(config: Config, library: Library) -> (Self, Task<Message>) {
        let photo_count = library.photo_count().unwrap_or(0);
        info!(photo_count, "greeting card initialized");

        let device = DeviceClass::from_width(INITIAL_SIZE.width, config.narrow_breakpoint);
        let typewriter = Typewriter::new(config.card.message.clone(), config.typing_interval());

        let mut app = GreetingCard {
            config,
            library,
            area: INITIAL_SIZE,
            scroll_y: 0.0,
            reveal: Reveal::new(device),
            typewriter,
            gallery: Projection::default(),
            lightbox: Lightbox::default(),
            uploads: UploadQueue::default(),
            drag_active: false,
            refreshing: false,
            refresh_again: false,
            status: format!("{} photos in the gallery.", photo_count),
            upload_errors: Vec::new(),
        };

        let window_size = window::get_oldest()
            .and_then(window::get_size)
            .map(Message::WindowResized);
        let refresh = app.refresh();

        (app, Task::batch([window_size, refresh]))
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::WindowResized(size) => {
                self.area = size;
                let device = DeviceClass::from_width(size.width, self.config.narrow_breakpoint);
                let transition = self.reveal.set_device(device);
                self.on_reveal(transition);
                self.track_scroll();
                Task::none()
            }
            Message::Scrolled(viewport) => {
                self.scroll_y = viewport.absolute_offset().y;
                self.area.height = viewport.bounds().height;
                self.track_scroll();
                Task::none()
            }
            Message::ToggleCard => {
                let transition = self.reveal.toggle();
                self.on_reveal(transition);
                Task::none()
            }
            Message::TypewriterTick(now) => {
                self.typewriter.tick(now);
                Task::none()
            }

            Message::BrowseFiles => {
                // Show the native file picker dialog
                let picked = FileDialog::new()
                    .set_title("Select photos to add")
                    .add_filter("Images", PICKER_EXTENSIONS)
                    .pick_files();

                match picked {
                    Some(paths) => Task::perform(collect_uploads_async(paths), Message::FilesCollected),
                    None => Task::none(),
                }
            }
            Message::FileHovered => {
                self.drag_active = true;
                Task::none()
            }
            Message::FilesHoveredLeft => {
                self.drag_active = false;
                Task::none()
            }
            Message::FileDropped(path) => {
                self.drag_active = false;
                Task::perform(collect_uploads_async(vec![path]), Message::FilesCollected)
            }
            Message::FilesCollected(files) => {
                if files.is_empty() {
                    debug!("nothing to upload");
                    return Task::none();
                }
                info!(files = files.len(), "queued photos for upload");
                self.uploads.enqueue(files);
                self.start_uploads()
            }
            Message::UploadFinished(report) => {
                self.uploads.finish_batch();

                self.upload_errors = report
                    .failures()
                    .map(|(path, err)| format!("{}: {}", file_label(path), err))
                    .collect();
                self.status = format!(
                    "Added {} of {} photos.",
                    report.committed(),
                    report.outcomes.len()
                );

                Task::batch([self.refresh(), self.start_uploads()])
            }

            Message::RefreshGallery => self.refresh(),
            Message::GalleryLoaded(result) => {
                self.refreshing = false;
                match result {
                    Ok(Some(snapshot)) => {
                        if self.gallery.apply(snapshot) {
                            self.lightbox.reconcile(self.gallery.photos());
                        }
                    }
                    Ok(None) => {}
                    Err(err) => warn!(error = %err, "could not refresh gallery"),
                }

                if std::mem::take(&mut self.refresh_again) {
                    return self.refresh();
                }
                Task::none()
            }

            Message::PhotoSelected(id) => {
                self.lightbox.select(self.gallery.photos(), id);
                debug!(selection = ?self.lightbox.selection(), "photo selected");
                Task::none()
            }
            Message::CloseViewer => {
                self.lightbox.close();
                Task::none()
            }
            Message::PreviousPhoto => {
                self.lightbox.previous(self.gallery.photos());
                Task::none()
            }
            Message::NextPhoto => {
                self.lightbox.next(self.gallery.photos());
                Task::none()
            }
            Message::ViewerKey(key) => {
                self.lightbox.handle_key(key, self.gallery.photos());
                Task::none()
            }
            Message::DeleteSelected => {
                let Some(id) = self.lightbox.take_for_delete() else {
                    return Task::none();
                };

                let library = self.library.clone();
                Task::perform(
                    async move { remove_photo(&library, id).await },
                    |result| Message::PhotoDeleted(result.map_err(|err| err.to_string())),
                )
            }
            Message::PhotoDeleted(result) => {
                match result {
                    Ok(id) => {
                        info!(?id, "photo deleted");
                        self.status = "Photo deleted.".to_string();
                    }
                    Err(err) => {
                        error!(error = %err, "delete failed");
                        self.status = err;
                    }
                }
                self.refresh()
            }
        }
    }

    /// Feed the current scroll position into the card
    fn track_scroll(&mut self) {
        let progress = scroll_progress(
            self.scroll_y,
            self.area.height,
            self.config.scroll_region_screens,
        );
        let transition = self.reveal.set_progress(progress);
        self.on_reveal(transition);
    }

    /// Start the typewriter the first time the message shows up
    fn on_reveal(&mut self, transition: Transition) {
        match transition {
            Transition::Revealed => {
                debug!("card message revealed");
                self.typewriter.start(Instant::now());
            }
            Transition::Concealed => debug!("card message hidden"),
            Transition::Unchanged => {}
        }
    }

    fn start_uploads(&mut self) -> Task<Message> {
        let Some(batch) = self.uploads.next_batch() else {
            return Task::none();
        };

        self.status = format!("Uploading {} photos...", batch.len());
        let library = self.library.clone();
        Task::perform(
            async move { upload_batch(&library, batch).await },
            |report| Message::UploadFinished(Arc::new(report)),
        )
    }

    /// Rebuild the photo list if the store changed
    fn refresh(&mut self) -> Task<Message> {
        if self.refreshing {
            self.refresh_again = true;
            return Task::none();
        }
        self.refreshing = true;

        let library = self.library.clone();
        let known = self.gallery.revision();
        let thumbnail_dir = self.config.thumbnail_dir.clone();

        Task::perform(load_gallery(library, known, thumbnail_dir), |result| {
            Message::GalleryLoaded(result.map_err(|err| err.to_string()))
        })
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let card = ui::card::CardView {
            reveal: &self.reveal,
            typewriter: &self.typewriter,
            text: &self.config.card,
            area: self.area,
            scroll_y: self.scroll_y,
            region_screens: self.config.scroll_region_screens,
        }
        .view();

        let gallery = ui::gallery::gallery_section(
            self.gallery.photos(),
            ui::gallery::DropZone {
                drag_active: self.drag_active,
                uploading: self.uploads.is_busy(),
                queued: self.uploads.pending(),
                status: &self.status,
                errors: &self.upload_errors,
            },
        );

        let page = scrollable(column![card, gallery])
            .on_scroll(Message::Scrolled)
            .width(Length::Fill)
            .height(Length::Fill);

        // The scrollable stays the first child of the same root, so its
        // offset survives the viewer opening and closing
        let mut layers = stack![page];
        if let Some(photo) = self.lightbox.current(self.gallery.photos()) {
            layers = layers.push(ui::gallery::lightbox_overlay(photo, self.gallery.len()));
        }
        layers.into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            window::resize_events().map(|(_id, size)| Message::WindowResized(size)),
            event::listen_with(file_drop_event),
            time::every(self.config.refresh_interval()).map(|_| Message::RefreshGallery),
        ];

        // Dropped as soon as the message is fully typed
        if self.typewriter.is_running() {
            subscriptions.push(time::every(self.typewriter.interval()).map(Message::TypewriterTick));
        }

        // Arrow keys and Escape only matter while the viewer is open
        if self.lightbox.is_open() {
            subscriptions.push(keyboard::on_key_press(viewer_key));
        }

        Subscription::batch(subscriptions)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Snapshot of the store with grid thumbnails, if anything changed since `known`
async fn load_gallery(
    library: Library,
    known: Option<u64>,
    thumbnail_dir: PathBuf,
) -> Result<Option<Snapshot>, StoreError> {
    let Some(mut snapshot) = fetch_snapshot(&library, known).await? else {
        return Ok(None);
    };
    snapshot.photos = attach_thumbnails(snapshot.photos, thumbnail_dir).await;
    Ok(Some(snapshot))
}

fn file_drop_event(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::FileHovered(_)) => Some(Message::FileHovered),
        Event::Window(window::Event::FilesHoveredLeft) => Some(Message::FilesHoveredLeft),
        Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        _ => None,
    }
}

fn viewer_key(key: keyboard::Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    use keyboard::key::Named;

    let key = match key {
        keyboard::Key::Named(Named::Escape) => NavKey::Escape,
        keyboard::Key::Named(Named::ArrowLeft) => NavKey::Left,
        keyboard::Key::Named(Named::ArrowRight) => NavKey::Right,
        _ => return None,
    };
    Some(Message::ViewerKey(key))
}

fn file_label(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), AppError> {
    init_tracing();

    let config = Config::load()?;
    let library = Library::open(&config.library_dir)?;

    iced::application("Merry Christmas", GreetingCard::update, GreetingCard::view)
        .subscription(GreetingCard::subscription)
        .theme(GreetingCard::theme)
        .centered()
        .run_with(move || GreetingCard::new(config, library))?;

    Ok(())
}
