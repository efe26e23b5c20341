use iced::widget::image::{Handle, Image};
use iced::widget::{button, column, container, mouse_area, opaque, stack, text, Space};
use iced::{Alignment, Background, Border, Color, ContentFit, Element, Length};
use iced_aw::Wrap;

use crate::gallery::lightbox::shows_navigation;
use crate::state::data::ResolvedPhoto;
use crate::Message;

const TILE: f32 = 280.0;
const GOLD: Color = Color::from_rgb(0.98, 0.8, 0.08);
const MUTED: Color = Color::from_rgb(0.55, 0.57, 0.6);

/// Drop zone state shown above the grid
pub struct DropZone<'a> {
    pub drag_active: bool,
    pub uploading: bool,
    pub queued: usize,
    pub status: &'a str,
    pub errors: &'a [String],
}

fn drop_zone<'a>(zone: DropZone<'a>) -> Element<'a, Message> {
    let prompt = if zone.drag_active {
        text("Drop the photos here...").color(GOLD)
    } else {
        text("Drag & drop photos here, or click to select files").color(MUTED)
    };

    let mut body = column![text("⇪").size(48).color(MUTED), prompt]
        .spacing(12)
        .align_x(Alignment::Center);
    if zone.uploading {
        body = body.push(text(format!("Uploading... ({} more queued)", zone.queued)).color(MUTED));
    }

    let drag_active = zone.drag_active;
    let area = container(body)
        .padding(48)
        .width(Length::Fill)
        .center_x(Length::Fill)
        .style(move |_theme| container::Style {
            background: drag_active.then(|| Background::Color(Color::from_rgb(0.07, 0.07, 0.09))),
            border: Border {
                color: if drag_active { GOLD } else { Color::from_rgb(0.25, 0.25, 0.28) },
                width: 2.0,
                radius: 12.0.into(),
            },
            ..Default::default()
        });

    let mut section = column![mouse_area(area).on_press(Message::BrowseFiles)].spacing(8);
    if !zone.status.is_empty() {
        section = section.push(text(zone.status).color(MUTED));
    }
    for error in zone.errors {
        section = section.push(text(error).color(Color::from_rgb(0.95, 0.4, 0.4)).size(14));
    }
    section.into()
}

fn tile(photo: &ResolvedPhoto) -> Element<'_, Message> {
    let source = photo.thumbnail.as_deref().map(Handle::from_path).or_else(|| {
        photo.url.as_deref().map(Handle::from_path)
    });

    let content: Element<'_, Message> = match source {
        Some(handle) => Image::new(handle)
            .content_fit(ContentFit::Cover)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => container(text("Loading...").color(MUTED))
            .center(Length::Fill)
            .into(),
    };

    let tile = mouse_area(
        container(content)
            .width(TILE)
            .height(TILE)
            .style(|_theme| container::Style {
                background: Some(Color::from_rgb(0.12, 0.13, 0.15).into()),
                border: Border {
                    radius: 8.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            }),
    )
    .on_press(Message::PhotoSelected(photo.id()));

    // Gutter between grid cells
    container(tile).padding(12).into()
}

/// Heading, drop zone and thumbnail grid
pub fn gallery_section<'a>(photos: &'a [ResolvedPhoto], zone: DropZone<'a>) -> Element<'a, Message> {
    let tiles: Vec<Element<'a, Message>> = photos.iter().map(tile).collect();

    let grid: Element<'a, Message> = if tiles.is_empty() {
        text("No photos yet").color(MUTED).into()
    } else {
        Wrap::with_elements(tiles).into()
    };

    container(
        column![
            text("Photo Gallery").size(40).color(GOLD),
            text("Add some photos of the party here!").color(MUTED),
            drop_zone(zone),
            grid,
        ]
        .spacing(32)
        .align_x(Alignment::Center)
        .max_width(1200),
    )
    .padding(32)
    .width(Length::Fill)
    .center_x(Length::Fill)
    .into()
}

fn control(label: &str, message: Message) -> Element<'_, Message> {
    button(text(label).size(22))
        .padding(12)
        .on_press(message)
        .style(|_theme, status| button::Style {
            background: Some(Color::from_rgba(1.0, 1.0, 1.0, match status {
                button::Status::Hovered => 0.2,
                _ => 0.1,
            })
            .into()),
            text_color: Color::WHITE,
            border: Border {
                radius: 24.0.into(),
                ..Default::default()
            },
            ..Default::default()
        })
        .into()
}

/// Full-screen viewer over the page
pub fn lightbox_overlay(photo: &ResolvedPhoto, photo_count: usize) -> Element<'_, Message> {
    let backdrop = mouse_area(
        container(Space::new(Length::Fill, Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.85).into()),
                ..Default::default()
            }),
    )
    .on_press(Message::CloseViewer);

    let picture: Element<'_, Message> = match photo.url.as_deref() {
        Some(url) => opaque(
            Image::new(Handle::from_path(url))
                .content_fit(ContentFit::Contain)
                .width(Length::Shrink)
                .height(Length::Shrink),
        ),
        None => Space::new(Length::Shrink, Length::Shrink).into(),
    };
    let picture = container(picture).padding(72).center(Length::Fill);

    let close = container(control("✕", Message::CloseViewer))
        .padding(16)
        .align_right(Length::Fill)
        .align_top(Length::Fill);

    let delete = container(control("🗑", Message::DeleteSelected))
        .padding(16)
        .align_right(Length::Fill)
        .align_bottom(Length::Fill);

    let mut layers = stack![backdrop, picture, close, delete]
        .width(Length::Fill)
        .height(Length::Fill);

    if shows_navigation(photo_count) {
        layers = layers
            .push(
                container(control("‹", Message::PreviousPhoto))
                    .padding(24)
                    .align_left(Length::Fill)
                    .center_y(Length::Fill),
            )
            .push(
                container(control("›", Message::NextPhoto))
                    .padding(24)
                    .align_right(Length::Fill)
                    .center_y(Length::Fill),
            );
    }

    opaque(layers)
}
