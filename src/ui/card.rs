/// The greeting card section
/// The cover is drawn on a canvas layered above the inside page. Turning it
/// is faked by squashing the cover along its hinge by |cos(rotation)| and
/// flipping it to the other side of the hinge once it passes 90 degrees.
use iced::alignment::{Horizontal, Vertical};
use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Path, Program, Stroke};
use iced::widget::text::Shaping;
use iced::widget::{canvas as canvas_widget, column, container, stack, text, vertical_space, Space};
use iced::{touch, Color, Element, Length, Padding, Pixels, Point, Rectangle, Renderer, Size, Theme};

use crate::card::reveal::{DeviceClass, Reveal};
use crate::card::typewriter::Typewriter;
use crate::config::CardText;
use crate::Message;

const PAPER: Color = Color::from_rgb(0.99, 0.98, 0.97);
const INK: Color = Color::from_rgb(0.2, 0.2, 0.22);
const COVER_RED: Color = Color::from_rgb(0.86, 0.15, 0.15);
const HOLLY: Color = Color::from_rgb(0.29, 0.87, 0.5);

/// Where the inside page sits within the card area
pub fn page_rect(area: Size, device: DeviceClass, offset: (f32, f32)) -> Rectangle {
    let (width, height) = match device {
        DeviceClass::Wide => ((area.width * 0.5).min(720.0), (area.height * 0.75).min(600.0)),
        DeviceClass::Narrow => (area.width * 0.8, area.height * 0.5),
    };
    Rectangle {
        x: ((area.width - width) / 2.0 + offset.0).max(0.0),
        y: ((area.height - height) / 2.0 + offset.1).max(0.0),
        width,
        height,
    }
}

/// Cover rectangle for a rotation, hinged on the page's left (wide) or top (narrow) edge
fn cover_rect(page: Rectangle, device: DeviceClass, rotation: f32) -> Rectangle {
    let squash = rotation.to_radians().cos().abs();
    let turned = rotation.abs() > 90.0;

    match device {
        DeviceClass::Wide => {
            let width = page.width * squash;
            Rectangle {
                x: if turned { page.x - width } else { page.x },
                width,
                ..page
            }
        }
        DeviceClass::Narrow => {
            let height = page.height * squash;
            Rectangle {
                y: if turned { page.y - height } else { page.y },
                height,
                ..page
            }
        }
    }
}

/// Canvas program drawing the card cover
pub struct CardCover<'a> {
    pub device: DeviceClass,
    pub rotation: f32,
    pub offset: (f32, f32),
    pub text: &'a CardText,
}

impl CardCover<'_> {
    fn page(&self, bounds: Rectangle) -> Rectangle {
        page_rect(bounds.size(), self.device, self.offset)
    }

    fn label(&self, frame: &mut canvas::Frame, content: &str, position: Point, size: f32, color: Color) {
        frame.fill_text(canvas::Text {
            content: content.to_string(),
            position,
            color,
            size: Pixels(size),
            horizontal_alignment: Horizontal::Center,
            vertical_alignment: Vertical::Center,
            shaping: Shaping::Advanced,
            ..canvas::Text::default()
        });
    }
}

impl Program<Message> for CardCover<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let page = self.page(bounds);
        let cover = cover_rect(page, self.device, self.rotation);
        let turned = self.rotation.abs() > 90.0;
        let scale = if self.device == DeviceClass::Narrow { 0.6 } else { 1.0 };

        if turned {
            frame.fill_rectangle(cover.position(), cover.size(), PAPER);
        } else {
            frame.fill_rectangle(cover.position(), cover.size(), COVER_RED);
            frame.stroke(
                &Path::rectangle(cover.position(), cover.size()),
                Stroke::default().with_color(HOLLY).with_width(4.0),
            );
        }

        // Text on a face that is nearly edge-on would spill over the hinge
        let squash = self.rotation.to_radians().cos().abs();
        if squash < 0.6 {
            return vec![frame.into_geometry()];
        }

        let center = cover.center();
        if turned {
            self.label(&mut frame, "🎄 ❄️ 🎁", Point::new(center.x, center.y - 40.0 * scale), 48.0 * scale, INK);
            self.label(&mut frame, &self.text.inside_note, Point::new(center.x, center.y + 40.0 * scale), 24.0 * scale, INK);
        } else {
            let hint = match self.device {
                DeviceClass::Wide => "↓ Scroll to open ↓",
                DeviceClass::Narrow => "↓ Tap to open ↓",
            };
            self.label(&mut frame, "🎅", Point::new(center.x, center.y - 120.0 * scale), 80.0 * scale, Color::WHITE);
            self.label(&mut frame, &self.text.cover_title, Point::new(center.x, center.y - 20.0 * scale), 56.0 * scale, HOLLY);
            self.label(&mut frame, &self.text.cover_subtitle, Point::new(center.x, center.y + 50.0 * scale), 64.0 * scale, HOLLY);
            self.label(&mut frame, hint, Point::new(center.x, center.y + 130.0 * scale), 18.0 * scale, Color::WHITE);
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        _state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        // Only the narrow layout opens on tap
        if self.device != DeviceClass::Narrow {
            return (canvas::event::Status::Ignored, None);
        }

        let pressed = matches!(
            event,
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left))
                | canvas::Event::Touch(touch::Event::FingerPressed { .. })
        );

        if pressed {
            if let Some(position) = cursor.position_in(bounds) {
                if self.page(bounds).contains(position) {
                    return (canvas::event::Status::Captured, Some(Message::ToggleCard));
                }
            }
        }

        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(&self, _state: &Self::State, bounds: Rectangle, cursor: Cursor) -> mouse::Interaction {
        match cursor.position_in(bounds) {
            Some(position) if self.device == DeviceClass::Narrow && self.page(bounds).contains(position) => {
                mouse::Interaction::Pointer
            }
            _ => mouse::Interaction::default(),
        }
    }
}

/// Everything needed to lay out the card section
pub struct CardView<'a> {
    pub reveal: &'a Reveal,
    pub typewriter: &'a Typewriter,
    pub text: &'a CardText,
    /// Visible area: window width by viewport height
    pub area: Size,
    pub scroll_y: f32,
    pub region_screens: f32,
}

impl<'a> CardView<'a> {
    pub fn view(self) -> Element<'a, Message> {
        let device = self.reveal.device();
        let offset = self.reveal.offset();
        let page = page_rect(self.area, device, offset);
        let (heading, body) = match device {
            DeviceClass::Wide => (32.0, 24.0),
            DeviceClass::Narrow => (20.0, 15.0),
        };

        let mut message = column![text(&self.text.salutation).size(heading).color(INK)].spacing(16);
        if self.reveal.narrative_visible() {
            message = message.push(
                text(format!("{}|", self.typewriter.text()))
                    .size(body)
                    .color(INK)
                    .shaping(Shaping::Advanced),
            );
        }

        let inside = container(
            column![
                message,
                vertical_space(),
                container(text(&self.text.signature).size(heading).color(INK)).align_right(Length::Fill),
            ]
            .height(Length::Fill),
        )
        .width(page.width)
        .height(page.height)
        .padding(24)
        .style(|_theme| container::Style {
            background: Some(PAPER.into()),
            ..Default::default()
        });

        let inside = container(inside)
            .padding(Padding {
                top: page.y,
                right: 0.0,
                bottom: 0.0,
                left: page.x,
            })
            .width(Length::Fill)
            .height(Length::Fill);

        let cover = canvas_widget(CardCover {
            device,
            rotation: self.reveal.cover_rotation(),
            offset,
            text: self.text,
        })
        .width(Length::Fill)
        .height(Length::Fill);

        // Keep the card on screen while scrolling through its region
        let viewport = self.area.height;
        let pinned = self.scroll_y.clamp(0.0, viewport * (self.region_screens - 1.0).max(0.0));

        container(column![
            Space::with_height(pinned),
            stack![inside, cover].width(Length::Fill).height(viewport),
        ])
        .width(Length::Fill)
        .height(viewport * self.region_screens)
        .style(|_theme| container::Style {
            background: Some(Color::from_rgb(0.06, 0.09, 0.16).into()),
            ..Default::default()
        })
        .into()
    }
}
