/// Window layout
///
/// Drop zone on top; once an image is loaded, the quality slider, the
/// before/after previews and the action buttons appear below it.
use iced::widget::{button, column, container, mouse_area, row, slider, text, Column, Image};
use iced::{Alignment, Element, Length, Theme};

use crate::controller::{Controller, Event};
use crate::ui::presenter::{Preview, Presenter};
use crate::Message;

/// Height of each preview image
const PREVIEW_HEIGHT: f32 = 320.0;

pub fn view(controller: &Controller) -> Element<'_, Message> {
    let presenter = controller.presenter();

    let mut content: Column<Message> = column![
        text("Image Compressor").size(40),
        drop_zone(controller.drop_zone().is_highlighted()),
    ]
    .spacing(20)
    .padding(40)
    .align_x(Alignment::Center);

    if let Some(session) = controller.session() {
        let source = session.source();
        content = content.push(text(format!("{} ({})", source.name, source.media_type)).size(16));
    }

    if presenter.sections_visible() {
        content = content
            .push(quality_controls(controller))
            .push(previews(presenter))
            .push(actions(controller.can_download()));
    }

    content = content.push(text(presenter.status()).size(14));

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .into()
}

fn drop_zone<'a>(highlighted: bool) -> Element<'a, Message> {
    let zone = container(
        column![
            text("Drop an image here").size(22),
            text("or click to browse").size(14),
        ]
        .spacing(8)
        .align_x(Alignment::Center),
    )
    .padding(40)
    .width(Length::Fill)
    .center_x(Length::Fill)
    .style(move |theme: &Theme| {
        if highlighted {
            container::rounded_box(theme)
        } else {
            container::bordered_box(theme)
        }
    });

    mouse_area(zone)
        .on_press(Message::Event(Event::BrowseClicked))
        .into()
}

fn quality_controls(controller: &Controller) -> Element<'_, Message> {
    let quality = controller.quality();

    row![
        text("Quality").size(16),
        slider(0..=100, quality.percent(), |percent| {
            Message::Event(Event::QualityChanged(percent))
        }),
        text(quality.to_string()).size(16).width(Length::Fixed(48.0)),
    ]
    .spacing(16)
    .align_y(Alignment::Center)
    .into()
}

fn previews(presenter: &Presenter) -> Element<'_, Message> {
    let mut compressed_title = String::from("Compressed");
    if let Some(savings) = presenter.savings_label() {
        compressed_title = format!("Compressed ({})", savings);
    }

    row![
        preview_card("Original".to_string(), presenter.original(), presenter.original_size_label()),
        preview_card(compressed_title, presenter.compressed(), presenter.compressed_size_label()),
    ]
    .spacing(20)
    .into()
}

fn preview_card<'a>(title: String, preview: Option<&'a Preview>, size_label: &'a str) -> Element<'a, Message> {
    let picture: Element<'a, Message> = match preview {
        Some(preview) => Image::new(preview.handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(PREVIEW_HEIGHT))
            .into(),
        None => container(text("Compressing...").size(14))
            .width(Length::Fill)
            .height(Length::Fixed(PREVIEW_HEIGHT))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(PREVIEW_HEIGHT))
            .into(),
    };

    column![text(title).size(18), picture, text(size_label).size(14)]
        .spacing(10)
        .width(Length::FillPortion(1))
        .align_x(Alignment::Center)
        .into()
}

fn actions<'a>(can_download: bool) -> Element<'a, Message> {
    row![
        button("Download")
            .on_press_maybe(can_download.then_some(Message::Event(Event::DownloadClicked)))
            .padding(10),
        button("Reset")
            .on_press(Message::Event(Event::ResetClicked))
            .padding(10),
    ]
    .spacing(20)
    .into()
}
