//! Composition of the annotated frame and the side panel into one canvas.

use super::font::{Typeface, BODY_SIZE, SMALL_SIZE, TITLE_SIZE};
use super::TickView;
use crate::dataset::Partition;
use crate::labels::Mode;
use crate::ranking::{slot_text, WINDOW_BUDGET};
use crate::vision::{Preprocessor, Roi};
use image::{imageops, GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

pub const VIDEO_WIDTH: u32 = 640;
pub const VIDEO_HEIGHT: u32 = 480;
pub const PANEL_WIDTH: u32 = 320;
pub const CANVAS_WIDTH: u32 = VIDEO_WIDTH + PANEL_WIDTH;
pub const CANVAS_HEIGHT: u32 = VIDEO_HEIGHT;

const THUMBNAIL_SIZE: u32 = 128;
const PADDING: i32 = 16;
const ROW_HEIGHT: i32 = 34;

const BACKGROUND: Rgb<u8> = Rgb([44, 62, 80]);
const ROW_BACKGROUND: Rgb<u8> = Rgb([52, 73, 94]);
const TEXT: Rgb<u8> = Rgb([236, 240, 241]);
const HIGHLIGHT: Rgb<u8> = Rgb([26, 188, 156]);
const HINT: Rgb<u8> = Rgb([255, 255, 0]);

/// Everything the dataset capture window shows for one tick
pub struct CaptureView<'a> {
    pub frame: &'a RgbImage,
    pub roi: Roi,
    pub sample: &'a GrayImage,
    pub partition: Partition,
    /// Sample counts of the headline classes
    pub counts: &'a [(&'static str, usize)],
    pub last_saved: Option<&'a str>,
}

/// Annotated frame plus prediction panel for the recognizer
pub fn compose_recognizer(face: &Typeface, view: &TickView<'_>) -> RgbImage {
    let mut video = video_area(view.frame, view.roi);
    let accent = Rgb(view.mode.color());

    match view.mode {
        Mode::Idle => {
            face.draw(&mut video, "PRESS:", 10, 10, BODY_SIZE, HINT);
            face.draw(
                &mut video,
                "1 = DIGITS | 2 = LETTERS | 3 = ACTIONS",
                10,
                34,
                BODY_SIZE,
                HINT,
            );
        }
        mode => face.draw(&mut video, mode.status_text(), 10, 10, TITLE_SIZE, accent),
    }

    let mut canvas = blank_canvas();
    imageops::replace(&mut canvas, &video, 0, 0);

    let x = VIDEO_WIDTH as i32 + PADDING;
    let mut y = PADDING;

    face.draw(&mut canvas, "PREDICTIONS", x, y, TITLE_SIZE, TEXT);
    y += 36;
    face.draw(&mut canvas, view.mode.status_text(), x, y, BODY_SIZE, accent);
    y += 30;

    for slot in 0..WINDOW_BUDGET {
        let prediction = view.predictions.get(slot);
        let color = if slot == 0 && prediction.is_some() {
            HIGHLIGHT
        } else {
            TEXT
        };
        draw_row(face, &mut canvas, y, &slot_text(slot, prediction), color);
        y += ROW_HEIGHT + 4;
    }

    draw_thumbnail(&mut canvas, view.sample, y + 8);
    draw_footer(face, &mut canvas, &["1 digits   2 letters", "3 actions   Esc quit"]);

    canvas
}

/// Annotated frame plus sample counters for the dataset capture program
pub fn compose_capture(face: &Typeface, view: &CaptureView<'_>) -> RgbImage {
    let mut video = video_area(view.frame, view.roi);
    let partition = format!("MODE: {}", view.partition);
    face.draw(&mut video, &partition, 10, 10, TITLE_SIZE, HINT);
    face.draw(
        &mut video,
        "Press Esc to quit",
        10,
        VIDEO_HEIGHT as i32 - 28,
        BODY_SIZE,
        TEXT,
    );

    let mut canvas = blank_canvas();
    imageops::replace(&mut canvas, &video, 0, 0);

    let x = VIDEO_WIDTH as i32 + PADDING;
    let mut y = PADDING;

    face.draw(&mut canvas, "SAMPLES", x, y, TITLE_SIZE, TEXT);
    y += 36;

    for pair in view.counts.chunks(2) {
        let line = pair
            .iter()
            .map(|(class, count)| format!("{class}: {count}"))
            .collect::<Vec<_>>()
            .join("  ");
        draw_row(face, &mut canvas, y, &line, TEXT);
        y += ROW_HEIGHT + 4;
    }

    draw_thumbnail(&mut canvas, view.sample, y + 8);

    if let Some(saved) = view.last_saved {
        face.draw(
            &mut canvas,
            &format!("Saved {saved}"),
            x,
            y + THUMBNAIL_SIZE as i32 + 24,
            SMALL_SIZE,
            HIGHLIGHT,
        );
    }

    draw_footer(face, &mut canvas, &["0-9 A-Z save class", "* + - save action"]);

    canvas
}

fn blank_canvas() -> RgbImage {
    RgbImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND)
}

/// Frame with the ROI border, scaled to the video area
fn video_area(frame: &RgbImage, roi: Roi) -> RgbImage {
    let mut annotated = frame.clone();
    roi.draw_border(&mut annotated);

    if annotated.dimensions() == (VIDEO_WIDTH, VIDEO_HEIGHT) {
        annotated
    } else {
        imageops::resize(
            &annotated,
            VIDEO_WIDTH,
            VIDEO_HEIGHT,
            imageops::FilterType::Triangle,
        )
    }
}

fn draw_row(face: &Typeface, canvas: &mut RgbImage, y: i32, text: &str, color: Rgb<u8>) {
    let x = VIDEO_WIDTH as i32 + PADDING;
    let rect = Rect::at(x, y).of_size(PANEL_WIDTH - 2 * PADDING as u32, ROW_HEIGHT as u32);
    draw_filled_rect_mut(canvas, rect, ROW_BACKGROUND);
    let (_, text_height) = face.measure(text, BODY_SIZE);
    let text_y = y + (ROW_HEIGHT - text_height as i32) / 2;
    face.draw(canvas, text, x + 8, text_y, BODY_SIZE, color);
}

fn draw_thumbnail(canvas: &mut RgbImage, sample: &GrayImage, y: i32) {
    let scaled = imageops::resize(
        &Preprocessor::sample_to_rgb(sample),
        THUMBNAIL_SIZE,
        THUMBNAIL_SIZE,
        imageops::FilterType::Nearest,
    );
    let x = VIDEO_WIDTH + (PANEL_WIDTH - THUMBNAIL_SIZE) / 2;
    imageops::replace(canvas, &scaled, x as i64, y as i64);
}

fn draw_footer(face: &Typeface, canvas: &mut RgbImage, lines: &[&str]) {
    let x = VIDEO_WIDTH as i32 + PADDING;
    let line_height = BODY_SIZE as i32 + 4;
    let mut y = CANVAS_HEIGHT as i32 - PADDING - line_height * lines.len() as i32;
    for line in lines {
        face.draw(canvas, line, x, y, BODY_SIZE, TEXT);
        y += line_height;
    }
}
