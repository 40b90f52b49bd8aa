use super::font::Typeface;
use super::overlay::{compose_recognizer, CANVAS_HEIGHT, CANVAS_WIDTH};
use super::{OutputError, OutputSink, TickView};
use crate::keys::KeyPress;
use image::RgbImage;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

const TARGET_FPS: usize = 60;

/// Desktop window showing the annotated feed and the side panel
pub struct WindowOutput {
    window: Option<Window>,
    buffer: Vec<u32>,
    pending: Option<KeyPress>,
    typeface: Typeface,
}

impl WindowOutput {
    pub fn new(title: &str) -> Result<Self, OutputError> {
        tracing::info!(
            "Opening window \"{}\" ({}x{})",
            title,
            CANVAS_WIDTH,
            CANVAS_HEIGHT
        );

        let typeface = Typeface::embedded()?;
        let mut window = Window::new(
            title,
            CANVAS_WIDTH as usize,
            CANVAS_HEIGHT as usize,
            WindowOptions::default(),
        )
        .map_err(|e| OutputError::Window(e.to_string()))?;
        window.set_target_fps(TARGET_FPS);

        Ok(Self {
            window: Some(window),
            buffer: vec![0; (CANVAS_WIDTH * CANVAS_HEIGHT) as usize],
            pending: None,
            typeface,
        })
    }

    /// Face used for the overlay text of canvases shown in this window
    pub fn typeface(&self) -> &Typeface {
        &self.typeface
    }

    /// Show an already composed canvas of `CANVAS_WIDTH`×`CANVAS_HEIGHT`
    pub fn show_canvas(&mut self, canvas: &RgbImage) -> Result<(), OutputError> {
        let Some(window) = self.window.as_mut() else {
            return Ok(());
        };

        for (dst, pixel) in self.buffer.iter_mut().zip(canvas.pixels()) {
            let [r, g, b] = pixel.0;
            *dst = (r as u32) << 16 | (g as u32) << 8 | b as u32;
        }

        window
            .update_with_buffer(&self.buffer, CANVAS_WIDTH as usize, CANVAS_HEIGHT as usize)
            .map_err(|e| OutputError::Window(e.to_string()))?;
        self.pending = first_key(window);

        Ok(())
    }

    /// Process window events without drawing, so keys and close requests are
    /// still seen while no frame arrives
    pub fn pump(&mut self) {
        if let Some(window) = self.window.as_mut() {
            window.update();
            self.pending = first_key(window);
        }
    }

    /// Take the key pressed since the last shown canvas, if any
    pub fn take_key(&mut self) -> Option<KeyPress> {
        self.pending.take()
    }
}

impl OutputSink for WindowOutput {
    fn present(&mut self, view: &TickView<'_>) -> Result<(), OutputError> {
        let _span = tracing::debug_span!("render").entered();
        let canvas = compose_recognizer(&self.typeface, view);
        self.show_canvas(&canvas)
    }

    fn poll_key(&mut self) -> Option<KeyPress> {
        self.take_key()
    }

    fn idle(&mut self) -> Result<(), OutputError> {
        self.pump();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.window.as_ref().is_some_and(Window::is_open)
    }

    fn close(&mut self) {
        if self.window.take().is_some() {
            tracing::info!("Window closed");
        }
    }
}

/// Only the first key is acted on; the rest of a burst is dropped
fn first_key(window: &Window) -> Option<KeyPress> {
    let shift = window.is_key_down(Key::LeftShift) || window.is_key_down(Key::RightShift);
    window
        .get_keys_pressed(KeyRepeat::No)
        .into_iter()
        .find_map(|key| key_press(key, shift))
}

/// `shift` selects the US-layout symbols on the main keyboard
fn key_press(key: Key, shift: bool) -> Option<KeyPress> {
    let c = match key {
        Key::Escape => return Some(KeyPress::Escape),
        Key::Key8 if shift => '*',
        Key::Equal if shift => '+',
        Key::Key0 | Key::NumPad0 => '0',
        Key::Key1 | Key::NumPad1 => '1',
        Key::Key2 | Key::NumPad2 => '2',
        Key::Key3 | Key::NumPad3 => '3',
        Key::Key4 | Key::NumPad4 => '4',
        Key::Key5 | Key::NumPad5 => '5',
        Key::Key6 | Key::NumPad6 => '6',
        Key::Key7 | Key::NumPad7 => '7',
        Key::Key8 | Key::NumPad8 => '8',
        Key::Key9 | Key::NumPad9 => '9',
        Key::A => 'A',
        Key::B => 'B',
        Key::C => 'C',
        Key::D => 'D',
        Key::E => 'E',
        Key::F => 'F',
        Key::G => 'G',
        Key::H => 'H',
        Key::I => 'I',
        Key::J => 'J',
        Key::K => 'K',
        Key::L => 'L',
        Key::M => 'M',
        Key::N => 'N',
        Key::O => 'O',
        Key::P => 'P',
        Key::Q => 'Q',
        Key::R => 'R',
        Key::S => 'S',
        Key::T => 'T',
        Key::U => 'U',
        Key::V => 'V',
        Key::W => 'W',
        Key::X => 'X',
        Key::Y => 'Y',
        Key::Z => 'Z',
        Key::NumPadAsterisk => '*',
        Key::NumPadPlus => '+',
        Key::NumPadMinus | Key::Minus => '-',
        _ => return None,
    };
    Some(KeyPress::Char(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_digits_letters_and_symbols() {
        assert_eq!(key_press(Key::Key2, false), Some(KeyPress::Char('2')));
        assert_eq!(key_press(Key::NumPad3, false), Some(KeyPress::Char('3')));
        assert_eq!(key_press(Key::Q, false), Some(KeyPress::Char('Q')));
        assert_eq!(key_press(Key::NumPadAsterisk, false), Some(KeyPress::Char('*')));
        assert_eq!(key_press(Key::Minus, false), Some(KeyPress::Char('-')));
        assert_eq!(key_press(Key::Escape, false), Some(KeyPress::Escape));
        assert_eq!(key_press(Key::Space, false), None);
    }

    #[test]
    fn shifted_main_keyboard_gives_action_symbols() {
        assert_eq!(key_press(Key::Key8, true), Some(KeyPress::Char('*')));
        assert_eq!(key_press(Key::Equal, true), Some(KeyPress::Char('+')));
        assert_eq!(key_press(Key::Key8, false), Some(KeyPress::Char('8')));
        assert_eq!(key_press(Key::Equal, false), None);
        assert_eq!(key_press(Key::NumPadPlus, true), Some(KeyPress::Char('+')));
    }
}
